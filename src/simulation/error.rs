//! Error types
//!
//! `GameError` is the tagged failure returned by every engine action. Its
//! display text is the message shown to the player.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("没有这种货物")]
    UnknownGood(usize),
    #[error("没有这支股票")]
    UnknownStock(usize),
    #[error("没有这个地方")]
    UnknownLocation(usize),
    #[error("你已经在这里了")]
    SameLocation,
    #[error("这里今天没有人卖这种货")]
    GoodUnavailable,
    #[error("这里今天没有人收这种货")]
    NoBuyer,
    #[error("数量必须大于零")]
    InvalidQuantity,
    #[error("金额必须大于零")]
    InvalidAmount,
    #[error("现金不够，需要 {needed} 元，只有 {available} 元")]
    InsufficientCash { needed: i64, available: i64 },
    #[error("存款不够，只有 {available} 元")]
    InsufficientBank { available: i64 },
    #[error("现金加存款也不够还债，需要 {needed} 元")]
    InsufficientFunds { needed: i64 },
    #[error("房子放不下了，还能放 {free} 件")]
    InsufficientCapacity { free: u32 },
    #[error("你没有这种货")]
    NoHolding,
    #[error("你只有 {held} 件")]
    InsufficientHolding { held: u32 },
    #[error("你没有欠债")]
    NoDebt,
    #[error("你很健康，不用看病")]
    AlreadyHealthy,
    #[error("最多只能治疗 {headroom} 点")]
    ExceedsHealthHeadroom { headroom: i32 },
    #[error("房子已经够大了")]
    CapacityMaxed,
    #[error("网吧老板不让你再进了")]
    WangbaLimitReached,
    #[error("股市暂未开放")]
    StockMarketClosed,
    #[error("游戏已经结束")]
    GameOver,
}

/// Failures of the persistence collaborator
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },
}
