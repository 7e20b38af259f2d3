//! Static game data
//!
//! Goods, stocks, locations and the weighted event tables. These values are
//! game balance and must not be derived; edit them here and nowhere else.

use thiserror::Error;

use super::types::{
    City, GoodId, Location, LocationId, SoundCue, StockId, GOOD_COUNT, LOCATION_COUNT, STOCK_COUNT,
};

/// A tradeable good with its per-turn price bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoodInfo {
    pub name: &'static str,
    /// Inclusive lower price bound
    pub min_price: i64,
    /// Exclusive upper price bound
    pub max_price: i64,
    /// Fame lost every time this good is sold
    pub fame_penalty: i32,
}

/// A listed stock and the parameters of its price walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockInfo {
    pub name: &'static str,
    /// Initial price range, inclusive
    pub start_min: i64,
    pub start_max: i64,
    /// Hard clamp applied to every generated price
    pub min_price: i64,
    pub max_price: i64,
    pub daily_volatility: f64,
    pub jump_chance: f64,
    pub jump_min: f64,
    pub jump_max: f64,
}

/// A market event that moves a good's price and/or hands out free goods
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommercialEvent {
    pub freq: u32,
    pub message: &'static str,
    pub good: GoodId,
    /// Price multiplier, 0 when unused
    pub multiplier: i64,
    /// Price divisor, 0 when unused
    pub divisor: i64,
    /// Free quantity granted, 0 when unused
    pub free_quantity: u32,
    /// Debt added whenever the event fires
    pub extra_debt: i64,
}

/// A mishap that costs the player health
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthEvent {
    pub freq: u32,
    pub message: &'static str,
    pub damage: i32,
    pub sound: SoundCue,
}

/// A theft that takes a percentage of cash or of the bank balance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TheftEvent {
    pub freq: u32,
    pub message: &'static str,
    /// Percentage lost, 1..=100
    pub ratio: i64,
    pub targets_bank: bool,
}

/// News that moves a single stock by a percentage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockEvent {
    pub freq: u32,
    pub message: &'static str,
    pub stock: StockId,
    pub percent_change: i64,
}

pub static GOODS: [GoodInfo; GOOD_COUNT] = [
    GoodInfo { name: "进口香烟", min_price: 100, max_price: 450, fame_penalty: 0 },
    GoodInfo { name: "走私汽车", min_price: 15000, max_price: 30000, fame_penalty: 0 },
    GoodInfo { name: "盗版光碟", min_price: 5, max_price: 55, fame_penalty: 0 },
    GoodInfo { name: "低质商品", min_price: 1000, max_price: 3500, fame_penalty: 10 },
    GoodInfo { name: "违禁书籍", min_price: 5000, max_price: 9000, fame_penalty: 7 },
    GoodInfo { name: "进口玩具", min_price: 250, max_price: 850, fame_penalty: 0 },
    GoodInfo { name: "水货手机", min_price: 750, max_price: 1500, fame_penalty: 0 },
    GoodInfo { name: "伪劣化妆品", min_price: 65, max_price: 245, fame_penalty: 0 },
];

pub static STOCKS: [StockInfo; STOCK_COUNT] = [
    StockInfo { name: "燕京地产", start_min: 20, start_max: 40, min_price: 3, max_price: 300, daily_volatility: 0.06, jump_chance: 0.05, jump_min: 0.10, jump_max: 0.25 },
    StockInfo { name: "申城银行", start_min: 8, start_max: 15, min_price: 2, max_price: 80, daily_volatility: 0.02, jump_chance: 0.02, jump_min: 0.05, jump_max: 0.10 },
    StockInfo { name: "华夏科技", start_min: 30, start_max: 60, min_price: 5, max_price: 500, daily_volatility: 0.08, jump_chance: 0.08, jump_min: 0.15, jump_max: 0.35 },
    StockInfo { name: "长江航运", start_min: 10, start_max: 20, min_price: 2, max_price: 120, daily_volatility: 0.03, jump_chance: 0.03, jump_min: 0.05, jump_max: 0.15 },
    StockInfo { name: "黄浦证券", start_min: 15, start_max: 30, min_price: 3, max_price: 200, daily_volatility: 0.05, jump_chance: 0.06, jump_min: 0.10, jump_max: 0.20 },
    StockInfo { name: "首都钢铁", start_min: 5, start_max: 12, min_price: 1, max_price: 60, daily_volatility: 0.03, jump_chance: 0.02, jump_min: 0.05, jump_max: 0.12 },
    StockInfo { name: "东海能源", start_min: 12, start_max: 25, min_price: 2, max_price: 150, daily_volatility: 0.04, jump_chance: 0.04, jump_min: 0.08, jump_max: 0.20 },
    StockInfo { name: "中关村软件", start_min: 40, start_max: 80, min_price: 8, max_price: 600, daily_volatility: 0.09, jump_chance: 0.10, jump_min: 0.15, jump_max: 0.40 },
    StockInfo { name: "外滩传媒", start_min: 10, start_max: 22, min_price: 2, max_price: 130, daily_volatility: 0.05, jump_chance: 0.05, jump_min: 0.10, jump_max: 0.25 },
    StockInfo { name: "西山制药", start_min: 18, start_max: 35, min_price: 3, max_price: 250, daily_volatility: 0.07, jump_chance: 0.07, jump_min: 0.12, jump_max: 0.30 },
];

pub static LOCATIONS: [Location; LOCATION_COUNT] = [
    Location { id: LocationId(0), name: "西直门", city: City::Beijing },
    Location { id: LocationId(1), name: "积水潭", city: City::Beijing },
    Location { id: LocationId(2), name: "东直门", city: City::Beijing },
    Location { id: LocationId(3), name: "苹果园", city: City::Beijing },
    Location { id: LocationId(4), name: "公主坟", city: City::Beijing },
    Location { id: LocationId(5), name: "复兴门", city: City::Beijing },
    Location { id: LocationId(6), name: "建国门", city: City::Beijing },
    Location { id: LocationId(7), name: "长椿街", city: City::Beijing },
    Location { id: LocationId(8), name: "崇文门", city: City::Beijing },
    Location { id: LocationId(9), name: "北京站", city: City::Beijing },
    Location { id: LocationId(10), name: "人民广场", city: City::Shanghai },
    Location { id: LocationId(11), name: "陆家嘴", city: City::Shanghai },
    Location { id: LocationId(12), name: "徐家汇", city: City::Shanghai },
    Location { id: LocationId(13), name: "静安寺", city: City::Shanghai },
    Location { id: LocationId(14), name: "南京东路", city: City::Shanghai },
    Location { id: LocationId(15), name: "外滩", city: City::Shanghai },
    Location { id: LocationId(16), name: "虹桥", city: City::Shanghai },
    Location { id: LocationId(17), name: "五角场", city: City::Shanghai },
    Location { id: LocationId(18), name: "中山公园", city: City::Shanghai },
    Location { id: LocationId(19), name: "上海站", city: City::Shanghai },
];

static COMMERCIAL_EVENTS: [CommercialEvent; 18] = [
    CommercialEvent { freq: 170, message: "专家提议提高大学生素质，高校里开始流行读违禁书籍！", good: GoodId(4), multiplier: 2, divisor: 0, free_quantity: 0, extra_debt: 0 },
    CommercialEvent { freq: 139, message: "大学生们开始整箱购买进口玩具！", good: GoodId(5), multiplier: 2, divisor: 0, free_quantity: 0, extra_debt: 0 },
    CommercialEvent { freq: 100, message: "有人在街头高价收购水货手机！", good: GoodId(6), multiplier: 3, divisor: 0, free_quantity: 0, extra_debt: 0 },
    CommercialEvent { freq: 41, message: "沿海的走私汽车大量涌入，车价暴跌！", good: GoodId(1), multiplier: 0, divisor: 4, free_quantity: 0, extra_debt: 0 },
    CommercialEvent { freq: 37, message: "疯狂的大学生开始不顾一切地抢购盗版光碟！", good: GoodId(2), multiplier: 4, divisor: 0, free_quantity: 0, extra_debt: 0 },
    CommercialEvent { freq: 23, message: "工商局查获大批低质商品，市面缺货，价格飞涨！", good: GoodId(3), multiplier: 4, divisor: 0, free_quantity: 0, extra_debt: 0 },
    CommercialEvent { freq: 37, message: "盗版光碟市场饱和，价格一落千丈！", good: GoodId(2), multiplier: 0, divisor: 8, free_quantity: 0, extra_debt: 0 },
    CommercialEvent { freq: 15, message: "老乡进城看你，送了你两条进口香烟。", good: GoodId(0), multiplier: 0, divisor: 0, free_quantity: 2, extra_debt: 0 },
    CommercialEvent { freq: 40, message: "有人在地铁口塞给你一部水货手机。", good: GoodId(6), multiplier: 0, divisor: 0, free_quantity: 1, extra_debt: 0 },
    CommercialEvent { freq: 29, message: "一个大学生送你两箱低质商品，让你帮着销掉。", good: GoodId(3), multiplier: 0, divisor: 0, free_quantity: 2, extra_debt: 0 },
    CommercialEvent { freq: 35, message: "工商局严查水货手机，手机价格猛涨！", good: GoodId(6), multiplier: 3, divisor: 0, free_quantity: 0, extra_debt: 0 },
    CommercialEvent { freq: 17, message: "一位朋友把她所有的伪劣化妆品都送给了你！", good: GoodId(7), multiplier: 0, divisor: 0, free_quantity: 3, extra_debt: 0 },
    CommercialEvent { freq: 24, message: "伪劣化妆品被媒体曝光，无人问津！", good: GoodId(7), multiplier: 0, divisor: 4, free_quantity: 0, extra_debt: 0 },
    CommercialEvent { freq: 30, message: "海关严查进口香烟，烟价大涨！", good: GoodId(0), multiplier: 3, divisor: 0, free_quantity: 0, extra_debt: 0 },
    CommercialEvent { freq: 45, message: "海关放松管制，进口玩具大降价！", good: GoodId(5), multiplier: 0, divisor: 3, free_quantity: 0, extra_debt: 0 },
    CommercialEvent { freq: 52, message: "有老板出高价收购走私汽车！", good: GoodId(1), multiplier: 2, divisor: 0, free_quantity: 0, extra_debt: 0 },
    CommercialEvent { freq: 65, message: "违禁书籍被大量盗印，书价大跌！", good: GoodId(4), multiplier: 0, divisor: 5, free_quantity: 0, extra_debt: 0 },
    CommercialEvent { freq: 60, message: "老乡把一批进口玩具留给了你，可你得替他还 2500 元的债！", good: GoodId(5), multiplier: 0, divisor: 0, free_quantity: 3, extra_debt: 2500 },
];

static HEALTH_EVENTS: [HealthEvent; 12] = [
    HealthEvent { freq: 117, message: "你在街头被城管追着打！", damage: 10, sound: SoundCue::Hurt },
    HealthEvent { freq: 157, message: "你被一群小流氓围殴！", damage: 20, sound: SoundCue::Kill },
    HealthEvent { freq: 21, message: "你走路不小心摔了一跤。", damage: 1, sound: SoundCue::Hurt },
    HealthEvent { freq: 100, message: "你吃了路边摊，上吐下泻。", damage: 5, sound: SoundCue::Hurt },
    HealthEvent { freq: 35, message: "你被蚊子叮了满身包。", damage: 1, sound: SoundCue::Hurt },
    HealthEvent { freq: 313, message: "你在早高峰地铁里被挤伤了肋骨！", damage: 15, sound: SoundCue::Kill },
    HealthEvent { freq: 120, message: "你连夜赶路，累得腰酸背痛。", damage: 3, sound: SoundCue::Hurt },
    HealthEvent { freq: 29, message: "寒风刺骨，你着凉感冒了。", damage: 3, sound: SoundCue::Hurt },
    HealthEvent { freq: 43, message: "你熬夜打游戏，头昏眼花。", damage: 3, sound: SoundCue::Hurt },
    HealthEvent { freq: 45, message: "你被一辆黑车剐蹭了一下。", damage: 5, sound: SoundCue::Hurt },
    HealthEvent { freq: 48, message: "你在桑拿房里中暑晕倒。", damage: 2, sound: SoundCue::Hurt },
    HealthEvent { freq: 33, message: "你买到了假药，越吃越虚！", damage: 8, sound: SoundCue::Hurt },
];

static THEFT_EVENTS: [TheftEvent; 7] = [
    TheftEvent { freq: 60, message: "你在地铁里被小偷扒了钱包！", ratio: 10, targets_bank: false },
    TheftEvent { freq: 125, message: "你在暗巷里遇到了抢劫！", ratio: 20, targets_bank: false },
    TheftEvent { freq: 100, message: "你被街头骗子骗走了一笔钱。", ratio: 10, targets_bank: false },
    TheftEvent { freq: 65, message: "你在火车站被人调包了钱包！", ratio: 40, targets_bank: false },
    TheftEvent { freq: 35, message: "银行系统遭到攻击，你的存款少了一截！", ratio: 10, targets_bank: true },
    TheftEvent { freq: 27, message: "银行内鬼挪用了你的存款！", ratio: 15, targets_bank: true },
    TheftEvent { freq: 40, message: "你被黑车司机狠狠宰了一刀。", ratio: 5, targets_bank: false },
];

static STOCK_EVENTS: [StockEvent; 8] = [
    StockEvent { freq: 120, message: "燕京地产拿下市中心地王，股价大涨！", stock: StockId(0), percent_change: 30 },
    StockEvent { freq: 150, message: "申城银行爆出坏账丑闻，股价下挫！", stock: StockId(1), percent_change: -25 },
    StockEvent { freq: 90, message: "华夏科技发布新芯片，股价飙升！", stock: StockId(2), percent_change: 40 },
    StockEvent { freq: 200, message: "长江航运遭遇航道封闭，股价下跌！", stock: StockId(3), percent_change: -20 },
    StockEvent { freq: 110, message: "中关村软件被传出财务造假，股价腰斩！", stock: StockId(7), percent_change: -50 },
    StockEvent { freq: 130, message: "外滩传媒独家签下当红明星，股价上扬！", stock: StockId(8), percent_change: 25 },
    StockEvent { freq: 140, message: "西山制药新药获批上市，股价暴涨！", stock: StockId(9), percent_change: 45 },
    StockEvent { freq: 180, message: "东海能源油井事故，股价重挫！", stock: StockId(6), percent_change: -30 },
];

/// Errors found while validating an event table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("{table} event {index}: frequency must be positive")]
    ZeroFrequency { table: &'static str, index: usize },
    #[error("{table} event {index}: good id {good} out of range")]
    InvalidGood {
        table: &'static str,
        index: usize,
        good: usize,
    },
    #[error("{table} event {index}: stock id {stock} out of range")]
    InvalidStock {
        table: &'static str,
        index: usize,
        stock: usize,
    },
    #[error("{table} event {index}: health damage {damage} outside 1..=30")]
    InvalidDamage {
        table: &'static str,
        index: usize,
        damage: i32,
    },
    #[error("{table} event {index}: theft ratio {ratio} outside 1..=100")]
    InvalidRatio {
        table: &'static str,
        index: usize,
        ratio: i64,
    },
}

/// The weighted event tables rolled each turn
#[derive(Debug, Clone, PartialEq)]
pub struct EventCatalog {
    pub commercial: Vec<CommercialEvent>,
    pub health: Vec<HealthEvent>,
    pub theft: Vec<TheftEvent>,
    pub stock: Vec<StockEvent>,
}

impl Default for EventCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl EventCatalog {
    /// The shipped game-balance tables
    pub fn standard() -> Self {
        Self {
            commercial: COMMERCIAL_EVENTS.to_vec(),
            health: HEALTH_EVENTS.to_vec(),
            theft: THEFT_EVENTS.to_vec(),
            stock: STOCK_EVENTS.to_vec(),
        }
    }

    /// Range-check every table entry
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (index, event) in self.commercial.iter().enumerate() {
            check_frequency("commercial", index, event.freq)?;
            if !is_valid_good(event.good) {
                return Err(CatalogError::InvalidGood {
                    table: "commercial",
                    index,
                    good: event.good.0,
                });
            }
        }
        for (index, event) in self.health.iter().enumerate() {
            check_frequency("health", index, event.freq)?;
            if !(1..=30).contains(&event.damage) {
                return Err(CatalogError::InvalidDamage {
                    table: "health",
                    index,
                    damage: event.damage,
                });
            }
        }
        for (index, event) in self.theft.iter().enumerate() {
            check_frequency("theft", index, event.freq)?;
            if !(1..=100).contains(&event.ratio) {
                return Err(CatalogError::InvalidRatio {
                    table: "theft",
                    index,
                    ratio: event.ratio,
                });
            }
        }
        for (index, event) in self.stock.iter().enumerate() {
            check_frequency("stock", index, event.freq)?;
            if event.stock.0 >= STOCK_COUNT {
                return Err(CatalogError::InvalidStock {
                    table: "stock",
                    index,
                    stock: event.stock.0,
                });
            }
        }
        Ok(())
    }
}

fn check_frequency(table: &'static str, index: usize, freq: u32) -> Result<(), CatalogError> {
    if freq == 0 {
        return Err(CatalogError::ZeroFrequency { table, index });
    }
    Ok(())
}

pub fn is_valid_good(good: GoodId) -> bool {
    good.0 < GOOD_COUNT
}

pub fn good(id: GoodId) -> Option<&'static GoodInfo> {
    GOODS.get(id.0)
}

pub fn location(id: LocationId) -> Option<&'static Location> {
    LOCATIONS.get(id.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_is_valid() {
        let catalog = EventCatalog::standard();
        assert_eq!(catalog.commercial.len(), 18);
        assert_eq!(catalog.health.len(), 12);
        assert_eq!(catalog.theft.len(), 7);
        assert_eq!(catalog.validate(), Ok(()));
    }

    #[test]
    fn test_only_last_commercial_event_adds_debt() {
        let catalog = EventCatalog::standard();
        for (index, event) in catalog.commercial.iter().enumerate() {
            if index == 17 {
                assert_eq!(event.extra_debt, 2500);
            } else {
                assert_eq!(event.extra_debt, 0);
            }
        }
    }

    #[test]
    fn test_bank_thefts_are_entries_four_and_five() {
        let catalog = EventCatalog::standard();
        let bank_targets: Vec<usize> = catalog
            .theft
            .iter()
            .enumerate()
            .filter(|(_, e)| e.targets_bank)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(bank_targets, vec![4, 5]);
    }

    #[test]
    fn test_validate_rejects_bad_entries() {
        let mut catalog = EventCatalog::standard();
        catalog.health[3].damage = 31;
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::InvalidDamage { index: 3, .. })
        ));

        let mut catalog = EventCatalog::standard();
        catalog.commercial[0].good = GoodId(8);
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::InvalidGood { good: 8, .. })
        ));

        let mut catalog = EventCatalog::standard();
        catalog.theft[0].ratio = 0;
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_locations_split_evenly_between_cities() {
        let beijing = LOCATIONS.iter().filter(|l| l.city == City::Beijing).count();
        assert_eq!(beijing, 10);
        for (index, loc) in LOCATIONS.iter().enumerate() {
            assert_eq!(loc.id, LocationId(index));
        }
        assert_eq!(GOODS[3].fame_penalty, 10);
        assert_eq!(GOODS[4].fame_penalty, 7);
    }
}
