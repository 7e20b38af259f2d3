//! City Trader Library
//!
//! A turn-based Beijing/Shanghai trading game that runs headless. Front ends
//! drive it through `simulation::GameStateManager`.

pub mod simulation;
