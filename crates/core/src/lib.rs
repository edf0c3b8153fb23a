#![forbid(unsafe_code)]

pub mod config;
pub mod model;
pub mod rng;
pub mod time;
pub mod turn;
pub mod unlock;

pub use config::{HubConfig, TurnConfig};
pub use rng::RandomSource;
pub use time::Clock;
