//! Provider adapters implementing [`MarketDataSource`](crate::MarketDataSource).

mod tinvest;

pub use tinvest::{TInvestAdapter, MAX_DAILY_CANDLE_DAYS};
