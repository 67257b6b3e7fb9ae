pub mod price_provider;
pub mod stock_exchange;
