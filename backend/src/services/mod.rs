pub mod price_cache;
pub mod price_service;
pub mod statistics;
