mod price_point;
mod stock;

pub use price_point::{PricePoint, PriceSeries};
pub use stock::{AveragePriceResponse, CorrelationResponse, StockListing, StockListingResponse, StockSummary};
