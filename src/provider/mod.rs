// Provider module: trait seam plus the Yahoo Finance implementation.

pub mod traits;
pub mod yahoo;

pub use traits::QuoteProvider;
pub use yahoo::YahooProvider;
