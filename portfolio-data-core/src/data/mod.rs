//! Market data: provider seam, Yahoo Finance implementation, month alignment.

pub mod align;
pub mod provider;
pub mod yahoo;

pub use align::{align_months, month_label, AlignedTable};
pub use provider::{DataError, MarketDataProvider, MonthlyClose, PriceTable};
pub use yahoo::YahooMonthlyProvider;
