pub mod quotes;
pub mod session;
pub mod tabs;
pub mod types;

pub use quotes::{QuoteStore, QUOTES};
pub use session::Session;
pub use tabs::{ChartSession, ChartSlot, TabData, TabStore, TABS};
pub use types::{ParsePeriodError, Period, Symbol};
