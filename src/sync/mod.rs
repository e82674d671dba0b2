pub mod loader;
pub mod state;
pub mod stats;

pub use loader::{AggregateLoader, RefreshOutcome};
pub use state::{AccountData, ViewSnapshot, ViewState};
pub use stats::{StatsOutcome, StatsRefresher};
