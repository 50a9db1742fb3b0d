pub mod filter;
pub mod level;
pub mod record;

pub use filter::{DateCount, Filter, FindResults, OrderBy, QueryOutcome, RANGE_TOLERANCE_SECS};
pub use level::{Level, LevelSelector};
pub use record::{Record, RecordId};
