//! popdash: loads a KOSIS two-header population CSV, reshapes it into a
//! long-form (region, year, gender, population) table and answers the
//! dashboard's queries over it.

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod loader;
pub mod output;
pub mod query;
pub mod types;
pub mod util;

pub use cache::{CacheOutcome, TableCache};
pub use config::{DashboardConfig, NormalizeOptions, PeriodPolicy};
pub use error::{FormatError, NormalizeError};
pub use loader::{normalize, normalize_reader, LoadReport};
pub use types::{Direction, Gender, Kpi, Period, PopulationRecord, PopulationTable};
