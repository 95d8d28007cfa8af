pub mod columns;
pub mod diff_table;
pub mod intake;
pub mod summary;
pub mod workflow;

pub use crate::domain::model::{CellValue, ResultSet, Row, SummaryCounts};
pub use crate::domain::ports::{ConfigProvider, ReconTransport, Storage};
pub use crate::utils::error::Result;
