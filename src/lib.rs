pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::HttpTransport;
pub use config::{cli::LocalStorage, ClientSettings};

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::diff_table::DiffTable;
pub use core::intake::{FileIntake, FileSlot};
pub use core::summary::SummaryView;
pub use core::workflow::{Completion, ReconWorkflow, WorkflowState};
pub use domain::model::{LedgerFile, ReconCategory, RequestMode};
pub use utils::error::{ReconError, Result};
