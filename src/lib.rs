pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::cli::LocalStorage;
pub use config::static_data::StaticData;
pub use config::toml_config::TomlConfig;
pub use crate::core::{
    branch_loader::BranchDirectoryLoader,
    finder::{FinderEngine, FinderRun},
    pacer::{FixedDelayPacer, NoPacing},
    partition::partition,
    prober::HttpInventoryProber,
    report::{ReportFormat, ReportWriter},
    scanner::{BatchScanner, ScanSettings},
};
pub use domain::model::{
    BranchCode, BranchInfo, BranchRecord, FailedBranchList, InventoryResult, ProbeFailure,
    ProbeOutcome, ProductId, ProductInfo, ScanProgress, ScanReport,
};
pub use utils::error::{Result, StockError};
