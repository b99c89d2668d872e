pub mod branch_loader;
pub mod finder;
pub mod pacer;
pub mod partition;
pub mod prober;
pub mod report;
pub mod scanner;

pub use crate::domain::model::{
    BranchCode, BranchInfo, BranchRecord, FailedBranchList, InventoryResult, ProbeFailure,
    ProbeOutcome, ProductId, ProductInfo, ScanProgress, ScanReport,
};
pub use crate::domain::ports::{ConfigProvider, InventoryProbe, Pacer, Storage};
pub use crate::utils::error::Result;
