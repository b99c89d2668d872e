use crate::config::static_data::StaticData;
use crate::config::toml_config::DataConfig;
use crate::core::report::ReportWriter;
use crate::core::scanner::BatchScanner;
use crate::domain::model::{BranchCode, ScanReport};
use crate::domain::ports::{InventoryProbe, Pacer, Storage};
use crate::utils::error::Result;

/// Outcome of one finder run: the scan itself plus where the report went.
#[derive(Debug)]
pub struct FinderRun {
    pub report: ScanReport,
    pub data: StaticData,
    pub report_file: Option<&'static str>,
}

/// Load static data, scan, and optionally write a report.
pub struct FinderEngine<S: Storage, P: InventoryProbe, Z: Pacer> {
    storage: S,
    files: DataConfig,
    scanner: BatchScanner<P, Z>,
    writer: Option<ReportWriter<S>>,
}

impl<S, P, Z> FinderEngine<S, P, Z>
where
    S: Storage,
    P: InventoryProbe + 'static,
    Z: Pacer + 'static,
{
    pub fn new(storage: S, files: DataConfig, scanner: BatchScanner<P, Z>) -> Self {
        Self {
            storage,
            files,
            scanner,
            writer: None,
        }
    }

    pub fn with_report_writer(mut self, writer: ReportWriter<S>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub async fn load_data(&self) -> Result<StaticData> {
        StaticData::load(
            &self.storage,
            &self.files.branches_file,
            &self.files.products_file,
        )
        .await
    }

    /// Scans every configured branch, or only `only` when it is non-empty.
    pub async fn run(&self, only: &[BranchCode]) -> Result<FinderRun> {
        println!("Loading branch and product lists...");
        let data = self.load_data().await?;

        let branches = if only.is_empty() {
            data.branch_codes()
        } else {
            data.known_branches(only)
        };
        let products = data.product_ids();

        println!(
            "Scanning {} branches for {} products...",
            branches.len(),
            products.len()
        );
        let report = self.scanner.scan(&branches, &products).await?;
        println!(
            "Scan finished: {} in-stock hits, {} failed branches",
            report.inventory.hit_count(),
            report.failed.len()
        );

        let report_file = match &self.writer {
            Some(writer) => {
                let name = writer.write(&report, &data).await?;
                println!("Report saved to: {}", name);
                Some(name)
            }
            None => None,
        };

        Ok(FinderRun {
            report,
            data,
            report_file,
        })
    }
}
