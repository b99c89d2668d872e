use crate::config::static_data::StaticData;
use crate::domain::model::ScanReport;
use crate::domain::ports::Storage;
use crate::utils::error::{Result, StockError};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
}

impl ReportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Json => "stock_report.json",
            Self::Csv => "stock_report.csv",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(StockError::InvalidConfigValueError {
                field: "output.format".to_string(),
                value: other.to_string(),
                reason: "Valid formats: json, csv".to_string(),
            }),
        }
    }
}

pub struct ReportWriter<S: Storage> {
    storage: S,
    format: ReportFormat,
}

impl<S: Storage> ReportWriter<S> {
    pub fn new(storage: S, format: ReportFormat) -> Self {
        Self { storage, format }
    }

    /// Renders and stores the report; returns the file name it was written under.
    pub async fn write(&self, report: &ScanReport, data: &StaticData) -> Result<&'static str> {
        let bytes = match self.format {
            ReportFormat::Json => serde_json::to_vec_pretty(report)?,
            ReportFormat::Csv => render_csv(report, data)?,
        };

        let name = self.format.file_name();
        tracing::debug!("Writing {} byte report to {}", bytes.len(), name);
        self.storage.write_file(name, &bytes).await?;
        Ok(name)
    }
}

/// One row per (product, branch) hit. Products without stock still get a
/// row, with empty branch columns.
pub fn render_csv(report: &ScanReport, data: &StaticData) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "product_id",
        "product_name",
        "branch_code",
        "branch_name",
        "branch_city",
    ])?;

    for (product, branches) in report.inventory.iter() {
        let product_name = data.product_name(product);
        if branches.is_empty() {
            writer.write_record([product.as_str(), product_name, "", "", ""])?;
            continue;
        }
        for branch in branches {
            let (name, city) = data
                .branch(branch)
                .map(|b| (b.branch_name.as_str(), b.branch_city.as_str()))
                .unwrap_or(("", ""));
            writer.write_record([product.as_str(), product_name, branch.as_str(), name, city])?;
        }
    }

    writer.into_inner().map_err(|e| StockError::IoError(e.into_error()))
}
