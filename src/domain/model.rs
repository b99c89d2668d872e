use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type BranchCode = String;
pub type ProductId = String;

/// One store as listed by the branch locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRecord {
    pub branch_code: BranchCode,
    pub branch_city: String,
    pub branch_name: String,
}

/// Value side of the static branch configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchInfo {
    #[serde(default)]
    pub branch_name: String,
    #[serde(default)]
    pub branch_city: String,
}

impl BranchRecord {
    pub fn into_entry(self) -> (BranchCode, BranchInfo) {
        (
            self.branch_code,
            BranchInfo {
                branch_name: self.branch_name,
                branch_city: self.branch_city,
            },
        )
    }
}

/// Free-form display metadata attached to a product id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductInfo(pub serde_json::Value);

impl ProductInfo {
    pub fn display_name(&self) -> Option<&str> {
        match &self.0 {
            serde_json::Value::String(name) => Some(name),
            serde_json::Value::Object(obj) => obj.get("name").and_then(|v| v.as_str()),
            _ => None,
        }
    }
}

/// Product id → branches currently holding stock.
///
/// Keys are fixed at construction; findings for unknown products are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryResult {
    entries: BTreeMap<ProductId, Vec<BranchCode>>,
}

impl InventoryResult {
    pub fn new<'a, I>(products: I) -> Self
    where
        I: IntoIterator<Item = &'a ProductId>,
    {
        Self {
            entries: products
                .into_iter()
                .map(|id| (id.clone(), Vec::new()))
                .collect(),
        }
    }

    /// Appends `branch` under every known product in `found`.
    /// Returns how many ids were ignored because they are not tracked.
    pub fn record(&mut self, branch: &str, found: &[ProductId]) -> usize {
        let mut ignored = 0;
        for product in found {
            match self.entries.get_mut(product) {
                Some(branches) => branches.push(branch.to_string()),
                None => ignored += 1,
            }
        }
        ignored
    }

    pub fn branches_for(&self, product: &str) -> Option<&[BranchCode]> {
        self.entries.get(product).map(Vec::as_slice)
    }

    pub fn products(&self) -> impl Iterator<Item = &ProductId> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, &Vec<BranchCode>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of (product, branch) hits.
    pub fn hit_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Same content with every branch list sorted; completion order within a
    /// batch is not deterministic, so comparisons across runs go through this.
    pub fn normalized(&self) -> BTreeMap<ProductId, Vec<BranchCode>> {
        self.entries
            .iter()
            .map(|(product, branches)| {
                let mut branches = branches.clone();
                branches.sort();
                (product.clone(), branches)
            })
            .collect()
    }

    pub fn into_inner(self) -> BTreeMap<ProductId, Vec<BranchCode>> {
        self.entries
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedBranch {
    pub branch: BranchCode,
    pub reason: String,
}

/// Branches whose probe did not succeed, in the order they were recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailedBranchList {
    entries: Vec<FailedBranch>,
}

impl FailedBranchList {
    pub fn push(&mut self, branch: &str, reason: impl fmt::Display) {
        self.entries.push(FailedBranch {
            branch: branch.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn codes(&self) -> Vec<BranchCode> {
        self.entries.iter().map(|f| f.branch.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FailedBranch> {
        self.entries.iter()
    }

    pub fn contains(&self, branch: &str) -> bool {
        self.entries.iter().any(|f| f.branch == branch)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    Status(u16),
    Timeout,
    Transport(String),
    MalformedBody(String),
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {}", code),
            Self::Timeout => write!(f, "request timed out"),
            Self::Transport(message) => write!(f, "transport error: {}", message),
            Self::MalformedBody(message) => write!(f, "malformed response: {}", message),
        }
    }
}

/// Result of a single inventory check against one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    InStock(Vec<ProductId>),
    Failed(ProbeFailure),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub inventory: InventoryResult,
    pub failed: FailedBranchList,
    pub branches_scanned: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Progress signal emitted around each batch. Indices are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanProgress {
    BatchStarted {
        index: usize,
        total: usize,
        branches: usize,
    },
    BatchFinished {
        index: usize,
        total: usize,
        in_stock_hits: usize,
        failures: usize,
    },
}
