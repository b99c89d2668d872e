use crate::domain::model::{BranchCode, BranchInfo, BranchRecord};
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::{Result, StockError};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BranchPage {
    pagination: Pagination,
    store_list: Vec<StoreEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pagination {
    number_of_pages: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreEntry {
    #[serde(deserialize_with = "code_from_string_or_number")]
    branch_code: BranchCode,
    #[serde(default)]
    branch_city: String,
    #[serde(default)]
    branch_name: String,
}

fn code_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<BranchCode, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "branchCode must be a string or number, got {}",
            other
        ))),
    }
}

/// Walks the paginated store locator and collects every branch.
#[derive(Debug, Clone)]
pub struct BranchDirectoryLoader {
    client: Client,
    url_template: String,
}

impl BranchDirectoryLoader {
    /// `url_template` must contain a `{page}` placeholder; pages are 0-based.
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url_template = url_template.into();
        if !url_template.contains("{page}") {
            return Err(StockError::InvalidConfigValueError {
                field: "endpoints.branches_url".to_string(),
                value: url_template,
                reason: "URL must contain a {page} placeholder".to_string(),
            });
        }

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url_template,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.branches_endpoint(), config.request_timeout())
    }

    fn page_url(&self, page: u32) -> String {
        self.url_template.replace("{page}", &page.to_string())
    }

    async fn fetch_page(&self, page: u32) -> Result<BranchPage> {
        let url = self.page_url(page);
        tracing::debug!("Fetching branch page {}: {}", page, url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StockError::UnexpectedResponse {
                endpoint: url,
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| StockError::UnexpectedResponse {
            endpoint: url,
            message: format!("malformed branch page: {}", e),
        })
    }

    pub async fn fetch_all(&self) -> Result<Vec<BranchRecord>> {
        let first = self.fetch_page(0).await?;
        let total_pages = first.pagination.number_of_pages;
        tracing::info!("Branch locator reports {} page(s)", total_pages);

        if total_pages == 0 {
            return Ok(Vec::new());
        }

        let mut stores = first.store_list;
        for page in 1..total_pages {
            let next = self.fetch_page(page).await?;
            stores.extend(next.store_list);
        }

        Ok(stores
            .into_iter()
            .map(|store| BranchRecord {
                branch_code: store.branch_code,
                branch_city: store.branch_city,
                branch_name: store.branch_name,
            })
            .collect())
    }

    /// Branch code → metadata. A code listed twice keeps its last entry.
    pub async fn fetch_directory(&self) -> Result<BTreeMap<BranchCode, BranchInfo>> {
        let records = self.fetch_all().await?;
        let total = records.len();
        let directory: BTreeMap<_, _> = records.into_iter().map(BranchRecord::into_entry).collect();
        if directory.len() < total {
            tracing::warn!(
                "{} duplicate branch code(s) in the locator listing",
                total - directory.len()
            );
        }
        Ok(directory)
    }
}

/// Writes the directory in the static branch-configuration format.
pub async fn save_directory<S: Storage>(
    storage: &S,
    path: &str,
    directory: &BTreeMap<BranchCode, BranchInfo>,
) -> Result<()> {
    let json = serde_json::to_vec_pretty(directory)?;
    storage.write_file(path, &json).await?;
    tracing::info!("Saved {} branches to {}", directory.len(), path);
    Ok(())
}
