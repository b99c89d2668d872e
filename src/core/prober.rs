use crate::domain::model::{BranchCode, ProbeFailure, ProbeOutcome, ProductId};
use crate::domain::ports::{ConfigProvider, InventoryProbe};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct InventoryRequest<'a> {
    branch_number: serde_json::Value,
    product_ids: &'a [ProductId],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventoryResponse {
    inventory_data: InventoryData,
}

#[derive(Debug, Deserialize)]
struct InventoryData {
    items: Vec<InventoryItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventoryItem {
    product_id: ProductId,
    #[serde(default)]
    branch_number: Option<serde_json::Value>,
    available_in_stock: i64,
}

/// Inventory-check client: one POST per branch with the full product list.
#[derive(Debug, Clone)]
pub struct HttpInventoryProber {
    client: Client,
    endpoint: String,
}

impl HttpInventoryProber {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.inventory_endpoint(), config.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, branch: &BranchCode, products: &[ProductId]) -> std::result::Result<Vec<ProductId>, ProbeFailure> {
        let body = InventoryRequest {
            branch_number: branch_number_value(branch),
            product_ids: products,
        };

        tracing::debug!("Probing branch {} at {}", branch, self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeFailure::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(classify_transport_error)?;
        let parsed: InventoryResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ProbeFailure::MalformedBody(e.to_string()))?;

        Ok(in_stock_products(branch, parsed.inventory_data.items))
    }
}

#[async_trait]
impl InventoryProbe for HttpInventoryProber {
    async fn probe(&self, branch: &BranchCode, products: &[ProductId]) -> ProbeOutcome {
        match self.send(branch, products).await {
            Ok(found) => ProbeOutcome::InStock(found),
            Err(failure) => {
                tracing::warn!("Inventory check for branch {} failed: {}", branch, failure);
                ProbeOutcome::Failed(failure)
            }
        }
    }
}

/// Numeric branch codes go out as JSON numbers, anything else as a string.
fn branch_number_value(branch: &str) -> serde_json::Value {
    match branch.parse::<u64>() {
        Ok(n) if n.to_string() == branch => serde_json::Value::from(n),
        _ => serde_json::Value::String(branch.to_string()),
    }
}

fn classify_transport_error(err: reqwest::Error) -> ProbeFailure {
    if err.is_timeout() {
        ProbeFailure::Timeout
    } else if err.is_decode() {
        ProbeFailure::MalformedBody(err.to_string())
    } else {
        ProbeFailure::Transport(err.to_string())
    }
}

fn in_stock_products(branch: &str, items: Vec<InventoryItem>) -> Vec<ProductId> {
    let mut found: Vec<ProductId> = Vec::new();
    for item in items {
        if let Some(reported) = &item.branch_number {
            let reported = match reported {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if reported != branch {
                tracing::debug!(
                    "Branch {} response lists item for branch {}",
                    branch,
                    reported
                );
            }
        }
        if item.available_in_stock > 0 && !found.contains(&item.product_id) {
            found.push(item.product_id);
        }
    }
    found
}
