use crate::domain::model::{BranchCode, ProbeOutcome, ProductId};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn inventory_endpoint(&self) -> &str;
    fn branches_endpoint(&self) -> &str;
    fn request_timeout(&self) -> Duration;
}

/// One inventory check for one branch. Never fails the caller: every error
/// is folded into [`ProbeOutcome::Failed`].
#[async_trait]
pub trait InventoryProbe: Send + Sync {
    async fn probe(&self, branch: &BranchCode, products: &[ProductId]) -> ProbeOutcome;
}

/// Pacing policy applied by the scanner around probes and batches.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Between two successful probes inside a chunk.
    async fn courtesy_pause(&self);
    /// After a failed probe, in place of the courtesy pause.
    async fn failure_backoff(&self);
    /// Between two batches.
    async fn batch_cooldown(&self);
}

#[async_trait]
impl<T: Pacer + ?Sized> Pacer for std::sync::Arc<T> {
    async fn courtesy_pause(&self) {
        (**self).courtesy_pause().await
    }

    async fn failure_backoff(&self) {
        (**self).failure_backoff().await
    }

    async fn batch_cooldown(&self) {
        (**self).batch_cooldown().await
    }
}

#[async_trait]
impl<T: InventoryProbe + ?Sized> InventoryProbe for std::sync::Arc<T> {
    async fn probe(&self, branch: &BranchCode, products: &[ProductId]) -> ProbeOutcome {
        (**self).probe(branch, products).await
    }
}
