//! Batched concurrent scan over the branch list.
//!
//! Branches are split into sequential batches; each batch is split into
//! chunks that run concurrently, and each chunk probes its branches one at a
//! time. Every chunk merges its findings into the shared accumulator in a
//! single critical section.

use crate::core::partition::partition;
use crate::domain::model::{
    BranchCode, FailedBranchList, InventoryResult, ProbeFailure, ProbeOutcome, ProductId,
    ScanProgress, ScanReport,
};
use crate::domain::ports::{InventoryProbe, Pacer};
use crate::utils::error::{Result, StockError};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    pub batch_count: usize,
    pub chunk_count: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            batch_count: 6,
            chunk_count: 3,
        }
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    inventory: InventoryResult,
    failed: FailedBranchList,
}

impl Accumulator {
    fn new(products: &[ProductId]) -> Self {
        Self {
            inventory: InventoryResult::new(products),
            failed: FailedBranchList::default(),
        }
    }

    fn merge(&mut self, findings: ChunkFindings) {
        for (branch, found) in findings.in_stock {
            let ignored = self.inventory.record(&branch, &found);
            if ignored > 0 {
                tracing::debug!(
                    "Branch {} reported {} untracked product(s), ignored",
                    branch,
                    ignored
                );
            }
        }
        for (branch, reason) in findings.failed {
            self.failed.push(&branch, reason);
        }
    }
}

#[derive(Debug, Default)]
struct ChunkFindings {
    in_stock: Vec<(BranchCode, Vec<ProductId>)>,
    failed: Vec<(BranchCode, ProbeFailure)>,
}

pub struct BatchScanner<P: InventoryProbe, Z: Pacer> {
    prober: Arc<P>,
    pacer: Arc<Z>,
    settings: ScanSettings,
    progress: Option<mpsc::UnboundedSender<ScanProgress>>,
}

impl<P, Z> BatchScanner<P, Z>
where
    P: InventoryProbe + 'static,
    Z: Pacer + 'static,
{
    pub fn new(prober: P, pacer: Z, settings: ScanSettings) -> Self {
        Self {
            prober: Arc::new(prober),
            pacer: Arc::new(pacer),
            settings,
            progress: None,
        }
    }

    /// Also send batch progress events to `sender`, in addition to the log lines.
    pub fn with_progress(mut self, sender: mpsc::UnboundedSender<ScanProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn settings(&self) -> ScanSettings {
        self.settings
    }

    /// Probes every branch in `branches` for `products` and returns the merged result.
    ///
    /// Each call starts from a fresh accumulator whose keys are exactly
    /// `products`. Probe failures end up in the report's failed list; only a
    /// chunk task that dies (panics) aborts the scan.
    pub async fn scan(&self, branches: &[BranchCode], products: &[ProductId]) -> Result<ScanReport> {
        let started_at = Utc::now();
        let products: Arc<[ProductId]> = Arc::from(products);
        let accumulator = Arc::new(Mutex::new(Accumulator::new(&products)));

        let batches = partition(branches, self.settings.batch_count);
        let total = batches.len();
        let last_busy = batches.iter().rposition(|b| !b.is_empty());

        for (i, batch) in batches.iter().enumerate() {
            let index = i + 1;
            tracing::info!("Starting batch {}/{} ({} branches)", index, total, batch.len());
            self.emit(ScanProgress::BatchStarted {
                index,
                total,
                branches: batch.len(),
            });

            let (hits_before, failures_before) = {
                let acc = accumulator.lock().await;
                (acc.inventory.hit_count(), acc.failed.len())
            };

            if !batch.is_empty() {
                self.run_batch(index, batch, &products, &accumulator).await?;
            }

            let (hits, failures) = {
                let acc = accumulator.lock().await;
                (
                    acc.inventory.hit_count() - hits_before,
                    acc.failed.len() - failures_before,
                )
            };
            tracing::info!(
                "Finished batch {}/{}: {} in-stock hits, {} failed probes",
                index,
                total,
                hits,
                failures
            );
            self.emit(ScanProgress::BatchFinished {
                index,
                total,
                in_stock_hits: hits,
                failures,
            });

            if matches!(last_busy, Some(last) if i < last) && !batch.is_empty() {
                self.pacer.batch_cooldown().await;
            }
        }

        let acc = std::mem::take(&mut *accumulator.lock().await);
        Ok(ScanReport {
            inventory: acc.inventory,
            failed: acc.failed,
            branches_scanned: branches.len(),
            started_at,
            finished_at: Utc::now(),
        })
    }

    async fn run_batch(
        &self,
        index: usize,
        batch: &[BranchCode],
        products: &Arc<[ProductId]>,
        accumulator: &Arc<Mutex<Accumulator>>,
    ) -> Result<()> {
        let tasks: Vec<_> = partition(batch, self.settings.chunk_count)
            .into_iter()
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| {
                let chunk = chunk.to_vec();
                let prober = Arc::clone(&self.prober);
                let pacer = Arc::clone(&self.pacer);
                let products = Arc::clone(products);
                let accumulator = Arc::clone(accumulator);

                tokio::spawn(async move {
                    let findings = probe_chunk(&*prober, &*pacer, &chunk, &products).await;
                    accumulator.lock().await.merge(findings);
                })
            })
            .collect();

        for joined in futures::future::join_all(tasks).await {
            joined.map_err(|e| StockError::TaskFailed {
                message: format!("batch {} chunk did not complete: {}", index, e),
            })?;
        }
        Ok(())
    }

    fn emit(&self, event: ScanProgress) {
        if let Some(sender) = &self.progress {
            // a dropped receiver only means nobody is listening any more
            let _ = sender.send(event);
        }
    }
}

async fn probe_chunk<P, Z>(
    prober: &P,
    pacer: &Z,
    chunk: &[BranchCode],
    products: &[ProductId],
) -> ChunkFindings
where
    P: InventoryProbe + ?Sized,
    Z: Pacer + ?Sized,
{
    let mut findings = ChunkFindings::default();

    for (i, branch) in chunk.iter().enumerate() {
        let failed = match prober.probe(branch, products).await {
            ProbeOutcome::InStock(found) => {
                tracing::debug!("Branch {}: {} product(s) in stock", branch, found.len());
                findings.in_stock.push((branch.clone(), found));
                false
            }
            ProbeOutcome::Failed(reason) => {
                findings.failed.push((branch.clone(), reason));
                true
            }
        };

        if i + 1 < chunk.len() {
            if failed {
                pacer.failure_backoff().await;
            } else {
                pacer.courtesy_pause().await;
            }
        }
    }

    findings
}
