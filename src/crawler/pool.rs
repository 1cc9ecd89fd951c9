//! Detail fetch pool
//!
//! Handles one listing page: a fixed number of workers fetch its detail
//! pages concurrently and the dispatcher writes each result back into the
//! slot of the task that produced it, so the page comes out in listing order
//! however the fetches interleave.
//!
//! Each worker owns a one-slot task channel and all workers share one
//! outcome channel. A worker reports exactly one outcome per task, which
//! also tells the dispatcher that the worker is idle again.

use crate::config::{CrawlerConfig, DetailErrorPolicy};
use crate::crawler::{DetailTask, DocumentFetcher, Extractor, FetchError, PageResult, Record};
use crate::{CrawlError, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Result of one detail task, reported by the worker that ran it
struct TaskOutcome {
    worker: usize,
    index: usize,
    url: String,
    result: std::result::Result<Vec<Record>, FetchError>,
}

/// Fetches the detail pages of one listing page with a bounded set of workers
#[derive(Clone)]
pub struct DetailPool {
    fetcher: Arc<dyn DocumentFetcher>,
    extractor: Arc<Extractor>,
    workers: usize,
    policy: DetailErrorPolicy,
}

impl DetailPool {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        extractor: Arc<Extractor>,
        workers: usize,
        policy: DetailErrorPolicy,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            workers: workers.max(1),
            policy,
        }
    }

    pub fn from_config(
        fetcher: Arc<dyn DocumentFetcher>,
        extractor: Arc<Extractor>,
        config: &CrawlerConfig,
    ) -> Self {
        Self::new(
            fetcher,
            extractor,
            config.detail_workers,
            config.detail_error_policy,
        )
    }

    /// Fetches every task of `page` and returns one slot per task
    ///
    /// Returns only after every task has reported. Under
    /// [`DetailErrorPolicy::Skip`] a failed fetch leaves its slot `None`;
    /// under [`DetailErrorPolicy::Fatal`] the first failure is returned and
    /// the remaining workers are aborted.
    pub async fn handle_page(&self, page: u32, tasks: Vec<DetailTask>) -> Result<PageResult> {
        let expected = tasks.len();
        let mut slots: Vec<Option<Record>> = vec![None; expected];
        if expected == 0 {
            return Ok(PageResult::new(page, slots));
        }

        let worker_count = self.workers.min(expected);
        let (outcome_tx, mut outcome_rx) = mpsc::channel(worker_count);
        let mut workers = JoinSet::new();
        let mut task_txs = Vec::with_capacity(worker_count);

        for worker in 0..worker_count {
            let (task_tx, task_rx) = mpsc::channel(1);
            task_txs.push(task_tx);
            workers.spawn(run_worker(
                worker,
                task_rx,
                outcome_tx.clone(),
                Arc::clone(&self.fetcher),
                Arc::clone(&self.extractor),
            ));
        }
        drop(outcome_tx);

        let mut idle: VecDeque<usize> = (0..worker_count).collect();
        let mut pending = tasks.into_iter().peekable();
        let mut received = 0;

        while received < expected {
            // An idle worker's channel is empty, so this send never waits
            if pending.peek().is_some() {
                if let Some(worker) = idle.pop_front() {
                    if let Some(task) = pending.next() {
                        task_txs[worker]
                            .send(task)
                            .await
                            .map_err(|_| CrawlError::WorkerLost { page })?;
                    }
                    continue;
                }
            }

            let outcome = tokio::select! {
                biased;
                outcome = outcome_rx.recv() => outcome.ok_or(CrawlError::WorkerLost { page })?,
                Some(joined) = workers.join_next() => {
                    if let Err(e) = joined {
                        tracing::error!("Detail worker for page {} died: {}", page, e);
                    }
                    return Err(CrawlError::WorkerLost { page });
                }
            };

            received += 1;
            idle.push_back(outcome.worker);
            self.place(page, &mut slots, outcome)?;
        }

        // Closing the task channels lets every worker exit its loop
        drop(task_txs);
        while workers.join_next().await.is_some() {}

        Ok(PageResult::new(page, slots))
    }

    /// Writes one outcome into its slot, applying the error policy
    fn place(
        &self,
        page: u32,
        slots: &mut [Option<Record>],
        outcome: TaskOutcome,
    ) -> Result<()> {
        let len = slots.len();
        let slot = slots
            .get_mut(outcome.index)
            .ok_or(CrawlError::SlotOutOfRange {
                page,
                index: outcome.index,
                len,
            })?;

        match outcome.result {
            // Several address elements: the last one in document order wins
            Ok(records) => match records.into_iter().last() {
                Some(record) => *slot = Some(record),
                None => tracing::warn!(
                    "No address found on {} (page {}, slot {})",
                    outcome.url,
                    page,
                    outcome.index
                ),
            },
            Err(source) => match self.policy {
                DetailErrorPolicy::Fatal => {
                    return Err(CrawlError::DetailFetch {
                        page,
                        index: outcome.index,
                        url: outcome.url,
                        source,
                    });
                }
                DetailErrorPolicy::Skip => {
                    tracing::warn!(
                        "Skipping detail {} of page {}: {}",
                        outcome.index,
                        page,
                        source
                    );
                }
            },
        }

        Ok(())
    }
}

/// Fetches tasks from `tasks` until the channel closes
async fn run_worker(
    worker: usize,
    mut tasks: mpsc::Receiver<DetailTask>,
    outcomes: mpsc::Sender<TaskOutcome>,
    fetcher: Arc<dyn DocumentFetcher>,
    extractor: Arc<Extractor>,
) {
    while let Some(task) = tasks.recv().await {
        tracing::debug!("Worker {} fetching {}", worker, task.url);

        let result = fetcher
            .fetch(&task.url)
            .await
            .map(|document| extractor.detail_records(&document, task.price.as_deref()));

        let outcome = TaskOutcome {
            worker,
            index: task.index,
            url: task.url,
            result,
        };

        if outcomes.send(outcome).await.is_err() {
            break;
        }
    }
}
