use std::{borrow::Cow, ops::Range, sync::Arc, time::Instant};

use comms::{
    OnoReceiver, OnoSender,
    msg::{Command, Msg, Payload},
    specs::ShardSpec,
};
use log::{debug, info, warn};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    task,
};

use super::Result;
use crate::{error::WorkerErr, metrics::WorkerMetrics, scorer::Scorer};

/// A single unit of execution scoring one shard of the test items.
pub struct Worker {
    worker_id: usize,
    scorer: Arc<dyn Scorer>,
}

impl Worker {
    /// Creates a new worker bound to a read-only scorer.
    ///
    /// # Args
    /// * `worker_id` - Identifier used for observability.
    /// * `scorer` - Shared handle over the data sets and scoring parameters.
    ///
    /// # Returns
    /// A new worker instance.
    pub fn new(worker_id: usize, scorer: Arc<dyn Scorer>) -> Self {
        Self { worker_id, scorer }
    }

    /// Runs the worker to completion over its link to the orchestrator.
    ///
    /// Receives exactly one shard assignment, scores every item in it and
    /// reports the amount of correct predictions as a single message. The
    /// result leg is closed on every exit path. When the worker fails it tries
    /// to report the failure as an error message before closing.
    ///
    /// # Args
    /// * `rx` - Receiving end of the assignment leg.
    /// * `tx` - Sending end of the result leg.
    ///
    /// # Returns
    /// What the worker did with its shard.
    ///
    /// # Errors
    /// Returns `WorkerErr` on I/O failures, protocol violations, invalid shards
    /// or scoring failures.
    pub async fn run<R, W>(self, mut rx: OnoReceiver<R>, mut tx: OnoSender<W>) -> Result<WorkerMetrics>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send,
    {
        let worker_id = self.worker_id;

        let mut metrics = match self.score_assignment(&mut rx).await {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!("worker {worker_id} failed: {e}");
                let msg = Msg::Err(Cow::Owned(e.to_string()));
                if let Err(send_err) = tx.send(&msg).await {
                    debug!("worker {worker_id} could not report its failure: {send_err}");
                }
                if let Err(close_err) = tx.close().await {
                    debug!("worker {worker_id} could not close its result leg: {close_err}");
                }
                return Err(e);
            }
        };

        let start = Instant::now();
        tx.send(&Msg::Data(Payload::Correct(metrics.correct))).await?;
        tx.close().await?;
        metrics.send_time = start.elapsed();

        info!(
            worker_id = worker_id,
            items = metrics.items,
            correct = metrics.correct;
            "worker finished"
        );
        debug!("worker {worker_id} metrics: {metrics:?}");

        Ok(metrics)
    }

    async fn score_assignment<R>(&self, rx: &mut OnoReceiver<R>) -> Result<WorkerMetrics>
    where
        R: AsyncRead + Unpin + Send,
    {
        let start = Instant::now();
        let shard = recv_assignment(rx).await?;
        let recv_time = start.elapsed();

        debug!(
            worker_id = self.worker_id,
            start = shard.start,
            count = shard.count;
            "received assignment"
        );

        let len = self.scorer.len();
        let range = shard
            .range()
            .filter(|range| range.end <= len)
            .ok_or(WorkerErr::ShardOutOfBounds { shard, len })?;

        let mut metrics = if range.is_empty() {
            WorkerMetrics::default()
        } else {
            let scorer = Arc::clone(&self.scorer);
            task::spawn_blocking(move || score_range(scorer.as_ref(), range))
                .await
                .map_err(|e| WorkerErr::Panicked(e.to_string()))??
        };

        metrics.recv_time = recv_time;
        Ok(metrics)
    }
}

/// Waits for the single shard assignment of a worker.
async fn recv_assignment<R>(rx: &mut OnoReceiver<R>) -> Result<ShardSpec>
where
    R: AsyncRead + Unpin + Send,
{
    let mut rx_buf = Vec::new();

    match rx.recv_into(&mut rx_buf).await? {
        Msg::Control(Command::Assign(shard)) => Ok(shard),
        other => Err(WorkerErr::UnexpectedMessage { got: other.kind() }),
    }
}

/// Scores every test item in `range` sequentially.
///
/// # Errors
/// Returns `Scoring` with the index of the first item that couldn't be scored.
pub fn score_range(scorer: &dyn Scorer, range: Range<usize>) -> Result<WorkerMetrics> {
    let start = Instant::now();
    let mut metrics = WorkerMetrics::default();

    for index in range {
        let correct = scorer
            .is_correct(index)
            .map_err(|source| WorkerErr::Scoring { index, source })?;
        metrics.record(correct);
    }

    metrics.compute_time = start.elapsed();
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EvenScorer(usize);

    impl Scorer for EvenScorer {
        fn len(&self) -> usize {
            self.0
        }

        fn is_correct(&self, index: usize) -> knn::Result<bool> {
            Ok(index % 2 == 0)
        }
    }

    #[test]
    fn score_range_counts_hits_in_range_only() {
        let metrics = score_range(&EvenScorer(10), 3..8).unwrap();
        assert_eq!(metrics.items, 5);
        assert_eq!(metrics.correct, 2);
    }

    #[test]
    fn score_range_of_nothing_is_zero() {
        let metrics = score_range(&EvenScorer(10), 4..4).unwrap();
        assert_eq!(metrics.items, 0);
        assert_eq!(metrics.correct, 0);
    }
}
