use std::{collections::HashMap, num::NonZeroUsize, sync::Arc, time::Duration};

use comms::{
    DuplexRx, DuplexTx,
    msg::{Command, Msg, Payload},
    specs::ShardSpec,
};
use log::{debug, info};
use tokio::{
    task::{self, JoinSet},
    time,
};
use worker::{Scorer, Worker, WorkerMetrics};

use crate::{error::OrchestratorError, planner};

type Result<T> = std::result::Result<T, OrchestratorError>;

/// Bytes each direction of a link can hold unread, far above a single frame.
const LINK_BUF_SIZE: usize = 4096;

/// Lifecycle of an evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loaded,
    Planned,
    Dispatching,
    Awaiting,
    Collecting,
    Done,
    Failed,
}

/// The orchestrator's end of a worker link, kept until results are collected.
struct Link {
    worker_id: usize,
    shard: ShardSpec,
    rx: DuplexRx,
}

/// A single evaluation run over a pair of data sets.
pub struct Session {
    scorer: Option<Arc<dyn Scorer>>,
    num_workers: NonZeroUsize,
    worker_timeout: Option<Duration>,
    phase: Phase,
}

impl Session {
    /// Creates a new `Session` with no data sets bound yet.
    ///
    /// # Arguments
    /// * `num_workers` - How many workers to split the test items among.
    ///
    /// # Returns
    /// A new `Idle` session.
    pub fn new(num_workers: NonZeroUsize) -> Self {
        Self {
            scorer: None,
            num_workers,
            worker_timeout: None,
            phase: Phase::Idle,
        }
    }

    /// Bounds the time spent waiting for every worker to terminate.
    pub fn with_worker_timeout(mut self, worker_timeout: Option<Duration>) -> Self {
        self.worker_timeout = worker_timeout;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Binds the data sets to evaluate, moving the session to `Loaded`.
    ///
    /// # Arguments
    /// * `loader` - Loads both data sets and returns a read-only view over
    ///   them, shared with every worker.
    ///
    /// # Errors
    /// Returns whatever `loader` failed with, leaving the session `Failed`.
    pub fn load<F>(&mut self, loader: F) -> Result<()>
    where
        F: FnOnce() -> Result<Arc<dyn Scorer>>,
    {
        match loader() {
            Ok(scorer) => {
                self.scorer = Some(scorer);
                self.advance(Phase::Loaded);
                Ok(())
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Plans the shards, runs one worker per shard and aggregates their results.
    ///
    /// Results are only read once every worker has terminated.
    ///
    /// # Returns
    /// The amount of correctly classified test items.
    ///
    /// # Errors
    /// Returns the first failure observed, any worker failure aborts the run.
    pub async fn run(&mut self) -> Result<u64> {
        let res = self.drive().await;
        if let Err(e) = &res {
            self.fail(e);
        }
        res
    }

    async fn drive(&mut self) -> Result<u64> {
        let scorer = match (self.phase, &self.scorer) {
            (Phase::Loaded, Some(scorer)) => Arc::clone(scorer),
            (phase, _) => {
                return Err(OrchestratorError::InvalidConfig(format!(
                    "a session can only run once its data sets are loaded, it is {phase:?}"
                )));
            }
        };

        let total = scorer.len();
        let shards = planner::plan(total, self.num_workers);
        self.advance(Phase::Planned);

        self.advance(Phase::Dispatching);
        let mut join_set = JoinSet::new();
        let mut task_ids = HashMap::with_capacity(shards.len());
        let mut links = Vec::with_capacity(shards.len());

        for (worker_id, shard) in shards.into_iter().enumerate() {
            let ((orch_rx, orch_tx), (wk_rx, wk_tx)) = comms::duplex(LINK_BUF_SIZE);

            let worker = Worker::new(worker_id, Arc::clone(&scorer));
            let handle = join_set.spawn(worker.run(wk_rx, wk_tx));
            task_ids.insert(handle.id(), worker_id);

            send_assignment(worker_id, shard, orch_tx).await?;
            links.push(Link {
                worker_id,
                shard,
                rx: orch_rx,
            });
        }
        info!(workers = links.len(), items = total; "dispatched every shard");

        self.advance(Phase::Awaiting);
        let barrier = await_workers(&mut join_set, &task_ids);
        match self.worker_timeout {
            Some(limit) => time::timeout(limit, barrier)
                .await
                .map_err(|_| OrchestratorError::Timeout(limit))??,
            None => barrier.await?,
        }

        self.advance(Phase::Collecting);
        let correct = collect_results(links).await?;
        info!(correct = correct, items = total; "evaluation finished");

        self.advance(Phase::Done);
        Ok(correct)
    }

    fn fail(&mut self, e: &OrchestratorError) {
        debug!("session failed: {e}");
        self.advance(Phase::Failed);
    }

    fn advance(&mut self, next: Phase) {
        debug!("session {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

/// Sends the only assignment of a worker and closes the assignment leg.
async fn send_assignment(worker_id: usize, shard: ShardSpec, mut tx: DuplexTx) -> Result<()> {
    let msg = Msg::Control(Command::Assign(shard));
    let transport = |source| OrchestratorError::Transport { worker_id, source };

    tx.send(&msg).await.map_err(transport)?;
    tx.close().await.map_err(transport)?;

    debug!(
        worker_id = worker_id,
        start = shard.start,
        count = shard.count;
        "assigned shard"
    );
    Ok(())
}

/// Waits until every worker has terminated, in whatever order they do.
///
/// Returns as soon as one of them fails, the rest are aborted when the join
/// set is dropped.
async fn await_workers(
    join_set: &mut JoinSet<worker::Result<WorkerMetrics>>,
    task_ids: &HashMap<task::Id, usize>,
) -> Result<()> {
    let worker_of = |id: task::Id| task_ids.get(&id).copied().unwrap_or_default();

    while let Some(joined) = join_set.join_next_with_id().await {
        match joined {
            Ok((id, Ok(metrics))) => {
                debug!(
                    worker_id = worker_of(id),
                    items = metrics.items;
                    "worker terminated"
                );
            }
            Ok((id, Err(e))) => {
                return Err(OrchestratorError::WorkerFailed {
                    worker_id: worker_of(id),
                    msg: e.to_string(),
                });
            }
            Err(e) => {
                return Err(OrchestratorError::WorkerAborted {
                    worker_id: worker_of(e.id()),
                    msg: e.to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Reads the single result of every link and adds them up.
async fn collect_results(links: Vec<Link>) -> Result<u64> {
    let mut total = 0u64;
    for link in links {
        total += collect_one(link).await?;
    }
    Ok(total)
}

async fn collect_one(link: Link) -> Result<u64> {
    let Link {
        worker_id,
        shard,
        mut rx,
    } = link;
    let mut rx_buf = Vec::new();

    let msg: Msg = rx
        .recv_into(&mut rx_buf)
        .await
        .map_err(|source| OrchestratorError::Transport { worker_id, source })?;

    let correct = match msg {
        Msg::Data(Payload::Correct(correct)) => correct,
        Msg::Err(detail) => {
            return Err(OrchestratorError::WorkerFailed {
                worker_id,
                msg: detail.into_owned(),
            });
        }
        other => {
            return Err(OrchestratorError::Protocol {
                worker_id,
                detail: format!("expected a result, got {}", other.kind()),
            });
        }
    };

    if correct > shard.count as u64 {
        return Err(OrchestratorError::InvalidResult {
            worker_id,
            correct,
            count: shard.count,
        });
    }

    Ok(correct)
}
