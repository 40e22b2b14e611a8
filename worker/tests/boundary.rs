use std::{io, sync::Arc, time::Duration};

use comms::{
    DuplexRx,
    msg::{Command, Msg, Payload},
    specs::ShardSpec,
};
use knn::KnnErr;
use tokio::time::timeout;

use worker::{Scorer, Worker, WorkerErr};

/// Fails the test if the worker ever asks for a score.
struct UntouchableScorer(usize);

impl Scorer for UntouchableScorer {
    fn len(&self) -> usize {
        self.0
    }

    fn is_correct(&self, index: usize) -> knn::Result<bool> {
        panic!("item {index} must not be scored");
    }
}

/// Fails on a given item.
struct FailingScorer {
    len: usize,
    fail_at: usize,
}

impl Scorer for FailingScorer {
    fn len(&self) -> usize {
        self.len
    }

    fn is_correct(&self, index: usize) -> knn::Result<bool> {
        if index == self.fail_at {
            return Err(KnnErr::EmptyTraining);
        }
        Ok(true)
    }
}

async fn assert_no_result_received(orch_rx: &mut DuplexRx) {
    let mut rx_buf = Vec::new();
    let recv_res = timeout(Duration::from_millis(50), orch_rx.recv_into::<Msg>(&mut rx_buf)).await;

    match recv_res {
        Err(_) => {
            // Timeout: no message observed, OK.
        }
        Ok(Err(_)) => {
            // Link closed, OK for this test.
        }
        Ok(Ok(Msg::Data(Payload::Correct(n)))) => {
            panic!("orchestrator unexpectedly received a result: {n}");
        }
        Ok(Ok(Msg::Err(_))) => {
            // The worker reported its failure, OK.
        }
        Ok(Ok(other)) => panic!("unexpected msg: {other:?}"),
    }
}

async fn spawn_worker(
    scorer: Arc<dyn Scorer>,
    msg: Msg<'_>,
) -> (worker::Result<worker::WorkerMetrics>, DuplexRx) {
    let ((orch_rx, mut orch_tx), (wk_rx, wk_tx)) = comms::duplex(4096);

    let worker_task = tokio::spawn(Worker::new(7, scorer).run(wk_rx, wk_tx));

    orch_tx.send(&msg).await.unwrap();
    orch_tx.close().await.unwrap();

    (worker_task.await.unwrap(), orch_rx)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_shard_reports_zero_without_scoring() -> io::Result<()> {
    let scorer = Arc::new(UntouchableScorer(0));
    let msg = Msg::Control(Command::Assign(ShardSpec::new(0, 0)));

    let (res, mut orch_rx) = spawn_worker(scorer, msg).await;
    let metrics = res.unwrap();
    assert_eq!(metrics.items, 0);
    assert_eq!(metrics.correct, 0);

    let mut rx_buf = Vec::new();
    let msg: Msg = orch_rx.recv_into(&mut rx_buf).await?;
    assert_eq!(msg, Msg::Data(Payload::Correct(0)));

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn worker_rejects_shard_out_of_bounds() {
    let scorer = Arc::new(UntouchableScorer(4));
    let msg = Msg::Control(Command::Assign(ShardSpec::new(2, 3)));

    let (res, mut orch_rx) = spawn_worker(scorer, msg).await;
    assert!(matches!(res, Err(WorkerErr::ShardOutOfBounds { len: 4, .. })));

    assert_no_result_received(&mut orch_rx).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn worker_rejects_unexpected_message() {
    let scorer = Arc::new(UntouchableScorer(4));

    let (res, mut orch_rx) = spawn_worker(scorer, Msg::Data(Payload::Correct(1))).await;
    assert!(matches!(
        res,
        Err(WorkerErr::UnexpectedMessage { got: "data/correct" })
    ));

    assert_no_result_received(&mut orch_rx).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn worker_reports_scoring_failures() {
    let scorer = Arc::new(FailingScorer { len: 5, fail_at: 3 });
    let msg = Msg::Control(Command::Assign(ShardSpec::new(0, 5)));

    let (res, mut orch_rx) = spawn_worker(scorer, msg).await;
    assert!(matches!(res, Err(WorkerErr::Scoring { index: 3, .. })));

    let mut rx_buf = Vec::new();
    match orch_rx.recv_into::<Msg>(&mut rx_buf).await.unwrap() {
        Msg::Err(detail) => assert!(detail.contains("item 3")),
        other => panic!("unexpected msg: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_scorer_fails_the_worker() {
    let scorer = Arc::new(UntouchableScorer(2));
    let msg = Msg::Control(Command::Assign(ShardSpec::new(0, 2)));

    let (res, mut orch_rx) = spawn_worker(scorer, msg).await;
    assert!(matches!(res, Err(WorkerErr::Panicked(_))));

    assert_no_result_received(&mut orch_rx).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn worker_fails_when_the_assignment_never_comes() {
    let ((mut orch_rx, mut orch_tx), (wk_rx, wk_tx)) = comms::duplex(4096);
    orch_tx.close().await.unwrap();

    let res = Worker::new(0, Arc::new(UntouchableScorer(1)))
        .run(wk_rx, wk_tx)
        .await;
    assert!(matches!(res, Err(WorkerErr::Io(_))));

    assert_no_result_received(&mut orch_rx).await;
}
