use std::time::Duration;

/// What a single worker did with its shard.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkerMetrics {
    pub recv_time: Duration,
    pub compute_time: Duration,
    pub send_time: Duration,

    pub items: u64,
    pub correct: u64,
}

impl WorkerMetrics {
    #[inline]
    pub fn record(&mut self, correct: bool) {
        self.items += 1;
        if correct {
            self.correct += 1;
        }
    }
}
