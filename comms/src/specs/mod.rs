//! Wire-level specifications exchanged between the orchestrator and its workers.

mod shard;

pub use shard::ShardSpec;
