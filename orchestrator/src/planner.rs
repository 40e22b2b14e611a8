use std::num::NonZeroUsize;

use comms::specs::ShardSpec;

/// Splits `total` items into exactly `num_workers` contiguous shards.
///
/// Every shard holds `ceil(total / num_workers)` items until the items run
/// out. The shard that exhausts them holds the remainder and any shard after
/// it is empty, starting at `total`.
pub fn plan(total: usize, num_workers: NonZeroUsize) -> Vec<ShardSpec> {
    let chunk = total.div_ceil(num_workers.get());
    let mut cursor = 0;

    (0..num_workers.get())
        .map(|_| {
            let count = chunk.min(total - cursor);
            let shard = ShardSpec::new(cursor, count);
            cursor += count;
            shard
        })
        .collect()
}
