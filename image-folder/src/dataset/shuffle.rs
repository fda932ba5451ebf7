use crate::common::*;

/// Shuffle buffer settings of a dataset.
///
/// Each pass draws elements uniformly from a reservoir of `buffer_size`
/// elements that is refilled from the ordered records. The `n`-th pass is
/// seeded with `seed + n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShuffleBuffer {
    pub buffer_size: usize,
    pub seed: u64,
}

impl ShuffleBuffer {
    pub const UNBATCHED_BUFFER_SIZE: usize = 1024;
    pub const BATCHES_IN_BUFFER: usize = 8;

    /// The buffer used for datasets yielding batches of `batch_size`, or
    /// single samples if `batch_size` is `None`.
    pub fn for_batch_size(batch_size: Option<NonZeroUsize>, seed: u64) -> Self {
        let buffer_size = batch_size
            .map(|size| size.get() * Self::BATCHES_IN_BUFFER)
            .unwrap_or(Self::UNBATCHED_BUFFER_SIZE);
        Self { buffer_size, seed }
    }

    /// The order in which `len` records are visited in pass `pass`.
    pub fn order(&self, len: usize, pass: u64) -> Vec<usize> {
        buffer_shuffle(len, self.buffer_size, self.seed.wrapping_add(pass))
    }
}

/// Permute `0..len` by streaming it through a shuffle buffer of `buffer_size`.
pub fn buffer_shuffle(len: usize, buffer_size: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut input = 0..len;
    let mut buffer: Vec<usize> = input.by_ref().take(buffer_size.max(1)).collect();
    let mut order = Vec::with_capacity(len);

    while !buffer.is_empty() {
        let slot = rng.gen_range(0..buffer.len());
        match input.next() {
            Some(next) => {
                order.push(buffer[slot]);
                buffer[slot] = next;
            }
            None => {
                order.push(buffer.swap_remove(slot));
            }
        }
    }

    order
}
