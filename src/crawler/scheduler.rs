//! Wave scheduler for bounded-concurrency fetch work
//!
//! Items are split into consecutive waves of at most `batch_size`. Every
//! invocation of a wave runs concurrently on the calling task, and the next
//! wave only starts once the whole current wave has resolved. Peak
//! concurrency is therefore `batch_size`, and one slow response holds up its
//! entire wave.
//!
//! Workers are expected not to fail. If one does, the wave is abandoned,
//! later waves are never started, and the error is returned.

use futures::future::try_join_all;
use std::future::Future;

/// Splits work into fixed-size waves and runs each wave to completion
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    batch_size: usize,
}

impl Scheduler {
    /// Creates a scheduler; a batch size of 0 is treated as 1
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of waves needed for `len` items
    pub fn wave_count(&self, len: usize) -> usize {
        len.div_ceil(self.batch_size)
    }

    /// Runs `worker` over every item and hands each finished wave to `sink`
    ///
    /// `sink` receives the wave's results in item order together with the
    /// index of the wave's first item. It runs sequentially between waves,
    /// never concurrently with workers, and may fail to abort the run.
    pub async fn for_each_wave<T, R, E, F, Fut, S>(
        &self,
        items: &[T],
        worker: F,
        mut sink: S,
    ) -> Result<(), E>
    where
        T: Clone,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        S: FnMut(usize, Vec<R>) -> Result<(), E>,
    {
        let waves = self.wave_count(items.len());

        for (wave, chunk) in items.chunks(self.batch_size).enumerate() {
            tracing::debug!("Starting wave {}/{} ({} items)", wave + 1, waves, chunk.len());

            let results = try_join_all(chunk.iter().cloned().map(&worker)).await?;
            sink(wave * self.batch_size, results)?;

            tracing::info!(
                "Wave {}/{} done: {}/{} items",
                wave + 1,
                waves,
                wave * self.batch_size + chunk.len(),
                items.len()
            );
        }

        Ok(())
    }

    /// Runs `worker` over every item, returning results in item order
    pub async fn run<T, R, E, F, Fut>(&self, items: &[T], worker: F) -> Result<Vec<R>, E>
    where
        T: Clone,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        let mut out = Vec::with_capacity(items.len());
        self.for_each_wave(items, worker, |_, results| {
            out.extend(results);
            Ok(())
        })
        .await?;
        Ok(out)
    }
}

/// Runs `worker` over `items` in waves of at most `batch_size`
///
/// Shorthand for [`Scheduler::run`].
pub async fn run_batched<T, R, E, F, Fut>(
    items: &[T],
    batch_size: usize,
    worker: F,
) -> Result<Vec<R>, E>
where
    T: Clone,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    Scheduler::new(batch_size).run(items, worker).await
}
