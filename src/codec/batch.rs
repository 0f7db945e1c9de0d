//! Runs independent whole-buffer jobs on a worker pool.
//!
//! Architecture:
//! - Main thread: dispatch `(index, input)` jobs over a bounded channel
//! - Worker pool: run the codec on each input
//! - Main thread: collect results by index so output order matches input order

use crossbeam::channel::{bounded, Receiver, Sender};
use log::debug;

use crate::error::{Error, Result};
use crate::{BatchConfig, Codec};

type Job<'a> = (usize, &'a [u8]);
type JobResult = (usize, Result<Vec<u8>>);

/// Applies a [`Codec`] to many buffers, in parallel when configured
pub struct BatchCodec {
    config: BatchConfig,
}

impl BatchCodec {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    fn effective_threads(&self, jobs: usize) -> usize {
        let threads = match self.config.num_threads {
            0 => num_cpus::get().clamp(1, 32),
            n => n.clamp(1, 32),
        };
        threads.min(jobs.max(1))
    }

    /// Run `codec` over every input. Each entry of the returned vector is the
    /// result for the input at the same index; one failure does not affect
    /// the others.
    pub fn process_all<C, T>(&self, codec: &C, inputs: &[T]) -> Result<Vec<Result<Vec<u8>>>>
    where
        C: Codec + Sync,
        T: AsRef<[u8]> + Sync,
    {
        let num_threads = self.effective_threads(inputs.len());
        debug!("processing {} buffers on {} thread(s)", inputs.len(), num_threads);

        if num_threads == 1 {
            return Ok(inputs
                .iter()
                .map(|input| codec.process(input.as_ref()).map(|(out, _)| out))
                .collect());
        }

        self.process_parallel(codec, inputs, num_threads)
    }

    fn process_parallel<C, T>(
        &self,
        codec: &C,
        inputs: &[T],
        num_threads: usize,
    ) -> Result<Vec<Result<Vec<u8>>>>
    where
        C: Codec + Sync,
        T: AsRef<[u8]> + Sync,
    {
        // Channel capacity - enough to keep workers busy without excessive memory
        let channel_capacity = num_threads * 2;

        let (job_tx, job_rx): (Sender<Job<'_>>, Receiver<Job<'_>>) = bounded(channel_capacity);
        let (result_tx, result_rx): (Sender<JobResult>, Receiver<JobResult>) =
            bounded(channel_capacity);

        // Use crossbeam's scoped threads so workers can borrow the inputs
        let result = crossbeam::scope(|scope| {
            for _ in 0..num_threads {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();

                scope.spawn(move |_| worker_thread(codec, job_rx, result_tx));
            }

            // Drop our copies of the channels that workers use
            drop(job_rx);
            drop(result_tx);

            dispatch_and_collect(inputs, job_tx, result_rx)
        });

        result.map_err(|_| Error::Internal("Thread panicked".to_string()))?
    }
}

fn worker_thread<C: Codec>(codec: &C, jobs: Receiver<Job<'_>>, results: Sender<JobResult>) {
    for (id, input) in jobs {
        let result = codec.process(input).map(|(out, _)| out);
        if results.send((id, result)).is_err() {
            break;
        }
    }
}

fn dispatch_and_collect<'a, T: AsRef<[u8]>>(
    inputs: &'a [T],
    job_tx: Sender<Job<'a>>,
    result_rx: Receiver<JobResult>,
) -> Result<Vec<Result<Vec<u8>>>> {
    let mut results: Vec<Option<Result<Vec<u8>>>> = (0..inputs.len()).map(|_| None).collect();

    for (id, input) in inputs.iter().enumerate() {
        let mut job = Some((id, input.as_ref()));

        // Send job, draining results as needed to prevent deadlock
        while let Some(pending) = job {
            crossbeam::channel::select! {
                send(job_tx, pending) -> res => {
                    res.map_err(|_| Error::Internal("Workers disconnected".to_string()))?;
                    job = None;
                }
                recv(result_rx) -> res => {
                    let (done_id, result) = res
                        .map_err(|_| Error::Internal("Result channel disconnected".to_string()))?;
                    results[done_id] = Some(result);
                }
            }
        }
    }

    // Drop job_tx to signal workers we're done
    drop(job_tx);

    for (done_id, result) in result_rx.iter() {
        results[done_id] = Some(result);
    }

    Ok(results
        .into_iter()
        .map(|r| r.unwrap_or_else(|| Err(Error::Internal("Missing job result".to_string()))))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Compressor, Decompressor};

    fn sample_inputs() -> Vec<Vec<u8>> {
        (0..20)
            .map(|i| {
                let word = format!("buffer-{}-", i);
                word.as_bytes().iter().cycle().take(500 + i * 37).copied().collect()
            })
            .collect()
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let inputs = sample_inputs();
        let compressor = Compressor::default();

        let parallel = BatchCodec::new(BatchConfig { num_threads: 4 })
            .process_all(&compressor, &inputs)
            .unwrap();
        let sequential = BatchCodec::new(BatchConfig { num_threads: 1 })
            .process_all(&compressor, &inputs)
            .unwrap();

        assert_eq!(parallel.len(), inputs.len());
        for (p, s) in parallel.iter().zip(&sequential) {
            assert_eq!(p.as_ref().unwrap(), s.as_ref().unwrap());
        }
    }

    #[test]
    fn test_parallel_roundtrip() {
        let inputs = sample_inputs();
        let batch = BatchCodec::new(BatchConfig { num_threads: 3 });

        let compressed: Vec<Vec<u8>> = batch
            .process_all(&Compressor::default(), &inputs)
            .unwrap()
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        let restored = batch.process_all(&Decompressor::default(), &compressed).unwrap();

        for (original, result) in inputs.iter().zip(restored) {
            assert_eq!(&result.unwrap(), original);
        }
    }

    #[test]
    fn test_failures_are_per_job() {
        let good = crate::compress(b"fine fine fine fine").unwrap();
        let inputs = vec![good.clone(), vec![0x10, 0x01, 0x00, 0x00, 0x00, 0x00], good];

        let results = BatchCodec::new(BatchConfig { num_threads: 2 })
            .process_all(&Decompressor::default(), &inputs)
            .unwrap();

        assert_eq!(results[0].as_ref().unwrap(), b"fine fine fine fine");
        assert!(matches!(results[1], Err(Error::FormatMismatch { found: 0x10 })));
        assert_eq!(results[2].as_ref().unwrap(), b"fine fine fine fine");
    }

    #[test]
    fn test_empty_batch() {
        let inputs: Vec<Vec<u8>> = Vec::new();
        let results = BatchCodec::new(BatchConfig::default())
            .process_all(&Compressor::default(), &inputs)
            .unwrap();
        assert!(results.is_empty());
    }
}
