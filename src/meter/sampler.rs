use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytesize::ByteSize;
use log::{debug, error, info, warn};
use tokio::select;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::estimator::estimate;
use super::provider::RuntimeStatsProvider;
use super::snapshot::Sampler;
use super::types::{MeterState, Rate, Snapshot};
use crate::config::MeterConfig;
use crate::error::{MeterError, Result};

const THREAD_NAME: &str = "alloc-rate-meter";

pub type RateCallback = Box<dyn FnMut(Rate) + Send + 'static>;

/// Background allocation rate meter.
///
/// Samples the provider on a dedicated thread every `interval_ms` and passes
/// each estimated rate to the callback on that same thread. The host never has
/// to join the thread: it exits on its own after [`terminate`](Self::terminate)
/// or a counter-read failure, and it does not keep the process alive.
/// Dropping the handle requests termination.
pub struct AllocationRateMeterHandle {
    config: MeterConfig,
    state: Arc<AtomicU8>,
    cancel: CancellationToken,
    pending: Option<SamplingLoop>,
    thread: Option<JoinHandle<()>>,
}

impl AllocationRateMeterHandle {
    pub fn new<P, F>(provider: P, callback: F) -> Result<Self>
    where
        P: RuntimeStatsProvider,
        F: FnMut(Rate) + Send + 'static,
    {
        Self::with_config(provider, MeterConfig::default(), callback)
    }

    pub fn with_config<P, F>(provider: P, config: MeterConfig, callback: F) -> Result<Self>
    where
        P: RuntimeStatsProvider,
        F: FnMut(Rate) + Send + 'static,
    {
        config.validate()?;

        let state = Arc::new(AtomicU8::new(MeterState::Idle.as_u8()));
        let cancel = CancellationToken::new();
        let provider: Box<dyn RuntimeStatsProvider> = Box::new(provider);
        let pending = SamplingLoop {
            sampler: Sampler::new(provider),
            callback: Box::new(callback),
            interval: config.interval(),
            state: Arc::clone(&state),
            cancel: cancel.clone(),
        };

        Ok(AllocationRateMeterHandle {
            config,
            state,
            cancel,
            pending: Some(pending),
            thread: None,
        })
    }

    /// Starts sampling in the background. The first tick runs immediately and
    /// only seeds the estimator.
    pub fn start(&mut self) -> Result<()> {
        if self.state() != MeterState::Idle {
            return Err(MeterError::NotIdle);
        }
        let sampling_loop = self.pending.take().ok_or(MeterError::NotIdle)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;

        self.set_state(MeterState::Running);
        let spawned = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || runtime.block_on(sampling_loop.run()));

        match spawned {
            Ok(handle) => {
                info!(
                    "allocation rate meter started with an interval of {}ms",
                    self.config.interval_ms
                );
                self.thread = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.set_state(MeterState::Stopped);
                Err(MeterError::Io(err))
            }
        }
    }

    /// Requests a graceful stop. Idempotent, never blocks on the sampling
    /// thread. The request is checked right before every delivery, so only a
    /// callback already in progress can still complete.
    pub fn terminate(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        let _ = self.state.compare_exchange(
            MeterState::Running.as_u8(),
            MeterState::Stopping.as_u8(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        let _ = self.state.compare_exchange(
            MeterState::Idle.as_u8(),
            MeterState::Stopped.as_u8(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        self.cancel.cancel();
        debug!("allocation rate meter termination requested");
    }

    pub fn state(&self) -> MeterState {
        MeterState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// Waits for the sampling thread to exit. Does not request termination
    /// itself, call [`terminate`](Self::terminate) first unless the loop is
    /// expected to stop on a read failure.
    pub fn join(mut self) {
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("allocation rate meter thread panicked");
            }
        }
    }

    fn set_state(&self, state: MeterState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }
}

pub type AllocationRateMeter = AllocationRateMeterHandle;

impl Drop for AllocationRateMeterHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct SamplingLoop {
    sampler: Sampler<Box<dyn RuntimeStatsProvider>>,
    callback: RateCallback,
    interval: Duration,
    state: Arc<AtomicU8>,
    cancel: CancellationToken,
}

impl SamplingLoop {
    async fn run(mut self) {
        let _stopped = StoppedOnExit(Arc::clone(&self.state));
        let mut previous: Option<Snapshot> = None;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let current = match self.sampler.sample() {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    error!("allocation rate meter stopped, {}", err);
                    break;
                }
            };

            if let Some(rate) = estimate(previous.as_ref(), &current) {
                if self.cancel.is_cancelled() {
                    break;
                }
                debug!("allocation rate {}/s", ByteSize(rate.max(0) as u64));
                (self.callback)(rate);
            }

            select! {
                _ = self.cancel.cancelled() => {
                    info!("allocation rate meter terminating");
                    break;
                }
                _ = sleep(self.interval) => {}
            }

            previous = Some(current);
        }
    }
}

// Marks the meter stopped however the loop exits, including a panicking callback.
struct StoppedOnExit(Arc<AtomicU8>);

impl Drop for StoppedOnExit {
    fn drop(&mut self) {
        self.0.store(MeterState::Stopped.as_u8(), Ordering::SeqCst);
    }
}
