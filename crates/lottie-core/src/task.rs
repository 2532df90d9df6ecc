use crate::composition::Composition;
use crate::error::LottieError;
use crate::source::{CompositionLoader, CompositionSpec};
use crossbeam_channel::{bounded, Receiver, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone)]
pub enum CompositionResult {
    Loading,
    Success(Arc<Composition>),
    Fail(Arc<LottieError>),
}

impl CompositionResult {
    pub fn composition(&self) -> Option<&Arc<Composition>> {
        match self {
            CompositionResult::Success(c) => Some(c),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LottieError> {
        match self {
            CompositionResult::Fail(e) => Some(e.as_ref()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, CompositionResult::Loading)
    }
}

/// Loads a composition on a worker thread.
///
/// The host polls the task from its own thread. After `dispose()` the result
/// is frozen and anything the worker delivers later is dropped.
pub struct CompositionTask {
    spec: CompositionSpec,
    rx: Receiver<Result<Arc<Composition>, LottieError>>,
    result: CompositionResult,
    disposed: Arc<AtomicBool>,
}

impl CompositionTask {
    pub fn spawn(loader: Arc<CompositionLoader>, spec: CompositionSpec) -> Self {
        let (tx, rx) = bounded(1);
        let disposed = Arc::new(AtomicBool::new(false));
        let worker_disposed = disposed.clone();
        let worker_spec = spec.clone();

        thread::spawn(move || {
            let result = loader.load(&worker_spec);
            if worker_disposed.load(Ordering::Acquire) {
                tracing::debug!(spec = %worker_spec, "load finished after dispose, dropping");
                return;
            }
            if let Err(e) = &result {
                tracing::warn!(spec = %worker_spec, error = %e, "composition load failed");
            }
            let _ = tx.send(result);
        });

        Self {
            spec,
            rx,
            result: CompositionResult::Loading,
            disposed,
        }
    }

    pub fn spec(&self) -> &CompositionSpec {
        &self.spec
    }

    /// Picks up a finished load, if any, and returns the current result.
    pub fn poll(&mut self) -> &CompositionResult {
        if self.result.is_loading() && !self.is_disposed() {
            match self.rx.try_recv() {
                Ok(outcome) => self.result = into_result(outcome),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => self.result = worker_lost(),
            }
        }
        &self.result
    }

    /// Blocks until the load completes. Returns `Loading` if disposed first.
    pub fn wait(&mut self) -> &CompositionResult {
        if self.result.is_loading() && !self.is_disposed() {
            match self.rx.recv() {
                Ok(outcome) => self.result = into_result(outcome),
                // The worker drops its sender without a result after dispose.
                Err(_) if self.is_disposed() => {}
                Err(_) => self.result = worker_lost(),
            }
        }
        &self.result
    }

    pub fn result(&self) -> &CompositionResult {
        &self.result
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl Drop for CompositionTask {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn into_result(outcome: Result<Arc<Composition>, LottieError>) -> CompositionResult {
    match outcome {
        Ok(c) => CompositionResult::Success(c),
        Err(e) => CompositionResult::Fail(Arc::new(e)),
    }
}

fn worker_lost() -> CompositionResult {
    CompositionResult::Fail(Arc::new(LottieError::InvalidComposition(
        "loader thread exited without a result".to_string(),
    )))
}
