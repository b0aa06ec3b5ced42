//! Running a solve off the caller's thread.
//!
//! The pipeline itself is synchronous. [`spawn_solve`] moves it onto a background thread so an interactive caller is not blocked,
//! and a [`CancelToken`] lets the caller abandon it. Cancellation is only observed between pipeline stages.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::debug;

use crate::config::SolverConfig;
use crate::error::{Result, SolveError};
use crate::shape::Shape;
use crate::solver::{Solution, Solver};

/// A shared flag requesting that a solve stop at the next stage boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone of this token sees it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// [`SolveError::Cancelled`] if cancellation was requested.
    pub(crate) fn checkpoint(&self, stage: &'static str) -> Result<()> {
        match self.is_cancelled() {
            true => {
                debug!(stage, "cancelled");
                Err(SolveError::Cancelled)
            }
            false => Ok(()),
        }
    }
}

/// A solve running on a background thread.
pub struct SolveHandle {
    cancel: CancelToken,
    join: JoinHandle<Result<Solution>>,
}

impl SolveHandle {
    /// Ask the solve to stop. It will return [`SolveError::Cancelled`] at the next stage boundary, unless it has already finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the solve has returned, so that [`join`](Self::join) will not block.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the solve. Either the whole result is returned or an error; never a partial solution.
    pub fn join(self) -> Result<Solution> {
        self.join.join().unwrap_or(Err(SolveError::WorkerPanicked))
    }
}

/// Solve `targets` with `config` on a new background thread.
pub fn spawn_solve(targets: Vec<Shape>, config: SolverConfig) -> std::io::Result<SolveHandle> {
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();

    let join = std::thread::Builder::new()
        .name("slicebasis-solve".into())
        .spawn(move || Solver::new(config).solve_with_cancel(&targets, &worker_cancel))?;

    Ok(SolveHandle { cancel, join })
}
