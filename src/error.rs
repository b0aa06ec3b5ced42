//! Error and report types.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use thiserror::Error;

use crate::coordinate::Coordinate;
use crate::shape::Shape;

/// Reasons [`solve`](crate::solve) may fail. Nothing is published when any of these is returned.
#[derive(Debug, Error)]
pub enum SolveError {
    /// A target had no coordinates. Rejected before the pipeline starts.
    #[error("target {index} has no coordinates")]
    InvalidShape {
        /// Position of the empty target in the input.
        index: usize,
    },

    /// Combination search for a target needed more than the configured bound allows.
    #[error("combination search for target {target_index} exceeded its budget of {limit}")]
    SearchBudgetExceeded {
        /// Position of the target in the input.
        target_index: usize,
        /// The bound that was hit.
        limit: usize,
    },

    /// Some target can not be rebuilt from the final basis.
    #[error(transparent)]
    Unsolvable(#[from] UnsolvableReport),

    /// The solve was cancelled between two stages.
    #[error("solve was cancelled")]
    Cancelled,

    /// A background solve panicked before producing a result.
    #[error("background solver thread panicked")]
    WorkerPanicked,
}

/// A target that can not be rebuilt from a basis, and the coordinates nothing in the basis could supply.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub struct UnsolvableReport {
    /// Position of the target in the input.
    pub target_index: usize,
    /// The target itself.
    pub target: Shape,
    /// Coordinates of the target no contained basis element covers. Never empty.
    pub missing: BTreeSet<Coordinate>,
}

impl Display for UnsolvableReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "target {} {} can not be rebuilt; missing {}",
               self.target_index, self.target, self.missing.iter().join(""))
    }
}

/// Non-fatal conditions noticed while solving. These indicate a bug rather than bad input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Diagnostic {
    /// A fundamental coordinate was found in no target, even though every fundamental is taken from some target.
    /// The candidate was skipped.
    InternalInconsistency {
        /// The coordinate of the orphaned fundamental.
        coordinate: Coordinate,
    },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::InternalInconsistency { coordinate } =>
                write!(f, "fundamental {} is not present in any target", coordinate),
        }
    }
}

/// Signals that a [`CombinationSearch`](crate::search::CombinationSearch) gave up after hitting a [`SearchBudget`](crate::search::SearchBudget) bound.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BudgetExhausted {
    /// The bound that was hit.
    pub limit: usize,
    /// Covers found before giving up.
    pub partial: Vec<Vec<usize>>,
}

/// Convenience type alias for results using [`SolveError`].
pub type Result<T> = std::result::Result<T, SolveError>;
