use tracing::info;

use crate::config::SolverConfig;
use crate::dispatch::CancelToken;
use crate::error::{Diagnostic, Result, SolveError};
use crate::extract;
use crate::minimize;
use crate::search;
use crate::shape::Shape;
use crate::solution::{can_make_all_shapes, SolutionMap};

/// The published output of a successful solve.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Solution {
    /// The basis and how each target is rebuilt from it.
    pub map: SolutionMap,
    /// Targets whose combination search was truncated. Only ever non-empty when best-effort search was requested.
    pub best_effort: Vec<usize>,
    /// Internal inconsistencies noticed and skipped along the way.
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs the whole pipeline with a fixed [`SolverConfig`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    /// A solver using `config` for every solve.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// The configuration this solver was built with.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Find a basis for `targets` and the way each target is rebuilt from it.
    ///
    /// # Pipeline
    /// 1. Reject empty targets.
    /// 2. Extract one fundamental per distinct coordinate.
    /// 3. Link each fundamental to the coordinates that always accompany it.
    /// 4. Tag linked sets identical to a target as unbreakable, then strip what they supply from the rest.
    /// 5. Search for composites rebuilding each target's residual.
    /// 6. Minimize the pool to a fixpoint.
    /// 7. Validate that every target is rebuilt exactly, and map targets to their pieces.
    pub fn solve(&self, targets: &[Shape]) -> Result<Solution> {
        self.solve_with_cancel(targets, &CancelToken::default())
    }

    /// [`solve`](Self::solve), checking `cancel` between stages.
    #[tracing::instrument(level = "debug", skip_all, fields(targets = targets.len(), strategy = %self.config.strategy))]
    pub fn solve_with_cancel(&self, targets: &[Shape], cancel: &CancelToken) -> Result<Solution> {
        if let Some(index) = targets.iter().position(Shape::is_empty) {
            return Err(SolveError::InvalidShape { index });
        }
        cancel.checkpoint("validate")?;

        let fundamentals = extract::fundamentals(targets);
        cancel.checkpoint("extract")?;

        let (linked, diagnostics) = extract::link(&fundamentals, targets);
        cancel.checkpoint("link")?;

        let tagged = extract::tag_unbreakable(linked, targets);
        let stripped = extract::strip(tagged, targets);
        cancel.checkpoint("strip")?;

        let searcher = self.config.strategy.searcher();
        let combined = search::combine(stripped, targets, searcher.as_ref(), &self.config.budget)?;
        cancel.checkpoint("combine")?;

        let basis = minimize::minimize(combined.pool, targets);
        cancel.checkpoint("minimize")?;

        let map = can_make_all_shapes(targets, basis)?;
        info!(targets = targets.len(), basis = map.basis.len(), "solved");

        Ok(Solution {
            map,
            best_effort: combined.best_effort,
            diagnostics,
        })
    }
}

/// Solve `targets` with the default [`SolverConfig`].
pub fn solve(targets: &[Shape]) -> Result<Solution> {
    Solver::default().solve(targets)
}
