use crate::search::{SearchBudget, SearchStrategy};

/// Everything tunable about a solve.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct SolverConfig {
    /// How composites are searched for.
    pub strategy: SearchStrategy,
    /// Bounds on that search.
    pub budget: SearchBudget,
}

impl SolverConfig {
    /// Start from the defaults: [`SearchStrategy::Backtracking`] and a strict [`SearchBudget::default`].
    pub fn builder() -> SolverConfigBuilder {
        SolverConfigBuilder::default()
    }
}

/// Fluent construction of a [`SolverConfig`].
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
#[derive(Clone, Debug, Default)]
pub struct SolverConfigBuilder {
    config: SolverConfig,
}

impl SolverConfigBuilder {
    /// Choose the combination search strategy.
    pub fn strategy(&mut self, strategy: SearchStrategy) -> &mut Self {
        self.config.strategy = strategy;
        self
    }

    /// Bound the number of candidates exhaustive strategies will enumerate per target.
    pub fn max_candidates(&mut self, max_candidates: usize) -> &mut Self {
        self.config.budget.max_candidates = max_candidates;
        self
    }

    /// Bound the number of covers any strategy may produce per target.
    pub fn max_covers(&mut self, max_covers: usize) -> &mut Self {
        self.config.budget.max_covers = max_covers;
        self
    }

    /// Accept truncated search results instead of failing when a bound is hit.
    pub fn best_effort(&mut self, best_effort: bool) -> &mut Self {
        self.config.budget.best_effort = best_effort;
        self
    }

    /// The configuration as set so far.
    pub fn build(&self) -> SolverConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = SolverConfig::builder()
            .strategy(SearchStrategy::Sat)
            .max_covers(7)
            .best_effort(true)
            .build();

        assert_eq!(config.strategy, SearchStrategy::Sat);
        assert_eq!(config.budget.max_covers, 7);
        assert_eq!(config.budget.max_candidates, SearchBudget::default().max_candidates);
        assert!(config.budget.best_effort);
    }
}
