//! Combination search: discovering which unions of breakable candidates rebuild each target.
//!
//! For a target T, the unbreakable candidates inside T are used as they are.
//! Whatever they leave uncovered, the *residual*, must come from breakable candidates inside T.
//! Every inclusion-minimal set of such candidates covering the residual becomes one composite: the union of that set.
//!
//! Finding those sets is a set cover enumeration and is exponential in the worst case.
//! It sits behind [`CombinationSearch`] so that strategies can be swapped without touching the pipeline;
//! every strategy returns the same covers for the same input, differing only in how they get there.

use std::collections::BTreeSet;
use std::convert::identity;

use itertools::Itertools;
use strum::{Display, EnumString, IntoStaticStr, VariantArray};
use tracing::{debug, trace, warn};
use varisat::{CnfFormula, Lit, Solver, Var};

use crate::basis::{dedupe, BasisElement};
use crate::coordinate::Coordinate;
use crate::error::{BudgetExhausted, SolveError};
use crate::logic::{at_least_one, not_all};
use crate::shape::Shape;

/// Bounds on the combinatorial part of the solve.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SearchBudget {
    /// Most breakable candidates a single target may offer to an exhaustive strategy such as [`PowerSetSearch`].
    pub max_candidates: usize,
    /// Most covers, and so composites, any strategy may produce for a single target.
    pub max_covers: usize,
    /// Accept truncated results instead of failing when a bound is hit. Truncated targets are reported, never hidden.
    pub best_effort: bool,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            max_candidates: 20,
            max_covers: 4096,
            best_effort: false,
        }
    }
}

/// Enumeration of inclusion-minimal covers.
pub trait CombinationSearch {
    /// Short name, for logging.
    fn name(&self) -> &'static str;

    /// Every inclusion-minimal subset of `candidates` whose union contains all of `residual`.
    ///
    /// Subsets are given as ascending indices into `candidates`, and the returned list is sorted.
    /// If no subset covers `residual`, the list is empty.
    fn covers(&self, residual: &Shape, candidates: &[&Shape], budget: &SearchBudget) -> Result<Vec<Vec<usize>>, BudgetExhausted>;
}

/// The built-in [`CombinationSearch`] implementations.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Display, EnumString, IntoStaticStr, VariantArray)]
#[strum(serialize_all = "kebab-case")]
pub enum SearchStrategy {
    /// [`PowerSetSearch`]
    PowerSet,
    /// [`BacktrackingSearch`]
    #[default]
    Backtracking,
    /// [`SatSearch`]
    Sat,
}

impl SearchStrategy {
    /// The search implementing this strategy.
    pub fn searcher(&self) -> Box<dyn CombinationSearch + Send + Sync> {
        match self {
            Self::PowerSet => Box::new(PowerSetSearch),
            Self::Backtracking => Box::new(BacktrackingSearch),
            Self::Sat => Box::new(SatSearch),
        }
    }
}

/// Whether the union of the `subset` of `candidates` contains all of `residual`.
fn covers_residual(residual: &Shape, candidates: &[&Shape], subset: &[usize]) -> bool {
    residual.coordinates.iter()
        .all(|coordinate| subset.iter().any(|index| candidates[*index].contains(coordinate)))
}

/// Whether `subset` covers `residual` and every member covers some coordinate of `residual` no other member does.
fn is_minimal_cover(residual: &Shape, candidates: &[&Shape], subset: &[usize]) -> bool {
    covers_residual(residual, candidates, subset)
        && subset.iter().all(|member| residual.coordinates.iter().any(|coordinate| {
            candidates[*member].contains(coordinate)
                && subset.iter().all(|other| other == member || !candidates[*other].contains(coordinate))
        }))
}

/// Brute force: walk the power set of the candidates in order of increasing size.
///
/// A covering subset is minimal exactly when it contains no smaller cover already found.
/// Refuses outright to enumerate more than [`SearchBudget::max_candidates`] candidates.
#[derive(Clone, Copy, Debug, Default)]
pub struct PowerSetSearch;

impl CombinationSearch for PowerSetSearch {
    fn name(&self) -> &'static str {
        SearchStrategy::PowerSet.into()
    }

    fn covers(&self, residual: &Shape, candidates: &[&Shape], budget: &SearchBudget) -> Result<Vec<Vec<usize>>, BudgetExhausted> {
        if candidates.len() > budget.max_candidates {
            return Err(BudgetExhausted { limit: budget.max_candidates, partial: Vec::new() });
        }

        let mut found: Vec<Vec<usize>> = Vec::new();

        for subset in (0..candidates.len()).powerset() {
            if found.iter().any(|cover| cover.iter().all(|index| subset.contains(index))) {
                continue;
            }

            if covers_residual(residual, candidates, &subset) {
                if found.len() == budget.max_covers {
                    return Err(BudgetExhausted { limit: budget.max_covers, partial: found });
                }
                found.push(subset);
            }
        }

        found.sort();
        Ok(found)
    }
}

/// Depth-first search that branches on the lowest uncovered coordinate.
///
/// Each branch picks one candidate covering that coordinate, and candidates already tried at the same branch point are excluded below it,
/// so every subset is visited at most once.
/// A branch dies as soon as some uncovered coordinate has no remaining candidate.
/// Leaves are kept only if the chosen set is irredundant.
#[derive(Clone, Copy, Debug, Default)]
pub struct BacktrackingSearch;

struct Backtrack<'a> {
    residual: &'a Shape,
    candidates: &'a [&'a Shape],
    budget: &'a SearchBudget,
    found: Vec<Vec<usize>>,
}

impl Backtrack<'_> {
    fn descend(&mut self, uncovered: &BTreeSet<Coordinate>, chosen: &mut Vec<usize>, excluded: &mut Vec<bool>) -> Result<(), usize> {
        let Some(pivot) = uncovered.first() else {
            if is_minimal_cover(self.residual, self.candidates, chosen) {
                if self.found.len() == self.budget.max_covers {
                    return Err(self.budget.max_covers);
                }
                self.found.push(chosen.iter().copied().sorted().collect_vec());
            }
            return Ok(());
        };

        // partial coverage pruning: every uncovered coordinate must still be reachable
        let reachable = uncovered.iter().all(|coordinate| {
            self.candidates.iter().enumerate()
                .any(|(index, candidate)| !excluded[index] && candidate.contains(coordinate))
        });
        if !reachable {
            return Ok(());
        }

        let options = self.candidates.iter()
            .positions(|candidate| candidate.contains(pivot))
            .filter(|index| !excluded[*index])
            .collect_vec();

        for index in &options {
            let remaining: BTreeSet<Coordinate> = uncovered.iter()
                .filter(|coordinate| !self.candidates[*index].contains(coordinate))
                .copied()
                .collect();

            chosen.push(*index);
            excluded[*index] = true;
            let outcome = self.descend(&remaining, chosen, excluded);
            chosen.pop();
            // stays excluded for the siblings that follow

            outcome?;
        }

        for index in options {
            excluded[index] = false;
        }

        Ok(())
    }
}

impl CombinationSearch for BacktrackingSearch {
    fn name(&self) -> &'static str {
        SearchStrategy::Backtracking.into()
    }

    fn covers(&self, residual: &Shape, candidates: &[&Shape], budget: &SearchBudget) -> Result<Vec<Vec<usize>>, BudgetExhausted> {
        let mut search = Backtrack {
            residual,
            candidates,
            budget,
            found: Vec::new(),
        };

        let outcome = search.descend(&residual.coordinates, &mut Vec::new(), &mut vec![false; candidates.len()]);
        let mut found = search.found;
        found.sort();

        match outcome {
            Ok(()) => Ok(found),
            Err(limit) => Err(BudgetExhausted { limit, partial: found }),
        }
    }
}

/// Model enumeration with a SAT solver.
///
/// Each candidate is a variable, and each residual coordinate a clause requiring at least one candidate that covers it.
/// Every model is shrunk to a minimal cover, which is then blocked so that no later model contains it entirely.
/// The solver runs until the formula becomes unsatisfiable.
#[derive(Clone, Copy, Debug, Default)]
pub struct SatSearch;

impl SatSearch {
    /// Drop members of `chosen` one at a time, in order, as long as the rest still covers `residual`.
    fn shrink(residual: &Shape, candidates: &[&Shape], mut chosen: Vec<usize>) -> Vec<usize> {
        let mut position = 0;
        while position < chosen.len() {
            let dropped = chosen.remove(position);
            if !covers_residual(residual, candidates, &chosen) {
                chosen.insert(position, dropped);
                position += 1;
            }
        }

        chosen
    }
}

impl CombinationSearch for SatSearch {
    fn name(&self) -> &'static str {
        SearchStrategy::Sat.into()
    }

    fn covers(&self, residual: &Shape, candidates: &[&Shape], budget: &SearchBudget) -> Result<Vec<Vec<usize>>, BudgetExhausted> {
        let mut clauses = Vec::with_capacity(residual.len());
        for coordinate in &residual.coordinates {
            let covering = candidates.iter()
                .positions(|candidate| candidate.contains(coordinate))
                .map(Var::from_index)
                .collect_vec();

            if covering.is_empty() {
                // unsatisfiable; nothing covers this coordinate
                return Ok(Vec::new());
            }
            clauses.extend(at_least_one(covering));
        }

        let mut solver = Solver::new();
        solver.add_formula(&CnfFormula::from(clauses));

        let mut found: Vec<Vec<usize>> = Vec::new();

        while solver.solve().is_ok_and(identity) {
            let Some(model) = solver.model() else {
                break;
            };

            let chosen = model.iter()
                .filter(|lit| lit.is_positive())
                .map(|lit: &Lit| lit.var().index())
                .filter(|index| *index < candidates.len())
                .sorted()
                .collect_vec();
            let cover = Self::shrink(residual, candidates, chosen);

            if found.len() == budget.max_covers {
                found.sort();
                return Err(BudgetExhausted { limit: budget.max_covers, partial: found });
            }

            solver.add_formula(&CnfFormula::from(not_all(cover.iter().copied().map(Var::from_index).collect_vec())));
            found.push(cover);
        }

        found.sort();
        Ok(found)
    }
}

/// The output of [`combine`].
#[derive(Clone, Debug)]
pub struct Combined {
    /// Unbreakable candidates followed by every composite discovered, deduplicated.
    pub pool: Vec<BasisElement>,
    /// Indices of targets whose search was truncated under [`SearchBudget::best_effort`].
    pub best_effort: Vec<usize>,
}

/// Run `search` for every target and collect the unbreakable candidates plus all composites found into one pool.
///
/// Composites identical to a target carry that target's tag.
/// Fails with [`SolveError::SearchBudgetExceeded`] when a bound is hit, unless the budget allows best-effort results;
/// in that case the covers found so far are used, or, when none were found, the single cover made of every usable candidate.
#[tracing::instrument(level = "debug", skip_all, fields(strategy = search.name(), candidates = candidates.len()))]
pub fn combine(
    candidates: Vec<BasisElement>,
    targets: &[Shape],
    search: &dyn CombinationSearch,
    budget: &SearchBudget,
) -> Result<Combined, SolveError> {
    let (unbreakable, breakable): (Vec<_>, Vec<_>) = candidates.into_iter()
        .partition(|candidate| candidate.unbreakable);

    let mut pool = unbreakable.clone();
    let mut best_effort = Vec::new();

    for (target_index, target) in targets.iter().enumerate() {
        let supplied = Shape::union_of(unbreakable.iter()
            .filter(|piece| target.contains_all(&piece.shape))
            .map(|piece| &piece.shape));
        let residual = target.without(&supplied);

        if residual.is_empty() {
            trace!(target_index, "target rebuilt from unbreakable pieces alone");
            continue;
        }

        // a candidate missing the residual entirely can never be part of a minimal cover
        let relevant = target.contained_indices(&breakable).into_iter()
            .map(|index| &breakable[index].shape)
            .filter(|shape| shape.coordinates.iter().any(|coordinate| residual.contains(coordinate)))
            .collect_vec();

        let covers = match search.covers(&residual, &relevant, budget) {
            Ok(covers) => covers,
            Err(exhausted) if budget.best_effort => {
                warn!(target_index, limit = exhausted.limit, kept = exhausted.partial.len(), "search budget exhausted; keeping best-effort covers");
                best_effort.push(target_index);
                match exhausted.partial.is_empty() {
                    true => vec![(0..relevant.len()).collect_vec()],
                    false => exhausted.partial,
                }
            }
            Err(exhausted) => return Err(SolveError::SearchBudgetExceeded { target_index, limit: exhausted.limit }),
        };

        trace!(target_index, residual = %residual, candidates = relevant.len(), covers = covers.len(), "searched");

        for cover in covers {
            let mut composite = Shape::union_of(cover.iter().map(|index| relevant[*index]));
            if composite.can_make_shape_exact(target) {
                composite.tag = target.tag;
            }
            pool.push(BasisElement::composite(composite));
        }
    }

    let pool = dedupe(pool);
    debug!(pool = pool.len(), truncated = best_effort.len(), "combination search complete");

    Ok(Combined { pool, best_effort })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strum::VariantArray;

    use super::*;

    fn shape(coordinates: &[(i32, i32)]) -> Shape {
        coordinates.iter().copied().map(Coordinate::from).collect()
    }

    fn all_strategies() -> impl Iterator<Item = Box<dyn CombinationSearch + Send + Sync>> {
        SearchStrategy::VARIANTS.iter().map(|strategy| strategy.searcher())
    }

    #[test]
    fn strategies_agree_on_minimal_covers() {
        let residual = shape(&[(0, 0), (1, 0), (2, 0)]);
        let owned = vec![
            shape(&[(0, 0), (1, 0)]),
            shape(&[(1, 0), (2, 0)]),
            shape(&[(0, 0)]),
            shape(&[(2, 0)]),
            shape(&[(0, 0), (1, 0), (2, 0)]),
        ];
        let candidates = owned.iter().collect_vec();

        for search in all_strategies() {
            let covers = search.covers(&residual, &candidates, &SearchBudget::default()).unwrap();
            assert_eq!(covers, vec![
                vec![0, 1],
                vec![0, 3],
                vec![1, 2],
                vec![4],
            ], "strategy {}", search.name());
        }
    }

    #[test]
    fn uncoverable_residual_has_no_covers() {
        let residual = shape(&[(0, 0), (5, 5)]);
        let owned = vec![shape(&[(0, 0)])];
        let candidates = owned.iter().collect_vec();

        for search in all_strategies() {
            assert_eq!(search.covers(&residual, &candidates, &SearchBudget::default()).unwrap(), Vec::<Vec<usize>>::new());
        }
    }

    #[test]
    fn power_set_refuses_too_many_candidates() {
        let owned = (0..8).map(|x| shape(&[(x, 0)])).collect_vec();
        let candidates = owned.iter().collect_vec();
        let residual = Shape::union_of(owned.iter());
        let budget = SearchBudget { max_candidates: 4, ..SearchBudget::default() };

        let exhausted = PowerSetSearch.covers(&residual, &candidates, &budget).unwrap_err();
        assert_eq!(exhausted.limit, 4);
        assert!(exhausted.partial.is_empty());

        // the other strategies are not bounded by candidate count
        assert_eq!(BacktrackingSearch.covers(&residual, &candidates, &budget).unwrap(), vec![(0..8).collect_vec()]);
    }

    #[test]
    fn cover_limit_returns_partial_results() {
        // every coordinate has two interchangeable candidates: 2^3 minimal covers
        let owned = (0..3).flat_map(|x| [shape(&[(x, 0)]), shape(&[(x, 0)]).with_tag('x')]).collect_vec();
        let candidates = owned.iter().collect_vec();
        let residual = shape(&[(0, 0), (1, 0), (2, 0)]);
        let budget = SearchBudget { max_covers: 3, ..SearchBudget::default() };

        for search in all_strategies() {
            let exhausted = search.covers(&residual, &candidates, &budget).unwrap_err();
            assert_eq!(exhausted.limit, 3, "strategy {}", search.name());
            assert_eq!(exhausted.partial.len(), 3, "strategy {}", search.name());
        }
    }

    #[test]
    fn strategy_names_parse() {
        assert_eq!("power-set".parse::<SearchStrategy>().unwrap(), SearchStrategy::PowerSet);
        assert_eq!("sat".parse::<SearchStrategy>().unwrap(), SearchStrategy::Sat);
        assert_eq!(SearchStrategy::Backtracking.to_string(), "backtracking");
        assert!("simplex".parse::<SearchStrategy>().is_err());
    }

    #[test]
    fn combine_yields_composites_for_the_residual() {
        let targets = vec![
            shape(&[(0, 0), (1, 0)]),
            shape(&[(0, 0), (1, 0), (2, 0), (3, 0)]),
        ];
        let mut unbreakable = BasisElement::linked(shape(&[(0, 0), (1, 0)]));
        unbreakable.unbreakable = true;
        let candidates = vec![
            unbreakable,
            BasisElement::linked(shape(&[(2, 0)])),
            BasisElement::linked(shape(&[(3, 0)])),
        ];

        let combined = combine(candidates, &targets, &BacktrackingSearch, &SearchBudget::default()).unwrap();
        assert!(combined.best_effort.is_empty());
        assert_eq!(combined.pool.iter().map(|element| element.shape.clone()).collect_vec(), vec![
            shape(&[(0, 0), (1, 0)]),
            shape(&[(2, 0), (3, 0)]),
        ]);
        assert!(!combined.pool[1].unbreakable);
    }

    #[test]
    fn combine_only_uses_candidates_inside_each_target() {
        let targets = vec![shape(&[(0, 0), (1, 0)]), shape(&[(1, 0), (2, 0)])];
        let candidates = vec![
            BasisElement::linked(shape(&[(0, 0)])),
            BasisElement::linked(shape(&[(1, 0)])),
            BasisElement::linked(shape(&[(2, 0)])),
            // overshoots the first target
            BasisElement::linked(shape(&[(1, 0), (2, 0)])),
        ];

        let combined = combine(candidates, &targets, &BacktrackingSearch, &SearchBudget::default()).unwrap();
        assert_eq!(combined.pool.iter().map(|element| element.shape.clone()).collect_vec(), targets);
    }
}
