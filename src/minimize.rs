//! Basis minimization: shrinking the candidate pool to a small basis by a fixpoint over five passes.
//!
//! 1. Deduplicate identical elements.
//! 2. Remove elements that can be rebuilt exactly from the others.
//! 3. Remove a subset B of a larger A when every target containing B also contains A.
//! 4. Trim overlaps: for A strictly containing B, drop B if both are used by the same targets, otherwise cut B out of A.
//! 5. Remove any element whose removal leaves every target buildable.
//!
//! Each round takes an immutable snapshot, runs the passes in order and stops at the first one that changes something.
//! The changed snapshot is put back into canonical order and the next round starts again from pass 1.
//! Rounds continue until a full round changes nothing.
//!
//! No change is ever applied if it would leave some target unbuildable, and unbreakable elements are never removed or trimmed.
//! Every applied change removes an element or strictly reduces the total coordinate count, so the loop terminates.

use itertools::Itertools;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, trace};

use crate::basis::{canonicalize, dedupe, BasisElement};
use crate::shape::Shape;

/// Run the minimization fixpoint over `pool`.
#[tracing::instrument(level = "debug", skip_all, fields(pool = pool.len(), targets = targets.len()))]
pub fn minimize(pool: Vec<BasisElement>, targets: &[Shape]) -> Vec<BasisElement> {
    let mut basis = canonicalize(pool);
    let mut rounds = 0usize;

    loop {
        rounds += 1;

        let changed = deduplicate(&basis)
            .or_else(|| remove_redundant(&basis, targets))
            .or_else(|| remove_subsumed(&basis, targets))
            .or_else(|| trim_overlaps(&basis, targets))
            .or_else(|| prune_unnecessary(&basis, targets));

        match changed {
            Some(next) => basis = canonicalize(next),
            None => break,
        }
    }

    debug!(rounds, basis = basis.len(), "minimization reached a fixpoint");

    basis
}

/// Whether every target can still be built from `basis`.
pub(crate) fn all_buildable(basis: &[BasisElement], targets: &[Shape]) -> bool {
    targets.iter().all(|target| target.can_make_shape(basis).is_some())
}

/// `basis` without the element at `index`.
fn without_element(basis: &[BasisElement], index: usize) -> Vec<BasisElement> {
    basis.iter()
        .enumerate()
        .filter(|(position, _)| *position != index)
        .map(|(_, element)| element.clone())
        .collect_vec()
}

/// `candidate` if every target is still buildable from it.
fn guarded(candidate: Vec<BasisElement>, targets: &[Shape]) -> Option<Vec<BasisElement>> {
    match all_buildable(&candidate, targets) {
        true => Some(candidate),
        false => None,
    }
}

/// Edge `a -> b` whenever element `a` strictly contains element `b`.
fn containment_graph(basis: &[BasisElement]) -> DiGraphMap<usize, ()> {
    let mut graph = DiGraphMap::with_capacity(basis.len(), basis.len());
    for index in 0..basis.len() {
        graph.add_node(index);
    }

    for (outer, inner) in (0..basis.len()).cartesian_product(0..basis.len()) {
        if basis[outer].len() > basis[inner].len() && basis[outer].shape.contains_all(&basis[inner].shape) {
            graph.add_edge(outer, inner, ());
        }
    }

    graph
}

/// Indices of the targets containing `shape`.
fn users(shape: &Shape, targets: &[Shape]) -> Vec<usize> {
    targets.iter()
        .positions(|target| target.contains_all(shape))
        .collect_vec()
}

/// Pass 1.
fn deduplicate(basis: &[BasisElement]) -> Option<Vec<BasisElement>> {
    let deduped = dedupe(basis.to_vec());
    match deduped.len() == basis.len() {
        true => None,
        false => {
            trace!(removed = basis.len() - deduped.len(), "collapsed identical elements");
            Some(deduped)
        }
    }
}

/// Pass 2.
fn remove_redundant(basis: &[BasisElement], targets: &[Shape]) -> Option<Vec<BasisElement>> {
    basis.iter().enumerate()
        .filter(|(_, element)| !element.unbreakable)
        .find_map(|(index, element)| {
            let others = without_element(basis, index);
            element.shape.can_make_shape(&others)?;
            let next = guarded(others, targets)?;
            trace!(element = %element.shape, "can be built from other elements; removing");
            Some(next)
        })
}

/// Pass 3.
fn remove_subsumed(basis: &[BasisElement], targets: &[Shape]) -> Option<Vec<BasisElement>> {
    containment_graph(basis).all_edges()
        .filter(|(_, inner, _)| !basis[*inner].unbreakable)
        .find_map(|(outer, inner, _)| {
            let outer_shape = &basis[outer].shape;
            let never_alone = targets.iter()
                .filter(|target| target.contains_all(&basis[inner].shape))
                .all(|target| target.contains_all(outer_shape));
            if !never_alone {
                return None;
            }

            let next = guarded(without_element(basis, inner), targets)?;
            trace!(outer = %outer_shape, inner = %basis[inner].shape, "subset never needed apart from its superset; removing");
            Some(next)
        })
}

/// Pass 4.
fn trim_overlaps(basis: &[BasisElement], targets: &[Shape]) -> Option<Vec<BasisElement>> {
    containment_graph(basis).all_edges()
        .find_map(|(outer, inner, _)| {
            let outer_element = &basis[outer];
            let inner_element = &basis[inner];

            if users(&outer_element.shape, targets) == users(&inner_element.shape, targets) {
                if inner_element.unbreakable {
                    return None;
                }
                let next = guarded(without_element(basis, inner), targets)?;
                trace!(outer = %outer_element.shape, inner = %inner_element.shape, "used by the same targets; keeping the larger");
                return Some(next);
            }

            if outer_element.unbreakable {
                return None;
            }

            let remainder = outer_element.shape.without(&inner_element.shape);
            let next = match remainder.is_empty() {
                true => without_element(basis, outer),
                false => {
                    let mut next = basis.to_vec();
                    next[outer].shape = remainder;
                    next
                }
            };
            let next = guarded(next, targets)?;
            trace!(outer = %outer_element.shape, inner = %inner_element.shape, "cutting overlap out of the larger element");
            Some(next)
        })
}

/// Pass 5. Smallest elements are tried first, so larger, more specific pieces are the ones kept.
fn prune_unnecessary(basis: &[BasisElement], targets: &[Shape]) -> Option<Vec<BasisElement>> {
    basis.iter().enumerate().rev()
        .filter(|(_, element)| !element.unbreakable)
        .find_map(|(index, element)| {
            let next = guarded(without_element(basis, index), targets)?;
            trace!(element = %element.shape, "not needed by any target; removing");
            Some(next)
        })
}
