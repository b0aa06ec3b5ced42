//! The front half of the pipeline: deriving the initial candidates from the targets alone.
//!
//! 1. [`fundamentals`]: one singleton per distinct coordinate.
//! 2. [`link`]: grow each fundamental into the set of coordinates that always appear alongside it.
//! 3. [`tag_unbreakable`]: mark linked sets that are exactly some target.
//! 4. [`strip`]: cut coordinates supplied by unbreakable sets out of the remaining candidates.

use std::collections::BTreeSet;

use itertools::Itertools;
use tracing::{debug, error, trace};

use crate::basis::{dedupe, BasisElement};
use crate::coordinate::Coordinate;
use crate::error::Diagnostic;
use crate::shape::Shape;

/// One single-coordinate shape for every distinct coordinate found in `targets`, in coordinate order.
#[tracing::instrument(level = "debug", skip_all, fields(targets = targets.len()))]
pub fn fundamentals(targets: &[Shape]) -> Vec<Shape> {
    let distinct: BTreeSet<Coordinate> = targets.iter()
        .flat_map(|target| target.coordinates.iter().copied())
        .collect();

    debug!(count = distinct.len(), "extracted fundamentals");

    distinct.into_iter()
        .map(|coordinate| Shape::new([coordinate]))
        .collect_vec()
}

/// For every fundamental F, intersect the coordinate sets of all targets containing F.
///
/// The result is the largest set of coordinates that is present whenever F is; such coordinates can never be usefully separated.
/// Identical linked sets are kept once.
/// A fundamental found in no target can not be linked; it is skipped and reported as a [`Diagnostic`].
#[tracing::instrument(level = "debug", skip_all, fields(fundamentals = fundamentals.len()))]
pub fn link(fundamentals: &[Shape], targets: &[Shape]) -> (Vec<BasisElement>, Vec<Diagnostic>) {
    let mut linked_pieces: Vec<BasisElement> = Vec::new();
    let mut diagnostics = Vec::new();

    for fundamental in fundamentals {
        let mut involved = targets.iter().filter(|target| target.contains_all(fundamental));

        let Some(first) = involved.next() else {
            // fundamentals are taken from the targets, so this is a bug upstream
            let coordinate = fundamental.coordinates.first().copied().unwrap_or(Coordinate(0, 0));
            error!(%fundamental, "fundamental is not present in any target; skipping");
            diagnostics.push(Diagnostic::InternalInconsistency { coordinate });
            continue;
        };

        let always_present = involved.fold(first.coordinates.clone(), |acc, target| {
            acc.intersection(&target.coordinates).copied().collect()
        });

        let linked = Shape { coordinates: always_present, tag: fundamental.tag };
        if !linked.is_duplicate_of(&linked_pieces) {
            trace!(%fundamental, %linked, "linking");
            linked_pieces.push(BasisElement::linked(linked));
        }
    }

    debug!(count = linked_pieces.len(), "linked pieces remain");

    (linked_pieces, diagnostics)
}

/// Mark every candidate identical to some target as unbreakable.
///
/// An unbreakable candidate takes on the tag of the first target it matches, unless it already has one.
#[tracing::instrument(level = "debug", skip_all, fields(candidates = candidates.len()))]
pub fn tag_unbreakable(candidates: Vec<BasisElement>, targets: &[Shape]) -> Vec<BasisElement> {
    candidates.into_iter()
        .map(|mut candidate| {
            if let Some(target) = targets.iter().find(|target| target.can_make_shape_exact(&candidate.shape)) {
                trace!(candidate = %candidate.shape, "unbreakable");
                candidate.unbreakable = true;
                candidate.shape.tag = candidate.shape.tag.or(target.tag);
            }
            candidate
        })
        .collect_vec()
}

/// Remove coordinates that unbreakable candidates already supply from every breakable candidate.
///
/// A coordinate is only cut from a candidate if every target containing that candidate also contains an unbreakable candidate covering the coordinate,
/// so that each such target can still be rebuilt.
/// Candidates left empty are dropped, and identical survivors collapse.
#[tracing::instrument(level = "debug", skip_all, fields(candidates = candidates.len()))]
pub fn strip(candidates: Vec<BasisElement>, targets: &[Shape]) -> Vec<BasisElement> {
    let (unbreakable, breakable): (Vec<_>, Vec<_>) = candidates.into_iter()
        .partition(|candidate| candidate.unbreakable);

    let mut stripped = unbreakable.clone();

    for mut candidate in breakable {
        let users = targets.iter()
            .filter(|target| target.contains_all(&candidate.shape))
            .collect_vec();

        let supplied = candidate.shape.coordinates.iter()
            .filter(|coordinate| {
                users.iter().all(|target| unbreakable.iter().any(|piece| {
                    piece.shape.contains(coordinate) && target.contains_all(&piece.shape)
                }))
            })
            .copied()
            .collect_vec();

        if supplied.is_empty() {
            stripped.push(candidate);
            continue;
        }

        for coordinate in &supplied {
            candidate.shape.coordinates.remove(coordinate);
        }

        if candidate.is_empty() {
            trace!(coordinates = supplied.len(), "candidate fully supplied by unbreakable pieces; dropping");
        } else {
            trace!(remainder = %candidate.shape, "stripped candidate");
            stripped.push(candidate);
        }
    }

    let stripped = dedupe(stripped);
    debug!(count = stripped.len(), "candidates remain after stripping");

    stripped
}
