//! Checking that targets can be rebuilt from a basis, and recording how.

use std::fmt::{Display, Formatter};

use itertools::Itertools;
use tracing::debug;

use crate::basis::BasisElement;
use crate::error::UnsolvableReport;
use crate::shape::{blank_canvas, print, Shape};

/// Characters used to display basis elements that carry no tag of their own, in basis order.
const DISPLAYS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// How one target is rebuilt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SolutionEntry {
    /// Position of the target in the input.
    pub target_index: usize,
    /// The target itself.
    pub target: Shape,
    /// Indices into [`SolutionMap::basis`] whose union is exactly `target`.
    ///
    /// Ordered by coordinate count, largest first; equal sizes keep basis order.
    /// Painting the pieces in this order puts smaller pieces on top of larger ones.
    pub pieces: Vec<usize>,
}

/// The published result of a solve: the basis, and for every target the subset of the basis rebuilding it.
///
/// Immutable once built. After any edit to a basis, build a new map with [`can_make_all_shapes`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SolutionMap {
    pub(crate) basis: Vec<BasisElement>,
    pub(crate) entries: Vec<SolutionEntry>,
}

impl SolutionMap {
    /// The basis, in canonical order: largest elements first.
    pub fn basis(&self) -> &[BasisElement] {
        &self.basis
    }

    /// One entry per target, in input order.
    pub fn entries(&self) -> &[SolutionEntry] {
        &self.entries
    }

    /// The basis elements rebuilding the target at `target_index`, in paint order.
    pub fn pieces_of(&self, target_index: usize) -> Option<Vec<&BasisElement>> {
        self.entries.get(target_index)
            .map(|entry| entry.pieces.iter().map(|piece| &self.basis[*piece]).collect_vec())
    }

    /// The character this map displays the basis element at `index` with.
    pub fn display_of(&self, index: usize) -> char {
        self.basis.get(index)
            .and_then(|element| element.shape.tag)
            .or_else(|| DISPLAYS.chars().nth(index % DISPLAYS.len()))
            .unwrap_or('?')
    }

    /// Take the basis out, e.g. to edit it and re-validate with [`can_make_all_shapes`].
    pub fn into_basis(self) -> Vec<BasisElement> {
        self.basis
    }
}

/// Check that every target in `targets` can be built from `basis`, and if so, record how.
///
/// Returns an [`UnsolvableReport`] for the first target that can not be built.
#[tracing::instrument(level = "debug", skip_all, fields(targets = targets.len(), basis = basis.len()))]
pub fn can_make_all_shapes(targets: &[Shape], basis: Vec<BasisElement>) -> Result<SolutionMap, UnsolvableReport> {
    let mut entries = Vec::with_capacity(targets.len());

    for (target_index, target) in targets.iter().enumerate() {
        let Some(mut pieces) = target.can_make_shape(&basis) else {
            let missing = target.missing_from(&basis);
            debug!(target_index, missing = missing.len(), "target can not be built");
            return Err(UnsolvableReport { target_index, target: target.clone(), missing });
        };

        // stable; equal sizes keep basis order
        pieces.sort_by(|a, b| basis[*b].len().cmp(&basis[*a].len()));

        entries.push(SolutionEntry { target_index, target: target.clone(), pieces });
    }

    Ok(SolutionMap { basis, entries })
}

impl Display for SolutionMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "basis ({} elements):", self.basis.len())?;
        for (index, element) in self.basis.iter().enumerate() {
            writeln!(f, "{} x{}{} {}",
                     self.display_of(index),
                     element.len(),
                     if element.unbreakable { " unbreakable" } else { "" },
                     element.shape)?;
        }

        for entry in &self.entries {
            writeln!(f)?;
            writeln!(f, "target {}: {}", entry.target_index, entry.pieces.iter().map(|piece| self.display_of(*piece)).join(""))?;

            match blank_canvas([&entry.target]) {
                Some((origin, mut canvas)) => {
                    for piece in &entry.pieces {
                        self.basis[*piece].shape.paint(&mut canvas, origin, self.display_of(*piece));
                    }
                    write!(f, "{}", print(&canvas))?;
                }
                // too spread out to draw
                None => writeln!(f, "{}", entry.target)?,
            }
        }

        Ok(())
    }
}
