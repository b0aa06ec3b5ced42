#![warn(missing_docs)]

//! # `slicebasis`
//!
//! Given a family of pixel "slices" (sets of 2D coordinates), find a small collection of building blocks, the basis,
//! such that every slice is exactly the union of some of them.
//! Begin by collecting targets, by hand as [`Shape`]s or with a [`TargetsBuilder`], then call [`solve()`].
//! The result is a [`SolutionMap`] naming the basis and, for every target, which elements rebuild it.
//!
//! # Internals
//! A high level overview is as follows:
//!
//! 1. Every distinct coordinate across all targets becomes a single-coordinate "fundamental".
//! 2. Each fundamental is linked to every coordinate that appears in all targets containing it.
//! Coordinates that always travel together end up in the same linked set.
//! 3. A linked set equal to some target is "unbreakable": that target can not be rebuilt any other way, so the set must be in the basis.
//! 4. Coordinates already supplied by unbreakable elements are stripped out of the remaining linked sets.
//! 5. For every target, each minimal combination of remaining sets covering what the unbreakable elements do not becomes a composite candidate.
//! This is a set cover enumeration, done by one of several [`SearchStrategy`]s, one of which expresses the problem as a Boolean satisfiability problem.
//! 6. The pool is shrunk to a fixpoint by removing duplicates, elements rebuildable from others, subsumed elements, overlaps, and anything unnecessary.
//! Every change is kept only if all targets stay buildable.
//! 7. Finally every target is checked to be exactly buildable, yielding the [`SolutionMap`].
//!
//! The pipeline is synchronous. [`spawn_solve`] runs it on a background thread with cancellation between stages.

pub use basis::{BasisElement, Origin};
pub use builder::{BuilderInvalidReason, TargetsBuilder};
pub use config::{SolverConfig, SolverConfigBuilder};
pub use coordinate::Coordinate;
pub use dispatch::{spawn_solve, CancelToken, SolveHandle};
pub use error::{Diagnostic, Result, SolveError, UnsolvableReport};
pub use search::{CombinationSearch, SearchBudget, SearchStrategy};
pub use shape::Shape;
pub use solution::{can_make_all_shapes, SolutionEntry, SolutionMap};
pub use solver::{solve, Solution, Solver};

mod tests;
pub(crate) mod basis;
pub mod builder;
pub(crate) mod config;
pub(crate) mod coordinate;
pub(crate) mod dispatch;
pub mod error;
pub mod extract;
pub(crate) mod logic;
pub mod minimize;
pub mod search;
pub(crate) mod shape;
pub mod solution;
pub(crate) mod solver;
#[cfg(feature = "wasm")]
pub mod wasm;
