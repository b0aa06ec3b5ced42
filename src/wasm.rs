//! Browser entry point. Targets cross the boundary as flat `x, y` integer runs.

use itertools::Itertools;
use js_sys::{Array, Int32Array};
use wasm_bindgen::prelude::*;

use crate::coordinate::Coordinate;
use crate::shape::Shape;
use crate::solution::SolutionMap;
use crate::solver::solve;

/// Solve the targets encoded in `coords`, where target `i` owns the next `lengths[i]` `x, y` pairs.
///
/// Returns one `Int32Array` per target holding its pieces' coordinates, flattened the same way, in paint order.
#[wasm_bindgen]
pub fn solve_flat(coords: &[i32], lengths: &[u32]) -> Result<Array, JsValue> {
    let targets = unflatten(coords, lengths).map_err(|message| JsValue::from_str(&message))?;
    let solution = solve(&targets).map_err(|error| JsValue::from_str(&error.to_string()))?;

    let out = Array::new();
    for pieces in flatten_pieces(&solution.map) {
        out.push(&Int32Array::from(pieces.as_slice()));
    }

    Ok(out)
}

fn unflatten(coords: &[i32], lengths: &[u32]) -> Result<Vec<Shape>, String> {
    let expected: usize = lengths.iter().map(|length| *length as usize * 2).sum();
    if expected != coords.len() {
        return Err(format!("lengths describe {} coordinate values but {} were given", expected, coords.len()));
    }

    let mut rest = coords;
    let mut targets = Vec::with_capacity(lengths.len());
    for length in lengths {
        let (this, next) = rest.split_at(*length as usize * 2);
        targets.push(this.chunks_exact(2).map(|pair| Coordinate(pair[0], pair[1])).collect::<Shape>());
        rest = next;
    }

    Ok(targets)
}

fn flatten_pieces(map: &SolutionMap) -> Vec<Vec<i32>> {
    map.entries().iter()
        .map(|entry| entry.pieces.iter()
            .flat_map(|piece| map.basis()[*piece].shape().coordinates().iter())
            .flat_map(|coordinate| [coordinate.0, coordinate.1])
            .collect_vec())
        .collect_vec()
}
