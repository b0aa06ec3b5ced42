use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use itertools::Itertools;
use ndarray::{Array2, AssignElem};

use crate::coordinate::Coordinate;

/// A set of [`Coordinate`]s, called a "slice" in the problem domain, plus an optional display tag.
///
/// Identity is decided by the coordinate set alone: two shapes with the same coordinates are equal no matter their tags or the order in which the coordinates were given.
/// Shapes are ordered by coordinate count, largest first, then lexicographically by their sorted coordinates.
#[derive(Clone, Debug, Default)]
pub struct Shape {
    pub(crate) coordinates: BTreeSet<Coordinate>,
    pub(crate) tag: Option<char>,
}

impl Shape {
    /// Construct an untagged shape. Duplicate coordinates collapse.
    pub fn new(coordinates: impl IntoIterator<Item = Coordinate>) -> Self {
        Self {
            coordinates: coordinates.into_iter().collect(),
            tag: None,
        }
    }

    /// Attach a display tag. Tags are passed through the solver untouched and never affect identity.
    pub fn with_tag(mut self, tag: char) -> Self {
        self.tag = Some(tag);
        self
    }

    /// The display tag, if any.
    pub fn tag(&self) -> Option<char> {
        self.tag
    }

    /// The coordinates, in sorted order.
    pub fn coordinates(&self) -> &BTreeSet<Coordinate> {
        &self.coordinates
    }

    /// Number of distinct coordinates.
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    /// Whether there are no coordinates.
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Whether `coordinate` is part of this shape.
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.coordinates.contains(coordinate)
    }

    /// Whether every coordinate of `other` is also in `self`.
    pub fn contains_all(&self, other: &Shape) -> bool {
        other.coordinates.is_subset(&self.coordinates)
    }

    /// Attempt to build `self` as the union of some of `candidates`.
    ///
    /// Any candidate with a coordinate outside `self` is discarded, since using it would overshoot.
    /// If the remaining candidates together cover every coordinate of `self`, their indices into `candidates` are returned in order.
    /// Otherwise, at least one coordinate can not be covered and [`None`] is returned.
    pub fn can_make_shape<S: AsRef<Shape>>(&self, candidates: &[S]) -> Option<Vec<usize>> {
        let used = self.contained_indices(candidates);
        let covered: BTreeSet<&Coordinate> = used.iter()
            .flat_map(|index| candidates[*index].as_ref().coordinates.iter())
            .collect();

        match covered.len() == self.len() {
            true => Some(used),
            false => None,
        }
    }

    /// The coordinates of `self` left uncovered after [`can_make_shape`](Self::can_make_shape) filters `candidates`.
    ///
    /// Empty exactly when `can_make_shape` succeeds.
    pub fn missing_from<S: AsRef<Shape>>(&self, candidates: &[S]) -> BTreeSet<Coordinate> {
        let mut missing = self.coordinates.clone();
        for index in self.contained_indices(candidates) {
            for coordinate in &candidates[index].as_ref().coordinates {
                missing.remove(coordinate);
            }
        }

        missing
    }

    /// Indices of the candidates lying entirely inside `self`.
    pub(crate) fn contained_indices<S: AsRef<Shape>>(&self, candidates: &[S]) -> Vec<usize> {
        candidates.iter()
            .positions(|candidate| self.contains_all(candidate.as_ref()))
            .collect_vec()
    }

    /// Whether `self` and `other` hold exactly the same coordinates.
    pub fn can_make_shape_exact(&self, other: &Shape) -> bool {
        self.len() == other.len() && self.contains_all(other)
    }

    /// Whether a shape identical to `self` is already present in `list`.
    pub fn is_duplicate_of<S: AsRef<Shape>>(&self, list: &[S]) -> bool {
        list.iter().any(|existing| self.can_make_shape_exact(existing.as_ref()))
    }

    /// The union of all `shapes`, untagged.
    pub fn union_of<'a>(shapes: impl IntoIterator<Item = &'a Shape>) -> Shape {
        Shape::new(shapes.into_iter().flat_map(|shape| shape.coordinates.iter().copied()))
    }

    /// `self` with every coordinate of `other` removed. The tag is kept.
    pub fn without(&self, other: &Shape) -> Shape {
        Shape {
            coordinates: self.coordinates.difference(&other.coordinates).copied().collect(),
            tag: self.tag,
        }
    }

    /// Top left and bottom right corners of the bounding box of `shapes`, or [`None`] if there are no coordinates at all.
    pub(crate) fn bounds<'a>(shapes: impl IntoIterator<Item = &'a Shape>) -> Option<(Coordinate, Coordinate)> {
        shapes.into_iter()
            .flat_map(|shape| shape.coordinates.iter())
            .fold(None, |acc, c| match acc {
                None => Some((*c, *c)),
                Some((min, max)) => Some((
                    Coordinate(min.0.min(c.0), min.1.min(c.1)),
                    Coordinate(max.0.max(c.0), max.1.max(c.1)),
                )),
            })
    }

    /// Paint `self` with `paint` onto `canvas`, whose top left corner is at `origin`.
    /// Coordinates falling outside the canvas are ignored.
    pub(crate) fn paint(&self, canvas: &mut Array2<char>, origin: Coordinate, paint: char) {
        for coordinate in &self.coordinates {
            if let Some(cell) = coordinate.as_index(origin).and_then(|index| canvas.get_mut(index)) {
                cell.assign_elem(paint);
            }
        }
    }
}

/// Most cells a text canvas may have. Anything sparser is printed as a coordinate list instead.
pub(crate) const MAX_CANVAS_CELLS: u64 = 1 << 16;

/// A blank canvas (filled with `.`) large enough to hold every shape in `shapes`, along with the coordinate of its top left corner.
///
/// [`None`] if there are no coordinates, or if the bounding box has more than [`MAX_CANVAS_CELLS`] cells.
pub(crate) fn blank_canvas<'a>(shapes: impl IntoIterator<Item = &'a Shape>) -> Option<(Coordinate, Array2<char>)> {
    let (min, max) = Shape::bounds(shapes)?;
    let width = u64::from(max.0.abs_diff(min.0)) + 1;
    let height = u64::from(max.1.abs_diff(min.1)) + 1;

    if width.saturating_mul(height) > MAX_CANVAS_CELLS {
        return None;
    }

    let width = usize::try_from(width).ok()?;
    let height = usize::try_from(height).ok()?;
    Some((min, Array2::from_elem((height, width), '.')))
}

/// Dump `canvas` row by row.
pub(crate) fn print(canvas: &Array2<char>) -> String {
    let mut out = String::with_capacity(canvas.nrows() * (canvas.ncols() + 1));

    for row in canvas.rows() {
        for col in row {
            out.push(*col);
        }
        out.push('\n');
    }

    out
}

impl AsRef<Shape> for Shape {
    fn as_ref(&self) -> &Shape {
        self
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.coordinates == other.coordinates
    }
}

impl Eq for Shape {}

impl Hash for Shape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coordinates.hash(state);
    }
}

impl Ord for Shape {
    fn cmp(&self, other: &Self) -> Ordering {
        other.len().cmp(&self.len())
            .then_with(|| self.coordinates.cmp(&other.coordinates))
    }
}

impl PartialOrd for Shape {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromIterator<Coordinate> for Shape {
    fn from_iter<T: IntoIterator<Item = Coordinate>>(iter: T) -> Self {
        Shape::new(iter)
    }
}

impl Display for Shape {
    /// `{(0,0)(1,0)}` normally; an ASCII grid of the bounding box with the alternate flag (`{:#}`).
    ///
    /// Shapes too spread out for a grid, and empty shapes, always use the list form.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            if let Some((origin, mut canvas)) = blank_canvas([self]) {
                self.paint(&mut canvas, origin, self.tag.unwrap_or('#'));
                return write!(f, "{}", print(&canvas));
            }
        }

        write!(f, "{{{}}}", self.coordinates.iter().join(""))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn shape(coordinates: &[(i32, i32)]) -> Shape {
        coordinates.iter().copied().map(Coordinate::from).collect()
    }

    #[test]
    fn identity_ignores_order_duplicates_and_tag() {
        let a = shape(&[(1, 0), (0, 0), (1, 0)]);
        let b = shape(&[(0, 0), (1, 0)]).with_tag('x');
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert!(a.can_make_shape_exact(&b));
        assert!(a.is_duplicate_of(&[shape(&[(5, 5)]), b]));
    }

    #[test]
    fn can_make_shape_discards_overshooting_candidates() {
        let target = shape(&[(0, 0), (1, 0), (2, 0)]);
        let candidates = vec![
            shape(&[(0, 0), (1, 0)]),
            // overshoots into (3, 0)
            shape(&[(2, 0), (3, 0)]),
            shape(&[(2, 0)]),
        ];
        assert_eq!(target.can_make_shape(&candidates), Some(vec![0, 2]));

        let without_single = &candidates[..2];
        assert_eq!(target.can_make_shape(without_single), None);
        assert_eq!(target.missing_from(without_single), [Coordinate(2, 0)].into_iter().collect());
    }

    #[test]
    fn canonical_order_is_size_then_lexicographic() {
        let mut shapes = vec![shape(&[(1, 1)]), shape(&[(0, 0), (0, 1)]), shape(&[(0, 0)])];
        shapes.sort();
        assert_eq!(shapes, vec![shape(&[(0, 0), (0, 1)]), shape(&[(0, 0)]), shape(&[(1, 1)])]);
    }

    #[test]
    fn display_grid() {
        let glyph = shape(&[(0, 0), (2, 0), (1, 1)]);
        assert_eq!(format!("{}", glyph), "{(0,0)(1,1)(2,0)}");
        assert_eq!(format!("{:#}", glyph), "#.#
.#.
");
    }

    #[test]
    fn spread_out_shapes_print_as_lists() {
        let extremes = Shape::new([Coordinate(i32::MIN, 0), Coordinate(i32::MAX, 0)]);
        assert_eq!(format!("{:#}", extremes), format!("{}", extremes));

        let sparse = shape(&[(0, 0), (100_000, 100_000)]);
        assert_eq!(format!("{:#}", sparse), "{(0,0)(100000,100000)}");
        assert_eq!(format!("{:#}", Shape::default()), "{}");
    }

    #[test]
    fn canvas_size_is_capped() {
        // 256 x 256 is exactly the cap
        assert!(blank_canvas([&shape(&[(0, 0), (255, 255)])]).is_some());
        assert!(blank_canvas([&shape(&[(0, 0), (256, 255)])]).is_none());
        assert!(blank_canvas([&Shape::default()]).is_none());
    }
}
