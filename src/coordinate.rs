use std::fmt::{Display, Formatter};

use ndarray::Ix;

pub(crate) type Coord = i32;

#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug)]
/// A pixel coordinate `(x, y)`. Unlike a board location, a coordinate may be negative; shapes are not anchored to any grid.
pub struct Coordinate(pub Coord, pub Coord);

impl Coordinate {
    /// Row-major `(row, column)` index of this coordinate inside a grid whose top left corner is `origin`.
    ///
    /// Returns [`None`] if this coordinate lies above or to the left of `origin`.
    pub(crate) fn as_index(&self, origin: Coordinate) -> Option<(Ix, Ix)> {
        let column = Ix::try_from(i64::from(self.0) - i64::from(origin.0)).ok()?;
        let row = Ix::try_from(i64::from(self.1) - i64::from(origin.1)).ok()?;
        Some((row, column))
    }
}

impl From<(Coord, Coord)> for Coordinate {
    fn from(value: (Coord, Coord)) -> Self {
        Self(value.0, value.1)
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_across_the_whole_range() {
        let origin = Coordinate(i32::MIN, 0);
        assert_eq!(Coordinate(i32::MAX, 0).as_index(origin), Ix::try_from(u32::MAX).ok().map(|column| (0, column)));
        assert_eq!(origin.as_index(Coordinate(i32::MAX, 0)), None);
    }
}
