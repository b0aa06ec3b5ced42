use std::fmt::{Display, Formatter};

use crate::shape::Shape;

/// Where a [`BasisElement`] came from.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Origin {
    /// A linked set of always co-occurring coordinates, possibly stripped.
    #[default]
    Linked,
    /// The union of several linked candidates, discovered by combination search.
    Composite,
    /// Supplied from outside the pipeline, e.g. a hand-edited basis being re-validated.
    Provided,
}

/// A reusable building block. Targets are rebuilt as unions of these.
///
/// Unbreakable elements are exactly identical to some target and are never split, trimmed or removed once tagged.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct BasisElement {
    pub(crate) shape: Shape,
    pub(crate) unbreakable: bool,
    pub(crate) origin: Origin,
}

impl BasisElement {
    pub(crate) fn linked(shape: Shape) -> Self {
        Self { shape, unbreakable: false, origin: Origin::Linked }
    }

    pub(crate) fn composite(shape: Shape) -> Self {
        Self { shape, unbreakable: false, origin: Origin::Composite }
    }

    /// Wrap a caller supplied shape, e.g. to re-validate a manually edited basis with [`can_make_all_shapes`](crate::can_make_all_shapes).
    pub fn provided(shape: Shape) -> Self {
        Self { shape, unbreakable: false, origin: Origin::Provided }
    }

    /// The coordinates this element supplies.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Whether this element is exactly some target, and so must be kept whole.
    pub fn is_unbreakable(&self) -> bool {
        self.unbreakable
    }

    /// Which stage produced this element.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Number of coordinates.
    pub fn len(&self) -> usize {
        self.shape.len()
    }

    /// Whether there are no coordinates.
    pub fn is_empty(&self) -> bool {
        self.shape.is_empty()
    }
}

impl AsRef<Shape> for BasisElement {
    fn as_ref(&self) -> &Shape {
        &self.shape
    }
}

impl Display for BasisElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.shape)?;
        if self.unbreakable {
            write!(f, "!")?;
        }
        Ok(())
    }
}

/// Collapse elements with identical coordinates, keeping the first occurrence.
///
/// If any of the collapsed copies was unbreakable, the survivor is unbreakable too.
/// The survivor keeps the first tag found among the copies.
pub(crate) fn dedupe(elements: Vec<BasisElement>) -> Vec<BasisElement> {
    let mut kept: Vec<BasisElement> = Vec::with_capacity(elements.len());

    for element in elements {
        match kept.iter_mut().find(|existing| existing.shape.can_make_shape_exact(&element.shape)) {
            Some(existing) => {
                existing.unbreakable |= element.unbreakable;
                if existing.shape.tag.is_none() {
                    existing.shape.tag = element.shape.tag;
                }
            }
            None => kept.push(element),
        }
    }

    kept
}

/// Sort into canonical order, i.e. [`Shape`]'s ordering: largest first, then lexicographic.
pub(crate) fn canonicalize(mut elements: Vec<BasisElement>) -> Vec<BasisElement> {
    elements.sort_by(|a, b| a.shape.cmp(&b.shape));
    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::Coordinate;

    #[test]
    fn dedupe_keeps_unbreakable_flag() {
        let pair = Shape::new([Coordinate(0, 0), Coordinate(0, 1)]);
        let mut tagged = BasisElement::linked(pair.clone().with_tag('p'));
        tagged.unbreakable = true;

        let deduped = dedupe(vec![BasisElement::composite(pair), tagged]);
        assert_eq!(deduped.len(), 1);
        assert!(deduped[0].unbreakable);
        assert_eq!(deduped[0].origin, Origin::Composite);
        assert_eq!(deduped[0].shape.tag, Some('p'));
    }

    #[test]
    fn provided_element_exposes_its_shape() {
        let element = BasisElement::provided(Shape::new([Coordinate(2, 2), Coordinate(2, 3)]).with_tag('q'));

        assert_eq!(element.shape().tag(), Some('q'));
        assert_eq!(element.shape().coordinates().iter().copied().collect::<Vec<_>>(), vec![Coordinate(2, 2), Coordinate(2, 3)]);
        assert_eq!(element.origin(), Origin::Provided);
        assert!(!element.is_unbreakable());
        assert_eq!(element.len(), 2);
        assert!(!element.is_empty());
    }
}
