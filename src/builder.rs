//! Building target collections by hand or from ASCII glyphs.

use itertools::Itertools;

use crate::coordinate::{Coord, Coordinate};
use crate::shape::Shape;

/// Reasons a builder may become invalid while building.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BuilderInvalidReason {
    /// The target at `index` has no coordinates.
    EmptyShape {
        /// Position of the target in the builder.
        index: usize,
    },
    /// A glyph for the target at `index` contained `character`, which is neither empty space, `#`, nor the target's tag.
    GlyphBadCharacter {
        /// Position the glyph's target would have taken.
        index: usize,
        /// The offending character.
        character: char,
    },
}

/// Validated construction of a collection of targets.
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
/// Once invalid, a builder stays invalid and further additions do nothing.
#[derive(Clone, Debug, Default)]
pub struct TargetsBuilder {
    targets: Vec<Shape>,
    invalid_reasons: Vec<BuilderInvalidReason>,
}

impl TargetsBuilder {
    /// An empty, valid builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target made of `coordinates`, optionally tagged for display.
    ///
    /// May cause the builder to enter an [`EmptyShape`](BuilderInvalidReason::EmptyShape) invalid state if `coordinates` is empty.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn add_target(&mut self, tag: Option<char>, coordinates: impl IntoIterator<Item = Coordinate>) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        let index = self.targets.len();
        let shape = Shape::new(coordinates);
        if shape.is_empty() {
            self.invalid_reasons.push(BuilderInvalidReason::EmptyShape { index });
            return self;
        }

        self.targets.push(match tag {
            Some(tag) => shape.with_tag(tag),
            None => shape,
        });
        self
    }

    /// Add a target drawn as ASCII art.
    ///
    /// `#`, or the tag character if there is one, marks a coordinate; `.` and spaces are empty.
    /// Line `y` of `text` is row `y`, and `x` counts characters from the left.
    ///
    /// May cause the builder to enter a [`GlyphBadCharacter`](BuilderInvalidReason::GlyphBadCharacter) invalid state on any other character,
    /// or an [`EmptyShape`](BuilderInvalidReason::EmptyShape) invalid state if nothing is marked.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn add_glyph(&mut self, tag: Option<char>, text: &str) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        let index = self.targets.len();
        let mut coordinates = Vec::new();
        for (y, line) in text.lines().enumerate() {
            for (x, character) in line.chars().enumerate() {
                match character {
                    '.' | ' ' => {}
                    '#' => coordinates.push(Coordinate(x as Coord, y as Coord)),
                    c if Some(c) == tag => coordinates.push(Coordinate(x as Coord, y as Coord)),
                    character => {
                        self.invalid_reasons.push(BuilderInvalidReason::GlyphBadCharacter { index, character });
                        return self;
                    }
                }
            }
        }

        self.add_target(tag, coordinates)
    }

    /// Add every glyph in a glyph file.
    ///
    /// Glyphs are separated by blank lines. A glyph may begin with a header line `= c` to tag it with `c`.
    /// Lines holding only spaces are treated as blank.
    pub fn add_glyph_file(&mut self, text: &str) -> &mut Self {
        let lines = text.lines().collect_vec();
        for block in lines.split(|line| line.trim().is_empty()).filter(|block| !block.is_empty()) {
            let (tag, body) = match block[0].trim().strip_prefix('=') {
                Some(header) => (header.trim().chars().next(), &block[1..]),
                None => (None, block),
            };
            self.add_glyph(tag, &body.join("\n"));
        }

        self
    }

    /// Remove the most recently added target.
    ///
    /// If the builder is in an invalid state or no targets are present, this function does nothing.
    pub fn pop_target(&mut self) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        self.targets.pop();
        self
    }

    /// Check the validity of this builder, ensuring no [`BuilderInvalidReason`] condition has arisen.
    ///
    /// Returns `None` if the builder is valid, `Some(&Vec<BuilderInvalidReason>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    /// The targets added so far, in order.
    /// If the builder is invalid for any reason, a reference to a [`Vec`] of [`BuilderInvalidReason`] will indicate why.
    pub fn build(&self) -> Result<Vec<Shape>, &Vec<BuilderInvalidReason>> {
        if !self.invalid_reasons.is_empty() {
            return Err(&self.invalid_reasons);
        }

        Ok(self.targets.clone())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn glyph_rows_are_y() {
        let targets = TargetsBuilder::new()
            .add_glyph(Some('o'), "o.\n.#")
            .build()
            .unwrap();

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0], Shape::new([Coordinate(0, 0), Coordinate(1, 1)]));
        assert_eq!(targets[0].tag(), Some('o'));
    }

    #[test]
    fn glyph_file_blocks_and_headers() {
        let targets = TargetsBuilder::new()
            .add_glyph_file("= a\n##\n\n#.\n##\n")
            .build()
            .unwrap();

        assert_eq!(targets, vec![
            Shape::new([Coordinate(0, 0), Coordinate(1, 0)]),
            Shape::new([Coordinate(0, 0), Coordinate(0, 1), Coordinate(1, 1)]),
        ]);
        assert_eq!(targets[0].tag(), Some('a'));
        assert_eq!(targets[1].tag(), None);
    }

    #[test]
    fn invalid_builder_stays_invalid() {
        let mut builder = TargetsBuilder::new();
        builder.add_target(None, [Coordinate(0, 0)])
            .add_glyph(None, "#?")
            .add_target(None, [Coordinate(3, 3)])
            .pop_target();

        assert_eq!(builder.is_valid(), Some(&vec![BuilderInvalidReason::GlyphBadCharacter { index: 1, character: '?' }]));
        assert!(builder.build().is_err());
    }

    #[test]
    fn empty_target_is_rejected() {
        let mut builder = TargetsBuilder::new();
        builder.add_glyph(None, "..\n..");
        assert_eq!(builder.build(), Err(&vec![BuilderInvalidReason::EmptyShape { index: 0 }]));
    }

    #[test]
    fn pop_removes_latest() {
        let targets = TargetsBuilder::new()
            .add_target(None, [Coordinate(0, 0)])
            .add_target(None, [Coordinate(1, 1)])
            .pop_target()
            .build()
            .unwrap();

        assert_eq!(targets, vec![Shape::new([Coordinate(0, 0)])]);
    }
}
