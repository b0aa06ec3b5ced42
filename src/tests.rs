#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use itertools::Itertools;
    use pretty_assertions::assert_eq;

    use crate::builder::TargetsBuilder;
    use crate::config::SolverConfig;
    use crate::coordinate::Coordinate;
    use crate::error::{Diagnostic, SolveError};
    use crate::extract::{fundamentals, link, strip, tag_unbreakable};
    use crate::minimize::minimize;
    use crate::search::{combine, BacktrackingSearch, SearchBudget, SearchStrategy};
    use crate::shape::Shape;
    use crate::solution::{can_make_all_shapes, SolutionMap};
    use crate::solver::{solve, Solver};

    // RUST_LOG=slicebasis=trace cargo test -- --nocapture
    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn shape(coordinates: &[(i32, i32)]) -> Shape {
        coordinates.iter().copied().map(Coordinate::from).collect()
    }

    fn assert_round_trip(targets: &[Shape], map: &SolutionMap) {
        for (index, target) in targets.iter().enumerate() {
            let pieces = map.pieces_of(index).unwrap();
            let union = Shape::union_of(pieces.iter().map(|piece| piece.shape()));
            assert_eq!(&union, target, "target {}", index);
        }
    }

    #[test]
    fn two_strokes_and_their_union() {
        init_logging();
        let t1 = shape(&[(0, 0), (1, 0)]);
        let t2 = shape(&[(1, 0), (1, 1)]);
        let t3 = shape(&[(0, 0), (1, 0), (1, 1)]);
        let targets = vec![t1.clone(), t2.clone(), t3];

        let solution = solve(&targets).unwrap();
        let basis = solution.map.basis();

        assert_eq!(basis.iter().map(|element| element.shape().clone()).collect_vec(), vec![t1, t2]);
        assert!(basis.iter().all(|element| element.is_unbreakable()));
        assert_eq!(solution.map.entries()[0].pieces, vec![0]);
        assert_eq!(solution.map.entries()[1].pieces, vec![1]);
        assert_eq!(solution.map.entries()[2].pieces, vec![0, 1]);
        assert_round_trip(&targets, &solution.map);
        assert!(solution.best_effort.is_empty());
        assert!(solution.diagnostics.is_empty());
    }

    #[test]
    fn identical_targets_share_one_element() {
        let target = shape(&[(0, 0), (2, 2)]);
        let targets = vec![target.clone(), target.clone()];

        let solution = solve(&targets).unwrap();

        assert_eq!(solution.map.basis().len(), 1);
        assert_eq!(solution.map.basis()[0].shape(), &target);
        assert_eq!(solution.map.entries()[0].pieces, vec![0]);
        assert_eq!(solution.map.entries()[1].pieces, vec![0]);
    }

    #[test]
    fn unreachable_coordinate_is_reported() {
        let targets = vec![shape(&[(0, 0), (1, 0)]), shape(&[(1, 0), (1, 1)])];
        let basis = solve(&targets).unwrap().map.into_basis();

        let edited = vec![targets[0].clone(), shape(&[(1, 0), (1, 1), (9, 9)])];
        let report = can_make_all_shapes(&edited, basis).unwrap_err();

        assert_eq!(report.target_index, 1);
        assert_eq!(report.target, edited[1]);
        assert_eq!(report.missing, BTreeSet::from([Coordinate(9, 9)]));
        assert!(matches!(SolveError::from(report), SolveError::Unsolvable(_)));
    }

    #[test]
    fn coordinate_without_a_fundamental_fails_validation() {
        let targets = vec![
            shape(&[(0, 0), (1, 0)]),
            shape(&[(1, 0), (1, 1)]),
            shape(&[(1, 0), (1, 1), (9, 9)]),
        ];

        // (9, 9) gets no fundamental; (5, 5) is one no target contains
        let mut extracted = fundamentals(&targets[..2]);
        extracted.push(shape(&[(5, 5)]));

        let (linked, diagnostics) = link(&extracted, &targets);
        assert_eq!(diagnostics, vec![Diagnostic::InternalInconsistency { coordinate: Coordinate(5, 5) }]);

        let stripped = strip(tag_unbreakable(linked, &targets), &targets);
        let combined = combine(stripped, &targets, &BacktrackingSearch, &SearchBudget::default()).unwrap();
        let basis = minimize(combined.pool, &targets);

        let report = can_make_all_shapes(&targets, basis).unwrap_err();
        assert_eq!(report.target_index, 2);
        assert_eq!(report.missing, BTreeSet::from([Coordinate(9, 9)]));
    }

    #[test]
    fn empty_target_is_rejected_before_solving() {
        let targets = vec![shape(&[(0, 0)]), Shape::default()];
        assert!(matches!(solve(&targets), Err(SolveError::InvalidShape { index: 1 })));
    }

    #[test]
    fn solving_twice_gives_the_same_map() {
        init_logging();
        let targets = TargetsBuilder::new()
            .add_glyph(Some('7'), "###\n..#\n..#")
            .add_glyph(Some('1'), "..#\n..#\n..#")
            .add_glyph(Some('L'), "#..\n#..\n###")
            .add_glyph(Some('T'), "###\n.#.\n.#.")
            .build()
            .unwrap();

        let first = solve(&targets).unwrap();
        let second = solve(&targets).unwrap();

        assert_eq!(first, second);
        assert_round_trip(&targets, &first.map);
    }

    #[test]
    fn strategies_reach_the_same_basis() {
        let targets = vec![
            shape(&[(0, 0), (1, 0), (2, 0)]),
            shape(&[(0, 0), (1, 0), (0, 1)]),
            shape(&[(1, 0), (2, 0), (2, 1)]),
            shape(&[(0, 1), (2, 1)]),
        ];

        let bases = [SearchStrategy::PowerSet, SearchStrategy::Backtracking, SearchStrategy::Sat].into_iter()
            .map(|strategy| {
                let solver = Solver::new(SolverConfig::builder().strategy(strategy).build());
                let solution = solver.solve(&targets).unwrap();
                assert_round_trip(&targets, &solution.map);
                solution.map.into_basis()
            })
            .collect_vec();

        assert_eq!(bases[0], bases[1]);
        assert_eq!(bases[1], bases[2]);
    }

    #[test]
    fn linking_ignores_target_order() {
        let targets = vec![
            shape(&[(0, 0), (1, 0), (2, 0)]),
            shape(&[(1, 0), (2, 0), (3, 3)]),
            shape(&[(3, 3), (4, 4)]),
            shape(&[(0, 0)]),
        ];
        let reversed = targets.iter().rev().cloned().collect_vec();

        let linked_set = |targets: &[Shape]| -> BTreeSet<Shape> {
            let (linked, diagnostics) = link(&fundamentals(targets), targets);
            assert!(diagnostics.is_empty());
            linked.into_iter().map(|element| element.shape().clone()).collect()
        };

        assert_eq!(linked_set(&targets), linked_set(&reversed));
        assert_eq!(linked_set(&targets), linked_set(&targets));
    }

    // a pair of dots only ever seen alongside one of two separate marks
    fn budget_targets() -> Vec<Shape> {
        vec![
            shape(&[(0, 0), (1, 0)]),
            shape(&[(0, 0), (5, 5)]),
            shape(&[(1, 0), (6, 6)]),
        ]
    }

    #[test]
    fn exceeded_budget_fails_when_strict() {
        let config = SolverConfig::builder()
            .strategy(SearchStrategy::PowerSet)
            .max_candidates(1)
            .build();

        let result = Solver::new(config).solve(&budget_targets());
        assert!(matches!(result, Err(SolveError::SearchBudgetExceeded { target_index: 0, limit: 1 })));
    }

    #[test]
    fn exceeded_budget_is_reported_in_best_effort_mode() {
        let targets = budget_targets();
        let config = SolverConfig::builder()
            .strategy(SearchStrategy::PowerSet)
            .max_candidates(1)
            .best_effort(true)
            .build();

        let solution = Solver::new(config).solve(&targets).unwrap();

        assert_eq!(solution.best_effort, vec![0]);
        assert_eq!(solution.map.basis().iter().map(|element| element.shape().clone()).collect_vec(), targets);
        assert_round_trip(&targets, &solution.map);
    }

    #[test]
    fn tags_follow_matching_targets() {
        let targets = TargetsBuilder::new()
            .add_target(Some('a'), [Coordinate(0, 0), Coordinate(1, 0)])
            .add_target(Some('b'), [Coordinate(1, 0), Coordinate(1, 1)])
            .build()
            .unwrap();

        let solution = solve(&targets).unwrap();
        let tags = solution.map.basis().iter().map(|element| element.shape().tag()).collect_vec();
        assert_eq!(tags, vec![Some('a'), Some('b')]);
        assert_eq!(solution.map.display_of(1), 'b');
    }
}
