//! Randomized invariant checks over generated widget trees.
//!
//! Every generated configuration is legal by construction, so the solve
//! must succeed; afterwards containment, sibling separation and policy
//! closure must hold on every axis.

use plotui_core::geometry::Axis;
use plotui_layout::{Buffer, Justify, SizeSpec, Solver, WidgetTree};
use proptest::prelude::*;

const TOL: f64 = 1.0e-9;

const JUSTIFIES: [Justify; 4] = [
    Justify::ToLowest,
    Justify::ToHighest,
    Justify::Centre,
    Justify::Spread,
];

fn leaf_sizes(extents: (f64, f64), outer: f64) -> Vec<SizeSpec> {
    let outer = Buffer::world(outer).unwrap();
    vec![
        SizeSpec::exact(extents.0).unwrap().with_outer(outer),
        SizeSpec::exact(extents.1).unwrap().with_outer(outer),
    ]
}

fn check_invariants(tree: &WidgetTree) {
    for di in 0..tree.axes() {
        let axis = Axis::new(di);
        for (id, node) in tree.iter() {
            let spec = tree.spec(id, axis).unwrap();
            assert!(spec.policy().is_exact(), "{} not exact", node.name);
            let span = spec.range().expect("unresolved range after solve");

            if let Some(parent) = tree.parent(id) {
                let parent_span = tree.span(parent, axis).unwrap();
                assert!(
                    parent_span.lo <= span.lo + TOL && span.hi <= parent_span.hi + TOL,
                    "{} escapes its parent on {axis}",
                    node.name
                );
            }
        }

        // Siblings on their sequence axis must not overlap, and must be
        // separated by at least the average of their outer buffers.
        for (id, _) in tree.iter() {
            let Some((children, seq)) = tree.children(id) else {
                continue;
            };
            if seq != axis || children.len() < 2 {
                continue;
            }
            let mut spans: Vec<_> = children
                .iter()
                .map(|&child| {
                    (
                        tree.span(child, axis).unwrap(),
                        tree.spec(child, axis).unwrap().outer().value(),
                    )
                })
                .collect();
            spans.sort_by(|a, b| a.0.lo.total_cmp(&b.0.lo));
            for pair in spans.windows(2) {
                let (a, a_outer) = pair[0];
                let (b, b_outer) = pair[1];
                let min_gap = 0.5 * (a_outer + b_outer);
                assert!(
                    b.lo - a.hi + TOL >= min_gap,
                    "siblings too close on {axis}: gap {} < {min_gap}",
                    b.lo - a.hi
                );
            }
        }
    }
}

proptest! {
    #[test]
    fn flat_trees_solve_to_nested_non_overlapping_ranges(
        extents in prop::collection::vec((0.1f64..3.0, 0.1f64..3.0), 1..6),
        outer in 0.0f64..0.3,
        inner in 0.0f64..0.4,
        justify_x in 0usize..4,
        justify_y in 0usize..4,
        seq_is_y in any::<bool>(),
    ) {
        // Worst case: 5 children of extent 3 plus buffers still fit in 20.
        let seq = if seq_is_y { Axis::Y } else { Axis::X };
        let inner = Buffer::world(inner).unwrap();
        let mut tree = WidgetTree::new(
            "gui",
            vec![
                SizeSpec::exact(20.0).unwrap().with_inner(inner).with_justify(JUSTIFIES[justify_x]),
                SizeSpec::exact(20.0).unwrap().with_inner(inner).with_justify(JUSTIFIES[justify_y]),
            ],
            Some(seq),
        )
        .unwrap();
        for (i, &pair) in extents.iter().enumerate() {
            tree.add_leaf(tree.root(), format!("leaf{i}"), leaf_sizes(pair, outer)).unwrap();
        }

        let mut solver = Solver::new(&mut tree).unwrap();
        solver.calc_ranges(Axis::X).unwrap();
        solver.calc_ranges(Axis::Y).unwrap();
        drop(solver);

        check_invariants(&tree);
    }

    #[test]
    fn shrinking_columns_hug_their_leaves(
        columns in prop::collection::vec(
            prop::collection::vec((0.1f64..2.0, 0.1f64..2.0), 1..4),
            1..4,
        ),
        outer in 0.0f64..0.2,
        justify in 0usize..4,
    ) {
        // Root row of shrink-to-fit columns, each holding a stack of
        // exact leaves. 3 columns of 3 leaves at most: every column is
        // at most ~6.6 wide/tall, the 30x30 root always fits them.
        let mut tree = WidgetTree::new(
            "gui",
            vec![
                SizeSpec::exact(30.0).unwrap().with_justify(JUSTIFIES[justify]),
                SizeSpec::exact(30.0).unwrap(),
            ],
            Some(Axis::X),
        )
        .unwrap();
        for (ci, column) in columns.iter().enumerate() {
            let frame = tree
                .add_frame(
                    tree.root(),
                    format!("col{ci}"),
                    vec![
                        SizeSpec::shrink_to_fit().with_inner(Buffer::world(0.1).unwrap()),
                        SizeSpec::shrink_to_fit().with_inner(Buffer::world(0.1).unwrap()),
                    ],
                    Axis::Y,
                )
                .unwrap();
            for (li, &pair) in column.iter().enumerate() {
                tree.add_leaf(frame, format!("leaf{ci}_{li}"), leaf_sizes(pair, outer)).unwrap();
            }
        }

        let mut solver = Solver::new(&mut tree).unwrap();
        solver.calc_ranges(Axis::X).unwrap();
        solver.calc_ranges(Axis::Y).unwrap();
        drop(solver);

        check_invariants(&tree);

        // Each shrunk column is exactly wide enough for its widest leaf.
        for (ci, column) in columns.iter().enumerate() {
            let frame = tree.widget(&format!("col{ci}")).unwrap();
            let width = tree.span(frame, Axis::X).unwrap().len();
            let widest = column.iter().map(|&(w, _)| w).fold(0.0, f64::max);
            prop_assert!((width - (widest + 0.2)).abs() < TOL);
        }
    }

    #[test]
    fn one_expanding_sibling_absorbs_all_leftover(
        fixed in prop::collection::vec(0.1f64..2.0, 0..4),
        inner in 0.0f64..0.5,
    ) {
        let inner_buf = Buffer::world(inner).unwrap();
        let mut tree = WidgetTree::new(
            "gui",
            vec![
                SizeSpec::exact(15.0).unwrap().with_inner(inner_buf),
                SizeSpec::exact(15.0).unwrap(),
            ],
            Some(Axis::X),
        )
        .unwrap();
        for (i, &extent) in fixed.iter().enumerate() {
            tree.add_leaf(tree.root(), format!("fixed{i}"), leaf_sizes((extent, 1.0), 0.0)).unwrap();
        }
        tree.add_leaf(
            tree.root(),
            "filler",
            vec![SizeSpec::expand_to_fit(), SizeSpec::exact(1.0).unwrap()],
        )
        .unwrap();

        let mut solver = Solver::new(&mut tree).unwrap();
        solver.calc_ranges(Axis::X).unwrap();
        drop(solver);

        let filler = tree.widget("filler").unwrap();
        let got = tree.span(filler, Axis::X).unwrap().len();
        let expected = 15.0 - 2.0 * inner - fixed.iter().sum::<f64>();
        prop_assert!((got - expected).abs() < 1.0e-6, "filler {got} != {expected}");
    }
}
