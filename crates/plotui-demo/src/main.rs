//! Builds a small control-panel tree, solves both axes and prints the
//! resolved ranges.
//!
//! Run with `RUST_LOG=trace` to watch the solver phases.

use std::error::Error;

use plotui_core::geometry::Axis;
use plotui_layout::{Buffer, Justify, SizeSpec, Solver, WidgetTree};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let inner = Buffer::fraction(0.01)?;
    let outer = Buffer::fraction(0.01)?;

    // A 30 x 20 window: a shrink-to-fit control column on the left, a
    // graph area absorbing the rest.
    let mut tree = WidgetTree::new(
        "gui",
        vec![
            SizeSpec::exact(30.0)?.with_inner(inner).with_justify(Justify::ToLowest),
            SizeSpec::exact(20.0)?.with_inner(inner).with_justify(Justify::Centre),
        ],
        Some(Axis::X),
    )?;

    let controls = tree.add_frame(
        tree.root(),
        "controls",
        vec![
            SizeSpec::shrink_to_fit().with_inner(inner).with_outer(outer),
            SizeSpec::exact(18.0)?
                .with_inner(inner)
                .with_justify(Justify::ToLowest),
        ],
        Axis::Y,
    )?;
    for name in ["load", "save", "undo", "redo"] {
        tree.add_leaf(
            controls,
            name,
            vec![
                SizeSpec::exact(5.0)?.with_outer(outer),
                SizeSpec::exact(2.0)?.with_outer(outer),
            ],
        )?;
    }

    let graph = tree.add_frame(
        tree.root(),
        "graph",
        vec![
            SizeSpec::expand_to_fit().with_inner(inner).with_outer(outer),
            SizeSpec::expand_to_fit()
                .with_inner(inner)
                .with_justify(Justify::ToHighest),
        ],
        Axis::X,
    )?;
    tree.add_leaf(
        graph,
        "legend",
        vec![
            SizeSpec::exact(6.0)?.with_outer(outer),
            SizeSpec::exact(1.5)?.with_outer(outer),
        ],
    )?;

    tracing::info!(widgets = tree.widget_count(), "tree constructed");

    let mut solver = Solver::new(&mut tree)?;
    solver.calc_ranges(Axis::X)?;
    solver.calc_ranges(Axis::Y)?;
    print!("{}", solver.render_all());

    Ok(())
}
