//! Textual dumps of the resolved range tree.
//!
//! Output is for human eyes during debugging; the format is not stable.

use std::fmt::Write as _;

use plotui_core::geometry::Axis;

use crate::tree::{WidgetId, WidgetTree};

/// Render the range tree for one axis as indented text, one widget per
/// line in depth-first declaration order.
#[must_use]
pub fn render_ranges(tree: &WidgetTree, axis: Axis) -> String {
    let mut out = String::new();
    let header = format!("ranges for {axis}");
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "{}", "=".repeat(header.len()));
    render_widget(tree, tree.root(), axis, 0, &mut out);
    out
}

/// Render the range trees for every axis, one block per axis.
#[must_use]
pub fn render_all(tree: &WidgetTree) -> String {
    let mut out = String::new();
    for di in 0..tree.axes() {
        out.push_str(&render_ranges(tree, Axis::new(di)));
        out.push('\n');
    }
    out
}

fn render_widget(tree: &WidgetTree, id: WidgetId, axis: Axis, depth: usize, out: &mut String) {
    let Some(node) = tree.node(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    let _ = write!(out, "{indent}{}: ", node.name);
    match tree.span(id, axis) {
        Some(span) => {
            let _ = write!(out, "{:5.2} to {:5.2}", span.lo, span.hi);
        }
        None => {
            let _ = write!(out, "none");
        }
    }
    if let Some(spec) = tree.spec(id, axis) {
        let _ = write!(out, "  {}", spec.policy().label());
    }
    out.push('\n');

    if let Some((children, _)) = tree.children(id) {
        for &child in children {
            render_widget(tree, child, axis, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SizeSpec, Solver, WidgetTree};

    fn exact_pair(x: f64, y: f64) -> Vec<SizeSpec> {
        vec![SizeSpec::exact(x).unwrap(), SizeSpec::exact(y).unwrap()]
    }

    #[test]
    fn unsolved_tree_renders_none_ranges() {
        let tree = WidgetTree::new("gui", exact_pair(10.0, 6.0), None).unwrap();
        let text = render_ranges(&tree, Axis::X);
        assert!(text.starts_with("ranges for axis 0\n"));
        assert!(text.contains("gui: none  exact"));
    }

    #[test]
    fn solved_tree_renders_indented_ranges() {
        let mut tree = WidgetTree::new("gui", exact_pair(10.0, 6.0), Some(Axis::X)).unwrap();
        tree.add_leaf(tree.root(), "a", exact_pair(4.0, 2.0)).unwrap();
        let mut solver = Solver::new(&mut tree).unwrap();
        solver.calc_ranges(Axis::X).unwrap();

        let text = render_ranges(&tree, Axis::X);
        assert!(text.contains("gui:  0.00 to 10.00  exact"));
        // children are indented two spaces per depth
        assert!(text.contains("\n  a: "));
    }

    #[test]
    fn render_all_emits_one_block_per_axis() {
        let tree = WidgetTree::new("gui", exact_pair(10.0, 6.0), None).unwrap();
        let text = render_all(&tree);
        assert!(text.contains("ranges for axis 0"));
        assert!(text.contains("ranges for axis 1"));
    }
}
