//! Per-axis layout resolution over a widget tree.
//!
//! The solver runs in phases, each a recursive walk over the tree:
//!
//! 1. Legality pre-check: screens out impossible policy combinations
//!    (run per axis at construction).
//! 2. Buffer normalization: converts every fractional buffer to world
//!    units against one global scale, the root's maximum extent over
//!    all axes (run once at construction).
//! 3. Capacity pre-check: rejects containers whose fixed children
//!    cannot fit.
//! 4. Shrink resolution (post-order): rewrites `ShrinkToFit` to `Exact`,
//!    children before parents.
//! 5. Expand resolution (pre-order): divides free space among
//!    `ExpandToFit` children, parents before children.
//! 6. Position assignment (pre-order): turns extents into concrete
//!    `[lo, hi]` spans using the justify preferences.
//!
//! Any failure aborts the current axis solve and leaves the tree's
//! ranges indeterminate; callers should fix the configuration and
//! rebuild rather than retry blindly.

use std::fmt;

use plotui_core::geometry::{Axis, Span};

use crate::tree::{WidgetId, WidgetTree};
use crate::{Justify, SizePolicy};

/// Numerical tolerance used by the capacity pre-check.
pub const DEFAULT_EPSILON: f64 = 1.0e-7;

/// The layout solver.
///
/// Borrows the tree mutably for the duration of the layout pass.
/// Construction runs the legality pre-checks and buffer normalization;
/// [`calc_ranges`](Self::calc_ranges) must then be called once per axis,
/// in any order, before any range is read.
#[derive(Debug)]
pub struct Solver<'t> {
    tree: &'t mut WidgetTree,
    epsilon: f64,
}

impl<'t> Solver<'t> {
    /// Create a solver with the default epsilon.
    pub fn new(tree: &'t mut WidgetTree) -> Result<Self, SolveError> {
        Self::with_epsilon(tree, DEFAULT_EPSILON)
    }

    /// Create a solver with an explicit numerical tolerance.
    ///
    /// Checks every axis for illegal policy combinations, requires a
    /// concrete root extent on every axis, and converts all fractional
    /// buffers in the tree to world units. The scale is the root's
    /// maximum extent across all axes; one scale serves the whole tree.
    pub fn with_epsilon(tree: &'t mut WidgetTree, epsilon: f64) -> Result<Self, SolveError> {
        let mut solver = Self { tree, epsilon };
        let root = solver.tree.root();

        let mut max_root_extent = 0.0_f64;
        for di in 0..solver.tree.axes() {
            let axis = Axis::new(di);
            solver.check_space_demands(root, axis, true)?;
            let Some(extent) = solver.tree.policy(root, axis).extent() else {
                return Err(SolveError::RootExtentUnknown { axis });
            };
            if extent > max_root_extent {
                max_root_extent = extent;
            }
        }

        solver.set_buffers(root, max_root_extent);
        #[cfg(feature = "tracing")]
        tracing::trace!(scale = max_root_extent, "buffers normalized");

        Ok(solver)
    }

    /// Resolve extents and positions for every widget along one axis.
    pub fn calc_ranges(&mut self, axis: Axis) -> Result<(), SolveError> {
        if axis.index() >= self.tree.axes() {
            return Err(SolveError::AxisOutOfRange {
                axis,
                axes: self.tree.axes(),
            });
        }

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("calc_ranges", axis = axis.index());
        #[cfg(feature = "tracing")]
        let _guard = _span.enter();

        let root = self.tree.root();
        self.check_size_children(root, axis)?;
        self.shrink_children(root, axis)?;
        // No ShrinkToFit remains anywhere on this axis.
        self.expand_children(root, axis)?;
        // Every widget is now Exact; positions are all that is left.

        let Some(extent) = self.tree.policy(root, axis).extent() else {
            return Err(self.precondition(root, axis, "root extent unresolved"));
        };
        self.tree.spec_mut(root, axis).range = Some(Span::from_extent(extent));
        self.calc_positions(root, axis)?;

        #[cfg(feature = "tracing")]
        tracing::trace!("ranges resolved");
        Ok(())
    }

    /// Render the resolved range tree for one axis as indented text.
    #[must_use]
    pub fn render_ranges(&self, axis: Axis) -> String {
        crate::debug::render_ranges(self.tree, axis)
    }

    /// Render the resolved range trees for every axis.
    #[must_use]
    pub fn render_all(&self) -> String {
        crate::debug::render_all(self.tree)
    }

    fn widget_name(&self, id: WidgetId) -> String {
        self.tree.name(id).unwrap_or("?").to_string()
    }

    fn precondition(&self, id: WidgetId, axis: Axis, detail: &'static str) -> SolveError {
        SolveError::PreconditionViolated {
            axis,
            widget: self.widget_name(id),
            detail,
        }
    }

    // Screens out the parent/child policy combinations that have no
    // fixed point. Depth-first, children in declaration order; the
    // first failure aborts.
    fn check_space_demands(
        &self,
        id: WidgetId,
        axis: Axis,
        is_root: bool,
    ) -> Result<(), SolveError> {
        let policy = self.tree.policy(id, axis);
        if is_root && policy == SizePolicy::ExpandToFit {
            return Err(SolveError::RootCannotExpand {
                axis,
                widget: self.widget_name(id),
            });
        }

        match self.tree.children(id) {
            None => {
                if policy == SizePolicy::ShrinkToFit {
                    return Err(SolveError::LeafCannotShrink {
                        axis,
                        widget: self.widget_name(id),
                    });
                }
            }
            Some((children, _)) => {
                for &child in children {
                    if policy == SizePolicy::ShrinkToFit
                        && self.tree.policy(child, axis) == SizePolicy::ExpandToFit
                    {
                        return Err(SolveError::ExpandUnderShrink {
                            axis,
                            parent: self.widget_name(id),
                            child: self.widget_name(child),
                        });
                    }
                    self.check_space_demands(child, axis, false)?;
                }
            }
        }
        Ok(())
    }

    // Converts every buffer in the subtree, on every axis, to world
    // units. Idempotent per buffer, so re-running is harmless.
    fn set_buffers(&mut self, id: WidgetId, scale: f64) {
        for di in 0..self.tree.axes() {
            let spec = self.tree.spec_mut(id, Axis::new(di));
            spec.inner.set_world(scale);
            spec.outer.set_world(scale);
        }
        for child in self.tree.child_ids(id) {
            self.set_buffers(child, scale);
        }
    }

    fn inner_value(&self, id: WidgetId, axis: Axis) -> f64 {
        self.tree
            .spec(id, axis)
            .map(|spec| spec.inner.value())
            .unwrap_or(0.0)
    }

    fn outer_value(&self, id: WidgetId, axis: Axis) -> f64 {
        self.tree
            .spec(id, axis)
            .map(|spec| spec.outer.value())
            .unwrap_or(0.0)
    }

    // Rejects any container already Exact on this axis whose fixed
    // children cannot fit. A widget's outer buffer is its total gap
    // contribution, half per side; the end halves fall outside the
    // child run and are credited back before subtracting per-child
    // costs.
    fn check_size_children(&self, id: WidgetId, axis: Axis) -> Result<(), SolveError> {
        let Some((children, seq)) = self.tree.children(id) else {
            return Ok(());
        };

        if !children.is_empty()
            && let Some(extent) = self.tree.policy(id, axis).extent()
        {
            let first = children[0];
            let last = children[children.len() - 1];
            let mut available = extent - 2.0 * self.inner_value(id, axis);

            if seq == axis {
                available += 0.5 * self.outer_value(first, axis);
                available += 0.5 * self.outer_value(last, axis);
                for &child in children {
                    if let Some(child_extent) = self.tree.policy(child, axis).extent() {
                        available -= child_extent;
                    }
                    available -= self.outer_value(child, axis);
                }
                if available + self.epsilon < 0.0 {
                    return Err(SolveError::InsufficientSpace {
                        axis,
                        widget: self.widget_name(id),
                        child: None,
                    });
                }
            } else {
                for &child in children {
                    if let Some(child_extent) = self.tree.policy(child, axis).extent()
                        && child_extent - self.epsilon > available
                    {
                        return Err(SolveError::InsufficientSpace {
                            axis,
                            widget: self.widget_name(id),
                            child: Some(self.widget_name(child)),
                        });
                    }
                }
            }
        }

        for &child in children {
            self.check_size_children(child, axis)?;
        }
        Ok(())
    }

    // Post-order: rewrites ShrinkToFit to Exact once all children are
    // Exact. A container with an ExpandToFit child is left for the
    // expand phase; the legality pre-check guarantees such a container
    // is not itself ShrinkToFit.
    fn shrink_children(&mut self, id: WidgetId, axis: Axis) -> Result<(), SolveError> {
        let Some((_, seq)) = self.tree.children(id) else {
            return Ok(());
        };
        let children = self.tree.child_ids(id);

        let mut num_expand = 0;
        for &child in &children {
            self.shrink_children(child, axis)?;
            if self.tree.policy(child, axis) == SizePolicy::ExpandToFit {
                num_expand += 1;
            }
        }
        if num_expand > 0 || self.tree.policy(id, axis) != SizePolicy::ShrinkToFit {
            return Ok(());
        }

        let mut total = 0.0;
        if seq == axis {
            for &child in &children {
                let Some(child_extent) = self.tree.policy(child, axis).extent() else {
                    return Err(self.precondition(child, axis, "child extent unresolved in shrink"));
                };
                total += child_extent + self.outer_value(child, axis);
            }
            if let (Some(&first), Some(&last)) = (children.first(), children.last()) {
                total -= 0.5 * self.outer_value(first, axis);
                total -= 0.5 * self.outer_value(last, axis);
            }
        } else {
            for &child in &children {
                let Some(child_extent) = self.tree.policy(child, axis).extent() else {
                    return Err(self.precondition(child, axis, "child extent unresolved in shrink"));
                };
                if child_extent > total {
                    total = child_extent;
                }
            }
        }

        let extent = total + 2.0 * self.inner_value(id, axis);
        self.tree.spec_mut(id, axis).policy = SizePolicy::Exact { extent };
        Ok(())
    }

    // Pre-order: divides a container's free interior space among its
    // ExpandToFit children. On the sequence axis each expanding child
    // gets an equal share; on a cross axis each gets the full interior
    // extent. Multi-level expand chains resolve top-down because the
    // recursion happens after the current level is rewritten.
    fn expand_children(&mut self, id: WidgetId, axis: Axis) -> Result<(), SolveError> {
        let Some((_, seq)) = self.tree.children(id) else {
            return Ok(());
        };
        let children = self.tree.child_ids(id);
        if children.is_empty() {
            return Ok(());
        }

        let num_expand = children
            .iter()
            .filter(|&&child| self.tree.policy(child, axis) == SizePolicy::ExpandToFit)
            .count();

        if num_expand > 0 {
            let Some(extent) = self.tree.policy(id, axis).extent() else {
                return Err(self.precondition(id, axis, "container extent unresolved in expand"));
            };
            let mut available = extent - 2.0 * self.inner_value(id, axis);

            if seq == axis {
                available += 0.5 * self.outer_value(children[0], axis);
                available += 0.5 * self.outer_value(children[children.len() - 1], axis);
                for &child in &children {
                    if let Some(child_extent) = self.tree.policy(child, axis).extent() {
                        available -= child_extent;
                    }
                    available -= self.outer_value(child, axis);
                }
                if available <= 0.0 {
                    return Err(SolveError::NoSpaceToExpand {
                        axis,
                        widget: self.widget_name(id),
                    });
                }
                let share = available / num_expand as f64;
                for &child in &children {
                    if self.tree.policy(child, axis) == SizePolicy::ExpandToFit {
                        self.tree.spec_mut(child, axis).policy =
                            SizePolicy::Exact { extent: share };
                    }
                }
            } else {
                if available <= 0.0 {
                    return Err(SolveError::NoSpaceToExpand {
                        axis,
                        widget: self.widget_name(id),
                    });
                }
                for &child in &children {
                    if self.tree.policy(child, axis) == SizePolicy::ExpandToFit {
                        self.tree.spec_mut(child, axis).policy =
                            SizePolicy::Exact { extent: available };
                    }
                }
            }
        }

        for &child in &children {
            self.expand_children(child, axis)?;
        }
        Ok(())
    }

    // Pre-order: assigns [lo, hi] spans to children from the parent's
    // already-assigned span. Requires the whole level to be Exact.
    fn calc_positions(&mut self, id: WidgetId, axis: Axis) -> Result<(), SolveError> {
        let Some((_, seq)) = self.tree.children(id) else {
            return Ok(());
        };
        let children = self.tree.child_ids(id);
        if children.is_empty() {
            return Ok(());
        }

        let Some(spec) = self.tree.spec(id, axis) else {
            return Err(self.precondition(id, axis, "missing size spec"));
        };
        let Some(parent_span) = spec.range() else {
            return Err(self.precondition(id, axis, "parent range unresolved in positioning"));
        };
        let justify = spec.justify();
        let inner = spec.inner().value();

        let mut extents = Vec::with_capacity(children.len());
        for &child in &children {
            let Some(child_extent) = self.tree.policy(child, axis).extent() else {
                return Err(self.precondition(child, axis, "child policy not exact in positioning"));
            };
            extents.push(child_extent);
        }

        if seq == axis {
            match justify {
                Justify::ToLowest => {
                    self.pack_forward(&children, &extents, axis, parent_span.lo + inner, 0.0);
                }
                Justify::ToHighest => {
                    self.pack_backward(&children, &extents, axis, parent_span.hi - inner);
                }
                Justify::Centre | Justify::Spread => {
                    let mut run = 0.0;
                    for (i, &child) in children.iter().enumerate() {
                        run += extents[i] + self.outer_value(child, axis);
                    }
                    run -= 0.5 * self.outer_value(children[0], axis);
                    run -= 0.5 * self.outer_value(children[children.len() - 1], axis);

                    if justify == Justify::Centre || children.len() == 1 {
                        let start = parent_span.mid() - 0.5 * run;
                        self.pack_forward(&children, &extents, axis, start, 0.0);
                    } else {
                        let available = parent_span.len() - 2.0 * inner;
                        let added = (available - run) / (children.len() + 1) as f64;
                        self.pack_forward(&children, &extents, axis, parent_span.lo + inner, added);
                    }
                }
            }
        } else {
            match justify {
                Justify::ToLowest => {
                    let lo = parent_span.lo + inner;
                    for (i, &child) in children.iter().enumerate() {
                        self.tree.spec_mut(child, axis).range = Some(Span::new(lo, lo + extents[i]));
                    }
                }
                Justify::ToHighest => {
                    let hi = parent_span.hi - inner;
                    for (i, &child) in children.iter().enumerate() {
                        self.tree.spec_mut(child, axis).range = Some(Span::new(hi - extents[i], hi));
                    }
                }
                // Spread has no distinct meaning for children that do
                // not compete for space; it falls back to centring.
                Justify::Centre | Justify::Spread => {
                    let mid = parent_span.mid();
                    for (i, &child) in children.iter().enumerate() {
                        self.tree.spec_mut(child, axis).range =
                            Some(Span::new(mid - 0.5 * extents[i], mid + 0.5 * extents[i]));
                    }
                }
            }
        }

        for &child in &children {
            self.calc_positions(child, axis)?;
        }
        Ok(())
    }

    // Lays children low-to-high starting with the first child's low
    // edge at `start`, inserting `extra` gap before each child (and
    // implicitly after the last, if the caller sized `extra` that way).
    fn pack_forward(
        &mut self,
        children: &[WidgetId],
        extents: &[f64],
        axis: Axis,
        start: f64,
        extra: f64,
    ) {
        let mut x = start - 0.5 * self.outer_value(children[0], axis);
        for (i, &child) in children.iter().enumerate() {
            let half_outer = 0.5 * self.outer_value(child, axis);
            x += extra + half_outer;
            self.tree.spec_mut(child, axis).range = Some(Span::new(x, x + extents[i]));
            x += extents[i] + half_outer;
        }
    }

    // Mirror of `pack_forward`: lays children high-to-low with the last
    // child's high edge at `end`.
    fn pack_backward(&mut self, children: &[WidgetId], extents: &[f64], axis: Axis, end: f64) {
        let mut x = end + 0.5 * self.outer_value(children[children.len() - 1], axis);
        for (i, &child) in children.iter().enumerate().rev() {
            let half_outer = 0.5 * self.outer_value(child, axis);
            x -= half_outer;
            self.tree.spec_mut(child, axis).range = Some(Span::new(x - extents[i], x));
            x -= extents[i] + half_outer;
        }
    }
}

/// A tree configuration the solver cannot lay out, or an internal
/// invariant breach.
///
/// All of these are configuration/programmer errors, not transients:
/// every failure is fatal to the current axis solve, and ranges written
/// before the failure are indeterminate.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// The root has nothing to expand into.
    RootCannotExpand { axis: Axis, widget: String },
    /// A childless widget has no content to shrink around.
    LeafCannotShrink { axis: Axis, widget: String },
    /// A shrinking container cannot hold a child that wants all
    /// available space; there is no fixed point.
    ExpandUnderShrink {
        axis: Axis,
        parent: String,
        child: String,
    },
    /// The root needs a concrete extent on every axis.
    RootExtentUnknown { axis: Axis },
    /// A container's extent cannot accommodate its fixed children.
    InsufficientSpace {
        axis: Axis,
        widget: String,
        child: Option<String>,
    },
    /// No free space is left for one or more expanding children.
    NoSpaceToExpand { axis: Axis, widget: String },
    /// An internal invariant was breached; a solver bug or a tree
    /// mutated between phases, not a user-correctable condition.
    PreconditionViolated {
        axis: Axis,
        widget: String,
        detail: &'static str,
    },
    /// The requested axis exceeds the tree's axis count.
    AxisOutOfRange { axis: Axis, axes: usize },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootCannotExpand { axis, widget } => {
                write!(f, "{axis}: root widget {widget} may not expand to fit")
            }
            Self::LeafCannotShrink { axis, widget } => write!(
                f,
                "{axis}: widget {widget} has no children and may not shrink to fit"
            ),
            Self::ExpandUnderShrink {
                axis,
                parent,
                child,
            } => write!(
                f,
                "{axis}: {parent} shrinks to fit, so child {child} may not expand to fit"
            ),
            Self::RootExtentUnknown { axis } => write!(
                f,
                "{axis}: the root widget needs an exact extent for ranges to be calculated"
            ),
            Self::InsufficientSpace {
                axis,
                widget,
                child,
            } => match child {
                Some(child) => write!(f, "{axis}: no space for child {child} in widget {widget}"),
                None => write!(f, "{axis}: no space for children in widget {widget}"),
            },
            Self::NoSpaceToExpand { axis, widget } => {
                write!(f, "{axis}: no space for expanding children in widget {widget}")
            }
            Self::PreconditionViolated {
                axis,
                widget,
                detail,
            } => write!(f, "{axis}: precondition violated at {widget}: {detail}"),
            Self::AxisOutOfRange { axis, axes } => {
                write!(f, "{axis} is out of range for a tree with {axes} axes")
            }
        }
    }
}

impl std::error::Error for SolveError {}
