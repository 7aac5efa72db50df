#![forbid(unsafe_code)]

//! Constraint-based layout for nested widget trees.
//!
//! This crate computes concrete, non-overlapping extents for a tree of
//! rectangular widgets, one spatial axis at a time:
//!
//! - [`SizeSpec`] - per-widget, per-axis size policy and spacing preferences
//! - [`WidgetTree`] - an arena of widget records addressed by stable handles
//! - [`Solver`] - the two-pass (bottom-up sizing, top-down positioning)
//!   tree resolution algorithm
//! - [`debug`] - textual dumps of the resolved range tree
//!
//! Each widget declares, per axis, whether its extent is fixed
//! ([`SizePolicy::Exact`]), derived from its children
//! ([`SizePolicy::ShrinkToFit`]), or derived from the free space left in
//! its parent ([`SizePolicy::ExpandToFit`]). Axes are independent: a 2-D
//! layout is two 1-D solves over the same tree.
//!
//! ```
//! use plotui_core::geometry::Axis;
//! use plotui_layout::{SizeSpec, Solver, WidgetTree};
//!
//! let mut tree = WidgetTree::new(
//!     "gui",
//!     vec![SizeSpec::exact(10.0).unwrap(), SizeSpec::exact(8.0).unwrap()],
//!     Some(Axis::X),
//! )
//! .unwrap();
//! let panel = tree
//!     .add_leaf(
//!         tree.root(),
//!         "panel",
//!         vec![SizeSpec::exact(4.0).unwrap(), SizeSpec::expand_to_fit()],
//!     )
//!     .unwrap();
//!
//! let mut solver = Solver::new(&mut tree).unwrap();
//! solver.calc_ranges(Axis::X).unwrap();
//! solver.calc_ranges(Axis::Y).unwrap();
//! assert!(tree.span(panel, Axis::X).is_some());
//! ```

pub mod debug;
pub mod solver;
pub mod tree;

pub use debug::{render_all, render_ranges};
pub use plotui_core::geometry::{Axis, Span};
pub use solver::{SolveError, Solver};
pub use tree::{ChildSeq, TreeError, WidgetId, WidgetNode, WidgetTree};

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a widget claims space along one axis.
///
/// `ShrinkToFit` and `ExpandToFit` are transient declarations: a
/// successful solve rewrites both to `Exact`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "policy", rename_all = "snake_case"))]
pub enum SizePolicy {
    /// A fixed extent in world units.
    Exact {
        /// Extent in world units (non-negative).
        extent: f64,
    },
    /// Take the minimum extent that contains the widget's children plus
    /// buffers. Only containers may shrink.
    ShrinkToFit,
    /// Take an even share of the free space in the parent (sequence
    /// axis), or the full interior extent (cross axis). The root may not
    /// expand.
    ExpandToFit,
}

impl SizePolicy {
    /// The resolved extent, if the policy is `Exact`.
    #[inline]
    #[must_use]
    pub fn extent(&self) -> Option<f64> {
        match self {
            Self::Exact { extent } => Some(*extent),
            _ => None,
        }
    }

    /// Whether the policy is `Exact`.
    #[inline]
    #[must_use]
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact { .. })
    }

    /// Short label for diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Exact { .. } => "exact",
            Self::ShrinkToFit => "shrink_to_fit",
            Self::ExpandToFit => "expand_to_fit",
        }
    }

    /// Parse a policy from its tag and an optional extent.
    ///
    /// `"exact"` requires an extent; the other tags ignore a supplied one.
    pub fn parse(token: &str, extent: Option<f64>) -> Result<Self, SpecError> {
        match token {
            "exact" => {
                let Some(extent) = extent else {
                    return Err(SpecError::MissingExtent);
                };
                if extent < 0.0 {
                    return Err(SpecError::NegativeExtent { extent });
                }
                Ok(Self::Exact { extent })
            }
            "shrink_to_fit" => Ok(Self::ShrinkToFit),
            "expand_to_fit" => Ok(Self::ExpandToFit),
            _ => Err(SpecError::InvalidPolicy {
                token: token.to_string(),
            }),
        }
    }
}

/// How a container places its children along one axis.
///
/// Only meaningful on a widget that has children arranged along that
/// axis; ignored elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Justify {
    /// Pack children against the low edge.
    ToLowest,
    /// Pack children against the high edge.
    ToHighest,
    /// Centre the packed run at the container midpoint.
    Centre,
    /// Distribute leftover space evenly as extra gaps before, between
    /// and after the children. On a cross axis this behaves exactly like
    /// `Centre`.
    #[default]
    Spread,
}

impl Justify {
    /// Short label for diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ToLowest => "to_lowest",
            Self::ToHighest => "to_highest",
            Self::Centre => "centre",
            Self::Spread => "spread",
        }
    }
}

impl FromStr for Justify {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, SpecError> {
        match s {
            "to_lowest" => Ok(Self::ToLowest),
            "to_highest" => Ok(Self::ToHighest),
            "centre" => Ok(Self::Centre),
            "spread" => Ok(Self::Spread),
            _ => Err(SpecError::InvalidJustify {
                token: s.to_string(),
            }),
        }
    }
}

/// Unit mode of a [`Buffer`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BufferUnits {
    /// A fraction of the root widget's maximum extent.
    Fraction,
    /// Absolute world units.
    World,
}

/// A non-negative spacing quantity.
///
/// Buffers are usually created in fractional mode and converted to world
/// units exactly once by the solver, using the root widget's maximum
/// extent over all axes as the scale. The same scale applies to every
/// buffer in the tree, on every axis, regardless of nesting depth.
///
/// Two buffers matter for each widget on each axis: an *inner* buffer
/// (minimum gap between a container's edge and its children, applied in
/// full on each side) and an *outer* buffer (the widget's total
/// contribution to gaps between siblings, half on each side).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Buffer {
    value: f64,
    units: BufferUnits,
}

impl Buffer {
    /// A zero-width buffer.
    pub const ZERO: Self = Self {
        value: 0.0,
        units: BufferUnits::Fraction,
    };

    /// Create a fractional buffer, rejecting negative values.
    pub fn fraction(value: f64) -> Result<Self, SpecError> {
        if value < 0.0 {
            return Err(SpecError::NegativeBuffer { value });
        }
        Ok(Self {
            value,
            units: BufferUnits::Fraction,
        })
    }

    /// Create an absolute buffer, rejecting negative values.
    pub fn world(value: f64) -> Result<Self, SpecError> {
        if value < 0.0 {
            return Err(SpecError::NegativeBuffer { value });
        }
        Ok(Self {
            value,
            units: BufferUnits::World,
        })
    }

    /// The buffer value, in whatever units the buffer currently has.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// The current unit mode.
    #[inline]
    #[must_use]
    pub const fn units(&self) -> BufferUnits {
        self.units
    }

    /// Convert a fractional buffer to world units by scaling with the
    /// given extent. A buffer already in world units is left untouched,
    /// so the conversion is idempotent.
    pub fn set_world(&mut self, scale: f64) {
        if self.units == BufferUnits::World {
            return;
        }
        self.value *= scale;
        self.units = BufferUnits::World;
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Per-widget, per-axis size preferences.
///
/// Holds the size policy, the inner and outer buffers, the justification
/// of any children arranged along this axis, and the resolved range the
/// solver fills in. Cloning a spec copies policy, buffers and justify;
/// the clone must go through a fresh solve before its range means
/// anything.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SizeSpec {
    pub(crate) policy: SizePolicy,
    pub(crate) inner: Buffer,
    pub(crate) outer: Buffer,
    pub(crate) justify: Justify,
    pub(crate) range: Option<Span>,
}

impl SizeSpec {
    /// Create a spec from a policy, with zero buffers and the default
    /// justification. Rejects a negative `Exact` extent.
    pub fn new(policy: SizePolicy) -> Result<Self, SpecError> {
        if let SizePolicy::Exact { extent } = policy
            && extent < 0.0
        {
            return Err(SpecError::NegativeExtent { extent });
        }
        Ok(Self {
            policy,
            inner: Buffer::ZERO,
            outer: Buffer::ZERO,
            justify: Justify::default(),
            range: None,
        })
    }

    /// A spec with a fixed extent.
    pub fn exact(extent: f64) -> Result<Self, SpecError> {
        Self::new(SizePolicy::Exact { extent })
    }

    /// A spec that shrinks to contain its children.
    #[must_use]
    pub fn shrink_to_fit() -> Self {
        Self {
            policy: SizePolicy::ShrinkToFit,
            inner: Buffer::ZERO,
            outer: Buffer::ZERO,
            justify: Justify::default(),
            range: None,
        }
    }

    /// A spec that expands into the parent's free space.
    #[must_use]
    pub fn expand_to_fit() -> Self {
        Self {
            policy: SizePolicy::ExpandToFit,
            ..Self::shrink_to_fit()
        }
    }

    /// Set the inner buffer.
    #[must_use]
    pub fn with_inner(mut self, inner: Buffer) -> Self {
        self.inner = inner;
        self
    }

    /// Set the outer buffer.
    #[must_use]
    pub fn with_outer(mut self, outer: Buffer) -> Self {
        self.outer = outer;
        self
    }

    /// Set the justification for children along this axis.
    #[must_use]
    pub fn with_justify(mut self, justify: Justify) -> Self {
        self.justify = justify;
        self
    }

    /// The current size policy.
    #[inline]
    #[must_use]
    pub fn policy(&self) -> SizePolicy {
        self.policy
    }

    /// The inner buffer.
    #[inline]
    #[must_use]
    pub fn inner(&self) -> Buffer {
        self.inner
    }

    /// The outer buffer.
    #[inline]
    #[must_use]
    pub fn outer(&self) -> Buffer {
        self.outer
    }

    /// The children justification.
    #[inline]
    #[must_use]
    pub fn justify(&self) -> Justify {
        self.justify
    }

    /// The resolved range, if a solve has assigned one.
    #[inline]
    #[must_use]
    pub fn range(&self) -> Option<Span> {
        self.range
    }
}

/// A malformed size specification, detected at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecError {
    /// The policy tag is not one of the recognized ones.
    InvalidPolicy { token: String },
    /// The justify tag is not one of the recognized ones.
    InvalidJustify { token: String },
    /// An `exact` policy was requested without an extent.
    MissingExtent,
    /// An `exact` extent was negative.
    NegativeExtent { extent: f64 },
    /// A buffer value was negative.
    NegativeBuffer { value: f64 },
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPolicy { token } => {
                write!(f, "size policy {token:?} is not recognized")
            }
            Self::InvalidJustify { token } => {
                write!(f, "justify mode {token:?} is not recognized")
            }
            Self::MissingExtent => {
                write!(f, "an extent must be provided for an exact size policy")
            }
            Self::NegativeExtent { extent } => {
                write!(f, "exact extent {extent} must be non-negative")
            }
            Self::NegativeBuffer { value } => {
                write!(f, "buffer value {value} must be non-negative")
            }
        }
    }
}

impl std::error::Error for SpecError {}
