//! Widget-tree arena and validation.
//!
//! Widgets live in an arena and are addressed by stable [`WidgetId`]
//! handles, which keeps parent/child traversal free of ownership cycles
//! while letting the solver mutate size specs in place. Children are
//! populated by the builder methods only; the solver never restructures
//! the tree, so cycles are impossible by construction.

use std::collections::BTreeMap;
use std::fmt;

use plotui_core::geometry::{Axis, Span};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{SizePolicy, SizeSpec};

/// Stable handle for a widget record in a [`WidgetTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WidgetId(usize);

impl WidgetId {
    /// The raw arena index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Ordered children of a container, arranged along one axis.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChildSeq {
    /// Children in declaration order.
    pub children: Vec<WidgetId>,
    /// The axis along which children are laid side-by-side. All other
    /// axes are cross axes for this container.
    pub axis: Axis,
}

/// One widget record in the arena.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WidgetNode {
    /// Diagnostic name, unique within the tree.
    pub name: String,
    /// Parent handle; `None` for the root.
    pub parent: Option<WidgetId>,
    /// One size spec per axis.
    pub sizes: Vec<SizeSpec>,
    /// Children descriptor; `None` for a leaf.
    pub children: Option<ChildSeq>,
}

impl WidgetNode {
    /// Whether this widget may hold children.
    #[inline]
    #[must_use]
    pub fn is_frame(&self) -> bool {
        self.children.is_some()
    }
}

/// An arena of widget records forming a single rooted tree.
///
/// The tree is built top-down: the constructor creates the root, and
/// [`add_frame`](Self::add_frame) / [`add_leaf`](Self::add_leaf) attach
/// children to existing frames. Every widget carries one [`SizeSpec`]
/// per axis; the axis count is fixed at construction.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WidgetTree {
    nodes: Vec<WidgetNode>,
    names: BTreeMap<String, WidgetId>,
    axes: usize,
}

impl WidgetTree {
    /// Create a tree holding only the root widget.
    ///
    /// `seq` makes the root a frame arranged along the given axis; pass
    /// `None` for a childless root. The number of axes is taken from
    /// `sizes` and every later widget must match it.
    pub fn new(
        name: impl Into<String>,
        sizes: Vec<SizeSpec>,
        seq: Option<Axis>,
    ) -> Result<Self, TreeError> {
        let axes = sizes.len();
        if axes == 0 {
            return Err(TreeError::NoAxes);
        }
        if let Some(axis) = seq
            && axis.index() >= axes
        {
            return Err(TreeError::AxisOutOfRange { axis, axes });
        }
        let name = name.into();
        let root = WidgetNode {
            name: name.clone(),
            parent: None,
            sizes,
            children: seq.map(|axis| ChildSeq {
                children: Vec::new(),
                axis,
            }),
        };
        let mut names = BTreeMap::new();
        names.insert(name, WidgetId(0));
        Ok(Self {
            nodes: vec![root],
            names,
            axes,
        })
    }

    /// Attach a new frame (a widget that may hold children) under
    /// `parent`, with its children arranged along `seq`.
    pub fn add_frame(
        &mut self,
        parent: WidgetId,
        name: impl Into<String>,
        sizes: Vec<SizeSpec>,
        seq: Axis,
    ) -> Result<WidgetId, TreeError> {
        if seq.index() >= self.axes {
            return Err(TreeError::AxisOutOfRange {
                axis: seq,
                axes: self.axes,
            });
        }
        self.attach(parent, name.into(), sizes, Some(seq))
    }

    /// Attach a new leaf widget under `parent`.
    pub fn add_leaf(
        &mut self,
        parent: WidgetId,
        name: impl Into<String>,
        sizes: Vec<SizeSpec>,
    ) -> Result<WidgetId, TreeError> {
        self.attach(parent, name.into(), sizes, None)
    }

    fn attach(
        &mut self,
        parent: WidgetId,
        name: String,
        sizes: Vec<SizeSpec>,
        seq: Option<Axis>,
    ) -> Result<WidgetId, TreeError> {
        if sizes.len() != self.axes {
            return Err(TreeError::AxisCountMismatch {
                expected: self.axes,
                got: sizes.len(),
            });
        }
        if self.names.contains_key(&name) {
            return Err(TreeError::DuplicateName { name });
        }
        let parent_node = self
            .nodes
            .get(parent.index())
            .ok_or(TreeError::UnknownWidget { id: parent })?;
        if !parent_node.is_frame() {
            return Err(TreeError::NotAFrame {
                widget: parent_node.name.clone(),
            });
        }

        let id = WidgetId(self.nodes.len());
        self.nodes.push(WidgetNode {
            name: name.clone(),
            parent: Some(parent),
            sizes,
            children: seq.map(|axis| ChildSeq {
                children: Vec::new(),
                axis,
            }),
        });
        self.names.insert(name, id);
        if let Some(seq) = &mut self.nodes[parent.index()].children {
            seq.children.push(id);
        }
        Ok(id)
    }

    /// Handle of the root widget.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> WidgetId {
        WidgetId(0)
    }

    /// Number of spatial axes.
    #[inline]
    #[must_use]
    pub const fn axes(&self) -> usize {
        self.axes
    }

    /// Number of widgets in the tree.
    #[inline]
    #[must_use]
    pub fn widget_count(&self) -> usize {
        self.nodes.len()
    }

    /// The record for a widget, if the handle is valid.
    #[must_use]
    pub fn node(&self, id: WidgetId) -> Option<&WidgetNode> {
        self.nodes.get(id.index())
    }

    /// The diagnostic name of a widget.
    #[must_use]
    pub fn name(&self, id: WidgetId) -> Option<&str> {
        self.node(id).map(|node| node.name.as_str())
    }

    /// Look a widget up by its diagnostic name.
    #[must_use]
    pub fn widget(&self, name: &str) -> Option<WidgetId> {
        self.names.get(name).copied()
    }

    /// A widget's size spec on one axis.
    #[must_use]
    pub fn spec(&self, id: WidgetId, axis: Axis) -> Option<&SizeSpec> {
        self.node(id)?.sizes.get(axis.index())
    }

    /// A widget's resolved span on one axis, once solved.
    #[must_use]
    pub fn span(&self, id: WidgetId, axis: Axis) -> Option<Span> {
        self.spec(id, axis)?.range()
    }

    /// A widget's children and sequence axis, if it is a frame.
    #[must_use]
    pub fn children(&self, id: WidgetId) -> Option<(&[WidgetId], Axis)> {
        let seq = self.node(id)?.children.as_ref()?;
        Some((seq.children.as_slice(), seq.axis))
    }

    /// A widget's parent handle.
    #[must_use]
    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.node(id)?.parent
    }

    /// Iterate over all `(id, node)` pairs in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (WidgetId, &WidgetNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (WidgetId(i), node))
    }

    pub(crate) fn spec_mut(&mut self, id: WidgetId, axis: Axis) -> &mut SizeSpec {
        &mut self.nodes[id.index()].sizes[axis.index()]
    }

    pub(crate) fn policy(&self, id: WidgetId, axis: Axis) -> SizePolicy {
        self.nodes[id.index()].sizes[axis.index()].policy
    }

    pub(crate) fn child_ids(&self, id: WidgetId) -> Vec<WidgetId> {
        match &self.nodes[id.index()].children {
            Some(seq) => seq.children.clone(),
            None => Vec::new(),
        }
    }
}

/// A malformed tree-building operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A tree must have at least one axis.
    NoAxes,
    /// The widget handle does not name a record in this tree.
    UnknownWidget { id: WidgetId },
    /// Children can only be attached to frames.
    NotAFrame { widget: String },
    /// Widget names are unique within the tree.
    DuplicateName { name: String },
    /// A widget must carry one size spec per axis.
    AxisCountMismatch { expected: usize, got: usize },
    /// The axis index exceeds the tree's axis count.
    AxisOutOfRange { axis: Axis, axes: usize },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAxes => write!(f, "a widget tree needs at least one axis"),
            Self::UnknownWidget { id } => {
                write!(f, "widget handle {} is not in this tree", id.index())
            }
            Self::NotAFrame { widget } => {
                write!(f, "widget {widget} is not a frame and cannot hold children")
            }
            Self::DuplicateName { name } => {
                write!(f, "name {name} is already taken by another widget")
            }
            Self::AxisCountMismatch { expected, got } => write!(
                f,
                "expected one size spec per axis ({expected}), got {got}"
            ),
            Self::AxisOutOfRange { axis, axes } => {
                write!(f, "{axis} is out of range for a tree with {axes} axes")
            }
        }
    }
}

impl std::error::Error for TreeError {}
