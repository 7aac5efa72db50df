#![forbid(unsafe_code)]

//! Core primitives for plotui.
//!
//! This crate provides the world-coordinate geometry shared by the layout
//! engine and by drawing/hit-testing hosts:
//!
//! - [`Span`] - a 1-D closed interval `[lo, hi]` in world coordinates
//! - [`Axis`] - an index into the set of independent spatial dimensions

pub mod geometry;

pub use geometry::{Axis, Span};
