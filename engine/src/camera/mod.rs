//! Camera Module
//!
//! Projection parameters and view-matrix helpers consumed by the cluster
//! assignment. This module is window-system agnostic - it only deals with camera math.

pub mod projection;

pub use projection::{CameraProjection, forward_from_angles, look_at, view_depth, view_from_angles};
