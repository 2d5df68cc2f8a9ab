//! Cluster Lights Engine
//!
//! Clustered forward+/deferred light culling: the view frustum is split into
//! a 3D grid of clusters and each frame every point light is recorded in the
//! clusters its bounding sphere overlaps. The shading stage then evaluates only
//! the lights of the pixel's cluster instead of the whole scene.
//!
//! # Modules
//!
//! - [`camera`] - Projection parameters and view matrices
//! - [`render`] - Cluster grid, packed cluster buffer, light table, GPU upload and shader loading
//!
//! # Example
//!
//! ```
//! use cluster_lights_engine::camera::{CameraProjection, look_at};
//! use cluster_lights_engine::render::{ClusterGrid, ClusterGridConfig, PointLight};
//! use glam::Vec3;
//!
//! let camera = CameraProjection::new(60.0, 16.0 / 9.0, 0.1, 100.0);
//! let view = look_at(Vec3::new(0.0, 2.0, 10.0), Vec3::ZERO);
//! let lights = vec![
//!     PointLight::at(Vec3::new(0.0, 1.0, 0.0), 3.0),
//!     PointLight::at(Vec3::new(4.0, 0.5, -2.0), 1.5).with_color([1.0, 0.4, 0.1]),
//! ];
//!
//! let mut grid = ClusterGrid::new(ClusterGridConfig::default()).unwrap();
//! let stats = grid.update_clusters(&camera, &view, &lights);
//! assert_eq!(stats.lights, 2);
//! assert!(stats.assignments > 0);
//! ```

pub mod camera;
pub mod render;

// Re-export the render module contents at crate level for convenience
pub use render::*;
