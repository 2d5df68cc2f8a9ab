//! Cluster Grid Configuration
//!
//! Static capacity configuration for the clustered light grid. The view frustum
//! is divided into a regular 3D grid:
//! - X/Y: Screen-space columns/rows (`x_slices` × `y_slices`)
//! - Z: Linearly distributed depth slices between the near and far planes (`z_slices`)
//!
//! Each cluster holds at most `max_lights_per_cluster` light identifiers. The
//! geometry is fixed for the lifetime of a [`ClusterGrid`](super::cluster_grid::ClusterGrid).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of scalar channels packed into one buffer element (RGBA).
pub const CHANNELS_PER_ELEMENT: usize = 4;

/// Default number of slices on each axis.
pub const DEFAULT_SLICES: u32 = 15;

/// Default maximum number of lights recorded per cluster.
pub const DEFAULT_MAX_LIGHTS_PER_CLUSTER: u32 = 500;

/// Errors raised while building a cluster grid or validating its inputs.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("cluster grid needs at least one {axis} slice")]
    ZeroSlices { axis: char },

    #[error("max_lights_per_cluster must be at least 1")]
    ZeroCapacity,

    #[error("cluster grid {x}x{y}x{z} with {capacity} lights per cluster overflows the buffer index range")]
    GridTooLarge { x: u32, y: u32, z: u32, capacity: u32 },

    #[error(
        "invalid camera: fov {fov_y_degrees}°, aspect {aspect_ratio}, near {near}, far {far} (need 0 < fov < 180, aspect > 0, far > near > 0)"
    )]
    InvalidCamera {
        fov_y_degrees: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    },

    #[error("failed to parse cluster grid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Slice counts and per-cluster capacity of a cluster grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterGridConfig {
    /// Number of columns across the screen
    pub x_slices: u32,
    /// Number of rows up the screen
    pub y_slices: u32,
    /// Number of linear depth slices between near and far
    pub z_slices: u32,
    /// Maximum light identifiers stored per cluster; extra lights are dropped
    pub max_lights_per_cluster: u32,
}

impl Default for ClusterGridConfig {
    fn default() -> Self {
        Self {
            x_slices: DEFAULT_SLICES,
            y_slices: DEFAULT_SLICES,
            z_slices: DEFAULT_SLICES,
            max_lights_per_cluster: DEFAULT_MAX_LIGHTS_PER_CLUSTER,
        }
    }
}

impl ClusterGridConfig {
    /// Create a configuration with the default per-cluster capacity.
    pub fn new(x_slices: u32, y_slices: u32, z_slices: u32) -> Self {
        Self {
            x_slices,
            y_slices,
            z_slices,
            max_lights_per_cluster: DEFAULT_MAX_LIGHTS_PER_CLUSTER,
        }
    }

    /// Set the per-cluster capacity and return self for chaining.
    pub fn with_max_lights_per_cluster(mut self, max_lights_per_cluster: u32) -> Self {
        self.max_lights_per_cluster = max_lights_per_cluster;
        self
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// ```
    /// use cluster_lights_engine::render::cluster_config::ClusterGridConfig;
    ///
    /// let config = ClusterGridConfig::from_json_str(r#"{ "z_slices": 24 }"#).unwrap();
    /// assert_eq!(config.z_slices, 24);
    /// assert_eq!(config.x_slices, 15);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, ClusterError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        log::info!(
            "Loaded cluster grid config {}x{}x{} ({} lights per cluster)",
            config.x_slices,
            config.y_slices,
            config.z_slices,
            config.max_lights_per_cluster
        );
        Ok(config)
    }

    /// Serialize the configuration to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ClusterError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every axis has at least one slice, the capacity is non-zero,
    /// and the whole buffer can be addressed with `u32` offsets.
    pub fn validate(&self) -> Result<(), ClusterError> {
        for (axis, slices) in [('x', self.x_slices), ('y', self.y_slices), ('z', self.z_slices)] {
            if slices == 0 {
                return Err(ClusterError::ZeroSlices { axis });
            }
        }
        if self.max_lights_per_cluster == 0 {
            return Err(ClusterError::ZeroCapacity);
        }

        let scalars = (self.x_slices as u64)
            .checked_mul(self.y_slices as u64)
            .and_then(|n| n.checked_mul(self.z_slices as u64))
            .and_then(|n| n.checked_mul(self.row_stride() as u64));
        match scalars {
            Some(n) if n <= u32::MAX as u64 => Ok(()),
            _ => Err(ClusterError::GridTooLarge {
                x: self.x_slices,
                y: self.y_slices,
                z: self.z_slices,
                capacity: self.max_lights_per_cluster,
            }),
        }
    }

    /// Total number of clusters (`x_slices * y_slices * z_slices`).
    #[inline]
    pub fn total_clusters(&self) -> usize {
        self.x_slices as usize * self.y_slices as usize * self.z_slices as usize
    }

    /// Slice counts as `[x, y, z]`.
    #[inline]
    pub fn slices(&self) -> [u32; 3] {
        [self.x_slices, self.y_slices, self.z_slices]
    }

    /// Flatten a cluster coordinate: `x + y * x_slices + z * x_slices * y_slices`.
    ///
    /// X varies fastest, then Y, then Z. The shading stage uses the same order.
    #[inline]
    pub fn cluster_index(&self, x: u32, y: u32, z: u32) -> usize {
        let xs = self.x_slices as usize;
        let ys = self.y_slices as usize;
        x as usize + y as usize * xs + z as usize * xs * ys
    }

    /// Inverse of [`cluster_index`](Self::cluster_index).
    #[inline]
    pub fn cluster_coord(&self, index: usize) -> [u32; 3] {
        let xs = self.x_slices as usize;
        let ys = self.y_slices as usize;
        [
            (index % xs) as u32,
            ((index / xs) % ys) as u32,
            (index / (xs * ys)) as u32,
        ]
    }

    /// Number of four-channel elements per cluster row: `ceil((capacity + 1) / 4)`.
    #[inline]
    pub fn elements_per_row(&self) -> usize {
        (self.max_lights_per_cluster as usize + 1).div_ceil(CHANNELS_PER_ELEMENT)
    }

    /// Scalars per cluster row (count + identifiers, padded to whole elements).
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.elements_per_row() * CHANNELS_PER_ELEMENT
    }
}
