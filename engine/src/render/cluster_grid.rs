//! Cluster Light Assignment
//!
//! Assigns point lights to the clusters of a regular view-frustum grid once per
//! frame. Every light's bounding sphere is projected into camera space and
//! converted into an inclusive range of cluster coordinates on each axis; the
//! light identifier is then appended to every cluster in that range, up to the
//! per-cluster capacity.
//!
//! ## Slicing
//!
//! - X/Y: the frustum cross-section at the light's depth is split into
//!   `x_slices` × `y_slices` equal cells, so cells widen with distance
//! - Z: `[near, far]` is split into `z_slices` equal, depth-independent slices
//!
//! ## Approximations
//!
//! Ranges are clamped into the grid per axis. A light entirely outside the
//! frustum (behind the camera, past the far plane, or off to one side) can
//! therefore still land in the boundary clusters it is clamped onto.
//!
//! ## Cost
//!
//! O(lights × covered clusters). A light whose radius spans the whole frustum
//! touches every cluster.

use glam::Mat4;

use super::cluster_buffer::{ClusterBuffer, ClusterRecord};
use super::cluster_config::{ClusterError, ClusterGridConfig};
use super::point_lights::PointLight;
use crate::camera::CameraProjection;

/// Inclusive range of cluster coordinates touched by one light.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClusterBounds {
    /// Lowest `[x, y, z]` cluster coordinate
    pub min: [u32; 3],
    /// Highest `[x, y, z]` cluster coordinate (inclusive)
    pub max: [u32; 3],
}

impl ClusterBounds {
    /// Whether the range covers no cluster (some axis has `min > max`).
    #[inline]
    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.min[axis] > self.max[axis])
    }

    /// Number of clusters in the range.
    #[inline]
    pub fn cell_count(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (0..3)
            .map(|axis| (self.max[axis] - self.min[axis] + 1) as usize)
            .product()
    }

    /// Whether `coord` lies inside the range.
    #[inline]
    pub fn contains(&self, coord: [u32; 3]) -> bool {
        (0..3).all(|axis| self.min[axis] <= coord[axis] && coord[axis] <= self.max[axis])
    }

    /// Iterate the covered cluster coordinates, X fastest, then Y, then Z.
    pub fn cells(self) -> impl Iterator<Item = [u32; 3]> {
        let [x0, y0, z0] = self.min;
        let [x1, y1, z1] = self.max;
        (z0..=z1).flat_map(move |z| (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| [x, y, z])))
    }
}

/// Per-frame summary returned by [`ClusterGrid::update_clusters`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClusterUpdateStats {
    /// Lights processed
    pub lights: u32,
    /// Light identifiers written into clusters
    pub assignments: u64,
    /// Cluster slots refused because the cluster was already full
    pub dropped: u64,
}

/// Fixed 3D cluster grid with its packed per-cluster light lists.
#[derive(Clone, Debug)]
pub struct ClusterGrid {
    config: ClusterGridConfig,
    buffer: ClusterBuffer,
}

impl ClusterGrid {
    /// Validate the configuration and allocate the cluster buffer once.
    pub fn new(config: ClusterGridConfig) -> Result<Self, ClusterError> {
        config.validate()?;
        let buffer = ClusterBuffer::new(&config);
        log::debug!(
            "Allocated cluster grid {}x{}x{} ({} clusters, {} bytes)",
            config.x_slices,
            config.y_slices,
            config.z_slices,
            config.total_clusters(),
            buffer.byte_len()
        );
        Ok(Self { config, buffer })
    }

    /// Grid geometry and capacity.
    #[inline]
    pub fn config(&self) -> &ClusterGridConfig {
        &self.config
    }

    /// Packed light lists, as rebuilt by the last [`update_clusters`](Self::update_clusters).
    #[inline]
    pub fn buffer(&self) -> &ClusterBuffer {
        &self.buffer
    }

    /// Total number of clusters.
    #[inline]
    pub fn cluster_count(&self) -> usize {
        self.config.total_clusters()
    }

    /// Decoded light list of the cluster at `(x, y, z)`.
    pub fn record(&self, x: u32, y: u32, z: u32) -> ClusterRecord {
        self.buffer.record(self.config.cluster_index(x, y, z))
    }

    /// Compute the clamped cluster range covered by `light`'s bounding sphere.
    pub fn light_bounds(
        &self,
        camera: &CameraProjection,
        view: &Mat4,
        light: &PointLight,
    ) -> ClusterBounds {
        let [xs, ys, zs] = self.config.slices();
        let radius = light.radius;

        // Camera space, with depth growing away from the camera
        let cs = (*view * light.position_vec().extend(1.0)).truncate();
        let depth = -cs.z;

        // Frustum cross-section at the light's depth
        let (width, height) = camera.extents_at_depth(depth);
        let half_width = width * 0.5;
        let half_height = height * 0.5;

        let dx = width / xs as f32;
        let dy = height / ys as f32;
        let dz = camera.depth_range() / zs as f32;

        let (x_min, x_max) = slice_range(cs.x - radius + half_width, cs.x + radius + half_width, dx, xs);
        let (y_min, y_max) = slice_range(cs.y - radius + half_height, cs.y + radius + half_height, dy, ys);
        let (z_min, z_max) = slice_range(
            depth - radius - camera.near,
            depth + radius - camera.near,
            dz,
            zs,
        );

        ClusterBounds {
            min: [x_min, y_min, z_min],
            max: [x_max, y_max, z_max],
        }
    }

    /// Rebuild every cluster's light list for this frame.
    ///
    /// All counts are reset, then lights are inserted in list order; a light's
    /// identifier is its index in `lights`. Once a cluster holds
    /// `max_lights_per_cluster` lights, later lights are skipped for that
    /// cluster only.
    pub fn update_clusters(
        &mut self,
        camera: &CameraProjection,
        view: &Mat4,
        lights: &[PointLight],
    ) -> ClusterUpdateStats {
        debug_assert!(camera.validate().is_ok(), "invalid camera: {:?}", camera);

        self.buffer.reset_counts();

        let mut stats = ClusterUpdateStats {
            lights: lights.len() as u32,
            ..Default::default()
        };

        for (id, light) in lights.iter().enumerate() {
            let bounds = self.light_bounds(camera, view, light);
            log::trace!("light {} -> clusters {:?}..={:?}", id, bounds.min, bounds.max);

            for [x, y, z] in bounds.cells() {
                let cluster = self.config.cluster_index(x, y, z);
                if self.buffer.push_light(cluster, id as u32) {
                    stats.assignments += 1;
                } else {
                    stats.dropped += 1;
                }
            }
        }

        if stats.dropped > 0 {
            log::debug!(
                "{} light slots dropped at capacity {}",
                stats.dropped,
                self.config.max_lights_per_cluster
            );
        }
        log::debug!(
            "Clustered {} lights into {} cluster slots",
            stats.lights,
            stats.assignments
        );

        stats
    }
}

/// Map `[lo, hi]` (measured from the axis origin) onto slice indices of width
/// `extent`, clamped into `[0, slices - 1]`.
///
/// Non-finite quotients (zero extent at depth 0) go through the saturating
/// float→int cast and are clamped like any other value.
#[inline]
fn slice_range(lo: f32, hi: f32, extent: f32, slices: u32) -> (u32, u32) {
    let last = slices as i64 - 1;
    let to_slice = |v: f32| ((v / extent).floor() as i64).clamp(0, last) as u32;
    (to_slice(lo), to_slice(hi))
}

// ============================================================================
// Tests
// ============================================================================
