//! Shading-Stage Cluster Lookup
//!
//! CPU reference of what the deferred lighting shader does per pixel:
//! find the pixel's cluster, read that cluster's light identifiers from the
//! packed buffer, and accumulate each light with a cubic falloff that reaches
//! zero at the light's radius. `shaders/cluster_lighting.wgsl` implements the
//! same arithmetic on the GPU.
//!
//! Fragment coordinates here use a bottom-left origin so that cluster row 0 is
//! the bottom of the screen, matching camera-space +Y being up.

use glam::{Mat4, Vec3};

use super::cluster_buffer::PackedClusterView;
use super::cluster_config::ClusterGridConfig;
use super::point_lights::LightTable;
use crate::camera::CameraProjection;

/// Ambient term added to every shaded pixel.
pub const AMBIENT_LIGHT: f32 = 0.025;

/// Cubic approximation of a gaussian that falls off to exactly 0 at `h = 2`.
///
/// `h` is `2 * distance / radius`, so the light stops contributing at its radius.
#[inline]
pub fn cubic_gaussian(h: f32) -> f32 {
    if h < 1.0 {
        let a = 2.0 - h;
        let b = 1.0 - h;
        0.25 * a * a * a - b * b * b
    } else if h < 2.0 {
        let a = 2.0 - h;
        0.25 * a * a * a
    } else {
        0.0
    }
}

/// Falloff multiplier for a point `distance` away from a light of `radius`.
#[inline]
pub fn light_attenuation(distance: f32, radius: f32) -> f32 {
    cubic_gaussian(2.0 * distance / radius)
}

/// Screen-to-cluster mapping used by the shading stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterLookup {
    pub x_slices: u32,
    pub y_slices: u32,
    pub z_slices: u32,
    pub near: f32,
    pub far: f32,
    pub screen_width: f32,
    pub screen_height: f32,
}

impl ClusterLookup {
    pub fn new(config: &ClusterGridConfig, camera: &CameraProjection, screen_width: u32, screen_height: u32) -> Self {
        Self {
            x_slices: config.x_slices,
            y_slices: config.y_slices,
            z_slices: config.z_slices,
            near: camera.near,
            far: camera.far,
            screen_width: screen_width as f32,
            screen_height: screen_height as f32,
        }
    }

    /// Cluster coordinate for a fragment at `(frag_x, frag_y)` (bottom-left
    /// origin, pixels) with positive camera-space depth `view_depth`.
    ///
    /// Each axis is clamped into the grid, so fragments on the far plane or in
    /// front of the near plane map to the boundary slices.
    pub fn cluster_coord(&self, frag_x: f32, frag_y: f32, view_depth: f32) -> [u32; 3] {
        let axis = |v: f32, slices: u32| (v.floor() as i64).clamp(0, slices as i64 - 1) as u32;
        [
            axis(frag_x * self.x_slices as f32 / self.screen_width, self.x_slices),
            axis(frag_y * self.y_slices as f32 / self.screen_height, self.y_slices),
            axis(
                (view_depth - self.near) * self.z_slices as f32 / (self.far - self.near),
                self.z_slices,
            ),
        ]
    }

    /// Flattened cluster index, `x + y * x_slices + z * x_slices * y_slices`.
    pub fn cluster_index(&self, frag_x: f32, frag_y: f32, view_depth: f32) -> usize {
        let [x, y, z] = self.cluster_coord(frag_x, frag_y, view_depth);
        let xs = self.x_slices as usize;
        let ys = self.y_slices as usize;
        x as usize + y as usize * xs + z as usize * xs * ys
    }

    /// Pixel (bottom-left origin) at which a camera-space point projects.
    ///
    /// Returns `None` for points at or behind the camera plane.
    pub fn project_to_pixel(&self, camera: &CameraProjection, view_position: Vec3) -> Option<(f32, f32)> {
        let depth = -view_position.z;
        if depth <= 0.0 {
            return None;
        }
        let (width, height) = camera.extents_at_depth(depth);
        let u = view_position.x / width + 0.5;
        let v = view_position.y / height + 0.5;
        Some((u * self.screen_width, v * self.screen_height))
    }
}

/// G-buffer sample for one pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSample {
    /// World-space position
    pub position: Vec3,
    /// World-space unit normal
    pub normal: Vec3,
    /// Diffuse albedo
    pub albedo: Vec3,
}

/// Shade one pixel using only the lights of its cluster.
///
/// Identifiers missing from `lights` are skipped.
pub fn shade_fragment(
    lookup: &ClusterLookup,
    clusters: &PackedClusterView<'_>,
    lights: &LightTable,
    view: &Mat4,
    frag: (f32, f32),
    surface: &SurfaceSample,
) -> Vec3 {
    let view_depth = -view.transform_point3(surface.position).z;
    let cluster = lookup.cluster_index(frag.0, frag.1, view_depth);

    let mut color = Vec3::ZERO;
    for k in 1..=clusters.count(cluster) {
        let Some(light) = lights.get(clusters.light_id(cluster, k)) else {
            continue;
        };
        let to_light = light.position_vec() - surface.position;
        let distance = to_light.length();
        let l = to_light / distance.max(1e-4);
        let falloff = light_attenuation(distance, light.radius);
        let lambert = l.dot(surface.normal).max(0.0);
        color += surface.albedo * lambert * light.color_vec() * light.intensity * falloff;
    }

    color + surface.albedo * AMBIENT_LIGHT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::cluster_grid::ClusterGrid;
    use crate::render::point_lights::PointLight;

    fn setup() -> (ClusterGridConfig, CameraProjection, ClusterLookup) {
        let config = ClusterGridConfig::new(4, 4, 3);
        let camera = CameraProjection::new(90.0, 1.0, 1.0, 10.0);
        let lookup = ClusterLookup::new(&config, &camera, 800, 800);
        (config, camera, lookup)
    }

    #[test]
    fn test_cubic_gaussian_shape() {
        // Continuous at h = 1 and reaches zero at h = 2
        assert!((cubic_gaussian(0.0) - 1.0).abs() < 1e-6);
        assert!((cubic_gaussian(1.0) - 0.25).abs() < 1e-6);
        assert!((cubic_gaussian(0.999_99) - 0.25).abs() < 1e-3);
        assert_eq!(cubic_gaussian(2.0), 0.0);
        assert_eq!(cubic_gaussian(5.0), 0.0);

        // Monotonically decreasing on [0, 2]
        let samples: Vec<f32> = (0..=20).map(|i| cubic_gaussian(i as f32 * 0.1)).collect();
        assert!(samples.windows(2).all(|w| w[0] >= w[1]), "{:?}", samples);
    }

    #[test]
    fn test_attenuation_zero_at_radius() {
        assert_eq!(light_attenuation(5.0, 5.0), 0.0);
        assert_eq!(light_attenuation(6.0, 5.0), 0.0);
        assert!(light_attenuation(1.0, 5.0) > 0.0);
    }

    #[test]
    fn test_cluster_coord_corners() {
        let (_, _, lookup) = setup();
        assert_eq!(lookup.cluster_coord(0.0, 0.0, 1.0), [0, 0, 0]);
        assert_eq!(lookup.cluster_coord(799.0, 799.0, 9.99), [3, 3, 2]);
        assert_eq!(lookup.cluster_coord(450.0, 150.0, 5.0), [2, 0, 1]);
    }

    #[test]
    fn test_cluster_coord_clamps_out_of_range() {
        let (_, _, lookup) = setup();
        // Exactly on the far plane and past the screen edge
        assert_eq!(lookup.cluster_coord(800.0, 800.0, 10.0), [3, 3, 2]);
        // Closer than the near plane
        assert_eq!(lookup.cluster_coord(-5.0, 10.0, 0.2), [0, 0, 0]);
        assert_eq!(lookup.cluster_coord(10.0, 10.0, f32::NAN), [0, 0, 0]);
    }

    #[test]
    fn test_cluster_index_matches_config_flattening() {
        let (config, _, lookup) = setup();
        let [x, y, z] = lookup.cluster_coord(610.0, 390.0, 7.5);
        assert_eq!(lookup.cluster_index(610.0, 390.0, 7.5), config.cluster_index(x, y, z));
    }

    #[test]
    fn test_encoder_and_decoder_agree_on_light_cluster() {
        let (config, camera, lookup) = setup();
        let mut grid = ClusterGrid::new(config).unwrap();
        // Small light well inside one cluster
        let position = Vec3::new(0.9, -1.3, -6.0);
        let light = PointLight::at(position, 0.05);
        grid.update_clusters(&camera, &Mat4::IDENTITY, &[light]);

        let (px, py) = lookup.project_to_pixel(&camera, position).unwrap();
        let cluster = lookup.cluster_index(px, py, 6.0);
        assert_eq!(grid.buffer().view().decode(cluster).indices, vec![0]);
    }

    #[test]
    fn test_project_behind_camera_is_none() {
        let (_, camera, lookup) = setup();
        assert!(lookup.project_to_pixel(&camera, Vec3::new(0.0, 0.0, 1.0)).is_none());
        let (px, py) = lookup.project_to_pixel(&camera, Vec3::new(0.0, 0.0, -3.0)).unwrap();
        assert!((px - 400.0).abs() < 1e-3 && (py - 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_shade_fragment_uses_cluster_lights_only() {
        let (config, camera, lookup) = setup();
        let mut grid = ClusterGrid::new(config).unwrap();
        let view = Mat4::IDENTITY;

        let surface = SurfaceSample {
            position: Vec3::new(0.0, 0.0, -5.0),
            normal: Vec3::Z,
            albedo: Vec3::ONE,
        };
        let lights = LightTable::from_lights(vec![
            // In front of the surface, within range
            PointLight::at(Vec3::new(0.0, 0.0, -4.0), 3.0).with_color([1.0, 0.0, 0.0]),
            // Far away in another cluster
            PointLight::at(Vec3::new(-3.0, -3.0, -9.5), 0.2).with_color([0.0, 1.0, 0.0]),
        ]);
        grid.update_clusters(&camera, &view, lights.lights());

        let frag = lookup.project_to_pixel(&camera, surface.position).unwrap();
        let color = shade_fragment(&lookup, &grid.buffer().view(), &lights, &view, frag, &surface);

        // Red light: distance 1, radius 3 -> h = 2/3
        let expected_red = cubic_gaussian(2.0 / 3.0) + AMBIENT_LIGHT;
        assert!((color.x - expected_red).abs() < 1e-4, "{:?}", color);
        assert!((color.y - AMBIENT_LIGHT).abs() < 1e-6, "green light must not reach: {:?}", color);
        assert!((color.z - AMBIENT_LIGHT).abs() < 1e-6);
    }

    #[test]
    fn test_shade_fragment_empty_cluster_is_ambient() {
        let (config, camera, lookup) = setup();
        let grid = ClusterGrid::new(config).unwrap();
        let surface = SurfaceSample {
            position: Vec3::new(0.0, 0.0, -5.0),
            normal: Vec3::Z,
            albedo: Vec3::new(0.5, 0.5, 0.5),
        };
        let color = shade_fragment(
            &lookup,
            &grid.buffer().view(),
            &LightTable::with_capacity(0),
            &Mat4::IDENTITY,
            (400.0, 400.0),
            &surface,
        );
        assert!((color - Vec3::splat(0.5 * AMBIENT_LIGHT)).length() < 1e-6);
    }
}
