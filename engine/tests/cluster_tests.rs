//! Cluster Tests - Assignment, Packed Layout, and Frame Reuse
//!
//! End-to-end tests driving the public API the way a renderer does each frame:
//! orbit camera, a scene of lights, `update_clusters`, then decoding the bytes
//! that would be uploaded to the GPU.

use glam::{Mat4, Vec3};
use cluster_lights_engine::camera::{CameraProjection, look_at, view_from_angles};
use cluster_lights_engine::render::{
    ClusterGrid, ClusterGridConfig, ClusterLookup, DEFAULT_MAX_LIGHTS_PER_CLUSTER, LightTable, PackedClusterView,
    PointLight, SurfaceSample, AMBIENT_LIGHT, shade_fragment,
};

/// Deterministic scatter of lights around the origin.
fn scatter_lights(count: usize, seed: u32) -> Vec<PointLight> {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (state >> 8) as f32 / (1u32 << 24) as f32
    };
    (0..count)
        .map(|_| {
            let position = Vec3::new(next() * 40.0 - 20.0, next() * 6.0, next() * 40.0 - 20.0);
            PointLight::at(position, 0.5 + next() * 4.0).with_color([next(), next(), next()])
        })
        .collect()
}

fn scene_camera() -> (CameraProjection, Mat4) {
    let camera = CameraProjection::new(60.0, 16.0 / 9.0, 0.5, 60.0);
    let view = look_at(Vec3::new(0.0, 8.0, 30.0), Vec3::ZERO);
    (camera, view)
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_grid_from_json_config() {
    let config = ClusterGridConfig::from_json_str(r#"{ "x_slices": 8, "y_slices": 4, "z_slices": 6 }"#).unwrap();
    assert_eq!(config.max_lights_per_cluster, DEFAULT_MAX_LIGHTS_PER_CLUSTER);

    let grid = ClusterGrid::new(config).unwrap();
    assert_eq!(grid.cluster_count(), 8 * 4 * 6);
    assert_eq!(grid.buffer().cluster_count(), grid.cluster_count());
}

#[test]
fn test_invalid_json_config_is_rejected() {
    assert!(ClusterGridConfig::from_json_str(r#"{ "x_slices": 0 }"#).is_err());
    assert!(ClusterGridConfig::from_json_str("not json").is_err());
}

// ============================================================================
// Assignment
// ============================================================================

#[test]
fn test_every_light_lands_in_exactly_its_bounds() {
    let (camera, view) = scene_camera();
    let lights = scatter_lights(200, 7);
    let mut grid = ClusterGrid::new(ClusterGridConfig::new(16, 9, 24)).unwrap();

    let stats = grid.update_clusters(&camera, &view, &lights);
    assert_eq!(stats.lights, 200);
    assert_eq!(stats.dropped, 0, "capacity 500 should never saturate with 200 lights");

    let bounds: Vec<_> = lights.iter().map(|l| grid.light_bounds(&camera, &view, l)).collect();
    let expected: u64 = bounds.iter().map(|b| b.cell_count() as u64).sum();
    assert_eq!(stats.assignments, expected);

    for cluster in 0..grid.cluster_count() {
        let coord = grid.config().cluster_coord(cluster);
        let ids: Vec<u32> = grid.buffer().lights(cluster).collect();

        // Ascending identifiers: lights are inserted in list order
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "cluster {} not ordered: {:?}", cluster, ids);

        for (id, b) in bounds.iter().enumerate() {
            assert_eq!(
                ids.contains(&(id as u32)),
                b.contains(coord),
                "light {} membership in cluster {:?}",
                id,
                coord
            );
        }
    }
}

#[test]
fn test_capacity_keeps_earliest_lights() {
    let (camera, view) = scene_camera();
    // Identical lights all covering the same clusters
    let lights = vec![PointLight::at(Vec3::ZERO, 1.0); 12];
    let mut grid = ClusterGrid::new(ClusterGridConfig::new(4, 4, 4).with_max_lights_per_cluster(5)).unwrap();

    let stats = grid.update_clusters(&camera, &view, &lights);
    let cells = grid.light_bounds(&camera, &view, &lights[0]).cell_count() as u64;
    assert!(cells > 0);
    assert_eq!(stats.assignments, cells * 5);
    assert_eq!(stats.dropped, cells * 7);

    for cluster in 0..grid.cluster_count() {
        let ids: Vec<u32> = grid.buffer().lights(cluster).collect();
        assert!(ids.is_empty() || ids == vec![0, 1, 2, 3, 4], "{:?}", ids);
    }
}

// ============================================================================
// Frame reuse
// ============================================================================

#[test]
fn test_counts_reset_every_frame() {
    let camera = CameraProjection::default();
    let lights = scatter_lights(64, 3);
    let mut grid = ClusterGrid::new(ClusterGridConfig::default()).unwrap();

    // Orbit the camera for a few frames
    for frame in 0..8 {
        let yaw = frame as f32 * 0.7;
        let eye = Vec3::new(25.0 * yaw.sin(), 4.0, 25.0 * yaw.cos());
        let view = view_from_angles(eye, -yaw, -0.1);
        let stats = grid.update_clusters(&camera, &view, &lights);

        let stored: u64 = (0..grid.cluster_count()).map(|c| grid.buffer().count(c) as u64).sum();
        assert_eq!(stored, stats.assignments, "frame {} left stale counts", frame);
    }

    let stats = grid.update_clusters(&camera, &Mat4::IDENTITY, &[]);
    assert_eq!(stats.assignments, 0);
    assert!((0..grid.cluster_count()).all(|c| grid.buffer().count(c) == 0));
}

// ============================================================================
// Packed layout
// ============================================================================

#[test]
fn test_uploaded_bytes_decode_to_same_records() {
    let (camera, view) = scene_camera();
    let lights = scatter_lights(100, 11);
    let mut grid = ClusterGrid::new(ClusterGridConfig::new(8, 8, 8).with_max_lights_per_cluster(9)).unwrap();
    grid.update_clusters(&camera, &view, &lights);

    let buffer = grid.buffer();
    // 9 ids + count = 10 scalars -> 3 elements of 4
    assert_eq!(buffer.row_stride(), 12);
    assert_eq!(buffer.byte_len(), 512 * 12 * 4);

    let decoded = PackedClusterView::from_bytes(buffer.as_bytes(), buffer.row_stride()).unwrap();
    assert_eq!(decoded.cluster_count(), 512);
    for cluster in 0..512 {
        assert_eq!(decoded.decode(cluster), buffer.record(cluster), "cluster {}", cluster);
    }
}

// ============================================================================
// Shading
// ============================================================================

#[test]
fn test_lit_surface_is_brighter_than_ambient() {
    let (camera, view) = scene_camera();
    let config = ClusterGridConfig::new(16, 9, 24);
    let mut grid = ClusterGrid::new(config).unwrap();

    let table = LightTable::from_lights(vec![PointLight::at(Vec3::new(0.0, 1.0, 0.0), 4.0).with_intensity(2.0)]);
    grid.update_clusters(&camera, &view, table.lights());

    let lookup = ClusterLookup::new(&config, &camera, 1920, 1080);
    let surface = SurfaceSample {
        position: Vec3::ZERO,
        normal: Vec3::Y,
        albedo: Vec3::ONE,
    };
    let frag = lookup
        .project_to_pixel(&camera, view.transform_point3(surface.position))
        .unwrap();

    let color = shade_fragment(&lookup, &grid.buffer().view(), &table, &view, frag, &surface);
    assert!(color.x > AMBIENT_LIGHT * 2.0, "{:?}", color);
}
