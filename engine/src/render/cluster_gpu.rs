//! Cluster GPU Transport
//!
//! Uploads the per-frame cluster data to GPU buffers read by the deferred
//! lighting shader (`shaders/cluster_lighting.wgsl`).
//!
//! ## Bind Group Layout
//!
//! | Binding | Type | Access | Description |
//! |---------|------|--------|-------------|
//! | 0 | Uniform Buffer | Read-only | `ClusterUniforms` (view matrix, grid, screen) |
//! | 1 | Storage Buffer | Read-only | Packed cluster rows (`array<vec4<u32>>`) |
//! | 2 | Storage Buffer | Read-only | Light attribute table (`array<PointLight>`) |
//!
//! Buffers are allocated once; [`ClusterGpuResources::upload`] rewrites them
//! after every [`ClusterGrid::update_clusters`](super::cluster_grid::ClusterGrid::update_clusters).

use glam::Mat4;

use super::cluster_grid::ClusterGrid;
use super::point_lights::{POINT_LIGHT_SIZE, PointLight};
use crate::camera::CameraProjection;

/// Per-frame uniforms for the lighting shader.
///
/// WGSL Layout (112 bytes):
///   offset   0: view (mat4x4<f32>) - World→camera transform
///   offset  64: x_slices, y_slices, z_slices, row_stride (u32 × 4)
///   offset  80: near, far, screen_width, screen_height (f32 × 4)
///   offset  96: light_count, max_lights_per_cluster, _pad0, _pad1 (u32 × 4)
///   TOTAL: 112 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ClusterUniforms {
    /// World→camera view matrix, column-major
    pub view: [[f32; 4]; 4],
    pub x_slices: u32,
    pub y_slices: u32,
    pub z_slices: u32,
    /// Scalars per cluster row (multiple of 4)
    pub row_stride: u32,
    pub near: f32,
    pub far: f32,
    pub screen_width: f32,
    pub screen_height: f32,
    /// Number of valid entries in the light table
    pub light_count: u32,
    pub max_lights_per_cluster: u32,
    pub _pad0: u32,
    pub _pad1: u32,
}

/// Size of ClusterUniforms in bytes (112 bytes)
pub const CLUSTER_UNIFORMS_SIZE: usize = std::mem::size_of::<ClusterUniforms>();

const _: () = {
    assert!(
        std::mem::size_of::<ClusterUniforms>() == 112,
        "ClusterUniforms must be 112 bytes to match WGSL"
    );
    assert!(
        std::mem::size_of::<ClusterUniforms>() % 16 == 0,
        "Uniform buffers must be a multiple of 16 bytes"
    );
};

impl ClusterUniforms {
    /// Gather the uniforms for one frame.
    pub fn new(
        grid: &ClusterGrid,
        camera: &CameraProjection,
        view: &Mat4,
        screen_size: (u32, u32),
        light_count: u32,
    ) -> Self {
        let config = grid.config();
        Self {
            view: view.to_cols_array_2d(),
            x_slices: config.x_slices,
            y_slices: config.y_slices,
            z_slices: config.z_slices,
            row_stride: config.row_stride() as u32,
            near: camera.near,
            far: camera.far,
            screen_width: screen_size.0 as f32,
            screen_height: screen_size.1 as f32,
            light_count,
            max_lights_per_cluster: config.max_lights_per_cluster,
            _pad0: 0,
            _pad1: 0,
        }
    }
}

/// Layout entries for the cluster lighting bind group (group 0).
pub fn cluster_bind_group_layout_entries() -> [wgpu::BindGroupLayoutEntry; 3] {
    let storage = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    };

    [
        // Binding 0: Cluster uniforms
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(CLUSTER_UNIFORMS_SIZE as u64),
            },
            count: None,
        },
        // Binding 1: Packed cluster rows
        storage(1),
        // Binding 2: Light attribute table
        storage(2),
    ]
}

/// GPU buffers and bind group for the cluster lighting pass.
pub struct ClusterGpuResources {
    uniform_buffer: wgpu::Buffer,
    cluster_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    light_capacity: usize,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl ClusterGpuResources {
    /// Allocate buffers sized for `grid` and a table of `light_capacity` lights.
    pub fn new(device: &wgpu::Device, grid: &ClusterGrid, light_capacity: usize) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cluster Uniforms Buffer"),
            size: CLUSTER_UNIFORMS_SIZE as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let cluster_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cluster Light Lists Buffer"),
            size: grid.buffer().byte_len() as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Storage bindings must not be empty
        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cluster Point Lights Buffer"),
            size: (light_capacity.max(1) * POINT_LIGHT_SIZE) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Cluster Lighting Bind Group Layout"),
            entries: &cluster_bind_group_layout_entries(),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Cluster Lighting Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: cluster_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        log::debug!(
            "Created cluster GPU buffers: {} bytes of cluster rows, {} light slots",
            grid.buffer().byte_len(),
            light_capacity
        );

        Self {
            uniform_buffer,
            cluster_buffer,
            light_buffer,
            light_capacity,
            bind_group_layout,
            bind_group,
        }
    }

    /// Write this frame's cluster rows, light table and uniforms.
    ///
    /// Lights past the allocated capacity are not uploaded and the uniform
    /// light count is capped to match.
    pub fn upload(
        &self,
        queue: &wgpu::Queue,
        grid: &ClusterGrid,
        lights: &[PointLight],
        uniforms: &ClusterUniforms,
    ) {
        let uploaded = if lights.len() > self.light_capacity {
            log::warn!(
                "Light table holds {} lights, uploading the first {}",
                lights.len(),
                self.light_capacity
            );
            &lights[..self.light_capacity]
        } else {
            lights
        };

        queue.write_buffer(&self.cluster_buffer, 0, grid.buffer().as_bytes());
        if !uploaded.is_empty() {
            queue.write_buffer(&self.light_buffer, 0, bytemuck::cast_slice(uploaded));
        }

        let uniforms = ClusterUniforms {
            light_count: uploaded.len() as u32,
            ..*uniforms
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Get the bind group for shader access.
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Get the bind group layout for pipeline creation.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Number of lights the table buffer can hold.
    pub fn light_capacity(&self) -> usize {
        self.light_capacity
    }
}
