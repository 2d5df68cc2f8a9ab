//! Render Module
//!
//! Clustered point-light assignment and the GPU plumbing that feeds it to the
//! deferred lighting pass.
//!
//! Per frame:
//! 1. [`ClusterGrid::update_clusters`] bins every light into the view-frustum
//!    clusters its bounding sphere overlaps.
//! 2. [`ClusterGpuResources::upload`] copies the packed cluster rows, the
//!    light table and the uniforms to the GPU.
//! 3. `cluster_lighting.wgsl` decodes each pixel's cluster and shades it with
//!    only those lights ([`cluster_lookup`] is the CPU reference).

pub mod cluster_buffer;
pub mod cluster_config;
pub mod cluster_gpu;
pub mod cluster_grid;
pub mod cluster_lookup;
pub mod point_lights;
pub mod shader_loader;

// Re-export commonly used types for convenience
pub use cluster_buffer::{ClusterBuffer, ClusterRecord, PackedClusterView};
pub use cluster_config::{
    CHANNELS_PER_ELEMENT, ClusterError, ClusterGridConfig, DEFAULT_MAX_LIGHTS_PER_CLUSTER, DEFAULT_SLICES,
};
pub use cluster_gpu::{CLUSTER_UNIFORMS_SIZE, ClusterGpuResources, ClusterUniforms, cluster_bind_group_layout_entries};
pub use cluster_grid::{ClusterBounds, ClusterGrid, ClusterUpdateStats};
pub use cluster_lookup::{AMBIENT_LIGHT, ClusterLookup, SurfaceSample, cubic_gaussian, light_attenuation, shade_fragment};
pub use point_lights::{LightTable, POINT_LIGHT_SIZE, PointLight};
pub use shader_loader::{ShaderSource, create_shader_module, load_shader_file};
