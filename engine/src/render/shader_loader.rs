//! Shader Loading Utilities
//!
//! Loads the WGSL source of the cluster lighting pass, either embedded at
//! compile time or read from disk for hot reload during development.

use std::path::Path;

/// Shader source that can be either embedded at compile time or loaded at runtime.
pub enum ShaderSource {
    /// Embedded shader source (no file I/O at runtime)
    Embedded(&'static str),
    /// Runtime-loaded shader source
    Runtime(String),
}

impl ShaderSource {
    /// Get the shader source as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            ShaderSource::Embedded(s) => s,
            ShaderSource::Runtime(s) => s.as_str(),
        }
    }

    /// The cluster lighting shader compiled into the binary.
    pub fn cluster_lighting() -> Self {
        ShaderSource::Embedded(embedded::CLUSTER_LIGHTING)
    }
}

/// Load a shader from the filesystem at runtime.
pub fn load_shader_file(path: impl AsRef<Path>) -> Result<ShaderSource, std::io::Error> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)?;
    log::debug!("Loaded shader {} ({} bytes)", path.display(), source.len());
    Ok(ShaderSource::Runtime(source))
}

/// Create a wgpu shader module from the given source.
pub fn create_shader_module(device: &wgpu::Device, label: &str, source: &ShaderSource) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.as_str().into()),
    })
}

/// Shader paths relative to the crate root.
pub mod paths {
    /// Clustered deferred lighting (full-screen pass)
    pub const CLUSTER_LIGHTING: &str = "engine/shaders/cluster_lighting.wgsl";
}

/// Embedded shaders that are compiled into the binary.
pub mod embedded {
    /// Clustered deferred lighting, embedded at compile time.
    pub const CLUSTER_LIGHTING: &str = include_str!("../../shaders/cluster_lighting.wgsl");

    /// Vertex entry point of the lighting pass.
    pub const CLUSTER_LIGHTING_VS: &str = "vs_fullscreen";

    /// Fragment entry point of the lighting pass.
    pub const CLUSTER_LIGHTING_FS: &str = "fs_main";
}
