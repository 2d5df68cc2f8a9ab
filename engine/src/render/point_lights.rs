//! Point Light Records and the Light Attribute Table
//!
//! Lights are identified by their index in the scene's light list. The cluster
//! buffer stores only those identifiers; the shading stage looks each one up in
//! this table (uploaded as a separate storage buffer) to fetch position,
//! radius and color.

use glam::Vec3;

/// Size of one GPU light record in bytes.
pub const POINT_LIGHT_SIZE: usize = std::mem::size_of::<PointLight>();

/// GPU-compatible point light data structure.
///
/// Layout (32 bytes total, matches WGSL `PointLight`):
/// - position:  vec3<f32> (12 bytes) - World position of the light
/// - radius:    f32 (4 bytes) - Falloff distance; the light contributes nothing beyond it
/// - color:     vec3<f32> (12 bytes) - RGB color of the light
/// - intensity: f32 (4 bytes) - Scalar multiplier applied during shading
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLight {
    /// World position (x, y, z) - 12 bytes
    pub position: [f32; 3],
    /// Falloff radius - 4 bytes
    pub radius: f32,
    /// RGB color components - 12 bytes
    pub color: [f32; 3],
    /// Intensity multiplier - 4 bytes
    pub intensity: f32,
}

static_assertions::assert_eq_size!(PointLight, [u8; 32]);

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            radius: 5.0,
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
        }
    }
}

impl PointLight {
    /// Create a new point light with the given parameters.
    pub fn new(position: [f32; 3], color: [f32; 3], radius: f32, intensity: f32) -> Self {
        Self {
            position,
            radius,
            color,
            intensity,
        }
    }

    /// White light at `position` with the given radius.
    pub fn at(position: Vec3, radius: f32) -> Self {
        Self::default()
            .with_position(position.to_array())
            .with_radius(radius)
    }

    /// Set position and return self for chaining.
    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.position = position;
        self
    }

    /// Set color and return self for chaining.
    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    /// Set radius and return self for chaining.
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Set intensity and return self for chaining.
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// World position as a vector.
    #[inline]
    pub fn position_vec(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    /// Color as a vector.
    #[inline]
    pub fn color_vec(&self) -> Vec3 {
        Vec3::from_array(self.color)
    }
}

/// Fixed-capacity light attribute table keyed by light identifier.
///
/// The identifier of a light is its index in the table, which is the value
/// recorded in the cluster buffer.
#[derive(Clone, Debug)]
pub struct LightTable {
    lights: Vec<PointLight>,
    capacity: usize,
}

impl LightTable {
    /// Create an empty table that accepts up to `capacity` lights.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lights: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Build a table from a light list; its length becomes the capacity.
    pub fn from_lights(lights: Vec<PointLight>) -> Self {
        let capacity = lights.len();
        Self { lights, capacity }
    }

    /// Append a light, returning its identifier, or `None` if the table is full.
    pub fn push(&mut self, light: PointLight) -> Option<u32> {
        if self.lights.len() >= self.capacity {
            return None;
        }
        let id = self.lights.len() as u32;
        self.lights.push(light);
        Some(id)
    }

    /// Look up a light by identifier.
    #[inline]
    pub fn get(&self, id: u32) -> Option<&PointLight> {
        self.lights.get(id as usize)
    }

    /// Mutable access for per-frame scene updates.
    #[inline]
    pub fn get_mut(&mut self, id: u32) -> Option<&mut PointLight> {
        self.lights.get_mut(id as usize)
    }

    /// All lights in identifier order.
    #[inline]
    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    /// Number of lights in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Whether the table holds no lights.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Maximum number of lights.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remove every light.
    pub fn clear(&mut self) {
        self.lights.clear();
    }

    /// Raw bytes for upload.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.lights)
    }
}
