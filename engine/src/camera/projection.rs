//! Camera Projection Parameters
//!
//! The subset of camera state the cluster assignment needs: a symmetric
//! perspective frustum described by vertical field of view, aspect ratio and
//! the two clip distances, plus helpers that build world→camera view matrices.
//!
//! ## Coordinate System
//!
//! - X: Right (+X is screen right)
//! - Y: Up (+Y is screen up)
//! - Z: Out of the screen (camera looks toward -Z in view space)
//!
//! Cluster math works with a positive "view depth", i.e. the negated view-space Z.

use glam::{Mat4, Vec3};

use crate::render::cluster_config::ClusterError;

/// Perspective frustum parameters, supplied fresh each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraProjection {
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    /// Aspect ratio (width / height)
    pub aspect_ratio: f32,
    /// Near clip distance (positive)
    pub near: f32,
    /// Far clip distance (greater than `near`)
    pub far: f32,
}

impl Default for CameraProjection {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraProjection {
    /// Create a projection from a vertical field of view in degrees.
    pub fn new(fov_y_degrees: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y_degrees,
            aspect_ratio,
            near,
            far,
        }
    }

    /// Create a projection from a vertical field of view in radians.
    pub fn from_radians(fov_y: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self::new(fov_y.to_degrees(), aspect_ratio, near, far)
    }

    /// Vertical field of view in radians.
    #[inline]
    pub fn fov_y(&self) -> f32 {
        self.fov_y_degrees.to_radians()
    }

    /// Frustum height at unit view depth: `2 * tan(fov / 2)`.
    #[inline]
    pub fn unit_height(&self) -> f32 {
        2.0 * (self.fov_y() * 0.5).tan()
    }

    /// Frustum width at unit view depth: `aspect * unit_height`.
    #[inline]
    pub fn unit_width(&self) -> f32 {
        self.aspect_ratio * self.unit_height()
    }

    /// Full frustum extents `(width, height)` at the given view depth.
    ///
    /// Both grow linearly with depth; a negative depth (behind the camera)
    /// yields negative extents.
    #[inline]
    pub fn extents_at_depth(&self, depth: f32) -> (f32, f32) {
        (self.unit_width() * depth, self.unit_height() * depth)
    }

    /// Distance between the clip planes.
    #[inline]
    pub fn depth_range(&self) -> f32 {
        self.far - self.near
    }

    /// Check the frustum preconditions: `far > near > 0`, positive aspect and a
    /// field of view strictly between 0° and 180°.
    pub fn validate(&self) -> Result<(), ClusterError> {
        let finite = self.fov_y_degrees.is_finite()
            && self.aspect_ratio.is_finite()
            && self.near.is_finite()
            && self.far.is_finite();

        if !finite
            || self.near <= 0.0
            || self.far <= self.near
            || self.aspect_ratio <= 0.0
            || self.fov_y_degrees <= 0.0
            || self.fov_y_degrees >= 180.0
        {
            return Err(ClusterError::InvalidCamera {
                fov_y_degrees: self.fov_y_degrees,
                aspect_ratio: self.aspect_ratio,
                near: self.near,
                far: self.far,
            });
        }
        Ok(())
    }

    /// Matching right-handed perspective projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y(), self.aspect_ratio, self.near, self.far)
    }
}

/// Forward direction for a yaw/pitch pair.
///
/// Yaw 0 looks toward -Z, positive pitch looks up.
pub fn forward_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    Vec3::new(
        yaw.sin() * pitch.cos(),
        pitch.sin(),
        -yaw.cos() * pitch.cos(),
    )
    .normalize()
}

/// World→camera view matrix for a camera at `position` oriented by yaw/pitch.
pub fn view_from_angles(position: Vec3, yaw: f32, pitch: f32) -> Mat4 {
    look_to(position, forward_from_angles(yaw, pitch))
}

/// World→camera view matrix for a camera at `eye` looking at `target`.
pub fn look_at(eye: Vec3, target: Vec3) -> Mat4 {
    let forward = (target - eye).try_normalize().unwrap_or(Vec3::NEG_Z);
    look_to(eye, forward)
}

fn look_to(eye: Vec3, forward: Vec3) -> Mat4 {
    // Looking straight up or down makes Y degenerate as an up vector
    let up = if forward.cross(Vec3::Y).length_squared() > 1e-8 {
        Vec3::Y
    } else {
        Vec3::Z
    };
    Mat4::look_to_rh(eye, forward, up)
}

/// Positive view depth of a world-space point (negated view-space Z).
#[inline]
pub fn view_depth(view: &Mat4, world: Vec3) -> f32 {
    -view.transform_point3(world).z
}
