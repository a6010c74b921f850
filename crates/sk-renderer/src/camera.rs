//! Viewport camera and screen-space projection

use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::config::CameraConfig;

/// Projection model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    /// Perspective with vertical field of view in radians
    Perspective {
        /// Vertical field of view in radians
        fov: f32,
    },
    /// Orthographic with the given half height in world units
    Orthographic {
        /// Half of the visible height in world units
        half_height: f32,
    },
}

/// Camera looking from `position` toward `target`
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye position
    pub position: Vec3,
    /// Look-at point
    pub target: Vec3,
    /// Up direction
    pub up: Vec3,
    /// Projection model
    pub projection: Projection,
    /// Width / height
    pub aspect: f32,
    /// Near clipping plane distance
    pub near: f32,
    /// Far clipping plane distance
    pub far: f32,
}

impl Camera {
    /// Create a new perspective camera with default parameters
    pub fn new(aspect: f32) -> Self {
        Self::from_config(&CameraConfig::default(), aspect)
    }

    /// Create a perspective camera from configuration
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let yaw = 45.0_f32.to_radians();
        let pitch = 30.0_f32.to_radians();
        let offset = Vec3::new(
            pitch.cos() * yaw.cos(),
            pitch.cos() * yaw.sin(),
            pitch.sin(),
        ) * config.distance;
        Self {
            position: offset,
            target: Vec3::ZERO,
            up: Vec3::Z,
            projection: Projection::Perspective {
                fov: config.fov_degrees.to_radians(),
            },
            aspect,
            near: config.near_plane,
            far: config.far_plane,
        }
    }

    /// Orthographic camera looking straight down -Z at `center`
    pub fn top_down(center: Vec3, half_height: f32, aspect: f32) -> Self {
        Self {
            position: center + Vec3::Z * 100.0,
            target: center,
            up: Vec3::Y,
            projection: Projection::Orthographic { half_height },
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Update aspect ratio
    pub fn update_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Get view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective { fov } => {
                Mat4::perspective_rh(fov, self.aspect, self.near, self.far)
            }
            Projection::Orthographic { half_height } => {
                let half_width = half_height * self.aspect;
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Combined view-projection matrix
    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Distance of a point in front of the camera along the view direction
    pub fn depth_of(&self, point: Vec3) -> f32 {
        (point - self.position).dot(self.forward())
    }

    /// Project a world point to pixel coordinates (origin top-left).
    ///
    /// Returns `None` for points behind the eye.
    pub fn world_to_screen(&self, point: Vec3, size: Vec2) -> Option<Vec2> {
        let clip = self.view_proj() * point.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * size.x,
            (1.0 - ndc.y) * 0.5 * size.y,
        ))
    }

    /// Convert screen coordinates to world ray
    pub fn screen_to_ray(&self, screen: Vec2, size: Vec2) -> (Vec3, Vec3) {
        let ndc_x = (2.0 * screen.x / size.x) - 1.0;
        let ndc_y = 1.0 - (2.0 * screen.y / size.y);

        let inv = self.view_proj().inverse();
        // glam's _rh projections map depth to [0, 1]
        let near = inv * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;

        (near, (far - near).normalize())
    }
}
