//! Perspective projection tracking the framebuffer size.

use glam::Mat4;

/// Fixed-FOV perspective projection. Only the aspect ratio changes at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveProjection {
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
    width: u32,
    height: u32,
}

impl PerspectiveProjection {
    /// Create a projection for a `width x height` framebuffer.
    pub fn new(fov_y_deg: f32, near: f32, far: f32, width: u32, height: u32) -> Self {
        Self {
            fov_y_deg,
            near,
            far,
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Track a framebuffer resize. Zero dimensions (minimized windows) clamp to 1.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    /// Width / height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Framebuffer size the projection was last resized to.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Right-handed projection with a 0..1 depth range.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_deg.to_radians(),
            self.aspect_ratio(),
            self.near,
            self.far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_aspect_follows_resize() {
        let mut proj = PerspectiveProjection::new(45.0, 0.1, 1000.0, 1024, 768);
        assert!((proj.aspect_ratio() - 1024.0 / 768.0).abs() < 1e-6);
        proj.resize(1920, 1080);
        assert!((proj.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(proj.size(), (1920, 1080));
    }

    #[test]
    fn test_zero_size_clamped() {
        let mut proj = PerspectiveProjection::new(45.0, 0.1, 1000.0, 0, 0);
        assert_eq!(proj.size(), (1, 1));
        proj.resize(800, 0);
        assert_eq!(proj.size(), (800, 1));
        assert!(proj.matrix().is_finite());
    }

    #[test]
    fn test_near_and_far_map_to_depth_range() {
        let proj = PerspectiveProjection::new(45.0, 0.1, 1000.0, 1024, 768);
        let m = proj.matrix();
        let near = m * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = m * Vec4::new(0.0, 0.0, -1000.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }
}
