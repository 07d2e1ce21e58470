use cgmath::{perspective, Deg, Matrix4, Vector3};
use log::debug;
use winit::dpi::PhysicalSize;

use crate::{config::CameraConfig, graphics::Camera};

/// Camera parked on the +Z axis looking at the origin.
pub struct FixedCamera {
    fov: Deg<f32>,
    aspect_ratio: f32,
    near: f32,
    far: f32,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
}

impl FixedCamera {
    pub fn new(config: &CameraConfig, size: PhysicalSize<u32>) -> Self {
        let fov = Deg(config.fov_degrees);
        let aspect_ratio = aspect_of(size).unwrap_or(1.0);

        FixedCamera {
            fov,
            aspect_ratio,
            near: config.near,
            far: config.far,
            view: Matrix4::from_translation(Vector3::new(0.0, 0.0, -config.distance)),
            projection: perspective(fov, aspect_ratio, config.near, config.far),
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Recomputes the projection if the aspect ratio changed. Returns whether it did.
    pub fn resize(&mut self, size: PhysicalSize<u32>) -> bool {
        let Some(aspect_ratio) = aspect_of(size) else {
            return false;
        };

        if aspect_ratio == self.aspect_ratio {
            return false;
        }

        debug!("aspect ratio: {}", aspect_ratio);
        self.aspect_ratio = aspect_ratio;
        self.projection = perspective(self.fov, self.aspect_ratio, self.near, self.far);
        true
    }
}

impl Camera for FixedCamera {
    fn calculate_matrices(&self) -> (Matrix4<f32>, Matrix4<f32>) {
        (self.projection, self.view)
    }
}

fn aspect_of(size: PhysicalSize<u32>) -> Option<f32> {
    if size.width == 0 || size.height == 0 {
        None
    } else {
        Some(size.width as f32 / size.height as f32)
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Vector4;

    use super::*;

    fn camera(width: u32, height: u32) -> FixedCamera {
        FixedCamera::new(&CameraConfig::default(), PhysicalSize::new(width, height))
    }

    #[test]
    fn projection_uses_window_aspect() {
        let camera = camera(800, 600);
        let (projection, _) = camera.calculate_matrices();
        let expected = perspective(Deg(60.0), 800.0 / 600.0, 1.0, 100.0);
        assert_eq!(projection, expected);
    }

    #[test]
    fn view_moves_scene_three_units_away() {
        let (_, view) = camera(800, 600).calculate_matrices();
        let origin = view * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(origin, Vector4::new(0.0, 0.0, -3.0, 1.0));
    }

    #[test]
    fn resize_with_new_aspect_recomputes_projection() {
        let mut camera = camera(800, 600);
        let (before, _) = camera.calculate_matrices();

        assert!(camera.resize(PhysicalSize::new(1000, 500)));
        let (after, _) = camera.calculate_matrices();

        assert_ne!(before, after);
        assert_eq!(after, perspective(Deg(60.0), 2.0, 1.0, 100.0));
    }

    #[test]
    fn resize_with_same_aspect_is_a_no_op() {
        let mut camera = camera(800, 600);
        assert!(!camera.resize(PhysicalSize::new(400, 300)));
    }

    #[test]
    fn minimized_window_keeps_previous_projection() {
        let mut camera = camera(800, 600);
        let (before, _) = camera.calculate_matrices();
        assert!(!camera.resize(PhysicalSize::new(0, 0)));
        assert_eq!(camera.calculate_matrices().0, before);
        assert_eq!(camera.aspect_ratio(), 800.0 / 600.0);
    }
}
