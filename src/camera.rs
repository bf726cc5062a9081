use std::f32::consts::PI;

use cgmath::{Matrix4, Rad, Vector3};

use crate::config::CameraConfig;

// cgmath builds OpenGL clip space; Vulkan wants Y flipped and depth in [0, 1].
#[rustfmt::skip]
fn vulkan_clip() -> Matrix4<f32> {
    Matrix4::new(
        1.0,  0.0, 0.0, 0.0,
        0.0, -1.0, 0.0, 0.0,
        0.0,  0.0, 0.5, 0.0,
        0.0,  0.0, 0.5, 1.0,
    )
}

/// The configured field of view only ever reaches the projection through
/// tan(fov / 2), so fold it back into the first period of tan.
pub fn effective_fov(fov: f32) -> Rad<f32> {
    Rad(2.0 * (fov / 2.0).rem_euclid(PI))
}

/// Fixed camera looking down -Z at the origin.
pub struct Camera {
    projection: Matrix4<f32>,
    view: Matrix4<f32>,
}

impl Camera {
    pub fn new(config: &CameraConfig, dimensions: [u32; 2]) -> Self {
        let aspect_ratio = dimensions[0] as f32 / dimensions[1] as f32;

        Self {
            projection: vulkan_clip() * cgmath::perspective(effective_fov(config.fov), aspect_ratio, config.near, config.far),
            view: Matrix4::from_translation(Vector3::new(0.0, 0.0, -config.distance)),
        }
    }

    #[cfg(test)]
    pub fn get_projection(&self) -> Matrix4<f32> {
        self.projection
    }

    #[cfg(test)]
    pub fn get_view(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view
    }

    pub fn mvp(&self, model: Matrix4<f32>) -> Matrix4<f32> {
        self.projection * self.view * model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector4};

    #[test]
    fn view_pulls_scene_back() {
        let camera = Camera::new(&CameraConfig::default(), [1500, 960]);
        let origin = camera.get_view() * Vector4::new(0.0, 0.0, 0.0, 1.0);

        assert_eq!(origin, Vector4::new(0.0, 0.0, -3500.0, 1.0));
    }

    #[test]
    fn origin_projects_inside_depth_range() {
        let camera = Camera::new(&CameraConfig::default(), [1500, 960]);
        let clip = camera.view_projection() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let depth = clip.z / clip.w;

        assert!(clip.w > 0.0);
        assert!(depth > 0.0 && depth < 1.0);
        assert!(clip.x.abs() < 1e-3 && clip.y.abs() < 1e-3);
    }

    #[test]
    fn folded_fov_keeps_the_same_slope() {
        let folded = effective_fov(45.0);

        assert!(folded.0 > 0.0 && folded.0 < PI);
        assert!(((folded.0 / 2.0).tan() - (22.5f32).tan()).abs() < 1e-4);
        assert_eq!(effective_fov(1.0), Rad(1.0));
    }

    #[test]
    fn identity_model_matches_backdrop_transform() {
        let camera = Camera::new(&CameraConfig::default(), [800, 600]);
        assert_eq!(camera.mvp(Matrix4::identity()), camera.view_projection());
    }
}
