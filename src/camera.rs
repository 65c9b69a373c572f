use glam::{Mat4, Vec3};

pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, 2.0);

const FOV_Y_DEGREES: f32 = 60.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub world_up: Vec3,
    pub aspect: f32,
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,

    view: Mat4,
    projection: Mat4,
    view_projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::new_with_position(CAMERA_POSITION)
    }

    pub fn new_with_position(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            target: Vec3::ZERO,
            world_up: Vec3::Y,
            aspect: 1.0,
            fov_y: FOV_Y_DEGREES.to_radians(),
            z_near: Z_NEAR,
            z_far: Z_FAR,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
        };
        camera.update();
        camera
    }

    /// Takes effect on the next [`Camera::update`].
    pub fn set_parameters(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn update(&mut self) {
        self.view = Mat4::look_at_rh(self.position, self.target, self.world_up);
        self.projection = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        self.view_projection = self.projection * self.view;
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    /// Combined matrix taking object-space positions of an instance placed
    /// by `model` to clip space.
    pub fn local_to_projection(&self, model: Mat4) -> Mat4 {
        self.view_projection * model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn origin_lands_in_the_middle_of_the_screen() {
        let mut camera = Camera::new();
        camera.set_parameters(16.0 / 9.0);
        camera.update();

        let clip = camera.view_projection() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn aspect_stretches_horizontal_extent() {
        let mut camera = Camera::new();
        let point = Vec4::new(0.5, 0.5, 0.0, 1.0);

        camera.set_parameters(1.0);
        camera.update();
        let square = camera.view_projection() * point;

        camera.set_parameters(2.0);
        camera.update();
        let wide = camera.view_projection() * point;

        let square_x = square.x / square.w;
        let wide_x = wide.x / wide.w;
        assert!((square_x - 2.0 * wide_x).abs() < 1e-5);
        assert!((square.y / square.w - wide.y / wide.w).abs() < 1e-5);
    }

    #[test]
    fn degenerate_aspect_is_ignored() {
        let mut camera = Camera::new();
        camera.set_parameters(1.5);
        camera.set_parameters(0.0);
        camera.set_parameters(f32::NAN);
        assert_eq!(camera.aspect, 1.5);
    }

    #[test]
    fn local_to_projection_applies_model_first() {
        let mut camera = Camera::new();
        camera.update();
        let model = Mat4::from_translation(Vec3::new(0.3, 0.0, 0.0));
        let combined = camera.local_to_projection(model);
        let direct = camera.view_projection() * Vec4::new(0.3, 0.0, 0.0, 1.0);
        let via_model = combined * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((direct - via_model).length() < 1e-5);
    }
}
