//! Hemisphere convolution performed by the offscreen pass.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec3;

/// Angular step, in radians, for both azimuth and elevation.
pub const SAMPLE_DELTA: f32 = 0.025;

/// Azimuth steps taken for `phi` in `[0, 2π)`.
pub const fn azimuth_steps() -> u32 {
    // ceil(2π / 0.025)
    252
}

/// Elevation steps taken for `theta` in `[0, π/2)`.
pub const fn elevation_steps() -> u32 {
    // ceil(π/2 / 0.025)
    63
}

/// Orthonormal frame `(right, up)` around `normal`, with world Y as the
/// reference up vector.
pub fn tangent_frame(normal: Vec3) -> (Vec3, Vec3) {
    let reference = if normal.y.abs() > 0.999 { Vec3::Z } else { Vec3::Y };
    let right = reference.cross(normal).normalize();
    let up = normal.cross(right).normalize();
    (right, up)
}

/// Cosine-weighted average of `radiance` over the hemisphere around
/// `normal`, scaled by π. A constant environment returns that constant.
pub fn convolve<F>(normal: Vec3, mut radiance: F) -> Vec3
where
    F: FnMut(Vec3) -> Vec3,
{
    let normal = normal.normalize();
    let (right, up) = tangent_frame(normal);

    let mut irradiance = Vec3::ZERO;
    let mut samples = 0u32;
    for i in 0..azimuth_steps() {
        let phi = i as f32 * SAMPLE_DELTA;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for j in 0..elevation_steps() {
            let theta = j as f32 * SAMPLE_DELTA;
            let (sin_theta, cos_theta) = theta.sin_cos();
            let tangent_sample = Vec3::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta);
            let direction =
                tangent_sample.x * right + tangent_sample.y * up + tangent_sample.z * normal;
            irradiance += radiance(direction) * cos_theta * sin_theta;
            samples += 1;
        }
    }
    irradiance * PI / samples as f32
}
