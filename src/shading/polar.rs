//! Longitude/latitude mapping used for every 2D environment lookup.

use std::f32::consts::{FRAC_1_PI, PI, TAU};

use glam::{Vec2, Vec3};

/// Number of stacked roughness levels in the prefiltered specular image.
pub const SPECULAR_LEVELS: f32 = 5.0;

/// `u = atan2(z, x) / 2π + 0.5`, `v = asin(y) / π + 0.5`.
pub fn direction_to_polar(n: Vec3) -> Vec2 {
    Vec2::new(
        n.z.atan2(n.x) / TAU + 0.5,
        n.y.clamp(-1.0, 1.0).asin() * FRAC_1_PI + 0.5,
    )
}

/// Inverse of [`direction_to_polar`]. Longitude is meaningless at the poles.
pub fn polar_to_direction(uv: Vec2) -> Vec3 {
    let phi = (uv.x - 0.5) * TAU;
    let latitude = (uv.y - 0.5) * PI;
    let (sin_lat, cos_lat) = latitude.sin_cos();
    Vec3::new(cos_lat * phi.cos(), sin_lat, cos_lat * phi.sin())
}

/// Moves `uv` into the region of roughness `level` inside the vertically
/// stacked prefiltered image: level 0 covers `v` in `[0, 1/2]` at full
/// width, each following level halves both extents and stacks after it.
pub fn level_region(uv: Vec2, level: f32) -> Vec2 {
    let scale = 2f32.powf(level);
    Vec2::new(
        uv.x / scale,
        uv.y / (scale * 2.0) + 1.0 - 1.0 / scale,
    )
}

/// The two stacked levels bracketing `roughness` and the blend factor
/// between them.
pub fn roughness_levels(roughness: f32) -> (f32, f32, f32) {
    let scaled = roughness * SPECULAR_LEVELS;
    let low = scaled.floor();
    (low, low + 1.0, scaled - low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_away_from_poles() {
        let mut checked = 0;
        for lat_step in -8..=8 {
            for lon_step in 0..24 {
                let lat = lat_step as f32 / 9.0 * 0.5 * PI;
                let lon = lon_step as f32 / 24.0 * TAU - PI;
                let n = Vec3::new(lat.cos() * lon.cos(), lat.sin(), lat.cos() * lon.sin());
                if n.y.abs() > 0.999 {
                    continue;
                }
                let back = polar_to_direction(direction_to_polar(n));
                assert!((back - n).length() < 1e-4, "{n} -> {back}");
                checked += 1;
            }
        }
        assert!(checked > 300);
    }

    #[test]
    fn poles_map_to_edges_for_any_longitude() {
        let up = direction_to_polar(Vec3::Y);
        let down = direction_to_polar(-Vec3::Y);
        assert!((up.y - 1.0).abs() < 1e-6);
        assert!(down.y.abs() < 1e-6);
        let back = polar_to_direction(Vec2::new(0.123, 1.0));
        assert!((back - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn polar_coordinates_stay_in_unit_square() {
        for d in [Vec3::X, -Vec3::X, Vec3::Z, -Vec3::Z, Vec3::ONE.normalize()] {
            let uv = direction_to_polar(d);
            assert!((0.0..=1.0).contains(&uv.x));
            assert!((0.0..=1.0).contains(&uv.y));
        }
        assert!((direction_to_polar(Vec3::X).x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn levels_stack_without_overlap() {
        let mut previous_top = 0.0;
        for level in 0..5 {
            let bottom = level_region(Vec2::new(0.0, 0.0), level as f32);
            let top = level_region(Vec2::new(1.0, 1.0), level as f32);
            assert!((bottom.y - previous_top).abs() < 1e-6);
            assert!(top.y <= 1.0 + 1e-6);
            assert!((top.x - 1.0 / 2f32.powi(level)).abs() < 1e-6);
            previous_top = top.y;
        }
    }

    #[test]
    fn roughness_brackets() {
        let (low, high, t) = roughness_levels(0.5);
        assert_eq!((low, high), (2.0, 3.0));
        assert!((t - 0.5).abs() < 1e-5);

        let (low, high, t) = roughness_levels(0.0);
        assert_eq!((low, high, t), (0.0, 1.0, 0.0));
    }
}
