//! Colour-space helpers shared with `shader.wgsl`.

use glam::{Vec3, Vec4};

/// Range multiplier of the RGBM environment images.
pub const RGBM_RANGE: f32 = 8.0;

pub fn srgb_to_linear(value: Vec3) -> Vec3 {
    Vec3::new(
        srgb_channel_to_linear(value.x),
        srgb_channel_to_linear(value.y),
        srgb_channel_to_linear(value.z),
    )
}

pub fn linear_to_srgb(value: Vec3) -> Vec3 {
    Vec3::new(
        linear_channel_to_srgb(value.x),
        linear_channel_to_srgb(value.y),
        linear_channel_to_srgb(value.z),
    )
}

fn srgb_channel_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c * 0.077_399_38
    } else {
        (c * 0.947_867_3 + 0.052_132_7).powf(2.4)
    }
}

fn linear_channel_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        c.powf(1.0 / 2.4) * 1.055 - 0.055
    }
}

/// Reinhard operator, `x / (x + 1)` per channel.
pub fn tone_map(color: Vec3) -> Vec3 {
    color / (color + Vec3::ONE)
}

pub fn decode_rgbm(texel: Vec4) -> Vec3 {
    texel.truncate() * texel.w * RGBM_RANGE
}

/// 0–255 GUI colour to the 0–1 range the shader expects.
pub fn normalize_rgb8(rgb: [u8; 3]) -> Vec3 {
    Vec3::new(rgb[0] as f32, rgb[1] as f32, rgb[2] as f32) / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_round_trip() {
        let steps = 32;
        for r in 0..=steps {
            for g in [0, steps / 3, steps] {
                let c = Vec3::new(
                    r as f32 / steps as f32,
                    g as f32 / steps as f32,
                    1.0 - r as f32 / steps as f32,
                );
                let back = srgb_to_linear(linear_to_srgb(c));
                assert!((back - c).abs().max_element() < 1e-3, "{c} -> {back}");
            }
        }
    }

    #[test]
    fn srgb_endpoints() {
        assert!(linear_to_srgb(Vec3::ZERO).abs().max_element() < 1e-6);
        assert!((linear_to_srgb(Vec3::ONE) - Vec3::ONE).abs().max_element() < 1e-4);
        assert!((srgb_to_linear(Vec3::ONE) - Vec3::ONE).abs().max_element() < 1e-4);
        // Mid grey in sRGB is roughly 21% linear.
        let mid = srgb_to_linear(Vec3::splat(0.5)).x;
        assert!((mid - 0.214).abs() < 1e-3);
    }

    #[test]
    fn tone_map_stays_below_one() {
        for x in [0.0f32, 0.5, 1.0, 10.0, 1.0e6] {
            let y = tone_map(Vec3::splat(x)).x;
            assert!((0.0..1.0).contains(&y));
        }
        assert_eq!(tone_map(Vec3::ONE), Vec3::splat(0.5));
    }

    #[test]
    fn rgbm_decodes_with_alpha_scale() {
        let decoded = decode_rgbm(Vec4::new(0.5, 0.25, 1.0, 0.5));
        assert_eq!(decoded, Vec3::new(2.0, 1.0, 4.0));
    }

    #[test]
    fn rgb8_normalization() {
        let c = normalize_rgb8([255, 0, 51]);
        assert!((c - Vec3::new(1.0, 0.0, 0.2)).abs().max_element() < 1e-6);
    }
}
