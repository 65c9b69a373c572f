use glam::Vec3;

use crate::shading::color::normalize_rgb8;

/// Values the parameter source (GUI or command line) hands the renderer,
/// read once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadingParams {
    pub albedo: [u8; 3],
    pub punctual: bool,
    /// Material toggle of the parameter source. Published to the program as
    /// `material`; it does not pick a shading mode.
    pub material: bool,
    /// Rusted-iron textures instead of the uniform albedo.
    pub textured_metal: bool,
    /// Take diffuse irradiance from the baked offscreen target in IBL mode.
    pub use_baked_irradiance: bool,
}

impl Default for ShadingParams {
    fn default() -> Self {
        Self {
            albedo: [255, 255, 255],
            punctual: false,
            material: false,
            textured_metal: false,
            use_baked_irradiance: false,
        }
    }
}

impl ShadingParams {
    pub fn albedo_normalized(&self) -> Vec3 {
        normalize_rgb8(self.albedo)
    }
}

/// Parses `#RRGGBB` (the `#` is optional).
pub fn parse_hex_rgb(hex: &str) -> Result<[u8; 3], String> {
    let s = hex.trim().trim_start_matches('#');
    if s.len() != 6 || !s.is_ascii() {
        return Err(format!("expected #RRGGBB, got '{hex}'"));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&s[range], 16).map_err(|e| format!("bad hex colour '{hex}': {e}"))
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

pub fn rgb8_to_wgpu(rgb: [u8; 3]) -> wgpu::Color {
    wgpu::Color {
        r: rgb[0] as f64 / 255.0,
        g: rgb[1] as f64 / 255.0,
        b: rgb[2] as f64 / 255.0,
        a: 1.0,
    }
}
