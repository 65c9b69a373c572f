pub mod brdf;
pub mod color;
pub mod irradiance;
pub mod polar;

/// Fragment-stage branch taken for a draw batch. The discriminants are the
/// values of the `mode` field in the frame uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ShadingMode {
    /// Offscreen pass: hemisphere convolution of the source cubemap.
    IrradianceConvolution = 0,
    Punctual = 1,
    ImageBased = 2,
    /// Rusted-iron textures lit through the BRDF table.
    TexturedMetal = 3,
}

impl ShadingMode {
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn label(self) -> &'static str {
        match self {
            ShadingMode::IrradianceConvolution => "irradiance convolution",
            ShadingMode::Punctual => "punctual lights",
            ShadingMode::ImageBased => "image-based lighting",
            ShadingMode::TexturedMetal => "textured metal",
        }
    }
}

/// Which optional texture groups finished loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextureAvailability {
    /// Diffuse irradiance, prefiltered specular and BRDF table.
    pub image_based: bool,
    /// The four metal channels plus the BRDF table.
    pub textured_metal: bool,
}

/// Picks the forward-pass mode. Punctual wins over everything; the texture
/// driven modes silently fall back to punctual when their inputs are missing.
pub fn select_forward_mode(
    punctual: bool,
    textured_metal: bool,
    available: TextureAvailability,
) -> ShadingMode {
    if punctual {
        ShadingMode::Punctual
    } else if textured_metal && available.textured_metal {
        ShadingMode::TexturedMetal
    } else if available.image_based {
        ShadingMode::ImageBased
    } else {
        ShadingMode::Punctual
    }
}
