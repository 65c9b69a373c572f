//! Name-keyed uniform table and its packing into the GPU uniform blocks.
//!
//! Each frame the renderer builds a base table (albedo, camera, toggles,
//! texture slots) and, per grid instance, a small override table (transform,
//! alpha, metallic). The two are merged right before the draw, checked
//! against the names the active shading mode reads, then packed.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::error::UniformError;
use crate::shading::ShadingMode;

pub mod names {
    pub const ALBEDO: &str = "material.albedo";
    pub const CAMERA_POSITION: &str = "camera_position";
    pub const PUNCTUAL: &str = "punctual";
    pub const MATERIAL: &str = "material";
    pub const TEXTURED_METAL: &str = "textured_metal";
    pub const USE_BAKED_IRRADIANCE: &str = "use_baked_irradiance";
    pub const MODEL_TRANSFORM: &str = "model_transform";
    pub const LOCAL_TO_PROJECTION: &str = "model.local_to_projection";
    pub const ALPHA: &str = "alpha";
    pub const METALLIC: &str = "metallic";

    pub const TEXTURE_DIFFUSE: &str = "texture_diffuse";
    pub const TEXTURE_SPECULAR: &str = "texture_specular";
    pub const TEXTURE_BRDF: &str = "texture_brdf";
    pub const TEXTURE_METAL_COLOR: &str = "texture_metal_color";
    pub const TEXTURE_METAL_METALLIC: &str = "texture_metal_metallic";
    pub const TEXTURE_METAL_NORMAL: &str = "texture_metal_normal";
    pub const TEXTURE_METAL_ROUGHNESS: &str = "texture_metal_roughness";
    pub const TEXTURE_CUBEMAP: &str = "texture_cubemap";
    pub const TEXTURE_BAKED_IRRADIANCE: &str = "texture_baked_irradiance";
}

/// GPU texture slot a `Texture` uniform refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Diffuse,
    Specular,
    BrdfLut,
    MetalColor,
    MetalMetallic,
    MetalNormal,
    MetalRoughness,
    SourceCubemap,
    BakedIrradiance,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 9] = [
        TextureSlot::Diffuse,
        TextureSlot::Specular,
        TextureSlot::BrdfLut,
        TextureSlot::MetalColor,
        TextureSlot::MetalMetallic,
        TextureSlot::MetalNormal,
        TextureSlot::MetalRoughness,
        TextureSlot::SourceCubemap,
        TextureSlot::BakedIrradiance,
    ];

    /// Uniform name the slot is published under.
    pub fn uniform_name(self) -> &'static str {
        match self {
            TextureSlot::Diffuse => names::TEXTURE_DIFFUSE,
            TextureSlot::Specular => names::TEXTURE_SPECULAR,
            TextureSlot::BrdfLut => names::TEXTURE_BRDF,
            TextureSlot::MetalColor => names::TEXTURE_METAL_COLOR,
            TextureSlot::MetalMetallic => names::TEXTURE_METAL_METALLIC,
            TextureSlot::MetalNormal => names::TEXTURE_METAL_NORMAL,
            TextureSlot::MetalRoughness => names::TEXTURE_METAL_ROUGHNESS,
            TextureSlot::SourceCubemap => names::TEXTURE_CUBEMAP,
            TextureSlot::BakedIrradiance => names::TEXTURE_BAKED_IRRADIANCE,
        }
    }

    /// Binding index inside the environment bind group (group 1). The
    /// sampler sits at binding 0.
    pub fn binding(self) -> u32 {
        match self {
            TextureSlot::Diffuse => 1,
            TextureSlot::Specular => 2,
            TextureSlot::BrdfLut => 3,
            TextureSlot::MetalColor => 4,
            TextureSlot::MetalMetallic => 5,
            TextureSlot::MetalNormal => 6,
            TextureSlot::MetalRoughness => 7,
            TextureSlot::SourceCubemap => 8,
            TextureSlot::BakedIrradiance => 9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Bool(bool),
    Vec3(Vec3),
    Mat4(Mat4),
    Texture(TextureSlot),
}

impl UniformValue {
    fn type_name(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "float",
            UniformValue::Bool(_) => "bool",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Mat4(_) => "mat4",
            UniformValue::Texture(_) => "texture",
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        UniformValue::Bool(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self {
        UniformValue::Mat4(v)
    }
}

impl From<TextureSlot> for UniformValue {
    fn from(v: TextureSlot) -> Self {
        UniformValue::Texture(v)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformTable {
    values: HashMap<String, UniformValue>,
}

impl UniformTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// `self` with every entry of `overrides` written on top.
    pub fn merged(&self, overrides: &UniformTable) -> UniformTable {
        let mut merged = self.clone();
        merged
            .values
            .extend(overrides.values.iter().map(|(k, v)| (k.clone(), *v)));
        merged
    }

    /// Fails on the first name in `required` that has no entry.
    pub fn require(&self, required: &[&'static str]) -> Result<(), UniformError> {
        match required.iter().find(|name| !self.values.contains_key(**name)) {
            Some(missing) => Err(UniformError::Missing(missing)),
            None => Ok(()),
        }
    }

    fn lookup(&self, name: &'static str) -> Result<&UniformValue, UniformError> {
        self.values.get(name).ok_or(UniformError::Missing(name))
    }

    fn mismatch(name: &'static str, expected: &'static str, found: &UniformValue) -> UniformError {
        UniformError::TypeMismatch {
            name,
            expected,
            found: found.type_name(),
        }
    }

    pub fn float(&self, name: &'static str) -> Result<f32, UniformError> {
        match self.lookup(name)? {
            UniformValue::Float(v) => Ok(*v),
            other => Err(Self::mismatch(name, "float", other)),
        }
    }

    pub fn boolean(&self, name: &'static str) -> Result<bool, UniformError> {
        match self.lookup(name)? {
            UniformValue::Bool(v) => Ok(*v),
            other => Err(Self::mismatch(name, "bool", other)),
        }
    }

    /// Like [`UniformTable::boolean`] but an absent entry reads as `false`.
    pub fn flag(&self, name: &'static str) -> Result<bool, UniformError> {
        match self.values.get(name) {
            None => Ok(false),
            Some(_) => self.boolean(name),
        }
    }

    pub fn vec3(&self, name: &'static str) -> Result<Vec3, UniformError> {
        match self.lookup(name)? {
            UniformValue::Vec3(v) => Ok(*v),
            other => Err(Self::mismatch(name, "vec3", other)),
        }
    }

    pub fn mat4(&self, name: &'static str) -> Result<Mat4, UniformError> {
        match self.lookup(name)? {
            UniformValue::Mat4(v) => Ok(*v),
            other => Err(Self::mismatch(name, "mat4", other)),
        }
    }

    pub fn texture(&self, name: &'static str) -> Result<TextureSlot, UniformError> {
        match self.lookup(name)? {
            UniformValue::Texture(v) => Ok(*v),
            other => Err(Self::mismatch(name, "texture", other)),
        }
    }

    pub fn has_texture(&self, slot: TextureSlot) -> bool {
        matches!(self.values.get(slot.uniform_name()), Some(UniformValue::Texture(s)) if *s == slot)
    }
}

pub const FLAG_USE_BAKED_IRRADIANCE: u32 = 1;

/// `FrameUniforms` in `shader.wgsl`, group 0 binding 0.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct FrameUniforms {
    pub albedo: [f32; 3],
    pub mode: u32,
    pub camera_position: [f32; 3],
    pub flags: u32,
    pub viewport: [f32; 2],
    pub _padding: [f32; 2],
}

impl FrameUniforms {
    pub fn from_table(
        table: &UniformTable,
        mode: ShadingMode,
        viewport: (u32, u32),
    ) -> Result<Self, UniformError> {
        let mut flags = 0;
        if mode == ShadingMode::ImageBased
            && table.flag(names::USE_BAKED_IRRADIANCE)?
            && table.has_texture(TextureSlot::BakedIrradiance)
        {
            flags |= FLAG_USE_BAKED_IRRADIANCE;
        }
        Ok(Self {
            albedo: table.vec3(names::ALBEDO)?.to_array(),
            mode: mode.as_u32(),
            camera_position: table.vec3(names::CAMERA_POSITION)?.to_array(),
            flags,
            viewport: [viewport.0 as f32, viewport.1 as f32],
            _padding: [0.0; 2],
        })
    }
}

/// `InstanceUniforms` in `shader.wgsl`, group 0 binding 1, bound with a
/// dynamic offset per draw.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct InstanceUniforms {
    pub model: [[f32; 4]; 4],
    pub local_to_projection: [[f32; 4]; 4],
    pub alpha: f32,
    pub metallic: f32,
    pub _padding: [f32; 2],
}

impl InstanceUniforms {
    pub fn from_table(table: &UniformTable) -> Result<Self, UniformError> {
        Ok(Self {
            model: table.mat4(names::MODEL_TRANSFORM)?.to_cols_array_2d(),
            local_to_projection: table.mat4(names::LOCAL_TO_PROJECTION)?.to_cols_array_2d(),
            alpha: table.float(names::ALPHA)?,
            metallic: table.float(names::METALLIC)?,
            _padding: [0.0; 2],
        })
    }
}

/// Rounds `size` up to the device's dynamic-offset alignment.
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}
