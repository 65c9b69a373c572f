//! Environment and material textures: loading, the CPU-built source cubemap
//! for the irradiance pass, and the group 1 bind groups.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3, Vec4};

use crate::render::texture::{self, DecodedImage, Texture};
use crate::render::uniforms::TextureSlot;
use crate::shading::TextureAvailability;
use crate::shading::color::decode_rgbm;
use crate::shading::polar::{direction_to_polar, level_region};

pub const CUBEMAP_FACE_SIZE: u32 = 64;

/// Radiance of the 1×1 cubemap used when no specular image was loaded.
const NEUTRAL_RADIANCE: f32 = 0.5;

/// Image files the renderer looks for, relative to the assets directory.
#[derive(Clone, Debug)]
pub struct AssetPaths {
    root: PathBuf,
}

impl AssetPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `slot`, `None` for slots filled at runtime.
    pub fn path(&self, slot: TextureSlot) -> Option<PathBuf> {
        let relative = match slot {
            TextureSlot::Diffuse => "env/Alexs_Apt_2k-diffuse-RGBM.png",
            TextureSlot::Specular => "env/Alexs_Apt_2k-specular-RGBM.png",
            TextureSlot::BrdfLut => "ggx-brdf-integrated.png",
            TextureSlot::MetalColor => "rustediron1-alt2-bl/rustediron2_basecolor.png",
            TextureSlot::MetalMetallic => "rustediron1-alt2-bl/rustediron2_metallic.png",
            TextureSlot::MetalNormal => "rustediron1-alt2-bl/rustediron2_normal.png",
            TextureSlot::MetalRoughness => "rustediron1-alt2-bl/rustediron2_roughness.png",
            TextureSlot::SourceCubemap | TextureSlot::BakedIrradiance => return None,
        };
        Some(self.root.join(relative))
    }
}

/// Decoded images keyed by slot. Slots whose file failed to load are absent.
#[derive(Clone, Debug, Default)]
pub struct EnvironmentImages {
    images: HashMap<TextureSlot, DecodedImage>,
}

impl EnvironmentImages {
    pub fn load(paths: &AssetPaths) -> Self {
        let mut images = HashMap::new();
        for slot in TextureSlot::ALL {
            let Some(path) = paths.path(slot) else {
                continue;
            };
            if let Some(img) = texture::load(&path) {
                images.insert(slot, img);
            }
        }
        log::info!(
            "{} of 7 environment/material images available under {}",
            images.len(),
            paths.root().display()
        );
        Self { images }
    }

    pub fn insert(&mut self, slot: TextureSlot, img: DecodedImage) {
        self.images.insert(slot, img);
    }

    pub fn get(&self, slot: TextureSlot) -> Option<&DecodedImage> {
        self.images.get(&slot)
    }

    pub fn contains(&self, slot: TextureSlot) -> bool {
        self.images.contains_key(&slot)
    }

    pub fn availability(&self) -> TextureAvailability {
        let has = |slots: &[TextureSlot]| slots.iter().all(|s| self.contains(*s));
        TextureAvailability {
            image_based: has(&[
                TextureSlot::Diffuse,
                TextureSlot::Specular,
                TextureSlot::BrdfLut,
            ]),
            textured_metal: has(&[
                TextureSlot::MetalColor,
                TextureSlot::MetalMetallic,
                TextureSlot::MetalNormal,
                TextureSlot::MetalRoughness,
                TextureSlot::BrdfLut,
            ]),
        }
    }

    /// Loaded slots in binding order.
    pub fn loaded_slots(&self) -> Vec<TextureSlot> {
        TextureSlot::ALL
            .into_iter()
            .filter(|slot| self.contains(*slot))
            .collect()
    }
}

/// Unit direction through the centre of texel `(x, y)` on cube `face`.
pub fn cubemap_direction(face: usize, x: u32, y: u32, size: u32) -> Vec3 {
    let a = (2.0 * (x as f32 + 0.5) / size as f32) - 1.0;
    let b = (2.0 * (y as f32 + 0.5) / size as f32) - 1.0;
    match face {
        0 => Vec3::new(1.0, -b, -a),
        1 => Vec3::new(-1.0, -b, a),
        2 => Vec3::new(a, 1.0, b),
        3 => Vec3::new(a, -1.0, -b),
        4 => Vec3::new(a, -b, 1.0),
        _ => Vec3::new(-a, -b, -1.0),
    }
    .normalize()
}

/// Linear radiance faces for the irradiance pass.
#[derive(Clone, Debug)]
pub struct CubemapFaces {
    pub size: u32,
    pub faces: [Vec<[f32; 4]>; 6],
}

impl CubemapFaces {
    fn uniform(radiance: f32) -> Self {
        let texel = [radiance, radiance, radiance, 1.0];
        Self {
            size: 1,
            faces: std::array::from_fn(|_| vec![texel]),
        }
    }
}

/// Resamples the sharpest level of the RGBM specular image onto a cube.
/// Without an image the result is a 1×1 neutral grey cube.
pub fn build_source_cubemap(specular: Option<&DecodedImage>, face_size: u32) -> CubemapFaces {
    let Some(img) = specular else {
        log::warn!("No specular environment image; irradiance pass uses a grey cubemap");
        return CubemapFaces::uniform(NEUTRAL_RADIANCE);
    };

    let faces = std::array::from_fn(|face| {
        let mut data = Vec::with_capacity((face_size * face_size) as usize);
        for y in 0..face_size {
            for x in 0..face_size {
                let dir = cubemap_direction(face, x, y, face_size);
                let uv = specular_level0_uv(dir);
                let texel = Vec4::from(img.sample_nearest(uv.x, uv.y));
                data.push(decode_rgbm(texel).extend(1.0).to_array());
            }
        }
        data
    });
    CubemapFaces {
        size: face_size,
        faces,
    }
}

/// GPU side of the environment: one texture per loaded slot, a shared
/// placeholder for the rest and the source cubemap.
pub struct Environment {
    textures: HashMap<TextureSlot, Texture>,
    placeholder: Texture,
    cubemap: Texture,
    sampler: wgpu::Sampler,
    availability: TextureAvailability,
    loaded: Vec<TextureSlot>,
}

impl Environment {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, images: &EnvironmentImages) -> Self {
        let mut textures = HashMap::new();
        for slot in images.loaded_slots() {
            if let Some(img) = images.get(slot) {
                let tex = Texture::from_decoded(device, queue, img, Some(slot.uniform_name()));
                textures.insert(slot, tex);
            }
        }

        let source = build_source_cubemap(images.get(TextureSlot::Specular), CUBEMAP_FACE_SIZE);
        let cubemap = Texture::cubemap(
            device,
            queue,
            source.size,
            &source.faces,
            Some("source_cubemap"),
        );
        let placeholder =
            Texture::from_color(device, queue, [0, 0, 0, 255], Some("placeholder_texture"));

        let availability = images.availability();
        log::info!(
            "Image-based lighting {}, textured metal {}",
            if availability.image_based { "available" } else { "unavailable" },
            if availability.textured_metal { "available" } else { "unavailable" },
        );

        let mut loaded = images.loaded_slots();
        loaded.push(TextureSlot::SourceCubemap);

        Self {
            textures,
            placeholder,
            cubemap,
            sampler: texture::linear_clamp_sampler(device),
            availability,
            loaded,
        }
    }

    pub fn availability(&self) -> TextureAvailability {
        self.availability
    }

    /// Slots with real content, the source cubemap included.
    pub fn loaded_slots(&self) -> &[TextureSlot] {
        &self.loaded
    }

    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let texture_entry = |slot: TextureSlot| {
            let view_dimension = if slot == TextureSlot::SourceCubemap {
                wgpu::TextureViewDimension::Cube
            } else {
                wgpu::TextureViewDimension::D2
            };
            wgpu::BindGroupLayoutEntry {
                binding: slot.binding(),
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            }
        };
        let mut entries = vec![wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        }];
        entries.extend(TextureSlot::ALL.into_iter().map(texture_entry));
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("environment_bind_group_layout"),
            entries: &entries,
        })
    }

    /// Group 1. `baked` is the offscreen target's view for the forward pass,
    /// `None` while that target is the destination.
    pub fn bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        baked: Option<&wgpu::TextureView>,
        label: &str,
    ) -> wgpu::BindGroup {
        let view_for = |slot: TextureSlot| match slot {
            TextureSlot::SourceCubemap => &self.cubemap.view,
            TextureSlot::BakedIrradiance => baked.unwrap_or(&self.placeholder.view),
            other => self
                .textures
                .get(&other)
                .map(|t| &t.view)
                .unwrap_or(&self.placeholder.view),
        };
        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Sampler(&self.sampler),
        }];
        entries.extend(TextureSlot::ALL.into_iter().map(|slot| wgpu::BindGroupEntry {
            binding: slot.binding(),
            resource: wgpu::BindingResource::TextureView(view_for(slot)),
        }));
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &entries,
        })
    }
}

/// Where `dir` lands in the sharpest level of the stacked specular image.
fn specular_level0_uv(dir: Vec3) -> Vec2 {
    level_region(direction_to_polar(dir), 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> DecodedImage {
        DecodedImage {
            width,
            height,
            pixels: rgba.repeat((width * height) as usize),
        }
    }

    #[test]
    fn asset_paths_follow_the_layout() {
        let paths = AssetPaths::new("assets");
        assert_eq!(
            paths.path(TextureSlot::Diffuse),
            Some(PathBuf::from("assets/env/Alexs_Apt_2k-diffuse-RGBM.png"))
        );
        assert_eq!(
            paths.path(TextureSlot::MetalNormal),
            Some(PathBuf::from("assets/rustediron1-alt2-bl/rustediron2_normal.png"))
        );
        assert!(paths.path(TextureSlot::BakedIrradiance).is_none());
        assert!(paths.path(TextureSlot::SourceCubemap).is_none());
    }

    #[test]
    fn availability_needs_complete_groups() {
        let mut images = EnvironmentImages::default();
        assert_eq!(images.availability(), TextureAvailability::default());

        images.insert(TextureSlot::Diffuse, solid(1, 1, [0; 4]));
        images.insert(TextureSlot::Specular, solid(1, 1, [0; 4]));
        assert!(!images.availability().image_based);

        images.insert(TextureSlot::BrdfLut, solid(1, 1, [0; 4]));
        let available = images.availability();
        assert!(available.image_based);
        assert!(!available.textured_metal);
        assert_eq!(
            images.loaded_slots(),
            vec![TextureSlot::Diffuse, TextureSlot::Specular, TextureSlot::BrdfLut]
        );
    }

    #[test]
    fn cube_directions_are_unit_and_face_outward() {
        let axes = [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z];
        for (face, axis) in axes.iter().enumerate() {
            let centre = cubemap_direction(face, 1, 1, 3);
            assert!((centre - *axis).length() < 1e-5, "face {face}: {centre}");
            let corner = cubemap_direction(face, 0, 2, 3);
            assert!((corner.length() - 1.0).abs() < 1e-5);
            assert!(corner.dot(*axis) > 0.5);
        }
    }

    #[test]
    fn missing_specular_gives_grey_cube() {
        let cube = build_source_cubemap(None, CUBEMAP_FACE_SIZE);
        assert_eq!(cube.size, 1);
        for face in &cube.faces {
            assert_eq!(face, &vec![[NEUTRAL_RADIANCE, NEUTRAL_RADIANCE, NEUTRAL_RADIANCE, 1.0]]);
        }
    }

    #[test]
    fn cubemap_decodes_rgbm() {
        // rgb = 0.5, m = 1.0: radiance 0.5 * 1 * 8 = 4.
        let img = solid(8, 8, [128, 128, 128, 255]);
        let cube = build_source_cubemap(Some(&img), 4);
        assert_eq!(cube.size, 4);
        for face in &cube.faces {
            assert_eq!(face.len(), 16);
            for texel in face {
                assert!((texel[0] - 128.0 / 255.0 * 8.0).abs() < 1e-4);
                assert_eq!(texel[3], 1.0);
            }
        }
    }

    #[test]
    fn cubemap_reads_only_the_sharpest_level() {
        // Top half (level 0) bright, bottom half black.
        let mut img = solid(4, 8, [0, 0, 0, 255]);
        for p in img.pixels[..4 * 4 * 4].chunks_mut(4) {
            p.copy_from_slice(&[255, 255, 255, 255]);
        }
        let cube = build_source_cubemap(Some(&img), 8);
        for face in &cube.faces {
            for texel in face {
                assert!(texel[0] > 7.9, "{texel:?}");
            }
        }
        for dir in [Vec3::X, Vec3::Y, -Vec3::Y, Vec3::new(0.3, -0.2, 0.9).normalize()] {
            let uv = specular_level0_uv(dir);
            assert!((0.0..=0.5).contains(&uv.y));
        }
    }
}
