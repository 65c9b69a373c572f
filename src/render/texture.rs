use std::path::Path;

use image::GenericImageView;

/// Side of the square offscreen target the irradiance pass renders into.
pub const RENDER_TARGET_SIZE: u32 = 256;
pub const RENDER_TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Depth of the offscreen target: the device's default integer depth.
pub const TARGET_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;
pub const CUBEMAP_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// RGBA8 pixels decoded from an image file, row 0 first.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn from_image(img: &image::DynamicImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.to_rgba8().into_raw(),
        }
    }

    /// Texel at `(x, y)` in 0–1, clamped to the edges.
    pub fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        let idx = ((y * self.width + x) * 4) as usize;
        let p = &self.pixels[idx..idx + 4];
        [
            p[0] as f32 / 255.0,
            p[1] as f32 / 255.0,
            p[2] as f32 / 255.0,
            p[3] as f32 / 255.0,
        ]
    }

    /// Nearest texel for normalized coordinates, clamp-to-edge.
    pub fn sample_nearest(&self, u: f32, v: f32) -> [f32; 4] {
        let x = (u.clamp(0.0, 1.0) * self.width as f32).floor() as u32;
        let y = (v.clamp(0.0, 1.0) * self.height as f32).floor() as u32;
        self.texel(x, y)
    }
}

/// Decodes `path`. Missing or corrupt files are logged and reported as
/// unavailable; callers keep rendering without them.
pub fn load(path: &Path) -> Option<DecodedImage> {
    match image::open(path) {
        Ok(img) => {
            let decoded = DecodedImage::from_image(&img);
            log::info!(
                "Loaded texture {} ({}x{})",
                path.display(),
                decoded.width,
                decoded.height
            );
            Some(decoded)
        }
        Err(e) => {
            log::warn!("Texture {} unavailable: {}", path.display(), e);
            None
        }
    }
}

pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Texture {
    /// 1×1 texture used where a slot has nothing to bind.
    pub fn from_color(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: [u8; 4],
        label: Option<&str>,
    ) -> Self {
        Self::from_decoded(
            device,
            queue,
            &DecodedImage {
                width: 1,
                height: 1,
                pixels: rgba.to_vec(),
            },
            label,
        )
    }

    /// Uploads as linear RGBA8. Colour decoding happens in the shader.
    pub fn from_decoded(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &DecodedImage,
        label: Option<&str>,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: img.width,
            height: img.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &img.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * img.width),
                rows_per_image: Some(img.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    /// Six RGBA16F faces of `face_size`², in +X −X +Y −Y +Z −Z order.
    pub fn cubemap(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        face_size: u32,
        faces: &[Vec<[f32; 4]>; 6],
        label: Option<&str>,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size: wgpu::Extent3d {
                width: face_size,
                height: face_size,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CUBEMAP_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (layer, face) in faces.iter().enumerate() {
            let data: Vec<u16> = face
                .iter()
                .flat_map(|texel| texel.map(|c| half::f16::from_f32(c).to_bits()))
                .collect();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                bytemuck::cast_slice(&data),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(face_size * 8),
                    rows_per_image: Some(face_size),
                },
                wgpu::Extent3d {
                    width: face_size,
                    height: face_size,
                    depth_or_array_layers: 1,
                },
            );
        }
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        Self { texture, view }
    }
}

/// Linear filtering, clamp-to-edge on every axis. Shared by every slot.
pub fn linear_clamp_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("linear_clamp_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

/// Depth attachment view. The view keeps its texture alive.
pub fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    label: &str,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Fixed-size colour + depth destination, sampled by later passes. It never
/// resizes with the window.
pub struct RenderTarget {
    pub color: Texture,
    pub depth_view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl RenderTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("baked_irradiance_target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: RENDER_TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = create_depth_texture(
            device,
            width,
            height,
            TARGET_DEPTH_FORMAT,
            "baked_irradiance_depth",
        );
        Self {
            color: Texture { texture, view },
            depth_view,
            width,
            height,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        let img = image::RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x * 40) as u8, (y * 40) as u8, 7, 255])
        });
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn loads_png_as_rgba8() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "tex.png", 4, 3);
        let img = load(&path).unwrap();
        assert_eq!((img.width, img.height), (4, 3));
        assert_eq!(img.pixels.len(), 4 * 3 * 4);
        assert_eq!(&img.pixels[..4], &[0, 0, 7, 255]);
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("nope.png")).is_none());
    }

    #[test]
    fn corrupt_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(load(&path).is_none());
    }

    #[test]
    fn offscreen_depth_is_not_floating_point() {
        assert_eq!(TARGET_DEPTH_FORMAT, wgpu::TextureFormat::Depth24Plus);
        assert_ne!(TARGET_DEPTH_FORMAT, DEPTH_FORMAT);
        assert!(TARGET_DEPTH_FORMAT.has_depth_aspect());
        assert!(!TARGET_DEPTH_FORMAT.has_stencil_aspect());
    }

    #[test]
    fn nearest_sampling_clamps_to_edges() {
        let img = DecodedImage {
            width: 2,
            height: 1,
            pixels: vec![255, 0, 0, 255, 0, 0, 255, 255],
        };
        assert_eq!(img.sample_nearest(0.1, 0.5), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(img.sample_nearest(0.9, 0.5), [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(img.sample_nearest(1.0, 1.0), [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(img.sample_nearest(-3.0, 0.0), [1.0, 0.0, 0.0, 1.0]);
    }
}
