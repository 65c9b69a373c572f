use std::fs;
use std::path::Path;

use image::{Rgba, RgbaImage};
use pbr_spheres::ShadingParams;
use pbr_spheres::render::{
    FramePlanner, TextureSlot,
    environment::{AssetPaths, EnvironmentImages, build_source_cubemap},
};
use pbr_spheres::shading::{ShadingMode, TextureAvailability};

const METAL: ShadingParams = ShadingParams {
    albedo: [255, 255, 255],
    punctual: false,
    material: false,
    textured_metal: true,
    use_baked_irradiance: false,
};

fn forward_mode(images: &EnvironmentImages, params: &ShadingParams) -> ShadingMode {
    FramePlanner::new(images.availability(), images.loaded_slots(), (256, 256), [0, 0, 0])
        .forward_mode(params)
}

fn write_png(paths: &AssetPaths, slot: TextureSlot, colour: [u8; 4]) {
    let path = paths.path(slot).unwrap();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbaImage::from_pixel(8, 4, Rgba(colour)).save(&path).unwrap();
}

fn ibl_only(root: &Path) -> AssetPaths {
    let paths = AssetPaths::new(root);
    write_png(&paths, TextureSlot::Diffuse, [64, 64, 64, 255]);
    write_png(&paths, TextureSlot::Specular, [128, 128, 128, 255]);
    write_png(&paths, TextureSlot::BrdfLut, [255, 0, 0, 255]);
    paths
}

#[test]
fn empty_assets_directory_leaves_punctual_only() {
    let dir = tempfile::tempdir().unwrap();
    let images = EnvironmentImages::load(&AssetPaths::new(dir.path()));

    assert_eq!(images.availability(), TextureAvailability::default());
    assert!(images.loaded_slots().is_empty());
    assert_eq!(
        forward_mode(&images, &ShadingParams::default()),
        ShadingMode::Punctual
    );
    assert_eq!(forward_mode(&images, &METAL), ShadingMode::Punctual);
}

#[test]
fn environment_without_metal_keeps_image_based_lighting() {
    let dir = tempfile::tempdir().unwrap();
    let images = EnvironmentImages::load(&ibl_only(dir.path()));

    let availability = images.availability();
    assert!(availability.image_based);
    assert!(!availability.textured_metal);
    assert_eq!(
        images.loaded_slots(),
        vec![TextureSlot::Diffuse, TextureSlot::Specular, TextureSlot::BrdfLut]
    );
    // Asking for the metal falls back to the environment rather than failing.
    assert_eq!(forward_mode(&images, &METAL), ShadingMode::ImageBased);
}

#[test]
fn full_asset_set_enables_textured_metal() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ibl_only(dir.path());
    for slot in [
        TextureSlot::MetalColor,
        TextureSlot::MetalMetallic,
        TextureSlot::MetalNormal,
        TextureSlot::MetalRoughness,
    ] {
        write_png(&paths, slot, [200, 100, 50, 255]);
    }
    let images = EnvironmentImages::load(&paths);

    assert!(images.availability().textured_metal);
    assert_eq!(images.loaded_slots().len(), 7);
    assert_eq!(forward_mode(&images, &METAL), ShadingMode::TexturedMetal);
    // The material toggle alone leaves the environment lighting in charge.
    let material = ShadingParams {
        material: true,
        ..ShadingParams::default()
    };
    assert_eq!(forward_mode(&images, &material), ShadingMode::ImageBased);
}

#[test]
fn corrupt_image_counts_as_missing() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ibl_only(dir.path());
    fs::write(paths.path(TextureSlot::BrdfLut).unwrap(), b"not a png").unwrap();

    let images = EnvironmentImages::load(&paths);
    assert!(!images.contains(TextureSlot::BrdfLut));
    assert!(!images.availability().image_based);
}

#[test]
fn source_cubemap_decodes_the_specular_image() {
    let dir = tempfile::tempdir().unwrap();
    let images = EnvironmentImages::load(&ibl_only(dir.path()));

    let cube = build_source_cubemap(images.get(TextureSlot::Specular), 4);
    assert_eq!(cube.size, 4);
    let expected = 128.0 / 255.0 * 8.0;
    for face in &cube.faces {
        assert_eq!(face.len(), 16);
        for texel in face {
            assert!((texel[0] - expected).abs() < 1e-4);
            assert_eq!(texel[3], 1.0);
        }
    }
}

#[test]
fn source_cubemap_without_specular_is_grey() {
    let cube = build_source_cubemap(None, 64);
    assert_eq!(cube.size, 1);
    assert!(cube.faces.iter().all(|face| face == &vec![[0.5, 0.5, 0.5, 1.0]]));
}
