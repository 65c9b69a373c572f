use glam::{Mat4, Vec3, Vec4};
use pbr_spheres::{
    Camera, ShadingParams,
    render::{
        FramePlanner, PassKind, TextureSlot,
        frame::grid_instances,
        uniforms::{FrameUniforms, InstanceUniforms, names},
    },
    shading::{ShadingMode, TextureAvailability},
};

fn ibl_planner() -> FramePlanner {
    FramePlanner::new(
        TextureAvailability {
            image_based: true,
            textured_metal: false,
        },
        vec![
            TextureSlot::Diffuse,
            TextureSlot::Specular,
            TextureSlot::BrdfLut,
            TextureSlot::SourceCubemap,
        ],
        (256, 256),
        [0, 0, 0],
    )
}

#[test]
fn offscreen_pass_runs_exactly_once() {
    let mut planner = ibl_planner();
    let mut camera = Camera::new();
    let params = ShadingParams::default();

    let passes: Vec<PassKind> = (0..10)
        .map(|_| planner.plan(&mut camera, &params, (1280, 720)).pass)
        .collect();

    assert_eq!(passes[0], PassKind::OffscreenPrecompute);
    assert!(!planner.precompute_pending());
    assert_eq!(
        passes
            .iter()
            .filter(|p| **p == PassKind::OffscreenPrecompute)
            .count(),
        1
    );
    assert!(passes[1..].iter().all(|p| *p == PassKind::ForwardShading));
}

#[test]
fn draws_sweep_roughness_and_metallic_row_major() {
    let mut planner = ibl_planner();
    let mut camera = Camera::new();
    let params = ShadingParams::default();
    planner.plan(&mut camera, &params, (800, 600));
    let plan = planner.plan(&mut camera, &params, (800, 600));

    let sweep = [0.0, 0.25, 0.5, 0.75, 1.0];
    for (index, draw) in plan.draws.iter().enumerate() {
        let merged = plan.uniforms_for(draw).unwrap();
        let block = InstanceUniforms::from_table(&merged).unwrap();
        assert_eq!(block.alpha, sweep[index % 5], "draw {index}");
        assert_eq!(block.metallic, sweep[index / 5], "draw {index}");
    }
}

#[test]
fn instance_matrices_match_the_camera() {
    let mut planner = ibl_planner();
    let mut camera = Camera::new();
    let params = ShadingParams::default();
    planner.plan(&mut camera, &params, (1000, 500));
    let plan = planner.plan(&mut camera, &params, (1000, 500));

    let centre = plan
        .draws
        .iter()
        .find(|d| d.instance.column == 0 && d.instance.row == 0)
        .unwrap();
    let merged = plan.uniforms_for(centre).unwrap();
    let mvp = merged.mat4(names::LOCAL_TO_PROJECTION).unwrap();
    let clip = mvp * Vec4::new(0.0, 0.0, 0.0, 1.0);
    assert!((clip.x / clip.w).abs() < 1e-5);
    assert!((clip.y / clip.w).abs() < 1e-5);

    let corner = plan.draws.last().unwrap();
    let merged = plan.uniforms_for(corner).unwrap();
    let model = merged.mat4(names::MODEL_TRANSFORM).unwrap();
    assert_eq!(model, Mat4::from_translation(Vec3::new(0.6, 0.8, 0.0)));
    let expected = camera.view_projection() * model;
    let got = merged.mat4(names::LOCAL_TO_PROJECTION).unwrap();
    assert!(expected.abs_diff_eq(got, 1e-6));
}

#[test]
fn frame_block_carries_mode_and_camera() {
    let mut planner = ibl_planner();
    let mut camera = Camera::new();
    let params = ShadingParams {
        albedo: [255, 0, 0],
        use_baked_irradiance: true,
        ..ShadingParams::default()
    };

    let bake = planner.plan(&mut camera, &params, (640, 480));
    let frame = FrameUniforms::from_table(&bake.base, bake.mode, bake.viewport).unwrap();
    assert_eq!(frame.mode, ShadingMode::IrradianceConvolution.as_u32());
    assert_eq!(frame.viewport, [256.0, 256.0]);
    // The target is the destination here, so it cannot be sampled.
    assert_eq!(frame.flags, 0);

    let forward = planner.plan(&mut camera, &params, (640, 480));
    let frame = FrameUniforms::from_table(&forward.base, forward.mode, forward.viewport).unwrap();
    assert_eq!(frame.mode, ShadingMode::ImageBased.as_u32());
    assert_eq!(frame.albedo, [1.0, 0.0, 0.0]);
    assert_eq!(frame.camera_position, [0.0, 0.0, 2.0]);
    assert_eq!(frame.flags, 1);
}

#[test]
fn missing_environment_falls_back_to_punctual() {
    let mut planner = FramePlanner::new(
        TextureAvailability::default(),
        vec![TextureSlot::SourceCubemap],
        (256, 256),
        [0, 0, 0],
    );
    let mut camera = Camera::new();
    let params = ShadingParams::default();
    planner.plan(&mut camera, &params, (800, 600));
    let plan = planner.plan(&mut camera, &params, (800, 600));

    assert_eq!(plan.mode, ShadingMode::Punctual);
    for draw in &plan.draws {
        assert!(plan.uniforms_for(draw).is_ok());
    }
}

#[test]
fn grid_is_five_by_five() {
    let instances: Vec<_> = grid_instances().collect();
    assert_eq!(instances.len(), 25);
    assert_eq!(instances[0].translation(), Vec3::new(-0.6, -0.8, 0.0));
    assert_eq!(instances[24].translation(), Vec3::new(0.6, 0.8, 0.0));
}
