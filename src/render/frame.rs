//! Per-frame orchestration without the GPU: which pass runs, where it draws,
//! and the uniform tables each of the 25 draws sees.

use glam::{Mat4, Vec3};

use crate::camera::{CAMERA_POSITION, Camera};
use crate::error::UniformError;
use crate::params::{ShadingParams, rgb8_to_wgpu};
use crate::render::pipeline::required_uniforms;
use crate::render::uniforms::{TextureSlot, UniformTable, names};
use crate::shading::{ShadingMode, TextureAvailability, select_forward_mode};

pub const GRID_MIN: i32 = -2;
pub const GRID_MAX: i32 = 2;
pub const GRID_SPACING_X: f32 = 0.3;
pub const GRID_SPACING_Y: f32 = 0.4;

/// One sphere of the fixed 5×5 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridInstance {
    pub column: i32,
    pub row: i32,
}

impl GridInstance {
    pub fn translation(&self) -> Vec3 {
        Vec3::new(
            GRID_SPACING_X * self.column as f32,
            GRID_SPACING_Y * self.row as f32,
            0.0,
        )
    }

    /// Roughness parameter, swept along the columns.
    pub fn alpha(&self) -> f32 {
        0.25 * (self.column - GRID_MIN) as f32
    }

    /// Metallic parameter, swept along the rows.
    pub fn metallic(&self) -> f32 {
        0.25 * (self.row - GRID_MIN) as f32
    }

    pub fn model_transform(&self) -> Mat4 {
        Mat4::from_translation(self.translation())
    }
}

/// All instances in draw order: rows outer, columns inner, both ascending.
pub fn grid_instances() -> impl Iterator<Item = GridInstance> {
    (GRID_MIN..=GRID_MAX)
        .flat_map(|row| (GRID_MIN..=GRID_MAX).map(move |column| GridInstance { column, row }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Irradiance convolution into the offscreen target. First frame only.
    OffscreenPrecompute,
    /// Live shading onto the window surface.
    ForwardShading,
}

#[derive(Debug, Clone)]
pub struct DrawCall {
    pub instance: GridInstance,
    pub overrides: UniformTable,
}

#[derive(Debug, Clone)]
pub struct FramePlan {
    pub pass: PassKind,
    pub viewport: (u32, u32),
    pub clear: wgpu::Color,
    pub mode: ShadingMode,
    pub base: UniformTable,
    pub draws: Vec<DrawCall>,
}

impl FramePlan {
    /// Base table with the draw's overrides on top, checked against what the
    /// active mode reads.
    pub fn uniforms_for(&self, draw: &DrawCall) -> Result<UniformTable, UniformError> {
        let merged = self.base.merged(&draw.overrides);
        merged.require(required_uniforms(self.mode))?;
        Ok(merged)
    }
}

/// Two-state machine: `OffscreenPrecompute` once, then `ForwardShading`
/// forever.
#[derive(Debug)]
pub struct FramePlanner {
    precompute_pending: bool,
    availability: TextureAvailability,
    texture_slots: Vec<TextureSlot>,
    target_size: (u32, u32),
    background: wgpu::Color,
}

impl FramePlanner {
    /// `texture_slots` are the slots with real content on the GPU.
    pub fn new(
        availability: TextureAvailability,
        texture_slots: Vec<TextureSlot>,
        target_size: (u32, u32),
        background: [u8; 3],
    ) -> Self {
        Self {
            precompute_pending: true,
            availability,
            texture_slots,
            target_size,
            background: rgb8_to_wgpu(background),
        }
    }

    pub fn precompute_pending(&self) -> bool {
        self.precompute_pending
    }

    pub fn availability(&self) -> TextureAvailability {
        self.availability
    }

    pub fn set_background(&mut self, background: [u8; 3]) {
        self.background = rgb8_to_wgpu(background);
    }

    /// Mode the forward pass would use with `params`.
    pub fn forward_mode(&self, params: &ShadingParams) -> ShadingMode {
        select_forward_mode(params.punctual, params.textured_metal, self.availability)
    }

    /// Plans the next frame and advances the state machine.
    pub fn plan(
        &mut self,
        camera: &mut Camera,
        params: &ShadingParams,
        surface_size: (u32, u32),
    ) -> FramePlan {
        let (pass, viewport, clear, mode) = if self.precompute_pending {
            self.precompute_pending = false;
            log::info!(
                "Baking irradiance into the {}x{} offscreen target",
                self.target_size.0,
                self.target_size.1
            );
            (
                PassKind::OffscreenPrecompute,
                self.target_size,
                wgpu::Color::BLACK,
                ShadingMode::IrradianceConvolution,
            )
        } else {
            (
                PassKind::ForwardShading,
                surface_size,
                self.background,
                self.forward_mode(params),
            )
        };

        camera.position = CAMERA_POSITION;
        camera.set_parameters(viewport.0 as f32 / viewport.1.max(1) as f32);
        camera.update();

        let base = self.base_table(camera, params, pass);
        let draws = grid_instances()
            .map(|instance| {
                let model = instance.model_transform();
                let mut overrides = UniformTable::new();
                overrides
                    .set(names::MODEL_TRANSFORM, model)
                    .set(names::LOCAL_TO_PROJECTION, camera.local_to_projection(model))
                    .set(names::ALPHA, instance.alpha())
                    .set(names::METALLIC, instance.metallic());
                DrawCall {
                    instance,
                    overrides,
                }
            })
            .collect();

        FramePlan {
            pass,
            viewport,
            clear,
            mode,
            base,
            draws,
        }
    }

    fn base_table(&self, camera: &Camera, params: &ShadingParams, pass: PassKind) -> UniformTable {
        let mut table = UniformTable::new();
        table
            .set(names::ALBEDO, params.albedo_normalized())
            .set(names::CAMERA_POSITION, camera.position)
            .set(names::PUNCTUAL, params.punctual)
            .set(names::MATERIAL, params.material)
            .set(names::TEXTURED_METAL, params.textured_metal)
            .set(names::USE_BAKED_IRRADIANCE, params.use_baked_irradiance);
        for slot in &self.texture_slots {
            table.set(slot.uniform_name(), *slot);
        }
        // The target is only readable once it is no longer the destination.
        if pass == PassKind::ForwardShading {
            table.set(names::TEXTURE_BAKED_IRRADIANCE, TextureSlot::BakedIrradiance);
        }
        table
    }
}
