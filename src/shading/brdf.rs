//! Cook-Torrance / Lambert BRDF. Mirrors the WGSL in `render/shader.wgsl`
//! term for term so the numerics can be checked without a GPU.

use std::f32::consts::PI;

use glam::Vec3;

use super::color::{linear_to_srgb, srgb_to_linear, tone_map};

/// Floor for every dot product that ends up in a denominator.
pub const EPSILON: f32 = 0.001;

pub const DIELECTRIC_F0: f32 = 0.04;

pub const POINT_LIGHTS: [Vec3; 4] = [
    Vec3::new(4.0, 4.0, 2.0),
    Vec3::new(3.0, -3.0, 2.0),
    Vec3::new(-3.0, 3.0, 2.0),
    Vec3::new(-2.0, -2.0, 2.0),
];

const MIN_ALPHA_PUNCTUAL: f32 = 0.05;
const MIN_ALPHA_IMAGE: f32 = 0.005;
const MIN_METALLIC: f32 = 0.05;

#[inline]
fn clamped_dot(a: Vec3, b: Vec3) -> f32 {
    a.dot(b).clamp(EPSILON, 1.0)
}

pub fn half_vector(light: Vec3, view: Vec3) -> Vec3 {
    (light + view).normalize()
}

pub fn base_reflectance(albedo: Vec3, metallic: f32) -> Vec3 {
    Vec3::splat(DIELECTRIC_F0).lerp(albedo, metallic)
}

pub fn fresnel_schlick(f0: Vec3, v: Vec3, h: Vec3) -> Vec3 {
    f0 + (Vec3::ONE - f0) * (1.0 - clamped_dot(v, h)).powi(5)
}

pub fn distribution_ggx(n: Vec3, h: Vec3, alpha: f32) -> f32 {
    distribution_ggx_cos(n.dot(h), alpha)
}

/// GGX with `cos_nh = dot(N, H)` given directly.
pub fn distribution_ggx_cos(cos_nh: f32, alpha: f32) -> f32 {
    let a2 = alpha * alpha;
    let c = cos_nh.clamp(EPSILON, 1.0);
    let denom = c * c * (a2 - 1.0) + 1.0;
    a2 / (PI * denom * denom)
}

/// Schlick-GGX with the same `k = alpha` for the view and light terms.
pub fn geometry_smith(n: Vec3, v: Vec3, l: Vec3, alpha: f32) -> f32 {
    geometry_schlick(clamped_dot(n, v), alpha) * geometry_schlick(clamped_dot(n, l), alpha)
}

fn geometry_schlick(n_dot_x: f32, k: f32) -> f32 {
    n_dot_x / (n_dot_x * (1.0 - k) + k)
}

/// `D·G / (4·(N·L)(N·V))`, without the Fresnel factor.
pub fn specular_lobe(l: Vec3, v: Vec3, n: Vec3, alpha: f32) -> f32 {
    let h = half_vector(l, v);
    let dg = distribution_ggx(n, h, alpha) * geometry_smith(n, v, l, alpha);
    dg / (4.0 * clamped_dot(l, n) * clamped_dot(v, n))
}

pub fn lambert(albedo: Vec3) -> Vec3 {
    albedo / PI
}

/// Inputs of a single shaded point.
#[derive(Clone, Copy, Debug)]
pub struct Surface {
    pub position: Vec3,
    pub normal: Vec3,
    /// sRGB-encoded base colour in 0–1.
    pub albedo: Vec3,
    /// Perceptual roughness parameter before remapping.
    pub alpha: f32,
    pub metallic: f32,
}

impl Surface {
    pub fn roughness_punctual(&self) -> f32 {
        remap_alpha(self.alpha, MIN_ALPHA_PUNCTUAL)
    }

    pub fn roughness_image(&self) -> f32 {
        remap_alpha(self.alpha, MIN_ALPHA_IMAGE)
    }

    pub fn metallic(&self) -> f32 {
        self.metallic.clamp(MIN_METALLIC, 1.0)
    }

    pub fn linear_albedo(&self) -> Vec3 {
        srgb_to_linear(self.albedo)
    }
}

fn remap_alpha(alpha: f32, min: f32) -> f32 {
    let a = alpha.clamp(min, 1.0);
    a * a
}

/// Radiance reflected toward `eye` from one light at `light_position`, in
/// linear space, before tone mapping.
pub fn punctual_contribution(surface: &Surface, eye: Vec3, light_position: Vec3) -> Vec3 {
    let albedo = surface.linear_albedo();
    let roughness = surface.roughness_punctual();
    let metallic = surface.metallic();
    let n = surface.normal.normalize();
    let w_o = (eye - surface.position).normalize();
    let w_i = (light_position - surface.position).normalize();

    let f0 = base_reflectance(albedo, metallic);
    let k_s = fresnel_schlick(f0, w_i, half_vector(w_i, w_o));
    let specular = k_s * specular_lobe(w_i, w_o, n, roughness);
    let diffuse = (Vec3::ONE - k_s) * lambert(albedo) * (1.0 - metallic);

    (diffuse + specular) * n.dot(w_i).max(0.0)
}

/// Punctual mode: the four fixed lights, Reinhard, sRGB.
pub fn shade_punctual(surface: &Surface, eye: Vec3) -> Vec3 {
    shade_lights(surface, eye, &POINT_LIGHTS)
}

pub fn shade_lights(surface: &Surface, eye: Vec3, lights: &[Vec3]) -> Vec3 {
    let radiance: Vec3 = lights
        .iter()
        .map(|&light| punctual_contribution(surface, eye, light))
        .sum();
    linear_to_srgb(tone_map(radiance))
}

/// Lookups an image-based shading step needs, already decoded to linear.
#[derive(Clone, Copy, Debug)]
pub struct EnvironmentSample {
    pub irradiance: Vec3,
    pub prefiltered: Vec3,
    /// `(scale, bias)` from the BRDF integration table.
    pub brdf: (f32, f32),
}

/// Image-based mode once the environment has been sampled.
pub fn shade_image_based(surface: &Surface, eye: Vec3, env: &EnvironmentSample) -> Vec3 {
    let albedo = surface.linear_albedo();
    let metallic = surface.metallic();
    let n = surface.normal.normalize();
    let w_o = (eye - surface.position).normalize();

    let f0 = base_reflectance(albedo, metallic);
    // The environment is convolved around the normal, so N plays the light.
    let k_s = fresnel_schlick(f0, n, half_vector(n, w_o));
    let k_d = (Vec3::ONE - k_s) * (1.0 - metallic) * albedo;
    let diffuse = k_d * env.irradiance;
    let specular = env.prefiltered * (k_s * env.brdf.0 + Vec3::splat(env.brdf.1));

    linear_to_srgb(tone_map(diffuse + specular))
}

pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * incident.dot(normal) * normal
}
