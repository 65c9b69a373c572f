use std::f32::consts::PI;

use crate::error::GeometryError;

use super::{Geometry, Vertex};

pub const DEFAULT_RADIUS: f32 = 0.15;
pub const DEFAULT_SUBDIVISIONS: u32 = 32;

impl Geometry {
    /// UV sphere centred on the origin. `subdivisions_u` splits longitude,
    /// `subdivisions_v` latitude; both must be at least 2.
    ///
    /// Normals are the unit radial direction, so the shader can use them
    /// without a normal matrix as long as the sphere is only translated or
    /// uniformly scaled.
    pub fn sphere(
        radius: f32,
        subdivisions_u: u32,
        subdivisions_v: u32,
    ) -> Result<Self, GeometryError> {
        if subdivisions_u < 2 || subdivisions_v < 2 {
            return Err(GeometryError::TooFewSubdivisions {
                u: subdivisions_u,
                v: subdivisions_v,
            });
        }

        let (vertex_count, index_count) = sphere_counts(subdivisions_u, subdivisions_v).ok_or(
            GeometryError::TooManySubdivisions {
                u: subdivisions_u,
                v: subdivisions_v,
            },
        )?;

        let columns = subdivisions_u + 1;
        let mut vertices = Vec::with_capacity(vertex_count as usize);
        for ring in 0..=subdivisions_v {
            let theta = ring as f32 * PI / subdivisions_v as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();

            for segment in 0..=subdivisions_u {
                let phi = segment as f32 * 2.0 * PI / subdivisions_u as f32;
                let (sin_phi, cos_phi) = phi.sin_cos();

                let x = sin_theta * cos_phi;
                let y = cos_theta;
                let z = sin_theta * sin_phi;

                vertices.push(Vertex {
                    position: [x * radius, y * radius, z * radius],
                    normal: [x, y, z],
                    uv: [
                        segment as f32 / subdivisions_u as f32,
                        ring as f32 / subdivisions_v as f32,
                    ],
                });
            }
        }

        let mut indices = Vec::with_capacity(index_count as usize);
        for ring in 0..subdivisions_v {
            for segment in 0..subdivisions_u {
                let current = ring * columns + segment;
                let next = current + columns;

                indices.extend_from_slice(&[current, current + 1, next]);
                indices.extend_from_slice(&[current + 1, next + 1, next]);
            }
        }

        Ok(Geometry::from_parts(vertices, indices, "sphere"))
    }

    pub fn default_sphere() -> Result<Self, GeometryError> {
        Self::sphere(DEFAULT_RADIUS, DEFAULT_SUBDIVISIONS, DEFAULT_SUBDIVISIONS)
    }
}

/// `(u+1)(v+1)` vertices and `6uv` indices, or `None` when either count
/// leaves the `u32` range the index buffer and draw call use.
fn sphere_counts(subdivisions_u: u32, subdivisions_v: u32) -> Option<(u32, u32)> {
    let columns = subdivisions_u.checked_add(1)?;
    let rows = subdivisions_v.checked_add(1)?;
    let vertices = columns.checked_mul(rows)?;
    let indices = subdivisions_u
        .checked_mul(subdivisions_v)?
        .checked_mul(6)?;
    Some((vertices, indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn vertex_and_index_counts() {
        let sphere = Geometry::sphere(1.0, 8, 4).unwrap();
        assert_eq!(sphere.vertices().len(), 9 * 5);
        assert_eq!(sphere.indices().len(), 8 * 4 * 6);
        assert_eq!(sphere.triangle_count(), 8 * 4 * 2);
    }

    #[test]
    fn default_sphere_dimensions() {
        let sphere = Geometry::default_sphere().unwrap();
        assert_eq!(sphere.vertices().len(), 33 * 33);
        for v in sphere.vertices() {
            let p = Vec3::from(v.position);
            assert!((p.length() - DEFAULT_RADIUS).abs() < 1e-5);
        }
    }

    #[test]
    fn normals_are_unit_radial() {
        let sphere = Geometry::sphere(0.5, 12, 6).unwrap();
        for v in sphere.vertices() {
            let n = Vec3::from(v.normal);
            let p = Vec3::from(v.position);
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!((p / 0.5 - n).length() < 1e-5);
        }
    }

    #[test]
    fn indices_stay_in_range() {
        let sphere = Geometry::sphere(1.0, 5, 3).unwrap();
        let count = sphere.vertices().len() as u32;
        assert!(sphere.indices().iter().all(|&i| i < count));
    }

    #[test]
    fn side_triangles_face_outward() {
        let sphere = Geometry::sphere(1.0, 16, 8).unwrap();
        let verts = sphere.vertices();
        for tri in sphere.indices().chunks_exact(3) {
            let a = Vec3::from(verts[tri[0] as usize].position);
            let b = Vec3::from(verts[tri[1] as usize].position);
            let c = Vec3::from(verts[tri[2] as usize].position);
            let normal = (b - a).cross(c - a);
            // Pole triangles collapse to zero area.
            if normal.length() < 1e-6 {
                continue;
            }
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn rejects_degenerate_subdivisions() {
        assert_eq!(
            Geometry::sphere(1.0, 1, 8).unwrap_err(),
            GeometryError::TooFewSubdivisions { u: 1, v: 8 }
        );
        assert!(Geometry::sphere(1.0, 8, 0).is_err());
        assert!(Geometry::sphere(1.0, 2, 2).is_ok());
    }

    #[test]
    fn rejects_subdivisions_past_the_index_range() {
        assert_eq!(
            Geometry::sphere(1.0, 70_000, 70_000).unwrap_err(),
            GeometryError::TooManySubdivisions {
                u: 70_000,
                v: 70_000
            }
        );
        assert!(Geometry::sphere(1.0, u32::MAX, 2).is_err());
        // Vertices still fit here, the index count does not.
        assert!(Geometry::sphere(1.0, 30_000, 30_000).is_err());
    }

    #[test]
    fn counts_match_the_built_geometry() {
        assert_eq!(sphere_counts(8, 4), Some((45, 192)));
        assert_eq!(sphere_counts(u32::MAX, 2), None);
        assert_eq!(sphere_counts(65_535, 65_535), None);
    }
}
