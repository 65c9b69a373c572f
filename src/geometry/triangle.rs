use super::{Geometry, Vertex};

impl Geometry {
    /// Single camera-facing triangle, the minimal geometry the pipeline can draw.
    pub fn triangle() -> Self {
        let normal = [0.0, 0.0, 1.0];
        let vertices = vec![
            Vertex {
                position: [-0.5, -0.5, 0.0],
                normal,
                uv: [0.0, 0.0],
            },
            Vertex {
                position: [0.5, -0.5, 0.0],
                normal,
                uv: [1.0, 0.0],
            },
            Vertex {
                position: [0.0, 0.5, 0.0],
                normal,
                uv: [0.5, 1.0],
            },
        ];
        Geometry::from_parts(vertices, vec![0, 1, 2], "triangle")
    }
}
