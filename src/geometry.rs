pub type Point = [f64; 3];

/// position (3), texture coordinate (2), normal (3)
pub const FLOATS_PER_VERTEX: usize = 8;

#[derive(Default, Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3]
}

vulkano::impl_vertex!(Vertex, position, uv, normal);

/// Flat vertex data plus a triangle list. Built once, never mutated.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct Mesh {
    vertices: Vec<f64>,
    indices: Vec<u32>
}

impl Mesh {
    pub fn new(vertices: Vec<f64>, indices: Vec<u32>) -> Self {
        Mesh {
            vertices: vertices,
            indices: indices
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[cfg(test)]
    pub fn get_vertices(&self) -> &[f64] {
        &self.vertices
    }

    pub fn get_indices(&self) -> &[u32] {
        &self.indices
    }

    #[cfg(test)]
    pub fn get_position(&self, index: usize) -> Point {
        let base = index * FLOATS_PER_VERTEX;
        [self.vertices[base], self.vertices[base + 1], self.vertices[base + 2]]
    }

    // Narrow to the GPU vertex layout
    pub fn to_vertices(&self) -> Vec<Vertex> {
        self.vertices.chunks_exact(FLOATS_PER_VERTEX).map(|v| {
            Vertex {
                position: [v[0] as f32, v[1] as f32, v[2] as f32],
                uv: [v[3] as f32, v[4] as f32],
                normal: [v[5] as f32, v[6] as f32, v[7] as f32]
            }
        }).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrows_interleaved_floats_into_vertices() {
        let mesh = Mesh::new(
            vec![
                1.0, 2.0, 3.0, 0.25, 0.75, 0.0, 0.0, -1.0,
                4.0, 5.0, 6.0, 0.5, 0.5, 0.0, 1.0, 0.0
            ],
            vec![0, 1, 0]
        );

        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.index_count(), 3);
        assert_eq!(mesh.get_position(1), [4.0, 5.0, 6.0]);

        let vertices = mesh.to_vertices();
        assert_eq!(vertices[0], Vertex {
            position: [1.0, 2.0, 3.0],
            uv: [0.25, 0.75],
            normal: [0.0, 0.0, -1.0]
        });
        assert_eq!(vertices[1].normal, [0.0, 1.0, 0.0]);
    }
}
