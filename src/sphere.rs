use std::convert::TryFrom;
use std::f64::consts::PI;

use crate::geometry::{Mesh, Point, FLOATS_PER_VERTEX};

// UV sphere: `horiz + 2` rings of `vert` vertices each, poles included.
pub struct Sphere {
    horiz: u32,
    vert: u32,
    center: Point,
    radius: f64,
}

impl Sphere {
    pub fn new(horiz: u32, vert: u32, center: Point, radius: f64) -> Self {
        Sphere {
            horiz: horiz,
            vert: vert,
            center: center,
            radius: radius
        }
    }

    /// Vertex and index counts, or `None` when some vertex would be out of
    /// reach of a `u32` index.
    pub fn mesh_size(horiz: u32, vert: u32) -> Option<(usize, usize)> {
        let vertices = (vert as u64).checked_mul(horiz as u64 + 2)?;
        if vertices > 1 << 32 {
            return None;
        }

        let indices = 6u64.checked_mul(horiz as u64)?.checked_mul(vert as u64)?;
        Some((usize::try_from(vertices).ok()?, usize::try_from(indices).ok()?))
    }

    /// Expects subdivisions that pass `mesh_size`.
    pub fn build(&self) -> Mesh {
        Mesh::new(self.vertices(), self.indices())
    }

    fn vertices(&self) -> Vec<f64> {
        let horiz = self.horiz as usize;
        let vert = self.vert as usize;
        let mut vertices = vec![0.0; FLOATS_PER_VERTEX * vert * (horiz + 2)];

        for yy in 0..=horiz + 1 {
            let y = (yy as f64 * PI / (horiz as f64 + 1.0)).cos();
            let ring = (1.0 - y * y).sqrt();

            for rr in 0..vert {
                let angle = 2.0 * PI * rr as f64 / vert as f64;
                let offset = [ring * angle.cos(), y, ring * angle.sin()];
                let idx = (rr + yy * vert) * FLOATS_PER_VERTEX;

                // Position
                let mut position = [0.0; 3];
                for i in 0..3 {
                    position[i] = offset[i] * self.radius + self.center[i];
                }
                vertices[idx..idx + 3].copy_from_slice(&position);

                // Texels. v goes through tan, not acos; kept for texture compatibility.
                let len = offset.iter().fold(0.0, |acc, x| acc + x * x).sqrt();
                vertices[idx + 3] = offset[0].atan2(offset[2]) / (2.0 * PI);
                vertices[idx + 4] = (offset[1] / len).tan() / PI + 0.5;

                // Normals point back at the center
                let mut normal = [0.0; 3];
                for i in 0..3 {
                    normal[i] = self.center[i] - position[i];
                }
                let amplitude = normal.iter().fold(0.0, |acc, x| acc + x * x).sqrt();
                for i in 0..3 {
                    vertices[idx + 5 + i] = normal[i] / amplitude;
                }
            }
        }

        vertices
    }

    fn indices(&self) -> Vec<u32> {
        let horiz = self.horiz as usize;
        let vert = self.vert as usize;
        let mut indices = vec![0u32; 3 * 2 * vert * horiz];

        // Largest value written is the last vertex, which `mesh_size` keeps within u32
        for yy in 0..horiz {
            let ring = yy * vert;

            for rr in 0..vert {
                let next = (rr + 1) % vert;

                let idx = (rr + 2 * ring) * 3;
                indices[idx] = (next + ring) as u32;
                indices[idx + 1] = (rr + vert + ring) as u32;
                indices[idx + 2] = (next + vert + ring) as u32;

                let idx2 = (rr + vert + 2 * ring) * 3;
                indices[idx2] = (rr + vert + ring) as u32;
                indices[idx2 + 1] = (rr + 2 * vert + ring) as u32;
                indices[idx2 + 2] = (next + vert + ring) as u32;
            }
        }

        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn distance(a: Point, b: Point) -> f64 {
        ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
    }

    #[test]
    fn smallest_sphere_has_coincident_pole() {
        let mesh = Sphere::new(1, 4, [0.0, 0.0, 0.0], 1.0).build();

        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.index_count(), 24);

        for rr in 0..4 {
            let p = mesh.get_position(rr);
            assert_eq!(p[1], 1.0);
            assert!(p[0].abs() < 1e-12);
            assert!(p[2].abs() < 1e-12);
        }
    }

    #[test]
    fn smallest_sphere_topology() {
        let mesh = Sphere::new(1, 4, [0.0, 0.0, 0.0], 1.0).build();

        assert_eq!(mesh.get_indices(), &[
            1, 4, 5,
            2, 5, 6,
            3, 6, 7,
            0, 7, 4,
            4, 8, 5,
            5, 9, 6,
            6, 10, 7,
            7, 11, 4
        ][..]);
    }

    #[test]
    fn counts_follow_subdivisions() {
        let mut rng = StdRng::seed_from_u64(28941092);

        for _ in 0..32 {
            let horiz = rng.gen_range(1, 40);
            let vert = rng.gen_range(3, 40);
            let mesh = Sphere::new(horiz, vert, [0.0, 0.0, 0.0], 1.0).build();

            assert_eq!(mesh.vertex_count(), (vert * (horiz + 2)) as usize);
            assert_eq!(mesh.index_count(), (6 * horiz * vert) as usize);

            let count = mesh.vertex_count() as u32;
            assert!(mesh.get_indices().iter().all(|&i| i < count));
        }
    }

    #[test]
    fn positions_lie_on_the_surface() {
        let mut rng = StdRng::seed_from_u64(10100);

        for _ in 0..8 {
            let center = [
                rng.gen_range(-100.0, 100.0),
                rng.gen_range(-100.0, 100.0),
                rng.gen_range(-100.0, 100.0)
            ];
            let radius = rng.gen_range(0.5, 500.0);
            let mesh = Sphere::new(rng.gen_range(1, 24), rng.gen_range(3, 24), center, radius).build();

            for i in 0..mesh.vertex_count() {
                let error = (distance(mesh.get_position(i), center) - radius).abs();
                assert!(error <= 1e-9 * radius, "vertex {} off by {}", i, error);
            }
        }
    }

    #[test]
    fn normals_are_unit_and_face_the_center() {
        let center = [3.0, -2.0, 5.0];
        let mesh = Sphere::new(6, 8, center, 2.0).build();
        let data = mesh.get_vertices();

        for i in 0..mesh.vertex_count() {
            let base = i * FLOATS_PER_VERTEX;
            let normal = [data[base + 5], data[base + 6], data[base + 7]];
            assert!((distance(normal, [0.0; 3]) - 1.0).abs() < 1e-9);

            // One step along the normal lands closer to the center
            let p = mesh.get_position(i);
            let stepped = [p[0] + normal[0], p[1] + normal[1], p[2] + normal[2]];
            assert!(distance(stepped, center) < distance(p, center));
        }
    }

    #[test]
    fn texcoords_match_closed_form() {
        let mesh = Sphere::new(3, 6, [0.0, 0.0, 0.0], 10.0).build();
        let data = mesh.get_vertices();

        // yy = 1, rr = 0: y = cos(pi / 4), x = sin(pi / 4), z = 0
        let base = 6 * FLOATS_PER_VERTEX;
        let y = (PI / 4.0).cos();
        let x = (1.0 - y * y).sqrt();
        assert!((data[base + 3] - x.atan2(0.0) / (2.0 * PI)).abs() < 1e-12);
        assert!((data[base + 4] - (y.tan() / PI + 0.5)).abs() < 1e-12);

        // North pole: u = atan2(0, 0) = 0, v = tan(1) / pi + 0.5
        assert_eq!(data[3], 0.0);
        assert!((data[4] - (1.0f64.tan() / PI + 0.5)).abs() < 1e-12);
    }

    #[test]
    fn mesh_size_matches_built_mesh() {
        let mesh = Sphere::new(17, 23, [0.0, 0.0, 0.0], 1.0).build();
        assert_eq!(Sphere::mesh_size(17, 23), Some((mesh.vertex_count(), mesh.index_count())));
        assert_eq!(Sphere::mesh_size(500, 500), Some((500 * 502, 6 * 500 * 500)));
        assert_eq!(Sphere::mesh_size(0, 0), Some((0, 0)));
    }

    #[test]
    fn mesh_size_rejects_unaddressable_vertices() {
        // 65536 * 65536 vertices is the most a u32 index can reach
        assert!(Sphere::mesh_size(65534, 65536).is_some());
        assert_eq!(Sphere::mesh_size(65535, 65536), None);
        assert_eq!(Sphere::mesh_size(u32::MAX, u32::MAX), None);
        assert_eq!(Sphere::mesh_size(100_000, 100_000), None);
    }

    #[test]
    fn generation_is_deterministic() {
        let a = Sphere::new(17, 23, [1.0, 2.0, 3.0], 450.0).build();
        let b = Sphere::new(17, 23, [1.0, 2.0, 3.0], 450.0).build();

        let bits = |m: &Mesh| m.get_vertices().iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
        assert_eq!(a.get_indices(), b.get_indices());
    }
}
