use crate::geometry::Mesh;

// Far plane of stars, behind everything once the depth buffer is reset.
const HALF_WIDTH: f64 = 4000.0;
const HALF_HEIGHT: f64 = 2000.0;
const DEPTH: f64 = 1000.0;

pub fn backdrop_mesh() -> Mesh {
    // position, uv, normal towards the camera
    let corner = |x: f64, y: f64, u: f64, v: f64| {
        vec![x, y, DEPTH, u, v, 0.0, 0.0, 1.0]
    };

    let vertices = [
        corner(-HALF_WIDTH, HALF_HEIGHT, 0.0, 0.0),
        corner(-HALF_WIDTH, -HALF_HEIGHT, 0.0, 1.0),
        corner(HALF_WIDTH, HALF_HEIGHT, 1.0, 0.0),
        corner(HALF_WIDTH, -HALF_HEIGHT, 1.0, 1.0),
    ].concat();

    Mesh::new(vertices, vec![0, 1, 2, 3, 2, 1])
}
