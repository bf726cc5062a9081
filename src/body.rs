use cgmath::{InnerSpace, Matrix4, Rad, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Spins in place and uses the emissive shader
    Star,
    Planet
}

/// A celestial object. Every parameter is fixed for the run; only time moves it.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    name: String,
    kind: BodyKind,
    translation: Vector3<f32>,
    scale: Vector3<f32>,
    spin_rate: f32,
    orbit_rate: f32,
    texture: usize
}

impl Body {
    pub fn new(name: &str, kind: BodyKind, translation: Vector3<f32>, scale: Vector3<f32>, spin_rate: f32, orbit_rate: f32, texture: usize) -> Self {
        Body {
            name: name.to_string(),
            kind: kind,
            translation: translation,
            scale: scale,
            spin_rate: spin_rate,
            orbit_rate: orbit_rate,
            texture: texture
        }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_kind(&self) -> BodyKind {
        self.kind
    }

    pub fn get_texture(&self) -> usize {
        self.texture
    }

    pub fn spin_angle(&self, time: f64) -> Rad<f32> {
        Rad((self.spin_rate as f64 * time) as f32)
    }

    pub fn orbit_angle(&self, time: f64) -> Rad<f32> {
        match self.kind {
            BodyKind::Star => Rad(0.0),
            BodyKind::Planet => Rad((self.orbit_rate as f64 * time) as f32)
        }
    }

    // Perpendicular to the body's offset in the XY plane
    pub fn orbit_axis(&self) -> Vector3<f32> {
        Vector3::new(-self.translation.y, self.translation.x, 0.0)
    }

    /// Orbit * Translate * Scale * Spin. Stars skip the orbit term.
    pub fn model_matrix(&self, time: f64) -> Matrix4<f32> {
        let placed = Matrix4::from_translation(self.translation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
            * Matrix4::from_axis_angle(Vector3::unit_y(), self.spin_angle(time));

        match self.kind {
            BodyKind::Star => placed,
            BodyKind::Planet => {
                let axis = self.orbit_axis();
                if axis.magnitude2() == 0.0 {
                    return placed;
                }

                Matrix4::from_axis_angle(axis.normalize(), self.orbit_angle(time)) * placed
            }
        }
    }

    #[cfg(test)]
    pub fn rest_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector4, Zero};

    fn earth() -> Body {
        Body::new("earth", BodyKind::Planet, Vector3::new(1300.0, -300.0, 0.0), Vector3::new(0.34, 0.3, 0.3), 0.05, 0.04, 3)
    }

    fn sun() -> Body {
        Body::new("sun", BodyKind::Star, Vector3::zero(), Vector3::new(1.1, 1.0, 1.0), 0.03, 0.5, 0)
    }

    #[test]
    fn at_rest_model_is_translate_scale() {
        let earth = earth();
        assert_eq!(earth.model_matrix(0.0), earth.rest_matrix());
        assert_eq!(
            earth.rest_matrix(),
            Matrix4::from_translation(Vector3::new(1300.0, -300.0, 0.0)) * Matrix4::from_nonuniform_scale(0.34, 0.3, 0.3)
        );

        let sun = sun();
        assert_eq!(sun.model_matrix(0.0), sun.rest_matrix());
    }

    fn assert_close(actual: Matrix4<f32>, expected: Matrix4<f32>) {
        let a: [[f32; 4]; 4] = actual.into();
        let e: [[f32; 4]; 4] = expected.into();

        for col in 0..4 {
            for row in 0..4 {
                let tolerance = 1e-4 * (1.0 + e[col][row].abs());
                assert!(
                    (a[col][row] - e[col][row]).abs() <= tolerance,
                    "element [{}][{}]: {} != {}\n{:?}\n{:?}", col, row, a[col][row], e[col][row], actual, expected
                );
            }
        }
    }

    #[test]
    fn planet_model_is_orbit_translate_scale_spin() {
        let earth = earth();

        for &time in &[1.0, 10.0, 25.5, 60.0] {
            let t = time as f32;
            let expected = Matrix4::from_axis_angle(Vector3::new(300.0, 1300.0, 0.0).normalize(), Rad(0.04 * t))
                * Matrix4::from_translation(Vector3::new(1300.0, -300.0, 0.0))
                * Matrix4::from_nonuniform_scale(0.34, 0.3, 0.3)
                * Matrix4::from_axis_angle(Vector3::unit_y(), Rad(0.05 * t));

            assert_close(earth.model_matrix(time), expected);
        }
    }

    #[test]
    fn star_model_is_translate_scale_spin() {
        // Off the origin so a stray orbit term would move it
        let star = Body::new("star", BodyKind::Star, Vector3::new(500.0, 200.0, 0.0), Vector3::new(1.1, 1.0, 1.0), 0.03, 0.5, 0);

        for &time in &[1.0, 10.0, 25.5, 60.0] {
            let t = time as f32;
            let expected = Matrix4::from_translation(Vector3::new(500.0, 200.0, 0.0))
                * Matrix4::from_nonuniform_scale(1.1, 1.0, 1.0)
                * Matrix4::from_axis_angle(Vector3::unit_y(), Rad(0.03 * t));

            assert_close(star.model_matrix(time), expected);

            let center = star.model_matrix(time) * Vector4::new(0.0, 0.0, 0.0, 1.0);
            assert!((center - Vector4::new(500.0, 200.0, 0.0, 1.0)).magnitude() < 1e-3);
        }

        let sun = sun();
        for &time in &[2.0, 40.0] {
            let expected = Matrix4::from_nonuniform_scale(1.1, 1.0, 1.0)
                * Matrix4::from_axis_angle(Vector3::unit_y(), Rad(0.03 * time as f32));
            assert_close(sun.model_matrix(time), expected);
        }
    }

    #[test]
    fn scale_applies_after_spin() {
        // Spinning a quarter turn about Y carries the x stretch over to z
        let body = Body::new("oblate", BodyKind::Star, Vector3::zero(), Vector3::new(2.0, 1.0, 1.0), std::f32::consts::FRAC_PI_2, 0.0, 0);
        let tip = body.model_matrix(1.0) * Vector4::new(0.0, 0.0, 1.0, 1.0);

        assert!((tip.x - 2.0).abs() < 1e-5, "{:?}", tip);
        assert!(tip.z.abs() < 1e-5, "{:?}", tip);
    }

    #[test]
    fn same_time_same_matrix() {
        let earth = earth();
        assert_eq!(earth.model_matrix(12.75), earth.model_matrix(12.75));
    }

    #[test]
    fn angles_are_linear_in_time() {
        let venus = Body::new("venus", BodyKind::Planet, Vector3::new(900.0, 600.0, 0.0), Vector3::new(0.34, 0.3, 0.3), -0.09, -0.03, 2);

        assert_eq!(venus.spin_angle(10.0), Rad((-0.09f32 as f64 * 10.0) as f32));
        assert_eq!(venus.orbit_angle(10.0), Rad((-0.03f32 as f64 * 10.0) as f32));
        assert!(venus.orbit_angle(10.0).0 < 0.0);
    }

    #[test]
    fn star_never_orbits() {
        let sun = sun();
        assert_eq!(sun.orbit_angle(100.0), Rad(0.0));

        // The center stays put while it spins
        let center = sun.model_matrix(100.0) * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(center, Vector4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn orbit_keeps_distance_from_origin() {
        let earth = earth();
        let start = earth.model_matrix(0.0) * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let later = earth.model_matrix(30.0) * Vector4::new(0.0, 0.0, 0.0, 1.0);

        assert!((start.truncate().magnitude() - later.truncate().magnitude()).abs() < 0.5);
        assert!((start - later).magnitude() > 1.0);
    }

    #[test]
    fn orbit_axis_is_perpendicular_to_offset() {
        let earth = earth();
        assert_eq!(earth.orbit_axis().dot(Vector3::new(1300.0, -300.0, 0.0)), 0.0);
    }
}
