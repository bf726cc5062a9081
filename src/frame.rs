//! What a frame draws and in which order, independent of the GPU backend.
//!
//! The backdrop always goes first into a fresh colour and depth buffer. The
//! depth buffer is then cleared so the backdrop can never hide a body, and
//! the bodies follow in table order.

use cgmath::{Matrix4, SquareMatrix};

use crate::body::{Body, BodyKind};
use crate::camera::Camera;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MeshKind {
    Backdrop,
    Sphere,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderKind {
    /// Lit by the scene light
    Planet,
    /// Unlit, emissive
    Sun,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCall {
    pub mesh: MeshKind,
    pub shader: ShaderKind,
    pub texture: usize,
    pub model: Matrix4<f32>,
    pub mvp: Matrix4<f32>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Step {
    ClearColorDepth,
    ClearDepth,
    Draw(DrawCall),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    steps: Vec<Step>,
}

impl FramePlan {
    pub fn get_steps(&self) -> &[Step] {
        &self.steps
    }

    #[cfg(test)]
    pub fn draws(&self) -> impl Iterator<Item = &DrawCall> {
        self.steps.iter().filter_map(|s| match s {
            Step::Draw(call) => Some(call),
            _ => None,
        })
    }
}

/// Everything drawn each frame. Fixed after startup.
pub struct Scene {
    camera: Camera,
    bodies: Vec<Body>,
    backdrop_texture: usize,
}

impl Scene {
    pub fn new(camera: Camera, bodies: Vec<Body>, backdrop_texture: usize) -> Self {
        Scene {
            camera: camera,
            bodies: bodies,
            backdrop_texture: backdrop_texture,
        }
    }

    pub fn get_bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn plan(&self, time: f64) -> FramePlan {
        let mut steps = Vec::with_capacity(self.bodies.len() + 3);

        steps.push(Step::ClearColorDepth);
        steps.push(Step::Draw(DrawCall {
            mesh: MeshKind::Backdrop,
            shader: ShaderKind::Planet,
            texture: self.backdrop_texture,
            model: Matrix4::identity(),
            mvp: self.camera.view_projection(),
        }));
        steps.push(Step::ClearDepth);

        // Stars first, then planets, each group keeping table order
        let stars = self.bodies.iter().filter(|b| b.get_kind() == BodyKind::Star);
        let planets = self.bodies.iter().filter(|b| b.get_kind() == BodyKind::Planet);

        for body in stars.chain(planets) {
            let model = body.model_matrix(time);
            let shader = match body.get_kind() {
                BodyKind::Star => ShaderKind::Sun,
                BodyKind::Planet => ShaderKind::Planet,
            };

            steps.push(Step::Draw(DrawCall {
                mesh: MeshKind::Sphere,
                shader: shader,
                texture: body.get_texture(),
                model: model,
                mvp: self.camera.mvp(model),
            }));
        }

        FramePlan { steps: steps }
    }
}
