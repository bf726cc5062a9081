use std::sync::Arc;

use vulkano::device::Device;
use vulkano::framebuffer::{RenderPassAbstract, Subpass};
use vulkano::pipeline::{GraphicsPipeline, GraphicsPipelineAbstract};

use cgmath::Matrix4;

use crate::config::LightConfig;
use crate::error::InitError;
use crate::frame::ShaderKind;
use crate::geometry::Vertex;

pub type Pipeline = Arc<dyn GraphicsPipelineAbstract + Send + Sync>;
pub type RenderPass = Arc<dyn RenderPassAbstract + Send + Sync>;

/// Uniform block layout shared by both vertex stages.
pub type Uniforms = planet_vs::ty::Data;

pub fn uniforms(mvp: Matrix4<f32>, model: Matrix4<f32>, light: &LightConfig) -> Uniforms {
    let [r, g, b] = light.color;
    let [x, y, z] = light.position;

    Uniforms {
        mvp: mvp.into(),
        model: model.into(),
        light_color: [r, g, b, 1.0],
        light_pos: [x, y, z, 1.0],
    }
}

// Textured triangle lists with depth testing and alpha blending
macro_rules! textured_pipeline {
    ($device:expr, $render_pass:expr, $vs:expr, $fs:expr) => {
        GraphicsPipeline::start()
            .vertex_input_single_buffer::<Vertex>()
            .vertex_shader($vs.main_entry_point(), ())
            .triangle_list()
            .viewports_dynamic_scissors_irrelevant(1)
            .fragment_shader($fs.main_entry_point(), ())
            .depth_stencil_simple_depth()
            .blend_alpha_blending()
            .render_pass(Subpass::from($render_pass.clone(), 0).ok_or(InitError::MissingSubpass(0))?)
            .build($device.clone())
    };
}

/// Compiled shader modules, loaded once and shared by every render pass.
pub struct Shaders {
    planet_vs: planet_vs::Shader,
    planet_fs: planet_fs::Shader,
    sun_vs: sun_vs::Shader,
    sun_fs: sun_fs::Shader,
}

impl Shaders {
    pub fn load(device: Arc<Device>) -> Result<Self, InitError> {
        Ok(Shaders {
            planet_vs: planet_vs::Shader::load(device.clone())?,
            planet_fs: planet_fs::Shader::load(device.clone())?,
            sun_vs: sun_vs::Shader::load(device.clone())?,
            sun_fs: sun_fs::Shader::load(device)?,
        })
    }
}

/// One pipeline per shader kind for a given render pass.
pub struct Pipelines {
    planet: Pipeline,
    sun: Pipeline,
}

impl Pipelines {
    pub fn new(device: Arc<Device>, render_pass: RenderPass, shaders: &Shaders) -> Result<Self, InitError> {
        let planet = textured_pipeline!(device, render_pass, shaders.planet_vs, shaders.planet_fs)?;
        let sun = textured_pipeline!(device, render_pass, shaders.sun_vs, shaders.sun_fs)?;

        Ok(Pipelines {
            planet: Arc::new(planet),
            sun: Arc::new(sun),
        })
    }

    pub fn select(&self, shader: ShaderKind) -> Pipeline {
        match shader {
            ShaderKind::Planet => self.planet.clone(),
            ShaderKind::Sun => self.sun.clone(),
        }
    }
}

mod planet_vs {
    vulkano_shaders::shader!{
        ty: "vertex",
        include: ["src/shaders"],
        path: "src/shaders/planet.vert"
    }
}

mod planet_fs {
    vulkano_shaders::shader!{
        ty: "fragment",
        path: "src/shaders/planet.frag"
    }
}

mod sun_vs {
    vulkano_shaders::shader!{
        ty: "vertex",
        include: ["src/shaders"],
        path: "src/shaders/sun.vert"
    }
}

mod sun_fs {
    vulkano_shaders::shader!{
        ty: "fragment",
        path: "src/shaders/sun.frag"
    }
}

#[allow(dead_code)]
const X: &str = include_str!("shaders/transform.glsl");
