use vulkano::buffer::cpu_pool::CpuBufferPool;
use vulkano::buffer::{BufferAccess, BufferUsage, CpuAccessibleBuffer};
use vulkano::command_buffer::{AutoCommandBuffer, AutoCommandBufferBuilder, DynamicState};
use vulkano::descriptor::descriptor_set::PersistentDescriptorSet;
use vulkano::descriptor::PipelineLayoutAbstract;
use vulkano::device::{Device, DeviceExtensions, Queue};
use vulkano::format::{ClearValue, Format};
use vulkano::framebuffer::{Framebuffer, FramebufferAbstract};
use vulkano::image::SwapchainImage;
use vulkano::image::attachment::AttachmentImage;
use vulkano::instance::Instance;
use vulkano::instance::PhysicalDevice;
use vulkano::pipeline::viewport::Viewport;
use vulkano::swapchain::{AcquireError, ColorSpace, FullscreenExclusive, PresentMode, Surface, SurfaceTransform, Swapchain, SwapchainCreationError};
use vulkano::swapchain;
use vulkano::sync::{GpuFuture, FlushError};
use vulkano::sync;

use vulkano_win::VkSurfaceBuild;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use tracing::{debug, error, info, warn};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::audio::MusicPlayer;
use crate::config::{LightConfig, WindowConfig};
use crate::error::{DriverError, InitError};
use crate::frame::{DrawCall, FramePlan, MeshKind, Scene, Step};
use crate::geometry::{Mesh, Vertex};
use crate::pipeline::{self, Pipelines, RenderPass, Shaders, Uniforms};
use crate::texture::Texture;

type Framebuffers = Vec<Arc<dyn FramebufferAbstract + Send + Sync>>;

/// Vertex and index buffers of one mesh, resident on the device.
pub struct GpuMesh {
    vertex_buffer: Arc<CpuAccessibleBuffer<[Vertex]>>,
    index_buffer: Arc<CpuAccessibleBuffer<[u32]>>,
}

impl GpuMesh {
    pub fn upload(device: Arc<Device>, mesh: &Mesh) -> Result<Self, InitError> {
        let vertex_buffer = CpuAccessibleBuffer::from_iter(device.clone(), BufferUsage::vertex_buffer(), false, mesh.to_vertices().into_iter())?;
        let index_buffer = CpuAccessibleBuffer::from_iter(device, BufferUsage::index_buffer(), false, mesh.get_indices().iter().cloned())?;

        Ok(GpuMesh {
            vertex_buffer: vertex_buffer,
            index_buffer: index_buffer,
        })
    }
}

/// Everything uploaded once at startup.
pub struct Assets {
    sphere: GpuMesh,
    backdrop: GpuMesh,
    textures: Vec<Texture>,
}

impl Assets {
    pub fn load(device: Arc<Device>, queue: Arc<Queue>, sphere: &Mesh, backdrop: &Mesh, textures: &[PathBuf]) -> Result<Self, InitError> {
        let textures = textures.iter()
            .map(|path| Texture::load(device.clone(), queue.clone(), path))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Assets {
            sphere: GpuMesh::upload(device.clone(), sphere)?,
            backdrop: GpuMesh::upload(device, backdrop)?,
            textures: textures,
        })
    }

    fn mesh(&self, kind: MeshKind) -> &GpuMesh {
        match kind {
            MeshKind::Sphere => &self.sphere,
            MeshKind::Backdrop => &self.backdrop,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Pass {
    Backdrop,
    Bodies,
}

/// Window, device and swapchain. Owned by the render loop once it starts.
pub struct Renderer {
    surface: Arc<Surface<Window>>,

    swapchain: Arc<Swapchain<Window>>,
    images: Vec<Arc<SwapchainImage<Window>>>,

    dimensions: [u32; 2],

    device: Arc<Device>,
    queue: Arc<Queue>,
    event_loop: EventLoop<()>,
}

impl Renderer {
    pub fn setup(config: &WindowConfig) -> Result<Self, InitError> {
        let required_extensions = vulkano_win::required_extensions();
        let instance = Instance::new(None, &required_extensions, None)?;
        let physical = PhysicalDevice::enumerate(&instance).next().ok_or(InitError::NoDevice)?;
        info!("Using device: {} (type: {:?})", physical.name(), physical.ty());

        let event_loop = EventLoop::new();
        let surface = WindowBuilder::new()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width as f64, config.height as f64))
            .build_vk_surface(&event_loop, instance.clone())?;
        let dimensions: [u32; 2] = surface.window().inner_size().into();
        info!(width = dimensions[0], height = dimensions[1], "window open");

        let queue_family = physical.queue_families().find(|&q|
            q.supports_graphics() && surface.is_supported(q).unwrap_or(false)
        ).ok_or(InitError::NoQueueFamily)?;

        let device_ext = DeviceExtensions {
            khr_swapchain: true,
            .. DeviceExtensions::none() };

        let (device, mut queues) = Device::new(
            physical, physical.supported_features(), &device_ext, [(queue_family, 0.5)].iter().cloned()
        )?;

        let queue = queues.next().ok_or(InitError::NoQueueFamily)?;

        let (swapchain, images) = {
            let caps = surface.capabilities(physical)?;
            let usage = caps.supported_usage_flags;
            let format = caps.supported_formats[0].0;
            let alpha = caps.supported_composite_alpha.iter().next().ok_or(InitError::NoCompositeAlpha)?;

            Swapchain::new(device.clone(), surface.clone(), caps.min_image_count, format, dimensions, 1,
                usage, &queue, SurfaceTransform::Identity, alpha, PresentMode::Fifo,
                FullscreenExclusive::Default, true, ColorSpace::SrgbNonLinear)?
        };

        Ok(Renderer {
            surface: surface,

            swapchain: swapchain,
            images: images,

            dimensions: dimensions,

            device: device,
            queue: queue,
            event_loop: event_loop,
        })
    }

    pub fn get_device(&self) -> Arc<Device> {
        self.device.clone()
    }

    pub fn get_queue(&self) -> Arc<Queue> {
        self.queue.clone()
    }

    pub fn get_dimensions(&self) -> [u32; 2] {
        self.dimensions
    }

    /// Runs the render loop until Escape or close. Only returns on a startup failure.
    pub fn start(self, scene: Scene, assets: Assets, light: LightConfig, music: Option<MusicPlayer>) -> Result<(), InitError> {
        let format = self.swapchain.format();

        // Fresh colour and depth for the backdrop
        let backdrop_pass: RenderPass = Arc::new(
            vulkano::single_pass_renderpass!(self.device.clone(),
                attachments: {
                    color: {
                        load: Clear,
                        store: Store,
                        format: format,
                        samples: 1,
                    },
                    depth: {
                        load: Clear,
                        store: DontCare,
                        format: Format::D16Unorm,
                        samples: 1,
                    }
                },
                pass: {
                    color: [color],
                    depth_stencil: {depth}
                }
            )?
        );

        // Keeps the backdrop's colour, starts over on depth
        let bodies_pass: RenderPass = Arc::new(
            vulkano::single_pass_renderpass!(self.device.clone(),
                attachments: {
                    color: {
                        load: Load,
                        store: Store,
                        format: format,
                        samples: 1,
                    },
                    depth: {
                        load: Clear,
                        store: DontCare,
                        format: Format::D16Unorm,
                        samples: 1,
                    }
                },
                pass: {
                    color: [color],
                    depth_stencil: {depth}
                }
            )?
        );

        let shaders = Shaders::load(self.device.clone())?;

        let mut submitter = Submitter {
            device: self.device.clone(),
            queue: self.queue.clone(),
            backdrop_pipelines: Pipelines::new(self.device.clone(), backdrop_pass.clone(), &shaders)?,
            bodies_pipelines: Pipelines::new(self.device.clone(), bodies_pass.clone(), &shaders)?,
            backdrop_framebuffers: build_framebuffers(self.device.clone(), &self.images, backdrop_pass.clone())?,
            bodies_framebuffers: build_framebuffers(self.device.clone(), &self.images, bodies_pass.clone())?,
            dynamic_state: dynamic_state(self.dimensions),
            uniform_buffer: CpuBufferPool::<Uniforms>::new(self.device.clone(), BufferUsage::all()),
            assets: assets,
            light: light,
        };

        let mut recreate_swapchain = false;

        let mut previous_frame_end = Some(Box::new(sync::now(self.device.clone())) as Box<dyn GpuFuture>);

        let mut swapchain = self.swapchain.clone();
        let device = self.device.clone();
        let surface = self.surface.clone();
        let queue = self.queue.clone();

        for body in scene.get_bodies() {
            debug!(name = body.get_name(), kind = ?body.get_kind(), texture = body.get_texture(), "body");
        }

        let start = Instant::now();
        info!(bodies = scene.get_bodies().len(), "entering render loop");

        self.event_loop.run(move |event, _, control_flow| {
            match event {
                Event::WindowEvent { event: WindowEvent::CloseRequested, .. } => {
                    *control_flow = ControlFlow::Exit;
                },
                Event::WindowEvent {
                    event: WindowEvent::KeyboardInput {
                        input: KeyboardInput { virtual_keycode: Some(VirtualKeyCode::Escape), state: ElementState::Pressed, .. },
                        ..
                    },
                    ..
                } => {
                    *control_flow = ControlFlow::Exit;
                },
                Event::WindowEvent { event: WindowEvent::Resized(_), .. } => {
                    recreate_swapchain = true;
                },
                Event::RedrawEventsCleared => {
                    if let Some(previous) = previous_frame_end.as_mut() {
                        previous.cleanup_finished();
                    }

                    if recreate_swapchain {
                        let dimensions: [u32; 2] = surface.window().inner_size().into();
                        let (new_swapchain, new_images) = match swapchain.recreate_with_dimensions(dimensions) {
                            Ok(r) => r,
                            Err(SwapchainCreationError::UnsupportedDimensions) => return,
                            Err(e) => {
                                error!("Failed to recreate swapchain: {:?}", e);
                                return;
                            }
                        };

                        swapchain = new_swapchain;
                        if let Err(e) = submitter.resize(&new_images, dimensions, backdrop_pass.clone(), bodies_pass.clone()) {
                            error!("Failed to rebuild framebuffers: {}", e);
                            return;
                        }
                        debug!(width = dimensions[0], height = dimensions[1], "swapchain recreated");
                        recreate_swapchain = false;
                    }

                    let (image_num, suboptimal, acquire_future) = match swapchain::acquire_next_image(swapchain.clone(), None) {
                        Ok(r) => r,
                        Err(AcquireError::OutOfDate) => {
                            recreate_swapchain = true;
                            return;
                        },
                        Err(e) => {
                            error!("Failed to acquire next image: {:?}", e);
                            return;
                        }
                    };

                    if suboptimal {
                        recreate_swapchain = true;
                    }

                    let plan = scene.plan(start.elapsed().as_secs_f64());

                    let command_buffer = match submitter.record(&plan, image_num) {
                        Ok(command_buffer) => command_buffer,
                        Err(e) => {
                            error!("{}", e);
                            return;
                        }
                    };

                    let previous = previous_frame_end.take()
                        .unwrap_or_else(|| Box::new(sync::now(device.clone())) as Box<dyn GpuFuture>);

                    let executed = match previous.join(acquire_future).then_execute(queue.clone(), command_buffer) {
                        Ok(executed) => executed,
                        Err(e) => {
                            error!("Failed to execute frame: {:?}", e);
                            previous_frame_end = Some(Box::new(sync::now(device.clone())) as Box<_>);
                            return;
                        }
                    };

                    let future = executed
                        .then_swapchain_present(queue.clone(), swapchain.clone(), image_num)
                        .then_signal_fence_and_flush();

                    match future {
                        Ok(future) => {
                            previous_frame_end = Some(Box::new(future) as Box<_>);
                        },
                        Err(FlushError::OutOfDate) => {
                            recreate_swapchain = true;
                            previous_frame_end = Some(Box::new(sync::now(device.clone())) as Box<_>);
                        }
                        Err(e) => {
                            warn!("Failed to flush future: {:?}", e);
                            previous_frame_end = Some(Box::new(sync::now(device.clone())) as Box<_>);
                        }
                    }
                },
                Event::LoopDestroyed => {
                    if let Some(music) = music.as_ref() {
                        music.stop();
                    }
                    info!("render loop finished");
                },
                _ => ()
            }
        });
    }
}

fn build_framebuffers(device: Arc<Device>, images: &[Arc<SwapchainImage<Window>>], render_pass: RenderPass) -> Result<Framebuffers, InitError> {
    let dimensions = images[0].dimensions();
    let depth_buffer = AttachmentImage::transient(device, dimensions, Format::D16Unorm)?;

    images.iter().map(|image| -> Result<Arc<dyn FramebufferAbstract + Send + Sync>, InitError> {
        let framebuffer = Framebuffer::start(render_pass.clone())
            .add(image.clone())?
            .add(depth_buffer.clone())?
            .build()?;

        Ok(Arc::new(framebuffer) as Arc<dyn FramebufferAbstract + Send + Sync>)
    }).collect()
}

fn dynamic_state(dimensions: [u32; 2]) -> DynamicState {
    DynamicState {
        viewports: Some(vec![Viewport {
            origin: [0.0, 0.0],
            dimensions: [dimensions[0] as f32, dimensions[1] as f32],
            depth_range: 0.0 .. 1.0,
        }]),
        .. DynamicState::none()
    }
}

/// Turns a frame plan into one command buffer.
struct Submitter {
    device: Arc<Device>,
    queue: Arc<Queue>,

    backdrop_pipelines: Pipelines,
    bodies_pipelines: Pipelines,
    backdrop_framebuffers: Framebuffers,
    bodies_framebuffers: Framebuffers,
    dynamic_state: DynamicState,

    uniform_buffer: CpuBufferPool<Uniforms>,
    assets: Assets,
    light: LightConfig,
}

impl Submitter {
    fn resize(&mut self, images: &[Arc<SwapchainImage<Window>>], dimensions: [u32; 2], backdrop_pass: RenderPass, bodies_pass: RenderPass) -> Result<(), InitError> {
        self.backdrop_framebuffers = build_framebuffers(self.device.clone(), images, backdrop_pass)?;
        self.bodies_framebuffers = build_framebuffers(self.device.clone(), images, bodies_pass)?;
        self.dynamic_state = dynamic_state(dimensions);

        Ok(())
    }

    fn record(&self, plan: &FramePlan, image_num: usize) -> Result<AutoCommandBuffer, DriverError> {
        let mut builder = checked!(AutoCommandBufferBuilder::primary_one_time_submit(self.device.clone(), self.queue.family()))?;
        let mut open: Option<Pass> = None;

        for step in plan.get_steps() {
            match step {
                Step::ClearColorDepth => {
                    if open.is_some() {
                        builder = checked!(builder.end_render_pass())?;
                    }
                    builder = checked!(builder.begin_render_pass(
                        self.backdrop_framebuffers[image_num].clone(), false,
                        vec![
                            [0.0, 0.0, 0.0, 1.0].into(),
                            1f32.into()
                        ]
                    ))?;
                    open = Some(Pass::Backdrop);
                },
                Step::ClearDepth => {
                    if open.is_some() {
                        builder = checked!(builder.end_render_pass())?;
                    }
                    builder = checked!(builder.begin_render_pass(
                        self.bodies_framebuffers[image_num].clone(), false,
                        vec![
                            ClearValue::None,
                            1f32.into()
                        ]
                    ))?;
                    open = Some(Pass::Bodies);
                },
                Step::Draw(call) => {
                    let pass = open.ok_or_else(|| DriverError::new("draw", file!(), line!(), "draw outside of a render pass"))?;
                    builder = self.draw(builder, pass, call)?;
                }
            }
        }

        if open.is_some() {
            builder = checked!(builder.end_render_pass())?;
        }

        checked!(builder.build())
    }

    /// Exactly one indexed draw over the whole mesh.
    fn draw(&self, builder: AutoCommandBufferBuilder, pass: Pass, call: &DrawCall) -> Result<AutoCommandBufferBuilder, DriverError> {
        let pipeline = match pass {
            Pass::Backdrop => self.backdrop_pipelines.select(call.shader),
            Pass::Bodies => self.bodies_pipelines.select(call.shader),
        };
        let mesh = self.assets.mesh(call.mesh);
        let texture = self.assets.textures.get(call.texture)
            .ok_or_else(|| DriverError::new("texture lookup", file!(), line!(), call.texture))?;

        let uniforms = checked!(self.uniform_buffer.next(pipeline::uniforms(call.mvp, call.model, &self.light)))?;

        let layout = pipeline.descriptor_set_layout(0)
            .ok_or_else(|| DriverError::new("descriptor_set_layout(0)", file!(), line!(), "pipeline has no set 0"))?
            .clone();
        let set = checked!(PersistentDescriptorSet::start(layout).add_buffer(uniforms))?;
        let set = checked!(set.add_sampled_image(texture.get_image(), texture.get_sampler()))?;
        let set = checked!(set.build())?;

        checked!(builder.draw_indexed(
            pipeline.clone(),
            &self.dynamic_state,
            vec![mesh.vertex_buffer.clone() as Arc<dyn BufferAccess + Send + Sync>],
            mesh.index_buffer.clone(), set, ()
        ))
    }
}
