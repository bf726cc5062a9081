//! Error types. Startup failures end the process; per-frame driver failures
//! are reported and the frame is dropped.

use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    #[error("sphere of {horizontal}x{vertical} subdivisions has more vertices than a u32 index can address")]
    SphereTooLarge { horizontal: u32, vertical: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create Vulkan instance: {0}")]
    Instance(#[from] vulkano::instance::InstanceCreationError),

    #[error("no Vulkan capable device found")]
    NoDevice,

    #[error("failed to open window: {0}")]
    Window(#[from] vulkano_win::CreationError),

    #[error("no queue family supports graphics on this surface")]
    NoQueueFamily,

    #[error("failed to create device: {0}")]
    Device(#[from] vulkano::device::DeviceCreationError),

    #[error("failed to query surface: {0}")]
    Surface(#[from] vulkano::swapchain::CapabilitiesError),

    #[error("surface has no usable composite alpha mode")]
    NoCompositeAlpha,

    #[error("failed to create swapchain: {0}")]
    Swapchain(#[from] vulkano::swapchain::SwapchainCreationError),

    #[error("failed to create render pass: {0}")]
    RenderPass(#[from] vulkano::framebuffer::RenderPassCreationError),

    #[error("failed to create framebuffer: {0}")]
    Framebuffer(#[from] vulkano::framebuffer::FramebufferCreationError),

    #[error("failed to create graphics pipeline: {0}")]
    Pipeline(#[from] vulkano::pipeline::GraphicsPipelineCreationError),

    #[error("render pass has no subpass {0}")]
    MissingSubpass(u32),

    #[error("failed to load shader module: {0}")]
    Shader(#[from] vulkano::OomError),

    #[error("failed to allocate device memory: {0}")]
    Memory(#[from] vulkano::memory::DeviceMemoryAllocError),

    #[error("failed to create image: {0}")]
    Image(#[from] vulkano::image::ImageCreationError),

    #[error("failed to create sampler: {0}")]
    Sampler(#[from] vulkano::sampler::SamplerCreationError),

    #[error("failed to upload to the device: {0}")]
    Upload(#[from] vulkano::sync::FlushError),
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio output device: {0}")]
    Stream(#[from] rodio::StreamError),

    #[error("failed to open audio sink: {0}")]
    Play(#[from] rodio::PlayError),

    #[error("failed to open music file: {0}")]
    Open(#[from] std::io::Error),

    #[error("failed to decode music file: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

/// A backend call that failed mid-frame, with the call that produced it.
#[derive(Debug)]
pub struct DriverError {
    pub call: &'static str,
    pub file: &'static str,
    pub line: u32,
    pub message: String,
}

impl DriverError {
    pub fn new<E: fmt::Debug>(call: &'static str, file: &'static str, line: u32, error: E) -> Self {
        DriverError {
            call: call,
            file: file,
            line: line,
            message: format!("{:?}", error),
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in `{}` at {}:{}", self.message, self.call, self.file, self.line)
    }
}

impl std::error::Error for DriverError {}

/// Tags a backend call's error with the call text and location.
macro_rules! checked {
    ($call:expr) => {
        $call.map_err(|e| $crate::error::DriverError::new(stringify!($call), file!(), line!(), e))
    };
}
