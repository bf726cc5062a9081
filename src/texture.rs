use std::path::Path;
use std::sync::Arc;

use vulkano::device::{Device, Queue};
use vulkano::format::Format;
use vulkano::image::{Dimensions, ImmutableImage};
use vulkano::sampler::{Filter, MipmapMode, Sampler, SamplerAddressMode};
use vulkano::sync::GpuFuture;

use tracing::{info, warn};

use crate::error::{InitError, TextureError};

pub struct Pixels {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row major
    pub data: Vec<u8>,
}

impl Pixels {
    pub fn decode(path: &Path) -> Result<Self, TextureError> {
        let image = image::open(path).map_err(|source| TextureError::Decode {
            path: path.display().to_string(),
            source: source,
        })?;

        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Pixels {
            width: width,
            height: height,
            data: rgba.into_raw(),
        })
    }

    pub fn white() -> Self {
        Pixels {
            width: 1,
            height: 1,
            data: vec![0xFF; 4],
        }
    }

    /// Missing or broken files get a plain white texel so the body still draws.
    pub fn decode_or_white(path: &Path) -> Self {
        match Self::decode(path) {
            Ok(pixels) => pixels,
            Err(e) => {
                warn!("{}, drawing untextured", e);
                Self::white()
            }
        }
    }
}

pub struct Texture {
    image: Arc<ImmutableImage<Format>>,
    sampler: Arc<Sampler>,
}

impl Texture {
    /// Uploads and waits for the copy to finish. Only used at startup.
    pub fn upload(device: Arc<Device>, queue: Arc<Queue>, pixels: Pixels) -> Result<Self, InitError> {
        let dimensions = Dimensions::Dim2d { width: pixels.width, height: pixels.height };

        let (image, upload) = ImmutableImage::from_iter(
            pixels.data.into_iter(),
            dimensions,
            Format::R8G8B8A8Srgb,
            queue
        )?;

        upload.then_signal_fence_and_flush()?.wait(None)?;

        let sampler = Sampler::new(device, Filter::Linear, Filter::Linear,
            MipmapMode::Nearest, SamplerAddressMode::Repeat, SamplerAddressMode::Repeat,
            SamplerAddressMode::Repeat, 0.0, 1.0, 0.0, 0.0)?;

        Ok(Texture {
            image: image,
            sampler: sampler,
        })
    }

    pub fn load(device: Arc<Device>, queue: Arc<Queue>, path: &Path) -> Result<Self, InitError> {
        let pixels = Pixels::decode_or_white(path);
        info!(path = %path.display(), width = pixels.width, height = pixels.height, "texture loaded");

        Self::upload(device, queue, pixels)
    }

    pub fn get_image(&self) -> Arc<ImmutableImage<Format>> {
        self.image.clone()
    }

    pub fn get_sampler(&self) -> Arc<Sampler> {
        self.sampler.clone()
    }
}
