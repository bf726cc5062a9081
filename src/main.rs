// Some code is from: 2016 The vulkano developers
// Licensed under the MIT http://opensource.org/licenses/MIT.

use std::path::Path;

use tracing::{error, info, warn};

#[macro_use]
mod error;

mod audio;
mod backdrop;
mod body;
mod camera;
mod config;
mod frame;
mod geometry;
mod logging;
mod pipeline;
mod renderer;
mod sphere;
mod texture;

use audio::MusicPlayer;
use camera::Camera;
use config::{Config, CONFIG_PATH};
use error::InitError;
use frame::Scene;
use renderer::{Assets, Renderer};
use sphere::Sphere;

fn main() {
    logging::init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(-1);
    }
}

fn run() -> Result<(), InitError> {
    let config = Config::load_or_default(Path::new(CONFIG_PATH))?;

    // Audio failing is not worth stopping the show
    let music = config.assets.music.as_ref().and_then(|path| {
        MusicPlayer::play(path)
            .map_err(|e| warn!("{}, continuing without music", e))
            .ok()
    });

    let renderer = Renderer::setup(&config.window)?;

    let sphere_config = &config.sphere;
    let sphere = Sphere::new(sphere_config.horizontal, sphere_config.vertical, sphere_config.center, sphere_config.radius).build();
    info!(vertices = sphere.vertex_count(), indices = sphere.index_count(), "sphere mesh built");

    let assets = Assets::load(
        renderer.get_device(),
        renderer.get_queue(),
        &sphere,
        &backdrop::backdrop_mesh(),
        &config.texture_paths()
    )?;

    let camera = Camera::new(&config.camera, renderer.get_dimensions());
    let scene = Scene::new(camera, config.build_bodies(), config.backdrop_texture());

    renderer.start(scene, assets, config.light.clone(), music)
}
