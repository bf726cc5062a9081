use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, Sink};
use tracing::info;

use crate::error::AudioError;

/// Background music. rodio mixes on its own thread; dropping the stream
/// silences it, so the player has to outlive the render loop.
pub struct MusicPlayer {
    _stream: OutputStream,
    sink: Sink,
}

impl MusicPlayer {
    pub fn play(path: &Path) -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        let sink = Sink::try_new(&handle)?;

        let source = Decoder::new(BufReader::new(File::open(path)?))?;
        sink.append(source);
        info!(path = %path.display(), "playing music");

        Ok(MusicPlayer {
            _stream: stream,
            sink: sink,
        })
    }

    pub fn stop(&self) {
        self.sink.stop();
        info!("music stopped");
    }
}
