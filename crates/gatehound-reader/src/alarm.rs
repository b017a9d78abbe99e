use rodio::{Decoder, OutputStream, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum AlarmError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("audio output error: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("decode error: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
    #[error("playback error: {0}")]
    Play(#[from] rodio::PlayError),
}

/// Fire-and-forget alarm playback.
///
/// Each ring runs on its own thread because rodio's output objects are not
/// Send and playback must not block the poll loop. Failures are logged and
/// swallowed; a broken audio stack never stops tag forwarding.
#[derive(Clone)]
pub struct AlarmBell {
    sound_path: PathBuf,
}

impl AlarmBell {
    pub fn new(sound_path: impl Into<PathBuf>) -> Self {
        Self {
            sound_path: sound_path.into(),
        }
    }

    pub fn ring(&self) {
        let path = self.sound_path.clone();
        std::thread::spawn(move || {
            if let Err(err) = play_once(&path) {
                warn!(event = "alarm_error", path = %path.display(), error = %err);
            }
        });
    }
}

fn play_once(path: &Path) -> Result<(), AlarmError> {
    let (_stream, handle) = OutputStream::try_default()?;
    let file = File::open(path)?;
    let source = Decoder::new(BufReader::new(file))?;
    let sink = Sink::try_new(&handle)?;
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}
