//! The `rodio` implementation of the output seam.
//!
//! Each voice owns one `Sink` fed from an in-memory decoder over the fetched
//! bytes, so a fallback seek is a cheap re-decode rather than a re-fetch.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::error::EngineError;

use super::backend::{AudioOutput, Media, Voice};

pub struct RodioOutput {
    stream: OutputStream,
}

impl RodioOutput {
    /// Open the default output device.
    pub fn open_default() -> Result<Self, EngineError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| EngineError::Output(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which corrupts the TUI.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }
}

impl AudioOutput for RodioOutput {
    type Voice = RodioVoice;

    fn acquire(&mut self, media: &Media) -> Result<RodioVoice, EngineError> {
        RodioVoice::new(&self.stream, media)
    }
}

pub struct RodioVoice {
    bytes: Arc<[u8]>,
    url: String,
    sink: Sink,
    duration: Option<Duration>,
    // Start offset of the current sink; `Sink::get_pos` counts from here.
    offset: Duration,
    playing: bool,
}

impl RodioVoice {
    fn new(stream: &OutputStream, media: &Media) -> Result<Self, EngineError> {
        let bytes = Arc::clone(media.bytes());
        let decoder = decode(&bytes, media.url())?;
        let duration = decoder.total_duration();

        let sink = Sink::connect_new(stream.mixer());
        sink.append(decoder);
        sink.pause();

        Ok(Self {
            bytes,
            url: media.url().to_string(),
            sink,
            duration,
            offset: Duration::ZERO,
            playing: false,
        })
    }
}

fn decode(bytes: &Arc<[u8]>, url: &str) -> Result<Decoder<Cursor<Arc<[u8]>>>, EngineError> {
    Decoder::new(Cursor::new(Arc::clone(bytes))).map_err(|e| EngineError::PrepareFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

impl Voice for RodioVoice {
    fn play(&mut self) {
        self.sink.play();
        self.playing = true;
    }

    fn pause(&mut self) {
        self.sink.pause();
        self.playing = false;
    }

    fn seek(&mut self, position: Duration) {
        if self.sink.try_seek(position).is_ok() {
            self.offset = Duration::ZERO;
            return;
        }

        // Not every format seeks; fall back to re-decoding the cached bytes
        // and skipping into them.
        let decoder = match decode(&self.bytes, &self.url) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(error = %e, "seek failed, keeping current position");
                return;
            }
        };

        self.sink.clear();
        self.sink.append(decoder.skip_duration(position));
        if self.playing {
            self.sink.play();
        }
        self.offset = position;
    }

    fn position(&self) -> Duration {
        let pos = self.offset + self.sink.get_pos();
        match self.duration {
            Some(total) => pos.min(total),
            None => pos,
        }
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }

    fn stop(&mut self) {
        self.sink.stop();
        self.playing = false;
    }
}
