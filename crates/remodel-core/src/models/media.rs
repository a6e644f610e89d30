//! Opaque media values exchanged with the generation gateway.

use std::{fmt, time::Duration};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{RemodelError, Result};

/// An encoded image carried as a `data:` URL.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Image(String);

impl Image {
    /// Wraps an existing data URL without inspecting it.
    pub fn from_data_url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Builds a data URL from already base64-encoded data.
    pub fn from_base64(mime_type: &str, data: &str) -> Self {
        Self(format!("data:{mime_type};base64,{data}"))
    }

    /// Encodes raw image bytes.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self::from_base64(mime_type, &STANDARD.encode(bytes))
    }

    pub fn as_data_url(&self) -> &str {
        &self.0
    }

    /// Splits the URL into MIME type and base64 payload.
    pub fn parts(&self) -> Result<(&str, &str)> {
        let rest = self
            .0
            .strip_prefix("data:")
            .ok_or_else(|| RemodelError::invalid_input("image").with_reason("not a data URL"))?;
        let (mime_type, data) = rest.split_once(";base64,").ok_or_else(|| {
            RemodelError::invalid_input("image").with_reason("data URL is not base64 encoded")
        })?;
        Ok((mime_type, data))
    }

    pub fn mime_type(&self) -> Result<&str> {
        self.parts().map(|(mime_type, _)| mime_type)
    }

    /// Decodes the payload back to bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let (_, data) = self.parts()?;
        STANDARD.decode(data).map_err(|e| {
            RemodelError::invalid_input("image").with_reason(format!("invalid base64: {e}"))
        })
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type() {
            Ok("image/jpeg") | Ok("image/jpg") => "jpg",
            Ok("image/webp") => "webp",
            _ => "png",
        }
    }
}

// Data URLs are megabytes long; keep debug output readable.
impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head: String = self.0.chars().take(32).collect();
        write!(f, "Image({head}.. {} bytes)", self.0.len())
    }
}

/// Mono 16-bit PCM narration audio.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl AudioClip {
    /// Sample rate of the text-to-speech backend.
    pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Decodes little-endian 16-bit PCM bytes. A trailing odd byte is ignored.
    pub fn from_pcm_le(bytes: &[u8], sample_rate: u32) -> Self {
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self::new(samples, sample_rate)
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.sample_rate))
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Encodes the clip as a canonical RIFF/WAVE file.
    pub fn to_wav(&self) -> Vec<u8> {
        let channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = self.sample_rate * u32::from(channels) * u32::from(bits_per_sample) / 8;
        let block_align = channels * bits_per_sample / 8;
        let data_size = self.samples.len() as u32 * u32::from(block_align);
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(file_size as usize + 8);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&channels.to_le_bytes());
        buf.extend_from_slice(&self.sample_rate.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for sample in &self.samples {
            buf.extend_from_slice(&sample.to_le_bytes());
        }
        buf
    }
}

impl fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioClip")
            .field("samples", &self.samples.len())
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

/// Downloaded video tour.
#[derive(Clone, PartialEq, Eq)]
pub struct VideoClip {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl VideoClip {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

impl fmt::Debug for VideoClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoClip")
            .field("bytes", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}
