//! Core types for device descriptors and audio formats.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ENGINE_BITS_PER_SAMPLE, ENGINE_CHANNELS, ENGINE_SAMPLE_RATE};

/// String form of the default-device sentinel.
pub const DEFAULT_DEVICE_ID: &str = "default";

/// Playback device selection.
///
/// `Default` is a sentinel distinct from every concrete identifier: it means
/// "track whatever the host currently designates as the default output", and
/// an adapter bound to it rebinds whenever the host default moves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputDeviceId {
    /// Track the host's current default output device
    Default,
    /// A concrete device by its host-assigned identifier
    Uid(String),
}

impl OutputDeviceId {
    /// Parse a selection from its string form.
    pub fn parse(s: &str) -> Self {
        if s == DEFAULT_DEVICE_ID {
            Self::Default
        } else {
            Self::Uid(s.to_string())
        }
    }

    /// Whether this selection is the default-device sentinel.
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for OutputDeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str(DEFAULT_DEVICE_ID),
            Self::Uid(uid) => f.write_str(uid),
        }
    }
}

impl From<&str> for OutputDeviceId {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Descriptor of one host output device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDeviceInfo {
    /// Opaque host-assigned identifier
    pub id: String,
    /// Human-readable display name
    pub name: String,
    /// Whether the host currently designates this device as default
    pub is_default: bool,
}

impl OutputDeviceInfo {
    /// Create a descriptor for a non-default device.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_default: false,
        }
    }
}

/// PCM format specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoutFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channels: u16,
    /// Bits per sample
    pub bits_per_sample: u16,
}

impl PlayoutFormat {
    /// Create a new format specification.
    pub fn new(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    /// The fixed engine-side format (48 kHz, mono, 16-bit signed PCM).
    pub const fn engine() -> Self {
        Self {
            sample_rate: ENGINE_SAMPLE_RATE,
            channels: ENGINE_CHANNELS,
            bits_per_sample: ENGINE_BITS_PER_SAMPLE,
        }
    }

    /// Bytes per interleaved sample frame.
    pub fn bytes_per_sample_frame(&self) -> usize {
        self.channels as usize * (self.bits_per_sample / 8) as usize
    }

    /// Human-readable description for logs.
    pub fn description(&self) -> String {
        format!(
            "{} Hz, {} ch, {} bit",
            self.sample_rate, self.channels, self.bits_per_sample
        )
    }
}
