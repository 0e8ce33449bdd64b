//! Host Audio Playout Adapter
//!
//! This crate binds a VoIP engine's playback pipeline to the host audio
//! subsystem. It enumerates and selects output devices, keeps a fixed-format
//! PCM contract towards the engine, and services hardware-driven buffer-fill
//! callbacks by pulling fixed-size engine frames and copying them into
//! host-owned buffers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐    ┌─────────────────────┐    ┌─────────────────────┐
//! │     VoIP Engine     │    │     AudioOutput     │    │   Platform Backend  │
//! │                     │    │                     │    │                     │
//! │ FrameSource         │───▶│ Renderer + stager   │───▶│ cpal / mock         │
//! │ (fixed 1920B frames)│    │ Device selection    │    │ Hardware adaptation │
//! └─────────────────────┘    └─────────────────────┘    └─────────────────────┘
//!           │                          │                          │
//!           ▼                          ▼                          ▼
//!   produces exactly one       fixed engine format        variable callback
//!   frame per pull, promptly   48 kHz / mono / 16-bit     sizes, native rate
//! ```
//!
//! The engine side of the contract never changes: audio is pulled in whole
//! 1920-byte frames of 48 kHz mono 16-bit signed native-endian PCM. The
//! hardware side may run at whatever rate and channel count the device
//! prefers; the platform binding layer owns that adaptation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use playout_core::{AudioOutput, OutputDeviceId, SilenceSource};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Bind playback to whatever the host currently designates as default.
//! let output = AudioOutput::new(OutputDeviceId::Default, Box::new(SilenceSource))?;
//!
//! // List available playback devices
//! for device in output.list_devices() {
//!     println!("{} ({})", device.name, device.id);
//! }
//!
//! output.start();
//! // ... hardware pulls audio through the FrameSource ...
//! output.stop();
//! # Ok(())
//! # }
//! ```
//!
//! # Platform Support
//!
//! - **`cpal`** - Cross-platform audio library (Windows, macOS, Linux)
//! - **`mock`** - Testing and simulation
//!
//! The backend is selected based on the enabled features; see [`backend`].

pub mod backend;
pub mod error;
pub mod format;
pub mod notify;
pub mod output;
pub mod render;
pub mod source;
pub mod staging;
pub mod types;

// Re-exports for convenience
pub use backend::{default_backend, OpenedStream, OutputBackend, StreamHandle};
pub use error::{PlayoutError, PlayoutResult};
pub use output::AudioOutput;
pub use render::Renderer;
pub use source::{FrameSource, SilenceSource};
pub use staging::FrameStager;
pub use types::{OutputDeviceId, OutputDeviceInfo, PlayoutFormat, DEFAULT_DEVICE_ID};

/// Fixed engine-side sample rate in Hz.
pub const ENGINE_SAMPLE_RATE: u32 = 48_000;

/// Fixed engine-side channel count.
pub const ENGINE_CHANNELS: u16 = 1;

/// Fixed engine-side sample width.
pub const ENGINE_BITS_PER_SAMPLE: u16 = 16;

/// Samples in one engine frame (20 ms at 48 kHz).
pub const FRAME_SAMPLES: usize = 960;

/// Bytes in one engine frame.
pub const FRAME_BYTES: usize = FRAME_SAMPLES * (ENGINE_BITS_PER_SAMPLE as usize / 8);

/// Capacity of the staging buffer that reconciles engine frames against
/// host-requested callback sizes. Must exceed the largest expected callback
/// request by at least one frame.
pub const STAGING_CAPACITY: usize = 10_240;
