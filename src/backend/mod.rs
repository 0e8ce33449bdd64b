//! Platform binding layer.
//!
//! The adapter talks to host audio through the narrow [`OutputBackend`]
//! capability: enumerate devices, resolve the current default, and open a
//! stream that pulls bytes from a [`Renderer`]. The backend owns everything
//! hardware-shaped, including adapting the device's native rate, channel
//! count and sample type to the fixed engine format.

use std::sync::Arc;

use crate::error::PlayoutResult;
use crate::render::Renderer;
use crate::types::OutputDeviceInfo;

#[cfg(feature = "device-cpal")]
pub mod cpal_impl;
pub mod mock_impl;

/// Control handle over an opened hardware stream.
///
/// Dropping the handle closes the stream and releases its resources.
pub trait StreamHandle: Send {
    /// Activate hardware I/O.
    fn play(&self) -> PlayoutResult<()>;

    /// Deactivate hardware I/O.
    fn pause(&self) -> PlayoutResult<()>;
}

/// An opened output stream together with the rate the hardware actually runs
/// at, which may differ from the engine rate.
pub struct OpenedStream {
    /// Control handle; dropping it closes the stream
    pub handle: Box<dyn StreamHandle>,
    /// Native sample rate of the opened stream in Hz
    pub hardware_sample_rate: u32,
}

/// Host audio backend capability.
pub trait OutputBackend: Send + Sync {
    /// Enumerate every host device exposing at least one output-capable
    /// stream, in host order.
    ///
    /// A device failing its identifier or name query is skipped with a log
    /// line rather than aborting the whole pass, and a failure of the
    /// top-level device query yields whatever was gathered up to that point.
    /// Enumeration is therefore infallible at this surface.
    fn output_devices(&self) -> Vec<OutputDeviceInfo>;

    /// Resolve the host's current default output device.
    fn default_output_device(&self) -> PlayoutResult<OutputDeviceInfo>;

    /// Open an output stream on `device_id`, pulling audio from `renderer`.
    /// The stream starts paused.
    fn open_stream(
        &self,
        device_id: &str,
        renderer: Arc<Renderer>,
    ) -> PlayoutResult<OpenedStream>;
}

/// Create the platform backend for this build.
pub fn default_backend() -> Arc<dyn OutputBackend> {
    #[cfg(feature = "device-cpal")]
    {
        Arc::new(cpal_impl::CpalBackend::new())
    }
    #[cfg(not(feature = "device-cpal"))]
    {
        Arc::new(mock_impl::MockBackend::new())
    }
}
