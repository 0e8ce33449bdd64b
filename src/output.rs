//! The playout adapter.
//!
//! `AudioOutput` is constructed once per playback session, bound to an
//! initial device selection, and dropped when the call ends. Construction
//! registers the default-device-change subscription; drop deregisters it and
//! closes the stream.
//!
//! Three execution contexts touch one adapter: the control thread calling
//! into this module, the host render thread pulling through the
//! [`Renderer`], and the notification thread delivering default-device
//! changes. The playback flag is an atomic, all selection state is
//! serialized behind one mutex, and the render path never takes that mutex.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::backend::{default_backend, OutputBackend, StreamHandle};
use crate::error::PlayoutResult;
use crate::notify::{self, SubscriptionGuard};
use crate::render::Renderer;
use crate::source::FrameSource;
use crate::types::{OutputDeviceId, OutputDeviceInfo, PlayoutFormat};
use crate::ENGINE_SAMPLE_RATE;

struct Selection {
    /// What was asked for, including the default sentinel
    selection: OutputDeviceId,
    /// Concrete device actually bound
    bound_device: Option<String>,
    /// Native rate of the bound stream, cached at bind time
    hardware_sample_rate: u32,
    /// Handle over the open stream; replaced wholesale on rebind
    stream: Option<Box<dyn StreamHandle>>,
}

struct Shared {
    backend: Arc<dyn OutputBackend>,
    renderer: Arc<Renderer>,
    selection: Mutex<Selection>,
}

/// Playback adapter binding an engine [`FrameSource`] to one host output
/// device.
pub struct AudioOutput {
    // Subscription first so teardown deregisters before state drops.
    _default_subscription: SubscriptionGuard,
    shared: Arc<Shared>,
}

impl AudioOutput {
    /// Construct an adapter bound to `device`, using the platform backend
    /// for this build.
    pub fn new(device: OutputDeviceId, source: Box<dyn FrameSource>) -> PlayoutResult<Self> {
        Self::with_backend(default_backend(), device, source)
    }

    /// Construct an adapter against an explicit backend.
    ///
    /// Host failures while resolving or opening the initial device surface
    /// as an error here; a successfully constructed adapter always has an
    /// open (paused) stream.
    pub fn with_backend(
        backend: Arc<dyn OutputBackend>,
        device: OutputDeviceId,
        source: Box<dyn FrameSource>,
    ) -> PlayoutResult<Self> {
        let shared = Arc::new(Shared {
            backend,
            renderer: Arc::new(Renderer::new(source)),
            selection: Mutex::new(Selection {
                selection: OutputDeviceId::Default,
                bound_device: None,
                hardware_sample_rate: ENGINE_SAMPLE_RATE,
                stream: None,
            }),
        });
        {
            let mut selection = shared.selection.lock();
            shared.select_locked(&mut selection, device)?;
        }

        let weak = Arc::downgrade(&shared);
        let subscription = notify::subscribe(move || {
            if let Some(shared) = weak.upgrade() {
                shared.on_default_output_changed();
            }
        });

        Ok(Self {
            _default_subscription: subscription,
            shared,
        })
    }

    /// The engine side of this adapter is a fixed contract: 48 kHz, mono,
    /// 16-bit signed PCM. Parameters matching that contract are accepted;
    /// anything else is logged and the fixed format stays in effect.
    pub fn configure(&self, sample_rate: u32, bits_per_sample: u16, channels: u16) {
        let requested = PlayoutFormat::new(sample_rate, channels, bits_per_sample);
        let fixed = PlayoutFormat::engine();
        if requested != fixed {
            warn!(
                "requested playout format ({}) ignored, engine contract is fixed at {}",
                requested.description(),
                fixed.description()
            );
        }
    }

    /// Begin playback. The flag flips before the hardware start is issued,
    /// so the very first callback already emits real audio. Host failures
    /// are logged, not returned.
    pub fn start(&self) {
        self.shared.renderer.set_playing(true);
        let selection = self.shared.selection.lock();
        if let Some(stream) = &selection.stream {
            if let Err(e) = stream.play() {
                error!("error starting output stream: {}", e);
            }
        }
        info!("audio playout started");
    }

    /// End playback. Subsequent callbacks emit silence.
    pub fn stop(&self) {
        self.shared.renderer.set_playing(false);
        let selection = self.shared.selection.lock();
        if let Some(stream) = &selection.stream {
            if let Err(e) = stream.pause() {
                error!("error stopping output stream: {}", e);
            }
        }
        info!("audio playout stopped");
    }

    /// Current playback state.
    pub fn is_playing(&self) -> bool {
        self.shared.renderer.is_playing()
    }

    /// Enumerate output-capable host devices.
    pub fn list_devices(&self) -> Vec<OutputDeviceInfo> {
        self.shared.backend.output_devices()
    }

    /// Rebind playback to `device`.
    ///
    /// An unknown concrete identifier falls back to the default device with
    /// a warning and is not an error. The new stream is fully opened before
    /// any state changes; on failure the previous binding stays intact.
    pub fn set_current_device(&self, device: OutputDeviceId) -> PlayoutResult<()> {
        let mut selection = self.shared.selection.lock();
        self.shared.select_locked(&mut selection, device)
    }

    /// The current selection, including the default sentinel.
    pub fn current_device(&self) -> OutputDeviceId {
        self.shared.selection.lock().selection.clone()
    }

    /// Identifier of the concrete device currently bound.
    pub fn bound_device(&self) -> Option<String> {
        self.shared.selection.lock().bound_device.clone()
    }

    /// Native sample rate of the bound stream, cached at bind time.
    pub fn hardware_sample_rate(&self) -> u32 {
        self.shared.selection.lock().hardware_sample_rate
    }
}

impl Shared {
    /// Resolve `device` and rebind, committing state only after the new
    /// stream is open and (if playback is active) started.
    fn select_locked(
        &self,
        selection: &mut Selection,
        device: OutputDeviceId,
    ) -> PlayoutResult<()> {
        let (record, resolved) = match device {
            OutputDeviceId::Default => (OutputDeviceId::Default, self.resolve_default()?),
            OutputDeviceId::Uid(uid) => {
                let found = self
                    .backend
                    .output_devices()
                    .into_iter()
                    .find(|info| info.id == uid);
                match found {
                    Some(info) => (OutputDeviceId::Uid(uid), info),
                    None => {
                        // Not an error: fall back to the default device. The
                        // recorded selection becomes the sentinel, so later
                        // default changes rebind this adapter.
                        warn!("requested output device {} not found, using default", uid);
                        (OutputDeviceId::Default, self.resolve_default()?)
                    }
                }
            }
        };

        let opened = match self.backend.open_stream(&resolved.id, self.renderer.clone()) {
            Ok(opened) => opened,
            Err(e) => {
                error!("error binding output device {}: {}", resolved.id, e);
                return Err(e);
            }
        };
        if self.renderer.is_playing() {
            if let Err(e) = opened.handle.play() {
                error!("error starting stream on {}: {}", resolved.id, e);
                return Err(e);
            }
        }

        debug!(
            "switched playback device to {}, hardware rate {} Hz",
            resolved.id, opened.hardware_sample_rate
        );
        selection.selection = record;
        selection.bound_device = Some(resolved.id);
        selection.hardware_sample_rate = opened.hardware_sample_rate;
        // Replacing the handle drops the previous stream.
        selection.stream = Some(opened.handle);
        Ok(())
    }

    fn resolve_default(&self) -> PlayoutResult<OutputDeviceInfo> {
        match self.backend.default_output_device() {
            Ok(info) => Ok(info),
            Err(e) => {
                error!("error resolving default output device: {}", e);
                Err(e)
            }
        }
    }

    /// Runs on the notification thread whenever the host default moves.
    /// Only an adapter whose selection is the default sentinel tracks it.
    fn on_default_output_changed(&self) {
        let mut selection = self.selection.lock();
        if !selection.selection.is_default() {
            return;
        }
        debug!("default output device changed, rebinding");
        if let Err(e) = self.select_locked(&mut selection, OutputDeviceId::Default) {
            warn!("failed to rebind to new default output: {}", e);
        }
    }
}
