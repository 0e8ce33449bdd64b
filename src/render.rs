//! Render-side state driven by the host audio thread.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::source::FrameSource;
use crate::staging::FrameStager;

/// State shared between the adapter's control surface and the platform
/// binding layer's render callback.
///
/// The playing flag is a plain atomic toggle: written by start/stop on the
/// control thread, read on every callback. The stager and the frame source
/// are only ever touched from the host render thread; their mutexes exist so
/// the same state can be handed to a re-opened stream when the device binding
/// changes, and are uncontended in steady operation.
pub struct Renderer {
    playing: AtomicBool,
    stager: Mutex<FrameStager>,
    source: Mutex<Box<dyn FrameSource>>,
}

impl Renderer {
    /// Create a renderer pulling audio from `source`.
    pub fn new(source: Box<dyn FrameSource>) -> Self {
        Self {
            playing: AtomicBool::new(false),
            stager: Mutex::new(FrameStager::new()),
            source: Mutex::new(source),
        }
    }

    /// Set the playback flag. Takes effect on the next buffer slot.
    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Relaxed);
    }

    /// Current playback flag.
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    /// Service one host buffer slot of `out.len()` bytes.
    ///
    /// When playback is stopped the slot is zero-filled and staging state is
    /// left untouched. Otherwise whole engine frames are pulled until the
    /// stager covers the request, and exactly `out.len()` bytes are copied
    /// out. Backends call this once per buffer slot, re-checking the flag
    /// each time when the host hands over several slots in one invocation.
    pub fn render(&self, out: &mut [u8]) {
        if !self.is_playing() {
            out.fill(0);
            return;
        }
        let mut stager = self.stager.lock();
        let mut source = self.source.lock();
        stager.fill_to(out.len(), source.as_mut());
        stager.drain_into(out);
    }

    /// Bytes currently staged ahead of the hardware.
    pub fn staged_bytes(&self) -> usize {
        self.stager.lock().len()
    }
}
