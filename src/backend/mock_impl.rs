//! Mock output backend for testing without audio hardware.
//!
//! The mock models a scriptable host: a device list with per-device failure
//! injection, a settable default device, and streams whose render callbacks
//! are driven directly by the test instead of a hardware clock.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, warn};

use crate::backend::{OpenedStream, OutputBackend, StreamHandle};
use crate::error::{PlayoutError, PlayoutResult};
use crate::notify;
use crate::render::Renderer;
use crate::types::OutputDeviceInfo;
use crate::ENGINE_SAMPLE_RATE;

/// Scriptable description of one mock host device.
#[derive(Debug, Clone)]
pub struct MockDevice {
    /// Host identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Number of output stream configurations the device reports; a device
    /// reporting zero is excluded from enumeration
    pub output_streams: usize,
    /// Simulate a failing identifier query
    pub fail_id_query: bool,
    /// Simulate a failing display-name query
    pub fail_name_query: bool,
    /// Simulate stream creation failing on this device
    pub fail_open: bool,
    /// Native rate streams on this device run at
    pub sample_rate: u32,
}

impl MockDevice {
    /// A well-behaved output device.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            output_streams: 1,
            fail_id_query: false,
            fail_name_query: false,
            fail_open: false,
            sample_rate: ENGINE_SAMPLE_RATE,
        }
    }
}

/// One stream opened against the mock host.
///
/// Tests drive the hardware side by calling [`render`](MockStream::render),
/// standing in for the periodic buffer-fill callback.
pub struct MockStream {
    device_id: String,
    renderer: Arc<Renderer>,
    running: AtomicBool,
    play_calls: AtomicUsize,
    pause_calls: AtomicUsize,
    closed: AtomicBool,
}

impl MockStream {
    /// Identifier of the device this stream is bound to.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Service one buffer slot, exactly as the hardware callback would.
    pub fn render(&self, out: &mut [u8]) {
        self.renderer.render(out);
    }

    /// Whether hardware I/O is active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Times the hardware start primitive was issued.
    pub fn play_calls(&self) -> usize {
        self.play_calls.load(Ordering::SeqCst)
    }

    /// Times the hardware stop primitive was issued.
    pub fn pause_calls(&self) -> usize {
        self.pause_calls.load(Ordering::SeqCst)
    }

    /// Whether the owning handle was dropped.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

struct MockStreamHandle {
    stream: Arc<MockStream>,
}

impl StreamHandle for MockStreamHandle {
    fn play(&self) -> PlayoutResult<()> {
        self.stream.play_calls.fetch_add(1, Ordering::SeqCst);
        self.stream.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&self) -> PlayoutResult<()> {
        self.stream.pause_calls.fetch_add(1, Ordering::SeqCst);
        self.stream.running.store(false, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for MockStreamHandle {
    fn drop(&mut self) {
        self.stream.running.store(false, Ordering::SeqCst);
        self.stream.closed.store(true, Ordering::SeqCst);
    }
}

/// In-memory stand-in for a host audio subsystem.
pub struct MockBackend {
    devices: Mutex<Vec<MockDevice>>,
    default_id: Mutex<Option<String>>,
    fail_enumeration: AtomicBool,
    streams: Mutex<Vec<Arc<MockStream>>>,
}

impl MockBackend {
    /// An empty host with no devices and no default.
    pub fn new() -> Self {
        Self {
            devices: Mutex::new(Vec::new()),
            default_id: Mutex::new(None),
            fail_enumeration: AtomicBool::new(false),
            streams: Mutex::new(Vec::new()),
        }
    }

    /// A host pre-seeded with `devices`, with `default_id` as default.
    pub fn with_devices(devices: Vec<MockDevice>, default_id: &str) -> Self {
        let backend = Self::new();
        *backend.devices.lock() = devices;
        *backend.default_id.lock() = Some(default_id.to_string());
        backend
    }

    /// Append a device to the host list.
    pub fn add_device(&self, device: MockDevice) {
        self.devices.lock().push(device);
    }

    /// Move the host default to `id` and fire the process-wide
    /// default-output-changed notification, as the operating system would.
    pub fn set_default_device(&self, id: &str) {
        *self.default_id.lock() = Some(id.to_string());
        debug!("mock host default output moved to {}", id);
        notify::default_output_changed();
    }

    /// Make the top-level device query fail.
    pub fn set_fail_enumeration(&self, fail: bool) {
        self.fail_enumeration.store(fail, Ordering::SeqCst);
    }

    /// Make stream creation fail on the device with identifier `id`.
    pub fn set_fail_open(&self, id: &str, fail: bool) {
        for device in self.devices.lock().iter_mut() {
            if device.id == id {
                device.fail_open = fail;
            }
        }
    }

    /// Streams opened so far, oldest first. Closed streams stay listed.
    pub fn streams(&self) -> Vec<Arc<MockStream>> {
        self.streams.lock().clone()
    }

    /// The most recently opened stream.
    pub fn current_stream(&self) -> Option<Arc<MockStream>> {
        self.streams.lock().last().cloned()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputBackend for MockBackend {
    fn output_devices(&self) -> Vec<OutputDeviceInfo> {
        if self.fail_enumeration.load(Ordering::SeqCst) {
            error!("mock host: device enumeration failure injected");
            return Vec::new();
        }
        let default_id = self.default_id.lock().clone();
        let mut infos = Vec::new();
        for device in self.devices.lock().iter() {
            if device.fail_id_query {
                warn!("skipping output device: identifier query failed");
                continue;
            }
            if device.fail_name_query {
                warn!("skipping output device {}: name query failed", device.id);
                continue;
            }
            if device.output_streams == 0 {
                continue;
            }
            infos.push(OutputDeviceInfo {
                id: device.id.clone(),
                name: device.name.clone(),
                is_default: default_id.as_deref() == Some(device.id.as_str()),
            });
        }
        infos
    }

    fn default_output_device(&self) -> PlayoutResult<OutputDeviceInfo> {
        let default_id = self
            .default_id
            .lock()
            .clone()
            .ok_or_else(|| PlayoutError::host("default_output_device", "no default output device"))?;
        let devices = self.devices.lock();
        let device = devices
            .iter()
            .find(|device| device.id == default_id)
            .ok_or_else(|| {
                PlayoutError::host("default_output_device", "default device disappeared")
            })?;
        Ok(OutputDeviceInfo {
            id: device.id.clone(),
            name: device.name.clone(),
            is_default: true,
        })
    }

    fn open_stream(
        &self,
        device_id: &str,
        renderer: Arc<Renderer>,
    ) -> PlayoutResult<OpenedStream> {
        let devices = self.devices.lock();
        let device = devices
            .iter()
            .find(|device| device.id == device_id && !device.fail_id_query)
            .ok_or_else(|| PlayoutError::DeviceNotFound {
                device_id: device_id.to_string(),
            })?;
        if device.fail_open {
            return Err(PlayoutError::host(
                "open_stream",
                "stream creation failure injected",
            ));
        }
        let hardware_sample_rate = device.sample_rate;
        let stream = Arc::new(MockStream {
            device_id: device.id.clone(),
            renderer,
            running: AtomicBool::new(false),
            play_calls: AtomicUsize::new(0),
            pause_calls: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        });
        drop(devices);
        self.streams.lock().push(stream.clone());
        Ok(OpenedStream {
            handle: Box::new(MockStreamHandle { stream }),
            hardware_sample_rate,
        })
    }
}
