//! CPAL-based output backend.
//!
//! This module provides real hardware playback using the CPAL
//! (Cross-Platform Audio Library) crate. CPAL exposes no separate stable
//! device UID, so the device name doubles as the identifier.
//!
//! CPAL streams are not `Send`, so each opened stream lives on a dedicated
//! thread that owns it and applies control commands sent over a channel.
//! CPAL also delivers no default-device-change events; embedders forward the
//! operating system's notification by calling
//! [`notify::default_output_changed`](crate::notify::default_output_changed).

use std::sync::mpsc;
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Host, SampleFormat, SampleRate, SizedSample, StreamConfig};
use tracing::{debug, error, info, warn};

use crate::backend::{OpenedStream, OutputBackend, StreamHandle};
use crate::error::{PlayoutError, PlayoutResult};
use crate::format;
use crate::render::Renderer;
use crate::types::OutputDeviceInfo;
use crate::ENGINE_SAMPLE_RATE;

/// CPAL-backed implementation of [`OutputBackend`].
pub struct CpalBackend {
    host: Host,
}

impl CpalBackend {
    /// Create a backend over the platform's default CPAL host.
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    fn find_device(&self, device_id: &str) -> PlayoutResult<Device> {
        let devices = self
            .host
            .output_devices()
            .map_err(|e| PlayoutError::host("output_devices", e))?;
        for device in devices {
            match device.name() {
                Ok(name) if name == device_id => return Ok(device),
                Ok(_) => {}
                Err(e) => warn!("skipping output device with unreadable name: {}", e),
            }
        }
        Err(PlayoutError::DeviceNotFound {
            device_id: device_id.to_string(),
        })
    }

    /// Pick a stream configuration, preferring one that can run at the
    /// engine rate so no resampling is needed.
    fn select_config(device: &Device) -> PlayoutResult<(StreamConfig, SampleFormat)> {
        let ranges = device
            .supported_output_configs()
            .map_err(|e| PlayoutError::host("supported_output_configs", e))?;

        let mut fallback = None;
        for range in ranges {
            if range.min_sample_rate().0 <= ENGINE_SAMPLE_RATE
                && range.max_sample_rate().0 >= ENGINE_SAMPLE_RATE
            {
                let config = range.with_sample_rate(SampleRate(ENGINE_SAMPLE_RATE));
                let sample_format = config.sample_format();
                return Ok((config.config(), sample_format));
            }
            if fallback.is_none() {
                fallback = Some(range);
            }
        }

        let range = fallback.ok_or_else(|| {
            PlayoutError::host(
                "supported_output_configs",
                "device reports no output configurations",
            )
        })?;
        let config = range.with_max_sample_rate();
        let sample_format = config.sample_format();
        Ok((config.config(), sample_format))
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputBackend for CpalBackend {
    fn output_devices(&self) -> Vec<OutputDeviceInfo> {
        let default_name = self
            .host
            .default_output_device()
            .and_then(|device| device.name().ok());

        let devices = match self.host.output_devices() {
            Ok(devices) => devices,
            Err(e) => {
                error!("output device enumeration failed: {}", e);
                return Vec::new();
            }
        };

        let mut infos = Vec::new();
        for device in devices {
            let name = match device.name() {
                Ok(name) => name,
                Err(e) => {
                    warn!("skipping output device with unreadable name: {}", e);
                    continue;
                }
            };
            match device.supported_output_configs() {
                Ok(mut configs) => {
                    if configs.next().is_none() {
                        debug!("excluding device {} with no output streams", name);
                        continue;
                    }
                }
                Err(e) => {
                    warn!("skipping output device {}: {}", name, e);
                    continue;
                }
            }
            let is_default = default_name.as_deref() == Some(name.as_str());
            infos.push(OutputDeviceInfo {
                id: name.clone(),
                name,
                is_default,
            });
        }
        infos
    }

    fn default_output_device(&self) -> PlayoutResult<OutputDeviceInfo> {
        let device = self.host.default_output_device().ok_or_else(|| {
            PlayoutError::host("default_output_device", "no default output device")
        })?;
        let name = device
            .name()
            .map_err(|e| PlayoutError::host("device_name", e))?;
        Ok(OutputDeviceInfo {
            id: name.clone(),
            name,
            is_default: true,
        })
    }

    fn open_stream(
        &self,
        device_id: &str,
        renderer: Arc<Renderer>,
    ) -> PlayoutResult<OpenedStream> {
        let device = self.find_device(device_id)?;
        let (config, sample_format) = Self::select_config(&device)?;
        let hardware_sample_rate = config.sample_rate.0;
        let channels = config.channels as usize;

        let (command_tx, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();
        let device_name = device_id.to_string();

        // The stream is not Send; this thread owns it for its whole life and
        // applies control commands on its behalf.
        std::thread::spawn(move || {
            let built = match sample_format {
                SampleFormat::F32 => {
                    build_stream::<f32>(&device, &config, channels, hardware_sample_rate, renderer)
                }
                SampleFormat::I16 => {
                    build_stream::<i16>(&device, &config, channels, hardware_sample_rate, renderer)
                }
                SampleFormat::U16 => {
                    build_stream::<u16>(&device, &config, channels, hardware_sample_rate, renderer)
                }
                other => Err(PlayoutError::host(
                    "build_output_stream",
                    format!("unsupported sample format {:?}", other),
                )),
            };

            let stream = match built {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            let _ = ready_tx.send(Ok(()));
            info!(
                "opened output stream on {} at {} Hz",
                device_name, hardware_sample_rate
            );

            while let Ok(command) = command_rx.recv() {
                match command {
                    StreamCommand::Play => {
                        if let Err(e) = stream.play() {
                            error!("error starting output stream: {}", e);
                        }
                    }
                    StreamCommand::Pause => {
                        if let Err(e) = stream.pause() {
                            error!("error stopping output stream: {}", e);
                        }
                    }
                    StreamCommand::Shutdown => break,
                }
            }
            debug!("closed output stream on {}", device_name);
        });

        ready_rx
            .recv()
            .map_err(|_| PlayoutError::StreamError {
                message: "output stream thread exited before reporting readiness".to_string(),
            })??;

        Ok(OpenedStream {
            handle: Box::new(CpalStreamHandle {
                commands: command_tx,
            }),
            hardware_sample_rate,
        })
    }
}

enum StreamCommand {
    Play,
    Pause,
    Shutdown,
}

struct CpalStreamHandle {
    commands: mpsc::Sender<StreamCommand>,
}

impl StreamHandle for CpalStreamHandle {
    fn play(&self) -> PlayoutResult<()> {
        self.commands
            .send(StreamCommand::Play)
            .map_err(|_| PlayoutError::StreamError {
                message: "output stream thread is gone".to_string(),
            })
    }

    fn pause(&self) -> PlayoutResult<()> {
        self.commands
            .send(StreamCommand::Pause)
            .map_err(|_| PlayoutError::StreamError {
                message: "output stream thread is gone".to_string(),
            })
    }
}

impl Drop for CpalStreamHandle {
    fn drop(&mut self) {
        let _ = self.commands.send(StreamCommand::Shutdown);
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    channels: usize,
    hardware_sample_rate: u32,
    renderer: Arc<Renderer>,
) -> PlayoutResult<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    // Scratch buffers live in the callback closure; they grow to the
    // callback size once and the steady-state render path never allocates.
    let mut engine_bytes: Vec<u8> = Vec::new();
    let mut mono: Vec<f32> = Vec::new();

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let hw_samples = data.len() / channels;
                let needed = format::engine_samples_for(hw_samples, hardware_sample_rate);

                engine_bytes.resize(needed * 2, 0);
                renderer.render(&mut engine_bytes);

                mono.resize(hw_samples, 0.0);
                format::resample_block(&engine_bytes, &mut mono);

                for (frame, &value) in data.chunks_mut(channels).zip(mono.iter()) {
                    frame.fill(T::from_sample(value));
                }
            },
            |err| error!("output stream error: {}", err),
            None,
        )
        .map_err(|e| PlayoutError::host("build_output_stream", e))?;
    Ok(stream)
}
