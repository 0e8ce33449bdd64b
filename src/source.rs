//! The engine-facing frame contract.

/// A producer of fixed-size engine audio frames.
///
/// The adapter calls [`next_frame`](FrameSource::next_frame) from the host's
/// render thread whenever the staging buffer runs low, always with a slice of
/// exactly [`FRAME_BYTES`](crate::FRAME_BYTES) bytes. Implementations must
/// fill the whole slice and return promptly; the upstream engine is expected
/// to be pre-buffered so this call never blocks at the scale of one render
/// quantum. If it ever does, the audible consequence is an underrun, not a
/// hang the adapter can detect.
pub trait FrameSource: Send {
    /// Fill `frame` with the next engine frame of 48 kHz mono 16-bit PCM.
    fn next_frame(&mut self, frame: &mut [u8]);
}

/// A source that produces silence. Useful as a placeholder before the engine
/// attaches to the output.
pub struct SilenceSource;

impl FrameSource for SilenceSource {
    fn next_frame(&mut self, frame: &mut [u8]) {
        frame.fill(0);
    }
}
