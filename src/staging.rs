//! Staging buffer between engine frames and host callback requests.
//!
//! The engine produces audio in fixed 1920-byte frames while the host asks
//! for a different, varying number of bytes on every render callback. The
//! stager holds bytes already pulled from the engine but not yet consumed by
//! the hardware, so every request can be served exactly regardless of how it
//! aligns with frame boundaries.

use crate::source::FrameSource;
use crate::{FRAME_BYTES, STAGING_CAPACITY};

/// Fixed-capacity byte buffer filled in whole engine frames and drained in
/// arbitrary host-requested amounts.
///
/// Filling always appends whole frames, so after any fill the staged length
/// exceeds the requested size by at most `FRAME_BYTES - 1`. The unconsumed
/// remainder is compacted to the front on every drain; indices are plain
/// offsets, not a ring.
pub struct FrameStager {
    buf: Box<[u8; STAGING_CAPACITY]>,
    len: usize,
}

impl FrameStager {
    /// Create an empty stager.
    pub fn new() -> Self {
        Self {
            buf: Box::new([0u8; STAGING_CAPACITY]),
            len: 0,
        }
    }

    /// Number of staged bytes not yet consumed by the hardware.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the stager holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pull whole engine frames from `source` until at least `needed` bytes
    /// are staged. Performs no pulls when enough bytes are already held.
    ///
    /// Panics if a pull would overflow the buffer. The capacity is a
    /// construction-time constant chosen against the largest callback request
    /// the host can make, so an overflow is a configuration error rather than
    /// a runtime condition to recover from.
    pub fn fill_to(&mut self, needed: usize, source: &mut dyn FrameSource) {
        while self.len < needed {
            assert!(
                self.len + FRAME_BYTES < STAGING_CAPACITY,
                "staging buffer overflow: {} staged + {} frame bytes exceeds capacity {}",
                self.len,
                FRAME_BYTES,
                STAGING_CAPACITY
            );
            source.next_frame(&mut self.buf[self.len..self.len + FRAME_BYTES]);
            self.len += FRAME_BYTES;
        }
    }

    /// Copy `out.len()` bytes from the front of the staged data into `out`,
    /// then compact the remainder to the front.
    pub fn drain_into(&mut self, out: &mut [u8]) {
        let requested = out.len();
        assert!(
            requested <= self.len,
            "drain of {} bytes exceeds {} staged",
            requested,
            self.len
        );
        out.copy_from_slice(&self.buf[..requested]);
        self.buf.copy_within(requested..self.len, 0);
        self.len -= requested;
    }
}

impl Default for FrameStager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Produces an endless stream of incrementing bytes, and counts pulls.
    struct CountingSource {
        next: u8,
        pulls: usize,
    }

    impl CountingSource {
        fn new() -> Self {
            Self { next: 0, pulls: 0 }
        }
    }

    impl FrameSource for CountingSource {
        fn next_frame(&mut self, frame: &mut [u8]) {
            self.pulls += 1;
            for byte in frame.iter_mut() {
                *byte = self.next;
                self.next = self.next.wrapping_add(1);
            }
        }
    }

    #[test]
    fn test_fill_appends_whole_frames() {
        let mut stager = FrameStager::new();
        let mut source = CountingSource::new();

        stager.fill_to(1, &mut source);
        assert_eq!(stager.len(), FRAME_BYTES);
        assert_eq!(source.pulls, 1);

        stager.fill_to(FRAME_BYTES + 1, &mut source);
        assert_eq!(stager.len(), 2 * FRAME_BYTES);
        assert_eq!(source.pulls, 2);
    }

    #[test]
    fn test_no_pull_when_already_staged() {
        let mut stager = FrameStager::new();
        let mut source = CountingSource::new();

        stager.fill_to(100, &mut source);
        assert_eq!(source.pulls, 1);

        // Everything up to one frame is already covered.
        stager.fill_to(FRAME_BYTES, &mut source);
        assert_eq!(source.pulls, 1);

        stager.fill_to(0, &mut source);
        assert_eq!(source.pulls, 1);
    }

    #[test]
    fn test_reassembly_is_lossless_across_request_boundaries() {
        let mut stager = FrameStager::new();
        let mut source = CountingSource::new();

        // Request sizes deliberately misaligned with the 1920-byte frame.
        let requests = [7usize, 480, 1913, 960, 1, 1920, 2000];
        let total: usize = requests.iter().sum();

        let mut delivered = Vec::new();
        for &size in &requests {
            let mut out = vec![0u8; size];
            stager.fill_to(size, &mut source);
            stager.drain_into(&mut out);
            delivered.extend_from_slice(&out);
        }

        let expected: Vec<u8> = (0..total).map(|i| (i % 256) as u8).collect();
        assert_eq!(delivered, expected, "byte stream must reassemble losslessly");
    }

    #[test]
    fn test_remainder_bounded_by_one_frame() {
        let mut stager = FrameStager::new();
        let mut source = CountingSource::new();

        for &size in &[1usize, 479, 1919, 1921, 3000] {
            stager.fill_to(size, &mut source);
            assert!(stager.len() >= size);
            assert!(stager.len() < size + FRAME_BYTES);
            let mut out = vec![0u8; size];
            stager.drain_into(&mut out);
        }
    }

    #[test]
    #[should_panic(expected = "staging buffer overflow")]
    fn test_oversized_request_is_fatal() {
        let mut stager = FrameStager::new();
        let mut source = CountingSource::new();
        // Larger than the capacity can ever satisfy in whole frames.
        stager.fill_to(STAGING_CAPACITY, &mut source);
    }
}
