// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Audio Buffer: a bounded sliding buffer of recent PCM/encoded audio frames
//! per session, sequence-tagged for reconnection catch-up. The live-
//! forwarding side is handled by the session actor directly as each glasses
//! binary frame arrives — the actor already serializes all per-session work
//! onto one task, so a separate live-queue/consumer-task pair would add no
//! real concurrency here, only plumbing; the sliding buffer is exactly what
//! survives across a disconnect and is what `AudioBuffer` is responsible for.

use std::collections::VecDeque;
use std::time::Duration;

use bytes::Bytes;

/// One audio frame, as captured from a binary glasses frame.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pub sequence: u64,
    pub payload: Bytes,
    pub encoding: Option<String>,
}

/// Roughly how many 10ms frames fit in a duration.
fn frame_capacity(duration: Duration) -> usize {
    (duration.as_millis() / 10).max(1) as usize
}

pub struct AudioBuffer {
    slide: VecDeque<AudioFrame>,
    slide_cap: usize,
    next_seq: u64,
    gap_count: u64,
}

impl AudioBuffer {
    pub fn new(slide_window: Duration) -> Self {
        Self {
            slide: VecDeque::new(),
            slide_cap: frame_capacity(slide_window),
            next_seq: 0,
            gap_count: 0,
        }
    }

    /// Ingest a frame from the glasses link, assigning it the next
    /// monotonic sequence number and retaining it in the sliding buffer.
    pub fn push(&mut self, payload: Bytes, encoding: Option<String>) -> AudioFrame {
        let frame = AudioFrame { sequence: self.next_seq, payload, encoding };
        self.next_seq += 1;

        if self.slide.len() >= self.slide_cap {
            self.slide.pop_front();
            self.gap_count += 1;
        }
        self.slide.push_back(frame.clone());
        frame
    }

    /// Catch-up frames for a reconnecting glasses link: everything retained
    /// from the oldest frame onward, in sequence order. No deduplication by
    /// sequence: the consumer is expected to de-duplicate against the last
    /// sequence it already rendered.
    pub fn catch_up(&self) -> Vec<AudioFrame> {
        self.slide.iter().cloned().collect()
    }

    /// Count of frames evicted from the sliding buffer before ever being
    /// replayed to a reconnecting client — exposed for observability.
    pub fn gap_count(&self) -> u64 {
        self.gap_count
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.slide.back().map(|f| f.sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_increases_monotonically() {
        let mut buf = AudioBuffer::new(Duration::from_millis(3000));
        let f0 = buf.push(Bytes::from_static(b"a"), None);
        let f1 = buf.push(Bytes::from_static(b"b"), None);
        assert_eq!(f0.sequence, 0);
        assert_eq!(f1.sequence, 1);
    }

    #[test]
    fn overflow_drops_oldest_first_and_counts_gap() {
        let mut buf = AudioBuffer::new(Duration::from_millis(30)); // cap = 3 frames
        for i in 0..5u8 {
            buf.push(Bytes::from(vec![i]), None);
        }
        let catch_up = buf.catch_up();
        assert_eq!(catch_up.len(), 3);
        assert_eq!(catch_up.first().unwrap().sequence, 2);
        assert_eq!(buf.gap_count(), 2);
    }

    #[test]
    fn catch_up_replays_in_sequence_order() {
        let mut buf = AudioBuffer::new(Duration::from_millis(3000)); // cap = 300
        for _ in 0..120u32 {
            buf.push(Bytes::from_static(b"x"), None);
        }
        let replay = buf.catch_up();
        assert_eq!(replay.len(), 120);
        for (i, frame) in replay.iter().enumerate() {
            assert_eq!(frame.sequence, i as u64);
        }
    }
}
