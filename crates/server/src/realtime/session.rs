//! Shared per-connection state for the realtime voice loop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// One encoded audio chunk destined for the WebSocket, tagged with the turn
/// it was produced for so the sender can drop stale chunks on barge-in.
pub struct AudioChunk {
    pub bytes: Vec<u8>,
    pub turn_id: u64,
}

/// Chunk size ceiling applied to Chat-Synth's raw PCM batches before they're
/// queued for the WS sender.
pub const AUDIO_CHUNK_SIZE: usize = 98_304;

/// `sample_rate * channels * bytes_per_sample * 1.3` for 24 kHz mono float32.
pub const BYTES_PER_SECOND: u64 = 124_800;

/// Turn-tracking state shared by all three producer/consumer tasks.
pub struct SharedSession {
    pub current_turn_id: AtomicU64,
    pub interrupt_event: AtomicBool,
}

impl SharedSession {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { current_turn_id: AtomicU64::new(0), interrupt_event: AtomicBool::new(false) })
    }

    pub fn turn(&self) -> u64 {
        self.current_turn_id.load(Ordering::SeqCst)
    }

    pub fn begin_new_turn(&self) -> u64 {
        self.interrupt_event.store(true, Ordering::SeqCst);
        self.current_turn_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_interrupted(&self, processing_turn_id: u64) -> bool {
        self.interrupt_event.load(Ordering::SeqCst) || self.turn() != processing_turn_id
    }

    pub fn clear_interrupt(&self) {
        self.interrupt_event.store(false, Ordering::SeqCst);
    }
}
