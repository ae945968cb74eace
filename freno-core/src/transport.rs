//! Bounded CAN frame transport between the receive interrupt and the
//! polling loop
//!
//! Two fixed-capacity FIFO queues decouple the asynchronous message source
//! from the synchronous consumer. Nothing here blocks: every operation
//! returns immediately with a success indicator or a value.
//!
//! # Concurrency contract
//!
//! `enqueue_inbound` is the only operation invoked from the receive
//! interrupt; everything else runs on the polling loop. The transport is a
//! single-owner structure, so when the inbound side is fed from interrupt
//! context the whole instance must sit behind a critical-section mutex
//! (`CriticalSectionRawMutex` in an Embassy build). Every operation touches
//! at most one queue slot and a pair of indices, which keeps that section
//! minimal.
//!
//! # Loss policy
//!
//! A full inbound queue rejects the *newest* frame: everything already
//! queued was received first and the polling loop consumes in order, so
//! dropping the latecomer preserves the delivered prefix. A saturated
//! hardware transmit path leaves the in-flight frame first in line for the
//! next drain pass; retry latency is therefore unbounded if the bus never
//! clears, and only the queue-depth queries expose that condition.

use freno_protocol::CanFrame;
use heapless::Deque;

/// Capacity of each direction's frame queue
pub const QUEUE_DEPTH: usize = 8;

/// Inbound and outbound frame queues
#[derive(Debug, Default)]
pub struct Transport {
    rx: Deque<CanFrame, QUEUE_DEPTH>,
    tx: Deque<CanFrame, QUEUE_DEPTH>,
}

impl Transport {
    /// Create an empty transport
    pub fn new() -> Self {
        Self {
            rx: Deque::new(),
            tx: Deque::new(),
        }
    }

    /// Queue a received frame for the polling loop
    ///
    /// Returns false and drops the frame when the inbound queue is full.
    /// Safe to call from the receive interrupt (see the module docs for
    /// the locking contract).
    pub fn enqueue_inbound(&mut self, frame: CanFrame) -> bool {
        self.rx.push_back(frame).is_ok()
    }

    /// Pull the oldest received frame, if any
    pub fn dequeue_inbound(&mut self) -> Option<CanFrame> {
        self.rx.pop_front()
    }

    /// Queue a frame for transmission
    ///
    /// Returns false when the outbound queue is full; the caller must not
    /// assume delivery either way.
    pub fn enqueue_outbound(&mut self, frame: CanFrame) -> bool {
        self.tx.push_back(frame).is_ok()
    }

    /// Hand queued outbound frames to the bus sender in FIFO order
    ///
    /// `send` returns false when the hardware path is saturated; the
    /// in-flight frame is then put back at the front of the queue and the
    /// pass ends. Returns the number of frames the sender accepted.
    pub fn drain_outbound(&mut self, mut send: impl FnMut(&CanFrame) -> bool) -> usize {
        let mut sent = 0;
        while let Some(frame) = self.tx.pop_front() {
            if send(&frame) {
                sent += 1;
            } else {
                // The pop freed a slot, so this cannot fail
                let _ = self.tx.push_front(frame);
                break;
            }
        }
        sent
    }

    /// Number of frames waiting in the inbound queue (advisory; may be
    /// stale by the time the caller acts on it)
    pub fn rx_count(&self) -> usize {
        self.rx.len()
    }

    /// Number of frames pending transmission (advisory)
    pub fn tx_count(&self) -> usize {
        self.tx.len()
    }

    /// Whether at least one received frame is waiting
    pub fn has_inbound(&self) -> bool {
        !self.rx.is_empty()
    }

    /// Discard all unread received frames
    pub fn clear_inbound(&mut self) {
        self.rx.clear();
    }

    /// Discard all pending transmissions
    ///
    /// Frames already accepted by the hardware FIFO will still go out.
    pub fn clear_outbound(&mut self) {
        self.tx.clear();
    }
}
