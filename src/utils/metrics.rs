//! Observability and Metrics
//!
//! Process-wide counters for connections, inbound frame outcomes and outbound
//! traffic. Uses atomic counters so any connection task can record without
//! locking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Global metrics collector for packet engine operations
#[derive(Debug)]
pub struct Metrics {
    /// Total connections accepted
    pub connections_total: AtomicU64,
    /// Currently open connections
    pub connections_active: AtomicU64,
    /// Connections refused at the connection limit
    pub connections_rejected: AtomicU64,
    /// Frames read off the wire
    pub frames_received: AtomicU64,
    /// Frames that reached a handler
    pub frames_handled: AtomicU64,
    /// Frames whose opcode is in neither table
    pub frames_unknown: AtomicU64,
    /// Frames whose opcode has no handler bound
    pub frames_unimplemented: AtomicU64,
    /// Frames sent in a session phase that does not allow them
    pub frames_illegal_state: AtomicU64,
    /// Frames that failed to decode
    pub frames_malformed: AtomicU64,
    /// Handlers that returned an error
    pub handler_errors: AtomicU64,
    /// Connections closed for exceeding the violation limit
    pub violation_disconnects: AtomicU64,
    /// Packets handed to connection writers
    pub packets_sent: AtomicU64,
    /// Inbound bytes, frame headers excluded
    pub bytes_received: AtomicU64,
    /// Outbound bytes, frame headers excluded
    pub bytes_sent: AtomicU64,
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            connections_total: AtomicU64::new(0),
            connections_active: AtomicU64::new(0),
            connections_rejected: AtomicU64::new(0),
            frames_received: AtomicU64::new(0),
            frames_handled: AtomicU64::new(0),
            frames_unknown: AtomicU64::new(0),
            frames_unimplemented: AtomicU64::new(0),
            frames_illegal_state: AtomicU64::new(0),
            frames_malformed: AtomicU64::new(0),
            handler_errors: AtomicU64::new(0),
            violation_disconnects: AtomicU64::new(0),
            packets_sent: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn connection_established(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn connection_rejected(&self) {
        self.connections_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frame_received(&self, byte_count: u64) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(byte_count, Ordering::Relaxed);
    }

    pub fn frame_handled(&self) {
        self.frames_handled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frame_unknown(&self) {
        self.frames_unknown.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frame_unimplemented(&self) {
        self.frames_unimplemented.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frame_illegal_state(&self) {
        self.frames_illegal_state.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frame_malformed(&self) {
        self.frames_malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn handler_error(&self) {
        self.handler_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn violation_disconnect(&self) {
        self.violation_disconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn packet_sent(&self, byte_count: u64) {
        self.packets_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            connections_rejected: self.connections_rejected.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_handled: self.frames_handled.load(Ordering::Relaxed),
            frames_unknown: self.frames_unknown.load(Ordering::Relaxed),
            frames_unimplemented: self.frames_unimplemented.load(Ordering::Relaxed),
            frames_illegal_state: self.frames_illegal_state.load(Ordering::Relaxed),
            frames_malformed: self.frames_malformed.load(Ordering::Relaxed),
            handler_errors: self.handler_errors.load(Ordering::Relaxed),
            violation_disconnects: self.violation_disconnects.load(Ordering::Relaxed),
            packets_sent: self.packets_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            connections_total = snapshot.connections_total,
            connections_active = snapshot.connections_active,
            connections_rejected = snapshot.connections_rejected,
            frames_received = snapshot.frames_received,
            frames_handled = snapshot.frames_handled,
            frames_unknown = snapshot.frames_unknown,
            frames_unimplemented = snapshot.frames_unimplemented,
            frames_illegal_state = snapshot.frames_illegal_state,
            frames_malformed = snapshot.frames_malformed,
            handler_errors = snapshot.handler_errors,
            violation_disconnects = snapshot.violation_disconnects,
            packets_sent = snapshot.packets_sent,
            bytes_received = snapshot.bytes_received,
            bytes_sent = snapshot.bytes_sent,
            uptime_seconds = snapshot.uptime_seconds,
            "Packet engine metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub connections_total: u64,
    pub connections_active: u64,
    pub connections_rejected: u64,
    pub frames_received: u64,
    pub frames_handled: u64,
    pub frames_unknown: u64,
    pub frames_unimplemented: u64,
    pub frames_illegal_state: u64,
    pub frames_malformed: u64,
    pub handler_errors: u64,
    pub violation_disconnects: u64,
    pub packets_sent: u64,
    pub bytes_received: u64,
    pub bytes_sent: u64,
    pub uptime_seconds: u64,
}

static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
    }
}
