/// Run statistics
///
/// Counts frames and bytes per message type, executions set aside as
/// pre-open or non-printable, and every per-message problem by kind so a
/// run can be audited after the fact.
/// Also hosts the optional timing wrapper used around the decode loop.

use crate::protocol::MessageType;
use std::fmt;
use std::time::{Duration, Instant};

/// Auditable kinds of dropped or skipped messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Payload failed field decode; message skipped
    MalformedPayload,
    /// Execution referenced an order id never added or replaced; fill dropped
    UnknownOrder,
    /// Fills on a locator with no directory entry; series not produced
    UnmappedSymbol,
    /// Tag byte not in the length table; byte discarded
    UnknownTag,
}

impl ErrorKind {
    pub const COUNT: usize = 4;

    pub const ALL: [ErrorKind; Self::COUNT] = [
        ErrorKind::MalformedPayload,
        ErrorKind::UnknownOrder,
        ErrorKind::UnmappedSymbol,
        ErrorKind::UnknownTag,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MalformedPayload => "MalformedPayload",
            ErrorKind::UnknownOrder => "UnknownOrder",
            ErrorKind::UnmappedSymbol => "UnmappedSymbol",
            ErrorKind::UnknownTag => "UnknownTag",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct RunStats {
    start_time: Option<Instant>,
    total_frames: u64,
    total_bytes: u64,
    frames_by_type: [u64; MessageType::COUNT],

    // executions/trades decoded before market open
    pre_open_discarded: u64,
    // 'C' executions flagged non-printable
    non_printable: u64,

    errors: [u64; ErrorKind::COUNT],
}

impl RunStats {
    pub fn new() -> Self {
        RunStats {
            start_time: None,
            total_frames: 0,
            total_bytes: 0,
            frames_by_type: [0; MessageType::COUNT],
            pre_open_discarded: 0,
            non_printable: 0,
            errors: [0; ErrorKind::COUNT],
        }
    }

    /// Record a frame read; `size` includes the tag byte
    pub fn record_frame(&mut self, msg_type: MessageType, size: usize) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
        self.total_frames += 1;
        self.total_bytes += size as u64;
        self.frames_by_type[msg_type.index()] += 1;
    }

    pub fn record_pre_open(&mut self) {
        self.pre_open_discarded += 1;
    }

    pub fn record_non_printable(&mut self) {
        self.non_printable += 1;
    }

    pub fn record_error(&mut self, kind: ErrorKind) {
        self.record_errors(kind, 1);
    }

    pub fn record_errors(&mut self, kind: ErrorKind, count: u64) {
        self.errors[kind.index()] += count;
    }

    /// Overwrite a counter; used for kinds that are recomputed rather than accumulated
    pub fn set_error_count(&mut self, kind: ErrorKind, count: u64) {
        self.errors[kind.index()] = count;
    }

    pub fn error_count(&self, kind: ErrorKind) -> u64 {
        self.errors[kind.index()]
    }

    pub fn total_errors(&self) -> u64 {
        self.errors.iter().sum()
    }

    /// (kind, count) for every kind, including zero counts
    pub fn skip_summary(&self) -> Vec<(ErrorKind, u64)> {
        ErrorKind::ALL
            .iter()
            .map(|&kind| (kind, self.error_count(kind)))
            .collect()
    }

    pub fn frames_of(&self, msg_type: MessageType) -> u64 {
        self.frames_by_type[msg_type.index()]
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn pre_open_discarded(&self) -> u64 {
        self.pre_open_discarded
    }

    pub fn non_printable(&self) -> u64 {
        self.non_printable
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.start_time.map(|st| st.elapsed())
    }

    pub fn frames_per_sec(&self) -> f64 {
        match self.elapsed() {
            Some(elapsed) if elapsed.as_secs_f64() > 0.0 => {
                self.total_frames as f64 / elapsed.as_secs_f64()
            }
            _ => 0.0,
        }
    }

    pub fn bytes_per_sec(&self) -> f64 {
        match self.elapsed() {
            Some(elapsed) if elapsed.as_secs_f64() > 0.0 => {
                self.total_bytes as f64 / elapsed.as_secs_f64()
            }
            _ => 0.0,
        }
    }

    /// Emit the run summary through `tracing`
    pub fn log_summary(&self) {
        tracing::info!(
            frames = self.total_frames,
            bytes = self.total_bytes,
            pre_open = self.pre_open_discarded,
            non_printable = self.non_printable,
            "run summary: {:.0} frames/s, {:.0} bytes/s",
            self.frames_per_sec(),
            self.bytes_per_sec(),
        );

        for msg_type in MessageType::ALL {
            let count = self.frames_of(msg_type);
            if count > 0 {
                tracing::debug!(tag = %(msg_type.tag() as char), count, "frames by type");
            }
        }

        for (kind, count) in self.skip_summary() {
            if count > 0 {
                tracing::warn!(%kind, count, "messages skipped");
            } else {
                tracing::info!(%kind, count, "messages skipped");
            }
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `f`, log how long it took under `label`, and hand back its result
pub fn timed<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    let start = Instant::now();
    let out = f();
    tracing::info!("{} took {:.3}s", label, start.elapsed().as_secs_f64());
    out
}
