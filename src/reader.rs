/// Tag-driven frame reader
///
/// Pulls one tag byte, looks the payload length up in the protocol table and
/// reads exactly that many bytes. The payload is borrowed from an internal
/// buffer that is reused across frames, so no allocation happens per frame.

use crate::config::UnknownTagPolicy;
use crate::protocol::MessageType;
use std::io::{self, ErrorKind, Read};
use thiserror::Error;

/// Largest payload in the length table (NOII)
const MAX_PAYLOAD: usize = 49;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("truncated frame: tag '{tag}' needs {need} payload bytes, have {have}")]
    TruncatedFrame { tag: char, need: usize, have: usize },

    #[error("unknown message tag 0x{tag:02x} at byte offset {offset}")]
    UnknownTag { tag: u8, offset: u64 },

    #[error("failed to read source: {0}")]
    Io(#[from] io::Error),
}

pub type FrameResult<T> = Result<T, FrameError>;

/// A single frame: known message type plus a payload of exactly `payload_len` bytes
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub msg_type: MessageType,
    pub payload: &'a [u8],
}

pub struct FrameReader<R> {
    source: R,
    policy: UnknownTagPolicy,
    buffer: [u8; MAX_PAYLOAD],
    offset: u64,
    skipped_bytes: u64,
}

impl<R: Read> FrameReader<R> {
    pub fn new(source: R) -> Self {
        Self::with_policy(source, UnknownTagPolicy::default())
    }

    pub fn with_policy(source: R, policy: UnknownTagPolicy) -> Self {
        FrameReader {
            source,
            policy,
            buffer: [0u8; MAX_PAYLOAD],
            offset: 0,
            skipped_bytes: 0,
        }
    }

    /// Read the next frame. Returns `Ok(None)` once the source is exhausted
    /// on a frame boundary.
    pub fn next_frame(&mut self) -> FrameResult<Option<Frame<'_>>> {
        let msg_type = loop {
            let mut tag = [0u8; 1];
            if read_full(&mut self.source, &mut tag)? == 0 {
                return Ok(None);
            }
            let tag_offset = self.offset;
            self.offset += 1;

            match MessageType::from_tag(tag[0]) {
                Some(msg_type) => break msg_type,
                None => match self.policy {
                    UnknownTagPolicy::SkipByte => {
                        self.skipped_bytes += 1;
                        tracing::trace!(
                            tag = tag[0],
                            offset = tag_offset,
                            "skipping unknown tag byte"
                        );
                    }
                    UnknownTagPolicy::Fail => {
                        return Err(FrameError::UnknownTag {
                            tag: tag[0],
                            offset: tag_offset,
                        });
                    }
                },
            }
        };

        let need = msg_type.payload_len();
        let have = read_full(&mut self.source, &mut self.buffer[..need])?;
        self.offset += have as u64;
        if have < need {
            return Err(FrameError::TruncatedFrame {
                tag: msg_type.tag() as char,
                need,
                have,
            });
        }

        Ok(Some(Frame {
            msg_type,
            payload: &self.buffer[..need],
        }))
    }

    /// Bytes consumed from the source so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Bytes discarded as unrecognised tags
    pub fn skipped_bytes(&self) -> u64 {
        self.skipped_bytes
    }

    pub fn into_inner(self) -> R {
        self.source
    }
}

/// Like `read_exact`, but reports how many bytes were available on a short read
fn read_full<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
