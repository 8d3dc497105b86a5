//! Application view of a message: type, id, payload and last activity.

use std::{
    sync::atomic::{AtomicU32, Ordering},
    time::{Duration, Instant},
};

use bytes::Bytes;

use crate::{Frame, MessageHeader, ProtocolError, Result};

/// Message type carried in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MessageType {
    /// Pipeline payload
    Data = 0,
    /// Key synchronisation between peers
    KeySync = 1,
}

impl MessageType {
    /// Convert from the wire code. `None` if unrecognized.
    #[must_use]
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Data),
            1 => Some(Self::KeySync),
            _ => None,
        }
    }

    /// Wire code
    #[must_use]
    pub fn to_u32(self) -> u32 {
        self as u32
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Data => "DATA",
            Self::KeySync => "KEY_SYNC",
        })
    }
}

/// Source of message ids.
///
/// Ids increase by one per message and wrap at 2^32. Components that need
/// reproducible ids (tests, simulations) own their own counter; everything
/// else draws from [`MessageIds::global`].
#[derive(Debug, Default)]
pub struct MessageIds {
    next: AtomicU32,
}

static GLOBAL_IDS: MessageIds = MessageIds::new();

impl MessageIds {
    /// Counter starting at 0
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Counter whose first id is `first`
    #[must_use]
    pub const fn starting_at(first: u32) -> Self {
        Self { next: AtomicU32::new(first) }
    }

    /// Process-wide counter shared by [`Message::new`]
    pub fn global() -> &'static Self {
        &GLOBAL_IDS
    }

    /// Draw the next id
    pub fn next(&self) -> u32 {
        // fetch_add wraps on overflow
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// A pipeline message.
///
/// Not `Clone`: every message owns a distinct id.
#[derive(Debug, PartialEq)]
pub struct Message {
    id: u32,
    message_type: MessageType,
    payload: Bytes,
    touched: Option<Instant>,
}

impl Message {
    /// New empty message with an id from the global counter
    #[must_use]
    pub fn new(message_type: MessageType) -> Self {
        Self::with_ids(MessageIds::global(), message_type)
    }

    /// New empty message with an id from `ids`
    #[must_use]
    pub fn with_ids(ids: &MessageIds, message_type: MessageType) -> Self {
        Self { id: ids.next(), message_type, payload: Bytes::new(), touched: None }
    }

    /// Set the payload, builder style
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Rebuild a received message, keeping the sender's id
    ///
    /// # Errors
    ///
    /// - `ProtocolError::UnknownMessageType` if the header type is unknown
    pub fn from_frame(frame: Frame) -> Result<Self> {
        let message_type = frame
            .header
            .message_type()
            .ok_or(ProtocolError::UnknownMessageType(frame.header.message_type_raw()))?;

        Ok(Self { id: frame.header.id(), message_type, payload: frame.payload, touched: None })
    }

    /// Untagged frame for this message
    #[must_use]
    pub fn to_frame(&self) -> Frame {
        Frame::new(MessageHeader::new(self.id, self.message_type), self.payload.clone())
    }

    /// Message id
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Message type
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Payload bytes
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Replace the payload
    pub fn set_payload(&mut self, payload: impl Into<Bytes>) {
        self.payload = payload.into();
    }

    /// Record activity now
    pub fn touch(&mut self) {
        self.touched = Some(Instant::now());
    }

    /// Time since last activity; zero if never touched
    pub fn age(&self) -> Duration {
        self.touched.map(|at| at.elapsed()).unwrap_or_default()
    }
}
