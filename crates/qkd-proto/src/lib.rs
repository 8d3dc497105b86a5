//! QKD Pipeline Protocol
//!
//! Message envelope and wire framing shared by every stage of the
//! post-processing pipeline.
//!
//! # Wire Format
//!
//! ```text
//! ┌──────────┬────────────┬─────────────┬─────────┬─────────┬─────┐
//! │ id u32   │ type u32   │ payload_len │ payload │ tag_len │ tag │
//! └──────────┴────────────┴─────────────┴─────────┴─────────┴─────┘
//!  MessageHeader (8 bytes)   u32 BE                  u32 BE
//! ```
//!
//! All integers are Big Endian. The tag authenticates header ‖ payload and
//! is produced by the link's authentication context.

pub mod errors;
pub mod frame;
pub mod header;
pub mod message;

pub use errors::{ProtocolError, Result};
pub use frame::{Frame, MAX_PAYLOAD_SIZE, MAX_TAG_SIZE};
pub use header::MessageHeader;
pub use message::{Message, MessageIds, MessageType};
