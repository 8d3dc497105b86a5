//! QKD Pipeline Messaging Core
//!
//! Moves authenticated messages between post-processing stages and hands
//! work from one stage to the next.
//!
//! # Components
//!
//! - [`Exchange`]: framed send/receive over a [`Transport`], with
//!   Wegman–Carter (or any other) authentication from `qkd-crypto`,
//!   per-call [`Timeout`]s and an [`Interrupt`] for infinite waits
//! - [`MemoryTransport`]: in-process transport for tests and co-located
//!   stages
//! - [`WorkQueue`]: shared FIFO between stages
//!
//! # Example
//!
//! ```
//! use qkd_core::{Exchange, ExchangeConfig, MemoryTransport, Timeout};
//! use qkd_crypto::{Key, engine};
//! use qkd_proto::{Message, MessageType};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let (left, right) = MemoryTransport::pair(4);
//! let mut alice = Exchange::new(left, ExchangeConfig::default());
//! let mut bob = Exchange::new(right, ExchangeConfig::default());
//! let tag_key = Key::from(vec![0x5C; 12]);
//!
//! let mut message = Message::new(MessageType::Data).with_payload(&b"parity bits"[..]);
//! let auth = engine::create_from_str("evhash-96:000102030405060708090a0b").unwrap();
//! alice.send(&mut message, auth.fresh_clone(), &tag_key, Timeout::Infinite).await.unwrap();
//!
//! let received = bob.recv(auth, &tag_key, MessageType::Data, Timeout::Infinite).await.unwrap();
//! assert_eq!(received.payload().as_ref(), b"parity bits");
//! # });
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod exchange;
pub mod queue;
pub mod transport;

pub use config::{ExchangeConfig, Timeout};
pub use error::{ExchangeError, TransportError};
pub use exchange::{Exchange, Interrupt};
pub use queue::WorkQueue;
pub use transport::{MemoryTransport, Transport};
