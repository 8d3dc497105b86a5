//! Authenticated message exchange over a [`Transport`].
//!
//! Every message travels as one [`Frame`]. The sender runs the link's
//! authentication context over header ‖ payload and attaches the tag; the
//! receiver recomputes it with its own context and the same final key, and
//! rejects the message on mismatch before looking at anything else.
//!
//! # Timeouts
//!
//! Each call takes a [`Timeout`]. [`Timeout::Unchanged`] reuses the last
//! explicit timeout (initially [`ExchangeConfig::default_timeout`]). Infinite
//! waits end only on completion, transport failure, or an [`Interrupt`].

use std::{future::Future, sync::Arc, time::Duration};

use bytes::{Buf, BytesMut};
use qkd_crypto::{Context, CryptoError, Key};
use qkd_proto::{Frame, Message, MessageType, ProtocolError};
use subtle::ConstantTimeEq;
use tokio::sync::watch;

use crate::{
    config::{ExchangeConfig, Timeout},
    error::ExchangeError,
    transport::Transport,
};

/// Cancels infinite waits on the [`Exchange`] it was taken from.
///
/// Cheap to clone and usable from any task or thread. Only waits in
/// progress when [`Interrupt::interrupt`] is called are cancelled.
#[derive(Debug, Clone)]
pub struct Interrupt {
    signal: Arc<watch::Sender<u64>>,
}

impl Interrupt {
    fn new() -> Self {
        let (signal, _) = watch::channel(0);
        Self { signal: Arc::new(signal) }
    }

    /// Cancel every infinite send or receive currently waiting.
    pub fn interrupt(&self) {
        self.signal.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.signal.subscribe()
    }
}

/// Sends and receives authenticated messages over one transport.
#[derive(Debug)]
pub struct Exchange<T> {
    transport: T,
    buffer: BytesMut,
    timeout: Timeout,
    max_payload_size: usize,
    interrupt: Interrupt,
}

impl<T: Transport> Exchange<T> {
    /// Wrap a connected transport.
    pub fn new(transport: T, config: ExchangeConfig) -> Self {
        let max_payload_size = config.max_payload_size.min(qkd_proto::MAX_PAYLOAD_SIZE) as usize;
        Self {
            transport,
            buffer: BytesMut::new(),
            timeout: config.default_timeout.or(Timeout::Infinite),
            max_payload_size,
            interrupt: Interrupt::new(),
        }
    }

    /// Handle for cancelling infinite waits from elsewhere.
    pub fn interrupt_handle(&self) -> Interrupt {
        self.interrupt.clone()
    }

    /// Timeout used when a call passes [`Timeout::Unchanged`].
    pub fn timeout(&self) -> Timeout {
        self.timeout
    }

    /// Set the timeout used when a call passes [`Timeout::Unchanged`].
    pub fn set_timeout(&mut self, timeout: Timeout) {
        self.timeout = timeout.or(self.timeout);
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Release the transport. Bytes read but not yet framed are dropped.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Authenticate and send `message`.
    ///
    /// `context` is a fresh outgoing authentication context; it is consumed
    /// whether or not the send succeeds. The message is touched once written.
    ///
    /// # Errors
    ///
    /// - `ExchangeError::Crypto` if the context rejects the data or
    ///   `final_key`
    /// - `ExchangeError::Protocol` if the payload exceeds the configured
    ///   limit
    /// - `ExchangeError::Timeout` / `Interrupted` / `Transport` if the write
    ///   does not complete
    pub async fn send(
        &mut self,
        message: &mut Message,
        mut context: Context,
        final_key: &Key,
        timeout: Timeout,
    ) -> Result<(), ExchangeError> {
        let timeout = self.resolve(timeout);
        self.check_payload_size(message.payload().len())?;

        let frame = message.to_frame();
        context.add(&frame.authenticated_data())?;
        // xor sizes its final key by the data added, so check only after add
        if !context.is_valid_final_key(final_key) {
            return Err(CryptoError::WrongKey {
                algorithm: context.name().to_owned(),
                expected: context.final_key_size(),
                actual: final_key.len(),
            }
            .into());
        }
        let tag = context.finalize(final_key)?.into_tag();
        let frame = frame.with_tag(tag);

        let mut wire = BytesMut::with_capacity(frame.encoded_len());
        frame.encode(&mut wire)?;

        let interrupt = self.interrupt.subscribe();
        bounded(timeout, interrupt, self.transport.write(&wire)).await??;
        message.touch();

        tracing::debug!(
            message_id = message.id(),
            message_type = %message.message_type(),
            bytes = wire.len(),
            "sent message"
        );

        Ok(())
    }

    /// Receive the next message and verify it.
    ///
    /// `context` is a fresh incoming authentication context. The returned
    /// message carries the sender's id and is touched.
    ///
    /// # Errors
    ///
    /// - `ExchangeError::Authentication` if the tag does not verify
    /// - `ExchangeError::UnexpectedType` if an authentic message has a type
    ///   other than `expected`; the message is consumed
    /// - `ExchangeError::Protocol` on a malformed frame; buffered bytes are
    ///   discarded since the stream can no longer be trusted
    /// - `ExchangeError::Timeout` / `Interrupted` / `Transport` if no
    ///   complete frame arrives
    ///
    /// # Security
    ///
    /// The tag is compared in constant time, and the type is checked only
    /// after the tag verifies, so an attacker learns nothing from which error
    /// a forged frame produces.
    pub async fn recv(
        &mut self,
        mut context: Context,
        final_key: &Key,
        expected: MessageType,
        timeout: Timeout,
    ) -> Result<Message, ExchangeError> {
        let timeout = self.resolve(timeout);

        let interrupt = self.interrupt.subscribe();
        let frame = bounded(
            timeout,
            interrupt,
            read_frame(&mut self.transport, &mut self.buffer, self.max_payload_size),
        )
        .await??;

        context.add(&frame.authenticated_data())?;
        let computed = context.finalize(final_key)?;
        let message_id = frame.header.id();

        if !bool::from(computed.tag().ct_eq(&frame.tag)) {
            tracing::warn!(message_id, "message failed authentication");
            return Err(ExchangeError::Authentication { message_id });
        }

        let mut message = Message::from_frame(frame)?;
        if message.message_type() != expected {
            tracing::warn!(
                message_id,
                expected = %expected,
                actual = %message.message_type(),
                "unexpected message type"
            );
            return Err(ExchangeError::UnexpectedType { expected, actual: message.message_type() });
        }

        message.touch();
        tracing::debug!(
            message_id,
            message_type = %expected,
            payload = message.payload().len(),
            "received message"
        );

        Ok(message)
    }

    fn resolve(&mut self, timeout: Timeout) -> Timeout {
        self.timeout = timeout.or(self.timeout);
        self.timeout
    }

    fn check_payload_size(&self, size: usize) -> Result<(), ExchangeError> {
        if size > self.max_payload_size {
            return Err(ProtocolError::PayloadTooLarge { size, max: self.max_payload_size }.into());
        }
        Ok(())
    }
}

/// Read until `buffer` holds one complete frame, then take it off the front.
///
/// Cancel-safe as long as the transport's `read` is: bytes already read stay
/// in `buffer` for the next call.
async fn read_frame<T: Transport>(
    transport: &mut T,
    buffer: &mut BytesMut,
    max_payload_size: usize,
) -> Result<Frame, ExchangeError> {
    loop {
        match Frame::decode(buffer) {
            Ok((frame, consumed)) => {
                buffer.advance(consumed);
                if frame.payload.len() > max_payload_size {
                    return Err(ProtocolError::PayloadTooLarge {
                        size: frame.payload.len(),
                        max: max_payload_size,
                    }
                    .into());
                }
                return Ok(frame);
            },
            Err(err) if err.is_incomplete() => {},
            Err(err) => {
                tracing::warn!(error = %err, discarded = buffer.len(), "dropping unframeable input");
                buffer.clear();
                return Err(err.into());
            },
        }

        let chunk = transport.read().await?;
        tracing::trace!(bytes = chunk.len(), buffered = buffer.len(), "read chunk");
        buffer.extend_from_slice(&chunk);
    }
}

/// Run `operation` under `timeout`.
///
/// Non-blocking polls the operation once. Infinite waits also watch
/// `interrupt` and give up on its next change.
async fn bounded<F: Future>(
    timeout: Timeout,
    mut interrupt: watch::Receiver<u64>,
    operation: F,
) -> Result<F::Output, ExchangeError> {
    match timeout {
        Timeout::NonBlocking => limit(Duration::ZERO, operation).await,
        Timeout::After(duration) => limit(duration, operation).await,
        Timeout::Infinite | Timeout::Unchanged => {
            tokio::select! {
                output = operation => Ok(output),
                Ok(()) = interrupt.changed() => {
                    tracing::debug!("wait interrupted");
                    Err(ExchangeError::Interrupted)
                },
            }
        },
    }
}

async fn limit<F: Future>(duration: Duration, operation: F) -> Result<F::Output, ExchangeError> {
    tokio::time::timeout(duration, operation)
        .await
        .map_err(|_| ExchangeError::Timeout { elapsed: duration })
}

#[cfg(test)]
mod tests {
    use qkd_crypto::engine;

    use super::*;
    use crate::MemoryTransport;

    fn auth() -> Context {
        engine::create_from_str("evhash-32:0badf00d").unwrap()
    }

    fn final_key() -> Key {
        Key::from(vec![0x11, 0x22, 0x33, 0x44])
    }

    fn pair() -> (Exchange<MemoryTransport>, Exchange<MemoryTransport>) {
        let (left, right) = MemoryTransport::pair(8);
        (
            Exchange::new(left, ExchangeConfig::default()),
            Exchange::new(right, ExchangeConfig::default()),
        )
    }

    #[tokio::test]
    async fn unchanged_keeps_last_explicit_timeout() {
        let (mut alice, _bob) = pair();
        assert_eq!(alice.timeout(), Timeout::Infinite);

        let err = alice.recv(auth(), &final_key(), MessageType::Data, Timeout::NonBlocking).await;
        assert!(matches!(err, Err(ExchangeError::Timeout { .. })));
        assert_eq!(alice.timeout(), Timeout::NonBlocking);

        // Still non-blocking, so this returns at once instead of hanging
        let err = alice.recv(auth(), &final_key(), MessageType::Data, Timeout::Unchanged).await;
        assert!(matches!(err, Err(ExchangeError::Timeout { elapsed }) if elapsed.is_zero()));
    }

    #[tokio::test]
    async fn oversized_payload_is_refused_before_writing() {
        let (left, _right) = MemoryTransport::pair(1);
        let config = ExchangeConfig { max_payload_size: 4, ..ExchangeConfig::default() };
        let mut exchange = Exchange::new(left, config);

        let mut message = Message::new(MessageType::Data).with_payload(vec![0; 5]);
        let err = exchange.send(&mut message, auth(), &final_key(), Timeout::NonBlocking).await;
        assert_eq!(
            err,
            Err(ExchangeError::Protocol(ProtocolError::PayloadTooLarge { size: 5, max: 4 }))
        );
        assert_eq!(message.age(), Duration::ZERO);
    }

    #[tokio::test]
    async fn garbage_clears_the_buffer() {
        let (mut raw, right) = MemoryTransport::pair(4);
        let mut bob = Exchange::new(right, ExchangeConfig::default());

        raw.write(&[0, 0, 0, 1, 0, 0, 0, 99, 0, 0]).await.unwrap();
        let err = bob.recv(auth(), &final_key(), MessageType::Data, Timeout::Infinite).await;
        assert_eq!(err, Err(ExchangeError::Protocol(ProtocolError::UnknownMessageType(99))));
        assert!(bob.buffer.is_empty());
    }

    #[tokio::test]
    async fn wrong_final_key_size_is_a_crypto_error() {
        let (mut alice, mut bob) = pair();
        let mut message = Message::new(MessageType::Data);
        let err = alice
            .send(&mut message, auth(), &Key::from(vec![1, 2]), Timeout::NonBlocking)
            .await;
        assert!(matches!(
            err,
            Err(ExchangeError::Crypto(CryptoError::WrongKey { expected: 4, actual: 2, .. }))
        ));

        // Nothing reached the wire
        let err = bob.recv(auth(), &final_key(), MessageType::Data, Timeout::NonBlocking).await;
        assert!(matches!(err, Err(ExchangeError::Timeout { .. })));
    }

    #[tokio::test]
    async fn short_xor_key_is_checked_against_the_framed_data() {
        let (mut alice, mut bob) = pair();
        let mut message = Message::new(MessageType::Data).with_payload(&b"hello"[..]);
        let xor = engine::create_from_str("xor").unwrap();
        let err = alice.send(&mut message, xor, &Key::from(vec![0; 5]), Timeout::NonBlocking).await;
        assert!(matches!(
            err,
            Err(ExchangeError::Crypto(CryptoError::WrongKey { actual: 5, expected, .. }))
                if expected > 5
        ));

        let err = bob.recv(auth(), &final_key(), MessageType::Data, Timeout::NonBlocking).await;
        assert!(matches!(err, Err(ExchangeError::Timeout { .. })));
    }
}
