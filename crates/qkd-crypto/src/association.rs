//! The four crypto contexts securing one pipeline link.
//!
//! An [`Association`] bundles authentication and encryption contexts for
//! both directions of a link. Contexts are independent: finalizing one never
//! affects another.
//!
//! # Key budget
//!
//! One round (an authenticated, encrypted message in each direction) costs
//! `init_key_size + final_key_size` summed over all four contexts.
//! [`Association::key_consumption`] reports this for a definition and
//! returns 0 for a definition that cannot be constructed, which is also the
//! cost of an all-`null` association. Use [`Association::key_budget`] when
//! the two cases must be told apart.

use serde::{Deserialize, Serialize};

use crate::{context::Context, engine, error::CryptoError, key::Key, scheme::NULL_SCHEME};

/// Scheme text for the four contexts of an association.
///
/// Each field defaults to `null` when absent from a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociationDefinition {
    /// Verifies messages received from the peer.
    pub authentication_incoming: String,
    /// Authenticates messages sent to the peer.
    pub authentication_outgoing: String,
    /// Decrypts material received from the peer.
    pub encryption_incoming: String,
    /// Encrypts material sent to the peer.
    pub encryption_outgoing: String,
}

impl AssociationDefinition {
    /// Definition with one scheme for both authentication directions and one
    /// for both encryption directions.
    pub fn symmetric(authentication: &str, encryption: &str) -> Self {
        Self {
            authentication_incoming: authentication.to_owned(),
            authentication_outgoing: authentication.to_owned(),
            encryption_incoming: encryption.to_owned(),
            encryption_outgoing: encryption.to_owned(),
        }
    }

    /// The same association seen from the peer: incoming and outgoing
    /// swapped.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self {
            authentication_incoming: self.authentication_outgoing.clone(),
            authentication_outgoing: self.authentication_incoming.clone(),
            encryption_incoming: self.encryption_outgoing.clone(),
            encryption_outgoing: self.encryption_incoming.clone(),
        }
    }
}

impl Default for AssociationDefinition {
    fn default() -> Self {
        Self::symmetric(NULL_SCHEME, NULL_SCHEME)
    }
}

/// Contexts for both directions of one concern.
#[derive(Debug)]
pub struct ContextPair {
    /// Applied to data received from the peer.
    pub incoming: Context,
    /// Applied to data sent to the peer.
    pub outgoing: Context,
}

impl ContextPair {
    fn key_cost(&self) -> u64 {
        [&self.incoming, &self.outgoing]
            .into_iter()
            .map(|context| (context.init_key_size() + context.final_key_size()) as u64)
            .sum()
    }
}

/// Authentication and encryption contexts for one pipeline link.
#[derive(Debug)]
pub struct Association {
    /// Authentication contexts.
    pub authentication: ContextPair,
    /// Encryption contexts.
    pub encryption: ContextPair,
}

impl Association {
    /// Build all four contexts.
    ///
    /// Fails on the first scheme that cannot be constructed; no partial
    /// association is returned.
    pub fn new(definition: &AssociationDefinition) -> Result<Self, CryptoError> {
        let association = Self {
            authentication: ContextPair {
                incoming: engine::create_from_str(&definition.authentication_incoming)?,
                outgoing: engine::create_from_str(&definition.authentication_outgoing)?,
            },
            encryption: ContextPair {
                incoming: engine::create_from_str(&definition.encryption_incoming)?,
                outgoing: engine::create_from_str(&definition.encryption_outgoing)?,
            },
        };

        tracing::debug!(
            authentication_incoming = association.authentication.incoming.name(),
            authentication_outgoing = association.authentication.outgoing.name(),
            encryption_incoming = association.encryption.incoming.name(),
            encryption_outgoing = association.encryption.outgoing.name(),
            "built crypto association"
        );

        Ok(association)
    }

    /// Key bytes one round costs under `definition`, or 0 if the definition
    /// cannot be constructed.
    pub fn key_consumption(definition: &AssociationDefinition) -> u64 {
        match Self::key_budget(definition) {
            Ok(cost) => cost,
            Err(err) => {
                tracing::debug!(error = %err, "association definition is unusable");
                0
            },
        }
    }

    /// Key bytes one round costs under `definition`, reporting why an
    /// unusable definition failed.
    pub fn key_budget(definition: &AssociationDefinition) -> Result<u64, CryptoError> {
        Ok(Self::new(definition)?.key_cost())
    }

    /// Key bytes one round costs with the contexts as they stand.
    pub fn key_cost(&self) -> u64 {
        self.authentication.key_cost() + self.encryption.key_cost()
    }

    /// Current scheme of every context, for persisting the association and
    /// resuming it after a restart.
    pub fn definition(&self) -> AssociationDefinition {
        AssociationDefinition {
            authentication_incoming: self.authentication.incoming.scheme().to_string(),
            authentication_outgoing: self.authentication.outgoing.scheme().to_string(),
            encryption_incoming: self.encryption.incoming.scheme().to_string(),
            encryption_outgoing: self.encryption.outgoing.scheme().to_string(),
        }
    }

    /// Encrypt with a fresh clone of the outgoing encryption context.
    pub fn encrypt(&self, plaintext: &[u8], key: &Key) -> Result<Vec<u8>, CryptoError> {
        run_once(&self.encryption.outgoing, plaintext, key)
    }

    /// Decrypt with a fresh clone of the incoming encryption context.
    pub fn decrypt(&self, ciphertext: &[u8], key: &Key) -> Result<Vec<u8>, CryptoError> {
        run_once(&self.encryption.incoming, ciphertext, key)
    }
}

fn run_once(context: &Context, data: &[u8], key: &Key) -> Result<Vec<u8>, CryptoError> {
    let mut working = context.fresh_clone();
    working.add(data)?;
    Ok(working.finalize(key)?.into_tag())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_definition_is_all_null() {
        let association = Association::new(&AssociationDefinition::default()).unwrap();
        assert!(association.authentication.incoming.is_null());
        assert!(association.encryption.outgoing.is_null());
        assert_eq!(association.key_cost(), 0);
    }

    #[test]
    fn construction_is_atomic() {
        let definition = AssociationDefinition {
            encryption_outgoing: "rot13".to_owned(),
            ..AssociationDefinition::symmetric("evhash-96", "xor")
        };
        assert!(matches!(
            Association::new(&definition),
            Err(CryptoError::UnknownAlgorithm { name }) if name == "rot13"
        ));
    }

    #[test]
    fn mirrored_swaps_directions() {
        let definition = AssociationDefinition {
            authentication_incoming: "evhash-32".into(),
            authentication_outgoing: "evhash-64".into(),
            encryption_incoming: "null".into(),
            encryption_outgoing: "xor".into(),
        };
        let mirrored = definition.mirrored();
        assert_eq!(mirrored.authentication_incoming, "evhash-64");
        assert_eq!(mirrored.encryption_incoming, "xor");
        assert_eq!(mirrored.mirrored(), definition);
    }

    #[test]
    fn encrypt_then_decrypt_recovers_plaintext() {
        let association =
            Association::new(&AssociationDefinition::symmetric("null", "xor")).unwrap();
        let pad = Key::from(vec![0x5A; 6]);

        let ciphertext = association.encrypt(b"secret", &pad).unwrap();
        assert_ne!(ciphertext, b"secret");
        assert_eq!(association.decrypt(&ciphertext, &pad).unwrap(), b"secret");

        // Working copies leave the canonical contexts untouched
        assert_eq!(association.encryption.outgoing.final_key_size(), 0);
    }

    #[test]
    fn definition_reflects_context_state() {
        let definition = AssociationDefinition::symmetric("evhash-32:01020304", "xor");
        let mut association = Association::new(&definition).unwrap();
        association.authentication.outgoing.add(b"partial").unwrap();

        let saved = association.definition();
        assert_eq!(saved.authentication_incoming, "evhash-32:01020304");
        assert_ne!(saved.authentication_outgoing, saved.authentication_incoming);

        let resumed = Association::new(&saved).unwrap();
        assert_eq!(resumed.definition(), saved);
    }

    #[test]
    fn definition_deserializes_with_defaults() {
        let definition: AssociationDefinition =
            serde_json::from_str(r#"{"encryption_outgoing": "xor"}"#).unwrap();
        assert_eq!(definition.encryption_outgoing, "xor");
        assert_eq!(definition.authentication_incoming, "null");
    }
}
