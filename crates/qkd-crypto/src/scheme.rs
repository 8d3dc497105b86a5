//! Crypto scheme descriptors.
//!
//! A [`Scheme`] names an algorithm, optionally with the initial key and
//! resumable state of a live context. Its text form is shared with peer
//! processes built independently, so the grammar is fixed:
//!
//! ```text
//! scheme      := name ["-" variant] [":" hexInitKey [":" hexState]]
//! name        := [A-Za-z0-9_]+
//! variant     := [A-Za-z0-9_]+
//! hexInitKey  := hex string, even length
//! hexState    := hex string, even length
//! ```
//!
//! The canonical form always carries the `:` after the name and emits
//! lower-case hex, e.g. `evhash-96:00112233445566778899aabb`. Parsing only
//! checks syntax; whether an algorithm answers to the name is decided by
//! [`crate::engine::create`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{error::ParseError, key::Key};

/// Name of the scheme that performs no cryptographic operation.
pub const NULL_SCHEME: &str = "null";

/// Immutable algorithm descriptor: `{name, init_key, state}`.
#[derive(Clone, Debug)]
pub struct Scheme {
    name: String,
    init_key: Key,
    state: Vec<u8>,
}

impl Scheme {
    /// Scheme with the given name, no initial key and no state.
    ///
    /// The name must follow the same grammar [`Scheme::parse`] accepts, so
    /// every scheme built this way survives a trip through its text form.
    pub fn new(name: impl Into<String>) -> Result<Self, ParseError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self::named_unchecked(name))
    }

    /// Caller guarantees `name` is a registered algorithm name.
    pub(crate) fn named_unchecked(name: impl Into<String>) -> Self {
        Self { name: name.into(), init_key: Key::null(), state: Vec::new() }
    }

    /// Replace the initial key.
    #[must_use]
    pub fn with_init_key(mut self, init_key: Key) -> Self {
        self.init_key = init_key;
        self
    }

    /// Replace the resumable state.
    #[must_use]
    pub fn with_state(mut self, state: Vec<u8>) -> Self {
        self.state = state;
        self
    }

    /// Parse scheme text.
    ///
    /// Empty (or all-whitespace) text means "unspecified" and yields the
    /// `null` scheme.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::default());
        }

        let sections: Vec<&str> = text.split(':').collect();
        if sections.len() > 3 {
            return Err(ParseError::TooManySections { count: sections.len() });
        }

        let name = sections[0];
        validate_name(name)?;

        let init_key = match sections.get(1) {
            Some(hex) => decode_hex(hex, "init key")?,
            None => Vec::new(),
        };
        let state = match sections.get(2) {
            Some(hex) => decode_hex(hex, "state")?,
            None => Vec::new(),
        };

        Ok(Self { name: name.to_owned(), init_key: Key::new(0, init_key), state })
    }

    /// Full name including the variant (e.g. `evhash-96`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Algorithm family (the part before `-`).
    pub fn algorithm(&self) -> &str {
        self.name.split_once('-').map_or(self.name.as_str(), |(algorithm, _)| algorithm)
    }

    /// Variant (the part after `-`), if any.
    pub fn variant(&self) -> Option<&str> {
        self.name.split_once('-').map(|(_, variant)| variant)
    }

    /// Initial key consumed when a context is built from this scheme.
    pub fn init_key(&self) -> &Key {
        &self.init_key
    }

    /// Opaque resumable state of a live context.
    pub fn state(&self) -> &[u8] {
        &self.state
    }

    /// True for the no-op `null` scheme.
    pub fn is_null(&self) -> bool {
        self.name == NULL_SCHEME
    }
}

impl Default for Scheme {
    fn default() -> Self {
        Self::named_unchecked(NULL_SCHEME)
    }
}

// Key ids are not part of the text form, so equality covers only what
// survives a round trip.
impl PartialEq for Scheme {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.init_key.data() == other.init_key.data()
            && self.state == other.state
    }
}

impl Eq for Scheme {}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, hex::encode(self.init_key.data()))?;
        if !self.state.is_empty() {
            write!(f, ":{}", hex::encode(&self.state))?;
        }
        Ok(())
    }
}

impl FromStr for Scheme {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Scheme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Scheme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(de::Error::custom)
    }
}

fn validate_name(name: &str) -> Result<(), ParseError> {
    if name.is_empty() {
        return Err(ParseError::EmptyName);
    }

    let (algorithm, variant) = match name.split_once('-') {
        Some((algorithm, variant)) => (algorithm, Some(variant)),
        None => (name, None),
    };

    if algorithm.is_empty() {
        return Err(ParseError::EmptyName);
    }
    if variant == Some("") {
        return Err(ParseError::EmptyVariant { name: name.to_owned() });
    }

    // The separating '-' is the only character allowed outside the word set;
    // a second '-' lands in the variant and is rejected there.
    let separator = algorithm.len();
    for (position, character) in name.char_indices() {
        let is_word = character.is_ascii_alphanumeric() || character == '_';
        if !is_word && position != separator {
            return Err(ParseError::InvalidName { name: name.to_owned(), character, position });
        }
    }

    Ok(())
}

fn decode_hex(text: &str, section: &'static str) -> Result<Vec<u8>, ParseError> {
    hex::decode(text).map_err(|e| ParseError::InvalidHex { section, reason: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_name_only() {
        let scheme = Scheme::parse("evhash-96").unwrap();
        assert_eq!(scheme.name(), "evhash-96");
        assert_eq!(scheme.algorithm(), "evhash");
        assert_eq!(scheme.variant(), Some("96"));
        assert!(scheme.init_key().is_null());
        assert!(scheme.state().is_empty());
    }

    #[test]
    fn parse_key_and_state() {
        let scheme = Scheme::parse("xor:00ff:a1B2").unwrap();
        assert_eq!(scheme.name(), "xor");
        assert_eq!(scheme.variant(), None);
        assert_eq!(scheme.init_key().data(), &[0x00, 0xFF]);
        assert_eq!(scheme.state(), &[0xA1, 0xB2]);
    }

    #[test]
    fn canonical_form() {
        assert_eq!(Scheme::parse("null").unwrap().to_string(), "null:");
        assert_eq!(Scheme::parse("evhash-32:DEADBEEF").unwrap().to_string(), "evhash-32:deadbeef");
        assert_eq!(Scheme::parse("evhash-32::0102").unwrap().to_string(), "evhash-32::0102");
    }

    #[test]
    fn round_trip_through_text() {
        let scheme = Scheme::new("evhash-64")
            .unwrap()
            .with_init_key(Key::new(42, vec![1, 2, 3, 4, 5, 6, 7, 8]))
            .with_state(vec![9, 9]);
        assert_eq!(Scheme::parse(&scheme.to_string()).unwrap(), scheme);
    }

    #[test]
    fn new_rejects_names_text_cannot_carry() {
        assert_eq!(Scheme::new(""), Err(ParseError::EmptyName));
        assert!(matches!(Scheme::new("evhash-96:ab"), Err(ParseError::InvalidName { .. })));
        assert!(matches!(Scheme::new("bad name"), Err(ParseError::InvalidName { .. })));
        assert!(matches!(Scheme::new("a-b-c"), Err(ParseError::InvalidName { .. })));
        assert!(matches!(Scheme::new("evhash-"), Err(ParseError::EmptyVariant { .. })));
        assert_eq!(Scheme::new("evhash-96").unwrap(), Scheme::parse("evhash-96").unwrap());
    }

    #[test]
    fn empty_text_is_null() {
        assert!(Scheme::parse("").unwrap().is_null());
        assert!(Scheme::parse("   ").unwrap().is_null());
        assert_eq!(Scheme::default(), Scheme::parse("null:").unwrap());
    }

    #[test]
    fn unknown_names_parse() {
        let scheme = Scheme::parse("rot13").unwrap();
        assert_eq!(scheme.name(), "rot13");
    }

    #[test]
    fn reject_malformed_text() {
        assert_eq!(Scheme::parse(":00"), Err(ParseError::EmptyName));
        assert_eq!(Scheme::parse("-96"), Err(ParseError::EmptyName));
        assert!(matches!(Scheme::parse("evhash-"), Err(ParseError::EmptyVariant { .. })));
        assert!(matches!(
            Scheme::parse("ev hash"),
            Err(ParseError::InvalidName { character: ' ', position: 2, .. })
        ));
        assert!(matches!(
            Scheme::parse("evhash-96-2"),
            Err(ParseError::InvalidName { character: '-', position: 9, .. })
        ));
        assert!(matches!(
            Scheme::parse("xor:abc"),
            Err(ParseError::InvalidHex { section: "init key", .. })
        ));
        assert!(matches!(
            Scheme::parse("xor:ab:zz"),
            Err(ParseError::InvalidHex { section: "state", .. })
        ));
        assert_eq!(Scheme::parse("xor:ab:cd:ef"), Err(ParseError::TooManySections { count: 4 }));
    }

    #[test]
    fn serde_uses_text_form() {
        let scheme = Scheme::parse("evhash-32:01020304").unwrap();
        let json = serde_json::to_string(&scheme).unwrap();
        assert_eq!(json, "\"evhash-32:01020304\"");

        let back: Scheme = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scheme);
        assert!(serde_json::from_str::<Scheme>("\"bad name\"").is_err());
    }
}
