//! Factory turning schemes into live contexts.
//!
//! Dispatch is an exhaustive match on the scheme's algorithm family and
//! variant. Syntax errors are caught by [`Scheme::parse`]; this is where an
//! unregistered name, a wrong-sized initial key or unusable state is
//! reported.

use crate::{
    context::{Algorithm, Context, Evhash, Xor},
    error::CryptoError,
    scheme::Scheme,
};

pub use crate::context::ALGORITHMS;

/// Build a context from a scheme.
pub fn create(scheme: &Scheme) -> Result<Context, CryptoError> {
    let algorithm = match (scheme.algorithm(), scheme.variant()) {
        ("null", None) => {
            reject_state(scheme)?;
            Algorithm::Null
        },
        ("xor", None) => {
            reject_state(scheme)?;
            Algorithm::Xor(Xor::new())
        },
        ("evhash", Some(variant)) => {
            Algorithm::Evhash(Evhash::new(variant, scheme.init_key(), scheme.state())?)
        },
        _ => {
            tracing::debug!(name = scheme.name(), "no algorithm registered");
            return Err(CryptoError::UnknownAlgorithm { name: scheme.name().to_owned() });
        },
    };

    tracing::trace!(name = scheme.name(), "created crypto context");
    Ok(Context::new(scheme.init_key().clone(), algorithm))
}

/// Parse scheme text and build a context from it.
pub fn create_from_str(text: &str) -> Result<Context, CryptoError> {
    create(&Scheme::parse(text)?)
}

/// Whether a context algorithm is registered under `name`.
pub fn is_known(name: &str) -> bool {
    ALGORITHMS.contains(&name)
}

fn reject_state(scheme: &Scheme) -> Result<(), CryptoError> {
    if scheme.state().is_empty() {
        Ok(())
    } else {
        Err(CryptoError::InvalidState {
            algorithm: scheme.name().to_owned(),
            reason: "algorithm is stateless".to_owned(),
        })
    }
}
