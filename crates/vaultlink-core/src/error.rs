//! Error types for the Vaultlink core library

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Pairing code could not be decoded into a session
    #[error("Malformed pairing code: {0}")]
    MalformedCode(String),

    /// Pairing code declared a protocol revision this build does not know
    #[error("Unsupported pairing code version: {0}")]
    UnsupportedVersion(u32),

    /// Key or signature material could not be parsed
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Signature check failed against the embedded key material
    #[error("Signature verification failed")]
    SignatureVerificationFailed,
}
