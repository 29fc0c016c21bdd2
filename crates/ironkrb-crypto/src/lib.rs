#![doc = include_str!("../README.md")]

pub mod des;
mod key;
mod provider;
mod suite;

use cbc::cipher::block_padding::UnpadError;
use cbc::cipher::inout::PadError;
use thiserror::Error;

pub use self::key::EncryptionKey;
pub use self::provider::RfcCryptoProvider;
pub use self::suite::{cksum_types, etypes, ChecksumType, EncryptionType};

#[derive(Error, Debug)]
pub enum KerberosCryptoError {
    #[error("Invalid key length: {0}. Expected: {1}")]
    KeyLength(usize, usize),
    #[error("Invalid cipher length: {0}. Expected at least: {1}")]
    CipherLength(usize, usize),
    #[error("Invalid data length: {0}. Expected a multiple of: {1}")]
    BlockAlignment(usize, usize),
    #[error("Invalid algorithm identifier: {0}")]
    AlgorithmIdentifier(i32),
    #[error("Bad integrity: calculated checksum is different than provided")]
    IntegrityCheck,
    #[error("Padding error: {0:?}")]
    CipherUnpad(UnpadError),
    #[error("Padding error: {0:?}")]
    CipherPad(PadError),
}

impl From<UnpadError> for KerberosCryptoError {
    fn from(err: UnpadError) -> Self {
        Self::CipherUnpad(err)
    }
}

impl From<PadError> for KerberosCryptoError {
    fn from(err: PadError) -> Self {
        Self::CipherPad(err)
    }
}

pub type KerberosCryptoResult<T> = Result<T, KerberosCryptoError>;

/// Keyed checksum and encryption operations used by the message layer.
///
/// Key usage numbers are not part of this interface: the DES profiles ignore them.
pub trait CryptoProvider: Send + Sync {
    /// Computes a checksum of `cksumtype` over `data`.
    fn sign(&self, key: &EncryptionKey, cksumtype: ChecksumType, data: &[u8]) -> KerberosCryptoResult<Vec<u8>>;

    /// Checks `checksum` against `data`.
    ///
    /// A checksum of the wrong size is reported as `Ok(false)` rather than an error.
    fn verify(
        &self,
        key: &EncryptionKey,
        cksumtype: ChecksumType,
        checksum: &[u8],
        data: &[u8],
    ) -> KerberosCryptoResult<bool>;

    fn encrypt(&self, key: &EncryptionKey, etype: EncryptionType, plaintext: &[u8]) -> KerberosCryptoResult<Vec<u8>>;

    /// Decrypts `ciphertext` and checks its integrity.
    ///
    /// The returned plaintext may carry trailing padding.
    fn decrypt(&self, key: &EncryptionKey, etype: EncryptionType, ciphertext: &[u8])
        -> KerberosCryptoResult<Vec<u8>>;
}
