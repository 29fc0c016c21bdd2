use crate::des::{cbc_hash, keyed_checksum, DesHash, DES_CONFOUNDER_SIZE};
use crate::{ChecksumType, CryptoProvider, EncryptionKey, EncryptionType, KerberosCryptoError, KerberosCryptoResult};

/// [`CryptoProvider`] backed by the RFC 3961 simple DES profiles.
///
/// Confounders are drawn from the thread-local, OS-seeded generator of `rand`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RfcCryptoProvider;

impl RfcCryptoProvider {
    pub fn new() -> Self {
        Self
    }
}

fn confounder() -> [u8; DES_CONFOUNDER_SIZE] {
    rand::random()
}

fn encryption_hash(etype: EncryptionType) -> KerberosCryptoResult<DesHash> {
    match etype {
        EncryptionType::DesCbcMd4 => Ok(DesHash::Md4),
        EncryptionType::DesCbcMd5 => Ok(DesHash::Md5),
        other => Err(KerberosCryptoError::AlgorithmIdentifier(other.into())),
    }
}

impl CryptoProvider for RfcCryptoProvider {
    fn sign(&self, key: &EncryptionKey, cksumtype: ChecksumType, data: &[u8]) -> KerberosCryptoResult<Vec<u8>> {
        match cksumtype {
            ChecksumType::RsaMd4Des => keyed_checksum::checksum(key.key_value(), DesHash::Md4, data, confounder()),
            ChecksumType::RsaMd5Des => keyed_checksum::checksum(key.key_value(), DesHash::Md5, data, confounder()),
            ChecksumType::RsaMd4 => Ok(DesHash::Md4.digest(&[data])),
            ChecksumType::RsaMd5 => Ok(DesHash::Md5.digest(&[data])),
            other => Err(KerberosCryptoError::AlgorithmIdentifier(other.into())),
        }
    }

    fn verify(
        &self,
        key: &EncryptionKey,
        cksumtype: ChecksumType,
        checksum: &[u8],
        data: &[u8],
    ) -> KerberosCryptoResult<bool> {
        match cksumtype {
            ChecksumType::RsaMd4Des => keyed_checksum::verify(key.key_value(), DesHash::Md4, data, checksum),
            ChecksumType::RsaMd5Des => keyed_checksum::verify(key.key_value(), DesHash::Md5, data, checksum),
            ChecksumType::RsaMd4 => Ok(DesHash::Md4.digest(&[data]) == checksum),
            ChecksumType::RsaMd5 => Ok(DesHash::Md5.digest(&[data]) == checksum),
            other => Err(KerberosCryptoError::AlgorithmIdentifier(other.into())),
        }
    }

    fn encrypt(&self, key: &EncryptionKey, etype: EncryptionType, plaintext: &[u8]) -> KerberosCryptoResult<Vec<u8>> {
        let hash = encryption_hash(etype)?;
        cbc_hash::encrypt_message(key.key_value(), hash, plaintext, confounder())
    }

    fn decrypt(
        &self,
        key: &EncryptionKey,
        etype: EncryptionType,
        ciphertext: &[u8],
    ) -> KerberosCryptoResult<Vec<u8>> {
        let hash = encryption_hash(etype)?;
        cbc_hash::decrypt_message(key.key_value(), hash, ciphertext)
    }
}
