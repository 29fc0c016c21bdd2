//! [DES-based encryption and checksum profiles](https://datatracker.ietf.org/doc/html/rfc3961#section-6.2)

pub mod cbc_hash;
pub mod keyed_checksum;

use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut as _, BlockEncryptMut as _, KeyIvInit as _};
use md5::digest::Digest;

use crate::{KerberosCryptoError, KerberosCryptoResult};

/// message block size = 8 bytes
pub const DES_BLOCK_SIZE: usize = 8;
/// protocol key format = 8 bytes
pub const DES_KEY_SIZE: usize = 8;
/// confounder length = 8 bytes
pub const DES_CONFOUNDER_SIZE: usize = 8;
/// MD4 and MD5 produce 16 bytes
pub const HASH_SIZE: usize = 16;

type DesCbcEncryptor = cbc::Encryptor<des::Des>;
type DesCbcDecryptor = cbc::Decryptor<des::Des>;

/// Unkeyed hash function plugged into the DES profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesHash {
    Md4,
    Md5,
}

impl DesHash {
    /// Hashes the concatenation of `parts`.
    pub fn digest(self, parts: &[&[u8]]) -> Vec<u8> {
        match self {
            Self::Md4 => digest_parts::<md4::Md4>(parts),
            Self::Md5 => digest_parts::<md5::Md5>(parts),
        }
    }
}

fn digest_parts<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();

    for part in parts {
        hasher.update(part);
    }

    hasher.finalize().to_vec()
}

pub fn check_key(key: &[u8]) -> KerberosCryptoResult<()> {
    if key.len() != DES_KEY_SIZE {
        return Err(KerberosCryptoError::KeyLength(key.len(), DES_KEY_SIZE));
    }

    Ok(())
}

fn check_alignment(data: &[u8]) -> KerberosCryptoResult<()> {
    if data.len() % DES_BLOCK_SIZE != 0 {
        return Err(KerberosCryptoError::BlockAlignment(data.len(), DES_BLOCK_SIZE));
    }

    Ok(())
}

/// DES in CBC mode, zero IV, no padding. `payload` must be block aligned.
pub fn encrypt_des(key: &[u8], payload: &[u8]) -> KerberosCryptoResult<Vec<u8>> {
    check_key(key)?;
    check_alignment(payload)?;

    // RFC 3961: initial cipher state. All bits zero
    let iv = [0_u8; DES_BLOCK_SIZE];

    let encryptor = DesCbcEncryptor::new_from_slices(key, &iv)
        .map_err(|_| KerberosCryptoError::KeyLength(key.len(), DES_KEY_SIZE))?;

    let mut buffer = payload.to_vec();
    let payload_len = buffer.len();
    encryptor.encrypt_padded_mut::<NoPadding>(&mut buffer, payload_len)?;

    Ok(buffer)
}

/// Inverse of [`encrypt_des`].
pub fn decrypt_des(key: &[u8], cipher_data: &[u8]) -> KerberosCryptoResult<Vec<u8>> {
    check_key(key)?;
    check_alignment(cipher_data)?;

    let iv = [0_u8; DES_BLOCK_SIZE];

    let decryptor = DesCbcDecryptor::new_from_slices(key, &iv)
        .map_err(|_| KerberosCryptoError::KeyLength(key.len(), DES_KEY_SIZE))?;

    let mut buffer = cipher_data.to_vec();
    decryptor.decrypt_padded_mut::<NoPadding>(&mut buffer)?;

    Ok(buffer)
}
