use zeroize::Zeroizing;

use super::{decrypt_des, encrypt_des, DesHash, DES_BLOCK_SIZE, DES_CONFOUNDER_SIZE, HASH_SIZE};
use crate::{KerberosCryptoError, KerberosCryptoResult};

/// confounder followed by the integrity checksum
pub const HEADER_SIZE: usize = DES_CONFOUNDER_SIZE + HASH_SIZE;

//= [DES with MD5 / MD4](https://datatracker.ietf.org/doc/html/rfc3961#section-6.2.1) =//
pub fn encrypt_message(
    key: &[u8],
    hash: DesHash,
    payload: &[u8],
    // conf = Random string of length c
    confounder: [u8; DES_CONFOUNDER_SIZE],
) -> KerberosCryptoResult<Vec<u8>> {
    let mut data_to_encrypt = Zeroizing::new(vec![0; HEADER_SIZE + payload.len()]);

    data_to_encrypt[..DES_CONFOUNDER_SIZE].copy_from_slice(&confounder);
    data_to_encrypt[HEADER_SIZE..].copy_from_slice(payload);

    let pad_len = (DES_BLOCK_SIZE - (data_to_encrypt.len() % DES_BLOCK_SIZE)) % DES_BLOCK_SIZE;
    // pad
    let padded_len = data_to_encrypt.len() + pad_len;
    data_to_encrypt.resize(padded_len, 0);

    // checksum computed with the checksum field itself zeroed
    let checksum = hash.digest(&[data_to_encrypt.as_slice()]);
    data_to_encrypt[DES_CONFOUNDER_SIZE..HEADER_SIZE].copy_from_slice(&checksum);

    encrypt_des(key, &data_to_encrypt)
}

/// Returns `msg | pad`.
pub fn decrypt_message(key: &[u8], hash: DesHash, cipher_data: &[u8]) -> KerberosCryptoResult<Vec<u8>> {
    if cipher_data.len() < HEADER_SIZE {
        return Err(KerberosCryptoError::CipherLength(cipher_data.len(), HEADER_SIZE));
    }

    let mut plaintext = Zeroizing::new(decrypt_des(key, cipher_data)?);

    let checksum = plaintext[DES_CONFOUNDER_SIZE..HEADER_SIZE].to_vec();
    plaintext[DES_CONFOUNDER_SIZE..HEADER_SIZE].fill(0);

    let calculated_checksum = hash.digest(&[plaintext.as_slice()]);

    if calculated_checksum != checksum {
        return Err(KerberosCryptoError::IntegrityCheck);
    }

    Ok(plaintext[HEADER_SIZE..].to_vec())
}
