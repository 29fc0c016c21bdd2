use zeroize::Zeroizing;

use super::{check_key, decrypt_des, encrypt_des, DesHash, DES_CONFOUNDER_SIZE, HASH_SIZE};
use crate::KerberosCryptoResult;

/// The key is XORed with this byte before use, so a checksum can't be confused with a ciphertext
pub const KEY_VARIANT_MASK: u8 = 0xf0;

/// confounder followed by the hash, encrypted
pub const CHECKSUM_SIZE: usize = DES_CONFOUNDER_SIZE + HASH_SIZE;

fn variant_key(key: &[u8]) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(key.iter().map(|byte| byte ^ KEY_VARIANT_MASK).collect())
}

//= [RSA MD5 Cryptographic Checksum Using DES](https://datatracker.ietf.org/doc/html/rfc3961#section-6.2.5) =//
pub fn checksum(
    key: &[u8],
    hash: DesHash,
    payload: &[u8],
    confounder: [u8; DES_CONFOUNDER_SIZE],
) -> KerberosCryptoResult<Vec<u8>> {
    check_key(key)?;

    let mut data_to_encrypt = Vec::with_capacity(CHECKSUM_SIZE);
    data_to_encrypt.extend_from_slice(&confounder);
    data_to_encrypt.extend_from_slice(&hash.digest(&[confounder.as_slice(), payload]));

    encrypt_des(&variant_key(key), &data_to_encrypt)
}

pub fn verify(key: &[u8], hash: DesHash, payload: &[u8], checksum: &[u8]) -> KerberosCryptoResult<bool> {
    check_key(key)?;

    if checksum.len() != CHECKSUM_SIZE {
        return Ok(false);
    }

    let decrypted = decrypt_des(&variant_key(key), checksum)?;
    let (confounder, digest) = decrypted.split_at(DES_CONFOUNDER_SIZE);

    Ok(hash.digest(&[confounder, payload]) == digest)
}
