use core::fmt;

use crate::KerberosCryptoError;

pub mod etypes {
    pub const NULL: i32 = 0;
    pub const DES_CBC_CRC: i32 = 1;
    pub const DES_CBC_MD4: i32 = 2;
    pub const DES_CBC_MD5: i32 = 3;
    pub const DES3_CBC_MD5: i32 = 5;
    pub const DES3_CBC_SHA1: i32 = 7;
}

pub mod cksum_types {
    pub const CRC32: i32 = 1;
    pub const RSA_MD4: i32 = 2;
    pub const RSA_MD4_DES: i32 = 3;
    pub const DES_MAC: i32 = 4;
    pub const DES_MAC_K: i32 = 5;
    pub const RSA_MD4_DES_K: i32 = 6;
    pub const RSA_MD5: i32 = 7;
    pub const RSA_MD5_DES: i32 = 8;
    pub const RSA_MD5_DES3: i32 = 9;
    pub const HMAC_SHA1_DES3: i32 = 10;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncryptionType {
    Null,
    DesCbcCrc,
    DesCbcMd4,
    DesCbcMd5,
    Des3CbcMd5,
    Des3CbcSha1,
}

impl EncryptionType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::DesCbcCrc => "des-cbc-crc",
            Self::DesCbcMd4 => "des-cbc-md4",
            Self::DesCbcMd5 => "des-cbc-md5",
            Self::Des3CbcMd5 => "des3-cbc-md5",
            Self::Des3CbcSha1 => "des3-cbc-sha1",
        }
    }
}

impl fmt::Display for EncryptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i32> for EncryptionType {
    type Error = KerberosCryptoError;

    fn try_from(identifier: i32) -> Result<Self, Self::Error> {
        match identifier {
            etypes::NULL => Ok(Self::Null),
            etypes::DES_CBC_CRC => Ok(Self::DesCbcCrc),
            etypes::DES_CBC_MD4 => Ok(Self::DesCbcMd4),
            etypes::DES_CBC_MD5 => Ok(Self::DesCbcMd5),
            etypes::DES3_CBC_MD5 => Ok(Self::Des3CbcMd5),
            etypes::DES3_CBC_SHA1 => Ok(Self::Des3CbcSha1),
            _ => Err(KerberosCryptoError::AlgorithmIdentifier(identifier)),
        }
    }
}

impl From<EncryptionType> for i32 {
    fn from(etype: EncryptionType) -> Self {
        match etype {
            EncryptionType::Null => etypes::NULL,
            EncryptionType::DesCbcCrc => etypes::DES_CBC_CRC,
            EncryptionType::DesCbcMd4 => etypes::DES_CBC_MD4,
            EncryptionType::DesCbcMd5 => etypes::DES_CBC_MD5,
            EncryptionType::Des3CbcMd5 => etypes::DES3_CBC_MD5,
            EncryptionType::Des3CbcSha1 => etypes::DES3_CBC_SHA1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumType {
    Crc32,
    RsaMd4,
    RsaMd4Des,
    DesMac,
    DesMacK,
    RsaMd4DesK,
    RsaMd5,
    RsaMd5Des,
    RsaMd5Des3,
    HmacSha1Des3,
}

impl ChecksumType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Crc32 => "crc32",
            Self::RsaMd4 => "rsa-md4",
            Self::RsaMd4Des => "rsa-md4-des",
            Self::DesMac => "des-mac",
            Self::DesMacK => "des-mac-k",
            Self::RsaMd4DesK => "rsa-md4-des-k",
            Self::RsaMd5 => "rsa-md5",
            Self::RsaMd5Des => "rsa-md5-des",
            Self::RsaMd5Des3 => "rsa-md5-des3",
            Self::HmacSha1Des3 => "hmac-sha1-des3",
        }
    }

    /// Whether computing the checksum requires a key.
    pub fn is_keyed(self) -> bool {
        !matches!(self, Self::Crc32 | Self::RsaMd4 | Self::RsaMd5)
    }
}

impl fmt::Display for ChecksumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i32> for ChecksumType {
    type Error = KerberosCryptoError;

    fn try_from(identifier: i32) -> Result<Self, Self::Error> {
        match identifier {
            cksum_types::CRC32 => Ok(Self::Crc32),
            cksum_types::RSA_MD4 => Ok(Self::RsaMd4),
            cksum_types::RSA_MD4_DES => Ok(Self::RsaMd4Des),
            cksum_types::DES_MAC => Ok(Self::DesMac),
            cksum_types::DES_MAC_K => Ok(Self::DesMacK),
            cksum_types::RSA_MD4_DES_K => Ok(Self::RsaMd4DesK),
            cksum_types::RSA_MD5 => Ok(Self::RsaMd5),
            cksum_types::RSA_MD5_DES => Ok(Self::RsaMd5Des),
            cksum_types::RSA_MD5_DES3 => Ok(Self::RsaMd5Des3),
            cksum_types::HMAC_SHA1_DES3 => Ok(Self::HmacSha1Des3),
            _ => Err(KerberosCryptoError::AlgorithmIdentifier(identifier)),
        }
    }
}

impl From<ChecksumType> for i32 {
    fn from(cksumtype: ChecksumType) -> Self {
        match cksumtype {
            ChecksumType::Crc32 => cksum_types::CRC32,
            ChecksumType::RsaMd4 => cksum_types::RSA_MD4,
            ChecksumType::RsaMd4Des => cksum_types::RSA_MD4_DES,
            ChecksumType::DesMac => cksum_types::DES_MAC,
            ChecksumType::DesMacK => cksum_types::DES_MAC_K,
            ChecksumType::RsaMd4DesK => cksum_types::RSA_MD4_DES_K,
            ChecksumType::RsaMd5 => cksum_types::RSA_MD5,
            ChecksumType::RsaMd5Des => cksum_types::RSA_MD5_DES,
            ChecksumType::RsaMd5Des3 => cksum_types::RSA_MD5_DES3,
            ChecksumType::HmacSha1Des3 => cksum_types::HMAC_SHA1_DES3,
        }
    }
}
