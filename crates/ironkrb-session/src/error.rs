use core::fmt;

use ironkrb_asn1::der;
use ironkrb_crypto::KerberosCryptoError;

/// Error codes of RFC 4120 section 7.5.9 an application may answer with in a `KRB-ERROR`
pub mod krb_error_codes {
    pub const KRB_AP_ERR_BAD_INTEGRITY: i32 = 31;
    pub const KRB_AP_ERR_REPEAT: i32 = 34;
    pub const KRB_AP_ERR_SKEW: i32 = 37;
    pub const KRB_AP_ERR_BADADDR: i32 = 38;
    pub const KRB_AP_ERR_BADVERSION: i32 = 39;
    pub const KRB_AP_ERR_MSG_TYPE: i32 = 40;
    pub const KRB_AP_ERR_MODIFIED: i32 = 41;
    pub const KRB_AP_ERR_BADORDER: i32 = 42;
    pub const KRB_AP_ERR_INAPP_CKSUM: i32 = 50;
}

#[non_exhaustive]
#[derive(Debug)]
pub enum KrbMsgErrorKind {
    Encode(der::Error),
    Decode(der::Error),
    BadVersion { pvno: i32 },
    WrongMsgType { msg_type: i32 },
    InappropriateChecksum { cksumtype: i32 },
    BadAddress,
    ClockSkew,
    Replay,
    OutOfOrder { expected: u32, received: Option<u32> },
    BadChecksum,
    DecryptError,
    Crypto(KerberosCryptoError),
    General,
}

impl KrbMsgErrorKind {
    /// Whether the error rejects an inbound message, as opposed to a failure producing one.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Encode(_) | Self::Crypto(_) | Self::General)
    }

    /// The matching `KRB-ERROR` code, if any.
    ///
    /// Malformed input and local failures have no dedicated code.
    pub fn krb_error_code(&self) -> Option<i32> {
        use self::krb_error_codes::{
            KRB_AP_ERR_BADADDR, KRB_AP_ERR_BADORDER, KRB_AP_ERR_BADVERSION, KRB_AP_ERR_BAD_INTEGRITY,
            KRB_AP_ERR_INAPP_CKSUM, KRB_AP_ERR_MODIFIED, KRB_AP_ERR_MSG_TYPE, KRB_AP_ERR_REPEAT, KRB_AP_ERR_SKEW,
        };

        match self {
            Self::BadVersion { .. } => Some(KRB_AP_ERR_BADVERSION),
            Self::WrongMsgType { .. } => Some(KRB_AP_ERR_MSG_TYPE),
            Self::InappropriateChecksum { .. } => Some(KRB_AP_ERR_INAPP_CKSUM),
            Self::BadAddress => Some(KRB_AP_ERR_BADADDR),
            Self::ClockSkew => Some(KRB_AP_ERR_SKEW),
            Self::Replay => Some(KRB_AP_ERR_REPEAT),
            Self::OutOfOrder { .. } => Some(KRB_AP_ERR_BADORDER),
            Self::BadChecksum => Some(KRB_AP_ERR_MODIFIED),
            Self::DecryptError => Some(KRB_AP_ERR_BAD_INTEGRITY),
            Self::Encode(_) | Self::Decode(_) | Self::Crypto(_) | Self::General => None,
        }
    }
}

impl fmt::Display for KrbMsgErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            KrbMsgErrorKind::Encode(_) => write!(f, "encode error"),
            KrbMsgErrorKind::Decode(_) => write!(f, "decode error"),
            KrbMsgErrorKind::BadVersion { pvno } => write!(f, "unsupported protocol version {pvno}"),
            KrbMsgErrorKind::WrongMsgType { msg_type } => write!(f, "unexpected message type {msg_type}"),
            KrbMsgErrorKind::InappropriateChecksum { cksumtype } => {
                write!(f, "inappropriate checksum type {cksumtype}")
            }
            KrbMsgErrorKind::BadAddress => write!(f, "address mismatch"),
            KrbMsgErrorKind::ClockSkew => write!(f, "clock skew too great"),
            KrbMsgErrorKind::Replay => write!(f, "message is a replay"),
            KrbMsgErrorKind::OutOfOrder {
                expected,
                received: Some(received),
            } => write!(f, "out of order: expected sequence number {expected}, got {received}"),
            KrbMsgErrorKind::OutOfOrder {
                expected,
                received: None,
            } => write!(f, "out of order: expected sequence number {expected}, got none"),
            KrbMsgErrorKind::BadChecksum => write!(f, "checksum verification failed"),
            KrbMsgErrorKind::DecryptError => write!(f, "decryption failed"),
            KrbMsgErrorKind::Crypto(_) => write!(f, "cryptographic operation failed"),
            KrbMsgErrorKind::General => write!(f, "general error"),
        }
    }
}

impl std::error::Error for KrbMsgErrorKind {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self {
            KrbMsgErrorKind::Encode(e) => Some(e),
            KrbMsgErrorKind::Decode(e) => Some(e),
            KrbMsgErrorKind::Crypto(e) => Some(e),
            KrbMsgErrorKind::BadVersion { .. }
            | KrbMsgErrorKind::WrongMsgType { .. }
            | KrbMsgErrorKind::InappropriateChecksum { .. }
            | KrbMsgErrorKind::BadAddress
            | KrbMsgErrorKind::ClockSkew
            | KrbMsgErrorKind::Replay
            | KrbMsgErrorKind::OutOfOrder { .. }
            | KrbMsgErrorKind::BadChecksum
            | KrbMsgErrorKind::DecryptError
            | KrbMsgErrorKind::General => None,
        }
    }
}

pub type KrbMsgError = ironkrb_error::Error<KrbMsgErrorKind>;

pub type KrbMsgResult<T> = Result<T, KrbMsgError>;

pub trait KrbMsgErrorExt {
    fn encode(context: &'static str, error: der::Error) -> Self;
    fn decode(context: &'static str, error: der::Error) -> Self;
    fn crypto(context: &'static str, error: KerberosCryptoError) -> Self;
    fn rejected(context: &'static str, kind: KrbMsgErrorKind) -> Self;
    fn general(context: &'static str) -> Self;
}

impl KrbMsgErrorExt for KrbMsgError {
    fn encode(context: &'static str, error: der::Error) -> Self {
        Self::new(context, KrbMsgErrorKind::Encode(error))
    }

    fn decode(context: &'static str, error: der::Error) -> Self {
        Self::new(context, KrbMsgErrorKind::Decode(error))
    }

    fn crypto(context: &'static str, error: KerberosCryptoError) -> Self {
        Self::new(context, KrbMsgErrorKind::Crypto(error))
    }

    fn rejected(context: &'static str, kind: KrbMsgErrorKind) -> Self {
        Self::new(context, kind)
    }

    fn general(context: &'static str) -> Self {
        Self::new(context, KrbMsgErrorKind::General)
    }
}
