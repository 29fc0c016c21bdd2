use der::asn1::OctetString;
use der::{Decode as _, Encode as _};

use crate::application::ApplicationTagged;
use crate::constants::{msg_types, tags};
use crate::data_types::{Checksum, EncryptedData, HostAddress, Int32, KerberosTime, Microseconds, UInt32};

/// [RFC 4120 5.6.1](https://www.rfc-editor.org/rfc/rfc4120.txt)
///
/// ```not_rust
/// KRB-SAFE-BODY   ::= SEQUENCE {
///         user-data       [0] OCTET STRING,
///         timestamp       [1] KerberosTime OPTIONAL,
///         usec            [2] Microseconds OPTIONAL,
///         seq-number      [3] UInt32 OPTIONAL,
///         s-address       [4] HostAddress OPTIONAL,
///         r-address       [5] HostAddress OPTIONAL
/// }
/// ```
///
/// RFC 4120 makes `s-address` mandatory. It is kept optional here so that a context without
/// a local address can still produce messages, and messages from peers always sending it
/// decode unchanged.
#[derive(Clone, Debug, Eq, PartialEq, der::Sequence)]
#[asn1(tag_mode = "EXPLICIT")]
pub struct KrbSafeBody {
    #[asn1(context_specific = "0")]
    pub user_data: OctetString,
    #[asn1(context_specific = "1", optional = "true")]
    pub timestamp: Option<KerberosTime>,
    #[asn1(context_specific = "2", optional = "true")]
    pub usec: Option<Microseconds>,
    #[asn1(context_specific = "3", optional = "true")]
    pub seq_number: Option<UInt32>,
    #[asn1(context_specific = "4", optional = "true")]
    pub s_address: Option<HostAddress>,
    #[asn1(context_specific = "5", optional = "true")]
    pub r_address: Option<HostAddress>,
}

/// [RFC 4120 5.6.1](https://www.rfc-editor.org/rfc/rfc4120.txt)
///
/// ```not_rust
/// KRB-SAFE        ::= [APPLICATION 20] SEQUENCE {
///         pvno            [0] INTEGER (5),
///         msg-type        [1] INTEGER (20),
///         safe-body       [2] KRB-SAFE-BODY,
///         cksum           [3] Checksum
/// }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, der::Sequence)]
#[asn1(tag_mode = "EXPLICIT")]
pub struct KrbSafeInner {
    #[asn1(context_specific = "0")]
    pub pvno: Int32,
    #[asn1(context_specific = "1")]
    pub msg_type: Int32,
    #[asn1(context_specific = "2")]
    pub safe_body: KrbSafeBody,
    #[asn1(context_specific = "3")]
    pub cksum: Checksum,
}

pub type KrbSafe = ApplicationTagged<KrbSafeInner, { tags::KRB_SAFE }>;

/// [RFC 4120 5.7.1](https://www.rfc-editor.org/rfc/rfc4120.txt)
///
/// ```not_rust
/// KRB-PRIV        ::= [APPLICATION 21] SEQUENCE {
///         pvno            [0] INTEGER (5),
///         msg-type        [1] INTEGER (21),
///                         -- NOTE: there is no [2] tag
///         enc-part        [3] EncryptedData -- EncKrbPrivPart
/// }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, der::Sequence)]
#[asn1(tag_mode = "EXPLICIT")]
pub struct KrbPrivInner {
    #[asn1(context_specific = "0")]
    pub pvno: Int32,
    #[asn1(context_specific = "1")]
    pub msg_type: Int32,
    #[asn1(context_specific = "3")]
    pub enc_part: EncryptedData,
}

pub type KrbPriv = ApplicationTagged<KrbPrivInner, { tags::KRB_PRIV }>;

/// [RFC 4120 5.7.1](https://www.rfc-editor.org/rfc/rfc4120.txt)
///
/// ```not_rust
/// EncKrbPrivPart  ::= [APPLICATION 28] SEQUENCE {
///         user-data       [0] OCTET STRING,
///         timestamp       [1] KerberosTime OPTIONAL,
///         usec            [2] Microseconds OPTIONAL,
///         seq-number      [3] UInt32 OPTIONAL,
///         s-address       [4] HostAddress -- sender's addr --,
///         r-address       [5] HostAddress OPTIONAL -- recip's addr
/// }
/// ```
///
/// Field for field identical to [`KrbSafeBody`].
pub type EncKrbPrivPartInner = KrbSafeBody;

pub type EncKrbPrivPart = ApplicationTagged<EncKrbPrivPartInner, { tags::ENC_KRB_PRIV_PART }>;

/// The two application messages, told apart by their outer APPLICATION tag
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MessageKind {
    Safe,
    Priv,
}

impl MessageKind {
    pub const fn msg_type(self) -> Int32 {
        match self {
            Self::Safe => msg_types::KRB_SAFE,
            Self::Priv => msg_types::KRB_PRIV,
        }
    }

    pub const fn application_tag(self) -> u8 {
        match self {
            Self::Safe => tags::KRB_SAFE,
            Self::Priv => tags::KRB_PRIV,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "KRB-SAFE",
            Self::Priv => "KRB-PRIV",
        }
    }
}

/// Reads the outer tag of `src` without decoding the message.
pub fn peek_message_kind(src: &[u8]) -> der::Result<MessageKind> {
    let mut reader = der::SliceReader::new(src)?;
    let header = der::Header::decode(&mut reader)?;

    match header.tag {
        der::Tag::Application {
            constructed: true,
            number,
        } if number.value() == tags::KRB_SAFE => Ok(MessageKind::Safe),
        der::Tag::Application {
            constructed: true,
            number,
        } if number.value() == tags::KRB_PRIV => Ok(MessageKind::Priv),
        actual => Err(der::ErrorKind::TagUnexpected { expected: None, actual }.into()),
    }
}

/// Either of the two protected application messages
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProtectedMessage {
    Safe(KrbSafe),
    Priv(KrbPriv),
}

impl ProtectedMessage {
    /// Decodes a `KRB-SAFE` or a `KRB-PRIV` based on the outer tag.
    pub fn from_der(src: &[u8]) -> der::Result<Self> {
        match peek_message_kind(src)? {
            MessageKind::Safe => KrbSafe::from_der(src).map(Self::Safe),
            MessageKind::Priv => KrbPriv::from_der(src).map(Self::Priv),
        }
    }

    pub fn to_der(&self) -> der::Result<Vec<u8>> {
        match self {
            Self::Safe(krb_safe) => krb_safe.to_der(),
            Self::Priv(krb_priv) => krb_priv.to_der(),
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Safe(_) => MessageKind::Safe,
            Self::Priv(_) => MessageKind::Priv,
        }
    }
}
