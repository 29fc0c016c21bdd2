use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use der::asn1::{GeneralizedTime, OctetString};

use crate::constants::address_types;

/// [RFC 4120 5.2.4](https://www.rfc-editor.org/rfc/rfc4120.txt)
///
/// ```not_rust
/// Int32           ::= INTEGER (-2147483648..2147483647)
/// ```
pub type Int32 = i32;

/// [RFC 4120 5.2.4](https://www.rfc-editor.org/rfc/rfc4120.txt)
///
/// ```not_rust
/// UInt32          ::= INTEGER (0..4294967295)
/// ```
pub type UInt32 = u32;

/// [RFC 4120 5.2.4](https://www.rfc-editor.org/rfc/rfc4120.txt)
///
/// ```not_rust
/// Microseconds    ::= INTEGER (0..999999)
/// ```
pub type Microseconds = u32;

/// [RFC 4120 5.2.3](https://www.rfc-editor.org/rfc/rfc4120.txt)
///
/// ```not_rust
/// KerberosTime    ::= GeneralizedTime -- with no fractional seconds
/// ```
pub type KerberosTime = GeneralizedTime;

/// [RFC 4120 5.2.5](https://www.rfc-editor.org/rfc/rfc4120.txt)
///
/// ```not_rust
/// HostAddress     ::= SEQUENCE  {
///         addr-type       [0] Int32,
///         address         [1] OCTET STRING
/// }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, der::Sequence)]
#[asn1(tag_mode = "EXPLICIT")]
pub struct HostAddress {
    #[asn1(context_specific = "0")]
    pub addr_type: Int32,
    #[asn1(context_specific = "1")]
    pub address: OctetString,
}

impl HostAddress {
    pub fn new(addr_type: Int32, address: impl Into<Vec<u8>>) -> der::Result<Self> {
        Ok(Self {
            addr_type,
            address: OctetString::new(address)?,
        })
    }

    pub fn ipv4(addr: Ipv4Addr) -> der::Result<Self> {
        Self::new(address_types::IPV4, addr.octets())
    }

    pub fn ipv6(addr: Ipv6Addr) -> der::Result<Self> {
        Self::new(address_types::IPV6, addr.octets())
    }

    pub fn from_ip(addr: IpAddr) -> der::Result<Self> {
        match addr {
            IpAddr::V4(addr) => Self::ipv4(addr),
            IpAddr::V6(addr) => Self::ipv6(addr),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.address.as_bytes()
    }
}

/// [RFC 4120 5.2.9](https://www.rfc-editor.org/rfc/rfc4120.txt)
///
/// ```not_rust
/// Checksum        ::= SEQUENCE {
///         cksumtype       [0] Int32,
///         checksum        [1] OCTET STRING
/// }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, der::Sequence)]
#[asn1(tag_mode = "EXPLICIT")]
pub struct Checksum {
    #[asn1(context_specific = "0")]
    pub cksumtype: Int32,
    #[asn1(context_specific = "1")]
    pub checksum: OctetString,
}

impl Checksum {
    pub fn new(cksumtype: Int32, checksum: impl Into<Vec<u8>>) -> der::Result<Self> {
        Ok(Self {
            cksumtype,
            checksum: OctetString::new(checksum)?,
        })
    }

    /// Checksum of type 0 with empty contents, the placeholder used while computing the
    /// checksum of a `KRB-SAFE`.
    pub fn blank() -> der::Result<Self> {
        Self::new(0, Vec::new())
    }
}

/// [RFC 4120 5.2.9](https://www.rfc-editor.org/rfc/rfc4120.txt)
///
/// ```not_rust
/// EncryptedData   ::= SEQUENCE {
///         etype   [0] Int32 -- EncryptionType --,
///         kvno    [1] UInt32 OPTIONAL,
///         cipher  [2] OCTET STRING -- ciphertext
/// }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, der::Sequence)]
#[asn1(tag_mode = "EXPLICIT")]
pub struct EncryptedData {
    #[asn1(context_specific = "0")]
    pub etype: Int32,
    #[asn1(context_specific = "1", optional = "true")]
    pub kvno: Option<UInt32>,
    #[asn1(context_specific = "2")]
    pub cipher: OctetString,
}
