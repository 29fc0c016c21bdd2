//! Protocol numbers used by the message layer.

/// Kerberos protocol version number carried in every message.
pub const PVNO: i32 = 5;

pub mod msg_types {
    pub const KRB_SAFE: i32 = 20;
    pub const KRB_PRIV: i32 = 21;
}

/// APPLICATION tag numbers, RFC 4120 section 5.10.
pub mod tags {
    pub const KRB_SAFE: u8 = 20;
    pub const KRB_PRIV: u8 = 21;
    pub const ENC_KRB_PRIV_PART: u8 = 28;
}

/// Host address types, RFC 4120 section 7.5.3.
pub mod address_types {
    pub const IPV4: i32 = 2;
    pub const DIRECTIONAL: i32 = 3;
    pub const CHAOSNET: i32 = 5;
    pub const XNS: i32 = 6;
    pub const ISO: i32 = 7;
    pub const DECNET_PHASE_IV: i32 = 12;
    pub const APPLETALK_DDP: i32 = 16;
    pub const NETBIOS: i32 = 20;
    pub const IPV6: i32 = 24;
}
