use core::time::Duration;

use bitflags::bitflags;
use ironkrb_asn1::HostAddress;
use ironkrb_crypto::{ChecksumType, EncryptionType};

/// Default acceptable clock skew between two peers
pub const DEFAULT_MAX_SKEW: Duration = Duration::from_secs(300);

bitflags! {
    /// Which replay protections a context applies to inbound messages, and embeds in outbound ones
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AuthContextFlags: u32 {
        /// Timestamps are sent and checked against the local clock
        const DO_TIME = 0x0000_0001;
        /// Sequence numbers are sent and checked
        const DO_SEQUENCE = 0x0000_0004;
    }
}

impl Default for AuthContextFlags {
    fn default() -> Self {
        Self::DO_TIME
    }
}

/// Parameters of a security context which are fixed once it is established
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Replay protections, `DO_TIME` by default
    pub flags: AuthContextFlags,
    /// Checksum used for `KRB-SAFE`
    pub checksum_type: ChecksumType,
    /// Encryption used for `KRB-PRIV`
    pub enc_type: EncryptionType,
    /// Maximum accepted distance between a message timestamp and the local clock
    ///
    /// Only whole seconds are taken into account.
    pub max_skew: Duration,
    /// Our own address, sent as the sender address and checked as the recipient one
    pub local_address: Option<HostAddress>,
    /// The peer address, sent as the recipient address and checked as the sender one
    pub remote_address: Option<HostAddress>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            flags: AuthContextFlags::default(),
            checksum_type: ChecksumType::RsaMd5Des,
            enc_type: EncryptionType::DesCbcMd5,
            max_skew: DEFAULT_MAX_SKEW,
            local_address: None,
            remote_address: None,
        }
    }
}
