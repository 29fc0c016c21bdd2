//! Test doubles and fixtures shared by the integration tests.

// No need to be as strict as in production libraries
#![allow(clippy::missing_panics_doc)]

use core::net::{IpAddr, Ipv4Addr};
use core::sync::atomic::{AtomicI64, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use ironkrb_asn1::HostAddress;
use ironkrb_crypto::{
    ChecksumType, CryptoProvider, EncryptionKey, EncryptionType, KerberosCryptoError, KerberosCryptoResult,
    RfcCryptoProvider,
};
use ironkrb_session::{AuthContextFlags, Clock, KerberosTimestamp, MessageEngine, SecurityContext};

/// 2024-10-14T12:00:00Z
pub const REFERENCE_SECONDS: i64 = 1_728_907_200;

pub const REFERENCE_USEC: u32 = 123_456;

pub const SESSION_KEY: [u8; 8] = [0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef];

pub fn des_key(key_value: [u8; 8]) -> EncryptionKey {
    EncryptionKey::new(EncryptionType::DesCbcMd5, key_value)
}

pub fn session_key() -> EncryptionKey {
    des_key(SESSION_KEY)
}

pub fn initiator_address() -> HostAddress {
    HostAddress::from_ip(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))).expect("valid IPv4 address")
}

pub fn acceptor_address() -> HostAddress {
    HostAddress::from_ip(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))).expect("valid IPv4 address")
}

/// Clock frozen at a settable instant
#[derive(Debug)]
pub struct FixedClock {
    seconds: AtomicI64,
    usec: AtomicU32,
}

impl FixedClock {
    pub fn new(now: KerberosTimestamp) -> Self {
        Self {
            seconds: AtomicI64::new(now.seconds),
            usec: AtomicU32::new(now.usec),
        }
    }

    pub fn set(&self, now: KerberosTimestamp) {
        self.seconds.store(now.seconds, Ordering::SeqCst);
        self.usec.store(now.usec, Ordering::SeqCst);
    }

    /// Moves the clock forward, microsecond by microsecond, wrapping into the next second.
    pub fn tick(&self) {
        let usec = self.usec.load(Ordering::SeqCst) + 1;

        if usec == 1_000_000 {
            self.seconds.fetch_add(1, Ordering::SeqCst);
            self.usec.store(0, Ordering::SeqCst);
        } else {
            self.usec.store(usec, Ordering::SeqCst);
        }
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new(KerberosTimestamp::new(REFERENCE_SECONDS, REFERENCE_USEC))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> KerberosTimestamp {
        KerberosTimestamp::new(self.seconds.load(Ordering::SeqCst), self.usec.load(Ordering::SeqCst))
    }
}

/// Counts the calls going through an inner provider
#[derive(Debug, Default)]
pub struct RecordingCryptoProvider<P = RfcCryptoProvider> {
    inner: P,
    sign: AtomicUsize,
    verify: AtomicUsize,
    encrypt: AtomicUsize,
    decrypt: AtomicUsize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallCounts {
    pub sign: usize,
    pub verify: usize,
    pub encrypt: usize,
    pub decrypt: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.sign + self.verify + self.encrypt + self.decrypt
    }
}

impl<P: CryptoProvider> RecordingCryptoProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            sign: AtomicUsize::new(0),
            verify: AtomicUsize::new(0),
            encrypt: AtomicUsize::new(0),
            decrypt: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            sign: self.sign.load(Ordering::SeqCst),
            verify: self.verify.load(Ordering::SeqCst),
            encrypt: self.encrypt.load(Ordering::SeqCst),
            decrypt: self.decrypt.load(Ordering::SeqCst),
        }
    }
}

impl<P: CryptoProvider> CryptoProvider for RecordingCryptoProvider<P> {
    fn sign(&self, key: &EncryptionKey, cksumtype: ChecksumType, data: &[u8]) -> KerberosCryptoResult<Vec<u8>> {
        self.sign.fetch_add(1, Ordering::SeqCst);
        self.inner.sign(key, cksumtype, data)
    }

    fn verify(
        &self,
        key: &EncryptionKey,
        cksumtype: ChecksumType,
        checksum: &[u8],
        data: &[u8],
    ) -> KerberosCryptoResult<bool> {
        self.verify.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(key, cksumtype, checksum, data)
    }

    fn encrypt(&self, key: &EncryptionKey, etype: EncryptionType, plaintext: &[u8]) -> KerberosCryptoResult<Vec<u8>> {
        self.encrypt.fetch_add(1, Ordering::SeqCst);
        self.inner.encrypt(key, etype, plaintext)
    }

    fn decrypt(
        &self,
        key: &EncryptionKey,
        etype: EncryptionType,
        ciphertext: &[u8],
    ) -> KerberosCryptoResult<Vec<u8>> {
        self.decrypt.fetch_add(1, Ordering::SeqCst);
        self.inner.decrypt(key, etype, ciphertext)
    }
}

/// Provider failing every operation
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingCryptoProvider;

impl CryptoProvider for FailingCryptoProvider {
    fn sign(&self, _: &EncryptionKey, cksumtype: ChecksumType, _: &[u8]) -> KerberosCryptoResult<Vec<u8>> {
        Err(KerberosCryptoError::AlgorithmIdentifier(cksumtype.into()))
    }

    fn verify(&self, _: &EncryptionKey, _: ChecksumType, _: &[u8], _: &[u8]) -> KerberosCryptoResult<bool> {
        Err(KerberosCryptoError::IntegrityCheck)
    }

    fn encrypt(&self, _: &EncryptionKey, etype: EncryptionType, _: &[u8]) -> KerberosCryptoResult<Vec<u8>> {
        Err(KerberosCryptoError::AlgorithmIdentifier(etype.into()))
    }

    fn decrypt(&self, _: &EncryptionKey, _: EncryptionType, _: &[u8]) -> KerberosCryptoResult<Vec<u8>> {
        Err(KerberosCryptoError::IntegrityCheck)
    }
}

/// Initiator and acceptor sides of the same association, with mirrored addresses
pub struct ContextPair {
    pub initiator: SecurityContext,
    pub acceptor: SecurityContext,
}

impl ContextPair {
    pub fn new(flags: AuthContextFlags) -> Self {
        Self::with_key(flags, session_key())
    }

    pub fn with_key(flags: AuthContextFlags, key: EncryptionKey) -> Self {
        let initiator = SecurityContext::builder(key.clone())
            .flags(flags)
            .addresses(Some(initiator_address()), Some(acceptor_address()))
            .build();

        let acceptor = SecurityContext::builder(key)
            .flags(flags)
            .addresses(Some(acceptor_address()), Some(initiator_address()))
            .build();

        Self { initiator, acceptor }
    }

    /// Both sides without any address.
    pub fn without_addresses(flags: AuthContextFlags) -> Self {
        let mut pair = Self::new(flags);
        pair.initiator.set_addrs(None, None);
        pair.acceptor.set_addrs(None, None);
        pair
    }
}

/// Engine using the RFC 3961 provider, driven by the given clock
pub fn engine_with_clock(clock: Arc<FixedClock>) -> MessageEngine {
    MessageEngine::new(Arc::new(RfcCryptoProvider::new()), clock)
}

/// Engine using a recording provider, returned alongside it
pub fn recording_engine(clock: Arc<FixedClock>) -> (MessageEngine, Arc<RecordingCryptoProvider>) {
    let crypto = Arc::new(RecordingCryptoProvider::new(RfcCryptoProvider::new()));
    let provider: Arc<dyn CryptoProvider> = Arc::<RecordingCryptoProvider>::clone(&crypto);
    let engine = MessageEngine::new(provider, clock);
    (engine, crypto)
}
