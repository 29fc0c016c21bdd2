use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;
use std::sync::{Mutex, MutexGuard, PoisonError};

use ironkrb_asn1::HostAddress;
use ironkrb_crypto::{ChecksumType, EncryptionKey, EncryptionType};

use crate::config::{AuthContextFlags, ContextConfig};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a security context, used to key the replay cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        Self(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Everything about a security context except the sequence numbers
#[derive(Debug)]
pub struct SecurityParameters {
    id: ContextId,
    session_key: EncryptionKey,
    local_subkey: Option<EncryptionKey>,
    remote_subkey: Option<EncryptionKey>,
    checksum_type: ChecksumType,
    enc_type: EncryptionType,
    local_address: Option<HostAddress>,
    remote_address: Option<HostAddress>,
    flags: AuthContextFlags,
    max_skew: Duration,
}

impl SecurityParameters {
    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn session_key(&self) -> &EncryptionKey {
        &self.session_key
    }

    pub fn local_subkey(&self) -> Option<&EncryptionKey> {
        self.local_subkey.as_ref()
    }

    pub fn remote_subkey(&self) -> Option<&EncryptionKey> {
        self.remote_subkey.as_ref()
    }

    pub fn checksum_type(&self) -> ChecksumType {
        self.checksum_type
    }

    pub fn enc_type(&self) -> EncryptionType {
        self.enc_type
    }

    pub fn local_address(&self) -> Option<&HostAddress> {
        self.local_address.as_ref()
    }

    pub fn remote_address(&self) -> Option<&HostAddress> {
        self.remote_address.as_ref()
    }

    pub fn flags(&self) -> AuthContextFlags {
        self.flags
    }

    pub fn do_time(&self) -> bool {
        self.flags.contains(AuthContextFlags::DO_TIME)
    }

    pub fn do_sequence(&self) -> bool {
        self.flags.contains(AuthContextFlags::DO_SEQUENCE)
    }

    pub fn max_skew(&self) -> Duration {
        self.max_skew
    }
}

/// The key protecting messages in both directions.
///
/// The local subkey wins over the remote subkey, which wins over the session key.
pub fn select_key(params: &SecurityParameters) -> &EncryptionKey {
    params
        .local_subkey
        .as_ref()
        .or(params.remote_subkey.as_ref())
        .unwrap_or(&params.session_key)
}

/// One established association between a local and a remote party
///
/// Sequence numbers only move through [`MessageProtector`](crate::MessageProtector) (local) and
/// [`MessageVerifier`](crate::MessageVerifier) (remote), or the explicit setters.
#[derive(Debug)]
pub struct SecurityContext {
    params: SecurityParameters,
    local_seq_number: u32,
    remote_seq_number: u32,
}

impl SecurityContext {
    pub fn new(config: ContextConfig, session_key: EncryptionKey) -> Self {
        Self {
            params: SecurityParameters {
                id: ContextId::next(),
                session_key,
                local_subkey: None,
                remote_subkey: None,
                checksum_type: config.checksum_type,
                enc_type: config.enc_type,
                local_address: config.local_address,
                remote_address: config.remote_address,
                flags: config.flags,
                max_skew: config.max_skew,
            },
            local_seq_number: 0,
            remote_seq_number: 0,
        }
    }

    pub fn builder(session_key: EncryptionKey) -> SecurityContextBuilder {
        SecurityContextBuilder {
            config: ContextConfig::default(),
            session_key,
            local_subkey: None,
            remote_subkey: None,
            local_seq_number: 0,
            remote_seq_number: 0,
        }
    }

    pub fn params(&self) -> &SecurityParameters {
        &self.params
    }

    pub fn id(&self) -> ContextId {
        self.params.id
    }

    pub fn select_key(&self) -> &EncryptionKey {
        select_key(&self.params)
    }

    pub fn set_addrs(&mut self, local_address: Option<HostAddress>, remote_address: Option<HostAddress>) {
        self.params.local_address = local_address;
        self.params.remote_address = remote_address;
    }

    pub fn local_address(&self) -> Option<&HostAddress> {
        self.params.local_address()
    }

    pub fn remote_address(&self) -> Option<&HostAddress> {
        self.params.remote_address()
    }

    pub fn set_local_subkey(&mut self, key: Option<EncryptionKey>) {
        self.params.local_subkey = key;
    }

    pub fn local_subkey(&self) -> Option<&EncryptionKey> {
        self.params.local_subkey()
    }

    pub fn set_remote_subkey(&mut self, key: Option<EncryptionKey>) {
        self.params.remote_subkey = key;
    }

    pub fn remote_subkey(&self) -> Option<&EncryptionKey> {
        self.params.remote_subkey()
    }

    pub fn set_flags(&mut self, flags: AuthContextFlags) {
        self.params.flags = flags;
    }

    pub fn flags(&self) -> AuthContextFlags {
        self.params.flags
    }

    pub fn set_local_seq_number(&mut self, seq_number: u32) {
        self.local_seq_number = seq_number;
    }

    /// Last sequence number sent
    pub fn local_seq_number(&self) -> u32 {
        self.local_seq_number
    }

    pub fn set_remote_seq_number(&mut self, seq_number: u32) {
        self.remote_seq_number = seq_number;
    }

    /// Last sequence number accepted
    pub fn remote_seq_number(&self) -> u32 {
        self.remote_seq_number
    }

    pub fn into_shared(self) -> SharedSecurityContext {
        SharedSecurityContext {
            params: self.params,
            local_seq_number: Mutex::new(self.local_seq_number),
            remote_seq_number: Mutex::new(self.remote_seq_number),
        }
    }

    pub(crate) fn outbound(&mut self) -> (&SecurityParameters, &mut u32) {
        (&self.params, &mut self.local_seq_number)
    }

    pub(crate) fn inbound(&mut self) -> (&SecurityParameters, &mut u32) {
        (&self.params, &mut self.remote_seq_number)
    }
}

#[derive(Debug)]
pub struct SecurityContextBuilder {
    config: ContextConfig,
    session_key: EncryptionKey,
    local_subkey: Option<EncryptionKey>,
    remote_subkey: Option<EncryptionKey>,
    local_seq_number: u32,
    remote_seq_number: u32,
}

impl SecurityContextBuilder {
    #[must_use]
    pub fn config(mut self, config: ContextConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: AuthContextFlags) -> Self {
        self.config.flags = flags;
        self
    }

    #[must_use]
    pub fn checksum_type(mut self, checksum_type: ChecksumType) -> Self {
        self.config.checksum_type = checksum_type;
        self
    }

    #[must_use]
    pub fn enc_type(mut self, enc_type: EncryptionType) -> Self {
        self.config.enc_type = enc_type;
        self
    }

    #[must_use]
    pub fn max_skew(mut self, max_skew: Duration) -> Self {
        self.config.max_skew = max_skew;
        self
    }

    #[must_use]
    pub fn addresses(mut self, local_address: Option<HostAddress>, remote_address: Option<HostAddress>) -> Self {
        self.config.local_address = local_address;
        self.config.remote_address = remote_address;
        self
    }

    #[must_use]
    pub fn local_subkey(mut self, key: EncryptionKey) -> Self {
        self.local_subkey = Some(key);
        self
    }

    #[must_use]
    pub fn remote_subkey(mut self, key: EncryptionKey) -> Self {
        self.remote_subkey = Some(key);
        self
    }

    #[must_use]
    pub fn seq_numbers(mut self, local_seq_number: u32, remote_seq_number: u32) -> Self {
        self.local_seq_number = local_seq_number;
        self.remote_seq_number = remote_seq_number;
        self
    }

    pub fn build(self) -> SecurityContext {
        let mut context = SecurityContext::new(self.config, self.session_key);
        context.set_local_subkey(self.local_subkey);
        context.set_remote_subkey(self.remote_subkey);
        context.set_local_seq_number(self.local_seq_number);
        context.set_remote_seq_number(self.remote_seq_number);
        context
    }
}

/// A [`SecurityContext`] usable from several threads at once
///
/// Each direction locks its own counter for the whole duration of an operation: a send and a receive
/// proceed concurrently, two sends (or two receives) are serialized.
#[derive(Debug)]
pub struct SharedSecurityContext {
    params: SecurityParameters,
    local_seq_number: Mutex<u32>,
    remote_seq_number: Mutex<u32>,
}

assert_impl!(SharedSecurityContext: Send, Sync);

impl SharedSecurityContext {
    pub fn params(&self) -> &SecurityParameters {
        &self.params
    }

    pub fn id(&self) -> ContextId {
        self.params.id
    }

    pub fn local_seq_number(&self) -> u32 {
        *self.lock_local()
    }

    pub fn remote_seq_number(&self) -> u32 {
        *self.lock_remote()
    }

    // A counter is a plain integer written in one step, a poisoned lock still holds a valid value.
    pub(crate) fn lock_local(&self) -> MutexGuard<'_, u32> {
        self.local_seq_number.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn lock_remote(&self) -> MutexGuard<'_, u32> {
        self.remote_seq_number.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<SecurityContext> for SharedSecurityContext {
    fn from(context: SecurityContext) -> Self {
        context.into_shared()
    }
}
