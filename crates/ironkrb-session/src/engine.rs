use core::fmt;
use std::sync::Arc;

use ironkrb_asn1::{peek_message_kind, MessageKind};
use ironkrb_crypto::{CryptoProvider, RfcCryptoProvider};

use crate::context::{SecurityContext, SharedSecurityContext};
use crate::protector::MessageProtector;
use crate::replay::ReplayCache;
use crate::time::{Clock, SystemClock};
use crate::verifier::MessageVerifier;
use crate::{KrbMsgError, KrbMsgErrorExt as _, KrbMsgResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtectionMode {
    /// Integrity only (`KRB-SAFE`)
    Safe,
    /// Integrity and confidentiality (`KRB-PRIV`)
    Priv,
}

impl ProtectionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Priv => "priv",
        }
    }
}

impl From<MessageKind> for ProtectionMode {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Safe => Self::Safe,
            MessageKind::Priv => Self::Priv,
        }
    }
}

impl fmt::Display for ProtectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload recovered from an inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unprotected {
    pub mode: ProtectionMode,
    pub user_data: Vec<u8>,
}

/// Entry point wiring the protector and the verifier to their collaborators
pub struct MessageEngine {
    crypto: Arc<dyn CryptoProvider>,
    clock: Arc<dyn Clock>,
    replay_cache: Option<Arc<dyn ReplayCache>>,
}

impl fmt::Debug for MessageEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageEngine")
            .field("replay_cache", &self.replay_cache.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for MessageEngine {
    fn default() -> Self {
        Self::new(Arc::new(RfcCryptoProvider::new()), Arc::new(SystemClock))
    }
}

impl MessageEngine {
    pub fn new(crypto: Arc<dyn CryptoProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            crypto,
            clock,
            replay_cache: None,
        }
    }

    #[must_use]
    pub fn with_replay_cache(mut self, replay_cache: Arc<dyn ReplayCache>) -> Self {
        self.replay_cache = Some(replay_cache);
        self
    }

    pub fn protector(&self) -> MessageProtector<'_> {
        MessageProtector::new(self.crypto.as_ref(), self.clock.as_ref())
    }

    pub fn verifier(&self) -> MessageVerifier<'_> {
        let verifier = MessageVerifier::new(self.crypto.as_ref(), self.clock.as_ref());

        match &self.replay_cache {
            Some(replay_cache) => verifier.with_replay_cache(replay_cache.as_ref()),
            None => verifier,
        }
    }

    pub fn protect(
        &self,
        context: &mut SecurityContext,
        user_data: &[u8],
        mode: ProtectionMode,
    ) -> KrbMsgResult<Vec<u8>> {
        match mode {
            ProtectionMode::Safe => self.protector().make_safe(context, user_data),
            ProtectionMode::Priv => self.protector().make_priv(context, user_data),
        }
    }

    /// Verifies an inbound message, telling `KRB-SAFE` and `KRB-PRIV` apart by their outer tag.
    pub fn unprotect(&self, context: &mut SecurityContext, input: &[u8]) -> KrbMsgResult<Unprotected> {
        let mode = detect_mode(input)?;

        let user_data = match mode {
            ProtectionMode::Safe => self.verifier().read_safe(context, input)?,
            ProtectionMode::Priv => self.verifier().read_priv(context, input)?,
        };

        Ok(Unprotected { mode, user_data })
    }

    pub fn protect_shared(
        &self,
        context: &SharedSecurityContext,
        user_data: &[u8],
        mode: ProtectionMode,
    ) -> KrbMsgResult<Vec<u8>> {
        match mode {
            ProtectionMode::Safe => self.protector().make_safe_shared(context, user_data),
            ProtectionMode::Priv => self.protector().make_priv_shared(context, user_data),
        }
    }

    pub fn unprotect_shared(&self, context: &SharedSecurityContext, input: &[u8]) -> KrbMsgResult<Unprotected> {
        let mode = detect_mode(input)?;

        let user_data = match mode {
            ProtectionMode::Safe => self.verifier().read_safe_shared(context, input)?,
            ProtectionMode::Priv => self.verifier().read_priv_shared(context, input)?,
        };

        Ok(Unprotected { mode, user_data })
    }
}

fn detect_mode(input: &[u8]) -> KrbMsgResult<ProtectionMode> {
    let kind = peek_message_kind(input).map_err(|e| KrbMsgError::decode("unprotect", e))?;
    trace!(kind = kind.as_str(), "Detected message kind");
    Ok(ProtectionMode::from(kind))
}
