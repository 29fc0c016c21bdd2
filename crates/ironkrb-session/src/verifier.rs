use core::mem;

use ironkrb_asn1::constants::{msg_types, PVNO};
use ironkrb_asn1::{Checksum, EncKrbPrivPart, Int32, KrbPriv, KrbSafe, KrbSafeBody};
use ironkrb_crypto::{ChecksumType, CryptoProvider, EncryptionType};

use crate::address::address_check;
use crate::context::{select_key, SecurityContext, SecurityParameters, SharedSecurityContext};
use crate::replay::{Authenticator, ReplayCache};
use crate::time::{within_skew, Clock, KerberosTimestamp};
use crate::{KrbMsgError, KrbMsgErrorExt as _, KrbMsgErrorKind, KrbMsgResult};

/// The only checksum accepted on an inbound `KRB-SAFE`: keyed and collision-proof
pub const ACCEPTED_SAFE_CHECKSUM: ChecksumType = ChecksumType::RsaMd5Des;

/// Checks inbound `KRB-SAFE` and `KRB-PRIV` messages and extracts their payload
///
/// Checks run in a fixed order and the first failing one decides the error. The remote sequence
/// number only advances once a message passed every check.
pub struct MessageVerifier<'a> {
    crypto: &'a dyn CryptoProvider,
    clock: &'a dyn Clock,
    replay_cache: Option<&'a dyn ReplayCache>,
}

fn reject(context: &'static str, kind: KrbMsgErrorKind) -> KrbMsgError {
    debug!(context, reason = %kind, "Rejected message");
    reject_err!(context, kind)
}

/// What is committed once a message is accepted
struct Acceptance {
    authenticator: Option<Authenticator>,
    seq_number: Option<u32>,
}

impl<'a> MessageVerifier<'a> {
    pub fn new(crypto: &'a dyn CryptoProvider, clock: &'a dyn Clock) -> Self {
        Self {
            crypto,
            clock,
            replay_cache: None,
        }
    }

    #[must_use]
    pub fn with_replay_cache(mut self, replay_cache: &'a dyn ReplayCache) -> Self {
        self.replay_cache = Some(replay_cache);
        self
    }

    pub fn read_safe(&self, context: &mut SecurityContext, input: &[u8]) -> KrbMsgResult<Vec<u8>> {
        let (params, remote_seq_number) = context.inbound();
        self.read_safe_impl(params, remote_seq_number, input)
    }

    /// Same as [`Self::read_safe`], holding the remote sequence lock for the whole call.
    pub fn read_safe_shared(&self, context: &SharedSecurityContext, input: &[u8]) -> KrbMsgResult<Vec<u8>> {
        let mut remote_seq_number = context.lock_remote();
        self.read_safe_impl(context.params(), &mut remote_seq_number, input)
    }

    pub fn read_priv(&self, context: &mut SecurityContext, input: &[u8]) -> KrbMsgResult<Vec<u8>> {
        let (params, remote_seq_number) = context.inbound();
        self.read_priv_impl(params, remote_seq_number, input)
    }

    /// Same as [`Self::read_priv`], holding the remote sequence lock for the whole call.
    pub fn read_priv_shared(&self, context: &SharedSecurityContext, input: &[u8]) -> KrbMsgResult<Vec<u8>> {
        let mut remote_seq_number = context.lock_remote();
        self.read_priv_impl(context.params(), &mut remote_seq_number, input)
    }

    fn read_safe_impl(
        &self,
        params: &SecurityParameters,
        remote_seq_number: &mut u32,
        input: &[u8],
    ) -> KrbMsgResult<Vec<u8>> {
        const CONTEXT: &str = "read_safe";

        let mut krb_safe = ironkrb_asn1::decode::<KrbSafe>(input)
            .map_err(|e| KrbMsgError::decode(CONTEXT, e))?
            .into_inner();

        check_header(CONTEXT, krb_safe.pvno, krb_safe.msg_type, msg_types::KRB_SAFE)?;

        if krb_safe.cksum.cksumtype != i32::from(ACCEPTED_SAFE_CHECKSUM) {
            return Err(reject(
                CONTEXT,
                KrbMsgErrorKind::InappropriateChecksum {
                    cksumtype: krb_safe.cksum.cksumtype,
                },
            ));
        }

        let acceptance = self.check_body(CONTEXT, params, *remote_seq_number, &krb_safe.safe_body)?;

        // Signed bytes are the message encoded with a blank checksum
        let blank = Checksum::blank().map_err(|e| KrbMsgError::encode(CONTEXT, e))?;
        let checksum = mem::replace(&mut krb_safe.cksum, blank);
        let krb_safe = KrbSafe::from(krb_safe);
        let signed = ironkrb_asn1::encode(&krb_safe).map_err(|e| KrbMsgError::encode(CONTEXT, e))?;
        let krb_safe = krb_safe.into_inner();

        match self.crypto.verify(
            select_key(params),
            ACCEPTED_SAFE_CHECKSUM,
            checksum.checksum.as_bytes(),
            &signed,
        ) {
            Ok(true) => {}
            Ok(false) => return Err(reject(CONTEXT, KrbMsgErrorKind::BadChecksum)),
            Err(e) => return Err(reject(CONTEXT, KrbMsgErrorKind::BadChecksum).with_source(e)),
        }

        self.commit(CONTEXT, params, remote_seq_number, &acceptance)?;

        debug!(len = input.len(), seq_number = ?acceptance.seq_number, "Accepted KRB-SAFE");

        Ok(krb_safe.safe_body.user_data.into_bytes())
    }

    fn read_priv_impl(
        &self,
        params: &SecurityParameters,
        remote_seq_number: &mut u32,
        input: &[u8],
    ) -> KrbMsgResult<Vec<u8>> {
        const CONTEXT: &str = "read_priv";

        let krb_priv = ironkrb_asn1::decode::<KrbPriv>(input)
            .map_err(|e| KrbMsgError::decode(CONTEXT, e))?
            .into_inner();

        check_header(CONTEXT, krb_priv.pvno, krb_priv.msg_type, msg_types::KRB_PRIV)?;

        let etype = EncryptionType::try_from(krb_priv.enc_part.etype)
            .map_err(|e| reject(CONTEXT, KrbMsgErrorKind::DecryptError).with_source(e))?;

        let plaintext = self
            .crypto
            .decrypt(select_key(params), etype, krb_priv.enc_part.cipher.as_bytes())
            .map_err(|e| reject(CONTEXT, KrbMsgErrorKind::DecryptError).with_source(e))?;

        // The cipher padding follows the structure
        let (enc_part, consumed) = ironkrb_asn1::decode_prefix::<EncKrbPrivPart>(&plaintext)
            .map_err(|e| KrbMsgError::decode(CONTEXT, e))?;
        trace!(consumed, total = plaintext.len(), "Decoded EncKrbPrivPart");

        let body = enc_part.into_inner();

        let acceptance = self.check_body(CONTEXT, params, *remote_seq_number, &body)?;

        self.commit(CONTEXT, params, remote_seq_number, &acceptance)?;

        debug!(len = input.len(), seq_number = ?acceptance.seq_number, "Accepted KRB-PRIV");

        Ok(body.user_data.into_bytes())
    }

    /// Address, time, replay and sequence checks shared by both messages.
    fn check_body(
        &self,
        context: &'static str,
        params: &SecurityParameters,
        remote_seq_number: u32,
        body: &KrbSafeBody,
    ) -> KrbMsgResult<Acceptance> {
        if !address_check(params.remote_address(), body.s_address.as_ref()) {
            return Err(reject(context, KrbMsgErrorKind::BadAddress));
        }

        if !address_check(params.local_address(), body.r_address.as_ref()) {
            return Err(reject(context, KrbMsgErrorKind::BadAddress));
        }

        if params.do_time() {
            self.check_time(context, params, body)?;
        }

        let authenticator = body.timestamp.as_ref().map(|timestamp| {
            Authenticator::new(
                KerberosTimestamp::from_kerberos_time(timestamp, body.usec.unwrap_or(0)),
                body.seq_number,
            )
        });

        if let (Some(replay_cache), Some(authenticator)) = (self.replay_cache, authenticator) {
            if replay_cache.contains(params.id(), authenticator) {
                return Err(reject(context, KrbMsgErrorKind::Replay));
            }
        }

        let seq_number = if params.do_sequence() {
            let expected = remote_seq_number.wrapping_add(1);

            match body.seq_number {
                Some(received) if received == expected => Some(received),
                received => return Err(reject(context, KrbMsgErrorKind::OutOfOrder { expected, received })),
            }
        } else {
            None
        };

        Ok(Acceptance {
            authenticator,
            seq_number,
        })
    }

    fn check_time(&self, context: &'static str, params: &SecurityParameters, body: &KrbSafeBody) -> KrbMsgResult<()> {
        let (Some(timestamp), Some(usec)) = (body.timestamp.as_ref(), body.usec) else {
            return Err(reject(context, KrbMsgErrorKind::ClockSkew));
        };

        let message_time = KerberosTimestamp::from_kerberos_time(timestamp, usec);
        let now = self.clock.now();

        if !within_skew(message_time.seconds, now.seconds, params.max_skew()) {
            return Err(reject(context, KrbMsgErrorKind::ClockSkew));
        }

        Ok(())
    }

    /// Runs once the message is authenticated.
    fn commit(
        &self,
        context: &'static str,
        params: &SecurityParameters,
        remote_seq_number: &mut u32,
        acceptance: &Acceptance,
    ) -> KrbMsgResult<()> {
        if let (Some(replay_cache), Some(authenticator)) = (self.replay_cache, acceptance.authenticator) {
            // Receives on one context are serialized, so only a custom cache can report the
            // authenticator as recorded since the check
            if !replay_cache.check_and_insert(params.id(), authenticator) {
                return Err(reject(context, KrbMsgErrorKind::Replay));
            }
        }

        if let Some(seq_number) = acceptance.seq_number {
            *remote_seq_number = seq_number;
        }

        Ok(())
    }
}

fn check_header(context: &'static str, pvno: Int32, msg_type: Int32, expected_msg_type: Int32) -> KrbMsgResult<()> {
    if pvno != PVNO {
        return Err(reject(context, KrbMsgErrorKind::BadVersion { pvno }));
    }

    if msg_type != expected_msg_type {
        return Err(reject(context, KrbMsgErrorKind::WrongMsgType { msg_type }));
    }

    Ok(())
}
