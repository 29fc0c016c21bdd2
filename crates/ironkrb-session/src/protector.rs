use ironkrb_asn1::constants::{msg_types, PVNO};
use ironkrb_asn1::der::asn1::OctetString;
use ironkrb_asn1::{Checksum, EncKrbPrivPart, EncryptedData, KrbPriv, KrbPrivInner, KrbSafe, KrbSafeBody, KrbSafeInner};
use ironkrb_crypto::CryptoProvider;

use crate::context::{select_key, SecurityContext, SecurityParameters, SharedSecurityContext};
use crate::time::Clock;
use crate::{KrbMsgError, KrbMsgErrorExt as _, KrbMsgResult};

/// Produces `KRB-SAFE` and `KRB-PRIV` messages
///
/// When sequence numbers are enabled, the local sequence number is consumed before anything
/// else can fail: a failed call never hands out the same number twice.
pub struct MessageProtector<'a> {
    crypto: &'a dyn CryptoProvider,
    clock: &'a dyn Clock,
}

impl<'a> MessageProtector<'a> {
    pub fn new(crypto: &'a dyn CryptoProvider, clock: &'a dyn Clock) -> Self {
        Self { crypto, clock }
    }

    pub fn make_safe(&self, context: &mut SecurityContext, user_data: &[u8]) -> KrbMsgResult<Vec<u8>> {
        let (params, local_seq_number) = context.outbound();
        self.make_safe_impl(params, local_seq_number, user_data)
    }

    /// Same as [`Self::make_safe`], holding the local sequence lock for the whole call.
    pub fn make_safe_shared(&self, context: &SharedSecurityContext, user_data: &[u8]) -> KrbMsgResult<Vec<u8>> {
        let mut local_seq_number = context.lock_local();
        self.make_safe_impl(context.params(), &mut local_seq_number, user_data)
    }

    pub fn make_priv(&self, context: &mut SecurityContext, user_data: &[u8]) -> KrbMsgResult<Vec<u8>> {
        let (params, local_seq_number) = context.outbound();
        self.make_priv_impl(params, local_seq_number, user_data)
    }

    /// Same as [`Self::make_priv`], holding the local sequence lock for the whole call.
    pub fn make_priv_shared(&self, context: &SharedSecurityContext, user_data: &[u8]) -> KrbMsgResult<Vec<u8>> {
        let mut local_seq_number = context.lock_local();
        self.make_priv_impl(context.params(), &mut local_seq_number, user_data)
    }

    fn make_safe_impl(
        &self,
        params: &SecurityParameters,
        local_seq_number: &mut u32,
        user_data: &[u8],
    ) -> KrbMsgResult<Vec<u8>> {
        const CONTEXT: &str = "make_safe";

        let safe_body = self.build_body(CONTEXT, params, local_seq_number, user_data)?;
        let seq_number = safe_body.seq_number;

        let mut krb_safe = KrbSafe::from(KrbSafeInner {
            pvno: PVNO,
            msg_type: msg_types::KRB_SAFE,
            safe_body,
            cksum: Checksum::blank().map_err(|e| KrbMsgError::encode(CONTEXT, e))?,
        });

        // The checksum covers the whole message, encoded with a blank checksum
        let to_sign = ironkrb_asn1::encode(&krb_safe).map_err(|e| KrbMsgError::encode(CONTEXT, e))?;
        trace!(len = to_sign.len(), "Signing KRB-SAFE");

        let checksum = self
            .crypto
            .sign(select_key(params), params.checksum_type(), &to_sign)
            .map_err(|e| crypto_err!(CONTEXT, e))?;

        krb_safe.cksum = Checksum::new(params.checksum_type().into(), checksum)
            .map_err(|e| KrbMsgError::encode(CONTEXT, e))?;

        let encoded = ironkrb_asn1::encode(&krb_safe).map_err(|e| KrbMsgError::encode(CONTEXT, e))?;

        debug!(len = encoded.len(), ?seq_number, "Produced KRB-SAFE");

        Ok(encoded)
    }

    fn make_priv_impl(
        &self,
        params: &SecurityParameters,
        local_seq_number: &mut u32,
        user_data: &[u8],
    ) -> KrbMsgResult<Vec<u8>> {
        const CONTEXT: &str = "make_priv";

        let body = self.build_body(CONTEXT, params, local_seq_number, user_data)?;
        let seq_number = body.seq_number;

        let enc_part = ironkrb_asn1::encode(&EncKrbPrivPart::from(body)).map_err(|e| KrbMsgError::encode(CONTEXT, e))?;
        trace!(len = enc_part.len(), "Encrypting EncKrbPrivPart");

        let cipher = self
            .crypto
            .encrypt(select_key(params), params.enc_type(), &enc_part)
            .map_err(|e| crypto_err!(CONTEXT, e))?;

        let krb_priv = KrbPriv::from(KrbPrivInner {
            pvno: PVNO,
            msg_type: msg_types::KRB_PRIV,
            enc_part: EncryptedData {
                etype: params.enc_type().into(),
                kvno: None,
                cipher: OctetString::new(cipher).map_err(|e| KrbMsgError::encode(CONTEXT, e))?,
            },
        });

        let encoded = ironkrb_asn1::encode(&krb_priv).map_err(|e| KrbMsgError::encode(CONTEXT, e))?;

        debug!(len = encoded.len(), ?seq_number, "Produced KRB-PRIV");

        Ok(encoded)
    }

    fn build_body(
        &self,
        context: &'static str,
        params: &SecurityParameters,
        local_seq_number: &mut u32,
        user_data: &[u8],
    ) -> KrbMsgResult<KrbSafeBody> {
        let now = self.clock.now();

        let seq_number = if params.do_sequence() {
            *local_seq_number = local_seq_number.wrapping_add(1);
            Some(*local_seq_number)
        } else {
            None
        };

        let timestamp = now.kerberos_time().map_err(|e| general_err!(context).with_source(e))?;

        Ok(KrbSafeBody {
            user_data: OctetString::new(user_data).map_err(|e| KrbMsgError::encode(context, e))?,
            timestamp: Some(timestamp),
            usec: Some(now.usec),
            seq_number,
            s_address: params.local_address().cloned(),
            r_address: params.remote_address().cloned(),
        })
    }
}
