use core::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use ironkrb_asn1::der::asn1::OctetString;
use ironkrb_asn1::der::Decode as _;
use ironkrb_asn1::{HostAddress, KrbPriv, KrbSafe};
use ironkrb_crypto::ChecksumType;
use ironkrb_session::{AuthContextFlags, KerberosTimestamp, KrbMsgErrorKind, ProtectionMode, SecurityContext};
use ironkrb_testsuite_core::{
    acceptor_address, des_key, engine_with_clock, initiator_address, recording_engine, session_key, ContextPair,
    FixedClock, REFERENCE_SECONDS, REFERENCE_USEC,
};
use rstest::rstest;

use super::assert_rejected;

fn other_address() -> HostAddress {
    HostAddress::from_ip(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9))).unwrap()
}

fn rewrite_safe(wire: &[u8], edit: impl FnOnce(&mut KrbSafe)) -> Vec<u8> {
    let mut krb_safe = KrbSafe::from_der(wire).unwrap();
    edit(&mut krb_safe);
    ironkrb_asn1::encode(&krb_safe).unwrap()
}

fn rewrite_priv(wire: &[u8], edit: impl FnOnce(&mut KrbPriv)) -> Vec<u8> {
    let mut krb_priv = KrbPriv::from_der(wire).unwrap();
    edit(&mut krb_priv);
    ironkrb_asn1::encode(&krb_priv).unwrap()
}

#[test]
fn any_flipped_checksum_bit_is_detected() {
    let engine = engine_with_clock(Arc::new(FixedClock::default()));
    let mut pair = ContextPair::new(AuthContextFlags::DO_TIME | AuthContextFlags::DO_SEQUENCE);

    let wire = engine.protect(&mut pair.initiator, b"hej", ProtectionMode::Safe).unwrap();
    let checksum = KrbSafe::from_der(&wire).unwrap().cksum.checksum.as_bytes().to_vec();

    for byte in 0..checksum.len() {
        for bit in 0..8 {
            let mut tampered = checksum.clone();
            tampered[byte] ^= 1 << bit;

            let forged = rewrite_safe(&wire, |krb_safe| {
                krb_safe.cksum.checksum = OctetString::new(tampered).unwrap();
            });

            assert_rejected(engine.unprotect(&mut pair.acceptor, &forged), "checksum verification failed");
        }
    }

    assert_eq!(pair.acceptor.remote_seq_number(), 0);
    engine.unprotect(&mut pair.acceptor, &wire).unwrap();
}

#[test]
fn altered_user_data_is_detected() {
    let engine = engine_with_clock(Arc::new(FixedClock::default()));
    let mut pair = ContextPair::new(AuthContextFlags::DO_SEQUENCE);

    let wire = engine.protect(&mut pair.initiator, b"pay 10", ProtectionMode::Safe).unwrap();
    let forged = rewrite_safe(&wire, |krb_safe| {
        krb_safe.safe_body.user_data = OctetString::new(b"pay 99".as_slice()).unwrap();
    });

    assert_rejected(engine.unprotect(&mut pair.acceptor, &forged), "checksum verification failed");
    assert_eq!(pair.acceptor.remote_seq_number(), 0);
}

#[test]
fn wrong_session_key_is_detected() {
    let engine = engine_with_clock(Arc::new(FixedClock::default()));
    let mut sender = SecurityContext::builder(session_key()).build();
    let mut receiver = SecurityContext::builder(des_key([0x10; 8])).build();

    let safe = engine.protect(&mut sender, b"hej", ProtectionMode::Safe).unwrap();
    assert_rejected(engine.unprotect(&mut receiver, &safe), "checksum verification failed");

    let private = engine.protect(&mut sender, b"hej", ProtectionMode::Priv).unwrap();
    assert_rejected(engine.unprotect(&mut receiver, &private), "decryption failed");
}

#[test]
fn altered_cipher_is_detected() {
    let engine = engine_with_clock(Arc::new(FixedClock::default()));
    let mut pair = ContextPair::new(AuthContextFlags::DO_SEQUENCE);

    let wire = engine.protect(&mut pair.initiator, b"hemligt", ProtectionMode::Priv).unwrap();
    let forged = rewrite_priv(&wire, |krb_priv| {
        let mut cipher = krb_priv.enc_part.cipher.as_bytes().to_vec();
        cipher[12] ^= 0x01;
        krb_priv.enc_part.cipher = OctetString::new(cipher).unwrap();
    });

    let error = engine.unprotect(&mut pair.acceptor, &forged).unwrap_err();
    assert!(matches!(error.kind(), KrbMsgErrorKind::DecryptError));
    assert_eq!(pair.acceptor.remote_seq_number(), 0);
}

#[rstest]
#[case::unknown(18)]
#[case::null(0)]
fn unsupported_priv_etype(#[case] etype: i32) {
    let engine = engine_with_clock(Arc::new(FixedClock::default()));
    let mut pair = ContextPair::new(AuthContextFlags::DO_TIME);

    let wire = engine.protect(&mut pair.initiator, b"hemligt", ProtectionMode::Priv).unwrap();
    let forged = rewrite_priv(&wire, |krb_priv| krb_priv.enc_part.etype = etype);

    assert_rejected(engine.unprotect(&mut pair.acceptor, &forged), "decryption failed");
}

#[rstest]
#[case::sender_address(Some(other_address()), Some(acceptor_address()))]
#[case::recipient_address(Some(initiator_address()), Some(other_address()))]
fn address_mismatch(
    #[case] expected_sender: Option<HostAddress>,
    #[case] expected_recipient: Option<HostAddress>,
    #[values(ProtectionMode::Safe, ProtectionMode::Priv)] mode: ProtectionMode,
) {
    let engine = engine_with_clock(Arc::new(FixedClock::default()));
    let mut pair = ContextPair::new(AuthContextFlags::DO_SEQUENCE);
    pair.acceptor.set_addrs(expected_recipient, expected_sender);

    let wire = engine.protect(&mut pair.initiator, b"hej", mode).unwrap();

    assert_rejected(engine.unprotect(&mut pair.acceptor, &wire), "address mismatch");
    assert_eq!(pair.acceptor.remote_seq_number(), 0);
}

#[test]
fn address_checks_pass_when_one_side_is_unset() {
    let engine = engine_with_clock(Arc::new(FixedClock::default()));
    let mut pair = ContextPair::new(AuthContextFlags::DO_TIME);
    pair.acceptor.set_addrs(None, None);

    let wire = engine.protect(&mut pair.initiator, b"hej", ProtectionMode::Safe).unwrap();

    engine.unprotect(&mut pair.acceptor, &wire).unwrap();
}

#[test]
fn address_type_must_match() {
    let engine = engine_with_clock(Arc::new(FixedClock::default()));
    let mut pair = ContextPair::new(AuthContextFlags::DO_TIME);

    // Same bytes, announced as a NetBIOS address
    let netbios = HostAddress::new(20, initiator_address().as_bytes()).unwrap();
    pair.acceptor.set_addrs(Some(acceptor_address()), Some(netbios));

    let wire = engine.protect(&mut pair.initiator, b"hej", ProtectionMode::Safe).unwrap();

    assert_rejected(engine.unprotect(&mut pair.acceptor, &wire), "address mismatch");
}

#[rstest]
#[case::safe(ProtectionMode::Safe)]
#[case::priv_(ProtectionMode::Priv)]
fn old_protocol_version_is_rejected_before_any_crypto(#[case] mode: ProtectionMode) {
    let clock = Arc::new(FixedClock::default());
    let (sending_engine, _) = recording_engine(Arc::clone(&clock));
    let (receiving_engine, crypto) = recording_engine(clock);
    let mut pair = ContextPair::new(AuthContextFlags::DO_SEQUENCE);

    let wire = sending_engine.protect(&mut pair.initiator, b"hej", mode).unwrap();
    let forged = match mode {
        ProtectionMode::Safe => rewrite_safe(&wire, |krb_safe| krb_safe.pvno = 4),
        ProtectionMode::Priv => rewrite_priv(&wire, |krb_priv| krb_priv.pvno = 4),
    };

    let error = receiving_engine.unprotect(&mut pair.acceptor, &forged).unwrap_err();

    assert!(matches!(error.kind(), KrbMsgErrorKind::BadVersion { pvno: 4 }));
    assert_eq!(crypto.calls().total(), 0);
    assert_eq!(pair.acceptor.remote_seq_number(), 0);
}

#[rstest]
#[case::safe(ProtectionMode::Safe, 21)]
#[case::priv_(ProtectionMode::Priv, 20)]
#[case::ap_req(ProtectionMode::Safe, 14)]
fn wrong_message_type(#[case] mode: ProtectionMode, #[case] msg_type: i32) {
    let engine = engine_with_clock(Arc::new(FixedClock::default()));
    let mut pair = ContextPair::new(AuthContextFlags::DO_TIME);

    let wire = engine.protect(&mut pair.initiator, b"hej", mode).unwrap();
    let forged = match mode {
        ProtectionMode::Safe => rewrite_safe(&wire, |krb_safe| krb_safe.msg_type = msg_type),
        ProtectionMode::Priv => rewrite_priv(&wire, |krb_priv| krb_priv.msg_type = msg_type),
    };

    let error = engine.unprotect(&mut pair.acceptor, &forged).unwrap_err();

    match error.kind() {
        KrbMsgErrorKind::WrongMsgType { msg_type: actual } => assert_eq!(*actual, msg_type),
        other => panic!("unexpected error kind: {other}"),
    }
}

#[rstest]
#[case::rsa_md4_des(ChecksumType::RsaMd4Des)]
#[case::unkeyed_md5(ChecksumType::RsaMd5)]
#[case::unkeyed_md4(ChecksumType::RsaMd4)]
fn only_keyed_md5_checksum_is_accepted(#[case] checksum_type: ChecksumType) {
    let clock = Arc::new(FixedClock::default());
    let (sending_engine, _) = recording_engine(Arc::clone(&clock));
    let (receiving_engine, crypto) = recording_engine(clock);

    let mut sender = SecurityContext::builder(session_key())
        .checksum_type(checksum_type)
        .build();
    let mut receiver = SecurityContext::builder(session_key()).build();

    let wire = sending_engine.protect(&mut sender, b"hej", ProtectionMode::Safe).unwrap();
    let error = receiving_engine.unprotect(&mut receiver, &wire).unwrap_err();

    match error.kind() {
        KrbMsgErrorKind::InappropriateChecksum { cksumtype } => assert_eq!(*cksumtype, i32::from(checksum_type)),
        other => panic!("unexpected error kind: {other}"),
    }
    assert_eq!(crypto.calls().verify, 0);
}

#[rstest]
#[case::empty(&[])]
#[case::garbage(&[0xde, 0xad, 0xbe, 0xef])]
#[case::truncated(&[0x74, 0x29, 0x30, 0x27, 0xa0, 0x03])]
#[case::other_application_tag(&[0x6e, 0x03, 0x02, 0x01, 0x05])]
#[case::universal_sequence(&[0x30, 0x03, 0x02, 0x01, 0x05])]
fn malformed_input(#[case] input: &[u8]) {
    let engine = engine_with_clock(Arc::new(FixedClock::default()));
    let mut pair = ContextPair::new(AuthContextFlags::DO_TIME);

    let error = engine.unprotect(&mut pair.acceptor, input).unwrap_err();

    assert!(matches!(error.kind(), KrbMsgErrorKind::Decode(_)));
    assert_eq!(error.kind().krb_error_code(), None);
}

#[rstest]
#[case::safe(ProtectionMode::Safe)]
#[case::priv_(ProtectionMode::Priv)]
fn trailing_bytes_are_rejected(#[case] mode: ProtectionMode) {
    let engine = engine_with_clock(Arc::new(FixedClock::default()));
    let mut pair = ContextPair::new(AuthContextFlags::DO_TIME);

    let mut wire = engine.protect(&mut pair.initiator, b"hej", mode).unwrap();
    wire.push(0x00);

    let error = engine.unprotect(&mut pair.acceptor, &wire).unwrap_err();

    assert!(matches!(error.kind(), KrbMsgErrorKind::Decode(_)));
}

#[test]
fn priv_fed_to_safe_reader_is_a_decode_error() {
    let engine = engine_with_clock(Arc::new(FixedClock::default()));
    let mut pair = ContextPair::new(AuthContextFlags::DO_TIME);

    let wire = engine.protect(&mut pair.initiator, b"hej", ProtectionMode::Priv).unwrap();
    let error = engine.verifier().read_safe(&mut pair.acceptor, &wire).unwrap_err();

    assert!(matches!(error.kind(), KrbMsgErrorKind::Decode(_)));
    assert_eq!(error.context, "read_safe");
}

#[rstest]
#[case::late(301, false)]
#[case::early(-301, false)]
#[case::late_at_limit(300, true)]
#[case::early_at_limit(-300, true)]
#[case::exact(0, true)]
fn clock_skew(
    #[case] receiver_offset: i64,
    #[case] accepted: bool,
    #[values(ProtectionMode::Safe, ProtectionMode::Priv)] mode: ProtectionMode,
) {
    let sender_clock = Arc::new(FixedClock::default());
    let receiver_clock = Arc::new(FixedClock::new(KerberosTimestamp::new(
        REFERENCE_SECONDS + receiver_offset,
        REFERENCE_USEC,
    )));
    let sending_engine = engine_with_clock(sender_clock);
    let receiving_engine = engine_with_clock(receiver_clock);
    let mut pair = ContextPair::new(AuthContextFlags::DO_TIME | AuthContextFlags::DO_SEQUENCE);

    let wire = sending_engine.protect(&mut pair.initiator, b"hej", mode).unwrap();
    let result = receiving_engine.unprotect(&mut pair.acceptor, &wire);

    if accepted {
        result.unwrap();
        assert_eq!(pair.acceptor.remote_seq_number(), 1);
    } else {
        assert_rejected(result, "clock skew too great");
        assert_eq!(pair.acceptor.remote_seq_number(), 0);
    }
}

#[test]
fn skew_is_not_checked_without_time_flag() {
    let sending_engine = engine_with_clock(Arc::new(FixedClock::default()));
    let receiving_engine = engine_with_clock(Arc::new(FixedClock::new(KerberosTimestamp::new(
        REFERENCE_SECONDS + 86_400,
        0,
    ))));
    let mut pair = ContextPair::new(AuthContextFlags::DO_SEQUENCE);

    let wire = sending_engine.protect(&mut pair.initiator, b"hej", ProtectionMode::Safe).unwrap();

    receiving_engine.unprotect(&mut pair.acceptor, &wire).unwrap();
}

#[test]
fn missing_timestamp_with_time_flag() {
    let engine = engine_with_clock(Arc::new(FixedClock::default()));
    let mut pair = ContextPair::new(AuthContextFlags::DO_TIME);

    let wire = engine.protect(&mut pair.initiator, b"hej", ProtectionMode::Safe).unwrap();
    let without_usec = rewrite_safe(&wire, |krb_safe| krb_safe.safe_body.usec = None);
    let without_timestamp = rewrite_safe(&wire, |krb_safe| krb_safe.safe_body.timestamp = None);

    assert_rejected(engine.unprotect(&mut pair.acceptor, &without_usec), "clock skew too great");
    assert_rejected(engine.unprotect(&mut pair.acceptor, &without_timestamp), "clock skew too great");
}

#[test]
fn custom_skew_window() {
    let sending_engine = engine_with_clock(Arc::new(FixedClock::default()));
    let receiving_engine = engine_with_clock(Arc::new(FixedClock::new(KerberosTimestamp::new(
        REFERENCE_SECONDS + 10,
        0,
    ))));

    let mut sender = SecurityContext::builder(session_key()).build();
    let mut strict = SecurityContext::builder(session_key())
        .max_skew(core::time::Duration::from_secs(5))
        .build();

    let wire = sending_engine.protect(&mut sender, b"hej", ProtectionMode::Safe).unwrap();

    assert_rejected(receiving_engine.unprotect(&mut strict, &wire), "clock skew too great");
}

#[test]
fn first_failing_check_wins() {
    let engine = engine_with_clock(Arc::new(FixedClock::default()));
    let mut pair = ContextPair::new(AuthContextFlags::DO_TIME | AuthContextFlags::DO_SEQUENCE);
    pair.acceptor.set_addrs(Some(acceptor_address()), Some(other_address()));

    let wire = engine.protect(&mut pair.initiator, b"hej", ProtectionMode::Safe).unwrap();

    // Out of order and from the wrong sender with a weak checksum type
    pair.acceptor.set_remote_seq_number(7);
    let forged = rewrite_safe(&wire, |krb_safe| krb_safe.cksum.cksumtype = 7);
    assert_rejected(engine.unprotect(&mut pair.acceptor, &forged), "inappropriate checksum type 7");

    // Out of order and from the wrong sender
    assert_rejected(engine.unprotect(&mut pair.acceptor, &wire), "address mismatch");

    // Out of order only
    pair.acceptor.set_addrs(Some(acceptor_address()), Some(initiator_address()));
    assert_rejected(
        engine.unprotect(&mut pair.acceptor, &wire),
        "out of order: expected sequence number 8, got 1",
    );
}
