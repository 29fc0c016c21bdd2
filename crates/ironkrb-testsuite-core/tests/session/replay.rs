use std::sync::Arc;

use ironkrb_asn1::der::asn1::OctetString;
use ironkrb_asn1::der::Decode as _;
use ironkrb_asn1::KrbSafe;
use ironkrb_session::{
    AuthContextFlags, Authenticator, KerberosTimestamp, MemoryReplayCache, ProtectionMode, ReplayCache,
    SecurityContext, DEFAULT_REPLAY_CACHE_CAPACITY,
};
use ironkrb_testsuite_core::{engine_with_clock, session_key, ContextPair, FixedClock};
use rstest::rstest;

use super::assert_rejected;

#[rstest]
#[case::safe(ProtectionMode::Safe)]
#[case::priv_(ProtectionMode::Priv)]
fn same_authenticator_twice(#[case] mode: ProtectionMode) {
    let cache = Arc::new(MemoryReplayCache::default());
    let engine = engine_with_clock(Arc::new(FixedClock::default())).with_replay_cache(cache);
    let mut pair = ContextPair::new(AuthContextFlags::DO_TIME);

    let wire = engine.protect(&mut pair.initiator, b"once", mode).unwrap();

    engine.unprotect(&mut pair.acceptor, &wire).unwrap();
    assert_rejected(engine.unprotect(&mut pair.acceptor, &wire), "message is a replay");
}

#[test]
fn distinct_timestamps_are_accepted() {
    let clock = Arc::new(FixedClock::default());
    let cache = Arc::new(MemoryReplayCache::default());
    let engine = engine_with_clock(Arc::clone(&clock)).with_replay_cache(Arc::<MemoryReplayCache>::clone(&cache));
    let mut pair = ContextPair::new(AuthContextFlags::DO_TIME);

    for _ in 0..3 {
        let wire = engine.protect(&mut pair.initiator, b"again", ProtectionMode::Safe).unwrap();
        engine.unprotect(&mut pair.acceptor, &wire).unwrap();
        clock.tick();
    }

    assert_eq!(cache.len(), 3);
}

#[rstest]
#[case::safe(ProtectionMode::Safe)]
#[case::priv_(ProtectionMode::Priv)]
fn same_microsecond_told_apart_by_sequence_number(#[case] mode: ProtectionMode) {
    // The clock never moves, both messages carry the same timestamp and usec
    let cache = Arc::new(MemoryReplayCache::default());
    let engine = engine_with_clock(Arc::new(FixedClock::default())).with_replay_cache(Arc::<MemoryReplayCache>::clone(&cache));
    let mut pair = ContextPair::new(AuthContextFlags::DO_TIME | AuthContextFlags::DO_SEQUENCE);

    let first = engine.protect(&mut pair.initiator, b"first", mode).unwrap();
    let second = engine.protect(&mut pair.initiator, b"second", mode).unwrap();

    assert_eq!(engine.unprotect(&mut pair.acceptor, &first).unwrap().user_data, b"first");
    assert_eq!(engine.unprotect(&mut pair.acceptor, &second).unwrap().user_data, b"second");
    assert_eq!(cache.len(), 2);
    assert_eq!(pair.acceptor.remote_seq_number(), 2);
}

#[test]
fn forged_message_does_not_poison_the_cache() {
    let cache = Arc::new(MemoryReplayCache::default());
    let engine = engine_with_clock(Arc::new(FixedClock::default())).with_replay_cache(Arc::<MemoryReplayCache>::clone(&cache));
    let mut pair = ContextPair::new(AuthContextFlags::DO_TIME);

    let wire = engine.protect(&mut pair.initiator, b"genuine", ProtectionMode::Safe).unwrap();

    // Same authenticator, different payload
    let mut forged = KrbSafe::from_der(&wire).unwrap();
    forged.safe_body.user_data = OctetString::new(b"forged!".as_slice()).unwrap();
    let forged = ironkrb_asn1::encode(&forged).unwrap();

    assert_rejected(engine.unprotect(&mut pair.acceptor, &forged), "checksum verification failed");
    assert!(cache.is_empty());

    assert_eq!(engine.unprotect(&mut pair.acceptor, &wire).unwrap().user_data, b"genuine");
    assert_eq!(cache.len(), 1);
}

#[test]
fn cache_is_scoped_per_context() {
    let cache = Arc::new(MemoryReplayCache::default());
    let engine = engine_with_clock(Arc::new(FixedClock::default())).with_replay_cache(cache);

    let mut sender = SecurityContext::builder(session_key()).build();
    let mut first_receiver = SecurityContext::builder(session_key()).build();
    let mut second_receiver = SecurityContext::builder(session_key()).build();

    let wire = engine.protect(&mut sender, b"broadcast", ProtectionMode::Safe).unwrap();

    engine.unprotect(&mut first_receiver, &wire).unwrap();
    engine.unprotect(&mut second_receiver, &wire).unwrap();
}

#[test]
fn without_cache_replays_go_unnoticed_when_only_time_is_checked() {
    let engine = engine_with_clock(Arc::new(FixedClock::default()));
    let mut pair = ContextPair::new(AuthContextFlags::DO_TIME);

    let wire = engine.protect(&mut pair.initiator, b"once", ProtectionMode::Safe).unwrap();

    engine.unprotect(&mut pair.acceptor, &wire).unwrap();
    engine.unprotect(&mut pair.acceptor, &wire).unwrap();
}

#[test]
fn memory_cache_check_and_insert() {
    let cache = MemoryReplayCache::default();
    let context = SecurityContext::builder(session_key()).build();
    let authenticator = Authenticator::new(KerberosTimestamp::new(1_000, 1), None);

    assert_eq!(cache.capacity(), DEFAULT_REPLAY_CACHE_CAPACITY);
    assert!(!cache.contains(context.id(), authenticator));
    assert!(cache.check_and_insert(context.id(), authenticator));
    assert!(cache.contains(context.id(), authenticator));
    assert!(!cache.check_and_insert(context.id(), authenticator));

    // Microseconds are part of the key
    assert!(cache.check_and_insert(context.id(), Authenticator::new(KerberosTimestamp::new(1_000, 2), None)));
    assert_eq!(cache.len(), 2);
}

#[test]
fn memory_cache_keys_on_sequence_number() {
    let cache = MemoryReplayCache::default();
    let id = SecurityContext::builder(session_key()).build().id();
    let timestamp = KerberosTimestamp::new(1_000, 1);

    assert!(cache.check_and_insert(id, Authenticator::new(timestamp, Some(1))));
    assert!(cache.check_and_insert(id, Authenticator::new(timestamp, Some(2))));
    assert!(cache.check_and_insert(id, Authenticator::new(timestamp, None)));
    assert!(!cache.check_and_insert(id, Authenticator::new(timestamp, Some(1))));
    assert_eq!(cache.len(), 3);
}

#[test]
fn memory_cache_forgets_oldest_entries() {
    let cache = MemoryReplayCache::new(2);
    let id = SecurityContext::builder(session_key()).build().id();

    let at = |seconds| Authenticator::new(KerberosTimestamp::new(seconds, 0), None);

    for seconds in 0..3 {
        assert!(cache.check_and_insert(id, at(seconds)));
    }

    assert_eq!(cache.len(), 2);
    assert!(!cache.contains(id, at(0)));
    assert!(cache.contains(id, at(1)));
    assert!(cache.contains(id, at(2)));
}

#[test]
fn memory_cache_holds_at_least_one_entry() {
    let cache = MemoryReplayCache::new(0);
    assert_eq!(cache.capacity(), 1);
}
