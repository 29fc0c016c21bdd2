#![doc = include_str!("../README.md")]

#[macro_use]
extern crate tracing;

#[macro_use]
mod macros;

mod address;
mod config;
mod context;
mod engine;
mod error;
mod protector;
mod replay;
mod time;
mod verifier;

pub use self::address::{address_check, addresses_match, host_address_from_socket};
pub use self::config::{AuthContextFlags, ContextConfig, DEFAULT_MAX_SKEW};
pub use self::context::{
    select_key, ContextId, SecurityContext, SecurityContextBuilder, SecurityParameters, SharedSecurityContext,
};
pub use self::engine::{MessageEngine, ProtectionMode, Unprotected};
pub use self::error::{krb_error_codes, KrbMsgError, KrbMsgErrorExt, KrbMsgErrorKind, KrbMsgResult};
pub use self::protector::MessageProtector;
pub use self::replay::{Authenticator, MemoryReplayCache, ReplayCache, DEFAULT_REPLAY_CACHE_CAPACITY};
pub use self::time::{within_skew, Clock, KerberosTimestamp, SystemClock};
pub use self::verifier::{MessageVerifier, ACCEPTED_SAFE_CHECKSUM};
