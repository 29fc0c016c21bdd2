use std::net::SocketAddr;

use ironkrb_asn1::{der, HostAddress};

/// Type-exact and byte-exact comparison.
pub fn addresses_match(expected: &HostAddress, received: &HostAddress) -> bool {
    expected.addr_type == received.addr_type && expected.as_bytes() == received.as_bytes()
}

/// Passes when either side is absent, otherwise requires [`addresses_match`].
pub fn address_check(context_address: Option<&HostAddress>, message_address: Option<&HostAddress>) -> bool {
    match (context_address, message_address) {
        (Some(expected), Some(received)) => addresses_match(expected, received),
        _ => true,
    }
}

/// Host part of a socket endpoint, the port is not part of a Kerberos host address.
pub fn host_address_from_socket(endpoint: SocketAddr) -> der::Result<HostAddress> {
    HostAddress::from_ip(endpoint.ip())
}
