use core::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::EncryptionType;

/// [RFC 4120 5.2.9](https://www.rfc-editor.org/rfc/rfc4120.txt)
///
/// ```not_rust
/// EncryptionKey   ::= SEQUENCE {
///         keytype         [0] Int32 -- actually encryption type --,
///         keyvalue        [1] OCTET STRING
/// }
/// ```
///
/// The key bytes are wiped when the value is dropped and never shown by `Debug`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    #[zeroize(skip)]
    key_type: EncryptionType,
    key_value: Vec<u8>,
}

impl EncryptionKey {
    pub fn new(key_type: EncryptionType, key_value: impl Into<Vec<u8>>) -> Self {
        Self {
            key_type,
            key_value: key_value.into(),
        }
    }

    pub fn key_type(&self) -> EncryptionType {
        self.key_type
    }

    pub fn key_value(&self) -> &[u8] {
        &self.key_value
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("key_type", &self.key_type)
            .field("key_value", &format_args!("<{} bytes redacted>", self.key_value.len()))
            .finish()
    }
}
