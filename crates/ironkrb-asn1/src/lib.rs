#![doc = include_str!("../README.md")]

mod application;
pub mod constants;
mod data_types;
mod messages;

// Re-export der crate for convenience
#[rustfmt::skip] // do not re-order this pub use
pub use der;

pub use self::application::ApplicationTagged;
pub use self::data_types::{Checksum, EncryptedData, HostAddress, Int32, KerberosTime, Microseconds, UInt32};
pub use self::messages::{
    peek_message_kind, EncKrbPrivPart, EncKrbPrivPartInner, KrbPriv, KrbPrivInner, KrbSafe, KrbSafeBody, KrbSafeInner,
    MessageKind, ProtectedMessage,
};

/// Decodes a complete DER value, rejecting trailing bytes.
pub fn decode<'a, T>(src: &'a [u8]) -> der::Result<T>
where
    T: der::Decode<'a>,
{
    T::from_der(src)
}

/// Decodes a DER value from the start of `src` and returns it along the number of bytes it spans.
///
/// Whatever follows the value is left untouched. This is how the decrypted `EncKrbPrivPart`
/// is read, since the cipher output carries padding after the structure.
pub fn decode_prefix<'a, T>(src: &'a [u8]) -> der::Result<(T, usize)>
where
    T: der::Decode<'a>,
{
    use der::Reader as _;

    let mut reader = der::SliceReader::new(src)?;
    let value = T::decode(&mut reader)?;
    let consumed = usize::try_from(reader.position())?;

    Ok((value, consumed))
}

/// Encodes a value into a freshly allocated DER buffer.
pub fn encode<T>(value: &T) -> der::Result<Vec<u8>>
where
    T: der::Encode,
{
    value.to_der()
}
