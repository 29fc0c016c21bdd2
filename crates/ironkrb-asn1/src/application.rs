use core::ops::{Deref, DerefMut};

use der::{DecodeValue, EncodeValue, FixedTag, Header, Length, Reader, Tag, TagNumber, Writer};

/// Wraps a value into a constructed `[APPLICATION TAG]` explicit tag.
///
/// ```not_rust
/// KRB-SAFE        ::= [APPLICATION 20] SEQUENCE { ... }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ApplicationTagged<T, const TAG: u8>(pub T);

impl<T, const TAG: u8> ApplicationTagged<T, TAG> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, const TAG: u8> From<T> for ApplicationTagged<T, TAG> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T, const TAG: u8> Deref for ApplicationTagged<T, TAG> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T, const TAG: u8> DerefMut for ApplicationTagged<T, TAG> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T, const TAG: u8> FixedTag for ApplicationTagged<T, TAG> {
    const TAG: Tag = Tag::Application {
        constructed: true,
        number: TagNumber::new(TAG),
    };
}

impl<'a, T, const TAG: u8> DecodeValue<'a> for ApplicationTagged<T, TAG>
where
    T: der::Decode<'a>,
{
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |inner| T::decode(inner)).map(Self)
    }
}

impl<T, const TAG: u8> EncodeValue for ApplicationTagged<T, TAG>
where
    T: der::Encode,
{
    fn value_len(&self) -> der::Result<Length> {
        self.0.encoded_len()
    }

    fn encode_value(&self, writer: &mut impl Writer) -> der::Result<()> {
        self.0.encode(writer)
    }
}
