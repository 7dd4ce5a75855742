// MTC codec: tagged unions and the doubly-wrapped opaque container.
//
// SPDX-License-Identifier: Apache-2.0

//! A handful of wire types are tagged unions — `Claim` (tag `ClaimType`,
//! content one of four claim shapes) and the trust-anchor/proof bodies
//! (tag `ProofType`, content a Merkle-tree-specific payload or an unknown
//! blob for forward compatibility). Because a union-typed field cannot be
//! [`Skip`](crate::Skip)'d without first inspecting its tag, every such
//! field is wire-wrapped a second time in an outer [`OpaqueVector`], whose
//! own length prefix lets a reader seek past the whole union — tag,
//! content and any trailing bytes from a future, larger proof type it does
//! not understand — without decoding it. [`Wrapped`] is that outer
//! container; [`tagged_union`] declares the inner tag-dispatched enum.

use std::io;

use crate::{deserialize, Decode, Encode, Error, OpaqueVector, Skip};

/// The outer opaque-vector wrapper around a union-typed (or otherwise
/// self-describing) field, giving it a shallow [`Skip`] that does not need
/// to understand the wrapped type's tag.
///
/// `MAX` bounds the wrapped content's encoded byte length, mirroring
/// `TrustAnchorData`/`ProofData`'s own bounds in the data model.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Wrapped<T, const MAX: usize>(T);

impl<T, const MAX: usize> Wrapped<T, MAX> {
    /// Wraps a value for encoding.
    pub fn new(value: T) -> Self { Wrapped(value) }

    /// Returns the wrapped value.
    pub fn into_inner(self) -> T { self.0 }

    /// Borrows the wrapped value.
    pub fn get(&self) -> &T { &self.0 }
}

impl<T: Encode, const MAX: usize> Encode for Wrapped<T, MAX> {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> {
        let inner_bytes = self.0.to_vec();
        let wrapper = OpaqueVector::<0, MAX>::new(inner_bytes)?;
        wrapper.encode(w)
    }
}

impl<T: Decode, const MAX: usize> Decode for Wrapped<T, MAX> {
    fn decode(r: &mut impl io::Read) -> Result<Self, Error> {
        let wrapper = OpaqueVector::<0, MAX>::decode(r)?;
        let value = deserialize::<T>(wrapper.as_bytes())?;
        Ok(Wrapped(value))
    }
}

impl<T, const MAX: usize> Skip for Wrapped<T, MAX> {
    fn skip(r: &mut impl io::Read) -> Result<(), Error> { OpaqueVector::<0, MAX>::skip(r) }
}

/// Declares a tag-dispatched union type: a fixed-width tag followed by one
/// of several content shapes, the shape determined by the tag's value. An
/// unrecognized tag fails decoding with [`Error::EnumValueNotKnown`] — this
/// macro has no notion of forward compatibility of its own. A union whose
/// content must remain readable by a party that does not recognize every
/// tag (proof types, in this crate) is not declared with `tagged_union!` at
/// all; it is given its own ad hoc type whose tag decodes permissively, and
/// its content lives behind a [`Wrapped`] container one level up so the
/// whole thing can be [`Skip`](crate::Skip)'d unread.
///
/// ```ignore
/// tagged_union! {
///     pub enum ClaimContent: ClaimType {
///         DnsNames(DNSNameList) = ClaimType::Dns,
///         DnsWildcard(DNSNameList) = ClaimType::DnsWildcard,
///     }
/// }
/// ```
#[macro_export]
macro_rules! tagged_union {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $tag_ty:ty {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident($content:ty) = $tag:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant($content),
            )+
        }

        impl $name {
            /// Returns this value's discriminant tag.
            pub fn tag(&self) -> $tag_ty {
                match self {
                    $(Self::$variant(_) => $tag,)+
                }
            }
        }

        impl $crate::Encode for $name {
            fn encode(&self, w: &mut impl ::std::io::Write) -> Result<(), $crate::Error> {
                self.tag().encode(w)?;
                match self {
                    $(Self::$variant(content) => content.encode(w),)+
                }
            }
        }

        impl $crate::Decode for $name {
            fn decode(r: &mut impl ::std::io::Read) -> Result<Self, $crate::Error> {
                let tag = <$tag_ty as $crate::Decode>::decode(r)?;
                match tag {
                    $($tag => Ok(Self::$variant(<$content as $crate::Decode>::decode(r)?)),)+
                    other => Err($crate::Error::EnumValueNotKnown(stringify!($name), other as u64)),
                }
            }
        }
    };
}

#[cfg(test)]
mod test {
    use super::Wrapped;
    use crate::{deserialize, serialize, Skip};

    type Small = Wrapped<u32, 16>;

    #[test]
    fn wraps_and_unwraps() {
        let w = Small::new(0xDEAD_BEEF);
        let bytes = serialize(&w);
        assert_eq!(bytes, [4, 0xDE, 0xAD, 0xBE, 0xEF]);
        let decoded: Small = deserialize(&bytes).unwrap();
        assert_eq!(*decoded.get(), 0xDEAD_BEEF);
    }

    #[test]
    fn skip_advances_without_decoding() {
        let w = Small::new(7);
        let mut stream = serialize(&w);
        stream.extend_from_slice(&[0xAB]);
        let mut cursor = std::io::Cursor::new(stream);
        Small::skip(&mut cursor).unwrap();
        assert_eq!(cursor.position(), 5);
    }
}
