// MTC codec: fixed-width admissible-value enumerations.
//
// SPDX-License-Identifier: Apache-2.0

//! Declares [`wire_enum`], which generates a C-like enum whose wire
//! encoding is a fixed-width unsigned integer and whose decoder rejects any
//! value outside the declared set (`Distinguisher`, `SubjectType`,
//! `ClaimType`, `ProofType` and `NodeBranching` are all instances of this
//! shape). This mirrors the admissible-value checking that
//! `strict_encoding`'s derive macro performs for `#[repr(u8)]` enums, done
//! by hand here since this crate does not carry a proc-macro counterpart.

/// Declares an enum whose wire representation is a fixed-width big-endian
/// integer, together with [`Encode`](crate::Encode), [`Decode`](crate::Decode)
/// and [`Skip`](crate::Skip) implementations that reject unrecognized values
/// with [`Error::EnumValueNotKnown`](crate::Error::EnumValueNotKnown).
///
/// ```ignore
/// wire_enum! {
///     #[repr(u8)]
///     pub enum Distinguisher {
///         HashEmptyInput = 0,
///         HashNodeInput = 1,
///         HashAssertionInput = 2,
///     }
/// }
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        #[repr($int:ty)]
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = $value:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr($int)]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant = $value,
            )+
        }

        impl $name {
            /// Returns the raw wire value of this variant.
            pub const fn to_raw(self) -> $int { self as $int }

            /// Recovers the variant corresponding to a raw wire value, if any.
            pub const fn from_raw(value: $int) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl ::std::convert::TryFrom<$int> for $name {
            type Error = $crate::Error;

            fn try_from(value: $int) -> Result<Self, Self::Error> {
                Self::from_raw(value).ok_or($crate::Error::EnumValueNotKnown(
                    stringify!($name),
                    value as u64,
                ))
            }
        }

        impl From<$name> for $int {
            fn from(variant: $name) -> $int { variant.to_raw() }
        }

        impl $crate::Encode for $name {
            fn encode(&self, w: &mut impl ::std::io::Write) -> Result<(), $crate::Error> {
                self.to_raw().encode(w)
            }
        }

        impl $crate::Decode for $name {
            fn decode(r: &mut impl ::std::io::Read) -> Result<Self, $crate::Error> {
                let raw = <$int as $crate::Decode>::decode(r)?;
                ::std::convert::TryFrom::try_from(raw)
            }
        }

        impl $crate::Skip for $name {
            fn skip(r: &mut impl ::std::io::Read) -> Result<(), $crate::Error> {
                <$int as $crate::Skip>::skip(r)
            }
        }
    };
}

#[cfg(test)]
mod test {
    use crate::{deserialize, serialize, Error};

    wire_enum! {
        #[repr(u8)]
        /// Test fixture mirroring `Distinguisher`'s shape.
        pub enum Fixture {
            Zero = 0,
            Two = 2,
        }
    }

    #[test]
    fn round_trips_known_values() {
        assert_eq!(serialize(&Fixture::Two), vec![2]);
        assert_eq!(deserialize::<Fixture>(&[0]).unwrap(), Fixture::Zero);
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(matches!(
            deserialize::<Fixture>(&[1]),
            Err(Error::EnumValueNotKnown("Fixture", 1))
        ));
    }
}
