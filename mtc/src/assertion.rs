// Merkle Tree Certificates: assertion / claim data model (C2).
//
// SPDX-License-Identifier: Apache-2.0

//! Subject bindings ([`Assertion`]) and the claims they carry
//! ([`Claim`]/[`ClaimList`]): DNS name lists and IP address lists, each
//! required to be stored in a canonical order so that two issuers given
//! the same set of names/addresses always produce byte-identical
//! assertions. [`create_assertion`] is the only supported constructor for
//! a fully-populated assertion; it sorts inputs and assembles claims in a
//! fixed order before handing them to [`Assertion::new`].

use std::io;

use mtc_codec::{tagged_union, wire_enum, Decode, Encode, Error, OpaqueVector, Skip, Validate, Vector};

use crate::ip::{IPv4Address, IPv6Address};

wire_enum! {
    #[repr(u16)]
    /// The kind of subject a certificate's assertion binds to. Only `tls`
    /// (a TLS server public key) is defined.
    pub enum SubjectType {
        /// A TLS server, identified by its public key.
        Tls = 0,
    }
}

/// Opaque subject-identifying bytes (for `SubjectType::Tls`, a serialized
/// public key). Non-empty: `create_assertion` always binds a subject to at
/// least some identifying material.
pub type SubjectInfo = OpaqueVector<1, 65535>;

wire_enum! {
    #[repr(u16)]
    /// Which kind of claim a [`Claim`] carries.
    pub enum ClaimType {
        /// A list of DNS names the subject is authoritative for.
        Dns = 0,
        /// A list of DNS wildcard names the subject is authoritative for.
        DnsWildcard = 1,
        /// A list of IPv4 addresses bound to the subject.
        Ipv4 = 2,
        /// A list of IPv6 addresses bound to the subject.
        Ipv6 = 3,
    }
}

fn is_dns_char(b: u8) -> bool { b.is_ascii_alphanumeric() || b == b'-' || b == b'.' }

/// One DNS (or DNS-wildcard) name: 1 to 255 bytes, restricted to
/// `[a-z0-9-.]` case-insensitively. Original casing is preserved on the
/// wire; only the sort comparator in [`sort_dns_names`] is
/// case-insensitive.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DNSName(OpaqueVector<1, 255>);

impl DNSName {
    /// Constructs a DNS name, validating its charset unless validation is
    /// globally disabled.
    pub fn new(name: impl Into<Vec<u8>>) -> Result<Self, Error> {
        let inner = OpaqueVector::<1, 255>::new(name)?;
        let dns = DNSName(inner);
        if mtc_codec::validation_enabled() {
            dns.validate()?;
        }
        Ok(dns)
    }

    /// Returns the name's raw bytes, in their originally supplied casing.
    pub fn as_bytes(&self) -> &[u8] { self.0.as_bytes() }

    /// The lowercased, reversed-dotted-component sort key used by
    /// [`sort_dns_names`]: `"sub1.example.com"` sorts as `"com.example.sub1"`.
    fn sort_key(&self) -> Vec<u8> {
        let lower = self.0.as_bytes().to_ascii_lowercase();
        let text = std::str::from_utf8(&lower).expect("validated DNS name is ASCII");
        let mut parts: Vec<&str> = text.split('.').collect();
        parts.reverse();
        parts.join(".").into_bytes()
    }
}

impl Validate for DNSName {
    fn validate(&self) -> Result<(), Error> {
        if !self.0.as_bytes().iter().all(|&b| is_dns_char(b)) {
            return Err(Error::validation(
                "DNS name must match [a-z0-9-.]+ case-insensitively",
            ));
        }
        Ok(())
    }
}

impl Encode for DNSName {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> { self.0.encode(w) }
}

impl Decode for DNSName {
    fn decode(r: &mut impl io::Read) -> Result<Self, Error> {
        let inner = OpaqueVector::<1, 255>::decode(r)?;
        let dns = DNSName(inner);
        if mtc_codec::validation_enabled() {
            dns.validate()?;
        }
        Ok(dns)
    }
}

impl Skip for DNSName {
    fn skip(r: &mut impl io::Read) -> Result<(), Error> { OpaqueVector::<1, 255>::skip(r) }
}

/// Sorts DNS names by reversed dotted components, case-insensitively
/// (TLD-major order): `example.com < sub1.example.com < SUB2.EXAMPLE.COM <
/// example.net`.
pub fn sort_dns_names(names: &mut [DNSName]) { names.sort_by(|a, b| a.sort_key().cmp(&b.sort_key())); }

fn is_sorted_by_key<T>(items: &[T], key: impl Fn(&T) -> Vec<u8>) -> bool {
    items.windows(2).all(|w| key(&w[0]) <= key(&w[1]))
}

/// A canonically-sorted, non-empty list of DNS names: `Vector<DNSName, 1,
/// 65535>` (prefix width 2) plus the sortedness invariant.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DNSNameList(Vector<DNSName, 1, 65535>);

impl DNSNameList {
    /// Constructs a DNS name list, validating that it is already sorted
    /// (per [`sort_dns_names`]) unless validation is globally disabled.
    /// Callers that built the list from unsorted input should call
    /// [`sort_dns_names`] first.
    pub fn new(names: impl Into<Vec<DNSName>>) -> Result<Self, Error> {
        let inner = Vector::<DNSName, 1, 65535>::new(names.into())?;
        let list = DNSNameList(inner);
        if mtc_codec::validation_enabled() {
            list.validate()?;
        }
        Ok(list)
    }

    /// Returns the names as a slice.
    pub fn as_slice(&self) -> &[DNSName] { self.0.as_slice() }
}

impl Validate for DNSNameList {
    fn validate(&self) -> Result<(), Error> {
        if !is_sorted_by_key(self.0.as_slice(), DNSName::sort_key) {
            return Err(Error::validation("DNS name list is not in canonical sorted order"));
        }
        Ok(())
    }
}

impl Encode for DNSNameList {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> { self.0.encode(w) }
}

impl Decode for DNSNameList {
    fn decode(r: &mut impl io::Read) -> Result<Self, Error> {
        let inner = Vector::<DNSName, 1, 65535>::decode(r)?;
        let list = DNSNameList(inner);
        if mtc_codec::validation_enabled() {
            list.validate()?;
        }
        Ok(list)
    }
}

/// A canonically-sorted (numeric), non-empty list of IPv4 addresses:
/// `Vector<IPv4Address, 4, 65535>` (prefix width 2).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IPv4AddressList(Vector<IPv4Address, 4, 65535>);

impl IPv4AddressList {
    /// Constructs an IPv4 address list, validating numeric sort order
    /// unless validation is globally disabled. Callers should `.sort()`
    /// unsorted input first (the derived `Ord` on [`IPv4Address`] is
    /// already numeric address order).
    pub fn new(addrs: impl Into<Vec<IPv4Address>>) -> Result<Self, Error> {
        let inner = Vector::<IPv4Address, 4, 65535>::new(addrs.into())?;
        let list = IPv4AddressList(inner);
        if mtc_codec::validation_enabled() {
            list.validate()?;
        }
        Ok(list)
    }

    /// Returns the addresses as a slice.
    pub fn as_slice(&self) -> &[IPv4Address] { self.0.as_slice() }
}

impl Validate for IPv4AddressList {
    fn validate(&self) -> Result<(), Error> {
        if !self.0.as_slice().windows(2).all(|w| w[0] <= w[1]) {
            return Err(Error::validation("IPv4 address list is not in numeric sorted order"));
        }
        Ok(())
    }
}

impl Encode for IPv4AddressList {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> { self.0.encode(w) }
}

impl Decode for IPv4AddressList {
    fn decode(r: &mut impl io::Read) -> Result<Self, Error> {
        let inner = Vector::<IPv4Address, 4, 65535>::decode(r)?;
        let list = IPv4AddressList(inner);
        if mtc_codec::validation_enabled() {
            list.validate()?;
        }
        Ok(list)
    }
}

/// A canonically-sorted (numeric), non-empty list of IPv6 addresses:
/// `Vector<IPv6Address, 16, 65535>` (prefix width 2).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct IPv6AddressList(Vector<IPv6Address, 16, 65535>);

impl IPv6AddressList {
    /// Constructs an IPv6 address list, validating numeric sort order
    /// unless validation is globally disabled.
    pub fn new(addrs: impl Into<Vec<IPv6Address>>) -> Result<Self, Error> {
        let inner = Vector::<IPv6Address, 16, 65535>::new(addrs.into())?;
        let list = IPv6AddressList(inner);
        if mtc_codec::validation_enabled() {
            list.validate()?;
        }
        Ok(list)
    }

    /// Returns the addresses as a slice.
    pub fn as_slice(&self) -> &[IPv6Address] { self.0.as_slice() }
}

impl Validate for IPv6AddressList {
    fn validate(&self) -> Result<(), Error> {
        if !self.0.as_slice().windows(2).all(|w| w[0] <= w[1]) {
            return Err(Error::validation("IPv6 address list is not in numeric sorted order"));
        }
        Ok(())
    }
}

impl Encode for IPv6AddressList {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> { self.0.encode(w) }
}

impl Decode for IPv6AddressList {
    fn decode(r: &mut impl io::Read) -> Result<Self, Error> {
        let inner = Vector::<IPv6Address, 16, 65535>::decode(r)?;
        let list = IPv6AddressList(inner);
        if mtc_codec::validation_enabled() {
            list.validate()?;
        }
        Ok(list)
    }
}

tagged_union! {
    /// A typed claim about the subject: one of the four shapes named by
    /// [`ClaimType`]. The doubly-indirect representation from the data
    /// model (tag + type-specific body) is flattened here since, unlike
    /// `TrustAnchor`/`Proof`, claims are never skipped individually — a
    /// [`ClaimList`]'s `Skip` seeks its whole byte budget at once.
    pub enum Claim: ClaimType {
        Dns(DNSNameList) = ClaimType::Dns,
        DnsWildcard(DNSNameList) = ClaimType::DnsWildcard,
        Ipv4(IPv4AddressList) = ClaimType::Ipv4,
        Ipv6(IPv6AddressList) = ClaimType::Ipv6,
    }
}

/// A list of claims: `Vector<Claim, 0, 65535>` (prefix width 2), empty
/// permitted.
pub type ClaimList = Vector<Claim, 0, 65535>;

/// A subject binding plus the claims made about it: `{subject_type,
/// subject_info, claims}`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Assertion {
    /// The kind of subject this assertion binds.
    pub subject_type: SubjectType,
    /// Opaque subject-identifying bytes.
    pub subject_info: SubjectInfo,
    /// The claims made about the subject.
    pub claims: ClaimList,
}

impl Encode for Assertion {
    fn encode(&self, w: &mut impl io::Write) -> Result<(), Error> {
        self.subject_type.encode(w)?;
        self.subject_info.encode(w)?;
        self.claims.encode(w)
    }
}

impl Decode for Assertion {
    fn decode(r: &mut impl io::Read) -> Result<Self, Error> {
        Ok(Assertion {
            subject_type: SubjectType::decode(r)?,
            subject_info: SubjectInfo::decode(r)?,
            claims: ClaimList::decode(r)?,
        })
    }
}

impl Skip for Assertion {
    fn skip(r: &mut impl io::Read) -> Result<(), Error> {
        SubjectType::skip(r)?;
        SubjectInfo::skip(r)?;
        ClaimList::skip(r)
    }
}

/// A batch's full assertion list: `Vector<Assertion, 0, 2^64-1>` (8-byte
/// prefix), so a batch is bounded only by its encoded byte size fitting in
/// a `u64`.
pub type Assertions = Vector<Assertion, 0, { u64::MAX as usize }>;

/// Builds an [`Assertion`] from its constituent parts, sorting DNS and IP
/// claims into canonical order and assembling present claims in the fixed
/// order `dns, dns_wildcard, ipv4, ipv6` (required by this crate's test
/// suite, not by the wire format itself).
pub fn create_assertion(
    subject_info: impl Into<Vec<u8>>,
    dns: Option<Vec<DNSName>>,
    dns_wildcard: Option<Vec<DNSName>>,
    ipv4: Option<Vec<IPv4Address>>,
    ipv6: Option<Vec<IPv6Address>>,
) -> Result<Assertion, Error> {
    let mut claims = Vec::new();

    if let Some(mut names) = dns {
        sort_dns_names(&mut names);
        claims.push(Claim::Dns(DNSNameList::new(names)?));
    }
    if let Some(mut names) = dns_wildcard {
        sort_dns_names(&mut names);
        claims.push(Claim::DnsWildcard(DNSNameList::new(names)?));
    }
    if let Some(mut addrs) = ipv4 {
        addrs.sort();
        claims.push(Claim::Ipv4(IPv4AddressList::new(addrs)?));
    }
    if let Some(mut addrs) = ipv6 {
        addrs.sort();
        claims.push(Claim::Ipv6(IPv6AddressList::new(addrs)?));
    }

    Ok(Assertion {
        subject_type: SubjectType::Tls,
        subject_info: SubjectInfo::new(subject_info)?,
        claims: ClaimList::new(claims)?,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use mtc_codec::test_helpers::{assert_round_trips, assert_skip_matches_decode};

    #[test]
    fn dns_sort_matches_spec_example() {
        let mut names = vec![
            DNSName::new(b"SUB2.EXAMPLE.COM".to_vec()).unwrap(),
            DNSName::new(b"example.com".to_vec()).unwrap(),
            DNSName::new(b"sub1.example.com".to_vec()).unwrap(),
            DNSName::new(b"example.net".to_vec()).unwrap(),
        ];
        sort_dns_names(&mut names);
        let rendered: Vec<&[u8]> = names.iter().map(DNSName::as_bytes).collect();
        assert_eq!(
            rendered,
            vec![
                b"example.com".as_slice(),
                b"sub1.example.com".as_slice(),
                b"SUB2.EXAMPLE.COM".as_slice(),
                b"example.net".as_slice(),
            ]
        );
    }

    #[test]
    fn rejects_malformed_dns_name() {
        assert!(DNSName::new(b"not a valid host!".to_vec()).is_err());
    }

    #[test]
    fn create_assertion_orders_claims_dns_first() {
        let assertion = create_assertion(
            b"some subject info".to_vec(),
            Some(vec![
                DNSName::new(b"cloudflareresearch.com".to_vec()).unwrap(),
                DNSName::new(b"cloudflare.com".to_vec()).unwrap(),
            ]),
            None,
            Some(vec![IPv4Address::new([1, 2, 3, 4]), IPv4Address::new([1, 1, 1, 1])]),
            None,
        )
        .unwrap();

        assert!(matches!(assertion.claims.as_slice()[0], Claim::Dns(_)));
        assert!(matches!(assertion.claims.as_slice()[1], Claim::Ipv4(_)));
        if let Claim::Ipv4(ref list) = assertion.claims.as_slice()[1] {
            assert_eq!(list.as_slice()[0], IPv4Address::new([1, 1, 1, 1]));
        }
    }

    #[test]
    fn assertion_round_trips_and_skips() {
        let assertion = create_assertion(
            b"info".to_vec(),
            None,
            None,
            Some(vec![IPv4Address::new([192, 168, 1, 1])]),
            None,
        )
        .unwrap();
        assert_round_trips(&assertion);
        assert_skip_matches_decode(&assertion, &[0xAB, 0xCD]);
    }
}
