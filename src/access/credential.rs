//! Credential identifiers and the authorization policy.
//!
//! A presented tag is identified by the raw UID bytes the reader returns.
//! Authorization is a plain membership test: the UID must equal, byte for
//! byte, one entry of the configured [`AuthorizedSet`].  There is no
//! cryptographic binding, so a replayed UID is indistinguishable from the
//! real tag; [`CredentialVerifier`] is the seam where a stronger scheme
//! would plug in.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Length of a stored credential identifier (ISO 14443A single-size UID).
pub const CREDENTIAL_LEN: usize = 4;

/// Longest UID a reader can return (triple-size UID).
pub const MAX_UID_LEN: usize = 10;

/// Maximum number of entries in the authorized set.
pub const MAX_AUTHORIZED: usize = 16;

/// Raw UID as read from a card, 4, 7 or 10 bytes.
pub type Uid = heapless::Vec<u8, MAX_UID_LEN>;

/// A fixed-length credential identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialId([u8; CREDENTIAL_LEN]);

impl CredentialId {
    pub const fn new(bytes: [u8; CREDENTIAL_LEN]) -> Self {
        Self(bytes)
    }

    /// Convert a raw UID.  Any length other than [`CREDENTIAL_LEN`] yields
    /// `None`.
    pub fn from_slice(raw: &[u8]) -> Option<Self> {
        raw.try_into().ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; CREDENTIAL_LEN] {
        &self.0
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        UidHex(&self.0).fmt(f)
    }
}

/// Formats raw UID bytes as space-separated upper-case hex pairs
/// (`D3 F8 02 1E`).
pub struct UidHex<'a>(pub &'a [u8]);

impl fmt::Display for UidHex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

/// Decides whether a presented UID may be granted access.
pub trait CredentialVerifier {
    /// Pure: no side effects, never fails.
    fn is_authorized(&self, uid: &[u8]) -> bool;
}

/// Byte-equality membership over a fixed list of credentials.
#[derive(Debug, Clone, Default)]
pub struct AuthorizedSet {
    entries: heapless::Vec<CredentialId, MAX_AUTHORIZED>,
}

impl AuthorizedSet {
    pub fn new(entries: heapless::Vec<CredentialId, MAX_AUTHORIZED>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CredentialId> {
        self.entries.iter()
    }
}

impl FromIterator<CredentialId> for AuthorizedSet {
    /// Entries beyond [`MAX_AUTHORIZED`] are ignored.
    fn from_iter<I: IntoIterator<Item = CredentialId>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().take(MAX_AUTHORIZED).collect(),
        }
    }
}

impl CredentialVerifier for AuthorizedSet {
    fn is_authorized(&self, uid: &[u8]) -> bool {
        let Some(id) = CredentialId::from_slice(uid) else {
            return false;
        };
        self.entries.iter().any(|e| *e == id)
    }
}
