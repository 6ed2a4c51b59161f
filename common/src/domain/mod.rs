use nutype::nutype;
use serde::{Deserialize, Serialize};

pub mod publication;
pub mod transition;

pub use publication::*;
pub use transition::*;

/// Reference to an author owned by the remote authors service. Authors are
/// never dereferenced locally; the id only has to be a plausible reference,
/// i.e. a positive integer.
#[nutype(
    validate(greater = 0),
    derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)
)]
pub struct AuthorId(i64);

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_min = 3, len_char_max = 200),
    derive(Clone, Debug, Display, AsRef, PartialEq, Eq, Serialize)
)]
pub struct PublicationTitle(String);

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_min = 10, len_char_max = 5000),
    derive(Clone, Debug, Display, AsRef, PartialEq, Eq, Serialize)
)]
pub struct PublicationDescription(String);

/// Opaque identifier assigned by the persistence layer, immutable once set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicationId(pub i64);

impl std::fmt::Display for PublicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
