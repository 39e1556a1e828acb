//! Canonical serialisation and content hashing.
//!
//! Content-addressed objects (curations, curation links, external references)
//! derive their identity from a SHA-256 digest over a framed, ordered field
//! sequence. URLs are normalised per RFC 3986 before they are hashed.

mod hasher;
mod reference_url;

pub use hasher::{write_set, Canonical, CanonicalHasher, ContentHash};
pub use reference_url::{normalize_reference_url, NormalizedUrl};
