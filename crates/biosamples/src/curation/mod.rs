//! Content-addressed curation objects.
//!
//! A [`Curation`] is a pre/post change set whose identity is the hash of its
//! content. A [`CurationLink`] attaches a curation to a sample. Neither is
//! ever mutated after construction.
//!
//! # Usage
//!
//! ```
//! use biosamples::curation::Curation;
//! use biosamples::model::Attribute;
//!
//! let a = Curation::attributes(
//!     [Attribute::new("organism", "human"), Attribute::new("sex", "F")],
//!     [Attribute::new("organism", "Homo sapiens")],
//! );
//! let b = Curation::attributes(
//!     [Attribute::new("sex", "F"), Attribute::new("organism", "human")],
//!     [Attribute::new("organism", "Homo sapiens")],
//! );
//!
//! assert_eq!(a.hash(), b.hash());
//! ```

#[allow(clippy::module_inception)]
mod curation;
mod link;

pub use curation::{apply_all, Curation};
pub use link::{link_hash, CurationLink};
