//! Accession grammar and allocation.
//!
//! Accessions match `^[A-Z]+[0-9]+$`. New ones are drawn from one atomic
//! counter per namespace (samples `SAMEA…`, groups `SAMEG…`, SRA `ERS…` by
//! default).

mod allocator;
mod grammar;

pub use allocator::{AccessionAllocator, Namespace};
pub use grammar::Accession;
