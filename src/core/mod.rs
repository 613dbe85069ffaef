//! Core data types for pairwise alignment results.
//!
//! - [`AlignedPair`]: the hit row, mid-line and query row of one alignment
//! - [`Cigar`]: run-length encoded alignment operations
//! - [`RawHit`] / [`Match`]: aligner hits before and after strand normalisation
//! - [`Strand`], [`PositionKey`]: small shared value types
//! - [`sequence`]: reverse-complement and base filtering helpers

pub mod alignment;
pub mod cigar;
pub mod hit;
pub mod sequence;
pub mod types;

pub use alignment::AlignedPair;
pub use cigar::{Cigar, CigarOp, CigarRun};
pub use hit::{Match, RawHit};
pub use types::{PositionKey, Strand, UNRESOLVED};
