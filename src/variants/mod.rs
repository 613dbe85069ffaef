//! Variant calling and variant presence tables.
//!
//! Each haplotype's consensus is aligned together with the region reference; every
//! haplotype row is then compared with the reference row by [`call_variants`] and the
//! per-haplotype calls are collated into a [`RegionTable`].

pub mod build;
pub mod caller;
pub mod table;

pub use build::{
    build_region_table, build_variant_tables, region_references, RegionReference,
    VariantTableReport,
};
pub use caller::{call_variants, Anchor, VariantCall, VariantKind};
pub use table::{all_labels, write_variant_table, HaplotypeCalls, RegionTable, VariantRow};

use thiserror::Error;

use crate::external::ExternalToolError;
use crate::parsing::ParseError;

#[derive(Error, Debug)]
pub enum VariantError {
    #[error("Alignment rows differ in length: reference {reference}, alternate {alternate}")]
    LengthMismatch { reference: usize, alternate: usize },

    #[error("Unsupported variant at reference position {position}: {reference} -> {alternate}")]
    UnsupportedVariantShape {
        position: usize,
        reference: String,
        alternate: String,
    },

    #[error("Reference not found for region: {0}")]
    MissingReference(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Tool(#[from] ExternalToolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
