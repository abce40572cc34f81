//! Ready-made rule packs.
//!
//! - [`marc21`] — MARC21 bibliographic fields to JSON, and back

pub mod marc21;
