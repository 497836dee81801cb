//! Weighted academic-score aggregation.
//!
//! This module normalizes grade tokens and percentages into grade points,
//! computes credit-weighted averages over overlapping categories, selects
//! "last N credits" windows, and classifies percentage averages into bands.
//! Every operation is a pure function of its inputs and the scheme's tables.

pub mod aggregate;
pub mod classify;
pub mod normalize;
pub mod report;
pub mod types;
pub mod validate;
pub mod window;
