//! Calculator engines backing the valuation workflows.

pub mod construction;
