//! # Table Module
//!
//! Tables located on report pages: header column resolution, table ranges, row cursors and
//! the factories creating tables for each page implementation.
pub(crate) mod column;
pub(crate) mod factory;
pub(crate) mod range;
pub(crate) mod row;
pub(crate) mod table;
