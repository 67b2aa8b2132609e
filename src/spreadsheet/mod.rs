//! # Report Page Module
//!
//! Format independent view of a report: pages of sparse rows and cells, the coercion of
//! native cell values into typed values, and the search operations locating tables on a page.
//! [`sheet::GridSheet`] is the in-memory page implementation.
pub(crate) mod cell;
pub(crate) mod criteria;
pub(crate) mod dao;
pub(crate) mod page;
pub(crate) mod reference;
pub(crate) mod row;
pub(crate) mod sheet;
