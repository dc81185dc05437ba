//! kipanel Core Types and Definitions
//!
//! This crate provides the foundational types shared by the kipanel parser
//! and panelization engine:
//!
//! - **Document**: The nested-list model of a board file ([`document`] module)
//! - **Geometry**: Points, sizes, bounds and transforms ([`geometry`] module)

pub mod document;
pub mod geometry;
