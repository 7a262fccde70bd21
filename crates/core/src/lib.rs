//! Core business logic for Chancery.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! The persistence layer plugs in through the `ApprovalStore` trait.
//!
//! # Modules
//!
//! - `workflow` - Document signature / rejection workflow

pub mod workflow;
