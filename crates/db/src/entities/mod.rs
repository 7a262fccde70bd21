//! `SeaORM` entity definitions.
//!
//! Document stores are not modelled as entities: they are addressed
//! through `StoreDescriptor`s so one code path serves all four kinds.

pub mod contacts;
pub mod document_signatures;
pub mod document_statuses;
pub mod organizations;
pub mod users;
