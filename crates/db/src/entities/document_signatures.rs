//! `SeaORM` Entity for the document_signatures audit table.
//!
//! Rows are append-only; a database trigger rejects UPDATE and DELETE.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "document_signatures")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub document_kind: String,
    pub document_id: i64,
    pub action: String,
    pub resolution_text: Option<String>,
    pub rejection_reason: Option<String>,
    pub assigned_executor_id: Option<i64>,
    pub assigned_due_date: Option<Date>,
    pub signed_by: i64,
    pub signed_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contacts::Entity",
        from = "Column::AssignedExecutorId",
        to = "super::contacts::Column::Id"
    )]
    AssignedExecutor,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SignedBy",
        to = "super::users::Column::Id"
    )]
    Signer,
}

impl Related<super::contacts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignedExecutor.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Signer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
