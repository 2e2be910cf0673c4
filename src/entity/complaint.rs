//! Complaint entity for citizen-filed issue reports.
//!
//! The reference code stays NULL until the row has been inserted once;
//! it is derived from the sequence-assigned id.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "complaints")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub reference_code: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub urgency: String,
    pub location: String,
    pub submitter_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub staff_remark: String,
    pub last_status_changed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SubmitterId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Submitter,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssigneeId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Assignee,
    #[sea_orm(has_many = "super::attachment::Entity")]
    Attachments,
    #[sea_orm(has_many = "super::staff_comment::Entity")]
    StaffComments,
}

impl Related<super::attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachments.def()
    }
}

impl Related<super::staff_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StaffComments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
