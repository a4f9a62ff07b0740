use sea_orm::entity::prelude::*;

/// Append-only snapshots of `serieses` rows, written by triggers.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "serieses_audit")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub audit_id: i32,

    pub id: i32,
    pub title: String,
    pub descriptions: Option<String>,
    pub date_started: Date,
    pub date_ended: Option<Date>,
    pub contributed_by: i32,
    pub contributed_at: DateTimeUtc,
    pub invalidation: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
