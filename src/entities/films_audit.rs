use sea_orm::entity::prelude::*;

/// Append-only snapshots of `films` rows, written by triggers.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "films_audit")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub audit_id: i32,

    pub id: i32,
    pub series_id: Option<i32>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub title: String,
    pub descriptions: Option<String>,
    pub date_released: Date,
    pub duration: Option<i32>,
    pub contributed_by: i32,
    pub contributed_at: DateTimeUtc,
    pub invalidation: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
