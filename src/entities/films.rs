use sea_orm::entity::prelude::*;

/// Movies and episodes share this table. The three discriminator columns
/// (`series_id`, `season_number`, `episode_number`) are all null for a movie
/// and all set for an episode.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "films")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub series_id: Option<i32>,

    pub season_number: Option<i32>,

    pub episode_number: Option<i32>,

    pub title: String,

    pub descriptions: Option<String>,

    pub date_released: Date,

    /// Runtime in minutes
    pub duration: Option<i32>,

    pub contributed_by: i32,

    pub contributed_at: DateTimeUtc,

    pub invalidation: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::serieses::Entity",
        from = "Column::SeriesId",
        to = "super::serieses::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Serieses,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ContributedBy",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::serieses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Serieses.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
