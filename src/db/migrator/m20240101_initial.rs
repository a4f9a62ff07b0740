use crate::entities::prelude::*;
use crate::entities::{films, films_audit, serieses_audit};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Movies carry no discriminators, episodes carry all three.
const FILM_DISCRIMINATOR_CHECK: &str = "(series_id IS NULL AND season_number IS NULL AND episode_number IS NULL) \
     OR (series_id IS NOT NULL AND season_number IS NOT NULL AND episode_number IS NOT NULL)";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Serieses)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Films)
                    .if_not_exists()
                    .check(Expr::cust(FILM_DISCRIMINATOR_CHECK))
                    .to_owned(),
            )
            .await?;

        // NULLs never collide, so movies are unaffected by this index.
        manager
            .create_index(
                Index::create()
                    .name("idx_films_episode_key")
                    .table(Films)
                    .col(films::Column::SeriesId)
                    .col(films::Column::SeasonNumber)
                    .col(films::Column::EpisodeNumber)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(FilmsAudit)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_films_audit_id")
                    .table(FilmsAudit)
                    .col(films_audit::Column::Id)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(SeriesesAudit)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_serieses_audit_id")
                    .table(SeriesesAudit)
                    .col(serieses_audit::Column::Id)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SeriesesAudit).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FilmsAudit).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Films).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Serieses).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
