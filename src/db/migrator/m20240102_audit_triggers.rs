use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const FILM_COLUMNS: &str = "id, series_id, season_number, episode_number, title, descriptions, \
     date_released, duration, contributed_by, contributed_at, invalidation";

const FILM_VALUES: &str = "NEW.id, NEW.series_id, NEW.season_number, NEW.episode_number, NEW.title, \
     NEW.descriptions, NEW.date_released, NEW.duration, NEW.contributed_by, NEW.contributed_at, \
     NEW.invalidation";

const SERIES_COLUMNS: &str = "id, title, descriptions, date_started, date_ended, contributed_by, \
     contributed_at, invalidation";

const SERIES_VALUES: &str = "NEW.id, NEW.title, NEW.descriptions, NEW.date_started, NEW.date_ended, \
     NEW.contributed_by, NEW.contributed_at, NEW.invalidation";

/// One snapshot row per inserted or updated row. An upsert that hits a
/// conflict fires only the update trigger.
fn audit_trigger(name: &str, event: &str, table: &str, columns: &str, values: &str) -> String {
    format!(
        "CREATE TRIGGER IF NOT EXISTS {name} AFTER {event} ON {table} \
         BEGIN INSERT INTO {table}_audit ({columns}) VALUES ({values}); END"
    )
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        for (name, event) in [("films_audit_insert", "INSERT"), ("films_audit_update", "UPDATE")] {
            conn.execute_unprepared(&audit_trigger(name, event, "films", FILM_COLUMNS, FILM_VALUES))
                .await?;
        }

        for (name, event) in [
            ("serieses_audit_insert", "INSERT"),
            ("serieses_audit_update", "UPDATE"),
        ] {
            conn.execute_unprepared(&audit_trigger(
                name,
                event,
                "serieses",
                SERIES_COLUMNS,
                SERIES_VALUES,
            ))
            .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        for name in [
            "films_audit_insert",
            "films_audit_update",
            "serieses_audit_insert",
            "serieses_audit_update",
        ] {
            conn.execute_unprepared(&format!("DROP TRIGGER IF EXISTS {name}"))
                .await?;
        }

        Ok(())
    }
}
