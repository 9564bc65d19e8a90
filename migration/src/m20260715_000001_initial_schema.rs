use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Enable foreign keys for SQLite
        if manager.get_database_backend() == sea_orm::DatabaseBackend::Sqlite {
            manager
                .get_connection()
                .execute_unprepared("PRAGMA foreign_keys = ON")
                .await?;
        }

        // Create jobs table with backend-specific ID type
        let job_id_col = match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => ColumnDef::new(Jobs::JobId)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key()
                .to_owned(),
            _ => ColumnDef::new(Jobs::JobId)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key()
                .to_owned(),
        };

        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(job_id_col)
                    .col(
                        ColumnDef::new(Jobs::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(big_integer(Jobs::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create jobs_history table with backend-specific ID type
        let id_col = match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => ColumnDef::new(JobsHistory::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key()
                .to_owned(),
            _ => ColumnDef::new(JobsHistory::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key()
                .to_owned(),
        };

        manager
            .create_table(
                Table::create()
                    .table(JobsHistory::Table)
                    .if_not_exists()
                    .col(id_col)
                    .col(big_integer(JobsHistory::JobId))
                    .col(integer(JobsHistory::RunDate))
                    .col(integer(JobsHistory::StepId))
                    .col(string(JobsHistory::StepName))
                    .col(big_integer(JobsHistory::RunTime))
                    .col(big_integer(JobsHistory::RunDuration))
                    .col(string_null(JobsHistory::Message))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_jobs_history_job")
                            .from(JobsHistory::Table, JobsHistory::JobId)
                            .to(Jobs::Table, Jobs::JobId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index on jobs_history.run_date for the per-day fetch
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_jobs_history_run_date")
                    .table(JobsHistory::Table)
                    .col(JobsHistory::RunDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobsHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    JobId,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum JobsHistory {
    Table,
    Id,
    JobId,
    RunDate,
    StepId,
    StepName,
    RunTime,
    RunDuration,
    Message,
}
