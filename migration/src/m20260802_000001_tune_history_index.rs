use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // The per-day fetch always narrows by job as well; replace the
        // single-column index with a composite one.
        manager
            .drop_index(
                Index::drop()
                    .name("idx_jobs_history_run_date")
                    .table(JobsHistory::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_jobs_history_date_job")
                    .table(JobsHistory::Table)
                    .col(JobsHistory::RunDate)
                    .col(JobsHistory::JobId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_jobs_history_date_job")
                    .table(JobsHistory::Table)
                    .to_owned(),
            )
            .await?;

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
}

#[derive(DeriveIden)]
enum JobsHistory {
    Table,
    RunDate,
    JobId,
}
