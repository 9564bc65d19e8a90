use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};

use crate::entities;
use crate::errors::EphemerisError;
use crate::report::StepRow;
use crate::settings::Database as DbCfg;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: i64,
    pub name: String,
    pub created_at: i64,
}

/// One history row to record for a job, as the scheduler would write it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHistoryRow {
    pub job_id: i64,
    pub run_date: i32,
    pub step_id: i32,
    pub step_name: String,
    pub run_time: i64,
    pub run_duration: i64,
    pub message: Option<String>,
}

pub async fn init(cfg: &DbCfg) -> Result<DatabaseConnection, EphemerisError> {
    let db = Database::connect(&cfg.url).await?;
    Ok(db)
}

pub async fn create_job(db: &DatabaseConnection, name: &str) -> Result<Job, EphemerisError> {
    let created_at = Utc::now().timestamp();

    let job = entities::job::ActiveModel {
        job_id: Default::default(),
        name: Set(name.to_string()),
        created_at: Set(created_at),
    };

    let inserted = job.insert(db).await?;

    Ok(Job {
        job_id: inserted.job_id,
        name: inserted.name,
        created_at: inserted.created_at,
    })
}

pub async fn insert_history_row(
    db: &DatabaseConnection,
    row: NewHistoryRow,
) -> Result<(), EphemerisError> {
    let model = entities::job_history::ActiveModel {
        id: Default::default(),
        job_id: Set(row.job_id),
        run_date: Set(row.run_date),
        step_id: Set(row.step_id),
        step_name: Set(row.step_name),
        run_time: Set(row.run_time),
        run_duration: Set(row.run_duration),
        message: Set(row.message),
    };

    model.insert(db).await?;
    Ok(())
}

/// The single query behind every dashboard load: all history rows for one
/// run date with a real step id, joined to their job names and ordered by
/// `(job_name, run_time, step_id)`. The join happens app-side; the row set
/// for one day is small and the id-to-name map is one read.
pub async fn fetch_step_rows(
    db: &DatabaseConnection,
    run_date: i32,
) -> Result<Vec<StepRow>, EphemerisError> {
    let names: HashMap<i64, String> = {
        use entities::job::Entity;
        Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|job| (job.job_id, job.name))
            .collect()
    };

    let models = {
        use entities::job_history::{Column, Entity};
        Entity::find()
            .filter(Column::RunDate.eq(run_date))
            .filter(Column::StepId.gt(0))
            .all(db)
            .await?
    };

    let mut rows = Vec::with_capacity(models.len());
    for model in models {
        let Some(name) = names.get(&model.job_id) else {
            tracing::warn!(
                "history row {} references unknown job id {}; skipping",
                model.id,
                model.job_id
            );
            continue;
        };
        rows.push(StepRow {
            job_name: name.clone(),
            run_date: model.run_date,
            step_id: model.step_id,
            step_name: model.step_name,
            run_time: model.run_time,
            run_duration: model.run_duration,
            message: model.message,
        });
    }

    rows.sort_by(|a, b| {
        (&a.job_name, a.run_time, a.step_id).cmp(&(&b.job_name, b.run_time, b.step_id))
    });

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{Database, DatabaseConnection};
    use sea_orm_migration::MigratorTrait;
    use tempfile::NamedTempFile;

    /// Test database helper that keeps temp file alive
    struct TestDb {
        connection: DatabaseConnection,
        _temp_file: NamedTempFile,
    }

    impl TestDb {
        async fn new() -> Self {
            let temp_file = NamedTempFile::new().expect("Failed to create temp file");
            let db_path = temp_file.path().to_str().expect("Invalid temp file path");
            let db_url = format!("sqlite://{}?mode=rwc", db_path);

            let connection = Database::connect(&db_url)
                .await
                .expect("Failed to connect to test database");

            migration::Migrator::up(&connection, None)
                .await
                .expect("Failed to run migrations");

            Self {
                connection,
                _temp_file: temp_file,
            }
        }

        fn connection(&self) -> &DatabaseConnection {
            &self.connection
        }
    }

    fn history_row(job_id: i64, run_date: i32, step_id: i32, run_time: i64) -> NewHistoryRow {
        NewHistoryRow {
            job_id,
            run_date,
            step_id,
            step_name: format!("step-{step_id}"),
            run_time,
            run_duration: 30,
            message: Some("The step succeeded.".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_job() {
        let test_db = TestDb::new().await;
        let db = test_db.connection();

        let job = create_job(db, "Backup").await.expect("Failed to create job");

        assert!(job.job_id > 0);
        assert_eq!(job.name, "Backup");
        assert!(job.created_at > 0);
    }

    #[tokio::test]
    async fn test_fetch_step_rows_joins_and_orders() {
        let test_db = TestDb::new().await;
        let db = test_db.connection();

        let zeta = create_job(db, "Zeta").await.expect("create job");
        let alpha = create_job(db, "Alpha").await.expect("create job");

        // Inserted deliberately out of display order
        for row in [
            history_row(zeta.job_id, 20251110, 1, 90000),
            history_row(alpha.job_id, 20251110, 2, 80500),
            history_row(alpha.job_id, 20251110, 1, 80000),
        ] {
            insert_history_row(db, row).await.expect("insert row");
        }

        let rows = fetch_step_rows(db, 20251110).await.expect("fetch rows");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].job_name, "Alpha");
        assert_eq!(rows[0].step_id, 1);
        assert_eq!(rows[1].job_name, "Alpha");
        assert_eq!(rows[1].step_id, 2);
        assert_eq!(rows[2].job_name, "Zeta");
    }

    #[tokio::test]
    async fn test_fetch_step_rows_filters_date_and_step_id() {
        let test_db = TestDb::new().await;
        let db = test_db.connection();

        let job = create_job(db, "Backup").await.expect("create job");

        insert_history_row(db, history_row(job.job_id, 20251110, 1, 80000))
            .await
            .expect("insert row");
        // Different date: excluded
        insert_history_row(db, history_row(job.job_id, 20251111, 1, 80000))
            .await
            .expect("insert row");
        // Job-outcome rows carry step_id 0 in the source system: excluded
        insert_history_row(db, history_row(job.job_id, 20251110, 0, 81000))
            .await
            .expect("insert row");

        let rows = fetch_step_rows(db, 20251110).await.expect("fetch rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].step_id, 1);
        assert_eq!(rows[0].run_date, 20251110);
    }

    #[tokio::test]
    async fn test_fetch_step_rows_empty_day() {
        let test_db = TestDb::new().await;
        let db = test_db.connection();

        create_job(db, "Backup").await.expect("create job");

        let rows = fetch_step_rows(db, 20251110).await.expect("fetch rows");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_step_rows_keeps_missing_message() {
        let test_db = TestDb::new().await;
        let db = test_db.connection();

        let job = create_job(db, "Backup").await.expect("create job");
        let mut row = history_row(job.job_id, 20251110, 1, 80000);
        row.message = None;
        insert_history_row(db, row).await.expect("insert row");

        let rows = fetch_step_rows(db, 20251110).await.expect("fetch rows");
        assert_eq!(rows[0].message, None);
    }
}
