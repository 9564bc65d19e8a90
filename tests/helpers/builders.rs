use ephemeris::storage::{self, NewHistoryRow};
use sea_orm::DatabaseConnection;

/// Builder for inserting history rows the way the scheduler writes them:
/// one boundary row (step id 1) per occurrence, then the real steps.
pub struct HistoryRowBuilder {
    job_id: i64,
    run_date: i32,
    step_id: i32,
    step_name: String,
    run_time: i64,
    run_duration: i64,
    message: Option<String>,
}

impl HistoryRowBuilder {
    pub fn new(job_id: i64) -> Self {
        Self {
            job_id,
            run_date: 20251110,
            step_id: 1,
            step_name: "Start".to_string(),
            run_time: 0,
            run_duration: 0,
            message: None,
        }
    }

    pub fn on_date(mut self, run_date: i32) -> Self {
        self.run_date = run_date;
        self
    }

    pub fn step(mut self, step_id: i32, step_name: &str) -> Self {
        self.step_id = step_id;
        self.step_name = step_name.to_string();
        self
    }

    pub fn at(mut self, run_time: i64) -> Self {
        self.run_time = run_time;
        self
    }

    pub fn lasting(mut self, run_duration: i64) -> Self {
        self.run_duration = run_duration;
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub async fn insert(self, db: &DatabaseConnection) {
        storage::insert_history_row(
            db,
            NewHistoryRow {
                job_id: self.job_id,
                run_date: self.run_date,
                step_id: self.step_id,
                step_name: self.step_name,
                run_time: self.run_time,
                run_duration: self.run_duration,
                message: self.message,
            },
        )
        .await
        .expect("Failed to insert history row");
    }
}
