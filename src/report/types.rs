use serde::{Deserialize, Serialize};

use crate::report::classify::classify_message;
use crate::report::timefmt::{format_duration, RowError, RunTime};

/// One raw job-history row as the data source yields it. The pipeline
/// accepts this shape regardless of transport; storage, fixtures, and
/// tests all feed it the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRow {
    pub job_name: String,
    pub run_date: i32,
    pub step_id: i32,
    pub step_name: String,
    pub run_time: i64,
    pub run_duration: i64,
    pub message: Option<String>,
}

/// Step-level or job-level outcome. `Error` dominates, `Success` requires
/// unanimity, `Info` is the inconclusive remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Success,
    Error,
    Info,
}

/// Status filter accepted by the job-list endpoint. There is no `Info`
/// option; inconclusive jobs only show under `All`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    #[serde(alias = "All")]
    All,
    #[serde(alias = "Success")]
    Success,
    #[serde(alias = "Error")]
    Error,
}

impl StatusFilter {
    pub fn admits(&self, status: RunStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Success => status == RunStatus::Success,
            StatusFilter::Error => status == RunStatus::Error,
        }
    }
}

/// A validated, classified history row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub job_name: String,
    pub run_date: i32,
    pub step_id: i32,
    pub step_name: String,
    pub run_time: RunTime,
    pub run_duration: i64,
    pub message: Option<String>,
    pub status: RunStatus,
}

impl StepRecord {
    /// Validate one raw row and derive its step status from the message.
    pub fn from_row(row: &StepRow) -> Result<Self, RowError> {
        let run_time = RunTime::from_raw(row.run_time)?;
        if row.run_duration < 0 {
            return Err(RowError::NegativeDuration(row.run_duration));
        }
        Ok(Self {
            job_name: row.job_name.clone(),
            run_date: row.run_date,
            step_id: row.step_id,
            step_name: row.step_name.clone(),
            run_time,
            run_duration: row.run_duration,
            message: row.message.clone(),
            status: classify_message(row.message.as_deref()),
        })
    }
}

/// One run of a job on one day, bounded by step-id-1 rows. Derived on
/// every load, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub job_name: String,
    pub run_date: i32,
    pub start_time: RunTime,
    pub steps: Vec<StepRecord>,
}

/// A job's latest occurrence annotated with its derived job-level status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub job_name: String,
    pub run_date: i32,
    pub start_time: RunTime,
    pub status: RunStatus,
    pub steps: Vec<StepRecord>,
}

/// Immutable snapshot of one day's derived dashboard state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayReport {
    pub run_date: i32,
    /// One entry per job, ordered by job name.
    pub jobs: Vec<JobReport>,
    /// Rows that preceded their job's first boundary row on this day.
    pub orphaned_steps: usize,
    /// Rows dropped by per-row validation.
    pub skipped_rows: usize,
}

impl DayReport {
    /// Counters for the dashboard header tiles.
    pub fn summary(&self) -> Summary {
        let success_count = self
            .jobs
            .iter()
            .filter(|job| job.status == RunStatus::Success)
            .count();
        let error_count = self
            .jobs
            .iter()
            .filter(|job| job.status == RunStatus::Error)
            .count();
        Summary {
            run_date: self.run_date,
            total_jobs: self.jobs.len(),
            success_count,
            error_count,
            skipped_rows: self.skipped_rows,
            orphaned_steps: self.orphaned_steps,
        }
    }

    /// Jobs admitted by the status filter and, when given, a
    /// case-insensitive substring match on the job name.
    pub fn filter_jobs(&self, status: StatusFilter, search: Option<&str>) -> Vec<&JobReport> {
        let needle = search.map(str::to_lowercase);
        self.jobs
            .iter()
            .filter(|job| status.admits(job.status))
            .filter(|job| match &needle {
                Some(needle) => job.job_name.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .collect()
    }

    pub fn job(&self, name: &str) -> Option<&JobReport> {
        self.jobs.iter().find(|job| job.job_name == name)
    }
}

/// Summary counters for one run date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub run_date: i32,
    pub total_jobs: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub skipped_rows: usize,
    pub orphaned_steps: usize,
}

/// One row of the job-list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListEntry {
    pub job_name: String,
    pub status: RunStatus,
    pub start_time: String,
    pub step_count: usize,
}

impl From<&JobReport> for JobListEntry {
    fn from(job: &JobReport) -> Self {
        Self {
            job_name: job.job_name.clone(),
            status: job.status,
            start_time: job.start_time.to_string(),
            step_count: job.steps.len(),
        }
    }
}

/// One row of the expanded per-job step table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDetail {
    pub step_id: i32,
    pub step_name: String,
    pub run_time: String,
    pub run_duration: String,
    pub status: RunStatus,
    pub message: Option<String>,
}

/// Per-job detail view: the latest occurrence's steps sorted by step id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDetail {
    pub job_name: String,
    pub run_date: i32,
    pub start_time: String,
    pub status: RunStatus,
    pub steps: Vec<StepDetail>,
}

impl From<&JobReport> for JobDetail {
    fn from(job: &JobReport) -> Self {
        let mut steps: Vec<&StepRecord> = job.steps.iter().collect();
        // Stable sort keeps time order between rows sharing a step id
        steps.sort_by_key(|step| step.step_id);
        Self {
            job_name: job.job_name.clone(),
            run_date: job.run_date,
            start_time: job.start_time.to_string(),
            status: job.status,
            steps: steps
                .into_iter()
                .map(|step| StepDetail {
                    step_id: step.step_id,
                    step_name: step.step_name.clone(),
                    run_time: step.run_time.to_string(),
                    run_duration: format_duration(step.run_duration),
                    status: step.status,
                    message: step.message.clone(),
                })
                .collect(),
        }
    }
}
