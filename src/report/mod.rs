pub mod build;
pub mod classify;
pub mod segment;
pub mod timefmt;
pub mod types;

use tracing::warn;

pub use timefmt::{format_duration, RowError, RunTime};
pub use types::{
    DayReport, JobDetail, JobListEntry, JobReport, Occurrence, RunStatus, StatusFilter, StepDetail,
    StepRecord, StepRow, Summary,
};

/// Run the full derivation pipeline over one day's raw rows: validate and
/// classify each row, partition per-job occurrences at step-id-1
/// boundaries, keep each job's latest occurrence, and derive job-level
/// statuses. Malformed rows are skipped and counted, never fatal. The
/// returned snapshot is immutable; callers share it as built.
pub fn build_report(run_date: i32, rows: Vec<StepRow>) -> DayReport {
    let mut records = Vec::with_capacity(rows.len());
    let mut skipped_rows = 0usize;
    for row in &rows {
        match StepRecord::from_row(row) {
            Ok(record) => records.push(record),
            Err(err) => {
                skipped_rows += 1;
                warn!("skipping malformed row for job {}: {err}", row.job_name);
            }
        }
    }

    let segmentation = segment::segment_occurrences(records);
    let latest = segment::latest_per_job(segmentation.occurrences);
    let jobs = build::assemble(latest);

    DayReport {
        run_date,
        jobs,
        orphaned_steps: segmentation.orphaned_steps,
        skipped_rows,
    }
}
