use crate::report::types::{JobReport, Occurrence, RunStatus, StepRecord};

/// Derive a job-level status from an occurrence's steps. Any `Error`
/// step makes the job `Error`; `Success` requires a non-empty step set
/// that is unanimously successful; everything else is `Info`, including
/// an occurrence with no steps at all.
pub fn job_status(steps: &[StepRecord]) -> RunStatus {
    if steps.iter().any(|step| step.status == RunStatus::Error) {
        RunStatus::Error
    } else if !steps.is_empty() && steps.iter().all(|step| step.status == RunStatus::Success) {
        RunStatus::Success
    } else {
        RunStatus::Info
    }
}

/// Annotate each job's latest occurrence with its derived status. Keeps
/// the selector's ordering; drops and deduplicates nothing.
pub fn assemble(latest: Vec<Occurrence>) -> Vec<JobReport> {
    latest
        .into_iter()
        .map(|occurrence| {
            let status = job_status(&occurrence.steps);
            JobReport {
                job_name: occurrence.job_name,
                run_date: occurrence.run_date,
                start_time: occurrence.start_time,
                status,
                steps: occurrence.steps,
            }
        })
        .collect()
}
