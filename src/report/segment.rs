use std::collections::BTreeMap;

use tracing::warn;

use crate::report::timefmt::RunTime;
use crate::report::types::{Occurrence, StepRecord};

/// Result of partitioning one day's records into occurrences.
#[derive(Debug, Default)]
pub struct Segmentation {
    /// All occurrences, ordered by (job_name, run_date, start_time).
    pub occurrences: Vec<Occurrence>,
    /// Rows excluded because they precede their job's first boundary row
    /// (or because the job has no boundary row at all that day).
    pub orphaned_steps: usize,
}

/// Partition a day's records into per-job occurrences. Rows with
/// `step_id == 1` mark occurrence starts; occurrence `k` owns the rows
/// whose `run_time` falls in `[start_k, start_k+1)`, with the final
/// occurrence taking everything from its start onward.
///
/// Duplicate boundary times yield distinct occurrences at the same
/// instant: each earlier duplicate's window is empty and the last one
/// absorbs every row at or after that instant. The whole pass is one
/// sort plus one scan per group; rows are never re-filtered per window.
pub fn segment_occurrences(records: Vec<StepRecord>) -> Segmentation {
    let mut groups: BTreeMap<(String, i32), Vec<StepRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.job_name.clone(), record.run_date))
            .or_default()
            .push(record);
    }

    let mut segmentation = Segmentation::default();
    for ((job_name, run_date), mut rows) in groups {
        rows.sort_by(|a, b| (a.run_time, a.step_id).cmp(&(b.run_time, b.step_id)));

        let starts: Vec<RunTime> = rows
            .iter()
            .filter(|row| row.step_id == 1)
            .map(|row| row.run_time)
            .collect();
        if starts.is_empty() {
            warn!(
                "job {job_name} has {} rows on {run_date} but no boundary row; excluding them",
                rows.len()
            );
            segmentation.orphaned_steps += rows.len();
            continue;
        }

        let mut occurrences: Vec<Occurrence> = starts
            .iter()
            .map(|&start_time| Occurrence {
                job_name: job_name.clone(),
                run_date,
                start_time,
                steps: Vec::new(),
            })
            .collect();

        // Rows are time-ordered, so the window cursor only moves forward.
        let mut window = 0usize;
        let mut orphaned = 0usize;
        for record in rows {
            if record.run_time < starts[0] {
                orphaned += 1;
                continue;
            }
            while window + 1 < starts.len() && record.run_time >= starts[window + 1] {
                window += 1;
            }
            occurrences[window].steps.push(record);
        }

        if orphaned > 0 {
            warn!("job {job_name} has {orphaned} rows on {run_date} before its first boundary; excluding them");
        }
        segmentation.orphaned_steps += orphaned;
        segmentation.occurrences.append(&mut occurrences);
    }
    segmentation
}

/// Reduce each job's occurrence list to the single most recent one.
/// Comparison is strictly greater, so among occurrences sharing a start
/// time the one seen first in segmentation order wins. Output keeps job
/// name order.
pub fn latest_per_job(occurrences: Vec<Occurrence>) -> Vec<Occurrence> {
    let mut latest: BTreeMap<(String, i32), Occurrence> = BTreeMap::new();
    for occurrence in occurrences {
        let key = (occurrence.job_name.clone(), occurrence.run_date);
        match latest.get(&key) {
            Some(current) if occurrence.start_time <= current.start_time => {}
            _ => {
                latest.insert(key, occurrence);
            }
        }
    }
    latest.into_values().collect()
}
