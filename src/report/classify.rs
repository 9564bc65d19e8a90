use crate::report::types::RunStatus;

/// Suffix the scheduler stamps on a failed step's final message.
const FAILURE_SUFFIX: &str = "the step failed.";
/// Suffix stamped on a successful step's final message.
const SUCCESS_SUFFIX: &str = "the step succeeded.";

/// Classify a free-text step message. Matching is a case-insensitive
/// suffix check on the trimmed text, so prefixes the source system embeds
/// (timestamps, host names, retry counters) do not affect the outcome.
/// Absent messages and anything matching neither suffix are `Info`.
pub fn classify_message(message: Option<&str>) -> RunStatus {
    let Some(message) = message else {
        return RunStatus::Info;
    };
    let normalized = message.trim().to_lowercase();
    if normalized.ends_with(FAILURE_SUFFIX) {
        RunStatus::Error
    } else if normalized.ends_with(SUCCESS_SUFFIX) {
        RunStatus::Success
    } else {
        RunStatus::Info
    }
}
