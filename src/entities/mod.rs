pub mod job;
pub mod job_history;

pub use job::Entity as Job;
pub use job_history::Entity as JobHistory;
