pub mod builders;
pub mod db;

pub use builders::HistoryRowBuilder;
pub use db::TestDb;
