pub use sea_orm_migration::prelude::*;

mod m20260715_000001_initial_schema;
mod m20260802_000001_tune_history_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260715_000001_initial_schema::Migration),
            Box::new(m20260802_000001_tune_history_index::Migration),
        ]
    }
}
