pub use sea_orm_migration::prelude::*;

mod m20250603_000001_create_users;
mod m20250603_000002_create_patients;
mod m20250603_000003_create_sms_messages;
mod m20250603_000004_create_patient_sms_messages;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250603_000001_create_users::Migration),
            Box::new(m20250603_000002_create_patients::Migration),
            Box::new(m20250603_000003_create_sms_messages::Migration),
            Box::new(m20250603_000004_create_patient_sms_messages::Migration),
        ]
    }
}
