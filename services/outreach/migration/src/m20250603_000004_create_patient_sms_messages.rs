use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PatientSmsMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PatientSmsMessages::PatientId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PatientSmsMessages::SmsMessageId)
                            .uuid()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(PatientSmsMessages::PatientId)
                            .col(PatientSmsMessages::SmsMessageId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PatientSmsMessages::Table, PatientSmsMessages::PatientId)
                            .to(Patients::Table, Patients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PatientSmsMessages::Table, PatientSmsMessages::SmsMessageId)
                            .to(SmsMessages::Table, SmsMessages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(PatientSmsMessages::Table)
                    .col(PatientSmsMessages::SmsMessageId)
                    .name("idx_patient_sms_messages_sms_message_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PatientSmsMessages::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PatientSmsMessages {
    Table,
    PatientId,
    SmsMessageId,
}

#[derive(Iden)]
enum Patients {
    Table,
    Id,
}

#[derive(Iden)]
enum SmsMessages {
    Table,
    Id,
}
