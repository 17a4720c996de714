use sea_orm::entity::prelude::*;

/// One outbound reminder attempt.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sms_messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub content: String,
    pub sent_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub failed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::patient_sms_messages::Entity")]
    PatientSmsMessages,
}

impl Related<super::patient_sms_messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PatientSmsMessages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
