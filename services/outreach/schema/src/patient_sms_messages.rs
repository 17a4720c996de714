use sea_orm::entity::prelude::*;

/// Many-to-many link between patients and the messages sent to them.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "patient_sms_messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub patient_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub sms_message_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::patients::Entity",
        from = "Column::PatientId",
        to = "super::patients::Column::Id"
    )]
    Patient,
    #[sea_orm(
        belongs_to = "super::sms_messages::Entity",
        from = "Column::SmsMessageId",
        to = "super::sms_messages::Column::Id"
    )]
    SmsMessage,
}

impl Related<super::patients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Patient.def()
    }
}

impl Related<super::sms_messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SmsMessage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
