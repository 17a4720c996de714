use sea_orm::entity::prelude::*;

/// Patient record. `status` and `last_sent_at` cache the outcome of the status
/// derivation over the patient's linked messages.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "patients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: String,
    /// Trailing digits of `phone`, used for formatting-insensitive search.
    pub phone_tail: String,
    pub appointment_at: Option<chrono::DateTime<chrono::Utc>>,
    pub status: String,
    pub last_sent_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::patient_sms_messages::Entity")]
    PatientSmsMessages,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::patient_sms_messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PatientSmsMessages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
