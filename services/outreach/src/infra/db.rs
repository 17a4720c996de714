use std::collections::{HashMap, HashSet};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, IntoActiveModel as _, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, TransactionTrait,
};
use uuid::Uuid;

use clinic_core::sea_ext::ContainsIgnoreCase;
use clinic_domain::pagination::{PageRequest, Sort};
use clinic_domain::phone::phone_tail;
use clinic_domain::status::{PatientStatus, derive_status, last_outreach_at};
use clinic_outreach_schema::{patient_sms_messages, patients, sms_messages, users};

use crate::domain::repository::{
    DashboardRepository, OutreachRepository, PatientRepository, UserRepository,
};
use crate::domain::types::{
    ClinicUser, DashboardStats, DayWindow, MessageOutcome, Patient, PatientQuery, PatientSortBy,
    PatientWithHistory, SmsMessage,
};
use crate::error::OutreachServiceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ClinicUser>, OutreachServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ClinicUser>, OutreachServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &ClinicUser) -> Result<(), OutreachServiceError> {
        users::ActiveModel {
            id: Set(user.id),
            email: Set(user.email.clone()),
            created_at: Set(user.created_at),
        }
        .insert(&self.db)
        .await
        .context("create user")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, OutreachServiceError> {
        let deleted = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    let patient_ids: Vec<Uuid> = patients::Entity::find()
                        .select_only()
                        .column(patients::Column::Id)
                        .filter(patients::Column::UserId.eq(id))
                        .into_tuple()
                        .all(txn)
                        .await?;

                    let message_ids: Vec<Uuid> = patient_sms_messages::Entity::find()
                        .select_only()
                        .column(patient_sms_messages::Column::SmsMessageId)
                        .filter(patient_sms_messages::Column::PatientId.is_in(patient_ids.clone()))
                        .into_tuple()
                        .all(txn)
                        .await?;

                    patient_sms_messages::Entity::delete_many()
                        .filter(patient_sms_messages::Column::PatientId.is_in(patient_ids))
                        .exec(txn)
                        .await?;
                    patients::Entity::delete_many()
                        .filter(patients::Column::UserId.eq(id))
                        .exec(txn)
                        .await?;
                    let result = users::Entity::delete_by_id(id).exec(txn).await?;

                    // Messages still linked to someone else's patient survive.
                    let still_linked: HashSet<Uuid> = patient_sms_messages::Entity::find()
                        .select_only()
                        .column(patient_sms_messages::Column::SmsMessageId)
                        .filter(
                            patient_sms_messages::Column::SmsMessageId.is_in(message_ids.clone()),
                        )
                        .into_tuple::<Uuid>()
                        .all(txn)
                        .await?
                        .into_iter()
                        .collect();
                    let orphans: Vec<Uuid> = message_ids
                        .into_iter()
                        .filter(|id| !still_linked.contains(id))
                        .collect();
                    if !orphans.is_empty() {
                        sms_messages::Entity::delete_many()
                            .filter(sms_messages::Column::Id.is_in(orphans))
                            .exec(txn)
                            .await?;
                    }

                    Ok(result.rows_affected > 0)
                })
            })
            .await
            .context("delete user")?;
        Ok(deleted)
    }
}

fn user_from_model(model: users::Model) -> ClinicUser {
    ClinicUser {
        id: model.id,
        email: model.email,
        created_at: model.created_at,
    }
}

// ── Patient repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPatientRepository {
    pub db: DatabaseConnection,
}

impl PatientRepository for DbPatientRepository {
    async fn create(&self, patient: &Patient) -> Result<(), OutreachServiceError> {
        patients::ActiveModel {
            id: Set(patient.id),
            user_id: Set(patient.user_id),
            first_name: Set(patient.first_name.clone()),
            last_name: Set(patient.last_name.clone()),
            email: Set(patient.email.clone()),
            phone: Set(patient.phone.clone()),
            phone_tail: Set(phone_tail(&patient.phone).unwrap_or_default()),
            appointment_at: Set(patient.appointment_at),
            status: Set(patient.status.as_str().to_owned()),
            last_sent_at: Set(patient.last_sent_at),
            created_at: Set(patient.created_at),
            updated_at: Set(patient.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create patient")?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Patient>, OutreachServiceError> {
        let model = patients::Entity::find_by_id(id)
            .filter(patients::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find patient by id")?;
        Ok(model.map(patient_from_model).transpose()?)
    }

    async fn find_with_history(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<PatientWithHistory>, OutreachServiceError> {
        let Some(patient) = self.find_by_id(user_id, id).await? else {
            return Ok(None);
        };
        let mut histories = load_histories(&self.db, &[patient.id])
            .await
            .context("load patient history")?;
        Ok(Some(PatientWithHistory {
            messages: histories.remove(&patient.id).unwrap_or_default(),
            patient,
        }))
    }

    async fn list(
        &self,
        user_id: Uuid,
        query: &PatientQuery,
        page: PageRequest,
    ) -> Result<(Vec<PatientWithHistory>, u64), OutreachServiceError> {
        let PageRequest { per_page, .. } = page.clamped();
        let select = patient_list_select(user_id, query);

        let total = select
            .clone()
            .count(&self.db)
            .await
            .context("count patients")?;

        let models = order_patients(select, query.sort_by)
            .offset(page.offset())
            .limit(u64::from(per_page))
            .all(&self.db)
            .await
            .context("list patients")?;

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut histories = load_histories(&self.db, &ids)
            .await
            .context("load patient histories")?;

        let rows = models
            .into_iter()
            .map(|model| {
                let patient = patient_from_model(model)?;
                Ok(PatientWithHistory {
                    messages: histories.remove(&patient.id).unwrap_or_default(),
                    patient,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok((rows, total))
    }
}

/// Owner scope plus every present filter, ANDed.
fn patient_list_select(user_id: Uuid, query: &PatientQuery) -> Select<patients::Entity> {
    let mut select = patients::Entity::find().filter(patients::Column::UserId.eq(user_id));

    if let Some(window) = query.today {
        select = select
            .filter(patients::Column::AppointmentAt.gte(window.start))
            .filter(patients::Column::AppointmentAt.lt(window.end));
    }
    if let Some(status) = query.status {
        select = select.filter(patients::Column::Status.eq(status.as_str()));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let mut any = Condition::any()
            .add(patients::Column::FirstName.contains_ignore_case(search))
            .add(patients::Column::LastName.contains_ignore_case(search));
        if let Some(tail) = phone_tail(search) {
            any = any.add(patients::Column::PhoneTail.eq(tail));
        }
        select = select.filter(any);
    }
    if query.sort_by == PatientSortBy::LastSent {
        select = select.filter(patients::Column::LastSentAt.is_not_null());
    }
    select
}

fn order_patients(select: Select<patients::Entity>, sort_by: PatientSortBy) -> Select<patients::Entity> {
    let select = match sort_by {
        PatientSortBy::AppointmentAt(Sort::Asc) => {
            select.order_by_asc(patients::Column::AppointmentAt)
        }
        PatientSortBy::AppointmentAt(Sort::Desc) => {
            select.order_by_desc(patients::Column::AppointmentAt)
        }
        PatientSortBy::Name(Sort::Asc) => select
            .order_by_asc(patients::Column::LastName)
            .order_by_asc(patients::Column::FirstName),
        PatientSortBy::Name(Sort::Desc) => select
            .order_by_desc(patients::Column::LastName)
            .order_by_desc(patients::Column::FirstName),
        PatientSortBy::LastSent => select.order_by_desc(patients::Column::LastSentAt),
    };
    // Stable pages across equal keys.
    select.order_by_asc(patients::Column::Id)
}

fn patient_from_model(model: patients::Model) -> anyhow::Result<Patient> {
    let status: PatientStatus = model
        .status
        .parse()
        .with_context(|| format!("patient {} has invalid status", model.id))?;
    Ok(Patient {
        id: model.id,
        user_id: model.user_id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        phone: model.phone,
        appointment_at: model.appointment_at,
        status,
        last_sent_at: model.last_sent_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn message_from_model(model: sms_messages::Model) -> SmsMessage {
    SmsMessage {
        id: model.id,
        content: model.content,
        sent_at: model.sent_at,
        completed_at: model.completed_at,
        failed_at: model.failed_at,
        created_at: model.created_at,
    }
}

/// Linked messages per patient, most recent attempt first.
async fn load_histories<C: ConnectionTrait>(
    conn: &C,
    patient_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<SmsMessage>>, DbErr> {
    let mut histories: HashMap<Uuid, Vec<SmsMessage>> = HashMap::new();
    if patient_ids.is_empty() {
        return Ok(histories);
    }
    let rows = patient_sms_messages::Entity::find()
        .filter(patient_sms_messages::Column::PatientId.is_in(patient_ids.to_vec()))
        .find_also_related(sms_messages::Entity)
        .order_by_desc(sms_messages::Column::CreatedAt)
        .order_by_desc(sms_messages::Column::Id)
        .all(conn)
        .await?;
    for (link, message) in rows {
        if let Some(message) = message {
            histories
                .entry(link.patient_id)
                .or_default()
                .push(message_from_model(message));
        }
    }
    Ok(histories)
}

/// Re-derive and persist a patient's cached status and last-outreach time.
async fn recompute_patient<C: ConnectionTrait>(
    conn: &C,
    patient_id: Uuid,
    now: DateTime<Utc>,
) -> Result<PatientStatus, DbErr> {
    let history = load_histories(conn, &[patient_id])
        .await?
        .remove(&patient_id)
        .unwrap_or_default();
    let status = derive_status(&history);
    patients::ActiveModel {
        id: Set(patient_id),
        status: Set(status.as_str().to_owned()),
        last_sent_at: Set(last_outreach_at(&history)),
        updated_at: Set(now),
        ..Default::default()
    }
    .update(conn)
    .await?;
    Ok(status)
}

// ── Outreach repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOutreachRepository {
    pub db: DatabaseConnection,
}

impl OutreachRepository for DbOutreachRepository {
    async fn record_attempt(
        &self,
        patient_id: Uuid,
        message: &SmsMessage,
    ) -> Result<PatientStatus, OutreachServiceError> {
        let status = self
            .db
            .transaction::<_, PatientStatus, DbErr>(|txn| {
                let message = message.clone();
                Box::pin(async move {
                    sms_messages::ActiveModel {
                        id: Set(message.id),
                        content: Set(message.content.clone()),
                        sent_at: Set(message.sent_at),
                        completed_at: Set(message.completed_at),
                        failed_at: Set(message.failed_at),
                        created_at: Set(message.created_at),
                    }
                    .insert(txn)
                    .await?;

                    patient_sms_messages::Entity::insert(patient_sms_messages::ActiveModel {
                        patient_id: Set(patient_id),
                        sms_message_id: Set(message.id),
                    })
                    .exec_without_returning(txn)
                    .await?;

                    recompute_patient(txn, patient_id, message.created_at).await
                })
            })
            .await
            .context("record outreach attempt")?;
        Ok(status)
    }

    async fn record_outcome(
        &self,
        user_id: Uuid,
        message_id: Uuid,
        outcome: MessageOutcome,
        at: DateTime<Utc>,
    ) -> Result<Option<SmsMessage>, OutreachServiceError> {
        let message = self
            .db
            .transaction::<_, Option<SmsMessage>, DbErr>(|txn| {
                Box::pin(async move {
                    let links = patient_sms_messages::Entity::find()
                        .filter(patient_sms_messages::Column::SmsMessageId.eq(message_id))
                        .find_also_related(patients::Entity)
                        .all(txn)
                        .await?;
                    let owned = links
                        .iter()
                        .any(|(_, patient)| patient.as_ref().is_some_and(|p| p.user_id == user_id));
                    if !owned {
                        return Ok(None);
                    }
                    let Some(model) = sms_messages::Entity::find_by_id(message_id).one(txn).await?
                    else {
                        return Ok(None);
                    };

                    let model = match outcome {
                        MessageOutcome::Completed if model.completed_at.is_none() => {
                            let mut am = model.into_active_model();
                            am.completed_at = Set(Some(at));
                            am.update(txn).await?
                        }
                        MessageOutcome::Failed
                            if model.completed_at.is_none() && model.failed_at.is_none() =>
                        {
                            // A delivery failure turns the attempt into a failed one.
                            let failed_at = model.sent_at.map_or(at, |sent| sent.max(at));
                            let mut am = model.into_active_model();
                            am.sent_at = Set(None);
                            am.failed_at = Set(Some(failed_at));
                            am.update(txn).await?
                        }
                        _ => model,
                    };

                    for (link, _) in &links {
                        recompute_patient(txn, link.patient_id, at).await?;
                    }
                    Ok(Some(message_from_model(model)))
                })
            })
            .await
            .context("record message outcome")?;
        Ok(message)
    }
}

// ── Dashboard repository ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbDashboardRepository {
    pub db: DatabaseConnection,
}

impl DashboardRepository for DbDashboardRepository {
    async fn stats(
        &self,
        user_id: Uuid,
        today: DayWindow,
    ) -> Result<DashboardStats, OutreachServiceError> {
        let owned = || patients::Entity::find().filter(patients::Column::UserId.eq(user_id));
        let todays = || {
            owned()
                .filter(patients::Column::AppointmentAt.gte(today.start))
                .filter(patients::Column::AppointmentAt.lt(today.end))
        };

        let total_patients = owned()
            .count(&self.db)
            .await
            .context("count patients")?;
        let todays_appointments = todays()
            .count(&self.db)
            .await
            .context("count today's appointments")?;
        let pending_forms = todays()
            .filter(patients::Column::Status.is_in([
                PatientStatus::Pending.as_str(),
                PatientStatus::Sent.as_str(),
            ]))
            .count(&self.db)
            .await
            .context("count pending forms")?;
        let forms_sent_today = sms_messages::Entity::find()
            .select_only()
            .column(sms_messages::Column::Id)
            .distinct()
            .join(
                JoinType::InnerJoin,
                sms_messages::Relation::PatientSmsMessages.def(),
            )
            .join(
                JoinType::InnerJoin,
                patient_sms_messages::Relation::Patient.def(),
            )
            .filter(patients::Column::UserId.eq(user_id))
            .filter(sms_messages::Column::SentAt.gte(today.start))
            .filter(sms_messages::Column::SentAt.lt(today.end))
            .count(&self.db)
            .await
            .context("count forms sent today")?;

        Ok(DashboardStats {
            total_patients,
            todays_appointments,
            forms_sent_today,
            pending_forms,
        })
    }
}
