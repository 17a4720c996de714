//! sea-orm entities for the outreach service.

pub mod patient_sms_messages;
pub mod patients;
pub mod sms_messages;
pub mod users;
