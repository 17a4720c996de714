pub mod dashboard;
pub mod extract;
pub mod message;
pub mod patient;
pub mod sms;
pub mod user;
