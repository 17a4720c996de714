pub mod dashboard;
pub mod dispatch;
pub mod patient;
pub mod seed;
pub mod user;
