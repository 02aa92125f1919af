pub mod health;
pub mod submission_session;
