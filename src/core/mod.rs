pub mod clients;
pub mod config;
pub mod mailer;
pub mod models;
pub mod report;
