pub mod audit;
pub mod audit_log;
pub mod auth;
pub mod billing;
pub mod brief;
pub mod client;
pub mod cron;
pub mod document;
pub mod integration;
pub mod keyword;
pub mod project;
pub mod usage;
pub mod webhook;
pub mod workspace;
