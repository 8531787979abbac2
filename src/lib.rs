//! Client layer of the MEDicos pharmacy desk: dashboard controllers, the
//! assistant chat widget and page decoration, driven against the pharmacy
//! HTTP API.

pub mod api;
pub mod chatbot;
pub mod config;
pub mod dashboard;
pub mod executor;
pub mod i18n;
pub mod init;
pub mod notify;
pub mod services;
pub mod ui;
pub mod utils;
