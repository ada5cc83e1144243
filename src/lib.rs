pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod ingestion;
pub mod pagination;
pub mod response;
pub mod services;
pub mod state;
pub mod storage;
