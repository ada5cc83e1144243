pub mod admin;
pub mod auth;
pub mod crud;
pub mod dashboard;
pub mod health;
pub mod preferences;
pub mod table1;
