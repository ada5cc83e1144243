pub mod password;
pub mod permissions;
pub mod services;
pub mod session;
pub mod validation;
