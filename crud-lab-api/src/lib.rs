//! # crud-lab-api
//!
//! Shared API types for the crud-lab service.
//! This crate is designed to be WASM-compatible and can be used in both
//! backend (Rust) and frontend (WASM/TypeScript via wasm-bindgen) applications.
//!
//! ## Features
//!
//! - Request DTOs (RegisterRequest, LoginRequest, Table2Input, etc.)
//! - Response DTOs (Table1Record, ListResponse, ProfileResponse, etc.)
//! - Error response format (ErrorResponse)
//!
//! ## Example
//!
//! ```rust
//! use crud_lab_api::{LoginRequest, Table2Record};
//!
//! let request = LoginRequest {
//!     username: "alice".to_string(),
//!     password: "Secret-pass1".to_string(),
//! };
//! let option = Table2Record { id: 1, positive_small_int: 2 };
//! assert_eq!(option.positive_small_int, 2);
//! ```

pub mod error;
pub mod requests;
pub mod responses;

// Re-exports for convenient access
pub use error::ErrorResponse;
pub use requests::*;
pub use responses::*;
