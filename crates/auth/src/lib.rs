//! `osdesk-auth`: operator accounts, password hashing and session tokens.
//!
//! Decoupled from HTTP and storage: the API layer extracts bearer tokens and
//! the repositories persist [`User`] records.

pub mod error;
pub mod password;
pub mod token;
pub mod user;

pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use token::{SessionClaims, TokenConfig, issue_token, validate_token};
pub use user::{Registration, User, UserUpdate};
