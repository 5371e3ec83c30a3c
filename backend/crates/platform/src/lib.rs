//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Signed access/refresh tokens (JWT, HMAC-SHA2)
//! - Cookie management
//! - Request header helpers (bearer tokens, client IP)

pub mod client;
pub mod cookie;
pub mod password;
pub mod token;
