//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod google;
pub mod memory;
pub mod postgres;

pub use google::GoogleIdTokenVerifier;
pub use memory::MemoryAuthRepository;
pub use postgres::PgAuthRepository;
