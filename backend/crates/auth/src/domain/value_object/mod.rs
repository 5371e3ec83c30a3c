//! Value Object Module

pub mod email;
pub mod ids;
pub mod profile;
pub mod provider;
pub mod user_password;
