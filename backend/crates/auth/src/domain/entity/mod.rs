//! Entity Module

pub mod linked_account;
pub mod user;
