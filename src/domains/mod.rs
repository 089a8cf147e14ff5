//! Domains module containing business logic organized by bounded contexts.

pub mod events;
pub mod tools;
