//! External operation backend: the Auth0 Management API.
//!
//! The core protocol never touches this module directly; tool handlers
//! construct a [`ManagementClient`] per invocation and await its calls.

mod auth0;
mod error;

pub use auth0::{ManagementClient, UserPage};
pub use error::BackendError;
