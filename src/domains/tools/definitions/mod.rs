//! Tool definitions, one subdomain per file.
//!
//! Each tool declares its schema and handler and is registered by
//! [`register_all`] at server start-up. Handlers build a fresh
//! [`crate::backend::ManagementClient`] from the validated call
//! parameters; no backend state is shared between invocations.

mod applications;
mod roles;
mod users;

pub use applications::{CreateApplicationTool, ListApplicationsTool};
pub use roles::{AssignRolesTool, ListRolesTool};
pub use users::{CreateUserTool, DeleteUserTool, GetUserTool, ListUsersTool, UpdateUserTool};

use serde_json::{json, Map, Value};

use crate::core::config::CredentialsConfig;
use crate::domains::tools::error::ToolError;
use crate::domains::tools::registry::ToolRegistry;
use crate::domains::tools::schema::FieldSpec;

/// Register every Auth0 tool, in the order clients should discover them.
pub fn register_all(
    registry: &mut ToolRegistry,
    credentials: &CredentialsConfig,
) -> Result<(), ToolError> {
    registry.register(ListUsersTool::definition(credentials))?;
    registry.register(CreateUserTool::definition(credentials))?;
    registry.register(GetUserTool::definition(credentials))?;
    registry.register(UpdateUserTool::definition(credentials))?;
    registry.register(DeleteUserTool::definition(credentials))?;
    registry.register(CreateApplicationTool::definition(credentials))?;
    registry.register(ListApplicationsTool::definition(credentials))?;
    registry.register(ListRolesTool::definition(credentials))?;
    registry.register(AssignRolesTool::definition(credentials))?;
    Ok(())
}

/// The `domain`/`token` fields every tool carries.
///
/// When fallback credentials are configured they become schema defaults
/// and the fields turn optional; otherwise the caller must supply them
/// on every invocation.
pub(crate) fn credential_fields(credentials: &CredentialsConfig) -> [FieldSpec; 2] {
    let domain = FieldSpec::string("domain").describe("Auth0 domain");
    let token = FieldSpec::string("token")
        .describe("Auth0 management API token")
        .sensitive();

    match (&credentials.domain, &credentials.token) {
        (Some(default_domain), Some(default_token)) => [
            domain.default_value(json!(default_domain)),
            token.default_value(json!(default_token)),
        ],
        _ => [domain.required(), token.required()],
    }
}

// ============================================================================
// Validated-parameter accessors
// ============================================================================

// Validation guarantees these shapes; the fallbacks below only guard
// against a schema/handler mismatch introduced by a future edit.

pub(crate) fn required_str<'a>(
    params: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a str, ToolError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::execution_failed(format!("missing '{key}' parameter")))
}

pub(crate) fn opt_str<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

pub(crate) fn u64_or(params: &Map<String, Value>, key: &str, default: u64) -> u64 {
    params.get(key).and_then(Value::as_u64).unwrap_or(default)
}

pub(crate) fn bool_or(params: &Map<String, Value>, key: &str, default: bool) -> bool {
    params.get(key).and_then(Value::as_bool).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_credentials() -> CredentialsConfig {
        CredentialsConfig {
            domain: None,
            token: None,
        }
    }

    fn full_credentials() -> CredentialsConfig {
        CredentialsConfig {
            domain: Some("tenant.auth0.com".to_string()),
            token: Some("mgmt-token".to_string()),
        }
    }

    #[test]
    fn test_register_all_registers_nine_tools_in_order() {
        let mut registry = ToolRegistry::new();
        register_all(&mut registry, &no_credentials()).unwrap();

        let names: Vec<String> = registry.list().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "auth0_list_users",
                "auth0_create_user",
                "auth0_get_user",
                "auth0_update_user",
                "auth0_delete_user",
                "auth0_create_application",
                "auth0_list_applications",
                "auth0_list_roles",
                "auth0_assign_roles_to_user",
            ]
        );
    }

    #[test]
    fn test_credentials_required_without_fallback() {
        let [domain, token] = credential_fields(&no_credentials());
        assert!(domain.required);
        assert!(token.required);
        assert!(domain.default.is_none());
    }

    #[test]
    fn test_credentials_default_with_fallback() {
        let [domain, token] = credential_fields(&full_credentials());
        assert!(!domain.required);
        assert_eq!(domain.default, Some(json!("tenant.auth0.com")));
        assert_eq!(token.default, Some(json!("mgmt-token")));
    }

    #[test]
    fn test_discovery_never_exposes_fallback_token() {
        let mut registry = ToolRegistry::new();
        register_all(&mut registry, &full_credentials()).unwrap();

        let wire = serde_json::to_string(&registry.list()).unwrap();
        assert!(!wire.contains("mgmt-token"));

        // The token default still applies during validation.
        let schema = registry
            .lookup("auth0_list_users")
            .unwrap()
            .schema()
            .clone();
        let params = crate::domains::tools::validate(&schema, &json!({})).unwrap();
        assert_eq!(params["token"], "mgmt-token");
        assert_eq!(params["domain"], "tenant.auth0.com");
    }
}
