//! Role management tool definitions.

use serde_json::{json, Map, Value};
use tracing::info;

use crate::backend::ManagementClient;
use crate::core::config::CredentialsConfig;
use crate::domains::tools::definition::ToolDefinition;
use crate::domains::tools::error::ToolError;
use crate::domains::tools::schema::{FieldSpec, ParamSchema};

use super::{credential_fields, required_str};

// ============================================================================
// List Roles
// ============================================================================

pub struct ListRolesTool;

impl ListRolesTool {
    pub const NAME: &'static str = "auth0_list_roles";
    pub const DESCRIPTION: &'static str = "List all roles";

    fn schema(credentials: &CredentialsConfig) -> ParamSchema {
        let [domain, token] = credential_fields(credentials);
        ParamSchema::new().field(domain).field(token)
    }

    pub fn definition(credentials: &CredentialsConfig) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            Self::schema(credentials),
            |params| async move { Self::execute(params).await },
        )
    }

    async fn execute(params: Map<String, Value>) -> Result<Value, ToolError> {
        let client = ManagementClient::from_params(&params)?;
        let roles = client.list_roles().await?;
        Ok(json!({ "roles": roles }))
    }
}

// ============================================================================
// Assign Roles
// ============================================================================

pub struct AssignRolesTool;

impl AssignRolesTool {
    pub const NAME: &'static str = "auth0_assign_roles_to_user";
    pub const DESCRIPTION: &'static str = "Assign roles to a user";

    fn schema(credentials: &CredentialsConfig) -> ParamSchema {
        let [domain, token] = credential_fields(credentials);
        ParamSchema::new()
            .field(
                FieldSpec::string("user_id")
                    .describe("Auth0 user ID")
                    .min_length(1)
                    .required(),
            )
            .field(
                FieldSpec::string_array("roles")
                    .describe("Array of role IDs to assign")
                    .required(),
            )
            .field(domain)
            .field(token)
    }

    pub fn definition(credentials: &CredentialsConfig) -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            Self::schema(credentials),
            |params| async move { Self::execute(params).await },
        )
    }

    async fn execute(params: Map<String, Value>) -> Result<Value, ToolError> {
        let client = ManagementClient::from_params(&params)?;
        let user_id = required_str(&params, "user_id")?;
        let roles: Vec<String> = params
            .get("roles")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        client.assign_roles(user_id, &roles).await?;
        info!("Assigned {} role(s) to {user_id}", roles.len());
        Ok(json!({ "message": "Roles assigned successfully" }))
    }
}
