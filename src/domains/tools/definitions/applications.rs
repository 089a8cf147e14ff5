//! Application management tool definitions.

use serde_json::{json, Map, Value};
use tracing::info;

use crate::backend::ManagementClient;
use crate::core::config::CredentialsConfig;
use crate::domains::tools::definition::ToolDefinition;
use crate::domains::tools::error::ToolError;
use crate::domains::tools::schema::{FieldSpec, ParamSchema};

use super::{credential_fields, opt_str, required_str};

// ============================================================================
// Create Application
// ============================================================================

pub struct CreateApplicationTool;

impl CreateApplicationTool {
    pub const NAME: &'static str = "auth0_create_application";
    pub const DESCRIPTION: &'static str = "Create a new application";

    const DEFAULT_APP_TYPE: &'static str = "regular_web";

    fn schema(credentials: &CredentialsConfig) -> ParamSchema {
        let [domain, token] = credential_fields(credentials);
        ParamSchema::new()
            .field(
                FieldSpec::string("name")
                    .describe("Name of the application")
                    .min_length(1)
                    .required(),
            )
            .field(
                FieldSpec::string("app_type")
                    .describe("Type of the application")
                    .default_value(json!(Self::DEFAULT_APP_TYPE)),
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
        let name = required_str(&params, "name")?;
        let app_type = opt_str(&params, "app_type").unwrap_or(Self::DEFAULT_APP_TYPE);

        let application = client.create_client(name, app_type).await?;
        info!("Created application: {name}");
        Ok(json!({ "application": application }))
    }
}

// ============================================================================
// List Applications
// ============================================================================

pub struct ListApplicationsTool;

impl ListApplicationsTool {
    pub const NAME: &'static str = "auth0_list_applications";
    pub const DESCRIPTION: &'static str = "List all applications";

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
        let applications = client.list_clients().await?;
        Ok(json!({ "applications": applications }))
    }
}
