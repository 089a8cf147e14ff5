//! User management tool definitions.

use serde_json::{json, Map, Value};
use tracing::info;

use crate::backend::ManagementClient;
use crate::core::config::CredentialsConfig;
use crate::domains::tools::definition::ToolDefinition;
use crate::domains::tools::error::ToolError;
use crate::domains::tools::schema::{FieldSpec, Format, ParamSchema};

use super::{bool_or, credential_fields, opt_str, required_str, u64_or};

/// Fields kept when summarizing a user record for listings.
fn user_summary(user: &Value) -> Value {
    let mut summary = Map::new();
    for key in [
        "user_id",
        "email",
        "name",
        "created_at",
        "last_login",
        "logins_count",
    ] {
        if let Some(value) = user.get(key) {
            summary.insert(key.to_string(), value.clone());
        }
    }
    Value::Object(summary)
}

// ============================================================================
// List Users
// ============================================================================

/// Paginated user listing.
pub struct ListUsersTool;

impl ListUsersTool {
    pub const NAME: &'static str = "auth0_list_users";
    pub const DESCRIPTION: &'static str = "List users in Auth0";

    fn schema(credentials: &CredentialsConfig) -> ParamSchema {
        let [domain, token] = credential_fields(credentials);
        ParamSchema::new()
            .field(
                FieldSpec::integer("page")
                    .describe("Page number")
                    .minimum(0.0)
                    .default_value(json!(0)),
            )
            .field(
                FieldSpec::integer("per_page")
                    .describe("Number of users per page")
                    .range(1.0, 100.0)
                    .default_value(json!(50)),
            )
            .field(
                FieldSpec::boolean("include_totals")
                    .describe("Include total count")
                    .default_value(json!(true)),
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
        let page = u64_or(&params, "page", 0);
        let per_page = u64_or(&params, "per_page", 50);
        let include_totals = bool_or(&params, "include_totals", true);

        info!("Listing users (page {page}, per_page {per_page})");
        let result = client.list_users(page, per_page, include_totals).await?;

        let users: Vec<Value> = result.users.iter().map(user_summary).collect();
        Ok(json!({ "users": users, "total": result.total }))
    }
}

// ============================================================================
// Create User
// ============================================================================

/// User creation, idempotent on email.
pub struct CreateUserTool;

impl CreateUserTool {
    pub const NAME: &'static str = "auth0_create_user";
    pub const DESCRIPTION: &'static str = "Create a new user in Auth0";

    const DEFAULT_CONNECTION: &'static str = "Username-Password-Authentication";

    fn schema(credentials: &CredentialsConfig) -> ParamSchema {
        let [domain, token] = credential_fields(credentials);
        ParamSchema::new()
            .field(
                FieldSpec::string("email")
                    .describe("User's email address")
                    .format(Format::Email)
                    .required(),
            )
            .field(
                FieldSpec::string("password")
                    .describe("User's password (min 8 characters)")
                    .min_length(8)
                    .required(),
            )
            .field(
                FieldSpec::string("connection")
                    .describe("Auth0 connection name")
                    .default_value(json!(Self::DEFAULT_CONNECTION)),
            )
            .field(
                FieldSpec::boolean("verify_email")
                    .describe("Whether to verify email")
                    .default_value(json!(false)),
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
        let email = required_str(&params, "email")?;

        // Creation is idempotent on email: report the existing user
        // instead of failing.
        if let Some(existing) = client.find_user_by_email(email).await? {
            info!("User already exists: {email}");
            return Ok(json!({ "user": existing, "message": "User already exists" }));
        }

        let user = client
            .create_user(json!({
                "email": email,
                "password": required_str(&params, "password")?,
                "connection": opt_str(&params, "connection").unwrap_or(Self::DEFAULT_CONNECTION),
                "verify_email": bool_or(&params, "verify_email", false),
            }))
            .await?;

        info!("Created user: {email}");
        Ok(json!({ "user": user }))
    }
}

// ============================================================================
// Get User
// ============================================================================

pub struct GetUserTool;

impl GetUserTool {
    pub const NAME: &'static str = "auth0_get_user";
    pub const DESCRIPTION: &'static str = "Get user details by ID";

    fn schema(credentials: &CredentialsConfig) -> ParamSchema {
        let [domain, token] = credential_fields(credentials);
        ParamSchema::new()
            .field(
                FieldSpec::string("id")
                    .describe("Auth0 user ID")
                    .min_length(1)
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
        let user = client.get_user(required_str(&params, "id")?).await?;
        Ok(json!({ "user": user }))
    }
}

// ============================================================================
// Update User
// ============================================================================

pub struct UpdateUserTool;

impl UpdateUserTool {
    pub const NAME: &'static str = "auth0_update_user";
    pub const DESCRIPTION: &'static str = "Update user properties";

    /// Updatable fields forwarded to the API verbatim.
    const UPDATE_FIELDS: [&'static str; 4] = ["email", "verify_email", "password", "blocked"];

    fn schema(credentials: &CredentialsConfig) -> ParamSchema {
        let [domain, token] = credential_fields(credentials);
        ParamSchema::new()
            .field(
                FieldSpec::string("id")
                    .describe("Auth0 user ID")
                    .min_length(1)
                    .required(),
            )
            .field(
                FieldSpec::string("email")
                    .describe("New email address")
                    .format(Format::Email),
            )
            .field(FieldSpec::boolean("verify_email").describe("Whether to verify new email"))
            .field(
                FieldSpec::string("password")
                    .describe("New password (min 8 characters)")
                    .min_length(8),
            )
            .field(FieldSpec::boolean("blocked").describe("Whether to block the user"))
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
        let id = required_str(&params, "id")?;

        let mut fields = Map::new();
        for key in Self::UPDATE_FIELDS {
            if let Some(value) = params.get(key) {
                fields.insert(key.to_string(), value.clone());
            }
        }

        let user = client.update_user(id, Value::Object(fields)).await?;
        info!("Updated user: {id}");
        Ok(json!({ "user": user }))
    }
}

// ============================================================================
// Delete User
// ============================================================================

pub struct DeleteUserTool;

impl DeleteUserTool {
    pub const NAME: &'static str = "auth0_delete_user";
    pub const DESCRIPTION: &'static str = "Delete a user";

    fn schema(credentials: &CredentialsConfig) -> ParamSchema {
        let [domain, token] = credential_fields(credentials);
        ParamSchema::new()
            .field(
                FieldSpec::string("id")
                    .describe("Auth0 user ID")
                    .min_length(1)
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
        let id = required_str(&params, "id")?;
        client.delete_user(id).await?;
        info!("Deleted user: {id}");
        Ok(json!({ "message": "User deleted successfully" }))
    }
}

// ============================================================================
// Tests
// ============================================================================
