//! Auth0 Management API v2 client.
//!
//! A thin, stateless wrapper over the REST endpoints the tools need.
//! Clients are constructed fresh per tool invocation from the call's own
//! `domain`/`token` arguments and discarded afterwards; nothing here is
//! shared mutable state across in-flight calls.

use std::fmt;

use reqwest::{Method, StatusCode};
use serde_json::{json, Map, Value};
use tracing::debug;
use urlencoding::encode;

use super::error::BackendError;

/// One page of users as returned by `GET /api/v2/users` with totals.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<Value>,
    pub total: u64,
}

/// Stateless client for the Auth0 Management API.
pub struct ManagementClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

/// Custom Debug implementation to redact the token from logs.
impl fmt::Debug for ManagementClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagementClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl ManagementClient {
    /// Create a client for the given tenant domain and API token.
    pub fn new(domain: &str, token: &str) -> Result<Self, BackendError> {
        // The domain is interpolated into the URL authority; anything
        // beyond a bare hostname would change the request target.
        if domain.is_empty()
            || domain.contains('/')
            || domain.contains('@')
            || domain.contains("://")
            || domain.contains(char::is_whitespace)
        {
            return Err(BackendError::InvalidDomain(domain.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: format!("https://{domain}/api/v2"),
            token: token.to_string(),
        })
    }

    /// Build a client from validated tool parameters (`domain`, `token`).
    pub fn from_params(params: &Map<String, Value>) -> Result<Self, BackendError> {
        let domain = params
            .get("domain")
            .and_then(Value::as_str)
            .ok_or(BackendError::MissingCredential("domain"))?;
        let token = params
            .get("token")
            .and_then(Value::as_str)
            .ok_or(BackendError::MissingCredential("token"))?;
        Self::new(domain, token)
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// List users with pagination.
    pub async fn list_users(
        &self,
        page: u64,
        per_page: u64,
        include_totals: bool,
    ) -> Result<UserPage, BackendError> {
        let url = format!(
            "{}/users?page={page}&per_page={per_page}&include_totals={include_totals}",
            self.base_url
        );
        let body = self.send(Method::GET, &url, None).await?;

        // With include_totals Auth0 wraps the page: {users, total, ...}.
        // Without, the body is the bare array.
        let (users, total) = match &body {
            Value::Object(map) => {
                let users = map
                    .get("users")
                    .and_then(Value::as_array)
                    .ok_or_else(|| {
                        BackendError::InvalidResponse("user list missing 'users' array".into())
                    })?
                    .clone();
                let total = map
                    .get("total")
                    .and_then(Value::as_u64)
                    .unwrap_or(users.len() as u64);
                (users, total)
            }
            Value::Array(users) => (users.clone(), users.len() as u64),
            _ => {
                return Err(BackendError::InvalidResponse(
                    "user list is neither an object nor an array".into(),
                ))
            }
        };

        Ok(UserPage { users, total })
    }

    /// Find a user by exact email, if any.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<Value>, BackendError> {
        let query = format!("email:\"{email}\"");
        let url = format!("{}/users?q={}&per_page=1", self.base_url, encode(&query));
        let body = self.send(Method::GET, &url, None).await?;

        let found = match body {
            Value::Array(mut users) => {
                if users.is_empty() {
                    None
                } else {
                    Some(users.remove(0))
                }
            }
            Value::Object(map) => map
                .get("users")
                .and_then(Value::as_array)
                .and_then(|users| users.first().cloned()),
            _ => None,
        };
        Ok(found)
    }

    /// Create a user in the given connection.
    pub async fn create_user(&self, fields: Value) -> Result<Value, BackendError> {
        let url = format!("{}/users", self.base_url);
        self.send(Method::POST, &url, Some(fields)).await
    }

    /// Fetch one user by id.
    pub async fn get_user(&self, id: &str) -> Result<Value, BackendError> {
        let url = format!("{}/users/{}", self.base_url, encode(id));
        self.send(Method::GET, &url, None).await
    }

    /// Patch user properties.
    pub async fn update_user(&self, id: &str, fields: Value) -> Result<Value, BackendError> {
        let url = format!("{}/users/{}", self.base_url, encode(id));
        self.send(Method::PATCH, &url, Some(fields)).await
    }

    /// Delete a user by id.
    pub async fn delete_user(&self, id: &str) -> Result<(), BackendError> {
        let url = format!("{}/users/{}", self.base_url, encode(id));
        self.send(Method::DELETE, &url, None).await.map(|_| ())
    }

    /// Assign roles to a user.
    pub async fn assign_roles(&self, user_id: &str, roles: &[String]) -> Result<(), BackendError> {
        let url = format!("{}/users/{}/roles", self.base_url, encode(user_id));
        self.send(Method::POST, &url, Some(json!({ "roles": roles })))
            .await
            .map(|_| ())
    }

    // ========================================================================
    // Applications (clients) and roles
    // ========================================================================

    /// Create an application (an Auth0 "client").
    pub async fn create_client(&self, name: &str, app_type: &str) -> Result<Value, BackendError> {
        let url = format!("{}/clients", self.base_url);
        self.send(
            Method::POST,
            &url,
            Some(json!({ "name": name, "app_type": app_type })),
        )
        .await
    }

    /// List all applications.
    pub async fn list_clients(&self) -> Result<Value, BackendError> {
        let url = format!("{}/clients", self.base_url);
        self.send(Method::GET, &url, None).await
    }

    /// List all roles.
    pub async fn list_roles(&self) -> Result<Value, BackendError> {
        let url = format!("{}/roles", self.base_url);
        self.send(Method::GET, &url, None).await
    }

    // ========================================================================
    // Request plumbing
    // ========================================================================

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<Value, BackendError> {
        debug!("Auth0 API request: {method} {url}");

        let mut request = self.http.request(method, url).bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = extract_api_error(response.text().await.unwrap_or_default());
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let text = response.text().await?;
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| BackendError::InvalidResponse(format!("malformed JSON body: {e}")))
    }
}

/// Pull the human-readable message out of an Auth0 error body, falling
/// back to the raw text.
fn extract_api_error(body: String) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&body) {
        for key in ["message", "error_description", "error"] {
            if let Some(message) = map.get(key).and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }
    if body.is_empty() {
        "no error detail provided".to_string()
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_hostname_domains() {
        for bad in ["", "https://tenant.auth0.com", "tenant.auth0.com/api", "a b"] {
            assert!(ManagementClient::new(bad, "token").is_err(), "{bad:?}");
        }
        assert!(ManagementClient::new("tenant.eu.auth0.com", "token").is_ok());
    }

    #[test]
    fn test_from_params_requires_credentials() {
        let mut params = Map::new();
        params.insert("domain".into(), json!("tenant.auth0.com"));
        let err = ManagementClient::from_params(&params).unwrap_err();
        assert!(matches!(err, BackendError::MissingCredential("token")));
    }

    #[test]
    fn test_user_ids_are_path_escaped() {
        assert_eq!(encode("auth0|123abc"), "auth0%7C123abc");
        assert_eq!(encode("email:\"a@b.co\""), "email%3A%22a%40b.co%22");
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = ManagementClient::new("tenant.auth0.com", "super_secret_token").unwrap();
        let debug_str = format!("{client:?}");
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_token"));
    }

    #[test]
    fn test_extract_api_error_prefers_message() {
        let body = r#"{"statusCode":401,"error":"Unauthorized","message":"Expired token"}"#;
        assert_eq!(extract_api_error(body.to_string()), "Expired token");
        assert_eq!(
            extract_api_error(String::new()),
            "no error detail provided"
        );
        assert_eq!(extract_api_error("plain".to_string()), "plain");
    }
}
