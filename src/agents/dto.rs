use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit JSON `null` the same as an absent field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Request body for agent registration. Missing or null fields deserialize as
/// empty strings and are rejected by the service.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub password: String,
}

/// Returned by both register and login on success.
#[derive(Debug, Serialize)]
pub struct AuthSuccess {
    pub success: bool,
    pub agent_id: i64,
    pub message: String,
}

impl AuthSuccess {
    pub fn new(agent_id: i64, message: impl Into<String>) -> Self {
        Self {
            success: true,
            agent_id,
            message: message.into(),
        }
    }
}

/// Every failed credential call answers with this shape.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}
