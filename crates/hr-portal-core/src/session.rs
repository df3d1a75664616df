//! Authenticated session state.

use crate::config::DevConfig;
use crate::{PortalError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// The session returned by `/web/session/authenticate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub uid: i64,
    pub session_id: String,
    pub database: String,
    pub username: String,
}

impl Session {
    /// Session for the local development login.
    pub fn development(database: impl Into<String>) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self {
            uid: DevConfig::UID,
            session_id: format!("mock_session_{}", millis),
            database: database.into(),
            username: DevConfig::LOGIN.to_string(),
        }
    }

    /// Parse the `result` of an authenticate call.
    ///
    /// A missing or non-positive `uid` means the credentials were refused.
    pub fn from_auth_result(result: &Value, database: &str, login: &str) -> Result<Self> {
        let uid = result
            .get("uid")
            .and_then(Value::as_i64)
            .filter(|uid| *uid > 0)
            .ok_or_else(|| PortalError::rpc("invalid credentials"))?;

        Ok(Self {
            uid,
            session_id: result
                .get("session_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            database: result
                .get("db")
                .and_then(Value::as_str)
                .unwrap_or(database)
                .to_string(),
            username: result
                .get("username")
                .and_then(Value::as_str)
                .unwrap_or(login)
                .to_string(),
        })
    }

    /// The authenticate `result` payload describing this session.
    pub fn to_auth_result(&self) -> Value {
        json!({
            "uid": self.uid,
            "session_id": self.session_id,
            "username": self.username,
            "user_context": {},
            "db": self.database,
        })
    }
}

/// True for the fixed local development credential pair.
pub fn is_dev_credentials(login: &str, password: &str) -> bool {
    login == DevConfig::LOGIN && password == DevConfig::PASSWORD
}
