//! Session, user, and envelope types shared by the client and the server

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Untyped envelope payload: every field besides `success` and `message`
pub type JsonMap = Map<String, JsonValue>;

/// The signed-in user as the backend describes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub email: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
}

/// Partial user record; present fields overwrite, absent fields are kept
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
}

impl User {
    /// Merge a partial update into this record
    pub fn apply(&mut self, update: UserUpdate) {
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if update.name.is_some() {
            self.name = update.name;
        }
        if update.phone.is_some() {
            self.phone = update.phone;
        }
        if update.customer_id.is_some() {
            self.customer_id = update.customer_id;
        }
        if update.customer_name.is_some() {
            self.customer_name = update.customer_name;
        }
    }
}

impl From<User> for UserUpdate {
    fn from(user: User) -> Self {
        Self {
            username: Some(user.username),
            email: Some(user.email),
            role: Some(user.role),
            name: user.name,
            phone: user.phone,
            customer_id: user.customer_id,
            customer_name: user.customer_name,
        }
    }
}

/// Account the user may act on behalf of after login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
}

/// In-memory session state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub access_token: Option<String>,
}

/// Standard backend response shape: `{ success, message?, ...payload }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = JsonMap> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Default> Envelope<T> {
    /// Failed envelope with an empty payload
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            payload: T::default(),
        }
    }
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `payload`
    pub fn ok(payload: T) -> Self {
        Self {
            success: true,
            message: None,
            payload,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
