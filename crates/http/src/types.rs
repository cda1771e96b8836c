//! Common types used by both client and server

use serde::{Deserialize, Serialize};
use starlight_core::validation::validators::{
    validate_email, validate_id, validate_not_empty,
};
use starlight_core::{Customer, User, Validate, ValidationError};
use std::fmt;

/// Backend operations the client and the proxy know about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    Register,
    SelectCustomer,
    SelectTenant,
    Refresh,
    Revoke,
    Profile,
    ResetPassword,
}

impl Endpoint {
    /// Path on the backend
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/api/auth/login",
            Self::Register => "/api/auth/register",
            Self::SelectCustomer => "/api/auth/select-customer",
            Self::SelectTenant => "/api/auth/select-tenant",
            Self::Refresh => "/api/auth/refresh",
            Self::Revoke => "/api/auth/revoke",
            Self::Profile => "/api/user/profile",
            Self::ResetPassword => "/api/user/reset-password",
        }
    }

    /// Same-origin relay path, for the endpoints that have one
    pub const fn proxy_path(self) -> Option<&'static str> {
        match self {
            Self::Login => Some("/api/proxy/auth/login"),
            Self::Register => Some("/api/proxy/auth/register"),
            Self::SelectCustomer => Some("/api/proxy/auth/select-customer"),
            Self::SelectTenant => Some("/api/proxy/auth/select-tenant"),
            _ => None,
        }
    }

    /// Human name used in log lines and error messages
    pub const fn label(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "registration",
            Self::SelectCustomer => "customer selection",
            Self::SelectTenant => "tenant selection",
            Self::Refresh => "token refresh",
            Self::Revoke => "logout",
            Self::Profile => "profile",
            Self::ResetPassword => "password reset",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Path of the local mock login route
pub const MOCK_LOGIN_PATH: &str = "/api/login";

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Pick the customer account to act for after login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SelectCustomerRequest {
    pub username: String,
    pub customer_id: i64,
}

/// Pick the tenant to act for after login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SelectTenantRequest {
    pub username: String,
    pub tenant_id: i64,
}

/// Profile fields to change; absent fields are left alone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Password change; the confirmation never leaves the process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub current_password: String,
    pub new_password: String,
    #[serde(default, skip_serializing)]
    pub confirm_password: String,
}

/// Payload of login and account selection responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customers: Option<Vec<Customer>>,
}

/// Payload of profile responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePayload {
    #[serde(default, alias = "profile", skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Payload of the refresh response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshPayload {
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_empty(&self.username, "Username")?;
        validate_not_empty(&self.password, "Password")
    }
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_empty(&self.username, "Username")?;
        validate_not_empty(&self.password, "Password")?;
        validate_email(&self.email, "Email")
    }
}

impl Validate for SelectCustomerRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_empty(&self.username, "Username")?;
        validate_id(self.customer_id, "Customer")
    }
}

impl Validate for SelectTenantRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_empty(&self.username, "Username")?;
        validate_id(self.tenant_id, "Tenant")
    }
}

impl Validate for UpdateProfileRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_none() && self.email.is_none() && self.phone.is_none() {
            return Err(ValidationError("Nothing to update".to_string()));
        }
        if let Some(name) = &self.name {
            validate_not_empty(name, "Name")?;
        }
        if let Some(email) = &self.email {
            validate_email(email, "Email")?;
        }
        Ok(())
    }
}

impl Validate for ResetPasswordRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_not_empty(&self.current_password, "Current password")?;
        validate_not_empty(&self.new_password, "New password")?;
        if self.new_password != self.confirm_password {
            return Err(ValidationError("New passwords do not match".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn every_proxied_endpoint_mirrors_its_backend_path() {
        for endpoint in [
            Endpoint::Login,
            Endpoint::Register,
            Endpoint::SelectCustomer,
            Endpoint::SelectTenant,
        ] {
            let proxy = endpoint.proxy_path().unwrap();
            assert_eq!(
                proxy.trim_start_matches("/api/proxy"),
                endpoint.path().trim_start_matches("/api")
            );
        }
        assert_eq!(Endpoint::Refresh.proxy_path(), None);
        assert_eq!(Endpoint::Profile.proxy_path(), None);
    }

    #[test]
    fn reset_password_keeps_confirmation_local() {
        let request = ResetPasswordRequest {
            current_password: "password".to_string(),
            new_password: "newpassword123".to_string(),
            confirm_password: "newpassword123".to_string(),
        };
        assert!(request.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "currentPassword": "password", "newPassword": "newpassword123" })
        );
    }

    #[test]
    fn reset_password_rejects_mismatch() {
        let request = ResetPasswordRequest {
            current_password: "password".to_string(),
            new_password: "newpassword123".to_string(),
            confirm_password: "mismatch".to_string(),
        };
        assert_eq!(
            request.validate().unwrap_err().to_string(),
            "New passwords do not match"
        );
    }

    #[test]
    fn select_customer_serializes_camel_case() {
        let request = SelectCustomerRequest {
            username: "admin".to_string(),
            customer_id: 42,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "username": "admin", "customerId": 42 })
        );
    }

    #[test]
    fn profile_payload_accepts_either_key() {
        let body = json!({
            "profile": {
                "username": "admin",
                "email": "admin@starlighterp.com",
                "role": "admin"
            }
        });
        let payload: ProfilePayload = serde_json::from_value(body).unwrap();
        assert_eq!(payload.user.unwrap().username, "admin");
    }

    #[test]
    fn empty_profile_update_is_rejected() {
        assert!(UpdateProfileRequest::default().validate().is_err());
        let request = UpdateProfileRequest {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }
}
