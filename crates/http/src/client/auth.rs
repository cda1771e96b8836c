//! Authentication commands

use super::AuthGateway;
use super::envelope::{SESSION_EXPIRED, UNEXPECTED_RESPONSE, read_envelope};
use super::request::ApiRequest;
use crate::types::{
    AuthPayload, Endpoint, LoginRequest, RegisterRequest, SelectCustomerRequest,
    SelectTenantRequest,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use starlight_core::{Envelope, JsonMap, Validate};
use tracing::{info, instrument};

impl AuthGateway {
    /// Sign in; a successful response starts the session
    #[instrument(name = "command.login", skip_all, fields(username = %request.username))]
    pub async fn login(&self, request: &LoginRequest) -> Envelope<AuthPayload> {
        let envelope = self.public_command(Endpoint::Login, request).await;
        if envelope.success {
            self.adopt_session(&envelope.payload);
        }
        envelope
    }

    /// Create an account; the session is left untouched
    #[instrument(name = "command.register", skip_all, fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Envelope<JsonMap> {
        self.public_command(Endpoint::Register, request).await
    }

    /// Choose the customer account to act for
    #[instrument(
        name = "command.select_customer",
        skip_all,
        fields(username = %request.username, customer_id = request.customer_id)
    )]
    pub async fn select_customer(&self, request: &SelectCustomerRequest) -> Envelope<AuthPayload> {
        let envelope = self.public_command(Endpoint::SelectCustomer, request).await;
        if envelope.success {
            self.adopt_session(&envelope.payload);
        }
        envelope
    }

    /// Choose the tenant to act for
    #[instrument(
        name = "command.select_tenant",
        skip_all,
        fields(username = %request.username, tenant_id = request.tenant_id)
    )]
    pub async fn select_tenant(&self, request: &SelectTenantRequest) -> Envelope<AuthPayload> {
        let envelope = self.public_command(Endpoint::SelectTenant, request).await;
        if envelope.success {
            self.adopt_session(&envelope.payload);
        }
        envelope
    }

    /// Revoke the session on the backend and clear it locally
    ///
    /// The local session is cleared even when the backend call fails.
    #[instrument(name = "command.logout", skip_all)]
    pub async fn logout(&self) -> Envelope<JsonMap> {
        let envelope = self
            .authenticated_command(ApiRequest::post(Endpoint::Revoke.path()), "logout")
            .await;
        self.store.logout();
        info!("Signed out");
        envelope
    }

    async fn public_command<B, T>(&self, endpoint: Endpoint, request: &B) -> Envelope<T>
    where
        B: Serialize + Validate,
        T: DeserializeOwned + Default,
    {
        if let Err(e) = request.validate() {
            return Envelope::failure(e.to_string());
        }
        let result = self.client.post_public(endpoint, request).await;
        read_envelope(result, endpoint.label(), UNEXPECTED_RESPONSE).await
    }

    /// Send through the gateway and decode the envelope
    pub(crate) async fn authenticated_command<T>(
        &self,
        request: ApiRequest,
        command: &'static str,
    ) -> Envelope<T>
    where
        T: DeserializeOwned + Default,
    {
        let result = self.send(&request).await;
        let expired = matches!(&result, Ok(response) if response.status() == reqwest::StatusCode::UNAUTHORIZED)
            && !self.store.is_authenticated();
        let fallback = if expired {
            SESSION_EXPIRED
        } else {
            UNEXPECTED_RESPONSE
        };
        read_envelope(result, command, fallback).await
    }

    fn adopt_session(&self, payload: &AuthPayload) {
        match (&payload.user, &payload.access_token) {
            (Some(user), Some(token)) => {
                self.store.login(user.clone(), token.clone());
                info!(username = %user.username, "Signed in");
            }
            (Some(user), None) => self.store.update_user(user.clone().into()),
            _ => {}
        }
    }
}
