//! Profile commands; all of them require a session

use super::AuthGateway;
use super::request::ApiRequest;
use crate::types::{Endpoint, ProfilePayload, ResetPasswordRequest, UpdateProfileRequest};
use starlight_core::{Envelope, JsonMap, UserUpdate, Validate};
use tracing::instrument;

impl AuthGateway {
    /// Fetch the profile and merge it into the stored user
    #[instrument(name = "command.get_profile", skip_all)]
    pub async fn get_profile(&self) -> Envelope<ProfilePayload> {
        let envelope: Envelope<ProfilePayload> = self
            .authenticated_command(ApiRequest::get(Endpoint::Profile.path()), "get_profile")
            .await;
        if envelope.success
            && let Some(user) = &envelope.payload.user
        {
            self.store.update_user(user.clone().into());
        }
        envelope
    }

    /// Change profile fields
    ///
    /// On success the user returned by the backend is merged into the store,
    /// or the submitted fields when the backend returns none.
    #[instrument(name = "command.update_profile", skip_all)]
    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Envelope<ProfilePayload> {
        if let Err(e) = request.validate() {
            return Envelope::failure(e.to_string());
        }
        let api_request = match ApiRequest::put(Endpoint::Profile.path()).json(request) {
            Ok(api_request) => api_request,
            Err(e) => return Envelope::failure(e.to_string()),
        };

        let envelope: Envelope<ProfilePayload> = self
            .authenticated_command(api_request, "update_profile")
            .await;
        if envelope.success {
            let update = match &envelope.payload.user {
                Some(user) => user.clone().into(),
                None => UserUpdate {
                    name: request.name.clone(),
                    email: request.email.clone(),
                    phone: request.phone.clone(),
                    ..Default::default()
                },
            };
            self.store.update_user(update);
        }
        envelope
    }

    /// Change the password
    #[instrument(name = "command.reset_password", skip_all)]
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Envelope<JsonMap> {
        if let Err(e) = request.validate() {
            return Envelope::failure(e.to_string());
        }
        match ApiRequest::post(Endpoint::ResetPassword.path()).json(request) {
            Ok(api_request) => {
                self.authenticated_command(api_request, "reset_password")
                    .await
            }
            Err(e) => Envelope::failure(e.to_string()),
        }
    }
}
