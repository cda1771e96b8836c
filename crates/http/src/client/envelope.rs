//! Turning backend responses into envelopes at the command boundary

use super::ClientError;
use serde::de::DeserializeOwned;
use starlight_core::Envelope;
use tracing::{error, warn};

pub(crate) const UNABLE_TO_CONNECT: &str = "Unable to connect to server";
pub(crate) const UNEXPECTED_RESPONSE: &str = "Unexpected response from server";
pub(crate) const SESSION_EXPIRED: &str = "Session expired. Please sign in again.";

/// Decode the backend envelope whatever the status; never fails
///
/// `fallback` is the message used when the body is not an envelope.
pub(crate) async fn read_envelope<T>(
    result: Result<reqwest::Response, ClientError>,
    command: &'static str,
    fallback: &str,
) -> Envelope<T>
where
    T: DeserializeOwned + Default,
{
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            error!(command, "request failed: {}", e);
            return Envelope::failure(UNABLE_TO_CONNECT);
        }
    };

    let status = response.status();
    match response.json::<Envelope<T>>().await {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(command, %status, "response is not an envelope: {}", e);
            Envelope::failure(fallback)
        }
    }
}
