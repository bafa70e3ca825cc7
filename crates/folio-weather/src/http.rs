//! Shared outbound HTTP plumbing for the upstream clients.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::types::WeatherError;

/// Build the outbound client shared by the geocoding and forecast clients.
pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, WeatherError> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Turn an upstream response into `T`, mapping non-2xx statuses and
/// unexpected bodies to typed errors.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, WeatherError> {
    let status = response.status();

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(WeatherError::Upstream {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| WeatherError::Parse(format!("JSON parse error: {}", e)))
}
