use crate::LanguageModelError;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};

/// Create a JSON request, parse the response.
/// Throws error on non OK status code.
///
/// Transport errors are stripped of the request URL, which can carry
/// credentials in its query string.
pub async fn send_json<T: Serialize, R: DeserializeOwned>(
    client: &Client,
    url: &str,
    data: &T,
    headers: reqwest::header::HeaderMap,
) -> Result<R, LanguageModelError> {
    let response = client
        .post(url)
        .headers(headers)
        .json(data)
        .send()
        .await
        .map_err(reqwest::Error::without_url)?;
    let status = response.status();
    if status.is_success() {
        Ok(response
            .json::<R>()
            .await
            .map_err(reqwest::Error::without_url)?)
    } else {
        Err(LanguageModelError::StatusCode(
            status,
            response.text().await.unwrap_or_default(),
        ))
    }
}
