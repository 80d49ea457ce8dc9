// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::{AppError, Result};

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(user_agent: &str, timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

/// Turn a non-success status into [`AppError::Status`].
pub fn ensure_success(response: Response, context: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(AppError::Status {
            context: context.to_string(),
            status,
        })
    }
}

/// Fetch a page asynchronously and return its raw body.
pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = ensure_success(client.get(url).send().await?, url)?;
    Ok(response.bytes().await?.to_vec())
}

/// Post a form and return the raw response body.
pub async fn post_form_bytes(
    client: &Client,
    url: &str,
    form: &[(&str, &str)],
) -> Result<Vec<u8>> {
    let response = ensure_success(client.post(url).form(form).send().await?, url)?;
    Ok(response.bytes().await?.to_vec())
}
