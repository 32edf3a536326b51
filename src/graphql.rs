use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<V>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<D> {
    pub data: Option<D>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

pub fn post_query<V, D>(
    client: &Client,
    endpoint: &str,
    query: &str,
    variables: Option<V>,
) -> Result<D, FetchError>
where
    V: Serialize,
    D: DeserializeOwned,
{
    let body = GraphQlRequest { query, variables };
    let resp = client
        .post(endpoint)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "application/json")
        .json(&body)
        .send()?;
    let status = resp.status();
    let text = resp.text()?;
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    decode_response(&text)
}

/// Unwraps the GraphQL envelope. An `errors` array fails the request even when
/// partial `data` came back alongside it.
pub fn decode_response<D: DeserializeOwned>(raw: &str) -> Result<D, FetchError> {
    let envelope: GraphQlResponse<D> = serde_json::from_str(raw.trim())?;
    let errors = envelope.errors.unwrap_or_default();
    if !errors.is_empty() {
        let messages = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(FetchError::GraphQl(messages));
    }
    envelope.data.ok_or(FetchError::MissingData)
}
