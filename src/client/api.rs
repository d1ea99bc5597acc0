use http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::error::ClientError;
use crate::domain::page::TodoPage;
use crate::domain::todo::{Todo, TodoId};
use crate::http::types::{ErrorEnvelope, TodoEnvelope};

/// HTTP proxy for the todo API.
#[derive(Debug, Clone)]
pub struct TodoApi {
    http: reqwest::Client,
    base_url: String,
}

impl TodoApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String { format!("{}/api/todos{}", self.base_url, path) }

    pub async fn get(&self, page: u32, limit: u32) -> Result<TodoPage, ClientError> {
        let response = self.http.get(self.url("")).query(&[("page", page), ("limit", limit)]).send().await?;
        let body = successful_body(response).await?;
        decode_page(&body)
    }

    pub async fn create_by_content(&self, content: &str) -> Result<Todo, ClientError> {
        let response = self.http.post(self.url("")).json(&json!({ "content": content })).send().await?;
        decode_todo(&successful_body(response).await?)
    }

    pub async fn update_content(&self, id: TodoId, content: &str) -> Result<Todo, ClientError> {
        let response = self.http.patch(self.url(&format!("/{id}"))).json(&json!({ "content": content })).send().await?;
        decode_todo(&successful_body(response).await?)
    }

    pub async fn toggle_done(&self, id: TodoId) -> Result<Todo, ClientError> {
        let response = self.http.put(self.url(&format!("/{id}/toggle-done"))).send().await?;
        decode_todo(&successful_body(response).await?)
    }

    pub async fn delete_by_id(&self, id: TodoId) -> Result<(), ClientError> {
        let response = self.http.delete(self.url(&format!("/{id}"))).send().await?;
        successful_body(response).await?;
        Ok(())
    }
}

/// Body of a 2xx response; anything else becomes [`ClientError::Http`] carrying
/// the server's error message when it sent one.
async fn successful_body(response: reqwest::Response) -> Result<Vec<u8>, ClientError> {
    let status = response.status();
    let body = response.bytes().await?.to_vec();
    if status.is_success() {
        return Ok(body);
    }
    Err(ClientError::Http { status, message: error_message(status, &body) })
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
    }
}

fn strict<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    serde_json::from_slice(body).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Decode a `{ total, pages, todos }` listing, rejecting any malformed record.
pub fn decode_page(body: &[u8]) -> Result<TodoPage, ClientError> { strict(body) }

/// Decode a `{ todo }` envelope.
pub fn decode_todo(body: &[u8]) -> Result<Todo, ClientError> {
    strict::<TodoEnvelope>(body).map(|envelope| envelope.todo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_listing() {
        let body = br#"{"total":1,"pages":1,"todos":[{"id":"f478cf94-9df9-4d56-acfb-0dd00246a85d","date":"2023-10-25T05:40:23.702Z","content":"Test todo","done":false}]}"#;
        let page = decode_page(body).unwrap();
        assert_eq!((page.total, page.pages), (1, 1));
        assert_eq!(page.todos[0].content, "Test todo");
        assert!(!page.todos[0].done);
    }

    #[test]
    fn rejects_loosely_typed_records() {
        let stringly_done = br#"{"total":1,"pages":1,"todos":[{"id":"f478cf94-9df9-4d56-acfb-0dd00246a85d","date":"2023-10-25T05:40:23.702Z","content":"x","done":"true"}]}"#;
        assert!(matches!(decode_page(stringly_done), Err(ClientError::Decode(_))));
        assert!(matches!(decode_page(br#"{"todos":[]}"#), Err(ClientError::Decode(_))));
        assert!(matches!(decode_page(b"null"), Err(ClientError::Decode(_))));
        assert!(matches!(decode_todo(br#"{"todo":null}"#), Err(ClientError::Decode(_))));
    }

    #[test]
    fn error_message_prefers_envelope() {
        let body = br#"{"error":{"message":"Method not allowed"}}"#;
        assert_eq!(error_message(StatusCode::METHOD_NOT_ALLOWED, body), "Method not allowed");
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, b"<html>"), "Bad Gateway");
    }

    #[test]
    fn trims_trailing_slash() {
        let api = TodoApi::new("http://localhost:3000/");
        assert_eq!(api.url("/x"), "http://localhost:3000/api/todos/x");
    }
}
