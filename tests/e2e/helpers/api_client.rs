use anyhow::Result;
use http_body_util::{BodyExt, Full};
use hyper::{body::Bytes, Method, Request, Response, StatusCode};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Request body encodings the API accepts
enum Body {
    Empty,
    Json(Vec<u8>),
    Form(String),
    Raw(Vec<u8>),
}

#[derive(Clone)]
pub struct TestClient {
    base_url: String,
    client: Client<hyper_util::client::legacy::connect::HttpConnector, Full<Bytes>>,
}

impl TestClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self {
            base_url: base_url.to_string(),
            client,
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.request(Method::GET, path, Body::Empty, None, &[]).await
    }

    pub async fn get_with_session(&self, path: &str, cookie: &str) -> Result<ApiResponse> {
        self.request(Method::GET, path, Body::Empty, Some(cookie), &[])
            .await
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.request(Method::POST, path, json_body(body)?, None, &[])
            .await
    }

    pub async fn post_with_session<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        cookie: &str,
    ) -> Result<ApiResponse> {
        self.request(Method::POST, path, json_body(body)?, Some(cookie), &[])
            .await
    }

    /// POST an `application/x-www-form-urlencoded` body
    pub async fn post_form_with_session(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        cookie: &str,
    ) -> Result<ApiResponse> {
        let encoded = fields
            .iter()
            .map(|(k, v)| format!("{}={}", form_encode(k), form_encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        self.request(Method::POST, path, Body::Form(encoded), Some(cookie), &[])
            .await
    }

    /// POST raw bytes with extra headers (webhooks)
    pub async fn post_raw(
        &self,
        path: &str,
        body: &[u8],
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        self.request(Method::POST, path, Body::Raw(body.to_vec()), None, headers)
            .await
    }

    pub async fn patch_with_session<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        cookie: &str,
    ) -> Result<ApiResponse> {
        self.request(Method::PATCH, path, json_body(body)?, Some(cookie), &[])
            .await
    }

    pub async fn delete_with_session(&self, path: &str, cookie: &str) -> Result<ApiResponse> {
        self.request(Method::DELETE, path, Body::Empty, Some(cookie), &[])
            .await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Body,
        cookie: Option<&str>,
        headers: &[(&str, &str)],
    ) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut req_builder = Request::builder().method(method).uri(&url);

        if let Some(cookie) = cookie {
            req_builder = req_builder.header("Cookie", cookie);
        }
        for (name, value) in headers {
            req_builder = req_builder.header(*name, *value);
        }

        let body_bytes = match body {
            Body::Empty => Full::new(Bytes::new()),
            Body::Json(bytes) => {
                req_builder = req_builder.header("Content-Type", "application/json");
                Full::new(Bytes::from(bytes))
            }
            Body::Form(encoded) => {
                req_builder =
                    req_builder.header("Content-Type", "application/x-www-form-urlencoded");
                Full::new(Bytes::from(encoded))
            }
            Body::Raw(bytes) => Full::new(Bytes::from(bytes)),
        };

        let request = req_builder.body(body_bytes)?;
        let response = self.client.request(request).await?;

        ApiResponse::from_response(response).await
    }
}

fn json_body<T: Serialize>(body: &T) -> Result<Body> {
    Ok(Body::Json(serde_json::to_vec(body)?))
}

fn form_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
    pub body_bytes: Vec<u8>,
    pub headers: HashMap<String, String>,
}

impl ApiResponse {
    async fn from_response(response: Response<hyper::body::Incoming>) -> Result<Self> {
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();

        let body_bytes = response.into_body().collect().await?.to_bytes().to_vec();

        let body = if !body_bytes.is_empty() {
            serde_json::from_slice(&body_bytes).ok()
        } else {
            None
        };

        Ok(Self {
            status,
            body,
            body_bytes,
            headers,
        })
    }

    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {} but got {}. Body: {:?}",
            expected, self.status, self.text()
        );
        self
    }

    /// Assert that the error response contains the expected message
    pub fn assert_error_message(&self, expected_message: &str) -> &Self {
        let message = self
            .body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(|m| m.as_str())
            .expect("Missing message field in error response");

        assert!(
            message.contains(expected_message),
            "Expected error message to contain '{}', but got '{}'",
            expected_message,
            message
        );
        self
    }

    #[allow(dead_code)]
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body_bytes)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body_bytes).to_string()
    }

    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers.get(name)
    }

    #[allow(dead_code)]
    pub fn assert_header(&self, name: &str, value: &str) -> &Self {
        let actual = self
            .headers
            .get(name)
            .unwrap_or_else(|| panic!("Header '{}' not found", name));
        assert_eq!(actual, value, "Header '{}' value mismatch", name);
        self
    }

    pub fn assert_header_exists(&self, name: &str) -> &Self {
        assert!(
            self.headers.contains_key(name),
            "Header '{}' not found",
            name
        );
        self
    }
}
