//! Transport abstraction for the Backupchan HTTP API
//!
//! The facade only ever talks to a `Connection`, which enables swapping the
//! real HTTP client for a recording mock in tests.

use crate::api::error::TransportError;
use reqwest::blocking::multipart::{Form, Part};
use serde_json::Value;
use std::fmt;
use std::io::Read;
use std::time::Duration;
use tracing::debug;

/// HTTP methods used by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Raw response: decoded JSON body plus HTTP status
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub payload: Value,
    pub status: u16,
}

impl Response {
    pub fn new(payload: Value, status: u16) -> Self {
        Self { payload, status }
    }
}

/// File attached to a multipart request
pub struct FilePart {
    /// Form field name
    pub field: String,
    pub filename: String,
    pub reader: Box<dyn Read + Send>,
    /// Content length, when known up front
    pub length: Option<u64>,
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("field", &self.field)
            .field("filename", &self.filename)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// Abstraction over the authenticated transport, enabling mocking in tests
pub trait Connection: Send + Sync {
    /// Send a request with an optional JSON body
    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, TransportError>;

    /// POST a multipart form made of text fields and one file
    fn post_multipart(
        &self,
        path: &str,
        fields: &[(&str, String)],
        file: FilePart,
    ) -> Result<Response, TransportError>;
}

/// Blocking HTTP implementation backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpConnection {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl HttpConnection {
    /// Create a connection to `host:port`
    ///
    /// `host` may carry a scheme (`https://backups.lan`); plain HTTP is assumed
    /// otherwise. With no timeout, requests block until the server answers.
    pub fn new(
        host: &str,
        port: u16,
        api_key: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("backupchan-client/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: build_base_url(host, port),
            api_key: api_key.to_string(),
        })
    }

    /// Base URL every request path is resolved against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn read_response(response: reqwest::blocking::Response) -> Result<Response, TransportError> {
        let status = response.status().as_u16();
        let text = response.text()?;

        let payload = match serde_json::from_str(&text) {
            Ok(payload) => payload,
            Err(e) => {
                debug!("Response body (status {}) is not JSON: {}", status, e);
                Value::Null
            }
        };

        Ok(Response { payload, status })
    }
}

impl Connection for HttpConnection {
    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, TransportError> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut builder = self
            .client
            .request(method.into(), &url)
            .bearer_auth(&self.api_key);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        Self::read_response(builder.send()?)
    }

    fn post_multipart(
        &self,
        path: &str,
        fields: &[(&str, String)],
        file: FilePart,
    ) -> Result<Response, TransportError> {
        let url = self.url(path);
        debug!("POST {} (multipart, file '{}')", url, file.filename);

        let mut form = Form::new();
        for (name, value) in fields {
            form = form.text(name.to_string(), value.clone());
        }

        let part = match file.length {
            Some(length) => Part::reader_with_length(file.reader, length),
            None => Part::reader(file.reader),
        };
        form = form.part(file.field, part.file_name(file.filename));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()?;

        Self::read_response(response)
    }
}

/// Build `<scheme>://<host>:<port>/api`
fn build_base_url(host: &str, port: u16) -> String {
    let host = host.trim_end_matches('/');
    if host.contains("://") {
        format!("{}:{}/api", host, port)
    } else {
        format!("http://{}:{}/api", host, port)
    }
}

/// A mock connection for testing that records calls and returns configured responses
/// Available for use in external test crates
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Recorded request
    #[derive(Clone, Debug, PartialEq)]
    pub struct ConnectionCall {
        pub method: Method,
        pub path: String,
        pub body: Option<Value>,
        /// Multipart text fields (uploads only)
        pub fields: Vec<(String, String)>,
        /// Uploaded file name and its full contents (uploads only)
        pub file: Option<(String, Vec<u8>)>,
    }

    /// Mock connection for testing
    #[derive(Clone)]
    pub struct MockConnection {
        /// Recorded calls
        pub calls: Arc<Mutex<Vec<ConnectionCall>>>,
        /// Pre-configured responses: (method, path) -> response
        responses: Arc<Mutex<HashMap<(Method, String), Response>>>,
        /// Response when nothing specific is configured
        default_response: Arc<Mutex<Response>>,
        /// Fail every call at the transport level
        fail_transport: Arc<Mutex<bool>>,
    }

    impl Default for MockConnection {
        fn default() -> Self {
            Self {
                calls: Arc::default(),
                responses: Arc::default(),
                default_response: Arc::new(Mutex::new(Response::new(
                    json!({"success": true}),
                    200,
                ))),
                fail_transport: Arc::default(),
            }
        }
    }

    impl MockConnection {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure the response for a method and path
        pub fn expect(self, method: Method, path: &str, response: Response) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert((method, path.to_string()), response);
            self
        }

        /// Set the default response for unconfigured requests
        pub fn with_default_response(self, response: Response) -> Self {
            *self.default_response.lock().unwrap() = response;
            self
        }

        /// Make every call fail before reaching the "server"
        pub fn with_transport_failure(self) -> Self {
            *self.fail_transport.lock().unwrap() = true;
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<ConnectionCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// Number of multipart uploads performed
        pub fn upload_count(&self) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.file.is_some())
                .count()
        }

        /// Check if a method/path pair was requested
        pub fn was_called(&self, method: Method, path: &str) -> bool {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .any(|c| c.method == method && c.path == path)
        }

        fn respond(&self, method: Method, path: &str) -> Result<Response, TransportError> {
            if *self.fail_transport.lock().unwrap() {
                return Err(TransportError::Client("connection refused".to_string()));
            }

            Ok(self
                .responses
                .lock()
                .unwrap()
                .get(&(method, path.to_string()))
                .cloned()
                .unwrap_or_else(|| self.default_response.lock().unwrap().clone()))
        }
    }

    impl Connection for MockConnection {
        fn request(
            &self,
            method: Method,
            path: &str,
            body: Option<&Value>,
        ) -> Result<Response, TransportError> {
            self.calls.lock().unwrap().push(ConnectionCall {
                method,
                path: path.to_string(),
                body: body.cloned(),
                fields: Vec::new(),
                file: None,
            });
            self.respond(method, path)
        }

        fn post_multipart(
            &self,
            path: &str,
            fields: &[(&str, String)],
            mut file: FilePart,
        ) -> Result<Response, TransportError> {
            let mut contents = Vec::new();
            file.reader
                .read_to_end(&mut contents)
                .map_err(|e| TransportError::Client(e.to_string()))?;

            self.calls.lock().unwrap().push(ConnectionCall {
                method: Method::Post,
                path: path.to_string(),
                body: None,
                fields: fields
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.clone()))
                    .collect(),
                file: Some((file.filename, contents)),
            });
            self.respond(Method::Post, path)
        }
    }
}
