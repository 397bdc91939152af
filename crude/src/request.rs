//! Router-independent request input
//!
//! Dispatcher operations take a [`CrudRequest`], an already parsed view of
//! an HTTP request. The route binder builds it from axum requests; tests and
//! other integrations can build it directly.
//!
//! # Example
//!
//! ```rust
//! use crude::request::CrudRequest;
//! use serde_json::json;
//!
//! let request = CrudRequest::new("/posts/abc")
//!     .with_id("abc")
//!     .with_query("b", "2")
//!     .with_identity("userId", json!("u1"))
//!     .json();
//!
//! assert_eq!(request.id.as_deref(), Some("abc"));
//! assert!(request.wants_json);
//! ```

use std::collections::BTreeMap;

use serde_json::Value;

use crate::schema::Record;

/// Request identity inserted into request extensions by authentication
/// middleware; used for owner scoping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Identity(pub Record);

/// The parts of the request URL needed to build absolute links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUrl {
    /// `http` or `https`
    pub scheme: String,
    /// Host name without port
    pub host: String,
    /// Explicit port, if any
    pub port: Option<u16>,
    /// Request path without query string
    pub path: String,
}

impl Default for RequestUrl {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: None,
            path: "/".to_string(),
        }
    }
}

impl RequestUrl {
    /// `scheme://host[:port]`, omitting default ports
    #[must_use]
    pub fn origin(&self) -> String {
        match self.port {
            Some(port) if port != 80 && port != 443 => {
                format!("{}://{}:{}", self.scheme, self.host, port)
            }
            _ => format!("{}://{}", self.scheme, self.host),
        }
    }

    /// Split a `Host` header value into host and port
    #[must_use]
    pub fn parse_host(host_header: &str) -> (String, Option<u16>) {
        match host_header.rsplit_once(':') {
            Some((host, port)) => match port.parse::<u16>() {
                Ok(port) => (host.to_string(), Some(port)),
                Err(_) => (host_header.to_string(), None),
            },
            None => (host_header.to_string(), None),
        }
    }
}

/// A parsed CRUD request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrudRequest {
    /// The `:id` path parameter
    pub id: Option<String>,
    /// Query string parameters
    pub query: BTreeMap<String, String>,
    /// Request body
    pub body: Record,
    /// Identity of the caller, looked up by `own_user_request_property`
    pub identity: Record,
    /// Absolute URL parts
    pub url: RequestUrl,
    /// `Referer` header, where view mode redirects to after an error
    pub referer: Option<String>,
    /// Whether the client negotiated a JSON response
    pub wants_json: bool,
}

impl CrudRequest {
    /// Create a request for the given path
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            url: RequestUrl {
                path: path.into(),
                ..RequestUrl::default()
            },
            ..Self::default()
        }
    }

    /// Set the `:id` path parameter
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a query string parameter
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set the body
    #[must_use]
    pub fn with_body(mut self, body: Record) -> Self {
        self.body = body;
        self
    }

    /// Add an identity property
    #[must_use]
    pub fn with_identity(mut self, key: impl Into<String>, value: Value) -> Self {
        self.identity.insert(key.into(), value);
        self
    }

    /// Set the URL parts
    #[must_use]
    pub fn with_url(mut self, url: RequestUrl) -> Self {
        self.url = url;
        self
    }

    /// Set the `Referer`
    #[must_use]
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Ask for a JSON response
    #[must_use]
    pub fn json(mut self) -> Self {
        self.wants_json = true;
        self
    }
}

/// Whether an `Accept` header prefers JSON over HTML
///
/// Media ranges are considered in order; the first JSON or HTML type wins.
/// Wildcards and missing headers prefer HTML.
#[must_use]
pub fn prefers_json(accept: Option<&str>) -> bool {
    let Some(accept) = accept else {
        return false;
    };
    for range in accept.split(',') {
        let media = range.split(';').next().unwrap_or("").trim();
        if media.ends_with("/json") || media.ends_with("+json") {
            return true;
        }
        if media == "text/html" || media == "application/xhtml+xml" {
            return false;
        }
    }
    false
}
