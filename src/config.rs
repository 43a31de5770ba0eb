//! endpoint configuration
//!
//! build a [`ClientConfig`] with the graphql endpoint, an optional bearer
//! token, and optional overrides. pass it to [`crate::IntrospectionClient::new`].

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use url::Url;

/// configuration for the introspection client
#[derive(Clone)]
pub struct ClientConfig {
    /// original endpoint input
    pub(crate) raw_endpoint: String,

    /// graphql endpoint (e.g., "<http://localhost:5000/graphql>"), `None` if unparsable
    pub(crate) endpoint: Option<Url>,

    /// bearer token sent as `Authorization`
    pub(crate) token: Option<String>,

    pub(crate) timeout: Duration,

    pub(crate) user_agent: String,

    /// additional headers to send with every request
    pub(crate) extra_headers: HeaderMap,
}

impl ClientConfig {
    /// create a configuration for a graphql endpoint
    ///
    /// ```
    /// use graphile_codegen::ClientConfig;
    ///
    /// let config = ClientConfig::new("http://localhost:5000/graphql").with_token("secret");
    /// ```
    pub fn new(endpoint: impl AsRef<str>) -> Self {
        let raw = endpoint.as_ref();
        let endpoint = Url::parse(raw)
            .or_else(|_| Url::parse(&format!("http://{raw}")))
            .ok();

        Self {
            raw_endpoint: raw.to_string(),
            endpoint,
            token: None,
            timeout: Duration::from_secs(30),
            user_agent: format!("graphile-codegen/{} (Rust)", env!("CARGO_PKG_VERSION")),
            extra_headers: HeaderMap::new(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// set the request timeout
    ///
    /// default: 30 seconds
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// add a header to every request
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.extra_headers.insert(name, value);
        self
    }

    /// add a set of headers to every request
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.extra_headers.extend(headers);
        self
    }

    /// add headers given as text, as read from a config file
    pub fn with_header_pairs<'h>(
        mut self,
        pairs: impl IntoIterator<Item = (&'h String, &'h String)>,
    ) -> Result<Self> {
        for (name, value) in pairs {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| Error::Config(format!("invalid header name {name}: {err}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| Error::Config(format!("invalid value for header {name}: {err}")))?;
            self.extra_headers.insert(name, value);
        }
        Ok(self)
    }

    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    pub fn extra_headers(&self) -> &HeaderMap {
        &self.extra_headers
    }

    /// validate the configuration, returning the endpoint to post to
    pub(crate) fn validate(&self) -> Result<Url> {
        let Some(endpoint) = self.endpoint.clone() else {
            return Err(Error::Config(format!(
                "invalid endpoint: {}",
                self.raw_endpoint
            )));
        };

        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(Error::Config(format!(
                "invalid url scheme: {}. must be http or https",
                endpoint.scheme()
            )));
        }

        if self.token.as_deref() == Some("") {
            return Err(Error::Config("token cannot be empty when set".to_string()));
        }

        Ok(endpoint)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("extra_headers", &self.extra_headers.len())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
