//! introspection client
//!
//! posts the standard introspection query to a graphql endpoint and turns the
//! answer into a [`TypeRegistry`].

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::graphql::GraphQlResponse;
use crate::introspection::INTROSPECTION_QUERY;
use crate::registry::TypeRegistry;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// graphql client used to introspect a live schema
#[derive(Clone)]
pub struct IntrospectionClient {
    config: Arc<ClientConfig>,
    endpoint: Url,
    http: reqwest::Client,
}

impl IntrospectionClient {
    /// create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        let endpoint = config.validate()?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|err| Error::Config(format!("invalid token header value: {err}")))?,
            );
        }
        headers.extend(config.extra_headers.clone());

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            endpoint,
            http,
        })
    }

    /// access the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// execute a raw graphql query
    pub async fn execute_raw(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
    ) -> Result<GraphQlResponse<serde_json::Value>> {
        self.execute_raw_with(query, variables, |url, body| self.post(url, body))
            .await
    }

    /// `data` of the introspection query
    pub async fn introspect(&self) -> Result<serde_json::Value> {
        self.introspect_with(|url, body| self.post(url, body)).await
    }

    /// introspect the endpoint into a type registry
    pub async fn fetch_registry(&self) -> Result<TypeRegistry> {
        let data = self.introspect().await?;
        let registry = TypeRegistry::from_introspection(data)?;
        debug!(types = registry.len(), "introspected schema");
        Ok(registry)
    }

    async fn post(&self, url: Url, body: serde_json::Value) -> Result<(StatusCode, String)> {
        let response = self.http.post(url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}

fn parse_graphql_response<T: DeserializeOwned>(
    status: StatusCode,
    text: String,
) -> Result<GraphQlResponse<T>> {
    if !status.is_success() {
        let message = serde_json::from_str::<GraphQlResponse<serde_json::Value>>(&text)
            .ok()
            .and_then(|parsed| parsed.error_summary())
            .unwrap_or_else(|| format!("graphql http error: {status}"));
        return Err(Error::GraphQl {
            status: Some(status.as_u16()),
            errors: Vec::new(),
            body: text,
            message,
        });
    }

    let parsed: GraphQlResponse<T> = serde_json::from_str(&text)?;
    if let Some(message) = parsed.error_summary() {
        return Err(Error::GraphQl {
            status: Some(status.as_u16()),
            errors: parsed.errors,
            body: text,
            message,
        });
    }

    Ok(parsed)
}

impl IntrospectionClient {
    pub(crate) async fn execute_raw_with<F, Fut>(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
        send: F,
    ) -> Result<GraphQlResponse<serde_json::Value>>
    where
        F: FnOnce(Url, serde_json::Value) -> Fut,
        Fut: Future<Output = Result<(StatusCode, String)>>,
    {
        let body = serde_json::json!({
            "query": query,
            "variables": variables.unwrap_or_else(|| serde_json::json!({})),
        });

        debug!(endpoint = %self.endpoint, "posting graphql request");
        let (status, text) = send(self.endpoint.clone(), body).await?;
        parse_graphql_response(status, text)
    }

    pub(crate) async fn introspect_with<F, Fut>(&self, send: F) -> Result<serde_json::Value>
    where
        F: FnOnce(Url, serde_json::Value) -> Fut,
        Fut: Future<Output = Result<(StatusCode, String)>>,
    {
        let response = self
            .execute_raw_with(INTROSPECTION_QUERY, None, send)
            .await?;
        response.data.ok_or_else(|| Error::GraphQl {
            status: None,
            errors: Vec::new(),
            body: String::new(),
            message: "introspection returned no data".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeIndex;
    use crate::schema::TypeKind;

    fn test_client(config: ClientConfig) -> IntrospectionClient {
        let endpoint = config.validate().unwrap();
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("test http client");
        IntrospectionClient {
            config: Arc::new(config),
            endpoint,
            http,
        }
    }

    const SCHEMA_RESPONSE: &str = r#"{"data": {"__schema": {
        "queryType": {"name": "Query"},
        "mutationType": null,
        "types": [
            {"kind": "OBJECT", "name": "Query", "fields": [
                {"name": "users", "args": [], "type": {"kind": "OBJECT", "name": "UsersConnection", "ofType": null}}
            ]},
            {"kind": "INPUT_OBJECT", "name": "UserInput", "inputFields": [
                {"name": "email", "type": {"kind": "NON_NULL", "name": null, "ofType": {"kind": "SCALAR", "name": "String", "ofType": null}}}
            ]}
        ]
    }}}"#;

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_execute_raw_posts_to_endpoint() {
        let client = test_client(ClientConfig::new("http://localhost:5000/graphql"));
        let response = client
            .execute_raw_with("query { ok }", None, |url, body| async move {
                assert_eq!(url.path(), "/graphql");
                assert_eq!(body["query"], "query { ok }");
                assert_eq!(body["variables"], serde_json::json!({}));
                Ok((StatusCode::OK, "{\"data\": {\"ok\": true}}".to_string()))
            })
            .await
            .unwrap();

        assert_eq!(response.data.unwrap()["ok"], true);
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_introspect_sends_introspection_query() {
        let client = test_client(ClientConfig::new("http://localhost:5000/graphql"));
        let data = client
            .introspect_with(|_url, body| async move {
                assert!(body["query"].as_str().unwrap().contains("__schema"));
                Ok((StatusCode::OK, SCHEMA_RESPONSE.to_string()))
            })
            .await
            .unwrap();

        let registry = TypeRegistry::from_introspection(data).unwrap();
        assert_eq!(registry.query_type(), Some("Query"));
        assert_eq!(registry.kind_of("UserInput"), Some(TypeKind::InputObject));
        assert!(registry.input_field_type("UserInput", "email").is_some());
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_introspection_disabled() {
        let client = test_client(ClientConfig::new("http://localhost:5000/graphql"));
        let err = client
            .introspect_with(|_url, _body| async move {
                Ok((
                    StatusCode::OK,
                    "{\"data\": null, \"errors\": [{\"message\": \"introspection is disabled\"}]}"
                        .to_string(),
                ))
            })
            .await
            .unwrap_err();

        assert!(err.to_string().contains("introspection is disabled"));
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_introspect_without_data() {
        let client = test_client(ClientConfig::new("http://localhost:5000/graphql"));
        let err = client
            .introspect_with(|_url, _body| async move {
                Ok((StatusCode::OK, "{\"data\": null}".to_string()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::GraphQl { status: None, .. }));
    }

    #[test]
    fn test_invalid_token_header() {
        let config = ClientConfig::new("http://localhost:5000/graphql").with_token("bad\ntoken");
        let err = IntrospectionClient::new(config).err().expect("expected error");
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_parse_graphql_response_http_error() {
        let err = parse_graphql_response::<serde_json::Value>(
            StatusCode::UNAUTHORIZED,
            "{\"errors\": [{\"message\": \"jwt expired\"}]}".to_string(),
        )
        .unwrap_err();
        assert!(err.is_auth_error());
        assert!(err.to_string().contains("jwt expired"));

        let err =
            parse_graphql_response::<serde_json::Value>(StatusCode::BAD_GATEWAY, "<html>".into())
                .unwrap_err();
        assert!(matches!(
            err,
            Error::GraphQl {
                status: Some(502),
                ..
            }
        ));
    }

    #[test]
    fn test_parse_graphql_response_success() {
        let parsed = parse_graphql_response::<serde_json::Value>(
            StatusCode::OK,
            "{\"data\": {\"value\": 9}}".to_string(),
        )
        .unwrap();
        assert_eq!(parsed.data.unwrap()["value"], 9);
    }
}
