use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

use super::{AuthClient, DataService, IdentityService, Query, ServiceError};
use crate::types::{Identity, Session};

const REST_PREFIX: &str = "/rest/v1";
const FUNCTIONS_PREFIX: &str = "/functions/v1";
const MAX_ERROR_BODY: usize = 200;

type SessionSink = Arc<dyn Fn(&Session) -> Result<()> + Send + Sync>;

/// Client for the hosted data service (REST query API + remote functions).
///
/// Access tokens are short-lived. A request rejected with 401 trades the
/// refresh token for a new session once and is then retried.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    auth: AuthClient,
    base_url: Url,
    anon_key: String,
    session: Arc<RwLock<Option<Session>>>,
    refresh_lock: Arc<Mutex<()>>,
    on_refresh: Option<SessionSink>,
}

impl RestClient {
    pub fn new(base_url: &str, anon_key: &str, session: Option<Session>) -> Result<Self> {
        let auth = AuthClient::new(base_url, anon_key)?;
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            auth,
            base_url,
            anon_key: anon_key.to_string(),
            session: Arc::new(RwLock::new(session)),
            refresh_lock: Arc::new(Mutex::new(())),
            on_refresh: None,
        })
    }

    /// Called with every refreshed session, e.g. to write it back to disk.
    pub fn on_session_refreshed<F>(mut self, sink: F) -> Self
    where
        F: Fn(&Session) -> Result<()> + Send + Sync + 'static,
    {
        self.on_refresh = Some(Arc::new(sink));
        self
    }

    fn current_session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn access_token(&self) -> Option<String> {
        self.current_session().map(|s| s.access_token)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(path)
            .map_err(|e| ServiceError::transport(path, e))
    }

    fn table(&self, collection: &str) -> Result<Url, ServiceError> {
        self.endpoint(&format!("{}/{}", REST_PREFIX, collection))
    }

    /// Attach the public key and the user's bearer token.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.access_token().unwrap_or_else(|| self.anon_key.clone());
        request.header("apikey", &self.anon_key).bearer_auth(token)
    }

    /// Send an authorized request. On 401 the session is refreshed and the
    /// request rebuilt and sent once more.
    async fn execute<F>(&self, operation: &str, build: F) -> Result<Response, ServiceError>
    where
        F: Fn() -> Result<RequestBuilder, ServiceError>,
    {
        let stale = self.access_token();
        let result = send(self.authorize(build()?), operation).await;
        if !matches!(result, Err(ServiceError::Unauthorized)) {
            return result;
        }
        if !self.refresh_after(stale.as_deref()).await? {
            return result;
        }
        send(self.authorize(build()?), operation).await
    }

    /// Replace the session whose access token was `stale`. Returns whether a
    /// newer session is now in place.
    async fn refresh_after(&self, stale: Option<&str>) -> Result<bool, ServiceError> {
        let _guard = self.refresh_lock.lock().await;
        let Some(session) = self.current_session() else {
            return Ok(false);
        };
        // Another request already refreshed while we waited for the lock.
        if Some(session.access_token.as_str()) != stale {
            return Ok(true);
        }
        if session.refresh_token.is_none() {
            return Ok(false);
        }

        let fresh = match self.auth.refresh(&session).await {
            Ok(fresh) => fresh,
            Err(e @ (ServiceError::Unauthorized | ServiceError::Rejected { .. })) => {
                tracing::warn!("session refresh refused: {}", e);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        tracing::info!(user_id = %fresh.user.id, "session refreshed");

        if let Some(sink) = &self.on_refresh {
            if let Err(e) = sink(&fresh) {
                tracing::warn!("failed to persist refreshed session: {:#}", e);
            }
        }
        *self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(fresh);
        Ok(true)
    }
}

pub(super) fn parse_base_url(base_url: &str) -> Result<Url> {
    Url::parse(base_url.trim_end_matches('/'))
        .with_context(|| format!("Invalid API URL: {}", base_url))
}

/// Send a request and map non-success statuses onto `ServiceError`.
pub(super) async fn send(request: RequestBuilder, operation: &str) -> Result<Response, ServiceError> {
    let response = request
        .send()
        .await
        .map_err(|e| ServiceError::transport(operation, e))?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ServiceError::Unauthorized);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ServiceError::Rejected {
            operation: operation.to_string(),
            status: status.as_u16(),
            message: truncate(body.trim(), MAX_ERROR_BODY),
        });
    }

    Ok(response)
}

pub(super) async fn read_json<T: serde::de::DeserializeOwned>(
    response: Response,
    operation: &str,
) -> Result<T, ServiceError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ServiceError::decode(format!("{} response", operation), e))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}…", head)
    }
}

fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![(
        "select".to_string(),
        query.columns.clone().unwrap_or_else(|| "*".to_string()),
    )];
    for (field, value) in &query.filters {
        params.push((field.clone(), format!("eq.{}", value)));
    }
    if let Some(order) = &query.order {
        let suffix = if order.nulls_last { ".nullslast" } else { "" };
        params.push(("order".to_string(), format!("{}.asc{}", order.field, suffix)));
    }
    params
}

#[async_trait]
impl DataService for RestClient {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, ServiceError> {
        let operation = format!("GET {}", query.collection);
        let params = query_params(query);
        let response = self
            .execute(&operation, || {
                Ok(self.client.get(self.table(&query.collection)?).query(&params))
            })
            .await?;
        read_json(response, &operation).await
    }

    async fn insert(&self, collection: &str, record: Value) -> Result<Value, ServiceError> {
        let operation = format!("POST {}", collection);
        let response = self
            .execute(&operation, || {
                Ok(self
                    .client
                    .post(self.table(collection)?)
                    .header("Prefer", "return=representation")
                    .json(&record))
            })
            .await?;
        let mut rows: Vec<Value> = read_json(response, &operation).await?;
        if rows.is_empty() {
            return Err(ServiceError::decode(
                format!("{} response", operation),
                "no row returned",
            ));
        }
        Ok(rows.swap_remove(0))
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), ServiceError> {
        let operation = format!("PATCH {}", collection);
        self.execute(&operation, || {
            Ok(self
                .client
                .patch(self.table(collection)?)
                .query(&[("id", format!("eq.{}", id))])
                .json(&patch))
        })
        .await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), ServiceError> {
        let operation = format!("DELETE {}", collection);
        self.execute(&operation, || {
            Ok(self
                .client
                .delete(self.table(collection)?)
                .query(&[("id", format!("eq.{}", id))]))
        })
        .await?;
        Ok(())
    }

    async fn invoke(&self, function: &str, body: Value) -> Result<Value, ServiceError> {
        let operation = format!("POST function {}", function);
        let url = self.endpoint(&format!("{}/{}", FUNCTIONS_PREFIX, function))?;
        let response = self
            .execute(&operation, || Ok(self.client.post(url.clone()).json(&body)))
            .await?;
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::transport(&operation, e))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ServiceError::decode(&operation, e))
    }
}

#[async_trait]
impl IdentityService for RestClient {
    async fn current_user(&self) -> Result<Option<Identity>, ServiceError> {
        if self.current_session().is_none() {
            return Ok(None);
        }

        let request = self.authorize(self.client.get(self.endpoint("/auth/v1/user")?));
        match send(request, "GET /auth/v1/user").await {
            Ok(response) => read_json(response, "GET /auth/v1/user").await.map(Some),
            Err(ServiceError::Unauthorized) => Ok(None),
            Err(ServiceError::Rejected { status: 403, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn refresh_session(&self) -> Result<Option<Session>, ServiceError> {
        let stale = self.access_token();
        if self.refresh_after(stale.as_deref()).await? {
            Ok(self.current_session())
        } else {
            Ok(None)
        }
    }

    fn session(&self) -> Option<Session> {
        self.current_session()
    }
}
