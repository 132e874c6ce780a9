use reqwest::{Client, Method, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::RequestContext;
use crate::error::ApiError;
use crate::models::{path_segment, Assignment, Collection, Resource, Role, User, UserStatus};

/// Sends one request and hands back the raw JSON body.
pub trait Transport {
    async fn send(&self, method: Method, path: &str, body: Option<Value>)
        -> Result<Value, ApiError>;
}

pub struct HttpTransport {
    client: Client,
    context: RequestContext,
}

impl HttpTransport {
    pub fn new(context: RequestContext) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(context.timeout())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
        Ok(Self { client, context })
    }
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let transport_error = |source| ApiError::Transport {
            path: path.to_string(),
            source,
        };

        debug!(%method, path, "sending request");
        let mut request = self.client.request(method, self.context.endpoint(path));
        if let Some(token) = self.context.access_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;
        parse_body(path, status, &text)
    }
}

/// Turns a raw response into JSON. An empty 2xx body (such as a 204 after a
/// delete) reads as a successful envelope with no data.
fn parse_body(path: &str, status: StatusCode, text: &str) -> Result<Value, ApiError> {
    if status.is_success() && text.trim().is_empty() {
        return Ok(json!({ "success": true, "data": null }));
    }
    match serde_json::from_str(text) {
        Ok(body) => Ok(body),
        Err(_) if !status.is_success() => {
            warn!(path, %status, "server returned a non-JSON error");
            Err(ApiError::Server(format!("request failed with status {status}")))
        }
        Err(source) => Err(ApiError::Decode {
            path: path.to_string(),
            source,
        }),
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Unpacks `{success, data, error, message}`. A failed envelope becomes the
/// server's `error`, then its `message`, then a generic fallback.
pub fn unwrap_envelope<T: DeserializeOwned>(path: &str, body: Value) -> Result<T, ApiError> {
    let decode = |source| ApiError::Decode {
        path: path.to_string(),
        source,
    };
    let envelope: Envelope = serde_json::from_value(body).map_err(decode)?;
    if !envelope.success {
        let message = envelope
            .error
            .filter(|text| !text.is_empty())
            .or(envelope.message.filter(|text| !text.is_empty()))
            .unwrap_or_else(|| "request failed".to_string());
        return Err(ApiError::Server(message));
    }
    serde_json::from_value(envelope.data.unwrap_or(Value::Null)).map_err(decode)
}

pub struct ApiClient<T> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<R, ApiError> {
        let response = self.transport.send(method, path, body).await?;
        unwrap_envelope(path, response)
    }

    fn to_body(path: &str, payload: &impl Serialize) -> Result<Value, ApiError> {
        serde_json::to_value(payload).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }

    pub async fn list<E: Collection>(&self) -> Result<Vec<E>, ApiError> {
        self.call(Method::GET, E::PATH, None).await
    }

    pub async fn create<E: Collection>(
        &self,
        path: &str,
        payload: &impl Serialize,
    ) -> Result<E, ApiError> {
        let body = Self::to_body(path, payload)?;
        self.call(Method::POST, path, Some(body)).await
    }

    pub async fn update<E: Collection>(
        &self,
        id: &str,
        payload: &impl Serialize,
    ) -> Result<E, ApiError> {
        let path = E::member_path(id);
        let body = Self::to_body(&path, payload)?;
        self.call(Method::PUT, &path, Some(body)).await
    }

    pub async fn delete<E: Collection>(&self, id: &str) -> Result<(), ApiError> {
        let path = E::member_path(id);
        let _: IgnoredAny = self.call(Method::DELETE, &path, None).await?;
        Ok(())
    }

    pub async fn section_resources(&self, section_id: &str) -> Result<Vec<Resource>, ApiError> {
        let path = format!("/api/sections/{}/resources", path_segment(section_id));
        self.call(Method::GET, &path, None).await
    }

    pub async fn league_assignments(&self, league_id: &str) -> Result<Vec<Assignment>, ApiError> {
        let path = format!("/api/assignments/league/{}", path_segment(league_id));
        self.call(Method::GET, &path, None).await
    }

    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        self.call(Method::GET, "/api/admin/users", None).await
    }

    pub async fn approve_user(&self, user_id: &str) -> Result<(), ApiError> {
        let body = json!({ "userId": user_id });
        let _: IgnoredAny = self
            .call(Method::POST, "/api/admin/approve-user", Some(body))
            .await?;
        Ok(())
    }

    pub async fn update_role(&self, user_id: &str, role: Role) -> Result<(), ApiError> {
        let body = json!({ "userId": user_id, "role": role });
        let _: IgnoredAny = self
            .call(Method::PUT, "/api/admin/update-role", Some(body))
            .await?;
        Ok(())
    }

    pub async fn update_status(&self, user_id: &str, status: UserStatus) -> Result<(), ApiError> {
        let body = json!({ "userId": user_id, "status": status });
        let _: IgnoredAny = self
            .call(Method::PUT, "/api/admin/update-status", Some(body))
            .await?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeTransport;
    use super::*;
    use crate::models::Cohort;

    #[test]
    fn failed_envelope_prefers_error_then_message() {
        let err = unwrap_envelope::<Value>(
            "/api/x",
            json!({"success": false, "error": "Name taken", "message": "ignored"}),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Name taken");

        let err = unwrap_envelope::<Value>(
            "/api/x",
            json!({"success": false, "error": "", "message": "Forbidden"}),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Forbidden");

        let err = unwrap_envelope::<Value>("/api/x", json!({"success": false})).unwrap_err();
        assert_eq!(err.to_string(), "request failed");
    }

    #[test]
    fn missing_success_flag_is_a_failure() {
        let err = unwrap_envelope::<Vec<Cohort>>("/api/cohorts", json!({"data": []})).unwrap_err();
        assert!(matches!(err, ApiError::Server(_)));
    }

    #[test]
    fn data_with_wrong_shape_is_a_decode_error() {
        let err = unwrap_envelope::<Vec<Cohort>>(
            "/api/cohorts",
            json!({"success": true, "data": {"id": 1}}),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[test]
    fn empty_success_body_reads_as_empty_envelope() {
        let body = parse_body("/api/cohorts/c-7", StatusCode::NO_CONTENT, "").unwrap();
        unwrap_envelope::<IgnoredAny>("/api/cohorts/c-7", body).unwrap();

        let err = parse_body("/api/cohorts/c-7", StatusCode::BAD_GATEWAY, "").unwrap_err();
        assert_eq!(err.to_string(), "request failed with status 502 Bad Gateway");

        let err = parse_body("/api/cohorts", StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn ids_are_encoded_into_nested_paths() {
        let client = ApiClient::new(FakeTransport::default().ok(json!([])).ok(json!([])));
        client.section_resources("s 1").await.unwrap();
        client.league_assignments("lg/2").await.unwrap();
        let paths: Vec<String> = client.transport().calls().into_iter().map(|c| c.path).collect();
        assert_eq!(
            paths,
            ["/api/sections/s%201/resources", "/api/assignments/league/lg%2F2"]
        );
    }

    #[tokio::test]
    async fn delete_targets_member_path() {
        let client = ApiClient::new(FakeTransport::default().ok(json!({"deleted": true})));
        client.delete::<Cohort>("c-7").await.unwrap();
        let calls = client.transport().calls();
        assert_eq!(calls[0].method, Method::DELETE);
        assert_eq!(calls[0].path, "/api/cohorts/c-7");
        assert_eq!(calls[0].body, None);
    }

    #[tokio::test]
    async fn role_updates_send_wire_names() {
        let client = ApiClient::new(FakeTransport::default().ok(Value::Null));
        client.update_role("u-1", Role::ChiefPathfinder).await.unwrap();
        let calls = client.transport().calls();
        assert_eq!(calls[0].path, "/api/admin/update-role");
        assert_eq!(
            calls[0].body,
            Some(json!({"userId": "u-1", "role": "CHIEF_PATHFINDER"}))
        );
    }
}
