use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    dao::models::ScoreReport,
    state::catalog::{CatalogResponse, ScoringCatalog},
};

use super::{
    DeliveryOutcome, ScoreSender,
    config::CentralConfig,
    error::{CentralError, CentralResult, DeliveryFailure},
};

const ADD_SCORES_PATH: &str = "api/addScores";
const CATALOG_PATH: &str = "api/gameModesAndScoringElements";
const LIFECHECK_PATH: &str = "lifecheck";

/// HTTP client for the central scoring server.
#[derive(Clone)]
pub struct SubmissionClient {
    client: Client,
    base_url: Arc<str>,
}

/// Body of `POST /api/addScores`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionPayload {
    event_code: String,
    match_number: u32,
    team_number: u32,
    scores: Vec<ScorePayload>,
}

#[derive(Debug, Serialize)]
struct ScorePayload {
    scoring_item_id: u32,
    mode_id: u32,
    value: u32,
}

impl From<&ScoreReport> for SubmissionPayload {
    fn from(report: &ScoreReport) -> Self {
        Self {
            event_code: report.event_id.clone(),
            match_number: report.match_number,
            team_number: report.team_number,
            scores: report
                .records
                .iter()
                .map(|record| ScorePayload {
                    scoring_item_id: record.item_id.0,
                    mode_id: record.mode_id.0,
                    value: record.value,
                })
                .collect(),
        }
    }
}

/// Error body produced by the server (`{"detail": "..."}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl SubmissionClient {
    /// Build a client; no request is made until a method is called.
    pub fn new(config: CentralConfig) -> CentralResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| CentralError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Download the modes and scoring items for the configured scoring page.
    pub async fn fetch_catalog(&self) -> CentralResult<ScoringCatalog> {
        let response = self
            .client
            .get(self.url(CATALOG_PATH))
            .send()
            .await
            .map_err(|source| CentralError::RequestSend {
                path: CATALOG_PATH.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CentralError::RequestStatus {
                path: CATALOG_PATH.to_string(),
                status: response.status(),
            });
        }

        let payload = response
            .json::<CatalogResponse>()
            .await
            .map_err(|source| CentralError::DecodeResponse {
                path: CATALOG_PATH.to_string(),
                source,
            })?;

        Ok(ScoringCatalog::try_from(payload)?)
    }

    /// Check that the server answers at all.
    pub async fn lifecheck(&self) -> CentralResult<()> {
        let response = self
            .client
            .get(self.url(LIFECHECK_PATH))
            .send()
            .await
            .map_err(|source| CentralError::RequestSend {
                path: LIFECHECK_PATH.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CentralError::RequestStatus {
                path: LIFECHECK_PATH.to_string(),
                status: response.status(),
            })
        }
    }

    async fn post_scores(&self, payload: SubmissionPayload) -> DeliveryOutcome {
        let response = match self
            .client
            .post(self.url(ADD_SCORES_PATH))
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return DeliveryOutcome::Failed(classify_transport(&err)),
        };

        debug!(
            status = %response.status(),
            match_number = payload.match_number,
            team_number = payload.team_number,
            "score submission answered"
        );

        if response.status().is_success() {
            classify_success(response).await
        } else {
            DeliveryOutcome::Failed(classify_status(response).await)
        }
    }
}

impl ScoreSender for SubmissionClient {
    fn attempt_send(&self, report: &ScoreReport) -> BoxFuture<'static, DeliveryOutcome> {
        let client = self.clone();
        let payload = SubmissionPayload::from(report);
        Box::pin(async move { client.post_scores(payload).await })
    }

    fn health_check(&self) -> BoxFuture<'static, bool> {
        let client = self.clone();
        Box::pin(async move {
            match client.lifecheck().await {
                Ok(()) => true,
                Err(err) => {
                    debug!(error = %err, "central server lifecheck failed");
                    false
                }
            }
        })
    }
}

fn classify_transport(err: &reqwest::Error) -> DeliveryFailure {
    if err.is_timeout() {
        DeliveryFailure::Timeout
    } else {
        DeliveryFailure::Connection(err.to_string())
    }
}

/// A 2xx only counts when the body is empty or valid JSON.
async fn classify_success(response: Response) -> DeliveryOutcome {
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(err) => return DeliveryOutcome::Failed(classify_transport(&err)),
    };

    if body.iter().all(u8::is_ascii_whitespace) {
        return DeliveryOutcome::Sent;
    }

    match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(_) => DeliveryOutcome::Sent,
        Err(err) => DeliveryOutcome::Failed(DeliveryFailure::MalformedResponse(err.to_string())),
    }
}

async fn classify_status(response: Response) -> DeliveryFailure {
    let status = response.status();
    let detail = match response.text().await {
        Ok(text) => match serde_json::from_str::<ErrorBody>(&text) {
            Ok(ErrorBody {
                detail: serde_json::Value::String(detail),
            }) => detail,
            Ok(ErrorBody { detail }) => detail.to_string(),
            Err(_) if text.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("no detail")
                .to_string(),
            Err(_) => text,
        },
        Err(_) => status.canonical_reason().unwrap_or("no detail").to_string(),
    };

    DeliveryFailure::Status {
        status: status.as_u16(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::SocketAddr,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use axum::{
        Json, Router,
        http::StatusCode,
        routing::{get, post},
    };
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        dao::models::ScoreRecord,
        state::catalog::{ItemId, ItemKind, ModeId},
    };

    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn client(addr: SocketAddr) -> SubmissionClient {
        SubmissionClient::new(
            CentralConfig::new(format!("http://{addr}/"))
                .with_timeout(Duration::from_millis(300)),
        )
        .unwrap()
    }

    fn report() -> ScoreReport {
        ScoreReport::new(
            "CALA",
            3,
            2584,
            vec![ScoreRecord {
                item_id: ItemId(5),
                mode_id: ModeId(1),
                value: 2,
            }],
        )
    }

    #[tokio::test]
    async fn success_posts_expected_payload() {
        let received = Arc::new(Mutex::new(None::<Value>));
        let sink = received.clone();
        let router = Router::new().route(
            "/api/addScores",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    *sink.lock().unwrap() = Some(body);
                    Json(Value::Null)
                }
            }),
        );
        let addr = serve(router).await;

        let outcome = client(addr).attempt_send(&report()).await;

        assert_eq!(outcome, DeliveryOutcome::Sent);
        let body = received.lock().unwrap().clone().unwrap();
        assert_eq!(
            body,
            json!({
                "eventCode": "CALA",
                "matchNumber": 3,
                "teamNumber": 2584,
                "scores": [{"scoring_item_id": 5, "mode_id": 1, "value": 2}]
            })
        );
    }

    #[tokio::test]
    async fn conflict_is_a_duplicate_failure() {
        let router = Router::new().route(
            "/api/addScores",
            post(|| async {
                (
                    StatusCode::CONFLICT,
                    Json(json!({"detail": "Match #3 data for team 2584 already submitted"})),
                )
            }),
        );
        let addr = serve(router).await;

        let outcome = client(addr).attempt_send(&report()).await;

        match outcome {
            DeliveryOutcome::Failed(failure) => {
                assert!(failure.is_duplicate());
                assert_eq!(
                    failure,
                    DeliveryFailure::Status {
                        status: 409,
                        detail: "Match #3 data for team 2584 already submitted".into()
                    }
                );
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_failed() {
        let router = Router::new().route(
            "/api/addScores",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let addr = serve(router).await;

        let outcome = client(addr).attempt_send(&report()).await;
        assert!(matches!(
            outcome,
            DeliveryOutcome::Failed(DeliveryFailure::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let router = Router::new().route(
            "/api/addScores",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                StatusCode::OK
            }),
        );
        let addr = serve(router).await;

        let outcome = client(addr).attempt_send(&report()).await;
        assert_eq!(outcome, DeliveryOutcome::Failed(DeliveryFailure::Timeout));
    }

    #[tokio::test]
    async fn non_json_success_body_is_malformed() {
        let router = Router::new().route("/api/addScores", post(|| async { "<html>portal</html>" }));
        let addr = serve(router).await;

        let outcome = client(addr).attempt_send(&report()).await;
        assert!(matches!(
            outcome,
            DeliveryOutcome::Failed(DeliveryFailure::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_server_is_connection_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let outcome = client(addr).attempt_send(&report()).await;
        assert!(matches!(
            outcome,
            DeliveryOutcome::Failed(DeliveryFailure::Connection(_))
        ));
    }

    #[tokio::test]
    async fn fetches_catalog_and_lifecheck() {
        let router = Router::new()
            .route("/lifecheck", get(|| async { Json(json!({"alive": true})) }))
            .route(
                "/api/gameModesAndScoringElements",
                get(|| async {
                    Json(json!({
                        "modes": {"Auto": {"mode_name": "Auto", "mode_id": 1}},
                        "scoring_items": {
                            "Leave": {"name": "Leave", "scoring_item_id": 2, "type": "score_flag"}
                        }
                    }))
                }),
            );
        let addr = serve(router).await;
        let client = client(addr);

        client.lifecheck().await.unwrap();
        assert!(client.health_check().await);
        let catalog = client.fetch_catalog().await.unwrap();
        assert_eq!(catalog.item_by_name("Leave").unwrap().kind, ItemKind::Flag);
    }
}
