use crate::error::SalaryError;
use crate::model::{DynModel, InputData, PredictResp};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::future::Future;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    pub model: DynModel,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/schema", get(schema))
        .route("/predict/", post(predict))
        .with_state(state)
}

/// Serves until `shutdown` resolves, then stops accepting and lets in-flight
/// requests finish.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn root(State(st): State<AppState>) -> Json<serde_json::Value> {
    let info = st.model.info();
    Json(serde_json::json!({
        "message": format!(
            "Starting salary prediction for vocational training graduates ({} model)",
            info.kind
        ),
        "model": info.kind,
        "schema": info.schema,
    }))
}

async fn schema(State(st): State<AppState>) -> Json<serde_json::Value> {
    let info = st.model.info();
    Json(serde_json::json!({
        "variant": info.schema,
        "columns": info.schema.columns(),
        "scaled_columns": info.scaled_columns,
    }))
}

async fn predict(
    State(st): State<AppState>,
    body: Result<Json<InputData>, JsonRejection>,
) -> Result<Json<PredictResp>, ApiError> {
    let Json(body) = body?;
    let y = st.model.predict(&body).await?;
    Ok(Json(PredictResp::new(y)))
}

/// Maps request and pipeline failures to HTTP responses with a JSON
/// `error` message.
pub enum ApiError {
    Body(JsonRejection),
    Salary(SalaryError),
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::Body(e)
    }
}

impl From<SalaryError> for ApiError {
    fn from(e: SalaryError) -> Self {
        Self::Salary(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Body(rejection) => {
                tracing::warn!(error = %rejection.body_text(), "unreadable prediction request");
                (rejection.status(), rejection.body_text())
            }
            ApiError::Salary(e) if e.is_validation() => {
                tracing::warn!(error = %e, "rejected prediction request");
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            ApiError::Salary(e) => {
                tracing::error!(error = %e, "prediction failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::Artifacts;
    use crate::linear_backend::LinearBackend;
    use crate::model::{LinearModel, Model, ModelInfo};
    use crate::preprocess::CategoryPolicy;
    use crate::scaler::{ScalingScope, StandardScaler};
    use crate::schema::FeatureSchema;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Extended-schema backend whose prediction is easy to compute by hand:
    /// every scaled numeric is 0 for the form defaults, so only indicators
    /// contribute.
    fn app(policy: CategoryPolicy) -> Router {
        let mut coefficients = vec![0.3, 0.2, 0.1, 0.25, 0.0, 0.0, 0.5];
        coefficients.extend([0.0, 1.5, 0.0, 0.0, 0.0]);
        let artifacts = Arc::new(Artifacts {
            model: LinearModel {
                kind: "BayesianRidge".into(),
                ..LinearModel::new(4.0, coefficients)
            },
            scaler: StandardScaler::new(vec![25.0, 60.0, 75.0], vec![5.0, 10.0, 8.0]).unwrap(),
        });
        let backend = LinearBackend::new(
            artifacts,
            FeatureSchema::Extended,
            ScalingScope::NumericOnly,
            policy,
        )
        .unwrap();
        build_router(AppState {
            model: Arc::new(backend),
        })
    }

    async fn post_json(app: Router, body: &str) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/predict/")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    async fn get_json(app: Router, uri: &str) -> serde_json::Value {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_describes_model() {
        let json = get_json(app(CategoryPolicy::Strict), "/").await;
        assert_eq!(json["model"], "BayesianRidge");
        assert_eq!(json["schema"], "extended");
    }

    #[tokio::test]
    async fn schema_lists_columns_in_order() {
        let json = get_json(app(CategoryPolicy::Strict), "/schema").await;
        let columns: Vec<String> = serde_json::from_value(json["columns"].clone()).unwrap();
        assert_eq!(columns, FeatureSchema::Extended.columns());
        assert_eq!(json["scaled_columns"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn predict_returns_value_and_display() {
        let (status, json) = post_json(
            app(CategoryPolicy::Strict),
            r#"{"age": 25, "training_hours": 60, "exam_score": 75.0,
                "gender": "L", "employment_status": "Sudah Bekerja", "major": "IT"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        // 4.0 + male 0.25 + employed 0.5 + IT 1.5
        assert_eq!(json["prediction"].as_f64().unwrap(), 6.25);
        assert_eq!(json["display"], "6.25 Juta Rupiah");
    }

    #[tokio::test]
    async fn unknown_major_is_422_when_strict() {
        let (status, json) = post_json(app(CategoryPolicy::Strict), r#"{"major": "Hukum"}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].as_str().unwrap().contains("Hukum"));
    }

    #[tokio::test]
    async fn unknown_major_is_ignored_when_lenient() {
        let (status, json) = post_json(app(CategoryPolicy::Lenient), r#"{"major": "Hukum"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["display"], "4.75 Juta Rupiah");
    }

    #[tokio::test]
    async fn out_of_range_is_422() {
        let (status, json) =
            post_json(app(CategoryPolicy::Strict), r#"{"exam_score": 120.0, "major": "IT"}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].as_str().unwrap().contains("exam_score"));
    }

    #[tokio::test]
    async fn wrong_field_type_gets_json_error() {
        let (status, json) = post_json(app(CategoryPolicy::Strict), r#"{"age": 25.5}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].as_str().unwrap().contains("age"));
    }

    #[tokio::test]
    async fn malformed_body_gets_json_error() {
        let (status, json) = post_json(app(CategoryPolicy::Strict), r#"{"age": "#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn missing_content_type_gets_json_error() {
        let resp = app(CategoryPolicy::Strict)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/predict/")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn dimension_mismatch_is_500() {
        let artifacts = Arc::new(Artifacts {
            model: LinearModel::new(0.0, vec![1.0; 7]),
            scaler: StandardScaler::new(vec![0.0; 3], vec![1.0; 3]).unwrap(),
        });
        let backend = LinearBackend::new(
            artifacts,
            FeatureSchema::Extended,
            ScalingScope::NumericOnly,
            CategoryPolicy::Lenient,
        )
        .unwrap();
        let app = build_router(AppState {
            model: Arc::new(backend),
        });
        let (status, json) = post_json(app, "{}").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("dimension mismatch"));
    }

    struct SlowModel;

    #[async_trait::async_trait]
    impl Model for SlowModel {
        async fn predict(&self, _: &InputData) -> crate::Result<f64> {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            Ok(5.0)
        }

        fn info(&self) -> ModelInfo {
            ModelInfo {
                kind: "slow".into(),
                schema: FeatureSchema::Compact,
                scaled_columns: Vec::new(),
            }
        }
    }

    #[tokio::test]
    async fn shutdown_drains_in_flight_request() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let app = build_router(AppState {
            model: Arc::new(SlowModel),
        });
        let server = tokio::spawn(serve(listener, app, async {
            let _ = rx.await;
        }));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(
                b"POST /predict/ HTTP/1.1\r\nhost: localhost\r\n\
                  content-type: application/json\r\ncontent-length: 2\r\n\
                  connection: close\r\n\r\n{}",
            )
            .await
            .unwrap();

        // request is being handled when the signal arrives
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        tx.send(()).unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.contains("5.00 Juta Rupiah"));

        server.await.unwrap().unwrap();
    }
}
