//! HTTPサービス
//!
//! - `POST /upload`       multipart の `image` を解析して判定結果を返す
//! - `POST /report`       上流ペイロード(JSON)から判定結果を返す
//! - `GET  /result`       `?parts=3,1` の領域番号から3Dモデルを返す（番兵にフォールバック）
//! - `GET  /assets/{key}` 合成キーの3Dモデルをそのまま返す

use crate::analyzer::{self, AnalyzerBackend};
use crate::assets::FsCatalog;
use crate::config::Config;
use crate::error::AssessError;
use crate::scanner::validate_image_bytes;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use car_assess_common::{
    assemble_payload, fetch_asset, fetch_asset_or_default, parse_payload, AssessmentResult,
    BinaryAsset, CompositeKey, Error as CommonError,
};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const ASSET_KEY_HEADER: HeaderName = HeaderName::from_static("x-asset-key");

static UPLOAD_COUNTER: AtomicU64 = AtomicU64::new(0);

/// JSONで返すエラー
#[derive(Debug)]
pub struct ServerError {
    status: StatusCode,
    message: String,
}

impl ServerError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

impl From<AssessError> for ServerError {
    fn from(err: AssessError) -> Self {
        let status = match &err {
            AssessError::Common(CommonError::InvalidKey(_))
            | AssessError::ImageLoad(_)
            | AssessError::FileNotFound(_) => StatusCode::BAD_REQUEST,
            AssessError::Common(CommonError::AssetNotFound(_)) => StatusCode::NOT_FOUND,
            AssessError::Common(CommonError::MalformedPayload(_))
            | AssessError::ApiCall(_)
            | AssessError::ApiParse(_)
            | AssessError::CliExecution(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<CommonError> for ServerError {
    fn from(err: CommonError) -> Self {
        AssessError::from(err).into()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<FsCatalog>,
    pub backend: AnalyzerBackend,
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);
    Router::new()
        .route("/upload", post(upload))
        .route("/report", post(report))
        .route("/result", get(result_asset))
        .route("/assets/{key}", get(asset_by_key))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "invalid CORS origin ignored");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

pub async fn run_server(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        backend = %state.backend,
        assets = %state.catalog.root().display(),
        "car-assess server listening"
    );
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AssessmentResult>, ServerError> {
    let mut image: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::bad_request(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.jpg").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::bad_request(e.to_string()))?;
        image = Some((file_name, bytes.to_vec()));
        break;
    }

    let (file_name, bytes) =
        image.ok_or_else(|| ServerError::bad_request("multipart field `image` is required"))?;
    let mime = validate_image_bytes(&bytes)
        .map_err(|e| AssessError::ImageLoad(format!("{}: {}", file_name, e)))?;

    let payload = match state.backend {
        AnalyzerBackend::Http => {
            let url = format!("{}/upload", state.config.get_analyzer_url()?);
            analyzer::http::analyze_bytes(&url, bytes, file_name, state.config.timeout_seconds)
                .await?
        }
        AnalyzerBackend::Detector => {
            // 検出スクリプトはファイルパスを受け取る
            let ext = mime.rsplit('/').next().unwrap_or("jpg");
            let temp_path = std::env::temp_dir().join(format!(
                "car-assess-upload-{}-{}.{}",
                std::process::id(),
                UPLOAD_COUNTER.fetch_add(1, Ordering::Relaxed),
                ext
            ));
            tokio::fs::write(&temp_path, &bytes)
                .await
                .map_err(AssessError::from)?;
            let result =
                analyzer::analyze_image(&temp_path, AnalyzerBackend::Detector, &state.config).await;
            if let Err(e) = tokio::fs::remove_file(&temp_path).await {
                tracing::warn!(path = %temp_path.display(), error = %e, "failed to remove upload");
            }
            result?
        }
    };

    Ok(Json(assemble_payload(&payload)))
}

async fn report(body: String) -> Result<Json<AssessmentResult>, ServerError> {
    let payload = parse_payload(&body).map_err(|e| ServerError::bad_request(e.to_string()))?;
    Ok(Json(assemble_payload(&payload)))
}

#[derive(Debug, Deserialize)]
struct ResultQuery {
    parts: Option<String>,
}

async fn result_asset(
    State(state): State<AppState>,
    Query(query): Query<ResultQuery>,
) -> Result<Response, ServerError> {
    let numbers: Vec<u8> = query
        .parts
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter_map(|p| p.trim().parse().ok())
        .collect();
    let key = CompositeKey::from_region_numbers(&numbers);

    let catalog = state.catalog.clone();
    let asset = tokio::task::spawn_blocking(move || fetch_asset_or_default(catalog.as_ref(), &key))
        .await
        .map_err(|e| AssessError::Config(e.to_string()))??;
    glb_response(asset)
}

async fn asset_by_key(
    State(state): State<AppState>,
    Path(raw_key): Path<String>,
) -> Result<Response, ServerError> {
    let key = CompositeKey::parse(raw_key.strip_suffix(".glb").unwrap_or(&raw_key))?;

    let catalog = state.catalog.clone();
    let asset = tokio::task::spawn_blocking(move || fetch_asset(catalog.as_ref(), &key))
        .await
        .map_err(|e| AssessError::Config(e.to_string()))??;
    glb_response(asset)
}

fn glb_response(asset: BinaryAsset) -> Result<Response, ServerError> {
    let key_value = HeaderValue::from_str(asset.key.as_str())
        .map_err(|e| AssessError::Config(e.to_string()))?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(asset.content_type)),
            (ASSET_KEY_HEADER, key_value),
        ],
        asset.bytes,
    )
        .into_response())
}
