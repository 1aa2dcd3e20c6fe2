//! `/analyze_frame` と `/analyze_flow`
//!
//! Upload and payload validation always runs before the model-availability
//! check, so a bad request is reported as such even when no model loaded.
//! Inference runs on the blocking pool.

use crate::detection::{
    frame::{decode_grayscale, validate_upload_name, MAX_FRAME_BYTES},
    DetectionError, FlowRecord, FlowRejection, FlowVerdict, FrameRejection, FrameVerdict,
};
use crate::error::AppError;
use crate::http_server::AppState;
use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    Json,
};
use serde_json::Value;
use tracing::{debug, error, instrument};

/// multipart field carrying the image
pub const FRAME_FIELD: &str = "frame";

const FRAME_MODEL_UNAVAILABLE: &str = "Anomaly detection model not available";
const FLOW_MODEL_UNAVAILABLE: &str = "Network analysis model not available";

/// Read a multipart field, giving up as soon as more than `limit` bytes
/// have arrived
pub async fn read_bounded(field: &mut Field<'_>, limit: usize) -> Result<Vec<u8>, FrameRejection> {
    let mut buf = Vec::new();
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                if buf.len() + chunk.len() > limit {
                    return Err(FrameRejection::TooLarge);
                }
                buf.extend_from_slice(&chunk);
            }
            Ok(None) => return Ok(buf),
            Err(e) => {
                debug!(error = %e, "Upload stream ended early");
                return Err(FrameRejection::Undecodable);
            }
        }
    }
}

/// Find the `frame` part and read it, validating name and size on the way
async fn read_frame_upload(mut multipart: Multipart) -> Result<Vec<u8>, FrameRejection> {
    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(FrameRejection::Missing),
            Err(e) => {
                debug!(error = %e, "Malformed multipart body");
                return Err(FrameRejection::Missing);
            }
        };

        if field.name() != Some(FRAME_FIELD) {
            continue;
        }

        // ファイル名のないパートはファイルとして扱わない
        let Some(filename) = field.file_name().map(str::to_owned) else {
            return Err(FrameRejection::Missing);
        };
        validate_upload_name(&filename)?;

        return read_bounded(&mut field, MAX_FRAME_BYTES).await;
    }
}

#[instrument(skip_all)]
pub async fn analyze_frame(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<FrameVerdict>, AppError> {
    let multipart = multipart.map_err(|e| {
        debug!(error = %e, "Request is not multipart");
        FrameRejection::Missing
    })?;
    let bytes = read_frame_upload(multipart).await?;

    let analyzer = state
        .detectors
        .frame
        .clone()
        .ok_or(AppError::ModelUnavailable(FRAME_MODEL_UNAVAILABLE))?;

    let size = bytes.len();
    let result = tokio::task::spawn_blocking(move || {
        let image = decode_grayscale(&bytes)?;
        analyzer.analyze(&image)
    })
    .await
    .map_err(|e| {
        error!(error = %e, "Frame analysis task failed");
        AppError::AnalysisFailed("Analysis failed")
    })?;

    match result {
        Ok(verdict) => {
            debug!(size, anomaly = verdict.anomaly, error = verdict.error, "Frame analyzed");
            Ok(Json(verdict))
        }
        Err(DetectionError::Decode(reason)) => {
            debug!(size, reason = %reason, "Upload is not a decodable image");
            Err(FrameRejection::Undecodable.into())
        }
        Err(e) => {
            error!(error = %e, "Frame analysis failed");
            Err(AppError::AnalysisFailed("Analysis failed"))
        }
    }
}

#[instrument(skip_all)]
pub async fn analyze_flow(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<FlowVerdict>, AppError> {
    let body = match body {
        Ok(Json(body)) if body.as_object().is_some_and(|o| !o.is_empty()) => body,
        _ => return Err(FlowRejection::NoData.into()),
    };

    let analyzer = state
        .detectors
        .flow
        .clone()
        .ok_or(AppError::ModelUnavailable(FLOW_MODEL_UNAVAILABLE))?;

    let record = FlowRecord::from_json(&body)?;

    let verdict = tokio::task::spawn_blocking(move || analyzer.classify(&record))
        .await
        .map_err(|e| {
            error!(error = %e, "Flow analysis task failed");
            AppError::AnalysisFailed("Flow analysis failed")
        })?
        .map_err(|e| {
            error!(error = %e, "Flow classification failed");
            AppError::AnalysisFailed("Flow analysis failed")
        })?;

    debug!(attack = verdict.attack, "Flow classified");
    Ok(Json(verdict))
}
