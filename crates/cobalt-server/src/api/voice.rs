//! Speech-to-text for voice search.

use axum::{
    extract::{Multipart, State},
    Extension, Json,
};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

const AUDIO_FIELD: &str = "audio";
const DEFAULT_FILE_NAME: &str = "audio.webm";

#[derive(Debug, Serialize)]
pub(super) struct TranscriptBody {
    text: String,
}

struct AudioUpload {
    file_name: String,
    bytes: Vec<u8>,
}

async fn read_audio(rid: &str, multipart: &mut Multipart) -> Result<Option<AudioUpload>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(rid, "bad_request", format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(rid, "bad_request", format!("invalid audio upload: {e}")))?;
        if bytes.is_empty() {
            return Ok(None);
        }
        return Ok(Some(AudioUpload {
            file_name,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

/// POST /api/voice/transcribe (multipart, field `audio`)
pub(super) async fn transcribe(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    mut multipart: Multipart,
) -> Result<Json<TranscriptBody>, ApiError> {
    let rid = &req_id.0;
    let Some(upload) = read_audio(rid, &mut multipart).await? else {
        return Err(ApiError::new(rid, "bad_request", "No audio file"));
    };

    match state
        .transcriber
        .transcribe(upload.bytes, &upload.file_name)
        .await
    {
        Ok(text) => Ok(Json(TranscriptBody { text })),
        Err(e) => {
            tracing::warn!(error = %e, request_id = %rid, "transcription failed");
            Err(ApiError::new(rid, "transcription_failed", "Transcription failed"))
        }
    }
}
