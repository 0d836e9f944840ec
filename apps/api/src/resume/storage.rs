use anyhow::Result;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;

use crate::resume::extract::DocumentKind;

/// Object key for a session's uploaded resume: `resumes/{session}_resume{ext}`.
pub fn resume_object_key(session_id: &str, kind: DocumentKind) -> String {
    format!("resumes/{}_resume{}", sanitize_session_id(session_id), kind.extension())
}

/// Keeps ASCII alphanumerics, `-` and `_`. Anything else becomes `_`.
pub fn sanitize_session_id(session_id: &str) -> String {
    let cleaned: String = session_id
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "default_session".to_string()
    } else {
        cleaned
    }
}

/// File name presented to the candidate and stored with the application.
pub fn stored_filename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

pub async fn put_resume(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    bytes: Bytes,
    kind: DocumentKind,
) -> Result<()> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(bytes))
        .content_type(kind.content_type())
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

    info!("Uploaded resume to s3://{}/{}", bucket, key);
    Ok(())
}

pub async fn get_resume(s3: &aws_sdk_s3::Client, bucket: &str, key: &str) -> Result<Bytes> {
    let object = s3
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("S3 download failed for {key}: {e}"))?;

    let data = object
        .body
        .collect()
        .await
        .map_err(|e| anyhow::anyhow!("S3 body read failed for {key}: {e}"))?;

    Ok(data.into_bytes())
}
