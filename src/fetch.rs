use std::io::Write;

use futures_util::StreamExt;
use tempfile::NamedTempFile;

use crate::error::PredictError;

/// Downloads the image at `url` into a fresh temporary file owned by the
/// calling request. Dropping the returned handle deletes the file, so
/// cleanup happens on every exit path without manual path tracking.
///
/// Any transport error, timeout, or non-2xx status is a download failure.
pub async fn download_image(
    client: &reqwest::Client,
    url: &str,
) -> Result<NamedTempFile, PredictError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| PredictError::Download(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(PredictError::Download(format!(
            "server responded with HTTP {status}"
        )));
    }

    let mut tmp = tempfile::Builder::new()
        .prefix("waste-img-")
        .suffix(".jpg")
        .tempfile()
        .map_err(|e| PredictError::Download(format!("could not create temporary file: {e}")))?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| PredictError::Download(e.to_string()))?;
        tmp.as_file_mut()
            .write_all(&chunk)
            .map_err(|e| PredictError::Download(format!("could not write temporary file: {e}")))?;
    }
    tmp.as_file_mut()
        .flush()
        .map_err(|e| PredictError::Download(format!("could not write temporary file: {e}")))?;

    tracing::debug!("image downloaded to {}", tmp.path().display());
    Ok(tmp)
}
