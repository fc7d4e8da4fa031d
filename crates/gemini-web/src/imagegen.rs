//! Image generation and editing with Gemini 3 Pro ("Nano Banana Pro")
//!
//! Generation bypasses the regular reply parser: the body is streamed and
//! scraped for image URLs as it arrives, since the URLs can sit anywhere in
//! the nested payload. Editing goes through the regular `generate_content`
//! path with the source image attached.

use futures::{Stream, StreamExt};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::client::GeminiClient;
use crate::constants::Model;
use crate::error::GeminiError;
use crate::frames;

/// Accumulated stream length between URL re-scans
pub const SCAN_INTERVAL_BYTES: usize = 10_000;

/// Progress is logged every this many chunks
const PROGRESS_EVERY_CHUNKS: usize = 5;

/// Shown in place of the image when generation is still running server-side
const LOADING_PLACEHOLDER: &str = "Loading Nano Banana Pro";

/// Shown when the request fell back to image search
const SEARCH_PLACEHOLDER: &str = "I can search for images";

/// Where and under what name to save the result
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub output_dir: PathBuf,
    /// File stem; `.png` is appended
    pub filename: String,
    /// Keep the raw response next to the image
    pub debug: bool,
}

impl ImageRequest {
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.png", self.filename))
    }

    pub fn debug_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}_debug.txt", self.filename))
    }
}

/// Form body for an image generation request.
///
/// `idx17=[[1]]` switches the request into image generation mode and
/// `idx49=14` selects the generation parameters.
pub fn build_request_body(prompt: &str, access_token: &str) -> String {
    let inner = json!([[prompt], null, null]).to_string();
    let outer = json!([null, inner]).to_string();
    format!(
        "at={}&f.req={}&idx17=%5B%5B1%5D%5D&idx49=14",
        urlencoding::encode(access_token),
        urlencoding::encode(&outer)
    )
}

/// True when appending `chunk_len` bytes carried the total across a
/// multiple of [`SCAN_INTERVAL_BYTES`].
pub fn crossed_scan_boundary(total_len: usize, chunk_len: usize) -> bool {
    total_len % SCAN_INTERVAL_BYTES < chunk_len
}

/// Explains a response that finished without any image URL
pub fn diagnose_missing_images(body: &str) -> GeminiError {
    let message = if body.contains(LOADING_PLACEHOLDER) {
        "Image generation timed out. Try longer --timeout"
    } else if body.contains(SEARCH_PLACEHOLDER) {
        "Image generation failed - API returned search mode instead of generation. Cookies may need refresh."
    } else {
        "No image URLs found in response"
    };
    GeminiError::Generation(message.to_string())
}

/// What a finished image stream yielded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamScan {
    /// The whole body, lossily decoded
    pub body: String,
    /// Image URLs in first-seen order
    pub image_urls: Vec<String>,
    /// URLs were already found by a re-scan before the stream ended
    pub found_during_stream: bool,
}

/// Accumulates a StreamGenerate body, re-scanning it for image URLs each
/// time it grows past a multiple of [`SCAN_INTERVAL_BYTES`] and once more at
/// the end when nothing was found.
pub async fn scan_image_stream<S, B>(stream: S) -> Result<StreamScan, GeminiError>
where
    S: Stream<Item = Result<B, GeminiError>>,
    B: AsRef<[u8]>,
{
    let mut stream = std::pin::pin!(stream);
    let mut accumulated: Vec<u8> = Vec::new();
    let mut image_urls: Vec<String> = Vec::new();
    let mut chunk_count = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let chunk = chunk.as_ref();
        accumulated.extend_from_slice(chunk);
        chunk_count += 1;

        if chunk_count % PROGRESS_EVERY_CHUNKS == 0 {
            debug!("Received {} bytes...", accumulated.len());
        }

        if crossed_scan_boundary(accumulated.len(), chunk.len()) {
            let text = String::from_utf8_lossy(&accumulated);
            let urls = frames::extract_image_urls(&frames::parse_streaming_response(&text));
            if !urls.is_empty() {
                debug!("Found {} image URL(s)", urls.len());
                image_urls = urls;
            }
        }
    }

    let body = String::from_utf8_lossy(&accumulated).into_owned();
    debug!("Stream complete. Total: {} bytes", body.len());

    let found_during_stream = !image_urls.is_empty();
    if !found_during_stream {
        image_urls = frames::extract_image_urls(&frames::parse_streaming_response(&body));
    }

    Ok(StreamScan {
        body,
        image_urls,
        found_during_stream,
    })
}

/// Generates an image from `request.prompt` and saves the first result.
pub async fn generate_image_streaming(
    client: &GeminiClient,
    request: &ImageRequest,
) -> Result<PathBuf, GeminiError> {
    let body = build_request_body(&request.prompt, client.access_token()?);
    debug!("Sending streaming image request");

    let response = client
        .post_stream_generate(body, Model::Gemini3ProImage)
        .await?;

    let chunks = response
        .bytes_stream()
        .map(|chunk| chunk.map_err(|e| client.transport_error(e)));
    let scan = scan_image_stream(chunks).await?;

    if request.debug {
        let debug_path = request.debug_path();
        tokio::fs::create_dir_all(&request.output_dir).await?;
        tokio::fs::write(&debug_path, &scan.body).await?;
        info!("Debug saved to {}", debug_path.display());
    }

    let Some(image_url) = scan.image_urls.first() else {
        return Err(diagnose_missing_images(&scan.body));
    };

    for url in scan.image_urls.iter().take(3) {
        debug!("Image URL: {}", url);
    }

    client.download(image_url, &request.output_path()).await
}

/// Fails with `Input image not found` unless `path` exists
pub fn ensure_input_exists(path: &Path) -> Result<(), GeminiError> {
    if path.exists() {
        Ok(())
    } else {
        Err(GeminiError::InputNotFound(path.to_path_buf()))
    }
}

/// Edits `input` according to `request.prompt` and saves the first returned
/// image at full size.
pub async fn edit_image(
    client: &GeminiClient,
    request: &ImageRequest,
    input: &Path,
) -> Result<PathBuf, GeminiError> {
    ensure_input_exists(input)?;
    debug!("Editing {}", input.display());

    let output = client
        .generate_content(&request.prompt, &[input.to_path_buf()], Model::Gemini3Pro)
        .await?;

    let Some(image) = output.generated_images().first() else {
        let text = output.text();
        let message = if !text.is_empty() {
            text.to_string()
        } else if !output.web_images().is_empty() {
            format!(
                "Edit returned {} image search result(s) instead of an edited image",
                output.web_images().len()
            )
        } else {
            "No image returned from edit request".to_string()
        };
        debug!("No images returned");
        return Err(GeminiError::Generation(message));
    };

    debug!("Found {} edited image(s)", output.generated_images().len());
    client
        .download(&image.full_size_url(), &request.output_path())
        .await
}
