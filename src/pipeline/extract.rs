//! Page extraction: load the PDF and turn every page into a [`PageRecord`].
//!
//! pdfium is a synchronous C library and its document handle borrows the
//! library binding, so the whole load → render → encode walk runs inside a
//! single [`tokio::task::spawn_blocking`] closure rather than holding
//! non-`Send` state across await points. Pages are processed sequentially;
//! the concurrency budget is spent on model calls, not rendering.

use crate::config::ParseConfig;
use crate::error::ParseError;
use crate::types::PageRecord;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Cursor;
use tracing::{debug, info};

/// Extract text and a rendered JPEG for every page of the document.
///
/// Returns one [`PageRecord`] per page, `page_num` running 1..=N in
/// document order.
///
/// # Errors
///
/// [`ParseError::LoadFailed`] when the bytes are not a readable PDF or the
/// pdfium library cannot be bound; [`ParseError::ExtractionFailed`] when a
/// specific page fails to render or encode.
pub async fn extract_pages(
    bytes: Vec<u8>,
    config: &ParseConfig,
) -> Result<Vec<PageRecord>, ParseError> {
    let max_pixels = config.max_rendered_pixels;
    let jpeg_quality = config.jpeg_quality;

    tokio::task::spawn_blocking(move || {
        extract_pages_blocking(&bytes, max_pixels, jpeg_quality)
    })
    .await
    .map_err(|e| ParseError::Internal(format!("extraction task panicked: {e}")))?
}

fn extract_pages_blocking(
    bytes: &[u8],
    max_pixels: u32,
    jpeg_quality: u8,
) -> Result<Vec<PageRecord>, ParseError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| ParseError::LoadFailed {
            detail: format!("pdfium library unavailable: {e}"),
        })?;
    let pdfium = Pdfium::new(bindings);

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| ParseError::LoadFailed {
            detail: e.to_string(),
        })?;

    let page_count = document.pages().len() as usize;
    info!(pages = page_count, "document loaded");

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut records = Vec::with_capacity(page_count);
    for (index, page) in document.pages().iter().enumerate() {
        let page_num = index + 1;

        let text = page
            .text()
            .map_err(|e| ParseError::ExtractionFailed {
                page: page_num,
                detail: format!("text extraction: {e}"),
            })?
            .all();

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| ParseError::ExtractionFailed {
                page: page_num,
                detail: format!("render: {e}"),
            })?;
        let image_base64 = encode_jpeg_base64(&bitmap.as_image(), jpeg_quality).map_err(|e| {
            ParseError::ExtractionFailed {
                page: page_num,
                detail: format!("jpeg encode: {e}"),
            }
        })?;

        debug!(
            page = page_num,
            text_chars = text.len(),
            image_b64_len = image_base64.len(),
            "page extracted"
        );
        records.push(PageRecord {
            page_num,
            text,
            image_base64,
        });
    }

    Ok(records)
}

/// Encode a rendered page as a base64 JPEG string.
///
/// JPEG keeps the payload small enough to inline into a model request;
/// rendered pages have no alpha channel worth preserving.
fn encode_jpeg_base64(image: &DynamicImage, quality: u8) -> Result<String, image::ImageError> {
    let rgb = image.to_rgb8();
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)?;
    Ok(BASE64.encode(buffer.into_inner()))
}
