use crate::error::AppError;
use crate::utils::html::escape_html;
use crate::utils::validation::is_safe_path_segment;
use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
};
use std::fmt::Write;
use tokio_util::io::ReaderStream;

/// Fixed report names the analysis script deposits in the output directory.
pub const REPORT_FILES: &[&str] = &[
    "juice_subs.txt",
    "possible-xss.txt",
    "new.txt",
    "vulns.txt",
    "dirsearch.txt",
];

/// Shown on the index page for a report the script has not produced yet.
pub const MISSING_REPORT_PLACEHOLDER: &str = "File not found or empty.";

/// Renders the index page: an upload form followed by the current contents
/// of each report file. Reads the filesystem on every request.
pub async fn index(State(state): State<crate::AppState>) -> Html<String> {
    let mut sections = String::new();

    for name in REPORT_FILES {
        let path = state.config.output_dir.join(name);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(_) => MISSING_REPORT_PLACEHOLDER.to_string(),
        };

        let _ = write!(
            sections,
            "    <section>\n      <h2><a href=\"/{name}\">{name}</a></h2>\n      <pre>{}</pre>\n    </section>\n",
            escape_html(&contents)
        );
    }

    Html(format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
           <meta charset=\"utf-8\">\n\
           <title>Recon Portal</title>\n\
         </head>\n\
         <body>\n\
           <h1>Recon Portal</h1>\n\
           <form action=\"/upload_and_execute\" method=\"post\" enctype=\"multipart/form-data\">\n\
             <input type=\"file\" name=\"file\">\n\
             <button type=\"submit\">Upload and Execute</button>\n\
           </form>\n\
         {sections}\
         </body>\n\
         </html>\n"
    ))
}

/// Serves a file from the output directory as an attachment.
///
/// Only single-segment names are accepted; anything that still looks like a
/// path after percent-decoding is treated as not found.
pub async fn download_report(
    State(state): State<crate::AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    if !is_safe_path_segment(&filename) {
        return Err(AppError::NotFound("File not found".to_string()));
    }

    let path = state.config.output_dir.join(&filename);

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| AppError::NotFound("File not found".to_string()))?;

    let metadata = file
        .metadata()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if metadata.is_dir() {
        return Err(AppError::NotFound("File not found".to_string()));
    }

    let body = Body::from_stream(ReaderStream::new(file));

    let headers = [
        (
            header::CONTENT_TYPE,
            "application/octet-stream".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];

    Ok((headers, body).into_response())
}
