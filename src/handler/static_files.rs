//! Static file serving module
//!
//! Maps request paths onto the configured root directory: files with an
//! inferred MIME type, index files and listings for directories, and
//! conditional GET via `Last-Modified`.

use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt::Write as _;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tokio::io::AsyncReadExt;

/// Characters left unescaped in listing links
const LINK_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Serve a GET request from the static root
pub async fn serve(
    ctx: &RequestContext<'_>,
    root: &Path,
    index_files: &[String],
) -> Response<Full<Bytes>> {
    let (url_path, query) = split_target(ctx.path);
    let fs_path = translate_path(root, url_path);

    if fs::metadata(&fs_path).await.is_ok_and(|m| m.is_dir()) {
        return serve_directory(ctx, &fs_path, url_path, query, index_files).await;
    }

    if url_path.ends_with('/') {
        return not_found("File not found");
    }

    serve_file(ctx, &fs_path).await
}

/// Split a raw request target into its path and query, dropping any fragment
pub fn split_target(raw: &str) -> (&str, Option<&str>) {
    let raw = raw.split_once('#').map_or(raw, |(before, _)| before);
    match raw.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (raw, None),
    }
}

/// Map a URL path onto the filesystem below `root`.
///
/// The path is percent-decoded and normalised lexically; `..` can never
/// climb above `root`.
pub fn translate_path(root: &Path, url_path: &str) -> PathBuf {
    let decoded = percent_decode_str(url_path).decode_utf8_lossy();

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut path = root.to_path_buf();
    for segment in segments {
        // A segment that still carries a separator or prefix would escape the join
        let mut components = Path::new(segment).components();
        if segment.contains('\\')
            || !matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            )
        {
            continue;
        }
        path.push(segment);
    }
    path
}

async fn serve_directory(
    ctx: &RequestContext<'_>,
    dir: &Path,
    url_path: &str,
    query: Option<&str>,
    index_files: &[String],
) -> Response<Full<Bytes>> {
    if !url_path.ends_with('/') {
        // A leading `//` would make the Location protocol-relative
        let base = url_path.trim_start_matches('/');
        let location = match query {
            Some(q) => format!("/{base}/?{q}"),
            None => format!("/{base}/"),
        };
        return http::build_redirect_response(&location);
    }

    for index in index_files {
        let candidate = dir.join(index);
        if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
            return serve_file(ctx, &candidate).await;
        }
    }

    list_directory(dir, url_path).await
}

/// Serve a single file with `Last-Modified` and `If-Modified-Since` support
async fn serve_file(ctx: &RequestContext<'_>, path: &Path) -> Response<Full<Bytes>> {
    let Ok(mut file) = fs::File::open(path).await else {
        return not_found("File not found");
    };
    let metadata = match file.metadata().await {
        Ok(m) if m.is_file() => m,
        _ => return not_found("File not found"),
    };

    let modified = metadata.modified().unwrap_or_else(|_| SystemTime::now());
    let last_modified = cache::format_http_date(modified);

    if cache::is_not_modified(
        ctx.if_modified_since.as_deref(),
        ctx.has_if_none_match,
        modified,
    ) {
        return http::build_304_response(&last_modified);
    }

    let mut data = Vec::with_capacity(usize::try_from(metadata.len()).unwrap_or(0));
    if let Err(e) = file.read_to_end(&mut data).await {
        logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
        return not_found("File not found");
    }

    let content_type = mime::get_content_type(path.extension().and_then(|e| e.to_str()));
    http::build_file_response(data, content_type, &last_modified)
}

/// Render an HTML listing of `dir`
async fn list_directory(dir: &Path, url_path: &str) -> Response<Full<Bytes>> {
    let mut reader = match fs::read_dir(dir).await {
        Ok(r) => r,
        Err(e) => {
            logger::log_warning(&format!("Cannot list '{}': {e}", dir.display()));
            return not_found("No permission to list directory");
        }
    };

    let mut entries = Vec::new();
    loop {
        match reader.next_entry().await {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => break,
            Err(e) => {
                logger::log_warning(&format!("Error reading '{}': {e}", dir.display()));
                break;
            }
        }
    }

    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = fs::metadata(entry.path()).await.is_ok_and(|m| m.is_dir());
        let is_symlink = entry.file_type().await.is_ok_and(|t| t.is_symlink());

        let mut display = name.clone();
        let mut link = name.clone();
        if is_dir {
            display.push('/');
            link.push('/');
        }
        if is_symlink {
            display.push('@');
        }
        items.push((name.to_lowercase(), display, link));
    }
    items.sort();

    let title = format!(
        "Directory listing for {}",
        escape_html(&percent_decode_str(url_path).decode_utf8_lossy())
    );
    let mut html = format!(
        "<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<hr>\n<ul>\n"
    );
    for (_, display, link) in &items {
        let _ = writeln!(
            html,
            "<li><a href=\"{}\">{}</a></li>",
            utf8_percent_encode(link, LINK_ESCAPE),
            escape_html(display)
        );
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");

    http::build_html_response(html)
}

fn not_found(message: &str) -> Response<Full<Bytes>> {
    logger::log_error_reply(404, message);
    http::build_404_response(message)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
