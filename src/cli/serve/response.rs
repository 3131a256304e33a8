//! HTTP response handlers.
//!
//! Every responder returns the status it sent, for the access log.

use std::fs;
use std::path::Path;

use anyhow::{Result, anyhow};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use super::auth::CHALLENGE;
use crate::utils::mime::{self, PLAIN};

/// Stream a file from disk.
///
/// A file that vanished since resolution (a rebuild replaced it) is a 404.
pub fn respond_file(request: Request, path: &Path) -> Result<u16> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type, None);
    }

    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) => return respond_error(request, 404, &format!("{}: {e}", path.display())),
    };
    let response = Response::from_file(file)
        .with_status_code(StatusCode(200))
        .with_header(header("Content-Type", content_type)?);
    request.respond(response)?;
    Ok(200)
}

/// Plaintext `error: <message>` with `status`.
pub fn respond_error(request: Request, status: u16, message: &str) -> Result<u16> {
    send_error(request, status, message, None)
}

/// 401 with a Basic auth challenge.
pub fn respond_unauthorized(request: Request, message: &str) -> Result<u16> {
    send_error(request, 401, message, Some(header("WWW-Authenticate", CHALLENGE)?))
}

/// 503 while the server shuts down.
pub fn respond_unavailable(request: Request) -> Result<u16> {
    send_error(request, 503, "server is shutting down", None)
}

fn send_error(request: Request, status: u16, message: &str, extra: Option<Header>) -> Result<u16> {
    if is_head_request(&request) {
        return send_head(request, status, PLAIN, extra);
    }

    let mut response = Response::from_string(error_body(message))
        .with_status_code(StatusCode(status))
        .with_header(header("Content-Type", PLAIN)?);
    if let Some(extra) = extra {
        response.add_header(extra);
    }
    request.respond(response)?;
    Ok(status)
}

fn send_head(
    request: Request,
    status: u16,
    content_type: &'static str,
    extra: Option<Header>,
) -> Result<u16> {
    let mut response =
        Response::empty(StatusCode(status)).with_header(header("Content-Type", content_type)?);
    if let Some(extra) = extra {
        response.add_header(extra);
    }
    request.respond(response)?;
    Ok(status)
}

fn error_body(message: &str) -> String {
    format!("error: {message}\n")
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn header(key: &'static str, value: &'static str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header `{key}: {value}`"))
}
