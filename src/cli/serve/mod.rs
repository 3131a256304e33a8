//! Development server.
//!
//! Builds the site once, then serves the destination tree through the
//! page map: disabled pages are hidden, protected pages ask for Basic
//! auth. With `serve.watch` the actors rebuild on change and swap in a
//! fresh page map.

mod access;
mod auth;
mod lifecycle;
mod path;
mod resolve;
mod response;

use std::sync::Arc;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use crossbeam::channel;
use tiny_http::{Request, Server};

use self::access::AccessEntry;
use self::resolve::{Resolution, Target, resolve};
use super::build::run_build;
use crate::config::{SiteConfig, cfg};
use crate::core::{is_shutdown, register_server, set_healthy};
use crate::log;
use crate::page::{PageMap, SharedPages, scan_pages};
use crate::utils::date::DateTimeUtc;
use crate::utils::plural::plural_count;

/// Request handler threads.
const REQUEST_THREADS: usize = 4;

/// Build, bind and serve until Ctrl+C.
pub fn serve_site(config: Arc<SiteConfig>) -> Result<()> {
    let report = run_build(Arc::clone(&config))?;
    log!("build"; "{}", report);
    set_healthy(report.is_success());

    let pages = scan_pages(&config.build.dest, &config.site.webroot)
        .with_context(|| format!("failed to scan pages in {}", config.build.dest.display()))?;
    log!("serve"; "{}", describe_pages(&pages));
    let pages: SharedPages = Arc::new(ArcSwap::from_pointee(pages));

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    register_server(Arc::clone(&server), shutdown_tx);
    log!("serve"; "http://{}{}", addr, config.site.webroot);

    let actors = config
        .serve
        .watch
        .then(|| lifecycle::spawn_actors(Arc::clone(&config), Arc::clone(&pages), shutdown_rx));

    run_request_loop(&server, &pages)?;
    lifecycle::wait_for_shutdown(actors);
    Ok(())
}

/// `3 pages, root / with 2 child pages`
fn describe_pages(pages: &PageMap) -> String {
    let count = plural_count(pages.len(), "page");
    match pages.root() {
        Some(root) => format!(
            "{}, root {} with {}",
            count,
            root.route,
            plural_count(pages.children(root).count(), "child page")
        ),
        None => count,
    }
}

fn run_request_loop(server: &Server, pages: &SharedPages) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let pages = Arc::clone(pages);
        pool.spawn(move || {
            // Both may have been swapped by a rebuild since the last request
            let config = cfg();
            let pages = pages.load_full();
            if let Err(e) = handle_request(request, &config, &pages) {
                log!("serve"; "request error: {:#}", e);
            }
        });
    }
    Ok(())
}

/// Answer one request and write its access log line.
fn handle_request(request: Request, config: &SiteConfig, pages: &PageMap) -> Result<()> {
    let entry = config.serve.access_log.then(|| AccessEntry {
        client: request.remote_addr().copied(),
        user: None,
        time: DateTimeUtc::now(),
        method: request.method().to_string(),
        url: request.url().to_string(),
        version: request.http_version().to_string(),
        status: 0,
    });

    let (status, user) = respond(request, config, pages)?;

    if let Some(mut entry) = entry {
        entry.status = status;
        entry.user = user;
        log!("access"; "{}", entry);
    }
    Ok(())
}

fn respond(request: Request, config: &SiteConfig, pages: &PageMap) -> Result<(u16, Option<String>)> {
    // Early exit if shutdown requested
    if is_shutdown() {
        return Ok((response::respond_unavailable(request)?, None));
    }

    let Some(path) = path::request_path(request.url()) else {
        let message = format!("invalid request path {}", request.url());
        return Ok((response::respond_error(request, 404, &message)?, None));
    };
    let authorization = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Authorization"))
        .map(|h| h.value.as_str().to_string());

    let Resolution { target, user } = resolve(&path, authorization.as_deref(), config, pages);
    let status = match target {
        Target::File(file) => response::respond_file(request, &file)?,
        Target::NotFound(message) => response::respond_error(request, 404, &message)?,
        Target::Unauthorized(message) => response::respond_unauthorized(request, &message)?,
        Target::Error(message) => response::respond_error(request, 500, &message)?,
    };
    Ok((status, user))
}
