//! A minimal development HTTP server for `output_dir`, used by `weir serve`.

use std::fs;
use std::net::ToSocketAddrs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tiny_http::{Header, Response, Server};

use crate::log;

/// Serve `root` over HTTP until the process is asked to stop. Blocks the
/// calling thread; callers that also want to watch for file changes should
/// run this on its own thread.
pub fn serve(root: &Path, interface: &str, port: u16) -> Result<()> {
    let addr = format!("{interface}:{port}");
    addr.to_socket_addrs().with_context(|| format!("invalid bind address `{addr}`"))?;

    let server = Server::http(&addr).map_err(|e| anyhow::anyhow!("failed to bind `{addr}`: {e}"))?;
    log!("serve"; "listening on http://{addr}");

    for request in server.incoming_requests() {
        let response = handle_request(root, request.url());
        if let Err(e) = request.respond(response) {
            log!("error"; "failed to send response: {e}");
        }
    }
    Ok(())
}

fn handle_request(root: &Path, url: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    let rel = url.trim_start_matches('/');
    let mut path = root.join(if rel.is_empty() { "index.html" } else { rel });
    if path.is_dir() {
        path = path.join("index.html");
    }

    match fs::read(&path) {
        Ok(bytes) => {
            let mime = guess_mime(&path);
            let header = Header::from_bytes(&b"Content-Type"[..], mime.as_bytes()).expect("valid header");
            Response::from_data(bytes).with_header(header)
        }
        Err(_) => Response::from_string("404 Not Found").with_status_code(404),
    }
}

fn guess_mime(path: &PathBuf) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
