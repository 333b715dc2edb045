//! Minimal HTTP/1.1 front door over `tokio::net::TcpListener`.
//!
//! One request per connection (`Connection: close`). Only `Content-Length`
//! bodies are understood, which is what browsers and the editor send.

use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::api::{self, ApiResponse, AppState};
use crate::error::ServerError;

const MAX_HEADER_BYTES: usize = 16 * 1024;
const DRAIN_TIMEOUT: Duration = Duration::from_millis(250);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-connection limits applied while reading a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_body_bytes: usize,
    /// Deadline for the whole request (head and body) to arrive.
    pub read_timeout: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_body_bytes: crate::config::DEFAULT_MAX_BODY_BYTES,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub body: Vec<u8>,
}

/// Read one newline-terminated head line, never buffering more than `budget`
/// bytes. Returns `None` on a clean EOF.
async fn read_head_line<R>(
    reader: &mut BufReader<R>,
    budget: &mut usize,
) -> Result<Option<String>, ServerError>
where
    R: AsyncRead + Unpin,
{
    if *budget == 0 {
        return Err(ServerError::BadRequest("request headers too large".into()));
    }

    let mut bytes = Vec::new();
    let n = (&mut *reader)
        .take(*budget as u64)
        .read_until(b'\n', &mut bytes)
        .await?;
    if n == 0 {
        return Ok(None);
    }
    if bytes.last() != Some(&b'\n') {
        if n == *budget {
            return Err(ServerError::BadRequest("request headers too large".into()));
        }
        return Err(ServerError::BadRequest("request head truncated".into()));
    }
    *budget -= n;

    String::from_utf8(bytes)
        .map(Some)
        .map_err(|_| ServerError::BadRequest("request head is not valid UTF-8".into()))
}

/// Read one request head and its body.
pub async fn read_request<R>(reader: &mut BufReader<R>, max_body: usize) -> Result<Request, ServerError>
where
    R: AsyncRead + Unpin,
{
    let mut budget = MAX_HEADER_BYTES;
    let Some(line) = read_head_line(reader, &mut budget).await? else {
        return Err(ServerError::BadRequest("connection closed before request line".into()));
    };

    let mut parts = line.split_whitespace();
    let (Some(method), Some(path), Some(_version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ServerError::BadRequest(format!(
            "invalid request line '{}'",
            line.trim_end()
        )));
    };
    let method = method.to_ascii_uppercase();
    let path = path.to_string();

    let mut content_length = 0usize;
    loop {
        let Some(line) = read_head_line(reader, &mut budget).await? else {
            return Err(ServerError::BadRequest("headers truncated".into()));
        };

        let header = line.trim_end_matches(['\r', '\n']);
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().map_err(|_| {
                    ServerError::BadRequest(format!("invalid Content-Length '{}'", value.trim()))
                })?;
            }
        }
    }

    if content_length > max_body {
        return Err(ServerError::BodyTooLarge {
            size: content_length,
            limit: max_body,
        });
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await?;

    Ok(Request { method, path, body })
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        408 => "Request Timeout",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Serialize `response` as an HTTP/1.1 message.
pub async fn write_response<W>(writer: &mut W, response: &ApiResponse) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    let body = match &response.body {
        Some(body) => serde_json::to_vec(body)
            .map_err(|e| ServerError::Io(std::io::Error::other(e)))?,
        None => Vec::new(),
    };

    let mut head = format!(
        "HTTP/1.1 {} {}\r\n\
         Access-Control-Allow-Origin: *\r\n\
         Access-Control-Allow-Methods: GET, POST, PATCH, DELETE, OPTIONS\r\n\
         Access-Control-Allow-Headers: Content-Type\r\n\
         Connection: close\r\n\
         Content-Length: {}\r\n",
        response.status,
        reason_phrase(response.status),
        body.len()
    );
    if response.body.is_some() {
        head.push_str("Content-Type: application/json\r\n");
    }
    head.push_str("\r\n");

    writer.write_all(head.as_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

async fn handle_connection(
    mut stream: TcpStream,
    state: &AppState,
    limits: Limits,
) -> Result<(), ServerError> {
    let (read_half, mut write_half) = stream.split();
    let mut reader = BufReader::new(read_half);

    let read = tokio::time::timeout(
        limits.read_timeout,
        read_request(&mut reader, limits.max_body_bytes),
    )
    .await
    .unwrap_or(Err(ServerError::Timeout(limits.read_timeout)));

    let rejection = match read {
        Ok(request) => {
            debug!(method = %request.method, path = %request.path, "request");
            let response =
                api::dispatch(state, &request.method, &request.path, &request.body).await;
            return write_response(&mut write_half, &response).await;
        }
        Err(e @ ServerError::Timeout(_)) => {
            debug!(%e, "closing idle connection");
            write_response(&mut write_half, &ApiResponse::error(408, e.to_string())).await?;
            write_half.shutdown().await?;
            return Ok(());
        }
        Err(e @ ServerError::BodyTooLarge { .. }) => ApiResponse::error(413, e.to_string()),
        Err(e @ ServerError::BadRequest(_)) => ApiResponse::error(400, e.to_string()),
        Err(e) => return Err(e),
    };

    write_response(&mut write_half, &rejection).await?;

    // Unread request bytes would turn our close into a reset that can eat the
    // response on the client side.
    write_half.shutdown().await?;
    let _ = tokio::time::timeout(DRAIN_TIMEOUT, tokio::io::copy(&mut reader, &mut tokio::io::sink())).await;
    Ok(())
}

/// Accept connections until `shutdown` resolves. Each connection is served on
/// its own task.
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    limits: Limits,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()>,
{
    info!(addr = %listener.local_addr()?, "listening");
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutting down");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(%e, "accept failed");
                        continue;
                    }
                };
                let state = state.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, &state, limits).await {
                        debug!(%peer, %e, "connection error");
                    }
                });
            }
        }
    }
}
