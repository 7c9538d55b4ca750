//! HTTP/1.1 text form of requests and responses.
//!
//! Requests are only ever encoded (their bytes feed the cache fingerprint).
//! Responses round-trip: the full status line, headers and body are stored so
//! a cache hit can be replayed exactly as the provider sent it.

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{HOST, HeaderMap, HeaderName, HeaderValue};

use imgmux_core::Error;

use crate::providers::ProviderError;

const CRLF: &[u8] = b"\r\n";
const HEAD_END: &[u8] = b"\r\n\r\n";

/// Canonical wire form of an outbound request.
///
/// Headers are written sorted by name and then value, so two requests that
/// differ only in header insertion order encode identically.
pub fn encode_request(request: &reqwest::Request) -> Vec<u8> {
    let url = request.url();
    let target = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };
    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };

    let mut out = Vec::with_capacity(256);
    out.extend_from_slice(format!("{} {} HTTP/1.1", request.method(), target).as_bytes());
    out.extend_from_slice(CRLF);
    out.extend_from_slice(format!("Host: {host}").as_bytes());
    out.extend_from_slice(CRLF);

    let mut headers: Vec<(&str, &[u8])> = request
        .headers()
        .iter()
        .filter(|(name, _)| **name != HOST)
        .map(|(name, value)| (name.as_str(), value.as_bytes()))
        .collect();
    headers.sort_unstable();
    write_headers(&mut out, headers);

    out.extend_from_slice(CRLF);
    if let Some(body) = request.body().and_then(|body| body.as_bytes()) {
        out.extend_from_slice(body);
    }
    out
}

fn write_headers<'a>(out: &mut Vec<u8>, headers: impl IntoIterator<Item = (&'a str, &'a [u8])>) {
    for (name, value) in headers {
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value);
        out.extend_from_slice(CRLF);
    }
}

/// A fully-read upstream response, live or replayed from the cache.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    /// Drain a live reqwest response.
    pub async fn read(response: reqwest::Response) -> Result<Self, ProviderError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Self { status, headers, body })
    }

    /// Encode as `HTTP/1.1 <code> <reason>`, header lines, blank line, body.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.body.len() + 512);
        let reason = self.status.canonical_reason().unwrap_or("");
        out.extend_from_slice(format!("HTTP/1.1 {} {}", self.status.as_u16(), reason).as_bytes());
        out.extend_from_slice(CRLF);
        write_headers(&mut out, self.headers.iter().map(|(name, value)| (name.as_str(), value.as_bytes())));
        out.extend_from_slice(CRLF);
        out.extend_from_slice(&self.body);
        out
    }

    /// Decode bytes produced by [`RawResponse::to_wire`].
    pub fn from_wire(raw: &[u8]) -> Result<Self, Error> {
        let split = raw
            .windows(HEAD_END.len())
            .position(|window| window == HEAD_END)
            .ok_or_else(|| Error::Wire("missing end of headers".into()))?;
        let head = &raw[..split];
        let body = Bytes::copy_from_slice(&raw[split + HEAD_END.len()..]);

        let mut lines = head.split(|b| *b == b'\n').map(|line| line.strip_suffix(b"\r").unwrap_or(line));
        let status = parse_status_line(lines.next().unwrap_or_default())?;

        let mut headers = HeaderMap::new();
        for line in lines {
            let colon = line
                .iter()
                .position(|b| *b == b':')
                .ok_or_else(|| Error::Wire("header line without colon".into()))?;
            let name = HeaderName::from_bytes(&line[..colon]).map_err(|e| Error::Wire(e.to_string()))?;
            let value = HeaderValue::from_bytes(line[colon + 1..].trim_ascii_start())
                .map_err(|e| Error::Wire(e.to_string()))?;
            headers.append(name, value);
        }

        Ok(Self { status, headers, body })
    }
}

fn parse_status_line(line: &[u8]) -> Result<StatusCode, Error> {
    let line = std::str::from_utf8(line).map_err(|e| Error::Wire(e.to_string()))?;
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some(version) if version.starts_with("HTTP/") => {}
        _ => return Err(Error::Wire(format!("bad status line: {line}"))),
    }
    let code = parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| Error::Wire(format!("bad status code: {line}")))?;
    StatusCode::from_u16(code).map_err(|e| Error::Wire(e.to_string()))
}
