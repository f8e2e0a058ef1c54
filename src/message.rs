//! Start-line scanners and the top-level `request`/`response` composites:
//! start-line, optionally followed by a header block.

use core::str;

use crate::error::{Error, Result};
use crate::header::{parse_header_block, Headers};
use crate::limits::Limits;
use crate::primitive::{parse_method, parse_reason, parse_status, parse_version, Method, Version};
use crate::tables::URIC;
use crate::Outcome;

/// A parsed request-line: `method SP request-target SP HTTP-version CRLF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    /// The request method.
    pub method: Method,
    /// The request-target, byte-for-byte — this crate validates `URIC`
    /// membership but does not decode percent-escapes or normalize the
    /// path.
    pub uri: &'a str,
    /// The protocol version.
    pub version: Version,
}

/// A parsed status-line: `HTTP-version SP status-code SP reason-phrase CRLF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response<'a> {
    /// The protocol version.
    pub version: Version,
    /// The 3-digit status code, already range-checked to `[100, 599]`.
    pub status: u16,
    /// The reason-phrase, with trailing whitespace untouched (the grammar
    /// has none to trim — `parse_reason` only trims nothing, it just finds
    /// the terminator).
    pub reason: &'a str,
}

#[derive(Clone, Copy)]
struct RawRequestLine {
    method: Method,
    uri_start: usize,
    uri_end: usize,
    version: Version,
    consumed: usize,
}

#[derive(Clone, Copy)]
struct RawStatusLine {
    version: Version,
    status: u16,
    reason_start: usize,
    reason_end: usize,
    consumed: usize,
}

/// Counts a leading run of bare CR/LF bytes. RFC 7230 §3.5 "robustness":
/// servers must tolerate a stray CRLF left over from a previous message's
/// body before the next request-line. No limit is placed on this run — it
/// ends the moment a non-CR/LF byte is seen, or the buffer runs out.
fn skip_leading_eol(s: &[u8]) -> usize {
    let mut pos = 0;
    while pos < s.len() && matches!(s[pos], b'\r' | b'\n') {
        pos += 1;
    }
    pos
}

/// Scans a request-target up to its terminating SP. Every byte must be
/// `URIC`-valid; `SP` itself is the table's designated terminator value,
/// not an ordinary member, so the `== 0` check never misclassifies it.
fn scan_uri(s: &[u8], maxlen: usize) -> Result<Outcome<usize>> {
    let mut pos = 0;
    while pos < s.len() {
        if pos > maxlen {
            return Err(Error::Len);
        }
        let b = s[pos];
        if URIC[b as usize] == 0 {
            return Err(Error::Msg);
        }
        if b == b' ' {
            return Ok(Outcome::Complete(pos, pos + 1));
        }
        pos += 1;
    }
    if s.len() > maxlen {
        return Err(Error::Len);
    }
    Ok(Outcome::Incomplete)
}

/// Requires a `CRLF` or bare `LF` at `s[0]`. A byte that is neither CR nor
/// LF where a terminator is mandatory is always malformed, never EAGAIN —
/// unlike `parse_reason`/`parse_hval`, there is no preceding field-content
/// run this could still be part of.
fn require_eol(s: &[u8]) -> Result<Outcome<usize>> {
    match s.first() {
        None => Ok(Outcome::Incomplete),
        Some(b'\n') => Ok(Outcome::Complete(1, 1)),
        Some(b'\r') => match s.get(1) {
            Some(b'\n') => Ok(Outcome::Complete(2, 2)),
            Some(_) => Err(Error::Eol),
            None => Ok(Outcome::Incomplete),
        },
        Some(_) => Err(Error::Eol),
    }
}

fn scan_request_line(buf: &[u8], limits: &Limits) -> Result<Outcome<RawRequestLine>> {
    let lead = skip_leading_eol(buf);
    let rest = &buf[lead..];

    let (method, method_len) = match parse_method(rest)? {
        Outcome::Incomplete => return Ok(Outcome::Incomplete),
        Outcome::Complete(m, n) => (m, n),
    };
    let mut pos = method_len;

    let (uri_len, uri_consumed) = match scan_uri(&rest[pos..], limits.max_message_len)? {
        Outcome::Incomplete => return Ok(Outcome::Incomplete),
        Outcome::Complete(len, consumed) => (len, consumed),
    };
    let uri_start = pos;
    let uri_end = pos + uri_len;
    pos += uri_consumed;

    let (version, version_len) = match parse_version(&rest[pos..])? {
        Outcome::Incomplete => return Ok(Outcome::Incomplete),
        Outcome::Complete(v, n) => (v, n),
    };
    pos += version_len;

    let eol_len = match require_eol(&rest[pos..])? {
        Outcome::Incomplete => return Ok(Outcome::Incomplete),
        Outcome::Complete(_, n) => n,
    };
    pos += eol_len;

    trace!("request-line parsed, {} bytes", lead + pos);

    Ok(Outcome::Complete(
        RawRequestLine {
            method,
            uri_start: lead + uri_start,
            uri_end: lead + uri_end,
            version,
            consumed: lead + pos,
        },
        lead + pos,
    ))
}

fn scan_status_line(buf: &[u8], limits: &Limits) -> Result<Outcome<RawStatusLine>> {
    let lead = skip_leading_eol(buf);
    let rest = &buf[lead..];

    let (version, version_len) = match parse_version(rest)? {
        Outcome::Incomplete => return Ok(Outcome::Incomplete),
        Outcome::Complete(v, n) => (v, n),
    };
    let mut pos = version_len;

    match rest.get(pos) {
        None => return Ok(Outcome::Incomplete),
        Some(b' ') => pos += 1,
        Some(_) => return Err(Error::Status),
    }

    let (status, status_len) = match parse_status(&rest[pos..])? {
        Outcome::Incomplete => return Ok(Outcome::Incomplete),
        Outcome::Complete(s, n) => (s, n),
    };
    pos += status_len;

    let reason_start = pos;
    let (reason_len, reason_consumed) = match parse_reason(&rest[pos..], limits.max_message_len)? {
        Outcome::Incomplete => return Ok(Outcome::Incomplete),
        Outcome::Complete(len, consumed) => (len, consumed),
    };
    let reason_end = pos + reason_len;
    pos += reason_consumed;

    trace!("status-line parsed, status={}", status);

    Ok(Outcome::Complete(
        RawStatusLine {
            version,
            status,
            reason_start: lead + reason_start,
            reason_end: lead + reason_end,
            consumed: lead + pos,
        },
        lead + pos,
    ))
}

/// Parses a request: start-line, and — if `headers` is supplied — the
/// header block that follows it.
///
/// Transactional: on `Outcome::Incomplete` neither the returned `Request`
/// nor `headers` reflects any partial progress — `headers` is only mutated
/// by `parse_header_block`'s own transactional commit, which happens at
/// most once, on this call's final success.
pub fn request<'a, const N: usize, const V: usize>(
    buf: &'a mut [u8],
    limits: &Limits,
    headers: Option<&mut Headers<'a, N, V>>,
) -> Result<Outcome<(Request<'a>, usize)>> {
    let raw = match scan_request_line(buf, limits)? {
        Outcome::Incomplete => return Ok(Outcome::Incomplete),
        Outcome::Complete(r, _) => r,
    };

    let (line_buf, rest) = buf.split_at_mut(raw.consumed);
    let uri = str::from_utf8(&line_buf[raw.uri_start..raw.uri_end]).map_err(|_| Error::Msg)?;
    let req = Request {
        method: raw.method,
        uri,
        version: raw.version,
    };

    let Some(headers) = headers else {
        return Ok(Outcome::Complete((req, raw.consumed)));
    };

    match parse_header_block(rest, limits, headers)? {
        Outcome::Incomplete => Ok(Outcome::Incomplete),
        Outcome::Complete((), hdr_len) => {
            debug!("request terminated, {} header(s)", headers.len());
            Ok(Outcome::Complete((req, raw.consumed + hdr_len)))
        }
    }
}

/// Parses a response: status-line, and — if `headers` is supplied — the
/// header block that follows it. Symmetric to [`request`]; see its doc for
/// the transactional contract.
pub fn response<'a, const N: usize, const V: usize>(
    buf: &'a mut [u8],
    limits: &Limits,
    headers: Option<&mut Headers<'a, N, V>>,
) -> Result<Outcome<(Response<'a>, usize)>> {
    let raw = match scan_status_line(buf, limits)? {
        Outcome::Incomplete => return Ok(Outcome::Incomplete),
        Outcome::Complete(r, _) => r,
    };

    let (line_buf, rest) = buf.split_at_mut(raw.consumed);
    let reason =
        str::from_utf8(&line_buf[raw.reason_start..raw.reason_end]).map_err(|_| Error::Msg)?;
    let res = Response {
        version: raw.version,
        status: raw.status,
        reason,
    };

    let Some(headers) = headers else {
        return Ok(Outcome::Complete((res, raw.consumed)));
    };

    match parse_header_block(rest, limits, headers)? {
        Outcome::Incomplete => Ok(Outcome::Incomplete),
        Outcome::Complete((), hdr_len) => {
            debug!("response terminated, {} header(s)", headers.len());
            Ok(Outcome::Complete((res, raw.consumed + hdr_len)))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn request_favicon_scenario() {
        let mut buf = b"GET /favicon.ico HTTP/1.1\r\nHost: a\r\n\r\n".to_vec();
        let total = buf.len();
        let limits = Limits::default();
        let mut headers: Headers<8, 4> = Headers::new();
        let Outcome::Complete((req, consumed)) =
            request(&mut buf, &limits, Some(&mut headers)).unwrap()
        else {
            panic!("expected complete");
        };
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.uri, "/favicon.ico");
        assert_eq!(req.version, Version::Http11);
        assert_eq!(consumed, total);
        let host = headers.get("host").unwrap();
        assert_eq!(host.key, "host");
        assert_eq!(host.value(), Some("a"));
    }

    #[test]
    fn request_without_header_container_stops_after_start_line() {
        let mut buf = b"GET /x HTTP/1.1\r\nHost: a\r\n\r\n".to_vec();
        let limits = Limits::default();
        let Outcome::Complete((req, consumed)) =
            request::<0, 0>(&mut buf, &limits, None).unwrap()
        else {
            panic!("expected complete");
        };
        assert_eq!(req.uri, "/x");
        assert_eq!(consumed, b"GET /x HTTP/1.1\r\n".len());
    }

    #[test]
    fn request_incomplete_header_value_is_eagain() {
        let mut buf = b"GET /x HTTP/1.1\r\nHost:".to_vec();
        let limits = Limits::default();
        let mut headers: Headers<8, 4> = Headers::new();
        assert_eq!(
            request(&mut buf, &limits, Some(&mut headers)).unwrap(),
            Outcome::Incomplete
        );
    }

    #[test]
    fn request_invalid_method_is_emethod() {
        let mut buf = b"INVALID /x HTTP/1.1\r\n\r\n".to_vec();
        let limits = Limits::default();
        assert_eq!(
            request::<0, 0>(&mut buf, &limits, None),
            Err(Error::Method)
        );
    }

    #[test]
    fn response_not_found_scenario() {
        let mut buf = b"HTTP/1.1 404 Not Found\r\n\r\n".to_vec();
        let limits = Limits::default();
        let Outcome::Complete((res, _)) = response::<0, 0>(&mut buf, &limits, None).unwrap()
        else {
            panic!("expected complete");
        };
        assert_eq!(res.version, Version::Http11);
        assert_eq!(res.status, 404);
        assert_eq!(res.reason, "Not Found");
    }

    #[test]
    fn response_status_out_of_class_is_estatus() {
        let mut buf = b"HTTP/1.1 99 x\r\n\r\n".to_vec();
        let limits = Limits::default();
        assert_eq!(
            response::<0, 0>(&mut buf, &limits, None),
            Err(Error::Status)
        );
    }

    #[test]
    fn request_rejects_forbidden_uri_byte() {
        let mut buf = b"GET /a<b HTTP/1.1\r\n\r\n".to_vec();
        let limits = Limits::default();
        assert_eq!(request::<0, 0>(&mut buf, &limits, None), Err(Error::Msg));
    }

    #[test]
    fn uri_length_boundary() {
        let mut limits = Limits::default();
        limits.max_message_len = 8;

        // "/aaaaaaa" is exactly 8 bytes.
        let mut ok = b"GET /aaaaaaa HTTP/1.1\r\n\r\n".to_vec();
        let Outcome::Complete((req, _)) = request::<0, 0>(&mut ok, &limits, None).unwrap() else {
            panic!("expected complete at the exact max_message_len");
        };
        assert_eq!(req.uri.len(), 8);

        // "/aaaaaaaa" is 9 bytes, one over the limit.
        let mut over = b"GET /aaaaaaaa HTTP/1.1\r\n\r\n".to_vec();
        assert_eq!(request::<0, 0>(&mut over, &limits, None), Err(Error::Len));
    }

    #[test]
    fn truncation_is_idempotent_up_to_completion() {
        let full = b"GET /x HTTP/1.1\r\nHost: example.com\r\n\r\n";
        for cut in 0..full.len() {
            let mut buf = full[..cut].to_vec();
            let limits = Limits::default();
            let mut headers: Headers<8, 4> = Headers::new();
            match request(&mut buf, &limits, Some(&mut headers)) {
                Ok(Outcome::Incomplete) => {}
                Ok(Outcome::Complete((_, consumed))) => assert!(consumed <= cut),
                Err(_) => panic!("prefix of a valid message must never be a terminal error (cut={cut})"),
            }
        }
        let mut buf = full.to_vec();
        let limits = Limits::default();
        let mut headers: Headers<8, 4> = Headers::new();
        let Outcome::Complete((_, consumed)) =
            request(&mut buf, &limits, Some(&mut headers)).unwrap()
        else {
            panic!("expected complete on the full message");
        };
        assert_eq!(consumed, full.len());
    }
}
