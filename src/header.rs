//! The header collection and the header-block scanner.

use core::str;

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::primitive::{parse_hkey, parse_hval, skip_ws};
use crate::scalar::Status;
use crate::tables::{TCHAR, VCHAR};
use crate::Outcome;

/// All values seen for one header name, in the order they were parsed.
///
/// Values are kept as raw bytes, not `&str` — RFC 7230 field-values admit
/// `obs-text` (0x80-0xFF), which is not guaranteed valid UTF-8. A panicking
/// `.value()` and a fallible-but-lossy-free `.value_raw()` are both offered
/// for this reason.
#[derive(Clone, Copy)]
pub struct HeaderGroup<'a, const V: usize> {
    /// Position of this name among the first-seen distinct header names,
    /// starting at 0.
    pub idx: usize,
    /// The field-name, case-folded to lowercase.
    pub key: &'a str,
    values: [&'a [u8]; V],
    count: usize,
}

impl<'a, const V: usize> HeaderGroup<'a, V> {
    /// All values for this name, in the order they appeared.
    pub fn values_raw(&self) -> &[&'a [u8]] {
        &self.values[..self.count]
    }

    /// All values for this name that happen to be valid UTF-8. A value
    /// containing `obs-text` is silently skipped — use [`Self::values_raw`]
    /// to see every byte.
    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.values_raw().iter().filter_map(|v| str::from_utf8(v).ok())
    }

    /// The first value, raw.
    pub fn value_raw(&self) -> Option<&'a [u8]> {
        self.values_raw().first().copied()
    }

    /// The first value, if valid UTF-8.
    pub fn value(&self) -> Option<&str> {
        self.value_raw().and_then(|v| str::from_utf8(v).ok())
    }

    fn push(&mut self, value: &'a [u8]) -> Result<()> {
        if self.count >= V {
            return Err(Error::HeaderNum);
        }
        self.values[self.count] = value;
        self.count += 1;
        Ok(())
    }
}

/// An ordered multimap from case-folded header name to its sequence of
/// values: a key's ordinal position is fixed at its first occurrence, and
/// later occurrences append rather than displace.
///
/// `N` bounds the number of distinct header names this collection can hold,
/// and `V` bounds the number of values any single name can accumulate. Both
/// are fixed at compile time — this crate never allocates — so size them to
/// your [`Limits::max_header_num`] (or tighter, if you know your workload).
#[derive(Clone, Copy)]
pub struct Headers<'a, const N: usize, const V: usize> {
    groups: [Option<HeaderGroup<'a, V>>; N],
    len: usize,
}

impl<'a, const N: usize, const V: usize> Default for Headers<'a, N, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize, const V: usize> Headers<'a, N, V> {
    /// An empty collection.
    pub fn new() -> Self {
        Headers {
            groups: [None; N],
            len: 0,
        }
    }

    /// Number of distinct header names stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if no header names were stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ordinal access: the `idx`-th distinct header name in first-seen
    /// order.
    pub fn get_ordinal(&self, idx: usize) -> Option<&HeaderGroup<'a, V>> {
        self.groups.get(idx).and_then(|g| g.as_ref())
    }

    /// Case-insensitive keyed access.
    pub fn get(&self, name: &str) -> Option<&HeaderGroup<'a, V>> {
        self.iter().find(|g| g.key.eq_ignore_ascii_case(name))
    }

    /// All distinct header names, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &HeaderGroup<'a, V>> {
        self.groups[..self.len].iter().filter_map(|g| g.as_ref())
    }

    fn insert(&mut self, key: &'a str, value: &'a [u8]) -> Result<()> {
        if let Some(group) = self.groups[..self.len]
            .iter_mut()
            .filter_map(|g| g.as_mut())
            .find(|g| g.key == key)
        {
            return group.push(value);
        }
        if self.len >= N {
            return Err(Error::HeaderNum);
        }
        let idx = self.len;
        self.groups[idx] = Some(HeaderGroup {
            idx,
            key,
            values: [b"" as &[u8]; V],
            count: 0,
        });
        self.len += 1;
        self.groups[idx].as_mut().unwrap().push(value)
    }
}

#[derive(Clone, Copy)]
struct RawEntry {
    key_start: usize,
    key_end: usize,
    val_start: usize,
    val_end: usize,
}

/// Scans a sequence of header lines terminated by a blank line (CRLF or a
/// bare LF), writing the result into `out`.
///
/// Transactional: `out` is left untouched unless the entire block — through
/// the terminating blank line — parses successfully. If any line errors
/// partway through the block, the error is surfaced and nothing has been
/// written to `out`.
///
/// This is the same function `request`/`response` call for the header block
/// after a start-line, so a caller decoding a chunked body's trailer-part
/// can call it directly on the trailer bytes.
pub fn parse_header_block<'a, const N: usize, const V: usize>(
    buf: &'a mut [u8],
    limits: &Limits,
    out: &mut Headers<'a, N, V>,
) -> Result<Outcome<()>> {
    let empty = RawEntry {
        key_start: 0,
        key_end: 0,
        val_start: 0,
        val_end: 0,
    };
    let mut raw = [empty; N];
    let mut n_raw = 0usize;
    let mut pos = 0usize;

    loop {
        match buf.get(pos) {
            None => return Ok(Outcome::Incomplete),
            Some(b'\r') => match buf.get(pos + 1) {
                None => return Ok(Outcome::Incomplete),
                Some(b'\n') => {
                    pos += 2;
                    break;
                }
                Some(_) => return Err(Error::Eol),
            },
            Some(b'\n') => {
                pos += 1;
                break;
            }
            _ => {}
        }

        if n_raw >= limits.max_header_num || n_raw >= N {
            return Err(Error::HeaderNum);
        }

        let (klen, rest_budget, key_consumed) = match parse_hkey(&mut buf[pos..], limits.max_header_len)? {
            Outcome::Incomplete => return Ok(Outcome::Incomplete),
            Outcome::Complete((klen, rest), consumed) => (klen, rest, consumed),
        };
        let key_start = pos;
        let key_end = pos + klen;
        pos += key_consumed;

        let ws = skip_ws(&buf[pos..], rest_budget)?;
        pos += ws;
        let rest_budget = rest_budget - ws;

        let (vlen, val_consumed) = match parse_hval(&buf[pos..], rest_budget)? {
            Outcome::Incomplete => return Ok(Outcome::Incomplete),
            Outcome::Complete(vlen, consumed) => (vlen, consumed),
        };
        let val_start = pos;
        let val_end = pos + vlen;
        pos += val_consumed;

        if vlen > 0 {
            raw[n_raw] = RawEntry {
                key_start,
                key_end,
                val_start,
                val_end,
            };
            n_raw += 1;
            trace!("header accepted: {} bytes name, {} bytes value", klen, vlen);
        } else {
            trace!("header discarded: empty value");
        }
    }

    // All mutation (in-place ASCII case-folding of header names) is done:
    // reborrow the buffer as shared so the resulting key/value slices can
    // live as long as the caller's own `'a` buffer.
    let shared: &'a [u8] = &*buf;

    let mut scratch: Headers<'a, N, V> = Headers::new();
    for entry in &raw[..n_raw] {
        let key = str::from_utf8(&shared[entry.key_start..entry.key_end]).map_err(|_| Error::HeaderName)?;
        let value = &shared[entry.val_start..entry.val_end];
        scratch.insert(key, value)?;
    }

    *out = scratch;
    debug!(
        "header block terminated: {} distinct names, {} bytes consumed",
        scratch.len(),
        pos
    );
    Ok(Outcome::Complete((), pos))
}

/// Validates and case-folds a complete, already-isolated field-name (no
/// trailing colon) in place.
///
/// The standalone counterpart to the block scanner's internal use of
/// [`parse_hkey`], for a caller validating a whole name already in hand —
/// e.g. a trailer name supplied by an application, not sliced out of wire
/// bytes.
pub fn validate_name(buf: &mut [u8], maxlen: usize) -> Result<Status> {
    if buf.is_empty() {
        return Ok(Status::Incomplete);
    }
    if buf.len() > maxlen {
        return Err(Error::HeaderLen);
    }
    for b in buf.iter_mut() {
        let folded = TCHAR[*b as usize];
        if folded <= 1 {
            return Err(Error::HeaderName);
        }
        *b = folded;
    }
    Ok(Status::Valid)
}

/// Validates a complete, already-isolated field-value (no line terminator).
pub fn validate_value(buf: &[u8], maxlen: usize) -> Result<Status> {
    if buf.is_empty() {
        return Ok(Status::Incomplete);
    }
    if buf.len() > maxlen {
        return Err(Error::HeaderLen);
    }
    for &b in buf {
        if VCHAR[b as usize] != 1 {
            return Err(Error::HeaderValue);
        }
    }
    Ok(Status::Valid)
}
