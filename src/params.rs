//! The `parameter` grammar shared by `Content-Type`, `Accept`, and similar
//! headers: `*( OWS ";" OWS token "=" ( token / quoted-string ) )`.
//!
//! Unlike [`crate::header::parse_header_block`] or [`crate::chunk::chunksize`],
//! this is a whole-slice operation like the validators in [`crate::scalar`]:
//! it expects the complete parameter-list bytes already in hand (e.g. the
//! tail of an already fully-received header value), not a prefix of a
//! longer stream. The grammar is `*(...)`, zero or more, so an empty slice
//! is a valid empty list rather than [`crate::scalar::Status::Incomplete`].
//!
//! This does not report "need more bytes" the way the streaming scanners
//! do: by the time a caller has a parameter-list slice to hand to this
//! function, [`crate::header::parse_header_block`] has already committed
//! the complete header value it was sliced from — there is no partial
//! value this function could be asked to resume. A quoted-string that
//! never closes before the slice ends is therefore a grammar violation
//! ([`Error::IllegalSequence`]), not a request for more bytes.

use core::str;

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::primitive::skip_ws;
use crate::scalar::scan_quoted_string;
use crate::util::token_run;
use crate::Outcome;

/// One `name=value` pair. A repeated name overwrites the earlier value;
/// last one wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Param<'a> {
    /// The parameter name, byte-for-byte as it appeared on the wire.
    pub name: &'a str,
    /// The parameter value. `token` values are the raw slice; `quoted-string`
    /// values keep their surrounding DQUOTEs and escapes — see
    /// [`crate::chunk::Ext::value`] for the same tradeoff.
    pub value: &'a [u8],
}

const EMPTY_PARAM: Option<Param<'static>> = None;

/// Parses a complete parameter-list, writing the result into `out`.
///
/// Returns the number of distinct names found. Duplicate names collapse to
/// their last value but keep their first-seen position in `out`, matching
/// [`crate::header::Headers`]'s ordinal convention.
pub fn parameters<'a, const N: usize>(
    buf: &'a [u8],
    limits: &Limits,
    out: &mut [Option<Param<'a>>; N],
) -> Result<usize> {
    let mut scratch = [EMPTY_PARAM; N];
    let mut n = 0usize;
    let mut pos = 0usize;

    loop {
        pos += skip_ws(&buf[pos..], limits.max_scalar_len)?;
        if pos >= buf.len() {
            break;
        }

        let name_len = token_run(&buf[pos..]);
        if name_len == 0 {
            return Err(Error::Empty);
        }
        if name_len > limits.max_scalar_len {
            return Err(Error::Len);
        }
        let name = str::from_utf8(&buf[pos..pos + name_len]).map_err(|_| Error::IllegalSequence)?;
        pos += name_len;

        // No whitespace, not even "bad" whitespace, is tolerated around `=`.
        if buf.get(pos) != Some(&b'=') {
            return Err(Error::IllegalSequence);
        }
        pos += 1;

        let value: &'a [u8] = match buf.get(pos) {
            Some(b'"') => match scan_quoted_string(&buf[pos..], limits.max_scalar_len)? {
                Outcome::Complete(_, consumed) => {
                    let v = &buf[pos..pos + consumed];
                    pos += consumed;
                    v
                }
                Outcome::Incomplete => return Err(Error::IllegalSequence),
            },
            _ => {
                let vlen = token_run(&buf[pos..]);
                if vlen == 0 {
                    return Err(Error::Empty);
                }
                if vlen > limits.max_scalar_len {
                    return Err(Error::Len);
                }
                let v = &buf[pos..pos + vlen];
                pos += vlen;
                v
            }
        };

        if let Some(existing) = scratch[..n].iter_mut().flatten().find(|p| p.name == name) {
            existing.value = value;
        } else {
            if n >= N {
                return Err(Error::Len);
            }
            scratch[n] = Some(Param { name, value });
            n += 1;
        }

        // Trailing OWS before the next `;` or the end of the list.
        pos += skip_ws(&buf[pos..], limits.max_scalar_len)?;
        match buf.get(pos) {
            None => break,
            Some(b';') => pos += 1,
            Some(_) => return Err(Error::IllegalSequence),
        }
    }

    *out = scratch;
    Ok(n)
}
