//! Chunk framing: `chunk-size [ chunk-ext ] CRLF` (RFC 7230 §4.1).
//!
//! Decoding the chunk *data* that follows — copying `chunk-size` bytes of
//! body out of the stream — is a transport-loop concern the caller already
//! owns once it knows the size; this module only finds where one chunk's
//! frame ends and the data begins.

use core::str;

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::primitive::{hex2size, skip_ws};
use crate::scalar::scan_quoted_string;
use crate::util::token_run;
use crate::Outcome;

/// One `chunk-ext-name [ "=" chunk-ext-val ]` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ext<'a> {
    /// The extension name, byte-for-byte as it appeared on the wire — chunk
    /// extensions are not case-folded the way header names are.
    pub name: &'a str,
    /// The extension value, if one was given. `token` values are the raw
    /// slice; `quoted-string` values keep their surrounding DQUOTEs and any
    /// backslash escapes, since unescaping would require a scratch buffer
    /// this no-alloc crate does not have — unescape with
    /// [`crate::scalar::quoted_string`]'s sibling logic if you need the
    /// content value.
    pub value: Option<&'a [u8]>,
}

const EMPTY_EXT: Ext<'static> = Ext {
    name: "",
    value: None,
};

/// Scans one chunk-size line: the hex size, any chunk extensions (written
/// into `exts`), and the line's terminating CRLF.
///
/// Returns the decoded size and the number of extensions found. `exts` is
/// left untouched unless the whole line, through its terminator, parses
/// successfully — the same transactional guarantee
/// [`crate::header::parse_header_block`] makes for a header block.
pub fn chunksize<'a, const E: usize>(
    buf: &'a [u8],
    limits: &Limits,
    exts: &mut [Ext<'a>; E],
) -> Result<Outcome<(u32, usize)>> {
    let (size, mut pos) = match hex2size(buf)? {
        Outcome::Incomplete => return Ok(Outcome::Incomplete),
        Outcome::Complete(size, consumed) => (size, consumed),
    };

    let mut scratch = [EMPTY_EXT; E];
    let mut n = 0usize;

    loop {
        // The line terminator is checked before any whitespace is skipped:
        // "bad" whitespace is only tolerated around `;` and `=`, never as
        // unconditional filler right before CRLF.
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
            _ => {
                pos += skip_ws(&buf[pos..], limits.max_scalar_len)?;
                match buf.get(pos) {
                    None => return Ok(Outcome::Incomplete),
                    Some(b';') => pos += 1,
                    Some(_) => return Err(Error::IllegalSequence),
                }
            }
        }
        pos += skip_ws(&buf[pos..], limits.max_scalar_len)?;

        if n >= E {
            return Err(Error::Len);
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

        let mut value: Option<&'a [u8]> = None;
        // Peek past any BWS without committing to it: only an `=` justifies
        // consuming it, so a name followed by whitespace-then-CR (no `=`)
        // leaves `pos` right after the name for the terminator check above.
        let ws = skip_ws(&buf[pos..], limits.max_scalar_len)?;
        if buf.get(pos + ws) == Some(&b'=') {
            pos += ws + 1;
            pos += skip_ws(&buf[pos..], limits.max_scalar_len)?;
            match buf.get(pos) {
                None => return Ok(Outcome::Incomplete),
                Some(b'"') => match scan_quoted_string(&buf[pos..], limits.max_scalar_len)? {
                    Outcome::Incomplete => return Ok(Outcome::Incomplete),
                    Outcome::Complete(_, consumed) => {
                        value = Some(&buf[pos..pos + consumed]);
                        pos += consumed;
                    }
                },
                _ => {
                    let vlen = token_run(&buf[pos..]);
                    if vlen == 0 {
                        return Err(Error::Empty);
                    }
                    if vlen > limits.max_scalar_len {
                        return Err(Error::Len);
                    }
                    value = Some(&buf[pos..pos + vlen]);
                    pos += vlen;
                }
            }
        }

        trace!("chunk extension parsed: {} = {:?}", name, value);
        scratch[n] = Ext { name, value };
        n += 1;
    }

    *exts = scratch;
    debug!("chunk-size line terminated: size={:#x}, {} extensions, {} bytes consumed", size, n, pos);
    Ok(Outcome::Complete((size, n), pos))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn plain_chunk_size() {
        let limits = Limits::default();
        let mut exts: [Ext; 4] = [EMPTY_EXT; 4];
        let Outcome::Complete((size, n), consumed) = chunksize(b"1a\r\nrest", &limits, &mut exts).unwrap() else {
            panic!("expected complete");
        };
        assert_eq!(size, 0x1a);
        assert_eq!(n, 0);
        assert_eq!(consumed, 4);
    }

    #[test]
    fn chunk_size_with_token_extension() {
        let limits = Limits::default();
        let mut exts: [Ext; 4] = [EMPTY_EXT; 4];
        let Outcome::Complete((size, n), _) = chunksize(b"4;name=value\r\n", &limits, &mut exts).unwrap() else {
            panic!("expected complete");
        };
        assert_eq!(size, 4);
        assert_eq!(n, 1);
        assert_eq!(exts[0].name, "name");
        assert_eq!(exts[0].value, Some(b"value".as_slice()));
    }

    #[test]
    fn chunk_size_with_quoted_extension_and_bare_flag() {
        let limits = Limits::default();
        let mut exts: [Ext; 4] = [EMPTY_EXT; 4];
        let Outcome::Complete((size, n), _) =
            chunksize(b"0;flag;msg=\"hi there\"\r\n", &limits, &mut exts).unwrap()
        else {
            panic!("expected complete");
        };
        assert_eq!(size, 0);
        assert_eq!(n, 2);
        assert_eq!(exts[0].name, "flag");
        assert_eq!(exts[0].value, None);
        assert_eq!(exts[1].name, "msg");
        assert_eq!(exts[1].value, Some(b"\"hi there\"".as_slice()));
    }

    #[test]
    fn incomplete_chunk_line() {
        let limits = Limits::default();
        let mut exts: [Ext; 4] = [EMPTY_EXT; 4];
        assert_eq!(chunksize(b"4;na", &limits, &mut exts).unwrap(), Outcome::Incomplete);
        assert_eq!(chunksize(b"", &limits, &mut exts).unwrap(), Outcome::Incomplete);
    }

    #[test]
    fn too_many_extensions_is_rejected() {
        let limits = Limits::default();
        let mut exts: [Ext; 1] = [EMPTY_EXT; 1];
        assert!(chunksize(b"0;a;b\r\n", &limits, &mut exts).is_err());
    }

    #[test]
    fn bad_whitespace_around_semicolon_and_equals_is_tolerated() {
        // Whitespace around `;` and `=` in chunk extensions is tolerated.
        let limits = Limits::default();
        let mut exts: [Ext; 4] = [EMPTY_EXT; 4];
        let Outcome::Complete((size, n), _) =
            chunksize(b"10 ; foo=bar ; baz=\"q\\\"x\"\r\n", &limits, &mut exts).unwrap()
        else {
            panic!("expected complete");
        };
        assert_eq!(size, 0x10);
        assert_eq!(n, 2);
        assert_eq!(exts[0].name, "foo");
        assert_eq!(exts[0].value, Some(b"bar".as_slice()));
        assert_eq!(exts[1].name, "baz");
        assert_eq!(exts[1].value, Some(b"\"q\\\"x\"".as_slice()));
    }

    #[test]
    fn chunk_size_with_no_extensions_scenario_six() {
        // A chunk-size line with no extensions.
        let limits = Limits::default();
        let mut exts: [Ext; 4] = [EMPTY_EXT; 4];
        let Outcome::Complete((size, n), consumed) =
            chunksize(b"1a\r\n", &limits, &mut exts).unwrap()
        else {
            panic!("expected complete");
        };
        assert_eq!(size, 26);
        assert_eq!(consumed, 4);
        assert_eq!(n, 0);
    }

    #[test]
    fn max_hex_digits_and_range_boundary() {
        let limits = Limits::default();
        let mut exts: [Ext; 1] = [EMPTY_EXT; 1];
        assert_eq!(
            chunksize(b"ffffffff\r\n", &limits, &mut exts).unwrap(),
            Outcome::Complete((0xFFFFFFFF, 0), 10)
        );
        assert!(chunksize(b"fffffffff\r\n", &limits, &mut exts).is_err());
    }

    #[test]
    fn bad_whitespace_before_terminator_is_rejected() {
        let limits = Limits::default();
        let mut exts: [Ext; 4] = [EMPTY_EXT; 4];
        assert!(chunksize(b"1a \r\n", &limits, &mut exts).is_err());
    }

    #[test]
    fn bad_whitespace_after_extension_name_with_no_value_is_rejected() {
        let limits = Limits::default();
        let mut exts: [Ext; 4] = [EMPTY_EXT; 4];
        assert!(chunksize(b"4;a \r\n", &limits, &mut exts).is_err());
    }
}
