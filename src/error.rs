use core::fmt;

/// A terminal parse failure.
///
/// "Need more bytes" is deliberately not a member of this enum — see
/// [`crate::Outcome`]. Every variant here is final for the current message;
/// a well-behaved caller drops the connection or resyncs rather than
/// retrying the same call with the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Invalid start-line (e.g. a URI byte outside the `URIC` table, or an
    /// invalid byte in a reason-phrase).
    Msg,
    /// A length limit ([`crate::Limits`]) was exceeded.
    Len,
    /// The request method is not one of the eight implemented methods.
    Method,
    /// The HTTP version is neither `HTTP/1.0` nor `HTTP/1.1`.
    Version,
    /// A CR was not followed by LF.
    Eol,
    /// Invalid byte in a header field-name, or an empty field-name.
    HeaderName,
    /// Invalid byte in a header field-value.
    HeaderValue,
    /// A header line exceeded [`crate::Limits::max_header_len`].
    HeaderLen,
    /// More headers than [`crate::Limits::max_header_num`] in one block.
    HeaderNum,
    /// Malformed status code.
    Status,
    /// Illegal byte sequence in a scalar grammar (quoted-string, chunk
    /// extension, parameter).
    IllegalSequence,
    /// A numeric result (chunk-size) exceeded its representable range.
    Range,
    /// A production that must not be empty was empty (e.g. a chunk
    /// extension name after `;`).
    Empty,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Error::Msg => "invalid start-line",
            Error::Len => "length limit exceeded",
            Error::Method => "method not implemented",
            Error::Version => "unsupported http version",
            Error::Eol => "invalid line terminator",
            Error::HeaderName => "invalid header field-name",
            Error::HeaderValue => "invalid header field-value",
            Error::HeaderLen => "header line too long",
            Error::HeaderNum => "too many headers",
            Error::Status => "malformed status code",
            Error::IllegalSequence => "illegal byte sequence",
            Error::Range => "numeric result out of range",
            Error::Empty => "disallowed empty production",
        };
        write!(f, "{}", s)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// The result of every scanner in this crate.
pub type Result<T> = core::result::Result<T, Error>;
