/// Upper bounds applied while scanning a message.
///
/// A single `Copy` struct threaded through the scanners instead of four
/// separate optional arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Upper bound on request-target length and reason-phrase length.
    pub max_message_len: usize,
    /// Upper bound on a single header line (name + value).
    ///
    /// Default of 4108 admits a full RFC 6265 `Set-Cookie` header:
    /// `"Set-Cookie: "` (12 bytes) plus 4096 bytes of cookie value.
    pub max_header_len: usize,
    /// Upper bound on the number of headers in one block.
    pub max_header_num: usize,
    /// Upper bound on a single parsed scalar (quoted-string, chunk
    /// extension, parameter name or value).
    pub max_scalar_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_message_len: 2048,
            max_header_len: 4108,
            max_header_num: 255,
            max_scalar_len: 4096,
        }
    }
}
