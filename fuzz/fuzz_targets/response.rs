#![no_main]

use httwisp::{response, Headers, Limits};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut buf = data.to_vec();
    let limits = Limits::default();
    let mut headers: Headers<64, 8> = Headers::new();
    let _ = response(&mut buf, &limits, Some(&mut headers));
});
