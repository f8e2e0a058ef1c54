#![no_main]

use httwisp::params::Param;
use httwisp::{parameters, Limits};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let limits = Limits::default();
    let mut out: [Option<Param>; 16] = [None; 16];
    let _ = parameters(data, &limits, &mut out);
});
