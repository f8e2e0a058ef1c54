#![no_main]

use httwisp::chunk::{chunksize, Ext};
use httwisp::Limits;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let limits = Limits::default();
    let mut exts: [Ext; 16] = [Ext { name: "", value: None }; 16];
    let _ = chunksize(data, &limits, &mut exts);
});
