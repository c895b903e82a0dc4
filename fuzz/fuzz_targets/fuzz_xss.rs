#![no_main]
use injectionscan::is_xss;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = is_xss(data);
});
