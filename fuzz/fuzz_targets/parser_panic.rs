#![no_main]
use arnold_log::{Group, LogParser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Lossy decoding keeps inputs that are mostly text, which is where the
    // pattern tables do their work.
    let text = String::from_utf8_lossy(data);
    let parser = LogParser::new(&*text);
    let summary = parser.summarize();
    assert_eq!(summary, parser.summarize());
    for group in Group::ALL {
        let _ = parser.extract(group);
    }
});
