use arnold_log::LogParser;

const FULL_LOG: &str = include_str!("fixtures/render_full.log");

#[test]
fn test_repeated_reports() {
    let input = FULL_LOG.repeat(50);
    let parser = LogParser::new(input);
    assert_eq!(parser.line_count(), FULL_LOG.lines().count() * 50);

    let once = LogParser::new(FULL_LOG);
    assert_eq!(parser.render_info(), once.render_info());
    assert_eq!(parser.memory_stats(), once.memory_stats());
    assert_eq!(parser.render_time(), once.render_time());
    assert_eq!(parser.plugin_info(), once.plugin_info());
    assert_eq!(parser.diagnostics().len(), once.diagnostics().len() * 50);
    assert_eq!(
        parser.texture_stats().missing_textures.len(),
        once.texture_stats().missing_textures.len() * 50
    );
}

#[test]
fn test_very_long_line() {
    let mut input = String::from("00:00:00   245MB         | ");
    input.push_str(&"x".repeat(1_000_000));
    input.push_str(" rendering frame(s): 7\n");
    assert_eq!(LogParser::new(input).render_info().frame_number, "7");
}

#[test]
fn test_arbitrary_bytes_do_not_panic() {
    // Deterministic xorshift so the input is reproducible.
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut bytes = Vec::with_capacity(64 * 1024);
    for _ in 0..64 * 1024 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        bytes.push((state & 0xff) as u8);
    }

    let text = String::from_utf8_lossy(&bytes);
    let summary = LogParser::new(&*text).summarize();
    assert_eq!(summary, LogParser::new(&*text).summarize());
}

#[test]
fn test_only_separators() {
    let parser = LogParser::new("|\n||\n|||\n\r\n\n");
    assert_eq!(parser.line_count(), 5);
    assert!(parser.diagnostics().is_empty());
    assert!(parser.progress_info().is_empty());
}
