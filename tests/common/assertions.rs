/// Assert that parsing succeeds
pub fn assert_parses(source: &str) {
    if let Err(e) = ctxfix_parser::parse(source) {
        panic!("Expected source to parse successfully: {}\n{}", e, source);
    }
}

/// Assert that `text` contains `needle`, showing the text on failure
pub fn assert_contains(text: &str, needle: &str) {
    assert!(
        text.contains(needle),
        "Expected to find {:?} in:\n{}",
        needle,
        text
    );
}

pub fn assert_count(text: &str, needle: &str, expected: usize) {
    assert_eq!(
        text.matches(needle).count(),
        expected,
        "Expected {} occurrences of {:?} in:\n{}",
        expected,
        needle,
        text
    );
}
