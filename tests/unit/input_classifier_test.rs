//! Address-bar input classification cases.

use noxx::services::input_classifier::{classify, is_url_like, search_url, ClassifiedInput};
use rstest::rstest;

const GOOGLE: &str = "https://www.google.com/search?q={query}";

#[rstest]
#[case("github.com", "https://github.com")]
#[case("example.com/path", "https://example.com/path")]
#[case("docs.rust-lang.org/std/", "https://docs.rust-lang.org/std/")]
#[case("  rust-lang.org  ", "https://rust-lang.org")]
fn url_like_input_gets_https(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(
        classify(input, GOOGLE),
        Some(ClassifiedInput::UrlLike(expected.to_string()))
    );
}

#[rstest]
#[case("https://example.com/a?b=c")]
#[case("http://example.com")]
#[case("file:///tmp/index.html")]
#[case("about:blank")]
fn absolute_urls_are_kept_as_typed(#[case] input: &str) {
    assert_eq!(classify(input, GOOGLE), Some(ClassifiedInput::Url(input.to_string())));
}

#[rstest]
#[case("noxx://homepage")]
#[case("noxx://settings")]
fn internal_locations_pass_through(#[case] input: &str) {
    assert_eq!(
        classify(input, GOOGLE),
        Some(ClassifiedInput::Internal(input.to_string()))
    );
}

#[rstest]
#[case("openai com", "https://www.google.com/search?q=openai+com")]
#[case("rust", "https://www.google.com/search?q=rust")]
#[case("a.com", "https://www.google.com/search?q=a.com")]
#[case("what is 1+1?", "https://www.google.com/search?q=what+is+1%2B1%3F")]
#[case("example.c0m", "https://www.google.com/search?q=example.c0m")]
fn free_text_becomes_search(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(
        classify(input, GOOGLE),
        Some(ClassifiedInput::Search(expected.to_string()))
    );
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\t\n")]
fn blank_input_is_rejected(#[case] input: &str) {
    assert_eq!(classify(input, GOOGLE), None);
}

#[test]
fn host_with_port_is_kept() {
    assert_eq!(
        classify("localhost:3000", GOOGLE).map(ClassifiedInput::into_url),
        Some("https://localhost:3000".to_string())
    );
}

#[test]
fn search_template_without_placeholder_appends_query() {
    assert_eq!(
        search_url("rust book", "https://search.example.com/?q="),
        "https://search.example.com/?q=rust+book"
    );
    assert_eq!(
        search_url("rust book", "https://duckduckgo.com/?q={query}&ia=web"),
        "https://duckduckgo.com/?q=rust+book&ia=web"
    );
}

#[rstest]
#[case("example.com", true)]
#[case("sub.example.co.uk/path", true)]
#[case("example.com:8080", true)]
#[case("exa mple.com", false)]
#[case("-bad.example.com", false)]
#[case("example", false)]
#[case("example.com:port", false)]
fn url_like_heuristic(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(is_url_like(input), expected);
}

#[test]
fn classified_url_accessor() {
    let c = classify("github.com", GOOGLE).unwrap();
    assert_eq!(c.url(), "https://github.com");
}
