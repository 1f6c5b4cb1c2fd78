//! Address-bar input classification.
//!
//! Raw input is one of: an internal `noxx://` location, an absolute URL, a
//! URL-like string missing its scheme (`example.com/path`), or free text that
//! becomes a search query.

use url::form_urlencoded;
use url::Url;

use crate::types::tab::INTERNAL_SCHEME;

/// Schemes loaded exactly as typed.
const KNOWN_SCHEMES: [&str; 6] = ["http", "https", "file", "about", "data", "noxx"];

/// What the input turned out to be, with the location to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedInput {
    Internal(String),
    Url(String),
    UrlLike(String),
    Search(String),
}

impl ClassifiedInput {
    pub fn url(&self) -> &str {
        match self {
            ClassifiedInput::Internal(u)
            | ClassifiedInput::Url(u)
            | ClassifiedInput::UrlLike(u)
            | ClassifiedInput::Search(u) => u,
        }
    }

    pub fn into_url(self) -> String {
        match self {
            ClassifiedInput::Internal(u)
            | ClassifiedInput::Url(u)
            | ClassifiedInput::UrlLike(u)
            | ClassifiedInput::Search(u) => u,
        }
    }
}

/// Classifies `input`. Returns `None` for blank input.
pub fn classify(input: &str, search_template: &str) -> Option<ClassifiedInput> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with(INTERNAL_SCHEME) {
        return Some(ClassifiedInput::Internal(trimmed.to_string()));
    }

    if !trimmed.contains(char::is_whitespace) {
        if let Ok(parsed) = Url::parse(trimmed) {
            if KNOWN_SCHEMES.contains(&parsed.scheme()) {
                return Some(ClassifiedInput::Url(trimmed.to_string()));
            }
            // `localhost:3000` parses with scheme "localhost"; treat it as a host.
            let prefixed = format!("https://{}", trimmed);
            if Url::parse(&prefixed).is_ok() {
                return Some(ClassifiedInput::Url(prefixed));
            }
        }
    }

    if is_url_like(trimmed) {
        return Some(ClassifiedInput::UrlLike(format!("https://{}", trimmed)));
    }

    Some(ClassifiedInput::Search(search_url(trimmed, search_template)))
}

/// Builds a search url from a template with a `{query}` placeholder. A
/// template without the placeholder gets the query appended.
pub fn search_url(query: &str, template: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
    if template.contains("{query}") {
        template.replace("{query}", &encoded)
    } else {
        format!("{}{}", template, encoded)
    }
}

/// Dotted host of valid labels with an alphabetic TLD, optionally followed by
/// a path, with no whitespace anywhere.
pub fn is_url_like(input: &str) -> bool {
    if input.len() <= 5 || input.contains(char::is_whitespace) {
        return false;
    }
    let (host_port, _path) = match input.find('/') {
        Some(i) => input.split_at(i),
        None => (input, ""),
    };
    let host = match host_port.rsplit_once(':') {
        Some((h, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => h,
        Some(_) => return false,
        None => host_port,
    };

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let valid_label = |l: &&str| {
        !l.is_empty()
            && l.len() <= 63
            && !l.starts_with('-')
            && !l.ends_with('-')
            && l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };
    if !labels.iter().all(valid_label) {
        return false;
    }
    labels
        .last()
        .map(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(false)
}
