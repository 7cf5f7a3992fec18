//! SR-OS classic CLI dialect profile for `sros_ir`.
//!
//! This crate customizes:
//! - comment classification (`#` lines and `echo "..."` section banners)
//! - line tokenization that keeps quoted names such as `"to-core 1"` whole
//!
//! # Example
//!
//! ```rust
//! use sros_dialect_classic::scan_classic;
//!
//! let cfg = "echo \"Service Configuration\"\n    service\n        customer 1 create\n        exit\n    exit\n";
//! let scanned = scan_classic(cfg);
//! assert_eq!(scanned.render(), cfg);
//! ```

use sros_ir::{Dialect, DialectHint, ParsedLineParts, ScannedConfig, TriviaKind, scan_with_dialect};

/// Dialect implementation for SR-OS classic CLI configuration text.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassicCliDialect;

/// Scan text using [`ClassicCliDialect`].
pub fn scan_classic(input: &str) -> ScannedConfig {
    scan_with_dialect(input, &ClassicCliDialect)
}

impl Dialect for ClassicCliDialect {
    fn dialect_hint(&self) -> DialectHint {
        DialectHint::Named("sros-classic".to_string())
    }

    fn classify_trivia(&self, raw: &str) -> TriviaKind {
        classify_classic_trivia(raw)
    }

    fn parse_parts(&self, raw: &str) -> Option<ParsedLineParts> {
        parse_classic_parts(raw)
    }
}

fn classify_classic_trivia(raw: &str) -> TriviaKind {
    if raw.trim().is_empty() {
        return TriviaKind::Blank;
    }

    let trimmed = raw.trim_start();
    if trimmed.starts_with('#') || trimmed == "echo" || trimmed.starts_with("echo ") {
        return TriviaKind::Comment;
    }

    TriviaKind::Content
}

fn parse_classic_parts(raw: &str) -> Option<ParsedLineParts> {
    let tokens = tokenize_classic(raw);
    let head = tokens.first()?.clone();
    let args = tokens.into_iter().skip(1).collect::<Vec<_>>();
    Some(ParsedLineParts { head, args })
}

fn tokenize_classic(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;

    for ch in raw.chars() {
        if in_quote {
            current.push(ch);
            if ch == '"' {
                in_quote = false;
            }
            continue;
        }

        match ch {
            '"' => {
                current.push(ch);
                in_quote = true;
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
