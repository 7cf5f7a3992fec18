use thiserror::Error;

/// Input the parser cannot read at all.
///
/// Malformed configuration text never produces an error; missing sections
/// only leave fields empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("input is not UTF-8 text (first invalid byte at offset {valid_up_to})")]
    NotText { valid_up_to: usize },
}
