//! Lossless line scanner and block extractor for `exit`-delimited configuration text.
//!
//! This crate provides:
//! - a line classifier (`scan_generic`, `scan_with_dialect`) producing [`Line`] records
//! - an indentation-aware block extractor ([`extract_block`])
//! - a lossless renderer (`ScannedConfig::render`)
//!
//! Block boundaries are decided by indentation, never by keyword matching:
//! - a block closes on an `exit` line at the opener's indentation
//! - a non-blank line indented less than the opener closes it implicitly
//! - running out of input closes whatever is open
//!
//! # Example
//!
//! ```rust
//! use sros_ir::{BlockClose, extract_block, scan_generic};
//!
//! let input = "epipe 10 customer 1 create\n    description \"x\"\nexit\n";
//! let scanned = scan_generic(input);
//! let block = extract_block(&scanned.lines, 0).expect("opener exists");
//! assert_eq!(block.end, 2);
//! assert_eq!(block.close, BlockClose::Exit);
//! assert_eq!(scanned.render(), input);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Source span pointing to a single line and byte range in the original input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub line: usize,
    pub start_byte: usize,
    pub end_byte: usize,
}

/// Minimal tokenized representation of a content line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLineParts {
    pub head: String,
    pub args: Vec<String>,
}

impl ParsedLineParts {
    /// Argument at `idx` with surrounding double quotes removed.
    pub fn arg_unquoted(&self, idx: usize) -> Option<&str> {
        self.args.get(idx).map(|arg| unquote(arg))
    }
}

/// Lightweight trivia classification reported by a [`Dialect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriviaKind {
    Blank,
    Comment,
    Content,
    Unknown,
}

/// Structural role of a line inside the block grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineKind {
    Blank,
    Comment,
    /// Content line whose next content line is more indented.
    Opener,
    /// Single-line content inside (or outside) a block.
    Attribute,
    /// Block terminator (`exit`).
    Close,
}

impl LineKind {
    /// Blank and comment lines never open or close a block.
    pub fn is_trivia(self) -> bool {
        matches!(self, LineKind::Blank | LineKind::Comment)
    }
}

/// One scanned input line with its raw text and classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub raw: String,
    pub line_ending: String,
    pub span: Span,
    pub indent: usize,
    pub trivia: TriviaKind,
    pub kind: LineKind,
    pub parsed: Option<ParsedLineParts>,
}

impl Line {
    /// Raw text without surrounding whitespace.
    pub fn trimmed(&self) -> &str {
        self.raw.trim()
    }

    /// First token of a content line.
    pub fn head(&self) -> Option<&str> {
        self.parsed.as_ref().map(|parts| parts.head.as_str())
    }
}

/// Declared dialect used for a scan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DialectHint {
    #[default]
    Generic,
    Unknown,
    Named(String),
}

/// Scanner-level uncertainty note attached to a source span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFinding {
    pub code: String,
    pub message: String,
    pub span: Span,
}

/// Metadata collected while scanning.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub dialect_hint: DialectHint,
    pub original_bytes: usize,
    pub line_count: usize,
    pub findings: Vec<ScanFinding>,
}

/// Classified lines of one input text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScannedConfig {
    pub metadata: ScanMetadata,
    pub lines: Vec<Line>,
}

impl ScannedConfig {
    /// Render the scanned lines back to the exact original bytes.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.metadata.original_bytes);
        for line in &self.lines {
            out.push_str(&line.raw);
            out.push_str(&line.line_ending);
        }
        out
    }

    /// Block opened at `start`, see [`extract_block`].
    pub fn block(&self, start: usize) -> Option<Block<'_>> {
        extract_block(&self.lines, start)
    }
}

impl fmt::Display for ScannedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Dialect extension point for trivia classification and line tokenization.
pub trait Dialect {
    /// Report a dialect hint to store in [`ScanMetadata`].
    fn dialect_hint(&self) -> DialectHint {
        DialectHint::Unknown
    }
    /// Classify a raw line into trivia/content buckets.
    fn classify_trivia(&self, raw: &str) -> TriviaKind;
    /// Optionally tokenize a raw content line into `head` + `args`.
    fn parse_parts(&self, raw: &str) -> Option<ParsedLineParts>;
    /// Whether a tokenized content line terminates the enclosing block.
    fn is_block_close(&self, parts: &ParsedLineParts) -> bool {
        parts.head == "exit" && parts.args.is_empty()
    }
}

/// Conservative default dialect: `#` comments, whitespace tokenization.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl Dialect for GenericDialect {
    fn dialect_hint(&self) -> DialectHint {
        DialectHint::Generic
    }

    fn classify_trivia(&self, raw: &str) -> TriviaKind {
        classify_trivia(raw)
    }

    fn parse_parts(&self, raw: &str) -> Option<ParsedLineParts> {
        parse_parts(raw)
    }
}

/// Scan input using the built-in generic dialect.
pub fn scan_generic(input: &str) -> ScannedConfig {
    scan_with_dialect(input, &GenericDialect)
}

/// Split input into classified lines using the given dialect implementation.
///
/// Classification is indentation-based:
/// - a content line opens a block when the next content line is more indented
/// - a content line the dialect reports as a block close is a [`LineKind::Close`]
/// - every input byte is kept so the scan renders back losslessly
pub fn scan_with_dialect<D: Dialect>(input: &str, dialect: &D) -> ScannedConfig {
    let mut metadata = ScanMetadata {
        dialect_hint: dialect.dialect_hint(),
        original_bytes: input.len(),
        line_count: 0,
        findings: Vec::new(),
    };

    let mut lines = collect_lines(input, dialect, &mut metadata.findings);
    metadata.line_count = lines.len();

    for idx in 0..lines.len() {
        let kind = match lines[idx].trivia {
            TriviaKind::Blank => LineKind::Blank,
            TriviaKind::Comment | TriviaKind::Unknown => LineKind::Comment,
            TriviaKind::Content => {
                let line = &lines[idx];
                if line
                    .parsed
                    .as_ref()
                    .is_some_and(|parts| dialect.is_block_close(parts))
                {
                    LineKind::Close
                } else if next_content_indent(&lines, idx).is_some_and(|next| next > line.indent) {
                    LineKind::Opener
                } else {
                    LineKind::Attribute
                }
            }
        };
        lines[idx].kind = kind;
    }

    ScannedConfig { metadata, lines }
}

/// How an extracted block ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockClose {
    /// An `exit` at the opener's indentation (included in the block).
    Exit,
    /// A non-blank line indented less than the opener (not included).
    Implicit,
    /// Input ended while the block was open.
    EndOfInput,
}

/// Contiguous span of lines from an opener to its closing line (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    pub start: usize,
    pub end: usize,
    pub close: BlockClose,
    lines: &'a [Line],
}

impl<'a> Block<'a> {
    /// Lines of the block, opener first.
    pub fn lines(&self) -> &'a [Line] {
        &self.lines[self.start..=self.end]
    }

    /// The opening line.
    pub fn opener(&self) -> &'a Line {
        &self.lines[self.start]
    }

    /// Block text joined with `\n`; always starts with the opener.
    pub fn text(&self) -> String {
        join_raw(self.lines().iter())
    }

    /// Indentation of the first content line nested under the opener.
    pub fn child_indent(&self) -> Option<usize> {
        let open_indent = self.opener().indent;
        self.lines()[1..]
            .iter()
            .find(|line| !line.kind.is_trivia())
            .map(|line| line.indent)
            .filter(|indent| *indent > open_indent)
    }

    /// Opener plus its direct children; bodies of nested blocks are left out.
    pub fn own_lines(&self) -> Vec<&'a Line> {
        let mut out = vec![self.opener()];
        if let Some(child_indent) = self.child_indent() {
            out.extend(
                self.lines()[1..]
                    .iter()
                    .filter(|line| !line.kind.is_trivia() && line.indent == child_indent),
            );
        }
        out
    }

    /// Text of [`Block::own_lines`] joined with `\n`.
    pub fn own_text(&self) -> String {
        join_raw(self.own_lines().into_iter())
    }

    /// Whether absolute line index `idx` lies strictly between opener and close.
    pub fn strictly_contains(&self, idx: usize) -> bool {
        idx > self.start && idx < self.end
    }

    /// Line at absolute index `idx`, if it belongs to this block.
    pub fn line(&self, idx: usize) -> Option<&'a Line> {
        (self.start..=self.end)
            .contains(&idx)
            .then(|| &self.lines[idx])
    }

    /// Lines after the opener paired with their absolute indices.
    pub fn body(&self) -> impl Iterator<Item = (usize, &'a Line)> + use<'a> {
        let lines: &'a [Line] = self.lines;
        let start = self.start + 1;
        lines[start..=self.end]
            .iter()
            .enumerate()
            .map(move |(offset, line)| (start + offset, line))
    }

    /// Nested block opened at absolute index `idx`, bounded by this block.
    ///
    /// Returns `None` when `idx` is outside the body or the line there does not
    /// open a block (see [`opens_block`]).
    pub fn child_block(&self, idx: usize) -> Option<Block<'a>> {
        if idx <= self.start || idx > self.end {
            return None;
        }
        let scope = &self.lines[..=self.end];
        if !opens_block(scope, idx) {
            return None;
        }
        extract_block(scope, idx)
    }
}

/// Whether the line at `idx` opens a block: it is an [`LineKind::Opener`], or
/// its next content line is its own `exit` (an empty block).
pub fn opens_block(lines: &[Line], idx: usize) -> bool {
    let Some(line) = lines.get(idx) else {
        return false;
    };
    match line.kind {
        LineKind::Opener => true,
        LineKind::Attribute => lines[idx + 1..]
            .iter()
            .find(|next| !next.kind.is_trivia())
            .is_some_and(|next| next.kind == LineKind::Close && next.indent == line.indent),
        _ => false,
    }
}

/// Extract the block opened at `start`.
///
/// Scanning begins on the line after `start`. Blank and comment lines are
/// always included. An `exit` at the opener's indentation is included and
/// ends the block; a content line indented less than the opener ends it
/// without being included. Returns `None` only when `start` is out of range.
pub fn extract_block(lines: &[Line], start: usize) -> Option<Block<'_>> {
    let opener = lines.get(start)?;
    let open_indent = opener.indent;

    for (idx, line) in lines.iter().enumerate().skip(start + 1) {
        if line.kind.is_trivia() {
            continue;
        }
        if line.kind == LineKind::Close && line.indent == open_indent {
            return Some(Block {
                start,
                end: idx,
                close: BlockClose::Exit,
                lines,
            });
        }
        if line.indent < open_indent {
            debug!(
                opener = opener.span.line,
                closed_by = line.span.line,
                "block closed by dedent"
            );
            return Some(Block {
                start,
                end: idx - 1,
                close: BlockClose::Implicit,
                lines,
            });
        }
    }

    Some(Block {
        start,
        end: lines.len() - 1,
        close: BlockClose::EndOfInput,
        lines,
    })
}

/// Strip one pair of surrounding double quotes.
pub fn unquote(token: &str) -> &str {
    token
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(token)
}

fn join_raw<'a>(lines: impl Iterator<Item = &'a Line>) -> String {
    lines
        .map(|line| line.raw.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_lines<D: Dialect>(
    input: &str,
    dialect: &D,
    findings: &mut Vec<ScanFinding>,
) -> Vec<Line> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut line_no = 1usize;

    while start < input.len() {
        let next_lf = input[start..].find('\n').map(|idx| start + idx);
        let (segment, next_start) = if let Some(lf_idx) = next_lf {
            (&input[start..=lf_idx], lf_idx + 1)
        } else {
            (&input[start..], input.len())
        };

        let (raw, line_ending) = split_line_ending(segment);
        let trivia = dialect.classify_trivia(raw);
        let span = Span {
            line: line_no,
            start_byte: start,
            // Spans cover the content bytes only (not trailing newline bytes).
            end_byte: start + raw.len(),
        };
        let parsed = if trivia == TriviaKind::Content {
            dialect.parse_parts(raw)
        } else {
            None
        };

        if has_mixed_leading_whitespace(raw) {
            findings.push(ScanFinding {
                code: "mixed-leading-whitespace".to_string(),
                message: "line indentation mixes spaces and tabs; block boundaries may be ambiguous"
                    .to_string(),
                span: span.clone(),
            });
        }

        out.push(Line {
            raw: raw.to_string(),
            line_ending: line_ending.to_string(),
            span,
            indent: count_indent(raw),
            trivia,
            kind: LineKind::Attribute,
            parsed,
        });

        line_no += 1;
        start = next_start;
    }

    out
}

fn next_content_indent(lines: &[Line], idx: usize) -> Option<usize> {
    lines[idx + 1..]
        .iter()
        .find(|line| line.trivia == TriviaKind::Content)
        .map(|line| line.indent)
}

fn split_line_ending(segment: &str) -> (&str, &str) {
    if let Some(raw) = segment.strip_suffix("\r\n") {
        (raw, "\r\n")
    } else if let Some(raw) = segment.strip_suffix('\n') {
        (raw, "\n")
    } else {
        (segment, "")
    }
}

fn classify_trivia(raw: &str) -> TriviaKind {
    if raw.trim().is_empty() {
        return TriviaKind::Blank;
    }

    if raw.trim_start().starts_with('#') {
        TriviaKind::Comment
    } else {
        TriviaKind::Content
    }
}

fn parse_parts(raw: &str) -> Option<ParsedLineParts> {
    let mut tokens = raw.split_whitespace();
    let head = tokens.next()?;
    let args = tokens.map(ToString::to_string).collect::<Vec<_>>();
    Some(ParsedLineParts {
        head: head.to_string(),
        args,
    })
}

/// Indentation width of a raw line (space = 1 column, tab = 4 columns).
pub fn count_indent(raw: &str) -> usize {
    let mut width = 0usize;
    for ch in raw.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 4,
            _ => break,
        }
    }
    width
}

fn has_mixed_leading_whitespace(raw: &str) -> bool {
    let mut seen_space = false;
    let mut seen_tab = false;
    for ch in raw.chars() {
        match ch {
            ' ' => seen_space = true,
            '\t' => seen_tab = true,
            _ => break,
        }
    }
    seen_space && seen_tab
}
