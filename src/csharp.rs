//! Call-site extractor for C# sources.
//!
//! Finds `Name(...)` calls and collects the string literals in their argument
//! lists. Adjacent literals (and literals joined with `+`) are concatenated.
//! Nested parentheses are balanced out, so `Tr(Format("a"))` still belongs to
//! `Tr`.

use crate::{
    functions::read_decoded,
    lexer::{Token, TokenKind, tokenize},
    types::{Error, ExtractResult, ExtractedMessage, Options},
};
use log::debug;
use std::io::Read;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum CallState {
    /// Looking for a name that could start a call.
    #[default]
    Start,
    /// Inside the argument list of a call.
    Call,
    /// After a call ended, until the next one starts.
    Skipping,
}

/// A call with a string argument.
///
/// `line` is the line of the first string literal of the argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub line: usize,
    pub function: String,
    pub content: String,
}

/// Token-driven state machine. Feed it tokens with [`CallExtractor::feed`],
/// or run it over a whole source with [`CallExtractor::extract`].
#[derive(Debug, Default)]
pub struct CallExtractor {
    state: CallState,

    current_name: Option<String>,
    current_value: Option<String>,
    value_start_line: usize,

    parenthesis_level: usize,
    call_primed: bool,

    results: Vec<CallSite>,
}

impl CallExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the machine over `source` and returns every call site with a
    /// non-empty string argument, regardless of the function name.
    #[must_use]
    pub fn extract(source: &str) -> Vec<CallSite> {
        let mut extractor = Self::new();

        for token in tokenize(source) {
            extractor.feed(&token);
        }

        extractor.finish()
    }

    fn start_call(&mut self) {
        self.state = CallState::Call;
        self.current_value = None;
    }

    fn end_call(&mut self) {
        self.state = CallState::Skipping;

        let has_name =
            self.current_name.as_ref().is_some_and(|s| !s.is_empty());
        let has_value =
            self.current_value.as_ref().is_some_and(|s| !s.is_empty());

        if has_name && has_value {
            self.add_result();
        }
    }

    fn add_result(&mut self) {
        if let (Some(function), Some(content)) =
            (self.current_name.take(), self.current_value.take())
        {
            self.results.push(CallSite {
                line: self.value_start_line,
                function,
                content,
            });
        }
    }

    /// Advances the machine by one token.
    pub fn feed(&mut self, token: &Token) {
        // Only the token right after a name may open its call.
        let call_primed = self.call_primed;
        self.call_primed = false;

        match token.kind {
            TokenKind::Operator => match token.value.as_str() {
                "(" => {
                    if self.state != CallState::Call && call_primed {
                        self.start_call();
                    } else {
                        self.parenthesis_level += 1;
                    }
                }
                ")" => {
                    if self.parenthesis_level == 0 {
                        self.end_call();
                    } else {
                        self.parenthesis_level -= 1;
                    }
                }
                _ => {}
            },
            TokenKind::Name if self.state != CallState::Call => {
                self.call_primed = true;
                self.current_name = Some(token.value.clone());
            }
            TokenKind::String if self.state == CallState::Call => {
                match self.current_value.as_mut() {
                    Some(current) => current.push_str(&token.value),
                    None => {
                        self.current_value = Some(token.value.clone());
                        self.value_start_line = token.line;
                    }
                }
            }
            _ => {}
        }
    }

    /// Returns collected call sites.
    #[must_use]
    pub fn finish(self) -> Vec<CallSite> {
        self.results
    }
}

/// Extracts messages from a C# source file.
///
/// Every call site is parsed, but only calls of functions listed in
/// `keywords` are yielded. `comment_tags` are ignored, only `encoding` is
/// used from `options`. Line breaks are counted on the decoded text, so
/// `\r\n` files report the same lines as `\n` ones.
///
/// # Errors
/// Reading or decoding failures.
///
/// # Example
/// ```
/// use babel_thrive::{Options, extract_csharp};
///
/// let source = "var s = Localization.Translate(\"Hello \" + \"World\");";
/// let messages: Vec<_> =
///     extract_csharp(source.as_bytes(), &["Translate"], &[], &Options::new())
///         .unwrap()
///         .collect::<Result<_, _>>()
///         .unwrap();
///
/// assert_eq!(messages[0].message(), "Hello World");
/// assert_eq!(messages[0].keyword.as_deref(), Some("Translate"));
/// ```
pub fn extract_csharp<R: Read>(
    reader: R,
    keywords: &[&str],
    _comment_tags: &[&str],
    options: &Options,
) -> Result<std::vec::IntoIter<ExtractResult>, Error> {
    let source = read_decoded(reader, options.encoding)?;
    let call_sites = CallExtractor::extract(&source);
    let total = call_sites.len();

    let messages: Vec<ExtractResult> = call_sites
        .into_iter()
        .filter(|site| keywords.contains(&site.function.as_str()))
        .map(|site| {
            Ok(ExtractedMessage::single(
                site.line,
                Some(site.function),
                site.content,
            ))
        })
        .collect();

    debug!(
        "Found {total} call sites, {} with known keywords.",
        messages.len()
    );

    Ok(messages.into_iter())
}
