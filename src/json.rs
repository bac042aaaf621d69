//! Extractor for JSON game data.
//!
//! Two kinds of values are extracted:
//! - values of keys listed in [`JSON_TRANSLATABLE_KEYS`] (compared
//!   lowercased);
//! - `content` of gettext objects, which are objects with
//!   `"type": "gettext_string"`. Such objects may also carry `alt_content`
//!   (plural form) and `funcname` (`gettext` by default, `ngettext` for
//!   plurals).
//!
//! ```json
//! {
//!     "type": "gettext_string",
//!     "funcname": "ngettext",
//!     "content": "Apple",
//!     "alt_content": "Apples"
//! }
//! ```

use crate::{
    constants::{
        DEFAULT_FUNCNAME, GETTEXT_KEY_ALT_CONTENT, GETTEXT_KEY_CONTENT,
        GETTEXT_KEY_FUNCNAME, GETTEXT_KEYWORD, GETTEXT_VALUE,
        JSON_TRANSLATABLE_KEYS, PLURAL_FUNCNAME,
        localization::UNBALANCED_OBJECT_MSG,
    },
    functions::read_decoded,
    lexer::{Token, TokenKind, tokenize},
    types::{Error, ExtractResult, ExtractedMessage, Messages, Options},
};
use indexmap::IndexMap;
use log::{debug, warn};
use smallvec::smallvec;
use std::{collections::VecDeque, io::Read, mem::take};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ObjectState {
    #[default]
    Start,
    /// Expecting a key.
    Key,
    /// Expecting the value of the current key.
    Value,
    /// Right after an object was closed.
    End,
}

/// Extracted value.
///
/// `alt_content`, `alt_line` and `funcname` are only set for gettext objects
/// that declare them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonEntry {
    pub line: usize,
    pub content: String,
    pub alt_content: Option<String>,
    pub alt_line: Option<usize>,
    pub funcname: Option<String>,
}

impl JsonEntry {
    fn plain(line: usize, content: String) -> Self {
        Self {
            line,
            content,
            alt_content: None,
            alt_line: None,
            funcname: None,
        }
    }

    /// Function name, under which the entry is reported.
    #[must_use]
    pub fn funcname(&self) -> &str {
        self.funcname.as_deref().unwrap_or(DEFAULT_FUNCNAME)
    }

    /// Message tuple: `(content, alt_content)` for `ngettext`, `(content)`
    /// otherwise.
    #[must_use]
    pub fn messages(&self) -> Messages {
        if self.funcname() == PLURAL_FUNCNAME {
            smallvec![
                self.content.clone(),
                self.alt_content.clone().unwrap_or_default()
            ]
        } else {
            smallvec![self.content.clone()]
        }
    }
}

/// String token, which is yet to be added to results.
#[derive(Debug, Clone)]
struct PendingValue {
    line: usize,
    value: String,
}

impl PendingValue {
    fn new(token: &Token) -> Self {
        Self {
            line: token.line,
            value: token.value.clone(),
        }
    }
}

/// Gettext-related state of a single object.
#[derive(Debug, Default)]
struct ObjectScope {
    gettext_mode: bool,
    content: Option<PendingValue>,
    alt_content: Option<PendingValue>,
    funcname: Option<String>,
}

impl ObjectScope {
    fn into_entry(self) -> Option<JsonEntry> {
        if !self.gettext_mode {
            return None;
        }

        let content = self.content?;
        let (alt_content, alt_line) = match self.alt_content {
            Some(alt) => (Some(alt.value), Some(alt.line)),
            None => (None, None),
        };

        Some(JsonEntry {
            line: content.line,
            content: content.value,
            alt_content,
            alt_line,
            funcname: self.funcname,
        })
    }
}

/// Saved state of the enclosing object or array.
#[derive(Debug)]
struct Frame {
    in_array: bool,
    key: Option<String>,
    scope: ObjectScope,
}

/// Token-driven state machine over object/array nesting.
///
/// Arrays don't get their own frames. `[` only marks, that the values of the
/// current key come in a list, so the key is kept between `,`s. Objects push
/// the enclosing state and restore it on `}`.
#[derive(Debug, Default)]
pub struct JsonExtractor {
    state: ObjectState,

    token_to_add: Option<PendingValue>,
    current_key: Option<String>,
    in_array: bool,
    nested: Vec<Frame>,
    scope: ObjectScope,

    results: Vec<JsonEntry>,
}

impl JsonExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the machine over `source` and returns entries in the order they
    /// were completed.
    #[must_use]
    pub fn extract(source: &str) -> Vec<JsonEntry> {
        let mut extractor = Self::new();

        for token in tokenize(source) {
            extractor.feed(&token);
        }

        extractor.finish()
    }

    fn start_object(&mut self) {
        self.nested.push(Frame {
            in_array: self.in_array,
            key: self.current_key.take(),
            scope: take(&mut self.scope),
        });

        self.in_array = false;
        self.state = ObjectState::Key;
    }

    fn with_separator(&mut self) {
        self.state = ObjectState::Value;
    }

    fn start_array(&mut self) {
        self.in_array = true;
    }

    fn end_array(&mut self) {
        self.in_array = false;
        self.end_pair(false);
    }

    fn end_pair(&mut self, closes_object: bool) {
        if closes_object || !self.scope.gettext_mode {
            if let Some(pending) = self.token_to_add.take() {
                self.results
                    .push(JsonEntry::plain(pending.line, pending.value));
            }
        }

        if !self.in_array {
            self.current_key = None;
            self.state = ObjectState::Key;
        }
    }

    fn end_object(&mut self) {
        self.end_pair(true);

        if let Some(entry) = take(&mut self.scope).into_entry() {
            self.results.push(entry);
        }

        self.state = ObjectState::End;

        match self.nested.pop() {
            Some(frame) => {
                self.in_array = frame.in_array;
                self.current_key = frame.key;
                self.scope = frame.scope;
            }
            None => {
                warn!("{UNBALANCED_OBJECT_MSG}");
                self.in_array = false;
            }
        }
    }

    fn key_string(&mut self, token: &Token) {
        if token.value == GETTEXT_KEYWORD {
            self.scope.gettext_mode = true;
        }

        self.current_key = Some(token.value.clone());
    }

    fn value_string(&mut self, token: &Token) {
        let Some(key) = self.current_key.as_deref() else {
            return;
        };

        match key {
            GETTEXT_KEYWORD => {
                if token.value != GETTEXT_VALUE {
                    self.scope.gettext_mode = false;
                }
            }
            GETTEXT_KEY_CONTENT => {
                self.scope.content = Some(PendingValue::new(token));
            }
            GETTEXT_KEY_ALT_CONTENT => {
                self.scope.alt_content = Some(PendingValue::new(token));
            }
            GETTEXT_KEY_FUNCNAME => {
                self.scope.funcname = Some(token.value.clone());
            }
            _ => {}
        }

        if !self.scope.gettext_mode
            && JSON_TRANSLATABLE_KEYS.contains(key.to_lowercase().as_str())
        {
            self.token_to_add = Some(PendingValue::new(token));
        }
    }

    /// Advances the machine by one token.
    pub fn feed(&mut self, token: &Token) {
        match token.kind {
            TokenKind::Operator => match token.value.as_str() {
                "{" => self.start_object(),
                "[" => self.start_array(),
                ":" => self.with_separator(),
                "}" => self.end_object(),
                "]" => self.end_array(),
                "," => self.end_pair(false),
                _ => {}
            },
            TokenKind::String => {
                if self.state == ObjectState::Key {
                    self.key_string(token);
                } else {
                    self.value_string(token);
                }
            }
            _ => {}
        }
    }

    /// Returns collected entries.
    #[must_use]
    pub fn finish(self) -> Vec<JsonEntry> {
        self.results
    }
}

/// Line numbers of extracted strings, grouped by content.
///
/// The same string can occur several times in a single file, so line numbers
/// are consumed first-seen-first.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LineIndex {
    lines: IndexMap<String, VecDeque<usize>>,
}

impl LineIndex {
    #[must_use]
    pub fn new(entries: &[JsonEntry]) -> Self {
        let mut lines: IndexMap<String, VecDeque<usize>> =
            IndexMap::with_capacity(entries.len());

        for entry in entries {
            lines
                .entry(entry.content.clone())
                .or_default()
                .push_back(entry.line);
        }

        Self { lines }
    }

    /// Removes and returns the earliest unconsumed line of `content`.
    pub fn pop_line(&mut self, content: &str) -> Option<usize> {
        self.lines.get_mut(content)?.pop_front()
    }

    /// Returns unconsumed lines of `content`, earliest first.
    #[must_use]
    pub fn lines(&self, content: &str) -> Option<&VecDeque<usize>> {
        self.lines.get(content)
    }

    /// Iterates over distinct contents, in the order they were first seen.
    pub fn contents(&self) -> impl Iterator<Item = &str> {
        self.lines.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Extracts messages from a JSON file.
///
/// `keywords` and `comment_tags` are ignored: keys are selected by the
/// gettext object convention and [`JSON_TRANSLATABLE_KEYS`]. Only `encoding`
/// is used from `options`.
///
/// # Errors
/// Reading or decoding failures.
///
/// # Example
/// ```
/// use babel_thrive::{Options, extract_json};
///
/// let json = r#"{
///     "type": "gettext_string",
///     "funcname": "ngettext",
///     "content": "Hi",
///     "alt_content": "Hi2"
/// }"#;
/// let messages: Vec<_> =
///     extract_json(json.as_bytes(), &[], &[], &Options::default())
///         .unwrap()
///         .collect::<Result<_, _>>()
///         .unwrap();
///
/// assert_eq!(messages[0].keyword.as_deref(), Some("ngettext"));
/// assert_eq!(messages[0].messages[..], ["Hi", "Hi2"]);
/// ```
pub fn extract_json<R: Read>(
    reader: R,
    _keywords: &[&str],
    _comment_tags: &[&str],
    options: &Options,
) -> Result<std::vec::IntoIter<ExtractResult>, Error> {
    let source = read_decoded(reader, options.encoding)?;
    let entries = JsonExtractor::extract(&source);

    debug!("Extracted {} JSON strings.", entries.len());

    let messages: Vec<ExtractResult> = entries
        .into_iter()
        .map(|entry| {
            Ok(ExtractedMessage::new(
                entry.line,
                Some(entry.funcname().to_owned()),
                entry.messages(),
            ))
        })
        .collect();

    Ok(messages.into_iter())
}
