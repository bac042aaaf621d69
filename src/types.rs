use encoding_rs::{Encoding, UTF_8};
use smallvec::{SmallVec, smallvec};
use std::{io, path::PathBuf};
use thiserror::Error;

/// One or two message strings. Two only for plural forms (`ngettext`).
pub type Messages = SmallVec<[String; 2]>;

/// Unit of output produced by every extractor.
///
/// - `line` - 1-based line, on which the closing quote or closing structural
///   token was observed.
/// - `keyword` - keyword or function name the message belongs to. [`None`]
///   only for Godot option lists that appear before any matched property.
/// - `messages` - singular message, optionally followed by the
///   plural/alternate one.
/// - `comments` - always empty, kept for the host catalog tool.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExtractedMessage {
    pub line: usize,
    pub keyword: Option<String>,
    pub messages: Messages,
    pub comments: Vec<String>,
}

impl ExtractedMessage {
    #[must_use]
    pub fn new(
        line: usize,
        keyword: Option<String>,
        messages: Messages,
    ) -> Self {
        Self {
            line,
            keyword,
            messages,
            comments: Vec::new(),
        }
    }

    #[must_use]
    pub fn single(
        line: usize,
        keyword: Option<String>,
        message: String,
    ) -> Self {
        Self::new(line, keyword, smallvec![message])
    }

    /// Returns the singular message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.messages.first().map_or("", String::as_str)
    }

    /// Returns the plural/alternate message, if there's any.
    #[must_use]
    pub fn plural(&self) -> Option<&str> {
        self.messages.get(1).map(String::as_str)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error occurred: {0}")]
    Io(#[from] io::Error),
    #[error("{0}: IO error occurred: {1}")]
    File(PathBuf, io::Error),
    #[error("Unknown encoding `{0}`.")]
    UnknownEncoding(String),
    #[error("Input is not valid {encoding} text.")]
    Decode { encoding: &'static str },
    #[error("Trailing data after string at line {line}.")]
    TrailingData { line: usize },
    #[error("{0}: no extractor is registered for this file type.")]
    UnsupportedFile(PathBuf),
}

/// Result of a single step of an extractor.
pub type ExtractResult = Result<ExtractedMessage, Error>;

/// Options passed to every extractor.
///
/// - `encoding` - encoding used to decode the input. Defaults to UTF-8.
///
/// # Example
/// ```
/// use babel_thrive::Options;
///
/// let options = Options::from_pairs([("encoding", "windows-1251")]).unwrap();
/// assert_eq!(options.encoding.name(), "windows-1251");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub encoding: &'static Encoding,
}

impl Default for Options {
    fn default() -> Self {
        Self { encoding: UTF_8 }
    }
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Builds [`Options`] from the host's string mapping.
    ///
    /// Only the `encoding` key is recognized, its value is any label known to
    /// [`Encoding::for_label`]. Other keys are ignored.
    ///
    /// # Errors
    /// [`Error::UnknownEncoding`], if the encoding label is unknown.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();

        for (key, value) in pairs {
            if key.as_ref() != "encoding" {
                continue;
            }

            let label = value.as_ref().trim();
            options.encoding = Encoding::for_label(label.as_bytes())
                .ok_or_else(|| Error::UnknownEncoding(label.to_owned()))?;
        }

        Ok(options)
    }
}
