//! Line scanner for Godot text scenes (`.tscn`) and text resources (`.tres`).

use crate::{
    constants::{
        OPTION_ENTRY_WIDTH, PLACEHOLDER_MARKER, RESOURCE_KEYWORD_PREFIX,
        localization::{
            OPTION_ENTRIES_NOT_DIVISIBLE_MSG, UNTERMINATED_STRING_MSG,
        },
    },
    functions::{EachLine, read_decoded},
    types::{Error, ExtractResult, ExtractedMessage, Options},
};
use log::{debug, warn};
use regex::Regex;
use std::{
    cell::LazyCell,
    collections::{HashMap, VecDeque},
    io::Read,
};
use strum_macros::{Display, EnumIs};

thread_local! {
    static NODE_HEADER_RE: LazyCell<Regex> = LazyCell::new(|| unsafe {
        Regex::new(r#"^\[node name="([^"]+)" (?:type="([^"]+)")?"#)
            .unwrap_unchecked()
    });
    static PROPERTY_STRING_RE: LazyCell<Regex> = LazyCell::new(|| unsafe {
        Regex::new(r#"^([A-Za-z0-9_]+)\s*=\s*(".+)$"#).unwrap_unchecked()
    });
    static OPTION_ITEMS_RE: LazyCell<Regex> = LazyCell::new(|| unsafe {
        Regex::new(r"^(items)\s*=\s*\[\s*(.+)\s*\]\s*$").unwrap_unchecked()
    });
    static NUMERIC_EXPRESSION_RE: LazyCell<Regex> = LazyCell::new(|| unsafe {
        Regex::new(r"^[-+*/%.\s]*\d*[-+*/%.\s]*\d*[-+*/%.\s]*\d*$")
            .unwrap_unchecked()
    });
}

/// Godot stringifies numeric defaults, e.g. `"3.14"` or `"1 + 2"`. Those
/// aren't translatable.
///
/// Empty strings and strings made only of `+-*/%.` and whitespace are
/// considered numeric too.
#[must_use]
pub fn is_numeric_expression(value: &str) -> bool {
    NUMERIC_EXPRESSION_RE.with(|re| re.is_match(value))
}

/// Unquotes a Godot string, which starts right after the opening quote.
///
/// Returns the decoded string and the text after the closing quote, or
/// [`None`] as the remainder, if the string doesn't end on this line. `\n`
/// and `\t` are newline and tab, any other escaped character stands for
/// itself.
#[must_use]
pub fn godot_unquote(string: &str) -> (String, Option<&str>) {
    let mut result = String::with_capacity(string.len());
    let mut escaped = false;

    for (i, char) in string.char_indices() {
        if escaped {
            result.push(match char {
                'n' => '\n',
                't' => '\t',
                other => other,
            });
            escaped = false;
        } else if char == '\\' {
            escaped = true;
        } else if char == '"' {
            return (result, Some(&string[i + 1..]));
        } else {
            result.push(char);
        }
    }

    (result, None)
}

/// Checks `lines` (starting from the current one) for [`PLACEHOLDER_MARKER`]
/// up to the end of the current block.
fn has_placeholder(lines: &[String]) -> bool {
    for line in lines {
        if line.contains(PLACEHOLDER_MARKER) {
            return true;
        } else if line.starts_with('[') {
            return false;
        }
    }

    false
}

/// Strips a single leading quote, and the last character along with it.
fn strip_option_quotes(value: &str) -> &str {
    match value.strip_prefix(['"', '\'']) {
        Some(inner) => {
            let mut chars = inner.chars();
            chars.next_back();
            chars.as_str()
        }
        None => value,
    }
}

#[derive(Default)]
struct PropertyKeywords {
    any_node: Option<String>,
    by_node_type: HashMap<String, String>,
}

/// Maps properties to the keywords that declared them translatable.
///
/// Keywords are either bare property names (`text`), or
/// `<NodeType>/<property>` pairs (`Label/text`). Node-type specific keywords
/// take precedence over bare ones.
#[derive(Default)]
pub struct KeywordMap {
    properties: HashMap<String, PropertyKeywords>,
}

impl KeywordMap {
    /// Builds the map for the scene format. `<NodeType>/` is split off the
    /// property name.
    #[must_use]
    pub fn for_scene<S: AsRef<str>>(keywords: &[S]) -> Self {
        let mut map = Self::default();

        for keyword in keywords {
            let keyword = keyword.as_ref();

            match keyword.split_once('/') {
                Some((node_type, property)) => {
                    map.entry(property)
                        .by_node_type
                        .insert(node_type.to_owned(), keyword.to_owned());
                }
                None => {
                    map.entry(keyword).any_node = Some(keyword.to_owned());
                }
            }
        }

        map
    }

    /// Builds the map for the resource format.
    ///
    /// Only `Resource/<property>` keywords apply, bare keywords and keywords
    /// of other contexts are ignored.
    #[must_use]
    pub fn for_resource<S: AsRef<str>>(keywords: &[S]) -> Self {
        let mut map = Self::default();

        for keyword in keywords {
            let keyword = keyword.as_ref();

            if let Some(property) =
                keyword.strip_prefix(RESOURCE_KEYWORD_PREFIX)
            {
                map.entry(property).any_node = Some(keyword.to_owned());
            }
        }

        map
    }

    fn entry(&mut self, property: &str) -> &mut PropertyKeywords {
        self.properties.entry(property.to_owned()).or_default()
    }

    /// Resolves `property` of a node of `node_type` to its keyword.
    #[must_use]
    pub fn resolve(
        &self,
        node_type: Option<&str>,
        property: &str,
    ) -> Option<&str> {
        let keywords = self.properties.get(property)?;

        node_type
            .and_then(|node_type| keywords.by_node_type.get(node_type))
            .or(keywords.any_node.as_ref())
            .map(String::as_str)
    }

    /// Returns `true`, if no keyword applies to the format.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Which of the two Godot text formats is scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIs)]
#[strum(serialize_all = "snake_case")]
pub enum GodotFormat {
    /// `.tscn`: properties are only read inside `[node]` blocks, option lists
    /// and placeholders are recognized.
    Scene,
    /// `.tres`: every `[...]` line is a separator, properties are read
    /// everywhere.
    Resource,
}

/// String, which didn't find its closing quote on the line it started.
struct PendingString {
    keyword: String,
    fragments: Vec<String>,
}

struct ScanState {
    format: GodotFormat,
    keywords: KeywordMap,

    /// [`None`] outside of nodes, empty for instanced nodes.
    node_type: Option<String>,
    pending: Option<PendingString>,
    last_keyword: Option<String>,
    queue: VecDeque<ExtractedMessage>,
}

impl ScanState {
    fn emit(&mut self, line: usize, keyword: Option<String>, message: String) {
        if is_numeric_expression(&message) {
            return;
        }

        self.queue
            .push_back(ExtractedMessage::single(line, keyword, message));
    }

    fn continue_string(
        &mut self,
        line: &str,
        lineno: usize,
    ) -> Result<(), Error> {
        let (value, remainder) = godot_unquote(line);

        let Some(pending) = self.pending.as_mut() else {
            return Ok(());
        };

        pending.fragments.push(value);

        match remainder {
            None => Ok(()),
            Some(remainder) if !remainder.trim().is_empty() => {
                Err(Error::TrailingData { line: lineno })
            }
            Some(_) => {
                if let Some(pending) = self.pending.take() {
                    self.emit(
                        lineno,
                        Some(pending.keyword),
                        pending.fragments.join("\n"),
                    );
                }

                Ok(())
            }
        }
    }

    /// `value` starts with the opening quote.
    fn begin_string(
        &mut self,
        value: &str,
        keyword: String,
        lineno: usize,
    ) -> Result<(), Error> {
        let (value, remainder) = godot_unquote(&value[1..]);

        match remainder {
            None => {
                self.pending = Some(PendingString {
                    keyword,
                    fragments: vec![value],
                });
                Ok(())
            }
            Some(remainder) if remainder.trim().is_empty() => {
                self.emit(lineno, Some(keyword), value);
                Ok(())
            }
            Some(_) => Err(Error::TrailingData { line: lineno }),
        }
    }

    fn scan_property(
        &mut self,
        property: &str,
        value: &str,
        lineno: usize,
    ) -> Result<(), Error> {
        let node_type = match self.format {
            GodotFormat::Scene => self.node_type.as_deref(),
            GodotFormat::Resource => None,
        };

        self.last_keyword =
            self.keywords.resolve(node_type, property).map(str::to_owned);

        match self.last_keyword.clone() {
            Some(keyword) => self.begin_string(value, keyword, lineno),
            None => Ok(()),
        }
    }

    fn scan_option_items(&mut self, items: &str, lineno: usize) {
        let raw_values: Vec<&str> = items.split(',').map(str::trim).collect();

        if raw_values.len() % OPTION_ENTRY_WIDTH != 0 {
            warn!(
                "{OPTION_ENTRIES_NOT_DIVISIBLE_MSG} Line {lineno}, {} \
                 entries: {raw_values:?}",
                raw_values.len()
            );
            return;
        }

        for entry in raw_values.chunks(OPTION_ENTRY_WIDTH) {
            let value = strip_option_quotes(entry[0]).to_owned();
            self.emit(lineno, self.last_keyword.clone(), value);
        }
    }

    fn scan_scene_line(
        &mut self,
        lines: &[String],
        index: usize,
    ) -> Result<(), Error> {
        let line = lines[index].as_str();
        let lineno = index + 1;

        if let Some(captures) = NODE_HEADER_RE.with(|re| re.captures(line)) {
            self.node_type = Some(
                captures
                    .get(2)
                    .map_or_else(String::new, |m| m.as_str().to_owned()),
            );
        } else if line.starts_with('[') {
            self.node_type = None;
        } else if self.node_type.is_some() {
            if let Some(captures) =
                PROPERTY_STRING_RE.with(|re| re.captures(line))
            {
                if has_placeholder(&lines[index..]) {
                    return Ok(());
                }

                return self.scan_property(&captures[1], &captures[2], lineno);
            }

            if let Some(captures) =
                OPTION_ITEMS_RE.with(|re| re.captures(line))
            {
                if has_placeholder(&lines[index..]) {
                    return Ok(());
                }

                self.scan_option_items(&captures[2], lineno);
            }
        }

        Ok(())
    }

    fn scan_resource_line(
        &mut self,
        line: &str,
        lineno: usize,
    ) -> Result<(), Error> {
        if line.starts_with('[') {
            return Ok(());
        }

        match PROPERTY_STRING_RE.with(|re| re.captures(line)) {
            Some(captures) => {
                self.scan_property(&captures[1], &captures[2], lineno)
            }
            None => Ok(()),
        }
    }

    fn scan_line(
        &mut self,
        lines: &[String],
        index: usize,
    ) -> Result<(), Error> {
        if self.pending.is_some() {
            return self.continue_string(&lines[index], index + 1);
        }

        match self.format {
            GodotFormat::Scene => self.scan_scene_line(lines, index),
            GodotFormat::Resource => {
                self.scan_resource_line(&lines[index], index + 1)
            }
        }
    }
}

/// Lazy, one-pass extractor over a decoded Godot scene or resource.
///
/// Yields [`ExtractedMessage`]s in file order. Trailing data after a closing
/// quote yields [`Error::TrailingData`], after which the extractor is
/// exhausted.
pub struct GodotExtractor {
    lines: Vec<String>,
    index: usize,
    finished: bool,
    state: ScanState,
}

impl GodotExtractor {
    #[must_use]
    pub fn new(
        content: &str,
        keywords: KeywordMap,
        format: GodotFormat,
    ) -> Self {
        if keywords.is_empty() {
            debug!("No keywords apply to Godot {format}.");
        }

        Self {
            lines: content.each_line(),
            index: 0,
            finished: false,
            state: ScanState {
                format,
                keywords,
                node_type: None,
                pending: None,
                last_keyword: None,
                queue: VecDeque::new(),
            },
        }
    }

    /// Builds a scene extractor from a keyword list.
    #[must_use]
    pub fn scene<S: AsRef<str>>(content: &str, keywords: &[S]) -> Self {
        Self::new(content, KeywordMap::for_scene(keywords), GodotFormat::Scene)
    }

    /// Builds a resource extractor from a keyword list.
    #[must_use]
    pub fn resource<S: AsRef<str>>(content: &str, keywords: &[S]) -> Self {
        Self::new(
            content,
            KeywordMap::for_resource(keywords),
            GodotFormat::Resource,
        )
    }

    #[must_use]
    pub fn format(&self) -> GodotFormat {
        self.state.format
    }

    fn finish(&mut self) {
        self.finished = true;

        if let Some(pending) = self.state.pending.take() {
            warn!(
                "{UNTERMINATED_STRING_MSG} Keyword: {}, {} lines read.",
                pending.keyword,
                pending.fragments.len()
            );
        }

        debug!(
            "Scanned {} lines of Godot {}.",
            self.lines.len(),
            self.format()
        );
    }
}

impl Iterator for GodotExtractor {
    type Item = ExtractResult;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(message) = self.state.queue.pop_front() {
                return Some(Ok(message));
            }

            if self.finished {
                return None;
            }

            if self.index >= self.lines.len() {
                self.finish();
                return None;
            }

            let result = self.state.scan_line(&self.lines, self.index);
            self.index += 1;

            if let Err(err) = result {
                self.finished = true;
                self.state.queue.clear();
                return Some(Err(err));
            }
        }
    }
}

impl std::iter::FusedIterator for GodotExtractor {}

/// Extracts messages from a Godot scene file (`.tscn`).
///
/// - `keywords` - property names that should be localized, in the
///   `<NodeType>/<name>` or `<name>` format (e.g. `Label/text`).
/// - `comment_tags` - ignored.
/// - `options` - only `encoding` is used.
///
/// # Errors
/// Reading or decoding failures are returned right away. Malformed strings
/// are yielded as errors by the iterator.
///
/// # Example
/// ```
/// use babel_thrive::{Options, extract_godot_scene};
///
/// let scene = "[node name=\"Title\" type=\"Label\"]\ntext = \"Hello\"\n";
/// let keywords = ["Label/text"];
/// let messages: Vec<_> =
///     extract_godot_scene(scene.as_bytes(), &keywords, &[], &Options::new())
///         .unwrap()
///         .collect::<Result<_, _>>()
///         .unwrap();
///
/// assert_eq!(messages[0].line, 2);
/// assert_eq!(messages[0].message(), "Hello");
/// ```
pub fn extract_godot_scene<R: Read>(
    reader: R,
    keywords: &[&str],
    _comment_tags: &[&str],
    options: &Options,
) -> Result<GodotExtractor, Error> {
    let content = read_decoded(reader, options.encoding)?;
    Ok(GodotExtractor::scene(&content, keywords))
}

/// Extracts messages from a Godot resource file (`.tres`, text `.res`).
///
/// - `keywords` - property names that should be localized, in the
///   `Resource/<name>` format (e.g. `Resource/text`). Other keywords are
///   ignored.
/// - `comment_tags` - ignored.
/// - `options` - only `encoding` is used.
///
/// # Errors
/// Reading or decoding failures are returned right away. Malformed strings
/// are yielded as errors by the iterator.
pub fn extract_godot_resource<R: Read>(
    reader: R,
    keywords: &[&str],
    _comment_tags: &[&str],
    options: &Options,
) -> Result<GodotExtractor, Error> {
    let content = read_decoded(reader, options.encoding)?;
    Ok(GodotExtractor::resource(&content, keywords))
}
