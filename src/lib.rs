//! Translatable string extractors for Godot scenes and resources,
//! gettext-style JSON and C# sources.
//!
//! Every extractor has the same shape: `(reader, keywords, comment_tags,
//! options)` -> lazy sequence of [`ExtractedMessage`]s, so a translation
//! catalog tool can dispatch by file type using [`ExtractorKind`].

mod constants;
mod functions;

pub mod csharp;
pub mod godot;
pub mod json;
pub mod lexer;
pub mod registry;
pub mod types;

pub use constants::{
    DEFAULT_FUNCNAME, GETTEXT_KEY_ALT_CONTENT, GETTEXT_KEY_CONTENT,
    GETTEXT_KEY_FUNCNAME, GETTEXT_KEYWORD, GETTEXT_VALUE,
    JSON_TRANSLATABLE_KEYS, OPTION_ENTRY_WIDTH, PLACEHOLDER_MARKER,
    PLURAL_FUNCNAME, RESOURCE_KEYWORD_PREFIX,
};
pub use csharp::{CallExtractor, CallSite, extract_csharp};
pub use functions::{decode, read_decoded};
pub use godot::{
    GodotExtractor, GodotFormat, KeywordMap, extract_godot_resource,
    extract_godot_scene,
};
pub use json::{JsonEntry, JsonExtractor, LineIndex, extract_json};
pub use lexer::{Token, TokenKind, tokenize, unquote_string};
pub use registry::{Extraction, ExtractorKind, extract_file};
pub use types::{Error, ExtractResult, ExtractedMessage, Messages, Options};
