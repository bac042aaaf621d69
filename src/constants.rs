use phf::phf_set;

pub(crate) mod localization {
    pub const OPTION_ENTRIES_NOT_DIVISIBLE_MSG: &str = "Option list entries \
        are not divisible by the entry width. Skipping the line.";
    pub const UNTERMINATED_STRING_MSG: &str = "String wasn't terminated \
        before the end of file. It won't be extracted.";
    pub const UNBALANCED_OBJECT_MSG: &str =
        "Closing brace without a matching opening brace.";
}

/// Godot scene blocks containing this marker hold template text.
pub const PLACEHOLDER_MARKER: &str = "PLACEHOLDER";

/// Keyword prefix used by the resource format.
pub const RESOURCE_KEYWORD_PREFIX: &str = "Resource/";

/// Godot serializes each `OptionButton` item as five values: text, icon,
/// disabled, id, metadata.
pub const OPTION_ENTRY_WIDTH: usize = 5;

/// Key, which marks an object as a gettext object.
pub const GETTEXT_KEYWORD: &str = "type";
/// Value of [`GETTEXT_KEYWORD`], which marks an object as a gettext object.
pub const GETTEXT_VALUE: &str = "gettext_string";
pub const GETTEXT_KEY_CONTENT: &str = "content";
pub const GETTEXT_KEY_ALT_CONTENT: &str = "alt_content";
pub const GETTEXT_KEY_FUNCNAME: &str = "funcname";

pub const DEFAULT_FUNCNAME: &str = "gettext";
pub const PLURAL_FUNCNAME: &str = "ngettext";

/// Lowercased JSON keys, values of which are extracted outside of gettext
/// objects.
pub const JSON_TRANSLATABLE_KEYS: phf::Set<&'static str> = phf_set! {
    "groupname",
    "displayname",
    "name",
    "messages",
    "lefttexts",
    "righttexts",
};
