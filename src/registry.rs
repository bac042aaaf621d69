use crate::{
    csharp::extract_csharp,
    godot::{extract_godot_resource, extract_godot_scene},
    json::extract_json,
    types::{Error, ExtractResult, Options},
};
use phf::phf_map;
use std::{fs::File, io::Read, path::Path};
use strum_macros::{Display, EnumIs, IntoStaticStr};

/// Lazy sequence of extracted messages, as returned by
/// [`ExtractorKind::extract`].
pub type Extraction = Box<dyn Iterator<Item = ExtractResult>>;

/// Extractors a host tool can dispatch to. Names match the
/// `babel.extractors` entry points.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ExtractorKind {
    GodotScene,
    GodotResource,
    Json,
    Csharp,
}

static EXTRACTORS: phf::Map<&'static str, ExtractorKind> = phf_map! {
    "godot_scene" => ExtractorKind::GodotScene,
    "godot_resource" => ExtractorKind::GodotResource,
    "json" => ExtractorKind::Json,
    "csharp" => ExtractorKind::Csharp,
};

static EXTENSIONS: phf::Map<&'static str, ExtractorKind> = phf_map! {
    "tscn" => ExtractorKind::GodotScene,
    "tres" => ExtractorKind::GodotResource,
    "res" => ExtractorKind::GodotResource,
    "json" => ExtractorKind::Json,
    "cs" => ExtractorKind::Csharp,
};

impl ExtractorKind {
    pub const ALL: [ExtractorKind; 4] = [
        Self::GodotScene,
        Self::GodotResource,
        Self::Json,
        Self::Csharp,
    ];

    /// Resolves a registered extractor name, e.g. `godot_scene`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        EXTRACTORS.get(name).copied()
    }

    /// Resolves an extractor from a file extension, e.g. `tscn`.
    /// Case-insensitive.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        EXTENSIONS.get(extension.to_ascii_lowercase().as_str()).copied()
    }

    /// Resolves an extractor from the extension of `path`.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Registered name of the extractor.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Runs the extractor over `reader`.
    ///
    /// # Errors
    /// Reading or decoding failures. Malformed input is yielded as errors by
    /// the returned iterator.
    pub fn extract<R: Read>(
        self,
        reader: R,
        keywords: &[&str],
        comment_tags: &[&str],
        options: &Options,
    ) -> Result<Extraction, Error> {
        let extraction: Extraction = match self {
            Self::GodotScene => Box::new(extract_godot_scene(
                reader,
                keywords,
                comment_tags,
                options,
            )?),
            Self::GodotResource => Box::new(extract_godot_resource(
                reader,
                keywords,
                comment_tags,
                options,
            )?),
            Self::Json => {
                Box::new(extract_json(reader, keywords, comment_tags, options)?)
            }
            Self::Csharp => Box::new(extract_csharp(
                reader,
                keywords,
                comment_tags,
                options,
            )?),
        };

        Ok(extraction)
    }

    /// Opens `path` and runs the extractor over it.
    ///
    /// # Errors
    /// [`Error::File`], if the file can't be opened, and everything
    /// [`ExtractorKind::extract`] returns.
    pub fn extract_file<P: AsRef<Path>>(
        self,
        path: P,
        keywords: &[&str],
        comment_tags: &[&str],
        options: &Options,
    ) -> Result<Extraction, Error> {
        let path = path.as_ref();
        let file =
            File::open(path).map_err(|e| Error::File(path.to_path_buf(), e))?;

        self.extract(file, keywords, comment_tags, options)
    }
}

/// Opens `path` and runs the extractor registered for its extension.
///
/// # Errors
/// - [`Error::UnsupportedFile`], if no extractor handles the extension of
///   `path`.
/// - Everything [`ExtractorKind::extract_file`] returns.
///
/// # Example
/// ```no_run
/// use babel_thrive::{Options, extract_file};
///
/// let path = "src/gui/MainMenu.tscn";
/// let keywords = ["text", "Button/tooltip_text"];
///
/// for message in extract_file(path, &keywords, &[], &Options::default())? {
///     let message = message?;
///     println!("{}: {}", message.line, message.message());
/// }
/// # Ok::<(), babel_thrive::Error>(())
/// ```
pub fn extract_file<P: AsRef<Path>>(
    path: P,
    keywords: &[&str],
    comment_tags: &[&str],
    options: &Options,
) -> Result<Extraction, Error> {
    let path = path.as_ref();

    ExtractorKind::from_path(path)
        .ok_or_else(|| Error::UnsupportedFile(path.to_path_buf()))?
        .extract_file(path, keywords, comment_tags, options)
}
