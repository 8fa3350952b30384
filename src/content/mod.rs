use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde::Serialize;
use thiserror::Error;

pub mod frontmatter;
pub mod markup;

pub use frontmatter::LetterAttributes;
pub use markup::ContentFormat;

const LETTER_EXTENSION: &str = "md";
const DEFAULT_TITLE: &str = "Untitled";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("reading letter {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),
    #[error("front matter is missing its closing `---` line")]
    UnterminatedFrontMatter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Letter {
    pub id: String,
    pub title: String,
    pub date: String,
    pub theme: Option<String>,
    pub occasion: Option<String>,
    pub preview: Option<String>,
    pub audio: Option<String>,
    pub cover_image: Option<String>,
    pub content: String,
    #[serde(skip)]
    pub source: String,
}

impl Letter {
    pub fn preview_or_title(&self) -> &str {
        self.preview.as_deref().unwrap_or(&self.title)
    }

    /// `theme · occasion`, whichever of the two are set.
    pub fn tag_suffix(&self) -> Option<String> {
        let parts: Vec<&str> = [self.theme.as_deref(), self.occasion.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" · "))
        }
    }
}

/// Builds a letter from one raw document.
pub fn parse_letter(id: &str, raw: &str, format: ContentFormat) -> Result<Letter, ContentError> {
    let doc = frontmatter::parse(raw)?;
    let LetterAttributes {
        title,
        date,
        theme,
        occasion,
        preview,
        audio,
        cover_image,
    } = doc.attributes;
    Ok(Letter {
        id: id.to_string(),
        title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        date: date.unwrap_or_default(),
        theme,
        occasion,
        preview,
        audio,
        cover_image,
        content: markup::render_body(doc.body, format),
        source: doc.body.trim().to_string(),
    })
}

/// Newest first by raw string comparison of `date`; ISO dates order
/// chronologically, anything else orders by its text.
pub fn sort_letters(letters: &mut [Letter]) {
    letters.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
}

#[derive(Debug, Clone)]
pub struct LetterLoader {
    dir: PathBuf,
    format: ContentFormat,
}

impl LetterLoader {
    pub fn new(dir: impl Into<PathBuf>, format: ContentFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every readable letter in the content directory, sorted. Broken
    /// documents are skipped and a missing directory gives an empty list.
    pub fn load_all(&self) -> Vec<Letter> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(dir = %self.dir.display(), "letters directory not found");
                return Vec::new();
            }
            Err(err) => {
                tracing::warn!(?err, dir = %self.dir.display(), "letters directory unreadable");
                return Vec::new();
            }
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(?err, "skipping unreadable letters entry");
                    continue;
                }
            };
            let path = entry.path();
            if path.is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(LETTER_EXTENSION)
            {
                paths.push(path);
            }
        }
        paths.sort();

        let mut letters = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) else {
                tracing::warn!(path = %path.display(), "skipping letter with non UTF-8 name");
                continue;
            };
            match self.load_path(id, &path) {
                Ok(letter) => letters.push(letter),
                Err(err) => {
                    tracing::warn!(%err, path = %path.display(), "skipping letter that failed to load");
                }
            }
        }

        sort_letters(&mut letters);
        tracing::debug!(count = letters.len(), dir = %self.dir.display(), "letters loaded");
        letters
    }

    /// Like [`load_all`](Self::load_all) but never empty.
    pub fn load_or_default(&self) -> Vec<Letter> {
        let letters = self.load_all();
        if letters.is_empty() {
            tracing::info!("no letters found, using the built-in letter");
            return vec![default_letter(self.format)];
        }
        letters
    }

    fn load_path(&self, id: &str, path: &Path) -> Result<Letter, ContentError> {
        let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse_letter(id, &raw, self.format)
    }
}

const DEFAULT_BODY: &str = "\
To my dearest amore,

You clicked the envelope,
so legally you are now in my jurisdiction.

I built this the way a romantic villain builds a lair.
With style. With intent. With an unnecessary amount of effort.

If you're smiling, good.
The trap is functioning as designed.

Yours.";

/// Letter shown when the content directory yields nothing.
pub fn default_letter(format: ContentFormat) -> Letter {
    Letter {
        id: "default".to_string(),
        title: "To my dearest".to_string(),
        date: String::new(),
        theme: None,
        occasion: None,
        preview: Some("You clicked the envelope...".to_string()),
        audio: None,
        cover_image: None,
        content: markup::render_body(DEFAULT_BODY, format),
        source: DEFAULT_BODY.to_string(),
    }
}

/// Distinct filter values in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub themes: IndexSet<String>,
    pub occasions: IndexSet<String>,
}

pub fn facets(letters: &[Letter]) -> Facets {
    let mut facets = Facets::default();
    for letter in letters {
        if let Some(theme) = &letter.theme {
            facets.themes.insert(theme.clone());
        }
        if let Some(occasion) = &letter.occasion {
            facets.occasions.insert(occasion.clone());
        }
    }
    facets
}
