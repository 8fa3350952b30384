use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use time::macros::format_description;
use time::Date;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::ViewerOptions;
use crate::content::Letter;

mod typewriter;

pub use typewriter::Typewriter;

/// A resolved reference to an audio clip or image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    Remote(String),
    Local(PathBuf),
}

impl Asset {
    pub fn label(&self) -> String {
        match self {
            Asset::Remote(url) => url.clone(),
            Asset::Local(path) => path.display().to_string(),
        }
    }
}

/// Resolves asset references against the public asset root.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    root: PathBuf,
}

impl AssetResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `None` when the reference is blank, escapes the root, or names a
    /// file that is not there.
    pub fn resolve(&self, reference: &str) -> Option<Asset> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Some(Asset::Remote(reference.to_string()));
        }
        let relative = Path::new(reference.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            tracing::debug!(reference, "asset reference leaves the asset root");
            return None;
        }
        let path = self.root.join(relative);
        if path.is_file() {
            Some(Asset::Local(path))
        } else {
            tracing::debug!(path = %path.display(), "asset not found, block omitted");
            None
        }
    }
}

/// Everything the letter view shows, already resolved. The body is the
/// Markdown text; rendered HTML is only for `show --html` and JSON output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerLayout {
    pub title: String,
    pub date: String,
    pub tags: Option<String>,
    pub body: String,
    pub audio: Option<Asset>,
    pub image: Option<Asset>,
}

impl ViewerLayout {
    pub fn build(letter: &Letter, assets: &AssetResolver) -> Self {
        Self {
            title: letter.title.clone(),
            date: display_date(&letter.date),
            tags: letter.tag_suffix(),
            body: letter.source.clone(),
            audio: letter.audio.as_deref().and_then(|r| assets.resolve(r)),
            image: letter.cover_image.as_deref().and_then(|r| assets.resolve(r)),
        }
    }
}

/// `Month D, YYYY` for ISO dates, anything else verbatim.
pub fn display_date(raw: &str) -> String {
    let Ok(date) = Date::parse(raw, format_description!("[year]-[month]-[day]")) else {
        return raw.to_string();
    };
    date.format(format_description!(
        "[month repr:long] [day padding:none], [year]"
    ))
    .unwrap_or_else(|_| raw.to_string())
}

/// Reading state for one open letter. Owns the reveal timer, so closing the
/// viewer (dropping it) also stops the animation.
#[derive(Debug, Clone)]
pub struct LetterViewer {
    letter_id: String,
    layout: ViewerLayout,
    interval: Duration,
    animate: bool,
    typewriter: Option<Typewriter>,
}

impl LetterViewer {
    pub fn open(
        letter: &Letter,
        options: &ViewerOptions,
        assets: &AssetResolver,
        now: Instant,
    ) -> Self {
        let layout = ViewerLayout::build(letter, assets);
        let mut viewer = Self {
            letter_id: letter.id.clone(),
            layout,
            interval: options.typewriter_interval,
            animate: options.typewriter,
            typewriter: None,
        };
        viewer.replay(now);
        viewer
    }

    pub fn letter_id(&self) -> &str {
        &self.letter_id
    }

    pub fn layout(&self) -> &ViewerLayout {
        &self.layout
    }

    /// Starts the reveal again from the first character, replacing any
    /// reveal still in flight.
    pub fn replay(&mut self, now: Instant) {
        self.typewriter = if self.animate && !self.interval.is_zero() {
            Some(Typewriter::start(&self.layout.body, self.interval, now))
        } else {
            None
        };
    }

    pub fn skip(&mut self) {
        if let Some(typewriter) = self.typewriter.as_mut() {
            typewriter.finish();
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some(typewriter) = self.typewriter.as_mut() {
            typewriter.advance(now);
        }
    }

    pub fn is_revealing(&self) -> bool {
        self.typewriter
            .as_ref()
            .map(|t| !t.is_finished())
            .unwrap_or(false)
    }

    /// Portion of the body revealed so far.
    pub fn visible_body(&self) -> &str {
        match &self.typewriter {
            Some(typewriter) => typewriter.visible(&self.layout.body),
            None => &self.layout.body,
        }
    }

    pub fn revealed_graphemes(&self) -> usize {
        match &self.typewriter {
            Some(typewriter) => typewriter.revealed(),
            None => self.layout.body.graphemes(true).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{parse_letter, ContentFormat};
    use tempfile::TempDir;

    fn options(typewriter: bool) -> ViewerOptions {
        ViewerOptions {
            typewriter,
            typewriter_interval: Duration::from_millis(10),
        }
    }

    fn letter(header: &str, body: &str) -> Letter {
        parse_letter("l", &format!("---\n{header}\n---\n{body}"), ContentFormat::Plain)
            .expect("letter")
    }

    #[test]
    fn letter_without_assets_renders_body_only() {
        let temp = TempDir::new().unwrap();
        let letter = letter("title: Plain\ndate: 2024-02-14", "Just words.");
        let layout = ViewerLayout::build(&letter, &AssetResolver::new(temp.path()));
        assert_eq!(layout.body, "Just words.");
        assert_eq!(layout.audio, None);
        assert_eq!(layout.image, None);
        assert_eq!(layout.tags, None);
        assert_eq!(layout.date, "February 14, 2024");
    }

    #[test]
    fn present_assets_resolve_and_missing_ones_are_omitted() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        std::fs::create_dir_all(temp.path().join("audio"))?;
        std::fs::write(temp.path().join("audio/voice.mp3"), b"id3")?;
        let letter = letter(
            "audio: /audio/voice.mp3\ncoverImage: img/missing.jpg\ntheme: Stars",
            "body",
        );
        let layout = ViewerLayout::build(&letter, &AssetResolver::new(temp.path()));
        assert_eq!(
            layout.audio,
            Some(Asset::Local(temp.path().join("audio/voice.mp3")))
        );
        assert_eq!(layout.image, None);
        assert_eq!(layout.tags.as_deref(), Some("Stars"));
        Ok(())
    }

    #[test]
    fn remote_and_escaping_references() {
        let resolver = AssetResolver::new("/nowhere");
        assert_eq!(
            resolver.resolve("https://example.com/a.mp3"),
            Some(Asset::Remote("https://example.com/a.mp3".into()))
        );
        assert_eq!(resolver.resolve("../secret.txt"), None);
        assert_eq!(resolver.resolve("   "), None);
    }

    #[test]
    fn html_format_letters_read_as_text() {
        let letter = parse_letter(
            "h",
            "---\ntitle: Html\n---\nDear *you*,\nhi",
            ContentFormat::Html,
        )
        .expect("letter");
        assert!(letter.content.contains("<br"));

        let viewer = LetterViewer::open(
            &letter,
            &options(false),
            &AssetResolver::new("."),
            Instant::now(),
        );
        assert_eq!(viewer.visible_body(), "Dear *you*,\nhi");
        assert!(!viewer.visible_body().contains('<'));
    }

    #[test]
    fn non_iso_dates_display_verbatim() {
        assert_eq!(display_date("Undated"), "Undated");
        assert_eq!(display_date(""), "");
        assert_eq!(display_date("2023-10-04"), "October 4, 2023");
    }

    #[test]
    fn typewriter_reveals_over_time_and_replay_restarts() {
        let start = Instant::now();
        let letter = letter("title: T", "héllo");
        let mut viewer = LetterViewer::open(&letter, &options(true), &AssetResolver::new("."), start);
        assert_eq!(viewer.visible_body(), "");
        assert!(viewer.is_revealing());

        viewer.tick(start + Duration::from_millis(25));
        assert_eq!(viewer.visible_body(), "hé");

        viewer.tick(start + Duration::from_millis(500));
        assert_eq!(viewer.visible_body(), "héllo");
        assert!(!viewer.is_revealing());

        let again = start + Duration::from_millis(600);
        viewer.replay(again);
        assert_eq!(viewer.visible_body(), "");
        viewer.skip();
        assert_eq!(viewer.visible_body(), "héllo");
    }

    #[test]
    fn disabled_typewriter_renders_immediately() {
        let letter = letter("title: T", "all at once");
        let viewer = LetterViewer::open(
            &letter,
            &options(false),
            &AssetResolver::new("."),
            Instant::now(),
        );
        assert_eq!(viewer.visible_body(), "all at once");
        assert!(!viewer.is_revealing());
        assert_eq!(viewer.revealed_graphemes(), 11);
    }

    #[test]
    fn viewer_does_not_touch_the_letter() {
        let letter = letter("title: Keep", "same");
        let before = letter.clone();
        let mut viewer =
            LetterViewer::open(&letter, &options(true), &AssetResolver::new("."), Instant::now());
        viewer.skip();
        drop(viewer);
        assert_eq!(letter, before);
    }
}
