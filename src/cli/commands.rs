use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;

use crate::app::App;
use crate::config::AppConfig;
use crate::content::markup::render_safe_html;
use crate::content::{facets, Letter, LetterLoader};
use crate::filter::{visible_indices, FilterState};
use crate::gate;
use crate::ui::EMPTY_DESK;
use crate::viewer::display_date;

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Only letters with exactly this theme
    #[arg(long)]
    pub theme: Option<String>,
    /// Only letters with exactly this occasion
    #[arg(long)]
    pub occasion: Option<String>,
    /// Case-insensitive words to look for in title, preview and body
    #[arg(long)]
    pub search: Option<String>,
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Letter identifier (file name without `.md`)
    pub id: String,
    /// Print the body as sanitized HTML
    #[arg(long)]
    pub html: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FacetsArgs {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct UnlockArgs {
    /// Phrase to check against the configured passphrase
    pub phrase: String,
}

pub fn run_tui(config: Arc<AppConfig>, loader: &LetterLoader) -> Result<()> {
    if !atty::is(atty::Stream::Stdout) {
        bail!("the letter desk needs an interactive terminal; try `letterdesk list` instead");
    }
    let letters = loader.load_or_default();
    let mut app = App::new(config, letters);
    app.run().context("running the letter desk")
}

pub fn run_list(letters: &[Letter], args: &ListArgs) -> Result<String> {
    let filter = FilterState {
        theme: args.theme.clone().unwrap_or_default(),
        occasion: args.occasion.clone().unwrap_or_default(),
        query: args.search.clone().unwrap_or_default(),
    };
    let visible: Vec<&Letter> = visible_indices(letters, &filter)
        .into_iter()
        .map(|idx| &letters[idx])
        .collect();

    if args.json {
        let mut out = serde_json::to_string_pretty(&visible).context("serializing letters")?;
        out.push('\n');
        return Ok(out);
    }
    if visible.is_empty() {
        return Ok(format!("{EMPTY_DESK}\n"));
    }
    let mut out = String::new();
    for letter in visible {
        let _ = writeln!(&mut out, "{}  {}", letter.id, letter.title);
        let mut meta = display_date(&letter.date);
        if let Some(tags) = letter.tag_suffix() {
            if !meta.is_empty() {
                meta.push_str("  ");
            }
            meta.push_str(&tags);
        }
        if !meta.is_empty() {
            let _ = writeln!(&mut out, "    {meta}");
        }
        if let Some(preview) = &letter.preview {
            let _ = writeln!(&mut out, "    {preview}");
        }
        out.push('\n');
    }
    Ok(out)
}

pub fn run_show(letters: &[Letter], args: &ShowArgs) -> Result<String> {
    let Some(letter) = letters.iter().find(|letter| letter.id == args.id) else {
        bail!("no letter with id '{}'", args.id);
    };
    if args.html {
        return Ok(render_safe_html(&letter.source));
    }
    let mut out = String::new();
    let _ = writeln!(&mut out, "{}", letter.title);
    let date = display_date(&letter.date);
    if !date.is_empty() {
        let _ = writeln!(&mut out, "{date}");
    }
    if let Some(tags) = letter.tag_suffix() {
        let _ = writeln!(&mut out, "{tags}");
    }
    out.push('\n');
    let _ = writeln!(&mut out, "{}", letter.source);
    Ok(out)
}

pub fn run_facets(letters: &[Letter], args: &FacetsArgs) -> Result<String> {
    let facets = facets(letters);
    if args.json {
        let mut out = serde_json::to_string_pretty(&facets).context("serializing facets")?;
        out.push('\n');
        return Ok(out);
    }
    let join = |values: &indexmap::IndexSet<String>| {
        if values.is_empty() {
            "(none)".to_string()
        } else {
            values.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    };
    Ok(format!(
        "themes:    {}\noccasions: {}\n",
        join(&facets.themes),
        join(&facets.occasions)
    ))
}

pub fn unlock(config: &AppConfig, args: &UnlockArgs) -> Result<()> {
    if gate::matches(&args.phrase, &config.passphrase) {
        println!("Unlocked.");
        Ok(())
    } else {
        bail!("You forgot?!")
    }
}
