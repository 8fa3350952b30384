use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};

use crate::carousel::CarouselMode;
use crate::content::ContentFormat;

pub mod themes;

pub use themes::{Palette, ThemeName};

const APP_DOMAIN: &str = "io";
const APP_ORG: &str = "Letterdesk";
const APP_NAME: &str = "letterdesk";

pub const CONFIG_ENV: &str = "LETTERDESK_CONFIG";
pub const DATA_ENV: &str = "LETTERDESK_DATA";

pub struct ConfigLoader {
    paths: ConfigPaths,
}

impl ConfigLoader {
    pub fn discover() -> Result<Self> {
        let paths = ConfigPaths::discover()?;
        Ok(Self { paths })
    }

    pub fn with_paths(paths: ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        self.paths.ensure_directories()?;
        if !self.paths.config_file.exists() {
            let mut default_cfg = AppConfig::default();
            self.write_default_config(&default_cfg)?;
            default_cfg.post_load(&self.paths);
            return Ok(default_cfg);
        }

        self.load()
    }

    pub fn load(&self) -> Result<AppConfig> {
        let raw = fs::read_to_string(&self.paths.config_file)
            .with_context(|| format!("reading config {}", self.paths.config_file.display()))?;
        let mut cfg: AppConfig = toml::from_str(&raw).context("parsing config toml")?;
        cfg.post_load(&self.paths);
        Ok(cfg)
    }

    fn write_default_config(&self, cfg: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(cfg).context("serializing default config")?;
        if let Some(parent) = self.paths.config_file.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = fs::File::create(&self.paths.config_file)
            .with_context(|| format!("creating config {}", self.paths.config_file.display()))?;
        file.write_all(toml.as_bytes())
            .context("writing default config")?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub data_dir: PathBuf,
    pub letters_dir: PathBuf,
    pub asset_root: PathBuf,
}

impl ConfigPaths {
    pub fn discover() -> Result<Self> {
        let override_config = env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let override_data = env::var(DATA_ENV).ok().map(PathBuf::from);

        let project_dirs = ProjectDirs::from(APP_DOMAIN, APP_ORG, APP_NAME)
            .context("resolving XDG project directories")?;

        let config_dir = override_config
            .clone()
            .map(|p| {
                if p.is_dir() {
                    p
                } else {
                    p.parent().map(Path::to_path_buf).unwrap_or(p)
                }
            })
            .unwrap_or_else(|| project_dirs.config_dir().to_path_buf());

        let config_file = override_config
            .filter(|p| p.is_file() || p.extension().is_some())
            .unwrap_or_else(|| config_dir.join("config.toml"));

        let data_dir = override_data.unwrap_or_else(|| project_dirs.data_dir().to_path_buf());
        Ok(Self::under(config_dir, config_file, data_dir))
    }

    /// Paths with the letters and asset directories placed under `data_dir`.
    pub fn under(config_dir: PathBuf, config_file: PathBuf, data_dir: PathBuf) -> Self {
        let letters_dir = data_dir.join("letters");
        let asset_root = data_dir.join("public");
        Self {
            config_dir,
            config_file,
            data_dir,
            letters_dir,
            asset_root,
        }
    }

    /// Creates the config and data directories. The letters directory is
    /// left alone; a missing one just means the built-in letter is shown.
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.config_dir, &self.data_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating application directory {}", dir.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Phrase that unlocks the desk. Cosmetic only.
    pub passphrase: String,
    pub theme: ThemeName,
    pub content: ContentOptions,
    pub carousel: CarouselOptions,
    pub viewer: ViewerOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            passphrase: "wowyourehot".to_string(),
            theme: ThemeName::Rose,
            content: ContentOptions::default(),
            carousel: CarouselOptions::default(),
            viewer: ViewerOptions::default(),
        }
    }
}

impl AppConfig {
    fn post_load(&mut self, paths: &ConfigPaths) {
        self.content.resolve(paths);
        if crate::gate::normalize(&self.passphrase).is_empty() {
            tracing::warn!("passphrase normalises to nothing; the gate cannot be unlocked");
        }
    }

    pub fn palette(&self) -> Palette {
        self.theme.palette()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentOptions {
    /// Directory of `*.md` letters; empty means `<data_dir>/letters`.
    pub letters_dir: PathBuf,
    /// Root for relative audio and image references; empty means `<data_dir>/public`.
    pub asset_root: PathBuf,
    pub format: ContentFormat,
}

impl ContentOptions {
    fn resolve(&mut self, paths: &ConfigPaths) {
        if self.letters_dir.as_os_str().is_empty() {
            self.letters_dir = paths.letters_dir.clone();
        }
        if self.asset_root.as_os_str().is_empty() {
            self.asset_root = paths.asset_root.clone();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselOptions {
    pub mode: CarouselMode,
    /// Cards drawn each side of the active one.
    pub window_range: usize,
    /// Quiet period before a track teleport fires.
    pub settle_ms: u64,
}

impl Default for CarouselOptions {
    fn default() -> Self {
        Self {
            mode: CarouselMode::Modulo,
            window_range: 2,
            settle_ms: 180,
        }
    }
}

impl CarouselOptions {
    pub fn settle_duration(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    pub typewriter: bool,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "typewriter_interval_ms")]
    pub typewriter_interval: Duration,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            typewriter: true,
            typewriter_interval: Duration::from_millis(18),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_paths(root: &TempDir) -> ConfigPaths {
        let config_dir = root.path().join("config");
        let config_file = config_dir.join("config.toml");
        ConfigPaths::under(config_dir, config_file, root.path().join("data"))
    }

    #[test]
    fn first_run_writes_defaults_and_resolves_paths() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let paths = temp_paths(&temp);
        let cfg = ConfigLoader::with_paths(paths.clone()).load_or_init()?;

        assert!(paths.config_file.exists());
        assert!(!paths.letters_dir.exists());
        assert_eq!(cfg.content.letters_dir, paths.letters_dir);
        assert_eq!(cfg.content.asset_root, paths.asset_root);
        assert_eq!(cfg.viewer.typewriter_interval, Duration::from_millis(18));

        let written = fs::read_to_string(&paths.config_file)?;
        assert!(written.contains("typewriter_interval_ms = 18"));
        assert!(!written.contains(&*paths.letters_dir.to_string_lossy()));
        Ok(())
    }

    #[test]
    fn partial_config_keeps_defaults_for_the_rest() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let paths = temp_paths(&temp);
        paths.ensure_directories()?;
        fs::write(
            &paths.config_file,
            "passphrase = \"open sesame\"\ntheme = \"midnight\"\n\n[carousel]\nmode = \"track\"\n\n[content]\nformat = \"html\"\nletters_dir = \"/srv/letters\"\n",
        )?;

        let cfg = ConfigLoader::with_paths(paths.clone()).load()?;
        assert_eq!(cfg.passphrase, "open sesame");
        assert_eq!(cfg.theme, ThemeName::Midnight);
        assert_eq!(cfg.carousel.mode, CarouselMode::Track);
        assert_eq!(cfg.carousel.window_range, 2);
        assert_eq!(cfg.content.format, ContentFormat::Html);
        assert_eq!(cfg.content.letters_dir, PathBuf::from("/srv/letters"));
        assert_eq!(cfg.content.asset_root, paths.asset_root);
        assert!(cfg.viewer.typewriter);
        Ok(())
    }

    #[test]
    fn unknown_theme_falls_back_to_rose() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let paths = temp_paths(&temp);
        paths.ensure_directories()?;
        fs::write(&paths.config_file, "theme = \"ocean\"\n")?;

        let cfg = ConfigLoader::with_paths(paths).load()?;
        assert_eq!(cfg.theme, ThemeName::Rose);
        assert_eq!(cfg.palette(), ThemeName::Rose.palette());
        Ok(())
    }

    #[test]
    fn bad_toml_reports_context() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let paths = temp_paths(&temp);
        paths.ensure_directories()?;
        fs::write(&paths.config_file, "theme = [")?;
        let err = ConfigLoader::with_paths(paths).load().unwrap_err();
        assert!(format!("{err:#}").contains("parsing config toml"));
        Ok(())
    }
}
