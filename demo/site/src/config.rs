/* demo/site/src/config.rs */

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tandem_core::tandem_engine::AssetRef;

use crate::records::{NOTIFICATION_TYPES, Notification};

/// File the binary reads when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "tandem.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
  #[serde(default)]
  pub app: AppSection,
  #[serde(default)]
  pub server: ServerSection,
  #[serde(default)]
  pub assets: AssetsSection,
  #[serde(default)]
  pub notification: NotificationSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
  #[serde(default = "default_title")]
  pub title: String,
  #[serde(default = "default_lang")]
  pub lang: String,
}

impl Default for AppSection {
  fn default() -> Self {
    Self { title: default_title(), lang: default_lang() }
  }
}

fn default_title() -> String {
  "React Demo".to_string()
}

fn default_lang() -> String {
  "en".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,
  /// Base URL the fetchers call. Derived from host and port when unset.
  pub api_base: Option<String>,
  #[serde(default = "default_fetch_timeout_ms")]
  pub fetch_timeout_ms: u64,
  #[serde(default = "default_request_timeout_ms")]
  pub request_timeout_ms: u64,
  #[serde(default = "default_public_dir")]
  pub public_dir: PathBuf,
  /// JSON file replacing the built-in mock API content.
  pub content_path: Option<PathBuf>,
  #[serde(default)]
  pub ascii_payload: bool,
}

impl Default for ServerSection {
  fn default() -> Self {
    Self {
      host: default_host(),
      port: default_port(),
      api_base: None,
      fetch_timeout_ms: default_fetch_timeout_ms(),
      request_timeout_ms: default_request_timeout_ms(),
      public_dir: default_public_dir(),
      content_path: None,
      ascii_payload: false,
    }
  }
}

fn default_host() -> String {
  "localhost".to_string()
}

fn default_port() -> u16 {
  3000
}

fn default_fetch_timeout_ms() -> u64 {
  10_000
}

fn default_request_timeout_ms() -> u64 {
  15_000
}

fn default_public_dir() -> PathBuf {
  PathBuf::from("public")
}

#[derive(Debug, Clone, Deserialize)]
pub struct StyleAsset {
  pub href: String,
  #[serde(default)]
  pub noscript: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetsSection {
  #[serde(default = "default_styles")]
  pub styles: Vec<StyleAsset>,
  #[serde(default = "default_scripts")]
  pub scripts: Vec<String>,
}

impl Default for AssetsSection {
  fn default() -> Self {
    Self { styles: default_styles(), scripts: default_scripts() }
  }
}

fn default_styles() -> Vec<StyleAsset> {
  vec![StyleAsset { href: "/css/index.css".into(), noscript: true }]
}

fn default_scripts() -> Vec<String> {
  vec!["/js/client.js".into(), "/js/vendor.js".into()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSection {
  #[serde(default = "default_types")]
  pub types: Vec<String>,
  /// Shown on every page when set.
  pub message: Option<String>,
  #[serde(default = "default_kind")]
  pub kind: String,
}

impl Default for NotificationSection {
  fn default() -> Self {
    Self { types: default_types(), message: None, kind: default_kind() }
  }
}

fn default_types() -> Vec<String> {
  NOTIFICATION_TYPES.iter().map(ToString::to_string).collect()
}

fn default_kind() -> String {
  "info".to_string()
}

impl SiteConfig {
  /// Load `path`, or the default file when present, or built-in defaults.
  /// Not validated yet: overrides still apply on top.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    match path {
      Some(path) => Self::from_file(path),
      None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
        Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
      }
      None => Ok(Self::default()),
    }
  }

  pub fn from_file(path: &Path) -> Result<Self> {
    let content = std::fs::read_to_string(path)
      .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
  }

  /// Apply `PORT` and `HOST` from the environment.
  pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(port) = lookup("PORT") {
      self.server.port = port.trim().parse().with_context(|| format!("invalid PORT {port:?}"))?;
    }
    if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
      self.server.host = host;
    }
    Ok(())
  }

  pub fn validate(&self) -> Result<()> {
    if self.server.port == 0 {
      bail!("server.port must be non-zero");
    }
    if self.server.fetch_timeout_ms == 0 || self.server.request_timeout_ms == 0 {
      bail!("server timeouts must be non-zero");
    }
    let notification = &self.notification;
    if !notification.types.contains(&notification.kind) {
      bail!(
        "notification.kind \"{}\" is not in notification.types {:?}",
        notification.kind,
        notification.types
      );
    }
    if let Some(unknown) =
      notification.types.iter().find(|t| !NOTIFICATION_TYPES.contains(&t.as_str()))
    {
      bail!("unknown notification type \"{unknown}\" (expected one of {NOTIFICATION_TYPES:?})");
    }
    Ok(())
  }

  pub fn listen_addr(&self) -> String {
    format!("{}:{}", self.server.host, self.server.port)
  }

  pub fn api_base(&self) -> String {
    match &self.server.api_base {
      Some(base) => base.trim_end_matches('/').to_string(),
      None => format!("http://{}", self.listen_addr()),
    }
  }

  pub fn fetch_timeout(&self) -> Duration {
    Duration::from_millis(self.server.fetch_timeout_ms)
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_millis(self.server.request_timeout_ms)
  }

  /// Styles first, then scripts, each in declaration order.
  pub fn asset_refs(&self) -> Vec<AssetRef> {
    let styles = self.assets.styles.iter().map(|s| AssetRef::style(s.href.clone(), s.noscript));
    let scripts = self.assets.scripts.iter().map(|s| AssetRef::script(s.clone()));
    styles.chain(scripts).collect()
  }

  /// The site-wide notification, when one is configured.
  pub fn notification(&self) -> Option<Notification> {
    let section = &self.notification;
    let message = section.message.clone()?;
    Some(Notification { message, kind: section.kind.clone() })
  }
}
