//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{fmt, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::github::DEFAULT_HTML_HOST;
use crate::cache::clamp_cache_minutes;
use crate::domain::{
    github::RepoEntryConfig,
    hero::{
        CultureDefinition, DEFAULT_CULTURE, HeroDefinition, HeroLocalization, NavigationLink,
    },
};

mod cli;

pub use cli::{
    CliArgs, Command, ContentOverrides, Section, ServeArgs, ServeOverrides, TextArgs,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "ascii-site";
const ENV_PREFIX: &str = "ASCII_SITE";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 10;
const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_FEED_TITLE: &str = "ascii-site";
const DEFAULT_FEED_DESCRIPTION: &str = "Notes and projects, readable from any terminal.";
const DEFAULT_BLOG_DIR: &str = "content/blog";
const DEFAULT_ABOUT_FILE: &str = "content/about.md";
const DEFAULT_CACHE_DURATION_MINUTES: u64 = 15;
const DEFAULT_GITHUB_TIMEOUT_SECS: u64 = 10;
const DEFAULT_GITHUB_API_BASE_URL: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub site: SiteSettings,
    pub content: ContentSettings,
    pub github: GitHubSettings,
    pub hero: HeroDefinition,
    pub localization: LocalizationSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    Development,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_development(self) -> bool {
        matches!(self, RuntimeEnvironment::Development)
    }
}

impl FromStr for RuntimeEnvironment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!(
                "unknown environment `{other}`; expected development or production"
            )),
        }
    }
}

impl fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeEnvironment::Development => f.write_str("development"),
            RuntimeEnvironment::Production => f.write_str("production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub environment: RuntimeEnvironment,
    pub base_url: String,
    pub feed_title: String,
    pub feed_description: String,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub blog_dir: PathBuf,
    pub about_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub enable_live_updates: bool,
    pub token: Option<String>,
    pub cache_duration_minutes: u64,
    pub api_base_url: Url,
    pub html_host: String,
    pub timeout: Duration,
    pub repositories: Vec<RepoEntryConfig>,
    /// Configured entries dropped for a blank owner or name.
    pub skipped_repositories: usize,
}

#[derive(Debug, Clone)]
pub struct LocalizationSettings {
    pub default_culture: String,
    pub cultures: Vec<CultureDefinition>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Text(args)) => raw.apply_content_overrides(&args.content),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    site: RawSiteSettings,
    content: RawContentSettings,
    github: RawGitHubSettings,
    hero: RawHeroSettings,
    localization: RawLocalizationSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(environment) = overrides.environment.as_ref() {
            self.site.environment = Some(environment.clone());
        }

        self.apply_content_overrides(&overrides.content);
    }

    fn apply_content_overrides(&mut self, overrides: &ContentOverrides) {
        if let Some(dir) = overrides.blog_dir.as_ref() {
            self.content.blog_dir = Some(dir.clone());
        }
        if let Some(file) = overrides.about_file.as_ref() {
            self.content.about_file = Some(file.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            site,
            content,
            github,
            hero,
            localization,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let site = build_site_settings(site)?;
        let content = build_content_settings(content);
        let github = build_github_settings(github)?;
        let hero = build_hero(hero)?;
        let localization = build_localization_settings(localization)?;

        Ok(Self {
            server,
            logging,
            site,
            content,
            github,
            hero,
            localization,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let environment = match non_blank_owned(site.environment) {
        Some(value) => RuntimeEnvironment::from_str(&value)
            .map_err(|reason| LoadError::invalid("site.environment", reason))?,
        None => RuntimeEnvironment::Production,
    };

    let base_url = non_blank_owned(site.base_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    Url::parse(&base_url).map_err(|err| {
        LoadError::invalid("site.base_url", format!("invalid url `{base_url}`: {err}"))
    })?;

    Ok(SiteSettings {
        environment,
        base_url,
        feed_title: non_blank_owned(site.feed_title)
            .unwrap_or_else(|| DEFAULT_FEED_TITLE.to_string()),
        feed_description: non_blank_owned(site.feed_description)
            .unwrap_or_else(|| DEFAULT_FEED_DESCRIPTION.to_string()),
    })
}

fn build_content_settings(content: RawContentSettings) -> ContentSettings {
    ContentSettings {
        blog_dir: content
            .blog_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BLOG_DIR)),
        about_file: content
            .about_file
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ABOUT_FILE)),
    }
}

fn build_github_settings(github: RawGitHubSettings) -> Result<GitHubSettings, LoadError> {
    let api_base = non_blank_owned(github.api_base_url)
        .unwrap_or_else(|| DEFAULT_GITHUB_API_BASE_URL.to_string());
    let api_base_url = Url::parse(&api_base).map_err(|err| {
        LoadError::invalid(
            "github.api_base_url",
            format!("invalid url `{api_base}`: {err}"),
        )
    })?;
    if !matches!(api_base_url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "github.api_base_url",
            "scheme must be http or https",
        ));
    }

    let timeout_secs = github.timeout_seconds.unwrap_or(DEFAULT_GITHUB_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "github.timeout_seconds",
            "must be greater than zero",
        ));
    }

    // Entries without an owner or name are skipped, not fatal; the count is
    // logged once telemetry is up.
    let (repositories, skipped): (Vec<_>, Vec<_>) = github
        .repositories
        .unwrap_or_default()
        .into_iter()
        .partition(|repo| !repo.owner.trim().is_empty() && !repo.name.trim().is_empty());

    Ok(GitHubSettings {
        enable_live_updates: github.enable_live_updates.unwrap_or(false),
        token: non_blank_owned(github.token),
        cache_duration_minutes: clamp_cache_minutes(
            github
                .cache_duration_minutes
                .unwrap_or(DEFAULT_CACHE_DURATION_MINUTES),
        ),
        api_base_url,
        html_host: non_blank_owned(github.html_host)
            .unwrap_or_else(|| DEFAULT_HTML_HOST.to_string()),
        timeout: Duration::from_secs(timeout_secs),
        repositories,
        skipped_repositories: skipped.len(),
    })
}

/// Unset fields take the built-in hero; explicitly configured values must pass validation.
fn build_hero(hero: RawHeroSettings) -> Result<HeroDefinition, LoadError> {
    let defaults = HeroDefinition::default();

    let definition = HeroDefinition {
        lines: hero
            .lines
            .map(|lines| {
                lines
                    .into_iter()
                    .map(|line| line.trim_end_matches(['\r', '\n']).to_string())
                    .collect()
            })
            .unwrap_or(defaults.lines),
        tagline: hero
            .tagline
            .map(|value| value.trim().to_string())
            .unwrap_or(defaults.tagline),
        call_to_action_text: hero
            .call_to_action_text
            .map(|value| value.trim().to_string())
            .unwrap_or(defaults.call_to_action_text),
        call_to_action_url: hero
            .call_to_action_url
            .map(|value| value.trim().to_string())
            .unwrap_or(defaults.call_to_action_url),
        navigation: hero
            .navigation
            .map(|links| {
                links
                    .into_iter()
                    .map(|link| NavigationLink::new(link.text.trim(), link.url.trim()))
                    .collect()
            })
            .unwrap_or(defaults.navigation),
    };

    definition
        .validate()
        .map_err(|err| LoadError::invalid("hero", err.to_string()))?;
    Ok(definition)
}

fn build_localization_settings(
    localization: RawLocalizationSettings,
) -> Result<LocalizationSettings, LoadError> {
    let default_culture = non_blank_owned(localization.default_culture)
        .unwrap_or_else(|| DEFAULT_CULTURE.to_string())
        .replace('_', "-");

    let mut cultures = Vec::new();
    for raw in localization.cultures.unwrap_or_default() {
        let culture = raw.culture.trim().replace('_', "-");
        if culture.is_empty() {
            return Err(LoadError::invalid(
                "localization.cultures",
                "every culture needs a non-empty code",
            ));
        }
        if let Some(hero) = raw.hero.as_ref() {
            if hero.tagline.trim().is_empty() || hero.call_to_action_text.trim().is_empty() {
                return Err(LoadError::invalid(
                    "localization.cultures",
                    format!("culture `{culture}` needs a tagline and call to action text"),
                ));
            }
        }
        let display_name = non_blank_owned(raw.display_name).unwrap_or_else(|| culture.clone());
        cultures.push(CultureDefinition {
            culture,
            display_name,
            hero: raw.hero,
        });
    }

    Ok(LocalizationSettings {
        default_culture,
        cultures,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    environment: Option<String>,
    base_url: Option<String>,
    feed_title: Option<String>,
    feed_description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    blog_dir: Option<PathBuf>,
    about_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawGitHubSettings {
    enable_live_updates: Option<bool>,
    token: Option<String>,
    cache_duration_minutes: Option<u64>,
    api_base_url: Option<String>,
    html_host: Option<String>,
    timeout_seconds: Option<u64>,
    repositories: Option<Vec<RepoEntryConfig>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawHeroSettings {
    lines: Option<Vec<String>>,
    tagline: Option<String>,
    call_to_action_text: Option<String>,
    call_to_action_url: Option<String>,
    navigation: Option<Vec<NavigationLink>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLocalizationSettings {
    default_culture: Option<String>,
    cultures: Option<Vec<RawCulture>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCulture {
    culture: String,
    display_name: Option<String>,
    hero: Option<HeroLocalization>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_blank_owned(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
