//! Hero banner content: ASCII art lines, tagline, call to action and navigation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_HERO_LINES: usize = 20;
pub const MAX_HERO_LINE_WIDTH: usize = 80;
pub const MAX_TAGLINE_LENGTH: usize = 160;
pub const MAX_CALL_TO_ACTION_LENGTH: usize = 60;

pub const DEFAULT_CULTURE: &str = "en";
pub const DEFAULT_TAGLINE: &str = "ASCII-first storytelling for both browsers and curl.";
pub const DEFAULT_CALL_TO_ACTION_TEXT: &str = "Read the roadmap";
pub const DEFAULT_CALL_TO_ACTION_URL: &str = "/docs/roadmap";

pub const DEFAULT_HERO_LINES: &[&str] = &[
    r"      ___     ___     ___     ___     ___ ",
    r"     /\__\   /\  \   /\  \   /\  \   /\__\",
    r"    /:/ _/_  \:\  \  \:\  \  \:\  \ /:/ _/_",
    r"   /:/ /\__\  \:\  \  \:\  \  \:\ /:/ /\__\",
    r"  /:/ /:/ _/_  \:\  \  \:\  \  \:\/:/ /:/ _/_",
    r" /:/_/:/ /\__\  \:\__\  \:\__\  \::/_/:/ /\__\",
    r" \:\/:/ /:/  /  /:/  /  /:/  /   \:\/:/ /:/  /",
    r"  \::/_/:/  /  /:/  /  /:/  /     \::/_/:/  / ",
    r"   \:\/:/  /   \:\/__/   \:\/__/       \:\/:/  /  ",
    r"    \::/  /     \::/  /    \::/  /        \::/  /   ",
    r"     \/__/       \/__/      \/__/          \/__/    ",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationLink {
    pub text: String,
    pub url: String,
}

impl NavigationLink {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

pub fn default_navigation() -> Vec<NavigationLink> {
    vec![
        NavigationLink::new("Blog", "/blog"),
        NavigationLink::new("About", "/about"),
        NavigationLink::new("GitHub", "https://github.com/SDCHESNEY"),
    ]
}

/// Configured hero after defaults have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroDefinition {
    pub lines: Vec<String>,
    pub tagline: String,
    pub call_to_action_text: String,
    pub call_to_action_url: String,
    pub navigation: Vec<NavigationLink>,
}

impl Default for HeroDefinition {
    fn default() -> Self {
        Self {
            lines: DEFAULT_HERO_LINES.iter().map(|line| line.to_string()).collect(),
            tagline: DEFAULT_TAGLINE.to_string(),
            call_to_action_text: DEFAULT_CALL_TO_ACTION_TEXT.to_string(),
            call_to_action_url: DEFAULT_CALL_TO_ACTION_URL.to_string(),
            navigation: default_navigation(),
        }
    }
}

/// Localised tagline and call to action for one culture.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HeroLocalization {
    pub tagline: String,
    pub call_to_action_text: String,
    #[serde(default)]
    pub call_to_action_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CultureDefinition {
    pub culture: String,
    pub display_name: String,
    pub hero: Option<HeroLocalization>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CultureInfo {
    pub culture: String,
    pub display_name: String,
}

/// Hero content resolved for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeroContent {
    pub culture: String,
    pub lines: Vec<String>,
    pub tagline: String,
    pub call_to_action_text: String,
    pub call_to_action_url: String,
    pub navigation: Vec<NavigationLink>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct HeroValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl HeroValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl HeroDefinition {
    pub fn validate(&self) -> Result<(), HeroValidationError> {
        if self.lines.is_empty() || self.lines.len() > MAX_HERO_LINES {
            return Err(HeroValidationError::new(
                "lines",
                format!("expected between 1 and {MAX_HERO_LINES} lines"),
            ));
        }
        if let Some(index) = self
            .lines
            .iter()
            .position(|line| line.chars().count() > MAX_HERO_LINE_WIDTH)
        {
            return Err(HeroValidationError::new(
                "lines",
                format!("line {} exceeds {MAX_HERO_LINE_WIDTH} characters", index + 1),
            ));
        }

        check_text("tagline", &self.tagline, MAX_TAGLINE_LENGTH)?;
        check_text(
            "call_to_action_text",
            &self.call_to_action_text,
            MAX_CALL_TO_ACTION_LENGTH,
        )?;
        if self.call_to_action_url.trim().is_empty() {
            return Err(HeroValidationError::new(
                "call_to_action_url",
                "must not be empty",
            ));
        }

        if self.navigation.is_empty() {
            return Err(HeroValidationError::new(
                "navigation",
                "at least one link is required",
            ));
        }
        if self
            .navigation
            .iter()
            .any(|link| link.text.trim().is_empty() || link.url.trim().is_empty())
        {
            return Err(HeroValidationError::new(
                "navigation",
                "every link needs text and a url",
            ));
        }

        Ok(())
    }
}

fn check_text(field: &'static str, value: &str, max: usize) -> Result<(), HeroValidationError> {
    if value.trim().is_empty() {
        return Err(HeroValidationError::new(field, "must not be empty"));
    }
    if value.chars().count() > max {
        return Err(HeroValidationError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}
