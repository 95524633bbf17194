//! Hero banner resolution with per-culture tagline and call to action.

use crate::domain::{
    hero::{CultureDefinition, CultureInfo, HeroContent, HeroDefinition, HeroLocalization},
    text::compare_ignore_case,
};

#[derive(Debug, Clone)]
pub struct HeroService {
    hero: HeroDefinition,
    default_culture: String,
    cultures: Vec<CultureDefinition>,
}

impl HeroService {
    pub fn new(
        hero: HeroDefinition,
        default_culture: impl Into<String>,
        cultures: Vec<CultureDefinition>,
    ) -> Self {
        Self {
            hero,
            default_culture: default_culture.into(),
            cultures,
        }
    }

    /// Hero for `culture`, falling back to the default culture, then the
    /// first configured culture, then the unlocalized hero.
    pub fn hero(&self, culture: Option<&str>) -> HeroContent {
        let requested = culture
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(normalize_culture);

        let localized = requested
            .as_deref()
            .and_then(|wanted| self.find(wanted))
            .and_then(with_hero)
            .or_else(|| self.find(&self.default_culture).and_then(with_hero))
            .or_else(|| self.cultures.first().and_then(with_hero));

        let lines = self
            .hero
            .lines
            .iter()
            .map(|line| line.trim_end_matches(['\r', '\n']).to_string())
            .collect();

        let mut content = HeroContent {
            culture: self.default_culture.clone(),
            lines,
            tagline: self.hero.tagline.clone(),
            call_to_action_text: self.hero.call_to_action_text.clone(),
            call_to_action_url: self.hero.call_to_action_url.clone(),
            navigation: self.hero.navigation.clone(),
        };

        if let Some((culture, localization)) = localized {
            content.culture = culture.culture.clone();
            content.tagline = localization.tagline.trim().to_string();
            content.call_to_action_text = localization.call_to_action_text.trim().to_string();
            if let Some(url) = localization
                .call_to_action_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
            {
                content.call_to_action_url = url.to_string();
            }
        }

        content
    }

    /// Configured cultures ordered by display name.
    pub fn supported_cultures(&self) -> Vec<CultureInfo> {
        let mut cultures: Vec<CultureInfo> = self
            .cultures
            .iter()
            .map(|culture| CultureInfo {
                culture: culture.culture.clone(),
                display_name: culture.display_name.clone(),
            })
            .collect();
        cultures.sort_by(|left, right| compare_ignore_case(&left.display_name, &right.display_name));
        cultures
    }

    fn find(&self, culture: &str) -> Option<&CultureDefinition> {
        self.cultures
            .iter()
            .find(|candidate| candidate.culture.eq_ignore_ascii_case(culture))
    }
}

fn with_hero(culture: &CultureDefinition) -> Option<(&CultureDefinition, &HeroLocalization)> {
    culture.hero.as_ref().map(|hero| (culture, hero))
}

fn normalize_culture(culture: &str) -> String {
    culture.replace('_', "-")
}
