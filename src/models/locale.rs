//! Supported site locales and locale-keyed text.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A locale the site is published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Locale {
    En,
    ZhCn,
    ZhHk,
}

impl Locale {
    /// Every supported locale, default first.
    pub const ALL: [Locale; 3] = [Locale::En, Locale::ZhCn, Locale::ZhHk];

    /// Locale used when a value is requested for a locale that has no entry.
    pub const DEFAULT: Locale = Locale::En;

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::ZhCn => "zh-cn",
            Locale::ZhHk => "zh-hk",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Locale::En),
            "zh-cn" => Ok(Locale::ZhCn),
            "zh-hk" => Ok(Locale::ZhHk),
            _ => Err(()),
        }
    }
}

/// Text with one entry per locale.
///
/// Coverage of every locale is checked when the catalog is loaded, so `get`
/// only falls back to [`Locale::DEFAULT`] for values built outside the loader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<Locale, String>);

impl LocalizedText {
    pub fn new(entries: impl IntoIterator<Item = (Locale, String)>) -> Self {
        Self(entries.into_iter().collect())
    }

    /// Text for `locale`, or the default locale's text when missing.
    pub fn get(&self, locale: Locale) -> &str {
        self.0
            .get(&locale)
            .or_else(|| self.0.get(&Locale::DEFAULT))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Locales with no entry or an empty entry.
    pub fn missing_locales(&self) -> Vec<Locale> {
        Locale::ALL
            .into_iter()
            .filter(|locale| self.0.get(locale).map_or(true, |s| s.trim().is_empty()))
            .collect()
    }
}
