//! Column-name synonyms: split-case display form, plural, and optional
//! generated synonyms.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::config::SynonymSettings;
use crate::error::BuildError;
use crate::traits::SynonymSource;

/// Outcome of asking a [`SynonymSource`] for more synonyms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Augmentation {
    /// A clean list of synonyms.
    Complete(Vec<String>),
    /// The source answered but the text did not parse as a list.
    Partial(String),
    /// The source failed outright.
    Failed(String),
}

#[allow(clippy::unwrap_used)]
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"'([^']*)'|"([^"]*)""#).unwrap());

impl Augmentation {
    /// Interpret free-form model output.
    ///
    /// A list literal (`['a', "b"]`) yields its quoted items; otherwise the
    /// text is split on commas and newlines. Text that yields nothing usable
    /// becomes [`Augmentation::Partial`].
    pub fn from_response(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Augmentation::Failed("empty response".to_string());
        }
        let quoted: Vec<String> = LIST_ITEM
            .captures_iter(trimmed)
            .filter_map(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !quoted.is_empty() {
            return Augmentation::Complete(quoted);
        }
        let bare = trimmed.trim_start_matches('[').trim_end_matches(']');
        let items: Vec<String> = bare
            .split([',', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.contains(char::is_whitespace))
            .map(str::to_string)
            .collect();
        if items.is_empty() {
            Augmentation::Partial(trimmed.to_string())
        } else {
            Augmentation::Complete(items)
        }
    }
}

/// Split `snake_case` on underscores, otherwise split camelCase / PascalCase
/// boundaries, and join the parts with single spaces.
///
/// A boundary sits between a lowercase and an uppercase letter, or before an
/// uppercase letter that starts an uppercase-lowercase pair (`HTTPServer` →
/// `HTTP Server`). Running it on its own output is a no-op.
pub fn split_case(name: &str) -> String {
    if name.contains('_') {
        return name.split('_').collect::<Vec<_>>().join(" ");
    }
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let lower_upper = prev.is_ascii_lowercase() && c.is_ascii_uppercase();
            let acronym_end = prev.is_ascii_uppercase()
                && c.is_ascii_uppercase()
                && next.is_some_and(|n| n.is_ascii_lowercase());
            if lower_upper || acronym_end {
                out.push(' ');
            }
        }
        out.push(c);
    }
    out
}

/// `y` → `ies`, `s`/`x` → `+es`, otherwise `+s`.
pub fn pluralize(display: &str) -> String {
    let last = display.chars().last().map(|c| c.to_ascii_lowercase());
    match last {
        Some('y') => format!("{}ies", &display[..display.len() - 1]),
        Some('s' | 'x') => format!("{display}es"),
        _ => format!("{display}s"),
    }
}

#[derive(Debug, Clone)]
pub struct SynonymOptions {
    pub augment: bool,
    /// Append raw, unparsed augmentation text rather than dropping it.
    pub accept_partial: bool,
}

impl Default for SynonymOptions {
    fn default() -> Self {
        Self { augment: false, accept_partial: true }
    }
}

#[derive(Default)]
pub struct SynonymGenerator {
    options: SynonymOptions,
    source: Option<Box<dyn SynonymSource>>,
}

impl SynonymGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SynonymOptions) -> Self {
        Self { options, source: None }
    }

    pub fn with_source(mut self, source: Box<dyn SynonymSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Generator for the `kb.synonyms` settings. Turning augmentation on
    /// requires a source.
    pub fn from_settings(settings: &SynonymSettings, source: Option<Box<dyn SynonymSource>>) -> Result<Self, BuildError> {
        let options = SynonymOptions { augment: settings.augment, accept_partial: settings.accept_partial };
        match source {
            Some(source) => Ok(Self::with_options(options).with_source(source)),
            None if settings.augment => Err(BuildError::MissingSynonymSource),
            None => Ok(Self::with_options(options)),
        }
    }

    /// Display form first, then plural, then any generated synonyms.
    /// Never fails: augmentation problems are logged and degrade to the
    /// base list.
    pub fn synonyms_for(&self, column_name: &str) -> Vec<String> {
        let display = split_case(column_name);
        let plural = pluralize(&display);
        let mut synonyms = vec![display.clone(), plural];

        if !self.options.augment {
            return synonyms;
        }
        let Some(source) = self.source.as_ref() else {
            warn!(column = column_name, "synonym augmentation enabled without a source, using base synonyms");
            return synonyms;
        };
        match source.generate(std::slice::from_ref(&display)) {
            Augmentation::Complete(extra) => synonyms.extend(extra),
            Augmentation::Partial(raw) => {
                warn!(column = column_name, "synonym source returned unparsed text");
                if self.options.accept_partial {
                    synonyms.push(raw);
                }
            }
            Augmentation::Failed(reason) => {
                warn!(column = column_name, %reason, "synonym generation failed");
            }
        }
        synonyms
    }
}
