use std::collections::BTreeSet;

use serde::Deserialize;

use crate::model::language::Language;
use crate::model::progress::{DEFAULT_LEVEL, ProgressError};

/// Unvalidated partial update, as received from a client.
///
/// Every field is independently optional. An absent key and an explicit `null`
/// both mean "leave the stored value alone". Unknown keys are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProgressPatchDraft {
    pub stars: Option<i64>,
    pub level: Option<i64>,
    pub letters_completed: Option<Vec<String>>,
    pub words_completed: Option<Vec<String>>,
    pub math_completed: Option<Vec<i64>>,
    pub tracing_completed: Option<Vec<String>>,
    pub language: Option<String>,
}

impl ProgressPatchDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a draft from an arbitrary JSON document.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Malformed` if the document is not an object or a
    /// field has the wrong JSON type (for example a string where `stars` expects
    /// an integer).
    pub fn from_json(value: serde_json::Value) -> Result<Self, ProgressError> {
        serde_json::from_value(value).map_err(|err| ProgressError::Malformed(err.to_string()))
    }

    /// Check ranges and enumerations, producing a patch that is safe to merge.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` for negative or oversized `stars`, a `level`
    /// below 1, or an unknown `language` tag.
    pub fn validate(self) -> Result<ProgressPatch, ProgressError> {
        let stars = self
            .stars
            .map(|raw| u32::try_from(raw).map_err(|_| ProgressError::InvalidStars(raw)))
            .transpose()?;

        let level = self
            .level
            .map(|raw| {
                u32::try_from(raw)
                    .ok()
                    .filter(|level| *level >= DEFAULT_LEVEL)
                    .ok_or(ProgressError::InvalidLevel(raw))
            })
            .transpose()?;

        let language = self
            .language
            .map(|raw| raw.trim().to_ascii_lowercase().parse::<Language>())
            .transpose()?;

        Ok(ProgressPatch {
            stars,
            level,
            letters_completed: self.letters_completed.map(collect_tokens),
            words_completed: self.words_completed.map(collect_tokens),
            math_completed: self.math_completed.map(|items| items.into_iter().collect()),
            tracing_completed: self.tracing_completed.map(collect_tokens),
            language,
        })
    }
}

/// Validated partial update: `Some` fields are written, `None` fields are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgressPatch {
    stars: Option<u32>,
    level: Option<u32>,
    letters_completed: Option<BTreeSet<String>>,
    words_completed: Option<BTreeSet<String>>,
    math_completed: Option<BTreeSet<i64>>,
    tracing_completed: Option<BTreeSet<String>>,
    language: Option<Language>,
}

impl ProgressPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_stars(mut self, stars: u32) -> Self {
        self.stars = Some(stars);
        self
    }

    /// # Errors
    ///
    /// Returns `ProgressError::InvalidLevel` if `level` is zero.
    pub fn with_level(mut self, level: u32) -> Result<Self, ProgressError> {
        if level < DEFAULT_LEVEL {
            return Err(ProgressError::InvalidLevel(i64::from(level)));
        }
        self.level = Some(level);
        Ok(self)
    }

    #[must_use]
    pub fn with_letters_completed<I, S>(mut self, letters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.letters_completed = Some(letters.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_words_completed<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words_completed = Some(words.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_math_completed(mut self, problems: impl IntoIterator<Item = i64>) -> Self {
        self.math_completed = Some(problems.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_tracing_completed<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tracing_completed = Some(items.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    #[must_use]
    pub fn stars(&self) -> Option<u32> {
        self.stars
    }

    #[must_use]
    pub fn level(&self) -> Option<u32> {
        self.level
    }

    #[must_use]
    pub fn letters_completed(&self) -> Option<&BTreeSet<String>> {
        self.letters_completed.as_ref()
    }

    #[must_use]
    pub fn words_completed(&self) -> Option<&BTreeSet<String>> {
        self.words_completed.as_ref()
    }

    #[must_use]
    pub fn math_completed(&self) -> Option<&BTreeSet<i64>> {
        self.math_completed.as_ref()
    }

    #[must_use]
    pub fn tracing_completed(&self) -> Option<&BTreeSet<String>> {
        self.tracing_completed.as_ref()
    }

    #[must_use]
    pub fn language(&self) -> Option<Language> {
        self.language
    }

    /// True when no field is supplied; such a patch only bumps `updated_at`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Names of the supplied fields, for logging.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.stars.is_some() {
            names.push("stars");
        }
        if self.level.is_some() {
            names.push("level");
        }
        if self.letters_completed.is_some() {
            names.push("letters_completed");
        }
        if self.words_completed.is_some() {
            names.push("words_completed");
        }
        if self.math_completed.is_some() {
            names.push("math_completed");
        }
        if self.tracing_completed.is_some() {
            names.push("tracing_completed");
        }
        if self.language.is_some() {
            names.push("language");
        }
        names
    }
}

fn collect_tokens(items: Vec<String>) -> BTreeSet<String> {
    items.into_iter().collect()
}
