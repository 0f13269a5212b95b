use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::ids::UserId;
use crate::model::language::Language;
use crate::model::patch::ProgressPatch;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("user id cannot be empty")]
    EmptyUserId,

    #[error("stars must be a non-negative 32-bit integer, got {0}")]
    InvalidStars(i64),

    #[error("level must be >= 1, got {0}")]
    InvalidLevel(i64),

    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("malformed progress update: {0}")]
    Malformed(String),
}

//
// ─── RECORD ────────────────────────────────────────────────────────────────────
//

pub const DEFAULT_STARS: u32 = 0;
pub const DEFAULT_LEVEL: u32 = 1;

/// Learning progress of a single user.
///
/// A record that was never written is represented by [`Progress::virtual_default`],
/// which carries no `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    user_id: UserId,
    stars: u32,
    level: u32,
    letters_completed: BTreeSet<String>,
    words_completed: BTreeSet<String>,
    math_completed: BTreeSet<i64>,
    tracing_completed: BTreeSet<String>,
    language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl Progress {
    /// The value reported for a user with no stored record.
    #[must_use]
    pub fn virtual_default(user_id: UserId) -> Self {
        Self {
            user_id,
            stars: DEFAULT_STARS,
            level: DEFAULT_LEVEL,
            letters_completed: BTreeSet::new(),
            words_completed: BTreeSet::new(),
            math_completed: BTreeSet::new(),
            tracing_completed: BTreeSet::new(),
            language: Language::default(),
            updated_at: None,
        }
    }

    /// Builds the record a first write creates: defaults plus the supplied fields.
    #[must_use]
    pub fn created_from(user_id: UserId, patch: &ProgressPatch, at: DateTime<Utc>) -> Self {
        let mut progress = Self::virtual_default(user_id);
        progress.merge(patch, at);
        progress
    }

    /// Rehydrate a stored record.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidLevel` if the stored level is zero.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        user_id: UserId,
        stars: u32,
        level: u32,
        letters_completed: BTreeSet<String>,
        words_completed: BTreeSet<String>,
        math_completed: BTreeSet<i64>,
        tracing_completed: BTreeSet<String>,
        language: Language,
        updated_at: Option<DateTime<Utc>>,
    ) -> Result<Self, ProgressError> {
        if level < DEFAULT_LEVEL {
            return Err(ProgressError::InvalidLevel(i64::from(level)));
        }
        Ok(Self {
            user_id,
            stars,
            level,
            letters_completed,
            words_completed,
            math_completed,
            tracing_completed,
            language,
            updated_at,
        })
    }

    /// Apply the fields present in `patch`, leaving every other field untouched.
    ///
    /// `updated_at` never moves backwards: it becomes the later of `at` and the
    /// previous write time.
    pub fn merge(&mut self, patch: &ProgressPatch, at: DateTime<Utc>) {
        if let Some(stars) = patch.stars() {
            self.stars = stars;
        }
        if let Some(level) = patch.level() {
            self.level = level;
        }
        if let Some(letters) = patch.letters_completed() {
            self.letters_completed = letters.clone();
        }
        if let Some(words) = patch.words_completed() {
            self.words_completed = words.clone();
        }
        if let Some(math) = patch.math_completed() {
            self.math_completed = math.clone();
        }
        if let Some(tracing) = patch.tracing_completed() {
            self.tracing_completed = tracing.clone();
        }
        if let Some(language) = patch.language() {
            self.language = language;
        }
        self.updated_at = Some(self.updated_at.map_or(at, |prev| prev.max(at)));
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn stars(&self) -> u32 {
        self.stars
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn letters_completed(&self) -> &BTreeSet<String> {
        &self.letters_completed
    }

    #[must_use]
    pub fn words_completed(&self) -> &BTreeSet<String> {
        &self.words_completed
    }

    #[must_use]
    pub fn math_completed(&self) -> &BTreeSet<i64> {
        &self.math_completed
    }

    #[must_use]
    pub fn tracing_completed(&self) -> &BTreeSet<String> {
        &self.tracing_completed
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// True when the record has been written at least once.
    #[must_use]
    pub fn is_stored(&self) -> bool {
        self.updated_at.is_some()
    }
}
