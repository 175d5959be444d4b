//! Include/exclude path filters.
//!
//! A lens declares the files it applies to as a list of glob filters. A path
//! is accepted when at least one include filter matches it and no exclude
//! filter does.

use glob::{Pattern, PatternError};
use thiserror::Error;

/// A glob did not compile.
#[derive(Debug, Error)]
#[error("Invalid filter glob '{glob}': {source}")]
pub struct FilterError {
    pub glob: String,
    #[source]
    pub source: PatternError,
}

impl From<FilterError> for crate::Error {
    fn from(err: FilterError) -> Self {
        crate::Error::Filter(err)
    }
}

/// One include or exclude glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pattern: Pattern,
    include: bool,
}

impl Filter {
    pub fn include(glob: &str) -> Result<Self, FilterError> {
        Self::new(glob, true)
    }

    pub fn exclude(glob: &str) -> Result<Self, FilterError> {
        Self::new(glob, false)
    }

    fn new(glob: &str, include: bool) -> Result<Self, FilterError> {
        let pattern = Pattern::new(glob).map_err(|source| FilterError {
            glob: glob.to_string(),
            source,
        })?;
        Ok(Self { pattern, include })
    }

    pub fn glob(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn is_include(&self) -> bool {
        self.include
    }

    /// `Some(include)` when the glob matches `path`, `None` otherwise.
    pub fn matches(&self, path: &str) -> Option<bool> {
        self.pattern.matches(path).then_some(self.include)
    }
}

/// Returns true if `filters` accept `path`.
pub fn check_path(filters: &[Filter], path: &str) -> bool {
    let mut included = false;
    for filter in filters {
        match filter.matches(path) {
            Some(true) => included = true,
            Some(false) => return false,
            None => {}
        }
    }
    included
}
