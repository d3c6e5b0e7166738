//! Shell-glob allow/deny matching for topic and group names.

use glob::Pattern;
use tracing::warn;

/// Returns true if `subject` matches any of `patterns`.
///
/// Patterns use shell-glob syntax (`*`, `?`, `[...]`). An empty list matches
/// nothing. A pattern that is not a valid glob only matches itself literally.
#[must_use]
pub fn matches<S: AsRef<str>>(patterns: &[S], subject: &str) -> bool {
    patterns
        .iter()
        .any(|pattern| CompiledPattern::compile(pattern.as_ref()).matches(subject))
}

#[derive(Clone, Debug)]
enum CompiledPattern {
    Glob(Pattern),
    Literal(String),
}

impl CompiledPattern {
    fn compile(pattern: &str) -> Self {
        Pattern::new(pattern).map_or_else(|_| Self::Literal(pattern.to_string()), Self::Glob)
    }

    fn matches(&self, subject: &str) -> bool {
        match self {
            Self::Glob(pattern) => pattern.matches(subject),
            Self::Literal(literal) => literal == subject,
        }
    }
}

/// A set of patterns compiled once and matched many times.
#[derive(Clone, Debug, Default)]
pub struct PatternFilter {
    patterns: Vec<CompiledPattern>,
}

impl PatternFilter {
    /// Compiles `patterns`. Invalid globs are logged and kept as literals.
    #[must_use]
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                let compiled = CompiledPattern::compile(pattern);
                if matches!(compiled, CompiledPattern::Literal(_)) {
                    warn!(%pattern, "invalid glob pattern, matching it literally");
                }
                compiled
            })
            .collect();

        Self { patterns }
    }

    /// Returns true if `subject` matches any pattern.
    #[must_use]
    pub fn matches(&self, subject: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(subject))
    }

    /// Whether the filter has no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
