//! Generic key-value template substitution
//!
//! A storage of key → replacement-text pairs paired with a wrap function that
//! embeds a key into a placeholder string (default `\{key\}`). Applying the
//! storage to a template replaces every occurrence of each wrapped key, once
//! per key, in insertion order. This is a plain whole-string substitution
//! usable independently of the DOM-based extraction machinery.

use std::fmt;

/// Function that wraps a key inside the templating delimiters.
pub type WrapKeyFn = Box<dyn Fn(&str) -> String + Send + Sync>;

/// The default wrap renders a key as `\{key\}`.
#[must_use]
pub fn default_wrap(key: &str) -> String {
    format!("\\{{{key}\\}}")
}

/// Insertion-ordered key-value storage applied to string templates.
///
/// Keys are unique; re-adding a key replaces its value but keeps its original
/// position. Application is O(keys × template length), which is fine for the
/// intended key counts (dozens, not thousands), so there is no index.
pub struct TemplateKvStorage {
    entries: Vec<(String, String)>,
    wrap: WrapKeyFn,
}

impl Default for TemplateKvStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TemplateKvStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateKvStorage")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl TemplateKvStorage {
    /// Create an empty storage using the default `\{key\}` wrap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            wrap: Box::new(default_wrap),
        }
    }

    /// Create an empty storage with a custom wrap function.
    #[must_use]
    pub fn with_wrap(wrap: WrapKeyFn) -> Self {
        Self {
            entries: Vec::new(),
            wrap,
        }
    }

    /// Render a key through the configured wrap function.
    #[must_use]
    pub fn wrap_key(&self, key: &str) -> String {
        (self.wrap)(key)
    }

    /// Add (or replace) a key-value pair and return the wrapped placeholder,
    /// ready to be substituted into a template.
    pub fn add(&mut self, key: &str, value: &str) -> String {
        match self.entries.iter_mut().find(|(k, _)| k.as_str() == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
        self.wrap_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(_, v)| v.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Apply every stored pair to the template, replacing all occurrences of
    /// each wrapped key with its value.
    ///
    /// Each key is processed exactly once, in insertion order; replacement
    /// output is not re-scanned, so a value containing placeholder syntax is
    /// substituted verbatim. Values are not escaped; callers must pre-encode
    /// values that could themselves contain placeholder syntax.
    #[must_use]
    pub fn apply(&self, template: &str) -> String {
        let mut content = template.to_string();
        for (key, value) in &self.entries {
            content = content.replace(&self.wrap_key(key), value);
        }
        content
    }
}
