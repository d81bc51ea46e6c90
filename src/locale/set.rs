//! Ordered sets of locale identifiers and the domains serving them.

/// An ordered, duplicate-free list of locale identifiers.
///
/// Order carries no precedence except for deterministic header matching:
/// when several locales satisfy the same preference, the first one wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocaleSet {
    locales: Vec<String>,
}

impl LocaleSet {
    /// Build a set, dropping case-insensitive duplicates.
    pub fn new<I, S>(locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for locale in locales {
            let locale = locale.into();
            if set.find(&locale).is_none() {
                set.locales.push(locale);
            }
        }
        set
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.locales.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    /// Case-insensitive lookup returning the configured spelling.
    pub fn find(&self, candidate: &str) -> Option<&str> {
        self.iter().find(|l| l.eq_ignore_ascii_case(candidate))
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.find(candidate).is_some()
    }
}

/// A domain with its own default locale and, optionally, a restricted set
/// of locales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    /// Lowercased host name without port.
    pub name: String,
    pub default_locale: String,
    /// `None` means the domain serves every global locale.
    pub locales: Option<LocaleSet>,
}

impl Domain {
    /// Whether this domain serves `locale`. The locale must already be a
    /// member of the global set.
    pub fn serves(&self, locale: &str) -> bool {
        self.locales.as_ref().map_or(true, |set| set.contains(locale))
    }

    /// The locales served on this domain.
    pub fn locale_set<'a>(&'a self, global: &'a LocaleSet) -> &'a LocaleSet {
        self.locales.as_ref().unwrap_or(global)
    }
}
