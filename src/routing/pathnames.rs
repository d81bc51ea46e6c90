//! Pathname localization table.
//!
//! Maps each internal (canonical) pathname pattern to the external pattern
//! used by every locale. Lookups go both ways:
//! - external path for a locale → entry + captured params
//! - internal path → entry + captured params (for canonicalizing redirects)
//!
//! When several entries match, the most specific pattern wins; ties fall
//! back to table order (internal patterns sorted lexicographically).

use std::collections::BTreeMap;

use crate::config::schema::PathnameConfig;
use crate::config::validation::ValidationError;
use crate::locale::LocaleSet;
use crate::routing::pattern::{Params, PathPattern};

/// One internal pathname and its localized forms.
#[derive(Debug, Clone)]
pub struct PathnameEntry {
    internal: PathPattern,
    /// Locale → external pattern. Locales without an entry use `internal`.
    external: Vec<(String, PathPattern)>,
}

impl PathnameEntry {
    pub fn internal(&self) -> &PathPattern {
        &self.internal
    }

    /// External pattern for `locale`.
    pub fn external(&self, locale: &str) -> &PathPattern {
        self.external
            .iter()
            .find(|(l, _)| l == locale)
            .map(|(_, pattern)| pattern)
            .unwrap_or(&self.internal)
    }

    pub fn internal_path(&self, params: &Params) -> Option<String> {
        self.internal.render(params)
    }

    pub fn external_path(&self, locale: &str, params: &Params) -> Option<String> {
        self.external(locale).render(params)
    }
}

/// A request path resolved against the table.
#[derive(Debug, Clone)]
pub struct PathnameMatch<'a> {
    pub entry: &'a PathnameEntry,
    pub params: Params,
}

/// Compiled pathname table.
#[derive(Debug, Clone, Default)]
pub struct PathnameTable {
    entries: Vec<PathnameEntry>,
}

impl PathnameTable {
    /// Compile the configured table. Locale names are canonicalized against
    /// `locales`; every problem found is reported.
    pub fn compile(
        config: &BTreeMap<String, PathnameConfig>,
        locales: &LocaleSet,
    ) -> Result<Self, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut entries = Vec::new();

        for (internal_source, localized) in config {
            let internal = match PathPattern::parse(internal_source) {
                Ok(pattern) => pattern,
                Err(e) => {
                    errors.push(e.into());
                    continue;
                }
            };

            let sources: Vec<(Option<&str>, &str)> = match localized {
                PathnameConfig::Shared(external) => locales
                    .iter()
                    .map(|locale| (Some(locale), external.as_str()))
                    .collect(),
                PathnameConfig::PerLocale(map) => map
                    .iter()
                    .map(|(locale, external)| match locales.find(locale) {
                        Some(canonical) => (Some(canonical), external.as_str()),
                        None => {
                            errors.push(ValidationError::PathnameLocaleUnknown {
                                internal: internal_source.clone(),
                                locale: locale.clone(),
                            });
                            (None, external.as_str())
                        }
                    })
                    .collect(),
            };

            let mut external = Vec::new();
            for (locale, source) in sources {
                let pattern = match PathPattern::parse(source) {
                    Ok(pattern) => pattern,
                    Err(e) => {
                        errors.push(e.into());
                        continue;
                    }
                };
                if pattern.params() != internal.params() {
                    errors.push(ValidationError::PathnameParamsMismatch {
                        internal: internal_source.clone(),
                        external: source.to_string(),
                    });
                    continue;
                }
                if let Some(locale) = locale {
                    external.push((locale.to_string(), pattern));
                }
            }

            entries.push(PathnameEntry { internal, external });
        }

        if errors.is_empty() {
            Ok(Self { entries })
        } else {
            Err(errors)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PathnameEntry] {
        &self.entries
    }

    /// Match a locale-relative path written in `locale`'s external form.
    pub fn match_external(&self, locale: &str, path: &str) -> Option<PathnameMatch<'_>> {
        self.best_match(path, |entry| entry.external(locale))
    }

    /// Match a locale-relative path written in internal form.
    pub fn match_internal(&self, path: &str) -> Option<PathnameMatch<'_>> {
        self.best_match(path, PathnameEntry::internal)
    }

    fn best_match<'a, F>(&'a self, path: &str, pattern_of: F) -> Option<PathnameMatch<'a>>
    where
        F: Fn(&'a PathnameEntry) -> &'a PathPattern,
    {
        let mut best: Option<(&PathPattern, PathnameMatch<'a>)> = None;
        for entry in &self.entries {
            let pattern = pattern_of(entry);
            let Some(params) = pattern.matches(path) else {
                continue;
            };
            let better = match &best {
                Some((current, _)) => pattern.cmp_specificity(current).is_lt(),
                None => true,
            };
            if better {
                best = Some((pattern, PathnameMatch { entry, params }));
            }
        }
        best.map(|(_, found)| found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, PathnameConfig)]) -> PathnameTable {
        let config = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        PathnameTable::compile(&config, &LocaleSet::new(["en", "de"])).unwrap()
    }

    fn per_locale(pairs: &[(&str, &str)]) -> PathnameConfig {
        PathnameConfig::PerLocale(
            pairs
                .iter()
                .map(|(l, p)| (l.to_string(), p.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_external_to_internal() {
        let table = table(&[(
            "/news/[slug]",
            per_locale(&[("en", "/news/[slug]"), ("de", "/neuigkeiten/[slug]")]),
        )]);

        let found = table.match_external("de", "/neuigkeiten/start").unwrap();
        assert_eq!(found.params.get("slug"), Some("start"));
        assert_eq!(
            found.entry.internal_path(&found.params).as_deref(),
            Some("/news/start")
        );
        assert!(table.match_external("en", "/neuigkeiten/start").is_none());
    }

    #[test]
    fn test_missing_locale_uses_internal_pattern() {
        let table = table(&[("/about", per_locale(&[("de", "/ueber-uns")]))]);
        assert!(table.match_external("en", "/about").is_some());
        assert!(table.match_external("de", "/about").is_none());
        assert!(table.match_internal("/about").is_some());
    }

    #[test]
    fn test_shared_external_for_all_locales() {
        let table = table(&[("/", PathnameConfig::Shared("/".into()))]);
        assert!(table.match_external("en", "/").is_some());
        assert!(table.match_external("de", "/").is_some());
    }

    #[test]
    fn test_specific_pattern_wins() {
        let table = table(&[
            ("/[...rest]", PathnameConfig::Shared("/[...rest]".into())),
            ("/news/[slug]", PathnameConfig::Shared("/news/[slug]".into())),
            ("/news/latest", per_locale(&[("de", "/neuigkeiten/neueste")])),
        ]);

        let found = table.match_internal("/news/latest").unwrap();
        assert_eq!(found.entry.internal().as_str(), "/news/latest");

        let found = table.match_internal("/news/other").unwrap();
        assert_eq!(found.entry.internal().as_str(), "/news/[slug]");

        let found = table.match_internal("/x/y").unwrap();
        assert_eq!(found.entry.internal().as_str(), "/[...rest]");
    }

    #[test]
    fn test_compile_errors() {
        let config = BTreeMap::from([
            ("/a/[id]".to_string(), per_locale(&[("fr", "/a/[id]"), ("de", "/b/[slug]")])),
            ("/c/[".to_string(), PathnameConfig::Shared("/c".into())),
        ]);
        let errors = PathnameTable::compile(&config, &LocaleSet::new(["en", "de"])).unwrap_err();

        assert!(errors.contains(&ValidationError::PathnameLocaleUnknown {
            internal: "/a/[id]".into(),
            locale: "fr".into(),
        }));
        assert!(errors.contains(&ValidationError::PathnameParamsMismatch {
            internal: "/a/[id]".into(),
            external: "/b/[slug]".into(),
        }));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::Pattern(_))));
    }

    #[test]
    fn test_param_kinds_must_agree() {
        let config = BTreeMap::from([(
            "/a/[slug]".to_string(),
            per_locale(&[("en", "/a/[slug]"), ("de", "/b/[...slug]")]),
        )]);
        let errors = PathnameTable::compile(&config, &LocaleSet::new(["en", "de"])).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::PathnameParamsMismatch {
                internal: "/a/[slug]".into(),
                external: "/b/[...slug]".into(),
            }]
        );

        let config = BTreeMap::from([(
            "/shop/[[...filters]]".to_string(),
            PathnameConfig::Shared("/laden/[...filters]".into()),
        )]);
        assert!(PathnameTable::compile(&config, &LocaleSet::new(["en"])).is_err());
    }
}
