//! Template lookup and placeholder substitution.

use std::collections::HashMap;

/// Language used when a key or a language is missing.
pub const DEFAULT_LANGUAGE: &str = "en_US";

/// Languages with a catalog.
pub const SUPPORTED_LANGUAGES: [&str; 3] = ["en_US", "zh_CN", "zh_TW"];

type Catalog = HashMap<&'static str, &'static str>;

/// Resolves `(language, key, params)` to a rendered string.
pub struct TextResolver {
    catalogs: HashMap<&'static str, Catalog>,
}

impl TextResolver {
    pub fn new() -> Self {
        let mut catalogs = HashMap::new();
        catalogs.insert("en_US", crate::en_us::MESSAGES.iter().copied().collect());
        catalogs.insert("zh_CN", crate::zh_cn::MESSAGES.iter().copied().collect());
        catalogs.insert("zh_TW", crate::zh_tw::MESSAGES.iter().copied().collect());
        Self { catalogs }
    }

    /// Render `key` in `language`, substituting `{name}` placeholders.
    pub fn resolve(&self, language: &str, key: &str, params: &[(&str, &str)]) -> String {
        let language = normalize_language(Some(language));
        let template = self
            .catalogs
            .get(language)
            .and_then(|c| c.get(key))
            .or_else(|| {
                self.catalogs
                    .get(DEFAULT_LANGUAGE)
                    .and_then(|c| c.get(key))
            })
            .copied();

        match template {
            Some(template) => substitute(template, params),
            None => {
                tracing::warn!(key, language, "missing text key");
                key.to_string()
            }
        }
    }

    /// Shorthand for keys without placeholders.
    pub fn text(&self, language: &str, key: &str) -> String {
        self.resolve(language, key, &[])
    }
}

impl Default for TextResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a free-form language code onto a supported catalog.
///
/// Accepts `-` or `_` separators and a few common aliases; anything
/// unrecognised maps to [`DEFAULT_LANGUAGE`].
pub fn normalize_language(language: Option<&str>) -> &'static str {
    let Some(raw) = language else {
        return DEFAULT_LANGUAGE;
    };
    let code = raw.replace('-', "_");
    if let Some(found) = SUPPORTED_LANGUAGES.iter().find(|l| **l == code) {
        return found;
    }
    match code.as_str() {
        "zh" | "zh_Hans" => "zh_CN",
        "zh_Hant" | "zh_HK" => "zh_TW",
        _ => DEFAULT_LANGUAGE,
    }
}

fn substitute(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in params {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_codes_and_aliases() {
        assert_eq!(normalize_language(Some("zh-CN")), "zh_CN");
        assert_eq!(normalize_language(Some("zh_Hant")), "zh_TW");
        assert_eq!(normalize_language(Some("en")), "en_US");
        assert_eq!(normalize_language(Some("fr_FR")), "en_US");
        assert_eq!(normalize_language(None), "en_US");
    }

    #[test]
    fn substitutes_placeholders() {
        let texts = TextResolver::new();
        let rendered = texts.resolve(
            "en_US",
            "jr_final_votes",
            &[("yes_votes", "3"), ("no_votes", "1")],
        );
        assert!(rendered.contains('3'));
        assert!(rendered.contains('1'));
        assert!(!rendered.contains("{yes_votes}"));
    }

    #[test]
    fn missing_key_falls_back_to_key() {
        let texts = TextResolver::new();
        assert_eq!(texts.text("zh_CN", "no_such_key"), "no_such_key");
    }

    #[test]
    fn every_catalog_covers_the_default_keys() {
        let texts = TextResolver::new();
        let default = &texts.catalogs[DEFAULT_LANGUAGE];
        for lang in SUPPORTED_LANGUAGES {
            for key in default.keys() {
                assert!(
                    texts.catalogs[lang].contains_key(key),
                    "{lang} is missing {key}"
                );
            }
        }
    }
}
