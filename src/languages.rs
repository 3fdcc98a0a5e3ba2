/// Language code used when a request names no languages at all.
pub const DEFAULT_LANGUAGE: &str = "en";

/// An ordered list of language codes, highest priority first.
///
/// Order and duplicates are kept exactly as given. Codes are trimmed and blank entries dropped.
/// An empty list falls back to `[DEFAULT_LANGUAGE]`, so a preference is never empty once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePreference {
    codes: Vec<String>,
}

impl LanguagePreference {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: Vec<String> = codes
            .into_iter()
            .map(|code| {
                let code: String = code.into();
                code.trim().to_owned()
            })
            .filter(|code| !code.is_empty())
            .collect();

        if codes.is_empty() {
            return Self::default();
        }
        Self { codes }
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }
}

impl Default for LanguagePreference {
    fn default() -> Self {
        Self {
            codes: vec![DEFAULT_LANGUAGE.to_owned()],
        }
    }
}

impl<S: Into<String>> FromIterator<S> for LanguagePreference {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_falls_back_to_default() {
        let prefs = LanguagePreference::new(Vec::<String>::new());
        assert_eq!(prefs, LanguagePreference::default());
        assert_eq!(prefs.codes(), ["en"]);
    }

    #[test]
    fn blank_entries_are_dropped() {
        let prefs = LanguagePreference::new(["", "fr", "  "]);
        assert_eq!(prefs.codes(), ["fr"]);

        let prefs = LanguagePreference::new(["", " "]);
        assert_eq!(prefs.codes(), [DEFAULT_LANGUAGE]);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let prefs = LanguagePreference::new([" en", "fr\t"]);
        assert_eq!(prefs.codes(), ["en", "fr"]);
    }

    #[test]
    fn order_and_duplicates_are_preserved() {
        let prefs: LanguagePreference = ["fr", "ar", "fr"].into_iter().collect();
        assert_eq!(prefs.iter().collect::<Vec<_>>(), ["fr", "ar", "fr"]);
    }
}
