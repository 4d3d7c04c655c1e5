use std::collections::HashMap;

const BUILTIN_LANGUAGES: &[(&str, &str)] = &[("english", "en"), ("arabic", "ara")];

/// Maps human-readable language names to the catalog's language ids.
///
/// Built once at startup and passed by reference; entries can only be added
/// before the table is shared.
#[derive(Debug, Clone)]
pub struct LanguageTable {
    codes: HashMap<String, String>,
}

impl LanguageTable {
    pub fn builtin() -> Self {
        let codes = BUILTIN_LANGUAGES
            .iter()
            .map(|(name, code)| (name.to_string(), code.to_string()))
            .collect();
        Self { codes }
    }

    /// Appends extra entries. Built-in names are never overwritten.
    pub fn with_extra<I>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, code) in extra {
            self.codes.entry(name.to_lowercase()).or_insert(code);
        }
        self
    }

    /// Resolves a language name (case-insensitive). Unknown names resolve to an
    /// empty code, which makes the catalog return every language.
    pub fn code_for(&self, name: &str) -> &str {
        self.codes
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
            .unwrap_or("")
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_codes() {
        let table = LanguageTable::builtin();
        assert_eq!(table.code_for("english"), "en");
        assert_eq!(table.code_for("English"), "en");
        assert_eq!(table.code_for("arabic"), "ara");
    }

    #[test]
    fn test_unknown_language_is_empty_code() {
        let table = LanguageTable::builtin();
        assert_eq!(table.code_for("klingon"), "");
        assert_eq!(table.code_for(""), "");
    }

    #[test]
    fn test_extra_entries_append_only() {
        let table = LanguageTable::builtin().with_extra([
            ("Klingon".to_string(), "tlh".to_string()),
            ("english".to_string(), "xx".to_string()),
        ]);
        assert_eq!(table.code_for("klingon"), "tlh");
        assert_eq!(table.code_for("english"), "en");
    }
}
