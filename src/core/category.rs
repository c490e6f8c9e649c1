//! Category alias resolution
//!
//! Budgets are keyed by canonical category names (`food`) while records
//! synced from older app versions carry the localized display label
//! (`طعام`). Both forms identify the same category everywhere amounts are
//! grouped or matched, so the mapping is built once here instead of being
//! re-derived at each call site.

use std::collections::HashMap;

/// Built-in expense categories as `(canonical key, display label)` pairs.
pub const EXPENSE_CATEGORIES: &[(&str, &str)] = &[
    ("food", "طعام"),
    ("transport", "مواصلات"),
    ("rent", "إيجار"),
    ("utilities", "فواتير"),
    ("health", "صحة"),
    ("education", "تعليم"),
    ("shopping", "تسوق"),
    ("entertainment", "ترفيه"),
    ("debt", "ديون"),
    ("other", "أخرى"),
];

/// Built-in income sources.
pub const INCOME_SOURCES: &[(&str, &str)] = &[
    ("salary", "راتب"),
    ("business", "عمل حر"),
    ("investment", "استثمار"),
    ("gift", "هدية"),
    ("other_income", "دخل آخر"),
];

/// Bidirectional key ⇔ label map. Names outside the catalog (user-defined
/// custom categories) resolve to themselves.
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    canonical: HashMap<String, String>,
}

impl CategoryCatalog {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        let mut canonical = HashMap::new();
        for (key, label) in pairs {
            canonical.insert((*key).to_string(), (*key).to_string());
            canonical.insert((*label).to_string(), (*key).to_string());
        }
        CategoryCatalog { canonical }
    }

    /// Resolves either form of a category name to its canonical key.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.canonical.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Whether two names identify the same category under either scheme.
    pub fn same(&self, a: &str, b: &str) -> bool {
        self.resolve(a) == self.resolve(b)
    }
}

impl Default for CategoryCatalog {
    /// Catalog covering the built-in expense categories and income sources.
    fn default() -> Self {
        let pairs: Vec<(&str, &str)> = EXPENSE_CATEGORIES
            .iter()
            .chain(INCOME_SOURCES.iter())
            .copied()
            .collect();
        CategoryCatalog::new(&pairs)
    }
}
