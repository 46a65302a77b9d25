//! Singular and plural names for model definitions.
//!
//! Entity names in models are usually plural (`Books`), while generated code
//! needs both a singular class (`Book`) and a plural collection (`Books`).
//! The rules here are a small, ordered set of English suffix rules; explicit
//! `@singular`/`@plural` annotations always take precedence.

/// Appended to the plural when it would otherwise equal the singular.
pub const PLURAL_SUFFIX: &str = "_";

/// Names derived for one definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inflection {
    /// The name used when the definition is referenced as a type.
    pub type_name: String,
    pub singular: String,
    pub plural: String,
}

impl Inflection {
    /// Types and aspects are not inflected.
    pub fn uninflected(name: &str) -> Self {
        Self {
            type_name: name.to_string(),
            singular: name.to_string(),
            plural: name.to_string(),
        }
    }
}

/// Something questionable that happened while deriving names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingIssue {
    EmptySingular,
    EmptyPlural,
    /// Singular and plural were equal; the plural got [`PLURAL_SUFFIX`].
    SingularEqualsPlural,
}

impl NamingIssue {
    pub fn describe(self) -> &'static str {
        match self {
            NamingIssue::EmptySingular => "derived singular name is empty, falling back to the plain name",
            NamingIssue::EmptyPlural => "derived plural name is empty, falling back to the plain name",
            NamingIssue::SingularEqualsPlural => {
                "singular and plural names are equal, the plural was suffixed with '_'"
            }
        }
    }
}

/// Derives singular and plural for a plain (unqualified) entity name.
pub fn derive(
    plain_name: &str,
    singular_override: Option<&str>,
    plural_override: Option<&str>,
) -> (Inflection, Vec<NamingIssue>) {
    let mut issues = Vec::new();

    let mut plural = plural_override.map(last_segment).unwrap_or(plain_name).to_string();
    if plural.is_empty() {
        issues.push(NamingIssue::EmptyPlural);
        plural = plain_name.to_string();
    }

    let mut singular = match singular_override {
        Some(s) => last_segment(s).to_string(),
        None => singular4(plain_name),
    };
    if singular.is_empty() {
        issues.push(NamingIssue::EmptySingular);
        singular = plain_name.to_string();
    }

    if singular == plural {
        issues.push(NamingIssue::SingularEqualsPlural);
        plural.push_str(PLURAL_SUFFIX);
    }

    (
        Inflection {
            type_name: singular.clone(),
            singular,
            plural,
        },
        issues,
    )
}

fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

fn split_last(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) => (&name[..=i], &name[i + 1..]),
        None => ("", name),
    }
}

fn is_consonant(c: char) -> bool {
    c.is_ascii_alphabetic() && !matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

/// The letter right before the last `suffix_len` characters.
fn char_before(word: &str, suffix_len: usize) -> Option<char> {
    let chars: Vec<char> = word.chars().collect();
    chars.len().checked_sub(suffix_len + 1).map(|i| chars[i])
}

fn drop_chars(word: &str, n: usize) -> &str {
    let cut = word.char_indices().rev().nth(n - 1).map(|(i, _)| i).unwrap_or(0);
    &word[..cut]
}

/// Singular of the last dot-segment of `name`.
pub fn singular4(name: &str) -> String {
    let (prefix, word) = split_last(name);
    let lower = word.to_lowercase();

    let singular = if lower.ends_with("species") || lower.ends_with("news") || lower.ends_with("ess") {
        word.to_string()
    } else if lower.ends_with("ees") {
        drop_chars(word, 1).to_string()
    } else if lower.ends_with("ses") || lower.ends_with("zes") {
        drop_chars(word, 2).to_string()
    } else if lower.ends_with("ies") && char_before(word, 3).map(is_consonant).unwrap_or(false) {
        format!("{}y", drop_chars(word, 3))
    } else if lower.ends_with('s') || lower.ends_with('_') {
        drop_chars(word, 1).to_string()
    } else {
        word.to_string()
    };

    format!("{}{}", prefix, singular)
}

/// Plural of the last dot-segment of `name`.
pub fn plural4(name: &str) -> String {
    let (prefix, word) = split_last(name);
    let lower = word.to_lowercase();

    let plural = if ["analysis", "status", "species", "news"].iter().any(|s| lower.ends_with(s)) {
        word.to_string()
    } else if lower.ends_with('y') && char_before(word, 1).map(is_consonant).unwrap_or(false) {
        format!("{}ies", drop_chars(word, 1))
    } else if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        format!("{}es", word)
    } else {
        format!("{}s", word)
    };

    format!("{}{}", prefix, plural)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singular_rules() {
        assert_eq!(singular4("Books"), "Book");
        assert_eq!(singular4("Species"), "Species");
        assert_eq!(singular4("BREAKING_NEWS"), "BREAKING_NEWS");
        assert_eq!(singular4("Address"), "Address");
        assert_eq!(singular4("Employees"), "Employee");
        assert_eq!(singular4("Addresses"), "Address");
        assert_eq!(singular4("Quizzes"), "Quizz");
        assert_eq!(singular4("Categories"), "Category");
        assert_eq!(singular4("Movies"), "Movy");
        assert_eq!(singular4("Foo_"), "Foo");
        assert_eq!(singular4("Person"), "Person");
    }

    #[test]
    fn singular_keeps_namespace_prefix() {
        assert_eq!(singular4("bookshop.Books"), "bookshop.Book");
    }

    #[test]
    fn plural_rules() {
        assert_eq!(plural4("Analysis"), "Analysis");
        assert_eq!(plural4("OrderStatus"), "OrderStatus");
        assert_eq!(plural4("Category"), "Categories");
        assert_eq!(plural4("Day"), "Days");
        assert_eq!(plural4("Box"), "Boxes");
        assert_eq!(plural4("Match"), "Matches");
        assert_eq!(plural4("Book"), "Books");
    }

    #[test]
    fn derive_disambiguates_equal_names() {
        let (inflection, issues) = derive("Sheep", None, None);
        assert_eq!(inflection.singular, "Sheep");
        assert_eq!(inflection.plural, "Sheep_");
        assert_eq!(issues, vec![NamingIssue::SingularEqualsPlural]);
    }

    #[test]
    fn derive_honors_annotations() {
        let (inflection, issues) = derive("People", Some("Person"), Some("bookshop.Persons"));
        assert_eq!(inflection.singular, "Person");
        assert_eq!(inflection.plural, "Persons");
        assert_eq!(inflection.type_name, "Person");
        assert!(issues.is_empty());
    }

    #[test]
    fn derive_recovers_from_empty_singular() {
        let (inflection, issues) = derive("s", None, None);
        assert_eq!(inflection.singular, "s");
        assert_eq!(inflection.plural, "s_");
        assert_eq!(issues, vec![NamingIssue::EmptySingular, NamingIssue::SingularEqualsPlural]);
    }

    #[test]
    fn singular_never_equals_plural_after_derive() {
        for name in ["Books", "Sheep", "News", "Address", "Categories", "x", "Foo_", "s"] {
            let (inflection, _) = derive(name, None, None);
            assert_ne!(inflection.singular, inflection.plural, "{}", name);
        }
    }
}
