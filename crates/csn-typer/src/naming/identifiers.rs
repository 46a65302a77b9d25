//! Turning model names into TypeScript identifiers.

/// Words that cannot name a class or a const in TypeScript.
const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with", "let", "static", "yield",
    "await", "implements", "interface", "package", "private", "protected", "public",
];

/// Whether `name` can be used verbatim as a property name or binding.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Makes `name` usable as a class, function or const name by replacing
/// every invalid character with `_`.
pub fn sanitize_identifier(name: &str) -> String {
    let mut result: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if result.is_empty()
        || result.starts_with(|c: char| c.is_ascii_digit())
        || RESERVED.contains(&result.as_str())
    {
        result.insert(0, '_');
    }
    result
}

/// A property key, quoted if it is not a plain identifier.
pub fn property_name(name: &str) -> String {
    if is_valid_identifier(name) {
        name.to_string()
    } else {
        quote_string(name)
    }
}

/// A single-quoted string literal.
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}
