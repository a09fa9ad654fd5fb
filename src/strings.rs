//! String transforms shared across add-on code.
//!
//! These are small, allocation-per-call helpers for turning user-facing
//! titles into slugs, class-ish names, and back. They intentionally avoid
//! locale handling; the host only feeds them ASCII identifiers.

/// Replace every non-alphanumeric character with `separator` and lowercase.
///
/// # Example
///
/// ```
/// use basee::strings::slugify;
///
/// assert_eq!(slugify("Hello World!", '-'), "hello-world-");
/// assert_eq!(slugify("Entry Title", '_'), "entry_title");
/// ```
pub fn slugify(input: &str, separator: char) -> String {
    input
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { separator })
        .collect()
}

/// Upper-camel-case a dash/underscore separated word: `foo-bar` → `FooBar`.
pub fn classify(word: &str) -> String {
    title_case(word).replace(' ', "")
}

/// Title-case a dash/underscore separated word: `foo-bar` → `Foo Bar`.
pub fn title_case(word: &str) -> String {
    word.replace(['-', '_'], " ")
        .split(' ')
        .map(ucfirst)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lower-camel-case a dash/underscore separated word: `foo-bar` → `fooBar`.
pub fn camelize(word: &str) -> String {
    lcfirst(&classify(word))
}

/// Reverse of [`camelize`]: `fooBar` → `foo_bar`.
pub fn decamelize(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 4);
    for c in word.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out.trim_start_matches('_').to_string()
}

/// Prefix `input` with `prefix` unless it already starts with it.
pub fn add_prefix(input: &str, prefix: char) -> String {
    if !input.is_empty() && !input.starts_with(prefix) {
        return format!("{}{}", prefix, input);
    }

    input.to_string()
}

/// Suffix `input` with `suffix` unless it already ends with it.
pub fn add_suffix(input: &str, suffix: char) -> String {
    if !input.is_empty() && !input.ends_with(suffix) {
        return format!("{}{}", input, suffix);
    }

    input.to_string()
}

fn ucfirst(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lcfirst(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
