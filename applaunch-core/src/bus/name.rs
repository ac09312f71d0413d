//! Message bus name validation.
//!
//! Follows the D-Bus naming rules: at most 255 bytes, two or more
//! dot-separated elements drawn from `[A-Za-z0-9_-]`. Well-known names may
//! not start an element with a digit; unique names start with `:` and may.

/// Maximum length of a bus name in bytes.
pub const MAX_NAME_LEN: usize = 255;

fn valid_element(element: &str, allow_leading_digit: bool) -> bool {
    let mut chars = element.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !allow_leading_digit && first.is_ascii_digit() {
        return false;
    }
    std::iter::once(first)
        .chain(chars)
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn valid_elements(body: &str, allow_leading_digit: bool) -> bool {
    let mut count = 0usize;
    for element in body.split('.') {
        if !valid_element(element, allow_leading_digit) {
            return false;
        }
        count += 1;
    }
    count >= 2
}

/// Whether `name` is a syntactically valid unique connection name (`:1.42`).
pub fn is_unique_name(name: &str) -> bool {
    if name.len() > MAX_NAME_LEN {
        return false;
    }
    name.strip_prefix(':')
        .is_some_and(|body| valid_elements(body, true))
}

/// Whether `name` is a syntactically valid bus name, unique or well-known.
pub fn is_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return false;
    }
    if name.starts_with(':') {
        return is_unique_name(name);
    }
    valid_elements(name, false)
}

/// Whether `name` is a valid well-known (non-unique) bus name.
pub fn is_well_known_name(name: &str) -> bool {
    is_name(name) && !is_unique_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_known_names() {
        for name in [
            "org.freedesktop.DBus",
            "com.example.App",
            "org.foo",
            "org.gtk.vfs-daemon",
            "a_b.c_d",
        ] {
            assert!(is_name(name), "{name}");
            assert!(is_well_known_name(name), "{name}");
        }
    }

    #[test]
    fn rejects_malformed_names() {
        for name in [
            "",
            "org",
            ".org.foo",
            "org..foo",
            "org.foo.",
            "org.1foo",
            "org.foo bar",
            "org.foo*",
            "org/foo.bar",
        ] {
            assert!(!is_name(name), "{name:?}");
        }
    }

    #[test]
    fn unique_names_are_names_but_not_well_known() {
        assert!(is_unique_name(":1.42"));
        assert!(is_name(":1.42"));
        assert!(!is_well_known_name(":1.42"));
        assert!(!is_unique_name(":1"));
        assert!(!is_unique_name("org.foo"));
    }

    #[test]
    fn enforces_length_limit() {
        let long = format!("org.{}", "a".repeat(MAX_NAME_LEN));
        assert!(!is_name(&long));
        let fits = format!("org.{}", "a".repeat(MAX_NAME_LEN - 4));
        assert!(is_name(&fits));
    }
}
