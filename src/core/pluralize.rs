//! English pluralization for collection names.
//!
//! The plural form determines the public URL surface of every entity, so
//! irregular plurals are a correctness requirement here, not cosmetics.

/// Nouns whose plural is not derivable from suffix rules.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("goose", "geese"),
    ("mouse", "mice"),
    ("ox", "oxen"),
    ("datum", "data"),
    ("criterion", "criteria"),
    ("index", "indices"),
];

/// Nouns identical in singular and plural.
const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "news",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "deer",
    "media",
];

/// Convert a singular noun to its plural form.
///
/// # Examples
///
/// ```
/// use crudkit::core::pluralize::pluralize;
///
/// assert_eq!(pluralize("user"), "users");
/// assert_eq!(pluralize("company"), "companies");
/// assert_eq!(pluralize("address"), "addresses");
/// assert_eq!(pluralize("person"), "people");
/// ```
pub fn pluralize(singular: &str) -> String {
    if singular.is_empty() {
        return String::new();
    }

    if UNCOUNTABLE.contains(&singular) {
        return singular.to_string();
    }

    if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == singular) {
        return (*plural).to_string();
    }

    match singular {
        // consonant + y -> ies
        s if s.len() > 1
            && s.ends_with('y')
            && !matches!(
                s.as_bytes()[s.len() - 2],
                b'a' | b'e' | b'i' | b'o' | b'u'
            ) =>
        {
            format!("{}ies", &s[..s.len() - 1])
        }

        // sibilant endings -> es
        s if s.ends_with('s')
            || s.ends_with("sh")
            || s.ends_with("ch")
            || s.ends_with('x')
            || s.ends_with('z') =>
        {
            format!("{}es", s)
        }

        // fe -> ves (knife -> knives)
        s if s.len() > 2 && s.ends_with("fe") => {
            format!("{}ves", &s[..s.len() - 2])
        }

        // f -> ves (wolf -> wolves)
        s if s.len() > 1 && s.ends_with('f') => {
            format!("{}ves", &s[..s.len() - 1])
        }

        // consonant + o -> es, with common exceptions that just take s
        s if s.len() > 1 && s.ends_with('o') => {
            let before_o = s.as_bytes()[s.len() - 2];
            if matches!(before_o, b'a' | b'e' | b'i' | b'o' | b'u')
                || matches!(s, "photo" | "piano" | "halo" | "memo" | "pro")
            {
                format!("{}s", s)
            } else {
                format!("{}es", s)
            }
        }

        s => format!("{}s", s),
    }
}
