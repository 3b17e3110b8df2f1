//! URL slug derivation

use sea_orm::ActiveValue;

/// Turn a display name into a URL slug.
///
/// Alphanumerics (any script) are kept and lowercased; every run of other
/// characters collapses into a single `-`. The result never starts or ends
/// with `-` and holds at most `max_len` characters.
pub fn slugify(input: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.chars().count() > max_len {
        slug = slug.chars().take(max_len).collect();
    }
    slug.trim_end_matches('-').to_string()
}

/// Fill a blank slug from the source field before save
pub(crate) fn fill_slug(
    slug: &mut ActiveValue<String>,
    source: &ActiveValue<String>,
    max_len: usize,
) {
    let blank = match slug {
        ActiveValue::Set(s) | ActiveValue::Unchanged(s) => s.trim().is_empty(),
        ActiveValue::NotSet => true,
    };
    if !blank {
        return;
    }
    match source {
        ActiveValue::Set(name) | ActiveValue::Unchanged(name) => {
            *slug = ActiveValue::Set(slugify(name, max_len));
        }
        ActiveValue::NotSet => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_ascii() {
        assert_eq!(slugify("Power Tools & Drills", 200), "power-tools-drills");
        assert_eq!(slugify("  --Hello--World--  ", 200), "hello-world");
    }

    #[test]
    fn test_slugify_keeps_cyrillic() {
        assert_eq!(slugify("Дрели и шуруповёрты", 200), "дрели-и-шуруповёрты");
    }

    #[test]
    fn test_slugify_truncates_without_trailing_dash() {
        assert_eq!(slugify("abc def", 4), "abc");
        assert_eq!(slugify("abcdef", 3), "abc");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify("!!!", 10), "");
    }

    #[test]
    fn test_fill_slug_only_when_blank() {
        let name = ActiveValue::Set("New Brand".to_string());

        let mut slug = ActiveValue::NotSet;
        fill_slug(&mut slug, &name, 160);
        assert_eq!(slug, ActiveValue::Set("new-brand".to_string()));

        let mut slug = ActiveValue::Set("custom".to_string());
        fill_slug(&mut slug, &name, 160);
        assert_eq!(slug, ActiveValue::Set("custom".to_string()));

        let mut slug = ActiveValue::Set(String::new());
        fill_slug(&mut slug, &name, 160);
        assert_eq!(slug, ActiveValue::Set("new-brand".to_string()));
    }
}
