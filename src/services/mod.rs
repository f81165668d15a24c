//! Domain services. Handlers stay thin; these own the data-store calls and
//! the checkout orchestration.

pub mod cart;
pub mod catalog;
pub mod categories;
pub mod orders;
pub mod payments;
pub mod users;

/// URL-safe slug from a display name: lowercased alphanumeric runs joined
/// by single dashes.
pub(crate) fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_dash = true;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn slugify_basics() {
        assert_eq!(slugify("Intel NUC 10"), "intel-nuc-10");
        assert_eq!(slugify("  Spaced   Out  "), "spaced-out");
        assert_eq!(slugify("Caffè Latte!"), "caff-latte");
        assert_eq!(slugify("---"), "");
    }
}
