//! Conversation slugs: readable prefix from the name plus a random suffix.

use rand::Rng;

const MAX_PREFIX_LEN: usize = 50;
const SUFFIX_LEN: usize = 8;
const FALLBACK_PREFIX: &str = "conversation";

/// Lower-case ASCII alphanumerics; every other run becomes a single `-`.
pub fn slugify(name: Option<&str>) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;

    for ch in name.unwrap_or_default().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.len() > MAX_PREFIX_LEN {
        slug.truncate(MAX_PREFIX_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    if slug.is_empty() {
        FALLBACK_PREFIX.to_string()
    } else {
        slug
    }
}

pub fn generate_slug(name: Option<&str>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| {
            let nibble: u8 = rng.gen_range(0..16);
            char::from_digit(u32::from(nibble), 16).unwrap_or('0')
        })
        .collect();

    format!("{}-{}", slugify(name), suffix)
}
