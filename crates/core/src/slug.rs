//! Slug generation and unique slug allocation.

use std::future::Future;

use quill_common::{AppError, AppResult};
use unicode_normalization::UnicodeNormalization;

/// Longest slug generated for a post.
pub const POST_SLUG_MAX_LEN: usize = 201;
/// Longest category slug.
pub const CATEGORY_SLUG_MAX_LEN: usize = 90;
/// Longest tag slug.
pub const TAG_SLUG_MAX_LEN: usize = 60;

const FALLBACK_SLUG: &str = "item";

/// Turn arbitrary text into a URL-safe slug of at most `max_len` characters.
///
/// The text is NFKD-decomposed so accented letters keep their base letter
/// (`Café` becomes `cafe`), then lowercased. ASCII letters, digits,
/// underscores and hyphens are kept and runs of whitespace and hyphens
/// collapse into a single hyphen. Everything else is dropped. Leading and
/// trailing hyphens and underscores are trimmed. The result may be empty.
#[must_use]
pub fn slugify(text: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.nfkd().filter(char::is_ascii).map(|c| c.to_ascii_lowercase()) {
        if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            slug.push(c);
        }
    }

    let trimmed = slug.trim_matches(|c| c == '-' || c == '_');
    let truncated: String = trimmed.chars().take(max_len).collect();
    truncated.trim_end_matches('-').to_string()
}

/// Allocate a slug derived from `base_text` that `exists` reports as free.
///
/// The first candidate is the slugified text (or `item` when that is empty);
/// following candidates append `-2`, `-3`, ... while keeping the whole slug
/// within `max_len`.
pub async fn allocate<F, Fut>(base_text: &str, max_len: usize, mut exists: F) -> AppResult<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = AppResult<bool>>,
{
    let mut base = slugify(base_text, max_len);
    if base.is_empty() {
        base = FALLBACK_SLUG.chars().take(max_len).collect();
    }

    if !exists(base.clone()).await? {
        return Ok(base);
    }

    let mut n: u64 = 2;
    loop {
        let suffix = format!("-{n}");
        let keep = max_len.saturating_sub(suffix.len());
        let head: String = base.chars().take(keep).collect();
        let candidate = format!("{}{suffix}", head.trim_end_matches('-'));

        if !exists(candidate.clone()).await? {
            tracing::debug!(slug = %candidate, attempts = n, "Allocated suffixed slug");
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Normalize a slug supplied by a caller: trimmed and lowercased.
pub fn normalize_required(slug: &str) -> AppResult<String> {
    let slug = slug.trim().to_lowercase();
    if slug.is_empty() {
        return Err(AppError::Validation("slug is required.".to_string()));
    }
    Ok(slug)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World!", 50), "hello-world");
        assert_eq!(slugify("  Rust -- is   fun ", 50), "rust-is-fun");
        assert_eq!(slugify("snake_case stays", 50), "snake_case-stays");
        assert_eq!(slugify("_-edges-_", 50), "edges");
        assert_eq!(slugify("¿Qué?", 50), "que");
        assert_eq!(slugify("!!!", 50), "");
    }

    #[test]
    fn test_slugify_folds_accents() {
        assert_eq!(slugify("Café Déjà Vu", 50), "cafe-deja-vu");
        assert_eq!(slugify("Ｆｕｌｌ\u{3000}Ｗｉｄｔｈ", 50), "full-width");
        assert_eq!(slugify("日本語", 50), "");
    }

    #[test]
    fn test_slugify_truncates() {
        assert_eq!(slugify("abcdef", 3), "abc");
        assert_eq!(slugify("ab cd", 3), "ab");
    }

    #[tokio::test]
    async fn test_allocate_appends_counter() {
        let taken = Mutex::new(HashSet::new());

        for expected in ["hello-world", "hello-world-2", "hello-world-3"] {
            let slug = allocate("Hello World!", POST_SLUG_MAX_LEN, |candidate| {
                let found = taken.lock().unwrap().contains(&candidate);
                async move { Ok(found) }
            })
            .await
            .unwrap();

            assert_eq!(slug, expected);
            taken.lock().unwrap().insert(slug);
        }
    }

    #[tokio::test]
    async fn test_allocate_falls_back_to_item() {
        let slug = allocate("???", TAG_SLUG_MAX_LEN, |_| async { Ok(false) })
            .await
            .unwrap();
        assert_eq!(slug, "item");
    }

    #[tokio::test]
    async fn test_allocate_respects_max_len() {
        let slug = allocate("abcdefghij", 10, |candidate| {
            let found = candidate == "abcdefghij";
            async move { Ok(found) }
        })
        .await
        .unwrap();

        assert_eq!(slug, "abcdefgh-2");
    }

    #[tokio::test]
    async fn test_allocate_propagates_errors() {
        let result = allocate("x", 10, |_| async {
            Err(AppError::Database("down".to_string()))
        })
        .await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[test]
    fn test_normalize_required() {
        assert_eq!(normalize_required("  Rust ").unwrap(), "rust");
        match normalize_required("   ") {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "slug is required."),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
