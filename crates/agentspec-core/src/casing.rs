//! Field-name casing transforms
//!
//! Canonical field names are `snake_case`. Documents may be written in
//! `camelCase`; reading accepts either, since [`camel_to_snake`] is the
//! identity on snake_case input.
//!
//! Pinned behavior:
//! - `maxCacheSize` ↔ `max_cache_size`, `topP` ↔ `top_p`, `v2Api` ↔ `v2_api`
//! - a run of capitals is one word: `HTTPServer` → `http_server`, `apiURL` → `api_url`
//! - digits stay attached to the preceding word: `maxTokens2` → `max_tokens2`
//!
//! Names whose snake → camel → snake round-trip is not the identity (for
//! example `max_tokens_2`) are rejected at registration, see [`is_reversible`].

use std::borrow::Cow;

/// Casing mode for serialized field names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldCasing {
    /// `snake_case` (canonical)
    #[default]
    SnakeCase,

    /// `camelCase`
    CamelCase,
}

impl FieldCasing {
    /// Convert a canonical field name to this casing
    #[inline]
    #[must_use]
    pub fn apply<'a>(&self, canonical: &'a str) -> Cow<'a, str> {
        match self {
            Self::SnakeCase => Cow::Borrowed(canonical),
            Self::CamelCase => Cow::Owned(snake_to_camel(canonical)),
        }
    }
}

/// Convert `camelCase` (or `snake_case`) to `snake_case`
#[must_use]
pub fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let starts_word = match prev {
                None | Some('_') => false,
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                Some(_) => false,
            };
            if starts_word {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Convert `snake_case` to `camelCase`
#[must_use]
pub fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;

    for c in name.chars() {
        if c == '_' {
            if out.is_empty() {
                out.push('_');
            } else {
                upper_next = true;
            }
            continue;
        }
        if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    out
}

/// Check that a canonical name survives a camelCase round-trip unchanged
#[inline]
#[must_use]
pub fn is_reversible(canonical: &str) -> bool {
    camel_to_snake(&snake_to_camel(canonical)) == canonical
}
