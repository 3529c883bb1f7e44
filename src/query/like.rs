use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use lru::LruCache;
use parking_lot::Mutex;
use regex::Regex;
use crate::core::error::Result;

/// Translates a LIKE pattern into an anchored regex.
///
/// `%` matches any sequence, `_` any single character and `\` escapes the
/// next character. A trailing lone `\` matches a literal backslash.
pub fn like_to_regex(like: &str) -> String {
    let mut regex = String::with_capacity(like.len() + 8);
    regex.push_str("(?s)^");
    let mut escape = false;
    let mut buf = [0u8; 4];
    for c in like.chars() {
        match c {
            '%' if !escape => regex.push_str(".*"),
            '_' if !escape => regex.push('.'),
            '\\' if !escape => {
                escape = true;
                continue;
            }
            _ => regex.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
        escape = false;
    }
    if escape {
        regex.push_str("\\\\");
    }
    regex.push('$');
    regex
}

/// Escapes LIKE metacharacters so that `value` matches only itself.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Compiled LIKE patterns, keyed by pattern and case sensitivity.
pub struct LikeCache {
    cache: Mutex<LruCache<(String, bool), Regex>>,
    pub hit_count: AtomicUsize,
    pub miss_count: AtomicUsize,
}

impl LikeCache {
    pub fn new(size_limit: usize) -> Self {
        let cap = NonZeroUsize::new(size_limit).unwrap_or(NonZeroUsize::MIN);
        LikeCache {
            cache: Mutex::new(LruCache::new(cap)),
            hit_count: AtomicUsize::new(0),
            miss_count: AtomicUsize::new(0),
        }
    }

    /// Whether `value` matches `pattern`. Case-insensitive matching lowercases
    /// both sides.
    pub fn matches(&self, pattern: &str, value: &str, case_insensitive: bool) -> Result<bool> {
        let regex = self.compile(pattern, case_insensitive)?;
        if case_insensitive {
            Ok(regex.is_match(&value.to_lowercase()))
        } else {
            Ok(regex.is_match(value))
        }
    }

    fn compile(&self, pattern: &str, case_insensitive: bool) -> Result<Regex> {
        let key = (pattern.to_string(), case_insensitive);
        if let Some(regex) = self.cache.lock().get(&key) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            return Ok(regex.clone());
        }
        self.miss_count.fetch_add(1, Ordering::Relaxed);
        let source = if case_insensitive {
            like_to_regex(&pattern.to_lowercase())
        } else {
            like_to_regex(pattern)
        };
        let regex = Regex::new(&source)?;
        self.cache.lock().put(key, regex.clone());
        Ok(regex)
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for LikeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LikeCache")
            .field("len", &self.len())
            .field("hit_count", &self.hit_count.load(Ordering::Relaxed))
            .field("miss_count", &self.miss_count.load(Ordering::Relaxed))
            .finish()
    }
}
