use crate::constants::{api, limits};

/// Process-wide limits, read once at start-up and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub character_limit: usize,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub default_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            character_limit: limits::CHARACTER_LIMIT,
            default_page_size: limits::DEFAULT_PAGE_SIZE,
            max_page_size: limits::MAX_PAGE_SIZE,
            default_base_url: api::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let character_limit = positive_u64(lookup("LOOM_CHARACTER_LIMIT"))
            .map(|v| v as usize)
            .unwrap_or(defaults.character_limit);
        let max_page_size = positive_u64(lookup("LOOM_MAX_PAGE_SIZE"))
            .map(|v| v.min(u32::MAX as u64) as u32)
            .unwrap_or(defaults.max_page_size);
        let default_page_size = positive_u64(lookup("LOOM_DEFAULT_PAGE_SIZE"))
            .map(|v| v.min(u32::MAX as u64) as u32)
            .unwrap_or(defaults.default_page_size)
            .min(max_page_size);
        Self {
            character_limit,
            default_page_size,
            max_page_size,
            default_base_url: defaults.default_base_url,
        }
    }

    /// Clamps a caller-supplied page size into `1..=max_page_size`.
    pub fn clamp_page_size(&self, requested: Option<u32>) -> Option<u32> {
        requested.map(|n| n.clamp(1, self.max_page_size))
    }
}

fn positive_u64(raw: Option<String>) -> Option<u64> {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
}
