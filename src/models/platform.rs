use std::collections::BTreeMap;
use std::fmt;

use crate::error::AppError;

/// External job boards the collectors know how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    HeadHunter,
    SuperJob,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::HeadHunter, Platform::SuperJob];

    /// Short selector code shown in the platform menu.
    pub fn code(self) -> &'static str {
        match self {
            Platform::HeadHunter => "1",
            Platform::SuperJob => "2",
        }
    }

    /// Name used as the bucket key in the file store.
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::HeadHunter => "HH.ru",
            Platform::SuperJob => "SuperJob.ru",
        }
    }

    pub fn from_code(code: &str) -> Option<Platform> {
        Self::ALL.into_iter().find(|p| p.code() == code.trim())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Selected platforms, keyed by selector code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: BTreeMap<&'static str, Platform>,
}

impl Catalog {
    #[allow(dead_code)]
    pub fn all() -> Self {
        Self::from_platforms(Platform::ALL)
    }

    #[allow(dead_code)]
    pub fn from_platforms(platforms: impl IntoIterator<Item = Platform>) -> Self {
        let entries = platforms.into_iter().map(|p| (p.code(), p)).collect();
        Self { entries }
    }

    /// Build a catalog from selector codes. Repeated codes are ignored.
    pub fn select<S: AsRef<str>>(codes: &[S]) -> Result<Self, AppError> {
        let mut catalog = Self::default();
        for code in codes {
            let platform = Platform::from_code(code.as_ref()).ok_or_else(|| {
                AppError::Config(format!("Unknown platform code '{}'", code.as_ref()))
            })?;
            catalog.insert(platform);
        }
        Ok(catalog)
    }

    /// Returns false when the platform was already selected.
    pub fn insert(&mut self, platform: Platform) -> bool {
        self.entries.insert(platform.code(), platform).is_none()
    }

    #[allow(dead_code)]
    pub fn contains(&self, platform: Platform) -> bool {
        self.entries.contains_key(platform.code())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.values().any(|p| p.display_name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selected platforms in selector-code order.
    pub fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        self.entries.values().copied()
    }
}
