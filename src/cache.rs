//! Parsed template cache
//!
//! Maps the exact source string to its parsed [`Template`]. Entries expire
//! after a period without lookups (sliding expiration) and the summed entry
//! weight is kept under a ceiling by evicting the least recently used entries.
//!
//! The map is a `DashMap`, so lookups and insertions for different keys never
//! contend on one lock. Two threads missing on the same key may both run the
//! grammar; the entry API makes the first insertion win and every caller
//! receives that retained `Arc`. Failed parses are never stored.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::mem;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

use hashbrace_config::{CacheConfig, ConfigError, HashbraceConfig, Loader};
use std::path::Path;

use crate::ast::{Template, TemplateToken};
use crate::error::ParseError;
use crate::parsing::{parse_template, GrammarLimits};

/// Expiry and size knobs for a [`TemplateCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub sliding_expiration: Duration,
    pub max_weight: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            sliding_expiration: Duration::from_secs(600),
            max_weight: 64 * 1024 * 1024,
        }
    }
}

impl From<&CacheConfig> for CacheSettings {
    fn from(config: &CacheConfig) -> Self {
        Self {
            sliding_expiration: Duration::from_secs(config.sliding_expiration_secs),
            max_weight: config.max_weight,
        }
    }
}

/// Approximate memory held by one entry: the key (counted at two bytes per
/// byte of source, covering the stored fragments) plus one token slot per
/// node in the tree.
pub fn entry_weight(source: &str, template: &Template) -> usize {
    source.len() * 2 + template.node_count() * mem::size_of::<TemplateToken>()
}

struct CacheEntry {
    template: Arc<Template>,
    weight: usize,
    /// Nanoseconds since the owning cache's epoch
    last_access: AtomicU64,
}

impl CacheEntry {
    fn new(template: Arc<Template>, weight: usize, now: u64) -> Self {
        Self {
            template,
            weight,
            last_access: AtomicU64::new(now),
        }
    }

    fn touch(&self, now: u64) {
        self.last_access.fetch_max(now, Ordering::Relaxed);
    }

    fn last_access(&self) -> u64 {
        self.last_access.load(Ordering::Relaxed)
    }

    fn is_expired(&self, now: u64, window: u64) -> bool {
        now.saturating_sub(self.last_access()) > window
    }
}

/// Result of the non-failing parse entry point.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub template: Option<Arc<Template>>,
    pub error: Option<String>,
}

impl ParseOutcome {
    pub fn success(&self) -> bool {
        self.template.is_some()
    }
}

impl From<Result<Arc<Template>, ParseError>> for ParseOutcome {
    fn from(result: Result<Arc<Template>, ParseError>) -> Self {
        match result {
            Ok(template) => ParseOutcome {
                template: Some(template),
                error: None,
            },
            Err(error) => ParseOutcome {
                template: None,
                error: Some(error.to_string()),
            },
        }
    }
}

pub struct TemplateCache {
    entries: DashMap<String, CacheEntry>,
    total_weight: AtomicUsize,
    settings: CacheSettings,
    limits: GrammarLimits,
    epoch: Instant,
}

impl TemplateCache {
    pub fn new(settings: CacheSettings, limits: GrammarLimits) -> Self {
        Self {
            entries: DashMap::new(),
            total_weight: AtomicUsize::new(0),
            settings,
            limits,
            epoch: Instant::now(),
        }
    }

    pub fn from_config(config: &HashbraceConfig) -> Self {
        Self::new(
            CacheSettings::from(&config.cache),
            GrammarLimits::from(&config.grammar),
        )
    }

    /// Build a cache from a TOML file layered over the embedded defaults.
    /// Keys the file leaves out keep their default values.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Loader::new().with_file(path).build()?;
        Ok(Self::from_config(&config))
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub fn limits(&self) -> &GrammarLimits {
        &self.limits
    }

    /// Return the cached template for `source`, parsing and storing it on a
    /// miss. A hit restarts the entry's expiration window.
    pub fn get_or_parse(&self, source: &str) -> Result<Arc<Template>, ParseError> {
        if let Some(template) = self.lookup(source) {
            return Ok(template);
        }

        debug!(length = source.len(), "template cache miss");
        let template = match parse_template(source, &self.limits) {
            Ok(template) => template,
            Err(error) => {
                debug!(%error, "template parse failed");
                return Err(error);
            }
        };

        let retained = self.insert(source, template);
        self.enforce_ceiling();
        Ok(retained)
    }

    /// Like [`get_or_parse`](Self::get_or_parse), reporting failures as a
    /// message instead of an error value.
    pub fn try_get_or_parse(&self, source: &str) -> ParseOutcome {
        self.get_or_parse(source).into()
    }

    /// Whether `source` currently has an entry, expired or not. Does not
    /// count as an access.
    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_weight(&self) -> usize {
        self.total_weight.load(Ordering::Relaxed)
    }

    /// Drop every entry whose window has elapsed. Returns how many were
    /// removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.now();
        let window = self.window();
        let mut removed = 0;

        self.entries.retain(|_, entry| {
            if entry.is_expired(now, window) {
                self.total_weight.fetch_sub(entry.weight, Ordering::Relaxed);
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "purged expired templates");
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.retain(|_, entry| {
            self.total_weight.fetch_sub(entry.weight, Ordering::Relaxed);
            false
        });
    }

    fn lookup(&self, source: &str) -> Option<Arc<Template>> {
        let now = self.now();
        let window = self.window();

        let expired = match self.entries.get(source) {
            Some(entry) if !entry.is_expired(now, window) => {
                entry.touch(now);
                trace!(length = source.len(), "template cache hit");
                return Some(entry.template.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            if let Some((_, entry)) = self
                .entries
                .remove_if(source, |_, entry| entry.is_expired(now, window))
            {
                self.total_weight.fetch_sub(entry.weight, Ordering::Relaxed);
                debug!(weight = entry.weight, "template cache entry expired");
            }
        }
        None
    }

    fn insert(&self, source: &str, template: Template) -> Arc<Template> {
        let now = self.now();
        let weight = entry_weight(source, &template);

        match self.entries.entry(source.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now, self.window()) {
                    let template = Arc::new(template);
                    self.total_weight.fetch_add(weight, Ordering::Relaxed);
                    let stale = occupied.insert(CacheEntry::new(template.clone(), weight, now));
                    self.total_weight.fetch_sub(stale.weight, Ordering::Relaxed);
                    debug!(weight, "replaced expired template");
                    template
                } else {
                    // Another caller parsed the same source first.
                    let entry = occupied.get();
                    entry.touch(now);
                    entry.template.clone()
                }
            }
            Entry::Vacant(vacant) => {
                let template = Arc::new(template);
                self.total_weight.fetch_add(weight, Ordering::Relaxed);
                vacant.insert(CacheEntry::new(template.clone(), weight, now));
                debug!(weight, total_weight = self.total_weight(), "cached template");
                template
            }
        }
    }

    /// Bring the total weight back under the ceiling: expired entries go
    /// first, then the least recently used ones.
    fn enforce_ceiling(&self) {
        let max_weight = self.settings.max_weight;
        if self.total_weight() <= max_weight {
            return;
        }

        self.purge_expired();
        if self.total_weight() <= max_weight {
            return;
        }

        let mut by_age: Vec<(u64, String)> = self
            .entries
            .iter()
            .map(|entry| (entry.last_access(), entry.key().clone()))
            .collect();
        by_age.sort_unstable();

        let mut evicted = 0;
        for (_, key) in by_age {
            if self.total_weight() <= max_weight {
                break;
            }
            if let Some((_, entry)) = self.entries.remove(&key) {
                self.total_weight.fetch_sub(entry.weight, Ordering::Relaxed);
                evicted += 1;
            }
        }

        debug!(
            evicted,
            total_weight = self.total_weight(),
            max_weight,
            "evicted least recently used templates"
        );
    }

    fn now(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn window(&self) -> u64 {
        u64::try_from(self.settings.sliding_expiration.as_nanos()).unwrap_or(u64::MAX)
    }
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new(CacheSettings::default(), GrammarLimits::default())
    }
}

static GLOBAL: Lazy<TemplateCache> = Lazy::new(|| match hashbrace_config::load_host() {
    Ok(config) => {
        debug!(
            sliding_expiration_secs = config.cache.sliding_expiration_secs,
            max_weight = config.cache.max_weight,
            "configured global template cache"
        );
        TemplateCache::from_config(&config)
    }
    Err(error) => {
        warn!(%error, "could not load cache configuration, using built-in defaults");
        TemplateCache::default()
    }
});

/// The process-wide cache behind [`crate::parse`] and [`crate::try_parse`].
/// Created on first use and never torn down; entries expire on their own.
pub fn global() -> &'static TemplateCache {
    &GLOBAL
}
