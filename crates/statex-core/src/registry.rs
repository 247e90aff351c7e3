//! Bank identifier to extractor resolution, with caching and hot reload.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::banks::{ExtractorFactory, BUILTIN};
use crate::error::{ExtractError, Result};
use crate::extractor::{StatementExtractor, StatementSource};
use crate::models::config::{BankConfig, LimitsConfig, StatexConfig};
use crate::models::statement::{Capability, StatementResult};
use crate::pdf::{DocumentLoader, PdfLoader};

lazy_static! {
    static ref SEMVER: Regex = Regex::new(
        r"^\d+\.\d+\.\d+(?:-[0-9A-Za-z.\-]+)?(?:\+[0-9A-Za-z.\-]+)?$"
    ).unwrap();
}

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Read-only source of bank descriptors.
pub trait ConfigStore: Send + Sync {
    /// Descriptor for `bank_id`, active or not.
    fn bank(&self, bank_id: &str) -> Option<BankConfig>;

    /// Every descriptor.
    fn banks(&self) -> Vec<BankConfig>;
}

/// Bank descriptors held in memory.
///
/// Descriptors can be replaced at runtime; the registry picks changes up
/// on [`ExtractorRegistry::reload`].
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    banks: RwLock<Vec<BankConfig>>,
}

impl MemoryConfigStore {
    pub fn new(banks: Vec<BankConfig>) -> Self {
        Self {
            banks: RwLock::new(banks),
        }
    }

    pub fn from_config(config: &StatexConfig) -> Self {
        Self::new(config.banks.clone())
    }

    /// Insert or replace the descriptor with the same bank identifier.
    pub fn upsert(&self, bank: BankConfig) {
        let mut banks = self.banks.write().unwrap_or_else(PoisonError::into_inner);
        match banks.iter_mut().find(|b| b.bank_id == bank.bank_id) {
            Some(existing) => *existing = bank,
            None => banks.push(bank),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn bank(&self, bank_id: &str) -> Option<BankConfig> {
        let banks = self.banks.read().unwrap_or_else(PoisonError::into_inner);
        banks.iter().find(|b| b.bank_id == bank_id).cloned()
    }

    fn banks(&self) -> Vec<BankConfig> {
        self.banks.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// A validated extractor and the descriptor it was built from.
#[derive(Clone)]
pub struct ResolvedExtractor {
    pub config: BankConfig,
    pub extractor: Arc<dyn StatementExtractor>,
}

impl fmt::Debug for ResolvedExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedExtractor")
            .field("config", &self.config)
            .field("identity", self.extractor.identity())
            .finish()
    }
}

/// Cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Bank identifiers with a cached extractor, sorted.
    pub cached_banks: Vec<String>,
    pub hits: u64,
    pub misses: u64,
}

/// One supported bank, as listed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankSummary {
    pub bank_id: String,
    pub bank_name: String,
    pub version: String,
    pub capabilities: Vec<Capability>,
    pub max_file_size_mb: u64,
}

/// Resolves bank identifiers to validated, cached extractors.
pub struct ExtractorRegistry {
    store: Arc<dyn ConfigStore>,
    loader: Arc<dyn DocumentLoader>,
    limits: LimitsConfig,
    factories: HashMap<String, ExtractorFactory>,
    cache: RwLock<HashMap<String, ResolvedExtractor>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ExtractorRegistry {
    /// Create a registry with the built-in extractors.
    pub fn new(store: Arc<dyn ConfigStore>, loader: Arc<dyn DocumentLoader>, limits: LimitsConfig) -> Self {
        Self {
            store,
            loader,
            limits,
            factories: BUILTIN
                .iter()
                .map(|(reference, factory)| (reference.to_string(), *factory))
                .collect(),
            cache: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Registry over a static configuration, reading PDFs.
    pub fn from_config(config: &StatexConfig) -> Self {
        Self::new(
            Arc::new(MemoryConfigStore::from_config(config)),
            Arc::new(PdfLoader::new()),
            config.limits.clone(),
        )
    }

    /// Make an extractor implementation available under `reference`.
    pub fn register(&mut self, reference: impl Into<String>, factory: ExtractorFactory) {
        self.factories.insert(reference.into(), factory);
    }

    /// Resolve an active bank identifier to its extractor.
    ///
    /// Built extractors are validated against the extractor contract and
    /// cached until reloaded.
    pub fn resolve(&self, bank_id: &str) -> Result<ResolvedExtractor> {
        if let Some(cached) = self.read_cache().get(bank_id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Using cached extractor for {}", bank_id);
            return Ok(cached.clone());
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let resolved = self.build(bank_id)?;
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.entry(bank_id.to_string()).or_insert(resolved).clone())
    }

    fn build(&self, bank_id: &str) -> Result<ResolvedExtractor> {
        let config = match self.store.bank(bank_id) {
            Some(config) if config.active => config,
            found => {
                let state = if found.is_some() { "inactive" } else { "unknown" };
                return Err(ExtractError::UnsupportedBank {
                    bank_id: bank_id.to_string(),
                    reason: format!(
                        "bank is {}; supported banks: {}",
                        state,
                        self.supported_bank_ids().join(", ")
                    ),
                });
            }
        };

        let factory = self
            .factories
            .get(&config.extractor)
            .ok_or_else(|| ExtractError::ContractViolation {
                bank_id: bank_id.to_string(),
                reason: format!("no extractor implementation named '{}'", config.extractor),
            })?;

        let extractor = factory(&config, Arc::clone(&self.loader), &self.limits);
        validate_contract(&config, extractor.as_ref())?;

        info!(
            "Loaded {} extractor v{} for {}",
            extractor.identity().bank_name,
            extractor.identity().version,
            bank_id
        );
        Ok(ResolvedExtractor { config, extractor })
    }

    /// Resolve `bank_id` and extract a statement with it.
    ///
    /// The document must fit the bank's size limit.
    pub fn extract(
        &self,
        bank_id: &str,
        source: &StatementSource,
        password: Option<&str>,
    ) -> Result<StatementResult> {
        let resolved = self.resolve(bank_id)?;

        let size = source.size_bytes()?;
        let size_mb = size as f64 / BYTES_PER_MB;
        if !resolved.config.accepts_size(size_mb) {
            return Err(ExtractError::ResourceLimit {
                bank_id: bank_id.to_string(),
                reason: format!(
                    "file is {:.1} MB, the limit for this bank is {} MB",
                    size_mb, resolved.config.max_file_size_mb
                ),
            });
        }

        resolved.extractor.extract_complete_statement(source, password)
    }

    /// Drop the cached extractor and descriptor for `bank_id` and build
    /// them again from the current configuration.
    pub fn reload(&self, bank_id: &str) -> Result<ResolvedExtractor> {
        self.invalidate(bank_id);
        info!("Reloading extractor for {}", bank_id);
        self.resolve(bank_id)
    }

    /// Drop the cached extractor for `bank_id`. Returns whether one was cached.
    pub fn invalidate(&self, bank_id: &str) -> bool {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(bank_id)
            .is_some()
    }

    /// Drop every cached extractor and reset the counters.
    pub fn clear(&self) {
        self.cache.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        debug!("Cleared extractor cache");
    }

    pub fn cache_stats(&self) -> CacheStats {
        let mut cached_banks: Vec<String> = self.read_cache().keys().cloned().collect();
        cached_banks.sort();
        CacheStats {
            cached_banks,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Identifiers of the active banks, sorted.
    pub fn supported_bank_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .store
            .banks()
            .into_iter()
            .filter(|b| b.active)
            .map(|b| b.bank_id)
            .collect();
        ids.sort();
        ids
    }

    /// Active banks whose extractor resolves, sorted by bank name.
    pub fn list_banks(&self) -> Vec<BankSummary> {
        let mut banks: Vec<BankSummary> = self
            .supported_bank_ids()
            .iter()
            .filter_map(|bank_id| match self.resolve(bank_id) {
                Ok(resolved) => {
                    let identity = resolved.extractor.identity();
                    Some(BankSummary {
                        bank_id: bank_id.clone(),
                        bank_name: identity.bank_name.clone(),
                        version: identity.version.clone(),
                        capabilities: identity.capabilities.clone(),
                        max_file_size_mb: resolved.config.max_file_size_mb,
                    })
                }
                Err(e) => {
                    warn!("Not listing {}: {}", bank_id, e);
                    None
                }
            })
            .collect();
        banks.sort_by(|a, b| a.bank_name.cmp(&b.bank_name));
        banks
    }

    /// Whether a document of this size, possibly encrypted, can be
    /// processed for `bank_id`.
    pub fn validate_compatibility(&self, bank_id: &str, file_size_mb: f64, password_protected: bool) -> bool {
        match self.resolve(bank_id) {
            Ok(resolved) => {
                resolved.config.accepts_size(file_size_mb)
                    && (!password_protected || resolved.extractor.supports_capability(Capability::PasswordProtected))
            }
            Err(e) => {
                debug!("{} is not compatible: {}", bank_id, e);
                false
            }
        }
    }

    fn read_cache(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, ResolvedExtractor>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Check an extractor against the contract and its bank descriptor.
pub fn validate_contract(config: &BankConfig, extractor: &dyn StatementExtractor) -> Result<()> {
    let violation = |reason: String| ExtractError::ContractViolation {
        bank_id: config.bank_id.clone(),
        reason,
    };
    let identity = extractor.identity();

    if identity.bank_name.trim().is_empty() {
        return Err(violation("bank name is empty".to_string()));
    }
    if !config.bank_name.is_empty() && identity.bank_name != config.bank_name {
        return Err(violation(format!(
            "bank name '{}' does not match configured '{}'",
            identity.bank_name, config.bank_name
        )));
    }
    if !SEMVER.is_match(&identity.version) {
        return Err(violation(format!("version '{}' is not a semantic version", identity.version)));
    }
    if !identity.supports(Capability::Transactions) {
        return Err(violation("does not declare the transactions capability".to_string()));
    }

    let mut seen = identity.capabilities.clone();
    seen.sort();
    seen.dedup();
    if seen.len() != identity.capabilities.len() {
        return Err(violation("declares a capability more than once".to_string()));
    }

    for capability in Capability::ALL {
        if extractor.supports_capability(capability) != identity.supports(capability) {
            return Err(violation(format!(
                "capability query for '{}' disagrees with the declared capabilities",
                capability.as_str()
            )));
        }
    }

    if let Some(missing) = config.capabilities.iter().find(|c| !identity.supports(**c)) {
        return Err(violation(format!(
            "configured capability '{}' is not supported",
            missing.as_str()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::statement::ExtractorIdentity;
    use crate::pdf::TextLoader;

    fn registry() -> ExtractorRegistry {
        let config = StatexConfig::default();
        ExtractorRegistry::new(
            Arc::new(MemoryConfigStore::from_config(&config)),
            Arc::new(TextLoader::new()),
            config.limits,
        )
    }

    struct Fake(ExtractorIdentity);

    impl StatementExtractor for Fake {
        fn identity(&self) -> &ExtractorIdentity {
            &self.0
        }

        fn extract_complete_statement(&self, _: &StatementSource, _: Option<&str>) -> Result<StatementResult> {
            Err(ExtractError::Io(std::io::ErrorKind::Unsupported.into()))
        }
    }

    fn config_for(bank_name: &str, capabilities: Vec<Capability>) -> BankConfig {
        BankConfig {
            bank_id: "TEST".to_string(),
            bank_name: bank_name.to_string(),
            extractor: "fake".to_string(),
            capabilities,
            ..BankConfig::default()
        }
    }

    #[test]
    fn test_resolve_caches() {
        let registry = registry();
        let first = registry.resolve("UNION").unwrap();
        let second = registry.resolve("UNION").unwrap();

        assert!(Arc::ptr_eq(&first.extractor, &second.extractor));
        let stats = registry.cache_stats();
        assert_eq!(stats.cached_banks, vec!["UNION".to_string()]);
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[test]
    fn test_reload_keeps_other_banks_cached() {
        let registry = registry();
        let apgvb = registry.resolve("APGVB").unwrap();
        registry.resolve("UNION").unwrap();

        registry.reload("UNION").unwrap();
        assert_eq!(
            registry.cache_stats().cached_banks,
            vec!["APGVB".to_string(), "UNION".to_string()]
        );

        assert!(registry.invalidate("UNION"));
        assert!(!registry.invalidate("UNION"));
        assert_eq!(registry.cache_stats().cached_banks, vec!["APGVB".to_string()]);

        let hits = registry.cache_stats().hits;
        let again = registry.resolve("APGVB").unwrap();
        assert!(Arc::ptr_eq(&apgvb.extractor, &again.extractor));
        assert_eq!(registry.cache_stats().hits, hits + 1);
    }

    #[test]
    fn test_unknown_bank_lists_supported() {
        let err = registry().resolve("HDFC").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedBank { .. }));
        let message = err.to_string();
        assert!(message.contains("HDFC"));
        assert!(message.contains("APGVB, CANARA, UNION"));
    }

    #[test]
    fn test_bank_ids_are_exact() {
        assert!(registry().resolve("union").is_err());
    }

    #[test]
    fn test_inactive_bank_is_unsupported() {
        let store = Arc::new(MemoryConfigStore::from_config(&StatexConfig::default()));
        let mut canara = store.bank("CANARA").unwrap();
        canara.active = false;
        store.upsert(canara);

        let registry = ExtractorRegistry::new(store, Arc::new(TextLoader::new()), LimitsConfig::default());
        assert!(matches!(
            registry.resolve("CANARA"),
            Err(ExtractError::UnsupportedBank { .. })
        ));
        assert_eq!(registry.supported_bank_ids(), vec!["APGVB".to_string(), "UNION".to_string()]);
    }

    #[test]
    fn test_list_banks_sorted_by_name() {
        let names: Vec<String> = registry().list_banks().into_iter().map(|b| b.bank_name).collect();
        assert_eq!(
            names,
            vec![
                "Andhra Pradesh Grameena Bank".to_string(),
                "Canara Bank".to_string(),
                "Union Bank of India".to_string(),
            ]
        );
    }

    #[test]
    fn test_compatibility() {
        let registry = registry();
        assert!(registry.validate_compatibility("UNION", 1.0, true));
        assert!(!registry.validate_compatibility("APGVB", 1.0, true));
        assert!(!registry.validate_compatibility("CANARA", 60.0, false));
        assert!(!registry.validate_compatibility("NOPE", 1.0, false));
    }

    #[test]
    fn test_contract_rejects_bad_version() {
        let fake = Fake(ExtractorIdentity::new("Test Bank", "v1", [Capability::Transactions]));
        let err = validate_contract(&config_for("Test Bank", vec![]), &fake).unwrap_err();
        assert!(matches!(err, ExtractError::ContractViolation { .. }));
    }

    #[test]
    fn test_contract_requires_transactions() {
        let fake = Fake(ExtractorIdentity::new("Test Bank", "1.0.0", [Capability::MultiPage]));
        assert!(validate_contract(&config_for("Test Bank", vec![]), &fake).is_err());
    }

    #[test]
    fn test_contract_checks_configured_capabilities() {
        let fake = Fake(ExtractorIdentity::new("Test Bank", "1.2.0-beta.1", [Capability::Transactions]));
        assert!(validate_contract(&config_for("Test Bank", vec![Capability::Transactions]), &fake).is_ok());
        assert!(validate_contract(&config_for("Test Bank", vec![Capability::MultiPage]), &fake).is_err());
        assert!(validate_contract(&config_for("Other Bank", vec![]), &fake).is_err());
    }

    #[test]
    fn test_unknown_implementation_is_contract_violation() {
        let store = Arc::new(MemoryConfigStore::new(vec![config_for("Test Bank", vec![])]));
        let registry = ExtractorRegistry::new(store, Arc::new(TextLoader::new()), LimitsConfig::default());
        assert!(matches!(
            registry.resolve("TEST"),
            Err(ExtractError::ContractViolation { .. })
        ));
    }
}
