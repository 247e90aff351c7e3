//! Bank-specific statement parsers.

pub mod apgvb;
pub mod canara_bank;
pub mod union_bank;

pub use apgvb::ApgvbParser;
pub use canara_bank::CanaraBankParser;
pub use union_bank::UnionBankParser;

use std::sync::Arc;

use crate::extractor::{BankExtractor, BankParser, StatementExtractor};
use crate::models::config::{BankConfig, LimitsConfig};
use crate::pdf::DocumentLoader;

/// Builds the extractor for a bank descriptor.
pub type ExtractorFactory = fn(&BankConfig, Arc<dyn DocumentLoader>, &LimitsConfig) -> Arc<dyn StatementExtractor>;

/// Implementation references of the built-in extractors.
pub const BUILTIN: &[(&str, ExtractorFactory)] = &[
    ("union_bank", union_bank_extractor),
    ("canara_bank", canara_bank_extractor),
    ("apgvb", apgvb_extractor),
];

fn build<P: BankParser + 'static>(
    parser: P,
    config: &BankConfig,
    loader: Arc<dyn DocumentLoader>,
    limits: &LimitsConfig,
) -> Arc<dyn StatementExtractor> {
    Arc::new(
        BankExtractor::new(config.bank_id.clone(), parser, loader)
            .with_limits(limits.clone())
            .with_identifiers(config.identifiers.clone()),
    )
}

fn union_bank_extractor(
    config: &BankConfig,
    loader: Arc<dyn DocumentLoader>,
    limits: &LimitsConfig,
) -> Arc<dyn StatementExtractor> {
    build(UnionBankParser::new(), config, loader, limits)
}

fn canara_bank_extractor(
    config: &BankConfig,
    loader: Arc<dyn DocumentLoader>,
    limits: &LimitsConfig,
) -> Arc<dyn StatementExtractor> {
    build(CanaraBankParser::new(), config, loader, limits)
}

fn apgvb_extractor(
    config: &BankConfig,
    loader: Arc<dyn DocumentLoader>,
    limits: &LimitsConfig,
) -> Arc<dyn StatementExtractor> {
    build(ApgvbParser::new(), config, loader, limits)
}
