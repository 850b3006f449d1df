//! Runtime prompt token coordination.
//!
//! Identical prompt names anywhere in a render batch are one logical
//! value: the coordinator scans every template, dedupes the names,
//! requests each answer exactly once and hands back a mapping that the
//! batch merges into its catalog as the highest-precedence source.
//! Answers never outlive the batch.

pub mod dialoguer;
pub mod scanner;

use crate::catalog::TokenCatalog;
use crate::error::Result;
use crate::types::Grammar;
use indexmap::{IndexMap, IndexSet};
use log::debug;

/// Caller-supplied source of prompt answers.
///
/// `request` is invoked at most once per batch with all unique names.
/// A name missing from the reply resolves `Empty` downstream; only a
/// failed request (e.g. the user cancelled) is an error.
pub trait PromptSource {
    fn request(&self, names: &[String]) -> Result<IndexMap<String, String>>;
}

/// A source answering every name with the empty string; used when a
/// batch has no interactive caller.
pub struct NoPromptSource;

impl PromptSource for NoPromptSource {
    fn request(&self, _names: &[String]) -> Result<IndexMap<String, String>> {
        Ok(IndexMap::new())
    }
}

/// A prompt that is only requested when a controlling token resolves
/// non-empty against the provider/constant catalog.
#[derive(Debug, Clone)]
pub struct PromptCondition {
    pub prompt: String,
    pub requires: String,
}

/// Result of the scanning phase: every prompt name seen, and the
/// subset that survives conditional gating.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub scanned: IndexSet<String>,
    pub requested: IndexSet<String>,
}

/// Coordinates prompt collection for one render batch.
pub struct PromptCoordinator<'a> {
    source: &'a dyn PromptSource,
    conditions: &'a [PromptCondition],
}

impl<'a> PromptCoordinator<'a> {
    pub fn new(source: &'a dyn PromptSource, conditions: &'a [PromptCondition]) -> Self {
        Self { source, conditions }
    }

    /// Scans the templates for prompt names, applying conditions
    /// against the pre-prompt catalog. Order is first-seen.
    pub fn scan<'t>(
        &self,
        templates: impl IntoIterator<Item = (Grammar, &'t str)>,
        base_catalog: &TokenCatalog,
    ) -> Result<ScanOutcome> {
        let mut scanned = IndexSet::new();
        for (grammar, body) in templates {
            scanner::scan_template(body, grammar, &mut scanned)?;
        }

        // a condition whose controlling token is blank removes the
        // prompt from the request set for this batch
        let mut requested = IndexSet::new();
        for name in &scanned {
            let gated = self
                .conditions
                .iter()
                .find(|c| c.prompt == *name)
                .is_some_and(|c| base_catalog.resolve(&c.requires).is_blank());
            if gated {
                debug!("prompt '{name}' skipped: controlling token is blank");
            } else {
                requested.insert(name.clone());
            }
        }
        Ok(ScanOutcome { scanned, requested })
    }

    /// Requests answers for the scanned names, one call per batch.
    /// Every scanned name gets an entry; unanswered and gated names map
    /// to the empty string so optional segments treat them as absent.
    pub fn collect(&self, scan: &ScanOutcome) -> Result<IndexMap<String, String>> {
        let mut answers: IndexMap<String, String> = IndexMap::new();
        if !scan.requested.is_empty() {
            let names: Vec<String> = scan.requested.iter().cloned().collect();
            debug!("requesting {} prompt answer(s)", names.len());
            answers = self.source.request(&names)?;
        }
        for name in &scan.scanned {
            answers.entry(name.clone()).or_default();
        }
        Ok(answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingSource {
        calls: Cell<usize>,
        answer: String,
    }

    impl PromptSource for CountingSource {
        fn request(&self, names: &[String]) -> Result<IndexMap<String, String>> {
            self.calls.set(self.calls.get() + 1);
            Ok(names.iter().map(|n| (n.clone(), self.answer.clone())).collect())
        }
    }

    fn catalog(pairs: &[(&str, &str)]) -> TokenCatalog {
        let source: IndexMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        TokenCatalog::from_sources([source])
    }

    #[test]
    fn one_request_covers_all_templates() {
        let source = CountingSource { calls: Cell::new(0), answer: "Some Group".into() };
        let coordinator = PromptCoordinator::new(&source, &[]);
        let templates = [
            (Grammar::Flat, "{title}-{prompt_source}"),
            (Grammar::Document, "by {{ prompt_source }}"),
        ];
        let scan = coordinator.scan(templates, &catalog(&[])).unwrap();
        let answers = coordinator.collect(&scan).unwrap();
        assert_eq!(source.calls.get(), 1);
        assert_eq!(answers["prompt_source"], "Some Group");
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn false_condition_suppresses_the_request() {
        let source = CountingSource { calls: Cell::new(0), answer: "x".into() };
        let conditions = [PromptCondition {
            prompt: "prompt_reason".to_string(),
            requires: "repack".to_string(),
        }];
        let coordinator = PromptCoordinator::new(&source, &conditions);
        let templates = [(Grammar::Flat, "{prompt_reason}")];
        let scan = coordinator.scan(templates, &catalog(&[("repack", "")])).unwrap();
        assert!(scan.requested.is_empty());
        let answers = coordinator.collect(&scan).unwrap();
        // no request issued, but the name still resolves Empty downstream
        assert_eq!(source.calls.get(), 0);
        assert_eq!(answers["prompt_reason"], "");
    }

    #[test]
    fn true_condition_requests_normally() {
        let source = CountingSource { calls: Cell::new(0), answer: "proper".into() };
        let conditions = [PromptCondition {
            prompt: "prompt_reason".to_string(),
            requires: "repack".to_string(),
        }];
        let coordinator = PromptCoordinator::new(&source, &conditions);
        let templates = [(Grammar::Flat, "{prompt_reason}")];
        let scan =
            coordinator.scan(templates, &catalog(&[("repack", "REPACK")])).unwrap();
        let answers = coordinator.collect(&scan).unwrap();
        assert_eq!(source.calls.get(), 1);
        assert_eq!(answers["prompt_reason"], "proper");
    }

    #[test]
    fn no_prompts_means_no_request() {
        let source = CountingSource { calls: Cell::new(0), answer: "x".into() };
        let coordinator = PromptCoordinator::new(&source, &[]);
        let scan =
            coordinator.scan([(Grammar::Flat, "{title}")], &catalog(&[])).unwrap();
        let answers = coordinator.collect(&scan).unwrap();
        assert_eq!(source.calls.get(), 0);
        assert!(answers.is_empty());
    }

    #[test]
    fn unanswered_names_resolve_empty_not_error() {
        struct SilentSource;
        impl PromptSource for SilentSource {
            fn request(&self, _names: &[String]) -> Result<IndexMap<String, String>> {
                Ok(IndexMap::new())
            }
        }
        let coordinator = PromptCoordinator::new(&SilentSource, &[]);
        let scan = coordinator
            .scan([(Grammar::Flat, "{prompt_notes}")], &catalog(&[]))
            .unwrap();
        let answers = coordinator.collect(&scan).unwrap();
        assert_eq!(answers["prompt_notes"], "");
    }
}
