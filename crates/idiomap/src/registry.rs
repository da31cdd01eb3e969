//! Matcher registry: the engine's recognition entry point.
//!
//! The registry owns the matcher list and the confidence threshold. One
//! `recognize` call runs the walker, filters raw matches against the
//! threshold, and converts the survivors to idiom records in walk order
//! with sequential record indices. The registry is read-only during
//! recognition; register matchers and set the threshold before first use.

use tracing::{debug, warn};

use idiomap_syntax::Node;

use crate::convert::convert;
use crate::error::ConfigError;
use crate::idiom::IdiomRecord;
use crate::matchers::{builtin_matchers, IdiomMatcher, RawMatch};
use crate::walker::Walker;

/// Default confidence threshold a match must meet to survive.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

pub struct MatcherRegistry {
    matchers: Vec<Box<dyn IdiomMatcher>>,
    threshold: f64,
}

impl MatcherRegistry {
    /// An empty registry at the default threshold.
    pub fn new() -> Self {
        MatcherRegistry {
            matchers: Vec::new(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// A registry preloaded with the five built-in matchers.
    pub fn with_builtin_matchers() -> Self {
        MatcherRegistry {
            matchers: builtin_matchers(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Append a matcher. Registration order is offer order during the walk.
    pub fn register(&mut self, matcher: Box<dyn IdiomMatcher>) {
        self.matchers.push(matcher);
    }

    /// Set the confidence threshold, rejecting values outside `[0.0, 1.0]`.
    pub fn set_threshold(&mut self, threshold: f64) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&threshold) || threshold.is_nan() {
            return Err(ConfigError::ThresholdOutOfRange { value: threshold });
        }
        self.threshold = threshold;
        Ok(())
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Recognize idioms in a tree: walk, score, filter, convert.
    ///
    /// Records come back in walk order with sequential ids. An empty result
    /// means nothing scored at or above the threshold; it is never an error.
    pub fn recognize(&self, tree: &Node, source: &str) -> Vec<IdiomRecord> {
        let raw = Walker::new(&self.matchers).walk(tree, source);
        let mut records = Vec::new();
        for m in &raw {
            let Some(confidence) = self.score(m) else {
                continue;
            };
            if confidence < self.threshold {
                debug!(
                    idiom = m.kind.as_str(),
                    confidence, "match below threshold; dropped"
                );
                continue;
            }
            match convert(m, confidence, records.len(), source) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(idiom = m.kind.as_str(), error = %err, "conversion failed; record dropped");
                }
            }
        }
        debug!(
            raw = raw.len(),
            accepted = records.len(),
            "recognition complete"
        );
        records
    }

    /// Score a raw match with the matcher that owns its idiom kind.
    fn score(&self, m: &RawMatch<'_>) -> Option<f64> {
        self.matchers
            .iter()
            .find(|matcher| matcher.kind() == m.kind)
            .map(|matcher| matcher.confidence(m))
    }
}

impl Default for MatcherRegistry {
    fn default() -> Self {
        Self::with_builtin_matchers()
    }
}
