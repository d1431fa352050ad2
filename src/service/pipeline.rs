//! Filter pipeline and the run-wide match counter.
//!
//! The counter is owned by the pipeline, not a global, and survives across
//! every input of a run so `--maxcount` applies to the total.

use tracing::debug;

use crate::types::{DefinitionCandidate, FilterSpec, Rejection, Verdict};

/// Whether the driver should keep scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Counts accepted definitions against an optional limit.
#[derive(Debug, Clone, Default)]
pub struct MatchCounter {
    accepted: usize,
    limit: Option<usize>,
}

impl MatchCounter {
    pub fn new(limit: Option<usize>) -> Self {
        Self { accepted: 0, limit }
    }

    /// Count one accepted definition.
    pub fn record(&mut self) -> Flow {
        self.accepted += 1;
        if self.is_satisfied() {
            debug!("Stopping at max count: {}", self.accepted);
            Flow::Stop
        } else {
            Flow::Continue
        }
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// True once the limit, if any, has been reached.
    pub fn is_satisfied(&self) -> bool {
        self.limit.map(|limit| self.accepted >= limit).unwrap_or(false)
    }
}

/// What the pipeline did with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Rejected(Rejection),
    Accepted(Flow),
}

/// Filters plus the match counter for one run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    spec: FilterSpec,
    counter: MatchCounter,
}

impl Pipeline {
    pub fn new(spec: FilterSpec) -> Self {
        let counter = MatchCounter::new(spec.max_count());
        Self { spec, counter }
    }

    /// Run `candidate` through the filters, counting it if accepted.
    pub fn offer(&mut self, candidate: &DefinitionCandidate) -> Offer {
        match self.spec.evaluate(candidate) {
            Verdict::Accept => Offer::Accepted(self.counter.record()),
            Verdict::Reject(reason) => {
                debug!(
                    "Skipping {:?} mismatch: {}",
                    reason, candidate.signature
                );
                Offer::Rejected(reason)
            }
        }
    }

    pub fn counter(&self) -> &MatchCounter {
        &self.counter
    }

    pub fn is_done(&self) -> bool {
        self.counter.is_satisfied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::language::LanguageVariant;
    use crate::types::{FilterOptions, PartialDefinition, SourceId, SourceLine};

    fn candidate(name: &str, lines: &[&str]) -> DefinitionCandidate {
        let partial = PartialDefinition {
            name: name.to_string(),
            signature: lines[0].to_string(),
            start_line: 1,
            indent: 0,
            header: vec![SourceLine::new(1, lines[0])],
        };
        let body = lines[1..]
            .iter()
            .enumerate()
            .map(|(i, t)| SourceLine::new(i + 2, *t))
            .collect();
        DefinitionCandidate::complete(partial, body, SourceId::Stdin, LanguageVariant::Python)
    }

    fn pipeline(options: FilterOptions) -> Pipeline {
        Pipeline::new(FilterSpec::build(&options).unwrap())
    }

    #[test]
    fn test_counter_without_limit() {
        let mut counter = MatchCounter::new(None);
        for _ in 0..10 {
            assert_eq!(counter.record(), Flow::Continue);
        }
        assert_eq!(counter.accepted(), 10);
        assert!(!counter.is_satisfied());
    }

    #[test]
    fn test_counter_stops_at_limit() {
        let mut counter = MatchCounter::new(Some(2));
        assert_eq!(counter.record(), Flow::Continue);
        assert_eq!(counter.record(), Flow::Stop);
        assert!(counter.is_satisfied());
    }

    #[test]
    fn test_offer_counts_only_accepted() {
        let mut p = pipeline(FilterOptions {
            pattern: "f.*".to_string(),
            max_count: Some(2),
            ..Default::default()
        });

        assert_eq!(
            p.offer(&candidate("g", &["def g():", "    pass"])),
            Offer::Rejected(Rejection::Name)
        );
        assert_eq!(
            p.offer(&candidate("f1", &["def f1():", "    pass"])),
            Offer::Accepted(Flow::Continue)
        );
        assert_eq!(
            p.offer(&candidate("f2", &["def f2():", "    pass"])),
            Offer::Accepted(Flow::Stop)
        );
        assert_eq!(p.counter().accepted(), 2);
        assert!(p.is_done());
    }

    #[test]
    fn test_zero_max_count_means_unlimited() {
        let mut p = pipeline(FilterOptions {
            pattern: String::new(),
            max_count: Some(0),
            ..Default::default()
        });
        assert!(!p.is_done());
        for i in 0..5 {
            let name = format!("f{}", i);
            assert_eq!(
                p.offer(&candidate(&name, &["def x():", "    pass"])),
                Offer::Accepted(Flow::Continue)
            );
        }
    }

    #[test]
    fn test_offer_reports_first_rejection() {
        let mut p = pipeline(FilterOptions {
            pattern: "f".to_string(),
            contains: Some("x".to_string()),
            without: Some("x".to_string()),
            ..Default::default()
        });
        assert_eq!(
            p.offer(&candidate("f", &["def f():", "    x = 1"])),
            Offer::Rejected(Rejection::Without)
        );
        assert_eq!(
            p.offer(&candidate("f", &["def f():", "    y = 1"])),
            Offer::Accepted(Flow::Continue)
        );
    }
}
