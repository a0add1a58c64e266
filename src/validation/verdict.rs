use crate::models::{MatchVerdict, Verdict};
use crate::utils::config::MATCH_THRESHOLD;
use log::info;

/// Turns per-claim results into the overall pass/fail verdict.
#[derive(Debug, Clone, Copy)]
pub struct VerdictAggregator {
    threshold: usize,
}

impl Default for VerdictAggregator {
    fn default() -> Self {
        VerdictAggregator::new(MATCH_THRESHOLD)
    }
}

impl VerdictAggregator {
    pub fn new(threshold: usize) -> Self {
        VerdictAggregator { threshold }
    }

    pub fn aggregate(&self, matches: &MatchVerdict) -> Verdict {
        let matched = matches.matched_count();
        info!("Total matches: {}", matched);

        Verdict {
            matched,
            threshold: self.threshold,
            success: matched >= self.threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClaimCheck, ClaimField, MatchStatus};

    fn verdict_from_mask(mask: u32) -> MatchVerdict {
        let checks = ClaimField::ALL
            .iter()
            .enumerate()
            .map(|(i, &field)| ClaimCheck {
                field,
                label: field.label(),
                claim: String::new(),
                status: MatchStatus::from(mask & (1 << i) != 0),
            })
            .collect();
        MatchVerdict { checks }
    }

    #[test]
    fn test_every_combination_of_five() {
        let aggregator = VerdictAggregator::default();
        for mask in 0..32u32 {
            let verdict = aggregator.aggregate(&verdict_from_mask(mask));
            let expected = mask.count_ones() as usize;
            assert_eq!(verdict.matched, expected, "mask {:05b}", mask);
            assert_eq!(verdict.success, expected >= 3, "mask {:05b}", mask);
        }
    }

    #[test]
    fn test_custom_threshold() {
        let strict = VerdictAggregator::new(5);
        assert!(!strict.aggregate(&verdict_from_mask(0b01111)).success);
        assert!(strict.aggregate(&verdict_from_mask(0b11111)).success);

        let lenient = VerdictAggregator::new(0);
        assert!(lenient.aggregate(&verdict_from_mask(0)).success);
    }
}
