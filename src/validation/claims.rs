use crate::models::{ClaimCheck, ClaimField, ClaimSet, MatchStatus, MatchVerdict};
use log::{info, warn};
use regex::RegexBuilder;

/// Checks user claims against recognized text.
pub struct ClaimMatcher;

impl ClaimMatcher {
    /// Evaluate every field in [`ClaimField::ALL`].
    pub fn check(text: &str, claims: &ClaimSet) -> MatchVerdict {
        let checks = ClaimField::ALL
            .iter()
            .map(|&field| {
                let claim = claims.get(field);
                let status = MatchStatus::from(Self::matches(text, claim));
                info!(
                    "Text check - Input {}: {}, Match: {}",
                    field.label(),
                    claim,
                    status
                );
                ClaimCheck {
                    field,
                    label: field.label(),
                    claim: claim.to_string(),
                    status,
                }
            })
            .collect();

        MatchVerdict { checks }
    }

    /// Case-insensitive literal search for `claim` where neither end of the occurrence
    /// touches another word character. Blank claims never match.
    pub fn matches(text: &str, claim: &str) -> bool {
        let claim = claim.trim();
        if claim.is_empty() {
            return false;
        }

        let regex = match RegexBuilder::new(&regex::escape(claim))
            .case_insensitive(true)
            .build()
        {
            Ok(regex) => regex,
            Err(e) => {
                warn!("Claim {:?} could not be searched: {}", claim, e);
                return false;
            }
        };

        let mut start = 0;
        while let Some(found) = regex.find_at(text, start) {
            let before = text[..found.start()].chars().next_back();
            let after = text[found.end()..].chars().next();
            if !before.map_or(false, is_word_char) && !after.map_or(false, is_word_char) {
                return true;
            }
            // retry from the next character so overlapping occurrences are considered
            start = found.start()
                + text[found.start()..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
        }
        false
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
