pub mod claims;
pub mod verdict;

pub use claims::ClaimMatcher;
pub use verdict::VerdictAggregator;
