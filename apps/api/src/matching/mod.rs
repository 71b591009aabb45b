//! Match scoring: post-fetch filtering, rule-based and semantic scores,
//! and the location / salary multipliers that combine them.

pub mod filter;
pub mod multipliers;
pub mod prompts;
pub mod scorer;
pub mod semantic;
pub mod traditional;
