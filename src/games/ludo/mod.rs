//! Ludo variant: board geometry, dice, rules and the rule-based strategies.

pub mod board;
pub mod dice;
pub mod rules;
pub mod strategies;
pub mod types;
