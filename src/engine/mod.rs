pub mod models;
pub mod game;
pub mod mcts;
pub mod arena;
pub mod autoplay;
pub mod bot_strategy;
pub mod bot_profiles;
pub mod evaluator;
