//! Paced automatic rolling for a shared engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{interval, MissedTickBehavior};

use crate::engine::game::GameEngine;
use crate::engine::models::{GameResult, TurnReport};
use crate::error::Result;
use crate::games::ludo::types::GamePhase;

/// Pause/resume switch shared with a running `AutoPlayer`.
#[derive(Clone)]
pub struct AutoPlayHandle {
    enabled: Arc<AtomicBool>,
}

impl AutoPlayHandle {
    pub fn pause(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct AutoPlaySummary {
    pub turns: usize,
    pub skipped_ticks: usize,
    pub result: Option<GameResult>,
}

/// Rolls for whoever is next on every tick until the game ends.
///
/// Each tick re-checks the enabled flag and the phase, and skips when the
/// engine is locked elsewhere, so two rolls never overlap.
pub struct AutoPlayer {
    engine: Arc<Mutex<GameEngine>>,
    pace: Duration,
    max_turns: usize,
    enabled: Arc<AtomicBool>,
}

impl AutoPlayer {
    pub fn new(engine: Arc<Mutex<GameEngine>>, pace: Duration) -> Self {
        Self {
            engine,
            pace: pace.max(Duration::from_millis(1)),
            max_turns: usize::MAX,
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn handle(&self) -> AutoPlayHandle {
        AutoPlayHandle {
            enabled: self.enabled.clone(),
        }
    }

    pub async fn run<F>(&self, mut on_turn: F) -> Result<AutoPlaySummary>
    where
        F: FnMut(&TurnReport),
    {
        let mut ticker = interval(self.pace);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut turns = 0;
        let mut skipped_ticks = 0;

        while turns < self.max_turns {
            ticker.tick().await;
            if !self.enabled.load(Ordering::Relaxed) {
                continue;
            }
            let Ok(mut engine) = self.engine.try_lock() else {
                skipped_ticks += 1;
                tracing::debug!("engine busy, autoplay tick skipped");
                continue;
            };
            if engine.is_over() {
                break;
            }
            if engine.state().phase != GamePhase::WaitingForDice {
                continue;
            }
            let report = engine.roll_and_play()?;
            drop(engine);

            turns += 1;
            on_turn(&report);
            if report.game_over.is_some() {
                break;
            }
        }

        let result = self.engine.lock().await.result().cloned();
        tracing::info!(turns, skipped_ticks, finished = result.is_some(), "autoplay stopped");
        Ok(AutoPlaySummary {
            turns,
            skipped_ticks,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::models::GameConfig;

    fn shared_engine(seed: &str) -> Arc<Mutex<GameEngine>> {
        let config = GameConfig {
            seed: Some(seed.into()),
            ..Default::default()
        };
        Arc::new(Mutex::new(GameEngine::from_config(config).unwrap()))
    }

    #[tokio::test]
    async fn test_autoplay_runs_to_game_over() {
        let engine = shared_engine("autoplay");
        let player = AutoPlayer::new(engine.clone(), Duration::from_millis(1));
        let mut seen = 0;
        let summary = player.run(|report| seen += report.records.len()).await.unwrap();
        assert!(summary.result.is_some());
        assert!(summary.turns > 0);
        let engine = engine.lock().await;
        assert!(engine.is_over());
        assert_eq!(seen, engine.history().len());
    }

    #[tokio::test]
    async fn test_autoplay_respects_max_turns() {
        let engine = shared_engine("short");
        let summary = AutoPlayer::new(engine.clone(), Duration::from_millis(1))
            .with_max_turns(3)
            .run(|_| {})
            .await
            .unwrap();
        assert_eq!(summary.turns, 3);
        assert_eq!(engine.lock().await.state().current_round, 3);
    }

    #[tokio::test]
    async fn test_autoplay_skips_while_engine_busy() {
        let engine = shared_engine("busy");
        let guard = engine.lock().await;
        let player = AutoPlayer::new(engine.clone(), Duration::from_millis(1)).with_max_turns(1);
        let task = tokio::spawn(async move { player.run(|_| {}).await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(guard.state().current_round, 0);
        drop(guard);
        let summary = task.await.unwrap().unwrap();
        assert!(summary.skipped_ticks > 0);
        assert_eq!(summary.turns, 1);
    }

    #[tokio::test]
    async fn test_autoplay_pause_and_resume() {
        let engine = shared_engine("paused");
        let player = AutoPlayer::new(engine.clone(), Duration::from_millis(1)).with_max_turns(2);
        let handle = player.handle();
        handle.pause();
        let task = tokio::spawn(async move { player.run(|_| {}).await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(engine.lock().await.history().is_empty());
        handle.resume();
        assert!(handle.is_enabled());
        let summary = task.await.unwrap().unwrap();
        assert_eq!(summary.turns, 2);
    }
}
