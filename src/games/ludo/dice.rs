//! Dice: the rolled value object, a reproducible seeded generator and the
//! dice sources the engine draws from.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::types::{PlayerId, MAX_DICE, MIN_DICE};
use crate::error::{EngineError, Result};

const MODULUS: i64 = 2_147_483_647;
const MULTIPLIER: i64 = 16_807;

/// Three dice rolled by one player, optionally tagged with its position in a
/// seeded sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub values: [u8; 3],
    pub player: PlayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_index: Option<usize>,
}

impl DiceRoll {
    pub fn new(values: [u8; 3], player: PlayerId) -> Self {
        Self {
            values,
            player,
            seed_index: None,
        }
    }

    pub fn validate(&self, num_players: usize) -> Result<()> {
        if let Some(v) = self.values.iter().find(|v| !(MIN_DICE..=MAX_DICE).contains(*v)) {
            return Err(EngineError::InvalidRoll {
                message: format!("dice value {v} outside 1..=6"),
            });
        }
        if self.player == 0 || self.player as usize > num_players {
            return Err(EngineError::InvalidRoll {
                message: format!("roller {} is not one of {num_players} players", self.player),
            });
        }
        Ok(())
    }
}

/// Park-Miller minimal standard generator seeded from a string.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    state: i64,
}

impl SeededRandom {
    pub fn new(seed: i64) -> Self {
        let mut state = (seed.unsigned_abs() % MODULUS as u64) as i64;
        if state == 0 {
            state += MODULUS - 1;
        }
        Self { state }
    }

    /// Numeric strings seed directly; anything else is hashed first.
    pub fn from_seed(seed: &str) -> Self {
        let n = seed
            .trim()
            .parse::<i64>()
            .unwrap_or_else(|_| hash_seed(seed));
        Self::new(n)
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state * MULTIPLIER % MODULUS;
        (self.state - 1) as f64 / (MODULUS - 1) as f64
    }

    pub fn die(&mut self) -> u8 {
        (self.next_f64() * 6.0).floor() as u8 + 1
    }
}

/// Shift-and-subtract string hash over UTF-16 code units, made non-negative.
fn hash_seed(seed: &str) -> i64 {
    let mut h: i32 = 0;
    for unit in seed.encode_utf16() {
        h = h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32);
    }
    (h as i64).abs()
}

/// The first `rounds` dice triples for `seed`. Same inputs, same output.
pub fn generate_seeded_dice_sets(seed: &str, rounds: usize) -> Vec<[u8; 3]> {
    let mut rng = SeededRandom::from_seed(seed);
    (0..rounds)
        .map(|_| [rng.die(), rng.die(), rng.die()])
        .collect()
}

/// Where the engine gets its dice. Injected so games can be replayed.
pub trait DiceSource: Send {
    /// Three dice for a roll, plus the sequence index when reproducible.
    fn roll_three(&mut self) -> ([u8; 3], Option<usize>);

    /// One fresh die for a bonus move.
    fn bonus_die(&mut self) -> u8;
}

/// Uniform dice from `StdRng`.
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl DiceSource for RandomDice {
    fn roll_three(&mut self) -> ([u8; 3], Option<usize>) {
        let values = [
            self.rng.gen_range(MIN_DICE..=MAX_DICE),
            self.rng.gen_range(MIN_DICE..=MAX_DICE),
            self.rng.gen_range(MIN_DICE..=MAX_DICE),
        ];
        (values, None)
    }

    fn bonus_die(&mut self) -> u8 {
        self.rng.gen_range(MIN_DICE..=MAX_DICE)
    }
}

/// Cycles through a pre-generated seeded sequence of triples. Bonus dice keep
/// drawing from the same generator, so a whole game replays from the seed.
pub struct SeededDice {
    sets: Vec<[u8; 3]>,
    cursor: usize,
    rng: SeededRandom,
}

impl SeededDice {
    pub fn new(seed: &str, rounds: usize) -> Result<Self> {
        if rounds == 0 {
            return Err(EngineError::invalid_config("seeded dice need at least one round"));
        }
        let mut rng = SeededRandom::from_seed(seed);
        let sets = (0..rounds)
            .map(|_| [rng.die(), rng.die(), rng.die()])
            .collect();
        Ok(Self {
            sets,
            cursor: 0,
            rng,
        })
    }

    pub fn sets(&self) -> &[[u8; 3]] {
        &self.sets
    }
}

impl DiceSource for SeededDice {
    fn roll_three(&mut self) -> ([u8; 3], Option<usize>) {
        let index = self.cursor % self.sets.len();
        self.cursor += 1;
        (self.sets[index], Some(index))
    }

    fn bonus_die(&mut self) -> u8 {
        self.rng.die()
    }
}

/// A fixed script of rolls and bonus dice, each cycled when exhausted.
pub struct ScriptedDice {
    rolls: Vec<[u8; 3]>,
    bonus: Vec<u8>,
    next_roll: usize,
    next_bonus: usize,
}

impl ScriptedDice {
    pub fn new(rolls: Vec<[u8; 3]>, bonus: Vec<u8>) -> Result<Self> {
        if rolls.is_empty() || bonus.is_empty() {
            return Err(EngineError::invalid_config(
                "scripted dice need at least one roll and one bonus die",
            ));
        }
        let out_of_range = rolls
            .iter()
            .flatten()
            .chain(bonus.iter())
            .any(|v| !(MIN_DICE..=MAX_DICE).contains(v));
        if out_of_range {
            return Err(EngineError::invalid_config("scripted dice values must be in 1..=6"));
        }
        Ok(Self {
            rolls,
            bonus,
            next_roll: 0,
            next_bonus: 0,
        })
    }
}

impl DiceSource for ScriptedDice {
    fn roll_three(&mut self) -> ([u8; 3], Option<usize>) {
        let index = self.next_roll % self.rolls.len();
        self.next_roll += 1;
        (self.rolls[index], Some(index))
    }

    fn bonus_die(&mut self) -> u8 {
        let value = self.bonus[self.next_bonus % self.bonus.len()];
        self.next_bonus += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcg_first_step() {
        let mut rng = SeededRandom::new(1);
        let v = rng.next_f64();
        assert!((v - 16806.0 / 2147483646.0).abs() < 1e-15);
        assert_eq!(SeededRandom::new(1).die(), 1);
    }

    #[test]
    fn test_numeric_seed_used_directly() {
        let mut a = SeededRandom::from_seed("42");
        let mut b = SeededRandom::new(42);
        for _ in 0..10 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn test_string_hash() {
        assert_eq!(hash_seed("abc"), 96354);
        assert_eq!(hash_seed(""), 0);
        // Zero state is remapped into the generator's range.
        let mut rng = SeededRandom::new(0);
        assert!((0.0..1.0).contains(&rng.next_f64()));
    }

    #[test]
    fn test_extreme_numeric_seeds() {
        for seed in [i64::MIN, i64::MAX, -1, MODULUS, -MODULUS] {
            let mut rng = SeededRandom::new(seed);
            let values: Vec<f64> = (0..5).map(|_| rng.next_f64()).collect();
            assert!(values.iter().all(|v| (0.0..1.0).contains(v)), "{seed}: {values:?}");
            assert!(values.windows(2).any(|w| w[0] != w[1]), "{seed} is stuck");
        }
        let sets = generate_seeded_dice_sets("-9223372036854775808", 3);
        assert_eq!(sets.len(), 3);
        assert!(sets.iter().flatten().all(|v| (1..=6).contains(v)));
    }

    #[test]
    fn test_seeded_sets_are_deterministic() {
        let a = generate_seeded_dice_sets("lucky-seven", 50);
        let b = generate_seeded_dice_sets("lucky-seven", 50);
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
        assert!(a.iter().flatten().all(|v| (1..=6).contains(v)));
        assert_ne!(a, generate_seeded_dice_sets("lucky-eight", 50));
    }

    #[test]
    fn test_seeded_dice_cycle() {
        let mut dice = SeededDice::new("123456", 3).unwrap();
        let expected = generate_seeded_dice_sets("123456", 3);
        for round in 0..7 {
            let (values, index) = dice.roll_three();
            assert_eq!(index, Some(round % 3));
            assert_eq!(values, expected[round % 3]);
        }
        assert!(SeededDice::new("x", 0).is_err());
    }

    #[test]
    fn test_random_dice_seeded_reproducible() {
        let mut a = RandomDice::new(Some(9));
        let mut b = RandomDice::new(Some(9));
        for _ in 0..20 {
            assert_eq!(a.roll_three(), b.roll_three());
            assert_eq!(a.bonus_die(), b.bonus_die());
        }
    }

    #[test]
    fn test_scripted_dice() {
        let mut dice = ScriptedDice::new(vec![[1, 2, 3], [6, 6, 6]], vec![4, 5]).unwrap();
        assert_eq!(dice.roll_three(), ([1, 2, 3], Some(0)));
        assert_eq!(dice.roll_three(), ([6, 6, 6], Some(1)));
        assert_eq!(dice.roll_three(), ([1, 2, 3], Some(0)));
        assert_eq!([dice.bonus_die(), dice.bonus_die(), dice.bonus_die()], [4, 5, 4]);
        assert!(ScriptedDice::new(vec![[0, 1, 2]], vec![1]).is_err());
        assert!(ScriptedDice::new(vec![], vec![1]).is_err());
    }

    #[test]
    fn test_dice_roll_validation() {
        assert!(DiceRoll::new([1, 6, 3], 2).validate(2).is_ok());
        assert!(matches!(
            DiceRoll::new([1, 7, 3], 1).validate(2),
            Err(EngineError::InvalidRoll { .. })
        ));
        assert!(DiceRoll::new([1, 2, 3], 3).validate(2).is_err());
        assert!(DiceRoll::new([1, 2, 3], 0).validate(4).is_err());
    }
}
