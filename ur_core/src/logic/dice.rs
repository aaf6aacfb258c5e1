use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DICE_COUNT: usize = 4;
pub const MAX_ROLL: u8 = 4;
pub const DIE_SIDES: u8 = 6;

/// Chance of each roll `0..=4` when four fair binary dice are thrown.
pub const MOVE_PROBABILITIES: [f64; MAX_ROLL as usize + 1] = [
    1.0 / 16.0,
    4.0 / 16.0,
    6.0 / 16.0,
    4.0 / 16.0,
    1.0 / 16.0,
];

/// A throw of the four tetrahedral dice, stored as the face values shown to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dice {
    values: [u8; DICE_COUNT],
}

impl Dice {
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            values: Self::generate_random_values(rng),
        }
    }

    pub const fn from_values(values: [u8; DICE_COUNT]) -> Self {
        Self { values }
    }

    pub fn generate_random_values<R: Rng + ?Sized>(rng: &mut R) -> [u8; DICE_COUNT] {
        let mut values = [0; DICE_COUNT];
        for value in &mut values {
            *value = rng.gen_range(1..=DIE_SIDES);
        }
        values
    }

    pub const fn is_up(value: u8) -> bool {
        value <= DIE_SIDES / 2
    }

    pub fn count(values: &[u8; DICE_COUNT]) -> u8 {
        values.iter().fold(0, |up, &value| up + u8::from(Self::is_up(value)))
    }

    pub const fn values(&self) -> [u8; DICE_COUNT] {
        self.values
    }

    pub fn value(&self) -> u8 {
        Self::count(&self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_probabilities_sum_to_one() {
        let total: f64 = MOVE_PROBABILITIES.iter().sum();
        assert!((total - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_count_of_up_dice() {
        assert_eq!(Dice::count(&[1, 2, 3, 3]), 4);
        assert_eq!(Dice::count(&[4, 5, 6, 6]), 0);
        assert_eq!(Dice::count(&[1, 6, 3, 4]), 2);
    }

    #[test]
    fn test_rolled_values_stay_on_the_die() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let dice = Dice::roll(&mut rng);
            assert!(dice.values().iter().all(|v| (1..=DIE_SIDES).contains(v)));
            assert!(dice.value() <= MAX_ROLL);
        }
    }

    #[test]
    fn test_roll_distribution_roughly_binomial() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut histogram = [0u32; 5];
        let samples = 16_000;
        for _ in 0..samples {
            let roll = Dice::roll(&mut rng).value();
            histogram[usize::from(roll)] += 1;
        }
        for (count, probability) in histogram.iter().zip(MOVE_PROBABILITIES) {
            let observed = f64::from(*count) / f64::from(samples);
            assert!((observed - probability).abs() < 0.02, "{observed} vs {probability}");
        }
    }
}
