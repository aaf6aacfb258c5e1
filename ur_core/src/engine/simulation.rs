use crate::engine::config::EngineConfig;
use crate::engine::move_list::{MoveList, MAX_POSSIBLE_MOVES};
use crate::engine::{now, SearchStats};
use crate::logic::board::Location;
use crate::logic::dice::{MAX_ROLL, MOVE_PROBABILITIES};
use crate::logic::game::{GameState, UtilityWeights};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BestMoveAndUtility {
    /// `None` when the mover had to pass.
    pub from: Option<Location>,
    pub utility: f64,
}

/// Child states and move origins for one search depth, allocated once per simulator.
#[derive(Debug, Clone)]
struct DepthScratch {
    states: [GameState; MAX_POSSIBLE_MOVES],
    moves: MoveList,
}

impl Default for DepthScratch {
    fn default() -> Self {
        Self {
            states: [GameState::new(); MAX_POSSIBLE_MOVES],
            moves: MoveList::new(),
        }
    }
}

/// Fixed-depth expectiminimax over moves and dice rolls.
///
/// Depths are counted from 1 at the root. Every depth owns a scratch pool, so a
/// search never allocates. Ties between equally good moves are broken by a fair
/// coin drawn from `R`.
pub struct GameSimulator<R: Rng = StdRng> {
    max_depth: u8,
    weights: UtilityWeights,
    scratch: Vec<DepthScratch>,
    rng: R,
    nodes: u32,
    stats: SearchStats,
}

impl GameSimulator<StdRng> {
    /// # Panics
    ///
    /// Panics if `depth` is zero.
    pub fn new(depth: u8) -> Self {
        Self::with_config(depth, &EngineConfig::default())
    }

    /// # Panics
    ///
    /// Panics if `depth` is zero.
    pub fn with_config(depth: u8, config: &EngineConfig) -> Self {
        Self::with_rng(depth, config, StdRng::from_entropy())
    }
}

impl<R: Rng> GameSimulator<R> {
    /// # Panics
    ///
    /// Panics if `depth` is zero.
    pub fn with_rng(depth: u8, config: &EngineConfig, rng: R) -> Self {
        assert!(depth > 0, "search depth must be at least 1");
        Self {
            max_depth: depth,
            weights: config.utility_weights(),
            scratch: (0..depth).map(|_| DepthScratch::default()).collect(),
            rng,
            nodes: 0,
            stats: SearchStats::default(),
        }
    }

    pub const fn depth(&self) -> u8 {
        self.max_depth
    }

    /// Statistics of the most recent [`Self::find_best_move`].
    pub const fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Picks the origin of the best move for the active player, or `None` to pass.
    ///
    /// # Panics
    ///
    /// Panics if `roll` is greater than 4.
    pub fn find_best_move(&mut self, state: &GameState, roll: u8) -> Option<Location> {
        let start = now();
        self.nodes = 0;
        let best = self.calculate_best_move_and_utility(state, roll, 1);
        let elapsed = now() - start;

        self.stats = SearchStats {
            depth: self.max_depth,
            nodes: self.nodes,
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            time_ms: elapsed.max(0.0) as u64,
        };
        log::debug!(
            "search depth={} roll={roll} nodes={} time={}ms best={:?} utility={:.3}",
            self.stats.depth,
            self.stats.nodes,
            self.stats.time_ms,
            best.from,
            best.utility
        );
        best.from
    }

    /// # Panics
    ///
    /// Panics if `roll` is greater than 4 or `depth` is outside `1..=max_depth`.
    #[allow(clippy::float_cmp)]
    pub fn calculate_best_move_and_utility(
        &mut self,
        state: &GameState,
        roll: u8,
        depth: u8,
    ) -> BestMoveAndUtility {
        assert!(roll <= MAX_ROLL, "roll {roll} is outside 0..={MAX_ROLL}");
        assert!(
            (1..=self.max_depth).contains(&depth),
            "depth {depth} is outside 1..={}",
            self.max_depth
        );

        let count = self.find_move_states(state, roll, depth);
        let mut best = BestMoveAndUtility::default();

        for index in 0..count {
            // Copied out so deeper levels can borrow the simulator mutably.
            let Some(child) = self
                .scratch
                .get(usize::from(depth - 1))
                .and_then(|scratch| scratch.states.get(index))
                .copied()
            else {
                break;
            };
            self.nodes = self.nodes.saturating_add(1);

            let utility = if depth >= self.max_depth || child.won {
                f64::from(child.weighted_utility(state.active_player, &self.weights))
            } else {
                let utility = self.calculate_probability_weighted_utility(&child, depth + 1);
                if child.active_player == state.active_player {
                    utility
                } else {
                    -utility
                }
            };

            if index == 0
                || utility > best.utility
                || (utility == best.utility && self.rng.gen_bool(0.5))
            {
                best = BestMoveAndUtility {
                    from: child.last_move_from,
                    utility,
                };
            }
        }
        best
    }

    /// Expected utility of `state` for its active player over all five rolls.
    pub fn calculate_probability_weighted_utility(&mut self, state: &GameState, depth: u8) -> f64 {
        let mut utility = 0.0;
        for (roll, probability) in (0..=MAX_ROLL).zip(MOVE_PROBABILITIES) {
            let best = self.calculate_best_move_and_utility(state, roll, depth);
            utility = probability.mul_add(best.utility, utility);
        }
        utility
    }

    /// Fills the depth's pool with one state per legal move, or a single pass
    /// state when there is none, and returns how many slots were filled.
    fn find_move_states(&mut self, state: &GameState, roll: u8, depth: u8) -> usize {
        let Some(DepthScratch { states, moves }) = self.scratch.get_mut(usize::from(depth - 1))
        else {
            return 0;
        };

        state.get_valid_moves(roll, moves);
        let mut count = 0;
        for &from in moves.iter() {
            let Some(slot) = states.get_mut(count) else {
                break;
            };
            slot.copy_from(state);
            if slot.apply_move(from, roll).is_ok() {
                count += 1;
            }
        }

        if count == 0 {
            if let Some(slot) = states.first_mut() {
                slot.copy_from(state);
                slot.swap_active_player();
                count = 1;
            }
        }
        count
    }
}

/// Lazily built simulators keyed by depth, reused across sequential requests.
pub struct SimulatorCache {
    config: EngineConfig,
    seed: Option<u64>,
    simulators: HashMap<u8, GameSimulator>,
}

impl Default for SimulatorCache {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl SimulatorCache {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            seed: None,
            simulators: HashMap::new(),
        }
    }

    /// Seeds every simulator deterministically from `seed` and its depth.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        Self {
            config,
            seed: Some(seed),
            simulators: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.simulators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simulators.is_empty()
    }

    /// # Panics
    ///
    /// Panics if `depth` is zero.
    pub fn get(&mut self, depth: u8) -> &mut GameSimulator {
        let config = &self.config;
        let seed = self.seed;
        self.simulators.entry(depth).or_insert_with(|| {
            log::debug!("creating simulator for depth {depth}");
            let rng = seed.map_or_else(StdRng::from_entropy, |seed| {
                StdRng::seed_from_u64(seed.wrapping_add(u64::from(depth)))
            });
            GameSimulator::with_rng(depth, config, rng)
        })
    }
}
