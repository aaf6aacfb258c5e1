use serde::{Deserialize, Serialize};

pub mod config;
pub mod move_list;
pub mod simulation;

pub use simulation::{BestMoveAndUtility, GameSimulator, SimulatorCache};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchStats {
    pub depth: u8,
    pub nodes: u32,
    pub time_ms: u64,
}

/// Strength presets offered to players; the value is the search depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComputerDifficulty {
    Easy = 1,
    Medium = 2,
    Hard = 5,
    Panda = 7,
}

impl ComputerDifficulty {
    pub const fn depth(self) -> u8 {
        self as u8
    }

    /// Only the strongest preset asks for the secondary engine.
    pub const fn uses_panda(self) -> bool {
        matches!(self, Self::Panda)
    }
}

/// Milliseconds from a monotonic-enough clock on both native and browser targets.
pub(crate) fn now() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        if let Some(window) = web_sys::window() {
            return window.performance().map_or(0.0, |p| p.now());
        }
        let global = js_sys::global();
        if let Ok(worker) = global.dyn_into::<web_sys::WorkerGlobalScope>() {
            return worker.performance().map_or(0.0, |p| p.now());
        }
        0.0
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        let since_the_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        #[allow(clippy::cast_precision_loss)]
        let time_ms = (since_the_epoch.as_secs() as f64).mul_add(
            1000.0,
            f64::from(since_the_epoch.subsec_nanos()) / 1_000_000.0,
        );
        time_ms
    }
}
