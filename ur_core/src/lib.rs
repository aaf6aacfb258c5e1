//! Search engine, game model and packet protocol for the Royal Game of Ur.
//!
//! - [`logic`]: board geometry, game state and dice.
//! - [`engine`]: the expectiminimax [`engine::GameSimulator`].
//! - [`protocol`]: the delimiter-free packet codec and packet registries.
//! - [`worker`]: the request/response bridge to a background search worker.

pub mod engine;
pub mod logic;
pub mod protocol;
pub mod worker;
