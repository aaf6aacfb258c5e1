//! The background search worker and the bridge that talks to it.
//!
//! Messages in both directions are AI packets encoded as strings. There are no
//! correlation ids: the worker answers requests in order and the main side keeps
//! at most one request in flight.

use crate::engine::move_list::MoveList;
use crate::engine::SimulatorCache;
use crate::logic::board::Location;
use crate::logic::dice::MAX_ROLL;
use crate::logic::game::GameState;
use crate::protocol::ai::{
    ai_packet_set, AiFunctionality, AiMoveRequest, AiMoveResponse, AiPacket, AiPandaMoveRequest,
};
use crate::protocol::{Packet, PacketError, PacketSet};
use thiserror::Error;

pub mod invoker;
pub mod thread;
pub mod web;

pub use invoker::{BridgeError, ComputerWorker, WorkerEvent, WorkerTransport};
pub use thread::ThreadWorker;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("secondary engine is not supported here")]
    Unsupported,
    #[error("secondary engine failed to load: {0}")]
    Load(String),
    #[error("secondary engine request failed: {0}")]
    Request(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Packet(#[from] PacketError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("worker does not accept {0} packets")]
    UnexpectedPacket(&'static str),
    #[error("invalid move request: depth {depth}, roll {roll}")]
    InvalidRequest { depth: u8, roll: u8 },
    #[error("no move is available for a roll of {roll}")]
    NoMoveAvailable { roll: u8 },
    #[error("secondary engine chose {0}, which is not a legal move")]
    IllegalEngineMove(Location),
}

/// An opaque engine reachable only by request and response strings.
pub trait SecondaryEngine {
    fn send_request(&mut self, request: &str) -> Result<String, EngineError>;
}

impl<T: SecondaryEngine + ?Sized> SecondaryEngine for Box<T> {
    fn send_request(&mut self, request: &str) -> Result<String, EngineError> {
        (**self).send_request(request)
    }
}

pub trait SecondaryEngineLoader {
    type Engine: SecondaryEngine;

    fn load(self) -> Result<Self::Engine, EngineError>;
}

/// Loader for hosts without a secondary engine; loading always reports unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSecondaryEngine;

impl SecondaryEngine for NoSecondaryEngine {
    fn send_request(&mut self, _request: &str) -> Result<String, EngineError> {
        Err(EngineError::Unsupported)
    }
}

impl SecondaryEngineLoader for NoSecondaryEngine {
    type Engine = Self;

    fn load(self) -> Result<Self, EngineError> {
        Err(EngineError::Unsupported)
    }
}

#[derive(Debug)]
pub enum PandaState<E> {
    Loading,
    Loaded(E),
    Unsupported,
}

/// Worker-side state machine shared by every host.
pub struct AiWorker<E> {
    packets: PacketSet<AiPacket>,
    simulators: SimulatorCache,
    panda: PandaState<E>,
}

impl<E: SecondaryEngine> Default for AiWorker<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: SecondaryEngine> AiWorker<E> {
    pub fn new() -> Self {
        Self::with_simulators(SimulatorCache::default())
    }

    pub fn with_simulators(simulators: SimulatorCache) -> Self {
        Self {
            packets: ai_packet_set(),
            simulators,
            panda: PandaState::Loading,
        }
    }

    pub const fn panda(&self) -> &PandaState<E> {
        &self.panda
    }

    pub const fn functionality(&self) -> AiFunctionality {
        AiFunctionality {
            available: true,
            panda_available: matches!(self.panda, PandaState::Loaded(_)),
            panda_unsupported: matches!(self.panda, PandaState::Unsupported),
        }
    }

    /// The announcement a host sends on start-up and after each engine load.
    pub fn functionality_packet(&self) -> Result<String, WorkerError> {
        Ok(self
            .packets
            .encode(&AiPacket::Functionality(self.functionality()))?)
    }

    pub fn on_panda_loaded(&mut self, result: Result<E, EngineError>) -> Result<String, WorkerError> {
        self.panda = match result {
            Ok(engine) => {
                log::info!("secondary engine loaded");
                PandaState::Loaded(engine)
            }
            Err(err) => {
                log::error!("there was an error loading the secondary engine: {err}");
                PandaState::Unsupported
            }
        };
        self.functionality_packet()
    }

    /// Handles one incoming packet and returns the encoded reply.
    pub fn on_message(&mut self, raw: &str) -> Result<String, WorkerError> {
        let read = self.packets.read_packet(raw)?;
        let AiPacket::MoveRequest(request) = read.packet else {
            return Err(WorkerError::UnexpectedPacket(read.name));
        };

        let move_from = self.on_move_request(&request)?;
        let response = AiPacket::MoveResponse(AiMoveResponse { move_from });
        Ok(self.packets.encode(&response)?)
    }

    fn on_move_request(&mut self, request: &AiMoveRequest) -> Result<Location, WorkerError> {
        let AiMoveRequest {
            depth,
            use_panda,
            state,
            roll,
        } = *request;
        if depth == 0 || roll > MAX_ROLL {
            return Err(WorkerError::InvalidRequest { depth, roll });
        }

        let mut moves = MoveList::new();
        if state.won || state.get_valid_moves(roll, &mut moves).is_empty() {
            return Err(WorkerError::NoMoveAvailable { roll });
        }

        if use_panda {
            match self.ask_panda(depth, &state, roll, &moves) {
                Some(Ok(from)) => return Ok(from),
                Some(Err(err)) => {
                    log::warn!("secondary engine failed ({err}), searching locally at depth {depth}");
                }
                None => {
                    log::warn!("secondary engine requested but not loaded, searching locally at depth {depth}");
                }
            }
        }

        self.simulators
            .get(depth)
            .find_best_move(&state, roll)
            .ok_or(WorkerError::NoMoveAvailable { roll })
    }

    /// Asks the loaded secondary engine for a move. `None` when no engine is loaded.
    fn ask_panda(
        &mut self,
        depth: u8,
        state: &GameState,
        roll: u8,
        moves: &MoveList,
    ) -> Option<Result<Location, WorkerError>> {
        let PandaState::Loaded(engine) = &mut self.panda else {
            return None;
        };
        let request = AiPandaMoveRequest {
            depth,
            state: *state,
            roll,
        };
        Some(Self::query_engine(engine, &request, moves))
    }

    fn query_engine(
        engine: &mut E,
        request: &AiPandaMoveRequest,
        moves: &MoveList,
    ) -> Result<Location, WorkerError> {
        let reply = engine.send_request(&request.to_engine_request()?)?;
        let from = AiPandaMoveRequest::read_response(&reply)?;
        if moves.contains(from) {
            Ok(from)
        } else {
            Err(WorkerError::IllegalEngineMove(from))
        }
    }
}
