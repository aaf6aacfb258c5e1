use crate::engine::move_list::MoveList;
use crate::logic::board::Location;
use crate::logic::dice::MAX_ROLL;
use crate::logic::game::GameState;
use crate::protocol::ai::{ai_packet_set, AiFunctionality, AiMoveRequest, AiPacket};
use crate::protocol::{Packet, PacketError, PacketSet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Packet(#[from] PacketError),
    #[error("a move request is already in flight")]
    RequestInFlight,
    #[error("invalid move request: depth {depth}, roll {roll}")]
    InvalidRequest { depth: u8, roll: u8 },
    #[error("a roll of {roll} has no legal move to ask for")]
    NoValidMoves { roll: u8 },
    #[error("the worker is gone")]
    Disconnected,
    #[error("unexpected {0} packet from the worker")]
    UnexpectedPacket(&'static str),
}

/// Carries encoded packets to a worker host.
pub trait WorkerTransport {
    fn post(&self, message: String) -> Result<(), BridgeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerEvent {
    FunctionalityChanged(AiFunctionality),
    MoveComputed(Location),
}

/// Main-side handle on a search worker.
///
/// Only one move request may be outstanding. [`Self::discard_pending`] gives up
/// on it; the worker still answers, and that answer is swallowed.
pub struct ComputerWorker<T> {
    transport: T,
    packets: PacketSet<AiPacket>,
    functionality: AiFunctionality,
    waiting: bool,
    discarded: usize,
}

impl<T: WorkerTransport> ComputerWorker<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            packets: ai_packet_set(),
            functionality: AiFunctionality::default(),
            waiting: false,
            discarded: 0,
        }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub const fn functionality(&self) -> AiFunctionality {
        self.functionality
    }

    pub const fn is_waiting(&self) -> bool {
        self.waiting
    }

    pub fn post_move_request(
        &mut self,
        state: &GameState,
        roll: u8,
        depth: u8,
        use_panda: bool,
    ) -> Result<(), BridgeError> {
        if self.waiting {
            return Err(BridgeError::RequestInFlight);
        }
        if depth == 0 || roll > MAX_ROLL {
            return Err(BridgeError::InvalidRequest { depth, roll });
        }
        let mut moves = MoveList::new();
        if state.won || state.get_valid_moves(roll, &mut moves).is_empty() {
            return Err(BridgeError::NoValidMoves { roll });
        }

        let request = AiPacket::MoveRequest(AiMoveRequest {
            depth,
            use_panda,
            state: *state,
            roll,
        });
        let raw = self.packets.encode(&request)?;
        self.transport.post(raw)?;
        self.waiting = true;
        Ok(())
    }

    pub fn discard_pending(&mut self) {
        if self.waiting {
            self.waiting = false;
            self.discarded += 1;
        }
    }

    /// Decodes one message from the worker. Returns `None` for answers to
    /// discarded requests.
    pub fn on_message(&mut self, raw: &str) -> Result<Option<WorkerEvent>, BridgeError> {
        let read = self.packets.read_packet(raw)?;
        match read.packet {
            AiPacket::Functionality(functionality) => {
                self.functionality = functionality;
                Ok(Some(WorkerEvent::FunctionalityChanged(functionality)))
            }
            AiPacket::MoveResponse(response) => {
                if self.discarded > 0 {
                    self.discarded -= 1;
                    log::debug!("dropping response to a discarded request");
                    return Ok(None);
                }
                if !self.waiting {
                    log::warn!("unsolicited move response from {}", response.move_from);
                    return Ok(None);
                }
                self.waiting = false;
                Ok(Some(WorkerEvent::MoveComputed(response.move_from)))
            }
            other => Err(BridgeError::UnexpectedPacket(other.name())),
        }
    }
}
