//! Packets spoken between game clients and the game server.
//!
//! The client registry decodes [`ServerPacket`]s and encodes [`ClientPacket`]s;
//! the server registry is its mirror. Both are built on [`ur_core::protocol`].

pub mod client_packets;
pub mod server_packets;

pub use client_packets::ClientPacket;
pub use server_packets::{GameInfo, RollInfo, ServerPacket, StateUpdate};

use ur_core::protocol::PacketSet;

pub const PROTOCOL_VERSION: u32 = 4;
pub const PROTOCOL_VERSION_DIGITS: usize = 4;

/// The registry used by clients: server packets in, client packets out.
pub fn client_packet_set(debug: bool) -> PacketSet<ServerPacket> {
    let set = server_packets::NAMES
        .iter()
        .fold(PacketSet::new("Network", debug), |set, &(name, decode)| {
            set.add_incoming(name, decode)
        });
    client_packets::NAMES
        .iter()
        .fold(set, |set, &(name, _)| set.add_outgoing(name))
}

/// The registry used by the server: client packets in, server packets out.
pub fn server_packet_set(debug: bool) -> PacketSet<ClientPacket> {
    let set = client_packets::NAMES
        .iter()
        .fold(PacketSet::new("Server", debug), |set, &(name, decode)| {
            set.add_incoming(name, decode)
        });
    server_packets::NAMES
        .iter()
        .fold(set, |set, &(name, _)| set.add_outgoing(name))
}
