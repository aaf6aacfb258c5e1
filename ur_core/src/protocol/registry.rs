use crate::protocol::{PacketError, PacketIn, PacketOut, MAX_PACKET_TYPE_ID};

/// Decodes the fields of one packet type (type character already consumed).
pub type DecodeFn<P> = fn(&mut PacketIn<'_>) -> Result<P, PacketError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketDirection {
    Incoming,
    Outgoing,
    Bidirectional,
}

pub struct IncomingPacketType<P> {
    pub name: &'static str,
    pub id: u8,
    decode: DecodeFn<P>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutgoingPacketType {
    pub name: &'static str,
    pub id: u8,
}

/// A typed packet that can serialize its own fields.
pub trait Packet {
    fn name(&self) -> &'static str;
    fn write(&self, out: &mut PacketOut) -> Result<(), PacketError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPacket<P> {
    pub name: &'static str,
    pub packet: P,
    /// The packet as received, without its type character.
    pub raw_data: String,
}

/// The packet types one side of a connection can send and receive. Ids are
/// assigned in registration order, separately per direction.
pub struct PacketSet<P> {
    name: String,
    debug: bool,
    incoming: Vec<IncomingPacketType<P>>,
    outgoing: Vec<OutgoingPacketType>,
}

impl<P> PacketSet<P> {
    pub fn new(name: impl Into<String>, debug: bool) -> Self {
        Self {
            name: name.into(),
            debug,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// # Panics
    ///
    /// Panics if more incoming types are registered than one character can carry.
    #[must_use]
    pub fn add_incoming(mut self, name: &'static str, decode: DecodeFn<P>) -> Self {
        let id = next_id(&self.name, self.incoming.len());
        self.incoming.push(IncomingPacketType { name, id, decode });
        self
    }

    /// # Panics
    ///
    /// Panics if more outgoing types are registered than one character can carry.
    #[must_use]
    pub fn add_outgoing(mut self, name: &'static str) -> Self {
        let id = next_id(&self.name, self.outgoing.len());
        self.outgoing.push(OutgoingPacketType { name, id });
        self
    }

    /// Registers a type in both directions under the same id.
    ///
    /// # Panics
    ///
    /// Panics if the two directions already hold different numbers of types,
    /// since the shared id could not line up.
    #[must_use]
    pub fn add_bidirectional(self, name: &'static str, decode: DecodeFn<P>) -> Self {
        assert_eq!(
            self.incoming.len(),
            self.outgoing.len(),
            "{}: bidirectional packet {name} needs equal incoming and outgoing counts",
            self.name
        );
        self.add_incoming(name, decode).add_outgoing(name)
    }

    pub fn direction(&self, name: &str) -> Option<PacketDirection> {
        match (self.incoming(name).is_some(), self.outgoing(name).is_some()) {
            (true, true) => Some(PacketDirection::Bidirectional),
            (true, false) => Some(PacketDirection::Incoming),
            (false, true) => Some(PacketDirection::Outgoing),
            (false, false) => None,
        }
    }

    pub fn incoming(&self, name: &str) -> Option<&IncomingPacketType<P>> {
        self.incoming.iter().find(|ty| ty.name == name)
    }

    pub fn outgoing(&self, name: &str) -> Option<&OutgoingPacketType> {
        self.outgoing.iter().find(|ty| ty.name == name)
    }

    pub fn read_packet(&self, raw: &str) -> Result<ReadPacket<P>, PacketError> {
        let mut packet_in = PacketIn::new(raw)?;
        let id = packet_in.id().ok_or(PacketError::MissingType)?;
        let ty = self
            .incoming
            .get(usize::from(id))
            .ok_or_else(|| PacketError::UnknownIncomingType {
                set: self.name.clone(),
                id,
            })?;

        let packet = (ty.decode)(&mut packet_in)?;
        packet_in.assert_empty()?;

        let raw_data = packet_in.raw_data().to_owned();
        if self.debug {
            log::debug!("{} << {} {raw_data}", self.name, ty.name);
        }
        Ok(ReadPacket {
            name: ty.name,
            packet,
            raw_data,
        })
    }

    pub fn new_packet_out(&self, name: &str) -> Result<PacketOut, PacketError> {
        let ty = self
            .outgoing(name)
            .ok_or_else(|| PacketError::UnknownOutgoingType {
                set: self.name.clone(),
                name: name.to_owned(),
            })?;
        Ok(PacketOut::new(ty.id))
    }

    pub fn encode(&self, packet: &impl Packet) -> Result<String, PacketError> {
        let mut out = self.new_packet_out(packet.name())?;
        packet.write(&mut out)?;
        if self.debug {
            log::debug!("{} >> {} {}", self.name, packet.name(), out.data_no_type());
        }
        Ok(out.into_data())
    }
}

fn next_id(set: &str, registered: usize) -> u8 {
    match u8::try_from(registered) {
        Ok(id) if id <= MAX_PACKET_TYPE_ID => id,
        _ => panic!("{set}: cannot register more than {} packet types", MAX_PACKET_TYPE_ID + 1),
    }
}
