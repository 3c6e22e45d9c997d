// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use crate::{ByteArray, DecodeError, EncodeError, PacketType, Properties};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectAckPacket {
    pub ack_flags: u8,
    pub reason_code: u8,
    pub properties: Properties,
}

impl ConnectAckPacket {
    /// The only CONNACK this broker ever sends: success, no session present.
    #[must_use]
    pub fn new_success() -> Self {
        Self {
            ack_flags: 0,
            reason_code: 0,
            properties: Properties::empty(),
        }
    }

    pub fn packet_type(&self) -> PacketType {
        PacketType::ConnectAck
    }

    pub fn decode_body(ba: &mut ByteArray, _remaining_length: usize) -> Result<Self, DecodeError> {
        let ack_flags = ba.read_byte()?;
        let reason_code = ba.read_byte()?;
        let properties = Properties::decode(ba)?;
        Ok(Self { ack_flags, reason_code, properties })
    }

    pub fn encode_body(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        buf.push(self.ack_flags);
        buf.push(self.reason_code);
        self.properties.encode(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_connack_matches_the_well_known_wire_shape() {
        let packet = ConnectAckPacket::new_success();
        let mut body = Vec::new();
        packet.encode_body(&mut body).unwrap();
        assert_eq!(body, vec![0x00, 0x00, 0x00]);
    }

    #[test]
    fn round_trips() {
        let packet = ConnectAckPacket::new_success();
        let mut body = Vec::new();
        packet.encode_body(&mut body).unwrap();
        let mut ba = ByteArray::new(&body);
        assert_eq!(ConnectAckPacket::decode_body(&mut ba, body.len()).unwrap(), packet);
    }
}
