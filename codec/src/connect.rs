// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use crate::{ByteArray, DecodeError, EncodeError, PacketType, Properties};

/// CONNECT's payload (client id, will topic/message, username, password) is
/// never parsed: this broker has no session persistence, no last-will, and
/// no authentication, so there is nothing to do with those bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectPacket {
    pub protocol_name: String,
    pub protocol_level: u8,
    pub connect_flags: u8,
    pub keep_alive: u16,
    pub properties: Properties,
}

impl ConnectPacket {
    pub fn packet_type(&self) -> PacketType {
        PacketType::Connect
    }

    pub fn decode_body(ba: &mut ByteArray, remaining_length: usize) -> Result<Self, DecodeError> {
        let start = ba.offset();
        let name_len = ba.read_u16()? as usize;
        let protocol_name = ba.read_string(name_len)?;
        let protocol_level = ba.read_byte()?;
        let connect_flags = ba.read_byte()?;
        let keep_alive = ba.read_u16()?;
        let properties = Properties::decode(ba)?;
        let consumed = ba.offset() - start;
        let payload_len = remaining_length.saturating_sub(consumed);
        ba.read_bytes(payload_len)?;
        Ok(Self {
            protocol_name,
            protocol_level,
            connect_flags,
            keep_alive,
            properties,
        })
    }

    pub fn encode_body(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        let name_bytes = self.protocol_name.as_bytes();
        let len: u16 = name_bytes.len().try_into().map_err(|_e| EncodeError::TooLong)?;
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(name_bytes);
        buf.push(self.protocol_level);
        buf.push(self.connect_flags);
        buf.extend_from_slice(&self.keep_alive.to_be_bytes());
        self.properties.encode(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_without_payload() {
        let packet = ConnectPacket {
            protocol_name: "MQTT".to_owned(),
            protocol_level: 5,
            connect_flags: 0x02,
            keep_alive: 60,
            properties: Properties::empty(),
        };
        let mut body = Vec::new();
        packet.encode_body(&mut body).unwrap();
        let mut ba = ByteArray::new(&body);
        let decoded = ConnectPacket::decode_body(&mut ba, body.len()).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn payload_bytes_are_skipped_not_rejected() {
        let packet = ConnectPacket {
            protocol_name: "MQTT".to_owned(),
            protocol_level: 5,
            connect_flags: 0x02,
            keep_alive: 60,
            properties: Properties::empty(),
        };
        let mut body = Vec::new();
        packet.encode_body(&mut body).unwrap();
        // Append an opaque client-id payload; decode_body must not choke on it.
        body.extend_from_slice(&[0x00, 0x00]);
        let mut ba = ByteArray::new(&body);
        let decoded = ConnectPacket::decode_body(&mut ba, body.len()).unwrap();
        assert_eq!(decoded, packet);
    }
}
