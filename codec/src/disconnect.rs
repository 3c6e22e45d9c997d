// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use crate::{ByteArray, DecodeError, EncodeError, PacketType, Properties};

/// This broker never originates a DISCONNECT (protocol violations simply
/// close the socket, per the Design Notes), but a well-behaved client sends
/// one on clean shutdown, so it must still decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectPacket {
    pub reason_code: u8,
    pub properties: Properties,
}

impl DisconnectPacket {
    pub fn packet_type(&self) -> PacketType {
        PacketType::Disconnect
    }

    pub fn decode_body(ba: &mut ByteArray, remaining_length: usize) -> Result<Self, DecodeError> {
        if remaining_length == 0 {
            return Ok(Self { reason_code: 0, properties: Properties::empty() });
        }
        let reason_code = ba.read_byte()?;
        let properties = if remaining_length >= 2 {
            Properties::decode(ba)?
        } else {
            Properties::empty()
        };
        Ok(Self { reason_code, properties })
    }

    pub fn encode_body(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        buf.push(self.reason_code);
        if !self.properties.0.is_empty() {
            self.properties.encode(buf)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_remaining_length_defaults_to_normal_disconnection() {
        let mut ba = ByteArray::new(&[]);
        let decoded = DisconnectPacket::decode_body(&mut ba, 0).unwrap();
        assert_eq!(decoded, DisconnectPacket { reason_code: 0, properties: Properties::empty() });
    }

    #[test]
    fn reason_code_without_properties_round_trips() {
        let packet = DisconnectPacket { reason_code: 0x81, properties: Properties::empty() };
        let mut body = Vec::new();
        packet.encode_body(&mut body).unwrap();
        assert_eq!(body, vec![0x81]);
        let mut ba = ByteArray::new(&body);
        assert_eq!(DisconnectPacket::decode_body(&mut ba, body.len()).unwrap(), packet);
    }
}
