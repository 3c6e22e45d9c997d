// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! AUTH is part of the MQTT v5 enhanced-authentication exchange. This
//! broker performs no authentication (Non-goals, §1) and never originates
//! one, but a client that speaks it must not be disconnected outright: the
//! packet still decodes and is handled by the session's permissive
//! fallback for recognized-but-unhandled types.

use crate::{ByteArray, DecodeError, EncodeError, PacketType, Properties};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthPacket {
    pub reason_code: u8,
    pub properties: Properties,
}

impl AuthPacket {
    pub fn packet_type(&self) -> PacketType {
        PacketType::Auth
    }

    pub fn decode_body(ba: &mut ByteArray, _remaining_length: usize) -> Result<Self, DecodeError> {
        let reason_code = ba.read_byte()?;
        let properties = Properties::decode(ba)?;
        Ok(Self { reason_code, properties })
    }

    pub fn encode_body(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        buf.push(self.reason_code);
        self.properties.encode(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let packet = AuthPacket { reason_code: 0x18, properties: Properties::empty() };
        let mut body = Vec::new();
        packet.encode_body(&mut body).unwrap();
        let mut ba = ByteArray::new(&body);
        assert_eq!(AuthPacket::decode_body(&mut ba, body.len()).unwrap(), packet);
    }
}
