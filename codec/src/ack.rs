// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! PUBACK, PUBREC, PUBREL and PUBCOMP all share one wire shape: packet id,
//! reason code, and an optional property list present only when
//! `remaining_length` has room for it. None of the four is ever acted on by
//! this broker (QoS 1/2 acknowledgement flows are out of scope) but they
//! still decode, so a client using them is merely routed best-effort rather
//! than disconnected.

use crate::{ByteArray, DecodeError, EncodeError, Properties};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckPacket {
    pub packet_id: u16,
    pub reason_code: u8,
    pub properties: Properties,
}

impl AckPacket {
    pub fn decode_body(ba: &mut ByteArray, remaining_length: usize) -> Result<Self, DecodeError> {
        let packet_id = ba.read_u16()?;
        let reason_code = ba.read_byte()?;
        let properties = if remaining_length >= 4 {
            Properties::decode(ba)?
        } else {
            Properties::empty()
        };
        Ok(Self { packet_id, reason_code, properties })
    }

    pub fn encode_body(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        buf.extend_from_slice(&self.packet_id.to_be_bytes());
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
    fn short_form_round_trips_without_properties() {
        let packet = AckPacket { packet_id: 9, reason_code: 0, properties: Properties::empty() };
        let mut body = Vec::new();
        packet.encode_body(&mut body).unwrap();
        assert_eq!(body.len(), 3, "short form omits the properties VBI entirely");
        let mut ba = ByteArray::new(&body);
        assert_eq!(AckPacket::decode_body(&mut ba, body.len()).unwrap(), packet);
    }
}
