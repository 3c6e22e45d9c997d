// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use crate::{ByteArray, DecodeError, EncodeError, PacketType, Properties, UnsubscribePacket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsubscribeAckPacket {
    pub packet_id: u16,
    pub properties: Properties,
    pub reason_codes: Vec<u8>,
}

impl UnsubscribeAckPacket {
    /// Reason 0x00 ("Success") for every topic in the request.
    #[must_use]
    pub fn from_request(request: &UnsubscribePacket) -> Self {
        Self {
            packet_id: request.packet_id,
            properties: Properties::empty(),
            reason_codes: vec![0x00; request.topics.len()],
        }
    }

    pub fn packet_type(&self) -> PacketType {
        PacketType::UnsubscribeAck
    }

    pub fn decode_body(ba: &mut ByteArray, remaining_length: usize) -> Result<Self, DecodeError> {
        let start = ba.offset();
        let packet_id = ba.read_u16()?;
        let properties = Properties::decode(ba)?;
        let consumed = ba.offset() - start;
        let reason_codes_len = remaining_length.saturating_sub(consumed);
        let reason_codes = ba.read_bytes(reason_codes_len)?.to_vec();
        Ok(Self { packet_id, properties, reason_codes })
    }

    pub fn encode_body(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        buf.extend_from_slice(&self.packet_id.to_be_bytes());
        self.properties.encode(buf)?;
        buf.extend_from_slice(&self.reason_codes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_the_request_topic_count() {
        let request = UnsubscribePacket {
            packet_id: 2,
            properties: Properties::empty(),
            topics: vec!["/a".to_owned()],
        };
        let ack = UnsubscribeAckPacket::from_request(&request);
        let mut body = Vec::new();
        ack.encode_body(&mut body).unwrap();
        assert_eq!(body, vec![0x00, 0x02, 0x00, 0x00]);
        let mut ba = ByteArray::new(&body);
        assert_eq!(UnsubscribeAckPacket::decode_body(&mut ba, body.len()).unwrap(), ack);
    }
}
