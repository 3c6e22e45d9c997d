// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use crate::{ByteArray, DecodeError, EncodeError, PacketType, Properties};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsubscribePacket {
    pub packet_id: u16,
    pub properties: Properties,
    pub topics: Vec<String>,
}

impl UnsubscribePacket {
    pub fn packet_type(&self) -> PacketType {
        PacketType::Unsubscribe
    }

    pub fn decode_body(ba: &mut ByteArray, remaining_length: usize) -> Result<Self, DecodeError> {
        let start = ba.offset();
        let packet_id = ba.read_u16()?;
        let properties = Properties::decode(ba)?;
        let mut topics = Vec::new();
        let consumed_header = ba.offset() - start;
        let mut payload_remaining = remaining_length.saturating_sub(consumed_header);
        while payload_remaining > 0 {
            let before = ba.offset();
            let topic_len = ba.read_u16()? as usize;
            let topic = ba.read_string(topic_len)?;
            payload_remaining = payload_remaining.saturating_sub(ba.offset() - before);
            topics.push(topic);
        }
        Ok(Self { packet_id, properties, topics })
    }

    pub fn encode_body(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        buf.extend_from_slice(&self.packet_id.to_be_bytes());
        self.properties.encode(buf)?;
        for topic in &self.topics {
            let bytes = topic.as_bytes();
            let len: u16 = bytes.len().try_into().map_err(|_e| EncodeError::TooLong)?;
            buf.extend_from_slice(&len.to_be_bytes());
            buf.extend_from_slice(bytes);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let packet = UnsubscribePacket {
            packet_id: 2,
            properties: Properties::empty(),
            topics: vec!["/a".to_owned()],
        };
        let mut body = Vec::new();
        packet.encode_body(&mut body).unwrap();
        let mut ba = ByteArray::new(&body);
        assert_eq!(UnsubscribePacket::decode_body(&mut ba, body.len()).unwrap(), packet);
    }
}
