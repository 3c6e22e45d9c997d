// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use crate::{ByteArray, DecodeError, EncodeError, PacketType, Properties};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeTopic {
    pub topic: String,
    pub options: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribePacket {
    pub packet_id: u16,
    pub properties: Properties,
    pub topics: Vec<SubscribeTopic>,
}

impl SubscribePacket {
    pub fn packet_type(&self) -> PacketType {
        PacketType::Subscribe
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
            let options = ba.read_byte()?;
            payload_remaining = payload_remaining.saturating_sub(ba.offset() - before);
            topics.push(SubscribeTopic { topic, options });
        }
        Ok(Self { packet_id, properties, topics })
    }

    pub fn encode_body(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        buf.extend_from_slice(&self.packet_id.to_be_bytes());
        self.properties.encode(buf)?;
        for entry in &self.topics {
            let bytes = entry.topic.as_bytes();
            let len: u16 = bytes.len().try_into().map_err(|_e| EncodeError::TooLong)?;
            buf.extend_from_slice(&len.to_be_bytes());
            buf.extend_from_slice(bytes);
            buf.push(entry.options);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_topic_round_trips() {
        let packet = SubscribePacket {
            packet_id: 1,
            properties: Properties::empty(),
            topics: vec![SubscribeTopic { topic: "/a".to_owned(), options: 0 }],
        };
        let mut body = Vec::new();
        packet.encode_body(&mut body).unwrap();
        let mut ba = ByteArray::new(&body);
        assert_eq!(SubscribePacket::decode_body(&mut ba, body.len()).unwrap(), packet);
    }

    #[test]
    fn many_topics_round_trip() {
        let topics: Vec<_> = (0..200)
            .map(|i| SubscribeTopic { topic: format!("/topic/{i}"), options: 0 })
            .collect();
        let packet = SubscribePacket { packet_id: 2, properties: Properties::empty(), topics };
        let mut body = Vec::new();
        packet.encode_body(&mut body).unwrap();
        let mut ba = ByteArray::new(&body);
        let decoded = SubscribePacket::decode_body(&mut ba, body.len()).unwrap();
        assert_eq!(decoded.topics.len(), 200);
        assert_eq!(decoded, packet);
    }
}
