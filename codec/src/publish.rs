// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use crate::{ByteArray, DecodeError, EncodeError, PacketType, Properties, QoS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPacket {
    pub dup: bool,
    pub qos: QoS,
    pub retain: bool,
    pub topic_name: String,
    /// Present iff `qos != AtMostOnce`. A QoS 1/2 PUBLISH still decodes (so a
    /// client that asks for acknowledged delivery isn't disconnected) but the
    /// broker only ever routes it best-effort, as QoS 0, per the Non-goals.
    pub packet_id: Option<u16>,
    pub properties: Properties,
    pub payload: Vec<u8>,
}

impl PublishPacket {
    /// The only shape the broker itself originates: QoS 0, no dup, no
    /// retain, no properties, no packet id.
    #[must_use]
    pub fn new(topic_name: String, payload: Vec<u8>) -> Self {
        Self {
            dup: false,
            qos: QoS::AtMostOnce,
            retain: false,
            topic_name,
            packet_id: None,
            properties: Properties::empty(),
            payload,
        }
    }

    pub fn packet_type(&self) -> PacketType {
        PacketType::Publish { dup: self.dup, qos: self.qos, retain: self.retain }
    }

    pub fn decode_body(
        ba: &mut ByteArray,
        remaining_length: usize,
        dup: bool,
        qos: QoS,
        retain: bool,
    ) -> Result<Self, DecodeError> {
        let start = ba.offset();
        let topic_len = ba.read_u16()? as usize;
        let topic_name = ba.read_string(topic_len)?;
        let packet_id = if qos == QoS::AtMostOnce { None } else { Some(ba.read_u16()?) };
        let properties = Properties::decode(ba)?;
        let consumed = ba.offset() - start;
        let payload_len = remaining_length.saturating_sub(consumed);
        let payload = ba.read_bytes(payload_len)?.to_vec();
        Ok(Self { dup, qos, retain, topic_name, packet_id, properties, payload })
    }

    pub fn encode_body(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        let topic_bytes = self.topic_name.as_bytes();
        let len: u16 = topic_bytes.len().try_into().map_err(|_e| EncodeError::TooLong)?;
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(topic_bytes);
        if let Some(packet_id) = self.packet_id {
            buf.extend_from_slice(&packet_id.to_be_bytes());
        }
        self.properties.encode(buf)?;
        buf.extend_from_slice(&self.payload);
        Ok(())
    }
}
