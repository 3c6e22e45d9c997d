// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use crate::{ByteArray, DecodeError, EncodeError, PacketType, Properties, SubscribePacket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeAckPacket {
    pub packet_id: u16,
    pub properties: Properties,
    pub reason_codes: Vec<u8>,
}

impl SubscribeAckPacket {
    /// Reason 0x00 ("Granted QoS 0") for every topic in the request, since
    /// this broker only ever grants QoS 0.
    #[must_use]
    pub fn from_request(request: &SubscribePacket) -> Self {
        Self {
            packet_id: request.packet_id,
            properties: Properties::empty(),
            reason_codes: vec![0x00; request.topics.len()],
        }
    }

    pub fn packet_type(&self) -> PacketType {
        PacketType::SubscribeAck
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
