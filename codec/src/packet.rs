// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! The top-level sum type over all fifteen control packets, and the
//! constructors for every packet this broker originates itself.
//!
//! Decoding a whole packet off a live connection is split across the
//! async/sync boundary described in the data model: the caller reads the
//! fixed header's first byte and the `remaining_length` VBI directly off
//! the socket (the only two fields whose own length isn't known up front),
//! buffers exactly `remaining_length` bytes, and then hands that buffer to
//! [`Packet::decode_body`] alongside the already-decoded [`PacketType`].
//! [`Packet::decode`] and [`Packet::encode`] below compose that split back
//! into a single call for callers that already have a whole buffer (tests,
//! and any in-memory pipe).

use crate::{
    AckPacket, AuthPacket, ByteArray, ConnectAckPacket, ConnectPacket, DecodeError,
    DisconnectPacket, EncodeError, FixedHeader, PacketType, PingRequestPacket,
    PingResponsePacket, Properties, PublishPacket, SubscribeAckPacket, SubscribePacket,
    UnsubscribeAckPacket, UnsubscribePacket,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Connect(ConnectPacket),
    ConnectAck(ConnectAckPacket),
    Publish(PublishPacket),
    PublishAck(AckPacket),
    PublishReceived(AckPacket),
    PublishRelease(AckPacket),
    PublishComplete(AckPacket),
    Subscribe(SubscribePacket),
    SubscribeAck(SubscribeAckPacket),
    Unsubscribe(UnsubscribePacket),
    UnsubscribeAck(UnsubscribeAckPacket),
    PingRequest(PingRequestPacket),
    PingResponse(PingResponsePacket),
    Disconnect(DisconnectPacket),
    Auth(AuthPacket),
}

impl Packet {
    #[must_use]
    pub fn packet_type(&self) -> PacketType {
        match self {
            Self::Connect(_) => PacketType::Connect,
            Self::ConnectAck(_) => PacketType::ConnectAck,
            Self::Publish(p) => p.packet_type(),
            Self::PublishAck(_) => PacketType::PublishAck,
            Self::PublishReceived(_) => PacketType::PublishReceived,
            Self::PublishRelease(_) => PacketType::PublishRelease,
            Self::PublishComplete(_) => PacketType::PublishComplete,
            Self::Subscribe(_) => PacketType::Subscribe,
            Self::SubscribeAck(_) => PacketType::SubscribeAck,
            Self::Unsubscribe(_) => PacketType::Unsubscribe,
            Self::UnsubscribeAck(_) => PacketType::UnsubscribeAck,
            Self::PingRequest(_) => PacketType::PingRequest,
            Self::PingResponse(_) => PacketType::PingResponse,
            Self::Disconnect(_) => PacketType::Disconnect,
            Self::Auth(_) => PacketType::Auth,
        }
    }

    /// Parses the variable header and payload for a packet whose fixed
    /// header has already been decoded. `remaining_length` is the number of
    /// bytes `ba` holds (variable header + payload).
    pub fn decode_body(
        packet_type: PacketType,
        ba: &mut ByteArray,
        remaining_length: usize,
    ) -> Result<Self, DecodeError> {
        match packet_type {
            PacketType::Connect => {
                Ok(Self::Connect(ConnectPacket::decode_body(ba, remaining_length)?))
            }
            PacketType::ConnectAck => {
                Ok(Self::ConnectAck(ConnectAckPacket::decode_body(ba, remaining_length)?))
            }
            PacketType::Publish { dup, qos, retain } => Ok(Self::Publish(
                PublishPacket::decode_body(ba, remaining_length, dup, qos, retain)?,
            )),
            PacketType::PublishAck => {
                Ok(Self::PublishAck(AckPacket::decode_body(ba, remaining_length)?))
            }
            PacketType::PublishReceived => {
                Ok(Self::PublishReceived(AckPacket::decode_body(ba, remaining_length)?))
            }
            PacketType::PublishRelease => {
                Ok(Self::PublishRelease(AckPacket::decode_body(ba, remaining_length)?))
            }
            PacketType::PublishComplete => {
                Ok(Self::PublishComplete(AckPacket::decode_body(ba, remaining_length)?))
            }
            PacketType::Subscribe => {
                Ok(Self::Subscribe(SubscribePacket::decode_body(ba, remaining_length)?))
            }
            PacketType::SubscribeAck => {
                Ok(Self::SubscribeAck(SubscribeAckPacket::decode_body(ba, remaining_length)?))
            }
            PacketType::Unsubscribe => {
                Ok(Self::Unsubscribe(UnsubscribePacket::decode_body(ba, remaining_length)?))
            }
            PacketType::UnsubscribeAck => {
                Ok(Self::UnsubscribeAck(UnsubscribeAckPacket::decode_body(ba, remaining_length)?))
            }
            PacketType::PingRequest => {
                Ok(Self::PingRequest(PingRequestPacket::decode_body(ba, remaining_length)?))
            }
            PacketType::PingResponse => {
                Ok(Self::PingResponse(PingResponsePacket::decode_body(ba, remaining_length)?))
            }
            PacketType::Disconnect => {
                Ok(Self::Disconnect(DisconnectPacket::decode_body(ba, remaining_length)?))
            }
            PacketType::Auth => Ok(Self::Auth(AuthPacket::decode_body(ba, remaining_length)?)),
        }
    }

    pub fn encode_body(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        match self {
            Self::Connect(p) => p.encode_body(buf),
            Self::ConnectAck(p) => p.encode_body(buf),
            Self::Publish(p) => p.encode_body(buf),
            Self::PublishAck(p) | Self::PublishReceived(p) | Self::PublishRelease(p)
            | Self::PublishComplete(p) => p.encode_body(buf),
            Self::Subscribe(p) => p.encode_body(buf),
            Self::SubscribeAck(p) => p.encode_body(buf),
            Self::Unsubscribe(p) => p.encode_body(buf),
            Self::UnsubscribeAck(p) => p.encode_body(buf),
            Self::PingRequest(p) => p.encode_body(buf),
            Self::PingResponse(p) => p.encode_body(buf),
            Self::Disconnect(p) => p.encode_body(buf),
            Self::Auth(p) => p.encode_body(buf),
        }
    }

    /// Decodes a whole packet (fixed header included) out of a buffer that
    /// already holds it in full. Convenience for tests and in-memory pipes;
    /// the live socket path decodes the fixed header directly off the
    /// connection instead (see the module doc comment).
    pub fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let header = FixedHeader::decode(ba)?;
        let body = ba.read_bytes(header.remaining_length)?;
        let mut body_ba = ByteArray::new(body);
        Self::decode_body(header.packet_type, &mut body_ba, header.remaining_length)
    }

    /// Encodes a whole packet, computing `remaining_length` from the
    /// serialized body before the fixed header is written, per the framing
    /// rule in the data model: the length field precedes the bytes it
    /// counts, so it cannot be known until the body is already built.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut body = Vec::new();
        self.encode_body(&mut body)?;
        let header = FixedHeader { packet_type: self.packet_type(), remaining_length: body.len() };
        let mut buf = Vec::new();
        header.encode(&mut buf)?;
        buf.extend_from_slice(&body);
        Ok(buf)
    }
}

/// CONNACK with ack-flags = 0, reason-code = 0 (Success), no properties.
#[must_use]
pub fn make_connack() -> Packet {
    Packet::ConnectAck(ConnectAckPacket::new_success())
}

/// SUBACK carrying the original packet-id and one "Granted QoS 0" reason
/// code per topic in `request`.
#[must_use]
pub fn make_suback(request: &SubscribePacket) -> Packet {
    Packet::SubscribeAck(SubscribeAckPacket::from_request(request))
}

/// UNSUBACK carrying the original packet-id and one "Success" reason code
/// per topic in `request`.
#[must_use]
pub fn make_unsuback(request: &UnsubscribePacket) -> Packet {
    Packet::UnsubscribeAck(UnsubscribeAckPacket::from_request(request))
}

/// QoS 0 PUBLISH with no dup, no retain, no packet-id, no properties.
#[must_use]
pub fn make_publish(topic: String, payload: Vec<u8>) -> Packet {
    Packet::Publish(PublishPacket::new(topic, payload))
}

#[must_use]
pub fn make_pingresp() -> Packet {
    Packet::PingResponse(PingResponsePacket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SubscribeTopic;

    #[test]
    fn connack_round_trips_through_whole_packet_codec() {
        let packet = make_connack();
        let encoded = packet.encode().unwrap();
        assert_eq!(encoded, vec![0x20, 0x03, 0x00, 0x00, 0x00]);
        let mut ba = ByteArray::new(&encoded);
        assert_eq!(Packet::decode(&mut ba).unwrap(), packet);
    }

    #[test]
    fn suback_round_trips() {
        let request = SubscribePacket {
            packet_id: 1,
            properties: Properties::empty(),
            topics: vec![SubscribeTopic { topic: "/a".to_owned(), options: 0 }],
        };
        let packet = make_suback(&request);
        let encoded = packet.encode().unwrap();
        assert_eq!(encoded, vec![0x90, 0x04, 0x00, 0x01, 0x00, 0x00]);
        let mut ba = ByteArray::new(&encoded);
        assert_eq!(Packet::decode(&mut ba).unwrap(), packet);
    }

    #[test]
    fn publish_round_trips() {
        let packet = make_publish("/a".to_owned(), b"hi".to_vec());
        let encoded = packet.encode().unwrap();
        assert_eq!(encoded, vec![0x30, 0x08, 0x00, 0x02, b'/', b'a', 0x00, b'h', b'i']);
        let mut ba = ByteArray::new(&encoded);
        assert_eq!(Packet::decode(&mut ba).unwrap(), packet);
    }

    #[test]
    fn pingreq_round_trips() {
        let mut ba = ByteArray::new(&[0xc0, 0x00]);
        let decoded = Packet::decode(&mut ba).unwrap();
        assert_eq!(decoded, Packet::PingRequest(PingRequestPacket));
        assert_eq!(decoded.encode().unwrap(), vec![0xc0, 0x00]);
    }

    #[test]
    fn remaining_length_is_exact() {
        let packet = make_publish("/a".to_owned(), b"hi".to_vec());
        let encoded = packet.encode().unwrap();
        let mut ba = ByteArray::new(&encoded);
        let header = FixedHeader::decode(&mut ba).unwrap();
        assert_eq!(header.remaining_length, encoded.len() - 2);
    }
}
