// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use crate::{ByteArray, DecodeError, EncodeError, QoS, VarInt};

/// The fifteen MQTT v5 control packet types, folded together with their
/// fixed-header flag bits where those flags carry information (PUBLISH) or
/// must be validated (SUBSCRIBE/UNSUBSCRIBE/PUBREL require `0b0010`).
///
/// Keeping `Publish`'s dup/qos/retain bits as part of this enum rather than
/// as loose fields elsewhere means the active variant and the fixed header's
/// tag can never drift out of sync with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Connect,
    ConnectAck,
    Publish { dup: bool, qos: QoS, retain: bool },
    PublishAck,
    PublishReceived,
    PublishRelease,
    PublishComplete,
    Subscribe,
    SubscribeAck,
    Unsubscribe,
    UnsubscribeAck,
    PingRequest,
    PingResponse,
    Disconnect,
    Auth,
}

impl PacketType {
    #[must_use]
    pub const fn type_id(self) -> u8 {
        match self {
            Self::Connect => 1,
            Self::ConnectAck => 2,
            Self::Publish { .. } => 3,
            Self::PublishAck => 4,
            Self::PublishReceived => 5,
            Self::PublishRelease => 6,
            Self::PublishComplete => 7,
            Self::Subscribe => 8,
            Self::SubscribeAck => 9,
            Self::Unsubscribe => 10,
            Self::UnsubscribeAck => 11,
            Self::PingRequest => 12,
            Self::PingResponse => 13,
            Self::Disconnect => 14,
            Self::Auth => 15,
        }
    }

    #[must_use]
    pub const fn flags_nibble(self) -> u8 {
        match self {
            Self::Publish { dup, qos, retain } => {
                let mut flags = qos.bits() << 1;
                if dup {
                    flags |= 0b1000;
                }
                if retain {
                    flags |= 0b0001;
                }
                flags
            }
            Self::PublishRelease | Self::Subscribe | Self::Unsubscribe => 0b0010,
            _ => 0b0000,
        }
    }
}

impl TryFrom<u8> for PacketType {
    type Error = DecodeError;

    /// Decodes a full fixed-header first byte: high nibble is the type,
    /// low nibble is the flags, validated against the fixed rules each
    /// type imposes on its reserved bits.
    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        let type_id = byte >> 4;
        let flags = byte & 0x0f;
        match type_id {
            1 => expect_flags(flags, 0b0000, Self::Connect),
            2 => expect_flags(flags, 0b0000, Self::ConnectAck),
            3 => {
                let qos = QoS::try_from((flags >> 1) & 0b11)?;
                Ok(Self::Publish {
                    dup: flags & 0b1000 != 0,
                    qos,
                    retain: flags & 0b0001 != 0,
                })
            }
            4 => expect_flags(flags, 0b0000, Self::PublishAck),
            5 => expect_flags(flags, 0b0000, Self::PublishReceived),
            6 => expect_flags(flags, 0b0010, Self::PublishRelease),
            7 => expect_flags(flags, 0b0000, Self::PublishComplete),
            8 => expect_flags(flags, 0b0010, Self::Subscribe),
            9 => expect_flags(flags, 0b0000, Self::SubscribeAck),
            10 => expect_flags(flags, 0b0010, Self::Unsubscribe),
            11 => expect_flags(flags, 0b0000, Self::UnsubscribeAck),
            12 => expect_flags(flags, 0b0000, Self::PingRequest),
            13 => expect_flags(flags, 0b0000, Self::PingResponse),
            14 => expect_flags(flags, 0b0000, Self::Disconnect),
            15 => expect_flags(flags, 0b0000, Self::Auth),
            other => Err(DecodeError::InvalidPacketType(other)),
        }
    }
}

fn expect_flags(got: u8, want: u8, packet_type: PacketType) -> Result<PacketType, DecodeError> {
    if got == want {
        Ok(packet_type)
    } else {
        Err(DecodeError::InvalidPacketFlags)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHeader {
    pub packet_type: PacketType,
    pub remaining_length: usize,
}

impl FixedHeader {
    pub fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let packet_type = PacketType::try_from(ba.read_byte()?)?;
        let remaining_length = VarInt::decode(ba)?.value();
        Ok(Self { packet_type, remaining_length })
    }

    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        let first_byte = (self.packet_type.type_id() << 4) | self.packet_type.flags_nibble();
        buf.push(first_byte);
        VarInt::new(self.remaining_length)?.encode(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_requires_reserved_flags() {
        assert!(PacketType::try_from(0b1000_0010).is_ok());
        assert_eq!(
            PacketType::try_from(0b1000_0000),
            Err(DecodeError::InvalidPacketFlags)
        );
    }

    #[test]
    fn publish_flags_round_trip() {
        let pt = PacketType::Publish { dup: true, qos: QoS::AtLeastOnce, retain: true };
        let byte = (pt.type_id() << 4) | pt.flags_nibble();
        assert_eq!(PacketType::try_from(byte), Ok(pt));
    }

    #[test]
    fn unknown_type_id_is_malformed() {
        assert_eq!(PacketType::try_from(0x00), Err(DecodeError::InvalidPacketType(0)));
    }
}
