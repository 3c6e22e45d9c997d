// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! MQTT v5 wire codec: Variable Byte Integers, the property system, and
//! the fifteen control packet shapes.
//!
//! This crate is synchronous and has no notion of a connection or a
//! session; it operates entirely on in-memory buffers (`ByteArray` for
//! reads, `Vec<u8>` for writes). The broker crate owns the socket and the
//! asynchronous half of framing (reading the fixed header's first byte and
//! `remaining_length` directly off the live connection); everything below
//! that point runs over a buffer this crate understands.

mod ack;
mod auth;
mod byte_array;
mod connect;
mod connect_ack;
mod disconnect;
mod error;
mod header;
mod packet;
mod ping;
mod property;
mod publish;
mod qos;
mod subscribe;
mod subscribe_ack;
mod unsubscribe;
mod unsubscribe_ack;
mod var_int;

pub use ack::AckPacket;
pub use auth::AuthPacket;
pub use byte_array::ByteArray;
pub use connect::ConnectPacket;
pub use connect_ack::ConnectAckPacket;
pub use disconnect::DisconnectPacket;
pub use error::{DecodeError, EncodeError};
pub use header::{FixedHeader, PacketType};
pub use packet::{make_connack, make_pingresp, make_publish, make_suback, make_unsuback, Packet};
pub use ping::{PingRequestPacket, PingResponsePacket};
pub use property::{Properties, Property, PropertyValue};
pub use publish::PublishPacket;
pub use qos::QoS;
pub use subscribe::{SubscribePacket, SubscribeTopic};
pub use subscribe_ack::SubscribeAckPacket;
pub use unsubscribe::UnsubscribePacket;
pub use unsubscribe_ack::UnsubscribeAckPacket;
pub use var_int::{VarInt, MAX_VAR_INT};
