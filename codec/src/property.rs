// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! The MQTT v5 property system.
//!
//! This broker never inspects a property's *meaning* (it doesn't act on
//! `SessionExpiryInterval`, `ContentType`, and so on) — it only needs to
//! decode and re-encode whatever property list a client sends, byte for
//! byte. So rather than one named variant per property (as the id really
//! identifies semantically), `Property` is keyed directly by the wire type
//! the id maps to: a sparse lookup table does the dispatch, per the
//! replacement the design notes call for.

use crate::{ByteArray, DecodeError, EncodeError, VarInt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WireType {
    Byte,
    TwoByte,
    FourByte,
    VarInt,
    Binary,
    Utf8String,
    StringPair,
}

/// Property-id to wire-type table, the complete set this broker recognizes.
const fn wire_type_of(id: u32) -> Option<WireType> {
    match id {
        1 | 23 | 25 | 36 | 37 | 40 | 41 | 42 => Some(WireType::Byte),
        19 | 33 | 34 | 35 => Some(WireType::TwoByte),
        2 | 17 | 24 | 39 => Some(WireType::FourByte),
        11 => Some(WireType::VarInt),
        9 | 22 => Some(WireType::Binary),
        3 | 8 | 18 | 21 | 26 | 28 | 31 => Some(WireType::Utf8String),
        38 => Some(WireType::StringPair),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Byte(u8),
    TwoByte(u16),
    FourByte(u32),
    VarInt(usize),
    Binary(Vec<u8>),
    Utf8String(String),
    StringPair(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub id: u32,
    pub value: PropertyValue,
}

impl Property {
    pub fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let id = VarInt::decode(ba)?.value() as u32;
        let wire_type = wire_type_of(id).ok_or(DecodeError::InvalidPropertyType(id as u8))?;
        let value = match wire_type {
            WireType::Byte => PropertyValue::Byte(ba.read_byte()?),
            WireType::TwoByte => PropertyValue::TwoByte(ba.read_u16()?),
            WireType::FourByte => PropertyValue::FourByte(ba.read_u32()?),
            WireType::VarInt => PropertyValue::VarInt(VarInt::decode(ba)?.value()),
            WireType::Binary => {
                let len = ba.read_u16()? as usize;
                PropertyValue::Binary(ba.read_bytes(len)?.to_vec())
            }
            WireType::Utf8String => {
                let len = ba.read_u16()? as usize;
                PropertyValue::Utf8String(ba.read_string(len)?)
            }
            WireType::StringPair => {
                let key_len = ba.read_u16()? as usize;
                let key = ba.read_string(key_len)?;
                let value_len = ba.read_u16()? as usize;
                let value = ba.read_string(value_len)?;
                PropertyValue::StringPair(key, value)
            }
        };
        Ok(Self { id, value })
    }

    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        VarInt::new(self.id as usize)?.encode(buf)?;
        match &self.value {
            PropertyValue::Byte(b) => buf.push(*b),
            PropertyValue::TwoByte(v) => buf.extend_from_slice(&v.to_be_bytes()),
            PropertyValue::FourByte(v) => buf.extend_from_slice(&v.to_be_bytes()),
            PropertyValue::VarInt(v) => VarInt::new(*v)?.encode(buf)?,
            PropertyValue::Binary(bytes) => {
                write_len_prefixed(buf, bytes)?;
            }
            PropertyValue::Utf8String(s) => {
                write_len_prefixed(buf, s.as_bytes())?;
            }
            PropertyValue::StringPair(k, v) => {
                write_len_prefixed(buf, k.as_bytes())?;
                write_len_prefixed(buf, v.as_bytes())?;
            }
        }
        Ok(())
    }
}

fn write_len_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) -> Result<(), EncodeError> {
    let len: u16 = bytes.len().try_into().map_err(|_e| EncodeError::TooLong)?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

/// A packet's property list: a VBI total-byte-length prefix followed by that
/// many bytes of `{id, value}` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Properties(pub Vec<Property>);

impl Properties {
    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let len = VarInt::decode(ba)?.value();
        let bytes = ba.read_bytes(len)?;
        let mut inner = ByteArray::new(bytes);
        let mut properties = Vec::new();
        while inner.remaining_bytes() > 0 {
            properties.push(Property::decode(&mut inner)?);
        }
        Ok(Self(properties))
    }

    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        let mut body = Vec::new();
        for property in &self.0 {
            property.encode(&mut body)?;
        }
        VarInt::new(body.len())?.encode(buf)?;
        buf.extend_from_slice(&body);
        Ok(())
    }
}
