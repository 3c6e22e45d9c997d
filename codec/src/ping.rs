// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! PINGREQ and PINGRESP carry no variable header and no payload; the fixed
//! header alone is the entire packet.

use crate::{ByteArray, DecodeError, EncodeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PingRequestPacket;

impl PingRequestPacket {
    pub fn decode_body(_ba: &mut ByteArray, _remaining_length: usize) -> Result<Self, DecodeError> {
        Ok(Self)
    }

    pub fn encode_body(&self, _buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PingResponsePacket;

impl PingResponsePacket {
    pub fn decode_body(_ba: &mut ByteArray, _remaining_length: usize) -> Result<Self, DecodeError> {
        Ok(Self)
    }

    pub fn encode_body(&self, _buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_encode_to_nothing() {
        let mut buf = Vec::new();
        PingRequestPacket.encode_body(&mut buf).unwrap();
        PingResponsePacket.encode_body(&mut buf).unwrap();
        assert!(buf.is_empty());
    }
}
