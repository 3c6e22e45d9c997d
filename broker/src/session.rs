// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! Per-connection session state machine: the CONNECT handshake, then a
//! dispatch loop over SUBSCRIBE / UNSUBSCRIBE / PUBLISH / PINGREQ /
//! DISCONNECT, with an independent outbox-drain task serializing replies
//! and fanned-out PUBLISHes back to the socket in FIFO order.

use std::sync::Arc;

use codec::{
    make_connack, make_pingresp, make_suback, make_unsuback, ByteArray, Packet, PacketType,
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::error::{Error, ErrorKind};
use crate::registry::{Registry, SessionId};

/// Bound on a session's outbox. Chosen generously enough that an idle
/// consumer doesn't start dropping fan-out traffic under ordinary load;
/// once full, `Registry::deliver` drops that one message rather than
/// blocking the publisher (see the registry's doc comment).
const OUTBOX_CAPACITY: usize = 64;

pub async fn run_session<S>(id: SessionId, registry: Arc<Registry>, socket: S)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut read_half, write_half) = tokio::io::split(socket);
    let (tx, rx) = mpsc::channel(OUTBOX_CAPACITY);
    registry.register(id, tx.clone());

    let writer = tokio::spawn(drain_outbox(id, write_half, rx));

    let outcome = dispatch(id, &registry, &mut read_half, tx.clone()).await;
    // Registry cleanup must happen before the outbox is dropped, so that
    // no further delivery can be enqueued once the socket side is gone.
    registry.purge(id);
    drop(tx);

    match outcome {
        Ok(()) => log::info!("session {id}: terminated cleanly"),
        Err(err) if *err.kind() == ErrorKind::ConnectionClosed => {
            log::info!("session {id}: peer closed the connection");
        }
        Err(err) => log::warn!("session {id}: terminated: {err}"),
    }

    if let Err(err) = writer.await {
        log::warn!("session {id}: outbox-drain task panicked: {err}");
    }
}

async fn dispatch<R>(
    id: SessionId,
    registry: &Registry,
    reader: &mut R,
    tx: mpsc::Sender<Packet>,
) -> Result<(), Error>
where
    R: AsyncRead + Unpin,
{
    match read_packet(reader).await? {
        Packet::Connect(_) => {
            log::debug!("session {id}: CONNECT accepted");
            enqueue(&tx, id, make_connack());
        }
        other => {
            return Err(Error::protocol_error(format!(
                "first packet must be CONNECT, got {:?}",
                other.packet_type()
            )));
        }
    }

    loop {
        match read_packet(reader).await? {
            Packet::Subscribe(packet) => {
                if packet.topics.is_empty() {
                    return Err(Error::protocol_error("SUBSCRIBE with zero topics"));
                }
                for entry in &packet.topics {
                    registry.subscribe(id, entry.topic.clone());
                }
                log::debug!("session {id}: subscribed to {} topic(s)", packet.topics.len());
                enqueue(&tx, id, make_suback(&packet));
            }
            Packet::Unsubscribe(packet) => {
                if packet.topics.is_empty() {
                    return Err(Error::protocol_error("UNSUBSCRIBE with zero topics"));
                }
                for topic in &packet.topics {
                    registry.unsubscribe(id, topic);
                }
                log::debug!("session {id}: unsubscribed from {} topic(s)", packet.topics.len());
                enqueue(&tx, id, make_unsuback(&packet));
            }
            Packet::Publish(packet) => {
                log::trace!("session {id}: publish to {:?}", packet.topic_name);
                registry.deliver(&packet.topic_name, &packet.payload);
            }
            Packet::PingRequest(_) => {
                enqueue(&tx, id, make_pingresp());
            }
            Packet::Disconnect(_) => {
                log::debug!("session {id}: DISCONNECT received");
                return Ok(());
            }
            other => {
                log::warn!("session {id}: ignoring unhandled packet type {:?}", other.packet_type());
            }
        }
    }
}

/// Enqueues a packet this session originated itself (CONNACK, SUBACK,
/// UNSUBACK, PINGRESP). Uses the same non-blocking, drop-on-full policy as
/// `Registry::deliver` so a slow socket writer never blocks the dispatch
/// loop reading from the same connection.
fn enqueue(tx: &mpsc::Sender<Packet>, id: SessionId, packet: Packet) {
    if tx.try_send(packet).is_err() {
        log::warn!("session {id}: outbox full, dropping an outbound reply");
    }
}

async fn drain_outbox<W>(id: SessionId, mut write_half: W, mut rx: mpsc::Receiver<Packet>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(packet) = rx.recv().await {
        let bytes = match packet.encode() {
            Ok(bytes) => bytes,
            Err(err) => {
                log::error!("session {id}: failed to encode outbound packet: {err}");
                continue;
            }
        };
        // The whole frame is written in a single call: no packet is ever
        // partially written to the socket.
        if let Err(err) = write_half.write_all(&bytes).await {
            log::warn!("session {id}: write failed, closing: {err}");
            break;
        }
    }
}

/// Reads one full packet off `reader`. Only the fixed header's first byte
/// and the `remaining_length` Variable Byte Integer are read directly off
/// the live connection; once `remaining_length` is known, the rest of the
/// packet is buffered in one `read_exact` and handed to the synchronous
/// codec.
async fn read_packet<R>(reader: &mut R) -> Result<Packet, Error>
where
    R: AsyncRead + Unpin,
{
    let first_byte = reader.read_u8().await.map_err(eof_as_closed)?;
    let packet_type = PacketType::try_from(first_byte)?;
    let remaining_length = read_vbi(reader).await?;
    let mut body = vec![0u8; remaining_length];
    reader.read_exact(&mut body).await.map_err(eof_as_closed)?;
    let mut ba = ByteArray::new(&body);
    Packet::decode_body(packet_type, &mut ba, remaining_length).map_err(Error::from)
}

async fn read_vbi<R>(reader: &mut R) -> Result<usize, Error>
where
    R: AsyncRead + Unpin,
{
    let mut multiplier: usize = 1;
    let mut value: usize = 0;
    loop {
        let byte = reader.read_u8().await.map_err(eof_as_closed)?;
        value += usize::from(byte & 0x7f) * multiplier;
        if byte & 0x80 == 0 {
            break;
        }
        multiplier *= 128;
        if multiplier > 128 * 128 * 128 {
            return Err(Error::new(
                ErrorKind::MalformedPacket,
                "variable byte integer used a 5th continuation byte",
            ));
        }
    }
    Ok(value)
}

/// A read that fails mid-packet (as opposed to cleanly between packets,
/// which `read_packet`'s caller only ever sees as the first byte read
/// failing with EOF) is still just a closed connection from the session's
/// point of view; `Error::from(io::Error)` already makes that distinction
/// for a clean EOF, this only exists so call sites read naturally.
fn eof_as_closed(err: std::io::Error) -> Error {
    Error::from(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec::{Packet as CodecPacket, PublishPacket};
    use tokio::io::duplex;

    #[tokio::test]
    async fn rejects_non_connect_first_packet() {
        let (client, server) = duplex(4096);
        let registry = Arc::new(Registry::new());
        let session = tokio::spawn(run_session(1, registry, server));

        // CONNACK sent by a client as the very first packet.
        let (mut client_read, mut client_write) = tokio::io::split(client);
        let bad_first_packet = CodecPacket::ConnectAck(codec::ConnectAckPacket::new_success());
        client_write.write_all(&bad_first_packet.encode().unwrap()).await.unwrap();

        session.await.unwrap();

        // The server must have closed the connection without replying.
        let mut buf = [0u8; 1];
        let n = client_read.read(&mut buf).await.unwrap();
        assert_eq!(n, 0, "server must not reply to a malformed first packet");
    }

    #[tokio::test]
    async fn publish_is_not_delivered_to_the_publisher_itself() {
        let registry = Arc::new(Registry::new());
        let (client, server) = duplex(4096);
        tokio::spawn(run_session(1, Arc::clone(&registry), server));

        let (mut read_half, mut write_half) = tokio::io::split(client);

        let connect = CodecPacket::Connect(codec::ConnectPacket {
            protocol_name: "MQTT".to_owned(),
            protocol_level: 5,
            connect_flags: 0x02,
            keep_alive: 60,
            properties: codec::Properties::empty(),
        });
        write_half.write_all(&connect.encode().unwrap()).await.unwrap();
        read_exact_packet(&mut read_half).await; // CONNACK

        let publish = CodecPacket::Publish(PublishPacket::new("/a".to_owned(), b"hi".to_vec()));
        write_half.write_all(&publish.encode().unwrap()).await.unwrap();

        // Nothing else should arrive; shut the write half so a read past
        // this point observes EOF rather than hanging forever.
        drop(write_half);
        let mut buf = [0u8; 1];
        let n = read_half.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);
    }

    async fn read_exact_packet<R: AsyncRead + Unpin>(reader: &mut R) -> Packet {
        read_packet(reader).await.unwrap()
    }
}
