//! Per-connection stream engine.
//!
//! Each accepted connection gets its own Tokio task running
//! [`run_connection`]. The connection moves through three phases:
//!
//! 1. **Awaiting** — unary `Request` frames are serviced in place; the
//!    first `Game` frame names the sender, registers them, and
//!    activates the stream.
//! 2. **Active** — a spawned reader task owns the read half and feeds
//!    decoded frames into a queue; the dispatch loop selects fairly
//!    over that queue and the player's mailbox, routing inbound game
//!    frames, servicing requests, and writing drained mailbox messages
//!    to the send half.
//! 3. **Terminating** — entered on end-of-stream, a transport error,
//!    idle timeout, a closed mailbox (the session was replaced by a
//!    reconnect), or an explicit `Disconnect` request. Cleanup removes
//!    the player from their room and registry; a drop guard makes that
//!    hold even if the task panics.
//!
//! An idle timeout expiring is not an error; it is treated exactly
//! like the peer closing the stream.

use std::sync::Arc;

use rink_protocol::{
    ClientFrame, Codec, GameMessage, PlayerId, ProstCodec, Reply,
    Request, RequestCall, Response, ServerFrame, client_frame,
    server_frame,
};
use rink_session::{Directory, Mailbox};
use rink_transport::{
    Connection, ConnectionId, MessageSink, MessageSource,
};
use tokio::sync::mpsc;

use crate::RinkError;
use crate::hub::SessionHub;
use crate::rpc;

/// Inbound queue depth between the reader task and the dispatch loop.
const INBOUND_QUEUE: usize = 64;

/// Drop guard that tears down this connection's session when the
/// handler exits, panics included. `Drop` is synchronous, so the async
/// cleanup runs in a fire-and-forget task. Holding the mailbox lets
/// the hub tell this connection's session apart from a replacement
/// registered by a reconnect.
struct SessionGuard<D: Directory> {
    player_id: PlayerId,
    mailbox: Arc<Mailbox>,
    hub: Arc<SessionHub<D>>,
}

impl<D: Directory> Drop for SessionGuard<D> {
    fn drop(&mut self) {
        let player_id = self.player_id.clone();
        let mailbox = Arc::clone(&self.mailbox);
        let hub = Arc::clone(&self.hub);
        tokio::spawn(async move {
            hub.disconnect_session(&player_id, &mailbox).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn run_connection<D, C>(
    conn: C,
    hub: Arc<SessionHub<D>>,
) -> Result<(), RinkError>
where
    D: Directory,
    C: Connection,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");
    let (mut sink, mut source) = conn.into_split();

    // --- Phase 1: awaiting activation ---
    let activated =
        await_activation(&mut sink, &mut source, &hub, conn_id).await?;
    let Some((player_id, mailbox, first_msg)) = activated else {
        // Stream ended (or was explicitly disconnected) before any
        // game frame arrived. Nothing was registered, nothing to undo.
        let _ = sink.close().await;
        return Ok(());
    };

    tracing::info!(%conn_id, %player_id, "stream activated");
    let _guard = SessionGuard {
        player_id: player_id.clone(),
        mailbox: Arc::clone(&mailbox),
        hub: Arc::clone(&hub),
    };

    // The activating frame routes like any other.
    hub.route(first_msg).await;

    // --- Phase 2: active ---
    // The reader task owns the read half from here on; the dispatch
    // loop keeps the write half, so the two directions never wait on
    // each other.
    let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_QUEUE);
    let reader = tokio::spawn(read_inbound(source, inbound_tx, conn_id));

    dispatch_loop(&mut sink, &hub, &player_id, &mailbox, inbound_rx)
        .await;

    // --- Phase 3: terminating ---
    // _guard drops at the end of this function and deregisters the
    // session; closing the socket makes the reader's recv() fail so it
    // exits, but abort anyway in case it is parked on a quiet peer.
    let _ = sink.close().await;
    reader.abort();
    tracing::info!(%conn_id, %player_id, "connection closed");
    Ok(())
}

/// Phase 1: services unary requests until the first game frame names
/// the connection's player. Returns `None` if the stream ended first.
async fn await_activation<D, Sink, Source>(
    sink: &mut Sink,
    source: &mut Source,
    hub: &Arc<SessionHub<D>>,
    conn_id: ConnectionId,
) -> Result<Option<(PlayerId, Arc<Mailbox>, GameMessage)>, RinkError>
where
    D: Directory,
    Sink: MessageSink,
    Source: MessageSource,
{
    let codec = ProstCodec;
    let idle = hub.config().idle_timeout;
    // Login and account creation replies carry the player's display
    // name; remember the latest one so activation can register it
    // instead of falling back to the raw sender id.
    let mut profile_name: Option<(PlayerId, String)> = None;

    loop {
        let data = match tokio::time::timeout(idle, source.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::debug!(%conn_id, "closed before activation");
                return Ok(None);
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                tracing::info!(%conn_id, "idle before activation");
                return Ok(None);
            }
        };

        let frame: ClientFrame = match codec.decode(&data) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "undecodable frame");
                continue;
            }
        };

        match frame.kind {
            Some(client_frame::Kind::Request(req)) => {
                let closing = is_disconnect(&req);
                let response = rpc::dispatch(hub, req).await;
                if let Some(Reply::Profile(p)) = &response.reply {
                    profile_name = Some((
                        PlayerId::from(p.player_id.as_str()),
                        p.name.clone(),
                    ));
                }
                sink.send(&codec.encode(&response_frame(response)))
                    .await
                    .map_err(RinkError::from)?;
                if closing {
                    return Ok(None);
                }
            }
            Some(client_frame::Kind::Game(msg)) => {
                if msg.sender.is_empty() {
                    tracing::warn!(
                        %conn_id,
                        "game frame without a sender, ignoring"
                    );
                    continue;
                }
                let player_id = PlayerId::from(msg.sender.as_str());
                let name = match &profile_name {
                    Some((id, name)) if *id == player_id => name.clone(),
                    _ => msg.sender.clone(),
                };
                let mailbox =
                    hub.register_player(player_id.clone(), name).await;
                return Ok(Some((player_id, mailbox, msg)));
            }
            None => {
                tracing::debug!(%conn_id, "empty frame, ignoring");
            }
        }
    }
}

/// Reader task: owns the read half, decodes frames, feeds the queue.
/// Exits on EOF, transport error, or the dispatch loop going away.
async fn read_inbound<Source: MessageSource>(
    mut source: Source,
    inbound_tx: mpsc::Sender<ClientFrame>,
    conn_id: ConnectionId,
) {
    let codec = ProstCodec;
    loop {
        match source.recv().await {
            Ok(Some(data)) => match codec.decode::<ClientFrame>(&data) {
                Ok(frame) => {
                    if inbound_tx.send(frame).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        %conn_id, error = %e, "undecodable frame"
                    );
                }
            },
            Ok(None) => {
                tracing::debug!(%conn_id, "peer closed the stream");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "read error");
                break;
            }
        }
    }
    // Dropping inbound_tx closes the queue; the dispatch loop sees
    // `None` and terminates.
}

/// One iteration's worth of work in the dispatch loop.
enum Event {
    Inbound(Option<ClientFrame>),
    Outbound(Option<GameMessage>),
}

/// Phase 2: selects fairly over the inbound queue and the player's
/// mailbox until something ends the stream.
async fn dispatch_loop<D, Sink>(
    sink: &mut Sink,
    hub: &Arc<SessionHub<D>>,
    player_id: &PlayerId,
    mailbox: &Arc<Mailbox>,
    mut inbound_rx: mpsc::Receiver<ClientFrame>,
) where
    D: Directory,
    Sink: MessageSink,
{
    let codec = ProstCodec;
    let idle = hub.config().idle_timeout;

    loop {
        // Both recv()s are cancellation-safe, so losing the select (or
        // the timeout firing mid-poll) never loses a message.
        let event = tokio::time::timeout(idle, async {
            tokio::select! {
                frame = inbound_rx.recv() => Event::Inbound(frame),
                msg = mailbox.recv() => Event::Outbound(msg),
            }
        })
        .await;

        match event {
            Err(_) => {
                tracing::info!(%player_id, "idle timeout, ending stream");
                break;
            }
            Ok(Event::Inbound(None)) => {
                // Reader task exited: clean EOF or transport error,
                // already logged there.
                break;
            }
            Ok(Event::Inbound(Some(frame))) => match frame.kind {
                Some(client_frame::Kind::Game(msg)) => {
                    hub.route(msg).await;
                }
                Some(client_frame::Kind::Request(req)) => {
                    let closing = is_disconnect(&req);
                    let response = rpc::dispatch(hub, req).await;
                    let bytes = codec.encode(&response_frame(response));
                    if let Err(e) = sink.send(&bytes).await {
                        tracing::debug!(%player_id, error = %e, "write failed");
                        break;
                    }
                    if closing {
                        tracing::info!(%player_id, "client disconnected");
                        break;
                    }
                }
                None => {
                    tracing::debug!(%player_id, "empty frame, ignoring");
                }
            },
            Ok(Event::Outbound(None)) => {
                tracing::info!(
                    %player_id,
                    "mailbox closed, session replaced or removed"
                );
                break;
            }
            Ok(Event::Outbound(Some(msg))) => {
                let bytes = codec.encode(&ServerFrame::game(msg));
                if let Err(e) = sink.send(&bytes).await {
                    tracing::debug!(%player_id, error = %e, "write failed");
                    break;
                }
            }
        }
    }
}

fn is_disconnect(req: &Request) -> bool {
    matches!(req.call, Some(RequestCall::Disconnect(_)))
}

fn response_frame(response: Response) -> ServerFrame {
    ServerFrame {
        kind: Some(server_frame::Kind::Response(response)),
    }
}
