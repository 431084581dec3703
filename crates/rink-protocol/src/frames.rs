//! Top-level wire frames: the streaming envelope and the unary calls.
//!
//! One WebSocket connection carries two kinds of traffic, multiplexed
//! by the [`ClientFrame`]/[`ServerFrame`] oneofs:
//!
//! - `Game` — a [`GameMessage`](crate::GameMessage) on the long-lived
//!   bidirectional stream.
//! - `Request`/`Response` — unary calls (account, record, skin, and
//!   room management). Every request carries a client-chosen `id` that
//!   the matching response echoes, so calls can be issued while the
//!   stream is active.
//!
//! Each unary call either succeeds with a typed payload or fails with a
//! structured [`CallError`]; errors are scoped to the call, never to
//! the connection.

use crate::types::GameMessage;

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Every message a client sends is one of these.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ClientFrame {
    #[prost(oneof = "client_frame::Kind", tags = "1, 2")]
    pub kind: Option<client_frame::Kind>,
}

pub mod client_frame {
    use super::*;

    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        /// A message on the game stream.
        #[prost(message, tag = "1")]
        Game(GameMessage),
        /// A unary call.
        #[prost(message, tag = "2")]
        Request(Request),
    }
}

impl ClientFrame {
    pub fn game(msg: GameMessage) -> Self {
        Self {
            kind: Some(client_frame::Kind::Game(msg)),
        }
    }

    pub fn request(id: u64, call: RequestCall) -> Self {
        Self {
            kind: Some(client_frame::Kind::Request(Request {
                id,
                call: Some(call),
            })),
        }
    }
}

/// A unary call envelope. `id` is echoed on the response.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Request {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(oneof = "RequestCall", tags = "2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13")]
    pub call: Option<RequestCall>,
}

/// The unary methods, one variant per call.
#[derive(Clone, PartialEq, prost::Oneof)]
pub enum RequestCall {
    #[prost(message, tag = "2")]
    CreateAccount(CreateAccountReq),
    #[prost(message, tag = "3")]
    Login(LoginReq),
    #[prost(message, tag = "4")]
    SubmitRecord(SubmitRecordReq),
    #[prost(message, tag = "5")]
    FetchRanking(FetchRankingReq),
    #[prost(message, tag = "6")]
    UpdateRankAndCash(UpdateRankAndCashReq),
    #[prost(message, tag = "7")]
    AddSkin(AddSkinReq),
    #[prost(message, tag = "8")]
    GetSkins(GetSkinsReq),
    #[prost(message, tag = "9")]
    CreateRoom(CreateRoomReq),
    #[prost(message, tag = "10")]
    JoinRoom(JoinRoomReq),
    #[prost(message, tag = "11")]
    ListRoomPlayers(ListRoomPlayersReq),
    #[prost(message, tag = "12")]
    Disconnect(DisconnectReq),
    #[prost(message, tag = "13")]
    LeaveRoom(LeaveRoomReq),
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CreateAccountReq {
    /// Display name shown to other players.
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub username: String,
    #[prost(string, tag = "3")]
    pub password: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct LoginReq {
    #[prost(string, tag = "1")]
    pub username: String,
    #[prost(string, tag = "2")]
    pub password: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SubmitRecordReq {
    #[prost(message, optional, tag = "1")]
    pub record: Option<MatchRecordMsg>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct FetchRankingReq {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UpdateRankAndCashReq {
    #[prost(string, tag = "1")]
    pub player_id: String,
    #[prost(int32, tag = "2")]
    pub cash: i32,
    #[prost(int32, tag = "3")]
    pub rank: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct AddSkinReq {
    #[prost(string, tag = "1")]
    pub player_id: String,
    #[prost(enumeration = "crate::SkinKind", tag = "2")]
    pub kind: i32,
    #[prost(uint32, tag = "3")]
    pub skin_id: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetSkinsReq {
    #[prost(string, tag = "1")]
    pub player_id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CreateRoomReq {
    #[prost(string, tag = "1")]
    pub host_id: String,
    #[prost(uint32, tag = "2")]
    pub max_players: u32,
    #[prost(uint32, tag = "3")]
    pub target_score: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct JoinRoomReq {
    #[prost(string, tag = "1")]
    pub player_id: String,
    /// Empty string means "find me a room" (first fit, else a fresh
    /// room is created with the joiner as host).
    #[prost(string, tag = "2")]
    pub room_id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ListRoomPlayersReq {
    #[prost(string, tag = "1")]
    pub room_id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DisconnectReq {
    #[prost(string, tag = "1")]
    pub player_id: String,
    /// The room to leave on the way out, empty if not in one.
    #[prost(string, tag = "2")]
    pub room_id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct LeaveRoomReq {
    #[prost(string, tag = "1")]
    pub player_id: String,
    #[prost(string, tag = "2")]
    pub room_id: String,
}

/// A finished match, as submitted by the host.
#[derive(Clone, PartialEq, prost::Message)]
pub struct MatchRecordMsg {
    /// Millisecond UNIX timestamp of match end.
    #[prost(uint64, tag = "1")]
    pub recorded_at: u64,
    #[prost(string, repeated, tag = "2")]
    pub team_a: Vec<String>,
    #[prost(string, repeated, tag = "3")]
    pub team_b: Vec<String>,
    #[prost(uint32, tag = "4")]
    pub score_a: u32,
    #[prost(uint32, tag = "5")]
    pub score_b: u32,
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Every message the server sends is one of these.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ServerFrame {
    #[prost(oneof = "server_frame::Kind", tags = "1, 2")]
    pub kind: Option<server_frame::Kind>,
}

pub mod server_frame {
    use super::*;

    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        /// A message on the game stream (drained from the player's
        /// mailbox).
        #[prost(message, tag = "1")]
        Game(GameMessage),
        /// The reply to a unary call.
        #[prost(message, tag = "2")]
        Response(Response),
    }
}

impl ServerFrame {
    pub fn game(msg: GameMessage) -> Self {
        Self {
            kind: Some(server_frame::Kind::Game(msg)),
        }
    }

    pub fn response(id: u64, reply: Reply) -> Self {
        Self {
            kind: Some(server_frame::Kind::Response(Response {
                id,
                reply: Some(reply),
            })),
        }
    }
}

/// A unary reply envelope. `id` matches the request.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Response {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(oneof = "Reply", tags = "2, 3, 4, 5, 6, 7, 8, 9")]
    pub reply: Option<Reply>,
}

/// Success payloads and the structured error, one variant per shape.
#[derive(Clone, PartialEq, prost::Oneof)]
pub enum Reply {
    /// Plain acknowledgement for calls with no payload.
    #[prost(message, tag = "2")]
    Ack(AckMsg),
    #[prost(message, tag = "3")]
    Profile(ProfileMsg),
    #[prost(message, tag = "4")]
    Room(RoomCreated),
    #[prost(message, tag = "5")]
    Record(RecordStored),
    #[prost(message, tag = "6")]
    Ranking(RankingList),
    #[prost(message, tag = "7")]
    Skins(SkinSetMsg),
    #[prost(message, tag = "8")]
    Members(MemberList),
    #[prost(message, tag = "9")]
    Error(CallError),
}

/// Empty acknowledgement payload.
#[derive(Clone, PartialEq, prost::Message)]
pub struct AckMsg {}

/// Login success payload.
#[derive(Clone, PartialEq, prost::Message)]
pub struct ProfileMsg {
    #[prost(string, tag = "1")]
    pub player_id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(int32, tag = "3")]
    pub cash: i32,
    #[prost(int32, tag = "4")]
    pub rank: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct RoomCreated {
    #[prost(string, tag = "1")]
    pub room_id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct RecordStored {
    #[prost(string, tag = "1")]
    pub record_id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct RankEntryMsg {
    #[prost(string, tag = "1")]
    pub player_id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(int32, tag = "3")]
    pub score: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct RankingList {
    #[prost(message, repeated, tag = "1")]
    pub entries: Vec<RankEntryMsg>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SkinSetMsg {
    #[prost(uint32, repeated, tag = "1")]
    pub puck: Vec<u32>,
    #[prost(uint32, repeated, tag = "2")]
    pub striker: Vec<u32>,
    #[prost(uint32, repeated, tag = "3")]
    pub table: Vec<u32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct MemberList {
    #[prost(string, repeated, tag = "1")]
    pub player_ids: Vec<String>,
}

/// Machine-readable error category for a failed call.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    prost::Enumeration,
)]
#[repr(i32)]
pub enum ErrorCode {
    Unknown = 0,
    /// Unknown player or room ID.
    NotFound = 1,
    /// Room full.
    Capacity = 2,
    /// Bad credentials or duplicate registration.
    Auth = 3,
    /// Stream read/write failure.
    Transport = 4,
    /// Anything the server can't attribute to the caller.
    Internal = 5,
}

/// The structured error returned by a failed unary call.
#[derive(Clone, PartialEq, prost::Message)]
pub struct CallError {
    #[prost(enumeration = "ErrorCode", tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub message: String,
}

// =========================================================================
// Tests
// =========================================================================
