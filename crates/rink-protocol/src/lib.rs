//! Wire protocol for Rink.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`GameMessage`], [`ClientFrame`], [`ServerFrame`], …) —
//!   the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`ProstCodec`]) — how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during decoding.
//!
//! # Wire format
//!
//! Messages are hand-written `prost` structs with explicit field tags,
//! so the schema is versioned by field number: new optional fields can
//! be added under fresh tags without breaking older clients, exactly
//! like a `.proto` file would allow.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the session
//! engine (player context). It doesn't know about connections, rooms, or
//! registries — it only knows how to encode and decode frames.
//!
//! ```text
//! Transport (bytes) → Protocol (frames) → Engine (player context)
//! ```

mod codec;
mod error;
mod frames;
mod types;

pub use codec::{Codec, ProstCodec};
pub use error::ProtocolError;
pub use frames::{
    AckMsg, AddSkinReq, CallError, ClientFrame, CreateAccountReq, CreateRoomReq,
    DisconnectReq, ErrorCode, FetchRankingReq, GetSkinsReq, JoinRoomReq,
    LeaveRoomReq, ListRoomPlayersReq, LoginReq, MatchRecordMsg,
    MemberList, ProfileMsg, RankEntryMsg, RankingList, RecordStored,
    Reply, Request, RequestCall, Response, RoomCreated, ServerFrame,
    SkinSetMsg, SubmitRecordReq, UpdateRankAndCashReq, client_frame,
    server_frame,
};
pub use types::{
    Action, EntityState, GameMessage, GameState, Handshake, MatchPhase,
    PlayerId, PlayerInput, RoomId, SkinKind,
};
