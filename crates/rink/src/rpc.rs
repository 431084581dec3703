//! Unary call dispatch.
//!
//! Every `Request` frame resolves to exactly one `Response` carrying
//! either a typed payload or a structured [`CallError`]. Errors are
//! scoped to the call: a failed login or a full room never tears the
//! connection down. Directory calls run without the hub lock; only the
//! room operations take it, inside the hub's own methods.

use rink_protocol::{
    AckMsg, CallError, ErrorCode, MemberList, PlayerId, ProfileMsg,
    RankEntryMsg, RankingList, RecordStored, Reply, Request, RequestCall,
    Response, RoomCreated, RoomId, SkinKind, SkinSetMsg,
};
use rink_room::RoomError;
use rink_session::{Directory, DirectoryError, MatchRecord};

use crate::hub::SessionHub;

/// Services one unary request against the hub and its directory.
pub(crate) async fn dispatch<D: Directory>(
    hub: &SessionHub<D>,
    request: Request,
) -> Response {
    let id = request.id;
    let reply = match request.call {
        Some(call) => service(hub, call).await,
        None => error(ErrorCode::Unknown, "request carried no call"),
    };
    Response {
        id,
        reply: Some(reply),
    }
}

async fn service<D: Directory>(
    hub: &SessionHub<D>,
    call: RequestCall,
) -> Reply {
    match call {
        RequestCall::CreateAccount(req) => {
            match hub
                .directory()
                .create_account(&req.name, &req.username, &req.password)
                .await
            {
                Ok(_) => Reply::Ack(AckMsg {}),
                Err(e) => directory_error(e),
            }
        }

        RequestCall::Login(req) => {
            match hub
                .directory()
                .authenticate(&req.username, &req.password)
                .await
            {
                Ok(profile) => Reply::Profile(ProfileMsg {
                    player_id: profile.player_id.0,
                    name: profile.name,
                    cash: wire_i32(profile.cash),
                    rank: wire_i32(profile.rank),
                }),
                Err(e) => directory_error(e),
            }
        }

        RequestCall::SubmitRecord(req) => {
            let Some(msg) = req.record else {
                return error(ErrorCode::Unknown, "submission carried no record");
            };
            let record = MatchRecord {
                recorded_at: msg.recorded_at,
                team_a: msg.team_a,
                team_b: msg.team_b,
                score_a: msg.score_a,
                score_b: msg.score_b,
            };
            match hub.directory().store_record(&record).await {
                Ok(record_id) => Reply::Record(RecordStored { record_id }),
                Err(e) => directory_error(e),
            }
        }

        RequestCall::FetchRanking(_) => {
            match hub.directory().fetch_ranking().await {
                Ok(entries) => Reply::Ranking(RankingList {
                    entries: entries
                        .into_iter()
                        .map(|e| RankEntryMsg {
                            player_id: e.player_id.0,
                            name: e.name,
                            score: wire_i32(e.rank),
                        })
                        .collect(),
                }),
                Err(e) => directory_error(e),
            }
        }

        RequestCall::UpdateRankAndCash(req) => {
            let player_id = PlayerId::from(req.player_id);
            match hub
                .directory()
                .update_rank_and_cash(
                    &player_id,
                    i64::from(req.rank),
                    i64::from(req.cash),
                )
                .await
            {
                Ok(_) => Reply::Ack(AckMsg {}),
                Err(e) => directory_error(e),
            }
        }

        RequestCall::AddSkin(req) => {
            let Ok(kind) = SkinKind::try_from(req.kind) else {
                return error(ErrorCode::Unknown, "unrecognized skin slot");
            };
            let player_id = PlayerId::from(req.player_id);
            match hub
                .directory()
                .upsert_skin(&player_id, kind, req.skin_id)
                .await
            {
                Ok(()) => Reply::Ack(AckMsg {}),
                Err(e) => directory_error(e),
            }
        }

        RequestCall::GetSkins(req) => {
            let player_id = PlayerId::from(req.player_id);
            match hub.directory().skins(&player_id).await {
                Ok(set) => Reply::Skins(SkinSetMsg {
                    puck: set.puck,
                    striker: set.striker,
                    table: set.table,
                }),
                Err(e) => directory_error(e),
            }
        }

        RequestCall::CreateRoom(req) => {
            let host = PlayerId::from(req.host_id);
            match hub
                .create_room(
                    host,
                    req.max_players as usize,
                    req.target_score,
                )
                .await
            {
                Ok(room_id) => Reply::Room(RoomCreated {
                    room_id: room_id.0,
                }),
                Err(e) => room_error(e),
            }
        }

        RequestCall::JoinRoom(req) => {
            let player_id = PlayerId::from(req.player_id);
            // Empty room_id is the "find me a room" form.
            let target = if req.room_id.is_empty() {
                None
            } else {
                Some(RoomId::from(req.room_id))
            };
            match hub.join_room(player_id, target).await {
                Ok(room_id) => Reply::Room(RoomCreated {
                    room_id: room_id.0,
                }),
                Err(e) => room_error(e),
            }
        }

        RequestCall::ListRoomPlayers(req) => {
            let room_id = RoomId::from(req.room_id);
            match hub.room_members(&room_id).await {
                Ok(members) => Reply::Members(MemberList {
                    player_ids: members.into_iter().map(|p| p.0).collect(),
                }),
                Err(e) => room_error(e),
            }
        }

        RequestCall::LeaveRoom(req) => {
            let player_id = PlayerId::from(req.player_id);
            let room_id = RoomId::from(req.room_id);
            match hub.leave_room(&player_id, &room_id).await {
                Ok(()) => Reply::Ack(AckMsg {}),
                Err(e) => room_error(e),
            }
        }

        RequestCall::Disconnect(req) => {
            // Full teardown; the engine closes the stream after this
            // reply is written.
            let player_id = PlayerId::from(req.player_id);
            hub.disconnect(&player_id).await;
            Reply::Ack(AckMsg {})
        }
    }
}

/// Stored totals are i64; the wire profile fields are i32. Saturate
/// instead of truncating so an out-of-range balance degrades visibly.
fn wire_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn error(code: ErrorCode, message: impl Into<String>) -> Reply {
    Reply::Error(CallError {
        code: code as i32,
        message: message.into(),
    })
}

fn directory_error(e: DirectoryError) -> Reply {
    let code = match &e {
        DirectoryError::Auth(_) => ErrorCode::Auth,
        DirectoryError::NotFound(_) => ErrorCode::NotFound,
        DirectoryError::Unavailable(_) => ErrorCode::Internal,
    };
    error(code, e.to_string())
}

fn room_error(e: RoomError) -> Reply {
    let code = match &e {
        RoomError::NotFound(_) => ErrorCode::NotFound,
        RoomError::RoomFull(_) => ErrorCode::Capacity,
        RoomError::AlreadyInRoom(..) | RoomError::NotInRoom(..) => {
            ErrorCode::Unknown
        }
    };
    error(code, e.to_string())
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use rink_protocol::{
        CreateAccountReq, CreateRoomReq, GetSkinsReq, JoinRoomReq,
        LoginReq,
    };
    use rink_session::MemoryDirectory;

    use super::*;
    use crate::hub::HubConfig;

    fn hub() -> SessionHub<MemoryDirectory> {
        SessionHub::new(HubConfig::default(), MemoryDirectory::new())
    }

    fn request(id: u64, call: RequestCall) -> Request {
        Request {
            id,
            call: Some(call),
        }
    }

    async fn create_alice(hub: &SessionHub<MemoryDirectory>) -> String {
        let resp = dispatch(
            hub,
            request(
                1,
                RequestCall::CreateAccount(CreateAccountReq {
                    name: "Alice".into(),
                    username: "alice".into(),
                    password: "pw".into(),
                }),
            ),
        )
        .await;
        assert!(matches!(resp.reply, Some(Reply::Ack(_))));

        let resp = dispatch(
            hub,
            request(
                2,
                RequestCall::Login(LoginReq {
                    username: "alice".into(),
                    password: "pw".into(),
                }),
            ),
        )
        .await;
        match resp.reply {
            Some(Reply::Profile(p)) => p.player_id,
            other => panic!("expected profile, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_echoes_request_id() {
        let hub = hub();

        let resp = dispatch(
            &hub,
            request(99, RequestCall::FetchRanking(Default::default())),
        )
        .await;

        assert_eq!(resp.id, 99);
        assert!(matches!(resp.reply, Some(Reply::Ranking(_))));
    }

    #[tokio::test]
    async fn test_dispatch_empty_request_is_structured_error() {
        let hub = hub();

        let resp = dispatch(&hub, Request { id: 5, call: None }).await;

        assert_eq!(resp.id, 5);
        assert!(matches!(resp.reply, Some(Reply::Error(_))));
    }

    #[tokio::test]
    async fn test_create_account_then_login_returns_profile() {
        let hub = hub();

        let player_id = create_alice(&hub).await;

        assert_eq!(player_id.len(), 32);
    }

    #[tokio::test]
    async fn test_login_bad_password_maps_to_auth_error() {
        let hub = hub();
        create_alice(&hub).await;

        let resp = dispatch(
            &hub,
            request(
                3,
                RequestCall::Login(LoginReq {
                    username: "alice".into(),
                    password: "wrong".into(),
                }),
            ),
        )
        .await;

        match resp.reply {
            Some(Reply::Error(err)) => {
                assert_eq!(err.code, ErrorCode::Auth as i32);
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_profile_saturates_out_of_range_totals() {
        let hub = hub();
        let player_id = create_alice(&hub).await;
        hub.directory()
            .update_rank_and_cash(
                &PlayerId::from(player_id),
                i64::MAX,
                i64::MAX,
            )
            .await
            .unwrap();

        let resp = dispatch(
            &hub,
            request(
                7,
                RequestCall::Login(LoginReq {
                    username: "alice".into(),
                    password: "pw".into(),
                }),
            ),
        )
        .await;

        match resp.reply {
            Some(Reply::Profile(p)) => {
                assert_eq!(p.cash, i32::MAX);
                assert_eq!(p.rank, i32::MAX);
            }
            other => panic!("expected profile, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_skins_unknown_player_maps_to_not_found() {
        let hub = hub();

        let resp = dispatch(
            &hub,
            request(
                4,
                RequestCall::GetSkins(GetSkinsReq {
                    player_id: "ghost".into(),
                }),
            ),
        )
        .await;

        match resp.reply {
            Some(Reply::Error(err)) => {
                assert_eq!(err.code, ErrorCode::NotFound as i32);
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_room_then_join_full_maps_to_capacity() {
        let hub = hub();

        let resp = dispatch(
            &hub,
            request(
                1,
                RequestCall::CreateRoom(CreateRoomReq {
                    host_id: "host".into(),
                    max_players: 1,
                    target_score: 5,
                }),
            ),
        )
        .await;
        let room_id = match resp.reply {
            Some(Reply::Room(r)) => r.room_id,
            other => panic!("expected room, got {other:?}"),
        };

        let resp = dispatch(
            &hub,
            request(
                2,
                RequestCall::JoinRoom(JoinRoomReq {
                    player_id: "guest".into(),
                    room_id,
                }),
            ),
        )
        .await;
        match resp.reply {
            Some(Reply::Error(err)) => {
                assert_eq!(err.code, ErrorCode::Capacity as i32);
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_join_room_empty_id_matchmakes_into_fresh_room() {
        let hub = hub();

        let resp = dispatch(
            &hub,
            request(
                1,
                RequestCall::JoinRoom(JoinRoomReq {
                    player_id: "p1".into(),
                    room_id: String::new(),
                }),
            ),
        )
        .await;

        let room_id = match resp.reply {
            Some(Reply::Room(r)) => r.room_id,
            other => panic!("expected room, got {other:?}"),
        };
        assert_eq!(room_id.len(), 32);
        let members = hub
            .room_members(&RoomId::from(room_id))
            .await
            .unwrap();
        assert_eq!(members, vec![PlayerId::from("p1")]);
    }
}
