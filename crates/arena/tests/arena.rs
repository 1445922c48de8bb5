//! Integration tests for the in-process front door: connect, frames, leave.

use arena::prelude::*;
use serde_json::{Value, json};

// =========================================================================
// Test authenticator
// =========================================================================

/// Admits only clients presenting "letmein".
struct Password;

impl Authenticator for Password {
    async fn authenticate(&self, token: Option<&str>) -> Result<(), SessionError> {
        match token {
            Some("letmein") => Ok(()),
            _ => Err(SessionError::AuthFailed("wrong password".into())),
        }
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn arena() -> Arena<AcceptAll, JsonCodec> {
    Arena::builder().build(AcceptAll)
}

fn opts(hp: u32) -> JoinOptions {
    JoinOptions::new(hp, 5.0)
}

async fn next_json<A: Authenticator, C: Codec>(conn: &mut ClientConnection<A, C>) -> Value {
    let frame = conn
        .next_frame()
        .await
        .expect("frame should encode")
        .expect("room should still be running");
    serde_json::from_slice(&frame).expect("frame should be JSON")
}

/// Connects and discards the hello + state frames.
async fn joined(
    arena: &Arena<AcceptAll, JsonCodec>,
    room: RoomId,
    hp: u32,
) -> ClientConnection<AcceptAll, JsonCodec> {
    let mut conn = arena.connect(room, None, opts(hp)).await.unwrap();
    conn.recv().await.unwrap();
    conn.recv().await.unwrap();
    conn
}

/// Sends 200 numbered shots tagged with `tag`.
async fn volley(conn: &ClientConnection<AcceptAll, JsonCodec>, tag: &str) {
    for i in 0..200 {
        conn.send(ClientMessage::Shoot(json!({"tag": tag, "n": i})))
            .await
            .unwrap();
    }
}

// =========================================================================
// connect()
// =========================================================================

#[tokio::test]
async fn test_connect_receives_hello_then_state_frames() {
    let arena = arena();
    let room = arena.create_room(RoomConfig::default()).await;

    let mut conn = arena.connect(room, None, opts(10)).await.unwrap();

    assert_eq!(next_json(&mut conn).await, json!({"type": "hello", "data": "world"}));
    let state = next_json(&mut conn).await;
    assert_eq!(state["type"], "state");
    let me = &state["data"]["players"][conn.session_id().as_str()];
    assert_eq!(me["current_hp"], 10);
    assert_eq!(me["loss_count"], 0);
    assert_eq!(me["position"], json!({"x": -20.0, "y": 0.0, "z": -20.0}));
}

#[tokio::test]
async fn test_connect_issues_distinct_session_ids() {
    let arena = arena();
    let room = arena.create_room(RoomConfig::default()).await;

    let a = joined(&arena, room, 10).await;
    let b = joined(&arena, room, 10).await;

    assert_ne!(a.session_id(), b.session_id());
    assert_eq!(a.session_id().as_str().len(), 9);
    assert_eq!(arena.session_count().await, 2);
}

#[tokio::test]
async fn test_connect_with_custom_session_id_length() {
    let arena = Arena::builder()
        .session_config(SessionConfig { id_length: 4 })
        .build(AcceptAll);
    let room = arena.create_room(RoomConfig::default()).await;

    let conn = arena.connect(room, None, opts(10)).await.unwrap();

    assert_eq!(conn.session_id().as_str().len(), 4);
}

#[tokio::test]
async fn test_connect_rejected_by_authenticator() {
    let arena = Arena::builder().build(Password);
    let room = arena.create_room(RoomConfig::default()).await;

    let result = arena.connect(room, Some("guess"), opts(10)).await;

    assert!(matches!(
        result,
        Err(ArenaError::Session(SessionError::AuthFailed(_)))
    ));
    assert_eq!(arena.session_count().await, 0);
    assert!(arena.connect(room, Some("letmein"), opts(10)).await.is_ok());
}

#[tokio::test]
async fn test_connect_to_full_room_closes_session() {
    let arena = arena();
    let room = arena
        .create_room(RoomConfig {
            max_clients: 1,
            ..RoomConfig::default()
        })
        .await;
    let _first = joined(&arena, room, 10).await;

    let result = arena.connect(room, None, opts(10)).await;

    assert!(matches!(result, Err(ArenaError::Room(RoomError::RoomFull(_)))));
    assert_eq!(arena.session_count().await, 1);
}

#[tokio::test]
async fn test_connect_to_missing_room_fails() {
    let arena = arena();
    let result = arena.connect(RoomId(424_242), None, opts(10)).await;
    assert!(matches!(result, Err(ArenaError::Room(RoomError::NotFound(_)))));
}

// =========================================================================
// deliver() / send()
// =========================================================================

#[tokio::test]
async fn test_deliver_shoot_frame_reaches_other_client() {
    let arena = arena();
    let room = arena.create_room(RoomConfig::default()).await;
    let shooter = joined(&arena, room, 10).await;
    let mut other = joined(&arena, room, 10).await;

    shooter
        .deliver(br#"{"type":"shoot","data":[9,8,7]}"#)
        .await
        .unwrap();

    assert_eq!(next_json(&mut other).await, json!({"type": "Shoot", "data": [9, 8, 7]}));
}

#[tokio::test]
async fn test_deliver_object_shoot_frame_is_relayed_unchanged() {
    let arena = arena();
    let room = arena.create_room(RoomConfig::default()).await;
    let shooter = joined(&arena, room, 10).await;
    let mut other = joined(&arena, room, 10).await;
    let mut third = joined(&arena, room, 10).await;
    let payload = json!({"x": 1.5, "dir": "n", "origin": {"y": 0.25}, "tags": ["rail"]});

    shooter
        .deliver(json!({"type": "shoot", "data": payload}).to_string().as_bytes())
        .await
        .unwrap();

    let expected = json!({"type": "Shoot", "data": payload});
    assert_eq!(next_json(&mut other).await, expected);
    assert_eq!(next_json(&mut third).await, expected);
}

#[tokio::test]
async fn test_deliver_string_shoot_frame_is_relayed() {
    let arena = arena();
    let room = arena.create_room(RoomConfig::default()).await;
    let shooter = joined(&arena, room, 10).await;
    let mut other = joined(&arena, room, 10).await;

    shooter
        .deliver(br#"{"type":"shoot","data":"pew"}"#)
        .await
        .unwrap();

    assert_eq!(next_json(&mut other).await, json!({"type": "Shoot", "data": "pew"}));
}

#[tokio::test]
async fn test_deliver_move_frame_updates_snapshot() {
    let arena = arena();
    let room = arena.create_room(RoomConfig::default()).await;
    let conn = joined(&arena, room, 10).await;
    let frame = json!({
        "type": "move",
        "data": {
            "position": {"x": 4.0, "y": 1.0, "z": -2.0},
            "velocity": {"x": 0.5, "y": 0.0, "z": 0.0},
            "rotation": {"x": 0.0, "y": 1.5}
        }
    });

    conn.deliver(frame.to_string().as_bytes()).await.unwrap();

    let snapshot = arena.snapshot(room).await.unwrap();
    let player = &snapshot.players[conn.session_id()];
    assert_eq!(player.position, Vec3::new(4.0, 1.0, -2.0));
    assert_eq!(player.rotation, Rotation { x: 0.0, y: 1.5 });
}

#[tokio::test]
async fn test_deliver_lethal_damage_sends_restart_to_target() {
    let arena = arena();
    let room = arena.create_room(RoomConfig::default()).await;
    let mut victim = joined(&arena, room, 10).await;
    let attacker = joined(&arena, room, 10).await;
    let frame = json!({
        "type": "damage",
        "data": {"target": victim.session_id().as_str(), "amount": 12}
    });

    attacker.deliver(frame.to_string().as_bytes()).await.unwrap();

    // victim held slot 0, attacker slot 1: next free after 0 is slot 2.
    assert_eq!(
        next_json(&mut victim).await,
        json!({"type": "Restart", "data": {"x": -20.0, "z": 20.0}})
    );
    let snapshot = arena.snapshot(room).await.unwrap();
    let player = &snapshot.players[victim.session_id()];
    assert_eq!(player.current_hp, 10);
    assert_eq!(player.loss_count, 1);
}

#[tokio::test]
async fn test_deliver_garbage_is_a_protocol_error() {
    let arena = arena();
    let room = arena.create_room(RoomConfig::default()).await;
    let conn = joined(&arena, room, 10).await;

    let result = conn.deliver(b"not json").await;

    assert!(matches!(result, Err(ArenaError::Protocol(_))));
    conn.send(ClientMessage::Shoot(json!([1]))).await.unwrap();
}

#[tokio::test]
async fn test_rooms_are_served_concurrently() {
    let arena = arena();
    let red = arena.create_room(RoomConfig::default()).await;
    let blue = arena.create_room(RoomConfig::default()).await;
    let red_shooter = joined(&arena, red, 10).await;
    let mut red_target = joined(&arena, red, 10).await;
    let blue_shooter = joined(&arena, blue, 10).await;
    let mut blue_target = joined(&arena, blue, 10).await;

    let (_, _, rooms) = tokio::join!(
        volley(&red_shooter, "red"),
        volley(&blue_shooter, "blue"),
        arena.list_rooms()
    );

    assert_eq!(rooms.len(), 2);
    for i in 0..200 {
        assert_eq!(next_json(&mut red_target).await["data"], json!({"tag": "red", "n": i}));
        assert_eq!(next_json(&mut blue_target).await["data"], json!({"tag": "blue", "n": i}));
    }
}

// =========================================================================
// lock_room() / unlock_room()
// =========================================================================

#[tokio::test]
async fn test_locked_room_stays_locked_after_a_leave() {
    let arena = arena();
    let room = arena.create_room(RoomConfig::default()).await;
    let _stay = joined(&arena, room, 10).await;
    let go = joined(&arena, room, 10).await;

    arena.lock_room(room).await.unwrap();
    go.leave().await.unwrap();

    assert!(arena.room_info(room).await.unwrap().locked);
    let refused = arena.connect(room, None, opts(10)).await;
    assert!(matches!(refused, Err(ArenaError::Room(RoomError::Locked(_)))));

    arena.unlock_room(room).await.unwrap();
    assert!(arena.connect(room, None, opts(10)).await.is_ok());
}

// =========================================================================
// leave()
// =========================================================================

#[tokio::test]
async fn test_leave_closes_session_and_frees_slot() {
    let arena = arena();
    let room = arena.create_room(RoomConfig::default()).await;
    let _stay = joined(&arena, room, 10).await;
    let go = joined(&arena, room, 10).await;

    go.leave().await.unwrap();

    assert_eq!(arena.session_count().await, 1);
    let info = arena.room_info(room).await.unwrap();
    assert_eq!(info.client_count, 1);
    assert_eq!(info.occupied_spawns, 1);
}

#[tokio::test]
async fn test_last_leave_disposes_room() {
    let arena = arena();
    let room = arena.create_room(RoomConfig::default()).await;
    let only = joined(&arena, room, 10).await;

    only.leave().await.unwrap();

    while arena.room_info(room).await.is_ok() {
        tokio::task::yield_now().await;
    }
    assert!(matches!(
        arena.room_info(room).await,
        Err(ArenaError::Room(RoomError::Unavailable(_)))
    ));
    assert_eq!(arena.prune_disposed().await, vec![room]);
    assert!(arena.list_rooms().await.is_empty());
}

#[tokio::test]
async fn test_dropped_connection_is_cleaned_up() {
    let arena = arena();
    let room = arena.create_room(RoomConfig {
        auto_dispose: false,
        ..RoomConfig::default()
    })
    .await;
    let conn = joined(&arena, room, 10).await;

    drop(conn);
    while arena.session_count().await > 0 {
        tokio::task::yield_now().await;
    }

    assert_eq!(arena.room_info(room).await.unwrap().client_count, 0);
}

#[tokio::test]
async fn test_destroyed_room_ends_outbound_stream() {
    let arena = arena();
    let room = arena.create_room(RoomConfig::default()).await;
    let mut conn = joined(&arena, room, 10).await;

    arena.destroy_room(room).await.unwrap();

    assert_eq!(conn.next_frame().await.unwrap(), None);
    let result = conn.send(ClientMessage::Shoot(json!({}))).await;
    assert!(result.is_err());
}
