//! Headless skirmish: three bots join one room, move, trade shots and
//! hits, then leave. Every frame a bot receives is logged.
//!
//! ```text
//! cargo run -p skirmish                 # default room
//! cargo run -p skirmish -- room.json    # RoomConfig from a JSON file
//! RUST_LOG=debug cargo run -p skirmish  # per-message detail
//! ```

use arena::prelude::*;
use serde_json::json;

type Bot = ClientConnection<AcceptAll, JsonCodec>;

// ---------------------------------------------------------------------------
// Bot helpers
// ---------------------------------------------------------------------------

/// Logs every frame already queued for a bot.
fn flush(name: &str, bot: &mut Bot) {
    while let Some(event) = bot.try_recv() {
        match event {
            RoomOutbound::State(snapshot) => {
                tracing::info!(bot = name, players = snapshot.players.len(), "<- state");
            }
            RoomOutbound::Message(msg) => {
                tracing::info!(bot = name, ?msg, "<- message");
            }
        }
    }
}

async fn walk(bot: &Bot, x: f32, z: f32) -> Result<(), ArenaError> {
    let frame = json!({
        "type": "move",
        "data": {
            "position": {"x": x, "y": 0.0, "z": z},
            "velocity": {"x": 1.0, "y": 0.0, "z": 0.0},
            "rotation": {"x": 0.0, "y": 0.5}
        }
    });
    bot.deliver(frame.to_string().as_bytes()).await
}

async fn hit(attacker: &Bot, target: &Bot, amount: i32) -> Result<(), ArenaError> {
    let frame = json!({
        "type": "damage",
        "data": {"target": target.session_id().as_str(), "amount": amount}
    });
    attacker.deliver(frame.to_string().as_bytes()).await
}

fn load_config() -> Result<RoomConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)?;
            tracing::info!(%path, "loaded room config");
            Ok(serde_json::from_str(&raw)?)
        }
        None => Ok(RoomConfig {
            skin_count: 4,
            ..RoomConfig::default()
        }),
    }
}

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    arena::init_logging();

    let arena = Arena::builder().build(AcceptAll);
    let room = arena.create_room(load_config()?).await;

    let mut red = arena.connect(room, None, JoinOptions::new(10, 6.0)).await?;
    let mut blue = arena.connect(room, None, JoinOptions::new(8, 5.0)).await?;
    let mut green = arena.connect(room, None, JoinOptions::new(12, 4.0)).await?;

    walk(&red, -18.0, -19.0).await?;
    walk(&blue, 18.5, -19.5).await?;

    let shot = json!({"type": "shoot", "data": {"dir": {"x": 1.0, "z": 0.0}, "weapon": "rail"}});
    red.deliver(shot.to_string().as_bytes()).await?;
    hit(&red, &blue, 5).await?;
    hit(&red, &blue, 5).await?; // blue dies, respawns
    hit(&green, &red, 4).await?;
    hit(&blue, &green, 20).await?; // green dies, respawns

    let snapshot = arena.snapshot(room).await?;
    for (bot, name) in [(&mut red, "red"), (&mut blue, "blue"), (&mut green, "green")] {
        flush(name, bot);
        if let Some(player) = snapshot.players.get(bot.session_id()) {
            tracing::info!(
                bot = name,
                hp = player.current_hp,
                losses = player.loss_count,
                spawn = ?player.spawn_index(),
                skin = ?player.skin,
                "final state"
            );
        }
    }

    red.leave().await?;
    blue.leave().await?;
    green.leave().await?;

    let disposed = arena.prune_disposed().await;
    let rooms = arena.list_rooms().await;
    tracing::info!(rooms = rooms.len(), ?disposed, "done");
    Ok(())
}
