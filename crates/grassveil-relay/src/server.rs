//! TCP relay server

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::{mpsc, Mutex};

use crate::protocol::{ClientMessage, PlayerInfo, ServerMessage, Vec3Msg};

/// New players appear within this distance of the origin on X and Z.
const SPAWN_HALF_EXTENT: f32 = 5.0;
const SPAWN_HEIGHT: f32 = 0.2;
const DEFAULT_DIRECTION: Vec3Msg = Vec3Msg::new(0.0, 0.0, -1.0);
const PALETTE: [u32; 8] = [
    0xff6b6b, 0x4ecdc4, 0x45b7d1, 0x96ceb4, 0xfeca57, 0xff9ff3, 0x54a0ff, 0x5f27cd,
];

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

struct Player {
    info: PlayerInfo,
    /// Outbound lines, already newline-terminated
    tx: mpsc::UnboundedSender<String>,
}

/// Connected players and the fan-out rules between them.
///
/// Transport-free: each player is just an outbound line channel, so the
/// routing can be exercised without sockets.
pub struct Relay {
    players: BTreeMap<u64, Player>,
    next_id: u64,
    rng: StdRng,
}

impl Relay {
    pub fn new(seed: u64) -> Self {
        Self {
            players: BTreeMap::new(),
            next_id: 1,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Register a player. It receives `init`; everyone else `playerJoined`.
    pub fn join(&mut self, tx: mpsc::UnboundedSender<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let info = PlayerInfo {
            id,
            position: Vec3Msg::new(
                self.rng.gen_range(-SPAWN_HALF_EXTENT..SPAWN_HALF_EXTENT),
                SPAWN_HEIGHT,
                self.rng.gen_range(-SPAWN_HALF_EXTENT..SPAWN_HALF_EXTENT),
            ),
            direction: DEFAULT_DIRECTION,
            color: PALETTE[self.rng.gen_range(0..PALETTE.len())],
        };
        log::info!("Player {} joined at ({:.2}, {:.2})", id, info.position.x, info.position.z);

        self.players.insert(
            id,
            Player {
                info: info.clone(),
                tx,
            },
        );

        let init = ServerMessage::Init {
            player_id: id,
            players: self.players.values().map(|p| p.info.clone()).collect(),
        };
        self.send_to(id, &init);
        self.broadcast(&ServerMessage::PlayerJoined { player: info }, Some(id));
        id
    }

    /// Remove a player and tell everyone else. Unknown ids are ignored.
    pub fn leave(&mut self, id: u64) {
        if self.players.remove(&id).is_some() {
            log::info!("Player {} left", id);
            self.broadcast(&ServerMessage::PlayerLeft { player_id: id }, None);
        }
    }

    /// Parse one line from a client and route it. Invalid JSON is logged
    /// and dropped.
    pub fn handle_line(&mut self, id: u64, line: &str) {
        match serde_json::from_str::<ClientMessage>(line) {
            Ok(msg) => self.handle_message(id, msg),
            Err(e) => log::warn!("Invalid message from player {}: {}", id, e),
        }
    }

    pub fn handle_message(&mut self, id: u64, msg: ClientMessage) {
        let Some(player) = self.players.get_mut(&id) else {
            return;
        };

        match msg {
            ClientMessage::PlayerUpdate { position, direction } => {
                player.info.position = position;
                player.info.direction = direction;
                self.broadcast(
                    &ServerMessage::PlayerMoved {
                        player_id: id,
                        position,
                        direction,
                    },
                    Some(id),
                );
            }
            ClientMessage::GrassBent { position, radius } => {
                self.broadcast(
                    &ServerMessage::GrassBent {
                        player_id: id,
                        position,
                        radius,
                    },
                    Some(id),
                );
            }
            ClientMessage::ChatMessage { message } => {
                log::debug!("Chat from player {}: {}", id, message);
                self.broadcast(
                    &ServerMessage::ChatMessage {
                        player_id: id,
                        message,
                        player_name: format!("Player {}", id),
                    },
                    None,
                );
            }
        }
    }

    pub fn player(&self, id: u64) -> Option<&PlayerInfo> {
        self.players.get(&id).map(|p| &p.info)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    fn send_to(&self, id: u64, msg: &ServerMessage) {
        let (Some(player), Some(line)) = (self.players.get(&id), encode(msg)) else {
            return;
        };
        // A closed channel means the connection is already tearing down
        let _ = player.tx.send(line);
    }

    fn broadcast(&self, msg: &ServerMessage, exclude: Option<u64>) {
        let Some(line) = encode(msg) else {
            return;
        };
        for (id, player) in &self.players {
            if Some(*id) != exclude {
                let _ = player.tx.send(line.clone());
            }
        }
    }
}

fn encode(msg: &ServerMessage) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(mut line) => {
            line.push('\n');
            Some(line)
        }
        Err(e) => {
            log::error!("Relay serialize error: {}", e);
            None
        }
    }
}

/// Listening relay. Call [`RelayServer::run`] to start accepting players.
pub struct RelayServer {
    listener: TcpListener,
    relay: Arc<Mutex<Relay>>,
}

impl RelayServer {
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, RelayError> {
        let listener = TcpListener::bind(addr).await?;
        log::info!("Relay listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            relay: Arc::new(Mutex::new(Relay::new(rand::random()))),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        Ok(self.listener.local_addr()?)
    }

    /// Shared relay state, for inspection.
    pub fn relay(&self) -> Arc<Mutex<Relay>> {
        self.relay.clone()
    }

    /// Accept connections forever.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    log::info!("Client connected from {}", peer);
                    let relay = self.relay.clone();
                    tokio::spawn(async move {
                        handle_connection(stream, relay).await;
                        log::info!("Client disconnected: {}", peer);
                    });
                }
                Err(e) => {
                    log::error!("Relay accept error: {}", e);
                }
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, relay: Arc<Mutex<Relay>>) {
    let (reader, mut writer) = stream.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let id = relay.lock().await.join(tx);

    // Ends once the relay drops this player's sender
    let writer_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if let Err(e) = writer.write_all(line.as_bytes()).await {
                log::error!("Relay write error: {}", e);
                break;
            }
            if let Err(e) = writer.flush().await {
                log::error!("Relay flush error: {}", e);
                break;
            }
        }
    });

    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break, // Connection closed
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                relay.lock().await.handle_line(id, trimmed);
            }
            Err(e) => {
                log::error!("Relay read error from player {}: {}", id, e);
                break;
            }
        }
    }

    relay.lock().await.leave(id);
    let _ = writer_task.await;
}
