//! Runs session commands as detached tasks and turns each result into a
//! message for the event loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use plex_proto::client::PlexClient;
use plex_proto::player::PlayerClient;
use plex_proto::protocol::PlaybackSnapshot;

use crate::message::{Command, Fetched, ListKind, Message};

/// Network clients shared by every task.
pub struct Services {
    pub client: PlexClient,
    pub player: PlayerClient,
    command_id: AtomicU64,
}

impl Services {
    pub fn new(client: PlexClient, player: PlayerClient) -> Self {
        Self {
            client,
            player,
            command_id: AtomicU64::new(1),
        }
    }

    fn next_command_id(&self) -> u64 {
        self.command_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// Fire and forget: the outcome arrives later on `tx`.
pub fn spawn(services: &Arc<Services>, command: Command, tx: mpsc::Sender<Message>) {
    let services = Arc::clone(services);
    tokio::spawn(async move {
        let msg = run(&services, command).await;
        if tx.send(msg).await.is_err() {
            debug!("event loop gone, dropping command result");
        }
    });
}

pub async fn run(services: &Services, command: Command) -> Message {
    match command {
        Command::Fetch {
            kind,
            server_addr,
            library_id,
        } => {
            let client = &services.client;
            Message::Fetched(match kind {
                ListKind::Artists => Fetched::Artists(client.artists(&server_addr, &library_id).await),
                ListKind::Albums => Fetched::Albums(client.albums(&server_addr, &library_id).await),
                ListKind::Playlists => Fetched::Playlists(client.playlists(&server_addr).await),
                ListKind::Servers => Fetched::Servers(client.servers().await),
                ListKind::Players => Fetched::Players(client.players().await),
            })
        }
        Command::Trigger {
            address,
            url,
            shuffle,
        } => Message::PlaybackTriggered(
            services
                .player
                .send_playback_url(&address, &url, shuffle)
                .await,
        ),
        Command::Control { address, command } => Message::ControlSent {
            command,
            result: services.player.command(&address, command).await,
        },
        Command::Poll { address, epoch } => {
            let snapshot = services
                .player
                .timeline(&address, services.next_command_id())
                .await
                .unwrap_or_else(|e| {
                    debug!("timeline poll of {address} failed: {e}");
                    PlaybackSnapshot::default()
                });
            Message::PollResult { epoch, snapshot }
        }
        Command::SelectServer { server } => {
            let libraries = services.client.libraries(&server.host_port()).await;
            Message::ServerSelected { server, libraries }
        }
    }
}
