//! App: terminal runtime around the [`Session`] state machine.
//!
//! Architecture:
//! - A blocking task reads terminal events and forwards them as `Message`s.
//! - An independent interval task emits `PollTick` every two seconds.
//! - The event loop feeds each message to the session and hands the
//!   returned commands to the executor, whose results come back on the
//!   same channel.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::Session;
use crate::executor::{self, Services};
use crate::message::Message;
use crate::ui;

pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
/// How long the input reader blocks before checking whether the loop is gone.
const INPUT_POLL: Duration = Duration::from_millis(100);
/// Redraw cadence so the extrapolated position keeps moving between polls.
const UI_TICK: Duration = Duration::from_millis(500);

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

pub struct App {
    session: Session,
    services: Arc<Services>,
}

impl App {
    pub fn new(session: Session, services: Services) -> Self {
        Self {
            session,
            services: Arc::new(services),
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        info!("plexamp-tui exiting");
        result
    }

    async fn event_loop(&mut self, terminal: &mut Tui) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<Message>(1024);

        // ── Background task: keyboard events ──────────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || {
            pump_input(&event_tx, |timeout| {
                if event::poll(timeout)? {
                    event::read().map(Some)
                } else {
                    Ok(None)
                }
            })
        });

        // ── Background task: status poll ticker ───────────────────────────────
        let tick_tx = tx.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(POLL_INTERVAL);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if tick_tx.send(Message::PollTick).await.is_err() {
                    break;
                }
            }
        });

        let mut ui_tick = tokio::time::interval(UI_TICK);
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let size = terminal.size()?;
        self.dispatch(Message::Resize(size.width, size.height), &tx);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| ui::draw(f, &mut self.session))?;
            }
            needs_redraw = false;

            if self.session.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    const MAX_DRAIN: usize = 256;
                    self.dispatch(msg, &tx);
                    let mut drained = 0usize;
                    while drained < MAX_DRAIN {
                        let Ok(next) = rx.try_recv() else { break };
                        drained += 1;
                        self.dispatch(next, &tx);
                    }
                    needs_redraw = true;
                }

                _ = ui_tick.tick() => {
                    needs_redraw = self.session.playback.is_playing;
                }
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, msg: Message, tx: &mpsc::Sender<Message>) {
        for command in self.session.update(msg) {
            debug!("command: {command:?}");
            executor::spawn(&self.services, command, tx.clone());
        }
    }
}

/// Forwards terminal events until the receiving loop goes away.
///
/// `next` waits up to the given timeout and yields `None` when nothing
/// arrived; the reader re-checks the channel between waits so the runtime
/// can shut down after quit.
fn pump_input(
    tx: &mpsc::Sender<Message>,
    mut next: impl FnMut(Duration) -> io::Result<Option<Event>>,
) {
    while !tx.is_closed() {
        let msg = match next(INPUT_POLL) {
            Ok(Some(Event::Key(key))) => Message::Key(key),
            Ok(Some(Event::Resize(w, h))) => Message::Resize(w, h),
            Ok(_) => continue,
            Err(e) => {
                tracing::error!("terminal input failed: {e}");
                let _ = tx.blocking_send(Message::Quit);
                break;
            }
        };
        if tx.blocking_send(msg).is_err() {
            break;
        }
    }
    debug!("input reader stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyCode, KeyEvent};

    #[test]
    fn input_reader_stops_once_loop_is_gone() {
        let (tx, rx) = mpsc::channel::<Message>(4);
        let mut rx = Some(rx);
        let mut waits = 0;
        pump_input(&tx, |_| {
            waits += 1;
            if waits == 3 {
                rx.take();
            }
            Ok(None)
        });
        assert_eq!(waits, 3);
    }

    #[test]
    fn input_reader_forwards_keys_and_quits_on_error() {
        let (tx, mut rx) = mpsc::channel::<Message>(4);
        let mut events = vec![
            Err(io::Error::other("tty gone")),
            Ok(Some(Event::FocusGained)),
            Ok(Some(Event::Key(KeyEvent::from(KeyCode::Char('q'))))),
        ];
        pump_input(&tx, |_| events.pop().unwrap_or(Ok(None)));

        assert!(matches!(rx.try_recv(), Ok(Message::Key(k)) if k.code == KeyCode::Char('q')));
        assert!(matches!(rx.try_recv(), Ok(Message::Quit)));
        assert!(rx.try_recv().is_err());
    }
}
