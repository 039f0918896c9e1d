use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use devlink_plugin::{Command, CommandSink};
use tracing::{debug, warn};

use crate::transport::{Socket, TransportError};

#[derive(Default)]
struct OutboxState {
    socket: Option<Box<dyn Socket>>,
    queue: VecDeque<Command>,
    last_sent: Option<Instant>,
}

/// Outbound command path shared by the client and its plugins.
///
/// Commands are stamped and written to the socket while one is open;
/// otherwise they wait until the next `open`. Either way they leave in
/// arrival order: a command whose write fails stays at the head of the
/// queue and is retried before anything sent after it.
#[derive(Default)]
pub struct Outbox {
    state: Mutex<OutboxState>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `socket`, write `intro` first, then drain the queue.
    /// Returns how many queued commands were flushed.
    ///
    /// A socket already installed is closed and replaced.
    pub fn open(&self, socket: Box<dyn Socket>, intro: Command) -> Result<usize, TransportError> {
        let mut state = self.lock();
        if let Some(mut previous) = state.socket.replace(socket) {
            debug!("closing replaced socket");
            previous.close();
        }
        if let Err(e) = write(&mut state, &intro) {
            if let Some(mut socket) = state.socket.take() {
                socket.close();
            }
            return Err(e);
        }
        Ok(drain(&mut state))
    }

    /// Take the socket out, leaving the outbox queueing again.
    pub fn detach(&self) -> Option<Box<dyn Socket>> {
        self.lock().socket.take()
    }

    pub fn is_connected(&self) -> bool {
        self.lock().socket.is_some()
    }

    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    fn lock(&self) -> MutexGuard<'_, OutboxState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn write(state: &mut OutboxState, command: &Command) -> Result<(), TransportError> {
    let now = Instant::now();
    let delta = state
        .last_sent
        .map(|prev| u64::try_from(now.duration_since(prev).as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0);
    let command = command.clone().stamped(delta);
    let text = serde_json::to_string(&command).map_err(|e| TransportError::Send(e.to_string()))?;

    let socket = state.socket.as_mut().ok_or(TransportError::Closed)?;
    socket.send(&text)?;
    state.last_sent = Some(now);
    Ok(())
}

/// Write queued commands front to back. A failed write leaves that
/// command at the front so nothing behind it overtakes it.
fn drain(state: &mut OutboxState) -> usize {
    let mut written = 0;
    while let Some(command) = state.queue.pop_front() {
        if let Err(e) = write(state, &command) {
            warn!(error = %e, command = %command.command_type, "send failed, keeping queue for retry");
            state.queue.push_front(command);
            break;
        }
        written += 1;
    }
    written
}

impl CommandSink for Outbox {
    fn send(&self, command: Command) {
        let mut state = self.lock();
        if state.socket.is_none() {
            debug!(command = %command.command_type, "queued while disconnected");
            state.queue.push_back(command);
            return;
        }
        state.queue.push_back(command);
        drain(&mut state);
    }
}
