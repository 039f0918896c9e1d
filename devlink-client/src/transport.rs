use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("connect to {address} failed: {reason}")]
    Connect { address: String, reason: String },

    #[error("send failed: {0}")]
    Send(String),

    #[error("socket closed")]
    Closed,
}

/// An open connection to the debugging server.
pub trait Socket: Send {
    fn send(&mut self, text: &str) -> Result<(), TransportError>;

    fn close(&mut self);
}

/// Opens a socket to the given `ws://` or `wss://` address.
pub type SocketFactory =
    Arc<dyn Fn(&str) -> Result<Box<dyn Socket>, TransportError> + Send + Sync>;

/// What a [`ChannelSocket`] forwards to its receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Open(String),
    Text(String),
    Close,
}

/// Socket that forwards frames to an in-process channel.
///
/// Hosts that own their own websocket task use this to bridge the client
/// into it; tests use it to observe the wire.
pub struct ChannelSocket {
    tx: mpsc::UnboundedSender<Frame>,
    open: bool,
}

impl fmt::Debug for ChannelSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelSocket")
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

impl Socket for ChannelSocket {
    fn send(&mut self, text: &str) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        self.tx
            .send(Frame::Text(text.to_string()))
            .map_err(|_| TransportError::Closed)
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            let _ = self.tx.send(Frame::Close);
        }
    }
}

/// A factory whose sockets all feed one receiver.
pub fn channel_transport() -> (SocketFactory, mpsc::UnboundedReceiver<Frame>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let factory: SocketFactory = Arc::new(move |address: &str| {
        tx.send(Frame::Open(address.to_string()))
            .map_err(|_| TransportError::Connect {
                address: address.to_string(),
                reason: "receiver dropped".into(),
            })?;
        Ok(Box::new(ChannelSocket {
            tx: tx.clone(),
            open: true,
        }) as Box<dyn Socket>)
    });
    (factory, rx)
}
