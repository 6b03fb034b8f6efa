// MIT License
// Connection supervisor

//! One TCP connection to the TPI, kept alive forever.
//!
//! [`EvlConnection::connect`] spawns a single supervisor task that owns the
//! socket, the frame splitter and the dispatcher chain. On any disconnect it
//! waits a fixed delay and dials again; the delay depends on whether the
//! remote closed cleanly or the socket failed. Subscribers share the one
//! connection through the broadcast event channel.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use crate::config::EvlConfig;
use crate::constants::ApplicationCommand;
use crate::error::{EvlError, Result};
use crate::event::{EventReceiver, EventSender, PanelEvent};
use crate::handlers::{CommandReceiver, CommandSender, DispatcherChain};
use crate::protocol::encode_frame;
use crate::splitter::FrameSplitter;

/// Why one connection activation ended.
enum Outcome {
    /// Shutdown requested; the supervisor exits.
    Stopped,
    /// The remote closed the socket cleanly.
    Closed,
    /// Connect, read or write failed.
    Failed(std::io::Error),
}

/// Handle to a supervised TPI connection.
///
/// Dropping the handle (or calling [`shutdown`](Self::shutdown)) stops the
/// supervisor; no reconnect timer outlives it.
pub struct EvlConnection {
    events: EventSender,
    outbound: CommandSender,
    shutdown: watch::Sender<bool>,
    supervisor: Option<tokio::task::JoinHandle<()>>,
}

impl EvlConnection {
    /// Start the supervisor. Returns immediately; the first TCP connect
    /// happens on the spawned task.
    pub fn connect(config: EvlConfig) -> Self {
        let (events, _) = crate::event::event_channel(config.event_capacity);
        let (out_tx, out_rx) = tokio::sync::mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let chain = DispatcherChain::new(out_tx.clone(), config.password.clone());

        let supervisor = tokio::spawn(supervise(
            config,
            chain,
            events.clone(),
            out_rx,
            shutdown_rx,
        ));

        Self {
            events,
            outbound: out_tx,
            shutdown: shutdown_tx,
            supervisor: Some(supervisor),
        }
    }

    /// Subscribe to panel events. Every subscriber sees every event; no
    /// additional connection is opened.
    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    /// Queue a command for the TPI. The checksum and terminator are added
    /// when the command hits the wire; while the connection is down commands
    /// queue and drain after the next connect.
    pub fn send(&self, command: ApplicationCommand, data: impl Into<String>) -> Result<()> {
        self.outbound
            .send((command, data.into()))
            .map_err(|_| EvlError::ChannelClosed)
    }

    /// Stop the supervisor and wait for it to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.supervisor.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for EvlConnection {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

async fn supervise(
    config: EvlConfig,
    mut chain: DispatcherChain,
    events: EventSender,
    mut outbound: CommandReceiver,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut splitter = FrameSplitter::new();
    loop {
        let delay = match run_connection(
            &config,
            &mut chain,
            &events,
            &mut outbound,
            &mut shutdown,
            &mut splitter,
        )
        .await
        {
            Outcome::Stopped => break,
            Outcome::Closed => {
                info!(
                    "connection closed, reconnecting in {}ms",
                    config.repeat_delay_ms
                );
                let _ = events.send(PanelEvent::Disconnected);
                Duration::from_millis(config.repeat_delay_ms)
            }
            Outcome::Failed(e) => {
                warn!(
                    error = %e,
                    "connection failed, reconnecting in {}ms",
                    config.retry_delay_ms
                );
                let _ = events.send(PanelEvent::Disconnected);
                Duration::from_millis(config.retry_delay_ms)
            }
        };

        tokio::select! {
            _ = sleep(delay) => {}
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    debug!("supervisor stopped");
}

async fn run_connection(
    config: &EvlConfig,
    chain: &mut DispatcherChain,
    events: &EventSender,
    outbound: &mut CommandReceiver,
    shutdown: &mut watch::Receiver<bool>,
    splitter: &mut FrameSplitter,
) -> Outcome {
    if *shutdown.borrow() {
        return Outcome::Stopped;
    }

    // A new connection never continues the previous byte stream
    splitter.reset();

    info!("connecting to {}:{}", config.host, config.port);
    let mut stream = tokio::select! {
        connected = TcpStream::connect((config.host.as_str(), config.port)) => {
            match connected {
                Ok(stream) => stream,
                Err(e) => return Outcome::Failed(e),
            }
        }
        _ = shutdown.changed() => return Outcome::Stopped,
    };
    info!("connected");
    let _ = events.send(PanelEvent::Connected);

    let mut buf = vec![0u8; 4096];
    loop {
        tokio::select! {
            res = shutdown.changed() => {
                if res.is_err() || *shutdown.borrow() {
                    return Outcome::Stopped;
                }
            }
            cmd = outbound.recv() => {
                let Some((command, data)) = cmd else {
                    return Outcome::Stopped;
                };
                let wire = encode_frame(command.as_code(), &data);
                debug!(command = command.as_code(), "sending command");
                if let Err(e) = stream.write_all(wire.as_bytes()).await {
                    return Outcome::Failed(e);
                }
            }
            read = stream.read(&mut buf) => {
                match read {
                    Ok(0) => return Outcome::Closed,
                    Ok(n) => {
                        let text = String::from_utf8_lossy(&buf[..n]).into_owned();
                        let frames = splitter.push(&text, |raw, reason| {
                            warn!(%raw, %reason, "dropping invalid frame");
                        });
                        for frame in frames {
                            chain.dispatch(frame, events);
                        }
                    }
                    Err(e) => return Outcome::Failed(e),
                }
            }
        }
    }
}
