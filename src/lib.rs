// MIT License
//
//! # envisalink-tpi
//!
//! Async client for the Envisalink TPI (third party interface) used by
//! DSC security panels, plus an MQTT topic matcher for bridging panel
//! events onto a message bus.
//!
//! The TPI speaks a line-based ASCII protocol: 3-digit command, data,
//! 2-char checksum, CRLF. This library keeps one supervised TCP connection
//! to the interface, answers its login handshake, decodes the inbound
//! command stream through an ordered handler chain and publishes typed
//! [`PanelEvent`]s on a broadcast channel.
//!
//! ## Quick Start
//!
//! ```no_run
//! use envisalink_tpi::{ApplicationCommand, EvlConfig, EvlConnection};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EvlConfig::builder()
//!         .host("192.168.0.100")
//!         .password("user")
//!         .build();
//!
//!     let connection = EvlConnection::connect(config);
//!
//!     let mut events = connection.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     connection.send(ApplicationCommand::StatusReport, "")?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     connection.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod constants;
pub mod error;
pub mod event;
pub mod handlers;
pub mod mqtt;
pub mod protocol;
pub mod splitter;

// Re-exports for convenience
pub use config::{EvlConfig, EvlConfigBuilder};
pub use connection::EvlConnection;
pub use constants::{
    ApplicationCommand, IndicatorState, LoginResponse, PartitionActivity, SystemErrorCode,
    TpiCommand, ZoneSituation,
};
pub use error::{EvlError, FrameError, Result};
pub use event::{EventReceiver, PanelEvent};
pub use handlers::TroubleFlags;
pub use mqtt::{topic_qualifier, BusMessage, TopicInterest};
pub use protocol::Frame;
pub use splitter::FrameSplitter;
