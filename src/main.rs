// MIT License
// MQTT bridge

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use serde::{Deserialize, Serialize};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{mpsc, Mutex};
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

use envisalink_tpi::{
    ApplicationCommand, BusMessage, EvlConfig, EvlConnection, PanelEvent, TopicInterest,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "evl2mqtt")]
#[command(about = "Bridge between an Envisalink TPI alarm interface and MQTT")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Config {
    envisalink: EnvisalinkToml,
    mqtt: MqttToml,
}

#[derive(Debug, Deserialize)]
struct EnvisalinkToml {
    host: String,
    #[serde(default = "default_tpi_port")]
    port: u16,
    password: String,
    #[serde(default = "default_retry_delay")]
    retry_delay_ms: u64,
    #[serde(default = "default_repeat_delay")]
    repeat_delay_ms: u64,
}

fn default_tpi_port() -> u16 {
    4025
}
fn default_retry_delay() -> u64 {
    9000
}
fn default_repeat_delay() -> u64 {
    6000
}

#[derive(Debug, Deserialize)]
struct MqttToml {
    url: String,
    #[serde(default = "default_client_id")]
    client_id: String,
    #[serde(default = "default_subscribe_topic")]
    subscribe_topic: String,
    #[serde(default = "default_publish_topic")]
    publish_topic: String,
}

fn default_client_id() -> String {
    "evl-bridge".to_string()
}
fn default_subscribe_topic() -> String {
    "evl/cmd".to_string()
}
fn default_publish_topic() -> String {
    "evl".to_string()
}

/// Parse an MQTT URL like "mqtt://host:port" into (host, port).
fn parse_mqtt_url(url: &str) -> Result<(String, u16)> {
    let stripped = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    let (host, port_str) = stripped
        .rsplit_once(':')
        .context("MQTT URL must be in format mqtt://host:port")?;

    let port: u16 = port_str.parse().context("Invalid MQTT port number")?;

    Ok((host.to_string(), port))
}

// ---------------------------------------------------------------------------
// MQTT JSON types
// ---------------------------------------------------------------------------

// Published messages — all share {now, op, ...} flat structure

#[derive(Serialize)]
struct MqttZoneEvent {
    now: u64,
    op: String,
    zone: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    partition: Option<u8>,
    situation: String,
    restored: bool,
}

#[derive(Serialize)]
struct MqttZoneTimerEvent {
    now: u64,
    op: String,
    zone: u16,
    #[serde(rename = "secondsAgo")]
    seconds_ago: u32,
    restored: bool,
    maxed: bool,
}

#[derive(Serialize)]
struct MqttPartitionEvent {
    now: u64,
    op: String,
    partition: u8,
    activity: String,
}

#[derive(Serialize)]
struct MqttIndicatorEvent {
    now: u64,
    op: String,
    indicator: String,
    state: u8,
}

#[derive(Serialize)]
struct MqttTroubleEvent {
    now: u64,
    op: String,
    flags: Vec<String>,
}

#[derive(Serialize)]
struct MqttLoginEvent {
    now: u64,
    op: String,
    success: bool,
}

#[derive(Serialize)]
struct MqttCmdAckEvent {
    now: u64,
    op: String,
    command: String,
}

#[derive(Serialize)]
struct MqttSimpleEvent {
    now: u64,
    op: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

// Inbound command (subscribed)
#[derive(Debug, Deserialize)]
struct MqttCommand {
    op: String,
    #[serde(default)]
    partition: Option<u8>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    kind: Option<String>,
}

/// Map an inbound bus command to a TPI application command plus data.
fn map_command(cmd: &MqttCommand) -> Result<(ApplicationCommand, String)> {
    let partition = || cmd.partition.unwrap_or(1).to_string();
    let code = || {
        cmd.code
            .clone()
            .with_context(|| format!("{} requires a user code", cmd.op))
    };
    match cmd.op.as_str() {
        "POLL" => Ok((ApplicationCommand::Poll, String::new())),
        "STATUS" => Ok((ApplicationCommand::StatusReport, String::new())),
        "DUMP_ZONE_TIMERS" => Ok((ApplicationCommand::DumpZoneTimers, String::new())),
        "ARM_AWAY" => Ok((ApplicationCommand::ArmAway, partition())),
        "ARM_STAY" => Ok((ApplicationCommand::ArmStay, partition())),
        "ARM_ZE" => Ok((ApplicationCommand::ArmNoEntryDelay, partition())),
        "ARM_CODE" => Ok((
            ApplicationCommand::ArmWithCode,
            format!("{}{}", partition(), code()?),
        )),
        "DISARM" => Ok((
            ApplicationCommand::Disarm,
            format!("{}{}", partition(), code()?),
        )),
        "PANIC" => {
            let digit = match cmd.kind.as_deref() {
                Some("fire") => "1",
                Some("ambulance") => "2",
                Some("police") => "3",
                other => anyhow::bail!("unknown panic kind: {:?}", other),
            };
            Ok((ApplicationCommand::PanicAlarm, digit.to_string()))
        }
        other => anyhow::bail!("unknown command: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn now_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

async fn publish_json(client: &AsyncClient, topic: &str, payload: &impl Serialize) {
    match serde_json::to_string(payload) {
        Ok(json) => {
            if let Err(e) = client.publish(topic, QoS::AtLeastOnce, false, json).await {
                error!("Failed to publish to {topic}: {e}");
            }
        }
        Err(e) => error!("Failed to serialize MQTT payload: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Panel event → MQTT
// ---------------------------------------------------------------------------

/// Partitions learned from zone alarm/tamper reports, so the zone events
/// that omit the partition digit can still be published with one.
type ZonePartitions = HashMap<u16, u8>;

async fn handle_panel_event(
    event: PanelEvent,
    client: &AsyncClient,
    topic: &str,
    zone_partitions: &mut ZonePartitions,
) {
    match event {
        PanelEvent::Connected => {
            info!("TPI connected");
        }
        PanelEvent::Disconnected => {
            warn!("TPI disconnected");
        }
        PanelEvent::LoginSuccess | PanelEvent::LoginFailed => {
            let success = matches!(event, PanelEvent::LoginSuccess);
            let msg = MqttLoginEvent {
                now: now_epoch_ms(),
                op: "LOGIN".to_string(),
                success,
            };
            publish_json(client, topic, &msg).await;
        }
        PanelEvent::CommandAcknowledged { command } => {
            let msg = MqttCmdAckEvent {
                now: now_epoch_ms(),
                op: "CMD_ACK".to_string(),
                command,
            };
            publish_json(client, topic, &msg).await;
        }
        PanelEvent::CommandRejected => {
            let msg = MqttSimpleEvent {
                now: now_epoch_ms(),
                op: "CMD_ERROR".to_string(),
                detail: None,
            };
            publish_json(client, topic, &msg).await;
        }
        PanelEvent::SystemError { code } => {
            let msg = MqttSimpleEvent {
                now: now_epoch_ms(),
                op: "SYSTEM_ERROR".to_string(),
                detail: Some(code.to_string()),
            };
            publish_json(client, topic, &msg).await;
        }
        PanelEvent::IndicatorChanged { name, state } => {
            let msg = MqttIndicatorEvent {
                now: now_epoch_ms(),
                op: "INDICATOR".to_string(),
                indicator: name.to_string(),
                state: state.as_u8(),
            };
            publish_json(client, topic, &msg).await;
        }
        PanelEvent::PanelTime { time } => {
            let msg = MqttSimpleEvent {
                now: now_epoch_ms(),
                op: "PANEL_TIME".to_string(),
                detail: Some(time.format("%Y-%m-%dT%H:%M:%S").to_string()),
            };
            publish_json(client, topic, &msg).await;
        }
        PanelEvent::ZoneChanged {
            zone,
            partition,
            situation,
            restored,
        } => {
            let partition = match partition {
                Some(p) => {
                    zone_partitions.insert(zone, p);
                    Some(p)
                }
                None => zone_partitions.get(&zone).copied(),
            };
            let msg = MqttZoneEvent {
                now: now_epoch_ms(),
                op: "ZONE".to_string(),
                zone,
                partition,
                situation: situation.as_str().to_string(),
                restored,
            };
            publish_json(client, topic, &msg).await;
        }
        PanelEvent::ZoneTimer {
            zone,
            seconds_ago,
            restored,
            maxed,
        } => {
            let msg = MqttZoneTimerEvent {
                now: now_epoch_ms(),
                op: "ZONE_TIMER".to_string(),
                zone,
                seconds_ago,
                restored,
                maxed,
            };
            publish_json(client, topic, &msg).await;
        }
        PanelEvent::PartitionChanged {
            partition,
            activity,
        } => {
            let msg = MqttPartitionEvent {
                now: now_epoch_ms(),
                op: "PARTITION".to_string(),
                partition,
                activity: activity.as_str().to_string(),
            };
            publish_json(client, topic, &msg).await;
        }
        PanelEvent::TroubleChanged { flags } => {
            let names = flags
                .iter_names()
                .map(|(name, _)| name.to_lowercase())
                .collect();
            let msg = MqttTroubleEvent {
                now: now_epoch_ms(),
                op: "TROUBLE".to_string(),
                flags: names,
            };
            publish_json(client, topic, &msg).await;
        }
        PanelEvent::Unhandled { frame } => {
            debug!(command = %frame.command, data = %frame.data, "unhandled TPI command");
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=debug or RUST_LOG=envisalink_tpi=trace).
    // Default: info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // systemd journal already adds timestamps, so omit them when running under systemd
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_subscriber::fmt()
            .without_time()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let cli = Cli::parse();

    // Load config
    let config_text =
        std::fs::read_to_string(&cli.config).context("Failed to read config file")?;
    let config: Config = toml::from_str(&config_text).context("Failed to parse config file")?;

    let evl_config = EvlConfig::builder()
        .host(&config.envisalink.host)
        .port(config.envisalink.port)
        .password(&config.envisalink.password)
        .retry_delay_ms(config.envisalink.retry_delay_ms)
        .repeat_delay_ms(config.envisalink.repeat_delay_ms)
        .build();

    let (mqtt_host, mqtt_port) = parse_mqtt_url(&config.mqtt.url)?;
    let publish_topic = config.mqtt.publish_topic;
    let subscribe_topic = config.mqtt.subscribe_topic;

    info!(
        "Connecting to Envisalink TPI at {}:{}",
        config.envisalink.host, config.envisalink.port
    );
    let connection = Arc::new(EvlConnection::connect(evl_config));

    // Set up MQTT
    let mut mqtt_opts = MqttOptions::new(&config.mqtt.client_id, &mqtt_host, mqtt_port);
    mqtt_opts.set_keep_alive(Duration::from_secs(30));
    let (client, mut eventloop) = AsyncClient::new(mqtt_opts, 256);

    // Mirror topic interest announcements to the broker
    let (sub_tx, mut sub_rx) = mpsc::unbounded_channel::<Vec<String>>();
    let (unsub_tx, mut unsub_rx) = mpsc::unbounded_channel::<Vec<String>>();
    let client_announce = client.clone();
    let announce_handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(topics) = sub_rx.recv() => {
                    for topic in topics {
                        info!("MQTT: subscribing to {topic}");
                        if let Err(e) = client_announce.subscribe(&topic, QoS::AtLeastOnce).await {
                            error!("Failed to subscribe to {topic}: {e}");
                        }
                    }
                }
                Some(topics) = unsub_rx.recv() => {
                    for topic in topics {
                        if let Err(e) = client_announce.unsubscribe(&topic).await {
                            error!("Failed to unsubscribe from {topic}: {e}");
                        }
                    }
                }
                else => break,
            }
        }
    });

    let interest = TopicInterest::attach([subscribe_topic.clone()], &sub_tx, unsub_tx);

    // Task 1: panel event listener
    let client_events = client.clone();
    let topic_events = publish_topic.clone();
    let mut event_rx = connection.subscribe();
    let event_handle = tokio::spawn(async move {
        let mut zone_partitions = ZonePartitions::new();
        loop {
            match event_rx.recv().await {
                Ok(event) => {
                    handle_panel_event(
                        event,
                        &client_events,
                        &topic_events,
                        &mut zone_partitions,
                    )
                    .await;
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Event receiver lagged, missed {n} events");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    info!("Event channel closed");
                    break;
                }
            }
        }
    });

    // Task 2: MQTT event loop (receives messages, handles commands)
    let connection_cmds = Arc::clone(&connection);
    let sub_topic = subscribe_topic.clone();
    let interest = Arc::new(Mutex::new(Some(interest)));
    let interest_cmds = Arc::clone(&interest);
    let mqtt_handle = tokio::spawn(async move {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    // rumqttc does not auto-resubscribe after a broker
                    // reconnect, so re-announce on every ConnAck.
                    info!("MQTT: connected");
                    let _ = sub_tx.send(vec![sub_topic.clone()]);
                }
                Ok(Event::Incoming(Packet::Publish(msg))) => {
                    let bus_msg = BusMessage::new(msg.topic.clone(), msg.payload.to_vec());
                    let accepted = {
                        let guard = interest_cmds.lock().await;
                        guard.as_ref().is_some_and(|i| i.accept(&bus_msg))
                    };
                    if !accepted {
                        continue;
                    }
                    let payload = String::from_utf8_lossy(&bus_msg.payload);
                    match serde_json::from_str::<MqttCommand>(&payload) {
                        Ok(cmd) => {
                            info!("MQTT command received: {payload}");
                            match map_command(&cmd) {
                                Ok((command, data)) => {
                                    if let Err(e) = connection_cmds.send(command, data) {
                                        error!("Failed to queue TPI command: {e}");
                                    }
                                }
                                Err(e) => warn!("Rejected command: {e}"),
                            }
                        }
                        Err(e) => {
                            warn!("Failed to parse MQTT command: {e}");
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!("MQTT event loop error: {e}");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    });

    // Wait for a signal
    let mut sigterm = signal(SignalKind::terminate())?;
    info!("MQTT bridge running. Send SIGINT/SIGTERM to stop.");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
        }
    }

    // Announce the unsubscribe while the announcement task still runs
    if let Some(interest) = interest.lock().await.take() {
        interest.detach();
    }

    event_handle.abort();
    mqtt_handle.abort();
    announce_handle.abort();

    match Arc::try_unwrap(connection) {
        Ok(connection) => connection.shutdown().await,
        Err(_) => warn!("Could not unwrap connection for clean shutdown"),
    }

    info!("Shutdown complete");
    Ok(())
}
