// MQTT Task - Empfängt Gauge-Updates und published den Temperatur-Status
use core::cell::RefCell;

use defmt::{Debug2Format, error, info, warn};
use embassy_futures::select::{Either3, select3};
use embassy_net::{IpAddress, Stack, dns::DnsQueryType, tcp::TcpSocket};
use embassy_time::{Duration, Instant, Timer, with_timeout};
use embedded_io_async::{ErrorType, Read, Write};

use rust_mqtt::client::client::MqttClient;
use rust_mqtt::client::client_config::{ClientConfig, MqttVersion};
use rust_mqtt::packet::v5::publish_packet::QualityOfService;
use rust_mqtt::utils::rng_generator::CountingRng;
use rust_mqtt::utils::types::EncodedString;

use crate::config::*;
use crate::{InboundUpdate, StatusMessage, StatusReceiver, UpdateSender};

/// MQTT Task - läuft parallel zu anderen Tasks
///
/// Dieser Task übernimmt die komplette Broker-Kommunikation:
/// - Wartet auf Netzwerk-Verbindung
/// - Verbindet sich mit dem MQTT Broker und abonniert die Gauge-Kanäle
/// - Leitet eingehende Nachrichten an den Display Task weiter
/// - Published Temperatur-Meldungen des Display Tasks (retained)
/// - Automatisches Reconnect bei Fehlern
///
/// # Parameter
/// - `stack`: embassy-net Stack für Netzwerk-Zugriff
/// - `update_sender`: Channel zum Display Task
/// - `status_receiver`: Channel vom Display Task
#[embassy_executor::task]
pub async fn mqtt_task(
    stack: &'static Stack<'static>,
    update_sender: UpdateSender,
    status_receiver: StatusReceiver,
) {
    info!("MQTT: Task started, waiting for network...");
    wait_for_network(stack).await;
    info!("MQTT: Network ready");

    loop {
        match mqtt_session(stack, &update_sender, &status_receiver).await {
            Ok(_) => warn!("MQTT: Connection closed normally"),
            Err(e) => error!("MQTT: Error: {}", e),
        }
        info!("MQTT: Reconnecting in {}s...", MQTT_RECONNECT_DELAY_SECS);
        Timer::after(Duration::from_secs(MQTT_RECONNECT_DELAY_SECS)).await;
    }
}

/// Wartet bis Netzwerk-Verbindung verfügbar ist
///
/// Prüft kontinuierlich Link-Status und DHCP-Konfiguration.
async fn wait_for_network(stack: &'static Stack<'static>) {
    loop {
        if stack.is_link_up() && stack.config_v4().is_some() {
            break;
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}

/// Ereignis einer Runde der Session-Schleife
enum SessionEvent {
    Readable,
    Status(StatusMessage),
    KeepAlive,
}

/// Transport des MQTT-Clients über einen geteilten TCP-Socket
///
/// Die Session-Schleife wartet selbst auf eingehende Daten und startet
/// `receive_message` erst dann. Ein Paket wird so nie mitten im Lesen
/// abgebrochen.
struct SharedSocket<'a, 'b> {
    socket: &'a RefCell<TcpSocket<'b>>,
}

impl ErrorType for SharedSocket<'_, '_> {
    type Error = embassy_net::tcp::Error;
}

// Client und Readiness-Warten werden nie gleichzeitig gepollt
#[allow(clippy::await_holding_refcell_ref)]
impl Read for SharedSocket<'_, '_> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.socket.borrow_mut().read(buf).await
    }
}

#[allow(clippy::await_holding_refcell_ref)]
impl Write for SharedSocket<'_, '_> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.socket.borrow_mut().write(buf).await
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.socket.borrow_mut().flush().await
    }
}

/// Wartet, bis der Socket Daten hat oder geschlossen wurde
#[allow(clippy::await_holding_refcell_ref)]
async fn wait_readable(socket: &RefCell<TcpSocket<'_>>) {
    socket.borrow().wait_read_ready().await
}

/// Verbindet mit MQTT Broker und bedient die Session
///
/// Diese Funktion übernimmt den kompletten MQTT-Lifecycle:
/// 1. DNS-Auflösung des Broker-Hostnames
/// 2. TCP-Verbindung aufbauen
/// 3. MQTT CONNECT senden und Gauge-Kanäle abonnieren
/// 4. Nachrichten empfangen, Status publishen, Keep-Alive pingen
///
/// Bei jedem Fehler wird die Funktion beendet und der Haupt-Loop
/// startet automatisch einen Reconnect-Versuch.
async fn mqtt_session(
    stack: &'static Stack<'static>,
    update_sender: &UpdateSender,
    status_receiver: &StatusReceiver,
) -> Result<(), MqttError> {
    // DNS Lookup
    info!("MQTT: Resolving '{}'...", MQTT_BROKER);
    let broker_ip = resolve_hostname(stack, MQTT_BROKER).await?;
    info!("MQTT: Resolved to {}", Debug2Format(&broker_ip));

    // TCP Connect
    let mut rx_buffer = [0u8; TCP_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_BUFFER_SIZE];
    let mut socket = TcpSocket::new(*stack, &mut rx_buffer, &mut tx_buffer);
    socket.set_timeout(Some(Duration::from_secs(
        u64::from(MQTT_KEEP_ALIVE_SECS) * 2,
    )));

    socket
        .connect((broker_ip, MQTT_PORT))
        .await
        .map_err(|_| MqttError::ConnectionFailed)?;
    info!("MQTT: TCP connected");
    let socket = RefCell::new(socket);

    // MQTT Client Configuration
    let rng = CountingRng(20000);
    let mut config = ClientConfig::<5, _>::new(MqttVersion::MQTTv5, rng);
    config.client_id = EncodedString {
        string: MQTT_CLIENT_ID,
        len: MQTT_CLIENT_ID.len() as u16,
    };
    config.keep_alive = MQTT_KEEP_ALIVE_SECS;
    config.max_packet_size = MQTT_BUFFER_SIZE as u32;
    if let Some(username) = MQTT_USERNAME {
        config.add_username(username);
    }
    if let Some(password) = MQTT_PASSWORD {
        config.add_password(password);
    }

    // MQTT Buffer
    let mut send_buffer = [0u8; MQTT_BUFFER_SIZE];
    let mut recv_buffer = [0u8; MQTT_BUFFER_SIZE];

    // MQTT Client erstellen
    let mut client = MqttClient::<_, 5, _>::new(
        SharedSocket { socket: &socket },
        &mut send_buffer,
        MQTT_BUFFER_SIZE,
        &mut recv_buffer,
        MQTT_BUFFER_SIZE,
        config,
    );

    // MQTT CONNECT
    client
        .connect_to_broker()
        .await
        .map_err(|_| MqttError::ProtocolError)?;
    info!("MQTT: Connected to broker");

    // Abonnements nach jedem (Re-)Connect neu anlegen
    for topic in MQTT_SUBSCRIPTIONS {
        client
            .subscribe_to_topic(topic)
            .await
            .map_err(|_| MqttError::SubscribeFailed)?;
        info!("MQTT: Subscribed to '{}'", topic);
    }

    // Session-Schleife - Event-basiert
    // Wartet gleichzeitig auf Daten vom Broker, Status-Meldungen und den
    // Keep-Alive-Timer. Keep-Alive zählt nur Pakete Client → Broker.
    // `receive_message` läuft erst, wenn Daten anliegen, und dann bis zum
    // Ende des Pakets.
    let ping_interval = Duration::from_secs(MQTT_PING_INTERVAL_SECS);
    let mut last_outbound = Instant::now();
    loop {
        let event = match select3(
            wait_readable(&socket),
            status_receiver.receive(),
            Timer::at(last_outbound + ping_interval),
        )
        .await
        {
            Either3::First(()) => SessionEvent::Readable,
            Either3::Second(status) => SessionEvent::Status(status),
            Either3::Third(()) => SessionEvent::KeepAlive,
        };

        match event {
            SessionEvent::Readable => {
                // Kopie, damit der Empfangspuffer des Clients wieder frei ist
                let update = match client.receive_message().await {
                    Ok((topic, payload)) => InboundUpdate::copy_from(topic, payload),
                    Err(_) => return Err(MqttError::ReceiveFailed),
                };
                match update {
                    Some(update) => {
                        info!(
                            "MQTT: Received {} bytes on '{}'",
                            update.payload.len(),
                            update.topic.as_str()
                        );
                        // Backpressure: wartet, falls der Display Task hinterherhängt
                        update_sender.send(update).await;
                    }
                    None => warn!("MQTT: Dropping message that exceeds the transport buffer"),
                }
            }
            SessionEvent::Status(status) => {
                client
                    .send_message(
                        MQTT_TOPIC_TEMPERATURE,
                        status.as_bytes(),
                        QualityOfService::QoS0,
                        true,
                    )
                    .await
                    .map_err(|_| MqttError::PublishFailed)?;
                last_outbound = Instant::now();
            }
            SessionEvent::KeepAlive => {
                client
                    .send_ping()
                    .await
                    .map_err(|_| MqttError::ProtocolError)?;
                last_outbound = Instant::now();
            }
        }
    }
}

/// Löst Hostname zu IPv4-Adresse auf
///
/// Nutzt embassy-net DNS-Stack mit konfigurierbarem Timeout.
async fn resolve_hostname(
    stack: &'static Stack<'static>,
    hostname: &str,
) -> Result<embassy_net::Ipv4Address, MqttError> {
    let result = with_timeout(
        Duration::from_secs(DNS_TIMEOUT_SECS),
        stack.dns_query(hostname, DnsQueryType::A),
    )
    .await;

    match result {
        Ok(Ok(addrs)) => {
            for addr in addrs {
                if let IpAddress::Ipv4(ipv4) = addr {
                    return Ok(ipv4);
                }
            }
            Err(MqttError::DnsResolutionFailed)
        }
        Ok(Err(_)) => Err(MqttError::DnsResolutionFailed),
        Err(_) => Err(MqttError::DnsTimeout),
    }
}

/// MQTT Fehler-Typen
///
/// Alle möglichen Fehler die während MQTT-Operationen auftreten können.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MqttError {
    DnsResolutionFailed,
    DnsTimeout,
    ConnectionFailed,
    ProtocolError,
    SubscribeFailed,
    ReceiveFailed,
    PublishFailed,
}

impl defmt::Format for MqttError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            MqttError::DnsResolutionFailed => defmt::write!(fmt, "DNS failed"),
            MqttError::DnsTimeout => defmt::write!(fmt, "DNS timeout"),
            MqttError::ConnectionFailed => defmt::write!(fmt, "Connection failed"),
            MqttError::ProtocolError => defmt::write!(fmt, "Protocol error"),
            MqttError::SubscribeFailed => defmt::write!(fmt, "Subscribe failed"),
            MqttError::ReceiveFailed => defmt::write!(fmt, "Receive failed"),
            MqttError::PublishFailed => defmt::write!(fmt, "Publish failed"),
        }
    }
}
