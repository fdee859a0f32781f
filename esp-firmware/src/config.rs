// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen
#![allow(dead_code)]

// ============================================================================
// Display Konfiguration (GC9A01, 240×240 rund)
// ============================================================================

/// SPI-Takt für das Panel in MHz
/// Der GC9A01 verträgt bis zu 80 MHz, 40 MHz läuft auch mit fliegender Verdrahtung
pub const DISPLAY_SPI_MHZ: u32 = 40;

/// DMA-Puffer für die Panel-Übertragung in Bytes
/// Der Framebuffer wird in Blöcken dieser Größe übertragen
pub const DISPLAY_DMA_BUFFER_SIZE: usize = 4096;

/// GPIO-Pins des Panels (Dokumentation, die Zuordnung passiert in main.rs)
pub const DISPLAY_SCLK_GPIO: u8 = 6;
pub const DISPLAY_MOSI_GPIO: u8 = 7;
pub const DISPLAY_CS_GPIO: u8 = 10;
pub const DISPLAY_DC_GPIO: u8 = 11;
pub const DISPLAY_RST_GPIO: u8 = 1;
pub const DISPLAY_BACKLIGHT_GPIO: u8 = 5;

/// PWM-Frequenz der Hintergrundbeleuchtung in kHz
pub const BACKLIGHT_PWM_KHZ: u32 = 20;

// ============================================================================
// Sensor Konfiguration (AHT10)
// ============================================================================

/// GPIO-Pins des I²C-Busses
pub const SENSOR_SDA_GPIO: u8 = 22;
pub const SENSOR_SCL_GPIO: u8 = 23;

/// I²C-Takt in kHz
pub const SENSOR_I2C_KHZ: u32 = 100;

/// Abtastintervall in Millisekunden
/// Gleichzeitig das Intervall der Status-Publishes und des Werte-Logs
pub const SENSOR_INTERVAL_MS: u64 = 1000;

// ============================================================================
// Gauge Loop
// ============================================================================

/// Abstand zwischen zwei Frames in Millisekunden (~33 FPS)
pub const FRAME_INTERVAL_MS: u64 = 30;

/// Kapazität der Update-Queue (MQTT Task → Display Task)
/// Ist sie voll, wartet der MQTT Task bis der Display Task aufgeholt hat
pub const UPDATE_QUEUE_DEPTH: usize = 4;

/// Kapazität der Status-Queue (Display Task → MQTT Task)
pub const STATUS_QUEUE_DEPTH: usize = 2;

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Wartezeit nach einem fehlgeschlagenen Verbindungsversuch
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

// Gesamt-Heap: ~100 KB für WiFi-Stack, der Framebuffer liegt statisch daneben

// ============================================================================
// MQTT Konfiguration
// ============================================================================

/// MQTT Broker Hostname oder IP-Adresse
/// Wird zur Build-Zeit aus der Environment Variable MQTT_BROKER geladen
pub const MQTT_BROKER: &str = env!(
    "MQTT_BROKER",
    "MQTT Broker nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// MQTT Broker Port
/// Standard: 1883 (unverschlüsselt), 8883 (TLS)
pub const MQTT_PORT: u16 = 1883;

/// MQTT Client ID
/// Eindeutige Kennung für dieses Display
pub const MQTT_CLIENT_ID: &str = env!(
    "MQTT_CLIENT_ID",
    "MQTT Client ID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Optionale Zugangsdaten (leer = anonym)
pub const MQTT_USERNAME: Option<&str> = option_env!("MQTT_USERNAME");
pub const MQTT_PASSWORD: Option<&str> = option_env!("MQTT_PASSWORD");

/// Gemeinsamer Topic-Präfix aller Kanäle, z.B. "ha_display"
pub const MQTT_TOPIC_PREFIX: &str = env!(
    "MQTT_TOPIC_PREFIX",
    "MQTT Topic Prefix nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Eingehende Gauge-Kanäle
pub const MQTT_TOPIC_ARC1: &str = concat!(env!("MQTT_TOPIC_PREFIX"), "/arc1");
pub const MQTT_TOPIC_ARC2: &str = concat!(env!("MQTT_TOPIC_PREFIX"), "/arc2");
pub const MQTT_TOPIC_ARC3: &str = concat!(env!("MQTT_TOPIC_PREFIX"), "/arc3");
pub const MQTT_TOPIC_DIAL: &str = concat!(env!("MQTT_TOPIC_PREFIX"), "/dial");

/// Alle Abonnements, in dieser Reihenfolge beim (Re-)Connect
pub const MQTT_SUBSCRIPTIONS: [&str; 4] = [
    MQTT_TOPIC_ARC1,
    MQTT_TOPIC_ARC2,
    MQTT_TOPIC_ARC3,
    MQTT_TOPIC_DIAL,
];

/// Ausgehender Temperatur-Status (retained)
pub const MQTT_TOPIC_TEMPERATURE: &str = concat!(env!("MQTT_TOPIC_PREFIX"), "/temperature");

/// MQTT Keep-Alive in Sekunden
pub const MQTT_KEEP_ALIVE_SECS: u16 = 30;

/// Ping-Intervall: deutlich unter dem Keep-Alive
pub const MQTT_PING_INTERVAL_SECS: u64 = 20;

/// MQTT Reconnect Delay in Sekunden
/// Wartezeit nach Verbindungsfehler vor erneutem Versuch
pub const MQTT_RECONNECT_DELAY_SECS: u64 = 5;

/// MQTT Buffer-Größe in Bytes
/// Muss groß genug für das größte Gauge-Update sein (Payload max. 256 Bytes)
pub const MQTT_BUFFER_SIZE: usize = 1024;

/// TCP Socket-Puffer in Bytes
pub const TCP_BUFFER_SIZE: usize = 4096;

/// DNS Query Timeout in Sekunden
pub const DNS_TIMEOUT_SECS: u64 = 10;
