// Keine Standard-Bibliothek verwenden (Embedded System)
#![no_std]
// Kein normaler main() Einstiegspunkt (wird von esp_rtos bereitgestellt)
#![no_main]
// Verbiete mem::forget - gefährlich bei ESP HAL Types mit DMA-Buffern
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
// Verbiete große Stack-Frames (Stack ist auf Embedded Systemen begrenzt)
#![deny(clippy::large_stack_frames)]

// Heap Allocator (WiFi benötigt dynamischen Speicher)
extern crate alloc;

// Embassy Async Runtime
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Stack, StackResources};
use embassy_time::{Duration, Timer};

// ESP32-C6 HAL
use esp_hal::clock::CpuClock;
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;

// Backtrace bei Panic und println!() Support
use {esp_backtrace as _, esp_println as _};

// Logging
use defmt::info;

// Projekt-Module und Konfiguration
use esp_gauge_display::config::{
    DISPLAY_BACKLIGHT_GPIO, DISPLAY_CS_GPIO, DISPLAY_DC_GPIO, DISPLAY_MOSI_GPIO, DISPLAY_RST_GPIO,
    DISPLAY_SCLK_GPIO, EXTRA_HEAP_SIZE, MQTT_TOPIC_PREFIX, SENSOR_SCL_GPIO, SENSOR_SDA_GPIO,
    WIFI_HEAP_SIZE,
};
use esp_gauge_display::tasks::{
    GaugePeripherals, connection_task, dhcp_task, gauge_display_task, mqtt_task, net_task,
};
use esp_gauge_display::{StatusChannel, UpdateChannel};

// ESP-IDF App Descriptor - erforderlich für den Bootloader!
// Ohne diesen schlägt das Flashen mit "ESP-IDF App Descriptor missing" fehl
esp_bootloader_esp_idf::esp_app_desc!();

/// Main Entry Point
///
/// Initialisiert Hardware, WiFi, startet Embassy Runtime und spawnt Tasks.
/// Danach schläft main() - alle Arbeit läuft in Tasks.
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    // ESP32-C6 Konfiguration: CPU auf maximale Taktfrequenz (160 MHz)
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // Heap Allocator initialisieren (WiFi braucht dynamischen Speicher!)
    // Zwei Bereiche: reclaimed RAM (64 KB) + extra (36 KB) = 100 KB total
    esp_alloc::heap_allocator!(
        #[esp_hal::ram(reclaimed)]
        size: WIFI_HEAP_SIZE
    );
    esp_alloc::heap_allocator!(size: EXTRA_HEAP_SIZE);

    // Embassy Runtime initialisieren (Timer + Software Interrupt)
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let sw_interrupt =
        esp_hal::interrupt::software::SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    esp_rtos::start(timg0.timer0, sw_interrupt.software_interrupt0);

    info!(
        "Boot: Gauge display on '{}/*' (SCLK={} MOSI={} CS={} DC={} RST={} BL={} SDA={} SCL={})",
        MQTT_TOPIC_PREFIX,
        DISPLAY_SCLK_GPIO,
        DISPLAY_MOSI_GPIO,
        DISPLAY_CS_GPIO,
        DISPLAY_DC_GPIO,
        DISPLAY_RST_GPIO,
        DISPLAY_BACKLIGHT_GPIO,
        SENSOR_SDA_GPIO,
        SENSOR_SCL_GPIO
    );

    // WiFi Hardware initialisieren
    static RADIO_INIT: static_cell::StaticCell<esp_radio::Controller> =
        static_cell::StaticCell::new();
    let radio_init =
        RADIO_INIT.init(esp_radio::init().expect("Failed to initialize Wi-Fi/BLE controller"));

    let (wifi_controller, wifi_interface) =
        esp_radio::wifi::new(radio_init, peripherals.WIFI, Default::default())
            .expect("Failed to initialize Wi-Fi");

    // Netzwerk-Stack erstellen
    // Random seed für TCP/IP Stack (von Hardware RNG)
    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    // Static resources für embassy-net
    // 3 Sockets: MQTT-TCP + DNS + Reserve
    static RESOURCES: static_cell::StaticCell<StackResources<3>> = static_cell::StaticCell::new();
    let resources = RESOURCES.init(StackResources::new());

    // embassy-net erstellt Stack + Runner (nutzt STA interface für Client-Modus)
    let (stack, runner) = embassy_net::new(
        wifi_interface.sta,
        NetConfig::dhcpv4(Default::default()),
        resources,
        seed,
    );

    // Stack muss 'static sein für Tasks
    static STACK: static_cell::StaticCell<Stack<'static>> = static_cell::StaticCell::new();
    let stack = &*STACK.init(stack);

    // Update-Channel (MQTT → Display): eingehende Gauge-Nachrichten
    static UPDATE_CHANNEL: static_cell::StaticCell<UpdateChannel> = static_cell::StaticCell::new();
    let update_channel = &*UPDATE_CHANNEL.init(UpdateChannel::new());

    // Status-Channel (Display → MQTT): Temperatur-Meldungen
    static STATUS_CHANNEL: static_cell::StaticCell<StatusChannel> = static_cell::StaticCell::new();
    let status_channel = &*STATUS_CHANNEL.init(StatusChannel::new());

    // Spawn Gauge Display Task (besitzt Display, Backlight, Sensor und DisplayState)
    let gauge_peripherals = GaugePeripherals {
        spi: peripherals.SPI2,
        dma: peripherals.DMA_CH0,
        sclk: peripherals.GPIO6,
        mosi: peripherals.GPIO7,
        cs: peripherals.GPIO10,
        dc: peripherals.GPIO11,
        rst: peripherals.GPIO1,
        backlight: peripherals.GPIO5,
        ledc: peripherals.LEDC,
        i2c: peripherals.I2C0,
        sda: peripherals.GPIO22,
        scl: peripherals.GPIO23,
    };
    spawner
        .spawn(gauge_display_task(
            gauge_peripherals,
            update_channel.receiver(),
            status_channel.sender(),
        ))
        .unwrap();

    // Spawn WiFi Tasks
    spawner.spawn(connection_task(wifi_controller)).unwrap();
    spawner.spawn(net_task(runner)).unwrap();
    spawner.spawn(dhcp_task(stack)).unwrap();

    // Spawn MQTT Task (Updates rein, Status raus)
    spawner
        .spawn(mqtt_task(
            stack,
            update_channel.sender(),
            status_channel.receiver(),
        ))
        .unwrap();

    // Main-Loop: schläft (alle Arbeit läuft in Tasks)
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
