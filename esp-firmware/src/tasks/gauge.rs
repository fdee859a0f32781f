// Gauge Display Task - Animiert drei Ringe + Zeiger auf dem GC9A01
use defmt::{error, info, warn};
use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Instant, Ticker};
use esp_hal::dma::{DmaRxBuf, DmaTxBuf};
use esp_hal::dma_buffers;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::i2c::master::{Config as I2cConfig, I2c};
use esp_hal::spi::Mode;
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use esp_hal::time::Rate;

use esp_core::{ambient_brightness, render_frame, route_message};

use crate::config::{
    DISPLAY_DMA_BUFFER_SIZE, DISPLAY_SPI_MHZ, FRAME_INTERVAL_MS, MQTT_TOPIC_PREFIX, SENSOR_I2C_KHZ, SENSOR_INTERVAL_MS,
};
use crate::hal::{Aht10Sensor, Backlight, Framebuffer, Gc9a01Display};
use crate::{
    ClimateSensor, DisplayState, FramePresenter, SensorError, StatusMessage, StatusSender,
    UpdateReceiver,
};

/// Peripherie für Display, Backlight und Sensor
///
/// Wird in main.rs aus den Peripherals zusammengestellt und an den Task
/// übergeben, der daraus die Treiber baut.
pub struct GaugePeripherals {
    pub spi: esp_hal::peripherals::SPI2<'static>,
    pub dma: esp_hal::peripherals::DMA_CH0<'static>,
    pub sclk: esp_hal::peripherals::GPIO6<'static>,
    pub mosi: esp_hal::peripherals::GPIO7<'static>,
    pub cs: esp_hal::peripherals::GPIO10<'static>,
    pub dc: esp_hal::peripherals::GPIO11<'static>,
    pub rst: esp_hal::peripherals::GPIO1<'static>,
    pub backlight: esp_hal::peripherals::GPIO5<'static>,
    pub ledc: esp_hal::peripherals::LEDC<'static>,
    pub i2c: esp_hal::peripherals::I2C0<'static>,
    pub sda: esp_hal::peripherals::GPIO22<'static>,
    pub scl: esp_hal::peripherals::GPIO23<'static>,
}

/// Gauge Display Logic - Testbare Business Logic ohne Hardware-Abhängigkeit
///
/// Ein einziger Kontroll-Loop besitzt den kompletten `DisplayState`:
/// - Eingehende MQTT-Updates werden sofort geroutet und angewendet
/// - Alle `FRAME_INTERVAL_MS` wird ein Frame gerendert
/// - Alle `SENSOR_INTERVAL_MS` wird der Sensor gelesen und die Temperatur
///   an den MQTT Task gemeldet
///
/// # Trait-basierte Abstraktion
/// - `P: FramePresenter`: Gc9a01Display oder MockPresenter
/// - `S: ClimateSensor`: Aht10Sensor oder MockSensor
pub async fn gauge_display_logic<P: FramePresenter, S: ClimateSensor>(
    mut presenter: P,
    mut sensor: S,
    update_receiver: UpdateReceiver,
    status_sender: StatusSender,
) {
    let mut state = DisplayState::new();
    let mut temperature_c: Option<f32> = None;

    let mut ticker = Ticker::every(Duration::from_millis(FRAME_INTERVAL_MS));
    let mut next_sample = Instant::now();

    info!("Gauge: Display loop started");

    loop {
        match select(update_receiver.receive(), ticker.next()).await {
            Either::First(update) => {
                let now_ms = Instant::now().as_millis();
                match route_message(
                    &mut state,
                    MQTT_TOPIC_PREFIX,
                    update.topic.as_str(),
                    &update.payload,
                    now_ms,
                ) {
                    Some(routed) => info!(
                        "Gauge: {} updated from {} payload",
                        routed.slot, routed.kind
                    ),
                    None => warn!("Gauge: Ignoring topic '{}'", update.topic.as_str()),
                }
            }
            Either::Second(()) => {
                let now = Instant::now();

                if now >= next_sample {
                    next_sample = now + Duration::from_millis(SENSOR_INTERVAL_MS);
                    sample_sensor(&mut sensor, &mut temperature_c, &status_sender);
                    log_values(&state, temperature_c);
                }

                if let Err(e) =
                    render_frame(&mut state, &mut presenter, now.as_millis(), temperature_c).await
                {
                    error!("Gauge: Failed to present frame: {}", e);
                }
            }
        }
    }
}

/// Liest den Sensor und meldet die Temperatur an den MQTT Task
///
/// Bei Fehlern bleibt der letzte gültige Wert stehen.
fn sample_sensor<S: ClimateSensor>(
    sensor: &mut S,
    temperature_c: &mut Option<f32>,
    status_sender: &StatusSender,
) {
    match sensor.read() {
        Ok(sample) => {
            *temperature_c = Some(sample.temperature_c);
            if status_sender
                .try_send(StatusMessage::temperature(sample.temperature_c))
                .is_err()
            {
                warn!("Gauge: Status queue full, dropping temperature");
            }
        }
        // Erste Abtastung nach dem Anstoßen, kein Fehler
        Err(SensorError::Busy) => {}
        Err(e) => warn!("Gauge: Sensor read failed: {}", e),
    }
}

fn log_values(state: &DisplayState, temperature_c: Option<f32>) {
    let [arc1, arc2, arc3] = state.arcs();
    info!(
        "Gauge: T={} dial={} arcs=[{}, {}, {}]",
        temperature_c,
        state.dial().display(),
        arc1.display(),
        arc2.display(),
        arc3.display()
    );
}

/// Gauge Display Task - Embassy Task für parallele Ausführung
///
/// Dieser Task übernimmt die Hardware-Initialisierung (SPI-Panel mit DMA,
/// LEDC, I²C-Sensor) und ruft dann die testbare `gauge_display_logic()` auf.
#[embassy_executor::task]
pub async fn gauge_display_task(
    peripherals: GaugePeripherals,
    update_receiver: UpdateReceiver,
    status_sender: StatusSender,
) {
    // Display: SPI Mode 0, nur MOSI (Panel wird nie gelesen), Transfer per DMA
    let (rx_buffer, rx_descriptors, tx_buffer, tx_descriptors) =
        dma_buffers!(DISPLAY_DMA_BUFFER_SIZE);
    let dma_rx_buf =
        DmaRxBuf::new(rx_descriptors, rx_buffer).expect("Failed to create DMA RX buffer");
    let dma_tx_buf =
        DmaTxBuf::new(tx_descriptors, tx_buffer).expect("Failed to create DMA TX buffer");

    let spi = Spi::new(
        peripherals.spi,
        SpiConfig::default()
            .with_frequency(Rate::from_mhz(DISPLAY_SPI_MHZ))
            .with_mode(Mode::_0),
    )
    .expect("Failed to initialize SPI")
    .with_sck(peripherals.sclk)
    .with_mosi(peripherals.mosi)
    .with_dma(peripherals.dma)
    .with_buffers(dma_rx_buf, dma_tx_buf)
    .into_async();

    let cs = Output::new(peripherals.cs, Level::High, OutputConfig::default());
    let dc = Output::new(peripherals.dc, Level::High, OutputConfig::default());
    let rst = Output::new(peripherals.rst, Level::High, OutputConfig::default());

    let backlight = Backlight::new(peripherals.ledc, peripherals.backlight, ambient_brightness(0))
        .expect("Failed to initialize backlight");

    let mut display = Gc9a01Display::new(spi, dc, cs, rst, Framebuffer::take(), backlight);
    match display.init().await {
        Ok(()) => info!("Gauge: Display initialized"),
        Err(e) => error!("Gauge: Display init failed: {}", e),
    }

    // Sensor: AHT10 auf I2C0
    let i2c = I2c::new(
        peripherals.i2c,
        I2cConfig::default().with_frequency(Rate::from_khz(SENSOR_I2C_KHZ)),
    )
    .expect("Failed to initialize I2C")
    .with_sda(peripherals.sda)
    .with_scl(peripherals.scl);

    let mut sensor = Aht10Sensor::new(i2c);
    match sensor.init().await {
        Ok(()) => info!("Gauge: Sensor initialized"),
        // Nicht fatal: read() versucht es bei jeder Abtastung erneut
        Err(e) => warn!("Gauge: Sensor init failed: {}", e),
    }

    gauge_display_logic(display, sensor, update_receiver, status_sender).await;
}
