// GC9A01 Display Treiber (240×240 rund, SPI) mit Framebuffer
//
// Gezeichnet wird komplett in einen statischen RGB565-Framebuffer, der pro
// Frame in einem Rutsch übertragen wird. Dadurch ist nie ein halb
// gezeichneter Frame sichtbar (clear → draw → present).
//
// Die Übertragung läuft per DMA und wird awaited, WiFi und MQTT laufen
// währenddessen auf demselben Executor weiter.

use core::convert::Infallible;

use embassy_time::Timer;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use esp_hal::Async;
use esp_hal::gpio::{DriveMode, Output};
use esp_hal::ledc::{
    LSGlobalClkSource, Ledc, LowSpeed,
    channel::{self as ledc_channel, ChannelIFace as _},
    timer::{self as ledc_timer, TimerIFace as _},
};
use esp_hal::spi::master::SpiDmaBus;
use esp_hal::time::Rate;
use static_cell::{ConstStaticCell, StaticCell};

use esp_core::{DisplayError, Frame, FramePresenter};

use crate::config::BACKLIGHT_PWM_KHZ;

/// Panel-Abmessungen
pub const WIDTH: usize = 240;
pub const HEIGHT: usize = 240;
const BUFFER_SIZE: usize = WIDTH * HEIGHT * 2;

/// Statischer Framebuffer (115.200 Bytes), liegt nicht auf dem Stack
static FRAMEBUFFER: ConstStaticCell<[u8; BUFFER_SIZE]> = ConstStaticCell::new([0; BUFFER_SIZE]);

// LEDC-Treiber und Timer müssen 'static sein, weil der Kanal sie referenziert
static LEDC: StaticCell<Ledc<'static>> = StaticCell::new();
static BACKLIGHT_TIMER: StaticCell<ledc_timer::Timer<'static, LowSpeed>> = StaticCell::new();

// GC9A01 Kommandos
const SLPOUT: u8 = 0x11;
const DISPON: u8 = 0x29;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;

/// Herstellerspezifische Init-Sequenz (Kommando, Daten)
const INIT_SEQUENCE: &[(u8, &[u8])] = &[
    (0xEF, &[]),
    (0xEB, &[0x14]),
    (0xFE, &[]),
    (0xEF, &[]),
    (0xEB, &[0x14]),
    (0x84, &[0x40]),
    (0x85, &[0xFF]),
    (0x86, &[0xFF]),
    (0x87, &[0xFF]),
    (0x88, &[0x0A]),
    (0x89, &[0x21]),
    (0x8A, &[0x00]),
    (0x8B, &[0x80]),
    (0x8C, &[0x01]),
    (0x8D, &[0x01]),
    (0x8E, &[0xFF]),
    (0x8F, &[0xFF]),
    (0xB6, &[0x00, 0x20]),
    // MADCTL: BGR-Reihenfolge, Ursprung oben links
    (0x36, &[0x48]),
    // COLMOD: 16 Bit pro Pixel
    (0x3A, &[0x05]),
    (0x90, &[0x08, 0x08, 0x08, 0x08]),
    (0xBD, &[0x06]),
    (0xBC, &[0x00]),
    (0xFF, &[0x60, 0x01, 0x04]),
    (0xC3, &[0x13]),
    (0xC4, &[0x13]),
    (0xC9, &[0x22]),
    (0xBE, &[0x11]),
    (0xE1, &[0x10, 0x0E]),
    (0xDF, &[0x21, 0x0C, 0x02]),
    (0xF0, &[0x45, 0x09, 0x08, 0x08, 0x26, 0x2A]),
    (0xF1, &[0x43, 0x70, 0x72, 0x36, 0x37, 0x6F]),
    (0xF2, &[0x45, 0x09, 0x08, 0x08, 0x26, 0x2A]),
    (0xF3, &[0x43, 0x70, 0x72, 0x36, 0x37, 0x6F]),
    (0xED, &[0x1B, 0x0B]),
    (0xAE, &[0x77]),
    (0xCD, &[0x63]),
    (0x70, &[0x07, 0x07, 0x04, 0x0E, 0x0F, 0x09, 0x07, 0x08, 0x03]),
    (0xE8, &[0x34]),
    (
        0x62,
        &[0x18, 0x0D, 0x71, 0xED, 0x70, 0x70, 0x18, 0x0F, 0x71, 0xEF, 0x70, 0x70],
    ),
    (
        0x63,
        &[0x18, 0x11, 0x71, 0xF1, 0x70, 0x70, 0x18, 0x13, 0x71, 0xF3, 0x70, 0x70],
    ),
    (0x64, &[0x28, 0x29, 0xF1, 0x01, 0xF1, 0x00, 0x07]),
    (0x66, &[0x3C, 0x00, 0xCD, 0x67, 0x45, 0x45, 0x10, 0x00, 0x00, 0x00]),
    (0x67, &[0x00, 0x3C, 0x00, 0x00, 0x00, 0x01, 0x54, 0x10, 0x32, 0x98]),
    (0x74, &[0x10, 0x85, 0x80, 0x00, 0x00, 0x4E, 0x00]),
    (0x98, &[0x3E, 0x07]),
    // Tearing-Effekt an, Farben invertieren (Panel ist normally-black)
    (0x35, &[]),
    (0x21, &[]),
];

// ============================================================================
// Framebuffer
// ============================================================================

/// RGB565 Framebuffer, big-endian wie vom Panel erwartet
pub struct Framebuffer {
    buf: &'static mut [u8; BUFFER_SIZE],
}

impl Framebuffer {
    /// Übernimmt den statischen Puffer (nur einmal möglich)
    pub fn take() -> Self {
        Self {
            buf: FRAMEBUFFER.take(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_slice()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
                continue;
            };
            if x >= WIDTH || y >= HEIGHT {
                continue;
            }
            let idx = (y * WIDTH + x) * 2;
            self.buf[idx..idx + 2].copy_from_slice(&color.into_storage().to_be_bytes());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let [hi, lo] = color.into_storage().to_be_bytes();
        for px in self.buf.chunks_exact_mut(2) {
            px[0] = hi;
            px[1] = lo;
        }
        Ok(())
    }
}

// ============================================================================
// Hintergrundbeleuchtung (LEDC PWM)
// ============================================================================

/// PWM-gesteuerte Hintergrundbeleuchtung
pub struct Backlight {
    channel: ledc_channel::Channel<'static, LowSpeed>,
    duty_pct: u8,
}

impl Backlight {
    /// Konfiguriert LEDC Timer0/Channel0 auf dem Backlight-Pin
    pub fn new(
        ledc: esp_hal::peripherals::LEDC<'static>,
        pin: esp_hal::peripherals::GPIO5<'static>,
        initial_pct: u8,
    ) -> Result<Self, DisplayError> {
        let ledc = LEDC.init(Ledc::new(ledc));
        ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);

        let mut timer = ledc.timer::<LowSpeed>(ledc_timer::Number::Timer0);
        timer
            .configure(ledc_timer::config::Config {
                duty: ledc_timer::config::Duty::Duty10Bit,
                clock_source: ledc_timer::LSClockSource::APBClk,
                frequency: Rate::from_khz(BACKLIGHT_PWM_KHZ),
            })
            .map_err(|_| DisplayError::WriteFailed)?;
        let timer = BACKLIGHT_TIMER.init(timer);

        let mut channel = ledc.channel::<LowSpeed>(ledc_channel::Number::Channel0, pin);
        let duty_pct = initial_pct.min(100);
        channel
            .configure(ledc_channel::config::Config {
                timer: &*timer,
                duty_pct,
                drive_mode: DriveMode::PushPull,
            })
            .map_err(|_| DisplayError::WriteFailed)?;

        Ok(Self { channel, duty_pct })
    }

    /// Setzt die Helligkeit in Prozent, nur bei Änderung
    pub fn set_brightness(&mut self, pct: u8) -> Result<(), DisplayError> {
        let pct = pct.min(100);
        if pct == self.duty_pct {
            return Ok(());
        }
        self.channel
            .set_duty(pct)
            .map_err(|_| DisplayError::WriteFailed)?;
        self.duty_pct = pct;
        Ok(())
    }
}

// ============================================================================
// Panel
// ============================================================================

/// SPI-Bus (DMA) mit Steuerleitungen
struct Gc9a01Bus<'d> {
    spi: SpiDmaBus<'d, Async>,
    dc: Output<'d>,
    cs: Output<'d>,
}

impl Gc9a01Bus<'_> {
    /// Sendet ein Kommando mit optionalen Daten (CS umschließt beides)
    async fn write_command(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.cs.set_low();
        let result = self.transfer(command, data).await;
        self.cs.set_high();
        result
    }

    async fn transfer(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_low();
        self.spi
            .write_async(&[command])
            .await
            .map_err(|_| DisplayError::WriteFailed)?;
        if !data.is_empty() {
            self.dc.set_high();
            self.spi
                .write_async(data)
                .await
                .map_err(|_| DisplayError::WriteFailed)?;
        }
        Ok(())
    }
}

/// GC9A01 Panel mit Framebuffer und Hintergrundbeleuchtung
pub struct Gc9a01Display<'d> {
    bus: Gc9a01Bus<'d>,
    rst: Output<'d>,
    framebuffer: Framebuffer,
    backlight: Backlight,
}

impl<'d> Gc9a01Display<'d> {
    pub fn new(
        spi: SpiDmaBus<'d, Async>,
        dc: Output<'d>,
        cs: Output<'d>,
        rst: Output<'d>,
        framebuffer: Framebuffer,
        backlight: Backlight,
    ) -> Self {
        Self {
            bus: Gc9a01Bus { spi, dc, cs },
            rst,
            framebuffer,
            backlight,
        }
    }

    /// Hardware-Reset und Init-Sequenz
    pub async fn init(&mut self) -> Result<(), DisplayError> {
        self.rst.set_low();
        Timer::after_millis(10).await;
        self.rst.set_high();
        Timer::after_millis(120).await;

        for (command, data) in INIT_SEQUENCE {
            self.bus.write_command(*command, data).await?;
        }

        self.bus.write_command(SLPOUT, &[]).await?;
        Timer::after_millis(120).await;
        self.bus.write_command(DISPON, &[]).await?;
        Timer::after_millis(20).await;

        // Schwarzer Frame statt RAM-Inhalt nach dem Einschalten
        let Ok(()) = self.framebuffer.clear(Rgb565::BLACK);
        self.flush().await
    }

    /// Überträgt den kompletten Framebuffer
    async fn flush(&mut self) -> Result<(), DisplayError> {
        let last_col = (WIDTH - 1) as u16;
        let last_row = (HEIGHT - 1) as u16;
        let [col_hi, col_lo] = last_col.to_be_bytes();
        let [row_hi, row_lo] = last_row.to_be_bytes();

        self.bus.write_command(CASET, &[0, 0, col_hi, col_lo]).await?;
        self.bus.write_command(RASET, &[0, 0, row_hi, row_lo]).await?;
        self.bus
            .write_command(RAMWR, self.framebuffer.as_bytes())
            .await
    }
}

impl FramePresenter for Gc9a01Display<'_> {
    async fn present(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        let Ok(()) = frame.draw(&mut self.framebuffer);
        self.flush().await?;
        self.backlight.set_brightness(frame.backlight_pct)
    }
}
