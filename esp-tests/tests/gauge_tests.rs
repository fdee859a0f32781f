//! Integration Tests für die Gauge-Logik
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen MockPresenter / MockSensor

use embassy_futures::block_on;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::RgbColor;
use esp_core::geometry::{ARC_START_DEG, RADIUS};
use esp_core::{
    ClimateSample, ClimateSensor, DisplayError, DisplayState, Frame, FramePresenter, GaugeSlot,
    PayloadKind, Primitive, SensorError, StatusMessage, apply_update, decode_update, ease,
    render_frame, rgb565_to_rgb, route_message, tick,
};
use rgb::RGB8;

const PREFIX: &str = "ha_display";

// ============================================================================
// Mock Presenter
// ============================================================================

#[derive(Default)]
pub struct MockPresenter {
    pub last_frame: Option<Frame>,
    pub present_count: usize,
    pub fail_next_present: bool,
}

impl MockPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FramePresenter for MockPresenter {
    async fn present(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        if self.fail_next_present {
            self.fail_next_present = false;
            return Err(DisplayError::WriteFailed);
        }

        self.last_frame = Some(frame.clone());
        self.present_count += 1;
        Ok(())
    }
}

// ============================================================================
// Mock Sensor
// ============================================================================

#[derive(Default)]
pub struct MockSensor {
    pub temperature_c: f32,
    pub read_count: usize,
    pub fail_next_read: Option<SensorError>,
}

impl ClimateSensor for MockSensor {
    fn read(&mut self) -> Result<ClimateSample, SensorError> {
        if let Some(err) = self.fail_next_read.take() {
            return Err(err);
        }
        self.read_count += 1;
        Ok(ClimateSample {
            temperature_c: self.temperature_c,
            humidity_pct: 40.0,
        })
    }
}

/// Ein Frame-Tick, synchron ausgeführt
fn render(
    state: &mut DisplayState,
    presenter: &mut MockPresenter,
    now_ms: u64,
    temperature_c: Option<f32>,
) -> Result<(), DisplayError> {
    block_on(render_frame(state, presenter, now_ms, temperature_c))
}

fn route(state: &mut DisplayState, channel: &str, payload: &str, now_ms: u64) {
    let topic = format!("{}/{}", PREFIX, channel);
    route_message(state, PREFIX, &topic, payload.as_bytes(), now_ms);
}

fn arc_primitives(frame: &Frame) -> Vec<(u32, u32, f32, f32)> {
    frame
        .primitives
        .iter()
        .filter_map(|p| match p {
            Primitive::Arc {
                outer_radius,
                width,
                start_deg,
                end_deg,
                ..
            } => Some((*outer_radius, *width, *start_deg, *end_deg)),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Tests: MockPresenter
// ============================================================================

#[test]
fn test_mock_presenter_fail() {
    let mut state = DisplayState::new();
    let mut presenter = MockPresenter::new();
    presenter.fail_next_present = true;

    let result = render(&mut state, &mut presenter, 0, None);
    assert_eq!(result, Err(DisplayError::WriteFailed));
    assert_eq!(presenter.present_count, 0);
    assert!(presenter.last_frame.is_none());
}

#[test]
fn test_mock_presenter_recovers_after_fail() {
    let mut state = DisplayState::new();
    let mut presenter = MockPresenter::new();
    presenter.fail_next_present = true;

    assert!(render(&mut state, &mut presenter, 0, None).is_err());
    assert!(render(&mut state, &mut presenter, 30, None).is_ok());
    assert_eq!(presenter.present_count, 1);
}

#[test]
fn test_mock_sensor_feeds_frame_label() {
    let mut state = DisplayState::new();
    let mut presenter = MockPresenter::new();
    let mut sensor = MockSensor {
        temperature_c: 23.44,
        ..MockSensor::default()
    };

    let sample = sensor.read().unwrap();
    render(&mut state, &mut presenter, 0, Some(sample.temperature_c)).unwrap();

    let frame = presenter.last_frame.unwrap();
    let label = frame.primitives.iter().rev().find_map(|p| match p {
        Primitive::Label { text, .. } => Some(text.as_str().to_owned()),
        _ => None,
    });
    assert_eq!(label.as_deref(), Some("23.4C"));
    assert_eq!(StatusMessage::temperature(sample.temperature_c).as_bytes(), b"23.4C");
}

#[test]
fn test_mock_sensor_error() {
    let mut sensor = MockSensor {
        fail_next_read: Some(SensorError::Busy),
        ..MockSensor::default()
    };
    assert_eq!(sensor.read(), Err(SensorError::Busy));
    assert!(sensor.read().is_ok());
    assert_eq!(sensor.read_count, 1);
}

// ============================================================================
// Tests: Animation
// ============================================================================

#[test]
fn test_scenario_value_with_duration() {
    let mut state = DisplayState::new();
    route(&mut state, "arc1", r#"{"value":100,"animation":1000}"#, 0);

    assert_eq!(state.animation().duration_ms, 1000);
    assert!(state.animation().enabled);

    tick(&mut state, 500);
    let mid = state.arcs()[0].display();
    assert!((mid - ease(0.5) * 100.0).abs() < 0.01, "mid = {}", mid);
    assert!((mid - 50.0).abs() < 0.01);

    tick(&mut state, 1000);
    assert_eq!(state.arcs()[0].display(), 100.0);
    tick(&mut state, 1700);
    assert_eq!(state.arcs()[0].display(), 100.0);
}

#[test]
fn test_idempotent_after_convergence() {
    let mut state = DisplayState::new();
    route(&mut state, "dial", "35", 0);
    tick(&mut state, 5_000);
    let converged = state.clone();
    for now in [5_000, 5_001, 9_999, 60_000] {
        tick(&mut state, now);
        assert_eq!(state, converged);
    }
    assert_eq!(state.dial().display(), state.dial().value());
}

#[test]
fn test_disabled_animation_snaps_immediately() {
    let mut state = DisplayState::new();
    route(&mut state, "arc2", r#"{"animation":false}"#, 0);
    route(&mut state, "arc2", "64", 10);
    assert_eq!(state.arcs()[1].display(), 64.0);

    let mut state = DisplayState::new();
    route(&mut state, "arc3", r#"{"animation":0}"#, 0);
    assert!(!state.animation().enabled);
    route(&mut state, "arc3", r#"{"value":12.5}"#, 10);
    assert_eq!(state.arcs()[2].display(), 12.5);
}

#[test]
fn test_animation_policy_crosses_channels() {
    let mut state = DisplayState::new();
    // Policy kommt über den Dial-Kanal, wirkt aber auf die Ringe
    route(&mut state, "dial", r#"{"animation":2000}"#, 0);
    route(&mut state, "arc1", "100", 0);
    tick(&mut state, 1000);
    assert!((state.arcs()[0].display() - 50.0).abs() < 0.01);
}

#[test]
fn test_display_always_within_bounds() {
    let mut state = DisplayState::new();
    let updates = [
        ("arc1", r#"{"value":1e6}"#),
        ("arc2", "-9999"),
        ("arc3", r#"{"min":20,"max":40,"value":-3}"#),
        ("dial", r#"{"min":5,"max":5,"value":99}"#),
        ("arc2", r#"{"min":30,"max":10,"value":20}"#),
        ("arc1", r#"{"value":-1e6,"animation":300}"#),
    ];

    let mut now = 0;
    for (channel, payload) in updates {
        route(&mut state, channel, payload, now);
        for _ in 0..20 {
            now += 37;
            tick(&mut state, now);
            for slot in GaugeSlot::ALL {
                let gauge = state.gauge(slot);
                let display = gauge.display();
                if gauge.max() > gauge.min() {
                    assert!(
                        display >= gauge.min() && display <= gauge.max(),
                        "{:?}: {} not in [{}, {}]",
                        slot,
                        display,
                        gauge.min(),
                        gauge.max()
                    );
                } else {
                    assert_eq!(display, gauge.min(), "{:?}: degenerate range", slot);
                }
            }
        }
    }
    // min == max: Anzeige steht auf dem einzigen gültigen Wert
    assert_eq!(state.dial().display(), 5.0);
    // min > max: Anzeige bleibt auf min
    assert_eq!(state.arcs()[1].display(), 30.0);
}

// ============================================================================
// Tests: Update Merger
// ============================================================================

#[test]
fn test_partial_updates_keep_style() {
    let mut state = DisplayState::new();
    route(
        &mut state,
        "arc2",
        r##"{"min":10,"max":90,"width":5,"color":"#FF8000"}"##,
        0,
    );
    let styled = *state.gauge(GaugeSlot::Arc2);

    route(&mut state, "arc2", r#"{"value":50}"#, 100);
    route(&mut state, "arc2", r#"{"value":50}"#, 200);

    let gauge = state.gauge(GaugeSlot::Arc2);
    assert_eq!(gauge.min(), styled.min());
    assert_eq!(gauge.max(), styled.max());
    assert_eq!(gauge.width(), styled.width());
    assert_eq!(gauge.color(), styled.color());
    assert_eq!(gauge.value(), 50.0);
}

#[test]
fn test_color_quantization() {
    let mut state = DisplayState::new();
    route(&mut state, "arc1", r##"{"color":"#FF8000"}"##, 0);
    assert_eq!(
        rgb565_to_rgb(state.arcs()[0].color()),
        RGB8 {
            r: 248,
            g: 128,
            b: 0
        }
    );

    route(&mut state, "arc1", r#"{"color":"0x00ff00"}"#, 0);
    assert_eq!(state.arcs()[0].color(), Rgb565::GREEN);
}

#[test]
fn test_malformed_color_does_not_crash() {
    let mut state = DisplayState::new();
    route(&mut state, "arc3", r##"{"color":"#GG0000"}"##, 0);
    assert_eq!(state.arcs()[2].color(), Rgb565::BLACK);
}

#[test]
fn test_garbage_on_dial_targets_zero() {
    let mut state = DisplayState::new();
    route(&mut state, "dial", "40", 0);
    assert_eq!(state.dial().value(), 40.0);

    route(&mut state, "dial", "abc", 10);
    assert_eq!(state.dial().value(), 0.0);
    assert_eq!(decode_update(b"abc").kind, PayloadKind::Invalid);
}

#[test]
fn test_broken_json_falls_back_to_scalar() {
    let decoded = decode_update(br#"{"value":"#);
    assert_eq!(decoded.kind, PayloadKind::Invalid);

    let decoded = decode_update(b"17.5 W");
    assert_eq!(decoded.kind, PayloadKind::Scalar);
    assert_eq!(decoded.update.value, Some(17.5));
}

#[test]
fn test_overflowing_scalar_clamps_to_max() {
    let mut state = DisplayState::new();
    route(&mut state, "dial", r#"{"animation":false}"#, 0);

    route(&mut state, "dial", "1e39", 10);
    assert_eq!(decode_update(b"1e39").kind, PayloadKind::Scalar);
    assert_eq!(state.dial().display(), 100.0);

    route(&mut state, "dial", "-1e39", 20);
    assert_eq!(state.dial().display(), 0.0);
}

#[test]
fn test_last_write_wins() {
    let mut state = DisplayState::new();
    for v in ["10", "20", "30"] {
        route(&mut state, "arc1", v, 0);
    }
    assert_eq!(state.arcs()[0].value(), 30.0);
}

#[test]
fn test_apply_update_direct() {
    let mut state = DisplayState::new();
    let decoded = decode_update(br#"{"width":-1}"#);
    apply_update(&mut state, GaugeSlot::Arc1, &decoded.update, 0);
    assert_eq!(state.arcs()[0].width(), -1);
}

// ============================================================================
// Tests: Geometry / Frame
// ============================================================================

#[test]
fn test_suppressed_arc_is_not_drawn_and_takes_no_space() {
    let mut state = DisplayState::new();
    let mut presenter = MockPresenter::new();
    route(&mut state, "arc1", r#"{"width":0}"#, 0);

    render(&mut state, &mut presenter, 0, None).unwrap();
    let arcs = arc_primitives(presenter.last_frame.as_ref().unwrap());

    assert_eq!(arcs.len(), 2);
    // Ring 2 übernimmt den äußeren Radius
    assert_eq!(arcs[0].0, RADIUS as u32);
    assert_eq!(arcs[1].0, RADIUS as u32 - 8 - 2);
}

#[test]
fn test_frame_arc_angles() {
    let mut state = DisplayState::new();
    let mut presenter = MockPresenter::new();
    route(&mut state, "arc1", r#"{"animation":false}"#, 0);
    route(&mut state, "arc1", "100", 0);
    route(&mut state, "arc2", "50", 0);

    render(&mut state, &mut presenter, 0, None).unwrap();
    let arcs = arc_primitives(presenter.last_frame.as_ref().unwrap());

    assert_eq!(arcs[0].2, ARC_START_DEG);
    assert_eq!(arcs[0].3, 270.0);
    assert_eq!(arcs[1].3, 90.0);
    assert_eq!(arcs[2].3, ARC_START_DEG);
}

#[test]
fn test_frame_carries_backlight() {
    let mut state = DisplayState::new();
    let mut presenter = MockPresenter::new();
    render(&mut state, &mut presenter, 2_000, None).unwrap();
    let frame = presenter.last_frame.unwrap();
    assert!(frame.backlight_pct > 78);
}

#[test]
fn test_unknown_channel_is_ignored() {
    let mut state = DisplayState::new();
    let before = state.clone();
    let routed = route_message(&mut state, PREFIX, "ha_display/arc9", b"77", 0);
    assert!(routed.is_none());
    assert_eq!(state, before);
    assert_eq!(state.dial().color(), Rgb565::RED);
}
