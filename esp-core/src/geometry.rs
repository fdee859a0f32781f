//! Geometry Projector - Gauge-Werte → Zeichen-Primitive
//!
//! Winkelkonventionen:
//! - Ringe: 0° = 3 Uhr, im Uhrzeigersinn; Start immer bei −90° (12 Uhr)
//! - Zeiger: 0° = 12 Uhr, im Uhrzeigersinn; 270° Weg von −135° bis +135°
//!
//! Die Ringe werden von außen nach innen gelegt. Jeder Ring beginnt beim
//! Innenradius des vorherigen minus `ARC_GAP`. Unterdrückte Ringe
//! (`width <= 0`) belegen keinen Platz.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Point, RgbColor};
use heapless::{String, Vec};
use micromath::F32Ext;

use crate::gauge::{ARC_COUNT, DisplayState, Gauge};

// ============================================================================
// Layout-Konstanten (240×240 Rund-Display)
// ============================================================================

/// Kantenlänge der Zeichenfläche
pub const CANVAS_SIZE: u32 = 240;

/// Mittelpunkt aller Elemente
pub const CENTER: Point = Point::new(120, 120);

/// Außenradius des äußersten Rings
pub const RADIUS: i32 = 120;

/// Abstand zwischen zwei Ringen in Pixel
pub const ARC_GAP: i32 = 2;

/// Startwinkel und Gesamtweg der Ringe
pub const ARC_START_DEG: f32 = -90.0;
pub const ARC_SWEEP_DEG: f32 = 360.0;

/// Radius des Zifferblatts
pub const DIAL_RADIUS: i32 = RADIUS - 40;

/// Zeigerlänge und -stärke
pub const NEEDLE_LENGTH: i32 = DIAL_RADIUS - 10;
pub const NEEDLE_WIDTH: u32 = 2;

/// Startwinkel und Gesamtweg des Zeigers
pub const DIAL_START_DEG: f32 = -135.0;
pub const DIAL_SWEEP_DEG: f32 = 270.0;

/// Skalenstriche: alle 10 %, Hauptstriche bei 0/50/100 %
pub const TICK_COUNT: usize = 11;
pub const MAJOR_TICK_EVERY: usize = 5;
pub const MINOR_TICK_LENGTH: i32 = 6;
pub const MAJOR_TICK_LENGTH: i32 = 12;

/// Abstand der Hauptstrich-Beschriftung vom Zifferblatt-Rand
pub const LABEL_INSET: i32 = 22;

/// Farbe von Zifferblatt, Skala und Beschriftung
pub const DIAL_FACE_COLOR: Rgb565 = Rgb565::WHITE;

/// Maximale Textlänge eines Labels
pub const LABEL_CAPACITY: usize = 12;

/// Obergrenze: 3 Ringe + Zifferblatt + Zeiger + 11 Striche + 3 Labels + Temperatur
pub const MAX_PRIMITIVES: usize = 24;

pub type LabelText = String<LABEL_CAPACITY>;
pub type PrimitiveList = Vec<Primitive, MAX_PRIMITIVES>;

/// Ein Zeichen-Primitiv in Bildschirmkoordinaten
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Ringsegment von `outer_radius` nach innen mit Breite `width`
    Arc {
        center: Point,
        outer_radius: u32,
        width: u32,
        start_deg: f32,
        end_deg: f32,
        color: Rgb565,
    },
    /// Kreislinie (1 px)
    Circle {
        center: Point,
        radius: u32,
        color: Rgb565,
    },
    Line {
        start: Point,
        end: Point,
        width: u32,
        color: Rgb565,
    },
    /// Zentrierter Text
    Label {
        anchor: Point,
        text: LabelText,
        color: Rgb565,
    },
}

/// Endwinkel eines Rings für einen normalisierten Wert
pub fn arc_end_angle(pct: f32) -> f32 {
    pct.clamp(0.0, 1.0) * ARC_SWEEP_DEG + ARC_START_DEG
}

/// Zeigerwinkel für einen normalisierten Wert
pub fn needle_angle(pct: f32) -> f32 {
    pct.clamp(0.0, 1.0) * DIAL_SWEEP_DEG + DIAL_START_DEG
}

/// Punkt auf einem Kreis um `center` (0° = oben, im Uhrzeigersinn)
pub fn polar_point(center: Point, angle_deg: f32, length: i32) -> Point {
    let rad = angle_deg.to_radians();
    let length = length as f32;
    Point::new(
        center.x + (rad.sin() * length).round() as i32,
        center.y - (rad.cos() * length).round() as i32,
    )
}

/// Projiziert alle Ringe (außen nach innen)
pub fn project_arcs(arcs: &[Gauge; ARC_COUNT], out: &mut PrimitiveList) {
    let mut outer = RADIUS;
    for gauge in arcs {
        if gauge.width() <= 0 {
            continue;
        }
        if outer <= 0 {
            break;
        }
        let inner = (outer - gauge.width()).max(0);
        out.push(Primitive::Arc {
            center: CENTER,
            outer_radius: outer as u32,
            width: (outer - inner) as u32,
            start_deg: ARC_START_DEG,
            end_deg: arc_end_angle(gauge.normalized()),
            color: gauge.color(),
        })
        .ok();
        outer = inner - ARC_GAP;
    }
}

/// Projiziert Zifferblatt, Skala und Zeiger
pub fn project_dial(dial: &Gauge, out: &mut PrimitiveList) {
    out.push(Primitive::Circle {
        center: CENTER,
        radius: DIAL_RADIUS as u32,
        color: DIAL_FACE_COLOR,
    })
    .ok();

    // Skala ist positionsnormiert, unabhängig von min/max
    for idx in 0..TICK_COUNT {
        let pct = idx as f32 / (TICK_COUNT - 1) as f32;
        let angle = needle_angle(pct);
        let major = idx % MAJOR_TICK_EVERY == 0;
        let length = if major {
            MAJOR_TICK_LENGTH
        } else {
            MINOR_TICK_LENGTH
        };
        out.push(Primitive::Line {
            start: polar_point(CENTER, angle, DIAL_RADIUS - length),
            end: polar_point(CENTER, angle, DIAL_RADIUS),
            width: 1,
            color: DIAL_FACE_COLOR,
        })
        .ok();

        if major {
            let mut text = LabelText::new();
            let _ = core::fmt::write(&mut text, format_args!("{}", idx * 10));
            out.push(Primitive::Label {
                anchor: polar_point(CENTER, angle, DIAL_RADIUS - LABEL_INSET),
                text,
                color: DIAL_FACE_COLOR,
            })
            .ok();
        }
    }

    out.push(Primitive::Line {
        start: CENTER,
        end: polar_point(CENTER, needle_angle(dial.normalized()), NEEDLE_LENGTH),
        width: NEEDLE_WIDTH,
        color: dial.color(),
    })
    .ok();
}

/// Projiziert den kompletten Anzeige-Zustand
pub fn project(state: &DisplayState, out: &mut PrimitiveList) {
    project_arcs(state.arcs(), out);
    project_dial(state.dial(), out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gauge::GaugeSlot;
    use crate::update::{AnimationSetting, GaugeUpdate, apply_update};

    fn arcs_of(list: &PrimitiveList) -> impl Iterator<Item = (u32, u32, f32)> + '_ {
        list.iter().filter_map(|p| match p {
            Primitive::Arc {
                outer_radius,
                width,
                end_deg,
                ..
            } => Some((*outer_radius, *width, *end_deg)),
            _ => None,
        })
    }

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() <= 1 && (a.y - b.y).abs() <= 1
    }

    #[test]
    fn test_angle_mapping() {
        assert_eq!(arc_end_angle(0.0), -90.0);
        assert_eq!(arc_end_angle(0.5), 90.0);
        assert_eq!(arc_end_angle(1.0), 270.0);
        assert_eq!(needle_angle(0.0), -135.0);
        assert_eq!(needle_angle(0.5), 0.0);
        assert_eq!(needle_angle(1.0), 135.0);
    }

    #[test]
    fn test_polar_point_directions() {
        assert!(close(polar_point(CENTER, 0.0, 70), Point::new(120, 50)));
        assert!(close(polar_point(CENTER, 90.0, 70), Point::new(190, 120)));
        assert!(close(polar_point(CENTER, 180.0, 70), Point::new(120, 190)));
        assert!(close(polar_point(CENTER, -90.0, 70), Point::new(50, 120)));
    }

    #[test]
    fn test_default_arcs_are_nested() {
        let state = DisplayState::new();
        let mut list = PrimitiveList::new();
        project_arcs(state.arcs(), &mut list);
        let arcs: heapless::Vec<_, 3> = arcs_of(&list).collect();
        assert_eq!(arcs.len(), 3);
        assert_eq!((arcs[0].0, arcs[0].1), (120, 8));
        assert_eq!((arcs[1].0, arcs[1].1), (110, 8));
        assert_eq!((arcs[2].0, arcs[2].1), (100, 8));
        // Wert 0 → Segment der Länge null bei 12 Uhr
        assert_eq!(arcs[0].2, ARC_START_DEG);
    }

    #[test]
    fn test_suppressed_arc_consumes_no_space() {
        let mut state = DisplayState::new();
        let update = GaugeUpdate {
            width: Some(0),
            ..GaugeUpdate::default()
        };
        apply_update(&mut state, GaugeSlot::Arc1, &update, 0);

        let mut list = PrimitiveList::new();
        project_arcs(state.arcs(), &mut list);
        let arcs: heapless::Vec<_, 3> = arcs_of(&list).collect();
        assert_eq!(arcs.len(), 2);
        assert_eq!(arcs[0].0, 120);
        assert_eq!(arcs[1].0, 110);
    }

    #[test]
    fn test_arc_sweep_follows_display() {
        let mut state = DisplayState::new();
        state.animation_mut().apply(AnimationSetting::Toggle(false));
        state.set_target(GaugeSlot::Arc2, 25.0, 0);

        let mut list = PrimitiveList::new();
        project_arcs(state.arcs(), &mut list);
        let arcs: heapless::Vec<_, 3> = arcs_of(&list).collect();
        assert_eq!(arcs[1].2, 0.0);
    }

    #[test]
    fn test_oversized_widths_stop_at_center() {
        let mut state = DisplayState::new();
        for slot in [GaugeSlot::Arc1, GaugeSlot::Arc2] {
            let update = GaugeUpdate {
                width: Some(100),
                ..GaugeUpdate::default()
            };
            apply_update(&mut state, slot, &update, 0);
        }
        let mut list = PrimitiveList::new();
        project_arcs(state.arcs(), &mut list);
        let arcs: heapless::Vec<_, 3> = arcs_of(&list).collect();
        // 120..20, dann 18..0, dritter Ring hat keinen Platz mehr
        assert_eq!(arcs.len(), 2);
        assert_eq!((arcs[1].0, arcs[1].1), (18, 18));
    }

    #[test]
    fn test_dial_ticks_and_labels() {
        let state = DisplayState::new();
        let mut list = PrimitiveList::new();
        project_dial(state.dial(), &mut list);

        let lines = list
            .iter()
            .filter(|p| matches!(p, Primitive::Line { .. }))
            .count();
        // 11 Striche + Zeiger
        assert_eq!(lines, TICK_COUNT + 1);

        let labels: heapless::Vec<&str, 4> = list
            .iter()
            .filter_map(|p| match p {
                Primitive::Label { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels.as_slice(), &["0", "50", "100"]);
    }

    #[test]
    fn test_dial_scale_ignores_bounds() {
        let default_state = DisplayState::new();
        let mut scaled_state = DisplayState::new();
        let update = GaugeUpdate {
            min: Some(-40.0),
            max: Some(40.0),
            ..GaugeUpdate::default()
        };
        apply_update(&mut scaled_state, GaugeSlot::Dial, &update, 0);

        let mut default_list = PrimitiveList::new();
        let mut scaled_list = PrimitiveList::new();
        project_dial(default_state.dial(), &mut default_list);
        project_dial(scaled_state.dial(), &mut scaled_list);

        // Alles außer dem Zeiger (letztes Element) ist identisch
        let scale_len = default_list.len() - 1;
        assert_eq!(scaled_list.len(), default_list.len());
        assert_eq!(scaled_list[..scale_len], default_list[..scale_len]);

        let labels: heapless::Vec<&str, 4> = scaled_list
            .iter()
            .filter_map(|p| match p {
                Primitive::Label { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels.as_slice(), &["0", "50", "100"]);

        // Erster und letzter Strich liegen auf ±135°
        let ticks: heapless::Vec<Point, TICK_COUNT> = scaled_list
            .iter()
            .filter_map(|p| match p {
                Primitive::Line { end, width: 1, .. } => Some(*end),
                _ => None,
            })
            .collect();
        assert_eq!(ticks.len(), TICK_COUNT);
        assert!(close(ticks[0], polar_point(CENTER, -135.0, DIAL_RADIUS)));
        assert!(close(ticks[TICK_COUNT - 1], polar_point(CENTER, 135.0, DIAL_RADIUS)));
    }

    #[test]
    fn test_needle_points_up_at_half() {
        let mut state = DisplayState::new();
        state.animation_mut().apply(AnimationSetting::Toggle(false));
        state.set_target(GaugeSlot::Dial, 50.0, 0);

        let mut list = PrimitiveList::new();
        project_dial(state.dial(), &mut list);
        let Some(Primitive::Line { start, end, color, .. }) = list.last() else {
            panic!("needle must be the last primitive");
        };
        assert_eq!(*start, CENTER);
        assert!(close(*end, Point::new(120, 120 - NEEDLE_LENGTH)));
        assert_eq!(*color, Rgb565::RED);
    }

    #[test]
    fn test_needle_uses_own_bounds() {
        let mut state = DisplayState::new();
        state.animation_mut().apply(AnimationSetting::Toggle(false));
        let update = GaugeUpdate {
            min: Some(-40.0),
            max: Some(40.0),
            value: Some(40.0),
            ..GaugeUpdate::default()
        };
        apply_update(&mut state, GaugeSlot::Dial, &update, 0);
        assert_eq!(state.dial().normalized(), 1.0);
    }
}
