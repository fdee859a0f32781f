//! Zeichnet Primitive auf ein beliebiges `embedded-graphics` DrawTarget
//!
//! Hardware-frei: auf dem ESP32 ist das Ziel der Framebuffer des Panels,
//! in Tests ein Mock.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
// Trait für `into_styled`; der Name `Primitive` gehört hier dem eigenen Enum
use embedded_graphics::primitives::Primitive as _;
use embedded_graphics::primitives::{
    Arc, Circle, Line, PrimitiveStyle, PrimitiveStyleBuilder, StrokeAlignment,
};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use profont::PROFONT_14_POINT;

use crate::frame::Frame;
use crate::geometry::Primitive;

/// Hintergrundfarbe jedes Frames
pub const BACKGROUND: Rgb565 = Rgb565::BLACK;

impl Drawable for Primitive {
    type Color = Rgb565;
    type Output = ();

    fn draw<D>(&self, target: &mut D) -> Result<Self::Output, D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        match self {
            Primitive::Arc {
                center,
                outer_radius,
                width,
                start_deg,
                end_deg,
                color,
            } => {
                let sweep = end_deg - start_deg;
                // Segment der Länge null: nichts sichtbar
                if sweep <= 0.0 || *width == 0 {
                    return Ok(());
                }
                let style = PrimitiveStyleBuilder::new()
                    .stroke_color(*color)
                    .stroke_width(*width)
                    .stroke_alignment(StrokeAlignment::Inside)
                    .build();
                Arc::with_center(*center, outer_radius * 2, start_deg.deg(), sweep.deg())
                    .into_styled(style)
                    .draw(target)
            }
            Primitive::Circle {
                center,
                radius,
                color,
            } => Circle::with_center(*center, radius * 2 + 1)
                .into_styled(PrimitiveStyle::with_stroke(*color, 1))
                .draw(target),
            Primitive::Line {
                start,
                end,
                width,
                color,
            } => Line::new(*start, *end)
                .into_styled(PrimitiveStyle::with_stroke(*color, *width))
                .draw(target),
            Primitive::Label {
                anchor,
                text,
                color,
            } => {
                let character_style = MonoTextStyle::new(&PROFONT_14_POINT, *color);
                let text_style = TextStyleBuilder::new()
                    .alignment(Alignment::Center)
                    .baseline(Baseline::Middle)
                    .build();
                Text::with_text_style(text, *anchor, character_style, text_style)
                    .draw(target)
                    .map(|_| ())
            }
        }
    }
}

impl Drawable for Frame {
    type Color = Rgb565;
    type Output = ();

    /// Löscht das Ziel und zeichnet alle Primitive in Reihenfolge
    fn draw<D>(&self, target: &mut D) -> Result<Self::Output, D::Error>
    where
        D: DrawTarget<Color = Self::Color>,
    {
        target.clear(BACKGROUND)?;
        for primitive in &self.primitives {
            primitive.draw(target)?;
        }
        Ok(())
    }
}
