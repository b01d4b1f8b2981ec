//! # Pixel Painting
//!
//! Draws a [`LayoutResult`] onto any `embedded-graphics` [`DrawTarget`] with
//! 24-bit color: a framebuffer, a simulator window or a color e-paper panel.
//!
//! Layout coordinates are `f64` in canvas units; they are rounded to whole
//! pixels here and nowhere else. The target is expected to be at least as large
//! as the canvas the layout was computed for. Anything outside it is clipped by
//! the target.
//!
//! ## Draw Order
//! 1. Background arcs (clock-face mode)
//! 2. Connectors, so bars sit on top of their ends
//! 3. Bars or sleep arcs
//! 4. Round caps and icon anchors
//! 5. Time-axis markers

use crate::assemble::{ChartLayout, LayoutResult};
use crate::circular::CircularLayout;
use crate::geometry::{self, LayoutRect, RoundCap};
use crate::providers::{Color, ColorResolver};
use crate::timeline::TimelineLayout;
use embedded_graphics::{
    geometry::{Angle, Point, Size},
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Arc, Circle, Line, PrimitiveStyle, Rectangle, Sector},
    text::Text,
    Pixel,
};
use std::convert::Infallible;
use std::io::{self, Write};

/// Unfilled part of the 24-hour dial.
const TRACK: Rgb888 = Rgb888::new(0xe5, 0xe5, 0xea);

/// Connector curves and axis labels.
const INK: Rgb888 = Rgb888::new(0x8e, 0x8e, 0x93);

/// Fill of the fell-asleep and woke-up dots.
const ANCHOR: Rgb888 = Rgb888::WHITE;

/// Line segments per connector curve.
const CURVE_STEPS: usize = 16;

const CONNECTOR_WIDTH: u32 = 2;

impl From<Color> for Rgb888 {
    fn from(color: Color) -> Self {
        Rgb888::new(color.r, color.g, color.b)
    }
}

/// In-memory 24-bit canvas, white until painted.
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb888>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Framebuffer {
            width,
            height,
            pixels: vec![Rgb888::WHITE; width as usize * height as usize],
        }
    }

    pub fn clear(&mut self, color: Rgb888) {
        self.pixels.fill(color);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Color at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(self.index(x, y)).copied()
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb888) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Write the buffer as a binary PPM (P6) image.
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        let bytes: Vec<u8> = self
            .pixels
            .iter()
            .flat_map(|c| [c.r(), c.g(), c.b()])
            .collect();
        out.write_all(&bytes)
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            // Negative coordinates are clipped
            if let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }
}

fn pixel(p: geometry::Point) -> Point {
    Point::new(p.x.round() as i32, p.y.round() as i32)
}

/// Whole-pixel rectangle; every bar is at least one pixel wide and tall.
fn pixel_rect(rect: &LayoutRect) -> Rectangle {
    Rectangle::new(
        Point::new(rect.x.round() as i32, rect.y.round() as i32),
        Size::new(
            rect.width.round().max(1.0) as u32,
            rect.height.round().max(1.0) as u32,
        ),
    )
}

fn degrees(deg: f64) -> Angle {
    Angle::from_degrees(deg as f32)
}

/// Paint `result` onto `target`, resolving stage colors through `colors`.
pub fn paint<D>(result: &LayoutResult, colors: &dyn ColorResolver, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    match &result.chart {
        ChartLayout::Timeline(layout) => {
            paint_timeline(layout, colors, target)?;
            paint_markers(result, target)
        }
        ChartLayout::Circular(layout) => paint_circular(layout, colors, target),
    }
}

fn paint_timeline<D>(layout: &TimelineLayout, colors: &dyn ColorResolver, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let stroke = PrimitiveStyle::with_stroke(INK, CONNECTOR_WIDTH);
    for connector in &layout.connectors {
        let mut previous = pixel(connector.from);
        for step in 1..=CURVE_STEPS {
            let current = pixel(connector.point_at(step as f64 / CURVE_STEPS as f64));
            Line::new(previous, current).into_styled(stroke).draw(target)?;
            previous = current;
        }
    }

    for bar in &layout.bars {
        let fill = PrimitiveStyle::with_fill(Rgb888::from(colors.color(bar.stage)));
        pixel_rect(&bar.rect).into_styled(fill).draw(target)?;
    }
    Ok(())
}

fn paint_circular<D>(layout: &CircularLayout, colors: &dyn ColorResolver, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let ring = &layout.ring;
    let center = pixel(ring.center);
    let diameter = (ring.radius * 2.0).round() as u32;
    let stroke_width = ring.stroke_width.round().max(1.0) as u32;

    for background in &layout.background {
        Arc::with_center(
            center,
            diameter,
            degrees(background.start_angle_deg),
            degrees(background.sweep_deg()),
        )
        .into_styled(PrimitiveStyle::with_stroke(TRACK, stroke_width))
        .draw(target)?;
    }

    for segment in &layout.segments {
        let color = Rgb888::from(colors.color(segment.stage));
        Arc::with_center(
            center,
            diameter,
            degrees(segment.start_angle_deg),
            degrees(segment.sweep_deg()),
        )
        .into_styled(PrimitiveStyle::with_stroke(color, stroke_width))
        .draw(target)?;
    }

    let (Some(first), Some(last), Some(terminals)) =
        (layout.segments.first(), layout.segments.last(), layout.terminals)
    else {
        return Ok(());
    };

    paint_cap(&terminals.start_cap, colors.color(first.stage).into(), target)?;
    paint_cap(&terminals.end_cap, colors.color(last.stage).into(), target)?;

    let dot = (ring.stroke_width / 2.0).round().max(1.0) as u32;
    for anchor in [terminals.sleep_start, terminals.sleep_end] {
        Circle::with_center(pixel(anchor.point), dot)
            .into_styled(PrimitiveStyle::with_fill(ANCHOR))
            .draw(target)?;
    }
    Ok(())
}

/// Half-disc bulging toward the cap's facing angle.
fn paint_cap<D>(cap: &RoundCap, color: Rgb888, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    Sector::with_center(
        pixel(cap.center),
        (cap.radius * 2.0).round().max(1.0) as u32,
        degrees(cap.facing_deg - 90.0),
        degrees(180.0),
    )
    .into_styled(PrimitiveStyle::with_fill(color))
    .draw(target)
}

/// Tick and label for every time-axis marker along the bottom edge.
fn paint_markers<D>(result: &LayoutResult, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let bounds = target.bounding_box();
    let width = bounds.size.width as f64;
    let bottom = bounds.top_left.y + bounds.size.height as i32 - 1;
    let text_style = MonoTextStyle::new(&FONT_6X10, INK);

    for marker in &result.markers {
        let x = bounds.top_left.x + (marker.position * width).round() as i32;
        Line::new(Point::new(x, bottom - 4), Point::new(x, bottom))
            .into_styled(PrimitiveStyle::with_stroke(INK, 1))
            .draw(target)?;

        // 6 px per glyph, centered on the tick
        let half = (marker.label.chars().count() as i32 * 6) / 2;
        Text::new(&marker.label, Point::new(x - half, bottom - 6), text_style).draw(target)?;
    }
    Ok(())
}
