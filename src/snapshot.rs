#![cfg(not(tarpaulin_include))]

use image::{ImageFormat, RgbaImage};
use log::{debug, info};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::io::Cursor;

use crate::config::Settings;
use crate::downloader::Artifact;
use crate::error::{NodeStatusError, Result};
use crate::record::{NormalizedRecord, Status};

const CARD_WIDTH: i32 = 400;
const PADDING: i32 = 24;
const CARD_RADIUS: i32 = 8;
const TITLE_HEIGHT: i32 = 28;
const TITLE_GAP: i32 = 16;
const ROW_HEIGHT: i32 = 36;
const ROW_GAP: i32 = 8;
const ROW_RADIUS: i32 = 6;
const ROW_INSET: i32 = 8;
const BADGE_HEIGHT: i32 = 24;

const CARD_BORDER: RGBColor = RGBColor(0x37, 0x41, 0x51);
const CARD_FILL: RGBColor = RGBColor(0x1F, 0x29, 0x37);
const ROW_FILL: RGBColor = RGBColor(0x2A, 0x34, 0x41);
const TITLE_TEXT: RGBColor = RGBColor(0xFF, 0xFF, 0xFF);
const NODE_TEXT: RGBColor = RGBColor(0xD1, 0xD5, 0xDB);
const UP_FILL: RGBColor = RGBColor(0x22, 0xC5, 0x5E);
const DOWN_FILL: RGBColor = RGBColor(0xEF, 0x44, 0x44);

/// Pixel box, corners inclusive-exclusive: `(x0, y0)` to `(x1, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    fn scaled(self, scale: i32) -> Rect {
        Rect {
            x0: self.x0 * scale,
            y0: self.y0 * scale,
            x1: self.x1 * scale,
            y1: self.y1 * scale,
        }
    }

    fn center_y(&self) -> i32 {
        (self.y0 + self.y1) / 2
    }
}

/// One line of the snapshot card.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotRow {
    pub node: String,
    pub status: Status,
    pub area: Rect,
    pub badge: Rect,
}

/// Geometry of the snapshot card in layout (1x) pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotLayout {
    pub width: i32,
    pub height: i32,
    pub title_center: (i32, i32),
    pub rows: Vec<SnapshotRow>,
}

fn badge_width(status: Status) -> i32 {
    match status {
        Status::Up => 40,
        Status::Down => 56,
    }
}

/// Lay out one row per record: node name on the left, status pill on the
/// right.
pub fn layout(records: &[NormalizedRecord]) -> SnapshotLayout {
    let mut y = PADDING + TITLE_HEIGHT + TITLE_GAP;
    let mut rows = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            y += ROW_GAP;
        }
        let area = Rect {
            x0: PADDING,
            y0: y,
            x1: CARD_WIDTH - PADDING,
            y1: y + ROW_HEIGHT,
        };
        let badge_top = area.y0 + (ROW_HEIGHT - BADGE_HEIGHT) / 2;
        let badge = Rect {
            x0: area.x1 - ROW_INSET - badge_width(record.status()),
            y0: badge_top,
            x1: area.x1 - ROW_INSET,
            y1: badge_top + BADGE_HEIGHT,
        };
        rows.push(SnapshotRow {
            node: record.node().to_string(),
            status: record.status(),
            area,
            badge,
        });
        y += ROW_HEIGHT;
    }

    SnapshotLayout {
        width: CARD_WIDTH,
        height: y + PADDING,
        title_center: (CARD_WIDTH / 2, PADDING + TITLE_HEIGHT / 2),
        rows,
    }
}

fn snapshot_error<E: std::fmt::Display>(err: E) -> NodeStatusError {
    NodeStatusError::Snapshot(err.to_string())
}

fn fill_rounded<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    rect: Rect,
    radius: i32,
    color: RGBColor,
) -> Result<()> {
    let r = radius.min((rect.x1 - rect.x0) / 2).min((rect.y1 - rect.y0) / 2);
    let style = color.filled();
    area.draw(&Rectangle::new([(rect.x0 + r, rect.y0), (rect.x1 - r, rect.y1)], style))
        .map_err(snapshot_error)?;
    area.draw(&Rectangle::new([(rect.x0, rect.y0 + r), (rect.x1, rect.y1 - r)], style))
        .map_err(snapshot_error)?;
    for (cx, cy) in [
        (rect.x0 + r, rect.y0 + r),
        (rect.x1 - r, rect.y0 + r),
        (rect.x0 + r, rect.y1 - r),
        (rect.x1 - r, rect.y1 - r),
    ] {
        area.draw(&Circle::new((cx, cy), r, style))
            .map_err(snapshot_error)?;
    }
    Ok(())
}

/// Draw the card onto an RGB buffer whose untouched pixels are `background`.
fn draw_card(
    buffer: &mut [u8],
    layout: &SnapshotLayout,
    scale: i32,
    background: RGBColor,
) -> Result<()> {
    let size = ((layout.width * scale) as u32, (layout.height * scale) as u32);
    let root = BitMapBackend::with_buffer(buffer, size).into_drawing_area();
    root.fill(&background).map_err(snapshot_error)?;

    let card = Rect {
        x0: 0,
        y0: 0,
        x1: layout.width,
        y1: layout.height,
    };
    fill_rounded(&root, card.scaled(scale), CARD_RADIUS * scale, CARD_BORDER)?;
    let inner = Rect {
        x0: scale,
        y0: scale,
        x1: card.x1 * scale - scale,
        y1: card.y1 * scale - scale,
    };
    fill_rounded(&root, inner, (CARD_RADIUS - 1) * scale, CARD_FILL)?;

    let centered = Pos::new(HPos::Center, VPos::Center);
    let title = ("sans-serif", (18 * scale) as f64, FontStyle::Bold)
        .into_font()
        .color(&TITLE_TEXT)
        .pos(centered);
    let (tx, ty) = layout.title_center;
    root.draw_text("Node Status", &title, (tx * scale, ty * scale))
        .map_err(snapshot_error)?;

    let node_style = ("monospace", (14 * scale) as f64)
        .into_font()
        .color(&NODE_TEXT)
        .pos(Pos::new(HPos::Left, VPos::Center));

    for row in &layout.rows {
        let area = row.area.scaled(scale);
        fill_rounded(&root, area, ROW_RADIUS * scale, ROW_FILL)?;
        root.draw_text(
            &row.node,
            &node_style,
            (area.x0 + ROW_INSET * scale, area.center_y()),
        )
        .map_err(snapshot_error)?;

        let badge = row.badge.scaled(scale);
        let (fill, text) = match row.status {
            Status::Up => (UP_FILL, BLACK),
            Status::Down => (DOWN_FILL, WHITE),
        };
        fill_rounded(&root, badge, BADGE_HEIGHT * scale / 2, fill)?;
        let badge_style = ("sans-serif", (12 * scale) as f64, FontStyle::Bold)
            .into_font()
            .color(&text)
            .pos(centered);
        root.draw_text(
            row.status.as_str(),
            &badge_style,
            ((badge.x0 + badge.x1) / 2, badge.center_y()),
        )
        .map_err(snapshot_error)?;
    }

    root.present().map_err(snapshot_error)?;
    Ok(())
}

/// Recover straight RGBA from the same scene drawn over black and over
/// white: where the two differ the scene was (partly) transparent.
pub fn unmatte(on_black: &[u8], on_white: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(on_black.len() / 3 * 4);
    for (b, w) in on_black.chunks_exact(3).zip(on_white.chunks_exact(3)) {
        let spread: u32 = (0..3)
            .map(|i| w[i].saturating_sub(b[i]) as u32)
            .sum::<u32>()
            / 3;
        let alpha = 255 - spread.min(255);
        if alpha == 0 {
            rgba.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        for &channel in b {
            rgba.push(((channel as u32 * 255 + alpha / 2) / alpha).min(255) as u8);
        }
        rgba.push(alpha as u8);
    }
    rgba
}

/// Rasterize the snapshot card at `scale` into PNG bytes with a
/// transparent background.
///
/// # Arguments
/// * `records` - Rows to draw, in display order
/// * `scale` - Device pixels per layout pixel, at least 1
///
/// # Returns
/// * `Result<Vec<u8>>` - PNG bytes, or `NodeStatusError::Snapshot` when
///   drawing fails
pub fn rasterize(records: &[NormalizedRecord], scale: u32) -> Result<Vec<u8>> {
    let scale = i32::try_from(scale)
        .ok()
        .filter(|s| *s > 0)
        .ok_or_else(|| NodeStatusError::Snapshot(format!("invalid scale {scale}")))?;
    let layout = layout(records);
    let width = (layout.width * scale) as u32;
    let height = (layout.height * scale) as u32;
    let len = width as usize * height as usize * 3;

    let mut on_black = vec![0u8; len];
    let mut on_white = vec![0u8; len];
    draw_card(&mut on_black, &layout, scale, BLACK)?;
    draw_card(&mut on_white, &layout, scale, WHITE)?;

    let image = RgbaImage::from_raw(width, height, unmatte(&on_black, &on_white))
        .ok_or_else(|| NodeStatusError::Snapshot("pixel buffer size mismatch".into()))?;

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    debug!("rasterized {}x{} snapshot ({} bytes)", width, height, png.len());
    Ok(png)
}

/// Render the snapshot on a blocking worker so the caller stays responsive.
///
/// The returned artifact carries the suggested `node_status_snapshot.png`
/// name.
pub async fn render_snapshot(
    records: Vec<NormalizedRecord>,
    settings: &Settings,
) -> Result<Artifact> {
    let scale = settings.snapshot_scale;
    let count = records.len();
    let bytes = tokio::task::spawn_blocking(move || rasterize(&records, scale))
        .await
        .map_err(snapshot_error)??;

    info!("snapshot of {} nodes ready ({} bytes)", count, bytes.len());
    Ok(Artifact {
        file_name: settings.snapshot_file_name.clone(),
        bytes,
    })
}
