//! Overlay layer model
//!
//! Every artifact drawn on the canvas carries a [`LayerKind`] tag assigned when
//! it is created. Cleanup removes layers by tag, so the canvas never has to be
//! asked what a layer is.

use crate::geometry::{ImageBounds, ImagePoint};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique identifier for an overlay layer
///
/// Generated using UUID v4, stable for the lifetime of the layer.
pub type LayerId = uuid::Uuid;

/// What a drawn artifact represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// The reference image itself
    Backdrop,
    /// Dot marking one placed vertex
    VertexMarker,
    /// Dashed segment between consecutive vertices
    Edge,
    /// Filled outline of a closed polygon
    Outline,
    /// Text label showing the closed polygon's area
    AreaLabel,
}

impl LayerKind {
    /// Temporary drawing aids removed when a polygon is closed
    pub const TEMPORARY: [LayerKind; 2] = [LayerKind::VertexMarker, LayerKind::Edge];

    /// Everything a reset removes; the backdrop survives
    pub const MEASUREMENT: [LayerKind; 4] =
        [LayerKind::VertexMarker, LayerKind::Edge, LayerKind::Outline, LayerKind::AreaLabel];
}

/// Geometry of a drawn artifact, in image space
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerShape {
    /// Reference image covering `bounds`
    Image { bounds: ImageBounds, source: String },
    /// Filled circle around a vertex (radius in screen pixels)
    Marker { center: ImagePoint, radius: f32 },
    /// Straight segment
    Segment { from: ImagePoint, to: ImagePoint },
    /// Closed polygon
    Polygon { points: Vec<ImagePoint> },
    /// Text anchored at a point
    Label { anchor: ImagePoint, text: String },
}

/// RGBA color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    /// Default accent used for vertices, edges and outlines
    pub const ACCENT: Color = Color { r: 0x00, g: 0xd2, b: 0xff, a: 255 };

    /// Create a new color
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with alpha scaled by `opacity` (clamped to 0.0..=1.0)
    pub fn with_opacity(self, opacity: f32) -> Self {
        let alpha = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a: alpha, ..self }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional)
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    /// `#rrggbb`, with an alpha byte appended only when not opaque
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid color: {value}"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Visual styling for one overlay layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerStyle {
    /// Stroke color for lines and outlines
    pub stroke_color: Color,

    /// Stroke width in screen pixels (0 for no stroke)
    pub stroke_width: f32,

    /// Fill color for closed shapes (None for no fill)
    pub fill_color: Option<Color>,

    /// Line dash pattern (empty for solid line)
    pub dash_pattern: Vec<f32>,
}

impl LayerStyle {
    /// Solid stroke without fill
    pub fn stroke(color: Color, width: f32) -> Self {
        Self {
            stroke_color: color,
            stroke_width: width,
            fill_color: None,
            dash_pattern: Vec::new(),
        }
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill_color = Some(fill);
        self
    }

    pub fn with_dash(mut self, dash: Vec<f32>) -> Self {
        self.dash_pattern = dash;
        self
    }
}

/// Styles for each kind of measurement artifact
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub marker_radius: f32,
    pub marker: LayerStyle,
    pub edge: LayerStyle,
    pub outline: LayerStyle,
    pub label: LayerStyle,
}

impl OverlayStyle {
    /// Build the style set around one accent color
    pub fn from_accent(
        accent: Color,
        marker_radius: f32,
        edge_width: f32,
        edge_dash: Vec<f32>,
        fill_opacity: f32,
        label_opacity: f32,
    ) -> Self {
        Self {
            marker_radius,
            marker: LayerStyle::stroke(accent, 1.0).with_fill(accent),
            edge: LayerStyle::stroke(accent, edge_width).with_dash(edge_dash),
            outline: LayerStyle::stroke(accent, edge_width)
                .with_fill(accent.with_opacity(fill_opacity)),
            label: LayerStyle::stroke(Color::WHITE, 0.0)
                .with_fill(Color::BLACK.with_opacity(label_opacity)),
        }
    }

    pub fn for_kind(&self, kind: LayerKind) -> LayerStyle {
        match kind {
            LayerKind::Backdrop => LayerStyle::stroke(Color::BLACK, 0.0),
            LayerKind::VertexMarker => self.marker.clone(),
            LayerKind::Edge => self.edge.clone(),
            LayerKind::Outline => self.outline.clone(),
            LayerKind::AreaLabel => self.label.clone(),
        }
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::from_accent(Color::ACCENT, 4.0, 2.0, vec![5.0, 5.0], 0.3, 0.5)
    }
}

/// One drawn artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayLayer {
    pub id: LayerId,
    pub kind: LayerKind,
    pub shape: LayerShape,
    pub style: LayerStyle,
}

impl OverlayLayer {
    /// Create a layer with a fresh id
    pub fn new(kind: LayerKind, shape: LayerShape, style: LayerStyle) -> Self {
        Self { id: LayerId::new_v4(), kind, shape, style }
    }
}

/// Ordered record of layers currently on the canvas
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    entries: Vec<(LayerId, LayerKind)>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: LayerId, kind: LayerKind) {
        self.entries.push((id, kind));
    }

    /// Forget every layer tagged `kind`, returning their ids in draw order
    pub fn remove_kind(&mut self, kind: LayerKind) -> Vec<LayerId> {
        let mut removed = Vec::new();
        self.entries.retain(|&(id, entry_kind)| {
            if entry_kind == kind {
                removed.push(id);
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn ids_of(&self, kind: LayerKind) -> Vec<LayerId> {
        self.entries.iter().filter(|(_, k)| *k == kind).map(|(id, _)| *id).collect()
    }

    pub fn count_of(&self, kind: LayerKind) -> usize {
        self.entries.iter().filter(|(_, k)| *k == kind).count()
    }

    /// Live layer count per kind
    pub fn kind_counts(&self) -> BTreeMap<LayerKind, usize> {
        let mut counts = BTreeMap::new();
        for (_, kind) in &self.entries {
            *counts.entry(*kind).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
