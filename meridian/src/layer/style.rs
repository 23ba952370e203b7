use crate::color::Color;
use serde::{Deserialize, Serialize};

/// Line dash pattern of a layer.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashPattern {
    /// Continuous line.
    #[default]
    Solid,
    /// Long dashes.
    Dash,
    /// Dots.
    Dot,
    /// Alternating dashes and dots.
    DashDot,
}

impl DashPattern {
    /// SVG dash array of the pattern. Solid lines have none.
    pub fn dash_array(&self) -> Option<&'static str> {
        match self {
            DashPattern::Solid => None,
            DashPattern::Dash => Some("8 6"),
            DashPattern::Dot => Some("2 6"),
            DashPattern::DashDot => Some("10 5 2 5"),
        }
    }
}

/// Visual style of a layer.
///
/// Fill opacity is kept within `[0, 1]` and line weight is at least `1`; setters clamp values outside of these
/// ranges.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    line_color: Color,
    fill_color: Color,
    fill_opacity: f64,
    weight: f64,
    dash: DashPattern,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            line_color: Color::BLUE,
            fill_color: Color::BLUE,
            fill_opacity: 0.2,
            weight: 2.0,
            dash: DashPattern::Solid,
        }
    }
}

impl Style {
    /// Creates a new style. Out of range values are clamped.
    pub fn new(
        line_color: Color,
        fill_color: Color,
        fill_opacity: f64,
        weight: f64,
        dash: DashPattern,
    ) -> Self {
        Self {
            line_color,
            fill_color,
            fill_opacity: clamp_opacity(fill_opacity),
            weight: clamp_weight(weight),
            dash,
        }
    }

    /// Line (stroke) color.
    pub fn line_color(&self) -> Color {
        self.line_color
    }

    /// Fill color of polygons and point markers.
    pub fn fill_color(&self) -> Color {
        self.fill_color
    }

    /// Fill opacity in `[0, 1]`.
    pub fn fill_opacity(&self) -> f64 {
        self.fill_opacity
    }

    /// Line weight, at least `1`.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Dash pattern.
    pub fn dash(&self) -> DashPattern {
        self.dash
    }

    /// Sets line color.
    pub fn with_line_color(mut self, color: Color) -> Self {
        self.line_color = color;
        self
    }

    /// Sets fill color.
    pub fn with_fill_color(mut self, color: Color) -> Self {
        self.fill_color = color;
        self
    }

    /// Sets fill opacity, clamped to `[0, 1]`.
    pub fn with_fill_opacity(mut self, opacity: f64) -> Self {
        self.fill_opacity = clamp_opacity(opacity);
        self
    }

    /// Sets line weight, at least `1`.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = clamp_weight(weight);
        self
    }

    /// Sets dash pattern.
    pub fn with_dash(mut self, dash: DashPattern) -> Self {
        self.dash = dash;
        self
    }

    /// Returns a copy with out of range values clamped. Styles deserialized from untrusted data should go through
    /// this.
    pub fn normalized(self) -> Self {
        Self::new(
            self.line_color,
            self.fill_color,
            self.fill_opacity,
            self.weight,
            self.dash,
        )
    }

    /// Path options for lines and polygons.
    pub fn path_style(&self) -> PathStyle {
        PathStyle {
            color: self.line_color,
            weight: self.weight,
            dash_array: self.dash.dash_array(),
            fill_color: self.fill_color,
            fill_opacity: self.fill_opacity,
        }
    }

    /// Circle marker options for point features.
    pub fn marker_style(&self) -> MarkerStyle {
        MarkerStyle {
            radius: MarkerStyle::RADIUS,
            color: self.line_color,
            weight: self.weight.max(1.0),
            fill_color: if self.fill_color.is_transparent() {
                self.line_color
            } else {
                self.fill_color
            },
            fill_opacity: MarkerStyle::FILL_OPACITY,
        }
    }
}

fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        return Style::default().fill_opacity;
    }
    opacity.clamp(0.0, 1.0)
}

fn clamp_weight(weight: f64) -> f64 {
    if weight.is_nan() {
        return Style::default().weight;
    }
    weight.max(1.0)
}

/// Style of a line or polygon as consumed by the rendering surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PathStyle {
    /// Stroke color.
    pub color: Color,
    /// Stroke width.
    pub weight: f64,
    /// SVG dash array, `None` for solid lines.
    pub dash_array: Option<&'static str>,
    /// Fill color.
    pub fill_color: Color,
    /// Fill opacity.
    pub fill_opacity: f64,
}

/// Style of a point marker as consumed by the rendering surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerStyle {
    /// Circle radius in pixels.
    pub radius: f64,
    /// Stroke color.
    pub color: Color,
    /// Stroke width.
    pub weight: f64,
    /// Fill color.
    pub fill_color: Color,
    /// Fill opacity.
    pub fill_opacity: f64,
}

impl MarkerStyle {
    const RADIUS: f64 = 6.0;
    const FILL_OPACITY: f64 = 0.9;
}
