//! Interactive map tools: distance and area measurement and digitizing of new features.
//!
//! At most one tool is active at a time. A [`ToolSession`] collects clicked points for the active tool, follows the
//! pointer for a live preview, and on [`ToolSession::finish`] produces a [`ToolOutcome`]. Starting another tool or
//! cancelling discards everything collected so far.

mod digitize;
mod measure;

pub use digitize::{build_geometry, min_points};
pub use measure::{format_area, format_distance, path_length, ring_area, Measurement};

use crate::error::WorkbenchError;
use crate::layer::LayerId;
use geojson::{Geometry, Value};
use meridian_types::{GeoPoint, GeometryKind};
use std::fmt::{Display, Formatter};

/// A map tool.
#[derive(Debug, Clone, PartialEq)]
pub enum Tool {
    /// Measure length of a path.
    MeasureDistance,
    /// Measure area of a polygon.
    MeasureArea,
    /// Draw a new feature into a layer.
    Digitize {
        /// Target layer.
        layer: LayerId,
        /// Geometry kind of the target layer.
        kind: GeometryKind,
    },
}

impl Tool {
    /// Short name of the tool for status messages.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::MeasureDistance => "measure-distance",
            Tool::MeasureArea => "measure-area",
            Tool::Digitize { .. } => "digitize",
        }
    }

    fn required_points(&self) -> usize {
        match self {
            Tool::MeasureDistance => 2,
            Tool::MeasureArea => 3,
            Tool::Digitize { kind, .. } => min_points(*kind),
        }
    }
}

impl Display for Tool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a finished tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// Final value of a measurement.
    Measurement(Measurement),
    /// Geometry of a new feature to be appended to the layer.
    Feature {
        /// Target layer.
        layer: LayerId,
        /// Drawn geometry.
        geometry: Geometry,
    },
}

#[derive(Debug, Clone)]
struct ActiveTool {
    tool: Tool,
    points: Vec<GeoPoint>,
    pointer: Option<GeoPoint>,
}

impl ActiveTool {
    fn preview_points(&self) -> Vec<GeoPoint> {
        let mut points = self.points.clone();
        if !points.is_empty() {
            points.extend(self.pointer);
        }
        points
    }
}

/// State of the interactive tool: either idle or collecting points for one active tool.
#[derive(Debug, Clone)]
pub struct ToolSession {
    active: Option<ActiveTool>,
    earth_radius: f64,
}

impl ToolSession {
    /// Creates an idle session. Distances are measured on a sphere with the given radius.
    pub fn new(earth_radius: f64) -> Self {
        Self {
            active: None,
            earth_radius,
        }
    }

    /// Activates the tool. A tool that was active before is cancelled and returned.
    pub fn start(&mut self, tool: Tool) -> Option<Tool> {
        let previous = self.cancel();
        log::debug!("Started tool {tool}");
        self.active = Some(ActiveTool {
            tool,
            points: vec![],
            pointer: None,
        });

        previous
    }

    /// Discards the active tool and everything it collected. Returns the cancelled tool.
    pub fn cancel(&mut self) -> Option<Tool> {
        let active = self.active.take()?;
        log::debug!(
            "Cancelled tool {} with {} points",
            active.tool,
            active.points.len()
        );
        Some(active.tool)
    }

    /// Active tool.
    pub fn active_tool(&self) -> Option<&Tool> {
        self.active.as_ref().map(|a| &a.tool)
    }

    /// Returns true if a tool is active.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Points collected by the active tool.
    pub fn points(&self) -> &[GeoPoint] {
        self.active
            .as_ref()
            .map(|a| a.points.as_slice())
            .unwrap_or(&[])
    }

    /// Adds a clicked point to the active tool.
    pub fn add_point(&mut self, point: GeoPoint) -> Result<(), WorkbenchError> {
        let active = self.active.as_mut().ok_or(WorkbenchError::NoActiveTool)?;
        active.points.push(point);
        Ok(())
    }

    /// Updates the pointer position used for the live preview. Ignored when no tool is active.
    pub fn move_pointer(&mut self, point: GeoPoint) {
        if let Some(active) = &mut self.active {
            active.pointer = Some(point);
        }
    }

    /// Current value of the active measurement, including the segment to the pointer. `None` if no measurement is
    /// active.
    pub fn measurement(&self) -> Option<Measurement> {
        let active = self.active.as_ref()?;
        self.measure(&active.tool, &active.preview_points())
    }

    /// Current value of the active measurement formatted with units.
    pub fn readout(&self) -> Option<String> {
        self.measurement().map(|m| m.readout())
    }

    /// Transient geometry to draw while the tool is active: collected points and the pointer position. `None` while
    /// there is nothing to draw.
    pub fn preview(&self) -> Option<Geometry> {
        let active = self.active.as_ref()?;
        let points = active.preview_points();
        let positions: Vec<Vec<f64>> = points.iter().map(GeoPoint::to_position).collect();

        let as_area = matches!(
            active.tool,
            Tool::MeasureArea
                | Tool::Digitize {
                    kind: GeometryKind::Polygon,
                    ..
                }
        );
        let value = match positions.len() {
            0 => return None,
            1 => Value::Point(positions[0].clone()),
            n if as_area && n >= 3 => {
                let mut ring = positions;
                ring.push(ring[0].clone());
                Value::Polygon(vec![ring])
            }
            _ if matches!(
                active.tool,
                Tool::Digitize {
                    kind: GeometryKind::Point,
                    ..
                }
            ) =>
            {
                Value::MultiPoint(positions)
            }
            _ => Value::LineString(positions),
        };

        Some(Geometry::new(value))
    }

    /// Finishes the active tool and returns to idle.
    ///
    /// The final result uses the clicked points only, not the pointer. If there are not enough points, an error is
    /// returned and the tool stays active.
    pub fn finish(&mut self) -> Result<ToolOutcome, WorkbenchError> {
        let active = self.active.as_ref().ok_or(WorkbenchError::NoActiveTool)?;

        let required = active.tool.required_points();
        if active.points.len() < required {
            return Err(WorkbenchError::InsufficientPoints {
                required,
                got: active.points.len(),
            });
        }

        let outcome = match &active.tool {
            Tool::Digitize { layer, kind } => ToolOutcome::Feature {
                layer: layer.clone(),
                geometry: build_geometry(*kind, &active.points)?,
            },
            tool => match self.measure(tool, &active.points) {
                Some(measurement) => ToolOutcome::Measurement(measurement),
                None => return Err(WorkbenchError::NoActiveTool),
            },
        };

        self.active = None;
        Ok(outcome)
    }

    fn measure(&self, tool: &Tool, points: &[GeoPoint]) -> Option<Measurement> {
        match tool {
            Tool::MeasureDistance => Some(Measurement::Distance(path_length(
                points,
                self.earth_radius,
            ))),
            Tool::MeasureArea => Some(Measurement::Area(ring_area(points))),
            Tool::Digitize { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    use meridian_types::latlon;

    const RADIUS: f64 = 6_371_000.0;

    #[test]
    fn idle_session() {
        let mut session = ToolSession::new(RADIUS);
        assert!(!session.is_active());
        assert_matches!(
            session.add_point(latlon!(0.0, 0.0)),
            Err(WorkbenchError::NoActiveTool)
        );
        assert_matches!(session.finish(), Err(WorkbenchError::NoActiveTool));
        assert_eq!(session.measurement(), None);
        assert_eq!(session.preview(), None);
        assert_eq!(session.cancel(), None);
    }

    #[test]
    fn distance_with_pointer_preview() {
        let mut session = ToolSession::new(RADIUS);
        session.start(Tool::MeasureDistance);
        session.add_point(latlon!(0.0, 0.0)).expect("no tool");
        assert_relative_eq!(session.measurement().expect("no measurement").value(), 0.0);

        session.move_pointer(latlon!(0.0, 0.01));
        let preview = session.measurement().expect("no measurement").value();
        assert_relative_eq!(preview, 1_111.95, max_relative = 1e-4);
        assert_eq!(session.readout().as_deref(), Some("1.11 km"));
        assert_matches!(
            session.preview().map(|g| g.value),
            Some(Value::LineString(line)) if line.len() == 2
        );

        assert_matches!(
            session.finish(),
            Err(WorkbenchError::InsufficientPoints {
                required: 2,
                got: 1
            })
        );
        assert!(session.is_active());

        session.add_point(latlon!(0.0, 0.005)).expect("no tool");
        let outcome = session.finish().expect("finish failed");
        let ToolOutcome::Measurement(Measurement::Distance(meters)) = outcome else {
            panic!("distance expected");
        };
        assert_relative_eq!(meters, 555.97, max_relative = 1e-4);
        assert!(!session.is_active());
    }

    #[test]
    fn area_measurement() {
        let mut session = ToolSession::new(RADIUS);
        session.start(Tool::MeasureArea);
        for point in [latlon!(0.0, 0.0), latlon!(0.0, 0.01), latlon!(0.01, 0.01)] {
            session.add_point(point).expect("no tool");
        }
        session.move_pointer(latlon!(0.01, 0.0));
        let with_pointer = session.measurement().expect("no measurement").value();

        assert_matches!(session.preview().map(|g| g.value), Some(Value::Polygon(_)));

        let ToolOutcome::Measurement(Measurement::Area(final_area)) =
            session.finish().expect("finish failed")
        else {
            panic!("area expected");
        };
        assert_relative_eq!(with_pointer, 2.0 * final_area, max_relative = 1e-3);
        assert_relative_eq!(final_area, 0.5 * 1_113.19f64.powi(2), max_relative = 1e-3);
    }

    #[test]
    fn starting_a_tool_cancels_the_previous_one() {
        let mut session = ToolSession::new(RADIUS);
        session.start(Tool::MeasureDistance);
        session.add_point(latlon!(0.0, 0.0)).expect("no tool");
        session.move_pointer(latlon!(1.0, 1.0));

        let previous = session.start(Tool::MeasureArea);
        assert_eq!(previous, Some(Tool::MeasureDistance));
        assert!(session.points().is_empty());
        assert_eq!(session.preview(), None);
        assert_eq!(session.active_tool(), Some(&Tool::MeasureArea));
    }

    #[test]
    fn digitize_polygon() {
        let layer = LayerId::new("edit_1");
        let mut session = ToolSession::new(RADIUS);
        session.start(Tool::Digitize {
            layer: layer.clone(),
            kind: GeometryKind::Polygon,
        });
        assert_eq!(session.measurement(), None);

        for point in [latlon!(0.0, 0.0), latlon!(0.0, 1.0), latlon!(1.0, 1.0)] {
            session.add_point(point).expect("no tool");
        }

        let outcome = session.finish().expect("finish failed");
        assert_matches!(
            outcome,
            ToolOutcome::Feature { layer: l, geometry } if l == layer && GeometryKind::of(&geometry) == GeometryKind::Polygon
        );
    }

    #[test]
    fn cancel_discards_points() {
        let mut session = ToolSession::new(RADIUS);
        session.start(Tool::Digitize {
            layer: LayerId::new("edit_1"),
            kind: GeometryKind::Line,
        });
        session.add_point(latlon!(0.0, 0.0)).expect("no tool");
        assert!(session.cancel().is_some());
        assert!(session.points().is_empty());
        assert!(!session.is_active());
    }
}
