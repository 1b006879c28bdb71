//! Overlay geometry: the tagged shape union, its wire form, and the
//! validator that coerces loose generator output into it.
//!
//! All coordinates live in the normalized `[0,1] × [0,1]` space,
//! independent of source image pixel dimensions, and are rounded to
//! two decimal places on ingestion. Out-of-range values are clamped,
//! never rejected; a shape is only rejected when its point count or
//! positivity rule fails, and then it is rejected whole — partial
//! shapes are never emitted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Maximum overlays carried by one finding.
pub const MAX_OVERLAYS: usize = 12;

/// Clamp a coordinate into `[0, 1]`.
pub fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Round to two decimal places.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Clamp-then-round a raw coordinate; `None` for non-finite input.
fn norm(v: f64) -> Option<f64> {
    v.is_finite().then(|| round2(clamp01(v)))
}

/// A geometric annotation on a dental image.
///
/// Exactly one shape family per variant; the wire form (see
/// [`OverlayWire`]) is the flat nullable JSON object shared with the
/// storage layer and the rendering pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "OverlayWire", try_from = "OverlayWire")]
pub enum Overlay {
    Circle {
        center: (f64, f64),
        radius: f64,
        label: Option<String>,
    },
    Line {
        points: [(f64, f64); 2],
        label: Option<String>,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        label: Option<String>,
    },
    Polygon {
        points: Vec<(f64, f64)>,
        label: Option<String>,
    },
    Box {
        origin: (f64, f64),
        size: (f64, f64),
        label: Option<String>,
    },
}

impl Overlay {
    /// Canonical wire name of the variant.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Circle { .. } => "circle",
            Self::Line { .. } => "line",
            Self::Polyline { .. } => "polyline",
            Self::Polygon { .. } => "polygon",
            Self::Box { .. } => "bbox",
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Circle { label, .. }
            | Self::Line { label, .. }
            | Self::Polyline { label, .. }
            | Self::Polygon { label, .. }
            | Self::Box { label, .. } => label.as_deref(),
        }
    }
}

/// A stored overlay that violates the canonical wire contract.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("unknown overlay type: {0}")]
    UnknownType(String),

    #[error("overlay '{kind}' is missing its '{field}' field")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("overlay '{kind}' violates its geometry rule: {rule}")]
    InvalidGeometry {
        kind: &'static str,
        rule: &'static str,
    },
}

/// Flat wire shape: `type` selects which of `center+radius`, `points`,
/// `bbox` is non-null; the rest serialize as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayWire {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    center: Option<[f64; 2]>,
    #[serde(default)]
    radius: Option<f64>,
    #[serde(default)]
    points: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    bbox: Option<[f64; 4]>,
    #[serde(default)]
    label: Option<String>,
}

impl From<Overlay> for OverlayWire {
    fn from(overlay: Overlay) -> Self {
        let kind = overlay.kind().to_string();
        let mut wire = OverlayWire {
            kind,
            center: None,
            radius: None,
            points: None,
            bbox: None,
            label: None,
        };
        match overlay {
            Overlay::Circle {
                center,
                radius,
                label,
            } => {
                wire.center = Some([center.0, center.1]);
                wire.radius = Some(radius);
                wire.label = label;
            }
            Overlay::Line { points, label } => {
                wire.points = Some(points.iter().map(|p| [p.0, p.1]).collect());
                wire.label = label;
            }
            Overlay::Polyline { points, label } | Overlay::Polygon { points, label } => {
                wire.points = Some(points.iter().map(|p| [p.0, p.1]).collect());
                wire.label = label;
            }
            Overlay::Box {
                origin,
                size,
                label,
            } => {
                wire.bbox = Some([origin.0, origin.1, size.0, size.1]);
                wire.label = label;
            }
        }
        wire
    }
}

impl TryFrom<OverlayWire> for Overlay {
    type Error = GeometryError;

    fn try_from(wire: OverlayWire) -> Result<Self, Self::Error> {
        let label = wire.label;
        match wire.kind.as_str() {
            "circle" => {
                let center = wire.center.ok_or(GeometryError::MissingField {
                    kind: "circle",
                    field: "center",
                })?;
                let radius = wire.radius.ok_or(GeometryError::MissingField {
                    kind: "circle",
                    field: "radius",
                })?;
                let center = wire_point(center, "circle")?;
                let radius = norm(radius).ok_or(GeometryError::InvalidGeometry {
                    kind: "circle",
                    rule: "radius must be finite",
                })?;
                if radius <= 0.0 {
                    return Err(GeometryError::InvalidGeometry {
                        kind: "circle",
                        rule: "radius must be > 0",
                    });
                }
                Ok(Overlay::Circle {
                    center,
                    radius,
                    label,
                })
            }
            "line" => {
                let points = wire_points(wire.points, "line")?;
                if points.len() != 2 {
                    return Err(GeometryError::InvalidGeometry {
                        kind: "line",
                        rule: "exactly 2 points",
                    });
                }
                Ok(Overlay::Line {
                    points: [points[0], points[1]],
                    label,
                })
            }
            "polyline" => {
                let points = wire_points(wire.points, "polyline")?;
                if points.len() < 2 {
                    return Err(GeometryError::InvalidGeometry {
                        kind: "polyline",
                        rule: "at least 2 points",
                    });
                }
                Ok(Overlay::Polyline { points, label })
            }
            "polygon" => {
                let points = wire_points(wire.points, "polygon")?;
                if points.len() < 3 {
                    return Err(GeometryError::InvalidGeometry {
                        kind: "polygon",
                        rule: "at least 3 points",
                    });
                }
                Ok(Overlay::Polygon { points, label })
            }
            "bbox" => {
                let [x, y, w, h] = wire.bbox.ok_or(GeometryError::MissingField {
                    kind: "bbox",
                    field: "bbox",
                })?;
                let origin = wire_point([x, y], "bbox")?;
                let size = wire_point([w, h], "bbox")?;
                if size.0 <= 0.0 || size.1 <= 0.0 {
                    return Err(GeometryError::InvalidGeometry {
                        kind: "bbox",
                        rule: "size components must be > 0",
                    });
                }
                Ok(Overlay::Box {
                    origin,
                    size,
                    label,
                })
            }
            other => Err(GeometryError::UnknownType(other.to_string())),
        }
    }
}

fn wire_point(p: [f64; 2], kind: &'static str) -> Result<(f64, f64), GeometryError> {
    match (norm(p[0]), norm(p[1])) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(GeometryError::InvalidGeometry {
            kind,
            rule: "coordinates must be finite",
        }),
    }
}

fn wire_points(
    points: Option<Vec<[f64; 2]>>,
    kind: &'static str,
) -> Result<Vec<(f64, f64)>, GeometryError> {
    let points = points.ok_or(GeometryError::MissingField {
        kind,
        field: "points",
    })?;
    points.into_iter().map(|p| wire_point(p, kind)).collect()
}

// ── Loose coercion (raw generator output) ──

/// Coerce one loosely-shaped overlay record, or `None` if it fails
/// its variant's rules.
///
/// The type name is matched case-insensitively with the synonyms the
/// generator has been seen to emit: "ellipse" → circle, "rect" /
/// "rectangle" / "box" → bbox. Coordinates are clamped to `[0,1]` and
/// rounded to two decimals; the label passes through untouched.
pub fn coerce_overlay(raw: &Value) -> Option<Overlay> {
    let obj = raw.as_object()?;
    let kind = obj
        .get("type")
        .or_else(|| obj.get("kind"))
        .or_else(|| obj.get("shape"))
        .and_then(Value::as_str)?;
    let label = obj
        .get("label")
        .and_then(Value::as_str)
        .map(str::to_owned);

    match kind.trim().to_ascii_lowercase().as_str() {
        "circle" | "ellipse" => {
            let center = loose_point(obj.get("center")?)?;
            let radius = norm(loose_f64(obj.get("radius").or_else(|| obj.get("r"))?)?)?;
            if radius <= 0.0 {
                debug!(radius, "dropping circle overlay: non-positive radius");
                return None;
            }
            Some(Overlay::Circle {
                center,
                radius,
                label,
            })
        }
        "line" => {
            let points = loose_points(obj.get("points")?)?;
            if points.len() != 2 {
                debug!(count = points.len(), "dropping line overlay: needs exactly 2 points");
                return None;
            }
            Some(Overlay::Line {
                points: [points[0], points[1]],
                label,
            })
        }
        "polyline" => {
            let points = loose_points(obj.get("points")?)?;
            if points.len() < 2 {
                debug!(count = points.len(), "dropping polyline overlay: needs 2+ points");
                return None;
            }
            Some(Overlay::Polyline { points, label })
        }
        "polygon" => {
            let points = loose_points(obj.get("points")?)?;
            if points.len() < 3 {
                debug!(count = points.len(), "dropping polygon overlay: needs 3+ points");
                return None;
            }
            Some(Overlay::Polygon { points, label })
        }
        "box" | "bbox" | "rect" | "rectangle" => {
            let (origin, size) = loose_box(obj)?;
            if size.0 <= 0.0 || size.1 <= 0.0 {
                debug!("dropping box overlay: non-positive size");
                return None;
            }
            Some(Overlay::Box {
                origin,
                size,
                label,
            })
        }
        other => {
            debug!(kind = other, "dropping overlay: unknown type");
            None
        }
    }
}

/// Coerce a list of loose overlays, preserving input order, skipping
/// non-conforming entries, and capping the result at [`MAX_OVERLAYS`].
///
/// A bare object is treated as a single-element list.
pub fn coerce_overlays(raw: &Value) -> Vec<Overlay> {
    let items: &[Value] = match raw {
        Value::Array(items) => items,
        Value::Object(_) => std::slice::from_ref(raw),
        _ => return Vec::new(),
    };

    let mut out = Vec::new();
    for item in items {
        if out.len() == MAX_OVERLAYS {
            debug!(cap = MAX_OVERLAYS, "overlay cap reached, skipping remainder");
            break;
        }
        if let Some(overlay) = coerce_overlay(item) {
            out.push(overlay);
        }
    }
    out
}

fn loose_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// A point as `[x, y]` or `{"x": .., "y": ..}`, normalized.
fn loose_point(v: &Value) -> Option<(f64, f64)> {
    let (x, y) = match v {
        Value::Array(items) if items.len() == 2 => (loose_f64(&items[0])?, loose_f64(&items[1])?),
        Value::Object(obj) => (loose_f64(obj.get("x")?)?, loose_f64(obj.get("y")?)?),
        _ => return None,
    };
    Some((norm(x)?, norm(y)?))
}

/// All points must parse; one malformed point rejects the whole shape.
fn loose_points(v: &Value) -> Option<Vec<(f64, f64)>> {
    v.as_array()?.iter().map(loose_point).collect()
}

/// A box as `bbox: [x, y, w, h]` (aliases "box", "rect") or as
/// `origin` + `size` points.
fn loose_box(obj: &serde_json::Map<String, Value>) -> Option<((f64, f64), (f64, f64))> {
    if let Some(b) = obj
        .get("bbox")
        .or_else(|| obj.get("box"))
        .or_else(|| obj.get("rect"))
        .and_then(Value::as_array)
        && b.len() == 4
    {
        let origin = (norm(loose_f64(&b[0])?)?, norm(loose_f64(&b[1])?)?);
        let size = (norm(loose_f64(&b[2])?)?, norm(loose_f64(&b[3])?)?);
        return Some((origin, size));
    }
    let origin = loose_point(obj.get("origin")?)?;
    let size = loose_point(obj.get("size")?)?;
    Some((origin, size))
}
