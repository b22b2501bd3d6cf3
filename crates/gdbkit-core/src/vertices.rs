//! Record and vertex counts for line and polygon feature classes.

use gdbkit_core_common::{MetadataSource, RowSource, SHAPE_TOKEN, ShapeType};
use geojson::Value as GeometryValue;
use log::{debug, info};
use serde::Serialize;

use crate::error::Result;

/// Totals for one feature class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VertexCount {
    pub records: u64,
    pub vertices: u64,
}

/// Number of points in a geometry. Polygon rings count their closing point.
#[must_use]
pub fn point_count(geometry: &geojson::Geometry) -> u64 {
    fn count(value: &GeometryValue) -> usize {
        match value {
            GeometryValue::Point(_) => 1,
            GeometryValue::MultiPoint(points) | GeometryValue::LineString(points) => points.len(),
            GeometryValue::MultiLineString(lines) | GeometryValue::Polygon(lines) => {
                lines.iter().map(Vec::len).sum()
            },
            GeometryValue::MultiPolygon(polygons) => polygons
                .iter()
                .flat_map(|rings| rings.iter().map(Vec::len))
                .sum(),
            GeometryValue::GeometryCollection(members) => {
                members.iter().map(|g| count(&g.value)).sum()
            },
        }
    }
    count(&geometry.value) as u64
}

/// Counts records and vertices of a polyline or polygon feature class.
///
/// Returns `Ok(None)` for anything else. Rows with a null shape count as
/// records with no vertices.
///
/// # Errors
///
/// Returns the store's error if the dataset cannot be described or read.
pub fn count_vertices<S>(source: &S, dataset: &str) -> Result<Option<VertexCount>>
where
    S: MetadataSource + RowSource + ?Sized,
{
    let description = source.describe(dataset)?;
    if !matches!(
        description.shape_type,
        Some(ShapeType::Polygon | ShapeType::Polyline)
    ) {
        debug!("{dataset} has shape type {:?}", description.shape_type);
        return Ok(None);
    }

    let mut totals = VertexCount {
        records: 0,
        vertices: 0,
    };
    for row in source.read_rows(dataset, &[SHAPE_TOKEN])? {
        let row = row?;
        totals.records += 1;
        totals.vertices += row
            .values
            .first()
            .and_then(|shape| shape.as_geometry())
            .map_or(0, point_count);
    }
    info!(
        "{dataset}: {} record(s), {} vertice(s)",
        totals.records, totals.vertices
    );
    Ok(Some(totals))
}
