use nalgebra::{Point3, Vector3};

/// Padding added on each side of the solute along every axis, in Å.
pub const BOX_MARGIN: f64 = 2.0;

/// Edge length used when a structure has no coordinate records, in Å.
pub const FALLBACK_EDGE: f64 = 80.0;

/// Periodic cell derived from a set of atomic coordinates.
///
/// `dimensions` holds the padded per-axis extents that become the cell basis
/// vectors; `center` is the midpoint of the unpadded coordinate range and
/// becomes the cell origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub dimensions: Vector3<f64>,
    pub center: Point3<f64>,
}

impl BoundingBox {
    /// The cell used when no coordinates are available.
    pub fn fallback() -> Self {
        Self {
            dimensions: Vector3::repeat(FALLBACK_EDGE),
            center: Point3::origin(),
        }
    }

    /// Builds the cell enclosing `points`, or the fallback cell if empty.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let mut extent = CoordinateExtent::default();
        for point in points {
            extent.include(&point);
        }
        extent.finish()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Running per-axis minimum and maximum of a coordinate stream.
#[derive(Debug, Clone, Default)]
pub struct CoordinateExtent {
    bounds: Option<(Point3<f64>, Point3<f64>)>,
}

impl CoordinateExtent {
    pub fn include(&mut self, point: &Point3<f64>) {
        self.bounds = Some(match self.bounds {
            None => (*point, *point),
            Some((min, max)) => (min.inf(point), max.sup(point)),
        });
    }

    pub fn finish(&self) -> BoundingBox {
        match self.bounds {
            None => BoundingBox::fallback(),
            Some((min, max)) => BoundingBox {
                dimensions: (max - min).add_scalar(2.0 * BOX_MARGIN),
                center: nalgebra::center(&min, &max),
            },
        }
    }
}
