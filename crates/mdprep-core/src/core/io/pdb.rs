use crate::core::models::bounding_box::{BoundingBox, CoordinateExtent};
use nalgebra::Point3;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

const COORDINATE_RECORDS: [&str; 2] = ["ATOM", "HETATM"];

/// Column ranges (0-based, end-exclusive) of the X, Y and Z fields.
const COORDINATE_FIELDS: [(usize, usize); 3] = [(30, 38), (38, 46), (46, 54)];

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Line is too short for a coordinate field in columns {columns}")]
    LineTooShort { columns: String },
}

fn parse_coordinate(
    line: &str,
    line_num: usize,
    start: usize,
    end: usize,
) -> Result<f64, PdbError> {
    let columns = format!("{}-{}", start + 1, end);
    let Some(field) = line.get(start..end) else {
        return Err(PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::LineTooShort { columns },
        });
    };
    let value = field.trim();
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns,
            value: value.into(),
        },
    })
}

/// Reads the position of every `ATOM`/`HETATM` record in a PDB stream.
///
/// Any other record is ignored. A coordinate record with a missing or
/// malformed numeric field aborts the scan.
pub fn read_coordinates(reader: &mut impl BufRead) -> Result<Vec<Point3<f64>>, PdbError> {
    let mut positions = Vec::new();

    for (line_num, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let line_num = line_num + 1;

        if !COORDINATE_RECORDS
            .iter()
            .any(|record| line.starts_with(record))
        {
            continue;
        }

        let [x, y, z] = COORDINATE_FIELDS
            .map(|(start, end)| parse_coordinate(&line, line_num, start, end));
        positions.push(Point3::new(x?, y?, z?));
    }

    Ok(positions)
}

/// Computes the periodic cell for the structure in a PDB stream.
pub fn read_bounding_box(reader: &mut impl BufRead) -> Result<BoundingBox, PdbError> {
    let mut extent = CoordinateExtent::default();
    for position in read_coordinates(reader)? {
        extent.include(&position);
    }
    Ok(extent.finish())
}

/// Computes the periodic cell for the PDB file at `path`.
pub fn bounding_box_from_path<P: AsRef<Path>>(path: P) -> Result<BoundingBox, PdbError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    read_bounding_box(&mut reader)
}
