use std::fs;
use std::path::Path;

use log::debug;
use nalgebra::{Matrix3, Vector3};

use crate::base::{Cell, Lattice, NaborError, Position};

/// Read a geometry file, dispatching on its name: `.xyz` and `.geo` files
/// are molecular (non-periodic), files named `POSCAR*` or `CONTCAR*` are
/// periodic VASP5 cells.
pub fn read_geometry(path: &Path) -> Result<Cell, NaborError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();

    if extension == "xyz" {
        debug!("loading {} as .xyz file", path.display());
        read_xyz(path, false)
    } else if extension == "geo" {
        debug!("loading {} as .geo file", path.display());
        read_geo(path, false)
    } else if file_name.starts_with("POSCAR") || file_name.starts_with("CONTCAR") {
        debug!("loading {} as POSCAR/CONTCAR file", path.display());
        read_poscar(path)
    } else {
        Err(NaborError::InvalidInput(format!(
            "unsupported geometry format: {}",
            path.display()
        )))
    }
}

/// Read an XYZ file: atom count, comment, then `element x y z` per line.
/// `center` shifts the centroid to the origin.
pub fn read_xyz(path: &Path, center: bool) -> Result<Cell, NaborError> {
    let text = fs::read_to_string(path)?;
    let mut lines = text.lines();

    let nr_atoms: usize = lines
        .next()
        .ok_or_else(|| truncated(path))?
        .trim()
        .parse()
        .map_err(|_| {
            NaborError::InvalidInput(format!("malformed atom count in {}", path.display()))
        })?;
    lines.next().ok_or_else(|| truncated(path))?;

    let mut positions = Vec::with_capacity(nr_atoms);
    let mut elements = Vec::with_capacity(nr_atoms);
    for _ in 0..nr_atoms {
        let line = lines.next().ok_or_else(|| truncated(path))?;
        let mut fields = line.split_whitespace();
        let element = fields.next().ok_or_else(|| truncated(path))?;
        elements.push(element.to_string());
        positions.push(parse_position(&mut fields, path)?);
    }

    Ok(molecular_cell(positions, elements, center))
}

/// Read a `.geo` file: three header lines, then `index element x y z` per
/// line; trailing blank lines are tolerated.
pub fn read_geo(path: &Path, center: bool) -> Result<Cell, NaborError> {
    let text = fs::read_to_string(path)?;

    let mut positions = Vec::new();
    let mut elements = Vec::new();
    for line in text.lines().skip(3) {
        let mut fields = line.split_whitespace();
        let Some(_index) = fields.next() else {
            continue;
        };
        let element = fields.next().ok_or_else(|| truncated(path))?;
        elements.push(element.to_string());
        positions.push(parse_position(&mut fields, path)?);
    }

    Ok(molecular_cell(positions, elements, center))
}

/// Read a periodic cell from a VASP5 POSCAR/CONTCAR file
pub fn read_poscar(path: &Path) -> Result<Cell, NaborError> {
    let text = fs::read_to_string(path)?;
    let mut lines = text.lines();

    // comment line
    lines.next().ok_or_else(|| truncated(path))?;

    let scale: f64 = lines
        .next()
        .ok_or_else(|| truncated(path))?
        .trim()
        .parse()
        .map_err(|_| {
            NaborError::InvalidInput(format!("malformed scaling factor in {}", path.display()))
        })?;

    let mut row_basis = Matrix3::zeros();
    for row in 0..3 {
        let line = lines.next().ok_or_else(|| truncated(path))?;
        let vector = parse_position(&mut line.split_whitespace(), path)?;
        row_basis.set_row(row, &(vector * scale).transpose());
    }

    // VASP5 carries an element-symbol line; a purely numeric line means VASP4
    let element_line = lines.next().ok_or_else(|| truncated(path))?;
    if !element_line.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(NaborError::InvalidInput(format!(
            "{} looks like a VASP4 POSCAR file; only VASP5+ files are supported",
            path.display()
        )));
    }
    let symbols: Vec<&str> = element_line.split_whitespace().collect();

    let counts = lines
        .next()
        .ok_or_else(|| truncated(path))?
        .split_whitespace()
        .map(|field| {
            field.parse::<usize>().map_err(|_| {
                NaborError::InvalidInput(format!("malformed element count in {}", path.display()))
            })
        })
        .collect::<Result<Vec<usize>, NaborError>>()?;
    if counts.len() != symbols.len() {
        return Err(NaborError::InvalidInput(format!(
            "element symbols and counts disagree in {}",
            path.display()
        )));
    }

    let mut mode = lines.next().ok_or_else(|| truncated(path))?;
    if mode.trim_start().starts_with(['S', 's']) {
        // selective dynamics; the flags per atom are ignored
        mode = lines.next().ok_or_else(|| truncated(path))?;
    }
    let direct = mode.trim_start().starts_with(['D', 'd']);

    let lattice = Lattice::new(row_basis);
    let mut positions = Vec::new();
    let mut elements = Vec::new();
    for (symbol, count) in symbols.iter().zip(counts.iter()) {
        for _ in 0..*count {
            let line = lines.next().ok_or_else(|| truncated(path))?;
            let vector = parse_position(&mut line.split_whitespace(), path)?;
            if direct {
                positions.push(lattice.cartesian_coords(&vector));
            } else {
                positions.push(vector * scale);
            }
            elements.push(symbol.to_string());
        }
    }

    Ok(Cell::new(lattice, positions, elements, true))
}

fn parse_position<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    path: &Path,
) -> Result<Vector3<f64>, NaborError> {
    let mut coords = [0.0; 3];
    for coord in coords.iter_mut() {
        *coord = fields
            .next()
            .ok_or_else(|| truncated(path))?
            .parse()
            .map_err(|_| {
                NaborError::InvalidInput(format!("malformed coordinate in {}", path.display()))
            })?;
    }
    Ok(Vector3::new(coords[0], coords[1], coords[2]))
}

/// Wrap a molecular structure in a synthetic box spanning five times its
/// largest absolute coordinate per axis
fn molecular_cell(mut positions: Vec<Position>, elements: Vec<String>, center: bool) -> Cell {
    if center && !positions.is_empty() {
        let centroid = positions
            .iter()
            .fold(Vector3::zeros(), |acc, position| acc + position)
            / positions.len() as f64;
        for position in positions.iter_mut() {
            *position -= centroid;
        }
    }

    let mut extent = Vector3::zeros();
    for position in &positions {
        extent = extent.sup(&position.abs());
    }
    let lattice = Lattice::new(Matrix3::from_diagonal(&(extent * 5.0)));

    Cell::new(lattice, positions, elements, false)
}

fn truncated(path: &Path) -> NaborError {
    NaborError::InvalidInput(format!("truncated geometry file: {}", path.display()))
}
