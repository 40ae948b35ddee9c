//! Position files and whitespace-separated numeric output

use crate::lattice::{Geometry, LatticeGas};
use color_eyre::eyre::{eyre, Result, WrapErr};
use itertools::Itertools;
use nalgebra::Vector3;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Parse one `x y z` row per atom
///
/// Blank lines are skipped. When `expected` is given, a file with any other
/// number of rows is an error.
pub fn read_positions<R: BufRead>(reader: R, expected: Option<usize>) -> Result<Vec<Vector3<f64>>> {
    let mut positions = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.wrap_err_with(|| format!("Unable to read line {}", line_no + 1))?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 3 {
            return Err(eyre!(
                "line {}: expected 3 coordinates, found {} fields",
                line_no + 1,
                fields.len()
            ));
        }
        let mut coords = [0.0; 3];
        for (c, field) in coords.iter_mut().zip(&fields) {
            *c = field
                .parse()
                .wrap_err_with(|| format!("line {}: invalid coordinate '{}'", line_no + 1, field))?;
        }
        positions.push(Vector3::from(coords));
    }

    if let Some(n) = expected {
        if positions.len() != n {
            return Err(eyre!("expected {} atoms, found {} rows", n, positions.len()));
        }
    }
    Ok(positions)
}

/// Load a position file from disk
pub fn load_positions<P: AsRef<Path>>(path: P, expected: Option<usize>) -> Result<Vec<Vector3<f64>>> {
    let path = path.as_ref();
    let file = File::open(path)
        .wrap_err_with(|| format!("Unable to open position file: {}", path.display()))?;
    read_positions(BufReader::new(file), expected)
        .wrap_err_with(|| format!("Invalid position file: {}", path.display()))
}

/// Create (or truncate) the data file `name` inside `dir`, creating `dir` first
pub fn create_data_file(dir: &Path, name: &str) -> Result<BufWriter<File>> {
    fs::create_dir_all(dir)
        .wrap_err_with(|| format!("Could not create output directory: {}", dir.display()))?;
    let path = dir.join(name);
    let file = File::create(&path)
        .wrap_err_with(|| format!("Could not create data file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Format like C's `%.15e`: 15 mantissa digits and a signed exponent of at
/// least two digits
pub fn format_sci(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = format!("{:.15e}", x);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => s,
    }
}

/// Write one space-separated row of `%.15e` values
pub fn write_row<W: Write>(writer: &mut W, values: &[f64]) -> Result<()> {
    writeln!(writer, "{}", values.iter().map(|&v| format_sci(v)).join(" "))?;
    Ok(())
}

pub fn write_positions<W: Write>(writer: &mut W, positions: &[Vector3<f64>]) -> Result<()> {
    for p in positions {
        write_row(writer, p.as_slice())?;
    }
    Ok(())
}

/// Write the integer grid coordinates of every atom, in atom-index order
pub fn write_lattice_configuration<W: Write, G: Geometry>(
    writer: &mut W,
    gas: &LatticeGas<G>,
) -> Result<()> {
    for atom in 0..gas.n_atoms() {
        writeln!(writer, "{}", gas.atom_coordinates(atom).iter().join(" "))?;
    }
    Ok(())
}
