//! XYZ trajectories: repeated blocks of an atom count, a comment line and
//! one `symbol x y z` line per atom.

mod error;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use ndarray::Array3;
use tracing::{debug, instrument};

use crate::Molecule;

pub use error::XyzError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct XyzFrame {
    pub comment: String,
    pub symbols: Vec<String>,
    pub coords: Vec<[f64; 3]>,
}

impl XyzFrame {
    /// Frame holding a molecule's element symbols and positions.
    pub fn from_molecule(mol: &Molecule, comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            symbols: mol
                .atoms()
                .map(|idx| mol.atom(idx).symbol().to_string())
                .collect(),
            coords: mol.positions(),
        }
    }

    pub fn atom_count(&self) -> usize {
        self.coords.len()
    }
}

/// Frames of one XYZ file, all with the same atom count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XyzTrajectory {
    frames: Vec<XyzFrame>,
}

impl XyzTrajectory {
    /// Build a trajectory, rejecting frames whose atom count differs from
    /// the first.
    pub fn from_frames(frames: Vec<XyzFrame>) -> Result<Self, XyzError> {
        if let Some(first) = frames.first() {
            let expected = first.atom_count();
            for (frame, f) in frames.iter().enumerate() {
                if f.atom_count() != expected || f.symbols.len() != expected {
                    return Err(XyzError::InconsistentAtomCount {
                        frame,
                        expected,
                        found: f.atom_count(),
                    });
                }
            }
        }
        Ok(Self { frames })
    }

    pub fn frames(&self) -> &[XyzFrame] {
        &self.frames
    }

    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn n_atoms(&self) -> usize {
        self.frames.first().map_or(0, XyzFrame::atom_count)
    }

    /// Coordinates as a `(frames, atoms, 3)` array.
    pub fn coords(&self) -> Array3<f64> {
        let mut out = Array3::zeros((self.n_frames(), self.n_atoms(), 3));
        for (f, frame) in self.frames.iter().enumerate() {
            for (a, xyz) in frame.coords.iter().enumerate() {
                for (axis, &value) in xyz.iter().enumerate() {
                    out[[f, a, axis]] = value;
                }
            }
        }
        out
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, XyzError> {
        let mut lines = reader.lines().enumerate().map(|(i, l)| (i + 1, l));
        let mut frames: Vec<XyzFrame> = Vec::new();

        while let Some((line_no, line)) = lines.next() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let frame = frames.len();
            let n_atoms: usize = trimmed.parse().map_err(|_| XyzError::InvalidAtomCount {
                line: line_no,
                content: trimmed.to_string(),
            })?;
            if let Some(first) = frames.first() {
                if first.atom_count() != n_atoms {
                    return Err(XyzError::InconsistentAtomCount {
                        frame,
                        expected: first.atom_count(),
                        found: n_atoms,
                    });
                }
            }

            let truncated = |found| XyzError::Truncated {
                frame,
                expected: n_atoms,
                found,
            };
            let comment = match lines.next() {
                Some((_, line)) => line?.trim_end().to_string(),
                None => return Err(truncated(0)),
            };

            // The count is untrusted; grow as lines actually arrive.
            let mut symbols = Vec::new();
            let mut coords = Vec::new();
            for found in 0..n_atoms {
                let Some((line_no, line)) = lines.next() else {
                    return Err(truncated(found));
                };
                let line = line?;
                let (symbol, xyz) = parse_atom_line(&line).ok_or_else(|| {
                    XyzError::InvalidCoordinate {
                        line: line_no,
                        content: line.trim().to_string(),
                    }
                })?;
                symbols.push(symbol);
                coords.push(xyz);
            }
            frames.push(XyzFrame {
                comment,
                symbols,
                coords,
            });
        }

        Ok(Self { frames })
    }

    pub fn to_writer<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        for frame in &self.frames {
            writeln!(w, "{}", frame.atom_count())?;
            writeln!(w, "{}", frame.comment.lines().next().unwrap_or(""))?;
            for (symbol, [x, y, z]) in frame.symbols.iter().zip(&frame.coords) {
                writeln!(w, "{symbol:<3}{x:>16.8}{y:>16.8}{z:>16.8}")?;
            }
        }
        w.flush()
    }
}

/// `symbol x y z`; columns after z are ignored.
fn parse_atom_line(line: &str) -> Option<(String, [f64; 3])> {
    let mut fields = line.split_whitespace();
    let symbol = fields.next()?.to_string();
    let mut xyz = [0.0; 3];
    for value in &mut xyz {
        *value = fields.next()?.parse().ok()?;
    }
    Some((symbol, xyz))
}

/// Read all frames of an XYZ file.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_xyz(path: impl AsRef<Path>) -> Result<XyzTrajectory, XyzError> {
    let file = File::open(path.as_ref())?;
    let trajectory = XyzTrajectory::from_reader(BufReader::new(file))?;
    debug!(
        frames = trajectory.n_frames(),
        atoms = trajectory.n_atoms(),
        "XYZ trajectory read"
    );
    Ok(trajectory)
}

/// Coordinates of every frame as a `(frames, atoms, 3)` array.
///
/// Any malformed or truncated frame fails the whole read.
pub fn read_xyz_coords(path: impl AsRef<Path>) -> Result<Array3<f64>, XyzError> {
    Ok(read_xyz(path)?.coords())
}

#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn write_xyz(path: impl AsRef<Path>, trajectory: &XyzTrajectory) -> std::io::Result<()> {
    let file = File::create(path.as_ref())?;
    trajectory.to_writer(BufWriter::new(file))?;
    debug!(frames = trajectory.n_frames(), "XYZ trajectory written");
    Ok(())
}
