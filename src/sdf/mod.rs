//! MDL SDF (V2000) reading and writing.

mod error;
mod reader;
mod writer;

use std::borrow::Borrow;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::Molecule;

pub use error::SdfError;
pub use reader::SdfReader;
pub use writer::SdfWriter;

/// Largest atom or bond count the V2000 counts line can hold.
pub(crate) const V2000_MAX_COUNT: usize = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdfReadOptions {
    /// Run full sanitization on every record.
    pub sanitize: bool,
    /// Fold explicit hydrogen atoms into their parents.
    pub remove_hs: bool,
    /// Fail on the first bad record instead of skipping it.
    pub strict: bool,
}

impl Default for SdfReadOptions {
    fn default() -> Self {
        Self {
            sanitize: true,
            remove_hs: false,
            strict: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdfWriteOptions {
    /// Write aromatic bonds in Kekulé form when possible.
    pub kekulize: bool,
}

impl Default for SdfWriteOptions {
    fn default() -> Self {
        Self { kekulize: true }
    }
}

/// Read every parsable molecule from an SDF file.
///
/// Records that fail to parse or sanitize are skipped and logged at warn
/// level. Hydrogens are kept as atoms.
pub fn read_sdf(path: impl AsRef<Path>) -> io::Result<Vec<Molecule>> {
    read_sdf_with(path, &SdfReadOptions::default()).map_err(io::Error::from)
}

#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_sdf_with(
    path: impl AsRef<Path>,
    options: &SdfReadOptions,
) -> Result<Vec<Molecule>, SdfError> {
    let file = File::open(path.as_ref())?;
    read_sdf_from(BufReader::new(file), options)
}

/// [`read_sdf_with`] over any buffered reader.
pub fn read_sdf_from<R: BufRead>(
    reader: R,
    options: &SdfReadOptions,
) -> Result<Vec<Molecule>, SdfError> {
    let mut mols = Vec::new();
    let mut skipped = 0usize;
    for result in SdfReader::with_options(reader, *options) {
        match result {
            Ok(mol) => mols.push(mol),
            Err(err @ SdfError::Io(_)) => return Err(err),
            Err(err) if options.strict => return Err(err),
            Err(err) => {
                skipped += 1;
                warn!(error = %err, "skipping SDF record");
            }
        }
    }
    debug!(read = mols.len(), skipped, "SDF input consumed");
    Ok(mols)
}

/// Write one or more molecules to an SDF file, replacing it.
///
/// Accepts anything iterable over molecules or references to them, so both
/// `write_sdf(path, [&mol])` and `write_sdf(path, &mols)` work.
pub fn write_sdf<I>(path: impl AsRef<Path>, mols: I) -> io::Result<()>
where
    I: IntoIterator,
    I::Item: Borrow<Molecule>,
{
    write_sdf_with(path, mols, &SdfWriteOptions::default())
}

#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn write_sdf_with<I>(
    path: impl AsRef<Path>,
    mols: I,
    options: &SdfWriteOptions,
) -> io::Result<()>
where
    I: IntoIterator,
    I::Item: Borrow<Molecule>,
{
    let file = File::create(path.as_ref())?;
    let mut writer = SdfWriter::with_options(BufWriter::new(file), *options);
    for mol in mols {
        writer.write(mol.borrow())?;
    }
    debug!(written = writer.written(), "SDF output written");
    writer.finish()?;
    Ok(())
}
