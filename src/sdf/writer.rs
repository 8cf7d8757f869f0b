use std::io::{self, Write};

use tracing::warn;

use crate::bond::BondOrder;
use crate::kekulize::{kekulize, KekulizeError};
use crate::valence::update_property_cache;
use crate::Molecule;

use super::{SdfWriteOptions, V2000_MAX_COUNT};

const ENTRIES_PER_LINE: usize = 8;

/// Writes molecules as V2000 records separated by `$$$$`.
pub struct SdfWriter<W: Write> {
    inner: W,
    options: SdfWriteOptions,
    written: usize,
}

impl<W: Write> SdfWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_options(inner, SdfWriteOptions::default())
    }

    pub fn with_options(inner: W, options: SdfWriteOptions) -> Self {
        Self {
            inner,
            options,
            written: 0,
        }
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Append one record.
    ///
    /// With `kekulize` set, aromatic bonds are written as single/double on a
    /// kekulized copy; if no Kekulé form exists they are written as type 4.
    pub fn write(&mut self, mol: &Molecule) -> io::Result<()> {
        if mol.atom_count() > V2000_MAX_COUNT || mol.bond_count() > V2000_MAX_COUNT {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "V2000 records hold at most {V2000_MAX_COUNT} atoms and bonds, got {} and {}",
                    mol.atom_count(),
                    mol.bond_count()
                ),
            ));
        }
        check_coordinates(mol)?;

        let has_aromatic = mol
            .bonds()
            .any(|e| mol.bond(e).order == BondOrder::Aromatic);
        if self.options.kekulize && has_aromatic {
            match kekulized_copy(mol) {
                Ok(copy) => write_record(&mut self.inner, &copy)?,
                Err(err) => {
                    warn!(molecule = %mol.name(), error = %err, "writing aromatic bonds as type 4");
                    write_record(&mut self.inner, mol)?;
                }
            }
        } else {
            write_record(&mut self.inner, mol)?;
        }
        self.written += 1;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Largest magnitude a `%10.4f` coordinate column holds.
const V2000_MAX_COORD: f64 = 9999.9999;

fn check_coordinates(mol: &Molecule) -> io::Result<()> {
    for idx in mol.atoms() {
        let position = mol.atom(idx).position;
        // Negated so NaN is caught too.
        if !position.iter().all(|v| v.abs() <= V2000_MAX_COORD) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "atom {} at {position:?} does not fit the V2000 coordinate columns",
                    idx.index() + 1
                ),
            ));
        }
    }
    Ok(())
}

fn kekulized_copy(mol: &Molecule) -> Result<Molecule, KekulizeError> {
    let mut copy = mol.clone();
    // Lenient mode never returns an error.
    let _ = update_property_cache(&mut copy, false);
    kekulize(&mut copy)?;
    Ok(copy)
}

fn write_record<W: Write>(w: &mut W, mol: &Molecule) -> io::Result<()> {
    writeln!(w, "{}", mol.name().lines().next().unwrap_or(""))?;
    writeln!(w, "  molprep         3D")?;
    writeln!(w)?;
    writeln!(
        w,
        "{:>3}{:>3}  0  0  0  0  0  0  0  0999 V2000",
        mol.atom_count(),
        mol.bond_count()
    )?;

    for idx in mol.atoms() {
        let atom = mol.atom(idx);
        let [x, y, z] = atom.position;
        let symbol = if atom.atomic_num == 0 { "*" } else { atom.symbol() };
        writeln!(
            w,
            "{x:>10.4}{y:>10.4}{z:>10.4} {symbol:<3} 0  0  0  0  0  0  0  0  0  0  0  0"
        )?;
    }

    for e in mol.bonds() {
        let Some((a, b)) = mol.bond_endpoints(e) else {
            continue;
        };
        writeln!(
            w,
            "{:>3}{:>3}{:>3}  0",
            a.index() + 1,
            b.index() + 1,
            mol.bond(e).order.mdl_code()
        )?;
    }

    let charges: Vec<(usize, i32)> = mol
        .atoms()
        .filter(|&idx| mol.atom(idx).formal_charge != 0)
        .map(|idx| (idx.index() + 1, mol.atom(idx).formal_charge as i32))
        .collect();
    write_property_lines(w, "CHG", &charges)?;

    let isotopes: Vec<(usize, i32)> = mol
        .atoms()
        .filter(|&idx| mol.atom(idx).isotope != 0)
        .map(|idx| (idx.index() + 1, mol.atom(idx).isotope as i32))
        .collect();
    write_property_lines(w, "ISO", &isotopes)?;

    writeln!(w, "M  END")?;

    for (key, value) in mol.properties() {
        writeln!(w, "> <{key}>")?;
        // A blank line ends the value and `$$$$` ends the record.
        for line in value.lines() {
            if line.trim().is_empty() || line.trim_end() == "$$$$" {
                warn!(
                    molecule = %mol.name(),
                    property = %key,
                    "dropping value line that would end the field"
                );
                continue;
            }
            writeln!(w, "{line}")?;
        }
        writeln!(w)?;
    }
    writeln!(w, "$$$$")
}

fn write_property_lines<W: Write>(
    w: &mut W,
    tag: &str,
    entries: &[(usize, i32)],
) -> io::Result<()> {
    for chunk in entries.chunks(ENTRIES_PER_LINE) {
        write!(w, "M  {tag}{:>3}", chunk.len())?;
        for (serial, value) in chunk {
            write!(w, " {serial:>3} {value:>3}")?;
        }
        writeln!(w)?;
    }
    Ok(())
}
