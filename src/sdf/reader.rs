use std::io::{self, BufRead};

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element;
use crate::hydrogen::remove_hs;
use crate::sanitize::sanitize;
use crate::Molecule;

use super::error::SdfError;
use super::{SdfReadOptions, V2000_MAX_COUNT};

const RECORD_END: &str = "$$$$";

/// Streaming reader over the records of an SDF file.
///
/// Each item is one record: either a molecule or the reason it was
/// rejected. Parse errors never end iteration; only an I/O error does.
pub struct SdfReader<R> {
    lines: io::Lines<R>,
    options: SdfReadOptions,
    line_no: usize,
    record: usize,
    finished: bool,
}

impl<R: BufRead> SdfReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, SdfReadOptions::default())
    }

    pub fn with_options(reader: R, options: SdfReadOptions) -> Self {
        Self {
            lines: reader.lines(),
            options,
            line_no: 0,
            record: 0,
            finished: false,
        }
    }

    /// Lines of the next record and the file line number of its first line.
    fn next_block(&mut self) -> Option<io::Result<(usize, Vec<String>)>> {
        if self.finished {
            return None;
        }
        let first_line = self.line_no + 1;
        let mut block = Vec::new();
        loop {
            match self.lines.next() {
                Some(Ok(line)) => {
                    self.line_no += 1;
                    let line = line.trim_end_matches('\r');
                    if line.trim_end() == RECORD_END {
                        return Some(Ok((first_line, block)));
                    }
                    block.push(line.to_string());
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e));
                }
                None => {
                    self.finished = true;
                    if block.iter().all(|l| l.trim().is_empty()) {
                        return None;
                    }
                    return Some(Ok((first_line, block)));
                }
            }
        }
    }

    fn prepare(&self, mol: Molecule, record: usize) -> Result<Molecule, SdfError> {
        let mut mol = if self.options.remove_hs {
            remove_hs(&mol)
        } else {
            mol
        };
        if self.options.sanitize {
            sanitize(&mut mol).map_err(|source| SdfError::Sanitize { record, source })?;
        }
        Ok(mol)
    }
}

impl<R: BufRead> Iterator for SdfReader<R> {
    type Item = Result<Molecule, SdfError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (first_line, lines) = match self.next_block()? {
            Ok(block) => block,
            Err(e) => return Some(Err(SdfError::Io(e))),
        };
        let record = self.record;
        self.record += 1;
        let parsed = RecordParser {
            lines: &lines,
            record,
            first_line,
        }
        .parse();
        Some(parsed.and_then(|mol| self.prepare(mol, record)))
    }
}

fn column(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

/// Old-style atom block charge code.
fn charge_from_code(code: u8) -> Option<i8> {
    match code {
        0 | 4 => Some(0),
        1 => Some(3),
        2 => Some(2),
        3 => Some(1),
        5 => Some(-1),
        6 => Some(-2),
        7 => Some(-3),
        _ => None,
    }
}

struct RecordParser<'a> {
    lines: &'a [String],
    record: usize,
    first_line: usize,
}

impl RecordParser<'_> {
    fn line_no(&self, offset: usize) -> usize {
        self.first_line + offset
    }

    fn parse(&self) -> Result<Molecule, SdfError> {
        let record = self.record;
        let counts = self
            .lines
            .get(3)
            .ok_or(SdfError::MissingCountsLine { record })?;
        if let Some(version) = counts.split_whitespace().find(|t| t.starts_with("V3")) {
            return Err(SdfError::UnsupportedVersion {
                record,
                version: version.to_string(),
            });
        }
        let (n_atoms, n_bonds) = parse_counts(counts).ok_or_else(|| SdfError::InvalidCount {
            record,
            line: self.line_no(3),
            content: counts.trim().to_string(),
        })?;

        let atom_start = 4;
        let bond_start = atom_start + n_atoms;
        let props_start = bond_start + n_bonds;
        if self.lines.len() < bond_start {
            return Err(SdfError::TruncatedBlock {
                record,
                block: "atom",
                expected: n_atoms,
                found: self.lines.len().saturating_sub(atom_start),
            });
        }
        if self.lines.len() < props_start {
            return Err(SdfError::TruncatedBlock {
                record,
                block: "bond",
                expected: n_bonds,
                found: self.lines.len() - bond_start,
            });
        }

        let mut mol = Molecule::new();
        mol.set_name(self.lines[0].trim_end());

        for offset in atom_start..bond_start {
            mol.add_atom(self.parse_atom(offset)?);
        }
        for offset in bond_start..props_start {
            let (a, b, order) = self.parse_bond(offset, n_atoms)?;
            mol.add_bond(NodeIndex::new(a), NodeIndex::new(b), Bond::new(order));
        }

        let end = self.lines[props_start..]
            .iter()
            .position(|l| l.starts_with("M  END"))
            .map(|p| props_start + p);
        self.apply_properties(&mut mol, props_start, end.unwrap_or(self.lines.len()))?;
        if let Some(end) = end {
            self.read_data_items(&mut mol, end + 1);
        }
        Ok(mol)
    }

    fn parse_atom(&self, offset: usize) -> Result<Atom, SdfError> {
        let line = &self.lines[offset];
        let err = |reason: String| SdfError::InvalidAtomLine {
            record: self.record,
            line: self.line_no(offset),
            reason,
        };

        let fixed = [
            column(line, 0, 10),
            column(line, 10, 20),
            column(line, 20, 30),
            column(line, 31, 34),
            column(line, 34, 36),
            column(line, 36, 39),
        ];
        let fields: Vec<&str> =
            if fixed[..3].iter().all(|f| f.parse::<f64>().is_ok()) && !fixed[3].is_empty() {
                fixed.to_vec()
            } else {
                line.split_whitespace().take(6).collect()
            };
        if fields.len() < 4 {
            return Err(err(format!("expected at least 4 fields, found {}", fields.len())));
        }

        let mut position = [0.0; 3];
        for (axis, value) in position.iter_mut().enumerate() {
            *value = fields[axis]
                .parse()
                .map_err(|_| err(format!("bad coordinate '{}'", fields[axis])))?;
        }

        let symbol = fields[3];
        let (atomic_num, isotope) = match symbol {
            "D" => (element::HYDROGEN, 2),
            "T" => (element::HYDROGEN, 3),
            _ => match element::atomic_num(symbol) {
                Some(z) => (z, 0),
                None => {
                    return Err(SdfError::UnknownElement {
                        record: self.record,
                        line: self.line_no(offset),
                        symbol: symbol.to_string(),
                    })
                }
            },
        };

        let mass_diff: i16 = match fields.get(4).filter(|f| !f.is_empty()) {
            Some(f) => f.parse().map_err(|_| err(format!("bad mass difference '{f}'")))?,
            None => 0,
        };
        let isotope = if mass_diff != 0 {
            let reference = element::nominal_mass(atomic_num)
                .ok_or_else(|| err(format!("no reference mass for {symbol}")))?;
            u16::try_from(reference as i32 + mass_diff as i32)
                .map_err(|_| err(format!("mass difference {mass_diff} out of range")))?
        } else {
            isotope
        };

        let formal_charge = match fields.get(5).filter(|f| !f.is_empty()) {
            Some(f) => f
                .parse::<u8>()
                .ok()
                .and_then(charge_from_code)
                .ok_or_else(|| err(format!("bad charge code '{f}'")))?,
            None => 0,
        };

        Ok(Atom {
            atomic_num,
            formal_charge,
            isotope,
            position,
            ..Atom::default()
        })
    }

    fn parse_bond(
        &self,
        offset: usize,
        n_atoms: usize,
    ) -> Result<(usize, usize, BondOrder), SdfError> {
        let line = &self.lines[offset];
        let err = |reason: String| SdfError::InvalidBondLine {
            record: self.record,
            line: self.line_no(offset),
            reason,
        };

        let fixed = [column(line, 0, 3), column(line, 3, 6), column(line, 6, 9)];
        let fields: Vec<&str> = if fixed.iter().all(|f| f.parse::<usize>().is_ok()) {
            fixed.to_vec()
        } else {
            line.split_whitespace().take(3).collect()
        };
        if fields.len() < 3 {
            return Err(err(format!("expected 3 fields, found {}", fields.len())));
        }

        let mut ends = [0usize; 2];
        for (slot, field) in ends.iter_mut().zip(&fields[..2]) {
            let serial: usize = field
                .parse()
                .map_err(|_| err(format!("bad atom number '{field}'")))?;
            if serial == 0 || serial > n_atoms {
                return Err(err(format!("atom number {serial} outside 1..={n_atoms}")));
            }
            *slot = serial - 1;
        }
        if ends[0] == ends[1] {
            return Err(err(format!("bond joins atom {} to itself", ends[0] + 1)));
        }

        let order = fields[2]
            .parse::<u8>()
            .ok()
            .and_then(BondOrder::from_mdl_code)
            .ok_or_else(|| err(format!("unsupported bond type '{}'", fields[2])))?;
        Ok((ends[0], ends[1], order))
    }

    /// Apply `M  CHG` and `M  ISO` lines in `start..end`. Any `M  CHG` line
    /// supersedes every charge given in the atom block.
    fn apply_properties(
        &self,
        mol: &mut Molecule,
        start: usize,
        end: usize,
    ) -> Result<(), SdfError> {
        let mut charges = Vec::new();
        let mut isotopes = Vec::new();
        let mut saw_charges = false;
        for offset in start..end {
            let line = &self.lines[offset];
            if line.starts_with("M  CHG") {
                saw_charges = true;
                charges.extend(self.parse_pairs(offset, mol.atom_count())?);
            } else if line.starts_with("M  ISO") {
                isotopes.extend(self.parse_pairs(offset, mol.atom_count())?);
            }
        }

        if saw_charges {
            for idx in mol.atoms().collect::<Vec<_>>() {
                mol.atom_mut(idx).formal_charge = 0;
            }
        }
        for (offset, idx, value) in charges {
            mol.atom_mut(NodeIndex::new(idx)).formal_charge = i8::try_from(value)
                .map_err(|_| self.property_error(offset, format!("charge {value} out of range")))?;
        }
        for (offset, idx, value) in isotopes {
            mol.atom_mut(NodeIndex::new(idx)).isotope = u16::try_from(value)
                .map_err(|_| self.property_error(offset, format!("isotope {value} out of range")))?;
        }
        Ok(())
    }

    fn property_error(&self, offset: usize, reason: String) -> SdfError {
        SdfError::InvalidProperty {
            record: self.record,
            line: self.line_no(offset),
            reason,
        }
    }

    /// `M  XXXnn8 aaa vvv ...`: a count followed by (atom, value) pairs.
    fn parse_pairs(
        &self,
        offset: usize,
        n_atoms: usize,
    ) -> Result<Vec<(usize, usize, i64)>, SdfError> {
        let line = &self.lines[offset];
        let tokens: Vec<&str> = line.get(6..).unwrap_or("").split_whitespace().collect();
        let count: usize = tokens
            .first()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| self.property_error(offset, "missing entry count".into()))?;
        if tokens.len() != 1 + 2 * count {
            return Err(self.property_error(
                offset,
                format!("expected {count} pairs, found {} values", tokens.len() - 1),
            ));
        }
        tokens[1..]
            .chunks(2)
            .map(|pair| {
                let serial: usize = pair[0].parse().map_err(|_| {
                    self.property_error(offset, format!("bad atom number '{}'", pair[0]))
                })?;
                if serial == 0 || serial > n_atoms {
                    return Err(self.property_error(
                        offset,
                        format!("atom number {serial} outside 1..={n_atoms}"),
                    ));
                }
                let value: i64 = pair[1]
                    .parse()
                    .map_err(|_| self.property_error(offset, format!("bad value '{}'", pair[1])))?;
                Ok((offset, serial - 1, value))
            })
            .collect()
    }

    /// `> <name>` headers followed by value lines up to a blank line.
    fn read_data_items(&self, mol: &mut Molecule, start: usize) {
        let mut offset = start;
        while offset < self.lines.len() {
            let header = &self.lines[offset];
            offset += 1;
            if !header.starts_with('>') {
                continue;
            }
            let name = match (header.find('<'), header.rfind('>')) {
                (Some(open), Some(close)) if close > open => &header[open + 1..close],
                _ => header[1..].trim(),
            };
            let mut value = Vec::new();
            while offset < self.lines.len() && !self.lines[offset].trim().is_empty() {
                value.push(self.lines[offset].as_str());
                offset += 1;
            }
            mol.set_property(name, value.join("\n"));
        }
    }
}

/// Atom and bond counts, each within the V2000 limit.
fn parse_counts(line: &str) -> Option<(usize, usize)> {
    let fixed = (column(line, 0, 3).parse(), column(line, 3, 6).parse());
    let (atoms, bonds) = if let (Ok(atoms), Ok(bonds)) = fixed {
        (atoms, bonds)
    } else {
        let mut tokens = line.split_whitespace();
        let atoms = tokens.next()?.parse().ok()?;
        let bonds = tokens.next()?.parse().ok()?;
        (atoms, bonds)
    };
    (atoms <= V2000_MAX_COUNT && bonds <= V2000_MAX_COUNT).then_some((atoms, bonds))
}
