//! Structural sanitization: valence check, kekulization and aromaticity
//! perception, in that order.

use thiserror::Error;
use tracing::debug;

use crate::aromaticity::set_aromaticity;
use crate::atom::Atom;
use crate::bond::Bond;
use crate::kekulize::{kekulize, KekulizeError};
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::valence::{update_property_cache, ValenceError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error("valence check failed: {}", format_valence_errors(.0))]
    Valence(Vec<ValenceError>),
    #[error(transparent)]
    Kekulize(#[from] KekulizeError),
}

fn format_valence_errors(errors: &[ValenceError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ValenceError>> for SanitizeError {
    fn from(errors: Vec<ValenceError>) -> Self {
        SanitizeError::Valence(errors)
    }
}

/// Validate and normalize a molecule in place.
///
/// Steps:
/// 1. recompute implicit hydrogens, rejecting any atom over its valence;
/// 2. kekulize aromatic bond types;
/// 3. clear every aromatic flag and re-perceive aromaticity on SSSR rings.
///
/// Afterwards aromatic rings carry `BondOrder::Aromatic` bonds and flagged
/// atoms, and everything else is Kekulé. The molecule may be partially
/// updated when an error is returned.
pub fn sanitize(mol: &mut Mol<Atom, Bond>) -> Result<(), SanitizeError> {
    let result = sanitize_inner(mol);
    if let Err(err) = &result {
        debug!(molecule = %mol.name(), error = %err, "sanitization failed");
    }
    result
}

fn sanitize_inner(mol: &mut Mol<Atom, Bond>) -> Result<(), SanitizeError> {
    update_property_cache(mol, true)?;
    kekulize(mol)?;
    // Kekulé orders change the explicit valence of atoms next to former
    // aromatic bonds.
    update_property_cache(mol, true)?;
    let rings = RingInfo::sssr(mol);
    set_aromaticity(mol, &rings);
    Ok(())
}
