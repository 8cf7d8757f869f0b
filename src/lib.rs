pub mod aromaticity;
pub mod atom;
pub mod bond;
pub mod element;
pub mod hydrogen;
pub mod kekulize;
pub mod mol;
pub mod regularize;
pub mod rings;
pub mod sanitize;
pub mod sdf;
pub mod substruct;
pub mod traits;
pub mod valence;
pub mod xyz;

pub use aromaticity::{find_aromatic_atoms, find_aromatic_rings, set_aromaticity};
pub use atom::Atom;
pub use bond::{Bond, BondOrder};
pub use hydrogen::remove_hs;
pub use kekulize::{kekulize, KekulizeError};
pub use mol::Mol;
pub use regularize::{
    fix_aromatic, regularize_aromaticity, regularized, RegularizeOptions, RegularizeReport,
    Regularizer,
};
pub use rings::{RingInfo, RingPerception, Sssr};
pub use sanitize::{sanitize, SanitizeError};
pub use sdf::{
    read_sdf, read_sdf_with, write_sdf, write_sdf_with, SdfError, SdfReadOptions, SdfReader,
    SdfWriteOptions, SdfWriter,
};
pub use substruct::{AtomPattern, AtomQuery, BondQuery, Pattern};
pub use traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount, HasPosition3D};
pub use valence::{update_property_cache, ValenceError};
pub use xyz::{read_xyz, read_xyz_coords, write_xyz, XyzError, XyzFrame, XyzTrajectory};

/// The concrete molecule type produced by the readers and consumed by the
/// preparation passes.
pub type Molecule = Mol<Atom, Bond>;


#[cfg(test)]
pub(crate) mod test_support;
