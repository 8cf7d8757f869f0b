/// Default atom type for a molecular graph node.
///
/// `Atom` stores what a structure file says about an atom plus the two
/// derived values that sanitization fills in (`implicit_hydrogens` and
/// `is_aromatic`).
///
/// # Examples
///
/// ```
/// use molprep::Atom;
///
/// let nitrogen = Atom {
///     atomic_num: 7,
///     position: [0.0, 1.2, -0.4],
///     ..Atom::default()
/// };
/// assert_eq!(nitrogen.total_hydrogens(), 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, 7 = N, …). Identifies the element.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance.
    pub isotope: u16,
    /// Hydrogens attached to this atom that are not graph nodes but are
    /// nevertheless stated by the input (or folded in by
    /// [`remove_hs`](crate::hydrogen::remove_hs)). They count toward the
    /// explicit valence.
    pub hydrogen_count: u8,
    /// Hydrogens implied by the default valence. Computed by
    /// [`update_property_cache`](crate::valence::update_property_cache);
    /// not part of the explicit valence.
    pub implicit_hydrogens: u8,
    /// When set, no implicit hydrogens are ever added to this atom.
    pub no_implicit: bool,
    /// Whether this atom belongs to an aromatic ring.
    pub is_aromatic: bool,
    /// Cartesian coordinates in ångström.
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            ..Self::default()
        }
    }

    pub fn total_hydrogens(&self) -> u8 {
        self.hydrogen_count + self.implicit_hydrogens
    }

    pub fn symbol(&self) -> &'static str {
        crate::element::symbol(self.atomic_num).unwrap_or("*")
    }
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> u8 {
        self.total_hydrogens()
    }
}

impl crate::traits::HasPosition3D for Atom {
    fn position_3d(&self) -> [f64; 3] {
        self.position
    }

    fn set_position_3d(&mut self, pos: [f64; 3]) {
        self.position = pos;
    }
}
