/// Bond type. `Aromatic` is the type aromaticity perception assigns; the
/// Kekulé orders are what structure files usually carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Valence contribution in half-bond units, so that an aromatic bond
    /// counts as 1.5 without floating point.
    pub fn half_valence(self) -> u8 {
        match self {
            Self::Single => 2,
            Self::Double => 4,
            Self::Triple => 6,
            Self::Aromatic => 3,
        }
    }

    /// MDL molfile bond type code.
    pub fn mdl_code(self) -> u8 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Aromatic => 4,
        }
    }

    pub fn from_mdl_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Single),
            2 => Some(Self::Double),
            3 => Some(Self::Triple),
            4 => Some(Self::Aromatic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bond {
    pub order: BondOrder,
    /// Aromatic flag. Normally set together with `BondOrder::Aromatic`, but
    /// the two are tracked separately so a repaired bond can carry a Kekulé
    /// order with the flag cleared.
    pub is_aromatic: bool,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self {
            order,
            is_aromatic: order == BondOrder::Aromatic,
        }
    }
}

impl crate::traits::HasBondOrder for Bond {
    fn bond_order(&self) -> BondOrder {
        self.order
    }
}
