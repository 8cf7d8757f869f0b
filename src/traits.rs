use crate::bond::BondOrder;

pub trait HasAtomicNum {
    fn atomic_num(&self) -> u8;
}

pub trait HasFormalCharge {
    fn formal_charge(&self) -> i8;
}

/// Total hydrogens carried by the atom, stated and implied.
pub trait HasHydrogenCount {
    fn hydrogen_count(&self) -> u8;
}

pub trait HasPosition3D {
    fn position_3d(&self) -> [f64; 3];
    fn set_position_3d(&mut self, pos: [f64; 3]);
}

pub trait HasBondOrder {
    fn bond_order(&self) -> BondOrder;
}
