//! Periodic table lookups needed by the file readers and the valence model.

const SYMBOLS: [&str; 118] = [
    "H", "He", //
    "Li", "Be", "B", "C", "N", "O", "F", "Ne", //
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", //
    "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As", "Se",
    "Br", "Kr", //
    "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn", "Sb", "Te",
    "I", "Xe", //
    "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At", "Rn",
    "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm", "Md", "No",
    "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

pub const HYDROGEN: u8 = 1;
pub const CARBON: u8 = 6;
pub const NITROGEN: u8 = 7;
pub const OXYGEN: u8 = 8;
pub const SULFUR: u8 = 16;

/// Element symbol for an atomic number, `None` outside 1..=118.
pub fn symbol(atomic_num: u8) -> Option<&'static str> {
    SYMBOLS.get((atomic_num as usize).checked_sub(1)?).copied()
}

/// Atomic number for an element symbol.
///
/// Matching ignores case beyond the first letter, so `"CL"` and `"cl"` both
/// resolve to chlorine. File formats in the wild are not consistent about it.
pub fn atomic_num(symbol: &str) -> Option<u8> {
    let symbol = symbol.trim();
    let mut chars = symbol.chars();
    let first = chars.next()?.to_ascii_uppercase();
    let rest: String = chars.map(|c| c.to_ascii_lowercase()).collect();
    let normalized = format!("{first}{rest}");
    SYMBOLS
        .iter()
        .position(|&s| s == normalized)
        .map(|i| i as u8 + 1)
}

/// Neutral-atom valences, lowest first. Empty for elements without a
/// meaningful default (metals, noble gases); those atoms are never
/// valence-checked and never receive implicit hydrogens.
pub fn default_valences(atomic_num: u8) -> &'static [u8] {
    match atomic_num {
        1 => &[1],
        5 => &[3],
        6 => &[4],
        7 => &[3],
        8 => &[2],
        9 | 17 | 35 | 85 => &[1],
        14 | 32 => &[4],
        15 | 33 => &[3, 5],
        16 | 34 | 52 => &[2, 4, 6],
        53 => &[1, 3, 5],
        _ => &[],
    }
}

/// Valences allowed for an atom carrying `formal_charge`.
///
/// Charged atoms are treated as their isoelectronic neighbour: N+ behaves
/// like C, O- like F, C- like N. When the shifted element has no defaults
/// the neutral list is used unchanged.
pub fn allowed_valences(atomic_num: u8, formal_charge: i8) -> &'static [u8] {
    if formal_charge == 0 {
        return default_valences(atomic_num);
    }
    let shifted = atomic_num as i16 - formal_charge as i16;
    let same_period = period(atomic_num) == u8::try_from(shifted).ok().map(period).unwrap_or(0);
    if same_period {
        let valences = default_valences(shifted as u8);
        if !valences.is_empty() {
            return valences;
        }
    }
    default_valences(atomic_num)
}

/// Standard atomic weights rounded to the nearest integer, H through U.
const NOMINAL_MASSES: [u16; 92] = [
    1, 4, //
    7, 9, 11, 12, 14, 16, 19, 20, //
    23, 24, 27, 28, 31, 32, 35, 40, //
    39, 40, 45, 48, 51, 52, 55, 56, 59, 59, 64, 65, 70, 73, 75, 79, 80, 84, //
    85, 88, 89, 91, 93, 96, 98, 101, 103, 106, 108, 112, 115, 119, 122, 128, 127, 131, //
    133, 137, 139, 140, 141, 144, 145, 150, 152, 157, 159, 163, 165, 167, 169, 173, 175, 178,
    181, 184, 186, 190, 192, 195, 197, 201, 204, 207, 209, 209, 210, 222, //
    223, 226, 227, 232, 231, 238,
];

/// Rounded average mass, the reference for MDL mass differences.
pub fn nominal_mass(atomic_num: u8) -> Option<u16> {
    NOMINAL_MASSES
        .get((atomic_num as usize).checked_sub(1)?)
        .copied()
}

fn period(atomic_num: u8) -> u8 {
    match atomic_num {
        1..=2 => 1,
        3..=10 => 2,
        11..=18 => 3,
        19..=36 => 4,
        37..=54 => 5,
        55..=86 => 6,
        87..=118 => 7,
        _ => 0,
    }
}
