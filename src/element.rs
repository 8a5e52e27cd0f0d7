//! Elements that can appear in the structure encodings we handle.

use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or unsupported element symbol: '{0}'")]
pub struct ParseElementError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Element {
    H = 1,
    Li = 3,
    B = 5,
    C = 6,
    N = 7,
    O = 8,
    F = 9,
    Na = 11,
    Mg = 12,
    Si = 14,
    P = 15,
    S = 16,
    Cl = 17,
    K = 19,
    Ca = 20,
    Se = 34,
    Br = 35,
    I = 53,
}

impl Element {
    pub fn atomic_mass(&self) -> f64 {
        match self {
            Element::H => 1.008,
            Element::Li => 6.94,
            Element::B => 10.81,
            Element::C => 12.011,
            Element::N => 14.007,
            Element::O => 15.999,
            Element::F => 18.998,
            Element::Na => 22.99,
            Element::Mg => 24.305,
            Element::Si => 28.085,
            Element::P => 30.974,
            Element::S => 32.065,
            Element::Cl => 35.453,
            Element::K => 39.098,
            Element::Ca => 40.078,
            Element::Se => 78.971,
            Element::Br => 79.904,
            Element::I => 126.904,
        }
    }

    #[inline]
    pub fn atomic_number(&self) -> u8 {
        *self as u8
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Element::H => "H",
            Element::Li => "Li",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Na => "Na",
            Element::Mg => "Mg",
            Element::Si => "Si",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::K => "K",
            Element::Ca => "Ca",
            Element::Se => "Se",
            Element::Br => "Br",
            Element::I => "I",
        }
    }

    /// Normal valences, lowest first. Used to fill implicit hydrogens.
    pub fn default_valences(&self) -> &'static [u8] {
        match self {
            Element::H | Element::Li | Element::Na | Element::K => &[1],
            Element::F | Element::Cl | Element::Br | Element::I => &[1],
            Element::Mg | Element::Ca => &[2],
            Element::B => &[3],
            Element::C | Element::Si => &[4],
            Element::N | Element::P => &[3, 5],
            Element::O => &[2],
            Element::S | Element::Se => &[2, 4, 6],
        }
    }

    /// Whether the element may be written bare (outside brackets) in SMILES.
    pub fn in_organic_subset(&self) -> bool {
        matches!(
            self,
            Element::B
                | Element::C
                | Element::N
                | Element::O
                | Element::P
                | Element::S
                | Element::F
                | Element::Cl
                | Element::Br
                | Element::I
        )
    }

    pub fn is_halogen(&self) -> bool {
        matches!(self, Element::F | Element::Cl | Element::Br | Element::I)
    }

    /// Jmol-style CPK colour, as RGB. Carbon is drawn dark rather than black-on-white grey.
    pub fn color(&self) -> [u8; 3] {
        match self {
            Element::H => [110, 110, 110],
            Element::C => [20, 20, 20],
            Element::N => [48, 80, 248],
            Element::O => [230, 13, 13],
            Element::F => [110, 200, 60],
            Element::Cl => [31, 160, 31],
            Element::Br => [166, 41, 41],
            Element::I => [148, 0, 148],
            Element::S => [200, 160, 20],
            Element::P => [255, 128, 0],
            Element::B => [220, 140, 140],
            Element::Se => [255, 161, 0],
            Element::Si => [160, 130, 100],
            _ => [120, 80, 200],
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let el = match s {
            "H" => Element::H,
            "Li" => Element::Li,
            "B" => Element::B,
            "C" => Element::C,
            "N" => Element::N,
            "O" => Element::O,
            "F" => Element::F,
            "Na" => Element::Na,
            "Mg" => Element::Mg,
            "Si" => Element::Si,
            "P" => Element::P,
            "S" => Element::S,
            "Cl" => Element::Cl,
            "K" => Element::K,
            "Ca" => Element::Ca,
            "Se" => Element::Se,
            "Br" => Element::Br,
            "I" => Element::I,
            _ => return Err(ParseElementError(s.to_owned())),
        };
        Ok(el)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_is_case_sensitive() {
        assert_eq!("Cl".parse::<Element>(), Ok(Element::Cl));
        assert!("CL".parse::<Element>().is_err());
        assert!("Xx".parse::<Element>().is_err());
    }

    #[test]
    fn symbol_and_number_agree() {
        for el in [Element::C, Element::N, Element::O, Element::Br] {
            assert_eq!(el.symbol().parse::<Element>(), Ok(el));
        }
        assert_eq!(Element::I.atomic_number(), 53);
    }

    #[test]
    fn masses() {
        assert!((Element::C.atomic_mass() - 12.011).abs() < 1e-9);
        assert!((Element::O.atomic_mass() - 15.999).abs() < 1e-9);
    }
}
