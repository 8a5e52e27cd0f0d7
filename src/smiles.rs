//! SMILES parsing into a [`Molecule`].
//!
//! Supports the organic subset (aliphatic and aromatic), bracket atoms with isotope,
//! chirality, hydrogen count, charge and atom class, all bond symbols, branches, ring
//! closures (`0`-`9` and `%nn`), and `.` separated components. Stereo marks are parsed
//! and kept on atoms where they apply, but play no role in perception.

use std::collections::HashMap;

use thiserror::Error;

use crate::{
    element::Element,
    molecule::{Atom, Bond, BondOrder, Chirality, Molecule},
};

/// Largest charge magnitude accepted on a bracket atom.
const MAX_CHARGE: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmilesError {
    #[error("empty SMILES string")]
    Empty,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unknown element '{symbol}' at position {pos}")]
    UnknownElement { symbol: String, pos: usize },

    #[error("unbalanced branch at position {pos}")]
    UnbalancedBranch { pos: usize },

    #[error("ring closure {label} is never closed")]
    UnclosedRing { label: u16 },

    #[error("bond symbol at position {pos} is not followed by an atom")]
    DanglingBond { pos: usize },

    #[error("malformed bracket atom at position {pos}")]
    BadBracket { pos: usize },

    #[error("ring closure {label} conflicts with its bond order or an existing bond")]
    RingBondConflict { label: u16 },
}

/// Parse a SMILES string. Implicit hydrogens are filled from default valences.
pub fn parse(smiles: &str) -> Result<Molecule, SmilesError> {
    let smiles = smiles.trim();
    if smiles.is_empty() {
        return Err(SmilesError::Empty);
    }

    let mut parser = Parser::new(smiles);
    parser.run()?;
    Ok(parser.finish())
}

struct PendingBond {
    order: BondOrder,
    pos: usize,
}

struct OpenRing {
    atom: usize,
    order: Option<BondOrder>,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    /// Bracket atoms carry an explicit hydrogen count and are left alone when filling.
    bracketed: Vec<bool>,
    prev: Option<usize>,
    branches: Vec<(usize, usize)>,
    pending: Option<PendingBond>,
    rings: HashMap<u16, OpenRing>,
}

impl Parser {
    fn new(smiles: &str) -> Self {
        Self {
            chars: smiles.chars().collect(),
            pos: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            bracketed: Vec::new(),
            prev: None,
            branches: Vec::new(),
            pending: None,
            rings: HashMap::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn unexpected(&self) -> SmilesError {
        SmilesError::UnexpectedChar {
            ch: self.chars[self.pos],
            pos: self.pos,
        }
    }

    fn run(&mut self) -> Result<(), SmilesError> {
        while let Some(ch) = self.peek() {
            match ch {
                '-' | '=' | '#' | '$' | ':' | '/' | '\\' => {
                    if self.pending.is_some() || self.prev.is_none() {
                        return Err(self.unexpected());
                    }
                    let order = match ch {
                        '=' => BondOrder::Double,
                        '#' => BondOrder::Triple,
                        '$' => BondOrder::Quadruple,
                        ':' => BondOrder::Aromatic,
                        _ => BondOrder::Single,
                    };
                    self.pending = Some(PendingBond {
                        order,
                        pos: self.pos,
                    });
                    self.pos += 1;
                }
                '(' => {
                    let Some(prev) = self.prev else {
                        return Err(SmilesError::UnbalancedBranch { pos: self.pos });
                    };
                    if self.pending.is_some() {
                        return Err(self.unexpected());
                    }
                    self.branches.push((prev, self.pos));
                    self.pos += 1;
                }
                ')' => {
                    if let Some(p) = &self.pending {
                        return Err(SmilesError::DanglingBond { pos: p.pos });
                    }
                    let Some((atom, _)) = self.branches.pop() else {
                        return Err(SmilesError::UnbalancedBranch { pos: self.pos });
                    };
                    self.prev = Some(atom);
                    self.pos += 1;
                }
                '.' => {
                    if let Some(p) = &self.pending {
                        return Err(SmilesError::DanglingBond { pos: p.pos });
                    }
                    if self.prev.is_none() || !self.branches.is_empty() {
                        return Err(self.unexpected());
                    }
                    self.prev = None;
                    self.pos += 1;
                }
                '%' | '0'..='9' => self.ring_closure()?,
                '[' => {
                    let atom = self.bracket_atom()?;
                    self.add_atom(atom, true);
                }
                _ => {
                    let atom = self.organic_atom()?;
                    self.add_atom(atom, false);
                }
            }
        }

        if let Some(p) = &self.pending {
            return Err(SmilesError::DanglingBond { pos: p.pos });
        }
        if let Some(&(_, pos)) = self.branches.last() {
            return Err(SmilesError::UnbalancedBranch { pos });
        }
        if let Some(label) = self.rings.keys().min() {
            return Err(SmilesError::UnclosedRing { label: *label });
        }
        if self.atoms.is_empty() {
            return Err(SmilesError::Empty);
        }
        Ok(())
    }

    fn default_order(&self, a: usize, b: usize) -> BondOrder {
        if self.atoms[a].aromatic && self.atoms[b].aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    fn add_atom(&mut self, atom: Atom, bracketed: bool) {
        let idx = self.atoms.len();
        self.atoms.push(atom);
        self.bracketed.push(bracketed);

        if let Some(prev) = self.prev {
            let order = match self.pending.take() {
                Some(p) => p.order,
                None => self.default_order(prev, idx),
            };
            self.push_bond(prev, idx, order);
        }
        self.prev = Some(idx);
    }

    fn push_bond(&mut self, a: usize, b: usize, order: BondOrder) {
        self.bonds.push(Bond {
            a,
            b,
            order,
            aromatic: order == BondOrder::Aromatic,
        });
    }

    fn ring_closure(&mut self) -> Result<(), SmilesError> {
        let Some(atom) = self.prev else {
            return Err(self.unexpected());
        };

        let label = if self.peek() == Some('%') {
            let (Some(d1), Some(d2)) = (
                self.peek_at(1).and_then(|c| c.to_digit(10)),
                self.peek_at(2).and_then(|c| c.to_digit(10)),
            ) else {
                return Err(self.unexpected());
            };
            self.pos += 3;
            (d1 * 10 + d2) as u16
        } else {
            // Guarded by the caller's match arm.
            let d = self.chars[self.pos].to_digit(10).unwrap_or_default();
            self.pos += 1;
            d as u16
        };

        let order = self.pending.take().map(|p| p.order);

        match self.rings.remove(&label) {
            Some(open) => {
                if open.atom == atom
                    || self.bonds.iter().any(|b| {
                        (b.a == atom && b.b == open.atom) || (b.b == atom && b.a == open.atom)
                    })
                {
                    return Err(SmilesError::RingBondConflict { label });
                }
                let order = match (open.order, order) {
                    (Some(x), Some(y)) if x != y => {
                        return Err(SmilesError::RingBondConflict { label });
                    }
                    (Some(x), _) | (None, Some(x)) => x,
                    (None, None) => self.default_order(open.atom, atom),
                };
                self.push_bond(open.atom, atom, order);
            }
            None => {
                self.rings.insert(label, OpenRing { atom, order });
            }
        }

        Ok(())
    }

    fn organic_atom(&mut self) -> Result<Atom, SmilesError> {
        let pos = self.pos;
        let ch = self.chars[pos];
        let next = self.peek_at(1);

        let (symbol, aromatic, len) = match (ch, next) {
            ('C', Some('l')) => ("Cl".to_owned(), false, 2),
            ('B', Some('r')) => ("Br".to_owned(), false, 2),
            ('B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I', _) => (ch.to_string(), false, 1),
            ('b' | 'c' | 'n' | 'o' | 'p' | 's', _) => (ch.to_ascii_uppercase().to_string(), true, 1),
            _ => return Err(self.unexpected()),
        };

        let element = element_for(&symbol, aromatic).ok_or_else(|| SmilesError::UnknownElement {
            symbol: symbol.clone(),
            pos,
        })?;
        if !element.in_organic_subset() {
            return Err(SmilesError::UnknownElement { symbol, pos });
        }

        self.pos += len;
        let mut atom = Atom::new(element);
        atom.aromatic = aromatic;
        Ok(atom)
    }

    fn chars_str(&self, pos: usize, len: usize) -> String {
        self.chars[pos..pos + len].iter().collect()
    }

    fn read_number(&mut self) -> Option<u32> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        self.chars_str(start, self.pos - start).parse().ok()
    }

    /// A bracket field that must fit in `max` when present. Overflow is an error, not a wrap.
    fn bracket_number(&mut self, max: u32, open: usize) -> Result<Option<u32>, SmilesError> {
        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return Ok(None);
        }
        match self.read_number() {
            Some(n) if n <= max => Ok(Some(n)),
            _ => Err(SmilesError::BadBracket { pos: open }),
        }
    }

    /// `[` isotope? symbol chiral? hcount? charge? class? `]`
    fn bracket_atom(&mut self) -> Result<Atom, SmilesError> {
        let open = self.pos;
        let bad = SmilesError::BadBracket { pos: open };
        self.pos += 1;

        let isotope = self
            .bracket_number(u16::MAX.into(), open)?
            .and_then(|n| u16::try_from(n).ok());

        let sym_pos = self.pos;
        let Some(first) = self.peek() else {
            return Err(bad);
        };
        let (symbol, aromatic) = if first.is_ascii_lowercase() {
            if first == 's' && self.peek_at(1) == Some('e') {
                ("Se".to_owned(), true)
            } else {
                (first.to_ascii_uppercase().to_string(), true)
            }
        } else if first.is_ascii_uppercase() {
            let two: Option<String> = self
                .peek_at(1)
                .filter(|c| c.is_ascii_lowercase())
                .map(|c| [first, c].iter().collect());
            match two {
                Some(s) if s.parse::<Element>().is_ok() => (s, false),
                _ => (first.to_string(), false),
            }
        } else {
            return Err(bad);
        };
        let consumed = symbol.len();

        let element = element_for(&symbol, aromatic).ok_or(SmilesError::UnknownElement {
            symbol: self.chars_str(sym_pos, consumed),
            pos: sym_pos,
        })?;
        self.pos += consumed;

        let mut atom = Atom::new(element);
        atom.aromatic = aromatic;
        atom.isotope = isotope;

        if self.peek() == Some('@') {
            self.pos += 1;
            atom.chirality = if self.peek() == Some('@') {
                self.pos += 1;
                Chirality::Clockwise
            } else {
                Chirality::CounterClockwise
            };
        }

        if self.peek() == Some('H') {
            self.pos += 1;
            let count = self.bracket_number(u8::MAX.into(), open)?.unwrap_or(1);
            atom.hydrogens = u8::try_from(count).map_err(|_| bad.clone())?;
        }

        match self.peek() {
            Some(sign @ ('+' | '-')) => {
                self.pos += 1;
                let mut magnitude = 1u32;
                if let Some(n) = self.bracket_number(MAX_CHARGE, open)? {
                    magnitude = n;
                } else {
                    while self.peek() == Some(sign) {
                        magnitude += 1;
                        self.pos += 1;
                    }
                    if magnitude > MAX_CHARGE {
                        return Err(bad);
                    }
                }
                let magnitude = i8::try_from(magnitude).map_err(|_| bad.clone())?;
                atom.charge = if sign == '+' { magnitude } else { -magnitude };
            }
            _ => {}
        }

        if self.peek() == Some(':') {
            self.pos += 1;
            if self.read_number().is_none() {
                return Err(bad);
            }
        }

        if self.peek() != Some(']') {
            return Err(bad);
        }
        self.pos += 1;

        Ok(atom)
    }

    fn finish(mut self) -> Molecule {
        let mut sums = vec![0usize; self.atoms.len()];
        for bond in &self.bonds {
            sums[bond.a] += usize::from(bond.order.valence());
            sums[bond.b] += usize::from(bond.order.valence());
        }

        for (i, atom) in self.atoms.iter_mut().enumerate() {
            if self.bracketed[i] {
                continue;
            }
            atom.hydrogens = implicit_hydrogens(atom, sums[i]);
        }

        Molecule::new(self.atoms, self.bonds)
    }
}

fn element_for(symbol: &str, aromatic: bool) -> Option<Element> {
    let el = symbol.parse::<Element>().ok()?;
    if aromatic
        && !matches!(
            el,
            Element::B | Element::C | Element::N | Element::O | Element::P | Element::S | Element::Se
        )
    {
        return None;
    }
    Some(el)
}

/// Smallest default valence that accommodates the bonds; aromatic atoms reserve one
/// for the pi system. Aromatic chalcogens donate a lone pair and take no hydrogen.
fn implicit_hydrogens(atom: &Atom, bond_sum: usize) -> u8 {
    if atom.aromatic && matches!(atom.element, Element::O | Element::S | Element::Se) {
        return 0;
    }

    let used = bond_sum + usize::from(atom.aromatic);
    atom.element
        .default_valences()
        .iter()
        .find(|&&v| usize::from(v) >= used)
        .map(|&v| v - used as u8)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ethanol() {
        let mol = parse("CCO").unwrap();
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 2);
        let hs: Vec<_> = mol.atoms.iter().map(|a| a.hydrogens).collect();
        assert_eq!(hs, vec![3, 2, 1]);
    }

    #[test]
    fn branches_and_double_bonds() {
        let mol = parse("CC(=O)O").unwrap();
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(mol.bonds[1].order, BondOrder::Double);
        assert_eq!(mol.atoms[1].hydrogens, 0);
        assert_eq!(mol.atoms[3].hydrogens, 1);
    }

    #[test]
    fn aromatic_lowercase() {
        let mol = parse("c1ccncc1").unwrap();
        assert_eq!(mol.atom_count(), 6);
        assert!(mol.bonds.iter().all(|b| b.order == BondOrder::Aromatic));
        assert_eq!(mol.atoms[3].element, Element::N);
        assert_eq!(mol.atoms[3].hydrogens, 0);
        assert_eq!(mol.atoms[0].hydrogens, 1);
    }

    #[test]
    fn thiophene_sulfur_takes_no_hydrogen() {
        let mol = parse("c1ccsc1").unwrap();
        assert_eq!(mol.atoms[3].hydrogens, 0);
    }

    #[test]
    fn bracket_atoms() {
        let mol = parse("[13CH3][NH3+]").unwrap();
        assert_eq!(mol.atoms[0].isotope, Some(13));
        assert_eq!(mol.atoms[0].hydrogens, 3);
        assert_eq!(mol.atoms[1].charge, 1);
        assert_eq!(mol.atoms[1].hydrogens, 3);

        let mol = parse("[O--]").unwrap();
        assert_eq!(mol.atoms[0].charge, -2);

        let mol = parse("N[C@@H](C)C(=O)O").unwrap();
        assert_eq!(mol.atoms[1].chirality, Chirality::Clockwise);
        assert_eq!(mol.atoms[1].hydrogens, 1);
    }

    #[test]
    fn two_letter_organic() {
        let mol = parse("ClCBr").unwrap();
        assert_eq!(mol.atoms[0].element, Element::Cl);
        assert_eq!(mol.atoms[2].element, Element::Br);
        assert_eq!(mol.atoms[1].hydrogens, 2);
    }

    #[test]
    fn percent_ring_labels() {
        let mol = parse("C%12CCCCC%12").unwrap();
        assert_eq!(mol.rings().len(), 1);
    }

    #[test]
    fn ring_closure_with_bond_order() {
        let mol = parse("C=1CCCCC1").unwrap();
        let closing = mol.bond_between(0, 5).unwrap();
        assert_eq!(closing.order, BondOrder::Double);
    }

    #[test]
    fn all_registry_structures_parse() {
        for smi in [
            "CN1CCC23C4C1CC5=C2C(=C(C=C5)O)OC3C(C=C4)O",
            "CCN(CC1=CC=CC=C1)C(=O)C2CCN(CC2)CCC3=CC=CC=C3",
            "CN1CCC23C4C1CC5=C2C(=C(C=C5)OC)OC3C(CC4=O)O",
            "CN1CCC23C4C1C5=C2C(=C(C=C5)OC)OC3C(CC4=O)O",
            "CN1CCC23C4C1CC5=C2C(=C(C=C5)OC)OC3C(C=C4)O",
            "CCC(=O)C(CC(C)N(C)C)(C1=CC=CC=C1)C2=CC=CC=C2",
        ] {
            assert!(parse(smi).is_ok(), "{smi}");
        }
    }

    #[test]
    fn errors() {
        assert!(matches!(parse(""), Err(SmilesError::Empty)));
        assert!(matches!(parse("   "), Err(SmilesError::Empty)));
        assert!(matches!(parse("C1CC"), Err(SmilesError::UnclosedRing { label: 1 })));
        assert!(matches!(parse("CC(C"), Err(SmilesError::UnbalancedBranch { .. })));
        assert!(matches!(parse("CC)C"), Err(SmilesError::UnbalancedBranch { .. })));
        assert!(matches!(parse("CC="), Err(SmilesError::DanglingBond { .. })));
        assert!(matches!(parse("C?C"), Err(SmilesError::UnexpectedChar { ch: '?', pos: 1 })));
        assert!(matches!(parse("[Xx]"), Err(SmilesError::UnknownElement { .. })));
        assert!(matches!(parse("[CH4"), Err(SmilesError::BadBracket { pos: 0 })));
        assert!(matches!(parse("C11"), Err(SmilesError::RingBondConflict { label: 1 })));
        assert!(matches!(parse("not a smiles"), Err(_)));
    }

    #[test]
    fn heavily_branched_atom() {
        let mol = parse(&format!("C{}", "(C)".repeat(256))).unwrap();
        assert_eq!(mol.atom_count(), 257);
        assert_eq!(mol.atoms[0].hydrogens, 0);
        assert_eq!(mol.atoms[1].hydrogens, 3);
    }

    #[test]
    fn bracket_numbers_out_of_range() {
        for smiles in ["[CH300]", "[C+200]", "[C+16]", "[C----------------]", "[70000C]"] {
            assert_eq!(
                parse(smiles).unwrap_err(),
                SmilesError::BadBracket { pos: 0 },
                "{smiles}"
            );
        }
    }

    #[test]
    fn bracket_numbers_at_limits() {
        let mol = parse("[65535CH255-15]").unwrap();
        let atom = &mol.atoms[0];
        assert_eq!(atom.isotope, Some(65535));
        assert_eq!(atom.hydrogens, 255);
        assert_eq!(atom.charge, -15);
        assert_eq!(parse("[N+++]").unwrap().atoms[0].charge, 3);
    }
}
