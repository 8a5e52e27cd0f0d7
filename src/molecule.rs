//! Molecular graph representation, with ring and aromaticity perception.

use std::collections::{BTreeMap, VecDeque};

use crate::element::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Quadruple,
    /// Written with lowercase atoms or `:`. Kekulé input keeps its explicit orders.
    Aromatic,
}

impl BondOrder {
    /// Contribution to the valence sum. Aromatic bonds count as 1; the pi electron is
    /// accounted for separately when filling hydrogens.
    pub fn valence(self) -> u8 {
        match self {
            Self::Single | Self::Aromatic => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Quadruple => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Chirality {
    #[default]
    None,
    /// `@`
    CounterClockwise,
    /// `@@`
    Clockwise,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    pub charge: i8,
    pub isotope: Option<u16>,
    /// Implicit or bracket-declared hydrogens; does not include explicit `[H]` nodes.
    pub hydrogens: u8,
    pub aromatic: bool,
    pub chirality: Chirality,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            charge: 0,
            isotope: None,
            hydrogens: 0,
            aromatic: false,
            chirality: Chirality::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub a: usize,
    pub b: usize,
    pub order: BondOrder,
    pub aromatic: bool,
}

impl Bond {
    pub fn other(&self, atom: usize) -> usize {
        if self.a == atom { self.b } else { self.a }
    }
}

/// A perceived ring: atoms in cycle order, and the bonds joining them.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub atoms: Vec<usize>,
    pub bonds: Vec<usize>,
}

impl Ring {
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn contains_bond(&self, bond: usize) -> bool {
        self.bonds.contains(&bond)
    }
}

#[derive(Debug, Clone)]
pub struct Molecule {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    /// adjacency[atom] = [(neighbor, bond index)]
    adjacency: Vec<Vec<(usize, usize)>>,
    rings: Vec<Ring>,
    ring_bond: Vec<bool>,
}

impl Molecule {
    /// Builds adjacency, perceives the smallest set of smallest rings, then flags
    /// aromatic rings. Hydrogen counts must already be filled in.
    pub fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (i, bond) in bonds.iter().enumerate() {
            adjacency[bond.a].push((bond.b, i));
            adjacency[bond.b].push((bond.a, i));
        }

        let mut mol = Self {
            atoms,
            bonds,
            adjacency,
            rings: Vec::new(),
            ring_bond: Vec::new(),
        };

        mol.rings = mol.find_sssr();
        mol.ring_bond = vec![false; mol.bonds.len()];
        for ring in &mol.rings {
            for &b in &ring.bonds {
                mol.ring_bond[b] = true;
            }
        }
        // Aromatic order only holds inside a ring; `c1ccccc1c1ccccc1` links by a single bond.
        for (bond, in_ring) in mol.bonds.iter_mut().zip(&mol.ring_bond) {
            if bond.order == BondOrder::Aromatic && !in_ring {
                bond.order = BondOrder::Single;
                bond.aromatic = false;
            }
        }
        mol.perceive_aromaticity();

        mol
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn adjacency(&self, atom: usize) -> &[(usize, usize)] {
        &self.adjacency[atom]
    }

    pub fn neighbors(&self, atom: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[atom].iter().map(|&(n, _)| n)
    }

    /// Number of explicit graph neighbours.
    pub fn degree(&self, atom: usize) -> usize {
        self.adjacency[atom].len()
    }

    /// Number of non-hydrogen graph neighbours.
    pub fn heavy_degree(&self, atom: usize) -> usize {
        self.neighbors(atom)
            .filter(|&n| self.atoms[n].element != Element::H)
            .count()
    }

    /// Attached hydrogens, counting both implicit ones and explicit `[H]` neighbours.
    pub fn total_hydrogens(&self, atom: usize) -> usize {
        let explicit = self
            .neighbors(atom)
            .filter(|&n| self.atoms[n].element == Element::H)
            .count();
        self.atoms[atom].hydrogens as usize + explicit
    }

    /// Sum of bond valences plus attached hydrogens; aromatic atoms gain one for the pi bond.
    pub fn valence(&self, atom: usize) -> usize {
        let mut v: usize = self.adjacency[atom]
            .iter()
            .map(|&(_, b)| self.bonds[b].order.valence() as usize)
            .sum();
        let has_aromatic_order = self.adjacency[atom]
            .iter()
            .any(|&(_, b)| self.bonds[b].order == BondOrder::Aromatic);
        if has_aromatic_order {
            v += 1;
        }
        v + self.atoms[atom].hydrogens as usize
    }

    pub fn bond_between(&self, a: usize, b: usize) -> Option<&Bond> {
        self.adjacency[a]
            .iter()
            .find(|&&(n, _)| n == b)
            .map(|&(_, i)| &self.bonds[i])
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn is_ring_bond(&self, bond: usize) -> bool {
        self.ring_bond[bond]
    }

    pub fn is_ring_atom(&self, atom: usize) -> bool {
        self.adjacency[atom].iter().any(|&(_, b)| self.ring_bond[b])
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| a.element != Element::H).count()
    }

    /// Number of connected components.
    pub fn component_count(&self) -> usize {
        let n = self.atoms.len();
        let mut seen = vec![false; n];
        let mut count = 0;
        for start in 0..n {
            if seen[start] {
                continue;
            }
            count += 1;
            seen[start] = true;
            let mut queue = VecDeque::from([start]);
            while let Some(cur) = queue.pop_front() {
                for &(nb, _) in &self.adjacency[cur] {
                    if !seen[nb] {
                        seen[nb] = true;
                        queue.push_back(nb);
                    }
                }
            }
        }
        count
    }

    /// Molecular formula in Hill order: C, then H, then the rest alphabetically.
    /// Without carbon, every element (H included) is alphabetical.
    pub fn molecular_formula(&self) -> String {
        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut charge: i32 = 0;
        for atom in &self.atoms {
            *counts.entry(atom.element.symbol()).or_default() += 1;
            if atom.hydrogens > 0 {
                *counts.entry("H").or_default() += atom.hydrogens as usize;
            }
            charge += atom.charge as i32;
        }

        let mut formula = String::new();
        let mut push = |symbol: &str, count: usize| {
            formula.push_str(symbol);
            if count > 1 {
                formula.push_str(&count.to_string());
            }
        };

        if let Some(c) = counts.remove("C") {
            push("C", c);
            if let Some(h) = counts.remove("H") {
                push("H", h);
            }
        }
        for (symbol, count) in counts {
            push(symbol, count);
        }

        match charge {
            0 => {}
            1 => formula.push('+'),
            -1 => formula.push('-'),
            c if c > 0 => formula.push_str(&format!("+{c}")),
            c => formula.push_str(&format!("{c}")),
        }
        formula
    }

    /// Shortest path from `from` to `to` that does not use bond `skip`, as atom indices.
    fn shortest_path_avoiding(&self, from: usize, to: usize, skip: usize) -> Option<Vec<usize>> {
        let n = self.atoms.len();
        let mut prev = vec![usize::MAX; n];
        let mut seen = vec![false; n];
        seen[from] = true;

        let mut queue = VecDeque::from([from]);
        while let Some(cur) = queue.pop_front() {
            if cur == to {
                let mut path = vec![to];
                let mut at = to;
                while at != from {
                    at = prev[at];
                    path.push(at);
                }
                path.reverse();
                return Some(path);
            }
            for &(nb, b) in &self.adjacency[cur] {
                if b == skip || seen[nb] {
                    continue;
                }
                seen[nb] = true;
                prev[nb] = cur;
                queue.push_back(nb);
            }
        }
        None
    }

    /// Smallest set of smallest rings. Each bond that lies on a cycle contributes the
    /// shortest cycle through it; candidates are then taken smallest-first while they
    /// stay linearly independent over GF(2) in bond space.
    fn find_sssr(&self) -> Vec<Ring> {
        let n_bonds = self.bonds.len();
        let cyclomatic =
            (n_bonds + self.component_count()).saturating_sub(self.atoms.len());
        if cyclomatic == 0 {
            return Vec::new();
        }

        let mut candidates: Vec<Ring> = Vec::new();
        for (bi, bond) in self.bonds.iter().enumerate() {
            let Some(path) = self.shortest_path_avoiding(bond.b, bond.a, bi) else {
                continue;
            };
            // path runs b -> ... -> a; closing bond a-b completes the cycle.
            let mut bonds = Vec::with_capacity(path.len());
            for w in path.windows(2) {
                if let Some(&(_, pb)) = self.adjacency[w[0]].iter().find(|&&(nb, _)| nb == w[1]) {
                    bonds.push(pb);
                }
            }
            bonds.push(bi);
            candidates.push(Ring { atoms: path, bonds });
        }
        candidates.sort_by_key(|r| r.len());

        let words = n_bonds.div_ceil(64);
        let mut basis: Vec<(usize, Vec<u64>)> = Vec::new();
        let mut rings = Vec::new();

        for ring in candidates {
            let mut v = vec![0u64; words];
            for &b in &ring.bonds {
                v[b / 64] |= 1 << (b % 64);
            }
            for (pivot, row) in &basis {
                if v[pivot / 64] & (1 << (pivot % 64)) != 0 {
                    for (x, y) in v.iter_mut().zip(row) {
                        *x ^= y;
                    }
                }
            }
            let Some(pivot) = lowest_bit(&v) else {
                continue;
            };
            basis.push((pivot, v));
            rings.push(ring);
            if rings.len() == cyclomatic {
                break;
            }
        }

        rings
    }

    /// Pi electrons this atom donates to `ring`, or `None` if it can't be part of an
    /// aromatic system. `aromatic_atoms` carries perception from earlier passes so that
    /// fused rings can borrow a double bond that sits in a neighbouring ring.
    fn pi_electrons(&self, atom: usize, ring: &Ring, aromatic_atoms: &[bool]) -> Option<u8> {
        let a = &self.atoms[atom];
        let mut in_ring_double = false;
        let mut exo_double_to_aromatic = false;
        let mut exo_double_other = false;

        for &(nb, b) in &self.adjacency[atom] {
            let bond = &self.bonds[b];
            match bond.order {
                BondOrder::Double => {
                    if ring.contains_bond(b) {
                        in_ring_double = true;
                    } else if aromatic_atoms[nb] && self.ring_bond[b] {
                        exo_double_to_aromatic = true;
                    } else {
                        exo_double_other = true;
                    }
                }
                BondOrder::Triple | BondOrder::Quadruple => return None,
                _ => {}
            }
        }

        match a.element {
            Element::C => {
                if in_ring_double || exo_double_to_aromatic {
                    Some(1)
                } else if exo_double_other {
                    Some(0)
                } else if a.charge == -1 {
                    Some(2)
                } else if a.charge == 1 {
                    Some(0)
                } else {
                    None
                }
            }
            Element::N | Element::P => {
                if in_ring_double || exo_double_to_aromatic {
                    Some(1)
                } else if exo_double_other {
                    None
                } else if self.degree(atom) + self.atoms[atom].hydrogens as usize == 3
                    && a.charge == 0
                {
                    Some(2)
                } else {
                    None
                }
            }
            Element::O | Element::S | Element::Se => {
                if in_ring_double && a.charge == 1 {
                    Some(1)
                } else if !in_ring_double && !exo_double_other && self.degree(atom) == 2 {
                    Some(2)
                } else {
                    None
                }
            }
            Element::B => {
                if in_ring_double { Some(1) } else { Some(0) }
            }
            _ => None,
        }
    }

    fn perceive_aromaticity(&mut self) {
        let mut aromatic_atoms: Vec<bool> = self.atoms.iter().map(|a| a.aromatic).collect();
        let mut done = vec![false; self.rings.len()];

        loop {
            let mut changed = false;

            for (ri, ring) in self.rings.iter().enumerate() {
                if done[ri] || !(4..=8).contains(&ring.len()) {
                    continue;
                }

                let written_aromatic = ring.atoms.iter().all(|&a| self.atoms[a].aromatic);
                let huckel = || -> bool {
                    let mut total = 0u32;
                    for &a in &ring.atoms {
                        match self.pi_electrons(a, ring, &aromatic_atoms) {
                            Some(e) => total += e as u32,
                            None => return false,
                        }
                    }
                    total >= 2 && (total - 2) % 4 == 0
                };

                if written_aromatic || huckel() {
                    for &a in &ring.atoms {
                        aromatic_atoms[a] = true;
                    }
                    done[ri] = true;
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }

        for (ri, ring) in self.rings.iter().enumerate() {
            if !done[ri] {
                continue;
            }
            for &b in &ring.bonds {
                self.bonds[b].aromatic = true;
            }
        }
        for (atom, aromatic) in self.atoms.iter_mut().zip(aromatic_atoms) {
            atom.aromatic = aromatic;
        }
    }

    /// Whether the ring has every atom and bond flagged aromatic.
    pub fn is_aromatic_ring(&self, ring: &Ring) -> bool {
        ring.atoms.iter().all(|&a| self.atoms[a].aromatic)
            && ring.bonds.iter().all(|&b| self.bonds[b].aromatic)
    }
}

fn lowest_bit(v: &[u64]) -> Option<usize> {
    v.iter()
        .enumerate()
        .find(|(_, w)| **w != 0)
        .map(|(i, w)| i * 64 + w.trailing_zeros() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse;

    #[test]
    fn acyclic_has_no_rings() {
        let mol = parse("CCCCO").unwrap();
        assert!(mol.rings().is_empty());
        assert!((0..mol.bond_count()).all(|b| !mol.is_ring_bond(b)));
    }

    #[test]
    fn kekule_benzene_is_aromatic() {
        let mol = parse("C1=CC=CC=C1").unwrap();
        assert_eq!(mol.rings().len(), 1);
        assert_eq!(mol.rings()[0].len(), 6);
        assert!(mol.atoms.iter().all(|a| a.aromatic));
        assert!(mol.bonds.iter().all(|b| b.aromatic));
    }

    #[test]
    fn cyclohexene_is_not_aromatic() {
        let mol = parse("C1=CCCCC1").unwrap();
        assert_eq!(mol.rings().len(), 1);
        assert!(mol.atoms.iter().all(|a| !a.aromatic));
    }

    #[test]
    fn kekule_naphthalene_fuses() {
        let mol = parse("C1=CC=C2C=CC=CC2=C1").unwrap();
        assert_eq!(mol.rings().len(), 2);
        assert!(mol.atoms.iter().all(|a| a.aromatic));
    }

    #[test]
    fn pyrrole_and_furan() {
        assert!(parse("C1=CNC=C1").unwrap().atoms.iter().all(|a| a.aromatic));
        assert!(parse("C1=COC=C1").unwrap().atoms.iter().all(|a| a.aromatic));
    }

    #[test]
    fn morphine_has_one_aromatic_ring_of_five() {
        let mol = parse("CN1CCC23C4C1CC5=C2C(=C(C=C5)O)OC3C(C=C4)O").unwrap();
        assert_eq!(mol.rings().len(), 5);
        let aromatic: Vec<_> = mol
            .rings()
            .iter()
            .filter(|r| mol.is_aromatic_ring(r))
            .collect();
        assert_eq!(aromatic.len(), 1);
        assert_eq!(aromatic[0].len(), 6);
        assert_eq!(mol.atoms.iter().filter(|a| a.aromatic).count(), 6);
    }

    #[test]
    fn formulas() {
        assert_eq!(parse("CCO").unwrap().molecular_formula(), "C2H6O");
        assert_eq!(
            parse("CN1CCC23C4C1CC5=C2C(=C(C=C5)O)OC3C(C=C4)O")
                .unwrap()
                .molecular_formula(),
            "C17H19NO3"
        );
        assert_eq!(parse("[NH4+]").unwrap().molecular_formula(), "H4N+");
    }

    #[test]
    fn biphenyl_link_is_single() {
        let mol = parse("c1ccccc1c1ccccc1").unwrap();
        let &(_, link) = mol.adjacency(5).iter().find(|&&(n, _)| n == 6).unwrap();
        assert!(!mol.is_ring_bond(link));
        assert_eq!(mol.bonds[link].order, BondOrder::Single);
        assert!(!mol.bonds[link].aromatic);
        assert_eq!(mol.bonds.iter().filter(|b| b.order == BondOrder::Aromatic).count(), 12);
        assert!(mol.atoms.iter().all(|a| a.aromatic));
        assert_eq!(mol.molecular_formula(), "C12H10");
    }

    #[test]
    fn components() {
        assert_eq!(parse("CC.O").unwrap().component_count(), 2);
    }
}
