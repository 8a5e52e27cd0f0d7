//! Physicochemical descriptors derived from a structure encoding.
//!
//! | Property           | Method                                   |
//! |--------------------|------------------------------------------|
//! | Molecular Weight   | Average atomic masses, implicit H added  |
//! | LogP               | Wildman-Crippen atom contributions       |
//! | H-Bond Donors      | N-H, O-H and S-H heteroatoms             |
//! | H-Bond Acceptors   | Lipinski-style N/O/S/F acceptors         |
//! | Rotatable Bonds    | Acyclic single bonds, amides excluded    |
//! | Polar Surface Area | Ertl TPSA, N and O contributions         |
//!
//! Aromaticity is perceived on the parsed molecule first, so Kekulé and aromatic
//! spellings of the same structure give the same values.

use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
    element::Element,
    molecule::{Bond, BondOrder, Molecule},
    smiles,
};

const H_MASS: f64 = 1.008;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    MolecularWeight,
    LogP,
    HBondDonors,
    HBondAcceptors,
    RotatableBonds,
    PolarSurfaceArea,
}

impl Property {
    /// Display order.
    pub const ALL: [Property; 6] = [
        Self::MolecularWeight,
        Self::LogP,
        Self::HBondDonors,
        Self::HBondAcceptors,
        Self::RotatableBonds,
        Self::PolarSurfaceArea,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::MolecularWeight => "Molecular Weight",
            Self::LogP => "LogP",
            Self::HBondDonors => "H-Bond Donors",
            Self::HBondAcceptors => "H-Bond Acceptors",
            Self::RotatableBonds => "Rotatable Bonds",
            Self::PolarSurfaceArea => "Polar Surface Area",
        }
    }
}

impl Display for Property {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Raw descriptor values for one molecule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Descriptors {
    /// g/mol
    pub molecular_weight: f64,
    pub logp: f64,
    pub h_bond_donors: usize,
    pub h_bond_acceptors: usize,
    pub rotatable_bonds: usize,
    /// Å²
    pub tpsa: f64,
}

impl Descriptors {
    pub fn compute(mol: &Molecule) -> Self {
        Self {
            molecular_weight: molecular_weight(mol),
            logp: crippen_logp(mol),
            h_bond_donors: h_bond_donors(mol),
            h_bond_acceptors: h_bond_acceptors(mol),
            rotatable_bonds: rotatable_bonds(mol),
            tpsa: tpsa(mol),
        }
    }

    pub fn formatted(&self, prop: Property) -> String {
        match prop {
            Property::MolecularWeight => format!("{:.2} g/mol", self.molecular_weight),
            Property::LogP => format!("{:.2}", self.logp),
            Property::HBondDonors => self.h_bond_donors.to_string(),
            Property::HBondAcceptors => self.h_bond_acceptors.to_string(),
            Property::RotatableBonds => self.rotatable_bonds.to_string(),
            Property::PolarSurfaceArea => format!("{:.2} Å²", self.tpsa),
        }
    }

    pub fn to_property_map(&self) -> PropertyMap {
        PropertyMap {
            entries: Property::ALL
                .iter()
                .map(|&p| (p, self.formatted(p)))
                .collect(),
        }
    }
}

/// Formatted descriptor values, in display order. Empty means "unavailable".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyMap {
    entries: Vec<(Property, String)>,
}

impl PropertyMap {
    pub fn get(&self, prop: Property) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| *p == prop)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, &str)> {
        self.entries.iter().map(|(p, v)| (*p, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PropertyMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (p, v) in &self.entries {
            map.serialize_entry(p.label(), v)?;
        }
        map.end()
    }
}

/// Parse a structure encoding and compute its formatted properties.
///
/// Never fails: an encoding that can't be parsed yields an empty map, which callers
/// should present as "not available". Nothing is cached.
pub fn derive(structure_encoding: &str) -> PropertyMap {
    match smiles::parse(structure_encoding) {
        Ok(mol) => Descriptors::compute(&mol).to_property_map(),
        Err(e) => {
            log::debug!("No properties for {structure_encoding:?}: {e}");
            PropertyMap::default()
        }
    }
}

pub fn molecular_weight(mol: &Molecule) -> f64 {
    mol.atoms
        .iter()
        .map(|a| a.element.atomic_mass() + a.hydrogens as f64 * H_MASS)
        .sum()
}

/// Heavy neighbours of an atom, with the bond leading to each.
fn heavy_neighbors(mol: &Molecule, atom: usize) -> impl Iterator<Item = (usize, &Bond)> {
    mol.adjacency(atom)
        .iter()
        .filter(|&&(n, _)| mol.atoms[n].element != Element::H)
        .map(|&(n, b)| (n, &mol.bonds[b]))
}

/// A localized (non-aromatic) double bond.
fn is_double(bond: &Bond) -> bool {
    bond.order == BondOrder::Double && !bond.aromatic
}

fn has_double_to(mol: &Molecule, atom: usize, targets: &[Element]) -> bool {
    heavy_neighbors(mol, atom)
        .any(|(n, b)| is_double(b) && targets.contains(&mol.atoms[n].element))
}

pub fn h_bond_donors(mol: &Molecule) -> usize {
    (0..mol.atom_count())
        .filter(|&i| {
            let atom = &mol.atoms[i];
            let h = mol.total_hydrogens(i);
            if h == 0 {
                return false;
            }
            match atom.element {
                Element::N if atom.aromatic => h == 1 && atom.charge == 0,
                Element::N => {
                    let v = mol.valence(i);
                    (atom.charge == 0 && v == 3) || (atom.charge == 1 && v == 4)
                }
                Element::O | Element::S => h == 1 && atom.charge == 0,
                _ => false,
            }
        })
        .count()
}

pub fn h_bond_acceptors(mol: &Molecule) -> usize {
    const HETERO_DOUBLE: [Element; 4] = [Element::O, Element::N, Element::P, Element::S];

    (0..mol.atom_count())
        .filter(|&i| {
            let atom = &mol.atoms[i];
            let h = mol.total_hydrogens(i);
            match atom.element {
                Element::O | Element::S if atom.aromatic => atom.charge == 0,
                Element::O | Element::S => {
                    if atom.charge < 0 {
                        return true;
                    }
                    if mol.valence(i) != 2 {
                        return false;
                    }
                    match h {
                        0 => true,
                        1 => !heavy_neighbors(mol, i).any(|(n, b)| {
                            b.order == BondOrder::Single
                                && !b.aromatic
                                && has_double_to(mol, n, &HETERO_DOUBLE)
                        }),
                        _ => false,
                    }
                }
                Element::N if atom.aromatic => h == 0 && atom.charge == 0,
                Element::N => {
                    if mol.valence(i) != 3 || atom.charge != 0 {
                        return false;
                    }
                    // Amide-like nitrogens: N-X=Y with the double bond outside any ring.
                    !mol.adjacency(i).iter().any(|&(n, b)| {
                        let bond = &mol.bonds[b];
                        bond.order == BondOrder::Single
                            && !bond.aromatic
                            && mol.adjacency(n).iter().any(|&(m, b2)| {
                                is_double(&mol.bonds[b2])
                                    && !mol.is_ring_bond(b2)
                                    && HETERO_DOUBLE.contains(&mol.atoms[m].element)
                            })
                    })
                }
                Element::F => true,
                _ => false,
            }
        })
        .count()
}

/// An end atom that rules its bond out of the rotatable count: terminal, triple-bonded,
/// or the centre of a CX3 / C(CH3)3 group.
fn is_rotor_blocker(mol: &Molecule, atom: usize) -> bool {
    if mol.heavy_degree(atom) <= 1 {
        return true;
    }
    if heavy_neighbors(mol, atom).any(|(_, b)| b.order == BondOrder::Triple) {
        return true;
    }
    if mol.atoms[atom].element == Element::C {
        let nbrs: Vec<usize> = heavy_neighbors(mol, atom).map(|(n, _)| n).collect();
        for el in [Element::F, Element::Cl, Element::Br] {
            if nbrs.iter().filter(|&&n| mol.atoms[n].element == el).count() == 3 {
                return true;
            }
        }
        let methyls = nbrs
            .iter()
            .filter(|&&n| {
                mol.atoms[n].element == Element::C
                    && mol.heavy_degree(n) == 1
                    && mol.total_hydrogens(n) == 3
            })
            .count();
        if methyls == 3 {
            return true;
        }
    }
    false
}

/// C(=O|N|S)-N/O/S bonds of amides, esters and their thio analogues.
fn is_amide_like(mol: &Molecule, a: usize, b: usize) -> bool {
    let check = |c: usize, x: usize| {
        mol.atoms[c].element == Element::C
            && mol.heavy_degree(c) == 3
            && has_double_to(mol, c, &[Element::N, Element::O, Element::S])
            && matches!(mol.atoms[x].element, Element::N | Element::O | Element::S)
            && mol.heavy_degree(x) > 1
    };
    check(a, b) || check(b, a)
}

pub fn rotatable_bonds(mol: &Molecule) -> usize {
    mol.bonds
        .iter()
        .enumerate()
        .filter(|&(i, bond)| {
            bond.order == BondOrder::Single
                && !bond.aromatic
                && !mol.is_ring_bond(i)
                && mol.atoms[bond.a].element != Element::H
                && mol.atoms[bond.b].element != Element::H
                && !is_rotor_blocker(mol, bond.a)
                && !is_rotor_blocker(mol, bond.b)
                && !is_amide_like(mol, bond.a, bond.b)
        })
        .count()
}

/// Bond tallies over heavy neighbours, as used by the TPSA fragment table.
#[derive(Default)]
struct BondTally {
    single: usize,
    double: usize,
    triple: usize,
    aromatic: usize,
}

fn tally(mol: &Molecule, atom: usize) -> BondTally {
    let mut t = BondTally::default();
    for (_, b) in heavy_neighbors(mol, atom) {
        if b.aromatic {
            t.aromatic += 1;
            continue;
        }
        match b.order {
            BondOrder::Single => t.single += 1,
            BondOrder::Double => t.double += 1,
            BondOrder::Triple => t.triple += 1,
            BondOrder::Aromatic => t.aromatic += 1,
            BondOrder::Quadruple => {}
        }
    }
    t
}

fn in_three_ring(mol: &Molecule, atom: usize) -> bool {
    mol.rings()
        .iter()
        .any(|r| r.len() == 3 && r.atoms.contains(&atom))
}

/// Topological polar surface area, from Ertl's nitrogen and oxygen fragment values.
pub fn tpsa(mol: &Molecule) -> f64 {
    (0..mol.atom_count())
        .map(|i| tpsa_contribution(mol, i))
        .sum()
}

fn tpsa_contribution(mol: &Molecule, i: usize) -> f64 {
    let atom = &mol.atoms[i];
    let n = mol.heavy_degree(i);
    let h = mol.total_hydrogens(i);
    let chg = atom.charge;
    let t = tally(mol, i);

    match atom.element {
        Element::N => {
            let v = match n {
                1 => match (h, chg) {
                    (0, 0) if t.triple == 1 => Some(23.79),
                    (1, 0) if t.double == 1 => Some(23.85),
                    (2, 0) if t.single == 1 => Some(26.02),
                    (2, 1) if t.double == 1 => Some(25.59),
                    (3, 1) if t.single == 1 => Some(27.64),
                    _ => None,
                },
                2 => match (h, chg) {
                    (0, 0) if t.single == 1 && t.double == 1 => Some(12.36),
                    (0, 0) if t.triple == 1 && t.double == 1 => Some(13.60),
                    (1, 0) if t.single == 2 => {
                        Some(if in_three_ring(mol, i) { 21.94 } else { 12.03 })
                    }
                    (0, 1) if t.triple == 1 && t.single == 1 => Some(4.36),
                    (1, 1) if t.double == 1 && t.single == 1 => Some(13.97),
                    (2, 1) if t.single == 2 => Some(16.61),
                    (0, 0) if t.aromatic == 2 => Some(12.89),
                    (1, 0) if t.aromatic == 2 => Some(15.79),
                    (1, 1) if t.aromatic == 2 => Some(14.14),
                    _ => None,
                },
                3 => match (h, chg) {
                    (0, 0) if t.single == 3 => {
                        Some(if in_three_ring(mol, i) { 3.01 } else { 3.24 })
                    }
                    (0, 0) if t.single == 1 && t.double == 2 => Some(11.68),
                    (0, 1) if t.single == 2 && t.double == 1 => Some(3.01),
                    (1, 1) if t.single == 3 => Some(4.44),
                    (0, 0) if t.aromatic == 3 => Some(4.41),
                    (0, 0) if t.single == 1 && t.aromatic == 2 => Some(4.93),
                    (0, 0) if t.double == 1 && t.aromatic == 2 => Some(8.39),
                    (0, 1) if t.aromatic == 3 => Some(4.10),
                    (0, 1) if t.single == 1 && t.aromatic == 2 => Some(3.88),
                    _ => None,
                },
                4 if h == 0 && chg == 1 && t.single == 4 => Some(0.0),
                _ => None,
            };
            v.unwrap_or_else(|| (30.5 - n as f64 * 8.2 + h as f64 * 1.5).max(0.0))
        }
        Element::O => {
            let v = match n {
                1 => match (h, chg) {
                    (0, 0) if t.double == 1 => Some(17.07),
                    (1, 0) if t.single == 1 => Some(20.23),
                    (0, -1) if t.single == 1 => Some(23.06),
                    _ => None,
                },
                2 => match (h, chg) {
                    (0, 0) if t.single == 2 => {
                        Some(if in_three_ring(mol, i) { 12.53 } else { 9.23 })
                    }
                    (0, 0) if t.aromatic == 2 => Some(13.14),
                    _ => None,
                },
                _ => None,
            };
            v.unwrap_or_else(|| (28.5 - n as f64 * 8.6 + h as f64 * 1.5).max(0.0))
        }
        _ => 0.0,
    }
}

/// Wildman-Crippen logP: a sum of per-atom contributions, typed by element, hybridisation
/// and neighbourhood, plus a contribution for each attached hydrogen.
pub fn crippen_logp(mol: &Molecule) -> f64 {
    let mut logp = 0.0;
    for i in 0..mol.atom_count() {
        let atom = &mol.atoms[i];
        if atom.element == Element::H {
            // Explicit hydrogen node: typed by its (single) neighbour.
            if let Some(host) = mol.neighbors(i).next() {
                logp += crippen_hydrogen(mol, host);
            } else {
                logp += 0.123;
            }
            continue;
        }
        logp += crippen_heavy(mol, i);
        logp += atom.hydrogens as f64 * crippen_hydrogen(mol, i);
    }
    logp
}

fn crippen_hydrogen(mol: &Molecule, host: usize) -> f64 {
    match mol.atoms[host].element {
        Element::C => 0.123,
        Element::N => 0.2142,
        Element::O => {
            // Acidic H: O bonded to a carbon (or heteroatom) carrying a double bond.
            let acidic = heavy_neighbors(mol, host).any(|(n, _)| match mol.atoms[n].element {
                Element::C => has_double_to(
                    mol,
                    n,
                    &[Element::C, Element::N, Element::O, Element::S],
                ),
                Element::O | Element::S => true,
                _ => false,
            });
            if acidic { 0.298 } else { -0.2677 }
        }
        _ => 0.1125,
    }
}

fn crippen_heavy(mol: &Molecule, i: usize) -> f64 {
    let atom = &mol.atoms[i];
    let h = mol.total_hydrogens(i);
    let aromatic_nbr = heavy_neighbors(mol, i).any(|(n, _)| mol.atoms[n].aromatic);

    match atom.element {
        Element::C if atom.aromatic => crippen_aromatic_carbon(mol, i, h),
        Element::C => {
            if heavy_neighbors(mol, i).any(|(_, b)| b.order == BondOrder::Triple) {
                return 0.0017;
            }
            if let Some((n, _)) = heavy_neighbors(mol, i).find(|(_, b)| is_double(b)) {
                return if mol.atoms[n].element != Element::C {
                    -0.2783
                } else if aromatic_nbr {
                    0.264
                } else {
                    0.1551
                };
            }

            let hetero_nbr = heavy_neighbors(mol, i).any(|(n, _)| {
                let a = &mol.atoms[n];
                !a.aromatic
                    && (a.element.is_halogen()
                        || matches!(a.element, Element::N | Element::O | Element::P | Element::S))
            });
            let other_nbr = heavy_neighbors(mol, i).any(|(n, _)| {
                !matches!(
                    mol.atoms[n].element,
                    Element::C | Element::N | Element::O | Element::P | Element::S
                ) && !mol.atoms[n].element.is_halogen()
            });

            if hetero_nbr && (h == 3 || !aromatic_nbr) {
                if h >= 2 { -0.2035 } else { -0.2051 }
            } else if other_nbr {
                0.2148
            } else if !aromatic_nbr {
                if h >= 2 { 0.1441 } else { 0.0 }
            } else {
                match h {
                    3 => {
                        let on_carbon = heavy_neighbors(mol, i)
                            .any(|(n, _)| mol.atoms[n].aromatic && mol.atoms[n].element == Element::C);
                        if on_carbon { 0.08452 } else { -0.1444 }
                    }
                    2 => -0.0516,
                    1 => 0.1193,
                    _ => -0.0967,
                }
            }
        }
        Element::N if atom.aromatic => {
            if atom.charge > 0 { -1.119 } else { -0.3239 }
        }
        Element::N => {
            if atom.charge > 0 {
                return if h > 0 {
                    -1.950
                } else if mol.heavy_degree(i) == 4 {
                    -0.3396
                } else {
                    0.2887
                };
            }
            if atom.charge < 0 {
                return 0.2887;
            }
            if heavy_neighbors(mol, i).any(|(_, b)| b.order == BondOrder::Triple) {
                return 0.01508;
            }
            if heavy_neighbors(mol, i).any(|(_, b)| is_double(b)) {
                return if h >= 1 { 0.08387 } else { 0.1836 };
            }
            match h {
                0 => if aromatic_nbr { -0.4458 } else { -0.3187 },
                1 => if aromatic_nbr { -0.5188 } else { -0.7096 },
                2 => if aromatic_nbr { -1.027 } else { -1.019 },
                _ => -1.019,
            }
        }
        Element::O if atom.aromatic => 0.1552,
        Element::O => crippen_oxygen(mol, i, h),
        Element::F => 0.4202,
        Element::Cl => 0.6895,
        Element::Br => 0.8456,
        Element::I => 0.8857,
        Element::S if atom.aromatic => 0.6237,
        Element::S => {
            if atom.charge != 0 { -0.0024 } else { 0.6482 }
        }
        Element::P => 0.8612,
        _ => 0.0,
    }
}

fn crippen_aromatic_carbon(mol: &Molecule, i: usize, h: usize) -> f64 {
    // Substituents hanging off the ring.
    let exo: Vec<(usize, &Bond)> = heavy_neighbors(mol, i).filter(|(_, b)| !b.aromatic).collect();

    for &(n, _) in &exo {
        let el = mol.atoms[n].element;
        let common = el.is_halogen()
            || matches!(el, Element::C | Element::N | Element::O | Element::S);
        if !common {
            return -0.5443;
        }
        match el {
            Element::F => return 0.0,
            Element::Cl => return 0.245,
            Element::Br => return 0.198,
            Element::I => return 0.0,
            _ => {}
        }
    }

    if h >= 1 {
        return 0.1581;
    }

    let Some(&(n, bond)) = exo.first() else {
        return 0.2955;
    };
    let sub = &mol.atoms[n];

    if is_double(bond) {
        return -0.8186;
    }
    if sub.aromatic {
        return 0.2713;
    }
    match sub.element {
        Element::C => 0.136,
        Element::N => 0.4619,
        Element::O => 0.5437,
        Element::S => 0.1893,
        _ => 0.08129,
    }
}

fn crippen_oxygen(mol: &Molecule, i: usize, h: usize) -> f64 {
    let atom = &mol.atoms[i];

    if atom.charge < 0 {
        let Some((n, _)) = heavy_neighbors(mol, i).next() else {
            return -1.189;
        };
        return match mol.atoms[n].element {
            Element::N => 0.0335,
            Element::S => -0.3339,
            Element::C if has_double_to(mol, n, &[Element::O]) => -1.326,
            _ => -1.189,
        };
    }

    if let Some((n, _)) = heavy_neighbors(mol, i).find(|(_, b)| is_double(b)) {
        let partner = &mol.atoms[n];
        return match partner.element {
            Element::N | Element::O => 0.0335,
            Element::S | Element::P => -0.3339,
            Element::C if partner.aromatic => 0.1788,
            Element::C => {
                let others: Vec<usize> = heavy_neighbors(mol, n)
                    .map(|(m, _)| m)
                    .filter(|&m| m != i)
                    .collect();
                if others.iter().any(|&m| mol.atoms[m].aromatic) {
                    0.1129
                } else if others.len() == 2
                    && others
                        .iter()
                        .all(|&m| mol.atoms[m].element != Element::C)
                {
                    0.4833
                } else {
                    -0.1526
                }
            }
            _ => -0.1188,
        };
    }

    if h >= 1 {
        return -0.2893;
    }

    if heavy_neighbors(mol, i).any(|(n, _)| mol.atoms[n].aromatic) {
        -0.4195
    } else {
        -0.0684
    }
}
