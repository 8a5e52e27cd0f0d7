//! 2D coordinate generation for structure depictions.
//!
//! Target distances between every pair of atoms come from the bond graph: pairs sharing a
//! ring sit on a regular polygon, everything else on an idealised 120° zigzag. Classical
//! MDS gives a starting embedding, which stress majorization then refines. Disconnected
//! fragments are laid out separately and placed side by side.

use std::collections::VecDeque;

use crate::molecule::Molecule;

/// Layout units per bond.
pub const BOND_LENGTH: f64 = 1.0;

/// Horizontal gap between disconnected fragments, in bond lengths.
const FRAGMENT_GAP: f64 = 1.5;

const MAX_STRESS_ITERS: usize = 300;
const STRESS_TOL: f64 = 1e-5;
const POWER_ITERS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dist(self, other: Self) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn of(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut b = Self {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        for p in &points[1..] {
            b.min_x = b.min_x.min(p.x);
            b.max_x = b.max_x.max(p.x);
            b.min_y = b.min_y.min(p.y);
            b.max_y = b.max_y.max(p.y);
        }
        Some(b)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.,
            (self.min_y + self.max_y) / 2.,
        )
    }
}

/// Compute 2D positions for every atom, indexed like `mol.atoms`. The drawing is centred
/// on the origin, with bonds close to `BOND_LENGTH` long.
pub fn compute_2d(mol: &Molecule) -> Vec<Point> {
    let n = mol.atom_count();
    let mut result = vec![Point::default(); n];
    if n == 0 {
        return result;
    }

    let mut cursor_x = 0.;
    for component in components(mol) {
        let mut pts = layout_component(mol, &component);

        let Some(b) = Bounds::of(&pts) else {
            continue;
        };
        let shift = Point::new(cursor_x - b.min_x, -b.center().y);
        for p in &mut pts {
            p.x += shift.x;
            p.y += shift.y;
        }
        cursor_x += b.width() + FRAGMENT_GAP * BOND_LENGTH;

        for (&atom, p) in component.iter().zip(pts) {
            result[atom] = p;
        }
    }

    if let Some(b) = Bounds::of(&result) {
        let c = b.center();
        for p in &mut result {
            p.x -= c.x;
            p.y -= c.y;
        }
    }

    result
}

/// Atom indices of each connected component, in order of first appearance.
fn components(mol: &Molecule) -> Vec<Vec<usize>> {
    let n = mol.atom_count();
    let mut seen = vec![false; n];
    let mut result = Vec::new();

    for start in 0..n {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut comp = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(cur) = queue.pop_front() {
            for nb in mol.neighbors(cur) {
                if !seen[nb] {
                    seen[nb] = true;
                    comp.push(nb);
                    queue.push_back(nb);
                }
            }
        }
        comp.sort_unstable();
        result.push(comp);
    }
    result
}

/// Breadth-first hop counts from `start`, over the whole molecule.
fn hop_counts(mol: &Molecule, start: usize) -> Vec<Option<usize>> {
    let mut dist = vec![None; mol.atom_count()];
    dist[start] = Some(0);
    let mut queue = VecDeque::from([start]);
    while let Some(cur) = queue.pop_front() {
        let d = dist[cur].unwrap_or(0);
        for nb in mol.neighbors(cur) {
            if dist[nb].is_none() {
                dist[nb] = Some(d + 1);
                queue.push_back(nb);
            }
        }
    }
    dist
}

/// Straight-line span of `hops` bonds on a 120° zigzag.
fn zigzag_distance(hops: usize) -> f64 {
    let run = hops as f64 * (3f64.sqrt() / 2.);
    let rise = if hops % 2 == 1 { 0.5 } else { 0. };
    (run * run + rise * rise).sqrt() * BOND_LENGTH
}

/// Chord between two vertices `steps` apart on a regular polygon of `size` unit edges.
fn ring_chord(size: usize, steps: usize) -> f64 {
    let angle = std::f64::consts::PI / size as f64;
    let radius = BOND_LENGTH / (2. * angle.sin());
    2. * radius * (angle * steps as f64).sin()
}

/// Ideal pairwise distances for one component.
fn target_distances(mol: &Molecule, comp: &[usize]) -> Vec<Vec<f64>> {
    let m = comp.len();
    let mut local = vec![usize::MAX; mol.atom_count()];
    for (i, &a) in comp.iter().enumerate() {
        local[a] = i;
    }

    let mut d = vec![vec![0.; m]; m];
    for (i, &a) in comp.iter().enumerate() {
        let hops = hop_counts(mol, a);
        for (j, &b) in comp.iter().enumerate() {
            if i != j {
                d[i][j] = zigzag_distance(hops[b].unwrap_or(1));
            }
        }
    }

    // Smallest rings go last so their geometry wins for atoms shared between rings.
    let mut rings: Vec<_> = mol.rings().iter().collect();
    rings.sort_by_key(|r| std::cmp::Reverse(r.len()));
    for ring in rings {
        let size = ring.len();
        for (p, &a) in ring.atoms.iter().enumerate() {
            for (q, &b) in ring.atoms.iter().enumerate() {
                if p == q || local[a] == usize::MAX {
                    continue;
                }
                let steps = p.abs_diff(q).min(size - p.abs_diff(q));
                d[local[a]][local[b]] = ring_chord(size, steps);
            }
        }
    }

    d
}

fn layout_component(mol: &Molecule, comp: &[usize]) -> Vec<Point> {
    match comp.len() {
        0 => return Vec::new(),
        1 => return vec![Point::default()],
        2 => return vec![Point::new(0., 0.), Point::new(BOND_LENGTH, 0.)],
        _ => {}
    }

    let d = target_distances(mol, comp);
    let mut pts = classical_mds(&d);
    stress_majorize(&mut pts, &d);
    pts
}

/// Torgerson scaling: double-centre the squared distances, then take the top two
/// eigenvectors by power iteration with deflation.
fn classical_mds(d: &[Vec<f64>]) -> Vec<Point> {
    let n = d.len();
    let mut b = vec![vec![0.; n]; n];

    let sq: Vec<Vec<f64>> = d.iter().map(|row| row.iter().map(|x| x * x).collect()).collect();
    let row_mean: Vec<f64> = sq.iter().map(|r| r.iter().sum::<f64>() / n as f64).collect();
    let total_mean = row_mean.iter().sum::<f64>() / n as f64;

    for i in 0..n {
        for j in 0..n {
            b[i][j] = -0.5 * (sq[i][j] - row_mean[i] - row_mean[j] + total_mean);
        }
    }

    let mut coords = vec![vec![0.; n]; 2];
    for (axis, out) in coords.iter_mut().enumerate() {
        let (lambda, v) = power_iteration(&b, axis);
        if lambda <= 1e-9 {
            // Degenerate (collinear) input; nudge so majorization can leave the line.
            for (i, c) in out.iter_mut().enumerate() {
                *c = if i % 2 == 0 { 0.05 } else { -0.05 };
            }
            continue;
        }
        let s = lambda.sqrt();
        for (c, vi) in out.iter_mut().zip(&v) {
            *c = vi * s;
        }
        for i in 0..n {
            for j in 0..n {
                b[i][j] -= lambda * v[i] * v[j];
            }
        }
    }

    (0..n).map(|i| Point::new(coords[0][i], coords[1][i])).collect()
}

/// Dominant eigenpair of a symmetric matrix. `seed` varies the deterministic start vector.
fn power_iteration(m: &[Vec<f64>], seed: usize) -> (f64, Vec<f64>) {
    let n = m.len();
    let mut v: Vec<f64> = (0..n)
        .map(|i| 1. + ((i * 7 + seed * 5 + 3) % 11) as f64 / 10.)
        .collect();
    normalize(&mut v);

    let mut lambda = 0.;
    for _ in 0..POWER_ITERS {
        let mut next: Vec<f64> = m
            .iter()
            .map(|row| row.iter().zip(&v).map(|(a, b)| a * b).sum())
            .collect();
        let norm = normalize(&mut next);
        if norm < 1e-12 {
            return (0., v);
        }
        let converged = next.iter().zip(&v).all(|(a, b)| (a - b).abs() < 1e-10);
        v = next;
        lambda = norm;
        if converged {
            break;
        }
    }

    // Rayleigh quotient keeps the sign; negative eigenvalues are useless as axes.
    let mv: Vec<f64> = m
        .iter()
        .map(|row| row.iter().zip(&v).map(|(a, b)| a * b).sum())
        .collect();
    let rq: f64 = mv.iter().zip(&v).map(|(a, b)| a * b).sum();
    (rq.min(lambda), v)
}

fn normalize(v: &mut [f64]) -> f64 {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0. {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    norm
}

/// Weighted stress majorization, weights 1/d². Gauss-Seidel updates, one atom at a time.
fn stress_majorize(pts: &mut [Point], d: &[Vec<f64>]) {
    let n = pts.len();

    for _ in 0..MAX_STRESS_ITERS {
        let mut max_move: f64 = 0.;

        for i in 0..n {
            let mut wsum = 0.;
            let mut nx = 0.;
            let mut ny = 0.;

            for j in 0..n {
                if i == j || d[i][j] <= 0. {
                    continue;
                }
                let w = 1. / (d[i][j] * d[i][j]);
                let dist = pts[i].dist(pts[j]);
                let (ux, uy) = if dist > 1e-9 {
                    ((pts[i].x - pts[j].x) / dist, (pts[i].y - pts[j].y) / dist)
                } else {
                    (0., 0.)
                };
                nx += w * (pts[j].x + d[i][j] * ux);
                ny += w * (pts[j].y + d[i][j] * uy);
                wsum += w;
            }

            if wsum > 0. {
                let next = Point::new(nx / wsum, ny / wsum);
                max_move = max_move.max(next.dist(pts[i]));
                pts[i] = next;
            }
        }

        if max_move < STRESS_TOL {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse;

    fn bond_lengths(smiles: &str) -> Vec<f64> {
        let mol = parse(smiles).unwrap();
        let pts = compute_2d(&mol);
        mol.bonds.iter().map(|b| pts[b.a].dist(pts[b.b])).collect()
    }

    #[test]
    fn single_atom_at_origin() {
        let mol = parse("C").unwrap();
        assert_eq!(compute_2d(&mol), vec![Point::default()]);
    }

    #[test]
    fn benzene_is_a_regular_hexagon() {
        for len in bond_lengths("c1ccccc1") {
            assert!((len - 1.).abs() < 0.02, "{len}");
        }
    }

    #[test]
    fn propane_bends() {
        let mol = parse("CCC").unwrap();
        let pts = compute_2d(&mol);
        let span = pts[0].dist(pts[2]);
        assert!(span < 1.95, "{span}");
        assert!(span > 1.5, "{span}");
    }

    #[test]
    fn bonds_stay_near_unit_length() {
        let lens = bond_lengths("CN1CCC23C4C1CC5=C2C(=C(C=C5)O)OC3C(C=C4)O");
        let mean = lens.iter().sum::<f64>() / lens.len() as f64;
        assert!((mean - 1.).abs() < 0.2, "{mean}");
        assert!(lens.iter().all(|l| *l > 0.3 && *l < 2.0), "{lens:?}");
    }

    #[test]
    fn fragments_do_not_overlap() {
        let mol = parse("CCO.c1ccccc1").unwrap();
        let pts = compute_2d(&mol);
        let left = Bounds::of(&pts[..3]).unwrap();
        let right = Bounds::of(&pts[3..]).unwrap();
        assert!(left.max_x < right.min_x);
    }

    #[test]
    fn layout_is_centred_and_finite() {
        let mol = parse("CCC(=O)C(CC(C)N(C)C)(C1=CC=CC=C1)C2=CC=CC=C2").unwrap();
        let pts = compute_2d(&mol);
        assert!(pts.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        let c = Bounds::of(&pts).unwrap().center();
        assert!(c.x.abs() < 1e-9 && c.y.abs() < 1e-9);
    }
}
