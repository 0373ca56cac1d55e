//! Reinforced concrete columns under axial load and biaxial bending
//!
//! The P-M diagram of each axis is traced by strain compatibility: the
//! compressed face reaches εb2, concrete carries Rb over a block of depth ω·x
//! and every bar layer is elastic-perfectly-plastic. Compression is positive
//! in the diagram.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::rc_beam::rectangle;
use super::verdict::ratio;
use super::{CapacityCheck, Demand, FailureMode, ModeResult};
use crate::catalog::{RebarGrade, Standard, StandardsCatalog};
use crate::error::{StructError, StructResult};

/// Rectangular column with bars distributed around the perimeter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RcColumnSpec {
    /// Section face to the bar centroid (m)
    pub cover: f64,
    /// Bars along each face of width b, corners included
    pub bars_b: usize,
    /// Bars along each face of height h, corners included
    pub bars_h: usize,
    /// Area of one bar (m²)
    pub bar_area: f64,
    pub rebar: String,
}

impl RcColumnSpec {
    pub fn new(cover: f64, bars_b: usize, bars_h: usize, bar_area: f64, rebar: &str) -> Self {
        Self {
            cover,
            bars_b,
            bars_h,
            bar_area,
            rebar: rebar.to_string(),
        }
    }

    pub fn bar_count(&self) -> usize {
        2 * self.bars_b + 2 * self.bars_h.saturating_sub(2)
    }

    pub fn steel_area(&self) -> f64 {
        self.bar_count() as f64 * self.bar_area
    }

    /// Bar layers `(distance from the top face, area)` for bending over `depth`.
    ///
    /// `end_bars` sit on each face normal to the bending direction, `side_bars`
    /// on each face parallel to it.
    fn layers(&self, depth: f64, end_bars: usize, side_bars: usize) -> Vec<(f64, f64)> {
        let mut layers = vec![
            (self.cover, end_bars as f64 * self.bar_area),
            (depth - self.cover, end_bars as f64 * self.bar_area),
        ];
        let gaps = side_bars.saturating_sub(1);
        for k in 1..gaps {
            let d = self.cover + k as f64 * (depth - 2.0 * self.cover) / gaps as f64;
            layers.push((d, 2.0 * self.bar_area));
        }
        layers
    }

    fn validate(&self, width: f64, height: f64) -> StructResult<()> {
        if self.bars_b < 2 || self.bars_h < 2 {
            return Err(StructError::config("column needs at least two bars per face"));
        }
        if 2.0 * self.cover >= width.min(height) {
            return Err(StructError::config(format!(
                "cover {} leaves no core in a {}x{} column",
                self.cover, width, height
            )));
        }
        Ok(())
    }

    /// Diagrams about the major (depth h) and minor (depth b) axes
    pub fn diagrams(
        &self,
        width: f64,
        height: f64,
        rb: f64,
        catalog: &StandardsCatalog,
    ) -> StructResult<(InteractionDiagram, InteractionDiagram)> {
        self.validate(width, height)?;
        let rebar = catalog.rebar_grade(&self.rebar)?;
        let lookup = |table: &str, key: &str| catalog.lookup(Standard::Tcvn5574, table, key);
        let params = BlockParameters {
            rb,
            eps_b2: lookup("flexure", "eps_b2")?,
            omega: lookup("flexure", "block_depth_factor")?,
            points: lookup("column", "diagram_points")?.max(8.0) as usize,
        };
        let major = InteractionDiagram::build(
            height,
            width,
            &self.layers(height, self.bars_b, self.bars_h),
            rebar,
            &params,
        );
        let minor = InteractionDiagram::build(
            width,
            height,
            &self.layers(width, self.bars_h, self.bars_b),
            rebar,
            &params,
        );
        Ok((major, minor))
    }
}

#[derive(Debug, Clone, Copy)]
struct BlockParameters {
    rb: f64,
    eps_b2: f64,
    omega: f64,
    points: usize,
}

/// Closed P-M capacity polygon of one bending axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionDiagram {
    /// Pure compression capacity
    pub p0: f64,
    /// Pure tension capacity (negative)
    pub pt: f64,
    /// Vertices `(P, M)`: tension point, positive-moment branch, compression
    /// point, negative-moment branch
    pub vertices: Vec<Vector2<f64>>,
}

impl InteractionDiagram {
    fn build(depth: f64, width: f64, layers: &[(f64, f64)], rebar: &RebarGrade, params: &BlockParameters) -> Self {
        let rb = params.rb;
        let as_total: f64 = layers.iter().map(|(_, a)| a).sum();
        let p0 = rb * (depth * width - as_total) + rebar.rsc * as_total;
        let pt = -rebar.rs * as_total;

        let section_point = |x: f64, from_top: bool| -> Vector2<f64> {
            let block = (params.omega * x).min(depth);
            let concrete = rb * block * width;
            let mut p = concrete;
            let mut m = concrete * (depth - block) / 2.0;
            for &(d, area) in layers {
                let di = if from_top { d } else { depth - d };
                let strain = params.eps_b2 * (x - di) / x;
                let mut stress = (rebar.es * strain).clamp(-rebar.rs, rebar.rsc);
                if di < block && stress > 0.0 {
                    stress -= rb;
                }
                p += stress * area;
                m += stress * area * (depth / 2.0 - di);
            }
            Vector2::new(p, if from_top { m } else { -m })
        };

        // Neutral axis depths spaced geometrically from deep tension to full compression
        let n = params.points;
        let x_min = 1e-3 * depth;
        let x_max = 20.0 * depth;
        let depths: Vec<f64> = (0..n)
            .map(|k| x_min * (x_max / x_min).powf(k as f64 / (n - 1) as f64))
            .collect();

        let mut vertices = Vec::with_capacity(2 * n + 2);
        vertices.push(Vector2::new(pt, 0.0));
        vertices.extend(depths.iter().map(|&x| section_point(x, true)));
        vertices.push(Vector2::new(p0, 0.0));
        vertices.extend(depths.iter().rev().map(|&x| section_point(x, false)));

        Self { p0, pt, vertices }
    }

    fn edges(&self) -> impl Iterator<Item = (Vector2<f64>, Vector2<f64>)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |k| (self.vertices[k], self.vertices[(k + 1) % n]))
    }

    /// Radial utilization of `(p, m)`: distance to the demand over distance to
    /// the diagram along the same ray from the origin
    pub fn utilization(&self, p: f64, m: f64) -> f64 {
        let d = Vector2::new(p, m);
        if d.norm() == 0.0 {
            return 0.0;
        }
        let mut t_min = f64::INFINITY;
        for (a, b) in self.edges() {
            let e = b - a;
            let denom = d.perp(&e);
            if denom.abs() < 1e-14 {
                continue;
            }
            let t = a.perp(&e) / denom;
            let s = a.perp(&d) / denom;
            if t > 0.0 && (-1e-12..=1.0 + 1e-12).contains(&s) {
                t_min = t_min.min(t);
            }
        }
        if t_min.is_finite() {
            1.0 / t_min
        } else {
            f64::INFINITY
        }
    }

    /// Moment capacities `(positive, negative)` at axial load `p`; `None`
    /// outside `[pt, p0]`
    pub fn capacity_at(&self, p: f64) -> Option<(f64, f64)> {
        if p < self.pt || p > self.p0 {
            return None;
        }
        let mut m_pos = 0.0_f64;
        let mut m_neg = 0.0_f64;
        for (a, b) in self.edges() {
            let (lo, hi) = if a.x <= b.x { (a, b) } else { (b, a) };
            if p < lo.x || p > hi.x {
                continue;
            }
            let m = if hi.x - lo.x < 1e-12 {
                lo.y.max(hi.y)
            } else {
                lo.y + (p - lo.x) / (hi.x - lo.x) * (hi.y - lo.y)
            };
            m_pos = m_pos.max(m);
            m_neg = m_neg.min(m);
        }
        Some((m_pos, m_neg))
    }

    fn moment_ratio(&self, p: f64, m: f64) -> f64 {
        if m == 0.0 {
            return 0.0;
        }
        match self.capacity_at(p) {
            Some((pos, neg)) => ratio(m, if m > 0.0 { pos } else { -neg }),
            None => f64::INFINITY,
        }
    }
}

impl CapacityCheck for RcColumnSpec {
    fn check(&self, demand: &Demand, catalog: &StandardsCatalog) -> StructResult<Vec<ModeResult>> {
        if !demand.is_uls() {
            return Ok(Vec::new());
        }
        let forces = demand.member_forces()?;
        let (width, height) = rectangle(demand)?;
        let (rb, _) = demand.concrete_strength()?;
        let (major, minor) = self.diagrams(width, height, rb, catalog)?;
        let exponent = catalog.lookup(Standard::Tcvn5574, "column", "biaxial_exponent")?;

        let mut governing = (0.0_f64, 0.0, 0.0, 0.0);
        for station in &forces.stations {
            let p = -station.axial;
            let u_major = major.utilization(p, station.moment_z);
            let u_minor = minor.utilization(p, station.moment_y);
            let u_biaxial = (major.moment_ratio(p, station.moment_z).powf(exponent)
                + minor.moment_ratio(p, station.moment_y).powf(exponent))
            .powf(1.0 / exponent);
            let u = u_major.max(u_minor).max(u_biaxial);
            if u > governing.0 || u.is_nan() {
                governing = (u, p, station.moment_z, station.moment_y);
            }
        }

        let (u, p, mz, my) = governing;
        Ok(vec![ModeResult::new(FailureMode::AxialBending, u)
            .with("p", p)
            .with("m_major", mz)
            .with("m_minor", my)
            .with("p0", major.p0)
            .with("pt", major.pt)])
    }
}
