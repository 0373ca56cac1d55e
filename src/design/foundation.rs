//! Isolated and strip footings (TCVN 9362) and pile groups (TCVN 10304)
//!
//! All take the column-base reaction: P is the upward reaction and M the
//! overturning moment about the horizontal axes. A strip footing without a
//! support reaction takes its factored line loads instead.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::rc_beam::{flexure, RcStrip};
use super::rc_slab::punching;
use super::verdict::ratio;
use super::{CapacityCheck, Demand, DemandForces, FailureMode, ModeResult};
use crate::catalog::{Standard, StandardsCatalog};
use crate::error::{StructError, StructResult};
use crate::loads::LoadCategory;

/// Net allowable bearing pressure (kPa) of a shallow footing founded at `depth`
///
/// The Nγ term uses the catalog reference width, so the allowable pressure
/// does not depend on the footing plan.
pub fn net_allowable(soil: &str, depth: f64, catalog: &StandardsCatalog) -> StructResult<f64> {
    let soil = catalog.soil(soil)?;
    let factors = catalog.bearing_factors(soil.phi)?;
    let lookup = |key: &str| catalog.lookup(Standard::Tcvn9362, "bearing", key);

    let q_ult = soil.cohesion * factors.nc
        + soil.unit_weight * depth * factors.nq
        + 0.5 * soil.unit_weight * lookup("reference_width")? * factors.ngamma;
    Ok(q_ult / lookup("safety_factor")? - lookup("fill_unit_weight")? * depth)
}

/// Concrete body of an isolated footing under a square column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootingSlab {
    pub thickness: f64,
    /// Side of the column (m)
    pub column: f64,
    pub concrete: String,
    /// Bottom bars each way per metre width (m²/m)
    pub as_per_m: f64,
    pub rebar: String,
}

impl FootingSlab {
    pub fn new(thickness: f64, column: f64, concrete: &str) -> Self {
        Self {
            thickness,
            column,
            concrete: concrete.to_string(),
            as_per_m: 0.0,
            rebar: "CB400-V".to_string(),
        }
    }

    pub fn with_bars(mut self, as_per_m: f64, rebar: &str) -> Self {
        self.as_per_m = as_per_m;
        self.rebar = rebar.to_string();
        self
    }
}

/// Spread footing on natural soil
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootingSpec {
    /// Short side B (m)
    pub width: f64,
    /// Long side L (m)
    pub length: f64,
    /// Founding depth D below grade (m)
    pub depth: f64,
    /// Soil profile key
    pub soil: String,
    /// Punching and bending of the footing body are checked when present
    #[serde(default)]
    pub slab: Option<FootingSlab>,
}

impl FootingSpec {
    /// Sides are reordered so that `width <= length`
    pub fn new(side_a: f64, side_b: f64, depth: f64, soil: &str) -> Self {
        Self {
            width: side_a.min(side_b),
            length: side_a.max(side_b),
            depth,
            soil: soil.to_string(),
            slab: None,
        }
    }

    pub fn with_slab(mut self, slab: FootingSlab) -> Self {
        self.slab = Some(slab);
        self
    }

    pub fn area(&self) -> f64 {
        self.width * self.length
    }

    pub fn net_allowable(&self, catalog: &StandardsCatalog) -> StructResult<f64> {
        net_allowable(&self.soil, self.depth, catalog)
    }

    /// Punching around the column and bending of the cantilevers at its face
    fn body(&self, slab: &FootingSlab, p: f64, catalog: &StandardsCatalog) -> StructResult<Vec<ModeResult>> {
        let cover = catalog.lookup(Standard::Tcvn5574, "punching", "footing_cover")?;
        let h0 = slab.thickness - cover;
        if h0 <= 0.0 || slab.column <= 0.0 || slab.column >= self.width {
            return Err(StructError::config(format!(
                "footing body {} thick under a {} column does not fit a {}x{} footing",
                slab.thickness, slab.column, self.width, self.length
            )));
        }
        let grade = catalog.concrete_grade(&slab.concrete)?;
        let rebar = catalog.rebar_grade(&slab.rebar)?;
        let q = p / self.area();

        // Soil pressure inside the critical square at h0/2 from the column face
        let side = slab.column + h0;
        let enclosed = (side * side).min(self.area());
        let punch = punching(q * (self.area() - enclosed), 4.0 * side, h0, grade.rbt, catalog)?;

        let cantilever = (self.length - slab.column) / 2.0;
        let m = q * cantilever * cantilever / 2.0;
        let strip = RcStrip {
            b: 1.0,
            h: slab.thickness,
            h0,
            rb: grade.rb,
            eb: grade.eb,
        };
        let bending = flexure(&strip, m, slab.as_per_m, rebar, catalog)?.with("m", m);
        Ok(vec![punch, bending])
    }
}

impl CapacityCheck for FootingSpec {
    fn check(&self, demand: &Demand, catalog: &StandardsCatalog) -> StructResult<Vec<ModeResult>> {
        if !demand.is_uls() {
            return Ok(Vec::new());
        }
        if self.width <= 0.0 {
            return Err(StructError::config("footing has no bearing area"));
        }
        let reaction = demand.reaction()?;
        let q_net = self.net_allowable(catalog)?;
        let edge_factor = catalog.lookup(Standard::Tcvn9362, "bearing", "edge_pressure_factor")?;

        let p = reaction.fy.max(0.0);
        let m = reaction.overturning();
        let q_avg = p / self.area();
        let q_max = q_avg + 6.0 * m / (self.width * self.length * self.length);

        let mut results = vec![
            ModeResult::new(FailureMode::SoilBearing, ratio(q_avg, q_net))
                .with("q", q_avg)
                .with("q_net", q_net),
            ModeResult::new(FailureMode::EdgePressure, ratio(q_max, edge_factor * q_net))
                .with("q_max", q_max)
                .with("q_edge", edge_factor * q_net),
        ];
        if let Some(slab) = &self.slab {
            results.extend(self.body(slab, p, catalog)?);
        }
        Ok(results)
    }
}

/// Continuous footing under a wall, checked per metre run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripFootingSpec {
    pub width: f64,
    /// Founding depth D below grade (m)
    pub depth: f64,
    /// Soil profile key
    pub soil: String,
    /// Wall length carried by one support reaction (m)
    pub run: f64,
    /// Unfactored wall load per category (kN/m), used without a support reaction
    #[serde(default)]
    pub loads: BTreeMap<LoadCategory, f64>,
}

impl StripFootingSpec {
    pub fn new(width: f64, depth: f64, soil: &str) -> Self {
        Self {
            width,
            depth,
            soil: soil.to_string(),
            run: 1.0,
            loads: BTreeMap::new(),
        }
    }

    pub fn with_run(mut self, run: f64) -> Self {
        self.run = run;
        self
    }

    pub fn with_load(mut self, category: LoadCategory, line_load: f64) -> Self {
        self.loads.insert(category, line_load);
        self
    }

    /// Factored line load (kN/m) of the demand's combination
    pub fn line_load(&self, demand: &Demand) -> StructResult<f64> {
        match demand.forces {
            DemandForces::Support(reaction) => {
                if self.run <= 0.0 {
                    return Err(StructError::config("strip footing run must be positive"));
                }
                Ok(reaction.fy.max(0.0) / self.run)
            }
            _ => Ok(self
                .loads
                .iter()
                .filter_map(|(&category, &load)| {
                    demand.combination.category_factor(category).map(|f| f * load)
                })
                .sum()),
        }
    }
}

impl CapacityCheck for StripFootingSpec {
    fn check(&self, demand: &Demand, catalog: &StandardsCatalog) -> StructResult<Vec<ModeResult>> {
        if !demand.is_uls() {
            return Ok(Vec::new());
        }
        if self.width <= 0.0 {
            return Err(StructError::config("strip footing has no width"));
        }
        let line = self.line_load(demand)?;
        let q_net = net_allowable(&self.soil, self.depth, catalog)?;
        let q = line / self.width;
        Ok(vec![ModeResult::new(FailureMode::SoilBearing, ratio(q, q_net))
            .with("line_load", line)
            .with("q", q)
            .with("q_net", q_net)])
    }
}

/// Rectangular group of bored piles under a rigid cap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PileGroupSpec {
    /// Rows of piles
    pub rows: usize,
    /// Piles in each row
    pub per_row: usize,
    pub diameter: f64,
    /// Embedded length (m)
    pub length: f64,
    /// Centre-to-centre spacing (m)
    pub spacing: f64,
    /// Soil profile key
    pub soil: String,
    /// Cap plan and thickness (B, L, H) in m; sized from the layout when absent
    #[serde(default)]
    pub cap: Option<(f64, f64, f64)>,
}

impl PileGroupSpec {
    pub fn new(rows: usize, per_row: usize, diameter: f64, length: f64, spacing: f64, soil: &str) -> Self {
        Self {
            rows,
            per_row,
            diameter,
            length,
            spacing,
            soil: soil.to_string(),
            cap: None,
        }
    }

    pub fn with_cap(mut self, width: f64, length: f64, thickness: f64) -> Self {
        self.cap = Some((width, length, thickness));
        self
    }

    /// Cap dimensions; a default cap overhangs the outer piles by one diameter
    pub fn cap(&self, catalog: &StandardsCatalog) -> StructResult<(f64, f64, f64)> {
        if let Some(cap) = self.cap {
            return Ok(cap);
        }
        let thickness = catalog.lookup(Standard::Tcvn10304, "pile", "cap_thickness")?;
        let span = |count: usize| count.saturating_sub(1) as f64 * self.spacing + 2.0 * self.diameter;
        Ok((span(self.per_row), span(self.rows), thickness))
    }

    pub fn pile_count(&self) -> usize {
        self.rows * self.per_row
    }

    /// Allowable load of a single pile
    pub fn single_pile_capacity(&self, catalog: &StandardsCatalog) -> StructResult<f64> {
        let soil = catalog.soil(&self.soil)?;
        let safety = catalog.lookup(Standard::Tcvn10304, "pile", "safety_factor")?;
        let base = soil.pile_base_resistance * PI * self.diameter * self.diameter / 4.0;
        let shaft = soil.pile_shaft_friction * PI * self.diameter * self.length;
        Ok((base + shaft) / safety)
    }

    /// Converse-Labarre group efficiency, floored at the catalog minimum
    ///
    /// This is the full two-term formula: a 2x2 group loses θ/90, not the
    /// 1.5·θ/90 of the shortened single-term rule.
    pub fn efficiency(&self, catalog: &StandardsCatalog) -> StructResult<f64> {
        let floor = catalog.lookup(Standard::Tcvn10304, "pile", "min_group_efficiency")?;
        let (m, n) = (self.rows as f64, self.per_row as f64);
        let theta = (self.diameter / self.spacing).atan().to_degrees();
        let eta = 1.0 - theta * ((n - 1.0) * m + (m - 1.0) * n) / (90.0 * m * n);
        Ok(eta.max(floor))
    }
}

impl CapacityCheck for PileGroupSpec {
    fn check(&self, demand: &Demand, catalog: &StandardsCatalog) -> StructResult<Vec<ModeResult>> {
        if !demand.is_uls() {
            return Ok(Vec::new());
        }
        if self.pile_count() == 0 || self.spacing <= 0.0 {
            return Err(StructError::config("pile group needs piles at a positive spacing"));
        }
        let reaction = demand.reaction()?;
        let qa = self.single_pile_capacity(catalog)?;
        let eta = self.efficiency(catalog)?;
        let concrete = catalog.lookup(Standard::Tcvn9362, "bearing", "concrete_unit_weight")?;

        let (b, l, h) = self.cap(catalog)?;
        let cap_weight = concrete * b * l * h;
        let load = reaction.fy.max(0.0) + cap_weight;
        let capacity = eta * self.pile_count() as f64 * qa;

        Ok(vec![ModeResult::new(FailureMode::PileGroup, ratio(load, capacity))
            .with("qa", qa)
            .with("efficiency", eta)
            .with("cap_weight", cap_weight)])
    }
}
