//! Reinforced concrete slab panels
//!
//! A panel is checked on a 1 m strip in each span direction. Its demand is the
//! area load of the combination, not analysis forces. A panel carried by a
//! column is also checked for punching around it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rc_beam::{crack_width, flexure, Environment, RcStrip};
use super::verdict::ratio;
use super::{CapacityCheck, Demand, FailureMode, ModeResult};
use crate::catalog::{Standard, StandardsCatalog};
use crate::error::{StructError, StructResult};
use crate::loads::LoadCategory;

/// Punching shear through a depth `h0` along a critical perimeter (TCVN 5574)
pub(crate) fn punching(
    force: f64,
    perimeter: f64,
    h0: f64,
    rbt: f64,
    catalog: &StandardsCatalog,
) -> StructResult<ModeResult> {
    let factor = catalog.lookup(Standard::Tcvn5574, "punching", "resistance_factor")?;
    let capacity = factor * rbt * perimeter * h0;
    Ok(ModeResult::new(FailureMode::Punching, ratio(force, capacity))
        .with("f_punch", force)
        .with("perimeter", perimeter)
        .with("capacity", capacity))
}

/// Column position in the slab; sets the sides of the punching perimeter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnPosition {
    #[default]
    Interior,
    Edge,
    Corner,
}

impl ColumnPosition {
    fn sides(&self) -> f64 {
        match self {
            ColumnPosition::Interior => 4.0,
            ColumnPosition::Edge => 3.0,
            ColumnPosition::Corner => 2.0,
        }
    }
}

/// Square column supporting the slab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabColumn {
    /// Column side (m)
    pub size: f64,
    pub position: ColumnPosition,
    /// Slab area carried by the column (m²)
    pub tributary_area: f64,
}

/// Slab panel geometry, reinforcement and area loads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RcSlabSpec {
    /// Short span (m)
    pub lx: f64,
    /// Long span (m)
    pub ly: f64,
    pub thickness: f64,
    /// Tension face to the centroid of the outer layer (m)
    pub cover: f64,
    /// Bars along the short span per metre width (m²/m)
    pub as_x: f64,
    /// Bars along the long span per metre width (m²/m)
    pub as_y: f64,
    pub bar_diameter: f64,
    pub rebar: String,
    pub concrete: String,
    /// Unfactored area load per category (kPa)
    pub loads: BTreeMap<LoadCategory, f64>,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub column: Option<SlabColumn>,
}

impl RcSlabSpec {
    /// Spans are reordered so that `lx <= ly`
    pub fn new(span_a: f64, span_b: f64, thickness: f64, concrete: &str) -> Self {
        Self {
            lx: span_a.min(span_b),
            ly: span_a.max(span_b),
            thickness,
            cover: 0.02,
            as_x: 0.0,
            as_y: 0.0,
            bar_diameter: 0.01,
            rebar: "CB300-V".to_string(),
            concrete: concrete.to_string(),
            loads: BTreeMap::new(),
            environment: Environment::Normal,
            column: None,
        }
    }

    pub fn with_reinforcement(mut self, as_x: f64, as_y: f64, bar_diameter: f64, rebar: &str) -> Self {
        self.as_x = as_x;
        self.as_y = as_y;
        self.bar_diameter = bar_diameter;
        self.rebar = rebar.to_string();
        self
    }

    pub fn with_cover(mut self, cover: f64) -> Self {
        self.cover = cover;
        self
    }

    pub fn with_load(mut self, category: LoadCategory, q: f64) -> Self {
        self.loads.insert(category, q);
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_column(mut self, size: f64, position: ColumnPosition, tributary_area: f64) -> Self {
        self.column = Some(SlabColumn {
            size,
            position,
            tributary_area,
        });
        self
    }

    /// Panels longer than the catalog aspect ratio span one way
    pub fn is_one_way(&self, catalog: &StandardsCatalog) -> StructResult<bool> {
        let limit = catalog.lookup(Standard::Tcvn5574, "slab", "one_way_ratio")?;
        Ok(self.ly / self.lx > limit)
    }

    /// Panel moments `(mx, my)` per metre width under area load `q`
    pub fn moments(&self, q: f64, catalog: &StandardsCatalog) -> StructResult<(f64, f64)> {
        if self.is_one_way(catalog)? {
            return Ok((q * self.lx * self.lx / 8.0, 0.0));
        }
        let (alpha_x, alpha_y) = catalog.slab_coefficients(self.ly / self.lx)?;
        let base = q * self.lx * self.ly;
        Ok((alpha_x * base, alpha_y * base))
    }
}

impl CapacityCheck for RcSlabSpec {
    fn check(&self, demand: &Demand, catalog: &StandardsCatalog) -> StructResult<Vec<ModeResult>> {
        if self.lx <= 0.0 || self.thickness <= self.cover + self.bar_diameter {
            return Err(StructError::config(format!(
                "slab {}x{} with thickness {} has no effective depth",
                self.lx, self.ly, self.thickness
            )));
        }
        let grade = catalog.concrete_grade(&self.concrete)?;
        let rebar = catalog.rebar_grade(&self.rebar)?;

        let q: f64 = self
            .loads
            .iter()
            .filter_map(|(&category, &load)| {
                demand.combination.category_factor(category).map(|f| f * load)
            })
            .sum();
        let (mx, my) = self.moments(q, catalog)?;

        // Long-span bars sit inside the short-span layer
        let strip = |h0: f64| RcStrip {
            b: 1.0,
            h: self.thickness,
            h0,
            rb: grade.rb,
            eb: grade.eb,
        };
        let strip_x = strip(self.thickness - self.cover);
        let strip_y = strip(self.thickness - self.cover - self.bar_diameter);

        let governing = |a: ModeResult, b: Option<ModeResult>| match b {
            Some(b) if b.utilization > a.utilization => b,
            _ => a,
        };

        if demand.is_uls() {
            let x = flexure(&strip_x, mx, self.as_x, rebar, catalog)?.with("m", mx);
            let y = if my > 0.0 {
                Some(flexure(&strip_y, my, self.as_y, rebar, catalog)?.with("m", my))
            } else {
                None
            };
            let mut results = vec![governing(x, y).with("q", q)];
            if let Some(column) = &self.column {
                // Load inside the critical perimeter goes straight into the column
                let side = column.size + strip_y.h0;
                let enclosed = (column.position.sides() / 4.0 * side * side).min(column.tributary_area);
                let force = q * (column.tributary_area - enclosed);
                results.push(punching(force, column.position.sides() * side, strip_y.h0, grade.rbt, catalog)?);
            }
            return Ok(results);
        }

        let crack_x = crack_width(&strip_x, mx, self.as_x, self.bar_diameter, rebar, self.environment, catalog)?;
        let crack_y = if my > 0.0 {
            Some(crack_width(&strip_y, my, self.as_y, self.bar_diameter, rebar, self.environment, catalog)?)
        } else {
            None
        };

        let key = if self.is_one_way(catalog)? { "slab_one_way" } else { "slab_two_way" };
        let allowable = catalog.lookup(Standard::Tcvn5574, "span_depth_ratio", key)?;
        let slenderness = self.lx / strip_x.h0;
        let span_depth = ModeResult::new(FailureMode::SpanDepth, slenderness / allowable)
            .with("span_depth", slenderness)
            .with("allowable", allowable);

        Ok(vec![governing(crack_x, crack_y), span_depth])
    }
}
