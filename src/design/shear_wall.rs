//! Reinforced concrete shear walls
//!
//! A wall is a rectangular member whose section depth is its plan length. Axial
//! load with bending uses the column P-M diagram; in-plane shear is checked as
//! an average stress on the gross section.

use serde::{Deserialize, Serialize};

use super::rc_beam::rectangle;
use super::verdict::ratio;
use super::{CapacityCheck, Demand, FailureMode, ModeResult, RcColumnSpec};
use crate::catalog::{Standard, StandardsCatalog};
use crate::error::StructResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShearWallSpec {
    /// Vertical bars, laid out as for a column
    pub bars: RcColumnSpec,
}

impl ShearWallSpec {
    pub fn new(bars: RcColumnSpec) -> Self {
        Self { bars }
    }
}

impl CapacityCheck for ShearWallSpec {
    fn check(&self, demand: &Demand, catalog: &StandardsCatalog) -> StructResult<Vec<ModeResult>> {
        if !demand.is_uls() {
            return Ok(Vec::new());
        }
        let mut results = self.bars.check(demand, catalog)?;

        let forces = demand.member_forces()?;
        let (thickness, length) = rectangle(demand)?;
        let (rb, _) = demand.concrete_strength()?;
        let factor = catalog.lookup(Standard::Tcvn5574, "wall", "shear_stress_factor")?;
        let stress = forces.v_major / (thickness * length);
        let allowable = factor * rb;
        results.push(
            ModeResult::new(FailureMode::Shear, ratio(stress, allowable))
                .with("tau", stress)
                .with("tau_allow", allowable),
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::test_support::{sls, uls};
    use crate::design::DemandForces;
    use crate::elements::Section;
    use crate::results::MemberResult;
    use approx::assert_relative_eq;

    fn wall_forces(axial: f64, shear: f64, height: f64) -> crate::results::DesignForces {
        // Cantilever wall: compression plus a lateral load at the top
        let mut end_forces = [0.0; 12];
        end_forces[0] = axial;
        end_forces[1] = shear;
        end_forces[5] = shear * height;
        end_forces[6] = -axial;
        end_forces[7] = -shear;
        MemberResult {
            end_forces,
            w_local: [0.0; 3],
            length: height,
            ei_major: 0.0,
            ei_minor: 0.0,
        }
        .design_forces(5)
    }

    #[test]
    fn test_wall_combines_pm_and_shear() {
        let cat = StandardsCatalog::tcvn().unwrap();
        let section = Section::rectangular(0.2, 3.0);
        let concrete = cat.concrete_material("B25").unwrap();
        let forces = wall_forces(1500.0, 400.0, 3.3);
        let combo = uls();
        let demand = Demand::new(DemandForces::Member(&forces), &combo)
            .with_section(&section)
            .with_material(&concrete);

        let wall = ShearWallSpec::new(RcColumnSpec::new(0.04, 2, 16, 2.01e-4, "CB400-V"));
        let results = wall.check(&demand, &cat).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].mode, FailureMode::AxialBending);
        assert!(results[0].utilization > 0.0 && results[0].utilization < 1.0);

        let shear = &results[1];
        assert_eq!(shear.mode, FailureMode::Shear);
        assert_relative_eq!(shear.utilization, (400.0 / 0.6) / (0.1 * 14500.0), epsilon = 1e-9);
    }

    #[test]
    fn test_wall_has_no_serviceability_modes() {
        let cat = StandardsCatalog::tcvn().unwrap();
        let section = Section::rectangular(0.2, 3.0);
        let concrete = cat.concrete_material("B25").unwrap();
        let forces = wall_forces(1000.0, 100.0, 3.3);
        let combo = sls();
        let demand = Demand::new(DemandForces::Member(&forces), &combo)
            .with_section(&section)
            .with_material(&concrete);
        let wall = ShearWallSpec::new(RcColumnSpec::new(0.04, 2, 16, 2.01e-4, "CB400-V"));
        assert!(wall.check(&demand, &cat).unwrap().is_empty());
    }
}
