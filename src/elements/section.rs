//! Section properties for frame elements
//!
//! The strong (major) axis of every section is its local z-axis: bending in
//! the local x-y plane, which for a horizontal beam is the vertical plane,
//! uses `iz` and `wz`.

use serde::{Deserialize, Serialize};

/// Cross-section shape descriptor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SectionShape {
    /// Solid rectangle, `height` along local y
    Rectangular { width: f64, height: f64 },
    /// Doubly symmetric I/H profile
    IShape {
        height: f64,
        flange_width: f64,
        web_thickness: f64,
        flange_thickness: f64,
    },
    /// Rectangular hollow section with uniform wall
    Box { height: f64, width: f64, thickness: f64 },
    /// Properties given directly
    Generic,
}

/// Cross-section properties for frame elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Cross-sectional area in m²
    pub a: f64,
    /// Moment of inertia about local z-axis (strong axis) in m⁴
    pub iz: f64,
    /// Moment of inertia about local y-axis (weak axis) in m⁴
    pub iy: f64,
    /// Torsional constant in m⁴
    pub j: f64,
    /// Elastic section modulus about the strong axis in m³
    pub wz: f64,
    /// Elastic section modulus about the weak axis in m³
    pub wy: f64,
    /// Overall depth along local y in m
    pub depth: f64,
    /// Overall width along local z in m
    pub width: f64,
    pub shape: SectionShape,
}

impl Section {
    /// Create a section from raw properties
    pub fn new(a: f64, iz: f64, iy: f64, j: f64) -> Self {
        Self {
            a,
            iz,
            iy,
            j,
            wz: 0.0,
            wy: 0.0,
            depth: 0.0,
            width: 0.0,
            shape: SectionShape::Generic,
        }
    }

    /// Set elastic section moduli (strong, weak)
    pub fn with_moduli(mut self, wz: f64, wy: f64) -> Self {
        self.wz = wz;
        self.wy = wy;
        self
    }

    /// Create a solid rectangular section, `height` along local y
    pub fn rectangular(width: f64, height: f64) -> Self {
        let a = width * height;
        let iz = width * height.powi(3) / 12.0;
        let iy = height * width.powi(3) / 12.0;

        // Torsional constant for rectangle (approximate)
        let (long, short) = if width > height { (width, height) } else { (height, width) };
        let j = long * short.powi(3) / 3.0 * (1.0 - 0.63 * short / long);

        Self {
            a,
            iz,
            iy,
            j,
            wz: width * height.powi(2) / 6.0,
            wy: height * width.powi(2) / 6.0,
            depth: height,
            width,
            shape: SectionShape::Rectangular { width, height },
        }
    }

    /// Create a doubly symmetric I/H section
    ///
    /// # Arguments
    /// * `height` - Total depth of section
    /// * `flange_width` - Width of flange
    /// * `web_thickness` - Thickness of web
    /// * `flange_thickness` - Thickness of flange
    pub fn i_shape(height: f64, flange_width: f64, web_thickness: f64, flange_thickness: f64) -> Self {
        let bf = flange_width;
        let tf = flange_thickness;
        let tw = web_thickness;
        let h = height;
        let hw = h - 2.0 * tf;

        let a = 2.0 * bf * tf + hw * tw;
        let iz = (bf * h.powi(3) - (bf - tw) * hw.powi(3)) / 12.0;
        let iy = (2.0 * tf * bf.powi(3) + hw * tw.powi(3)) / 12.0;
        let j = (2.0 * bf * tf.powi(3) + hw * tw.powi(3)) / 3.0;

        Self {
            a,
            iz,
            iy,
            j,
            wz: iz / (h / 2.0),
            wy: iy / (bf / 2.0),
            depth: h,
            width: bf,
            shape: SectionShape::IShape {
                height,
                flange_width,
                web_thickness,
                flange_thickness,
            },
        }
    }

    /// Create a rectangular hollow section
    pub fn box_section(height: f64, width: f64, thickness: f64) -> Self {
        let t = thickness;
        let b = width;
        let h = height;
        let bi = b - 2.0 * t;
        let hi = h - 2.0 * t;

        let a = b * h - bi * hi;
        let iz = (b * h.powi(3) - bi * hi.powi(3)) / 12.0;
        let iy = (h * b.powi(3) - hi * bi.powi(3)) / 12.0;

        // Torsional constant for closed thin-walled section
        let am = (b - t) * (h - t);
        let s = 2.0 * (b + h) - 4.0 * t;
        let j = 4.0 * am.powi(2) * t / s;

        Self {
            a,
            iz,
            iy,
            j,
            wz: iz / (h / 2.0),
            wy: iy / (b / 2.0),
            depth: h,
            width: b,
            shape: SectionShape::Box { height, width, thickness },
        }
    }

    /// Area resisting shear along local y (web area for steel profiles)
    pub fn shear_area_major(&self) -> f64 {
        match self.shape {
            SectionShape::IShape {
                height,
                web_thickness,
                flange_thickness,
                ..
            } => (height - 2.0 * flange_thickness) * web_thickness,
            SectionShape::Box { height, thickness, .. } => 2.0 * (height - 2.0 * thickness) * thickness,
            SectionShape::Rectangular { .. } => self.a * 5.0 / 6.0,
            SectionShape::Generic => self.a,
        }
    }

    /// Area resisting shear along local z
    pub fn shear_area_minor(&self) -> f64 {
        match self.shape {
            SectionShape::IShape {
                flange_width,
                flange_thickness,
                ..
            } => 2.0 * flange_width * flange_thickness,
            SectionShape::Box { width, thickness, .. } => 2.0 * (width - 2.0 * thickness) * thickness,
            SectionShape::Rectangular { .. } => self.a * 5.0 / 6.0,
            SectionShape::Generic => self.a,
        }
    }

    /// Radius of gyration about the strong axis
    pub fn r_major(&self) -> f64 {
        (self.iz / self.a).sqrt()
    }

    /// Radius of gyration about the weak axis
    pub fn r_minor(&self) -> f64 {
        (self.iy / self.a).sqrt()
    }

    /// Section with local axes swapped (weak axis becomes strong)
    pub fn rotated(&self) -> Self {
        let shape = match self.shape {
            SectionShape::Rectangular { width, height } => SectionShape::Rectangular {
                width: height,
                height: width,
            },
            SectionShape::Box { height, width, thickness } => SectionShape::Box {
                height: width,
                width: height,
                thickness,
            },
            _ => SectionShape::Generic,
        };
        Self {
            a: self.a,
            iz: self.iy,
            iy: self.iz,
            j: self.j,
            wz: self.wy,
            wy: self.wz,
            depth: self.width,
            width: self.depth,
            shape,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rectangular_section() {
        let section = Section::rectangular(0.3, 0.5);
        assert_relative_eq!(section.a, 0.15, epsilon = 1e-12);
        assert_relative_eq!(section.iz, 0.3 * 0.5_f64.powi(3) / 12.0, epsilon = 1e-12);
        assert_relative_eq!(section.wz, 0.3 * 0.25 / 6.0, epsilon = 1e-12);
        assert!(section.iz > section.iy);
    }

    #[test]
    fn test_i_shape_properties() {
        // I 300x150x6.5x9
        let s = Section::i_shape(0.300, 0.150, 0.0065, 0.009);
        assert_relative_eq!(s.a, 2.0 * 0.150 * 0.009 + 0.282 * 0.0065, epsilon = 1e-12);
        assert_relative_eq!(s.wz, s.iz / 0.150, epsilon = 1e-12);
        assert_relative_eq!(s.shear_area_major(), 0.282 * 0.0065, epsilon = 1e-12);
        assert!(s.r_major() > s.r_minor());
    }

    #[test]
    fn test_rotated_swaps_axes() {
        let s = Section::rectangular(0.3, 0.5);
        let r = s.rotated();
        assert_relative_eq!(r.iz, s.iy, epsilon = 1e-15);
        assert_relative_eq!(r.depth, 0.3, epsilon = 1e-15);
        assert_eq!(r.shape, SectionShape::Rectangular { width: 0.5, height: 0.3 });
    }
}
