/*
NucleoFiber, atomistic chromatin fiber geometry and DNA damage scoring.
    Copyright (C) 2021  Nicolas Levy <nicolaspierrelevy@gmail.com> and Nicolas Schabanel <nicolas.schabanel@ens-lyon.fr>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
//! Geometric parameters of the chromatin fiber and the named-parameter source used to
//! configure them.
//!
//! All lengths are in nanometers, multiplied by [`GeometryParameters::scale_factor`].

use serde_json::{Map, Value};
use std::f64::consts::TAU;
use ultraviolet::DVec3;

/// Errors raised while reading or validating parameters.
#[derive(Debug, thiserror::Error)]
pub enum ParameterError {
    #[error("parameter {0} has not been initialized and its value is still negative")]
    Uninitialized(&'static str),
    #[error("parameter {name} should be of type {expected}")]
    WrongType { name: String, expected: &'static str },
    #[error("parameter {name} is out of range: {reason}")]
    OutOfRange { name: String, reason: String },
}

/// A source of named parameters.
///
/// Absent parameters are never an error: callers fall back to documented defaults. A parameter
/// that is present with the wrong type is reported as a [`ParameterError::WrongType`].
pub trait ParameterSource {
    fn exists(&self, name: &str) -> bool;
    fn integer(&self, name: &str) -> Result<Option<i64>, ParameterError>;
    fn double(&self, name: &str) -> Result<Option<f64>, ParameterError>;
    fn boolean(&self, name: &str) -> Result<Option<bool>, ParameterError>;
    fn double_vector(&self, name: &str) -> Result<Option<Vec<f64>>, ParameterError>;

    fn integer_or(&self, name: &str, default: i64) -> Result<i64, ParameterError> {
        Ok(self.integer(name)?.unwrap_or(default))
    }

    fn double_or(&self, name: &str, default: f64) -> Result<f64, ParameterError> {
        Ok(self.double(name)?.unwrap_or(default))
    }

    fn boolean_or(&self, name: &str, default: bool) -> Result<bool, ParameterError> {
        Ok(self.boolean(name)?.unwrap_or(default))
    }

    /// A non negative integer parameter, converted to `usize`.
    fn count_or(&self, name: &str, default: usize) -> Result<usize, ParameterError> {
        match self.integer(name)? {
            None => Ok(default),
            Some(n) if n >= 0 => Ok(n as usize),
            Some(n) => Err(ParameterError::OutOfRange {
                name: name.to_string(),
                reason: format!("{} is negative", n),
            }),
        }
    }
}

fn wrong_type(name: &str, expected: &'static str) -> ParameterError {
    ParameterError::WrongType {
        name: name.to_string(),
        expected,
    }
}

impl ParameterSource for Map<String, Value> {
    fn exists(&self, name: &str) -> bool {
        self.contains_key(name)
    }

    fn integer(&self, name: &str) -> Result<Option<i64>, ParameterError> {
        match self.get(name) {
            None => Ok(None),
            Some(v) => v.as_i64().map(Some).ok_or_else(|| wrong_type(name, "integer")),
        }
    }

    fn double(&self, name: &str) -> Result<Option<f64>, ParameterError> {
        match self.get(name) {
            None => Ok(None),
            Some(v) => v.as_f64().map(Some).ok_or_else(|| wrong_type(name, "double")),
        }
    }

    fn boolean(&self, name: &str) -> Result<Option<bool>, ParameterError> {
        match self.get(name) {
            None => Ok(None),
            Some(v) => v.as_bool().map(Some).ok_or_else(|| wrong_type(name, "boolean")),
        }
    }

    fn double_vector(&self, name: &str) -> Result<Option<Vec<f64>>, ParameterError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Array(values)) => values
                .iter()
                .map(|v| v.as_f64().ok_or_else(|| wrong_type(name, "vector of double")))
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(_) => Err(wrong_type(name, "vector of double")),
        }
    }
}

/// Radii of the three kinds of residue spheres.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResidueRadii {
    pub phosphate: f64,
    pub deoxyribose: f64,
    pub base: f64,
    /// Ratio between the radius of a hydration shell and the radius of its residue.
    pub hydration_ratio: f64,
}

impl ResidueRadii {
    pub const DEFAULT: ResidueRadii = ResidueRadii {
        phosphate: 0.270,
        deoxyribose: 0.290,
        base: 0.300,
        hydration_ratio: 1.15,
    };
}

/// Offsets of the six residues of an idealized base pair, relative to the base pair center.
///
/// Coming from the barycenters of a PDB structure.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CanonicalResidues {
    pub phosphate1: [f64; 3],
    pub deoxyribose1: [f64; 3],
    pub base1: [f64; 3],
    pub base2: [f64; 3],
    pub deoxyribose2: [f64; 3],
    pub phosphate2: [f64; 3],
}

impl CanonicalResidues {
    pub const DEFAULT: CanonicalResidues = CanonicalResidues {
        phosphate1: [0.863185, -0.209463, -0.211519],
        deoxyribose1: [0.687466, 0.136434, -0.103885],
        base1: [0.334746, -0.159769, -0.0371322],
        base2: [-0.270308, -0.0308147, 0.0272545],
        deoxyribose2: [-0.712485, 0.235113, 0.114808],
        phosphate2: [-0.944741, -0.0830581, 0.218929],
    };

    /// The six offsets, in the order of `ResidueSlot::ALL`.
    pub fn offsets(&self) -> [DVec3; 6] {
        [
            self.phosphate1,
            self.deoxyribose1,
            self.base1,
            self.base2,
            self.deoxyribose2,
            self.phosphate2,
        ]
        .map(|[x, y, z]| DVec3::new(x, y, z))
    }
}

/// Helical arrangement of the nucleosomes in the fiber.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FiberHelix {
    /// Number of basis nucleosomes whose base pairs are computed. The others are obtained by
    /// rotating and translating the middle one.
    pub basis_nucleosomes: usize,
    pub histone_radius: f64,
    /// Half of the height of the histone cylinder.
    pub histone_half_height: f64,
    /// Shift along z of the histone, the super helix is not centered on zero.
    pub histone_z_offset: f64,
    /// Height of one complete turn of the fiber helix.
    pub pitch: f64,
    pub central_radius: f64,
    pub nucleosomes_per_turn: usize,
}

impl FiberHelix {
    pub const DEFAULT: FiberHelix = FiberHelix {
        basis_nucleosomes: 3,
        histone_radius: 2.4,
        histone_half_height: 2.860,
        histone_z_offset: 2.370,
        pitch: 8.5,
        central_radius: 10.460,
        nucleosomes_per_turn: 6,
    };

    /// Angle between two consecutive nucleosomes around the fiber axis.
    pub fn delta_angle(&self) -> f64 {
        TAU / self.nucleosomes_per_turn as f64
    }

    /// Shift along the fiber axis between two consecutive nucleosomes.
    pub fn z_shift(&self) -> f64 {
        self.pitch / self.nucleosomes_per_turn as f64
    }
}

/// Helical arrangement of the base pairs wound around a histone.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NucleosomeHelix {
    pub wound_base_pairs: usize,
    /// Rotation of the residues around the local nucleotide axis from one base pair to the
    /// next, in radians.
    pub base_pair_angle: f64,
    /// Rise of the path around the histone for one complete turn.
    pub pitch: f64,
    pub central_radius: f64,
    /// Number of base pairs in one turn around the histone.
    pub base_pairs_per_turn: usize,
}

impl NucleosomeHelix {
    pub const DEFAULT: NucleosomeHelix = NucleosomeHelix {
        wound_base_pairs: 154,
        base_pair_angle: 36. * std::f64::consts::PI / 180.,
        pitch: 2.370,
        central_radius: 4.045,
        base_pairs_per_turn: 77,
    };

    /// Angle between two consecutive base pairs around the histone.
    pub fn delta_angle(&self) -> f64 {
        TAU / self.base_pairs_per_turn as f64
    }
}

/// Geometry of the linker DNA joining two consecutive nucleosomes.
///
/// ```text
/// nucleosome ---(straight part)-----\(
///                                    \curved part
///                                     \)
///                                      \----(straight part)---- nucleosome
/// ```
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LinkerHelix {
    pub base_pairs: usize,
    pub central_radius: f64,
    /// Height per base pair in the curved part.
    pub height_per_base_pair: f64,
    pub base_pairs_per_turn: usize,
    /// Total angle covered by the linker arc, in radians.
    pub arc_angle: f64,
    /// Height per base pair in the two straight parts.
    pub straight_rise: f64,
    /// Index of the first base pair of the curved part.
    pub curve_start: usize,
    /// Index of the first base pair of the second straight part.
    pub curve_end: usize,
}

impl LinkerHelix {
    pub const DEFAULT: LinkerHelix = LinkerHelix {
        base_pairs: 46,
        central_radius: 14.505,
        height_per_base_pair: -3.555 / 15.,
        base_pairs_per_turn: 46,
        arc_angle: std::f64::consts::PI / 3.,
        straight_rise: 0.01,
        curve_start: 15,
        curve_end: 30,
    };

    pub fn delta_angle(&self) -> f64 {
        self.arc_angle / self.base_pairs_per_turn as f64
    }

    /// Height of the `i`-th linker base pair relative to the last wound base pair.
    ///
    /// The first straight part rises to leave the histone, the curved part follows the linker
    /// pitch and the second straight part goes down to join the next histone.
    pub fn height(&self, i: usize) -> f64 {
        if i < self.curve_start {
            i as f64 * self.straight_rise
        } else if i < self.curve_end {
            (i - self.curve_start) as f64 * self.height_per_base_pair
        } else {
            (i - self.curve_end) as f64 * -self.straight_rise
                + (self.curve_end - self.curve_start) as f64 * self.height_per_base_pair
        }
    }
}

/// All the parameters needed to compute the basis nucleosomes.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeometryParameters {
    /// Multiplies every length. Should be 1 for most purposes.
    pub scale_factor: f64,
    pub radii: ResidueRadii,
    pub canonical: CanonicalResidues,
    pub fiber: FiberHelix,
    pub nucleosome: NucleosomeHelix,
    pub linker: LinkerHelix,
}

impl GeometryParameters {
    pub const DEFAULT: GeometryParameters = GeometryParameters {
        scale_factor: 1.,
        radii: ResidueRadii::DEFAULT,
        canonical: CanonicalResidues::DEFAULT,
        fiber: FiberHelix::DEFAULT,
        nucleosome: NucleosomeHelix::DEFAULT,
        linker: LinkerHelix::DEFAULT,
    };

    pub fn from_source<S: ParameterSource + ?Sized>(source: &S) -> Result<Self, ParameterError> {
        let scale_factor = source.double_or("GeometryScaleFactor", 1.)?;
        let ret = Self::DEFAULT.scaled(scale_factor);
        ret.validate()?;
        Ok(ret)
    }

    /// Return a copy of `self` with all lengths multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        let mut ret = *self;
        ret.scale_factor = self.scale_factor * factor;
        ret.radii.phosphate *= factor;
        ret.radii.deoxyribose *= factor;
        ret.radii.base *= factor;
        for offset in [
            &mut ret.canonical.phosphate1,
            &mut ret.canonical.deoxyribose1,
            &mut ret.canonical.base1,
            &mut ret.canonical.base2,
            &mut ret.canonical.deoxyribose2,
            &mut ret.canonical.phosphate2,
        ] {
            for x in offset.iter_mut() {
                *x *= factor;
            }
        }
        ret.fiber.histone_radius *= factor;
        ret.fiber.histone_half_height *= factor;
        ret.fiber.histone_z_offset *= factor;
        ret.fiber.pitch *= factor;
        ret.fiber.central_radius *= factor;
        ret.nucleosome.pitch *= factor;
        ret.nucleosome.central_radius *= factor;
        ret.linker.central_radius *= factor;
        ret.linker.height_per_base_pair *= factor;
        ret.linker.straight_rise *= factor;
        ret
    }

    /// Check that every parameter needed to build the geometry has been set.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let positive = [
            ("scale_factor", self.scale_factor),
            ("phosphate_radius", self.radii.phosphate),
            ("deoxyribose_radius", self.radii.deoxyribose),
            ("base_radius", self.radii.base),
            ("hydration_ratio", self.radii.hydration_ratio),
            ("histone_radius", self.fiber.histone_radius),
            ("histone_half_height", self.fiber.histone_half_height),
            ("fiber_pitch", self.fiber.pitch),
            ("fiber_central_radius", self.fiber.central_radius),
            ("nucleosome_central_radius", self.nucleosome.central_radius),
            ("linker_central_radius", self.linker.central_radius),
        ];
        for (name, value) in positive {
            if !(value > 0.) {
                return Err(ParameterError::Uninitialized(name));
            }
        }
        let counts = [
            ("basis_nucleosomes", self.fiber.basis_nucleosomes),
            ("nucleosomes_per_turn", self.fiber.nucleosomes_per_turn),
            ("wound_base_pairs", self.nucleosome.wound_base_pairs),
            ("base_pairs_per_turn", self.nucleosome.base_pairs_per_turn),
            ("linker_base_pairs_per_turn", self.linker.base_pairs_per_turn),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(ParameterError::Uninitialized(name));
            }
        }
        if self.fiber.basis_nucleosomes < 2 {
            return Err(ParameterError::OutOfRange {
                name: String::from("basis_nucleosomes"),
                reason: String::from("the fiber is built from the middle basis nucleosome"),
            });
        }
        Ok(())
    }

    /// Number of base pairs attached to one nucleosome, wound and linker.
    pub fn base_pairs_per_nucleosome(&self) -> usize {
        self.nucleosome.wound_base_pairs + self.linker.base_pairs
    }

    pub fn formated_string(&self) -> String {
        use std::fmt::Write;
        let mut ret = String::new();
        let p = self;
        writeln!(&mut ret, "  Scale factor: {}", p.scale_factor).unwrap_or_default();
        writeln!(&mut ret, "Elementary informations").unwrap_or_default();
        writeln!(&mut ret, "  Deoxyribose radius: {:.3} nm", p.radii.deoxyribose)
            .unwrap_or_default();
        writeln!(&mut ret, "  Phosphate radius: {:.3} nm", p.radii.phosphate).unwrap_or_default();
        writeln!(&mut ret, "  Base radius: {:.3} nm", p.radii.base).unwrap_or_default();
        writeln!(&mut ret, "Fiber parameters").unwrap_or_default();
        writeln!(&mut ret, "  Histone radius: {:.3} nm", p.fiber.histone_radius)
            .unwrap_or_default();
        writeln!(
            &mut ret,
            "  Histone height: {:.3} nm",
            p.fiber.histone_half_height
        )
        .unwrap_or_default();
        writeln!(&mut ret, "  Fiber pitch: {:.3} nm", p.fiber.pitch).unwrap_or_default();
        writeln!(
            &mut ret,
            "  Fiber central radius: {:.3} nm",
            p.fiber.central_radius
        )
        .unwrap_or_default();
        writeln!(
            &mut ret,
            "  #Nucleosomes per turn: {}",
            p.fiber.nucleosomes_per_turn
        )
        .unwrap_or_default();
        writeln!(
            &mut ret,
            "  Fiber delta angle: {:.1}°",
            p.fiber.delta_angle().to_degrees()
        )
        .unwrap_or_default();
        writeln!(&mut ret, "DNA around histone parameters").unwrap_or_default();
        writeln!(
            &mut ret,
            "  #Base pairs around histone: {}",
            p.nucleosome.wound_base_pairs
        )
        .unwrap_or_default();
        writeln!(
            &mut ret,
            "  Base pair angle: {:.1}°",
            p.nucleosome.base_pair_angle.to_degrees()
        )
        .unwrap_or_default();
        writeln!(&mut ret, "  Second helix pitch: {:.3} nm", p.nucleosome.pitch)
            .unwrap_or_default();
        writeln!(
            &mut ret,
            "  Central radius: {:.3} nm",
            p.nucleosome.central_radius
        )
        .unwrap_or_default();
        writeln!(
            &mut ret,
            "  #Base pairs per turn: {}",
            p.nucleosome.base_pairs_per_turn
        )
        .unwrap_or_default();
        writeln!(&mut ret, "DNA linker parameters").unwrap_or_default();
        writeln!(&mut ret, "  #Linker base pairs: {}", p.linker.base_pairs).unwrap_or_default();
        writeln!(
            &mut ret,
            "  Linker central radius: {:.3} nm",
            p.linker.central_radius
        )
        .unwrap_or_default();
        writeln!(
            &mut ret,
            "  Linker height per bp: {:.4} nm",
            p.linker.height_per_base_pair
        )
        .unwrap_or_default();
        writeln!(
            &mut ret,
            "  Linker delta angle: {:.3}°",
            p.linker.delta_angle().to_degrees()
        )
        .unwrap_or_default();
        ret
    }
}

impl std::default::Default for GeometryParameters {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(json: &str) -> Map<String, Value> {
        serde_json::from_str(json).expect("invalid test json")
    }

    #[test]
    fn absent_parameters_use_defaults() {
        let src = source("{}");
        let p = GeometryParameters::from_source(&src).unwrap();
        assert_eq!(p, GeometryParameters::DEFAULT);
        assert_eq!(src.count_or("DnaNumBpPerNucleosome", 200).unwrap(), 200);
    }

    #[test]
    fn ill_typed_parameter_is_reported() {
        let src = source(r#"{"CutVolumes": 3, "FiberDimensions": [1.0, "a"]}"#);
        assert!(matches!(
            src.boolean("CutVolumes"),
            Err(ParameterError::WrongType { .. })
        ));
        assert!(src.double_vector("FiberDimensions").is_err());
        assert!(src.exists("CutVolumes"));
        assert!(!src.exists("QuitIfOverlapDetected"));
    }

    #[test]
    fn negative_count_is_out_of_range() {
        let src = source(r#"{"DnaNumNucleosomePerFiber": -4}"#);
        assert!(src.count_or("DnaNumNucleosomePerFiber", 90).is_err());
    }

    #[test]
    fn negative_radius_is_uninitialized() {
        let mut p = GeometryParameters::DEFAULT;
        p.radii.base = -1.;
        assert!(matches!(
            p.validate(),
            Err(ParameterError::Uninitialized("base_radius"))
        ));
    }

    #[test]
    fn scaling_multiplies_lengths_only() {
        let p = GeometryParameters::DEFAULT.scaled(2.);
        assert_eq!(p.fiber.nucleosomes_per_turn, 6);
        assert!((p.fiber.pitch - 17.).abs() < 1e-12);
        assert!((p.radii.hydration_ratio - 1.15).abs() < 1e-12);
        assert!((p.canonical.base2[0] + 0.540616).abs() < 1e-12);
    }

    #[test]
    fn linker_height_schedule_is_continuous() {
        let l = LinkerHelix::DEFAULT;
        assert_eq!(l.height(0), 0.);
        assert!((l.height(14) - 0.14).abs() < 1e-12);
        assert_eq!(l.height(15), 0.);
        assert!((l.height(30) - 15. * l.height_per_base_pair).abs() < 1e-12);
        assert!((l.height(31) - l.height(30) + 0.01).abs() < 1e-12);
    }
}
