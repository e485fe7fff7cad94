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
//! Primitive and boolean solids, and their point classification.

use super::{Transform, KERNEL_TOLERANCE};
use rand::Rng;
use rand_distr::{Distribution, UnitSphere};
use std::f64::consts::{PI, TAU};
use ultraviolet::DVec3;

/// Number of attempts made to find a point on the surface of a boolean solid.
const SURFACE_ATTEMPTS: usize = 1000;

/// Position of a point relative to a solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inside {
    Inside,
    Surface,
    Outside,
}

impl Inside {
    fn from_signed_distance(distance: f64) -> Self {
        if distance > KERNEL_TOLERANCE {
            Self::Outside
        } else if distance < -KERNEL_TOLERANCE {
            Self::Inside
        } else {
            Self::Surface
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Solid {
    Orb {
        radius: f64,
    },
    Cuboid {
        half: DVec3,
    },
    /// A full cylinder along the z axis.
    Tube {
        radius: f64,
        half_length: f64,
    },
    Subtraction {
        a: usize,
        b: usize,
        transform: Transform,
    },
    Union {
        a: usize,
        b: usize,
        transform: Transform,
    },
}

/// Axis aligned bounding box.
pub(super) type Extent = (DVec3, DVec3);

pub(super) fn transformed_extent(extent: Extent, transform: &Transform) -> Extent {
    let (min, max) = extent;
    let mut ret_min = DVec3::broadcast(f64::INFINITY);
    let mut ret_max = DVec3::broadcast(f64::NEG_INFINITY);
    for i in 0..8 {
        let corner = DVec3::new(
            if i & 1 == 0 { min.x } else { max.x },
            if i & 2 == 0 { min.y } else { max.y },
            if i & 4 == 0 { min.z } else { max.z },
        );
        let p = transform.apply(corner);
        ret_min = ret_min.min_by_component(p);
        ret_max = ret_max.max_by_component(p);
    }
    (ret_min, ret_max)
}

impl Solid {
    /// Classify `p`, expressed in the frame of the solid.
    pub fn inside(&self, p: DVec3, solids: &[Solid]) -> Inside {
        match self {
            Self::Orb { radius } => Inside::from_signed_distance(p.mag() - radius),
            Self::Cuboid { half } => {
                let d = (p.x.abs() - half.x)
                    .max(p.y.abs() - half.y)
                    .max(p.z.abs() - half.z);
                Inside::from_signed_distance(d)
            }
            Self::Tube {
                radius,
                half_length,
            } => {
                let rxy = (p.x * p.x + p.y * p.y).sqrt();
                Inside::from_signed_distance((rxy - radius).max(p.z.abs() - half_length))
            }
            Self::Subtraction { a, b, transform } => {
                let in_a = solids[*a].inside(p, solids);
                if in_a == Inside::Outside {
                    return Inside::Outside;
                }
                let in_b = solids[*b].inside(transform.inverse_apply(p), solids);
                match (in_a, in_b) {
                    (_, Inside::Inside) => Inside::Outside,
                    (Inside::Inside, Inside::Outside) => Inside::Inside,
                    _ => Inside::Surface,
                }
            }
            Self::Union { a, b, transform } => {
                let in_a = solids[*a].inside(p, solids);
                if in_a == Inside::Inside {
                    return Inside::Inside;
                }
                let in_b = solids[*b].inside(transform.inverse_apply(p), solids);
                match (in_a, in_b) {
                    (_, Inside::Inside) => Inside::Inside,
                    (Inside::Outside, Inside::Outside) => Inside::Outside,
                    _ => Inside::Surface,
                }
            }
        }
    }

    pub(super) fn extent(&self, solids: &[Solid]) -> Extent {
        match self {
            Self::Orb { radius } => (DVec3::broadcast(-radius), DVec3::broadcast(*radius)),
            Self::Cuboid { half } => (-*half, *half),
            Self::Tube {
                radius,
                half_length,
            } => (
                DVec3::new(-radius, -radius, -half_length),
                DVec3::new(*radius, *radius, *half_length),
            ),
            Self::Subtraction { a, .. } => solids[*a].extent(solids),
            Self::Union { a, b, transform } => {
                let (min_a, max_a) = solids[*a].extent(solids);
                let (min_b, max_b) = transformed_extent(solids[*b].extent(solids), transform);
                (
                    min_a.min_by_component(min_b),
                    max_a.max_by_component(max_b),
                )
            }
        }
    }

    /// Exact volume of primitives, Monte Carlo estimation for boolean solids.
    pub fn volume<R: Rng>(&self, solids: &[Solid], samples: usize, rng: &mut R) -> f64 {
        match self {
            Self::Orb { radius } => 4. / 3. * PI * radius.powi(3),
            Self::Cuboid { half } => 8. * half.x * half.y * half.z,
            Self::Tube {
                radius,
                half_length,
            } => PI * radius * radius * 2. * half_length,
            _ => {
                let (min, max) = self.extent(solids);
                let size = max - min;
                let hits = (0..samples)
                    .filter(|_| {
                        let p = DVec3::new(
                            min.x + rng.gen::<f64>() * size.x,
                            min.y + rng.gen::<f64>() * size.y,
                            min.z + rng.gen::<f64>() * size.z,
                        );
                        self.inside(p, solids) != Inside::Outside
                    })
                    .count();
                size.x * size.y * size.z * hits as f64 / samples.max(1) as f64
            }
        }
    }

    /// A random point on the surface of the solid, in the solid frame.
    pub fn point_on_surface<R: Rng>(&self, solids: &[Solid], rng: &mut R) -> Option<DVec3> {
        match self {
            Self::Orb { radius } => {
                let [x, y, z]: [f64; 3] = UnitSphere.sample(rng);
                Some(DVec3::new(x, y, z) * *radius)
            }
            Self::Cuboid { half } => {
                let areas = [half.y * half.z, half.x * half.z, half.x * half.y];
                let total: f64 = areas.iter().sum();
                let mut pick = rng.gen::<f64>() * total;
                let mut axis = 2;
                for (i, a) in areas.iter().enumerate() {
                    if pick < *a {
                        axis = i;
                        break;
                    }
                    pick -= a;
                }
                let mut p = DVec3::new(
                    (2. * rng.gen::<f64>() - 1.) * half.x,
                    (2. * rng.gen::<f64>() - 1.) * half.y,
                    (2. * rng.gen::<f64>() - 1.) * half.z,
                );
                let sign = if rng.gen::<bool>() { 1. } else { -1. };
                match axis {
                    0 => p.x = sign * half.x,
                    1 => p.y = sign * half.y,
                    _ => p.z = sign * half.z,
                }
                Some(p)
            }
            Self::Tube {
                radius,
                half_length,
            } => {
                let lateral = TAU * radius * 2. * half_length;
                let caps = 2. * PI * radius * radius;
                let angle = rng.gen::<f64>() * TAU;
                if rng.gen::<f64>() * (lateral + caps) < lateral {
                    Some(DVec3::new(
                        radius * angle.cos(),
                        radius * angle.sin(),
                        (2. * rng.gen::<f64>() - 1.) * half_length,
                    ))
                } else {
                    let r = radius * rng.gen::<f64>().sqrt();
                    let z = if rng.gen::<bool>() {
                        *half_length
                    } else {
                        -half_length
                    };
                    Some(DVec3::new(r * angle.cos(), r * angle.sin(), z))
                }
            }
            Self::Subtraction { a, b, transform } | Self::Union { a, b, transform } => {
                for _ in 0..SURFACE_ATTEMPTS {
                    let candidate = if rng.gen::<bool>() {
                        solids[*a].point_on_surface(solids, rng)
                    } else {
                        solids[*b]
                            .point_on_surface(solids, rng)
                            .map(|p| transform.apply(p))
                    };
                    if let Some(p) = candidate {
                        if self.inside(p, solids) == Inside::Surface {
                            return Some(p);
                        }
                    }
                }
                None
            }
        }
    }
}
