// src/generator.rs

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Result, ScatterError};
use crate::geometry::{Domain, Point2};

pub const DEFAULT_ATTEMPTS_PER_POINT: u32 = 30;

// Background grid cells beyond this are treated as a misconfigured domain.
const MAX_GRID_CELLS: usize = 1 << 24;
// A cell is r/sqrt(2) wide, so anything closer than r is at most 2 cells away.
const NEIGHBOR_REACH: isize = 2;

/// Bridson-style Poisson disk sampling over a domain centered on the origin.
pub struct PoissonDiskSampler;

impl PoissonDiskSampler {
    pub fn generate(
        width: f32,
        height: f32,
        min_separation: f32,
        seed: u64,
        max_attempts_per_point: u32,
    ) -> Result<Vec<Point2>> {
        let domain = Domain::new(width, height, min_separation, seed)?;
        Self::generate_in(&domain, max_attempts_per_point)
    }

    pub fn generate_in(domain: &Domain, max_attempts_per_point: u32) -> Result<Vec<Point2>> {
        domain.validate()?;
        if max_attempts_per_point == 0 {
            return Err(ScatterError::InvalidDomain(
                "max_attempts_per_point must be at least 1".to_string(),
            ));
        }

        let (half_w, half_h) = domain.half_extents();
        let radius = domain.min_separation;
        let radius_sq = radius * radius;
        let cell = radius / std::f32::consts::SQRT_2;

        let too_fine = || {
            ScatterError::InvalidDomain(format!(
                "separation {radius} is too small for a {}x{} domain",
                domain.width, domain.height
            ))
        };
        // Compare in f32 first; the casts below saturate on huge spans.
        let (span_x, span_y) = ((domain.width / cell).floor(), (domain.height / cell).floor());
        if span_x >= MAX_GRID_CELLS as f32 || span_y >= MAX_GRID_CELLS as f32 {
            return Err(too_fine());
        }
        let cols = span_x as usize + 1;
        let rows = span_y as usize + 1;
        let cell_count = cols.checked_mul(rows).ok_or_else(too_fine)?;
        if cell_count > MAX_GRID_CELLS {
            return Err(too_fine());
        }

        let mut rng = ChaCha8Rng::seed_from_u64(domain.seed);
        let mut grid: Vec<Vec<usize>> = vec![Vec::new(); cell_count];
        let mut points: Vec<Point2> = Vec::new();
        let mut active: Vec<usize> = Vec::new();

        let cell_of = |p: &Point2| -> (usize, usize) {
            let cx = (((p.x + half_w) / cell) as usize).min(cols - 1);
            let cy = (((p.y + half_h) / cell) as usize).min(rows - 1);
            (cx, cy)
        };

        let first = Point2::new(
            rng.gen_range(-half_w..=half_w),
            rng.gen_range(-half_h..=half_h),
        );
        let (cx, cy) = cell_of(&first);
        grid[cy * cols + cx].push(0);
        points.push(first);
        active.push(0);

        while !active.is_empty() {
            let slot = rng.gen_range(0..active.len());
            let center = points[active[slot]];
            let mut accepted = false;

            for _ in 0..max_attempts_per_point {
                let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                let distance = rng.gen_range(radius..2.0 * radius);
                let candidate = Point2::new(
                    center.x + distance * angle.cos(),
                    center.y + distance * angle.sin(),
                );
                if !domain.contains(&candidate) {
                    continue;
                }

                let (cx, cy) = cell_of(&candidate);
                let mut clear = true;
                'neighbors: for dy in -NEIGHBOR_REACH..=NEIGHBOR_REACH {
                    let ny = cy as isize + dy;
                    if ny < 0 || ny >= rows as isize {
                        continue;
                    }
                    for dx in -NEIGHBOR_REACH..=NEIGHBOR_REACH {
                        let nx = cx as isize + dx;
                        if nx < 0 || nx >= cols as isize {
                            continue;
                        }
                        let bucket = &grid[ny as usize * cols + nx as usize];
                        if bucket
                            .iter()
                            .any(|&i| points[i].distance_squared(&candidate) < radius_sq)
                        {
                            clear = false;
                            break 'neighbors;
                        }
                    }
                }

                if clear {
                    let index = points.len();
                    grid[cy * cols + cx].push(index);
                    points.push(candidate);
                    active.push(index);
                    accepted = true;
                    break;
                }
            }

            if !accepted {
                active.swap_remove(slot);
            }
        }

        log::trace!(
            "poisson sampling seed={} produced {} points in {}x{} (r={})",
            domain.seed,
            points.len(),
            domain.width,
            domain.height,
            radius
        );
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::points_as_bytes;
    use proptest::prelude::*;

    fn assert_separated(points: &[Point2], min_separation: f32) {
        let min_sq = min_separation * min_separation;
        for (i, p) in points.iter().enumerate() {
            for q in &points[i + 1..] {
                assert!(
                    p.distance_squared(q) >= min_sq,
                    "{p:?} and {q:?} closer than {min_separation}"
                );
            }
        }
    }

    #[test]
    fn ten_by_ten_seed_42_is_reproducible() {
        let first = PoissonDiskSampler::generate(10.0, 10.0, 2.0, 42, DEFAULT_ATTEMPTS_PER_POINT).unwrap();
        let second = PoissonDiskSampler::generate(10.0, 10.0, 2.0, 42, DEFAULT_ATTEMPTS_PER_POINT).unwrap();

        assert_eq!(points_as_bytes(&first), points_as_bytes(&second));
        // Pinned layout; any change to how the stream is consumed shows up here.
        assert_eq!(first.len(), 20);
        assert_eq!(first[0], Point2::new(-2.759193, 1.8189616));
        assert_separated(&first, 2.0);
    }

    #[test]
    fn huge_domain_is_rejected_instead_of_overflowing() {
        for (w, h) in [(1.0e30, 10.0), (10.0, 1.0e30), (f32::MAX, f32::MAX)] {
            let result = PoissonDiskSampler::generate(w, h, 1.0, 42, DEFAULT_ATTEMPTS_PER_POINT);
            assert!(matches!(result, Err(ScatterError::InvalidDomain(_))), "{w}x{h}");
        }
    }

    #[test]
    fn different_seeds_give_different_layouts() {
        let a = PoissonDiskSampler::generate(10.0, 10.0, 2.0, 1, DEFAULT_ATTEMPTS_PER_POINT).unwrap();
        let b = PoissonDiskSampler::generate(10.0, 10.0, 2.0, 2, DEFAULT_ATTEMPTS_PER_POINT).unwrap();
        assert_ne!(points_as_bytes(&a), points_as_bytes(&b));
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        for (w, h, r) in [(0.0, 10.0, 1.0), (10.0, 0.0, 1.0), (10.0, 10.0, 0.0), (-1.0, 10.0, 1.0)] {
            let result = PoissonDiskSampler::generate(w, h, r, 7, DEFAULT_ATTEMPTS_PER_POINT);
            assert!(matches!(result, Err(ScatterError::InvalidDomain(_))));
        }
        assert!(matches!(
            PoissonDiskSampler::generate(10.0, 10.0, 1.0, 7, 0),
            Err(ScatterError::InvalidDomain(_))
        ));
    }

    #[test]
    fn separation_larger_than_domain_yields_single_point() {
        let points = PoissonDiskSampler::generate(1.0, 1.0, 5.0, 3, DEFAULT_ATTEMPTS_PER_POINT).unwrap();
        assert_eq!(points.len(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn points_stay_inside_and_apart(
            width in 1.0f32..30.0,
            height in 1.0f32..30.0,
            min_separation in 0.5f32..4.0,
            seed in any::<u64>(),
        ) {
            let domain = Domain::new(width, height, min_separation, seed).unwrap();
            let points = PoissonDiskSampler::generate_in(&domain, DEFAULT_ATTEMPTS_PER_POINT).unwrap();

            prop_assert!(!points.is_empty());
            for p in &points {
                prop_assert!(domain.contains(p));
            }
            let min_sq = min_separation * min_separation;
            for (i, p) in points.iter().enumerate() {
                for q in &points[i + 1..] {
                    prop_assert!(p.distance_squared(q) >= min_sq);
                }
            }
        }
    }
}
