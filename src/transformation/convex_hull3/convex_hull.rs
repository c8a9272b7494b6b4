use super::facet::{furthest_seeing_facet, Facet};
use super::validation::check_facet_links;
use super::ConvexHullError;
use crate::math::{Point, Real};
use crate::shape::Triangle;
use crate::transformation::convex_hull_utils::{normalize, support_point, support_point_id};
use crate::utils;

/// Computes the convex hull of a set of 3d points.
///
/// The returned triangles are oriented counter-clockwise when seen from the outside of the
/// hull. The output only depends on the order of the input points, so identical inputs
/// always give identical hulls.
pub fn try_convex_hull(
    points: &[Point<Real>],
) -> Result<(Vec<Point<Real>>, Vec<[u32; 3]>), ConvexHullError> {
    if points.len() < 4 {
        return Err(ConvexHullError::IncompleteInput);
    }

    let mut hull = QuickHull::new(points.to_vec())?;
    hull.run()?;

    let mut indices = hull.into_indices();
    let mut vertices = points.to_vec();
    utils::remove_unused_points(&mut vertices, &mut indices);

    if vertices.len() < 4 || indices.len() < 4 {
        return Err(ConvexHullError::InternalError("empty output mesh"));
    }

    Ok((vertices, indices))
}

/// Incremental construction of a convex hull, one point at a time.
struct QuickHull {
    /// The input points, centered and rescaled.
    points: Vec<Point<Real>>,
    facets: Vec<Facet>,
    /// Points that were above no facet when they were last assigned.
    undecidable: Vec<usize>,
    /// The horizon of the point being added, as (facet kept on the hull, edge) pairs.
    horizon: Vec<(usize, usize)>,
    /// The facets removed by the point being added.
    removed: Vec<usize>,
}

impl QuickHull {
    /// Builds the two initial facets and assigns every point to one of them.
    ///
    /// Fails with `MissingSupportPoint` if the points do not span the three dimensions.
    fn new(mut points: Vec<Point<Real>>) -> Result<Self, ConvexHullError> {
        normalize(&mut points);

        let eigen = utils::cov(&points).symmetric_eigen();
        let mut axes = [0, 1, 2].map(|i| {
            (
                eigen.eigenvectors.column(i).into_owned(),
                eigen.eigenvalues[i],
            )
        });
        axes.sort_by(|a, b| b.1.total_cmp(&a.1));

        let dimension = axes
            .iter()
            .take_while(|axis| !relative_eq!(axis.1, 0.0, epsilon = 1.0e-7))
            .count();

        if dimension < 3 {
            // A point, a segment, or a polygon: no volume.
            return Err(ConvexHullError::MissingSupportPoint);
        }

        let center = utils::center(&points);
        let max_eigenvalue = eigen.eigenvalues.amax();

        for pt in points.iter_mut() {
            *pt = Point::from((*pt - center) / max_eigenvalue);
        }

        // The first facet spans the principal axis, with the largest possible area.
        let p1 = support_point_id(&axes[0].0, &points).ok_or(ConvexHullError::MissingSupportPoint)?;
        let p2 =
            support_point_id(&-axes[0].0, &points).ok_or(ConvexHullError::MissingSupportPoint)?;

        let mut max_area = 0.0;
        let mut p3 = None;

        for (i, pt) in points.iter().enumerate() {
            let area = Triangle::new(points[p1], points[p2], *pt).area();

            if area > max_area {
                max_area = area;
                p3 = Some(i);
            }
        }

        let p3 = p3.ok_or(ConvexHullError::MissingSupportPoint)?;

        let mut front = Facet::new([p1, p2, p3], &points);
        let mut back = Facet::new([p2, p1, p3], &points);
        front.link([1, 1, 1], [0, 2, 1]);
        back.link([0, 0, 0], [0, 2, 1]);

        let mut hull = QuickHull {
            points,
            facets: vec![front, back],
            undecidable: Vec::new(),
            horizon: Vec::new(),
            removed: Vec::new(),
        };

        let corners = [p1, p2, p3].map(|i| hull.points[i]);

        for point in 0..hull.points.len() {
            if corners.contains(&hull.points[point]) {
                continue;
            }

            match furthest_seeing_facet(&hull.facets, point, &hull.points) {
                Some(i) => hull.facets[i].outside_points.push(point),
                None => hull.undecidable.push(point),
            }
        }

        check_facet_links(0, &hull.facets)?;
        check_facet_links(1, &hull.facets)?;

        Ok(hull)
    }

    fn run(&mut self) -> Result<(), ConvexHullError> {
        let mut i = 0;

        while i != self.facets.len() {
            self.horizon.clear();
            let facet = &self.facets[i];

            if facet.valid && !facet.degenerate {
                let apex = support_point(
                    &facet.normal,
                    &self.points,
                    facet.outside_points.iter().copied(),
                );

                if let Some((_, point)) = apex {
                    if !self.add_point(i, point)? {
                        break;
                    }
                }
            }

            i += 1;
        }

        Ok(())
    }

    /// Replaces the facets visible from `point`, starting with `facet`, by a fan around it.
    ///
    /// Returns `false` if no horizon could be found, in which case the construction stops.
    fn add_point(&mut self, facet: usize, point: usize) -> Result<bool, ConvexHullError> {
        self.facets[facet].valid = false;
        self.removed.clear();
        self.removed.push(facet);

        for edge in 0..3 {
            let neighbor = self.facets[facet].neighbors[edge];
            let neighbor_edge = self.facets[facet].neighbor_edges[edge];
            self.compute_horizon(neighbor, neighbor_edge, point);
        }

        // Float rounding can make the horizon self-intersecting, or split it into
        // nested loops.
        self.fix_horizon_topology()?;

        if self.horizon.is_empty() {
            // The point seems to see every facet.
            let unfinished = self.facets[facet + 1..]
                .iter()
                .any(|f| f.valid && !f.degenerate);

            if unfinished {
                return Err(ConvexHullError::InternalError(
                    "exiting an unfinished work",
                ));
            }

            self.facets[facet].valid = true;
            return Ok(false);
        }

        self.attach_facets(point)?;
        Ok(true)
    }

    fn compute_horizon(&mut self, facet: usize, edge: usize, point: usize) {
        if !self.facets[facet].valid {
            return;
        }

        if !self.facets[facet].visible_from(point, &self.points) {
            self.horizon.push((facet, edge));
            return;
        }

        self.facets[facet].valid = false;
        self.removed.push(facet);

        for k in 1..3 {
            let next = (edge + k) % 3;
            let neighbor = self.facets[facet].neighbors[next];
            let neighbor_edge = self.facets[facet].neighbor_edges[next];
            self.compute_horizon(neighbor, neighbor_edge, point);
        }
    }

    /// Keeps a single simple loop of the horizon, removing the facets of the others.
    fn fix_horizon_topology(&mut self) -> Result<(), ConvexHullError> {
        let mut uses = vec![0u32; self.points.len()];
        let mut needs_fixing = false;

        // The horizon is walked through edge ends.
        for &(facet, edge) in &self.horizon {
            let p = self.facets[facet].edge_end(edge);
            uses[p] += 1;
            needs_fixing |= uses[p] > 1;
        }

        if !needs_fixing {
            return Ok(());
        }

        // Start the walk at a support vertex used only once.
        let mut loop_start = 0;

        for &(facet, edge) in &self.horizon {
            let end = self.points[self.facets[facet].edge_end(edge)];
            let start = self.points[self.facets[facet].edge_start(edge)];
            let (nth, _) = support_point(
                &(start - end),
                &self.points,
                self.horizon
                    .iter()
                    .map(|(f, e)| self.facets[*f].edge_end(*e)),
            )
            .ok_or(ConvexHullError::MissingSupportPoint)?;

            let (f, e) = self.horizon[nth];

            if uses[self.facets[f].edge_end(e)] == 1 {
                loop_start = nth;
                break;
            }
        }

        let mut removing = None;
        let horizon = std::mem::take(&mut self.horizon);

        for k in 0..horizon.len() {
            let (facet, edge) = horizon[(loop_start + k) % horizon.len()];
            let p = self.facets[facet].edge_end(edge);

            match removing {
                Some(q) if q == p => removing = None,
                None if uses[p] > 1 => removing = Some(p),
                _ => {}
            }

            if removing.is_none() {
                self.horizon.push((facet, edge));
            } else if self.facets[facet].valid {
                self.facets[facet].valid = false;
                self.removed.push(facet);
            }
        }

        Ok(())
    }

    /// Closes the hole left by the removed facets with a fan of facets joining the horizon to
    /// `point`, and distributes the orphaned points to the new facets.
    fn attach_facets(&mut self, point: usize) -> Result<(), ConvexHullError> {
        let base = self.facets.len();
        let n = self.horizon.len();

        // The horizon is counter-clockwise, seen from `point`.
        let mut fan: Vec<Facet> = self
            .horizon
            .iter()
            .map(|&(f, e)| {
                let facet = &self.facets[f];
                Facet::new([point, facet.edge_end(e), facet.edge_start(e)], &self.points)
            })
            .collect();

        for (k, &(neighbor, edge)) in self.horizon.iter().enumerate() {
            let prev = base + (k + n - 1) % n;
            let next = base + (k + 1) % n;
            fan[k].link([prev, neighbor, next], [2, edge, 0]);

            if self.facets[self.facets[neighbor].neighbors[edge]].valid {
                return Err(ConvexHullError::InternalError(
                    "overwriting a valid facet link",
                ));
            }

            self.facets[neighbor].neighbors[edge] = base + k;
            self.facets[neighbor].neighbor_edges[edge] = 1;
        }

        for &removed in &self.removed {
            for &pt in &self.facets[removed].outside_points {
                if self.points[pt] == self.points[point] {
                    continue;
                }

                // Points above no new facet are inside the hull, and dropped.
                if let Some(k) = furthest_seeing_facet(&fan, pt, &self.points) {
                    fan[k].outside_points.push(pt);
                }
            }
        }

        let mut k = 0;

        while k != self.undecidable.len() {
            let pt = self.undecidable[k];

            if let Some(f) = furthest_seeing_facet(&fan, pt, &self.points) {
                fan[f].outside_points.push(pt);
                let _ = self.undecidable.swap_remove(k);
            } else {
                k += 1;
            }
        }

        self.facets.append(&mut fan);
        Ok(())
    }

    fn into_indices(self) -> Vec<[u32; 3]> {
        self.facets
            .iter()
            .filter(|f| f.valid)
            .map(|f| f.vertices.map(|v| v as u32))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::try_convex_hull;
    use crate::math::{Point, Real};
    use crate::shape::Tetrahedron;
    use crate::transformation::{check_convex_hull, ConvexHullError};

    #[test]
    fn cube_lattice_hull() {
        let mut points = Vec::new();
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    points.push(Point::new(i as Real, j as Real, k as Real));
                }
            }
        }

        let (vertices, indices) = try_convex_hull(&points).unwrap();
        assert!(check_convex_hull(&vertices, &indices).is_ok());

        let center = Point::new(1.5, 1.5, 1.5);
        let volume: Real = indices
            .iter()
            .map(|idx| {
                Tetrahedron::new(
                    center,
                    vertices[idx[0] as usize],
                    vertices[idx[1] as usize],
                    vertices[idx[2] as usize],
                )
                .signed_volume()
            })
            .sum();
        assert_relative_eq!(volume, 27.0, epsilon = 1.0e-3);

        for corner in [Point::origin(), Point::new(3.0, 3.0, 3.0)] {
            assert!(vertices.contains(&corner));
        }
    }

    #[test]
    fn degenerate_inputs_are_errors() {
        let points = [Point::origin(), Point::new(1.0, 0.0, 0.0), Point::new(0.0, 1.0, 0.0)];
        assert_eq!(
            try_convex_hull(&points).err(),
            Some(ConvexHullError::IncompleteInput)
        );

        let segment: Vec<_> = (0..10).map(|i| Point::new(i as Real, 0.0, 0.0)).collect();
        assert_eq!(
            try_convex_hull(&segment).err(),
            Some(ConvexHullError::MissingSupportPoint)
        );
    }

    #[test]
    fn random_cloud_hull_is_valid() {
        let mut rng = oorandom::Rand32::new(42);
        let points: Vec<_> = (0..500)
            .map(|_| {
                Point::new(
                    rng.rand_float() as Real,
                    rng.rand_float() as Real,
                    rng.rand_float() as Real,
                )
            })
            .collect();

        let (vertices, indices) = try_convex_hull(&points).unwrap();
        assert!(check_convex_hull(&vertices, &indices).is_ok());

        for pt in &points {
            assert!(crate::query::contains_point_convex_polyhedron(
                &vertices, &indices, pt, 1.0e-4
            ));
        }
    }
}
