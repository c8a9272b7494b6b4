use acd3d::math::{Isometry, Point, Real};

/// An indexed triangle mesh.
pub struct Mesh {
    pub vertices: Vec<Point<Real>>,
    pub indices: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Appends an axis-aligned box, with outward-facing triangles.
    pub fn push_box(&mut self, mins: [Real; 3], maxs: [Real; 3]) -> &mut Self {
        let base = self.vertices.len() as u32;

        for k in 0..8 {
            self.vertices.push(Point::new(
                if k & 1 == 0 { mins[0] } else { maxs[0] },
                if k & 2 == 0 { mins[1] } else { maxs[1] },
                if k & 4 == 0 { mins[2] } else { maxs[2] },
            ));
        }

        for tri in [
            [0, 2, 1],
            [1, 2, 3],
            [4, 5, 6],
            [5, 7, 6],
            [0, 1, 4],
            [1, 5, 4],
            [2, 6, 3],
            [3, 6, 7],
            [0, 4, 2],
            [2, 4, 6],
            [1, 3, 5],
            [3, 7, 5],
        ] {
            self.indices
                .push([base + tri[0], base + tri[1], base + tri[2]]);
        }

        self
    }

    pub fn transformed(mut self, pos: &Isometry<Real>) -> Self {
        for pt in &mut self.vertices {
            *pt = pos * *pt;
        }
        self
    }

    /// The volume enclosed by this mesh.
    pub fn volume(&self) -> Real {
        self.indices
            .iter()
            .map(|idx| {
                let [a, b, c] = idx.map(|i| self.vertices[i as usize].coords);
                a.dot(&b.cross(&c)) / 6.0
            })
            .sum()
    }
}

pub fn unit_cube() -> Mesh {
    let mut mesh = Mesh::new();
    let _ = mesh.push_box([0.0; 3], [1.0; 3]);
    mesh
}

/// Two unit cubes linked by a thin bar along `x`.
pub fn dumbbell() -> Mesh {
    let mut mesh = Mesh::new();
    let _ = mesh
        .push_box([0.0, 0.0, 0.0], [1.0, 1.0, 1.0])
        .push_box([1.0, 0.4, 0.4], [3.0, 0.6, 0.6])
        .push_box([3.0, 0.0, 0.0], [4.0, 1.0, 1.0]);
    mesh
}
