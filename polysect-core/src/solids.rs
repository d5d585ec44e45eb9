/// Catalog of the solids offered by the viewers
use std::fmt;
use std::str::FromStr;

use nalgebra::Point3;

use crate::error::{PolyhedronError, Result};
use crate::polyhedron::Polyhedron;

/// The five Platonic solids plus one star polyhedron
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolidKind {
    Tetrahedron,
    Cube,
    Octahedron,
    Dodecahedron,
    Icosahedron,
    /// Great icosahedron: non-convex, its faces pass through the interior
    GreatIcosahedron,
}

impl SolidKind {
    pub const ALL: [SolidKind; 6] = [
        SolidKind::Tetrahedron,
        SolidKind::Cube,
        SolidKind::Octahedron,
        SolidKind::Dodecahedron,
        SolidKind::Icosahedron,
        SolidKind::GreatIcosahedron,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SolidKind::Tetrahedron => "tetrahedron",
            SolidKind::Cube => "cube",
            SolidKind::Octahedron => "octahedron",
            SolidKind::Dodecahedron => "dodecahedron",
            SolidKind::Icosahedron => "icosahedron",
            SolidKind::GreatIcosahedron => "great-icosahedron",
        }
    }

    /// Keyboard shortcut used by the front-ends
    pub fn hotkey(&self) -> char {
        match self {
            SolidKind::Tetrahedron => '1',
            SolidKind::Cube => '2',
            SolidKind::Octahedron => '3',
            SolidKind::Dodecahedron => '4',
            SolidKind::Icosahedron => '5',
            SolidKind::GreatIcosahedron => '8',
        }
    }

    pub fn from_hotkey(key: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.hotkey() == key)
    }

    pub fn is_convex(&self) -> bool {
        !matches!(self, SolidKind::GreatIcosahedron)
    }

    pub fn build(&self) -> Result<Polyhedron> {
        match self {
            SolidKind::Tetrahedron => tetrahedron(),
            SolidKind::Cube => cube(),
            SolidKind::Octahedron => octahedron(),
            SolidKind::Dodecahedron => dodecahedron(),
            SolidKind::Icosahedron => icosahedron(),
            SolidKind::GreatIcosahedron => great_icosahedron(),
        }
    }
}

impl fmt::Display for SolidKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SolidKind {
    type Err = PolyhedronError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s || (s.len() == 1 && s.starts_with(kind.hotkey())))
            .ok_or(PolyhedronError::UnknownSolid(s))
    }
}

/// (√5 − 1) / 2, the inverse golden ratio
fn golden() -> f64 {
    (5f64.sqrt() - 1.0) / 2.0
}

fn points(coords: &[[f64; 3]]) -> Vec<Point3<f64>> {
    coords.iter().map(|&[x, y, z]| Point3::new(x, y, z)).collect()
}

fn faces<const N: usize>(lists: &[[usize; N]]) -> Vec<Vec<usize>> {
    lists.iter().map(|f| f.to_vec()).collect()
}

fn tetrahedron() -> Result<Polyhedron> {
    let vertices = points(&[
        [1.0, 1.0, 1.0],
        [-1.0, -1.0, 1.0],
        [-1.0, 1.0, -1.0],
        [1.0, -1.0, -1.0],
    ]);
    Polyhedron::new(vertices, faces(&[[0, 2, 1], [0, 3, 2], [0, 1, 3], [3, 1, 2]]))
}

fn cube() -> Result<Polyhedron> {
    let vertices = points(&[
        [-1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [1.0, -1.0, 1.0],
        [-1.0, 1.0, 1.0],
        [1.0, 1.0, 1.0],
    ]);
    Polyhedron::new(
        vertices,
        faces(&[
            [0, 2, 3, 1],
            [1, 5, 4, 0],
            [3, 7, 5, 1],
            [2, 6, 7, 3],
            [0, 4, 6, 2],
            [4, 5, 7, 6],
        ]),
    )
}

fn octahedron() -> Result<Polyhedron> {
    let vertices = points(&[
        [0.0, 1.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 0.0, -1.0],
        [1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, -1.0, 0.0],
    ]);
    Polyhedron::new(
        vertices,
        faces(&[
            [0, 2, 1],
            [0, 3, 2],
            [0, 4, 3],
            [0, 1, 4],
            [5, 1, 2],
            [5, 2, 3],
            [5, 3, 4],
            [5, 4, 1],
        ]),
    )
}

fn dodecahedron() -> Result<Polyhedron> {
    let f = golden();
    let g = 1.0 / f;
    let vertices = points(&[
        [-1.0, 1.0, -1.0],
        [1.0, 1.0, -1.0],
        [-1.0, 1.0, 1.0],
        [1.0, 1.0, 1.0],
        [-1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [1.0, -1.0, 1.0],
        [0.0, g, -f],
        [0.0, g, f],
        [-g, f, 0.0],
        [-g, -f, 0.0],
        [g, f, 0.0],
        [g, -f, 0.0],
        [-f, 0.0, -g],
        [f, 0.0, -g],
        [-f, 0.0, g],
        [f, 0.0, g],
        [0.0, -g, -f],
        [0.0, -g, f],
    ]);
    Polyhedron::new(
        vertices,
        faces(&[
            [0, 10, 2, 9, 8],
            [1, 8, 9, 3, 12],
            [9, 2, 16, 17, 3],
            [8, 1, 15, 14, 0],
            [0, 14, 4, 11, 10],
            [11, 6, 16, 2, 10],
            [3, 17, 7, 13, 12],
            [12, 13, 5, 15, 1],
            [16, 6, 19, 7, 17],
            [4, 14, 15, 5, 18],
            [4, 18, 19, 6, 11],
            [5, 13, 7, 19, 18],
        ]),
    )
}

fn icosahedron_vertices() -> Vec<Point3<f64>> {
    let f = golden();
    points(&[
        [0.0, 1.0, f],
        [0.0, 1.0, -f],
        [0.0, -1.0, f],
        [0.0, -1.0, -f],
        [-1.0, f, 0.0],
        [-1.0, -f, 0.0],
        [1.0, f, 0.0],
        [1.0, -f, 0.0],
        [-f, 0.0, 1.0],
        [f, 0.0, 1.0],
        [-f, 0.0, -1.0],
        [f, 0.0, -1.0],
    ])
}

fn icosahedron() -> Result<Polyhedron> {
    Polyhedron::new(
        icosahedron_vertices(),
        faces(&[
            [0, 8, 9],
            [0, 9, 6],
            [0, 6, 1],
            [0, 1, 4],
            [0, 4, 8],
            [1, 6, 11],
            [1, 11, 10],
            [1, 10, 4],
            [4, 10, 5],
            [4, 5, 8],
            [6, 9, 7],
            [6, 7, 11],
            [5, 3, 2],
            [2, 3, 7],
            [2, 9, 8],
            [2, 8, 5],
            [2, 7, 9],
            [3, 10, 11],
            [3, 5, 10],
            [3, 11, 7],
        ]),
    )
}

fn great_icosahedron() -> Result<Polyhedron> {
    Polyhedron::new(
        icosahedron_vertices(),
        faces(&[
            [0, 10, 2],
            [0, 2, 11],
            [0, 5, 7],
            [0, 11, 5],
            [0, 7, 10],
            [1, 3, 8],
            [1, 9, 3],
            [1, 7, 5],
            [1, 5, 9],
            [1, 8, 7],
            [2, 6, 4],
            [2, 4, 11],
            [2, 10, 6],
            [3, 4, 6],
            [3, 9, 4],
            [3, 6, 8],
            [4, 9, 11],
            [5, 11, 9],
            [6, 10, 8],
            [7, 8, 10],
        ]),
    )
}
