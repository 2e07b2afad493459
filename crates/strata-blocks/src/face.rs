/// One of the six axis-aligned faces of a voxel. Index order matches the neighbor tables
/// used by lighting and redstone: +X, -X, +Y, -Y, +Z, -Z.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    pub const HORIZONTAL: [Face; 4] = [Face::PosX, Face::NegX, Face::PosZ, Face::NegZ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(i: u8) -> Option<Face> {
        Face::ALL.get(i as usize).copied()
    }

    #[inline]
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    #[inline]
    pub fn opposite(self) -> Face {
        match self {
            Face::PosX => Face::NegX,
            Face::NegX => Face::PosX,
            Face::PosY => Face::NegY,
            Face::NegY => Face::PosY,
            Face::PosZ => Face::NegZ,
            Face::NegZ => Face::PosZ,
        }
    }

    /// Axis index: 0 = x, 1 = y, 2 = z.
    #[inline]
    pub fn axis(self) -> usize {
        self.index() / 2
    }

    /// Face through which a traversal moving `step` (±1) along `axis` enters the next cell.
    #[inline]
    pub fn entered_by_step(axis: usize, step: i32) -> Face {
        match (axis, step > 0) {
            (0, true) => Face::NegX,
            (0, false) => Face::PosX,
            (1, true) => Face::NegY,
            (1, false) => Face::PosY,
            (_, true) => Face::NegZ,
            (_, false) => Face::PosZ,
        }
    }

    #[inline]
    pub fn neighbor(self, x: i32, y: i32, z: i32) -> (i32, i32, i32) {
        let (dx, dy, dz) = self.offset();
        (x.wrapping_add(dx), y.wrapping_add(dy), z.wrapping_add(dz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_involution_and_offsets_cancel() {
        for f in Face::ALL {
            assert_eq!(f.opposite().opposite(), f);
            let (a, b, c) = f.offset();
            let (d, e, g) = f.opposite().offset();
            assert_eq!((a + d, b + e, c + g), (0, 0, 0));
            assert_eq!(Face::from_index(f.index() as u8), Some(f));
        }
    }

    #[test]
    fn entering_face_points_back_along_step() {
        for axis in 0..3 {
            for step in [-1, 1] {
                let f = Face::entered_by_step(axis, step);
                assert_eq!(f.axis(), axis);
                let (dx, dy, dz) = f.offset();
                assert_eq!([dx, dy, dz][axis], -step);
            }
        }
    }
}
