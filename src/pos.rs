/// A signed cell coordinate
///
/// Coordinates are never out of range: the board is a torus, so any [`Pos2`]
/// names a real cell once it is wrapped with [`Pos2::wrap`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos2 {
    pub x: i32,
    pub y: i32,
}
impl Pos2 {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Wraps this position onto a `width` x `height` torus, returning the
    /// linear (row-major) cell index
    #[inline]
    pub fn wrap(self, width: usize, height: usize) -> usize {
        let x = self.x.rem_euclid(width as i32) as usize;
        let y = self.y.rem_euclid(height as i32) as usize;
        y * width + x
    }
}
