use crate::Pos2;

/// A fixed-size toroidal grid of 2-state cells, packed 8 cells per byte
///
/// Cell `(x, y)` lives at linear index `y * width + x`, which is stored in
/// byte `index / 8` at bit `index % 8`. Callers never see this layout; every
/// accessor wraps its coordinates onto the torus first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBoard {
    width: usize,
    height: usize,
    bytes: Vec<u8>,
}

impl BitBoard {
    /// Creates an all-dead board
    ///
    /// ## Panics
    /// If either dimension is zero. [`SessionConfig::validate`] rejects such
    /// sizes before a session ever allocates a board.
    ///
    /// [`SessionConfig::validate`]: crate::SessionConfig::validate
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "board dimensions must be non-zero");
        Self {
            width,
            height,
            bytes: vec![0; (width * height).div_ceil(8)],
        }
    }

    /// Creates a board with the given cells alive
    pub fn from_alive<I>(width: usize, height: usize, alive: I) -> Self
    where
        I: IntoIterator<Item = Pos2>,
    {
        let mut board = Self::new(width, height);
        for pos in alive {
            board.set(pos.x, pos.y);
        }
        board
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }
    /// Total number of cells on the board
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }
    /// Whether every cell is dead
    #[inline]
    pub fn is_extinct(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }

    #[inline]
    fn locate(&self, x: i32, y: i32) -> (usize, u8) {
        let idx = Pos2::new(x, y).wrap(self.width, self.height);
        (idx >> 3, 1 << (idx & 7))
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        let (byte, mask) = self.locate(x, y);
        self.bytes[byte] & mask != 0
    }
    #[inline]
    pub fn set(&mut self, x: i32, y: i32) {
        let (byte, mask) = self.locate(x, y);
        self.bytes[byte] |= mask;
    }
    #[inline]
    pub fn clear(&mut self, x: i32, y: i32) {
        let (byte, mask) = self.locate(x, y);
        self.bytes[byte] &= !mask;
    }

    /// Whole-buffer comparison; two boards are equal iff every cell matches
    #[inline]
    pub fn equals(&self, other: &BitBoard) -> bool {
        self == other
    }

    /// Number of live cells
    pub fn population(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Kills every cell
    pub fn clear_all(&mut self) {
        self.bytes.fill(0);
    }

    /// Overwrites this board with `other` without reallocating
    ///
    /// ## Panics
    /// If the boards have different dimensions
    pub fn copy_from(&mut self, other: &BitBoard) {
        assert_eq!(
            (self.width, self.height),
            (other.width, other.height),
            "board dimensions differ"
        );
        self.bytes.copy_from_slice(&other.bytes);
    }

    /// Replaces every cell with a fresh random state, alive with probability `density`
    pub fn randomize<R: rand::Rng + ?Sized>(&mut self, rng: &mut R, density: f64) {
        self.clear_all();
        for idx in 0..self.len() {
            if rng.random_bool(density) {
                self.bytes[idx >> 3] |= 1 << (idx & 7);
            }
        }
    }

    #[inline]
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}
