//! Colour palettes and tick speeds an operator can cycle through.

use std::time::Duration;

/// An opaque colour token handed to the display sink
///
/// By convention the low 24 bits are `0xRRGGBB`, but the simulation never
/// looks inside.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);

    #[inline]
    pub const fn to_rgb(self) -> (u8, u8, u8) {
        ((self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8)
    }
}

/// A named list of colour stops, from fully faded (first) to alive (last)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    stops: &'static [Color],
}

impl Palette {
    pub const fn new(name: &'static str, stops: &'static [Color]) -> Self {
        assert!(stops.len() >= 2, "a palette needs a background and an alive colour");
        Self { name, stops }
    }

    /// Maps a fade level in `0..levels` onto this palette
    ///
    /// Level 0 is always the first stop and `levels - 1` the last; levels in
    /// between sample the stops proportionally, so a palette with exactly
    /// `levels` stops maps one to one.
    pub fn color_for(&self, level: u8, levels: u8) -> Color {
        let top = levels.saturating_sub(1).max(1) as usize;
        let level = (level as usize).min(top);
        let last = self.stops.len() - 1;
        // round to nearest stop
        self.stops[(level * last + top / 2) / top]
    }
}

/// Built-in palettes
pub static PALETTES: &[Palette] = &[
    // red alive cells fading through green and blue to black
    Palette::new(
        "ember",
        &[
            Color(0x000000),
            Color(0x000004),
            Color(0x00000A),
            Color(0x00000F),
            Color(0x000400),
            Color(0x000A00),
            Color(0x000F00),
            Color(0xFF0000),
        ],
    ),
    Palette::new(
        "ocean",
        &[
            Color(0x000000),
            Color(0x000814),
            Color(0x001428),
            Color(0x00284A),
            Color(0x00AAFF),
        ],
    ),
    Palette::new(
        "forest",
        &[
            Color(0x000000),
            Color(0x020A00),
            Color(0x061A02),
            Color(0x10300A),
            Color(0x60FF20),
        ],
    ),
    Palette::new(
        "amber",
        &[
            Color(0x000000),
            Color(0x0A0400),
            Color(0x1E0C00),
            Color(0x401A00),
            Color(0xFFB000),
        ],
    ),
    Palette::new(
        "plasma",
        &[
            Color(0x000000),
            Color(0x0A0014),
            Color(0x200030),
            Color(0x500050),
            Color(0xA00060),
            Color(0xFF60A0),
        ],
    ),
    Palette::new("mono", &[Color(0x000000), Color(0x202020), Color(0xFFFFFF)]),
];

/// Built-in tick intervals, slowest last
pub static SPEEDS: &[Duration] = &[
    Duration::from_millis(40),
    Duration::from_millis(80),
    Duration::from_millis(150),
    Duration::from_millis(250),
    Duration::from_millis(400),
];

/// An operator's palette selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteChoice {
    Fixed(usize),
    /// Pick a palette at random on every reseed
    Random,
}

/// An operator's speed selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedChoice {
    Fixed(usize),
    /// Pick an interval within the configured range on every reseed
    Random,
}

/// Steps `Fixed(0) .. Fixed(len - 1), Random` and back around
fn cycle(current: Option<usize>, len: usize) -> Option<usize> {
    match current {
        Some(i) if i + 1 < len => Some(i + 1),
        Some(_) => None,
        None => Some(0),
    }
}

impl PaletteChoice {
    pub fn next(self) -> Self {
        let current = match self {
            Self::Fixed(i) => Some(i),
            Self::Random => None,
        };
        cycle(current, PALETTES.len()).map_or(Self::Random, Self::Fixed)
    }

    /// Parses a palette name or `random`
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("random") {
            return Some(Self::Random);
        }
        PALETTES
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(s))
            .map(Self::Fixed)
    }
}

impl SpeedChoice {
    pub fn next(self) -> Self {
        let current = match self {
            Self::Fixed(i) => Some(i),
            Self::Random => None,
        };
        cycle(current, SPEEDS.len()).map_or(Self::Random, Self::Fixed)
    }

    /// Parses a speed table index (`0` fastest) or `random`
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("random") {
            return Some(Self::Random);
        }
        s.parse::<usize>()
            .ok()
            .filter(|&i| i < SPEEDS.len())
            .map(Self::Fixed)
    }
}

impl std::fmt::Display for PaletteChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(i) => f.write_str(PALETTES[*i % PALETTES.len()].name),
            Self::Random => f.write_str("random"),
        }
    }
}

impl std::fmt::Display for SpeedChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(i) => write!(f, "{}ms", SPEEDS[*i % SPEEDS.len()].as_millis()),
            Self::Random => f.write_str("random"),
        }
    }
}
