use std::fmt;

use crate::rng::RandomSource;

/// Colours a bear can flash while the meat is being revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

pub const PALETTE: [HighlightColor; 6] = [
    HighlightColor::Red,
    HighlightColor::Orange,
    HighlightColor::Yellow,
    HighlightColor::Green,
    HighlightColor::Blue,
    HighlightColor::Purple,
];

impl HighlightColor {
    pub(crate) fn random(rng: &mut impl RandomSource) -> Self {
        PALETTE[rng.pick_index(PALETTE.len())]
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            HighlightColor::Red => "red",
            HighlightColor::Orange => "orange",
            HighlightColor::Yellow => "yellow",
            HighlightColor::Green => "green",
            HighlightColor::Blue => "blue",
            HighlightColor::Purple => "purple",
        }
    }
}

impl fmt::Display for HighlightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
