//! Fixed colour palette for table groups.

use rand::Rng;

pub const PALETTE: [&str; 8] = [
    "#4a9eff", // blue
    "#ff6b4a", // red
    "#4aff6b", // green
    "#ff4aff", // magenta
    "#ffaa4a", // orange
    "#4affff", // cyan
    "#aa4aff", // purple
    "#ffff4a", // yellow
];

/// Colour of the built-in default group.
pub const DEFAULT_COLOR: &str = PALETTE[0];

/// Pick a palette colour.
pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    PALETTE[rng.gen_range(0..PALETTE.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn pick_stays_in_palette() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..64 {
            assert!(PALETTE.contains(&pick(&mut rng)));
        }
    }
}
