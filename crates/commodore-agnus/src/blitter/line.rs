//! Line mode geometry shared by the fast and the slow blitter.
//!
//! Line mode draws one pixel per iteration. BLTCON1 selects the octant,
//! BLTAPT holds the Bresenham error term, BLTAMOD and BLTBMOD the two
//! increments, and BLTCMOD the width of a raster row in bytes. C and D
//! point at the word holding the current pixel; ASH selects the pixel
//! within that word.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction flags of one octant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Octant {
    pub index: u8,
    /// The major (always stepped) axis is Y.
    pub y_major: bool,
    /// X steps move left.
    pub left: bool,
    /// Y steps move up, to lower addresses.
    pub up: bool,
}

impl Octant {
    /// Decodes SUD, SUL and AUL from BLTCON1.
    #[must_use]
    pub fn from_bltcon1(bltcon1: u16) -> Self {
        let code = (bltcon1 >> 2) & 0b111;
        let index = match code {
            0b000 => 6,
            0b001 => 1,
            0b010 => 5,
            0b011 => 2,
            0b100 => 7,
            0b101 => 4,
            0b110 => 0,
            _ => 3,
        };
        let (y_major, left, up) = match index {
            0 => (false, false, true),
            1 => (true, false, true),
            2 => (true, true, true),
            3 => (false, true, true),
            4 => (false, true, false),
            5 => (true, true, false),
            6 => (true, false, false),
            _ => (false, false, false),
        };
        Self { index, y_major, left, up }
    }
}

/// Line drawing state carried from one pixel to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineState {
    /// Pixel within the current word, 0 = leftmost.
    pub pixel: u16,
    pub error: i16,
    pub texture: u16,
    /// SING: a pixel has been drawn in the current row.
    pub dot_in_row: bool,
}

impl LineState {
    #[must_use]
    pub fn new(ash: u16, apt: u32, texture: u16) -> Self {
        Self { pixel: ash & 0xF, error: apt as i16, texture, dot_in_row: false }
    }

    /// A channel value of the current pixel. In single-bit mode only the
    /// first pixel of a row is drawn.
    pub fn a_value(&mut self, sing: bool) -> u16 {
        let a = 0x8000 >> self.pixel;
        if !sing {
            return a;
        }
        if self.dot_in_row {
            0
        } else {
            self.dot_in_row = true;
            a
        }
    }

    /// B channel value: the texture bit selected by BSH, spread over the word.
    #[must_use]
    pub fn b_value(&self, bsh: u16) -> u16 {
        if self.texture.rotate_left(u32::from(bsh)) & 0x8000 != 0 { 0xFFFF } else { 0 }
    }

    /// Advances to the next pixel. Returns the byte offsets to add to the
    /// C and D pointers.
    pub fn step(&mut self, octant: Octant, amod: i16, bmod: i16, cmod: i16) -> i32 {
        let diagonal = self.error >= 0;
        let mut offset = 0;

        if octant.y_major || diagonal {
            offset += self.step_y(octant, cmod);
        }
        if !octant.y_major || diagonal {
            offset += self.step_x(octant);
        }

        self.error = self.error.wrapping_add(if diagonal { amod } else { bmod });
        self.texture = self.texture.rotate_left(1);
        offset
    }

    fn step_x(&mut self, octant: Octant) -> i32 {
        if octant.left {
            if self.pixel == 0 {
                self.pixel = 15;
                -2
            } else {
                self.pixel -= 1;
                0
            }
        } else if self.pixel == 15 {
            self.pixel = 0;
            2
        } else {
            self.pixel += 1;
            0
        }
    }

    fn step_y(&mut self, octant: Octant, cmod: i16) -> i32 {
        self.dot_in_row = false;
        if octant.up { -i32::from(cmod) } else { i32::from(cmod) }
    }
}
