//! The blitter's data path: barrel shifters, minterm logic and fill circuit.

/// Runs a barrel shifter. The previous word of the channel supplies the
/// bits shifted in; in descending mode the data moves left instead of right.
#[must_use]
pub fn barrel_shift(new: u16, old: u16, shift: u16, desc: bool) -> u16 {
    debug_assert!(shift < 16);
    if desc {
        (((u32::from(new) << 16) | u32::from(old)) >> (16 - u32::from(shift))) as u16
    } else {
        (((u32::from(old) << 16) | u32::from(new)) >> shift) as u16
    }
}

/// Combines A, B and C according to the eight minterm bits, one 16-bit
/// word at a time.
#[must_use]
pub fn minterm(a: u16, b: u16, c: u16, lf: u8) -> u16 {
    let mut result = 0;
    if lf & 0x80 != 0 {
        result |= a & b & c;
    }
    if lf & 0x40 != 0 {
        result |= a & b & !c;
    }
    if lf & 0x20 != 0 {
        result |= a & !b & c;
    }
    if lf & 0x10 != 0 {
        result |= a & !b & !c;
    }
    if lf & 0x08 != 0 {
        result |= !a & b & c;
    }
    if lf & 0x04 != 0 {
        result |= !a & b & !c;
    }
    if lf & 0x02 != 0 {
        result |= !a & !b & c;
    }
    if lf & 0x01 != 0 {
        result |= !a & !b & !c;
    }
    result
}

/// Reference form of [`minterm`]: looks up every bit in the truth table.
#[must_use]
pub fn minterm_per_bit(a: u16, b: u16, c: u16, lf: u8) -> u16 {
    let mut result: u16 = 0;
    for bit in 0..16 {
        let a_bit = (a >> bit) & 1;
        let b_bit = (b >> bit) & 1;
        let c_bit = (c >> bit) & 1;
        let index = (a_bit << 2) | (b_bit << 1) | c_bit;
        if (lf >> index) & 1 != 0 {
            result |= 1 << bit;
        }
    }
    result
}

/// Fill results for every byte value, indexed by `[carry in][data]`.
struct FillTable {
    data: [[u8; 256]; 2],
    carry_out: [[bool; 256]; 2],
}

impl FillTable {
    const fn build(exclusive: bool) -> Self {
        let mut table = Self { data: [[0; 256]; 2], carry_out: [[false; 256]; 2] };
        let mut carry_in = 0;
        while carry_in < 2 {
            let mut value = 0;
            while value < 256 {
                let (data, carry) = fill_byte(value as u8, carry_in == 1, exclusive);
                table.data[carry_in][value] = data;
                table.carry_out[carry_in][value] = carry;
                value += 1;
            }
            carry_in += 1;
        }
        table
    }
}

/// Fills one byte from bit 0 upwards. Every set bit toggles the carry.
/// Inclusive fill keeps both edges, exclusive fill drops the left one.
const fn fill_byte(value: u8, carry_in: bool, exclusive: bool) -> (u8, bool) {
    let mut carry = carry_in;
    let mut out = 0u8;
    let mut i = 0;
    while i < 8 {
        let bit = (value >> i) & 1 != 0;
        let set = if exclusive { carry ^ bit } else { carry | bit };
        if set {
            out |= 1 << i;
        }
        carry ^= bit;
        i += 1;
    }
    (out, carry)
}

static INCLUSIVE_FILL: FillTable = FillTable::build(false);
static EXCLUSIVE_FILL: FillTable = FillTable::build(true);

/// Runs the fill circuit over a word, low byte first, updating the carry.
#[must_use]
pub fn fill(value: u16, carry: &mut bool, exclusive: bool) -> u16 {
    let table = if exclusive { &EXCLUSIVE_FILL } else { &INCLUSIVE_FILL };

    let lo = usize::from(value as u8);
    let lo_out = table.data[usize::from(*carry)][lo];
    *carry = table.carry_out[usize::from(*carry)][lo];

    let hi = usize::from((value >> 8) as u8);
    let hi_out = table.data[usize::from(*carry)][hi];
    *carry = table.carry_out[usize::from(*carry)][hi];

    (u16::from(hi_out) << 8) | u16::from(lo_out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_minterm_forms_agree() {
        let samples: [u16; 6] = [0x0000, 0xFFFF, 0xA5A5, 0x1234, 0x8001, 0x7FFE];
        for lf in 0..=255u8 {
            for &a in &samples {
                for &b in &samples {
                    let c = a.rotate_left(3) ^ b;
                    assert_eq!(minterm(a, b, c, lf), minterm_per_bit(a, b, c, lf), "lf {lf:02X}");
                }
            }
        }
    }

    #[test]
    fn common_minterms() {
        // D = A
        assert_eq!(minterm(0x00FF, 0x0F0F, 0x3333, 0xF0), 0x00FF);
        // D = A AND NOT C
        assert_eq!(minterm(0x00FF, 0, 0x0F0F, 0x50), 0x00F0);
        // D = A AND NOT B
        assert_eq!(minterm(0x00FF, 0, 0x0F0F, 0x30), 0x00FF);
        // Cookie cut: D = AB + NOT(A)C
        assert_eq!(minterm(0xFF00, 0x1234, 0x5678, 0xCA), 0x1278);
    }

    #[test]
    fn barrel_shift_carries_bits_across_words() {
        assert_eq!(barrel_shift(0xFFFF, 0x0000, 4, false), 0x0FFF);
        assert_eq!(barrel_shift(0x0000, 0xFFFF, 4, false), 0xF000);
        assert_eq!(barrel_shift(0xFFFF, 0x0000, 4, true), 0xFFF0);
        assert_eq!(barrel_shift(0x0000, 0xFFFF, 4, true), 0x000F);
        assert_eq!(barrel_shift(0x1234, 0xFFFF, 0, false), 0x1234);
        assert_eq!(barrel_shift(0x1234, 0xFFFF, 0, true), 0x1234);
    }

    #[test]
    fn inclusive_fill_keeps_both_edges() {
        let mut carry = false;
        assert_eq!(fill(0b0100_0100, &mut carry, false), 0b0111_1100);
        assert!(!carry);
    }

    #[test]
    fn exclusive_fill_drops_the_left_edge() {
        let mut carry = false;
        assert_eq!(fill(0b0100_0100, &mut carry, true), 0b0011_1100);
        assert!(!carry);
    }

    #[test]
    fn fill_carry_crosses_bytes_and_words() {
        let mut carry = false;
        assert_eq!(fill(0x0010, &mut carry, false), 0xFFF0);
        assert!(carry);
        // The open span continues into the next word
        assert_eq!(fill(0x0000, &mut carry, false), 0xFFFF);
        assert_eq!(fill(0x0100, &mut carry, false), 0x01FF);
        assert!(!carry);
    }
}
