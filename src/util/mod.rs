use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
    pub const fn from_u32(packed: u32) -> Self {
        Self {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }
    pub fn as_u32(&self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | (self.b as u32)
    }
    /// CSS hex notation, as accepted by canvas `fillStyle`/`strokeStyle`.
    pub fn css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_and_unpacks() {
        let c = Color::rgb(0x12, 0xab, 0xff);
        assert_eq!(c.as_u32(), 0x12abff);
        assert_eq!(Color::from_u32(0x12abff), c);
    }

    #[test]
    fn css_is_lowercase_hex() {
        assert_eq!(Color::rgb(204, 204, 204).css(), "#cccccc");
        assert_eq!(Color::rgb(0, 0, 0).css(), "#000000");
    }
}
