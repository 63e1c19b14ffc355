/// A 32-bit `0xAARRGGBB` block color, as shown by trace viewers.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Color(u32);

impl Color {
    /// The default block color (a pale amber, easy_profiler's default).
    pub const DEFAULT: Self = Self(0xffff_ecb3);

    /// Fully transparent black, rendered by viewers as "no color set".
    pub const NONE: Self = Self(0);

    /// Opaque white.
    pub const WHITE: Self = Self::from_rgb(0xff, 0xff, 0xff);

    /// Opaque black.
    pub const BLACK: Self = Self::from_rgb(0x00, 0x00, 0x00);

    /// Opaque red.
    pub const RED: Self = Self::from_rgb(0xf4, 0x43, 0x36);

    /// Opaque green.
    pub const GREEN: Self = Self::from_rgb(0x4c, 0xaf, 0x50);

    /// Opaque blue.
    pub const BLUE: Self = Self::from_rgb(0x21, 0x96, 0xf3);

    /// From an opaque RGB triplet.
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(0xff, r, g, b)
    }

    /// From alpha + RGB.
    #[inline]
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    /// From a raw `0xAARRGGBB` value.
    #[inline]
    pub const fn from_u32(argb: u32) -> Self {
        Self(argb)
    }

    /// The raw `0xAARRGGBB` value.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl Default for Color {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Debug for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Color(#{:08x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn default_is_the_original_binding_default() {
        assert_eq!(Color::DEFAULT.as_u32(), 0xffff_ecb3);
        assert_eq!(Color::default(), Color::DEFAULT);
    }

    #[test]
    fn channel_packing() {
        assert_eq!(Color::from_rgb(0xff, 0xec, 0xb3), Color::DEFAULT);
        assert_eq!(Color::from_argb(0x80, 0x01, 0x02, 0x03).as_u32(), 0x8001_0203);
    }
}
