/// Client-requested color format, drawn from the platform's fixed media
/// color-format constant space.
///
/// Only the constants the converter recognizes are represented; see
/// [`ClientFormat::from_raw`] for handling the rest of the integer space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ClientFormat {
    Rgb888 = 12,
    Bgr888 = 13,
    Bgra8888 = 15,
    Argb8888 = 16,
    Yuv411Planar = 17,
    Yuv411PackedPlanar = 18,
    Yuv420Planar = 19,
    Yuv420PackedPlanar = 20,
    Yuv420SemiPlanar = 21,
    Yuv422Planar = 22,
    Yuv422PackedPlanar = 23,
    Yuv422SemiPlanar = 24,
    Yuv444Interleaved = 29,
    Yuv420PackedSemiPlanar = 39,
    Yuv422PackedSemiPlanar = 40,
    YuvP010 = 54,
    Surface = 0x7F00_0789,
    Abgr8888 = 0x7F00_A000,
    RgbaFlexible = 0x7F36_A888,
    RgbFlexible = 0x7F36_B888,
    Yuv420Flexible = 0x7F42_0888,
    Yuv422Flexible = 0x7F42_2888,
    Yuv444Flexible = 0x7F44_4888,
}

impl ClientFormat {
    /// Map a raw platform constant to a recognized format.
    ///
    /// Returns `None` for constants outside the recognized set. What to do
    /// with those is caller policy: the platform convention is to fall back
    /// to [`ClientFormat::Yuv420Flexible`] for YUV sources and to reject
    /// the request for RGB/RGBA sources.
    pub fn from_raw(raw: i32) -> Option<Self> {
        Self::variants().into_iter().find(|f| *f as i32 == raw)
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }

    /// The sample bit depth this format pins, if any.
    ///
    /// A request carrying an implied depth must match the source's bit
    /// depth exactly; the converter performs no depth conversion.
    pub fn implied_bit_depth(self) -> Option<u32> {
        use ClientFormat::*;

        match self {
            YuvP010 => Some(10),
            Yuv411Planar | Yuv411PackedPlanar | Yuv420Flexible | Yuv420Planar
            | Yuv420PackedPlanar | Yuv420SemiPlanar | Yuv420PackedSemiPlanar | Yuv422Flexible
            | Yuv422Planar | Yuv422PackedPlanar | Yuv422SemiPlanar | Yuv422PackedSemiPlanar
            | Yuv444Flexible | Yuv444Interleaved => Some(8),
            Rgb888 | Bgr888 | Bgra8888 | Argb8888 | Abgr8888 | Surface | RgbFlexible
            | RgbaFlexible => None,
        }
    }

    pub fn variants() -> impl IntoIterator<Item = Self> {
        use ClientFormat::*;

        [
            Rgb888,
            Bgr888,
            Bgra8888,
            Argb8888,
            Yuv411Planar,
            Yuv411PackedPlanar,
            Yuv420Planar,
            Yuv420PackedPlanar,
            Yuv420SemiPlanar,
            Yuv422Planar,
            Yuv422PackedPlanar,
            Yuv422SemiPlanar,
            Yuv444Interleaved,
            Yuv420PackedSemiPlanar,
            Yuv422PackedSemiPlanar,
            YuvP010,
            Surface,
            Abgr8888,
            RgbaFlexible,
            RgbFlexible,
            Yuv420Flexible,
            Yuv422Flexible,
            Yuv444Flexible,
        ]
    }
}
