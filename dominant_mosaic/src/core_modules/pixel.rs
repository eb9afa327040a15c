// THEORY:
// The `Pixel` module is the most fundamental unit of the mosaic engine. It is a
// "dumb" data container for one exact color sample. It is stored as 16 bits per
// channel, but never carries more precision than the source had: 8-bit images
// are resized at 8 bits and widened by byte replication (0xAB -> 0xABAB), so two
// pixels only differ if their source bytes differed.
//
// Key principles:
// 1.  **Exact identity**: Two pixels are the same color only when all four
//     channels match exactly. `Pixel` derives `Eq` and `Hash` so it can key a
//     frequency map directly; there is no tolerance or clustering anywhere.
// 2.  **Precision first, quantize last**: The only places that drop to 8 bits
//     are the hex formatting used by the report and the final PNG conversion,
//     and both keep the top byte of each channel (`>> 8`).
// 3.  **Zero is meaningful**: `Pixel::default()` is fully transparent black. It is
//     the sentinel for cells that hold no pixels and the background of a fresh
//     mosaic canvas.

pub mod pixel {
    use image::Rgba;

    pub type Channel = u16;
    pub type Byte = u8;

    const CHANNELS: usize = 4;

    /// A single RGBA color sample with 16 bits per channel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Pixel {
        /// The red channel value (0-65535).
        pub red: Channel,
        /// The green channel value (0-65535).
        pub green: Channel,
        /// The blue channel value (0-65535).
        pub blue: Channel,
        /// The alpha (opacity) channel value (0-65535).
        pub alpha: Channel,
    }

    impl Pixel {
        /// Fully transparent black; returned for cells without any pixels.
        pub const TRANSPARENT: Pixel = Pixel::new(0, 0, 0, 0);

        pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }

        /// Widens an opaque 8-bit color by replicating each byte (0xAB -> 0xABAB).
        pub const fn from_rgb8(red: Byte, green: Byte, blue: Byte) -> Self {
            Pixel::new(widen(red), widen(green), widen(blue), Channel::MAX)
        }

        /// Widens an 8-bit RGBA sample by byte replication, so `to_rgba8` gives it back unchanged.
        pub const fn from_rgba8([red, green, blue, alpha]: [Byte; CHANNELS]) -> Self {
            Pixel::new(widen(red), widen(green), widen(blue), widen(alpha))
        }

        /// Builds an opaque pixel from a packed `0xRRGGBB` value.
        pub const fn from_hex(rgb: u32) -> Self {
            Pixel::from_rgb8((rgb >> 16) as Byte, (rgb >> 8) as Byte, rgb as Byte)
        }

        /// `#rrggbb` using the high byte of each color channel. Alpha is dropped.
        pub fn to_hex(&self) -> String {
            let [r, g, b, _] = self.to_rgba8();
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        }

        /// Narrows to 8 bits per channel by keeping the high byte.
        pub const fn to_rgba8(&self) -> [Byte; CHANNELS] {
            [
                (self.red >> 8) as Byte,
                (self.green >> 8) as Byte,
                (self.blue >> 8) as Byte,
                (self.alpha >> 8) as Byte,
            ]
        }
    }

    const fn widen(byte: Byte) -> Channel {
        (byte as Channel) << 8 | byte as Channel
    }

    impl From<Rgba<Channel>> for Pixel {
        fn from(rgba: Rgba<Channel>) -> Self {
            let [red, green, blue, alpha] = rgba.0;
            Pixel::new(red, green, blue, alpha)
        }
    }

    impl From<&Rgba<Channel>> for Pixel {
        fn from(rgba: &Rgba<Channel>) -> Self {
            Pixel::from(*rgba)
        }
    }

    impl From<Pixel> for Rgba<Channel> {
        fn from(pixel: Pixel) -> Self {
            Rgba([pixel.red, pixel.green, pixel.blue, pixel.alpha])
        }
    }

}
