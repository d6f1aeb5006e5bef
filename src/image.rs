use crate::{Endianness, PlaneLayout};

/// Maximum number of planes an [`ImageLayout`] can describe.
pub const MAX_PLANES: usize = 4;

/// Color model of an [`ImageLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Yuv,
    Rgb,
    Rgba,
    Unknown,
}

/// Declarative description of a multi-plane image inside one flat byte
/// buffer.
///
/// This is the wire-facing counterpart of a [`GraphicView`]: plain data that
/// lets a consumer interpret a byte buffer without re-deriving its layout.
/// Plane 0 is luma (or red), followed by Cb/Cr (or green/blue/alpha)
/// depending on `kind`. It never owns pixel bytes.
///
/// All populated planes share the descriptor-level `bit_depth` and
/// `allocated_depth`; the producing converter rejects mixed-depth sources.
///
/// [`GraphicView`]: crate::GraphicView
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLayout {
    pub kind: ImageKind,
    pub num_planes: u32,
    pub width: u32,
    pub height: u32,
    pub bit_depth: u32,
    pub allocated_depth: u32,
    pub planes: [PlaneLayout; MAX_PLANES],
}

fn yuv420_image(width: u32, height: u32, planes: [PlaneLayout; 3], depth: (u32, u32)) -> ImageLayout {
    let (bit_depth, allocated_depth) = depth;
    let [y, u, v] = planes;

    ImageLayout {
        kind: ImageKind::Yuv,
        num_planes: 3,
        width,
        height,
        bit_depth,
        allocated_depth,
        planes: [y, u, v, PlaneLayout::EMPTY],
    }
}

fn yuv420_image_plane(
    offset: usize,
    col_inc: i32,
    row_inc: i32,
    subsampling: u32,
    depth: (u32, u32),
) -> PlaneLayout {
    let (bit_depth, allocated_depth) = depth;

    PlaneLayout {
        offset,
        col_inc,
        row_inc,
        horiz_subsampling: subsampling,
        vert_subsampling: subsampling,
        allocated_depth,
        bit_depth,
        right_shift: allocated_depth - bit_depth,
        endianness: Endianness::Native,
    }
}

impl ImageLayout {
    /// Planar 8-bit YUV 4:2:0 with `stride` bytes between luma rows and
    /// chroma planes packed after `v_stride` luma rows.
    pub fn yuv420_planar(width: u32, height: u32, stride: u32, v_stride: u32) -> Self {
        let size = stride as usize * v_stride as usize;
        let depth = (8, 8);

        yuv420_image(
            width,
            height,
            [
                yuv420_image_plane(0, 1, stride as i32, 1, depth),
                yuv420_image_plane(size, 1, stride as i32 / 2, 2, depth),
                yuv420_image_plane(size * 5 / 4, 1, stride as i32 / 2, 2, depth),
            ],
            depth,
        )
    }

    /// Semiplanar 8-bit YUV 4:2:0 (NV12 ordering: U before V).
    pub fn yuv420_semiplanar(width: u32, height: u32, stride: u32, v_stride: u32) -> Self {
        let size = stride as usize * v_stride as usize;
        let depth = (8, 8);

        yuv420_image(
            width,
            height,
            [
                yuv420_image_plane(0, 1, stride as i32, 1, depth),
                yuv420_image_plane(size, 2, stride as i32, 2, depth),
                yuv420_image_plane(size + 1, 2, stride as i32, 2, depth),
            ],
            depth,
        )
    }

    /// Semiplanar 10-bit YUV 4:2:0 (P010). `stride` is in bytes.
    pub fn yuv420_p010(width: u32, height: u32, stride: u32, v_stride: u32) -> Self {
        let size = stride as usize * v_stride as usize;
        let depth = (10, 16);

        yuv420_image(
            width,
            height,
            [
                yuv420_image_plane(0, 2, stride as i32, 1, depth),
                yuv420_image_plane(size, 4, stride as i32, 2, depth),
                yuv420_image_plane(size + 2, 4, stride as i32, 2, depth),
            ],
            depth,
        )
    }

    /// The populated plane descriptions.
    pub fn planes(&self) -> &[PlaneLayout] {
        &self.planes[..self.num_planes as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_constructor_geometry() {
        let layout = ImageLayout::yuv420_planar(64, 64, 64, 64);

        assert_eq!(layout.num_planes, 3);
        assert_eq!(layout.planes[0].offset, 0);
        assert_eq!(layout.planes[1].offset, 4096);
        assert_eq!(layout.planes[2].offset, 5120);
        assert_eq!(layout.planes[1].row_inc, 32);
    }

    #[test]
    fn semiplanar_constructor_geometry() {
        let layout = ImageLayout::yuv420_semiplanar(64, 64, 64, 64);

        assert_eq!(layout.planes[1].offset, 4096);
        assert_eq!(layout.planes[2].offset, 4097);
        assert_eq!(layout.planes[1].col_inc, 2);
        assert_eq!(layout.planes[1].row_inc, 64);
    }

    #[test]
    fn p010_constructor_geometry() {
        let layout = ImageLayout::yuv420_p010(64, 64, 128, 64);

        assert_eq!(layout.bit_depth, 10);
        assert_eq!(layout.allocated_depth, 16);
        assert_eq!(layout.planes[0].col_inc, 2);
        assert_eq!(layout.planes[1].col_inc, 4);
        assert_eq!(layout.planes[2].offset, 128 * 64 + 2);
        assert_eq!(layout.planes[0].right_shift, 6);
    }
}
