//! Structural predicates identifying standard YUV 4:2:0 layouts.
//!
//! Every test here is a pure, allocation-free check on geometry; none of
//! them look at pixel data. The packed-format predicates (`is_nv12`,
//! `is_nv21`, `is_i420`, `is_p010`) are mutually exclusive for any fixed
//! layout, so the converter can probe them in a fixed order without ties.

use crate::{Channel, ImageKind, ImageLayout, LayoutKind, PlanarLayout, SourcePlane};

const Y: usize = 0;
const U: usize = 1;
const V: usize = 2;

fn is_yuv420_plane(plane: &SourcePlane, channel: Channel, subsampling: u32) -> bool {
    plane.channel == channel
        && plane.layout.allocated_depth == 8
        && plane.layout.bit_depth == 8
        && plane.layout.right_shift == 0
        && plane.layout.horiz_subsampling == subsampling
        && plane.layout.vert_subsampling == subsampling
}

fn is_yuv420_10bit_plane(plane: &SourcePlane, channel: Channel, subsampling: u32) -> bool {
    plane.channel == channel
        && plane.layout.allocated_depth == 16
        && plane.layout.bit_depth == 10
        && plane.layout.horiz_subsampling == subsampling
        && plane.layout.vert_subsampling == subsampling
}

impl PlanarLayout {
    /// 8-bit YUV 4:2:0: three planes in Y/Cb/Cr order, full-resolution luma,
    /// chroma decimated by 2 in both directions.
    pub fn is_yuv420(&self) -> bool {
        self.kind == LayoutKind::Yuv
            && self.planes.len() == 3
            && is_yuv420_plane(&self.planes[Y], Channel::Y, 1)
            && is_yuv420_plane(&self.planes[U], Channel::Cb, 2)
            && is_yuv420_plane(&self.planes[V], Channel::Cr, 2)
    }

    /// 10-bit-in-16 YUV 4:2:0 (the P010 sample family, packing unchecked).
    pub fn is_yuv420_10bit(&self) -> bool {
        self.kind == LayoutKind::Yuv
            && self.planes.len() == 3
            && is_yuv420_10bit_plane(&self.planes[Y], Channel::Y, 1)
            && is_yuv420_10bit_plane(&self.planes[U], Channel::Cb, 2)
            && is_yuv420_10bit_plane(&self.planes[V], Channel::Cr, 2)
    }

    /// Semiplanar YUV 4:2:0 with U stored before V in the shared chroma
    /// root.
    pub fn is_nv12(&self) -> bool {
        if !self.is_yuv420() {
            return false;
        }
        let (u, v) = (&self.planes[U], &self.planes[V]);

        self.root_planes == 2
            && u.layout.col_inc == 2
            && u.root_ix == U as u32
            && u.layout.offset == 0
            && v.layout.col_inc == 2
            && v.root_ix == U as u32
            && v.layout.offset == 1
    }

    /// Semiplanar YUV 4:2:0 with V stored before U in the shared chroma
    /// root.
    pub fn is_nv21(&self) -> bool {
        if !self.is_yuv420() {
            return false;
        }
        let (u, v) = (&self.planes[U], &self.planes[V]);

        self.root_planes == 2
            && u.layout.col_inc == 2
            && u.root_ix == V as u32
            && u.layout.offset == 1
            && v.layout.col_inc == 2
            && v.root_ix == V as u32
            && v.layout.offset == 0
    }

    /// Semiplanar 10-bit YUV 4:2:0 with 10 significant bits MSB-justified in
    /// 16-bit words.
    pub fn is_p010(&self) -> bool {
        if !self.is_yuv420_10bit() {
            return false;
        }
        let (y, u, v) = (&self.planes[Y], &self.planes[U], &self.planes[V]);

        self.root_planes == 2
            && u.layout.col_inc == 4
            && u.root_ix == U as u32
            && u.layout.offset == 0
            && v.layout.col_inc == 4
            && v.root_ix == U as u32
            && v.layout.offset == 2
            && y.layout.right_shift == 6
            && u.layout.right_shift == 6
            && v.layout.right_shift == 6
    }

    /// Fully planar YUV 4:2:0: three independently allocated planes, chroma
    /// samples packed at column stride 1.
    pub fn is_i420(&self) -> bool {
        if !self.is_yuv420() {
            return false;
        }
        let (u, v) = (&self.planes[U], &self.planes[V]);

        self.root_planes == 3
            && u.layout.col_inc == 1
            && u.root_ix == U as u32
            && u.layout.offset == 0
            && v.layout.col_inc == 1
            && v.root_ix == V as u32
            && v.layout.offset == 0
    }
}

impl ImageLayout {
    /// 8-bit YUV 4:2:0 in descriptor form.
    pub fn is_yuv420(&self) -> bool {
        self.kind == ImageKind::Yuv
            && self.num_planes == 3
            && self.bit_depth == 8
            && self.allocated_depth == 8
            && self.planes[Y].horiz_subsampling == 1
            && self.planes[Y].vert_subsampling == 1
            && self.planes[U].horiz_subsampling == 2
            && self.planes[U].vert_subsampling == 2
            && self.planes[V].horiz_subsampling == 2
            && self.planes[V].vert_subsampling == 2
    }

    /// Semiplanar descriptor with V one byte after U.
    pub fn is_nv12(&self) -> bool {
        self.is_yuv420()
            && self.planes[U].col_inc == 2
            && self.planes[V].col_inc == 2
            && self.planes[V].offset == self.planes[U].offset + 1
    }

    /// Semiplanar descriptor with U one byte after V.
    pub fn is_nv21(&self) -> bool {
        self.is_yuv420()
            && self.planes[U].col_inc == 2
            && self.planes[V].col_inc == 2
            && self.planes[U].offset == self.planes[V].offset + 1
    }

    /// Fully planar descriptor with the V plane after the U plane.
    pub fn is_i420(&self) -> bool {
        self.is_yuv420()
            && self.planes[U].col_inc == 1
            && self.planes[V].col_inc == 1
            && self.planes[V].offset > self.planes[U].offset
    }
}
