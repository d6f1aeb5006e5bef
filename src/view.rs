use crate::{Channel, Endianness, PlaneLayout, Rect};

/// Layout family of a source view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    Yuv,
    Yuva,
    Rgb,
    Rgba,
    Unknown,
}

/// One plane of a [`GraphicView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePlane {
    /// Color channel this plane carries.
    pub channel: Channel,
    /// Index of the root plane the samples are allocated in. Interleaved
    /// chroma planes of a semiplanar layout share one root.
    pub root_ix: u32,
    /// Byte offset of the plane's first sample inside the view buffer.
    pub base: usize,
    /// Geometry of the samples. `layout.offset` is the byte offset inside
    /// the root plane (0 or 1 for semiplanar chroma, 0 or 2 for P010).
    pub layout: PlaneLayout,
}

/// Plane structure of a source view: layout family, plane list in channel
/// order (luma/red first) and the number of independently allocated root
/// planes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanarLayout {
    pub kind: LayoutKind,
    pub root_planes: u32,
    pub planes: Vec<SourcePlane>,
}

fn yuv_plane(
    channel: Channel,
    root_ix: u32,
    base: usize,
    offset: usize,
    col_inc: i32,
    row_inc: i32,
    subsampling: u32,
) -> SourcePlane {
    SourcePlane {
        channel,
        root_ix,
        base,
        layout: PlaneLayout {
            offset,
            col_inc,
            row_inc,
            horiz_subsampling: subsampling,
            vert_subsampling: subsampling,
            allocated_depth: 8,
            bit_depth: 8,
            right_shift: 0,
            endianness: Endianness::Native,
        },
    }
}

impl PlanarLayout {
    /// Fully planar 8-bit YUV 4:2:0 (I420): Y plane followed by U and V
    /// planes at half resolution, `stride` bytes between luma rows.
    pub fn yuv420_planar(stride: u32, v_stride: u32) -> Self {
        let stride = stride as usize;
        let v_stride = v_stride as usize;

        PlanarLayout {
            kind: LayoutKind::Yuv,
            root_planes: 3,
            planes: vec![
                yuv_plane(Channel::Y, 0, 0, 0, 1, stride as i32, 1),
                yuv_plane(Channel::Cb, 1, stride * v_stride, 0, 1, stride as i32 / 2, 2),
                yuv_plane(Channel::Cr, 2, stride * v_stride * 5 / 4, 0, 1, stride as i32 / 2, 2),
            ],
        }
    }

    /// Semiplanar 8-bit YUV 4:2:0: Y plane followed by one interleaved
    /// chroma root. `v_first` selects NV21 (V before U) over NV12.
    pub fn yuv420_semiplanar(stride: u32, v_stride: u32, v_first: bool) -> Self {
        let chroma = stride as usize * v_stride as usize;
        let stride = stride as i32;

        // The chroma root carries the index of the plane stored first.
        let (u, v) = if v_first {
            (
                yuv_plane(Channel::Cb, 2, chroma + 1, 1, 2, stride, 2),
                yuv_plane(Channel::Cr, 2, chroma, 0, 2, stride, 2),
            )
        } else {
            (
                yuv_plane(Channel::Cb, 1, chroma, 0, 2, stride, 2),
                yuv_plane(Channel::Cr, 1, chroma + 1, 1, 2, stride, 2),
            )
        };

        PlanarLayout {
            kind: LayoutKind::Yuv,
            root_planes: 2,
            planes: vec![yuv_plane(Channel::Y, 0, 0, 0, 1, stride, 1), u, v],
        }
    }

    /// Semiplanar 10-bit YUV 4:2:0 (P010): 10 significant bits MSB-justified
    /// in 16-bit words, interleaved chroma. `stride` is in bytes.
    pub fn p010(stride: u32, v_stride: u32) -> Self {
        let chroma = stride as usize * v_stride as usize;
        let stride = stride as i32;

        let p010_plane = |channel, base, offset, col_inc, subsampling| SourcePlane {
            channel,
            root_ix: if subsampling == 1 { 0 } else { 1 },
            base,
            layout: PlaneLayout {
                offset,
                col_inc,
                row_inc: stride,
                horiz_subsampling: subsampling,
                vert_subsampling: subsampling,
                allocated_depth: 16,
                bit_depth: 10,
                right_shift: 6,
                endianness: Endianness::Native,
            },
        };

        PlanarLayout {
            kind: LayoutKind::Yuv,
            root_planes: 2,
            planes: vec![
                p010_plane(Channel::Y, 0, 0, 2, 1),
                p010_plane(Channel::Cb, chroma, 0, 4, 2),
                p010_plane(Channel::Cr, chroma + 2, 2, 4, 2),
            ],
        }
    }

    /// A single 8-bit plane of unknown interpretation. Strides may be
    /// negative; `base` must then point at the logically first sample.
    pub fn single_plane(base: usize, col_inc: i32, row_inc: i32) -> Self {
        PlanarLayout {
            kind: LayoutKind::Unknown,
            root_planes: 1,
            planes: vec![SourcePlane {
                channel: Channel::Y,
                root_ix: 0,
                base,
                layout: PlaneLayout {
                    offset: 0,
                    col_inc,
                    row_inc,
                    horiz_subsampling: 1,
                    vert_subsampling: 1,
                    allocated_depth: 8,
                    bit_depth: 8,
                    right_shift: 0,
                    endianness: Endianness::Native,
                },
            }],
        }
    }
}

/// Everything that can go wrong when constructing a [`GraphicView`]
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("crop window goes out of the image bounds")]
    CropOutOfBounds,

    #[error("plane {plane} has a zero subsampling factor")]
    ZeroSubsampling { plane: usize },

    #[error("plane {plane} addresses bytes {start}..{end}, buffer holds {len}")]
    PlaneOutOfBounds {
        plane: usize,
        start: isize,
        end: isize,
        len: usize,
    },
}

/// A mapped multi-plane pixel buffer with explicit per-plane geometry.
///
/// The view does not own the mapping's lifetime semantics, only the bytes
/// handed to it; `S` is any byte-slice-like storage (`&[u8]`, `&mut [u8]`,
/// `Vec<u8>`). Construction validates that every plane's strided sample walk
/// over the crop window stays inside the buffer, so downstream code can
/// trust the geometry.
#[derive(Debug, Clone)]
pub struct GraphicView<S> {
    buffer: S,
    layout: PlanarLayout,
    width: u32,
    height: u32,
    crop: Rect,
}

impl<S: AsRef<[u8]>> GraphicView<S> {
    pub fn new(buffer: S, layout: PlanarLayout, width: u32, height: u32) -> Result<Self, ViewError> {
        let crop = Rect {
            x: 0,
            y: 0,
            width,
            height,
        };
        Self::with_crop(buffer, layout, width, height, crop)
    }

    pub fn with_crop(
        buffer: S,
        layout: PlanarLayout,
        width: u32,
        height: u32,
        crop: Rect,
    ) -> Result<Self, ViewError> {
        if crop.x + crop.width > width || crop.y + crop.height > height {
            return Err(ViewError::CropOutOfBounds);
        }

        let len = buffer.as_ref().len();
        for (i, plane) in layout.planes.iter().enumerate() {
            let geometry = &plane.layout;
            if geometry.horiz_subsampling == 0 || geometry.vert_subsampling == 0 {
                return Err(ViewError::ZeroSubsampling { plane: i });
            }

            let cols = crop.width / geometry.horiz_subsampling;
            let rows = crop.height / geometry.vert_subsampling;
            let start = plane.base as isize + geometry.min_sample_offset(cols, rows);
            let end = plane.base as isize + geometry.max_sample_offset(cols, rows);
            if start < 0 || end as usize > len {
                return Err(ViewError::PlaneOutOfBounds {
                    plane: i,
                    start,
                    end,
                    len,
                });
            }
        }

        Ok(Self {
            buffer,
            layout,
            width,
            height,
            crop,
        })
    }

    pub fn layout(&self) -> &PlanarLayout {
        &self.layout
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn crop(&self) -> Rect {
        self.crop
    }

    pub fn bytes(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    pub fn into_buffer(self) -> S {
        self.buffer
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> GraphicView<S> {
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        self.buffer.as_mut()
    }
}
