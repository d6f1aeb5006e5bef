use crate::{
    Channel, ClientFormat, CopyError, GraphicView, ImageKind, ImageLayout, LayoutKind,
    MAX_PLANES, PlaneLayout, SourcePlane, copy,
};
use log::debug;

/// Everything that can go wrong when negotiating or using an image layout
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// The source view's structure is recognized but incompatible with the
    /// request (wrong plane count, depth mismatch, unsupported packing).
    #[error("invalid source layout: {0}")]
    Invalid(&'static str),

    /// The source view's structure is not recognized at all.
    #[error("unsupported source layout: {0}")]
    Unsupported(&'static str),

    /// A copy was requested before a back buffer was attached.
    #[error("no back buffer attached")]
    NoBackBuffer,

    #[error(transparent)]
    Copy(#[from] CopyError),
}

/// A back buffer that was refused because it cannot hold the image.
///
/// Carries the rejected allocation back to the caller; the converter's
/// attachment state is left unchanged.
#[derive(Debug, thiserror::Error)]
#[error("back buffer of {} bytes is smaller than the required {required}", .buffer.len())]
pub struct RejectedBackBuffer {
    pub required: usize,
    pub buffer: Vec<u8>,
}

/// Concrete YUV 4:2:0 packing the converter emits for a YUV source.
///
/// Each variant owns its descriptor geometry formula and its wrap
/// eligibility predicate, so adding a packing means adding one arm to each
/// match below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum YuvPacking {
    /// I420-style: three consecutive planes, chroma at column stride 1.
    Planar,
    /// NV12-style: one luma plane, one interleaved chroma root.
    SemiPlanar,
    /// 10-bit-in-16 semiplanar.
    P010,
    /// No dedicated geometry; fully planar following the source
    /// subsampling. Never wrap-eligible.
    Generic,
}

impl YuvPacking {
    fn select(
        client_format: ClientFormat,
        yuv420_888: bool,
        y: &SourcePlane,
        u: &SourcePlane,
        v: &SourcePlane,
    ) -> Self {
        use ClientFormat::*;

        let mut format = client_format;
        // A flexible request over a recognizable packed source is pinned to
        // the matching packed format. This only affects wrap eligibility;
        // the emitted sample values are the same either way.
        if yuv420_888 && client_format == Yuv420Flexible {
            if u.layout.col_inc == 2
                && v.layout.col_inc == 2
                && y.layout.row_inc == u.layout.row_inc
            {
                format = Yuv420PackedSemiPlanar;
            } else if u.layout.col_inc == 1
                && v.layout.col_inc == 1
                && y.layout.row_inc == u.layout.row_inc * 2
            {
                format = Yuv420PackedPlanar;
            }
        }

        match format {
            Yuv420Flexible | Yuv420Planar | Yuv420PackedPlanar => YuvPacking::Planar,
            Yuv420SemiPlanar | Yuv420PackedSemiPlanar => YuvPacking::SemiPlanar,
            YuvP010 => YuvPacking::P010,
            _ => YuvPacking::Generic,
        }
    }

    fn fill(
        self,
        layout: &mut ImageLayout,
        stride: usize,
        v_stride: usize,
        bps: usize,
        source: &[SourcePlane],
    ) {
        let depth = (layout.bit_depth, layout.allocated_depth);
        let size = stride * v_stride;

        match self {
            YuvPacking::Planar => {
                layout.planes[0] = image_plane(0, 1, stride as i32, (1, 1), depth);
                layout.planes[1] = image_plane(size, 1, stride as i32 / 2, (2, 2), depth);
                layout.planes[2] = image_plane(size * 5 / 4, 1, stride as i32 / 2, (2, 2), depth);
            }
            YuvPacking::SemiPlanar => {
                layout.planes[0] = image_plane(0, 1, stride as i32, (1, 1), depth);
                layout.planes[1] = image_plane(size, 2, stride as i32, (2, 2), depth);
                layout.planes[2] = image_plane(size + 1, 2, stride as i32, (2, 2), depth);
            }
            YuvPacking::P010 => {
                // stride is in bytes, so luma advances two bytes per sample
                layout.planes[0] = image_plane(0, 2, stride as i32, (1, 1), depth);
                layout.planes[1] = image_plane(size, 4, stride as i32, (2, 2), depth);
                layout.planes[2] = image_plane(size + 2, 4, stride as i32, (2, 2), depth);
            }
            YuvPacking::Generic => {
                let mut offset = 0usize;
                for (i, plane) in source.iter().enumerate().take(3) {
                    let geometry = &plane.layout;
                    let row_inc = stride * bps / geometry.horiz_subsampling as usize;
                    layout.planes[i] = image_plane(
                        offset,
                        bps as i32,
                        row_inc as i32,
                        (geometry.horiz_subsampling, geometry.vert_subsampling),
                        depth,
                    );
                    offset += row_inc * v_stride / geometry.vert_subsampling as usize;
                }
            }
        }
    }

    /// Strict structural check that the source already stores its samples
    /// exactly the way this packing describes them, making it safe to alias
    /// instead of copy.
    fn wrap_eligible(
        self,
        yuv420_888: bool,
        y: &SourcePlane,
        u: &SourcePlane,
        v: &SourcePlane,
    ) -> bool {
        match self {
            YuvPacking::Planar => {
                yuv420_888
                    && u.layout.col_inc == 1
                    && v.layout.col_inc == 1
                    && y.layout.row_inc == u.layout.row_inc * 2
                    && y.base < u.base
                    && u.base < v.base
            }
            YuvPacking::SemiPlanar => {
                yuv420_888
                    && u.layout.col_inc == 2
                    && v.layout.col_inc == 2
                    && y.layout.row_inc == u.layout.row_inc
                    && y.base < u.base
                    && u.base < v.base
            }
            YuvPacking::P010 => {
                [y, u, v].iter().all(|plane| {
                    plane.layout.allocated_depth == 16
                        && plane.layout.bit_depth == 10
                        && plane.layout.right_shift == 6
                }) && y.layout.horiz_subsampling == 1
                    && y.layout.vert_subsampling == 1
                    && u.layout.horiz_subsampling == 2
                    && u.layout.vert_subsampling == 2
                    && v.layout.horiz_subsampling == 2
                    && v.layout.vert_subsampling == 2
                    && y.layout.col_inc == 2
                    && u.layout.col_inc == 4
                    && v.layout.col_inc == 4
                    && y.layout.row_inc == u.layout.row_inc
                    && y.layout.row_inc == v.layout.row_inc
            }
            YuvPacking::Generic => false,
        }
    }
}

fn image_plane(
    offset: usize,
    col_inc: i32,
    row_inc: i32,
    subsampling: (u32, u32),
    depth: (u32, u32),
) -> PlaneLayout {
    let (bit_depth, allocated_depth) = depth;

    PlaneLayout {
        offset,
        col_inc,
        row_inc,
        horiz_subsampling: subsampling.0,
        vert_subsampling: subsampling.1,
        allocated_depth,
        bit_depth,
        right_shift: allocated_depth.saturating_sub(bit_depth),
        endianness: crate::Endianness::Native,
    }
}

/// Source planes forming the flexible 8-bit YUV 4:2:0 shape: packed luma,
/// chroma decimated by 2 with matching row strides.
fn is_yuv420_888(y: &SourcePlane, u: &SourcePlane, v: &SourcePlane) -> bool {
    y.layout.horiz_subsampling == 1
        && y.layout.vert_subsampling == 1
        && u.layout.horiz_subsampling == 2
        && u.layout.vert_subsampling == 2
        && v.layout.horiz_subsampling == 2
        && v.layout.vert_subsampling == 2
        && [y, u, v]
            .iter()
            .all(|plane| plane.layout.allocated_depth == 8 && plane.layout.bit_depth == 8)
        && y.layout.col_inc == 1
        && u.layout.row_inc == v.layout.row_inc
}

/// Negotiates an [`ImageLayout`] between a source [`GraphicView`] and a
/// requested client color format, deciding whether the source memory can be
/// exposed zero-copy or must be copied into a back buffer.
///
/// Construction performs the whole negotiation; a constructed converter is
/// fully validated and immutable apart from its back-buffer attachment
/// state. Every conversion gets its own converter, there is no internal
/// locking or retry.
pub struct LayoutConverter<'v, S> {
    view: &'v GraphicView<S>,
    client_format: ClientFormat,
    layout: ImageLayout,
    /// Byte range of the view buffer the descriptor aliases, if wrapping
    /// was negotiated.
    wrap: Option<(usize, usize)>,
    back_buffer_size: usize,
    back_buffer: Option<Vec<u8>>,
}

impl<'v, S: AsRef<[u8]>> LayoutConverter<'v, S> {
    pub fn new(
        view: &'v GraphicView<S>,
        client_format: ClientFormat,
        force_copy: bool,
    ) -> Result<Self, LayoutError> {
        let source = view.layout();
        let planes = &source.planes;
        let Some(first) = planes.first() else {
            debug!("converter: source view has no planes");
            return Err(LayoutError::Invalid("source view has no planes"));
        };

        let allocated_depth = first.layout.allocated_depth;
        let bit_depth = first.layout.bit_depth;
        let bps = allocated_depth.div_ceil(8) as usize;
        let crop = view.crop();

        // align to 2 so the half-resolution chroma planes land on whole
        // sample boundaries
        let stride = crop.width.next_multiple_of(2) as usize * bps;
        let v_stride = crop.height.next_multiple_of(2) as usize;

        let mut layout = ImageLayout {
            kind: ImageKind::Unknown,
            num_planes: planes.len() as u32,
            width: crop.width,
            height: crop.height,
            bit_depth,
            allocated_depth,
            planes: [PlaneLayout::EMPTY; MAX_PLANES],
        };
        let mut try_wrapping = !force_copy;

        match source.kind {
            LayoutKind::Yuv => {
                layout.kind = ImageKind::Yuv;
                if planes.len() != 3 {
                    debug!("converter: {} planes for a YUV layout", planes.len());
                    return Err(LayoutError::Unsupported(
                        "YUV layouts must have exactly 3 planes",
                    ));
                }
                if let Some(client_depth) = client_format.implied_bit_depth()
                    && client_depth != bit_depth
                {
                    debug!(
                        "converter: client format implies {client_depth}-bit samples, \
                         source stores {bit_depth}-bit"
                    );
                    return Err(LayoutError::Invalid("client and source bit depth differ"));
                }

                let (y, u, v) = (&planes[0], &planes[1], &planes[2]);
                if y.channel != Channel::Y || u.channel != Channel::Cb || v.channel != Channel::Cr {
                    return Err(LayoutError::Invalid("planes are not in Y/Cb/Cr order"));
                }

                let yuv420_888 = is_yuv420_888(y, u, v);
                let packing = YuvPacking::select(client_format, yuv420_888, y, u, v);
                debug!(
                    "converter: client_fmt={client_format:?} packing={packing:?} \
                     y={{colInc={} rowInc={}}} u={{colInc={} rowInc={}}} v={{colInc={} rowInc={}}}",
                    y.layout.col_inc,
                    y.layout.row_inc,
                    u.layout.col_inc,
                    u.layout.row_inc,
                    v.layout.col_inc,
                    v.layout.row_inc,
                );
                packing.fill(&mut layout, stride, v_stride, bps, planes);
                if try_wrapping {
                    try_wrapping = packing.wrap_eligible(yuv420_888, y, u, v);
                }
            }
            LayoutKind::Yuva => {
                debug!("converter: alpha-carrying YUV layout");
                return Err(LayoutError::Unsupported("alpha-carrying YUV layouts"));
            }
            LayoutKind::Rgb => {
                layout.kind = ImageKind::Rgb;
                // Interleaved RGB output geometry is not derived; the
                // descriptor carries only type and dimensions unless the
                // source gets wrapped below.
                match client_format {
                    ClientFormat::Surface
                    | ClientFormat::RgbFlexible
                    | ClientFormat::Rgb888
                    | ClientFormat::Bgr888 => {}
                    _ => {
                        debug!("converter: client_fmt={client_format:?} for an RGB layout");
                        return Err(LayoutError::Invalid(
                            "unrecognized client format for an RGB layout",
                        ));
                    }
                }
                if planes.len() != 3 {
                    return Err(LayoutError::Invalid("RGB layouts must have exactly 3 planes"));
                }
            }
            LayoutKind::Rgba => {
                layout.kind = ImageKind::Rgba;
                match client_format {
                    ClientFormat::Surface
                    | ClientFormat::RgbaFlexible
                    | ClientFormat::Abgr8888
                    | ClientFormat::Argb8888
                    | ClientFormat::Bgra8888 => {}
                    _ => {
                        debug!("converter: client_fmt={client_format:?} for an RGBA layout");
                        return Err(LayoutError::Invalid(
                            "unrecognized client format for an RGBA layout",
                        ));
                    }
                }
                if planes.len() != 4 {
                    return Err(LayoutError::Invalid("RGBA layouts must have exactly 4 planes"));
                }
            }
            LayoutKind::Unknown => {
                if planes.len() != 1 {
                    debug!("converter: unrecognized {}-plane layout", planes.len());
                    return Err(LayoutError::Unsupported("multi-plane layout of unknown type"));
                }
                let geometry = &planes[0].layout;
                if geometry.col_inc < 0 || geometry.row_inc < 0 {
                    // A reverse-order walk cannot be aliased, only copied
                    try_wrapping = false;
                }
                layout.planes[0] = PlaneLayout {
                    offset: 0,
                    col_inc: geometry.col_inc.abs(),
                    row_inc: geometry.row_inc.abs(),
                    ..*geometry
                };
            }
        }

        let wrap = if try_wrapping {
            try_wrap(view, &mut layout, bps)
        } else {
            None
        };

        let mut required = 0usize;
        for plane in planes {
            let geometry = &plane.layout;
            if !geometry.msb_justified() {
                debug!("converter: right shift of {} unsupported", geometry.right_shift);
                return Err(LayoutError::Invalid(
                    "only MSB-justified sample packing is supported",
                ));
            }
            if geometry.allocated_depth > 8 && !geometry.endianness.is_native() {
                debug!("converter: endianness {:?} unsupported", geometry.endianness);
                return Err(LayoutError::Invalid(
                    "multi-byte samples must use native endianness",
                ));
            }
            if geometry.allocated_depth != allocated_depth || geometry.bit_depth != bit_depth {
                debug!("converter: per-plane depths differ");
                return Err(LayoutError::Invalid(
                    "planes disagree on allocated or bit depth",
                ));
            }
            // stride is in bytes
            required += stride * v_stride
                / geometry.vert_subsampling as usize
                / geometry.horiz_subsampling as usize;
        }

        Ok(Self {
            view,
            client_format,
            layout,
            wrap,
            back_buffer_size: required,
            back_buffer: None,
        })
    }

    /// The negotiated layout description.
    pub fn image_layout(&self) -> &ImageLayout {
        &self.layout
    }

    pub fn client_format(&self) -> ClientFormat {
        self.client_format
    }

    /// Bytes a back buffer must hold to receive the copied image.
    pub fn required_capacity(&self) -> usize {
        self.back_buffer_size
    }

    /// The zero-copy byte span over the source memory, if wrapping was
    /// negotiated and no back buffer has been attached since.
    pub fn wrapped(&self) -> Option<&[u8]> {
        if self.back_buffer.is_some() {
            return None;
        }
        let (offset, len) = self.wrap?;
        Some(&self.view.bytes()[offset..offset + len])
    }

    /// Whether the source memory must be copied to honor the negotiated
    /// layout.
    pub fn needs_copy(&self) -> bool {
        self.wrap.is_none()
    }

    /// Attach a caller-allocated back buffer for the copy path.
    ///
    /// A buffer smaller than [`required_capacity`](Self::required_capacity)
    /// is handed back untouched and a previously attached buffer stays
    /// attached.
    pub fn set_back_buffer(&mut self, buffer: Vec<u8>) -> Result<(), RejectedBackBuffer> {
        if buffer.len() < self.back_buffer_size {
            return Err(RejectedBackBuffer {
                required: self.back_buffer_size,
                buffer,
            });
        }
        self.back_buffer = Some(buffer);
        Ok(())
    }

    /// The attached back buffer's bytes.
    pub fn back_buffer(&self) -> Option<&[u8]> {
        self.back_buffer.as_deref()
    }

    /// Detach and return the back buffer, typically after a copy.
    pub fn take_back_buffer(&mut self) -> Option<Vec<u8>> {
        self.back_buffer.take()
    }

    /// Copy the source view into the attached back buffer following the
    /// negotiated layout.
    pub fn copy_to_image(&mut self) -> Result<(), LayoutError> {
        let Some(buffer) = self.back_buffer.as_mut() else {
            return Err(LayoutError::NoBackBuffer);
        };
        copy::copy_to_image(buffer, &self.layout, self.view)?;
        Ok(())
    }
}

/// Try to alias the source memory directly: all planes must fall into one
/// contiguous span starting at plane 0 whose length does not exceed the
/// accumulated per-plane storage size.
///
/// The structural packing checks have already passed at this point; this is
/// the final guard against planes that match per-plane geometry but are not
/// actually adjacent in memory.
fn try_wrap<S: AsRef<[u8]>>(
    view: &GraphicView<S>,
    layout: &mut ImageLayout,
    bps: usize,
) -> Option<(usize, usize)> {
    let planes = &view.layout().planes;

    let mut min_offset = planes[0].base as isize;
    let mut max_offset = planes[0].base as isize;
    let mut plane_size = 0usize;
    for plane in planes {
        let geometry = &plane.layout;
        if geometry.col_inc == 0 {
            return None;
        }
        let cols = view.width() / geometry.horiz_subsampling;
        let rows = view.height() / geometry.vert_subsampling;
        let start = plane.base as isize + geometry.min_sample_offset(cols, rows);
        let end = plane.base as isize + geometry.max_sample_offset(cols, rows);
        min_offset = min_offset.min(start);
        max_offset = max_offset.max(end);

        let row_samples = (geometry.row_inc / geometry.col_inc).unsigned_abs() as usize;
        plane_size += row_samples * bps * view.height().next_multiple_of(64) as usize
            / geometry.vert_subsampling as usize;
    }

    if min_offset != planes[0].base as isize || (max_offset - min_offset) as usize > plane_size {
        return None;
    }

    for (i, plane) in planes.iter().enumerate() {
        layout.planes[i] = PlaneLayout {
            offset: (plane.base as isize - min_offset) as usize,
            ..plane.layout
        };
    }
    let len = (max_offset - min_offset) as usize;
    debug!("converter: wrapped (len={len})");
    Some((min_offset as usize, len))
}
