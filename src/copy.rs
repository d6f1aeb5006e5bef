//! Plane copy engine.
//!
//! Transfers pixel data between a [`GraphicView`] and a flat byte buffer
//! described by an [`ImageLayout`], in either direction. Recognized YUV
//! 4:2:0 family pairs (NV12/NV21/I420 on both sides) take a row-blit fast
//! path; everything else goes through a fully generic strided walk. Both
//! paths produce byte-identical sample data.
//!
//! All validation happens before the first byte is written: a failed copy
//! leaves the destination untouched.

use crate::{GraphicView, ImageLayout, PlanarLayout};

/// Everything that can go wrong during a plane copy
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error(
        "view crop is {view_width}x{view_height} but the image layout is {image_width}x{image_height}"
    )]
    DimensionMismatch {
        view_width: u32,
        view_height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("view has {view} planes, image layout describes {image}")]
    PlaneCountMismatch { view: usize, image: usize },

    #[error("plane {plane}: subsampling differs between the view and the image layout")]
    SubsamplingMismatch { plane: usize },

    #[error("plane {plane}: allocated depth differs between the view and the image layout")]
    DepthMismatch { plane: usize },

    #[error("plane {plane}: only MSB-justified sample packing is supported")]
    UnsupportedPacking { plane: usize },

    #[error("plane {plane}: multi-byte samples must use native endianness")]
    UnsupportedEndianness { plane: usize },

    #[error("image buffer holds {len} bytes, plane {plane} addresses bytes {start}..{end}")]
    ImageOutOfBounds {
        plane: usize,
        start: isize,
        end: isize,
        len: usize,
    },
}

/// Signed walk geometry of one plane inside a flat buffer.
#[derive(Debug, Clone, Copy)]
struct PlaneWalk {
    base: isize,
    col_inc: isize,
    row_inc: isize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Yuv420Family {
    Nv12,
    Nv21,
    I420,
}

/// Copy all planes of `view` into the byte buffer described by `layout`.
pub fn copy_to_image<S: AsRef<[u8]>>(
    image: &mut [u8],
    layout: &ImageLayout,
    view: &GraphicView<S>,
) -> Result<(), CopyError> {
    let bps = validate(view, layout, image.len())?;

    run(
        image,
        &image_walks(layout),
        image_family(layout),
        view.bytes(),
        &view_walks(view.layout()),
        view_family(view.layout()),
        layout,
        bps,
    );
    Ok(())
}

/// Copy the byte buffer described by `layout` back into the planes of
/// `view`.
pub fn copy_from_image<S: AsRef<[u8]> + AsMut<[u8]>>(
    view: &mut GraphicView<S>,
    image: &[u8],
    layout: &ImageLayout,
) -> Result<(), CopyError> {
    let bps = validate(view, layout, image.len())?;
    let dst_walks = view_walks(view.layout());
    let dst_family = view_family(view.layout());

    run(
        view.bytes_mut(),
        &dst_walks,
        dst_family,
        image,
        &image_walks(layout),
        image_family(layout),
        layout,
        bps,
    );
    Ok(())
}

/// Upfront validation shared by both directions. Returns the bytes per
/// sample. Nothing may be written before this passes.
fn validate<S: AsRef<[u8]>>(
    view: &GraphicView<S>,
    layout: &ImageLayout,
    image_len: usize,
) -> Result<usize, CopyError> {
    let crop = view.crop();
    if crop.width != layout.width || crop.height != layout.height {
        return Err(CopyError::DimensionMismatch {
            view_width: crop.width,
            view_height: crop.height,
            image_width: layout.width,
            image_height: layout.height,
        });
    }

    let view_planes = &view.layout().planes;
    let image_planes = layout.planes();
    if view_planes.len() != image_planes.len() {
        return Err(CopyError::PlaneCountMismatch {
            view: view_planes.len(),
            image: image_planes.len(),
        });
    }

    let bps = layout.allocated_depth.div_ceil(8) as usize;
    for (plane, (view_plane, image_plane)) in view_planes.iter().zip(image_planes).enumerate() {
        let geometry = &view_plane.layout;
        if geometry.horiz_subsampling != image_plane.horiz_subsampling
            || geometry.vert_subsampling != image_plane.vert_subsampling
        {
            return Err(CopyError::SubsamplingMismatch { plane });
        }
        if geometry.allocated_depth != layout.allocated_depth {
            return Err(CopyError::DepthMismatch { plane });
        }
        if !geometry.msb_justified() {
            return Err(CopyError::UnsupportedPacking { plane });
        }
        if bps > 1 && !geometry.endianness.is_native() {
            return Err(CopyError::UnsupportedEndianness { plane });
        }

        // The view's walk was bounds-checked at construction; the image
        // buffer is checked here.
        let cols = layout.width / image_plane.horiz_subsampling;
        let rows = layout.height / image_plane.vert_subsampling;
        let start = image_plane.offset as isize + image_plane.min_sample_offset(cols, rows);
        let end = image_plane.offset as isize + image_plane.max_sample_offset(cols, rows);
        if start < 0 || end as usize > image_len {
            return Err(CopyError::ImageOutOfBounds {
                plane,
                start,
                end,
                len: image_len,
            });
        }
    }

    Ok(bps)
}

fn view_walks(layout: &PlanarLayout) -> Vec<PlaneWalk> {
    layout
        .planes
        .iter()
        .map(|plane| PlaneWalk {
            base: plane.base as isize,
            col_inc: plane.layout.col_inc as isize,
            row_inc: plane.layout.row_inc as isize,
        })
        .collect()
}

fn image_walks(layout: &ImageLayout) -> Vec<PlaneWalk> {
    layout
        .planes()
        .iter()
        .map(|plane| PlaneWalk {
            base: plane.offset as isize,
            col_inc: plane.col_inc as isize,
            row_inc: plane.row_inc as isize,
        })
        .collect()
}

/// Fast-path classification of a source view layout.
///
/// Stricter than the bare classifier: the blit routines additionally rely on
/// a packed luma plane and, for semiplanar chroma, on the two half planes
/// actually sharing one root row walk.
fn view_family(layout: &PlanarLayout) -> Option<Yuv420Family> {
    if layout.planes.len() != 3 || layout.planes[0].layout.col_inc != 1 {
        return None;
    }
    let (u, v) = (&layout.planes[1], &layout.planes[2]);

    if layout.is_i420() {
        Some(Yuv420Family::I420)
    } else if layout.is_nv12()
        && v.base == u.base + 1
        && u.layout.row_inc == v.layout.row_inc
    {
        Some(Yuv420Family::Nv12)
    } else if layout.is_nv21()
        && u.base == v.base + 1
        && u.layout.row_inc == v.layout.row_inc
    {
        Some(Yuv420Family::Nv21)
    } else {
        None
    }
}

fn image_family(layout: &ImageLayout) -> Option<Yuv420Family> {
    if layout.num_planes != 3 || layout.planes[0].col_inc != 1 {
        return None;
    }
    let (u, v) = (&layout.planes[1], &layout.planes[2]);

    if layout.is_i420() {
        Some(Yuv420Family::I420)
    } else if layout.is_nv12() && u.row_inc == v.row_inc {
        Some(Yuv420Family::Nv12)
    } else if layout.is_nv21() && u.row_inc == v.row_inc {
        Some(Yuv420Family::Nv21)
    } else {
        None
    }
}

#[allow(clippy::too_many_arguments)]
fn run(
    dst: &mut [u8],
    dst_walks: &[PlaneWalk],
    dst_family: Option<Yuv420Family>,
    src: &[u8],
    src_walks: &[PlaneWalk],
    src_family: Option<Yuv420Family>,
    layout: &ImageLayout,
    bps: usize,
) {
    if let (Some(src_family), Some(dst_family)) = (src_family, dst_family)
        && layout.width % 2 == 0
        && layout.height % 2 == 0
    {
        blit_yuv420(
            dst,
            dst_walks,
            dst_family,
            src,
            src_walks,
            src_family,
            layout.width as usize,
            layout.height as usize,
        );
        return;
    }

    generic_copy(dst, dst_walks, src, src_walks, layout, bps);
}

/// Specialized blit between two recognized YUV 4:2:0 layouts.
///
/// Luma is always a straight row copy. Matching chroma arrangements are row
/// copies as well (one interleaved root row for semiplanar, two half-width
/// rows for planar); a cross-family pair walks U and V samples through each
/// side's own column stride, which performs the interleave, de-interleave or
/// swap implicitly.
#[allow(clippy::too_many_arguments)]
fn blit_yuv420(
    dst: &mut [u8],
    dst_walks: &[PlaneWalk],
    dst_family: Yuv420Family,
    src: &[u8],
    src_walks: &[PlaneWalk],
    src_family: Yuv420Family,
    width: usize,
    height: usize,
) {
    use Yuv420Family::*;

    copy_rows(dst, dst_walks[0], src, src_walks[0], width, height);

    let half_w = width / 2;
    let half_h = height / 2;
    match (src_family, dst_family) {
        (I420, I420) => {
            copy_rows(dst, dst_walks[1], src, src_walks[1], half_w, half_h);
            copy_rows(dst, dst_walks[2], src, src_walks[2], half_w, half_h);
        }
        (Nv12, Nv12) | (Nv21, Nv21) => {
            // One interleaved chroma root, full-width rows
            let root = if src_family == Nv12 { 1 } else { 2 };
            copy_rows(dst, dst_walks[root], src, src_walks[root], width, half_h);
        }
        _ => {
            copy_chroma_pair(
                dst,
                dst_walks[1],
                dst_walks[2],
                src,
                src_walks[1],
                src_walks[2],
                half_w,
                half_h,
            );
        }
    }
}

fn copy_rows(
    dst: &mut [u8],
    dst_walk: PlaneWalk,
    src: &[u8],
    src_walk: PlaneWalk,
    row_bytes: usize,
    rows: usize,
) {
    for row in 0..rows {
        let d = (dst_walk.base + row as isize * dst_walk.row_inc) as usize;
        let s = (src_walk.base + row as isize * src_walk.row_inc) as usize;
        dst[d..d + row_bytes].copy_from_slice(&src[s..s + row_bytes]);
    }
}

/// Copy the U and V half planes sample by sample through each side's own
/// column stride.
#[allow(clippy::too_many_arguments)]
fn copy_chroma_pair(
    dst: &mut [u8],
    dst_u: PlaneWalk,
    dst_v: PlaneWalk,
    src: &[u8],
    src_u: PlaneWalk,
    src_v: PlaneWalk,
    half_w: usize,
    half_h: usize,
) {
    for row in 0..half_h {
        let row = row as isize;
        let du = dst_u.base + row * dst_u.row_inc;
        let dv = dst_v.base + row * dst_v.row_inc;
        let su = src_u.base + row * src_u.row_inc;
        let sv = src_v.base + row * src_v.row_inc;

        for x in 0..half_w as isize {
            dst[(du + x * dst_u.col_inc) as usize] = src[(su + x * src_u.col_inc) as usize];
            dst[(dv + x * dst_v.col_inc) as usize] = src[(sv + x * src_v.col_inc) as usize];
        }
    }
}

/// Generic strided fallback: per plane, one bulk copy when both sides are
/// packed identically, a row copy when both sides are row-contiguous, and a
/// sample walk otherwise.
fn generic_copy(
    dst: &mut [u8],
    dst_walks: &[PlaneWalk],
    src: &[u8],
    src_walks: &[PlaneWalk],
    layout: &ImageLayout,
    bps: usize,
) {
    for (plane, (d, s)) in dst_walks.iter().zip(src_walks).enumerate() {
        let geometry = &layout.planes[plane];
        let plane_w = (layout.width / geometry.horiz_subsampling) as usize;
        let plane_h = (layout.height / geometry.vert_subsampling) as usize;
        let row_bytes = plane_w * bps;

        let row_contiguous = s.col_inc == bps as isize && d.col_inc == bps as isize;
        if row_contiguous && s.row_inc == d.row_inc && s.row_inc == row_bytes as isize {
            let db = d.base as usize;
            let sb = s.base as usize;
            dst[db..db + row_bytes * plane_h].copy_from_slice(&src[sb..sb + row_bytes * plane_h]);
        } else if row_contiguous {
            copy_rows(dst, *d, src, *s, row_bytes, plane_h);
        } else {
            for row in 0..plane_h as isize {
                let d_row = d.base + row * d.row_inc;
                let s_row = s.base + row * s.row_inc;
                for col in 0..plane_w as isize {
                    let di = (d_row + col * d.col_inc) as usize;
                    let si = (s_row + col * s.col_inc) as usize;
                    dst[di..di + bps].copy_from_slice(&src[si..si + bps]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlanarLayout;

    fn filled_view(layout: PlanarLayout, size: usize) -> GraphicView<Vec<u8>> {
        let buffer: Vec<u8> = (0..size).map(|i| (i * 7 + 13) as u8).collect();
        GraphicView::new(buffer, layout, 64, 64).unwrap()
    }

    fn run_both_paths(
        view: &GraphicView<Vec<u8>>,
        layout: &ImageLayout,
    ) -> (Vec<u8>, Vec<u8>) {
        let mut fast = vec![0u8; 64 * 64 * 2];
        copy_to_image(&mut fast, layout, view).unwrap();

        let mut generic = vec![0u8; 64 * 64 * 2];
        let bps = validate(view, layout, generic.len()).unwrap();
        generic_copy(
            &mut generic,
            &image_walks(layout),
            view.bytes(),
            &view_walks(view.layout()),
            layout,
            bps,
        );

        (fast, generic)
    }

    #[test]
    fn fast_paths_match_generic_walk() {
        let cases = [
            (PlanarLayout::yuv420_semiplanar(64, 64, false), ImageLayout::yuv420_semiplanar(64, 64, 64, 64)),
            (PlanarLayout::yuv420_semiplanar(64, 64, false), ImageLayout::yuv420_planar(64, 64, 64, 64)),
            (PlanarLayout::yuv420_semiplanar(64, 64, true), ImageLayout::yuv420_planar(64, 64, 64, 64)),
            (PlanarLayout::yuv420_planar(64, 64), ImageLayout::yuv420_semiplanar(64, 64, 64, 64)),
            (PlanarLayout::yuv420_planar(64, 64), ImageLayout::yuv420_planar(64, 64, 64, 64)),
        ];

        for (view_layout, image_layout) in cases {
            let view = filled_view(view_layout, 64 * 64 * 3 / 2);
            let (fast, generic) = run_both_paths(&view, &image_layout);
            assert_eq!(fast, generic);
        }
    }

    #[test]
    fn semiplanar_order_swap_moves_chroma_bytes() {
        let size = 4 * 4 * 3 / 2;
        let buffer: Vec<u8> = (0..size as u8).collect();
        let view =
            GraphicView::new(buffer, PlanarLayout::yuv420_semiplanar(4, 4, false), 4, 4).unwrap();

        // NV12 -> NV21: U and V bytes trade places pairwise
        let layout = {
            let mut layout = ImageLayout::yuv420_semiplanar(4, 4, 4, 4);
            layout.planes[1].offset += 1;
            layout.planes[2].offset -= 1;
            layout
        };
        assert!(layout.is_nv21());

        let mut image = vec![0u8; size];
        copy_to_image(&mut image, &layout, &view).unwrap();

        assert_eq!(&image[..16], &view.bytes()[..16]);
        assert_eq!(image[16], view.bytes()[17]);
        assert_eq!(image[17], view.bytes()[16]);
        assert_eq!(image[22], view.bytes()[23]);
        assert_eq!(image[23], view.bytes()[22]);
    }

    #[test]
    fn dimension_mismatch_fails_before_writing() {
        let view = filled_view(PlanarLayout::yuv420_planar(64, 64), 64 * 64 * 3 / 2);
        let layout = ImageLayout::yuv420_planar(32, 32, 32, 32);

        let mut image = vec![0xAAu8; 64 * 64 * 2];
        let err = copy_to_image(&mut image, &layout, &view);
        assert!(matches!(err, Err(CopyError::DimensionMismatch { .. })));
        assert!(image.iter().all(|byte| *byte == 0xAA));
    }

    #[test]
    fn undersized_image_buffer_fails_before_writing() {
        let view = filled_view(PlanarLayout::yuv420_planar(64, 64), 64 * 64 * 3 / 2);
        let layout = ImageLayout::yuv420_planar(64, 64, 64, 64);

        let mut image = vec![0xAAu8; 64 * 64 * 3 / 2 - 1];
        let err = copy_to_image(&mut image, &layout, &view);
        assert!(matches!(err, Err(CopyError::ImageOutOfBounds { plane: 2, .. })));
        assert!(image.iter().all(|byte| *byte == 0xAA));
    }

    #[test]
    fn round_trips_through_image_buffer() {
        let view = filled_view(PlanarLayout::yuv420_semiplanar(64, 64, false), 64 * 64 * 3 / 2);
        let layout = ImageLayout::yuv420_planar(64, 64, 64, 64);

        let mut image = vec![0u8; 64 * 64 * 3 / 2];
        copy_to_image(&mut image, &layout, &view).unwrap();

        let mut back = GraphicView::new(
            vec![0u8; 64 * 64 * 3 / 2],
            PlanarLayout::yuv420_semiplanar(64, 64, false),
            64,
            64,
        )
        .unwrap();
        copy_from_image(&mut back, &image, &layout).unwrap();

        assert_eq!(back.bytes(), view.bytes());
    }
}
