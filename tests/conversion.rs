use planar_image::{
    ClientFormat, GraphicView, ImageLayout, LayoutConverter, PlanarLayout, copy_from_image,
    copy_to_image,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn random_buffer(len: usize, seed: u64) -> Vec<u8> {
    let mut buffer = vec![0u8; len];
    StdRng::seed_from_u64(seed).fill(buffer.as_mut_slice());
    buffer
}

fn nv21_image(width: u32, height: u32, stride: u32, v_stride: u32) -> ImageLayout {
    let mut layout = ImageLayout::yuv420_semiplanar(width, height, stride, v_stride);
    layout.planes[1].offset += 1;
    layout.planes[2].offset -= 1;
    assert!(layout.is_nv21());
    layout
}

/// Strip a source layout of its root-plane bookkeeping so the copy engine
/// cannot classify it and has to take the generic strided walk. The walk
/// geometry itself is untouched.
fn declassified(mut layout: PlanarLayout) -> PlanarLayout {
    layout.root_planes = 0;
    layout
}

#[test]
fn i420_round_trip_is_lossless() {
    for (width, height) in [(64u32, 64u32), (128, 96), (50, 30), (2, 2)] {
        let size = (width * height) as usize * 3 / 2;
        let source = GraphicView::new(
            random_buffer(size, u64::from(width)),
            PlanarLayout::yuv420_planar(width, height),
            width,
            height,
        )
        .unwrap();

        let mut converter =
            LayoutConverter::new(&source, ClientFormat::Yuv420Planar, true).unwrap();
        converter
            .set_back_buffer(vec![0u8; converter.required_capacity()])
            .unwrap();
        converter.copy_to_image().unwrap();
        let image = converter.take_back_buffer().unwrap();

        let mut restored = GraphicView::new(
            vec![0u8; size],
            PlanarLayout::yuv420_planar(width, height),
            width,
            height,
        )
        .unwrap();
        copy_from_image(&mut restored, &image, converter.image_layout()).unwrap();

        assert_eq!(restored.bytes(), source.bytes(), "{width}x{height}");
    }
}

#[test]
fn exact_capacity_back_buffer_is_sufficient() {
    // Any overrun of the computed capacity would show up as an out of
    // bounds error (or panic) during the copy.
    let cases = [
        (PlanarLayout::yuv420_semiplanar(64, 64, false), ClientFormat::Yuv420SemiPlanar),
        (PlanarLayout::yuv420_semiplanar(64, 64, true), ClientFormat::Yuv420Planar),
        (PlanarLayout::yuv420_planar(64, 64), ClientFormat::Yuv420Flexible),
    ];

    for (layout, client_format) in cases {
        let source =
            GraphicView::new(random_buffer(6144, 99), layout, 64, 64).unwrap();
        let mut converter = LayoutConverter::new(&source, client_format, true).unwrap();

        assert_eq!(converter.required_capacity(), 6144);
        converter.set_back_buffer(vec![0u8; 6144]).unwrap();
        converter.copy_to_image().unwrap();
    }
}

#[test]
fn required_capacity_matches_the_plane_sum() {
    let p010 = GraphicView::new(
        vec![0u8; 128 * 64 * 3 / 2],
        PlanarLayout::p010(128, 64),
        64,
        64,
    )
    .unwrap();
    let converter = LayoutConverter::new(&p010, ClientFormat::YuvP010, true).unwrap();

    // stride 128 bytes: 8192 luma + 2 * 2048 chroma
    assert_eq!(converter.required_capacity(), 8192 + 2048 + 2048);
}

#[test]
fn specialized_and_generic_paths_agree() {
    let size = 64 * 64 * 3 / 2;

    let cases: [(fn() -> PlanarLayout, ImageLayout); 4] = [
        (
            || PlanarLayout::yuv420_semiplanar(64, 64, false),
            ImageLayout::yuv420_semiplanar(64, 64, 64, 64),
        ),
        (
            || PlanarLayout::yuv420_semiplanar(64, 64, false),
            ImageLayout::yuv420_planar(64, 64, 64, 64),
        ),
        (
            || PlanarLayout::yuv420_semiplanar(64, 64, false),
            nv21_image(64, 64, 64, 64),
        ),
        (
            || PlanarLayout::yuv420_planar(64, 64),
            nv21_image(64, 64, 64, 64),
        ),
    ];

    for (source_layout, image_layout) in cases {
        let bytes = random_buffer(size, 7);

        let fast_view = GraphicView::new(bytes.clone(), source_layout(), 64, 64).unwrap();
        let mut fast = vec![0u8; size];
        copy_to_image(&mut fast, &image_layout, &fast_view).unwrap();

        let generic_view =
            GraphicView::new(bytes, declassified(source_layout()), 64, 64).unwrap();
        let mut generic = vec![0u8; size];
        copy_to_image(&mut generic, &image_layout, &generic_view).unwrap();

        assert_eq!(fast, generic);
    }
}

#[test]
fn converted_semiplanar_image_is_planar_sample_for_sample() {
    let size = 64 * 64 * 3 / 2;
    let source = GraphicView::new(
        random_buffer(size, 42),
        PlanarLayout::yuv420_semiplanar(64, 64, false),
        64,
        64,
    )
    .unwrap();

    let mut converter = LayoutConverter::new(&source, ClientFormat::Yuv420Planar, false).unwrap();
    assert!(converter.needs_copy());
    converter.set_back_buffer(vec![0u8; converter.required_capacity()]).unwrap();
    converter.copy_to_image().unwrap();

    let layout = converter.image_layout().clone();
    assert!(layout.is_i420());
    let image = converter.take_back_buffer().unwrap();
    let bytes = source.bytes();

    for row in 0..32usize {
        for col in 0..32usize {
            let u = image[layout.planes[1].offset + row * layout.planes[1].row_inc as usize + col];
            let v = image[layout.planes[2].offset + row * layout.planes[2].row_inc as usize + col];
            assert_eq!(u, bytes[4096 + row * 64 + col * 2]);
            assert_eq!(v, bytes[4096 + row * 64 + col * 2 + 1]);
        }
    }
}

#[test]
fn wrapped_view_needs_no_back_buffer() {
    let size = 64 * 64 * 3 / 2;
    let bytes = random_buffer(size, 5);
    let source = GraphicView::new(
        bytes.clone(),
        PlanarLayout::yuv420_semiplanar(64, 64, false),
        64,
        64,
    )
    .unwrap();

    let converter = LayoutConverter::new(&source, ClientFormat::Yuv420Flexible, false).unwrap();

    // The wrap is the source memory itself, interpreted through the
    // descriptor.
    assert_eq!(converter.wrapped().unwrap(), bytes.as_slice());
    let layout = converter.image_layout();
    assert_eq!(layout.planes[1].offset, 4096);
    assert_eq!(layout.planes[2].offset, 4097);
}
