//! Describe, negotiate and copy strided multi-planar pixel buffers.
//!
//! A [`GraphicView`] wraps an existing mapped buffer with explicit per-plane
//! geometry; [`LayoutConverter`] derives a declarative [`ImageLayout`] for a
//! requested [`ClientFormat`] and decides whether the source memory can be
//! exposed zero-copy or has to be copied into a back buffer; the copy
//! engine ([`copy_to_image`] / [`copy_from_image`]) moves the pixel data
//! with fast paths for the common packed YUV 4:2:0 layouts.

mod classify;
mod convert;
mod copy;
mod format;
mod image;
mod plane;
mod view;

pub use convert::{LayoutConverter, LayoutError, RejectedBackBuffer};
pub use copy::{CopyError, copy_from_image, copy_to_image};
pub use format::ClientFormat;
pub use image::{ImageKind, ImageLayout, MAX_PLANES};
pub use plane::{Channel, Endianness, PlaneLayout};
pub use view::{GraphicView, LayoutKind, PlanarLayout, SourcePlane, ViewError};

/// Pixel-space rectangle, used as the crop window of a [`GraphicView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}
