//! Shape masks applied to decoded avatars by [`crate::HttpLoader`].

use image::imageops;
use image::{GrayImage, Luma, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

use crate::loader::Transform;

const OPAQUE: Luma<u8> = Luma([255]);

pub fn apply(image: RgbaImage, transform: Option<Transform>) -> RgbaImage {
    match transform {
        None => image,
        Some(Transform::CircleCrop) => circle_crop(image),
        Some(Transform::RoundedCorners { radius, margin }) => {
            rounded_corners(image, radius, margin)
        }
    }
}

/// Center-crop to a square and clear everything outside the inscribed circle
pub fn circle_crop(image: RgbaImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    let side = width.min(height);
    if side == 0 {
        return image;
    }

    let x = (width - side) / 2;
    let y = (height - side) / 2;
    let mut square = imageops::crop_imm(&image, x, y, side, side).to_image();

    let mut mask = GrayImage::new(side, side);
    let center = (side / 2) as i32;
    draw_filled_circle_mut(&mut mask, (center, center), center, OPAQUE);

    apply_mask(&mut square, &mask);
    square
}

/// Keep the image inside a rectangle inset by `margin` on every side, with
/// corners rounded to `radius`. Everything else becomes transparent.
pub fn rounded_corners(mut image: RgbaImage, radius: u32, margin: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut mask = GrayImage::new(width, height);

    let inner_width = width.saturating_sub(margin.saturating_mul(2));
    let inner_height = height.saturating_sub(margin.saturating_mul(2));

    if inner_width > 0 && inner_height > 0 {
        let radius = radius.min(inner_width / 2).min(inner_height / 2);
        let left = margin as i32;
        let top = margin as i32;
        let r = radius as i32;

        // Two overlapping bars cover everything but the four corner squares
        if inner_width > 2 * radius {
            draw_filled_rect_mut(
                &mut mask,
                Rect::at(left + r, top).of_size(inner_width - 2 * radius, inner_height),
                OPAQUE,
            );
        }
        if inner_height > 2 * radius {
            draw_filled_rect_mut(
                &mut mask,
                Rect::at(left, top + r).of_size(inner_width, inner_height - 2 * radius),
                OPAQUE,
            );
        }

        if radius > 0 {
            let right = left + inner_width as i32 - 1 - r;
            let bottom = top + inner_height as i32 - 1 - r;
            for center in [(left + r, top + r), (right, top + r), (left + r, bottom), (right, bottom)] {
                draw_filled_circle_mut(&mut mask, center, r, OPAQUE);
            }
        }
    }

    apply_mask(&mut image, &mask);
    image
}

fn apply_mask(image: &mut RgbaImage, mask: &GrayImage) {
    for (pixel, coverage) in image.pixels_mut().zip(mask.pixels()) {
        pixel[3] = ((u16::from(pixel[3]) * u16::from(coverage[0])) / 255) as u8;
    }
}
