//! Draw-target seam between the core and a real rendering backend.
//!
//! The core never issues GPU calls; everything that wants to put pixels
//! somewhere goes through [`DrawTarget`]. The bundled [`SoftwareSurface`] is
//! a plain RGBA buffer used for offscreen compositing and headless tests.

use image::RgbaImage;

use crate::resource::ImageHandle;

/// Opaque surface the core draws into.
pub trait DrawTarget {
	/// Blits `image` with its top-left corner at (`x`, `y`).
	fn draw_image(&mut self, image: &ImageHandle, x: i32, y: i32);

	/// Blits `image` modulated by `alpha` (0.0 = invisible, 1.0 = opaque).
	fn draw_image_alpha(&mut self, image: &ImageHandle, x: i32, y: i32, alpha: f32);
}

/// CPU-side draw target backed by an RGBA pixel buffer.
pub struct SoftwareSurface {
	buffer: RgbaImage,
}

impl SoftwareSurface {
	/// Creates a transparent surface of the given size.
	pub fn new(width: u32, height: u32) -> Self {
		Self {
			buffer: RgbaImage::new(width, height),
		}
	}

	/// Consumes the surface and returns the pixel buffer.
	pub fn into_image(self) -> RgbaImage {
		self.buffer
	}

	/// Borrow of the pixel buffer.
	pub fn image(&self) -> &RgbaImage {
		&self.buffer
	}

	fn blit(&mut self, image: &ImageHandle, x: i32, y: i32, alpha: f32) {
		if alpha <= 0.0 {
			return;
		}
		let alpha = alpha.min(1.0);
		let (dw, dh) = (self.buffer.width() as i32, self.buffer.height() as i32);
		for (sx, sy, px) in image.pixels.enumerate_pixels() {
			let dx = x + sx as i32;
			let dy = y + sy as i32;
			if dx < 0 || dy < 0 || dx >= dw || dy >= dh {
				continue;
			}
			let src = px.0;
			let src_a = f32::from(src[3]) / 255.0 * alpha;
			if src_a <= 0.0 {
				continue;
			}
			let dst = self.buffer.get_pixel_mut(dx as u32, dy as u32);
			let dst_a = f32::from(dst.0[3]) / 255.0;
			let out_a = src_a + dst_a * (1.0 - src_a);
			if out_a <= 0.0 {
				continue;
			}
			for c in 0..3 {
				let s = f32::from(src[c]);
				let d = f32::from(dst.0[c]);
				dst.0[c] = ((s * src_a + d * dst_a * (1.0 - src_a)) / out_a) as u8;
			}
			dst.0[3] = (out_a * 255.0) as u8;
		}
	}
}

impl DrawTarget for SoftwareSurface {
	fn draw_image(&mut self, image: &ImageHandle, x: i32, y: i32) {
		self.blit(image, x, y, 1.0);
	}

	fn draw_image_alpha(&mut self, image: &ImageHandle, x: i32, y: i32, alpha: f32) {
		self.blit(image, x, y, alpha);
	}
}

#[cfg(test)]
pub(crate) mod testutil {
	//! A draw target that records calls instead of rasterizing.

	use super::*;

	/// One recorded draw call.
	#[derive(Debug, Clone, PartialEq)]
	pub struct DrawCall {
		pub image_id: u64,
		pub x: i32,
		pub y: i32,
		pub alpha: f32,
	}

	/// Records every draw for later assertions.
	#[derive(Default)]
	pub struct RecordingTarget {
		pub calls: Vec<DrawCall>,
	}

	impl DrawTarget for RecordingTarget {
		fn draw_image(&mut self, image: &ImageHandle, x: i32, y: i32) {
			self.calls.push(DrawCall {
				image_id: image.id,
				x,
				y,
				alpha: 1.0,
			});
		}

		fn draw_image_alpha(&mut self, image: &ImageHandle, x: i32, y: i32, alpha: f32) {
			self.calls.push(DrawCall {
				image_id: image.id,
				x,
				y,
				alpha,
			});
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use image::Rgba;

	use super::*;
	use crate::resource::ImageData;

	fn solid(id: u64, w: u32, h: u32, color: [u8; 4]) -> ImageHandle {
		let mut pixels = RgbaImage::new(w, h);
		for px in pixels.pixels_mut() {
			*px = Rgba(color);
		}
		Arc::new(ImageData {
			id,
			name: "solid".to_string(),
			pixels,
		})
	}

	#[test]
	fn opaque_blit_overwrites() {
		let mut surface = SoftwareSurface::new(4, 4);
		surface.draw_image(&solid(1, 2, 2, [200, 10, 10, 255]), 1, 1);
		assert_eq!(surface.image().get_pixel(1, 1).0, [200, 10, 10, 255]);
		assert_eq!(surface.image().get_pixel(0, 0).0, [0, 0, 0, 0]);
	}

	#[test]
	fn alpha_blit_modulates() {
		let mut surface = SoftwareSurface::new(2, 2);
		surface.draw_image_alpha(&solid(1, 2, 2, [100, 100, 100, 255]), 0, 0, 0.5);
		let px = surface.image().get_pixel(0, 0).0;
		assert_eq!(px[3], 127);
	}

	#[test]
	fn out_of_bounds_clipped() {
		let mut surface = SoftwareSurface::new(2, 2);
		surface.draw_image(&solid(1, 4, 4, [1, 2, 3, 255]), -2, -2);
		assert_eq!(surface.image().get_pixel(1, 1).0, [1, 2, 3, 255]);
	}
}
