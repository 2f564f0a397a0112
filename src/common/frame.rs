use chrono::{DateTime, Utc};
use image::DynamicImage;
use std::sync::Arc;
use uuid::Uuid;

/// One captured camera image. Produced and discarded every cycle.
#[derive(Clone)]
pub struct Frame {
    device_id: Uuid,
    image: Arc<DynamicImage>,
    captured_at: DateTime<Utc>,
    frame_id: Uuid,
}

impl Frame {
    pub fn new(
        device_id: Uuid,
        image: DynamicImage,
        captured_at: DateTime<Utc>,
        frame_id: Uuid,
    ) -> Self {
        Self {
            device_id,
            image: Arc::new(image),
            captured_at,
            frame_id,
        }
    }

    pub fn capture(device_id: Uuid, image: DynamicImage) -> Self {
        Self::new(device_id, image, Utc::now(), Uuid::new_v4())
    }

    pub fn device_id(&self) -> Uuid {
        self.device_id
    }

    pub fn frame_id(&self) -> Uuid {
        self.frame_id
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Selfie view: the same frame flipped left to right.
    pub fn mirrored(&self) -> Self {
        Self {
            device_id: self.device_id,
            image: Arc::new(self.image.fliph()),
            captured_at: self.captured_at,
            frame_id: self.frame_id,
        }
    }

    /// Column range `[x, x + width)` as its own frame, keeping the frame's identity.
    pub fn crop_columns(&self, x: u32, width: u32) -> Self {
        Self {
            device_id: self.device_id,
            image: Arc::new(self.image.crop_imm(x, 0, width, self.height())),
            captured_at: self.captured_at,
            frame_id: self.frame_id,
        }
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("device_id", &self.device_id)
            .field("frame_id", &self.frame_id)
            .field("size", &(self.width(), self.height()))
            .field("captured_at", &self.captured_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, RgbImage};

    fn frame_from(image: RgbImage) -> Frame {
        Frame::new(
            Uuid::new_v4(),
            DynamicImage::ImageRgb8(image),
            Utc::now(),
            Uuid::new_v4(),
        )
    }

    #[test]
    fn cloning_frame_shares_image_buffer() {
        let f1 = frame_from(ImageBuffer::from_pixel(16, 16, Rgb([1, 2, 3])));
        let f2 = f1.clone();
        assert!(Arc::ptr_eq(&f1.image, &f2.image));
    }

    #[test]
    fn mirrored_swaps_columns_and_keeps_identity() {
        let mut image = RgbImage::from_pixel(4, 2, Rgb([0, 0, 0]));
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        let frame = frame_from(image);

        let mirrored = frame.mirrored();

        let rgb = mirrored.image().to_rgb8();
        assert_eq!(rgb.get_pixel(3, 0), &Rgb([255, 0, 0]));
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(mirrored.frame_id(), frame.frame_id());
        assert_eq!(mirrored.width(), 4);
    }

    #[test]
    fn crop_columns_takes_right_half() {
        let mut image = RgbImage::from_pixel(8, 2, Rgb([0, 0, 0]));
        image.put_pixel(4, 1, Rgb([9, 9, 9]));
        let frame = frame_from(image);

        let right = frame.crop_columns(4, 4);

        assert_eq!((right.width(), right.height()), (4, 2));
        assert_eq!(right.image().to_rgb8().get_pixel(0, 1), &Rgb([9, 9, 9]));
    }
}
