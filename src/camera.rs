// Webcam preview behind the wall. Frames come out mirrored (so moving your
// hand right moves it right on screen) and scaled to the canvas, packed as
// 0x00RRGGBB for the window.

use ice_wall::error::Error;
use ice_wall::types::FrameBuffer;

use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
};

use image::RgbImage;
use image::imageops::{self, FilterType};

pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
}

impl CameraCapture {
    /// Open camera `index` asking for roughly `width` x `height`.
    pub fn new(index: u32, width: u32, height: u32) -> Result<Self, Error> {
        let fmt = CameraFormat::new(Resolution::new(width, height), FrameFormat::YUYV, 30);
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(CameraIndex::Index(index), req)
            .map_err(|e| Error::CameraInit(format!("create camera {index}: {e}")))?;
        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("open stream: {e}")))?;

        // The driver may pick a different mode than the one asked for.
        let actual = cam.resolution();
        Ok(Self { cam, width: actual.width(), height: actual.height() })
    }

    /// The resolution the camera is actually delivering; landmark coordinates
    /// from a model fed by this camera live in this space.
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Next frame, mirrored and scaled to `canvas_w` x `canvas_h`.
    /// Blocks until the camera has one.
    pub fn next_frame(&mut self, canvas_w: u32, canvas_h: u32) -> Result<FrameBuffer, Error> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("fetch frame: {e}")))?;
        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("decode rgb: {e}")))?;
        // Rebuild from raw bytes; nokhwa may link a different `image` release.
        let (w, h) = decoded.dimensions();
        let rgb = RgbImage::from_raw(w, h, decoded.into_raw())
            .ok_or_else(|| Error::CameraFrame(format!("short frame buffer for {w}x{h}")))?;

        Ok(to_canvas(&rgb, canvas_w, canvas_h))
    }
}

fn to_canvas(rgb: &RgbImage, canvas_w: u32, canvas_h: u32) -> FrameBuffer {
    let scaled = if rgb.dimensions() == (canvas_w, canvas_h) {
        rgb.clone()
    } else {
        imageops::resize(rgb, canvas_w, canvas_h, FilterType::Triangle)
    };
    let mirrored = imageops::flip_horizontal(&scaled);

    let pixels = mirrored
        .pixels()
        .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
        .collect();
    FrameBuffer { width: canvas_w as usize, height: canvas_h as usize, pixels }
}

/// Consecutive failed grabs. A flaky camera logs on the 1st, 2nd, 4th, 8th...
/// failure in a row rather than every frame.
#[derive(Debug, Default)]
pub struct GrabFailures {
    streak: u32,
}

impl GrabFailures {
    /// Count one failure; true when this one should be logged.
    pub fn fail(&mut self) -> bool {
        self.streak = self.streak.saturating_add(1);
        self.streak.is_power_of_two()
    }

    /// A good frame ends the streak; returns its length if there was one.
    pub fn recover(&mut self) -> Option<u32> {
        match std::mem::take(&mut self.streak) {
            0 => None,
            n => Some(n),
        }
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }
}
