use cone_steering::types::{Frame, PixelFormat};

/// Neutral grey: zero saturation, matches no marker threshold.
pub const BACKGROUND: [u8; 3] = [128, 128, 128];
/// Pure blue, HSV (120, 255, 255).
pub const BLUE: [u8; 3] = [0, 0, 255];
/// Cone yellow, HSV (24, 255, 255).
pub const YELLOW: [u8; 3] = [255, 200, 0];

/// Side of a square blob whose cleaned contour area (167) falls inside the
/// default [130, 1000] marker filter.
pub const BLOB: usize = 14;

/// Uniform background RGB frame.
pub fn blank_frame(width: usize, height: usize) -> Frame {
    assert!(width > 0 && height > 0, "frame dimensions must be positive");
    let data = BACKGROUND.iter().copied().cycle().take(width * height * 3).collect();
    Frame::new(data, width, height, PixelFormat::Rgb8)
}

/// Paint an axis-aligned rectangle, clipped to the frame.
pub fn paint_rect(
    frame: &mut Frame,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    color: [u8; 3],
) {
    assert_eq!(frame.format, PixelFormat::Rgb8, "painter writes RGB frames only");
    for row in y..(y + height).min(frame.height) {
        for col in x..(x + width).min(frame.width) {
            let idx = (row * frame.width + col) * 3;
            frame.data[idx..idx + 3].copy_from_slice(&color);
        }
    }
}

/// Paint a `BLOB` x `BLOB` square whose centroid is (x0 + 6.5, y0 + 6.5).
pub fn paint_blob(frame: &mut Frame, x0: usize, y0: usize, color: [u8; 3]) {
    paint_rect(frame, x0, y0, BLOB, BLOB, color);
}

/// Same picture stored as 4-channel BGRA.
pub fn to_bgra(frame: &Frame) -> Frame {
    let mut data = Vec::with_capacity(frame.width * frame.height * 4);
    for px in frame.data.chunks_exact(3) {
        data.extend_from_slice(&[px[2], px[1], px[0], 255]);
    }
    Frame::new(data, frame.width, frame.height, PixelFormat::Bgra8)
}
