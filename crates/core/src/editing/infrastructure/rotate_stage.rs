use ndarray::s;

use crate::editing::domain::edit_parameters::Rotation;
use crate::editing::domain::frame_stage::FrameStage;
use crate::shared::frame::Frame;

/// Rotates frames by a quarter-turn multiple. 90 and 270 swap width and height.
pub struct RotateStage {
    rotation: Rotation,
}

impl RotateStage {
    pub fn new(rotation: Rotation) -> Self {
        Self { rotation }
    }
}

impl FrameStage for RotateStage {
    fn name(&self) -> &'static str {
        "rotate"
    }

    fn apply(&self, frame: Frame) -> Result<Frame, Box<dyn std::error::Error>> {
        if self.rotation == Rotation::None || frame.is_empty() {
            return Ok(frame);
        }

        let view = frame.as_ndarray();
        // View axes are (row, col, channel).
        let rotated = match self.rotation {
            Rotation::Clockwise90 => view.permuted_axes([1, 0, 2]).slice_move(s![.., ..;-1, ..]),
            Rotation::CounterClockwise90 => {
                view.permuted_axes([1, 0, 2]).slice_move(s![..;-1, .., ..])
            }
            Rotation::Rotate180 => view.slice_move(s![..;-1, ..;-1, ..]),
            Rotation::None => view,
        };

        let (height, width, channels) = rotated.dim();
        let data: Vec<u8> = rotated.iter().copied().collect();
        Ok(Frame::new(
            data,
            width as u32,
            height as u32,
            channels as u8,
            frame.index(),
        ))
    }

    fn output_size(&self, input: (u32, u32)) -> (u32, u32) {
        self.rotation.rotated_size(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// 3x2 single-channel frame:
    /// ```text
    /// 1 2 3
    /// 4 5 6
    /// ```
    fn sample() -> Frame {
        Frame::new(vec![1, 2, 3, 4, 5, 6], 3, 2, 1, 9)
    }

    fn rotate(frame: Frame, degrees: i32) -> Frame {
        RotateStage::new(Rotation::from_degrees(degrees))
            .apply(frame)
            .unwrap()
    }

    #[test]
    fn test_clockwise_90() {
        let out = rotate(sample(), 90);
        assert_eq!(out.dimensions(), (2, 3));
        assert_eq!(out.data(), &[4, 1, 5, 2, 6, 3]);
        assert_eq!(out.index(), 9);
    }

    #[test]
    fn test_rotate_180() {
        let out = rotate(sample(), 180);
        assert_eq!(out.dimensions(), (3, 2));
        assert_eq!(out.data(), &[6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_counter_clockwise_90() {
        let out = rotate(sample(), 270);
        assert_eq!(out.dimensions(), (2, 3));
        assert_eq!(out.data(), &[3, 6, 2, 5, 1, 4]);
    }

    #[rstest]
    #[case(0)]
    #[case(45)]
    #[case(-90)]
    fn test_other_angles_are_noop(#[case] degrees: i32) {
        assert_eq!(rotate(sample(), degrees), sample());
    }

    #[rstest]
    #[case(90, (480, 640))]
    #[case(180, (640, 480))]
    #[case(270, (480, 640))]
    #[case(0, (640, 480))]
    fn test_dimension_table(#[case] degrees: i32, #[case] expected: (u32, u32)) {
        let stage = RotateStage::new(Rotation::from_degrees(degrees));
        let out = stage.apply(Frame::filled(640, 480, [1, 2, 3], 0)).unwrap();
        assert_eq!(out.dimensions(), expected);
        assert_eq!(stage.output_size((640, 480)), expected);
    }

    #[test]
    fn test_keeps_pixels_intact_across_channels() {
        // 2x1 RGB: red then blue.
        let frame = Frame::new(vec![255, 0, 0, 0, 0, 255], 2, 1, 3, 0);
        let out = rotate(frame, 90);
        assert_eq!(out.dimensions(), (1, 2));
        assert_eq!(out.data(), &[255, 0, 0, 0, 0, 255]);
    }

    #[test]
    fn test_four_quarter_turns_are_identity() {
        let stage = RotateStage::new(Rotation::Clockwise90);
        let mut frame = sample();
        for _ in 0..4 {
            frame = stage.apply(frame).unwrap();
        }
        assert_eq!(frame, sample());
    }

    #[test]
    fn test_clockwise_then_counter_clockwise_is_identity() {
        let out = rotate(rotate(sample(), 90), 270);
        assert_eq!(out, sample());
    }
}
