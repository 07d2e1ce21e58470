use std::time::Duration;

use cgmath::{Deg, Matrix4};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct State {
    /// Accumulated rotation in degrees, applied about both Y and X
    pub cube_rotation: f32,
}

impl State {
    /// Advances the rotation linearly with the elapsed wall-clock time.
    pub fn advance(&self, elapsed: Duration, degrees_per_second: f32) -> State {
        State {
            cube_rotation: self.cube_rotation + degrees_per_second * elapsed.as_secs_f32(),
        }
    }

    /// identity -> rotate about Y -> rotate about X
    pub fn model_matrix(&self) -> Matrix4<f32> {
        let angle = Deg(self.cube_rotation);
        Matrix4::from_angle_y(angle) * Matrix4::from_angle_x(angle)
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{SquareMatrix, Vector4};

    use super::*;

    fn assert_close(a: Vector4<f32>, b: Vector4<f32>) {
        let d = a - b;
        assert!(
            d.x.abs() < 1e-5 && d.y.abs() < 1e-5 && d.z.abs() < 1e-5 && d.w.abs() < 1e-5,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn one_second_is_forty_five_degrees() {
        let state = State::default().advance(Duration::from_secs(1), 45.0);
        assert!((state.cube_rotation - 45.0).abs() < 1e-5);
    }

    #[test]
    fn rotation_accumulates_across_frames() {
        let mut state = State::default();
        for _ in 0..8 {
            state = state.advance(Duration::from_millis(250), 45.0);
        }
        assert!((state.cube_rotation - 90.0).abs() < 1e-4);
    }

    #[test]
    fn rotation_never_decreases() {
        let mut state = State::default();
        let steps = [0, 1, 16, 0, 33, 250, 5, 1000];
        for ms in steps {
            let next = state.advance(Duration::from_millis(ms), 45.0);
            assert!(next.cube_rotation >= state.cube_rotation);
            state = next;
        }
    }

    #[test]
    fn zero_elapsed_leaves_angle_unchanged() {
        let state = State { cube_rotation: 12.5 };
        assert_eq!(state.advance(Duration::ZERO, 45.0), state);
    }

    #[test]
    fn initial_model_is_identity() {
        assert_eq!(State::default().model_matrix(), Matrix4::identity());
    }

    #[test]
    fn model_rotates_about_x_then_y() {
        let model = State { cube_rotation: 90.0 }.model_matrix();
        // X turns +Y into +Z, then Y turns +Z into +X
        assert_close(
            model * Vector4::new(0.0, 1.0, 0.0, 0.0),
            Vector4::new(1.0, 0.0, 0.0, 0.0),
        );
    }
}
