use opencv::{
    core::{Mat, Point, Scalar},
    imgproc,
};

use crate::error::Result;
use crate::pose::FramePose;

/// マーカーを描く可視性の閾値
pub const VISIBILITY_THRESHOLD: f32 = 0.5;

/// キーポイントマーカーの半径（ピクセル）
const MARKER_RADIUS: i32 = 5;

/// 角度テキストの開始Y座標と行送り
const TEXT_ORIGIN_Y: i32 = 30;
const TEXT_LINE_STEP: i32 = 25;

fn overlay_color() -> Scalar {
    // BGRの緑
    Scalar::new(0.0, 255.0, 0.0, 0.0)
}

/// フレームに姿勢の注釈を描いたコピーを返す
///
/// 可視性が閾値を超えるキーポイントへ塗りつぶし円を描き、左上から
/// 1行ずつ角度名と値を重ねる。未検出フレームは無加工のコピーを返す。
pub fn draw_pose(frame: &Mat, pose: &FramePose) -> Result<Mat> {
    if !pose.detected {
        return Ok(frame.clone());
    }

    let mut annotated = frame.clone();

    for kp in &pose.keypoints {
        if kp.visibility > VISIBILITY_THRESHOLD {
            imgproc::circle(
                &mut annotated,
                Point::new(kp.x as i32, kp.y as i32),
                MARKER_RADIUS,
                overlay_color(),
                imgproc::FILLED,
                imgproc::LINE_8,
                0,
            )?;
        }
    }

    let mut y_offset = TEXT_ORIGIN_Y;
    for (kind, degrees) in pose.angles.iter() {
        let text = format!("{}: {:.1} deg", kind.name(), degrees);
        imgproc::put_text(
            &mut annotated,
            &text,
            Point::new(10, y_offset),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.6,
            overlay_color(),
            2,
            imgproc::LINE_8,
            false,
        )?;
        y_offset += TEXT_LINE_STEP;
    }

    Ok(annotated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{LandmarkIndex, NormalizedLandmark};
    use opencv::core::{Vec3b, CV_8UC3};
    use opencv::prelude::*;

    fn black_frame(width: i32, height: i32) -> Mat {
        Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(0.0)).unwrap()
    }

    #[test]
    fn test_undetected_returns_plain_copy() {
        let frame = black_frame(640, 480);
        let out = draw_pose(&frame, &FramePose::default()).unwrap();

        assert_eq!(out.rows(), 480);
        assert_eq!(out.cols(), 640);
        let px = out.at_2d::<Vec3b>(240, 320).unwrap();
        assert_eq!(px[1], 0);
    }

    #[test]
    fn test_markers_drawn_on_copy() {
        let landmarks = [NormalizedLandmark {
            x: 0.5,
            y: 0.5,
            z: 0.0,
            visibility: 1.0,
        }; LandmarkIndex::COUNT];
        let pose = FramePose::from_landmarks(&landmarks, 640, 480);

        let frame = black_frame(640, 480);
        let out = draw_pose(&frame, &pose).unwrap();

        // フレーム中央のマーカーが緑で塗られている
        let px = out.at_2d::<Vec3b>(240, 320).unwrap();
        assert_eq!(px[1], 255);

        // 元のフレームは変更されない
        let original = frame.at_2d::<Vec3b>(240, 320).unwrap();
        assert_eq!(original[1], 0);
    }

    #[test]
    fn test_low_visibility_draws_no_marker() {
        let landmarks = [NormalizedLandmark {
            x: 0.5,
            y: 0.5,
            z: 0.0,
            visibility: 0.2,
        }; LandmarkIndex::COUNT];
        let pose = FramePose::from_landmarks(&landmarks, 640, 480);

        let out = draw_pose(&black_frame(640, 480), &pose).unwrap();
        let px = out.at_2d::<Vec3b>(240, 320).unwrap();
        assert_eq!(px[1], 0);
    }
}
