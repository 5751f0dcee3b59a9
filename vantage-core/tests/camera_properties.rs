use approx::assert_relative_eq;
use nalgebra::{Matrix3, Point3, Vector2, Vector3};
use proptest::prelude::*;
use vantage_core::{Camera, CameraError};

fn coordinate() -> impl Strategy<Value = f32> {
    -50.0f32..50.0
}

fn point() -> impl Strategy<Value = Point3<f32>> {
    (coordinate(), coordinate(), coordinate()).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

/// Position/target pairs whose direction is neither tiny nor close to vertical.
fn eye_and_target() -> impl Strategy<Value = (Point3<f32>, Point3<f32>)> {
    (point(), point()).prop_filter("non-degenerate direction", |(eye, target)| {
        let d = target - eye;
        d.norm() > 1e-2 && d.normalize().cross(&Vector3::y()).norm() > 1e-2
    })
}

proptest! {
    #[test]
    fn forward_is_unit_and_orthogonal_to_up((eye, target) in eye_and_target()) {
        let camera = Camera::perspective(vec![eye], vec![target], 45.0, 64, 64, 0.1, 100.0).unwrap();
        let pose = camera.pose().unwrap();
        prop_assert!((pose.forward.norm() - 1.0).abs() < 1e-5);
        prop_assert!((pose.up.norm() - 1.0).abs() < 1e-5);
        prop_assert!(pose.up.dot(pose.forward.as_ref()).abs() < 1e-5);
        prop_assert!(pose.right.dot(pose.forward.as_ref()).abs() < 1e-5);
    }

    #[test]
    fn view_rotation_is_orthonormal((eye, target) in eye_and_target(), width in 1u32..4096, height in 1u32..4096) {
        let mut camera = Camera::perspective(vec![eye], vec![target], 60.0, 640, 480, 0.1, 100.0).unwrap();
        camera.update_matrices(width, height).unwrap();
        let r: Matrix3<f32> = camera.view_matrix().fixed_view::<3, 3>(0, 0).clone_owned();
        let product = r * r.transpose();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                prop_assert!((product[(i, j)] - expected).abs() < 1e-5);
            }
        }
        prop_assert!((r.determinant() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn projections_are_finite(fov in 1.0f32..179.0, width in 1u32..8192, height in 1u32..8192) {
        let mut camera = Camera::perspective(
            vec![Point3::new(0.0, 0.0, 5.0)],
            vec![Point3::origin()],
            fov,
            100,
            100,
            0.1,
            100.0,
        )
        .unwrap();
        camera.update_matrices(width, height).unwrap();
        prop_assert!(camera.projection_matrix().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn arbitrary_perspective_inputs_never_leak_non_finite_matrices(
        eye in any::<[f32; 3]>(),
        target in any::<[f32; 3]>(),
        near in any::<f32>(),
        far in any::<f32>(),
    ) {
        let camera = Camera::perspective(vec![Point3::from(eye)], vec![Point3::from(target)], 45.0, 64, 48, near, far);
        if let Ok(mut camera) = camera {
            if camera.update_matrices(64, 48).is_ok() {
                prop_assert!(camera.projection_matrix().iter().all(|v| v.is_finite()));
                prop_assert!(camera.view_matrix().iter().all(|v| v.is_finite()));
                prop_assert!(camera.view_projection_matrix().iter().all(|v| v.is_finite()));
            }
        }
    }

    #[test]
    fn arbitrary_weak_perspective_inputs_never_leak_non_finite_matrices(
        scale in any::<[f32; 2]>(),
        translation in any::<[f32; 2]>(),
        near in any::<f32>(),
        far in any::<f32>(),
    ) {
        let camera = Camera::weak_perspective(
            vec![Vector2::from(scale)],
            vec![Vector2::from(translation)],
            64,
            48,
            near,
            far,
        );
        match camera {
            Ok(mut camera) => {
                prop_assert!(translation.iter().all(|v| v.is_finite()));
                if camera.update_matrices(32, 32).is_ok() {
                    prop_assert!(camera.projection_matrix().iter().all(|v| v.is_finite()));
                    prop_assert!(camera.view_projection_matrix().iter().all(|v| v.is_finite()));
                }
            }
            Err(err) => prop_assert!(err.is_configuration()),
        }
    }

    #[test]
    fn broadcast_target_for_every_frame(n in 2usize..12, frame_seed in 0usize..1000) {
        let positions = (0..n).map(|i| Point3::new(i as f32, 0.0, 10.0)).collect();
        let mut camera = Camera::perspective(positions, vec![Point3::origin()], 45.0, 8, 8, 0.1, 100.0).unwrap();
        let frame = frame_seed % n;
        camera.set_current_frame(frame).unwrap();
        prop_assert_eq!(camera.current_target(), Some(Point3::origin()));
        prop_assert_eq!(camera.current_position(), Some(Point3::new(frame as f32, 0.0, 10.0)));
    }
}

#[test]
fn scenario_camera_looking_at_origin() {
    let mut camera = Camera::perspective(
        vec![Point3::new(0.0, 0.0, 5.0)],
        vec![Point3::origin()],
        45.0,
        100,
        100,
        0.1,
        100.0,
    )
    .unwrap();
    camera.update_matrices(100, 100).unwrap();

    let pose = camera.pose().unwrap();
    assert_relative_eq!(pose.forward.into_inner(), Vector3::new(0.0, 0.0, -1.0));
    assert_relative_eq!(camera.view_matrix()[(2, 3)], -5.0, epsilon = 1e-6);

    let f = 1.0 / (22.5f32.to_radians()).tan();
    assert_relative_eq!(camera.projection_matrix()[(0, 0)], f, epsilon = 1e-5);
    assert_relative_eq!(camera.projection_matrix()[(1, 1)], f, epsilon = 1e-5);
}

#[test]
fn ninety_degree_projection_has_unit_focal_terms() {
    let mut camera = Camera::perspective(
        vec![Point3::new(1.0, 1.0, 1.0)],
        vec![Point3::origin()],
        90.0,
        10,
        10,
        0.1,
        100.0,
    )
    .unwrap();
    camera.update_matrices(512, 512).unwrap();
    assert_relative_eq!(camera.projection_matrix()[(0, 0)], 1.0, epsilon = 1e-6);
    assert_relative_eq!(camera.projection_matrix()[(1, 1)], 1.0, epsilon = 1e-6);
}

#[test]
fn per_frame_targets_follow_index() {
    let targets: Vec<_> = (0..5).map(|i| Point3::new(0.0, 0.0, -(i as f32))).collect();
    let mut camera = Camera::perspective(
        vec![Point3::new(3.0, 0.0, 3.0)],
        targets.clone(),
        45.0,
        10,
        10,
        0.1,
        100.0,
    )
    .unwrap();

    for (i, target) in targets.iter().enumerate() {
        camera.set_current_frame(i).unwrap();
        assert_eq!(camera.current_target(), Some(*target));
    }

    assert_eq!(
        camera.set_current_frame(5).unwrap_err(),
        CameraError::FrameOutOfRange { index: 5, n_frames: 5 }
    );
    assert_eq!(
        camera.set_current_frame_signed(-1).unwrap_err(),
        CameraError::FrameOutOfRange { index: -1, n_frames: 5 }
    );
    assert_eq!(camera.current_frame(), 4);
}

#[test]
fn weak_perspective_unit_aspect_keeps_scale() {
    let mut camera = Camera::weak_perspective(
        vec![Vector2::new(0.37, 1.91)],
        vec![Vector2::new(0.2, 0.1)],
        720,
        720,
        0.01,
        50.0,
    )
    .unwrap();
    camera.update_matrices(1080, 1080).unwrap();
    assert_eq!(camera.projection_matrix()[(0, 0)], 0.37);
    assert_eq!(camera.projection_matrix()[(1, 1)], 1.91);
}

#[test]
fn opencv_round_trip_reproduces_rotation() {
    let positions = vec![
        Point3::new(4.0, 2.0, 4.0),
        Point3::new(-2.0, 3.0, 5.0),
        Point3::new(0.5, -1.0, -6.0),
    ];
    let camera = Camera::perspective(positions, vec![Point3::new(0.0, 0.5, 0.0)], 50.0, 1920, 1080, 0.1, 100.0).unwrap();
    let cv = camera.to_opencv_camera().unwrap();

    for (frame, rt) in cv.extrinsics.iter().enumerate() {
        let mut rotation = rt.fixed_view::<3, 3>(0, 0).clone_owned();
        rotation.row_mut(1).neg_mut();
        rotation.row_mut(2).neg_mut();

        let view = camera.view_matrix_at(frame).unwrap();
        let original = view.fixed_view::<3, 3>(0, 0).clone_owned();
        assert_relative_eq!(rotation, original, epsilon = 1e-6);
    }
}
