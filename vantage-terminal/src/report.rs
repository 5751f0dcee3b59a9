/// Text and JSON output for the `matrices` and `export` commands
use nalgebra::{Dim, Matrix, RawStorage};
use serde_json::{json, Value};
use vantage_core::OpenCvCamera;

/// Rows of a matrix as nested vectors, row-major.
pub fn rows_of<R: Dim, C: Dim, S: RawStorage<f32, R, C>>(m: &Matrix<f32, R, C, S>) -> Vec<Vec<f32>> {
    (0..m.nrows())
        .map(|r| (0..m.ncols()).map(|c| m[(r, c)]).collect())
        .collect()
}

/// Titled, right-aligned, row-major dump of a matrix.
pub fn format_matrix<R: Dim, C: Dim, S: RawStorage<f32, R, C>>(
    title: &str,
    m: &Matrix<f32, R, C, S>,
) -> String {
    let mut out = format!("{}:\n", title);
    for row in rows_of(m) {
        let cells: Vec<String> = row.iter().map(|v| format!("{:>12.6}", v)).collect();
        out.push_str(&format!("  [{} ]\n", cells.join("")));
    }
    out
}

/// JSON document of an OpenCV calibration with row-major matrices.
pub fn opencv_json(camera: &OpenCvCamera) -> Value {
    let extrinsics: Vec<Value> = camera
        .extrinsics
        .iter()
        .map(|rt| {
            json!({
                "R": rows_of(&rt.fixed_view::<3, 3>(0, 0)),
                "t": rt.column(3).iter().copied().collect::<Vec<f32>>(),
            })
        })
        .collect();

    json!({
        "cols": camera.cols,
        "rows": camera.rows,
        "K": rows_of(&camera.k),
        "extrinsics": extrinsics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix4, Point3};
    use vantage_core::Camera;

    #[test]
    fn test_format_matrix_is_row_major() {
        let mut m = Matrix4::<f32>::identity();
        m[(0, 3)] = 7.5;
        let text = format_matrix("view", &m);
        let first_row = text.lines().nth(1).unwrap();
        assert!(first_row.trim_end().ends_with("7.500000 ]"));
        assert!(text.starts_with("view:\n"));
    }

    #[test]
    fn test_opencv_json_shape() {
        let camera = Camera::perspective(
            vec![Point3::new(0.0, 0.0, 5.0), Point3::new(1.0, 0.0, 5.0)],
            vec![Point3::origin()],
            45.0,
            320,
            240,
            0.1,
            100.0,
        )
        .unwrap();
        let value = opencv_json(&camera.to_opencv_camera().unwrap());
        assert_eq!(value["cols"], 320);
        assert_eq!(value["K"][0][2], 160.0);
        assert_eq!(value["extrinsics"].as_array().unwrap().len(), 2);
        assert_eq!(value["extrinsics"][0]["t"][2], 5.0);
    }
}
