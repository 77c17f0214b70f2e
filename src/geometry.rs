//! Oriented box fitting and reconstruction.
//!
//! `fit_oriented_box` recovers center, extent and rotation from four corner
//! points by principal-axis analysis: the corners are centered, their 2x2
//! covariance matrix is eigendecomposed and the dominant eigenvector gives the
//! box's width axis. `reconstruct_polygon` is the inverse: it rotates an
//! axis-aligned rectangle about the origin and translates it to the center.
use nalgebra::{Matrix2, Rotation2, SymmetricEigen, Vector2};

use crate::config::HeightExtent;
use crate::types::{BoxGeometry, Polygon, Vertex};

const EIGEN_EPS: f64 = f64::EPSILON;
const EIGEN_MAX_ITER: usize = 64;

/// Fit an oriented box to four points using the legacy half-extent height.
pub fn fit_oriented_box(polygon: &Polygon) -> BoxGeometry {
    fit_oriented_box_with(polygon, HeightExtent::Half)
}

/// Fit an oriented box to four points in any order.
///
/// Width is the full spread along the principal axis. Height follows
/// `extent`: [`HeightExtent::Half`] keeps only the largest projection onto the
/// minor axis, [`HeightExtent::Full`] uses max minus min like the width.
/// Degenerate inputs (collinear or coincident points) yield zero-sized boxes;
/// non-finite inputs yield non-finite output.
pub fn fit_oriented_box_with(polygon: &Polygon, extent: HeightExtent) -> BoxGeometry {
    let n = polygon.len() as f64;
    let (sum_x, sum_y) = polygon
        .iter()
        .fold((0.0, 0.0), |(sx, sy), v| (sx + v.x, sy + v.y));
    let center = Vector2::new(sum_x / n, sum_y / n);

    let centered: Vec<Vector2<f64>> = polygon
        .iter()
        .map(|v| Vector2::new(v.x, v.y) - center)
        .collect();

    // Sample covariance (n - 1); the scale does not affect the axes.
    let mut cov = Matrix2::zeros();
    for d in &centered {
        cov += d * d.transpose();
    }
    cov /= n - 1.0;

    let Some((major, minor)) = principal_axes(cov) else {
        return BoxGeometry {
            center_x: center.x,
            center_y: center.y,
            width: f64::NAN,
            height: f64::NAN,
            angle_degrees: f64::NAN,
        };
    };

    let along: Vec<f64> = centered.iter().map(|d| d.dot(&major)).collect();
    let across: Vec<f64> = centered.iter().map(|d| d.dot(&minor)).collect();

    let width = max_of(&along) - min_of(&along);
    let height = match extent {
        HeightExtent::Half => max_of(&across),
        HeightExtent::Full => max_of(&across) - min_of(&across),
    };

    BoxGeometry {
        center_x: center.x,
        center_y: center.y,
        width,
        height,
        // + 0.0 folds a negative zero so it never prints as "-0.000000"
        angle_degrees: major.y.atan2(major.x).to_degrees() + 0.0,
    }
}

/// Corners of `geometry` in top-left, top-right, bottom-right, bottom-left order.
pub fn reconstruct_polygon(geometry: &BoxGeometry) -> Polygon {
    let half_w = geometry.width / 2.0;
    let half_h = geometry.height / 2.0;
    let rotation = Rotation2::new(geometry.angle_degrees.to_radians());
    let center = Vector2::new(geometry.center_x, geometry.center_y);

    let offsets = [
        Vector2::new(-half_w, -half_h),
        Vector2::new(half_w, -half_h),
        Vector2::new(half_w, half_h),
        Vector2::new(-half_w, half_h),
    ];

    offsets.map(|offset| {
        let p = rotation * offset + center;
        Vertex::new(p.x, p.y)
    })
}

/// Returns the (major, minor) unit axes of a symmetric 2x2 matrix.
///
/// The minor axis is the major axis turned by +90°, so the pair always forms
/// a right-handed frame. On equal eigenvalues the first eigenvector is major.
fn principal_axes(cov: Matrix2<f64>) -> Option<(Vector2<f64>, Vector2<f64>)> {
    if !cov.iter().all(|v| v.is_finite()) {
        return None;
    }
    let eig = SymmetricEigen::try_new(cov, EIGEN_EPS, EIGEN_MAX_ITER)?;
    let values = eig.eigenvalues;

    let major_idx = if values[1] > values[0] { 1 } else { 0 };
    let major = canonical_sign(eig.eigenvectors.column(major_idx).into_owned());
    let minor = Vector2::new(-major.y, major.x);
    Some((major, minor))
}

// Eigenvector signs are arbitrary; pin the major one so angles are reproducible.
fn canonical_sign(v: Vector2<f64>) -> Vector2<f64> {
    if v.x < 0.0 || (v.x == 0.0 && v.y < 0.0) {
        -v
    } else {
        v
    }
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn rotated_rect(cx: f64, cy: f64, w: f64, h: f64, angle_deg: f64) -> Polygon {
        reconstruct_polygon(&BoxGeometry {
            center_x: cx,
            center_y: cy,
            width: w,
            height: h,
            angle_degrees: angle_deg,
        })
    }

    #[test]
    fn axis_aligned_rectangle_reports_half_height() {
        let polygon = [
            Vertex::new(5.0, 10.0),
            Vertex::new(25.0, 10.0),
            Vertex::new(25.0, 20.0),
            Vertex::new(5.0, 20.0),
        ];
        let g = fit_oriented_box(&polygon);
        assert!(approx_eq(g.center_x, 15.0));
        assert!(approx_eq(g.center_y, 15.0));
        assert!(approx_eq(g.width, 20.0));
        assert!(approx_eq(g.height, 5.0));
        assert!(approx_eq(g.angle_degrees, 0.0));
    }

    #[test]
    fn full_extent_reports_whole_height() {
        let polygon = [
            Vertex::new(5.0, 10.0),
            Vertex::new(25.0, 10.0),
            Vertex::new(25.0, 20.0),
            Vertex::new(5.0, 20.0),
        ];
        let g = fit_oriented_box_with(&polygon, HeightExtent::Full);
        assert!(approx_eq(g.width, 20.0));
        assert!(approx_eq(g.height, 10.0));
    }

    #[test]
    fn vertex_order_does_not_matter() {
        let ordered = rotated_rect(40.0, 30.0, 30.0, 8.0, 20.0);
        let shuffled = [ordered[2], ordered[0], ordered[3], ordered[1]];
        let a = fit_oriented_box(&ordered);
        let b = fit_oriented_box(&shuffled);
        assert!(approx_eq(a.center_x, b.center_x));
        assert!(approx_eq(a.width, b.width));
        assert!(approx_eq(a.height, b.height));
        assert!(approx_eq(a.angle_degrees, b.angle_degrees));
    }

    #[test]
    fn rotated_rectangle_recovers_angle() {
        let polygon = rotated_rect(100.0, 50.0, 40.0, 10.0, 30.0);
        let g = fit_oriented_box(&polygon);
        assert!(approx_eq(g.center_x, 100.0));
        assert!(approx_eq(g.center_y, 50.0));
        assert!(approx_eq(g.width, 40.0));
        assert!(approx_eq(g.height, 5.0));
        assert!(approx_eq(g.angle_degrees, 30.0));
    }

    #[test]
    fn angle_is_folded_into_right_half_plane() {
        let polygon = rotated_rect(0.0, 0.0, 40.0, 10.0, 120.0);
        let g = fit_oriented_box(&polygon);
        assert!(approx_eq(g.angle_degrees, -60.0));
        assert!(approx_eq(g.width, 40.0));
    }

    #[test]
    fn collinear_points_give_zero_height() {
        let polygon = [
            Vertex::new(0.0, 0.0),
            Vertex::new(1.0, 1.0),
            Vertex::new(2.0, 2.0),
            Vertex::new(3.0, 3.0),
        ];
        let g = fit_oriented_box(&polygon);
        assert!(approx_eq(g.width, 3.0 * 2f64.sqrt()));
        assert!(g.height.abs() < 1e-9);
        assert!(approx_eq(g.angle_degrees, 45.0));
    }

    #[test]
    fn coincident_points_give_empty_box() {
        let polygon = [Vertex::new(5.0, 5.0); 4];
        let g = fit_oriented_box(&polygon);
        assert!(approx_eq(g.center_x, 5.0));
        assert!(approx_eq(g.center_y, 5.0));
        assert_eq!(g.width, 0.0);
        assert_eq!(g.height, 0.0);
        assert!(g.angle_degrees.is_finite());
    }

    #[test]
    fn nan_input_propagates() {
        let mut polygon = rotated_rect(0.0, 0.0, 4.0, 2.0, 0.0);
        polygon[1].x = f64::NAN;
        let g = fit_oriented_box(&polygon);
        assert!(g.width.is_nan());
        assert!(g.center_x.is_nan());
    }

    #[test]
    fn asymmetric_height_is_stable_under_small_rotations() {
        let kite = [
            Vertex::new(-10.0, 0.0),
            Vertex::new(10.0, 0.0),
            Vertex::new(0.0, 9.0),
            Vertex::new(0.0, -1.0),
        ];
        for angle in [-0.01f64, 0.0, 0.01] {
            let (sin, cos) = angle.to_radians().sin_cos();
            let rotated =
                kite.map(|v| Vertex::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos));
            let g = fit_oriented_box(&rotated);
            assert!(
                (g.height - 7.0).abs() < 1e-6,
                "height {} at {}°",
                g.height,
                angle
            );
            assert!((g.width - 20.0).abs() < 1e-6);
            assert!((g.angle_degrees - angle).abs() < 1e-6);
        }
    }

    #[test]
    fn reconstruct_quarter_turn() {
        let corners = rotated_rect(0.0, 0.0, 4.0, 2.0, 90.0);
        let expected = [(1.0, -2.0), (1.0, 2.0), (-1.0, 2.0), (-1.0, -2.0)];
        for (v, (x, y)) in corners.iter().zip(expected) {
            assert!(approx_eq(v.x, x), "x {} != {}", v.x, x);
            assert!(approx_eq(v.y, y), "y {} != {}", v.y, y);
        }
    }
}
