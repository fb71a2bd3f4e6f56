//! Pure placement arithmetic.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! A [`Placement`] names one of nine anchors on a canvas. Given the canvas
//! size and the size of the thing being placed, [`placement_coordinates`]
//! returns the top-left corner that puts the target flush against the named
//! edge(s) and centered along any free axis.
//!
//! ## Rounding
//!
//! Centering divides the leftover space by two. Odd leftovers are **floored**
//! (toward negative infinity), so an 801px canvas centers a 100px target at
//! `x = 350`, and a target wider than the canvas by an odd amount rounds
//! further left rather than toward zero.

use super::backend::Dimensions;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Horizontal half of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Left,
    Center,
    Right,
}

/// Vertical half of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Top,
    Mid,
    Bottom,
}

/// One of the nine anchor positions for relative placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Placement {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    MidLeft,
    MidCenter,
    MidRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Placement {
    /// Every anchor, row by row from the top-left.
    pub const ALL: [Placement; 9] = [
        Placement::TopLeft,
        Placement::TopCenter,
        Placement::TopRight,
        Placement::MidLeft,
        Placement::MidCenter,
        Placement::MidRight,
        Placement::BottomLeft,
        Placement::BottomCenter,
        Placement::BottomRight,
    ];

    /// Canonical kebab-case name, e.g. `"bottom-right"`.
    pub fn name(self) -> &'static str {
        match self {
            Placement::TopLeft => "top-left",
            Placement::TopCenter => "top-center",
            Placement::TopRight => "top-right",
            Placement::MidLeft => "mid-left",
            Placement::MidCenter => "mid-center",
            Placement::MidRight => "mid-right",
            Placement::BottomLeft => "bottom-left",
            Placement::BottomCenter => "bottom-center",
            Placement::BottomRight => "bottom-right",
        }
    }

    fn column(self) -> Column {
        match self {
            Placement::TopLeft | Placement::MidLeft | Placement::BottomLeft => Column::Left,
            Placement::TopCenter | Placement::MidCenter | Placement::BottomCenter => Column::Center,
            Placement::TopRight | Placement::MidRight | Placement::BottomRight => Column::Right,
        }
    }

    fn row(self) -> Row {
        match self {
            Placement::TopLeft | Placement::TopCenter | Placement::TopRight => Row::Top,
            Placement::MidLeft | Placement::MidCenter | Placement::MidRight => Row::Mid,
            Placement::BottomLeft | Placement::BottomCenter | Placement::BottomRight => Row::Bottom,
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown placement '{0}' (expected e.g. top-left, mid-center, bottom-right)")]
pub struct ParsePlacementError(pub String);

impl FromStr for Placement {
    type Err = ParsePlacementError;

    /// Accepts the canonical names plus a few shorthands: `center`/`middle`
    /// for mid-center, bare edges (`top`, `left`, ...) for their edge-center,
    /// and `_`/space as separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let placement = match normalized.as_str() {
            "top-left" => Placement::TopLeft,
            "top-center" | "top" => Placement::TopCenter,
            "top-right" => Placement::TopRight,
            "mid-left" | "middle-left" | "left" => Placement::MidLeft,
            "mid-center" | "middle-center" | "center" | "middle" => Placement::MidCenter,
            "mid-right" | "middle-right" | "right" => Placement::MidRight,
            "bottom-left" => Placement::BottomLeft,
            "bottom-center" | "bottom" => Placement::BottomCenter,
            "bottom-right" => Placement::BottomRight,
            _ => return Err(ParsePlacementError(s.to_string())),
        };
        Ok(placement)
    }
}

/// Top-left corner of a placed rectangle, in canvas pixels.
///
/// Signed: a target larger than the canvas lands at a negative offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

/// Calculate where to put a `target`-sized rectangle inside `canvas`.
///
/// # Examples
/// ```
/// # use imprint::imaging::{Dimensions, Placement, Point, placement_coordinates};
/// let canvas = Dimensions { width: 800, height: 600 };
/// let stamp = Dimensions { width: 100, height: 50 };
/// assert_eq!(
///     placement_coordinates(canvas, stamp, Placement::BottomRight),
///     Point { x: 700, y: 550 }
/// );
/// ```
pub fn placement_coordinates(canvas: Dimensions, target: Dimensions, placement: Placement) -> Point {
    let free_x = canvas.width as i64 - target.width as i64;
    let free_y = canvas.height as i64 - target.height as i64;

    let x = match placement.column() {
        Column::Left => 0,
        Column::Center => free_x.div_euclid(2),
        Column::Right => free_x,
    };
    let y = match placement.row() {
        Row::Top => 0,
        Row::Mid => free_y.div_euclid(2),
        Row::Bottom => free_y,
    };

    Point { x, y }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    // =========================================================================
    // placement_coordinates tests
    // =========================================================================

    #[test]
    fn bottom_right_image_on_800x600() {
        let p = placement_coordinates(dims(800, 600), dims(100, 50), Placement::BottomRight);
        assert_eq!(p, Point { x: 700, y: 550 });
    }

    #[test]
    fn mid_center_text_on_800x600() {
        let p = placement_coordinates(dims(800, 600), dims(120, 20), Placement::MidCenter);
        assert_eq!(p, Point { x: 340, y: 290 });
    }

    #[test]
    fn top_left_is_origin() {
        let p = placement_coordinates(dims(640, 480), dims(33, 17), Placement::TopLeft);
        assert_eq!(p, Point::default());
    }

    #[test]
    fn every_anchor_on_known_canvas() {
        let canvas = dims(300, 200);
        let target = dims(100, 50);
        let expected = [
            (Placement::TopLeft, 0, 0),
            (Placement::TopCenter, 100, 0),
            (Placement::TopRight, 200, 0),
            (Placement::MidLeft, 0, 75),
            (Placement::MidCenter, 100, 75),
            (Placement::MidRight, 200, 75),
            (Placement::BottomLeft, 0, 150),
            (Placement::BottomCenter, 100, 150),
            (Placement::BottomRight, 200, 150),
        ];
        for (placement, x, y) in expected {
            assert_eq!(
                placement_coordinates(canvas, target, placement),
                Point { x, y },
                "{placement}"
            );
        }
    }

    #[test]
    fn odd_leftover_floors() {
        // 801 - 100 = 701 → 350.5 → 350
        let p = placement_coordinates(dims(801, 601), dims(100, 100), Placement::MidCenter);
        assert_eq!(p, Point { x: 350, y: 250 });
    }

    #[test]
    fn oversized_target_goes_negative_and_floors() {
        // 100 - 201 = -101 → -50.5 → -51
        let p = placement_coordinates(dims(100, 100), dims(201, 100), Placement::MidCenter);
        assert_eq!(p, Point { x: -51, y: 0 });

        let p = placement_coordinates(dims(100, 100), dims(150, 120), Placement::BottomRight);
        assert_eq!(p, Point { x: -50, y: -20 });
    }

    #[test]
    fn fitting_targets_stay_inside_for_all_anchors() {
        let canvases = [dims(1, 1), dims(7, 3), dims(800, 600), dims(1921, 1081)];
        for canvas in canvases {
            for (tw, th) in [(0, 0), (1, 1), (canvas.width / 3, canvas.height / 2)] {
                let target = dims(tw, th);
                for placement in Placement::ALL {
                    let p = placement_coordinates(canvas, target, placement);
                    let max_x = (canvas.width - target.width) as i64;
                    let max_y = (canvas.height - target.height) as i64;
                    assert!((0..=max_x).contains(&p.x), "{placement} x={} on {canvas:?}", p.x);
                    assert!((0..=max_y).contains(&p.y), "{placement} y={} on {canvas:?}", p.y);

                    let expected_x = match placement.column() {
                        Column::Left => 0,
                        Column::Center => max_x / 2,
                        Column::Right => max_x,
                    };
                    let expected_y = match placement.row() {
                        Row::Top => 0,
                        Row::Mid => max_y / 2,
                        Row::Bottom => max_y,
                    };
                    assert_eq!((p.x, p.y), (expected_x, expected_y), "{placement}");
                }
            }
        }
    }

    #[test]
    fn target_filling_canvas_is_origin_everywhere() {
        for placement in Placement::ALL {
            let p = placement_coordinates(dims(50, 40), dims(50, 40), placement);
            assert_eq!(p, Point::default(), "{placement}");
        }
    }

    // =========================================================================
    // Placement parsing tests
    // =========================================================================

    #[test]
    fn names_round_trip_through_from_str() {
        for placement in Placement::ALL {
            assert_eq!(placement.to_string().parse::<Placement>(), Ok(placement));
        }
    }

    #[test]
    fn shorthands_parse() {
        assert_eq!("center".parse(), Ok(Placement::MidCenter));
        assert_eq!("Middle".parse(), Ok(Placement::MidCenter));
        assert_eq!("bottom".parse(), Ok(Placement::BottomCenter));
        assert_eq!("left".parse(), Ok(Placement::MidLeft));
        assert_eq!("BOTTOM_RIGHT".parse(), Ok(Placement::BottomRight));
        assert_eq!("top right".parse(), Ok(Placement::TopRight));
    }

    #[test]
    fn unknown_placement_is_error() {
        let err = "upper-left".parse::<Placement>().unwrap_err();
        assert_eq!(err, ParsePlacementError("upper-left".to_string()));
    }

    #[test]
    fn default_is_top_left() {
        assert_eq!(Placement::default(), Placement::TopLeft);
    }
}
