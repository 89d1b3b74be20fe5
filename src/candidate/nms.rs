//! Non-maximum suppression for overlapping detections.

use crate::candidate::detection::{sort_detections_desc, Detection};

/// Applies greedy non-maximum suppression by intersection-over-union.
///
/// Detections are sorted by descending score and kept if their IoU with every
/// previously kept detection is at most `iou_threshold`. Boxes from different
/// templates suppress each other as well; a threshold of 1.0 keeps everything
/// except exact duplicates.
pub fn suppress_overlaps(detections: &mut [Detection], iou_threshold: f32) -> Vec<Detection> {
    sort_detections_desc(detections);
    let mut kept: Vec<Detection> = Vec::new();

    'outer: for det in detections.iter().copied() {
        for kept_det in kept.iter() {
            if det.iou(kept_det) > iou_threshold {
                continue 'outer;
            }
        }
        kept.push(det);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::suppress_overlaps;
    use crate::candidate::detection::Detection;

    fn det(x0: usize, y0: usize, size: usize, score: f32) -> Detection {
        Detection {
            x0,
            y0,
            x1: x0 + size,
            y1: y0 + size,
            score,
            scale: 1.0,
            template_idx: 0,
        }
    }

    #[test]
    fn keeps_best_of_overlapping_cluster() {
        let mut dets = vec![
            det(10, 10, 20, 0.80),
            det(11, 10, 20, 0.95),
            det(12, 11, 20, 0.90),
        ];
        let kept = suppress_overlaps(&mut dets, 0.3);
        assert_eq!(kept.len(), 1);
        assert_eq!((kept[0].x0, kept[0].y0), (11, 10));
    }

    #[test]
    fn keeps_disjoint_boxes_in_score_order() {
        let mut dets = vec![det(0, 0, 10, 0.8), det(50, 50, 10, 0.9)];
        let kept = suppress_overlaps(&mut dets, 0.3);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].x0, 50);
        assert_eq!(kept[1].x0, 0);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(suppress_overlaps(&mut [], 0.5).is_empty());
    }
}
