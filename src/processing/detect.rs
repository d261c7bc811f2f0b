use crate::processing::ImageOps;
use image::GrayImage;

// Detection tunables for the built-in heuristic detector
const SCAN_MAX_DIM: u32 = 256;
const MIN_WINDOW: u32 = 16;
const VARIANCE_NORM: f64 = 1200.0;
const MIN_FACE_SCORE: f64 = 0.15;
const MEAN_FLOOR: f64 = 25.0;
const MEAN_CEIL: f64 = 230.0;
const OVERLAP_LIMIT: f64 = 0.3;
const EYE_DARK_MAX: i32 = 100;
const EYE_CONTRAST: i32 = 15;

/// A detected face bounding box with a relative confidence in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub confidence: f64,
}

/// Detection seam for face and eye regions. Implementations are chosen once
/// at pipeline construction and must be shareable across concurrent
/// submissions; no call may mutate detector state.
pub trait FaceDetector: Send + Sync {
    /// Face regions found in a grayscale image, most confident first.
    /// An empty result means no face, which callers treat as informative
    /// rather than as an error.
    fn detect_faces(&self, gray: &GrayImage) -> Vec<FaceRegion>;

    /// Number of eye-like regions inside a face crop.
    fn detect_eyes(&self, face: &GrayImage) -> usize;
}

/// Built-in detector working purely on pixel statistics: a sliding-window
/// scan over a row-sum integral image scores windows by local variance and a
/// center prior, and eye candidates are dark blobs contrasted against their
/// surroundings in the upper face band. Deployments with a trained detector
/// substitute their own `FaceDetector` at construction time.
pub struct HeuristicFaceDetector;

impl HeuristicFaceDetector {
    pub fn new() -> Self {
        HeuristicFaceDetector
    }
}

impl Default for HeuristicFaceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceDetector for HeuristicFaceDetector {
    fn detect_faces(&self, gray: &GrayImage) -> Vec<FaceRegion> {
        let (orig_w, orig_h) = gray.dimensions();
        if orig_w < MIN_WINDOW || orig_h < MIN_WINDOW {
            return Vec::new();
        }

        // Downscale large inputs before scanning; box coordinates are mapped
        // back to the original resolution at the end
        let max_dim = orig_w.max(orig_h);
        let (scan, scale) = if max_dim > SCAN_MAX_DIM {
            let factor = max_dim as f64 / SCAN_MAX_DIM as f64;
            let w = (orig_w as f64 / factor).round().max(1.0) as u32;
            let h = (orig_h as f64 / factor).round().max(1.0) as u32;
            (ImageOps::resize(gray, w, h), factor)
        } else {
            (gray.clone(), 1.0)
        };

        let (width, height) = scan.dimensions();
        let (sums, sq_sums) = row_sums(&scan);

        let min_dim = width.min(height);
        let mut window_sizes = vec![min_dim / 2, min_dim * 2 / 3, min_dim / 3];
        window_sizes.retain(|s| *s >= MIN_WINDOW);
        window_sizes.dedup();

        let cx = width as f64 / 2.0;
        let cy = height as f64 / 2.0;
        let max_dist = (cx * cx + cy * cy).sqrt();

        let mut candidates: Vec<FaceRegion> = Vec::new();
        for size in window_sizes {
            let step = (size / 4).max(2);
            let mut y = 0;
            while y + size <= height {
                let mut x = 0;
                while x + size <= width {
                    let area = (size * size) as f64;
                    let sum = window_sum(&sums, x, y, size, size);
                    let sq_sum = window_sum(&sq_sums, x, y, size, size);
                    let mean = sum / area;
                    let variance = (sq_sum / area - mean * mean).max(0.0);

                    // Flat or saturated regions cannot hold a face
                    if mean >= MEAN_FLOOR && mean <= MEAN_CEIL {
                        let texture = (variance / VARIANCE_NORM).min(1.0);
                        let wx = x as f64 + size as f64 / 2.0;
                        let wy = y as f64 + size as f64 / 2.0;
                        let dist = ((wx - cx).powi(2) + (wy - cy).powi(2)).sqrt();
                        let center_prior = 1.0 - 0.5 * (dist / max_dist);
                        let score = texture * center_prior;
                        if score >= MIN_FACE_SCORE {
                            candidates.push(FaceRegion {
                                x,
                                y,
                                width: size,
                                height: size,
                                confidence: score.min(1.0),
                            });
                        }
                    }
                    x += step;
                }
                y += step;
            }
        }

        let mut kept = suppress_overlaps(candidates);
        for region in kept.iter_mut() {
            region.x = (region.x as f64 * scale).round() as u32;
            region.y = (region.y as f64 * scale).round() as u32;
            region.width = (region.width as f64 * scale).round() as u32;
            region.height = (region.height as f64 * scale).round() as u32;
        }
        kept
    }

    fn detect_eyes(&self, face: &GrayImage) -> usize {
        let (width, height) = face.dimensions();
        if width < MIN_WINDOW || height < MIN_WINDOW {
            return 0;
        }

        // Eyes sit in the upper half of the face box; candidates are pixels
        // clearly darker than a ring of surrounding pixels
        let offset = (width.min(height) / 12).max(3);
        let band_top = height / 6;
        let band_bottom = height / 2;

        let mut points: Vec<(u32, u32)> = Vec::new();
        let mut y = band_top.max(offset);
        while y < band_bottom && y + offset < height {
            let mut x = offset;
            while x + offset < width {
                let center = face.get_pixel(x, y).0[0] as i32;
                if center < EYE_DARK_MAX {
                    let top = face.get_pixel(x, y - offset).0[0] as i32;
                    let bottom = face.get_pixel(x, y + offset).0[0] as i32;
                    let left = face.get_pixel(x - offset, y).0[0] as i32;
                    let right = face.get_pixel(x + offset, y).0[0] as i32;
                    if center < top - EYE_CONTRAST
                        && center < bottom - EYE_CONTRAST
                        && center < left - EYE_CONTRAST
                        && center < right - EYE_CONTRAST
                    {
                        points.push((x, y));
                    }
                }
                x += 2;
            }
            y += 2;
        }

        cluster_count(&points, (offset * 2) as i64)
    }
}

// Per-row prefix sums of pixel values and squared values, for O(1) window
// sums during the scan
fn row_sums(gray: &GrayImage) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let (width, height) = gray.dimensions();
    let mut sums = vec![vec![0.0; width as usize + 1]; height as usize];
    let mut sq_sums = vec![vec![0.0; width as usize + 1]; height as usize];
    for y in 0..height as usize {
        for x in 0..width as usize {
            let v = gray.get_pixel(x as u32, y as u32).0[0] as f64;
            sums[y][x + 1] = sums[y][x] + v;
            sq_sums[y][x + 1] = sq_sums[y][x] + v * v;
        }
    }
    (sums, sq_sums)
}

fn window_sum(rows: &[Vec<f64>], x: u32, y: u32, w: u32, h: u32) -> f64 {
    let mut total = 0.0;
    for row in rows.iter().skip(y as usize).take(h as usize) {
        total += row[(x + w) as usize] - row[x as usize];
    }
    total
}

// Greedy non-maximum suppression: keep the best-scoring boxes, dropping any
// box that overlaps a kept one by more than OVERLAP_LIMIT of its own area
fn suppress_overlaps(mut candidates: Vec<FaceRegion>) -> Vec<FaceRegion> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut kept: Vec<FaceRegion> = Vec::new();
    for region in candidates {
        let overlapping = kept.iter().any(|k| {
            let ix = overlap_1d(region.x, region.width, k.x, k.width);
            let iy = overlap_1d(region.y, region.height, k.y, k.height);
            let inter = (ix * iy) as f64;
            let min_area = (region.width * region.height).min(k.width * k.height) as f64;
            min_area > 0.0 && inter / min_area > OVERLAP_LIMIT
        });
        if !overlapping {
            kept.push(region);
        }
    }
    kept
}

fn overlap_1d(a: u32, a_len: u32, b: u32, b_len: u32) -> u32 {
    let start = a.max(b);
    let end = (a + a_len).min(b + b_len);
    end.saturating_sub(start)
}

// Group candidate points into blobs by proximity and count the blobs
fn cluster_count(points: &[(u32, u32)], radius: i64) -> usize {
    let mut centers: Vec<(i64, i64, usize)> = Vec::new();
    for &(x, y) in points {
        let (x, y) = (x as i64, y as i64);
        let mut assigned = false;
        for center in centers.iter_mut() {
            let mx = center.0 / center.2 as i64;
            let my = center.1 / center.2 as i64;
            if (mx - x).abs() <= radius && (my - y).abs() <= radius {
                center.0 += x;
                center.1 += y;
                center.2 += 1;
                assigned = true;
                break;
            }
        }
        if !assigned {
            centers.push((x, y, 1));
        }
    }
    centers.len()
}
