//! Runs the suppression routines against recorded reference outputs.

use hashnms::{greedy_nms, hashed_nms, BoxesView, HashParams};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Method {
    Greedy,
    Hashed,
}

#[derive(Debug, Deserialize)]
struct HashJson {
    w0: f32,
    h0: f32,
    alpha: f32,
    bx: f32,
    by: f32,
}

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    method: Method,
    boxes: Vec<[f32; 4]>,
    scores: Vec<f32>,
    #[serde(default)]
    iou_threshold: f32,
    #[serde(default)]
    hash: Option<HashJson>,
    expected: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct Fixture {
    cases: Vec<Case>,
}

fn load_fixture() -> Fixture {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("reference_cases.json");
    let text = fs::read_to_string(&path).expect("Failed to read fixture");
    serde_json::from_str(&text).expect("Failed to parse fixture")
}

#[test]
fn reference_cases_match() {
    let fixture = load_fixture();
    assert!(!fixture.cases.is_empty());

    for case in &fixture.cases {
        let boxes = BoxesView::from_rows(&case.boxes);
        let keep = match case.method {
            Method::Greedy => greedy_nms(boxes, &case.scores, case.iou_threshold).unwrap(),
            Method::Hashed => {
                let h = case
                    .hash
                    .as_ref()
                    .unwrap_or_else(|| panic!("case {} has no hash parameters", case.name));
                let params = HashParams::new(h.w0, h.h0, h.alpha, h.bx, h.by);
                hashed_nms(boxes, &case.scores, &params).unwrap()
            }
        };
        assert_eq!(keep, case.expected, "case {}", case.name);
    }
}
