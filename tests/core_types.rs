use hashnms::{quantize, BoxesView, HashParams, KeyMode, NmsError, QuantCode};

#[test]
fn boxes_view_rejects_malformed_buffers() {
    for len in [1usize, 2, 3, 5, 7] {
        let data = vec![0.0f32; len];
        let err = BoxesView::from_flat(&data).unwrap_err();
        assert_eq!(err, NmsError::MalformedBoxes { len });
        assert!(err.is_invalid_input());
    }
}

#[test]
fn boxes_view_exposes_rows_in_order() {
    let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
    let view = BoxesView::from_flat(&data).unwrap();
    assert_eq!(view.len(), 3);
    assert!(!view.is_empty());
    assert_eq!(view.as_flat(), data.as_slice());
    let rows: Vec<[f32; 4]> = view.iter().collect();
    assert_eq!(rows[2], [8.0, 9.0, 10.0, 11.0]);
    assert_eq!(view.gather(&[2, 0]).unwrap(), vec![rows[2], rows[0]]);
}

#[test]
fn empty_view_is_valid() {
    let view = BoxesView::from_flat(&[]).unwrap();
    assert_eq!(view.len(), 0);
    assert!(view.is_empty());
    assert!(view.get(0).is_none());
}

#[test]
fn error_classification_follows_taxonomy() {
    let domain = NmsError::Domain {
        param: "alpha",
        value: 1.0,
        reason: "scale ratio of 1 leaves size ranks undefined",
    };
    assert!(domain.is_domain());
    assert!(!domain.is_invalid_input());
    assert!(NmsError::InvalidInput("x").is_invalid_input());
    assert!(NmsError::IndexOutOfBounds { index: 1, len: 0 }.is_invalid_input());
    assert_eq!(
        NmsError::LengthMismatch { boxes: 2, scores: 3 }.to_string(),
        "box/score count mismatch: 2 boxes, 3 scores"
    );
}

#[test]
fn default_params_use_half_cell_offsets() {
    let params = HashParams::default();
    assert_eq!((params.bx, params.by), (0.5, 0.5));
    assert_eq!(params.key_mode, KeyMode::Exact);
    assert!(!params.parallel);
}

#[test]
fn quantize_uses_rank_pitch_and_offsets() {
    // alpha = 0.8: pitch is w0 / 9 and h0 / 9, so 100 / (24 / 9) = 37.5 and
    // 200 / (48 / 9) = 37.5 before the offsets are subtracted.
    let params = HashParams::new(24.0, 48.0, 0.8, 0.25, 0.75);
    let code = quantize([100.0, 200.0, 24.0, 48.0], &params);
    assert_eq!(
        code,
        QuantCode {
            qx: 37,
            qy: 37,
            i: 0,
            j: 0,
        }
    );
}
