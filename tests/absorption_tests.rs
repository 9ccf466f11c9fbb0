//! Absorption Tests
//!
//! End-to-end checks of the layer models, transfer-matrix chain, diffuse
//! integration and metrics through the public API.

use acoustica::models::porous::{
    CALIBRATION_ALPHA, CALIBRATION_FREQUENCY, CALIBRATION_SIGMA, CALIBRATION_THICKNESS_MM,
    CALIBRATION_TOLERANCE,
};
use acoustica::models::{helmholtz, membrane};
use acoustica::{
    evaluate, AbsorberEngine, AbsorptionCurve, AirProperties, Confidence, EngineConfig,
    Evaluation, FrequencyAxis, HelmholtzResonator, Incidence, JcaParameters, LayerSpec, Metrics,
    ModelWarning, PanelKind, PorousModel, Stack,
};
use approx::assert_relative_eq;
use test_case::test_case;

fn porous(sigma: f64, thickness_mm: f64) -> LayerSpec {
    LayerSpec::porous(sigma, thickness_mm, PorousModel::Miki)
}

fn clipped_frequencies(evaluation: &Evaluation) -> Vec<f64> {
    evaluation
        .diagnostics
        .warnings
        .iter()
        .find_map(|w| match w {
            ModelWarning::AbsorptionClipped { frequencies } => Some(frequencies.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

fn assert_bounded(curve: &AbsorptionCurve, label: &str) {
    for (f, alpha) in curve.iter() {
        assert!(
            (0.0..=1.0).contains(&alpha),
            "{label}: alpha {alpha} at {f} Hz outside [0, 1]"
        );
    }
}

// === Physical bounds ===

#[test]
fn test_alpha_bounded_for_extreme_stacks() {
    let jca = PorousModel::Jca(JcaParameters {
        porosity: 0.98,
        tortuosity: 1.02,
        viscous_length_mm: 0.1,
        thermal_length_mm: 0.2,
    });
    let stacks = vec![
        Stack::new(vec![LayerSpec::porous(100.0, 1.0, PorousModel::DelanyBazley)]),
        Stack::new(vec![LayerSpec::porous(5.0e6, 500.0, PorousModel::Miki)]),
        Stack::new(vec![LayerSpec::porous(2.0e5, 0.5, PorousModel::AllardChampoux)]),
        Stack::new(vec![LayerSpec::porous(150.0, 300.0, jca)]),
        Stack::new(vec![
            LayerSpec::membrane(0.001),
            LayerSpec::air(1000.0),
        ]),
        Stack::new(vec![
            LayerSpec::membrane(500.0),
            porous(13000.0, 10.0),
        ]),
        Stack::new(vec![
            LayerSpec::perforated(0.05, 200.0, 0.1, PanelKind::Mpp),
            LayerSpec::air(20.0),
        ]),
        Stack::new(vec![
            LayerSpec::perforated(49.0, 50.0, 50.0, PanelKind::Ingard),
            LayerSpec::perforated(1.0, 100.0, 0.2, PanelKind::Slotted),
            porous(1.0e6, 5.0),
            LayerSpec::air(0.01),
        ]),
    ];

    let axis = FrequencyAxis::log_spaced(20.0, 20_000.0, 6).unwrap();
    for (i, stack) in stacks.iter().enumerate() {
        for incidence in [Incidence::Normal, Incidence::Diffuse] {
            let evaluation = evaluate(stack, &axis, incidence).unwrap();
            assert_bounded(&evaluation.curve, &format!("stack {i} {incidence:?}"));
            assert!((0.0..=1.0).contains(&evaluation.metrics.nrc));
            assert_eq!(
                evaluation.curve.clipped().is_empty(),
                !evaluation.diagnostics.has("ABSORPTION_CLIPPED"),
                "stack {i} {incidence:?}"
            );
        }
    }
}

#[test_case(Incidence::Normal ; "normal incidence")]
#[test_case(Incidence::Diffuse ; "diffuse field")]
fn test_negative_absorption_is_clipped_and_flagged(incidence: Incidence) {
    // Delany-Bazley far below its X range: α(θ) < 0 at every angle here
    let stack = Stack::new(vec![LayerSpec::porous(1.0e6, 1.0, PorousModel::DelanyBazley)]);
    let axis = FrequencyAxis::from_values(vec![1000.0, 2000.0]).unwrap();
    let evaluation = evaluate(&stack, &axis, incidence).unwrap();

    assert!(
        evaluation.diagnostics.has("ABSORPTION_CLIPPED"),
        "{incidence:?}: {:?}",
        evaluation.diagnostics
    );
    assert_eq!(evaluation.confidence(), Confidence::Low);
    assert_eq!(clipped_frequencies(&evaluation), vec![1000.0, 2000.0]);
    assert_eq!(evaluation.curve.values(), &[0.0, 0.0]);
    assert_bounded(&evaluation.curve, &format!("{incidence:?}"));
}

#[test]
fn test_diffuse_flags_clipping_inside_the_average() {
    // α(θ) changes sign across the angle range at 1325 Hz; the diffuse
    // value stays inside [0, 1] but the clipped nodes must still show
    let stack = Stack::new(vec![
        LayerSpec::air(20.0),
        LayerSpec::porous(2.0e5, 2.0, PorousModel::DelanyBazley),
    ]);
    let axis = FrequencyAxis::from_values(vec![1325.0]).unwrap();
    let evaluation = evaluate(&stack, &axis, Incidence::Diffuse).unwrap();

    assert_eq!(clipped_frequencies(&evaluation), vec![1325.0]);
    assert_eq!(evaluation.confidence(), Confidence::Low);
    assert_relative_eq!(evaluation.curve.values()[0], 0.00183, epsilon = 5e-5);
}

#[test]
fn test_bare_wall_absorbs_nothing() {
    let axis = FrequencyAxis::default();
    for incidence in [Incidence::Normal, Incidence::Diffuse] {
        let evaluation = evaluate(&Stack::empty(), &axis, incidence).unwrap();
        assert!(evaluation.curve.values().iter().all(|a| *a == 0.0));
        assert_eq!(evaluation.metrics.nrc, 0.0);
        assert!(evaluation.diagnostics.is_empty());
    }
}

#[test]
fn test_layer_order_matters() {
    let stack = Stack::new(vec![porous(13000.0, 50.0), LayerSpec::air(100.0)]);
    let axis = FrequencyAxis::third_octave(100.0, 4000.0).unwrap();
    let forward = evaluate(&stack, &axis, Incidence::Normal).unwrap();
    let reversed = evaluate(&stack.reversed(), &axis, Incidence::Normal).unwrap();

    let max_diff = forward
        .curve
        .values()
        .iter()
        .zip(reversed.curve.values())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);
    assert!(max_diff > 0.1, "reversal changed alpha by only {max_diff}");
    assert!(forward.curve.at(500.0) > reversed.curve.at(500.0));
}

#[test]
fn test_symmetric_stack_unchanged_by_reversal() {
    let stack = Stack::new(vec![
        porous(10000.0, 20.0),
        LayerSpec::air(40.0),
        porous(10000.0, 20.0),
    ]);
    assert!(stack.is_palindrome());
    let axis = FrequencyAxis::third_octave(100.0, 4000.0).unwrap();
    let a = evaluate(&stack, &axis, Incidence::Normal).unwrap();
    let b = evaluate(&stack.reversed(), &axis, Incidence::Normal).unwrap();
    assert_eq!(a.curve, b.curve);
}

// === Reference values ===

#[test]
fn test_fiberglass_calibration() {
    let stack = Stack::new(vec![porous(CALIBRATION_SIGMA, CALIBRATION_THICKNESS_MM)]);
    let axis = FrequencyAxis::from_values(vec![CALIBRATION_FREQUENCY]).unwrap();
    let evaluation = evaluate(&stack, &axis, Incidence::Normal).unwrap();
    let alpha = evaluation.curve.values()[0];
    assert!(
        (alpha - CALIBRATION_ALPHA).abs() <= CALIBRATION_TOLERANCE,
        "alpha(500 Hz) = {alpha}"
    );
}

#[test_case(PorousModel::Miki, [0.198, 0.501, 0.896, 0.981] ; "miki")]
#[test_case(PorousModel::DelanyBazley, [0.185, 0.544, 0.923, 0.984] ; "delany bazley")]
#[test_case(PorousModel::AllardChampoux, [0.133, 0.344, 0.692, 0.903] ; "allard champoux")]
fn test_porous_model_reference_curve(model: PorousModel, reference: [f64; 4]) {
    let axis = FrequencyAxis::from_values(vec![250.0, 500.0, 1000.0, 2000.0]).unwrap();
    let stack = Stack::new(vec![LayerSpec::porous(13000.0, 50.0, model)]);
    let curve = evaluate(&stack, &axis, Incidence::Normal).unwrap().curve;
    for (alpha, want) in curve.values().iter().zip(reference) {
        assert!((alpha - want).abs() < 0.01, "{}: {alpha} vs {want}", model.name());
    }
}

#[test]
fn test_helmholtz_peak_at_resonance() {
    let air = AirProperties::default();
    let resonator = HelmholtzResonator {
        neck_length_mm: 25.0,
        neck_radius_mm: 10.0,
        cavity_depth_mm: 200.0,
        cavity_width_mm: 100.0,
    };
    let volume = resonator.cavity_volume_m3();
    assert_relative_eq!(volume, 0.002, epsilon = 1e-12);

    let area = std::f64::consts::PI * 0.01 * 0.01;
    let l_eff = 0.025 + 0.85 * 2.0 * 0.01;
    let closed_form = 343.0 / (2.0 * std::f64::consts::PI) * (area / (volume * l_eff)).sqrt();
    let f0 = helmholtz::resonance_frequency(25.0, 10.0, volume, &air).unwrap();
    assert_relative_eq!(f0, closed_form, max_relative = 1e-12);

    let axis = FrequencyAxis::log_spaced(60.0, 180.0, 1000).unwrap();
    let response = AbsorberEngine::default().helmholtz(&resonator, &axis).unwrap();
    assert_relative_eq!(response.resonance_hz, f0, max_relative = 1e-12);
    assert!(
        (response.peak_frequency_hz - f0).abs() / f0 < 0.005,
        "area peaks at {} Hz, resonance {} Hz",
        response.peak_frequency_hz,
        f0
    );
    let wavelength = 343.0 / f0;
    assert_relative_eq!(
        response.theoretical_max_area_m2,
        wavelength * wavelength / (2.0 * std::f64::consts::PI),
        max_relative = 1e-12
    );
}

#[test]
fn test_membrane_panel_resonance() {
    let air = AirProperties::default();
    let stack = Stack::new(vec![
        LayerSpec::membrane(2.0),
        porous(13000.0, 25.0),
        LayerSpec::air(75.0),
    ]);
    let axis = FrequencyAxis::log_spaced(50.0, 400.0, 48).unwrap();
    let evaluation = evaluate(&stack, &axis, Incidence::Normal).unwrap();
    let analytic = membrane::panel_resonance(2.0, 100.0, &air).unwrap();
    let peak = evaluation.metrics.peak_frequency_hz;
    assert!(
        (peak - analytic).abs() / analytic < 0.2,
        "peak {peak} Hz vs mass-spring {analytic} Hz"
    );
    assert!(evaluation.metrics.peak_alpha > 0.8);
}

#[test]
fn test_perforated_panel_shifts_peak_down() {
    let axis = FrequencyAxis::log_spaced(100.0, 4000.0, 24).unwrap();
    let bare = evaluate(
        &Stack::new(vec![porous(13000.0, 50.0)]),
        &axis,
        Incidence::Normal,
    )
    .unwrap();
    let faced = evaluate(
        &Stack::new(vec![
            LayerSpec::perforated(8.0, 30.0, 6.0, PanelKind::Ingard),
            porous(13000.0, 50.0),
        ]),
        &axis,
        Incidence::Normal,
    )
    .unwrap();
    assert!(faced.metrics.peak_frequency_hz < 600.0);
    assert!(faced.curve.at(400.0) > bare.curve.at(400.0));
}

// === Metrics ===

#[test]
fn test_flat_curve_nrc() {
    let axis = FrequencyAxis::third_octave(50.0, 5000.0).unwrap();
    let curve = AbsorptionCurve::from_raw(&axis, vec![0.6; axis.len()]);
    let metrics = Metrics::from_curve(&curve);
    assert_eq!(metrics.nrc, 0.6);
    assert_eq!(metrics.nrc_rounded(), 0.6);
    assert_relative_eq!(metrics.saa, 0.6, epsilon = 1e-12);
    assert_eq!(
        metrics.octave_bands.keys().copied().collect::<Vec<_>>(),
        vec![63, 125, 250, 500, 1000, 2000, 4000]
    );
}

#[test]
fn test_nrc_interpolates_missing_bands() {
    // 250 and 1000 Hz are absent; they sit midway on a log axis
    let axis = FrequencyAxis::from_values(vec![125.0, 500.0, 2000.0]).unwrap();
    let curve = AbsorptionCurve::from_raw(&axis, vec![0.2, 0.6, 1.0]);
    let metrics = Metrics::from_curve(&curve);
    assert_relative_eq!(curve.at(250.0), 0.4, epsilon = 1e-12);
    assert_relative_eq!(curve.at(1000.0), 0.8, epsilon = 1e-12);
    assert_relative_eq!(metrics.nrc, (0.4 + 0.6 + 0.8 + 1.0) / 4.0, epsilon = 1e-12);
}

// === Diffuse field ===

#[test]
fn test_diffuse_within_bounds_and_below_normal_peak() {
    let stack = Stack::new(vec![porous(13000.0, 50.0), LayerSpec::air(50.0)]);
    let axis = FrequencyAxis::third_octave(63.0, 5000.0).unwrap();
    let normal = evaluate(&stack, &axis, Incidence::Normal).unwrap();
    let diffuse = evaluate(&stack, &axis, Incidence::Diffuse).unwrap();
    assert_bounded(&diffuse.curve, "diffuse");
    assert!(diffuse.metrics.nrc > 0.3);
    assert_ne!(normal.curve, diffuse.curve);
}

#[test]
fn test_engine_config_changes_diffuse_cutoff() {
    let mut config = EngineConfig::default();
    config.diffuse.theta_max_deg = 60.0;
    config.diffuse.quadrature_order = 16;
    let engine = AbsorberEngine::new(config).unwrap();
    let stack = Stack::new(vec![porous(13000.0, 50.0)]);
    let axis = FrequencyAxis::third_octave(125.0, 4000.0).unwrap();
    let narrow = engine.evaluate(&stack, &axis, Incidence::Diffuse).unwrap();
    let standard = evaluate(&stack, &axis, Incidence::Diffuse).unwrap();
    assert_bounded(&narrow.curve, "60 degree cutoff");
    assert_ne!(narrow.curve, standard.curve);

    let mut bad = EngineConfig::default();
    bad.diffuse.quadrature_order = 3;
    assert!(AbsorberEngine::new(bad).is_err());
}

// === Validation ===

#[test]
fn test_invalid_inputs_rejected() {
    let axis = FrequencyAxis::default();
    let bad_stacks = vec![
        Stack::new(vec![porous(0.0, 50.0)]),
        Stack::new(vec![porous(13000.0, -1.0)]),
        Stack::new(vec![LayerSpec::air(0.0)]),
        Stack::new(vec![LayerSpec::membrane(f64::NAN)]),
        Stack::new(vec![LayerSpec::perforated(10.0, 5.0, 3.0, PanelKind::Ingard)]),
    ];
    for stack in bad_stacks {
        let err = evaluate(&stack, &axis, Incidence::Normal).unwrap_err();
        assert!(err.is_validation(), "{err}");
    }
    assert!(FrequencyAxis::from_values(vec![500.0, 250.0]).is_err());
}

#[test]
fn test_stack_json_roundtrip_through_evaluate() {
    let stack: Stack = serde_json::from_str(
        r#"[
            {"type": "perforated", "hole_diameter_mm": 0.5, "hole_spacing_mm": 5, "panel_thickness_mm": 0.5, "kind": "mpp"},
            {"type": "air", "thickness_mm": 50}
        ]"#,
    )
    .unwrap();
    let axis = FrequencyAxis::third_octave(100.0, 4000.0).unwrap();
    let evaluation = evaluate(&stack, &axis, Incidence::Normal).unwrap();
    assert!(evaluation.metrics.peak_alpha > 0.3);
    assert!(evaluation.diagnostics.is_empty());
}
