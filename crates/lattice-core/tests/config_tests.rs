// Host-side tests for configuration documents and the objects built from them.

use lattice_core::authority::InstanceRole;
use lattice_core::config::LatticeConfig;
use lattice_core::constants::*;
use lattice_core::geometry::GeometryKind;
use lattice_core::{InteractionEvent, LatticeError, MemorySink};

#[test]
fn empty_document_uses_builtins() {
    let config = LatticeConfig::from_json("{}").unwrap();
    assert_eq!(config, LatticeConfig::default());
    let authority = config.build_authority().unwrap();
    assert_eq!(authority.active_section(), "home");
    assert_eq!(authority.section_ids().len(), 8);
    assert_eq!(authority.decay_rates().click, CLICK_DECAY);
    let queue = config.event_queue();
    assert!(queue.is_empty());
}

#[test]
fn section_table_is_replaced_wholesale() {
    let json = r#"{
        "sections": [
            { "id": "intro", "intensityMod": 1.0, "speedMod": 1.0, "densityMod": 2.0,
              "complexityMod": 1.0, "geometryId": "torus", "baseColor": [1, 0, 0],
              "displayName": "Intro" },
            { "id": "outro", "intensityMod": 0.5, "speedMod": 0.5, "densityMod": 0.5,
              "complexityMod": 0.5, "geometry": "crystal", "baseColor": [0, 0, 1] }
        ]
    }"#;
    let config = LatticeConfig::from_json(json).unwrap();
    let authority = config.build_authority().unwrap();
    assert_eq!(authority.section_ids(), vec!["intro", "outro"]);
    assert_eq!(authority.active_section(), "intro");
    let p = authority.instance_parameters("intro", InstanceRole::Content);
    assert_eq!(p.geometry, GeometryKind::Torus);
    assert!((p.grid_density - 24.0).abs() < 1e-4);
    assert_eq!(authority.sections().get("outro").unwrap().display_name, "");
    // the old catalog is gone
    assert_eq!(authority.section_parameters("home").section_id, "intro");
}

#[test]
fn role_overrides_merge_over_builtins() {
    let json = r#"{
        "roles": {
            "accent": { "gridScale": 3.0, "morphScale": 1.0, "rotationScale": 1.0,
                        "dimensionBoost": 0.0, "interactionSensitivity": 1.0 }
        }
    }"#;
    let config = LatticeConfig::from_json(json).unwrap();
    let authority = config.build_authority().unwrap();
    let accent = authority.instance_parameters("home", InstanceRole::Accent);
    assert!((accent.grid_density - 36.0).abs() < 1e-4);
    // color transform defaults to identity when omitted
    assert_eq!(accent.color, [0.0, 1.0, 1.0]);
    let shadow = authority.instance_parameters("home", InstanceRole::Shadow);
    assert!((shadow.grid_density - 0.8 * 12.0).abs() < 1e-4);
}

#[test]
fn custom_queue_bounds_reach_the_bridge() {
    let json = r#"{ "queue": { "capacity": 4, "retain": 2 }, "defaultSection": "lab" }"#;
    let config = LatticeConfig::from_json(json).unwrap();
    let mut bridge = config.build_bridge(MemorySink::new()).unwrap();
    assert_eq!(bridge.authority().active_section(), "lab");
    for _ in 0..5 {
        bridge.queue_event(InteractionEvent::Click { x: 0.0, y: 0.0 });
    }
    assert_eq!(bridge.queue().len(), 2);
}

#[test]
fn invalid_documents_are_configuration_errors() {
    let bad = [
        "not json",
        r#"{ "queue": { "capacity": 10, "retain": 20 } }"#,
        r#"{ "queue": { "capacity": 0, "retain": 0 } }"#,
        r#"{ "decay": { "mouse": 1.5 } }"#,
        r#"{ "defaultSection": "nowhere" }"#,
        r#"{ "sections": [] }"#,
        r#"{ "roles": { "content": { "gridScale": 0.0, "morphScale": 1.0, "rotationScale": 1.0,
             "dimensionBoost": 0.0, "interactionSensitivity": 1.0 } } }"#,
        r#"{ "roles": { "sidebar": {} } }"#,
    ];
    for json in bad {
        let err = LatticeConfig::from_json(json).unwrap_err();
        assert!(matches!(err, LatticeError::Configuration(_)), "{json}: {err}");
    }
}

#[test]
fn broken_config_falls_back_to_defaults() {
    let config = LatticeConfig::from_json_or_default(r#"{ "decay": { "click": -1 } }"#);
    assert_eq!(config, LatticeConfig::default());
}

#[test]
fn partial_decay_rates_keep_other_defaults() {
    let config = LatticeConfig::from_json(r#"{ "decay": { "click": 0.5 } }"#).unwrap();
    let rates = config.build_authority().unwrap().decay_rates();
    assert_eq!(rates.click, 0.5);
    assert_eq!(rates.mouse, MOUSE_DECAY);
    assert_eq!(rates.scroll, SCROLL_DECAY);
}
