use super::*;

#[derive(Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
struct Params {
    radius: f32,
    repeat: bool,
}

#[test]
fn kinds_parse_from_snake_case() {
    let effect: Effect =
        serde_json::from_str(r#"{ "kind": "fast_blur", "params": { "radius": 4 } }"#).unwrap();
    assert_eq!(effect.effect_type(), EffectType::FastBlur);

    let style: LayerStyle = serde_json::from_str(r#"{ "kind": "drop_shadow" }"#).unwrap();
    assert_eq!(style.style_type(), LayerStyleType::DropShadow);
    assert!(style.params.is_null());
}

#[test]
fn unrecognized_kinds_map_to_unknown() {
    let effect: Effect = serde_json::from_str(r#"{ "kind": "chromatic_aberration" }"#).unwrap();
    assert_eq!(effect.effect_type(), EffectType::Unknown);
    let style: LayerStyle = serde_json::from_str(r#"{ "kind": "bevel" }"#).unwrap();
    assert_eq!(style.style_type(), LayerStyleType::Unknown);
}

#[test]
fn partial_params_keep_field_defaults() {
    let effect: Effect =
        serde_json::from_str(r#"{ "kind": "mosaic", "params": { "repeat": true } }"#).unwrap();
    assert_eq!(
        effect.params_or_default::<Params>(),
        Params {
            radius: 0.0,
            repeat: true
        }
    );
}

#[test]
fn malformed_params_fall_back_to_default() {
    let effect: Effect =
        serde_json::from_str(r#"{ "kind": "mosaic", "params": { "radius": "wide" } }"#).unwrap();
    assert_eq!(effect.params_or_default::<Params>(), Params::default());

    let not_an_object = serde_json::json!("wide");
    assert_eq!(
        params_or_default::<Params>(&not_an_object),
        Params::default()
    );
}

#[test]
fn null_params_are_omitted_when_serialized() {
    let json = serde_json::to_string(&Effect::new(EffectType::Glow)).unwrap();
    assert_eq!(json, r#"{"kind":"glow"}"#);
}
