use serde::{Serialize, de::DeserializeOwned};

use crate::foundation::error::{WavyteError, WavyteResult};

/// Effect kinds a layer may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    /// Four-corner perspective pin.
    CornerPin,
    /// Spherical bulge distortion.
    Bulge,
    /// Repeated tiling of the layer.
    MotionTile,
    /// Bright-area bloom.
    Glow,
    /// Per-channel levels.
    LevelsIndividual,
    /// Gaussian blur.
    FastBlur,
    /// Offset pixels by another layer's channels.
    DisplacementMap,
    /// Spin or zoom blur around a center.
    RadialBlur,
    /// Block pixelation.
    Mosaic,
    /// Brightness and contrast adjustment.
    BrightnessContrast,
    /// Hue, saturation and lightness adjustment.
    HueSaturation,
    /// Any kind this crate does not recognize.
    #[serde(other)]
    Unknown,
}

/// Layer style kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerStyleType {
    /// Offset, blurred shadow beneath the layer.
    DropShadow,
    /// Outline around the layer.
    Stroke,
    /// Glow outside the layer edges.
    OuterGlow,
    /// Gradient fill over the layer.
    GradientOverlay,
    /// Any kind this crate does not recognize.
    #[serde(other)]
    Unknown,
}

/// Declarative effect attached to a layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Effect {
    /// Effect kind.
    pub kind: EffectType,
    /// Kind-specific parameter object.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

/// Declarative layer style.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerStyle {
    /// Style kind.
    pub kind: LayerStyleType,
    /// Kind-specific parameter object.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

impl Effect {
    /// An effect of `kind` with default parameters.
    pub fn new(kind: EffectType) -> Self {
        Self {
            kind,
            params: serde_json::Value::Null,
        }
    }

    /// An effect of `kind` carrying typed `params`.
    pub fn with_params<P: Serialize>(kind: EffectType, params: &P) -> WavyteResult<Self> {
        Ok(Self {
            kind,
            params: serde_json::to_value(params).map_err(|e| WavyteError::serde(e.to_string()))?,
        })
    }

    /// The effect kind.
    pub fn effect_type(&self) -> EffectType {
        self.kind
    }

    /// Decode `params` as `P`, see [`params_or_default`].
    pub fn params_or_default<P: DeserializeOwned + Default>(&self) -> P {
        params_or_default(&self.params)
    }
}

impl LayerStyle {
    /// A style of `kind` with default parameters.
    pub fn new(kind: LayerStyleType) -> Self {
        Self {
            kind,
            params: serde_json::Value::Null,
        }
    }

    /// A style of `kind` carrying typed `params`.
    pub fn with_params<P: Serialize>(kind: LayerStyleType, params: &P) -> WavyteResult<Self> {
        Ok(Self {
            kind,
            params: serde_json::to_value(params).map_err(|e| WavyteError::serde(e.to_string()))?,
        })
    }

    /// The style kind.
    pub fn style_type(&self) -> LayerStyleType {
        self.kind
    }

    /// Decode `params` as `P`, see [`params_or_default`].
    pub fn params_or_default<P: DeserializeOwned + Default>(&self) -> P {
        params_or_default(&self.params)
    }
}

/// Decode a parameter object leniently.
///
/// `null` yields `P::default()`. Malformed parameters are logged and also yield the default, so a
/// bad descriptor degrades to the neutral effect instead of dropping the layer.
pub fn params_or_default<P: DeserializeOwned + Default>(params: &serde_json::Value) -> P {
    if params.is_null() {
        return P::default();
    }
    match P::deserialize(params) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(
                error = %e,
                params = std::any::type_name::<P>(),
                "malformed filter params, using defaults"
            );
            P::default()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/filters/descriptor.rs"]
mod tests;
