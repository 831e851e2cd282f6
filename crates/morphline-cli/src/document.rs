//! JSON description of one animated element.
//!
//! ```json
//! {
//!   "keystates": [
//!     { "time": 0.0, "state": { "kind": "circle", "radius": 20.0 } },
//!     { "time": 1.0, "state": { "kind": "rectangle", "width": 40.0, "height": 40.0 },
//!       "transition": { "easing": { "pos": "ease_in_out" } } }
//!   ],
//!   "attribute_easing": { "opacity": "ease_out" }
//! }
//! ```

use morphline::{
    AlignerStrategy, EngineConfig, Easing, Element, Field, Keystate, MapperStrategy, MorphError,
    MorphingConfig, SegmentOverrides, ShapeState,
};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct ElementDoc {
    pub keystates: Vec<KeystateDoc>,
    #[serde(default)]
    pub attribute_easing: HashMap<Field, Easing>,
    #[serde(default)]
    pub default_transition: Option<TransitionDoc>,
}

#[derive(Debug, Deserialize)]
pub struct KeystateDoc {
    pub time: f64,
    pub state: ShapeState,
    /// Present on hard cuts: the record leaving this keystate.
    #[serde(default)]
    pub outgoing: Option<ShapeState>,
    /// Overrides for the segment leaving this keystate.
    #[serde(default)]
    pub transition: Option<TransitionDoc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TransitionDoc {
    pub easing: HashMap<Field, Easing>,
    pub mapper: Option<MapperStrategy>,
    pub aligner: Option<AlignerStrategy>,
    pub linear_angles: bool,
}

impl TransitionDoc {
    pub fn overrides(self) -> SegmentOverrides {
        let mut overrides = SegmentOverrides::new().linear_angles(self.linear_angles);
        for (field, easing) in self.easing {
            overrides = overrides.ease(field, easing);
        }
        if self.mapper.is_some() || self.aligner.is_some() {
            overrides = overrides.morphing(MorphingConfig {
                mapper: self.mapper,
                aligner: self.aligner,
            });
        }
        overrides
    }
}

impl KeystateDoc {
    fn keystate(self, config: &EngineConfig) -> Keystate {
        let state = config.with_resolution(self.state);
        let keystate = match self.outgoing {
            Some(outgoing) => Keystate::cut(self.time, state, config.with_resolution(outgoing)),
            None => Keystate::new(self.time, state),
        };
        match self.transition {
            Some(transition) => keystate.with_transition(transition.overrides()),
            None => keystate,
        }
    }
}

impl ElementDoc {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn build(self, config: &EngineConfig) -> Result<Element, MorphError> {
        let keystates = self
            .keystates
            .into_iter()
            .map(|doc| doc.keystate(config))
            .collect();
        let mut builder = config.element().segment(keystates);
        for (field, easing) in self.attribute_easing {
            builder = builder.attribute_easing(field, easing);
        }
        if let Some(transition) = self.default_transition {
            builder = builder.default_transition(transition.overrides());
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MORPH: &str = r#"{
        "keystates": [
            { "time": 0.0, "state": { "kind": "circle", "radius": 10.0 } },
            { "time": 1.0,
              "state": { "kind": "rectangle", "width": 20.0, "height": 20.0, "pos": [30.0, 0.0] } }
        ],
        "attribute_easing": { "pos": "ease_in_out" }
    }"#;

    #[test]
    fn test_builds_element() {
        let element = ElementDoc::from_json_str(MORPH)
            .unwrap()
            .build(&EngineConfig::default())
            .unwrap();
        assert_eq!(element.keystates().len(), 2);
        let mid = element.resolve(0.5).unwrap();
        assert!((mid.pos.x - 15.0).abs() < 1e-3);
        assert!(mid.morph.is_some());
    }

    #[test]
    fn test_cut_and_transition() {
        let json = r#"{
            "keystates": [
                { "time": 0.0, "state": { "kind": "circle", "radius": 1.0 },
                  "transition": { "easing": { "opacity": "hold" }, "mapper": { "strategy": "simple" } } },
                { "time": 0.5, "state": { "kind": "circle", "radius": 1.0, "opacity": 0.0 },
                  "outgoing": { "kind": "circle", "radius": 5.0 } },
                { "time": 1.0, "state": { "kind": "circle", "radius": 5.0 } }
            ]
        }"#;
        let element = ElementDoc::from_json_str(json)
            .unwrap()
            .build(&EngineConfig::default())
            .unwrap();
        let overrides = element.segment_overrides(0).unwrap();
        assert!(overrides.easing.contains_key(&Field::Opacity));
        assert_eq!(
            overrides.morphing.as_ref().and_then(|m| m.mapper.clone()),
            Some(MapperStrategy::Simple)
        );
        assert_eq!(element.resolve(0.25).unwrap().opacity, 1.0);
    }

    #[test]
    fn test_rejects_out_of_range_time() {
        let json = r#"{ "keystates": [ { "time": 1.5, "state": { "kind": "line", "length": 1.0 } } ] }"#;
        let err = ElementDoc::from_json_str(json)
            .unwrap()
            .build(&EngineConfig::default())
            .unwrap_err();
        assert_eq!(err, MorphError::KeystateTime(1.5));
    }
}
