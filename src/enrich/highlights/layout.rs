use std::collections::BTreeMap;

use crate::enrich::model::{Importance, Layout, Side};

use super::SynthesisState;

/// Delay before the right-hand text of a dual highlight appears.
pub const DUAL_RIGHT_STAGGER: f64 = 0.25;

#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub layout: Layout,
    pub importance: Importance,
    pub side: Option<Side>,
    pub supporting_texts: Option<BTreeMap<Side, String>>,
    pub stagger_offsets: Option<BTreeMap<Side, f64>>,
}

impl Placement {
    pub fn bottom() -> Self {
        Self {
            layout: Layout::Bottom,
            importance: Importance::Primary,
            side: None,
            supporting_texts: None,
            stagger_offsets: None,
        }
    }

    pub fn dual(left: String, right: String) -> Self {
        Self {
            layout: Layout::Dual,
            importance: Importance::Primary,
            side: None,
            supporting_texts: Some(BTreeMap::from([(Side::Left, left), (Side::Right, right)])),
            stagger_offsets: Some(BTreeMap::from([
                (Side::Left, 0.0),
                (Side::Right, DUAL_RIGHT_STAGGER),
            ])),
        }
    }

    pub fn single(side: Side, text: String) -> Self {
        Self {
            layout: side.layout(),
            importance: Importance::Supporting,
            side: Some(side),
            supporting_texts: Some(BTreeMap::from([(side, text)])),
            stagger_offsets: None,
        }
    }
}

/// Layout for a primary phrase with optional side phrases.
///
/// One side phrase lands on whichever side the toggle points at, whatever
/// side it was supplied for.
pub fn resolve(left: Option<String>, right: Option<String>, state: &mut SynthesisState) -> Placement {
    match (left, right) {
        (Some(left), Some(right)) => Placement::dual(left, right),
        (Some(text), None) | (None, Some(text)) => Placement::single(state.take_side(), text),
        (None, None) => Placement::bottom(),
    }
}

pub fn position_for(layout: Layout) -> &'static str {
    match layout {
        Layout::Bottom | Layout::Dual => "bottom",
        Layout::Left => "left",
        Layout::Right => "right",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_sides_make_a_staggered_dual() {
        let mut state = SynthesisState::default();
        let placement = resolve(Some("EBV".into()), Some("MONO".into()), &mut state);
        assert_eq!(placement.layout, Layout::Dual);
        assert_eq!(placement.importance, Importance::Primary);
        assert_eq!(placement.stagger_offsets.unwrap()[&Side::Right], 0.25);
        // dual layouts do not consume the toggle
        assert_eq!(state.side, Side::Left);
    }

    #[test]
    fn single_sides_follow_the_toggle() {
        let mut state = SynthesisState::default();
        let first = resolve(None, Some("A".into()), &mut state);
        let second = resolve(None, Some("B".into()), &mut state);
        assert_eq!(first.layout, Layout::Left);
        assert_eq!(second.layout, Layout::Right);
        assert_eq!(second.importance, Importance::Supporting);
        assert_eq!(second.supporting_texts.unwrap()[&Side::Right], "B");
    }

    #[test]
    fn no_sides_is_bottom_primary() {
        let mut state = SynthesisState::default();
        assert_eq!(resolve(None, None, &mut state), Placement::bottom());
    }
}
