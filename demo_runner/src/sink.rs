//! Element-state sink.
//!
//! Stands in for the page: each element id carries a set of visual markers
//! that renderers apply and remove in response to classifier events.
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt,
};

use stability_classifier::Event;

/// Visual state markers, named after the CSS classes of the demo pages.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Marker {
    Selected,
    Open,
    Closed,
    Active,
    On,
    Off,
}

impl Marker {
    pub fn class_name(&self) -> &'static str {
        match self {
            Marker::Selected => "selected",
            Marker::Open => "open",
            Marker::Closed => "closed",
            Marker::Active => "active",
            Marker::On => "on",
            Marker::Off => "off",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// Markers per element. The element set is fixed at construction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementBoard {
    elements: BTreeMap<String, BTreeSet<Marker>>,
}

impl ElementBoard {
    pub fn new<I, S>(element_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            elements: element_ids
                .into_iter()
                .map(|id| (id.into(), BTreeSet::new()))
                .collect(),
        }
    }

    pub fn apply(&mut self, element: &str, marker: Marker) {
        match self.elements.get_mut(element) {
            Some(markers) => {
                if markers.insert(marker) {
                    log::debug!("{element}: +{marker}");
                }
            }
            None => log::warn!("No element {element:?} to mark {marker}"),
        }
    }

    pub fn remove(&mut self, element: &str, marker: Marker) {
        if let Some(markers) = self.elements.get_mut(element) {
            if markers.remove(&marker) {
                log::debug!("{element}: -{marker}");
            }
        }
    }

    /// Remove `marker` from every element.
    pub fn clear(&mut self, marker: Marker) {
        for (element, markers) in self.elements.iter_mut() {
            if markers.remove(&marker) {
                log::debug!("{element}: -{marker}");
            }
        }
    }

    pub fn has(&self, element: &str, marker: Marker) -> bool {
        self.elements
            .get(element)
            .map_or(false, |markers| markers.contains(&marker))
    }

    pub fn markers(&self, element: &str) -> Vec<Marker> {
        self.elements
            .get(element)
            .map(|markers| markers.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn element_ids(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }
}

impl fmt::Display for ElementBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (element, markers)) in self.elements.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            let classes: Vec<_> = markers.iter().map(Marker::class_name).collect();
            write!(f, "{}[{}]", element, classes.join(" "))?;
        }
        Ok(())
    }
}

/// Label to element lookup, case-insensitive on the label.
#[derive(Clone, Debug, Default)]
pub struct ElementMap {
    by_label: HashMap<String, String>,
}

impl ElementMap {
    pub fn new<I, L, E>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, E)>,
        L: AsRef<str>,
        E: Into<String>,
    {
        Self {
            by_label: pairs
                .into_iter()
                .map(|(label, element)| (label.as_ref().to_lowercase(), element.into()))
                .collect(),
        }
    }

    /// Elements named after the labels they represent.
    pub fn identity(element_ids: &[&str]) -> Self {
        Self::new(element_ids.iter().map(|id| (*id, *id)))
    }

    pub fn element_for(&self, label: &str) -> Option<&str> {
        self.by_label.get(&label.to_lowercase()).map(String::as_str)
    }
}

/// Consumer of classifier events.
pub trait EventSink {
    fn handle(&mut self, event: &Event);

    fn board(&self) -> &ElementBoard;
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_apply_and_remove() {
        let mut board = ElementBoard::new(["kaffe", "lys", "tv"]);
        board.apply("lys", Marker::Selected);
        board.apply("lys", Marker::On);
        board.apply("radio", Marker::On);

        assert!(board.has("lys", Marker::Selected));
        assert_eq!(board.markers("lys"), [Marker::Selected, Marker::On]);
        assert!(board.markers("radio").is_empty());

        board.remove("lys", Marker::Selected);
        assert_eq!(board.to_string(), "kaffe[] lys[on] tv[]");
    }

    #[test]
    fn test_clear_marker_everywhere() {
        let mut board = ElementBoard::new(["a", "b"]);
        board.apply("a", Marker::Active);
        board.apply("b", Marker::Active);
        board.apply("b", Marker::Selected);

        board.clear(Marker::Active);

        assert_eq!(board.to_string(), "a[] b[selected]");
    }

    #[test]
    fn test_element_map_ignores_case() {
        let map = ElementMap::new([("Plastik", "plastic-bin")]);
        assert_eq!(map.element_for("plastik"), Some("plastic-bin"));
        assert_eq!(map.element_for("metal"), None);

        let map = ElementMap::identity(&["tv"]);
        assert_eq!(map.element_for("TV"), Some("tv"));
    }
}
