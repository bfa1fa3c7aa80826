//! Renderers turning classifier events into element markers, one per demo.
//!
use stability_classifier::Event;

use crate::sink::{ElementBoard, ElementMap, EventSink, Marker};

/// Keyword demo: object words select an element, command words switch the
/// selected element on or off.
pub struct KeywordRenderer {
    board: ElementBoard,
    elements: ElementMap,
    on_word: String,
    off_word: String,
    sentinels: Vec<String>,
    selection: Option<String>,
}

impl KeywordRenderer {
    pub fn new(
        board: ElementBoard,
        elements: ElementMap,
        on_word: &str,
        off_word: &str,
        sentinels: &[String],
    ) -> Self {
        Self {
            board,
            elements,
            on_word: on_word.to_lowercase(),
            off_word: off_word.to_lowercase(),
            sentinels: sentinels.iter().map(|s| s.to_lowercase()).collect(),
            selection: None,
        }
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    fn switch_selection(&mut self, on: bool) {
        let (add, remove) = match on {
            true => (Marker::On, Marker::Off),
            false => (Marker::Off, Marker::On),
        };

        match self.selection.take() {
            Some(element) => {
                self.board.apply(&element, add);
                self.board.remove(&element, remove);
                self.board.remove(&element, Marker::Selected);
            }
            None => log::info!("Nothing selected to switch {add}"),
        }
    }

    fn select(&mut self, element: String) {
        if let Some(previous) = self.selection.take() {
            self.board.remove(&previous, Marker::Selected);
        }
        self.board.apply(&element, Marker::Selected);
        self.selection = Some(element);
    }
}

impl EventSink for KeywordRenderer {
    fn handle(&mut self, event: &Event) {
        let Event::SelectionChanged(label) = event else {
            return;
        };
        let word = label.to_lowercase();

        if word == self.on_word {
            log::info!("Heard {label:?}");
            self.switch_selection(true);
        } else if word == self.off_word {
            log::info!("Heard {label:?}");
            self.switch_selection(false);
        } else if self.sentinels.contains(&word) {
            log::info!("Background sound registered");
        } else if let Some(element) = self.elements.element_for(&word) {
            log::info!("Heard {label:?}");
            let element = element.to_owned();
            self.select(element);
        } else {
            log::info!("Unidentified word {label:?}");
        }
    }

    fn board(&self) -> &ElementBoard {
        &self.board
    }
}

/// Image demo: the stable class opens its element, every other open element
/// is closed.
pub struct ImageRenderer {
    board: ElementBoard,
    elements: ElementMap,
}

impl ImageRenderer {
    pub fn new(board: ElementBoard, elements: ElementMap) -> Self {
        Self { board, elements }
    }

    fn reset_marking(&mut self) {
        let open: Vec<String> = self
            .board
            .element_ids()
            .filter(|element| self.board.has(element, Marker::Open))
            .map(str::to_owned)
            .collect();

        self.board.clear(Marker::Selected);
        for element in open.iter() {
            self.board.remove(element, Marker::Open);
            self.board.apply(element, Marker::Closed);
        }
    }
}

impl EventSink for ImageRenderer {
    fn handle(&mut self, event: &Event) {
        let Event::SelectionChanged(label) = event else {
            return;
        };

        self.reset_marking();
        match self.elements.element_for(label).map(str::to_owned) {
            Some(element) => {
                log::info!("Found {label:?}");
                self.board.apply(&element, Marker::Selected);
                self.board.remove(&element, Marker::Closed);
                self.board.apply(&element, Marker::Open);
            }
            None => log::info!("Unidentified object {label:?}"),
        }
    }

    fn board(&self) -> &ElementBoard {
        &self.board
    }
}

/// Pose demo: the target is selected, a held target is active.
pub struct PoseRenderer {
    board: ElementBoard,
    elements: ElementMap,
}

impl PoseRenderer {
    pub fn new(board: ElementBoard, elements: ElementMap) -> Self {
        Self { board, elements }
    }

    fn element(&self, label: &str) -> Option<String> {
        let element = self.elements.element_for(label).map(str::to_owned);
        if element.is_none() {
            log::warn!("No element for pose {label:?}");
        }
        element
    }
}

impl EventSink for PoseRenderer {
    fn handle(&mut self, event: &Event) {
        match event {
            Event::TargetChanged(label) => {
                log::info!("New target pose: {label}");
                self.board.clear(Marker::Selected);
                self.board.clear(Marker::Active);
                if let Some(element) = self.element(label) {
                    self.board.apply(&element, Marker::Selected);
                }
            }
            Event::PoseLocked(label) => {
                if let Some(element) = self.element(label) {
                    self.board.apply(&element, Marker::Active);
                }
            }
            Event::PoseLost(label) => {
                log::info!("Failed to hold pose {label}");
                self.board.clear(Marker::Active);
            }
            Event::PoseCompleted(label) => {
                log::info!("Completed pose {label}");
                self.board.clear(Marker::Selected);
                self.board.clear(Marker::Active);
            }
            Event::SelectionChanged(label) => log::debug!("Pose {label} is stable"),
        }
    }

    fn board(&self) -> &ElementBoard {
        &self.board
    }
}
