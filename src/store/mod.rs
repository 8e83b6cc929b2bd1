// SectionStore - Centralized mutable playback state
//
// This struct holds the ordered section sequence and everything the
// scheduler reads from the outside world: the active-section pointer, the
// global loop preference, the precount configuration and the zero-sections
// fallback settings. The UI layer mutates it; the scheduler re-reads it at
// every tick boundary so edits take effect on the very next tick.

use crate::model::{DefaultPlaybackSettings, Section};
use uuid::Uuid;

/// Ordered section sequence plus playback preferences
///
/// Acts as the single source of truth for everything outside the
/// scheduler's own position state.
#[derive(Debug, Clone, Default)]
pub struct SectionStore {
    sections: Vec<Section>,
    active_section_id: Option<Uuid>,
    default_settings: DefaultPlaybackSettings,
    user_preferred_looping: bool,
    precount_enabled: bool,
    precount_bars: u32,
}

impl SectionStore {
    pub fn new() -> Self {
        Self {
            precount_bars: 1,
            ..Self::default()
        }
    }

    /// Create a store from an ordered section list
    /// The first section becomes active
    pub fn with_sections(sections: Vec<Section>) -> Self {
        let active_section_id = sections.first().map(|s| s.id);
        Self {
            sections,
            active_section_id,
            precount_bars: 1,
            ..Self::default()
        }
    }

    /// Load a section list from JSON (the demo binary's input format)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let sections: Vec<Section> = serde_json::from_str(json)?;
        Ok(Self::with_sections(sections))
    }

    // --- Section sequence ---

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn section(&self, id: Uuid) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn first_section(&self) -> Option<&Section> {
        self.sections.first()
    }

    /// The section following `id` in sequence order, if any
    pub fn section_after(&self, id: Uuid) -> Option<&Section> {
        let index = self.sections.iter().position(|s| s.id == id)?;
        self.sections.get(index + 1)
    }

    pub fn add_section(&mut self, section: Section) {
        let id = section.id;
        self.sections.push(section);
        if self.active_section_id.is_none() {
            self.active_section_id = Some(id);
        }
    }

    /// Apply an edit to the section with the given id
    /// Returns false when the id does not resolve
    pub fn update_section(&mut self, id: Uuid, edit: impl FnOnce(&mut Section)) -> bool {
        match self.sections.iter_mut().find(|s| s.id == id) {
            Some(section) => {
                edit(section);
                true
            }
            None => false,
        }
    }

    /// Remove a section; when the active section is removed, the nearest
    /// remaining neighbour becomes active
    pub fn remove_section(&mut self, id: Uuid) -> bool {
        let Some(index) = self.sections.iter().position(|s| s.id == id) else {
            return false;
        };
        self.sections.remove(index);

        if self.active_section_id == Some(id) {
            let neighbour = index.min(self.sections.len().saturating_sub(1));
            self.active_section_id = self.sections.get(neighbour).map(|s| s.id);
        }
        true
    }

    /// Move a section from one index to another, preserving sequence order
    /// of the remaining sections
    pub fn reorder_sections(&mut self, from: usize, to: usize) {
        if from >= self.sections.len() || to >= self.sections.len() {
            return;
        }
        let section = self.sections.remove(from);
        self.sections.insert(to, section);
    }

    // --- Active section ---

    pub fn active_section_id(&self) -> Option<Uuid> {
        self.active_section_id
    }

    pub fn active_section(&self) -> Option<&Section> {
        self.active_section_id.and_then(|id| self.section(id))
    }

    /// Point playback at a section; ids that do not resolve fall back to the
    /// first section (or none when the sequence is empty)
    pub fn set_active_section(&mut self, id: Option<Uuid>) {
        self.active_section_id = match id {
            Some(id) if self.section(id).is_some() => Some(id),
            _ => self.sections.first().map(|s| s.id),
        };
    }

    // --- Defaults / fallback mode ---

    pub fn default_settings(&self) -> &DefaultPlaybackSettings {
        &self.default_settings
    }

    pub fn set_default_settings(&mut self, settings: DefaultPlaybackSettings) {
        self.default_settings = settings;
    }

    /// The synthetic section played when no sections are authored
    pub fn fallback_section(&self) -> Section {
        self.default_settings.fallback_section()
    }

    // --- Loop preference ---

    /// Effective global loop flag: forced on when no sections exist
    pub fn global_loop(&self) -> bool {
        if self.sections.is_empty() {
            true
        } else {
            self.user_preferred_looping
        }
    }

    /// Set the user's loop preference; ignored in zero-sections mode where
    /// looping is forced
    pub fn set_global_loop(&mut self, enabled: bool) {
        if !self.sections.is_empty() {
            self.user_preferred_looping = enabled;
        }
    }

    // --- Precount configuration ---
    // Read by the scheduler at start time only; changes during an active
    // precount do not retroactively alter it

    pub fn configure_precount(&mut self, enabled: bool, bars: u32) {
        self.precount_enabled = enabled;
        self.precount_bars = bars;
    }

    pub fn precount_enabled(&self) -> bool {
        self.precount_enabled
    }

    pub fn precount_bars(&self) -> u32 {
        self.precount_bars
    }
}
