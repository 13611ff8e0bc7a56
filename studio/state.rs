use ferrite_leaf::{DirectoryStore, HistogramExtractor, ModelRepository};

// ---------------------------------------------------------------------------
// Flash messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum FlashKind { Success, Warning }

#[derive(Debug, Clone)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Success, text: text.into() }
    }
    pub fn warning(text: impl Into<String>) -> Self {
        FlashMessage { kind: FlashKind::Warning, text: text.into() }
    }
}

// ---------------------------------------------------------------------------
// Main state struct
// ---------------------------------------------------------------------------

/// State of the single interactive session.
///
/// Requests are handled one at a time on the main thread, so handlers get
/// `&mut StudioState` directly.
pub struct StudioState {
    /// Model, encoder and test set; loaded once, then shared read-only.
    pub repository: ModelRepository<DirectoryStore>,
    pub extractor:  HistogramExtractor,
    /// False after the user pressed Exit; every page then shows the
    /// "closed" notice until `/restart`.
    pub open:       bool,
    /// One-shot flash message for the next page render.
    pub flash:      Option<FlashMessage>,
}

impl StudioState {
    pub fn new(repository: ModelRepository<DirectoryStore>, extractor: HistogramExtractor) -> Self {
        StudioState {
            repository,
            extractor,
            open:  true,
            flash: None,
        }
    }

    /// Takes and returns the current flash message, clearing it.
    pub fn take_flash(&mut self) -> Option<FlashMessage> {
        self.flash.take()
    }
}
