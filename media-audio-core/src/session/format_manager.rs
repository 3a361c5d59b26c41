use std::fmt;

use crate::models::audio_format::AudioFormat;
use crate::models::error::AudioError;

/// Predicate narrowing the formats an endpoint offers.
pub type FormatFilter = Box<dyn Fn(&AudioFormat) -> bool + Send + Sync>;

/// Supported format list, optional restriction and the current selection.
pub struct FormatManager {
    supported: Vec<AudioFormat>,
    filter: Option<FormatFilter>,
    selected: Option<AudioFormat>,
}

impl FormatManager {
    pub fn new(supported: Vec<AudioFormat>) -> Self {
        Self {
            supported,
            filter: None,
            selected: None,
        }
    }

    /// Supported formats after the restriction filter, in encoder order.
    pub fn formats(&self) -> Vec<AudioFormat> {
        self.supported
            .iter()
            .filter(|f| self.allows(f))
            .cloned()
            .collect()
    }

    /// Replace the restriction filter.
    ///
    /// A selected format the new filter rejects is dropped, so it can not be
    /// used on the next negotiation.
    pub fn restrict(&mut self, filter: FormatFilter) {
        self.filter = Some(filter);
        if let Some(selected) = &self.selected {
            if !self.allows(selected) {
                log::debug!("Selected format {} no longer allowed", selected.format_name);
                self.selected = None;
            }
        }
    }

    pub fn is_supported(&self, format: &AudioFormat) -> bool {
        self.allows(format) && self.supported.iter().any(|f| f.matches(format))
    }

    /// Select `format`. Nothing changes if it is not in [`formats`](Self::formats).
    pub fn select(&mut self, format: &AudioFormat) -> Result<(), AudioError> {
        if !self.is_supported(format) {
            return Err(AudioError::UnsupportedFormat(format!(
                "{} {}:{} Hz",
                format.format_id, format.format_name, format.clock_rate
            )));
        }
        self.selected = Some(format.clone());
        Ok(())
    }

    pub fn selected(&self) -> Option<&AudioFormat> {
        self.selected.as_ref()
    }

    fn allows(&self, format: &AudioFormat) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(format))
    }
}

impl fmt::Debug for FormatManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatManager")
            .field("supported", &self.supported)
            .field("restricted", &self.filter.is_some())
            .field("selected", &self.selected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> FormatManager {
        FormatManager::new(vec![AudioFormat::pcmu(), AudioFormat::pcma(), AudioFormat::g722()])
    }

    #[test]
    fn unrestricted_lists_everything() {
        let fm = manager();
        assert_eq!(fm.formats().len(), 3);
        assert!(fm.selected().is_none());
    }

    #[test]
    fn select_only_accepts_supported_formats() {
        let mut fm = manager();
        fm.select(&AudioFormat::pcma()).unwrap();
        assert_eq!(fm.selected(), Some(&AudioFormat::pcma()));

        let err = fm.select(&AudioFormat::opus()).unwrap_err();
        assert!(matches!(err, AudioError::UnsupportedFormat(_)));
        assert_eq!(fm.selected(), Some(&AudioFormat::pcma()));
    }

    #[test]
    fn restriction_narrows_formats_and_selection() {
        let mut fm = manager();
        fm.restrict(Box::new(|f| f.clock_rate == 8000));

        let formats = fm.formats();
        assert_eq!(formats.len(), 2);
        assert!(formats.iter().all(|f| f.clock_rate == 8000));
        assert!(fm.select(&AudioFormat::g722()).is_err());
    }

    #[test]
    fn restriction_replaces_previous_filter() {
        let mut fm = manager();
        fm.restrict(Box::new(|f| f.clock_rate == 16000));
        fm.restrict(Box::new(|f| f.format_name == "PCMU"));
        assert_eq!(fm.formats(), vec![AudioFormat::pcmu()]);
    }

    #[test]
    fn restriction_drops_a_rejected_selection() {
        let mut fm = manager();
        fm.select(&AudioFormat::g722()).unwrap();
        fm.restrict(Box::new(|f| f.clock_rate == 8000));
        assert!(fm.selected().is_none());

        fm.select(&AudioFormat::pcmu()).unwrap();
        fm.restrict(Box::new(|f| f.clock_rate <= 8000));
        assert_eq!(fm.selected(), Some(&AudioFormat::pcmu()));
    }
}
