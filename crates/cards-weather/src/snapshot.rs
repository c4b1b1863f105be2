use crate::types::WeatherReport;

/// Last report delivered to the watch, used to suppress repeats
#[derive(Debug, Clone, Default)]
pub struct WeatherSnapshot {
    last: Option<WeatherReport>,
}

impl WeatherSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&WeatherReport> {
        self.last.as_ref()
    }

    /// Store `report` if any field differs from the last one.
    ///
    /// Returns true when the report was stored and should be delivered.
    pub fn update(&mut self, report: &WeatherReport) -> bool {
        if self.last.as_ref() == Some(report) {
            return false;
        }
        self.last = Some(report.clone());
        true
    }
}
