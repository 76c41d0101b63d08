//! Search result models

/// One search result returned by the media engine
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// URL the fetch step resolves against
    pub locator: String,
    /// Display title
    pub title: String,
    /// Uploader or channel name
    pub uploader: String,
    /// Duration in seconds, if the provider reports it
    pub duration: Option<f64>,
    /// Thumbnail URL
    pub thumbnail: Option<String>,
}

impl Candidate {
    /// Create a new candidate
    pub fn new(locator: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            title: title.into(),
            uploader: "Unknown artist".to_string(),
            duration: None,
            thumbnail: None,
        }
    }

    pub fn with_uploader(mut self, uploader: impl Into<String>) -> Self {
        self.uploader = uploader.into();
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    /// Whole seconds, for transports that want an integer duration
    pub fn duration_secs(&self) -> Option<u32> {
        self.duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(|d| d as u32)
    }

    /// Human-readable duration, see [`format_duration`]
    pub fn display_duration(&self) -> String {
        format_duration(self.duration)
    }
}

/// Format seconds as `MM:SS`, or `HH:MM:SS` from one hour up; unknown is `??:??`
pub fn format_duration(seconds: Option<f64>) -> String {
    let total = match seconds {
        Some(s) if s.is_finite() && s >= 0.0 => s as u64,
        _ => return "??:??".to_string(),
    };
    let (minutes, secs) = (total / 60, total % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
