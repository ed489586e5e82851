// ─── Launch Events ───
// Canonical progress shape and the observer the caller plugs in.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Canonical progress record pushed to the observer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub task: String,
    /// `None` when no deterministic value can be derived.
    pub percent: Option<i64>,
    pub current: u64,
    pub total: u64,
    pub file: String,
}

/// Progress as a launch primitive reports it. Every field is optional and
/// different emitters fill different ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawProgress {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub percent: Option<f64>,
    /// Fraction in `0.0..=1.0`.
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub current: Option<f64>,
    #[serde(default)]
    pub done: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// Map any [`RawProgress`] onto a [`ProgressEvent`].
///
/// Percent lookup order: `percentage`, `percent`, `progress * 100` (rounded),
/// then `floor(current / total * 100)` when `total > 0`, else `None`.
pub fn normalize_progress(raw: &RawProgress) -> ProgressEvent {
    let finite = |v: Option<f64>| v.filter(|x| x.is_finite());

    let current = finite(raw.current).or(finite(raw.done)).unwrap_or(0.0);
    let total = finite(raw.total).unwrap_or(0.0);

    let percent = finite(raw.percentage)
        .or(finite(raw.percent))
        .map(|p| p.round() as i64)
        .or_else(|| finite(raw.progress).map(|p| (p * 100.0).round() as i64))
        .or_else(|| (total > 0.0).then(|| (current / total * 100.0).floor() as i64));

    let kind = non_empty(&raw.kind).unwrap_or("download").to_string();
    let task = non_empty(&raw.task)
        .or(non_empty(&raw.kind))
        .unwrap_or("download")
        .to_string();
    let file = non_empty(&raw.file)
        .or(non_empty(&raw.name))
        .or(non_empty(&raw.path))
        .unwrap_or("")
        .to_string();

    ProgressEvent {
        kind,
        task,
        percent,
        current: current.max(0.0) as u64,
        total: total.max(0.0) as u64,
        file,
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

pub type LogCallback = Arc<dyn Fn(&str) + Send + Sync>;
pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Live sinks for log lines and progress. Nothing is buffered: an event
/// nobody is listening to is gone.
#[derive(Clone)]
pub struct LaunchObserver {
    on_log: LogCallback,
    on_progress: ProgressCallback,
}

impl LaunchObserver {
    pub fn new(
        on_log: impl Fn(&str) + Send + Sync + 'static,
        on_progress: impl Fn(&ProgressEvent) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_log: Arc::new(on_log),
            on_progress: Arc::new(on_progress),
        }
    }

    pub fn silent() -> Self {
        Self::new(|_| {}, |_| {})
    }

    pub fn log(&self, line: impl AsRef<str>) {
        (self.on_log)(line.as_ref());
    }

    pub fn progress(&self, event: &ProgressEvent) {
        (self.on_progress)(event);
    }
}

impl fmt::Debug for LaunchObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchObserver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn explicit_percentage_wins() {
        let event = normalize_progress(&RawProgress {
            percentage: Some(42.0),
            percent: Some(10.0),
            progress: Some(0.9),
            current: Some(1.0),
            total: Some(2.0),
            ..RawProgress::default()
        });
        assert_eq!(event.percent, Some(42));

        let event = normalize_progress(&RawProgress {
            percent: Some(10.0),
            progress: Some(0.9),
            ..RawProgress::default()
        });
        assert_eq!(event.percent, Some(10));
    }

    #[test]
    fn fraction_progress_is_scaled() {
        let event = normalize_progress(&RawProgress {
            progress: Some(0.256),
            ..RawProgress::default()
        });
        assert_eq!(event.percent, Some(26));
    }

    #[test]
    fn counters_fall_back_to_floor() {
        let event = normalize_progress(&RawProgress {
            kind: Some("assets".into()),
            done: Some(2.0),
            total: Some(3.0),
            ..RawProgress::default()
        });
        assert_eq!(event.percent, Some(66));
        assert_eq!(event.current, 2);
        assert_eq!(event.kind, "assets");
        assert_eq!(event.task, "assets");
    }

    #[test]
    fn nothing_derivable_gives_null_percent() {
        let event = normalize_progress(&RawProgress {
            current: Some(5.0),
            total: Some(0.0),
            ..RawProgress::default()
        });
        assert_eq!(
            event,
            ProgressEvent {
                kind: "download".into(),
                task: "download".into(),
                percent: None,
                current: 5,
                total: 0,
                file: String::new(),
            }
        );
    }

    #[test]
    fn file_name_falls_through_aliases() {
        let event = normalize_progress(&RawProgress {
            file: Some(String::new()),
            name: None,
            path: Some("libraries/a.jar".into()),
            ..RawProgress::default()
        });
        assert_eq!(event.file, "libraries/a.jar");
    }

    #[test]
    fn event_serializes_with_type_key() {
        let event = normalize_progress(&RawProgress::default());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "download");
        assert!(json["percent"].is_null());
    }

    #[test]
    fn observer_forwards_to_callbacks() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        let observer = LaunchObserver::new(
            move |line| sink.lock().unwrap().push(line.to_string()),
            |_| {},
        );

        observer.log("hello");
        observer.log(String::from("world"));

        assert_eq!(*lines.lock().unwrap(), vec!["hello", "world"]);
    }
}
