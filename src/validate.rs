//! Results validation.
//!
//! Compares a page before and after extraction to spot extractions that
//! threw away most of the article. The verdict is advisory: failures are
//! reported to the observer and never stop a section.

use std::sync::Arc;

use crate::observer::{default_observer, Observer};

/// Content shorter than this share of the original, in percent, fails.
pub const MIN_LENGTH_PERCENT: f64 = 2.5;

/// Fewer paragraphs than this share of the original, in percent, fails.
pub const MIN_PARAGRAPH_PERCENT: f64 = 15.0;

const PARAGRAPH_CLOSE: &str = "</p>";

/// One check: its name and a function of `(pre, post)` returning the kept
/// share in percent, or `None` when the original gives nothing to compare.
struct Check {
    name: &'static str,
    threshold: f64,
    measure: fn(&str, &str) -> Option<f64>,
}

const CHECKS: &[Check] = &[
    Check {
        name: "length",
        threshold: MIN_LENGTH_PERCENT,
        measure: length_percent,
    },
    Check {
        name: "paragraphCount",
        threshold: MIN_PARAGRAPH_PERCENT,
        measure: paragraph_percent,
    },
];

fn percent(post: usize, pre: usize) -> Option<f64> {
    (pre > 0).then(|| 100.0 * post as f64 / pre as f64)
}

fn length_percent(pre: &str, post: &str) -> Option<f64> {
    percent(post.len(), pre.len())
}

fn paragraph_percent(pre: &str, post: &str) -> Option<f64> {
    percent(post.matches(PARAGRAPH_CLOSE).count(), pre.matches(PARAGRAPH_CLOSE).count())
}

/// Heuristic before/after comparison for one extraction.
pub struct ResultsValidator<'a> {
    url: Option<&'a str>,
    pre: &'a str,
    post: &'a str,
    observer: Arc<dyn Observer>,
}

impl<'a> ResultsValidator<'a> {
    /// A validator for markup `pre` extracted down to `post`.
    #[must_use]
    pub fn new(url: Option<&'a str>, pre: &'a str, post: &'a str) -> Self {
        Self {
            url,
            pre,
            post,
            observer: default_observer(),
        }
    }

    /// Report failures to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    fn run(&self, check: &Check) -> bool {
        match (check.measure)(self.pre, self.post) {
            Some(kept) if kept <= check.threshold => {
                self.observer.validation_failed(self.url, check.name, kept);
                false
            }
            _ => true,
        }
    }

    /// False when the content shrank to 2.5% of its original length or less.
    #[must_use]
    pub fn length_validation(&self) -> bool {
        self.run(&CHECKS[0])
    }

    /// False when the `</p>` count shrank to 15% of the original or less.
    #[must_use]
    pub fn paragraph_count_validation(&self) -> bool {
        self.run(&CHECKS[1])
    }

    /// True when every check passes. All checks run, so each failure is
    /// reported.
    #[must_use]
    pub fn validate(&self) -> bool {
        CHECKS.iter().fold(true, |ok, check| self.run(check) && ok)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(&'static str, f64)>>);

    impl Observer for Recorder {
        fn validation_failed(&self, _url: Option<&str>, validator: &'static str, percent: f64) {
            self.0.lock().unwrap().push((validator, percent));
        }
    }

    #[test]
    fn test_length_threshold_is_inclusive() {
        let pre = "x".repeat(1000);
        assert!(!ResultsValidator::new(None, &pre, &"x".repeat(25)).length_validation());
        assert!(ResultsValidator::new(None, &pre, &"x".repeat(26)).length_validation());
    }

    #[test]
    fn test_paragraph_threshold() {
        let pre = "<p>a</p>".repeat(20);
        assert!(!ResultsValidator::new(None, &pre, &"<p>a</p>".repeat(3)).paragraph_count_validation());
        assert!(ResultsValidator::new(None, &pre, &"<p>a</p>".repeat(4)).paragraph_count_validation());
    }

    #[test]
    fn test_empty_original_passes() {
        let validator = ResultsValidator::new(None, "", "");
        assert!(validator.validate());
        assert!(ResultsValidator::new(None, "no paragraphs", "x").paragraph_count_validation());
    }

    #[test]
    fn test_validate_reports_every_failure() {
        let recorder = Arc::new(Recorder::default());
        let pre = "<p>long paragraph text</p>".repeat(100);
        let ok = ResultsValidator::new(Some("http://a.fake/"), &pre, "<p>x</p>")
            .with_observer(recorder.clone())
            .validate();
        assert!(!ok);
        let names: Vec<&str> = recorder.0.lock().unwrap().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["length", "paragraphCount"]);
    }
}
