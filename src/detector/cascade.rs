//! Strategy cascade with early exit
//!
//! One detection call renders each strategy's variant in table order, runs
//! extraction, matching and parsing on it and keeps the best candidate. A
//! candidate above the early exit threshold ends the call at once.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info, trace};

use super::cancel::CancellationToken;
use super::score::{score_dot_matrix, score_fragment};
use super::strategy::{ExtractionMethod, StrategySpec};
use super::types::{
    CandidateSource, DateCandidate, DetectionReport, DetectorError, DetectorOptions, Result,
    StrategyOutcome,
};
use crate::clock::{Clock, SystemClock};
use crate::date_parse::parse_date;
use crate::date_pattern::DatePatternSet;
use crate::dot_matrix::DotMatrixRecognizer;
use crate::monitor::{DetectionPhase, PerformanceMonitor};
use crate::normalize::{ImageVariant, RawImage};
use crate::ocr::{extract_text, rank_fragments, OcrEngine, OcrSession, TextFragment};

/// Candidates found in one batch of fragments
#[derive(Debug, Default)]
struct FragmentScan {
    candidates: Vec<DateCandidate>,
    spans: usize,
}

/// Expiry date detector owning one OCR session
pub struct ExpiryDateDetector<E: OcrEngine> {
    session: OcrSession<E>,
    options: DetectorOptions,
    patterns: DatePatternSet,
    recognizer: DotMatrixRecognizer,
    clock: Box<dyn Clock>,
    monitor: Option<Arc<PerformanceMonitor>>,
}

impl<E: OcrEngine> ExpiryDateDetector<E> {
    /// Open a detection session around `engine`
    pub fn open(engine: E, options: DetectorOptions) -> Result<Self> {
        let patterns = DatePatternSet::standard()?;
        let recognizer = DotMatrixRecognizer::new(options.dot_matrix);
        debug!(
            engine = engine.name(),
            strategies = options.strategies.len(),
            "Opening detection session"
        );
        Ok(Self {
            session: OcrSession::open(engine),
            options,
            patterns,
            recognizer,
            clock: Box::new(SystemClock),
            monitor: None,
        })
    }

    /// Replace the "today" provider
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Attach a shared performance monitor
    #[must_use]
    pub fn with_monitor(mut self, monitor: Arc<PerformanceMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn options(&self) -> &DetectorOptions {
        &self.options
    }

    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    /// Release the OCR engine; later image detection fails with `SessionClosed`
    pub fn close(&mut self) {
        self.session.close();
    }

    /// Detect the expiry date printed on a photo
    ///
    /// `Ok(None)` covers every "no date" outcome; errors are reserved for a
    /// closed session.
    pub fn detect_expiry_date(&mut self, photo: &RawImage) -> Result<Option<NaiveDate>> {
        self.run(photo, None).map(|report| report.date)
    }

    /// Like [`detect_expiry_date`](Self::detect_expiry_date), checking
    /// `token` before every strategy
    pub fn detect_cancellable(
        &mut self,
        photo: &RawImage,
        token: &CancellationToken,
    ) -> Result<Option<NaiveDate>> {
        self.run(photo, Some(token)).map(|report| report.date)
    }

    /// Detect and return the full per-strategy account
    pub fn detect_with_report(&mut self, photo: &RawImage) -> Result<DetectionReport> {
        self.run(photo, None)
    }

    /// Text-only path: match, parse and score already recognized fragments
    ///
    /// Applies the same early exit and acceptance thresholds as the cascade.
    pub fn detect_in_fragments(&self, fragments: &[TextFragment]) -> Option<DateCandidate> {
        let today = self.clock.today();
        let scan = self.scan_fragments(rank_fragments(fragments.to_vec()), today, "text");
        best_candidate(scan.candidates)
            .filter(|c| c.confidence > self.options.acceptance_threshold)
    }

    fn run(
        &mut self,
        photo: &RawImage,
        token: Option<&CancellationToken>,
    ) -> Result<DetectionReport> {
        if !self.session.is_open() {
            return Err(DetectorError::SessionClosed);
        }

        let start = Instant::now();
        let today = self.clock.today();
        let mut best: Option<DateCandidate> = None;
        let mut outcomes = Vec::with_capacity(self.options.strategies.len());
        let mut saw_date_shape = false;
        let mut early_exit = false;

        for index in 0..self.options.strategies.len() {
            if token.is_some_and(CancellationToken::is_cancelled) {
                debug!("Detection cancelled before strategy {}", index);
                return Err(DetectorError::Cancelled);
            }

            let spec = self.options.strategies[index].clone();
            if spec.method == ExtractionMethod::DotMatrix && saw_date_shape {
                debug!(
                    strategy = %spec.tag,
                    "Skipping dot-matrix fallback, date text already seen"
                );
                outcomes.push(StrategyOutcome::skipped(&spec));
                continue;
            }

            let strategy_start = Instant::now();
            let variant = self.timed(DetectionPhase::Preprocessing, || spec.render(photo));
            let mut outcome = StrategyOutcome::new(&spec);

            let candidates = match spec.method {
                ExtractionMethod::Ocr => {
                    let fragments = self.recognize(&variant)?;
                    outcome.fragments = fragments.len();
                    let scan = self.scan_fragments(fragments, today, &spec.tag);
                    outcome.spans = scan.spans;
                    saw_date_shape |= scan.spans > 0;
                    scan.candidates
                }
                ExtractionMethod::DotMatrix => self.read_dot_matrix(&variant, today, &spec),
            };

            outcome.candidates = candidates.len();
            outcome.best_confidence = candidates
                .iter()
                .map(|c| c.confidence)
                .max_by(f32::total_cmp);

            for candidate in candidates {
                if best
                    .as_ref()
                    .map_or(true, |b| candidate.confidence > b.confidence)
                {
                    best = Some(candidate);
                }
            }

            outcome.elapsed_ms = strategy_start.elapsed().as_secs_f64() * 1000.0;
            debug!(
                strategy = %spec.tag,
                method = %spec.method,
                fragments = outcome.fragments,
                candidates = outcome.candidates,
                best = ?outcome.best_confidence,
                "Strategy finished"
            );
            outcomes.push(outcome);

            if best
                .as_ref()
                .is_some_and(|b| b.confidence > self.options.early_exit_threshold)
            {
                early_exit = true;
                break;
            }
        }

        let candidate = best.filter(|c| c.confidence > self.options.acceptance_threshold);
        let elapsed = start.elapsed();
        if let Some(monitor) = &self.monitor {
            monitor.record_operation(candidate.is_some(), elapsed);
        }

        match &candidate {
            Some(c) => info!(
                date = %c.date,
                strategy = %c.strategy,
                confidence = c.confidence,
                early_exit,
                "Expiry date detected"
            ),
            None => info!(strategies = outcomes.len(), "No expiry date detected"),
        }

        Ok(DetectionReport {
            date: candidate.as_ref().map(|c| c.date),
            candidate,
            today,
            outcomes,
            early_exit,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        })
    }

    /// Run the session's engine on a variant, ranked for matching
    fn recognize(&mut self, variant: &ImageVariant) -> Result<Vec<TextFragment>> {
        let start = Instant::now();
        let engine = self
            .session
            .engine_mut()
            .map_err(|_| DetectorError::SessionClosed)?;
        let fragments = extract_text(engine, variant);
        if let Some(monitor) = &self.monitor {
            monitor.record_phase(DetectionPhase::TextRecognition, start.elapsed());
        }
        Ok(rank_fragments(fragments))
    }

    /// Match and parse fragments in order, stopping at the first candidate
    /// above the early exit threshold
    fn scan_fragments(
        &self,
        fragments: Vec<TextFragment>,
        today: NaiveDate,
        strategy: &str,
    ) -> FragmentScan {
        let mut scan = FragmentScan::default();

        for fragment in &fragments {
            let spans = self.timed(DetectionPhase::PatternMatching, || {
                self.patterns.find_date_spans(&fragment.text)
            });
            scan.spans += spans.len();

            for span in spans {
                let parsed = self.timed(DetectionPhase::DateParsing, || {
                    parse_date(&span.text, span.pattern, today, &self.options.parse)
                });
                let date = match parsed {
                    Ok(date) => date,
                    Err(e) => {
                        trace!(
                            span = %span.text,
                            pattern = ?span.pattern,
                            "Discarding span: {}",
                            e
                        );
                        continue;
                    }
                };

                let confidence =
                    score_fragment(&fragment.text, span.pattern, &self.options.weights);
                trace!(%date, confidence, fragment = %fragment.text, "Candidate");
                scan.candidates.push(DateCandidate {
                    date,
                    source_text: fragment.text.clone(),
                    confidence,
                    strategy: strategy.to_string(),
                    source: CandidateSource::Pattern(span.pattern),
                });

                if confidence > self.options.early_exit_threshold {
                    return scan;
                }
            }
        }

        scan
    }

    fn read_dot_matrix(
        &self,
        variant: &ImageVariant,
        today: NaiveDate,
        spec: &StrategySpec,
    ) -> Vec<DateCandidate> {
        if variant.is_empty() {
            return Vec::new();
        }

        let found = self.timed(DetectionPhase::RegionDetection, || {
            self.recognizer.detect_date(&variant.image, today)
        });

        found
            .map(|m| DateCandidate {
                date: m.date,
                source_text: m.digits.iter().map(|d| char::from(b'0' + d)).collect(),
                confidence: score_dot_matrix(&self.options.weights),
                strategy: spec.tag.clone(),
                source: CandidateSource::DotMatrix(m.layout),
            })
            .into_iter()
            .collect()
    }

    fn timed<T>(&self, phase: DetectionPhase, f: impl FnOnce() -> T) -> T {
        match &self.monitor {
            Some(monitor) => monitor.time_phase(phase, f),
            None => f(),
        }
    }
}

impl<E: OcrEngine> std::fmt::Debug for ExpiryDateDetector<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryDateDetector")
            .field("session", &self.session)
            .field("options", &self.options)
            .field("today", &self.clock.today())
            .finish()
    }
}

/// Highest-confidence candidate, earliest on ties
fn best_candidate(candidates: Vec<DateCandidate>) -> Option<DateCandidate> {
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(b) if candidate.confidence <= b.confidence => Some(b),
        _ => Some(candidate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::ocr::{NoopEngine, StaticTextEngine};
    use image::{Rgba, RgbaImage};

    fn photo() -> RawImage {
        RawImage::from_rgba(RgbaImage::from_pixel(64, 48, Rgba([240, 240, 240, 255])))
    }

    fn detector<E: OcrEngine>(engine: E) -> ExpiryDateDetector<E> {
        ExpiryDateDetector::open(engine, DetectorOptions::default())
            .unwrap()
            .with_clock(FixedClock::ymd(2025, 6, 1).unwrap())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_keyword_date_exits_early() {
        let mut det = detector(StaticTextEngine::new(["EXP 12/25/2026"]));
        let report = det.detect_with_report(&photo()).unwrap();
        assert_eq!(report.date, Some(date(2026, 12, 25)));
        assert!(report.early_exit);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].tag, "full-resolution");
    }

    #[test]
    fn test_plain_date_runs_whole_cascade() {
        let mut det = detector(StaticTextEngine::new(["12/25/2026"]));
        let report = det.detect_with_report(&photo()).unwrap();
        assert_eq!(report.date, Some(date(2026, 12, 25)));
        assert!(!report.early_exit);
        assert_eq!(report.outcomes.len(), 6);
        // date text was seen, so the dot fallback never ran
        assert!(report.outcomes[4].skipped);
        let candidate = report.candidate.unwrap();
        assert_eq!(candidate.strategy, "full-resolution");
        assert!((candidate.confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_below_acceptance_rejected() {
        // weak shape without keyword scores 0.6, not above 0.6
        let mut det = detector(StaticTextEngine::new(["03/26"]));
        assert_eq!(det.detect_expiry_date(&photo()).unwrap(), None);
    }

    #[test]
    fn test_past_date_rejected() {
        let mut det = detector(StaticTextEngine::new(["EXP 12/25/2020"]));
        assert_eq!(det.detect_expiry_date(&photo()).unwrap(), None);
    }

    #[test]
    fn test_no_text() {
        let mut det = detector(NoopEngine);
        let report = det.detect_with_report(&photo()).unwrap();
        assert_eq!(report.date, None);
        assert_eq!(report.outcomes.len(), 6);
        assert!(!report.outcomes[4].skipped);
    }

    #[test]
    fn test_closed_session() {
        let mut det = detector(NoopEngine);
        det.close();
        assert!(!det.is_open());
        assert!(matches!(
            det.detect_expiry_date(&photo()),
            Err(DetectorError::SessionClosed)
        ));
    }

    #[test]
    fn test_cancelled_before_first_strategy() {
        let mut det = detector(StaticTextEngine::new(["EXP 12/25/2026"]));
        let token = CancellationToken::new();
        token.cancel();
        assert!(matches!(
            det.detect_cancellable(&photo(), &token),
            Err(DetectorError::Cancelled)
        ));
    }

    #[test]
    fn test_detect_in_fragments() {
        let det = detector(NoopEngine);
        let fragments = vec![
            TextFragment::new("LOT 20261231"),
            TextFragment::new("best before 03.04.27"),
        ];
        let candidate = det.detect_in_fragments(&fragments).unwrap();
        assert_eq!(candidate.date, date(2027, 3, 4));
        assert_eq!(candidate.strategy, "text");
    }

    #[test]
    fn test_best_candidate_keeps_first_on_tie() {
        let make = |d: u32, confidence: f32| DateCandidate {
            date: date(2026, 1, d),
            source_text: String::new(),
            confidence,
            strategy: "t".to_string(),
            source: CandidateSource::Pattern(crate::date_pattern::PatternId::SlashedTriplet),
        };
        let best = best_candidate(vec![make(1, 0.7), make(2, 0.7), make(3, 0.5)]).unwrap();
        assert_eq!(best.date, date(2026, 1, 1));
    }

    #[test]
    fn test_monitor_records_phases() {
        let monitor = Arc::new(PerformanceMonitor::new());
        let mut det =
            detector(StaticTextEngine::new(["EXP 12/25/2026"])).with_monitor(Arc::clone(&monitor));
        det.detect_expiry_date(&photo()).unwrap();
        let stats = monitor.snapshot();
        assert_eq!(stats.total_operations, 1);
        assert_eq!(stats.successful_operations, 1);
        let phases: Vec<_> = stats.phases.iter().map(|p| p.phase).collect();
        assert!(phases.contains(&DetectionPhase::Preprocessing));
        assert!(phases.contains(&DetectionPhase::TextRecognition));
        assert!(phases.contains(&DetectionPhase::DateParsing));
    }
}
