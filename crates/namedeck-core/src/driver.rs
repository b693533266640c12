//! Entry points: the main run, cleanup and the connectivity self-test.

use rand::Rng;
use tracing::{error, info, warn};

use crate::config::DeckConfig;
use crate::error::{DeckError, Result};
use crate::generator::{generate_slide, SlideDeck};
use crate::name::CellValue;
use crate::shuffle::shuffle_with;
use crate::source::{read_names, Spreadsheet};

/// Opens the spreadsheet and presentation named in a [`DeckConfig`]
pub trait Connector {
    /// Spreadsheet backend
    type Sheet: Spreadsheet;
    /// Presentation backend
    type Deck: SlideDeck;

    /// Open a spreadsheet by identifier
    fn open_spreadsheet(&self, id: &str) -> Result<Self::Sheet>;

    /// Open a presentation by identifier
    fn open_presentation(&self, id: &str) -> Result<Self::Deck>;
}

/// Outcome of a successful main run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Names left after dropping blanks and the header
    pub names_read: usize,
    /// Indices of the slides appended by this run
    pub slides_created: Vec<usize>,
}

/// Generate one slide per name.
///
/// An empty name list is not an error: nothing is created and an empty
/// report is returned. The template index is checked before any slide is
/// created. Slides created before a failure are kept and saved; the failure
/// is then returned to the caller.
pub fn run<C, R>(config: &DeckConfig, connector: &C, rng: &mut R) -> Result<RunReport>
where
    C: Connector + ?Sized,
    R: Rng + ?Sized,
{
    info!("Starting slide generation");

    let sheet = connector.open_spreadsheet(&config.spreadsheet)?;
    let mut deck = connector.open_presentation(&config.presentation)?;

    let names = read_names(&sheet, &config.sheet, &config.column)?;
    if names.is_empty() {
        info!("No names found in the spreadsheet; nothing to generate");
        return Ok(RunReport::default());
    }

    let count = deck.slide_count();
    if config.template_slide_index >= count {
        return Err(DeckError::TemplateOutOfRange {
            index: config.template_slide_index,
            count,
        });
    }

    let formatted: Vec<CellValue> = names.iter().map(CellValue::to_display_name).collect();
    let shuffled = shuffle_with(&formatted, rng);

    let mut report = RunReport {
        names_read: names.len(),
        slides_created: Vec::with_capacity(shuffled.len()),
    };

    let generated = generate_all(&mut deck, config, &shuffled, &mut report);

    if report.slides_created.is_empty() {
        return generated.map(|()| report);
    }

    match (generated, deck.save()) {
        (Ok(()), Ok(())) => {
            info!(
                "Finished: {} slides created from {} names",
                report.slides_created.len(),
                report.names_read
            );
            Ok(report)
        }
        (Ok(()), Err(save_err)) => Err(save_err),
        (Err(err), Ok(())) => {
            warn!(
                "Run stopped after {} of {} slides; created slides were kept",
                report.slides_created.len(),
                report.names_read
            );
            Err(err)
        }
        (Err(err), Err(save_err)) => {
            error!("Failed to save partially generated presentation: {}", save_err);
            Err(err)
        }
    }
}

fn generate_all<D: SlideDeck + ?Sized>(
    deck: &mut D,
    config: &DeckConfig,
    names: &[CellValue],
    report: &mut RunReport,
) -> Result<()> {
    let total = names.len();
    for (i, name) in names.iter().enumerate() {
        let display_name = name.to_string();
        info!("Creating slide {}/{}", i + 1, total);
        let index = generate_slide(
            deck,
            config.template_slide_index,
            &display_name,
            i + 1,
            &config.placeholders,
        )?;
        report.slides_created.push(index);
    }
    Ok(())
}

/// Delete every slide after the first `keep_count`.
///
/// Returns the number of slides removed; the deck is saved only when
/// something was removed.
pub fn cleanup<C: Connector + ?Sized>(config: &DeckConfig, connector: &C) -> Result<usize> {
    let mut deck = connector.open_presentation(&config.presentation)?;
    let removed = remove_trailing_slides(&mut deck, config.keep_count)?;

    if removed > 0 {
        deck.save()?;
    }

    info!(
        "Cleanup removed {} slides, {} remain",
        removed,
        deck.slide_count()
    );
    Ok(removed)
}

/// Remove slides from the end of the deck down to (not including) `keep_count`
pub fn remove_trailing_slides<D: SlideDeck + ?Sized>(deck: &mut D, keep_count: usize) -> Result<usize> {
    let count = deck.slide_count();
    for index in (keep_count..count).rev() {
        deck.remove_slide(index)?;
    }
    Ok(count.saturating_sub(keep_count))
}

/// One connectivity check performed by [`self_test`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfTestStep {
    OpenSpreadsheet,
    SheetLookup,
    OpenPresentation,
    TemplateLookup,
    NameRetrieval,
}

impl SelfTestStep {
    /// Human-readable step label
    pub fn label(self) -> &'static str {
        match self {
            SelfTestStep::OpenSpreadsheet => "open spreadsheet",
            SelfTestStep::SheetLookup => "sheet lookup",
            SelfTestStep::OpenPresentation => "open presentation",
            SelfTestStep::TemplateLookup => "template slide lookup",
            SelfTestStep::NameRetrieval => "name retrieval",
        }
    }
}

/// Result of one self-test step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Passed(String),
    Failed(String),
    /// Not attempted because an earlier step it depends on failed
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub step: SelfTestStep,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelfTestReport {
    pub steps: Vec<StepResult>,
}

impl SelfTestReport {
    /// True when every step passed
    pub fn passed(&self) -> bool {
        self.steps
            .iter()
            .all(|s| matches!(s.outcome, StepOutcome::Passed(_)))
    }

    /// Outcome recorded for `step`, if it ran
    pub fn outcome(&self, step: SelfTestStep) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.step == step).map(|s| &s.outcome)
    }

    fn record(&mut self, step: SelfTestStep, outcome: StepOutcome) {
        match &outcome {
            StepOutcome::Passed(detail) => info!("[ok]   {}: {}", step.label(), detail),
            StepOutcome::Failed(detail) => warn!("[fail] {}: {}", step.label(), detail),
            StepOutcome::Skipped(detail) => warn!("[skip] {}: {}", step.label(), detail),
        }
        self.steps.push(StepResult { step, outcome });
    }
}

fn outcome<T>(result: Result<T>, describe: impl FnOnce(&T) -> String) -> (Option<T>, StepOutcome) {
    match result {
        Ok(value) => {
            let detail = describe(&value);
            (Some(value), StepOutcome::Passed(detail))
        }
        Err(err) => (None, StepOutcome::Failed(err.to_string())),
    }
}

/// Exercise every collaborator without modifying the presentation.
///
/// Errors are caught per step and reported, never propagated.
pub fn self_test<C: Connector + ?Sized>(config: &DeckConfig, connector: &C) -> SelfTestReport {
    const SAMPLE: usize = 3;

    info!("Running connectivity self-test");
    let mut report = SelfTestReport::default();

    let (sheet, result) = outcome(connector.open_spreadsheet(&config.spreadsheet), |_| {
        format!("opened {}", config.spreadsheet)
    });
    report.record(SelfTestStep::OpenSpreadsheet, result);

    let sheet_found = match &sheet {
        Some(sheet) => {
            let result = match sheet.has_sheet(&config.sheet) {
                Ok(true) => StepOutcome::Passed(format!("found sheet '{}'", config.sheet)),
                Ok(false) => StepOutcome::Failed(format!("sheet '{}' not found", config.sheet)),
                Err(err) => StepOutcome::Failed(err.to_string()),
            };
            let found = matches!(result, StepOutcome::Passed(_));
            report.record(SelfTestStep::SheetLookup, result);
            found
        }
        None => {
            report.record(
                SelfTestStep::SheetLookup,
                StepOutcome::Skipped("spreadsheet unavailable".to_string()),
            );
            false
        }
    };

    let (deck, result) = outcome(connector.open_presentation(&config.presentation), |deck| {
        format!("opened {} ({} slides)", config.presentation, deck.slide_count())
    });
    report.record(SelfTestStep::OpenPresentation, result);

    let result = match &deck {
        Some(deck) => {
            let index = config.template_slide_index;
            let count = deck.slide_count();
            if index >= count {
                StepOutcome::Failed(DeckError::TemplateOutOfRange { index, count }.to_string())
            } else {
                match deck.shapes(index) {
                    Ok(shapes) => {
                        let tokens = shapes
                            .iter()
                            .filter(|s| config.placeholders.iter().any(|t| s.text.contains(t.as_str())))
                            .count();
                        StepOutcome::Passed(format!(
                            "slide {} has {} shapes, {} with placeholders",
                            index,
                            shapes.len(),
                            tokens
                        ))
                    }
                    Err(err) => StepOutcome::Failed(err.to_string()),
                }
            }
        }
        None => StepOutcome::Skipped("presentation unavailable".to_string()),
    };
    report.record(SelfTestStep::TemplateLookup, result);

    let result = match (&sheet, sheet_found) {
        (Some(sheet), true) => match read_names(sheet, &config.sheet, &config.column) {
            Ok(names) => {
                let sample: Vec<String> = names
                    .iter()
                    .take(SAMPLE)
                    .map(|n| n.to_display_name().to_string())
                    .collect();
                StepOutcome::Passed(format!(
                    "{} names, e.g. [{}]",
                    names.len(),
                    sample.join(", ")
                ))
            }
            Err(err) => StepOutcome::Failed(err.to_string()),
        },
        _ => StepOutcome::Skipped("sheet unavailable".to_string()),
    };
    report.record(SelfTestStep::NameRetrieval, result);

    if report.passed() {
        info!("Self-test passed");
    } else {
        warn!("Self-test finished with failures");
    }
    report
}
