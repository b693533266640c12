//! Pipeline tests against in-memory collaborators

use std::cell::RefCell;
use std::rc::Rc;

use namedeck_core::{
    cleanup, run, self_test, CellValue, Connector, DeckConfig, DeckError, Result, SelfTestStep,
    ShapeText, SlideDeck, Spreadsheet, StepOutcome,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

struct MemorySheet {
    sheet: String,
    cells: Vec<CellValue>,
}

impl Spreadsheet for MemorySheet {
    fn sheet_names(&self) -> Result<Vec<String>> {
        Ok(vec![self.sheet.clone()])
    }

    fn column_values(&self, sheet: &str, _column: &str) -> Result<Vec<CellValue>> {
        if sheet != self.sheet {
            return Err(DeckError::SheetNotFound(sheet.to_string()));
        }
        Ok(self.cells.clone())
    }
}

type Slides = Vec<Vec<String>>;

/// Each slide is a list of shape texts
struct MemoryDeck {
    slides: Slides,
    stored: Rc<RefCell<Slides>>,
    saves: Rc<RefCell<usize>>,
    fail_after_duplicates: Option<usize>,
    duplicates: usize,
}

impl MemoryDeck {
    fn check(&self, index: usize) -> Result<()> {
        if index >= self.slides.len() {
            return Err(DeckError::SlideOutOfRange {
                index,
                count: self.slides.len(),
            });
        }
        Ok(())
    }
}

impl SlideDeck for MemoryDeck {
    fn slide_count(&self) -> usize {
        self.slides.len()
    }

    fn duplicate_slide(&mut self, index: usize) -> Result<usize> {
        self.check(index)?;
        if Some(self.duplicates) == self.fail_after_duplicates {
            return Err(DeckError::presentation("quota exceeded"));
        }
        self.duplicates += 1;
        let copy = self.slides[index].clone();
        self.slides.insert(index + 1, copy);
        Ok(index + 1)
    }

    fn move_slide(&mut self, from: usize, to: usize) -> Result<()> {
        self.check(from)?;
        self.check(to)?;
        let slide = self.slides.remove(from);
        self.slides.insert(to, slide);
        Ok(())
    }

    fn remove_slide(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        self.slides.remove(index);
        Ok(())
    }

    fn shapes(&self, index: usize) -> Result<Vec<ShapeText>> {
        self.check(index)?;
        Ok(self.slides[index]
            .iter()
            .enumerate()
            .map(|(i, text)| ShapeText {
                index: i,
                name: format!("Shape {}", i + 1),
                text: text.clone(),
            })
            .collect())
    }

    fn replace_shape_text(
        &mut self,
        slide: usize,
        shape: usize,
        find: &str,
        replace: &str,
    ) -> Result<usize> {
        self.check(slide)?;
        let text = &mut self.slides[slide][shape];
        let count = text.matches(find).count();
        *text = text.replace(find, replace);
        Ok(count)
    }

    fn save(&mut self) -> Result<()> {
        *self.stored.borrow_mut() = self.slides.clone();
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

struct MemoryConnector {
    sheet: String,
    cells: Vec<CellValue>,
    stored: Rc<RefCell<Slides>>,
    saves: Rc<RefCell<usize>>,
    fail_after_duplicates: Option<usize>,
    spreadsheet_available: bool,
}

impl MemoryConnector {
    fn new(cells: &[&str], slides: Slides) -> Self {
        Self {
            sheet: "Names".to_string(),
            cells: cells.iter().map(|c| CellValue::from(*c)).collect(),
            stored: Rc::new(RefCell::new(slides)),
            saves: Rc::new(RefCell::new(0)),
            fail_after_duplicates: None,
            spreadsheet_available: true,
        }
    }

    fn stored(&self) -> Slides {
        self.stored.borrow().clone()
    }

    fn saves(&self) -> usize {
        *self.saves.borrow()
    }
}

impl Connector for MemoryConnector {
    type Sheet = MemorySheet;
    type Deck = MemoryDeck;

    fn open_spreadsheet(&self, id: &str) -> Result<MemorySheet> {
        if !self.spreadsheet_available {
            return Err(DeckError::spreadsheet(format!("access denied: {}", id)));
        }
        Ok(MemorySheet {
            sheet: self.sheet.clone(),
            cells: self.cells.clone(),
        })
    }

    fn open_presentation(&self, _id: &str) -> Result<MemoryDeck> {
        Ok(MemoryDeck {
            slides: self.stored(),
            stored: Rc::clone(&self.stored),
            saves: Rc::clone(&self.saves),
            fail_after_duplicates: self.fail_after_duplicates,
            duplicates: 0,
        })
    }
}

fn config() -> DeckConfig {
    let mut config = DeckConfig::starter("names", "deck");
    config.sheet = "Names".to_string();
    config
}

fn title_and_template() -> Slides {
    vec![
        vec!["Welcome".to_string()],
        vec!["{{NAME}}".to_string()],
    ]
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

#[test]
fn test_end_to_end_two_names() {
    let connector = MemoryConnector::new(&["Name", "John Smith", "Jane Doe"], title_and_template());

    let report = run(&config(), &connector, &mut rng()).unwrap();
    assert_eq!(report.names_read, 2);
    assert_eq!(report.slides_created, vec![2, 3]);

    let slides = connector.stored();
    assert_eq!(slides.len(), 4);
    assert_eq!(slides[0], vec!["Welcome"]);
    assert_eq!(slides[1], vec!["{{NAME}}"]);

    let mut generated: Vec<String> = slides[2..].iter().map(|s| s[0].clone()).collect();
    generated.sort();
    assert_eq!(generated, vec!["Jane D.", "John S."]);
    assert_eq!(connector.saves(), 1);
}

#[test]
fn test_every_shape_and_token_replaced() {
    let slides = vec![vec![
        "Hello {{NAME}}".to_string(),
        "[name] / NAME_PLACEHOLDER".to_string(),
        "No token here".to_string(),
    ]];
    let connector = MemoryConnector::new(&["Name", "Ada Lovelace"], slides);
    let mut config = config();
    config.template_slide_index = 0;

    run(&config, &connector, &mut rng()).unwrap();

    let slides = connector.stored();
    assert_eq!(slides.len(), 2);
    assert_eq!(
        slides[1],
        vec!["Hello Ada L.", "Ada L. / Ada L.", "No token here"]
    );
    assert_eq!(slides[0][0], "Hello {{NAME}}");
}

#[test]
fn test_slide_count_matches_names() {
    let names = ["Name", "A One", "", "B Two", "   ", "C Three", "Dee"];
    let connector = MemoryConnector::new(&names, title_and_template());

    let report = run(&config(), &connector, &mut rng()).unwrap();
    assert_eq!(report.slides_created.len(), 4);
    assert_eq!(connector.stored().len(), 2 + 4);
}

#[test]
fn test_empty_input_is_not_an_error() {
    let connector = MemoryConnector::new(&["Name", "", "  "], title_and_template());

    let report = run(&config(), &connector, &mut rng()).unwrap();
    assert_eq!(report.names_read, 0);
    assert!(report.slides_created.is_empty());
    assert_eq!(connector.stored().len(), 2);
    assert_eq!(connector.saves(), 0);
}

#[test]
fn test_template_out_of_range() {
    let connector = MemoryConnector::new(&["Name", "John Smith"], title_and_template());
    let mut config = config();
    config.template_slide_index = 5;

    let err = run(&config, &connector, &mut rng()).unwrap_err();
    assert!(matches!(
        err,
        DeckError::TemplateOutOfRange { index: 5, count: 2 }
    ));
    assert_eq!(connector.stored().len(), 2);
    assert_eq!(connector.saves(), 0);
}

#[test]
fn test_failure_keeps_created_slides() {
    let mut connector = MemoryConnector::new(
        &["Name", "A One", "B Two", "C Three"],
        title_and_template(),
    );
    connector.fail_after_duplicates = Some(2);

    let err = run(&config(), &connector, &mut rng()).unwrap_err();
    assert!(err.to_string().contains("quota exceeded"));

    // No rollback: the two slides created before the failure persist
    assert_eq!(connector.stored().len(), 4);
    assert_eq!(connector.saves(), 1);
}

#[test]
fn test_missing_sheet_fails_run() {
    let connector = MemoryConnector::new(&["Name", "John Smith"], title_and_template());
    let mut config = config();
    config.sheet = "Roster".to_string();

    let err = run(&config, &connector, &mut rng()).unwrap_err();
    assert!(matches!(err, DeckError::SheetNotFound(_)));
}

#[test]
fn test_cleanup_keeps_leading_slides() {
    let slides: Slides = (0..5).map(|i| vec![format!("slide {}", i)]).collect();
    let connector = MemoryConnector::new(&[], slides.clone());

    let removed = cleanup(&config(), &connector).unwrap();
    assert_eq!(removed, 3);
    assert_eq!(connector.stored(), slides[..2].to_vec());
}

#[test]
fn test_cleanup_nothing_to_remove() {
    let connector = MemoryConnector::new(&[], title_and_template());

    let removed = cleanup(&config(), &connector).unwrap();
    assert_eq!(removed, 0);
    assert_eq!(connector.saves(), 0);
}

#[test]
fn test_self_test_all_steps_pass() {
    let connector = MemoryConnector::new(&["Name", "John Smith", "Jane Doe"], title_and_template());

    let report = self_test(&config(), &connector);
    assert!(report.passed());
    assert_eq!(report.steps.len(), 5);

    match report.outcome(SelfTestStep::NameRetrieval) {
        Some(StepOutcome::Passed(detail)) => assert!(detail.contains("John S.")),
        other => panic!("unexpected outcome: {:?}", other),
    }

    // Nothing written
    assert_eq!(connector.saves(), 0);
}

#[test]
fn test_self_test_reports_failures_per_step() {
    let mut connector = MemoryConnector::new(&["Name", "John Smith"], title_and_template());
    connector.spreadsheet_available = false;
    let mut config = config();
    config.template_slide_index = 9;

    let report = self_test(&config, &connector);
    assert!(!report.passed());
    assert!(matches!(
        report.outcome(SelfTestStep::OpenSpreadsheet),
        Some(StepOutcome::Failed(_))
    ));
    assert!(matches!(
        report.outcome(SelfTestStep::SheetLookup),
        Some(StepOutcome::Skipped(_))
    ));
    assert!(matches!(
        report.outcome(SelfTestStep::OpenPresentation),
        Some(StepOutcome::Passed(_))
    ));
    assert!(matches!(
        report.outcome(SelfTestStep::TemplateLookup),
        Some(StepOutcome::Failed(_))
    ));
    assert!(matches!(
        report.outcome(SelfTestStep::NameRetrieval),
        Some(StepOutcome::Skipped(_))
    ));
}
