//! Loader for feature files.
//!
//! Reads the subset of Gherkin the table steps need: `Feature:`,
//! `Background:` and `Scenario:` headers, keyword-prefixed steps, `|` data
//! tables and `"""` doc strings. `#` lines are comments.

use std::path::Path;

use rowcheck_core::Table;

use crate::error::{StepsError, StepsResult};

const KEYWORDS: [&str; 6] = ["Given", "When", "Then", "And", "But", "*"];

/// Argument attached to a step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepArgument {
    Table(Table),
    DocString(String),
}

/// One step of a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Line of the step text, starting at 1.
    pub line: usize,
    /// Step text without its keyword.
    pub text: String,
    pub argument: Option<StepArgument>,
}

impl Step {
    pub fn table(&self) -> Option<&Table> {
        match &self.argument {
            Some(StepArgument::Table(table)) => Some(table),
            _ => None,
        }
    }

    pub fn doc_string(&self) -> Option<&str> {
        match &self.argument {
            Some(StepArgument::DocString(text)) => Some(text),
            _ => None,
        }
    }
}

/// A named list of steps. Background steps are already prepended.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<Step>,
}

/// A parsed feature file.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: String,
    pub scenarios: Vec<Scenario>,
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    Background,
    Scenario,
}

struct PendingTable {
    line: usize,
    rows: Vec<Vec<String>>,
}

#[derive(Default)]
struct Builder {
    name: String,
    background: Vec<Step>,
    scenarios: Vec<Scenario>,
}

impl Builder {
    fn steps_mut(&mut self, section: Section) -> Option<&mut Vec<Step>> {
        match section {
            Section::None => None,
            Section::Background => Some(&mut self.background),
            Section::Scenario => self.scenarios.last_mut().map(|s| &mut s.steps),
        }
    }

    fn last_step(&mut self, section: Section) -> Option<&mut Step> {
        self.steps_mut(section).and_then(|steps| steps.last_mut())
    }
}

impl Feature {
    /// Parse feature text.
    pub fn parse(source: &str) -> StepsResult<Self> {
        let mut builder = Builder::default();
        let mut section = Section::None;
        let mut table: Option<PendingTable> = None;
        let mut lines = source.lines().enumerate();

        while let Some((idx, line)) = lines.next() {
            let number = idx + 1;
            let trimmed = line.trim();

            if trimmed.starts_with('|') {
                let pending = table.get_or_insert_with(|| PendingTable {
                    line: number,
                    rows: Vec::new(),
                });
                let cells = rowcheck_core::split_pipe_row(trimmed).map_err(|source| {
                    StepsError::DataTable {
                        line: number,
                        source,
                    }
                })?;
                pending.rows.push(cells);
                continue;
            }

            // Any other line ends a table in progress.
            if let Some(pending) = table.take() {
                attach_table(&mut builder, section, pending)?;
            }

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if trimmed.starts_with("\"\"\"") {
                let indent = line.chars().take_while(|c| c.is_whitespace()).count();
                let mut content = Vec::new();
                let mut closed = false;
                for (_, doc_line) in lines.by_ref() {
                    if doc_line.trim() == "\"\"\"" {
                        closed = true;
                        break;
                    }
                    content.push(strip_indent(doc_line, indent));
                }
                if !closed {
                    return Err(StepsError::feature_parse(number, "unterminated doc string"));
                }
                let step = builder
                    .last_step(section)
                    .ok_or_else(|| StepsError::feature_parse(number, "doc string without a step"))?;
                step.argument = Some(StepArgument::DocString(content.join("\n")));
                continue;
            }

            if let Some(name) = trimmed.strip_prefix("Feature:") {
                builder.name = name.trim().to_string();
            } else if trimmed.starts_with("Background:") {
                section = Section::Background;
            } else if let Some(name) = trimmed
                .strip_prefix("Scenario:")
                .or_else(|| trimmed.strip_prefix("Example:"))
            {
                section = Section::Scenario;
                builder.scenarios.push(Scenario {
                    name: name.trim().to_string(),
                    steps: builder.background.clone(),
                });
            } else if let Some(text) = strip_keyword(trimmed) {
                let steps = builder
                    .steps_mut(section)
                    .ok_or_else(|| StepsError::feature_parse(number, "step outside a scenario"))?;
                steps.push(Step {
                    line: number,
                    text: text.to_string(),
                    argument: None,
                });
            } else if section == Section::None {
                // Free-form feature description.
                continue;
            } else {
                return Err(StepsError::feature_parse(
                    number,
                    format!("unexpected line: {}", trimmed),
                ));
            }
        }

        if let Some(pending) = table.take() {
            attach_table(&mut builder, section, pending)?;
        }

        Ok(Self {
            name: builder.name,
            scenarios: builder.scenarios,
        })
    }

    /// Load and parse a feature file from disk.
    pub fn load(path: &Path) -> StepsResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| StepsError::file_read(path, e))?;
        Self::parse(&source)
    }

    pub fn scenario(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }
}

fn attach_table(builder: &mut Builder, section: Section, pending: PendingTable) -> StepsResult<()> {
    let line = pending.line;
    let table = Table::new(pending.rows).map_err(|source| StepsError::DataTable { line, source })?;
    let step = builder
        .last_step(section)
        .ok_or_else(|| StepsError::feature_parse(line, "data table without a step"))?;
    step.argument = Some(StepArgument::Table(table));
    Ok(())
}

/// Strip a leading Gherkin keyword, returning the step text.
fn strip_keyword(line: &str) -> Option<&str> {
    KEYWORDS.iter().find_map(|keyword| {
        let rest = line.strip_prefix(keyword)?;
        rest.starts_with(char::is_whitespace).then(|| rest.trim())
    })
}

/// Drop up to `indent` leading whitespace characters.
fn strip_indent(line: &str, indent: usize) -> String {
    let mut rest = line;
    for _ in 0..indent {
        match rest.strip_prefix(char::is_whitespace) {
            Some(stripped) => rest = stripped,
            None => break,
        }
    }
    rest.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_scenarios_with_tables() {
        let source = r#"
Feature: Orders
  Stored orders are visible.

  Scenario: store and check
    Given there are no rows in table "orders"
    And these rows are stored in table "orders":
      | id | status |
      | 1  | open   |
    Then only these rows are available in table "orders"
      | id  | status |
      | $o1 | open   |

  Scenario: empty
    * no rows are available in table "orders"
"#;

        let feature = Feature::parse(source).unwrap();
        assert_eq!(feature.name, "Orders");
        assert_eq!(feature.scenarios.len(), 2);

        let first = &feature.scenarios[0];
        assert_eq!(first.name, "store and check");
        let texts: Vec<&str> = first.steps.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                r#"there are no rows in table "orders""#,
                r#"these rows are stored in table "orders":"#,
                r#"only these rows are available in table "orders""#,
            ]
        );
        assert!(first.steps[0].argument.is_none());
        assert_eq!(first.steps[1].table().unwrap().data()[0], vec!["1", "open"]);
        assert_eq!(first.steps[2].table().unwrap().data()[0][0], "$o1");
        assert_eq!(first.steps[2].line, 10);

        assert_eq!(feature.scenarios[1].steps.len(), 1);
    }

    #[test]
    fn test_doc_string_and_background() {
        let source = "Feature: Files

  Background:
    Given there are no rows in table \"orders\"

  Scenario: from file
    When rows from this file are stored in table \"orders\"
      \"\"\"
      fixtures/orders.csv
      \"\"\"
";

        let feature = Feature::parse(source).unwrap();
        let scenario = feature.scenario("from file").unwrap();
        assert_eq!(scenario.steps.len(), 2);
        assert_eq!(scenario.steps[0].text, "there are no rows in table \"orders\"");
        assert_eq!(scenario.steps[1].doc_string(), Some("fixtures/orders.csv"));
    }

    #[test]
    fn test_ragged_data_table() {
        let source = "Scenario: bad\n  Given these rows are stored in table \"t\"\n    | a | b |\n    | 1 |\n";
        let err = Feature::parse(source).unwrap_err();
        assert!(matches!(err, StepsError::DataTable { line: 3, .. }));
    }

    #[test]
    fn test_step_outside_scenario() {
        let err = Feature::parse("Given no rows in table \"t\"").unwrap_err();
        assert!(matches!(err, StepsError::FeatureParse { line: 1, .. }));
    }

    #[test]
    fn test_unterminated_doc_string() {
        let source = "Scenario: s\n  Given rows from this file are stored in table \"t\"\n  \"\"\"\n  x.csv\n";
        let err = Feature::parse(source).unwrap_err();
        assert!(matches!(err, StepsError::FeatureParse { line: 3, .. }));
    }

    #[test]
    fn test_doc_string_indent_counts_characters() {
        let source = "Scenario: s\n  Given rows from this file are stored in table \"t\"\n  \"\"\"\n\u{3000}x.csv\n   \u{3000}y.csv\n  \"\"\"\n";
        let feature = Feature::parse(source).unwrap();
        assert_eq!(
            feature.scenarios[0].steps[0].doc_string(),
            Some("x.csv\n \u{3000}y.csv")
        );
    }

    #[test]
    fn test_strip_indent() {
        assert_eq!(strip_indent("    a", 2), "  a");
        assert_eq!(strip_indent(" a", 4), "a");
        assert_eq!(strip_indent("\u{3000}\u{3000}b", 1), "\u{3000}b");
        assert_eq!(strip_indent("", 3), "");
    }
}
