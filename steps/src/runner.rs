//! Scenario runner.

use rowcheck_session::Manager;
use tracing::{debug, warn};

use crate::error::{StepsError, StepsResult};
use crate::loader::{Feature, Scenario};
use crate::phrases::PhraseMatcher;

/// Outcome of one scenario in a feature run.
#[derive(Debug)]
pub struct ScenarioReport {
    pub name: String,
    pub result: StepsResult<()>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs scenarios against a manager.
pub struct Runner<'m> {
    manager: &'m mut Manager,
    phrases: PhraseMatcher,
}

impl<'m> Runner<'m> {
    /// Create a new runner for a manager.
    pub fn new(manager: &'m mut Manager) -> StepsResult<Self> {
        Ok(Self {
            manager,
            phrases: PhraseMatcher::new()?,
        })
    }

    pub fn manager(&self) -> &Manager {
        &*self.manager
    }

    /// Run one scenario. Variables are reset first; the first failing step
    /// ends the scenario.
    pub fn run_scenario(&mut self, scenario: &Scenario) -> StepsResult<()> {
        self.manager.start_scenario();

        for step in &scenario.steps {
            debug!(scenario = %scenario.name, line = step.line, step = %step.text, "step");
            self.phrases
                .execute(self.manager, step)?
                .map_err(|source| StepsError::StepFailed {
                    scenario: scenario.name.clone(),
                    step: step.text.clone(),
                    source,
                })?;
        }

        Ok(())
    }

    /// Run every scenario of a feature, continuing past failures.
    pub fn run_feature(&mut self, feature: &Feature) -> Vec<ScenarioReport> {
        feature
            .scenarios
            .iter()
            .map(|scenario| {
                let result = self.run_scenario(scenario);
                if let Err(err) = &result {
                    warn!(feature = %feature.name, scenario = %scenario.name, error = %err, "scenario failed");
                }
                ScenarioReport {
                    name: scenario.name.clone(),
                    result,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowcheck_core::{RowSchema, ValueKind};
    use rowcheck_session::{Instance, DEFAULT_DATABASE};
    use rowcheck_storage::MemoryStorage;

    fn manager() -> Manager {
        Manager::new().with_instance(
            DEFAULT_DATABASE,
            Instance::new(MemoryStorage::new())
                .with_table("t", RowSchema::new().with("id", ValueKind::Int)),
        )
    }

    #[test]
    fn test_undefined_step_stops_scenario() {
        let feature = Feature::parse(
            "Scenario: s\n  Given something else entirely\n  Then no rows are available in table \"t\"\n",
        )
        .unwrap();

        let mut m = manager();
        let mut runner = Runner::new(&mut m).unwrap();
        let err = runner.run_scenario(&feature.scenarios[0]).unwrap_err();
        assert!(matches!(err, StepsError::UndefinedStep { step } if step == "something else entirely"));
    }

    #[test]
    fn test_missing_data_table() {
        let feature =
            Feature::parse("Scenario: s\n  Given these rows are stored in table \"t\"\n").unwrap();

        let mut m = manager();
        let mut runner = Runner::new(&mut m).unwrap();
        let err = runner.run_scenario(&feature.scenarios[0]).unwrap_err();
        assert!(matches!(err, StepsError::MissingArgument { expected: "data table", .. }));
    }

    #[test]
    fn test_variables_reset_between_scenarios() {
        let feature = Feature::parse(
            r#"
Scenario: bind
  Given these rows are stored in table "t"
    | id |
    | 3  |
  Then these rows are available in table "t"
    | id |
    | $x |

Scenario: reuse
  Then these rows are available in table "t"
    | id |
    | $x |
"#,
        )
        .unwrap();

        let mut m = manager();
        let mut runner = Runner::new(&mut m).unwrap();
        let reports = runner.run_feature(&feature);

        assert!(reports[0].passed());
        // `$x` is unbound again, so it binds to the stored row instead of
        // filtering on the previous scenario's value.
        assert!(reports[1].passed());
        assert_eq!(runner.manager().vars().len(), 1);
    }
}
