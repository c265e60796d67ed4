use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::calculator::{CalcState, Calculator, Progress, Trigger, evaluate_with};
use crate::debounce::Debouncer;
use crate::form::Field;
use crate::models::Unit;
use crate::service::BmiService;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// A live calculator bound to a service.
///
/// Edits schedule a debounced evaluation; its progress arrives on the
/// receiver returned by [`Session::start`] and must be fed back through
/// [`Session::apply`].
pub struct Session {
    service: Arc<BmiService>,
    calculator: Calculator,
    debouncer: Debouncer,
    progress: mpsc::UnboundedSender<Progress>,
}

impl Session {
    /// Restore unit and height from the saved preference, if any, and
    /// schedule a first evaluation when that leaves the form non-empty.
    pub async fn start(
        service: Arc<BmiService>,
        debounce: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Progress>) {
        let calculator = match service.list_preferences().await.first() {
            Some(pref) => {
                debug!(unit = %pref.default_unit, "session: restored preferences");
                Calculator::from_preference(pref)
            }
            None => Calculator::default(),
        };
        let (tx, rx) = mpsc::unbounded_channel();
        let mut session = Self {
            service,
            calculator,
            debouncer: Debouncer::new(debounce),
            progress: tx,
        };
        // A restored height counts as input: validate it like any edit.
        if session.calculator.form().has_input() {
            let revision = session.calculator.begin();
            session.schedule(revision);
        }
        (session, rx)
    }

    #[must_use]
    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    #[must_use]
    pub fn state(&self) -> &CalcState {
        self.calculator.state()
    }

    #[must_use]
    pub fn service(&self) -> &Arc<BmiService> {
        &self.service
    }

    pub fn edit(&mut self, field: Field, value: &str) -> &CalcState {
        match self.calculator.set_field(field, value) {
            Trigger::Schedule(revision) => self.schedule(revision),
            Trigger::Clear => {
                self.debouncer.cancel();
            }
            Trigger::Unchanged => {}
        }
        self.calculator.state()
    }

    pub fn switch_unit(&mut self, unit: Unit) {
        self.debouncer.cancel();
        self.calculator.switch_unit(unit);
    }

    pub fn toggle_unit(&mut self) -> Unit {
        self.debouncer.cancel();
        self.calculator.toggle_unit()
    }

    /// Evaluate right away, bypassing the debounce timer.
    pub async fn see_result(&mut self) -> &CalcState {
        self.debouncer.cancel();
        let revision = self.calculator.begin();
        let form = self.calculator.form().clone();
        let mut computing = false;
        let outcome = evaluate_with(&self.service, &form, || computing = true).await;
        if computing {
            self.calculator.apply(Progress::Computing { revision });
        }
        self.calculator.apply(Progress::Finished { revision, outcome });
        self.calculator.state()
    }

    /// Feed back progress received from the channel. Returns whether it
    /// changed the state.
    pub fn apply(&mut self, progress: Progress) -> bool {
        self.calculator.apply(progress)
    }

    fn schedule(&mut self, revision: u64) {
        let service = Arc::clone(&self.service);
        let form = self.calculator.form().clone();
        let tx = self.progress.clone();
        self.debouncer.schedule(async move {
            let computing_tx = tx.clone();
            let outcome = evaluate_with(&service, &form, move || {
                let _ = computing_tx.send(Progress::Computing { revision });
            })
            .await;
            let _ = tx.send(Progress::Finished { revision, outcome });
        });
    }
}
