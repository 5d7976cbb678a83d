//! Stage sequencer.
//!
//! The wizard owns one case for the life of a session. Three stages carry a
//! processing step that runs when the user advances out of them:
//!
//! | Leaving   | Step              | Stores       |
//! |-----------|-------------------|--------------|
//! | explain   | `analyze`         | `analysis`   |
//! | analyze   | `get_references`  | `references` |
//! | reference | `generate_lawsuit`| `lawsuit`    |
//!
//! A step runs at most once successfully per case; re-entering a stage whose
//! output is stored skips it. While a step is in flight every further
//! `advance()` is rejected with [`WizardError::Busy`]. The session lock is
//! never held across the await.

use std::sync::{Mutex, MutexGuard, PoisonError};

use lexdraft_ai::{CaseIntelligence, IntelligenceError};
use lexdraft_core::{
    CaseAnalysis, CaseDetails, CaseRecord, DocumentHandle, LawsuitDraft, LegalReference, Stage,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::WizardError;
use crate::event::WizardEvent;
use crate::slot::{SlotStatus, StageSlot};

const EVENT_CAPACITY: usize = 64;

/// Outcome of a successful [`Wizard::advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Moved(Stage),
    /// Advanced past the last stage. Carries the final record.
    Completed(Box<CaseRecord>),
}

/// Outcome of [`Wizard::retreat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retreat {
    Moved(Stage),
    /// Already at the first stage; the caller should leave the wizard.
    Exit,
}

struct Session {
    current: Stage,
    details: CaseDetails,
    analysis: StageSlot<CaseAnalysis>,
    references: StageSlot<Vec<LegalReference>>,
    lawsuit: StageSlot<LawsuitDraft>,
    /// Bumped on every retreat so late results can be recognised as stale.
    epoch: u64,
}

/// Inputs captured for one processing step.
enum Job {
    Analyze {
        explanation: String,
        documents: Vec<DocumentHandle>,
        details: CaseDetails,
    },
    References {
        analysis: CaseAnalysis,
    },
    Lawsuit {
        details: CaseDetails,
        analysis: CaseAnalysis,
        references: Vec<LegalReference>,
    },
}

enum Output {
    Analysis(CaseAnalysis),
    References(Vec<LegalReference>),
    Lawsuit(LawsuitDraft),
}

impl Job {
    async fn run<I: CaseIntelligence + ?Sized>(
        self,
        intelligence: &I,
    ) -> Result<Output, IntelligenceError> {
        match self {
            Job::Analyze {
                explanation,
                documents,
                details,
            } => intelligence
                .analyze(&explanation, &documents, &details)
                .await
                .map(Output::Analysis),
            Job::References { analysis } => intelligence
                .get_references(&analysis)
                .await
                .map(Output::References),
            Job::Lawsuit {
                details,
                analysis,
                references,
            } => intelligence
                .generate_lawsuit(&details, &analysis, &references)
                .await
                .map(Output::Lawsuit),
        }
    }
}

impl Session {
    fn new(details: CaseDetails) -> Self {
        Self {
            current: Stage::first(),
            details,
            analysis: StageSlot::Pending,
            references: StageSlot::Pending,
            lawsuit: StageSlot::Pending,
            epoch: 0,
        }
    }

    fn in_flight(&self) -> Option<Stage> {
        if self.analysis.is_in_flight() {
            Some(Stage::Explain)
        } else if self.references.is_in_flight() {
            Some(Stage::Analyze)
        } else if self.lawsuit.is_in_flight() {
            Some(Stage::Reference)
        } else {
            None
        }
    }

    /// Mark the step attached to `stage` in flight and capture its inputs.
    ///
    /// `Ok(None)` means there is nothing to run: the stage has no step, or
    /// its output is already stored.
    fn begin(&mut self, stage: Stage) -> Result<Option<Job>, WizardError> {
        let job = match stage {
            Stage::Explain => {
                if !self.analysis.begin() {
                    return Ok(None);
                }
                Job::Analyze {
                    explanation: self.details.case_explanation.clone(),
                    documents: self.details.documents.clone(),
                    details: self.details.clone(),
                }
            }
            Stage::Analyze => {
                let analysis = self
                    .analysis
                    .value()
                    .cloned()
                    .ok_or(WizardError::MissingPrerequisite(stage))?;
                if !self.references.begin() {
                    return Ok(None);
                }
                Job::References { analysis }
            }
            Stage::Reference => {
                let (Some(analysis), Some(references)) =
                    (self.analysis.value(), self.references.value())
                else {
                    return Err(WizardError::MissingPrerequisite(stage));
                };
                let (analysis, references) = (analysis.clone(), references.clone());
                if !self.lawsuit.begin() {
                    return Ok(None);
                }
                Job::Lawsuit {
                    details: self.details.clone(),
                    analysis,
                    references,
                }
            }
            Stage::Details | Stage::Upload | Stage::Lawsuit => return Ok(None),
        };
        Ok(Some(job))
    }

    fn slot_status(&self, stage: Stage) -> Option<SlotStatus> {
        match stage {
            Stage::Explain => Some(self.analysis.status()),
            Stage::Analyze => Some(self.references.status()),
            Stage::Reference => Some(self.lawsuit.status()),
            Stage::Details | Stage::Upload | Stage::Lawsuit => None,
        }
    }

    fn store(&mut self, output: Output) {
        match output {
            Output::Analysis(v) => self.analysis.complete(v),
            Output::References(v) => self.references.complete(v),
            Output::Lawsuit(v) => self.lawsuit.complete(v),
        }
    }

    fn fail(&mut self, stage: Stage, cause: String) {
        match stage {
            Stage::Explain => self.analysis.fail(cause),
            Stage::Analyze => self.references.fail(cause),
            Stage::Reference => self.lawsuit.fail(cause),
            Stage::Details | Stage::Upload | Stage::Lawsuit => {}
        }
    }

    fn abandon(&mut self, stage: Stage) {
        match stage {
            Stage::Explain => self.analysis.abandon(),
            Stage::Analyze => self.references.abandon(),
            Stage::Reference => self.lawsuit.abandon(),
            Stage::Details | Stage::Upload | Stage::Lawsuit => {}
        }
    }

    fn record(&self) -> CaseRecord {
        CaseRecord {
            details: self.details.clone(),
            analysis: self.analysis.value().cloned(),
            references: self.references.value().cloned(),
            lawsuit: self.lawsuit.value().cloned(),
        }
    }
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns an in-flight slot to `Pending` if the advancing future is
/// dropped before its step resolves.
struct InFlightGuard<'a> {
    session: &'a Mutex<Session>,
    stage: Stage,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            lock(self.session).abandon(self.stage);
            debug!(stage = %self.stage, "in-flight processing abandoned");
        }
    }
}

/// A single case moving through the intake stages.
pub struct Wizard<I> {
    intelligence: I,
    session: Mutex<Session>,
    events: broadcast::Sender<WizardEvent>,
}

impl<I: CaseIntelligence> Wizard<I> {
    pub fn new(intelligence: I) -> Self {
        Self::with_details(intelligence, CaseDetails::default())
    }

    pub fn with_details(intelligence: I, details: CaseDetails) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            intelligence,
            session: Mutex::new(Session::new(details)),
            events,
        }
    }

    pub fn intelligence(&self) -> &I {
        &self.intelligence
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.events.subscribe()
    }

    pub fn current_stage(&self) -> Stage {
        lock(&self.session).current
    }

    pub fn progress_percent(&self) -> u8 {
        self.current_stage().progress_percent()
    }

    /// True while any processing step is outstanding.
    pub fn is_busy(&self) -> bool {
        lock(&self.session).in_flight().is_some()
    }

    /// State of the step attached to `stage`, if it has one.
    pub fn stage_status(&self, stage: Stage) -> Option<SlotStatus> {
        lock(&self.session).slot_status(stage)
    }

    /// Snapshot of the case as it stands.
    pub fn record(&self) -> CaseRecord {
        lock(&self.session).record()
    }

    /// Apply a user edit to the case details.
    pub fn edit<R>(&self, f: impl FnOnce(&mut CaseDetails) -> R) -> R {
        f(&mut lock(&self.session).details)
    }

    fn emit(&self, event: WizardEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn move_forward(&self, session: &mut Session) -> Advance {
        match session.current.next() {
            Some(next) => {
                session.current = next;
                info!(stage = %next, "stage entered");
                self.emit(WizardEvent::StageEntered(next));
                Advance::Moved(next)
            }
            None => {
                let record = Box::new(session.record());
                info!(client = %record.details.client_name, "case submitted");
                self.emit(WizardEvent::Submitted {
                    record: record.clone(),
                    submitted_at: chrono::Utc::now(),
                });
                Advance::Completed(record)
            }
        }
    }

    /// Leave the current stage, running its processing step first if its
    /// output is not stored yet.
    ///
    /// On failure the stage does not change and nothing is stored; calling
    /// `advance()` again retries.
    pub async fn advance(&self) -> Result<Advance, WizardError> {
        let (stage, epoch, job) = {
            let mut session = lock(&self.session);
            if let Some(busy) = session.in_flight() {
                debug!(stage = %busy, "advance rejected while processing");
                return Err(WizardError::Busy(busy));
            }
            let stage = session.current;
            match session.begin(stage)? {
                Some(job) => (stage, session.epoch, job),
                None => return Ok(self.move_forward(&mut session)),
            }
        };

        info!(stage = %stage, "stage processing started");
        let mut guard = InFlightGuard {
            session: &self.session,
            stage,
            armed: true,
        };
        let result = job.run(&self.intelligence).await;
        guard.armed = false;

        let mut session = lock(&self.session);
        if session.epoch != epoch {
            session.abandon(stage);
            warn!(stage = %stage, "discarding processing result after navigation");
            return Err(WizardError::Superseded(stage));
        }

        match result {
            Ok(output) => {
                session.store(output);
                info!(stage = %stage, "stage processing finished");
                self.emit(WizardEvent::OutputReady(stage));
                Ok(self.move_forward(&mut session))
            }
            Err(cause) => {
                let message = cause.to_string();
                session.fail(stage, message.clone());
                warn!(stage = %stage, error = %message, "stage processing failed");
                self.emit(WizardEvent::ProcessingFailed {
                    stage,
                    cause: message,
                });
                Err(WizardError::ProcessingFailed { stage, cause })
            }
        }
    }

    /// Go back one stage. Never runs processing.
    pub fn retreat(&self) -> Retreat {
        let mut session = lock(&self.session);
        session.epoch += 1;
        match session.current.previous() {
            Some(previous) => {
                session.current = previous;
                info!(stage = %previous, "stage entered");
                self.emit(WizardEvent::StageEntered(previous));
                Retreat::Moved(previous)
            }
            None => {
                info!("wizard exited");
                self.emit(WizardEvent::Exited);
                Retreat::Exit
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use lexdraft_ai::MockIntelligence;
    use tokio::sync::Notify;

    use super::*;

    /// Delegates to the instant mock and counts calls per step.
    #[derive(Default)]
    struct Spy {
        inner: MockIntelligence,
        analyze_calls: AtomicUsize,
        reference_calls: AtomicUsize,
        lawsuit_calls: AtomicUsize,
        /// Number of leading analyze calls that fail.
        failing_analyses: AtomicUsize,
        /// When set, analyze signals `entered` and waits for `release`.
        gate: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    impl Spy {
        fn gated() -> (Self, Arc<Notify>, Arc<Notify>) {
            let entered = Arc::new(Notify::new());
            let release = Arc::new(Notify::new());
            let spy = Self {
                gate: Some((entered.clone(), release.clone())),
                ..spy()
            };
            (spy, entered, release)
        }

        fn calls(&self) -> (usize, usize, usize) {
            (
                self.analyze_calls.load(Ordering::SeqCst),
                self.reference_calls.load(Ordering::SeqCst),
                self.lawsuit_calls.load(Ordering::SeqCst),
            )
        }
    }

    #[async_trait]
    impl CaseIntelligence for Spy {
        async fn analyze(
            &self,
            case_explanation: &str,
            documents: &[DocumentHandle],
            details: &CaseDetails,
        ) -> Result<CaseAnalysis, IntelligenceError> {
            self.analyze_calls.fetch_add(1, Ordering::SeqCst);
            if let Some((entered, release)) = &self.gate {
                entered.notify_one();
                release.notified().await;
            }
            let failing = self.failing_analyses.load(Ordering::SeqCst);
            if failing > 0 {
                self.failing_analyses.store(failing - 1, Ordering::SeqCst);
                return Err(IntelligenceError::InvalidResponse("model timed out".into()));
            }
            self.inner.analyze(case_explanation, documents, details).await
        }

        async fn get_references(
            &self,
            analysis: &CaseAnalysis,
        ) -> Result<Vec<LegalReference>, IntelligenceError> {
            self.reference_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get_references(analysis).await
        }

        async fn generate_lawsuit(
            &self,
            details: &CaseDetails,
            analysis: &CaseAnalysis,
            references: &[LegalReference],
        ) -> Result<LawsuitDraft, IntelligenceError> {
            self.lawsuit_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.generate_lawsuit(details, analysis, references).await
        }
    }

    fn spy() -> Spy {
        Spy {
            inner: MockIntelligence::instant(),
            ..Spy::default()
        }
    }

    fn details() -> CaseDetails {
        CaseDetails {
            title: "Wrongful Termination".into(),
            client_name: "Arta Krasniqi".into(),
            case_explanation: "My employer terminated me without notice".into(),
            ..CaseDetails::default()
        }
    }

    async fn advance_to(wizard: &Wizard<Spy>, target: Stage) {
        while wizard.current_stage() != target {
            wizard.advance().await.unwrap();
        }
    }

    #[tokio::test]
    async fn full_run_completes_with_every_output() {
        let wizard = Wizard::with_details(spy(), details());
        let mut stages = vec![wizard.current_stage()];
        loop {
            match wizard.advance().await.unwrap() {
                Advance::Moved(stage) => stages.push(stage),
                Advance::Completed(record) => {
                    assert!(record.is_complete());
                    let analysis = record.analysis.as_ref().unwrap();
                    assert_eq!(analysis.success_probability, 75);
                    assert_eq!(record.references.as_ref().unwrap().len(), 4);
                    let lawsuit = record.lawsuit.as_ref().unwrap();
                    assert!(lawsuit.full_text.contains("LAWSUIT"));
                    assert!(lawsuit.full_text.contains("Arta Krasniqi"));
                    break;
                }
            }
        }
        assert_eq!(stages, Stage::ALL);
        assert_eq!(wizard.intelligence().calls(), (1, 1, 1));
    }

    #[tokio::test]
    async fn stages_without_steps_do_not_call_intelligence() {
        let wizard = Wizard::with_details(spy(), details());
        assert_eq!(wizard.advance().await.unwrap(), Advance::Moved(Stage::Upload));
        assert_eq!(wizard.advance().await.unwrap(), Advance::Moved(Stage::Explain));
        assert_eq!(wizard.intelligence().calls(), (0, 0, 0));
        assert_eq!(wizard.stage_status(Stage::Upload), None);
        assert_eq!(wizard.stage_status(Stage::Explain), Some(SlotStatus::Pending));
    }

    #[tokio::test]
    async fn re_entering_processed_stages_skips_processing() {
        let wizard = Wizard::with_details(spy(), details());
        advance_to(&wizard, Stage::Lawsuit).await;
        let before = wizard.record();
        assert_eq!(wizard.intelligence().calls(), (1, 1, 1));

        for _ in 0..3 {
            assert!(matches!(wizard.retreat(), Retreat::Moved(_)));
        }
        assert_eq!(wizard.current_stage(), Stage::Explain);
        advance_to(&wizard, Stage::Lawsuit).await;

        assert_eq!(wizard.intelligence().calls(), (1, 1, 1));
        let after = wizard.record();
        assert_eq!(after.analysis, before.analysis);
        assert_eq!(after.references, before.references);
        assert_eq!(after.lawsuit, before.lawsuit);
    }

    #[tokio::test]
    async fn stored_outputs_survive_detail_edits() {
        let wizard = Wizard::with_details(spy(), details());
        advance_to(&wizard, Stage::Analyze).await;
        let analysis = wizard.record().analysis;

        wizard.retreat();
        wizard.edit(|d| d.case_explanation = "I was discriminated against".into());
        wizard.advance().await.unwrap();

        assert_eq!(wizard.record().analysis, analysis);
        assert_eq!(wizard.intelligence().calls().0, 1);
    }

    #[tokio::test]
    async fn failure_keeps_stage_and_allows_retry() {
        let spy = spy();
        spy.failing_analyses.store(1, Ordering::SeqCst);
        let wizard = Wizard::with_details(spy, details());
        let mut events = wizard.subscribe();
        advance_to(&wizard, Stage::Explain).await;

        let err = wizard.advance().await.unwrap_err();
        match &err {
            WizardError::ProcessingFailed { stage, cause } => {
                assert_eq!(*stage, Stage::Explain);
                assert!(matches!(cause, IntelligenceError::InvalidResponse(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(wizard.current_stage(), Stage::Explain);
        assert!(wizard.record().analysis.is_none());
        assert!(matches!(
            wizard.stage_status(Stage::Explain),
            Some(SlotStatus::Failed(_))
        ));

        let mut saw_failure = false;
        while let Ok(event) = events.try_recv() {
            if let WizardEvent::ProcessingFailed { stage, .. } = event {
                assert_eq!(stage, Stage::Explain);
                saw_failure = true;
            }
        }
        assert!(saw_failure);

        assert_eq!(wizard.advance().await.unwrap(), Advance::Moved(Stage::Analyze));
        assert_eq!(wizard.intelligence().calls().0, 2);
        assert_eq!(wizard.stage_status(Stage::Explain), Some(SlotStatus::Completed));
    }

    #[tokio::test]
    async fn advance_while_in_flight_is_rejected() {
        let (spy, entered, release) = Spy::gated();
        let wizard = Wizard::with_details(spy, details());
        advance_to(&wizard, Stage::Explain).await;

        let (first, second) = tokio::join!(wizard.advance(), async {
            entered.notified().await;
            assert!(wizard.is_busy());
            let second = wizard.advance().await;
            release.notify_one();
            second
        });

        assert!(matches!(second, Err(WizardError::Busy(Stage::Explain))));
        assert_eq!(first.unwrap(), Advance::Moved(Stage::Analyze));
        assert_eq!(wizard.intelligence().calls().0, 1);
        assert!(!wizard.is_busy());
    }

    #[tokio::test]
    async fn result_after_retreat_is_discarded() {
        let (spy, entered, release) = Spy::gated();
        let wizard = Wizard::with_details(spy, details());
        advance_to(&wizard, Stage::Explain).await;

        let (first, _) = tokio::join!(wizard.advance(), async {
            entered.notified().await;
            assert_eq!(wizard.retreat(), Retreat::Moved(Stage::Upload));
            release.notify_one();
        });

        assert!(matches!(first, Err(WizardError::Superseded(Stage::Explain))));
        assert_eq!(wizard.current_stage(), Stage::Upload);
        assert!(wizard.record().analysis.is_none());
        assert_eq!(wizard.stage_status(Stage::Explain), Some(SlotStatus::Pending));
    }

    #[tokio::test]
    async fn dropped_advance_returns_slot_to_pending() {
        let (spy, _entered, _release) = Spy::gated();
        let wizard = Wizard::with_details(spy, details());
        advance_to(&wizard, Stage::Explain).await;

        let timed_out = tokio::time::timeout(Duration::from_millis(20), wizard.advance()).await;
        assert!(timed_out.is_err());
        assert!(!wizard.is_busy());
        assert_eq!(wizard.stage_status(Stage::Explain), Some(SlotStatus::Pending));
        assert_eq!(wizard.current_stage(), Stage::Explain);
    }

    #[tokio::test]
    async fn retreat_from_first_stage_exits() {
        let wizard = Wizard::new(spy());
        let mut events = wizard.subscribe();
        assert_eq!(wizard.retreat(), Retreat::Exit);
        assert_eq!(wizard.current_stage(), Stage::Details);
        assert!(matches!(events.try_recv().unwrap(), WizardEvent::Exited));
    }

    #[tokio::test]
    async fn submitted_event_carries_final_record() {
        let wizard = Wizard::with_details(spy(), details());
        let mut events = wizard.subscribe();
        advance_to(&wizard, Stage::Lawsuit).await;
        let Advance::Completed(record) = wizard.advance().await.unwrap() else {
            panic!("expected completion");
        };

        let mut received = Vec::new();
        while let Ok(event) = events.try_recv() {
            received.push(event);
        }
        let ready: Vec<_> = received
            .iter()
            .filter_map(|e| match e {
                WizardEvent::OutputReady(stage) => Some(*stage),
                _ => None,
            })
            .collect();
        assert_eq!(ready, [Stage::Explain, Stage::Analyze, Stage::Reference]);
        match received.last() {
            Some(WizardEvent::Submitted { record: submitted, .. }) => {
                assert_eq!(submitted, &record);
            }
            other => panic!("unexpected last event: {other:?}"),
        }
        // The wizard stays on the last stage; what happens next is up to the caller.
        assert_eq!(wizard.current_stage(), Stage::Lawsuit);
    }

    #[tokio::test]
    async fn edits_apply_to_details() {
        let wizard = Wizard::new(spy());
        wizard.edit(|d| {
            d.client_name = "Blerim Shala".into();
            d.attach(DocumentHandle::new("contract.pdf", 2048));
        });
        let record = wizard.record();
        assert_eq!(record.details.client_name, "Blerim Shala");
        assert_eq!(record.details.documents.len(), 1);
        assert_eq!(wizard.progress_percent(), 17);
    }
}
