use anyhow::{Result, anyhow};
use muse_application::TurnInput;
use muse_core::Clock;
use muse_core::feedback::{FeedbackRecord, SwitchOutcome};
use muse_core::persona::PersonaContext;
use muse_core::question::QuestionRepository;
use serde_json::json;

use super::{App, print_json};

pub struct FeedbackArgs {
    pub persona: String,
    pub rating: u8,
    pub helpful: bool,
    pub comment: Option<String>,
    /// Question id and the admin's answer
    pub question: Option<(String, String)>,
    /// Ledger id of the rated turn
    pub interaction: Option<String>,
    pub switch: Option<SwitchOutcome>,
}

pub async fn select(app: &App, subject: String, topics: Vec<String>, pin: Option<String>) -> Result<()> {
    let (engine, _) = app.engine().await?;
    let mut context = PersonaContext::new(subject).with_topics(topics);
    context.pinned_persona_id = pin;

    let selection = engine.select_best_persona(&context).await?;
    print_json(&json!({
        "persona_id": selection.persona.id,
        "display_identifier": selection.persona.display_identifier,
        "name": selection.persona.name,
        "reason": selection.reason,
        "score": selection.score,
    }))
}

pub async fn plan(app: &App, input: TurnInput) -> Result<()> {
    let (engine, _) = app.engine().await?;
    let plan = engine.plan_turn(&input).await?;
    print_json(&plan)
}

pub async fn feedback(app: &App, args: FeedbackArgs) -> Result<()> {
    let (engine, mut escalations) = app.engine().await?;

    let mut record = FeedbackRecord::new(
        uuid::Uuid::new_v4().to_string(),
        args.persona,
        args.rating,
        args.helpful,
        app.clock.now(),
    );
    record.comment = args.comment;
    if let Some((question_id, response)) = args.question {
        record = record.with_question(question_id, response);
    }
    if let Some(interaction_id) = args.interaction {
        record = record.for_interaction(interaction_id);
    }
    if let Some(outcome) = args.switch {
        record = record.with_switch_outcome(outcome);
    }

    let outcome = engine.apply_feedback(&record).await?;
    print_json(&json!({
        "feedback_id": record.id,
        "persona": outcome.persona,
        "question_success_rate": outcome.question_success_rate,
    }))?;

    while let Ok(escalation) = escalations.try_recv() {
        eprintln!(
            "URGENT REVIEW: feedback {} on persona {} ({:?})",
            escalation.feedback_id, escalation.persona_id, escalation.reason
        );
    }
    Ok(())
}

pub async fn follow_up(app: &App, question_id: &str, response: &str) -> Result<()> {
    let (engine, _) = app.engine().await?;
    let template = app
        .questions
        .get_by_id(question_id)
        .await?
        .ok_or_else(|| anyhow!("unknown question '{}'", question_id))?;

    match engine.generate_follow_up(&template, response) {
        Some(follow_up) => println!("{}", follow_up),
        None => println!("(no follow-up configured for {})", question_id),
    }
    Ok(())
}
