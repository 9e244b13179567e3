use super::common::*;
use crate::workflows::performance::gateways::{LlmError, SummaryGenerator};
use crate::workflows::performance::assistants::{
    self, conflict_context, context_for, mentioned_employee, psycholog_context,
    recommend_services, respond, sidekick_context, AssistantKind,
};

fn team() -> MemoryStore {
    MemoryStore::seeded(vec![
        record("EMP001", "John Smith", true, false),
        record("EMP002", "Jane Doe", false, true),
        record("EMP003", "Michael Johnson", true, true),
        record("EMP004", "Emily Davis", false, false),
    ])
}

#[test]
fn empty_store_contexts_say_so() {
    let store = MemoryStore::default();

    assert_eq!(
        sidekick_context(&store, None).unwrap(),
        "No employee performance data available."
    );
    assert_eq!(
        psycholog_context(&store, None).unwrap(),
        "No employees currently flagged as needing psychological support."
    );
    assert_eq!(
        conflict_context(&store, None).unwrap(),
        "No employees currently flagged as needing conflict resolution."
    );
}

#[test]
fn sidekick_team_context_counts_flags() {
    let context = sidekick_context(&team(), None).unwrap();

    assert!(context.starts_with("Team Performance Context:"));
    assert!(context.contains("- Total employees analyzed: 4"));
    assert!(context.contains("- Employees potentially needing psychological support: 2"));
    assert!(context.contains("- Employees potentially needing conflict resolution: 2"));
}

#[test]
fn sidekick_employee_context_lists_metrics_and_notes() {
    let context = sidekick_context(&team(), Some("  michael johnson ")).unwrap();

    assert!(context.starts_with("Employee Performance Context for Michael Johnson:"));
    assert!(context.contains("- Tasks Completed: 20"));
    assert!(context.contains("- Customer Satisfaction: 90%"));
    assert!(context.contains("NOTE: This employee may benefit from psychological support."));
    assert!(context.contains("NOTE: This employee may benefit from conflict resolution support."));
}

#[test]
fn unknown_employee_falls_back_to_team_context() {
    let context = sidekick_context(&team(), Some("Nobody Here")).unwrap();
    assert!(context.starts_with("Team Performance Context:"));
}

#[test]
fn flagged_lists_are_numbered() {
    let store = team();

    let psych = psycholog_context(&store, None).unwrap();
    assert!(psych.starts_with("Employees potentially needing psychological support:"));
    assert!(psych.contains("1. John Smith"));
    assert!(psych.contains("2. Michael Johnson"));
    assert!(!psych.contains("Jane Doe"));

    let conflict = conflict_context(&store, None).unwrap();
    assert!(conflict.contains("1. Jane Doe"));
    assert!(conflict.contains("2. Michael Johnson"));
}

#[test]
fn focused_contexts_quote_improvement_areas_and_notes() {
    let store = team();

    let psych = context_for(AssistantKind::Psycholog, &store, Some("John Smith")).unwrap();
    assert!(psych.contains("Areas for improvement:\nNo areas requiring urgent improvement."));
    assert!(psych.contains("indicators of stress or anxiety"));

    let conflict = context_for(AssistantKind::Conflict, &store, Some("Jane Doe")).unwrap();
    assert!(conflict.contains("- Team goal achievement: 82.5%"));
    assert!(conflict.contains("indicators of team conflicts"));

    let calm = context_for(AssistantKind::Conflict, &store, Some("Emily Davis")).unwrap();
    assert!(!calm.contains("NOTE:"));
}

#[test]
fn flagged_employee_lists_carry_summaries() {
    let flagged = assistants::flagged_for_psychologist(&team()).unwrap();
    let names: Vec<&str> = flagged
        .iter()
        .map(|employee| employee.employee_name.as_str())
        .collect();

    assert_eq!(names, ["John Smith", "Michael Johnson"]);
    assert!(flagged[0].summary.starts_with("Performance Summary: good"));
}

#[test]
fn keywords_trigger_matching_services() {
    let stressed = recommend_services("I can't sleep and feel overwhelmed", None);
    assert!(stressed.need_psychologist);
    assert!(!stressed.need_conflict_resolution);
    assert!(stressed.offer.contains("Psycholog service"));

    let both = recommend_services("Stress from the constant tension with a colleague", None);
    assert!(both.need_psychologist && both.need_conflict_resolution);
    assert!(both.offer.contains("both"));

    let neutral = recommend_services("Can you summarize last week's numbers?", None);
    assert!(neutral.is_empty());
    assert!(neutral.offer.is_empty());
}

#[test]
fn stored_flags_are_ored_with_keywords() {
    let flagged = record("EMP002", "Jane Doe", false, true);

    let recommendation = recommend_services("How was the sprint review?", Some(&flagged));

    assert!(!recommendation.need_psychologist);
    assert!(recommendation.need_conflict_resolution);
    assert!(recommendation.offer.contains("Conflict Resolution service"));
}

#[test]
fn assistant_names_parse_with_aliases() {
    assert_eq!(AssistantKind::parse("Sidekick"), Some(AssistantKind::Sidekick));
    assert_eq!(AssistantKind::parse("psychologist"), Some(AssistantKind::Psycholog));
    assert_eq!(
        AssistantKind::parse(" conflict-resolution "),
        Some(AssistantKind::Conflict)
    );
    assert_eq!(AssistantKind::parse("oracle"), None);
}

#[test]
fn longest_mentioned_name_wins() {
    let store = MemoryStore::seeded(vec![
        record("EMP001", "Ann Lee", false, false),
        record("EMP002", "Ann Lee Parker", true, false),
    ]);

    let found = mentioned_employee(&store, "Has anyone checked on ann lee parker today?")
        .unwrap()
        .expect("name mentioned");
    assert_eq!(found.employee_id.as_str(), "EMP002");

    assert!(mentioned_employee(&store, "Nobody in particular")
        .unwrap()
        .is_none());
}

#[test]
fn chat_prompt_wraps_message_in_context() {
    let store = team();
    let generator = ScriptedGenerator::replying("Let's look at the numbers together.");

    let reply = respond(
        AssistantKind::Psycholog,
        &store,
        &generator,
        "How can I support my team?",
        None,
    )
    .unwrap();

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].starts_with("Employees potentially needing psychological support:"));
    assert!(prompts[0].ends_with("User: How can I support my team?\n\nAssistant:"));
    assert_eq!(reply.reply, "Let's look at the numbers together.");
    assert!(reply.recommendation.is_none());
}

#[test]
fn sidekick_chat_uses_mentioned_employee_flags() {
    let store = team();
    let generator = ScriptedGenerator::replying("Sure.");

    let reply = respond(
        AssistantKind::Sidekick,
        &store,
        &generator,
        "Any advice on how John Smith is doing?",
        None,
    )
    .unwrap();

    let recommendation = reply.recommendation.expect("flags recommend a service");
    assert!(recommendation.need_psychologist);
    assert!(reply.reply.starts_with("Sure.\n\n"));
    assert!(reply.reply.ends_with("Would you like me to connect you to the Psycholog service?"));
}

/// Declines summary completions but answers chat turns.
struct ChatOnlyGenerator;

impl SummaryGenerator for ChatOnlyGenerator {
    fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::Unavailable("summary path not expected".to_string()))
    }

    fn converse(&self, _prompt: &str) -> Result<String, LlmError> {
        Ok("Talk to them one on one first.".to_string())
    }
}

#[test]
fn chat_replies_use_the_conversation_path() {
    let store = team();

    let reply = respond(
        AssistantKind::Conflict,
        &store,
        &ChatOnlyGenerator,
        "Two colleagues stopped talking",
        None,
    )
    .unwrap();

    assert_eq!(reply.reply, "Talk to them one on one first.");
}
