//! Chat mode driven line by line

mod common;

use std::sync::Arc;

use common::{pipeline, ScriptedModel, TableIndex};
use pdfbuddy::rag::PipelineConfig;
use pdfbuddy::repl::{ChatConfig, ChatSession, Flow, TurnOutcome};

fn session() -> ChatSession {
    ChatSession::new(ChatConfig {
        history_file: None,
        show_progress: false,
        show_context: false,
    })
    .unwrap()
}

#[tokio::test]
async fn test_question_is_answered_and_recorded() {
    let llm = Arc::new(ScriptedModel::new("a\nb\nc", "Answer: Agents act.\nScore: 0.9"));
    let index = Arc::new(TableIndex::new().with_fallback(&["Agents act on goals."]));
    let rag = pipeline(llm, index, &PipelineConfig::enhanced());
    let mut chat = session();

    let flow = chat.handle_input("What is an agent?", &rag).await.unwrap();

    assert_eq!(flow, Flow::Continue);
    assert_eq!(chat.transcript().len(), 1);
    let turn = chat.transcript().last_answered().unwrap();
    assert_eq!(turn.question, "What is an agent?");
    match &turn.outcome {
        TurnOutcome::Answered {
            answer,
            confidence_score,
            context_chunks,
        } => {
            assert_eq!(answer, "Agents act.");
            assert_eq!(*confidence_score, 0.9);
            assert_eq!(context_chunks, &vec!["Agents act on goals.".to_string()]);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test]
async fn test_failure_does_not_end_session() {
    let llm = Arc::new(ScriptedModel::new("a\nb\nc", "Answer: ok\nScore: 1.0"));
    let rag = pipeline(llm, Arc::new(TableIndex::failing()), &PipelineConfig::enhanced());
    let mut chat = session();

    let flow = chat.handle_input("Does this fail?", &rag).await.unwrap();

    assert_eq!(flow, Flow::Continue);
    assert_eq!(chat.transcript().failed_count(), 1);
    assert!(chat.transcript().last_answered().is_none());

    let turn = chat.transcript().recent(1)[0];
    assert!(matches!(&turn.outcome, TurnOutcome::Failed { error } if error.contains("connection refused")));
}

#[tokio::test]
async fn test_commands_and_blank_lines() {
    let llm = Arc::new(ScriptedModel::new("a\nb\nc", "Answer: ok\nScore: 1.0"));
    let rag = pipeline(llm.clone(), Arc::new(TableIndex::new()), &PipelineConfig::simple());
    let mut chat = session();

    assert_eq!(chat.handle_input("   ", &rag).await.unwrap(), Flow::Continue);
    assert_eq!(chat.handle_input("/help", &rag).await.unwrap(), Flow::Continue);
    assert_eq!(chat.handle_input("/history 3", &rag).await.unwrap(), Flow::Continue);
    assert_eq!(chat.handle_input("/exit", &rag).await.unwrap(), Flow::Exit);

    // Commands never reach the model
    assert!(llm.prompts().is_empty());
    assert!(chat.transcript().is_empty());
}

#[tokio::test]
async fn test_reset_clears_transcript() {
    let llm = Arc::new(ScriptedModel::new("a\nb\nc", "Answer: ok\nScore: 1.0"));
    let rag = pipeline(llm, Arc::new(TableIndex::new()), &PipelineConfig::simple());
    let mut chat = session();

    chat.handle_input("first question", &rag).await.unwrap();
    chat.handle_input("second question", &rag).await.unwrap();
    assert_eq!(chat.transcript().len(), 2);

    chat.handle_input("/reset", &rag).await.unwrap();
    assert!(chat.transcript().is_empty());
    assert_eq!(chat.transcript().total_turns(), 2);
}

#[tokio::test]
async fn test_export_command_saves_transcript() {
    let llm = Arc::new(ScriptedModel::new("a\nb\nc", "Answer: Plans.\nScore: 0.7"));
    let rag = pipeline(llm, Arc::new(TableIndex::new()), &PipelineConfig::simple());
    let mut chat = session();
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("chat.json");

    chat.handle_input("What is planning?", &rag).await.unwrap();
    let flow = chat
        .handle_input(&format!("/export {}", path.display()), &rag)
        .await
        .unwrap();

    assert_eq!(flow, Flow::Continue);
    let json = std::fs::read_to_string(&path).unwrap();
    assert!(json.contains("What is planning?"));
    assert!(json.contains("\"status\": \"answered\""));
}
