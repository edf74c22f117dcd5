//! Editor sessions saved through the document stores.

use std::sync::Arc;
use std::time::Duration;

use carousel_core::{
    export, migrate, Action, AutoSaveConfig, AutoSaver, CarouselDocument, DocumentStore,
    EditorState, FileStore, MemoryStore, SaveEvent, SlideTemplate, IdAllocator,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn edited_session() -> EditorState {
    let mut state = EditorState::new(CarouselDocument::new_editable("post").with_title("Dicas"));
    let mut ids = IdAllocator::for_document(state.document());
    state.dispatch(Action::AddSlide {
        after_index: 0,
        slide: SlideTemplate::Cta.instantiate(&mut ids),
    });
    state.dispatch(Action::SetFooter("MINHA LOJA".into()));
    state
}

#[tokio::test]
async fn test_autosave_then_mark_saved() {
    let dir = TempDir::new().expect("tempdir");
    let store = Arc::new(FileStore::new(dir.path()));
    let config = AutoSaveConfig::default().with_debounce(Duration::from_millis(20));
    let (saver, mut events) = AutoSaver::spawn(store.clone(), "post", config);

    let mut state = edited_session();
    assert!(state.is_dirty());
    saver.notify(state.revision(), state.snapshot());

    match events.recv().await {
        Some(SaveEvent::Saved { revision }) if revision == state.revision() => {
            state.dispatch(Action::MarkSaved);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(!state.is_dirty());

    let loaded = store.load("post").await.expect("load").expect("saved");
    assert_eq!(loaded.slides, state.document().slides);
    assert_eq!(loaded.footer.text, "MINHA LOJA");
    saver.shutdown().await;
}

#[tokio::test]
async fn test_flush_and_shutdown_write_latest_revision() {
    let store = Arc::new(MemoryStore::new());
    let (saver, mut events) = AutoSaver::spawn(store.clone(), "post", AutoSaveConfig::default());

    let mut state = edited_session();
    saver.notify(state.revision(), state.snapshot());
    saver.flush();
    assert!(matches!(events.recv().await, Some(SaveEvent::Saved { .. })));

    state.dispatch(Action::SetHandle("@loja".into()));
    saver.notify(state.revision(), state.snapshot());
    saver.shutdown().await;
    assert_eq!(
        events.recv().await,
        Some(SaveEvent::Saved {
            revision: state.revision()
        })
    );

    let loaded = store.load("post").await.expect("load").expect("saved");
    assert_eq!(loaded.header.handle, "@loja");
}

#[tokio::test]
async fn test_file_store_lists_documents() {
    let dir = TempDir::new().expect("tempdir");
    let store = FileStore::new(dir.path());
    for id in ["b-post", "a-post"] {
        store
            .save(id, &CarouselDocument::new_editable(id))
            .await
            .expect("save");
    }
    assert_eq!(
        store.list().await.expect("list"),
        vec!["a-post".to_string(), "b-post".to_string()]
    );
}

#[tokio::test]
async fn test_loaded_documents_are_sanitized() {
    let dir = TempDir::new().expect("tempdir");
    let store = FileStore::new(dir.path());
    let raw = r#"{
        "version": 1,
        "id": "x",
        "title": "Imported",
        "slides": [{
            "id": "s1",
            "layout": "cover",
            "elements": [
                {"id": "e1", "type": "paragraph", "content": "hi<script>alert(1)</script>"},
                {"id": "e2", "type": "hologram"}
            ]
        }]
    }"#;
    std::fs::write(store.path_for("x"), raw).expect("write");

    let doc = store.load("x").await.expect("load").expect("present");
    let slide = &doc.slides[0];
    assert_eq!(slide.len(), 1);
    let text = slide.elements().next().and_then(|e| e.kind.text()).map(str::to_string);
    assert_eq!(text.as_deref(), Some("hi"));
}

#[test]
fn test_json_export_migrates_back_unchanged() {
    let state = edited_session();
    let json = export::to_json(state.document()).expect("export");
    let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
    let (doc, report) = migrate::migrate_with_report(value).expect("migrate");
    assert!(report.is_clean());
    assert_eq!(doc.slides, state.document().slides);
    assert_eq!(doc.theme, state.document().theme);
}
