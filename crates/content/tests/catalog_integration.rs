use content::{Content, ContentError, catalog};
use quiz_core::model::TopicId;

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("quiz-content-{}-{name}", std::process::id()))
}

#[tokio::test]
async fn builtin_content_serves_topics_through_the_trait() {
    let content = Content::builtin().unwrap();

    let listed = content.topics.list_topics().await.unwrap();
    assert_eq!(listed.len(), 4);
    assert!(listed.iter().all(|t| t.question_count == 5));

    let general = content
        .topics
        .get_topic(&TopicId::new("General").unwrap())
        .await
        .unwrap();
    assert_eq!(general.title(), "General Knowledge");
    assert_eq!(general.questions()[4].correct_answer().as_str(), "tokyo");
}

#[tokio::test]
async fn content_file_round_trips_through_disk() {
    let path = temp_path("roundtrip.json");
    let topics = catalog::parse_catalog(catalog::BUILTIN_CATALOG).unwrap();
    std::fs::write(&path, catalog::to_json(&topics[..1]).unwrap()).unwrap();

    let content = Content::from_path(&path).unwrap();
    let listed = content.topics.list_topics().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id.as_str(), "science");

    std::fs::remove_file(&path).ok();
}

#[test]
fn missing_file_is_an_io_error() {
    let err = Content::from_path(&temp_path("does-not-exist.json"))
        .err()
        .unwrap();
    assert!(matches!(err, ContentError::Io { .. }));
}

#[test]
fn duplicate_topics_in_a_file_are_refused() {
    let path = temp_path("dupes.json");
    std::fs::write(
        &path,
        r#"{ "topics": [ { "id": "art", "questions": [] }, { "id": "Art", "questions": [] } ] }"#,
    )
    .unwrap();

    let err = Content::from_path(&path).err().unwrap();
    assert!(matches!(err, ContentError::DuplicateTopic { .. }));

    std::fs::remove_file(&path).ok();
}
