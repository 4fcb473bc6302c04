use axum::http::StatusCode;
use axum_test::TestServer;
use sarf_api::build_router;
use sarf_storage::Storage;
use serde_json::{json, Value};
use tempfile::TempDir;

fn start(dir: &TempDir) -> anyhow::Result<TestServer> {
    let storage = Storage::open(dir.path())?;
    TestServer::new(build_router(storage))
}

fn encode(segment: &str) -> String {
    segment.bytes().map(|b| format!("%{b:02X}")).collect()
}

#[tokio::test]
async fn roots_are_listed_in_order_with_categories() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let server = start(&dir)?;

    let res = server.post("/api/roots").add_query_param("root", "قال").await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let body: Value = res.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["category"], "weak_medial_waw");

    let roots: Vec<Value> = server.get("/api/roots").await.json();
    let names: Vec<&str> = roots.iter().filter_map(|r| r["root"].as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert_eq!(names.len(), 5);
    assert!(roots.iter().all(|r| r["categoryLabel"].is_string()));

    let shape: Value = server.get("/api/roots/visual").await.json();
    assert!(shape["name"].is_string());
    assert!(shape["balance"].as_i64().unwrap().abs() <= 1);
    Ok(())
}

#[tokio::test]
async fn root_lookup_includes_metadata() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let server = start(&dir)?;

    let res = server.get(&format!("/api/roots/{}", encode("كتب"))).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let body: Value = res.json();
    assert_eq!(body["category"], "regular");
    assert_eq!(body["info"]["difficulty"], "easy");

    let res = server.get(&format!("/api/roots/{}", encode("قال"))).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn generate_and_validate_round_trip() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let server = start(&dir)?;
    server.post("/api/roots").add_query_param("root", "قال").await;

    let res = server
        .post("/api/generate")
        .add_query_param("root", "قال")
        .add_query_param("scheme_id", "يفعل")
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let body: Value = res.json();
    assert_eq!(body["word"], "يقول");
    assert_eq!(body["slot"], "present");
    assert_eq!(body["frequency"], 1);

    let body: Value = server
        .post("/api/validate")
        .add_query_param("word", "يَقُولُ")
        .add_query_param("root_str", "قال")
        .await
        .json();
    assert_eq!(body, json!({ "isValid": true, "scheme": "يفعل", "generated": "يقول" }));

    let entry: Value = server
        .get(&format!("/api/roots/{}", encode("قال")))
        .await
        .json();
    assert_eq!(entry["derivedWords"][0]["word"], "يقول");
    assert_eq!(entry["derivedWords"][0]["frequency"], 1);
    assert_eq!(entry["derivedWords"][1]["word"], "يَقُولُ");
    assert_eq!(entry["derivedWords"][1]["frequency"], 1);

    let body: Value = server
        .post("/api/validate")
        .add_query_param("word", "كتاب")
        .add_query_param("root_str", "قال")
        .await
        .json();
    assert_eq!(body, json!({ "isValid": false }));
    Ok(())
}

#[tokio::test]
async fn schemes_can_be_registered() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let server = start(&dir)?;

    let schemes: Vec<Value> = server.get("/api/schemes").await.json();
    assert_eq!(schemes.len(), 5);

    let res = server
        .post("/api/schemes")
        .json(&json!({ "id": "مفعل", "pattern": "مَفْعَل", "transformationRule": "Place" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let res = server
        .post("/api/schemes")
        .json(&json!({ "id": "bad", "pattern": "xyz", "transformationRule": "none" }))
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = server
        .post("/api/generate")
        .add_query_param("root", "درس")
        .add_query_param("scheme_id", "مفعل")
        .await
        .json();
    assert_eq!(body["word"], "مدرس");
    Ok(())
}

#[tokio::test]
async fn classify_does_not_require_a_stored_root() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let server = start(&dir)?;

    let body: Value = server
        .get("/api/classify")
        .add_query_param("root", "وقى")
        .await
        .json();
    assert_eq!(body["category"], "doubly_weak_split");
    assert!(body["info"]["exampleRoot"].is_string());

    let res = server.get("/api/classify").add_query_param("root", "كت").await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn state_survives_restart_and_compaction() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    {
        let server = start(&dir)?;
        server.post("/api/roots").add_query_param("root", "دعا").await;
        server
            .post("/api/generate")
            .add_query_param("root", "دعا")
            .add_query_param("scheme_id", "أمر")
            .await;
        let body: Value = server.post("/api/compact").await.json();
        assert_eq!(body["folded"], 2);
    }

    let server = start(&dir)?;
    let entry: Value = server
        .get(&format!("/api/roots/{}", encode("دعا")))
        .await
        .json();
    assert_eq!(entry["derivedWords"][0]["word"], "ادع");
    assert_eq!(entry["category"], "weak_final_alef");
    Ok(())
}

#[tokio::test]
async fn metrics_expose_operation_counters() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let server = start(&dir)?;
    server
        .post("/api/generate")
        .add_query_param("root", "كتب")
        .add_query_param("scheme_id", "فاعل")
        .await;

    let res = server.get("/metrics").await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert!(res.text().contains("sarf_generate_total"));
    Ok(())
}
