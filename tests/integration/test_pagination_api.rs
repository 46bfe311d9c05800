use crate::common::{TestApp, names, with_query};
use axum::http::StatusCode;
use pangolin::decode_cursor;
use pangolin::pagination::TOKEN_LEN;

async fn seeded(count: usize) -> TestApp {
    let app = TestApp::new();
    for i in 0..count {
        app.create("/databases", &format!("test{i}")).await;
    }
    app
}

fn expected(range: impl DoubleEndedIterator<Item = usize>) -> Vec<String> {
    range.rev().map(|i| format!("test{i}")).collect()
}

#[tokio::test]
async fn test_thirteen_databases_in_three_pages() {
    let app = seeded(13).await;

    let (status, page) = app
        .get(&with_query("/databases", &[("pageSize", "5")]))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&page), expected(8..=12));
    assert_eq!(page["totalRecords"], 13);
    assert_eq!(page["totalPages"], 3);

    // Ids are assigned from 1, so test7 has id 8. The token names the first
    // record not shown, which opens the next page.
    let token = page["continuationToken"].as_str().unwrap().to_string();
    assert_eq!(token.len(), TOKEN_LEN);
    assert_eq!(decode_cursor(&token).unwrap().get(), 8);

    let (status, page) = app
        .get(&with_query(
            "/databases",
            &[("pageSize", "5"), ("continuationToken", token.as_str())],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&page), expected(3..=7));

    let token = page["continuationToken"].as_str().unwrap().to_string();
    let (status, page) = app
        .get(&with_query(
            "/databases",
            &[("pageSize", "5"), ("continuationToken", token.as_str())],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&page), expected(0..=2));
    assert_eq!(page["continuationToken"], "");
    assert_eq!(page["totalPages"], 3);
}

#[tokio::test]
async fn test_ascending_walk_visits_every_record_once() {
    let app = seeded(23).await;
    let mut seen = Vec::new();
    let mut token = String::new();

    loop {
        let (status, page) = app
            .get(&with_query(
                "/databases",
                &[
                    ("pageSize", "6"),
                    ("orderDesc", "false"),
                    ("continuationToken", token.as_str()),
                ],
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        seen.extend(names(&page));
        token = page["continuationToken"].as_str().unwrap().to_string();
        if token.is_empty() {
            break;
        }
    }

    assert_eq!(seen, (0..23).map(|i| format!("test{i}")).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_no_records_is_no_content() {
    let app = TestApp::new();
    let (status, body) = app
        .get(&with_query("/databases", &[("pageSize", "10")]))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
}

#[tokio::test]
async fn test_page_size_validation() {
    let app = seeded(3).await;

    for size in ["4", "101", "-1"] {
        let (status, body) = app
            .get(&with_query("/databases", &[("pageSize", size)]))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "pageSize={size}");
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"][0]["field"], "pageSize");
        assert_eq!(body["details"][0]["value"], size);
    }

    let (status, body) = app.get("/databases").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["tag"], "required");

    let (status, _) = app
        .get(&with_query("/databases", &[("pageSize", "many")]))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_malformed_token_is_rejected() {
    let app = seeded(3).await;
    for token in ["not-a-token!", "AAAA", "AAAAAAAAAAA"] {
        let (status, body) = app
            .get(&with_query(
                "/databases",
                &[("pageSize", "5"), ("continuationToken", token)],
            ))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "token={token}");
        assert_eq!(body["code"], "MALFORMED_TOKEN");
    }
}

#[tokio::test]
async fn test_deleted_records_hidden_unless_requested() {
    let app = seeded(6).await;
    let (status, _) = app.delete("/databases/2").await;
    assert_eq!(status, StatusCode::OK);

    let (_, page) = app
        .get(&with_query("/databases", &[("pageSize", "5")]))
        .await;
    assert_eq!(page["totalRecords"], 5);
    assert!(!names(&page).contains(&"test1".to_string()));

    let (_, page) = app
        .get(&with_query(
            "/databases",
            &[("pageSize", "10"), ("includeDeleted", "true")],
        ))
        .await;
    assert_eq!(page["totalRecords"], 6);
    assert!(names(&page).contains(&"test1".to_string()));
}

#[tokio::test]
async fn test_collections_are_paged_per_database() {
    let app = seeded(2).await;
    for i in 0..7 {
        app.create("/collections/1", &format!("c{i}")).await;
    }
    app.create("/collections/2", "other").await;

    let (status, page) = app
        .get(&with_query("/collections/1", &[("pageSize", "5")]))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalRecords"], 7);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(names(&page), vec!["c6", "c5", "c4", "c3", "c2"]);

    let (status, _) = app
        .get(&with_query("/collections/99", &[("pageSize", "5")]))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
