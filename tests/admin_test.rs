mod common;

use common::*;
use sea_orm::EntityTrait;
use streetvoice::models::Report;

async fn stored_status(app: &TestApp, id: i64) -> String {
    Report::find_by_id(id as i32)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap()
        .status
}

async fn list(app: &TestApp, token: &str, query: &str) -> serde_json::Value {
    let resp = app
        .client
        .get(app.url(&format!("/admin/reports{query}")))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200, "listing {query}");
    let body: serde_json::Value = resp.json().await.unwrap();
    body["data"].clone()
}

fn ids(page: &serde_json::Value) -> Vec<i64> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_department_admin_updates_status() {
    let app = spawn_app().await;
    let (_, citizen) = create_citizen(&app).await;
    let (_, admin) = create_admin(&app, PUBLIC_WORKS).await;
    let id = create_report(&app, &citizen, POTHOLES).await;

    let resp = set_status(&app, &admin, id, "In Progress").await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["changed"], true);
    assert_eq!(body["data"]["report"]["status"], "In Progress");

    assert_eq!(stored_status(&app, id).await, "In Progress");
}

#[tokio::test]
async fn test_department_mismatch_is_forbidden() {
    let app = spawn_app().await;
    let (_, citizen) = create_citizen(&app).await;
    let (_, admin) = create_admin(&app, SANITATION).await;
    let id = create_report(&app, &citizen, POTHOLES).await;

    let resp = set_status(&app, &admin, id, "Resolved").await;
    assert_eq!(resp.status(), 403);
    assert_eq!(error_code(resp).await, "department_mismatch");
    assert_eq!(stored_status(&app, id).await, "submitted");
}

#[tokio::test]
async fn test_citizen_cannot_update_status() {
    let app = spawn_app().await;
    let (_, citizen) = create_citizen(&app).await;
    let id = create_report(&app, &citizen, POTHOLES).await;

    let resp = set_status(&app, &citizen, id, "Resolved").await;
    assert_eq!(resp.status(), 403);
    assert_eq!(error_code(resp).await, "forbidden");
    assert_eq!(stored_status(&app, id).await, "submitted");
}

#[tokio::test]
async fn test_incomplete_profile_cannot_update_status() {
    let app = spawn_app().await;
    let (_, citizen) = create_citizen(&app).await;
    let (_, fresh) = create_user(&app, "fresh").await;
    let id = create_report(&app, &citizen, POTHOLES).await;

    let resp = set_status(&app, &fresh, id, "Resolved").await;
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn test_unmapped_category_cannot_be_actioned() {
    let app = spawn_app().await;
    let (_, citizen) = create_citizen(&app).await;
    let (_, admin) = create_admin(&app, PUBLIC_WORKS).await;
    let id = create_report(&app, &citizen, "Other").await;

    let resp = set_status(&app, &admin, id, "Resolved").await;
    assert_eq!(resp.status(), 422);
    assert_eq!(error_code(resp).await, "category_unmapped");
    assert_eq!(stored_status(&app, id).await, "submitted");
}

#[tokio::test]
async fn test_status_update_on_missing_report() {
    let app = spawn_app().await;
    let (_, admin) = create_admin(&app, PUBLIC_WORKS).await;

    let resp = set_status(&app, &admin, 4242, "Resolved").await;
    assert_eq!(resp.status(), 404);
    assert_eq!(error_code(resp).await, "not_found");
}

#[tokio::test]
async fn test_status_must_be_short_and_present() {
    let app = spawn_app().await;
    let (_, citizen) = create_citizen(&app).await;
    let (_, admin) = create_admin(&app, PUBLIC_WORKS).await;
    let id = create_report(&app, &citizen, POTHOLES).await;

    let resp = set_status(&app, &admin, id, "").await;
    assert_eq!(resp.status(), 400);
    assert_eq!(error_code(resp).await, "validation_error");

    let resp = set_status(&app, &admin, id, &"x".repeat(51)).await;
    assert_eq!(resp.status(), 400);

    assert_eq!(stored_status(&app, id).await, "submitted");
}

#[tokio::test]
async fn test_same_status_is_a_no_op() {
    let app = spawn_app().await;
    let (_, citizen) = create_citizen(&app).await;
    let (_, admin) = create_admin(&app, PUBLIC_WORKS).await;
    let id = create_report(&app, &citizen, POTHOLES).await;

    let before = Report::find_by_id(id as i32)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();

    let resp = set_status(&app, &admin, id, "submitted").await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["changed"], false);

    let after = Report::find_by_id(id as i32)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(before, after);

    // And again after a real change.
    assert_eq!(set_status(&app, &admin, id, "Resolved").await.status(), 200);
    let resp = set_status(&app, &admin, id, "Resolved").await;
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["changed"], false);
}

#[tokio::test]
async fn test_listing_requires_admin() {
    let app = spawn_app().await;
    let (_, citizen) = create_citizen(&app).await;

    let resp = app
        .client
        .get(app.url("/admin/reports"))
        .bearer_auth(&citizen)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app
        .client
        .get(app.url("/admin/reports"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_listing_is_not_department_restricted() {
    let app = spawn_app().await;
    let (_, admin) = create_admin(&app, SANITATION).await;
    insert_report(&app, "a@x.com", POTHOLES, "MG Road", "submitted", "2024-03-01 09:00:00").await;
    insert_report(&app, "a@x.com", "Illegal Dumping", "Ring Road", "submitted", "2024-03-02 09:00:00").await;

    let page = list(&app, &admin, "").await;
    assert_eq!(page["total"], 2);
}

#[tokio::test]
async fn test_pagination_defaults_and_total() {
    let app = spawn_app().await;
    let (_, admin) = create_admin(&app, PUBLIC_WORKS).await;
    for day in 1..=25 {
        insert_report(
            &app,
            "a@x.com",
            POTHOLES,
            "MG Road",
            "submitted",
            &format!("2024-01-{day:02} 08:00:00"),
        )
        .await;
    }

    let first = list(&app, &admin, "?limit=20").await;
    assert_eq!(first["total"], 25);
    assert_eq!(first["items"].as_array().unwrap().len(), 20);
    assert_eq!(first["page"], 1);
    assert_eq!(first["per_page"], 20);
    assert_eq!(first["total_pages"], 2);
    assert_eq!(first["items"][0]["reported_at"], "2024-01-25 08:00:00");

    let second = list(&app, &admin, "?page=2&limit=20").await;
    assert_eq!(second["items"].as_array().unwrap().len(), 5);
    assert_eq!(second["items"][4]["reported_at"], "2024-01-01 08:00:00");

    let defaults = list(&app, &admin, "").await;
    assert_eq!(defaults["per_page"], 20);
    assert_eq!(defaults["items"].as_array().unwrap().len(), 20);

    let clamped = list(&app, &admin, "?page=0&limit=1000").await;
    assert_eq!(clamped["page"], 1);
    assert_eq!(clamped["per_page"], 100);
    assert_eq!(clamped["items"].as_array().unwrap().len(), 25);
}

#[tokio::test]
async fn test_ties_are_ordered_by_id() {
    let app = spawn_app().await;
    let (_, admin) = create_admin(&app, PUBLIC_WORKS).await;
    let first = insert_report(&app, "a@x.com", POTHOLES, "A", "submitted", "2024-05-05 10:00:00").await;
    let second = insert_report(&app, "a@x.com", POTHOLES, "B", "submitted", "2024-05-05 10:00:00").await;

    let page = list(&app, &admin, "").await;
    assert_eq!(ids(&page), vec![second as i64, first as i64]);
}

#[tokio::test]
async fn test_filters() {
    let app = spawn_app().await;
    let (_, admin) = create_admin(&app, PUBLIC_WORKS).await;

    let pothole = insert_report(&app, "a@x.com", POTHOLES, "MG Road", "submitted", "2024-03-14 23:59:59").await;
    let light = insert_report(&app, "a@x.com", "Street Light Not Working", "Park Street", "Resolved", "2024-03-15 00:00:00").await;
    let dumping = insert_report(&app, "b@x.com", "Illegal Dumping", "Potter Lane", "Resolved", "2024-03-15 23:59:59").await;
    let outage = insert_report(&app, "b@x.com", "Power Outage", "100% Colony", "submitted", "2024-03-16 00:00:00").await;

    // search: tags OR location, case-insensitive
    let page = list(&app, &admin, "?search=POT").await;
    assert_eq!(ids(&page), vec![dumping as i64, pothole as i64]);

    let page = list(&app, &admin, "?search=mg%20road").await;
    assert_eq!(ids(&page), vec![pothole as i64]);

    // status: exact, `all` disables
    let page = list(&app, &admin, "?status=Resolved").await;
    assert_eq!(ids(&page), vec![dumping as i64, light as i64]);
    let page = list(&app, &admin, "?status=resolved").await;
    assert_eq!(page["total"], 0);
    let page = list(&app, &admin, "?status=all").await;
    assert_eq!(page["total"], 4);

    // tag: substring of category only
    let page = list(&app, &admin, "?tag=light").await;
    assert_eq!(ids(&page), vec![light as i64]);
    let page = list(&app, &admin, "?tag=street").await;
    assert_eq!(ids(&page), vec![light as i64]);

    // date: whole calendar day
    let page = list(&app, &admin, "?date=2024-03-15").await;
    assert_eq!(ids(&page), vec![dumping as i64, light as i64]);

    // combined
    let page = list(&app, &admin, "?date=2024-03-15&status=Resolved&search=lane").await;
    assert_eq!(ids(&page), vec![dumping as i64]);

    // wildcards are literal
    let page = list(&app, &admin, "?search=%25").await;
    assert_eq!(ids(&page), vec![outage as i64]);
    let page = list(&app, &admin, "?search=_").await;
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn test_malformed_date_filter() {
    let app = spawn_app().await;
    let (_, admin) = create_admin(&app, PUBLIC_WORKS).await;

    let resp = app
        .client
        .get(app.url("/admin/reports?date=15-03-2024"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(error_code(resp).await, "validation_error");
}

#[tokio::test]
async fn test_list_users_for_admin() {
    let app = spawn_app().await;
    let (citizen_email, citizen) = create_citizen(&app).await;
    let (_, admin) = create_admin(&app, PUBLIC_WORKS).await;

    let resp = app
        .client
        .get(app.url("/admin/users"))
        .bearer_auth(&citizen)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app
        .client
        .get(app.url("/admin/users"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 2);
    let users = body["data"]["items"].as_array().unwrap();
    assert!(users.iter().any(|u| u["email"] == citizen_email.as_str()));
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
}

#[tokio::test]
async fn test_search_and_tag_are_combined() {
    let app = spawn_app().await;
    let (_, admin) = create_admin(&app, PUBLIC_WORKS).await;

    let light_mg = insert_report(&app, "a@x.com", "Street Light Not Working", "MG Road", "submitted", "2024-04-01 09:00:00").await;
    let light_park = insert_report(&app, "a@x.com", "Street Light Not Working", "Park Street", "submitted", "2024-04-02 09:00:00").await;
    let pothole = insert_report(&app, "a@x.com", POTHOLES, "MG Road", "submitted", "2024-04-03 09:00:00").await;

    let page = list(&app, &admin, "?search=road&tag=light").await;
    assert_eq!(ids(&page), vec![light_mg as i64]);

    // Each matches on its own, but never together.
    let page = list(&app, &admin, "?search=park").await;
    assert_eq!(ids(&page), vec![light_park as i64]);
    let page = list(&app, &admin, "?tag=pothole").await;
    assert_eq!(ids(&page), vec![pothole as i64]);
    let page = list(&app, &admin, "?search=park&tag=pothole").await;
    assert_eq!(page["total"], 0);
    assert!(page["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_only_lowercase_all_disables_status_filter() {
    let app = spawn_app().await;
    let (_, admin) = create_admin(&app, PUBLIC_WORKS).await;

    let shouting = insert_report(&app, "a@x.com", POTHOLES, "MG Road", "ALL", "2024-04-01 09:00:00").await;
    insert_report(&app, "a@x.com", POTHOLES, "MG Road", "submitted", "2024-04-02 09:00:00").await;

    let page = list(&app, &admin, "?status=ALL").await;
    assert_eq!(ids(&page), vec![shouting as i64]);

    let page = list(&app, &admin, "?status=all").await;
    assert_eq!(page["total"], 2);
}

#[tokio::test]
async fn test_huge_page_number_is_an_empty_page() {
    let app = spawn_app().await;
    let (_, admin) = create_admin(&app, PUBLIC_WORKS).await;
    insert_report(&app, "a@x.com", POTHOLES, "MG Road", "submitted", "2024-04-01 09:00:00").await;

    let page = list(&app, &admin, "?page=18446744073709551615&limit=20").await;
    assert_eq!(page["total"], 1);
    assert!(page["items"].as_array().unwrap().is_empty());

    let page = list(&app, &admin, "?page=18446744073709551615&limit=100").await;
    assert!(page["items"].as_array().unwrap().is_empty());

    let resp = app
        .client
        .get(app.url("/admin/users?page=18446744073709551615&limit=100"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 1);
    assert!(body["data"]["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_legacy_short_tags_are_unmapped() {
    let app = spawn_app().await;
    let (_, admin) = create_admin(&app, PUBLIC_WORKS).await;

    for legacy in ["Garbage", "Road", "Electricity", "Water", "Sanitation"] {
        let id = insert_report(&app, "a@x.com", legacy, "MG Road", "submitted", "2024-04-01 09:00:00").await;
        let resp = set_status(&app, &admin, id as i64, "Resolved").await;
        assert_eq!(resp.status(), 422, "{legacy}");
        assert_eq!(error_code(resp).await, "category_unmapped");
    }
}
