//! Integration tests over the HTTP router
//!
//! Tests the full end-to-end flow: catalogue dump → HTTP request → OAI-PMH XML

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use oai_pmh_server::cli::router;
use oai_pmh_server::config::{ServerConfig, UnknownSetPolicy};
use oai_pmh_server::repository::{DateRange, Dataset, Group, InMemoryRepository, Repository};
use oai_pmh_server::token::{ListCriteria, ResumptionToken, TokenCodec};
use oai_pmh_server::{now_seconds, Error, OaiService, Result, Timestamp};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

fn demo(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(file)
}

fn demo_app() -> Router {
    let config = ServerConfig::from_file(demo("config.yaml")).unwrap();
    config.validate().unwrap();
    let repository = InMemoryRepository::from_file(demo("catalogue.json")).unwrap();
    router(Arc::new(OaiService::new(config, Arc::new(repository))))
}

async fn get(app: &Router, query: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .uri(format!("/oai?{query}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Text of the `resumptionToken` element, unescaped
fn resumption_token(xml: &str) -> Option<String> {
    let start = xml.find("<resumptionToken")?;
    let open_end = start + xml[start..].find('>')? + 1;
    let close = xml.find("</resumptionToken>")?;
    Some(xml[open_end..close].replace("&amp;", "&"))
}

fn attribute(xml: &str, element: &str, name: &str) -> Option<String> {
    let start = xml.find(&format!("<{element} "))?;
    let tag = &xml[start..start + xml[start..].find('>')?];
    let key = format!("{name}=\"");
    let value_start = tag.find(&key)? + key.len();
    let value_len = tag[value_start..].find('"')?;
    Some(tag[value_start..value_start + value_len].to_string())
}

fn identifiers(xml: &str) -> Vec<String> {
    xml.split("<identifier>")
        .skip(1)
        .filter_map(|s| s.split("</identifier>").next())
        .map(str::to_string)
        .collect()
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

// ============================================================================
// Health / Transport Tests
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = demo_app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"status\":\"ok\""));
}

#[tokio::test]
async fn test_landing_page_without_verb() {
    let app = demo_app();
    let request = Request::builder().uri("/oai").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/html; charset=utf-8"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("<h1>City Open Data</h1>"));
    assert!(body.contains("href=\"https://data.example.org/oai?verb=Identify\""));
}

#[tokio::test]
async fn test_post_without_verb_is_bad_verb() {
    let app = demo_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/oai")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("metadataPrefix=oai_dc"))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<error code=\"badVerb\">Missing verb</error>"));
}

#[tokio::test]
async fn test_content_type_is_xml() {
    let app = demo_app();
    let request = Request::builder()
        .uri("/oai?verb=Identify")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/xml; charset=utf-8"
    );
}

#[tokio::test]
async fn test_post_form_request() {
    let app = demo_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/oai")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("verb=GetRecord&identifier=ds-002&metadataPrefix=oai_dc"))
        .unwrap();
    let (status, xml) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(xml.contains("<dc:title>Solar radiation</dc:title>"));
    assert!(xml.contains("<dc:identifier>doi:10.5555/solar</dc:identifier>"));
    assert!(xml.contains("<dc:coverage>2020-01-01/2023-12-31</dc:coverage>"));
}

// ============================================================================
// Identify / Formats / Sets
// ============================================================================

#[tokio::test]
async fn test_identify() {
    let (_, xml) = get(&demo_app(), "verb=Identify").await;

    assert!(xml.contains("<repositoryName>City Open Data</repositoryName>"));
    assert!(xml.contains("<baseURL>https://data.example.org/oai</baseURL>"));
    assert!(xml.contains("<adminEmail>opendata@example.org</adminEmail>"));
    assert!(xml.contains("<earliestDatestamp>2023-01-10T08:00:00Z</earliestDatestamp>"));
}

#[tokio::test]
async fn test_list_metadata_formats() {
    let app = demo_app();
    let (_, xml) = get(&app, "verb=ListMetadataFormats").await;

    let oai_dc = xml.find("<metadataPrefix>oai_dc</metadataPrefix>").unwrap();
    let dcat = xml.find("<metadataPrefix>dcat</metadataPrefix>").unwrap();
    assert!(oai_dc < dcat);
    assert!(!xml.contains("<metadataPrefix>dcat_2.1.0</metadataPrefix>"));

    let (_, xml) = get(&app, "verb=ListMetadataFormats&identifier=ds-900").await;
    assert!(xml.contains("<error code=\"idDoesNotExist\">"));
}

#[tokio::test]
async fn test_list_sets_skips_inactive_groups() {
    let (_, xml) = get(&demo_app(), "verb=ListSets").await;

    assert!(xml.contains("<setSpec>environment</setSpec>"));
    assert!(xml.contains("<setSpec>mobility</setSpec>"));
    assert!(!xml.contains("<setSpec>archive</setSpec>"));
    assert!(resumption_token(&xml).is_none());
}

// ============================================================================
// Pagination Tests
// ============================================================================

#[tokio::test]
async fn test_first_page_of_ten_records() {
    let (status, xml) = get(&demo_app(), "verb=ListIdentifiers&metadataPrefix=oai_dc").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(identifiers(&xml), vec!["ds-000", "ds-001", "ds-002"]);
    assert_eq!(attribute(&xml, "resumptionToken", "cursor").as_deref(), Some("3"));
    assert_eq!(
        attribute(&xml, "resumptionToken", "completeListSize").as_deref(),
        Some("10")
    );

    let token = resumption_token(&xml).unwrap();
    assert!(token.starts_with("metadataPrefix=oai_dc&cursor=3&completeListSize=10&expirationDate="));
}

#[tokio::test]
async fn test_harvest_walks_all_records_once() {
    let app = demo_app();
    let (_, mut xml) = get(&app, "verb=ListRecords&metadataPrefix=oai_dc").await;
    let mut harvested = Vec::new();
    let mut pages = 0;

    loop {
        pages += 1;
        let page = identifiers(&xml);
        assert!(page.len() <= 3, "page {pages} has {} records", page.len());
        assert_eq!(xml.matches("<record>").count(), page.len());
        harvested.extend(page);

        let Some(token) = resumption_token(&xml) else { break };
        assert_eq!(
            attribute(&xml, "resumptionToken", "completeListSize").as_deref(),
            Some("10")
        );
        let after_token = xml.split("</resumptionToken>").nth(1).unwrap();
        assert!(after_token.trim_start().starts_with("</ListRecords>"));

        xml = get(&app, &format!("verb=ListRecords&resumptionToken={}", encode(&token)))
            .await
            .1;
    }

    let expected: Vec<String> = (0..10).map(|i| format!("ds-{i:03}")).collect();
    assert_eq!(harvested, expected);
    assert_eq!(pages, 4);
}

#[tokio::test]
async fn test_set_argument_is_ignored_with_token() {
    let app = demo_app();
    let (_, first) = get(&app, "verb=ListIdentifiers&metadataPrefix=oai_dc&set=environment").await;
    assert_eq!(identifiers(&first), vec!["ds-000", "ds-002", "ds-004"]);
    let token = resumption_token(&first).unwrap();
    assert!(token.contains("set=environment"));

    let (_, second) = get(
        &app,
        &format!(
            "verb=ListIdentifiers&set=mobility&resumptionToken={}",
            encode(&token)
        ),
    )
    .await;
    assert_eq!(identifiers(&second), vec!["ds-006", "ds-008"]);
    assert!(second.matches("<setSpec>environment</setSpec>").count() == 2);
    assert!(resumption_token(&second).is_none());
}

#[tokio::test]
async fn test_unknown_set_is_empty_by_default() {
    let (_, xml) = get(&demo_app(), "verb=ListIdentifiers&metadataPrefix=oai_dc&set=nope").await;

    assert!(xml.contains("<ListIdentifiers"));
    assert!(identifiers(&xml).is_empty());
    assert!(!xml.contains("<error"));
}

#[tokio::test]
async fn test_unknown_set_can_report_no_set_hierarchy() {
    let config = ServerConfig {
        unknown_set: UnknownSetPolicy::NoSetHierarchy,
        ..Default::default()
    };
    let repository = InMemoryRepository::from_file(demo("catalogue.json")).unwrap();
    let app = router(Arc::new(OaiService::new(config, Arc::new(repository))));

    let (status, xml) = get(&app, "verb=ListRecords&metadataPrefix=oai_dc&set=nope").await;
    assert_eq!(status, StatusCode::OK);
    assert!(xml.contains("<error code=\"noSetHierarchy\">"));
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let token = ResumptionToken::new(ListCriteria::with_prefix("oai_dc"), 3)
        .with_complete_list_size(10)
        .with_expiration(now_seconds() - chrono::Duration::seconds(5));
    let raw = TokenCodec::default().encode(&token);

    let (status, xml) = get(
        &demo_app(),
        &format!("verb=ListIdentifiers&resumptionToken={}", encode(&raw)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(xml.contains("<error code=\"badResumptionToken\">expirationDate is in the past</error>"));
}

#[tokio::test]
async fn test_double_encoded_token_is_accepted() {
    let app = demo_app();
    let (_, first) = get(&app, "verb=ListIdentifiers&metadataPrefix=oai_dc").await;
    let token = resumption_token(&first).unwrap();

    let (_, second) = get(
        &app,
        &format!(
            "verb=ListIdentifiers&resumptionToken={}",
            encode(&encode(&token))
        ),
    )
    .await;
    assert_eq!(identifiers(&second), vec!["ds-003", "ds-004", "ds-005"]);
}

// ============================================================================
// Record / Error Tests
// ============================================================================

#[tokio::test]
async fn test_get_record_on_deleted_and_private_records() {
    let app = demo_app();
    for id in ["ds-900", "ds-901"] {
        let (status, xml) = get(
            &app,
            &format!("verb=GetRecord&identifier={id}&metadataPrefix=oai_dc"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(xml.contains("<error code=\"idDoesNotExist\">"), "{id}");
        assert!(!xml.contains("<metadata>"));
    }
}

#[tokio::test]
async fn test_get_record_as_dcat() {
    let (_, xml) = get(
        &demo_app(),
        "verb=GetRecord&identifier=ds-004&metadataPrefix=dcat",
    )
    .await;

    assert!(xml.contains("<metadata>"));
    assert!(xml.contains("<dcat:Dataset rdf:about=\"https://data.example.org/dataset/ds-004\">"));
    assert!(!xml.contains("<oai_dc:dc"));
    assert_eq!(xml.matches("<?xml").count(), 1);
}

#[tokio::test]
async fn test_protocol_errors() {
    let app = demo_app();

    let cases = [
        ("verb=Explode", "badVerb"),
        ("verb=ListRecords", "badArgument"),
        ("verb=ListRecords&metadataPrefix=marc21", "cannotDisseminateFormat"),
        ("verb=Identify&resumptionToken=cursor%3D3", "badArgument"),
        ("verb=ListSets&resumptionToken=garbage", "badResumptionToken"),
    ];
    for (query, code) in cases {
        let (status, xml) = get(&app, query).await;
        assert_eq!(status, StatusCode::OK, "{query}");
        assert!(xml.contains(&format!("<error code=\"{code}\">")), "{query}: {xml}");
    }
}

struct BrokenRepository;

#[async_trait]
impl Repository for BrokenRepository {
    async fn query_active_records(&self, _: Option<&Group>, _: &DateRange) -> Result<Vec<Dataset>> {
        Err(Error::repository("database is down"))
    }

    async fn resolve_group(&self, _: &str) -> Result<Option<Group>> {
        Err(Error::repository("database is down"))
    }

    async fn get_record(&self, _: &str) -> Result<Option<Dataset>> {
        Err(Error::repository("database is down"))
    }

    async fn earliest_timestamp(&self) -> Result<Option<Timestamp>> {
        Err(Error::repository("database is down"))
    }

    async fn active_groups(&self) -> Result<Vec<Group>> {
        Err(Error::repository("database is down"))
    }
}

#[tokio::test]
async fn test_fatal_errors_return_500() {
    let service = OaiService::new(ServerConfig::default(), Arc::new(BrokenRepository));
    let app = router(Arc::new(service));

    let (status, body) = get(&app, "verb=ListRecords&metadataPrefix=oai_dc").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("database is down"));
    assert!(!body.contains("<OAI-PMH"));
}
