//! Route tests for the docstamp API
//!
//! Each test runs the full router against its own in-memory SQLite database.

#[cfg(test)]
mod http_endpoint_tests {
    //! HTTP endpoint integration tests using axum-test

    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use lopdf::{dictionary, Dictionary, Document, Object, Stream};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use sqlx::sqlite::SqlitePoolOptions;

    use crate::app;
    use crate::state::AppState;

    const BODY_LIMIT: usize = 50 * 1024 * 1024;

    async fn create_test_server() -> TestServer {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let state = AppState::from_pool(pool).await.unwrap();

        TestServer::new(app(Arc::new(state), BODY_LIMIT)).unwrap()
    }

    /// Single US Letter page
    fn letter_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            b"BT /F1 12 Tf 72 720 Td (Lease) Tj ET".to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    async fn upload(server: &TestServer, bytes: Vec<u8>) -> String {
        let response = server.post("/upload-pdf").bytes(bytes.into()).await;
        response.assert_status_ok();
        let json = response.json::<Value>();
        json["pdfId"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_returns_200() {
        let server = create_test_server().await;
        let response = server.get("/health").await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "docstamp-api");
    }

    #[tokio::test]
    async fn test_upload_then_fetch() {
        let server = create_test_server().await;
        let pdf = letter_pdf();

        let response = server.post("/upload-pdf").bytes(pdf.clone().into()).await;
        response.assert_status_ok();
        let json = response.json::<Value>();
        let id = json["pdfId"].as_str().unwrap();
        let filename = json["filename"].as_str().unwrap();
        assert!(filename.starts_with("pdf_") && filename.ends_with(".pdf"));

        let response = server.get(&format!("/pdf/{}", id)).await;
        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "application/pdf");
        assert_eq!(response.as_bytes().to_vec(), pdf);
    }

    #[tokio::test]
    async fn test_empty_upload_is_bad_request() {
        let server = create_test_server().await;
        let response = server.post("/upload-pdf").bytes(Vec::new().into()).await;

        response.assert_status_bad_request();
        let json = response.json::<Value>();
        assert_eq!(json["code"], "InvalidJobInput");
        assert_eq!(json["status"], 400);
    }

    #[tokio::test]
    async fn test_unknown_document_is_404() {
        let server = create_test_server().await;

        server.get("/pdf/does-not-exist").await.assert_status_not_found();
        server.get("/file/does-not-exist").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_sign_pdf_end_to_end() {
        let server = create_test_server().await;
        let source_id = upload(&server, letter_pdf()).await;

        let response = server
            .post("/sign-pdf")
            .json(&json!({
                "sourceDocumentId": source_id,
                "fields": [
                    {
                        "id": "name",
                        "type": "text",
                        "pageIndex": 0,
                        "leftPct": 0.1,
                        "topPct": 0.1,
                        "widthPct": 0.3,
                        "heightPct": 0.05,
                        "value": "Jane Doe"
                    },
                    {
                        "id": "agree",
                        "type": "radio",
                        "pageIndex": 0,
                        "leftPct": 0.1,
                        "topPct": 0.2,
                        "widthPct": 0.2,
                        "heightPct": 0.04,
                        "label": "I agree",
                        "selected": true
                    },
                    {
                        "id": "ghost",
                        "type": "text",
                        "pageIndex": 7,
                        "leftPct": 0.1,
                        "topPct": 0.1,
                        "widthPct": 0.3,
                        "heightPct": 0.05,
                        "value": "nowhere"
                    }
                ]
            }))
            .await;

        response.assert_status_ok();
        let json = response.json::<Value>();
        assert_eq!(json["renderedFields"], 2);
        assert_eq!(json["skippedFields"][0]["id"], "ghost");
        assert_eq!(json["signedPdfId"], json["resultDocumentId"]);
        assert_eq!(json["sourceDigestHex"].as_str().unwrap().len(), 64);
        assert_ne!(json["sourceDigestHex"], json["resultDigestHex"]);
        assert!(!json["resultBytesBase64"].as_str().unwrap().is_empty());
        assert_eq!(json["pdf"], json["resultBytesBase64"]);

        // Result is stored and downloadable
        let result_id = json["resultDocumentId"].as_str().unwrap();
        let response = server.get(&format!("/file/{}", result_id)).await;
        response.assert_status_ok();
        assert_eq!(
            response.header("content-disposition"),
            "attachment; filename=signed.pdf"
        );
        assert!(Document::load_mem(response.as_bytes()).is_ok());

        // Both ids resolve to the same audit record
        let by_source = server.get(&format!("/api/audit/{}", source_id)).await;
        by_source.assert_status_ok();
        let by_source = by_source.json::<Value>();
        assert_eq!(by_source["records"].as_array().unwrap().len(), 1);
        assert_eq!(by_source["records"][0]["resultDocumentId"], result_id);
        assert_eq!(
            by_source["records"][0]["resultDigest"],
            json["resultDigestHex"]
        );

        let by_result = server
            .get(&format!("/api/audit/{}", result_id))
            .await
            .json::<Value>();
        assert_eq!(by_result["records"], by_source["records"]);
    }

    #[tokio::test]
    async fn test_legacy_signature_shape_is_accepted() {
        let server = create_test_server().await;
        let source_id = upload(&server, letter_pdf()).await;

        let response = server
            .post("/sign-pdf")
            .json(&json!({
                "pdfId": source_id,
                "signatureBase64": "data:image/png;base64,@@not-base64@@",
                "coords": {
                    "pageIndex": 0,
                    "leftPct": 0.5,
                    "topPct": 0.8,
                    "widthPct": 0.3,
                    "heightPct": 0.1
                }
            }))
            .await;

        // The undecodable signature is skipped, the document still produced
        response.assert_status_ok();
        let json = response.json::<Value>();
        assert_eq!(json["renderedFields"], 0);
        assert_eq!(json["skippedFields"][0]["id"], "signature");
        // The editor downloads `data.pdf`
        assert!(!json["pdf"].as_str().unwrap().is_empty());
        assert_eq!(json["pdf"], json["resultBytesBase64"]);
        assert_eq!(json["signedPdfId"], json["resultDocumentId"]);
    }

    #[tokio::test]
    async fn test_sign_accepts_both_id_keys() {
        let server = create_test_server().await;
        let source_id = upload(&server, letter_pdf()).await;

        let response = server
            .post("/sign-pdf")
            .json(&json!({
                "sourceDocumentId": source_id,
                "pdfId": "ignored-when-source-id-is-present",
                "fields": []
            }))
            .await;

        response.assert_status_ok();
        let audit = server
            .get(&format!("/api/audit/{}", source_id))
            .await
            .json::<Value>();
        assert_eq!(audit["records"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sign_rejects_bad_requests() {
        let server = create_test_server().await;

        let missing_id = server
            .post("/sign-pdf")
            .json(&json!({ "fields": [] }))
            .await;
        missing_id.assert_status_bad_request();
        assert_eq!(missing_id.json::<Value>()["code"], "InvalidJobInput");

        server
            .post("/sign-pdf")
            .json(&json!({ "sourceDocumentId": "abc", "fields": "nope" }))
            .await
            .assert_status_bad_request();

        server
            .post("/sign-pdf")
            .text("{ not json")
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_sign_unknown_source_is_404() {
        let server = create_test_server().await;

        let response = server
            .post("/sign-pdf")
            .json(&json!({ "sourceDocumentId": "missing", "fields": [] }))
            .await;

        response.assert_status_not_found();
        assert_eq!(response.json::<Value>()["code"], "SourceNotFound");
    }

    #[tokio::test]
    async fn test_sign_unparseable_source_is_500_without_details() {
        let server = create_test_server().await;
        let source_id = upload(&server, b"<html>not a pdf</html>".to_vec()).await;

        let response = server
            .post("/sign-pdf")
            .json(&json!({ "sourceDocumentId": source_id, "fields": [] }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let json = response.json::<Value>();
        assert_eq!(json["code"], "DocumentParseError");
        assert_eq!(json["error"], "Error signing PDF");

        // Nothing was audited
        let audit = server
            .get(&format!("/api/audit/{}", source_id))
            .await
            .json::<Value>();
        assert!(audit["records"].as_array().unwrap().is_empty());
    }
}

#[cfg(test)]
mod proptests {
    //! Property tests for request normalization

    use proptest::prelude::*;
    use shared_types::FieldKind;

    use crate::models::SignRequest;

    fn request(id: Option<String>, signature: Option<String>) -> SignRequest {
        SignRequest {
            source_document_id: id,
            pdf_id: None,
            fields: None,
            signature_base64: signature,
            coords: Some(shared_types::NormalizedRect::new(0, 0.1, 0.1, 0.2, 0.2)),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: a non-blank id is carried into the job unchanged
        #[test]
        fn non_blank_id_is_kept(id in "[a-zA-Z0-9]{1,24}") {
            let job = request(Some(id.clone()), None).into_job().unwrap();
            prop_assert_eq!(job.source_document_id, id);
            prop_assert!(job.fields.is_empty());
        }

        /// Property: `pdfId` is used when `sourceDocumentId` is absent or blank
        #[test]
        fn pdf_id_is_the_fallback(id in "[a-zA-Z0-9]{1,24}", blank in "[ \t]{0,8}") {
            let mut req = request(Some(blank), None);
            req.pdf_id = Some(id.clone());
            prop_assert_eq!(req.into_job().unwrap().source_document_id, id);
        }

        /// Property: whitespace-only ids are rejected
        #[test]
        fn blank_id_is_rejected(id in "[ \t]{0,8}") {
            prop_assert!(request(Some(id), None).into_job().is_err());
        }

        /// Property: a legacy signature becomes exactly one signature field
        #[test]
        fn legacy_signature_becomes_field(data in "[A-Za-z0-9+/]{4,64}") {
            let job = request(Some("doc".into()), Some(data.clone())).into_job().unwrap();
            prop_assert_eq!(job.fields.len(), 1);
            prop_assert_eq!(
                &job.fields[0].kind,
                &FieldKind::Signature { data }
            );
        }
    }
}
