//! Draft update tests.

use super::helpers::*;
use crate::*;
use idrepo_crypto::SecurityManager;
use serde_json::json;

#[tokio::test]
async fn test_update_missing_draft_not_found() {
    let ctx = TestContext::new();

    let err = ctx
        .service
        .update_draft("RID1", identity_request("RID1", json!({"identity": {}})))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_update_is_idempotent() {
    let ctx = TestContext::new();
    ctx.service.create_draft("RID1", None).await.unwrap();
    let update = json!({"identity": {"name": "Alice", "phone": "555-0100"}});

    ctx.service
        .update_draft("RID1", identity_request("RID1", update.clone()))
        .await
        .unwrap();
    let once = ctx.stored_draft("RID1").await;

    ctx.service
        .update_draft("RID1", identity_request("RID1", update))
        .await
        .unwrap();
    let twice = ctx.stored_draft("RID1").await;

    assert_eq!(once.document, twice.document);
    assert_eq!(once.document_hash, twice.document_hash);
}

#[tokio::test]
async fn test_update_cannot_change_identifier() {
    let ctx = TestContext::new();
    ctx.service.create_draft("RID1", None).await.unwrap();

    ctx.service
        .update_draft(
            "RID1",
            identity_request("RID1", json!({"identity": {"UIN": "999999", "name": "Mallory"}})),
        )
        .await
        .unwrap();

    let draft = ctx.stored_draft("RID1").await;
    assert_eq!(
        document_of(&draft),
        json!({"identity": {"UIN": "900001", "name": "Mallory"}})
    );
    assert_eq!(draft.identifier_hash, ctx.identifier_hash("900001"));
}

#[tokio::test]
async fn test_update_preserves_absent_fields() {
    let ctx = TestContext::new();
    ctx.service.create_draft("RID1", None).await.unwrap();

    ctx.service
        .update_draft(
            "RID1",
            identity_request("RID1", json!({"identity": {"name": "Alice", "dob": "1990/01/01"}})),
        )
        .await
        .unwrap();
    ctx.service
        .update_draft("RID1", identity_request("RID1", json!({"identity": {"name": "Alicia"}})))
        .await
        .unwrap();

    assert_eq!(
        document_of(&ctx.stored_draft("RID1").await),
        json!({"identity": {"UIN": "900001", "name": "Alicia", "dob": "1990/01/01"}})
    );
}

#[tokio::test]
async fn test_update_of_unset_document_stores_input() {
    let ctx = TestContext::new();
    ctx.service.create_draft("RID1", None).await.unwrap();

    let mut draft = ctx.stored_draft("RID1").await;
    draft.document = None;
    draft.document_hash = None;
    ctx.overwrite_draft(&draft).await;

    let input = json!({"identity": {"name": "Alice"}});
    ctx.service
        .update_draft("RID1", identity_request("RID1", input.clone()))
        .await
        .unwrap();

    let draft = ctx.stored_draft("RID1").await;
    assert_eq!(document_of(&draft), input);
    assert_eq!(
        draft.document_hash,
        Some(ctx.vault.hash(draft.document.as_ref().unwrap()))
    );
}

#[tokio::test]
async fn test_update_anonymous_profile_only() {
    let ctx = TestContext::new();
    ctx.service.create_draft("RID1", None).await.unwrap();
    let before = ctx.stored_draft("RID1").await;

    let request = IdentityRequest {
        registration_id: "RID1".to_string(),
        anonymous_profile: Some(json!({"channel": "kiosk"})),
        ..Default::default()
    };
    ctx.service.update_draft("RID1", request).await.unwrap();

    let after = ctx.stored_draft("RID1").await;
    assert_eq!(after.document, before.document);
    assert_eq!(after.document_hash, before.document_hash);
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(after.anonymous_profile.as_ref().unwrap())
            .unwrap(),
        json!({"channel": "kiosk"})
    );
}

#[tokio::test]
async fn test_update_stages_files() {
    let ctx = TestContext::new();
    create_draft_with_files(&ctx, "RID1").await;

    let draft = ctx.stored_draft("RID1").await;
    let bio_digest = ctx.vault.hash(b"bio-v1");
    let poa_digest = ctx.vault.hash(b"poa-v1");

    assert_eq!(draft.biometrics.len(), 1);
    let bio = &draft.biometrics[0];
    assert_eq!(bio.file_type, "individualBiometrics");
    assert_eq!(bio.file_ref, format!("{}.cbeff", bio_digest));
    assert_eq!(bio.file_name, "individualBiometrics_bio");
    assert_eq!(bio.file_hash, bio_digest);
    assert_eq!(bio.registration_id, "RID1");

    assert_eq!(draft.documents.len(), 1);
    let doc = &draft.documents[0];
    assert_eq!(doc.category_code, "proofOfAddress");
    assert_eq!(doc.doc_ref, poa_digest);
    assert_eq!(doc.type_code, "DOC001");
    assert_eq!(doc.format_code, "pdf");

    let raw = ctx
        .blobs
        .get(draft.object_hash(), BlobKind::Biometric, &bio.file_ref)
        .await
        .unwrap();
    assert_eq!(raw, b"bio-v1".to_vec());
}

#[tokio::test]
async fn test_replacing_file_refreshes_entry() {
    let ctx = TestContext::new();
    create_draft_with_files(&ctx, "RID1").await;
    let before = ctx.stored_draft("RID1").await;

    ctx.service
        .update_draft("RID1", file_request("RID1", b"bio-v2", b"poa-v1"))
        .await
        .unwrap();

    let after = ctx.stored_draft("RID1").await;
    assert_eq!(after.biometrics.len(), 1);
    assert_eq!(after.documents.len(), 1);

    let bio = &after.biometrics[0];
    assert_eq!(bio.file_ref, format!("{}.cbeff", ctx.vault.hash(b"bio-v2")));
    assert_eq!(bio.audit.created_at, before.biometrics[0].audit.created_at);
    assert!(bio.audit.updated_at.is_some());

    assert_eq!(after.documents[0], before.documents[0]);
}

#[tokio::test]
async fn test_files_without_identity_field_fail_together() {
    let ctx = TestContext::new();
    ctx.service.create_draft("RID1", None).await.unwrap();

    let request = IdentityRequest {
        registration_id: "RID1".to_string(),
        identity: None,
        documents: vec![
            DocumentPayload::new("proofOfIdentity", encode(b"a")),
            DocumentPayload::new("proofOfBirth", encode(b"b")),
        ],
        anonymous_profile: None,
    };
    let err = ctx.service.update_draft("RID1", request).await.unwrap_err();

    match err {
        DraftError::ValidationFailed(errors) => {
            let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
            assert_eq!(fields, vec!["proofOfIdentity", "proofOfBirth"]);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(ctx.blobs.calls().is_empty());
    assert!(ctx.stored_draft("RID1").await.documents.is_empty());
}

#[tokio::test]
async fn test_undecodable_file_is_serialization_error() {
    let ctx = TestContext::new();
    ctx.service.create_draft("RID1", None).await.unwrap();

    let mut request = file_request("RID1", b"bio", b"poa");
    request.documents[0].value = "***not base64***".to_string();

    let err = ctx.service.update_draft("RID1", request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownSerializationError);
    assert!(ctx.stored_draft("RID1").await.biometrics.is_empty());
}

#[tokio::test]
async fn test_non_object_identity_is_serialization_error() {
    let ctx = TestContext::new();
    ctx.service.create_draft("RID1", None).await.unwrap();

    let err = ctx
        .service
        .update_draft("RID1", identity_request("RID1", json!(["not", "an", "object"])))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnknownSerializationError);
    assert_eq!(
        document_of(&ctx.stored_draft("RID1").await),
        json!({"identity": {"UIN": "900001"}})
    );
}
