//! PostgreSQL receipt store tests
//!
//! Need Docker: `cargo test -p infra_db -- --ignored`.

use core_kernel::ClaimId;
use domain_travel::{ClaimRepository, ReceiptStore, ReceiptUpload};
use infra_db::{PostgresClaimRepository, PostgresReceiptStore};
use test_utils::{db_test, ClaimFactory};

fn upload(claim_id: ClaimId, file_name: &str, bytes: &[u8]) -> ReceiptUpload {
    ReceiptUpload {
        claim_id,
        file_name: file_name.to_string(),
        content_type: "application/pdf".to_string(),
        bytes: bytes.to_vec(),
    }
}

db_test!(test_store_and_read_back, |pool| {
    let claims = PostgresClaimRepository::new(pool.clone());
    let store = PostgresReceiptStore::new(pool);
    let claim = ClaimFactory::default().draft();
    claims.insert(&claim, None).await.unwrap();

    let receipt = store
        .store(upload(claim.id, "ticket.pdf", b"%PDF-1.7 ticket"))
        .await
        .unwrap();

    assert_eq!(receipt.file_name, "ticket.pdf");
    assert!(receipt.uri.starts_with("pg://receipts/"));
    assert!(receipt.uri.ends_with(&receipt.id.as_uuid().to_string()));
    assert_eq!(store.content(receipt.id).await.unwrap(), b"%PDF-1.7 ticket".to_vec());
    assert_eq!(store.receipts_for(claim.id).await.unwrap(), vec![receipt]);
});

db_test!(test_documents_survive_a_new_store_instance, |pool| {
    let claims = PostgresClaimRepository::new(pool.clone());
    let claim = ClaimFactory::default().draft();
    claims.insert(&claim, None).await.unwrap();

    let receipt = PostgresReceiptStore::new(pool.clone())
        .store(upload(claim.id, "hotel.pdf", b"invoice"))
        .await
        .unwrap();

    let other_instance = PostgresReceiptStore::new(pool);
    assert_eq!(other_instance.content(receipt.id).await.unwrap(), b"invoice".to_vec());
});

db_test!(test_remove_is_idempotent, |pool| {
    let claims = PostgresClaimRepository::new(pool.clone());
    let store = PostgresReceiptStore::new(pool);
    let claim = ClaimFactory::default().draft();
    claims.insert(&claim, None).await.unwrap();

    let receipt = store.store(upload(claim.id, "cab.pdf", b"fare")).await.unwrap();
    store.remove(&receipt).await.unwrap();
    store.remove(&receipt).await.unwrap();

    assert!(store.content(receipt.id).await.unwrap_err().is_not_found());
});

db_test!(test_deleting_claim_removes_its_documents, |pool| {
    let claims = PostgresClaimRepository::new(pool.clone());
    let store = PostgresReceiptStore::new(pool);
    let claim = ClaimFactory::default().draft();
    claims.insert(&claim, None).await.unwrap();
    let receipt = store.store(upload(claim.id, "bus.pdf", b"stub")).await.unwrap();

    claims.delete(claim.id, 1, None).await.unwrap();

    assert!(store.receipts_for(claim.id).await.unwrap().is_empty());
    assert!(store.content(receipt.id).await.unwrap_err().is_not_found());
});

db_test!(test_blank_file_name_is_rejected, |pool| {
    let claims = PostgresClaimRepository::new(pool.clone());
    let store = PostgresReceiptStore::new(pool);
    let claim = ClaimFactory::default().draft();
    claims.insert(&claim, None).await.unwrap();

    assert!(store.store(upload(claim.id, "  ", b"x")).await.is_err());
    assert!(store.receipts_for(claim.id).await.unwrap().is_empty());
});
