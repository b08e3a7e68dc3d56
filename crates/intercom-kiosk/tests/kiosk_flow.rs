//! Kiosk sessions backed by the SQLite validator
//!
//! Run with: cargo test --package intercom-kiosk --test kiosk_flow

use intercom_core::{DisplayMessages, VisitorStatus};
use intercom_kiosk::{DoorCommand, KioskSession, KioskStep, parse_keys};
use intercom_storage::models::{Resident, Visitor};
use intercom_storage::repositories::{
    ResidentRepository, SqliteResidentRepository, SqliteVisitorRepository, VisitorRepository,
};
use intercom_storage::{Database, StoredValidator};
use tokio::sync::mpsc;

async fn type_line(session: &mut KioskSession<StoredValidator>, line: &str) {
    for key in parse_keys(line).unwrap() {
        session.press(key).await.unwrap();
    }
}

#[tokio::test]
async fn test_resident_opens_door() {
    let db = Database::in_memory().await.unwrap();
    SqliteResidentRepository::new(db.pool().clone())
        .create(&Resident::new("Ana Souza", "204", "1234"))
        .await
        .unwrap();

    let (door_tx, mut door_rx) = mpsc::channel(4);
    let mut session = KioskSession::new(StoredValidator::new(db.pool().clone()), door_tx);

    type_line(&mut session, "204 # 1234 #").await;

    assert_eq!(session.message(), DisplayMessages::ACCESS_GRANTED);
    assert_eq!(
        door_rx.recv().await,
        Some(DoorCommand::Open {
            unit_number: "204".to_string()
        })
    );
}

#[tokio::test]
async fn test_single_visit_flow() {
    let db = Database::in_memory().await.unwrap();
    let visitors = SqliteVisitorRepository::new(db.pool().clone());
    let id = visitors
        .create(&Visitor::new("Carlos Lima", "305", "4521").multiple(Some(1)))
        .await
        .unwrap();

    let (door_tx, mut door_rx) = mpsc::channel(4);
    let mut session = KioskSession::new(StoredValidator::new(db.pool().clone()), door_tx);

    type_line(&mut session, "305 # 4521 #").await;
    assert!(door_rx.try_recv().is_ok());

    // Dismiss feedback, then try again
    type_line(&mut session, "# 305 # 4521 #").await;
    assert_eq!(session.step(), KioskStep::Feedback);
    assert_eq!(session.message(), DisplayMessages::USAGE_LIMIT_REACHED);
    assert!(door_rx.try_recv().is_err());

    visitors.update_status(id, VisitorStatus::Denied).await.unwrap();
    type_line(&mut session, "# 305 # 4521 #").await;
    assert_eq!(session.message(), DisplayMessages::PASS_NOT_VALID);
}
