//! Concurrent writers against an on-disk database.

use std::sync::Arc;

use std::collections::HashSet;

use doorlist::db::{CheckIn, NewArea, NewDiningPatron, NewVenue, ServiceType};
use doorlist::{CheckInService, Database, DiningCheckIn, DoorlistError, SqliteStore, Store};

async fn open_store(dir: &tempfile::TempDir) -> Arc<SqliteStore> {
    let db = Database::open(dir.path().join("doorlist.db"), 4)
        .await
        .unwrap();
    Arc::new(SqliteStore::new(db))
}

/// Start a dining service in a fresh venue and return its ID.
async fn dining_service(store: &SqliteStore) -> String {
    let venue = store
        .venues()
        .create(&NewVenue::new("harbour", "Harbour Hotel"))
        .await
        .unwrap();
    let area = store
        .venues()
        .create_area(&NewArea::new(&venue.id, ServiceType::Dining, "DEK", "Deck"))
        .await
        .unwrap();
    store
        .start_service(&venue.id, &area.id, ServiceType::Dining)
        .await
        .unwrap()
        .id
}

fn group(size: usize) -> CheckIn {
    CheckIn::new(
        (0..size)
            .map(|i| NewDiningPatron {
                first_name: format!("Guest{i}"),
                phone_number: "0400 000 000".to_string(),
            })
            .collect(),
    )
}

/// Seat groups of the given sizes at one table number and return the
/// sitting ID with the check-in IDs.
async fn seat(
    store: &SqliteStore,
    service_id: &str,
    table_number: &str,
    sizes: &[usize],
) -> (String, Vec<String>) {
    let mut table_id = String::new();
    let mut check_in_ids = Vec::new();
    for &size in sizes {
        let check_in = group(size);
        table_id = store
            .add_dining_check_in(service_id, table_number, &check_in)
            .await
            .unwrap();
        check_in_ids.push(check_in.id);
    }
    (table_id, check_in_ids)
}

#[tokio::test]
async fn test_concurrent_table_moves_keep_every_group() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;
    let service_id = dining_service(&store).await;
    let (table_id, check_in_ids) = seat(&store, &service_id, "1", &[2, 3, 1]).await;

    let targets: Vec<String> = (10..18).map(|n| n.to_string()).collect();
    let mut handles = Vec::new();
    for target in targets.clone() {
        let store = store.clone();
        let service_id = service_id.clone();
        let table_id = table_id.clone();
        handles.push(tokio::spawn(async move {
            store
                .move_dining_table(&service_id, &table_id, &target)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let loaded = store.get_service(&service_id).await.unwrap().unwrap();
    assert_eq!(loaded.sittings().len(), 1);
    let sitting = &loaded.sittings()[0];
    assert_eq!(sitting.id, table_id);
    assert!(targets.contains(&sitting.table_number));

    let held: Vec<&str> = sitting.check_ins.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(held.len(), check_in_ids.len());
    for id in &check_in_ids {
        assert!(held.contains(&id.as_str()));
    }
    assert_eq!(loaded.dining_head_count(), 6);
}

#[tokio::test]
async fn test_concurrent_moves_racing_a_merge() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;
    let service_id = dining_service(&store).await;
    let (moving, mut check_in_ids) = seat(&store, &service_id, "1", &[2, 2]).await;
    let (target, seated) = seat(&store, &service_id, "2", &[3]).await;
    check_in_ids.extend(seated);

    // "2" is occupied, so whichever order these run in the moving table ends
    // up merged into it and later moves find no table
    let mut handles = Vec::new();
    for number in ["2", "3", "4", "5", "6"] {
        let store = store.clone();
        let service_id = service_id.clone();
        let moving = moving.clone();
        handles.push(tokio::spawn(async move {
            store.move_dining_table(&service_id, &moving, number).await
        }));
    }
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) | Err(DoorlistError::TableNotFound) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    let loaded = store.get_service(&service_id).await.unwrap().unwrap();
    assert_eq!(loaded.sittings().len(), 1);
    let sitting = &loaded.sittings()[0];
    assert_eq!(sitting.id, target);
    assert_eq!(sitting.table_number, "2");

    let held: HashSet<&str> = sitting.check_ins.iter().map(|c| c.id.as_str()).collect();
    let expected: HashSet<&str> = check_in_ids.iter().map(|id| id.as_str()).collect();
    assert_eq!(sitting.check_ins.len(), expected.len());
    assert_eq!(held, expected);
    assert_eq!(loaded.dining_head_count(), 7);
}

#[tokio::test]
async fn test_concurrent_check_ins_share_one_table() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    let venue = store
        .venues()
        .create(&NewVenue::new("harbour", "Harbour Hotel"))
        .await
        .unwrap();
    let area = store
        .venues()
        .create_area(&NewArea::new(&venue.id, ServiceType::Dining, "DEK", "Deck"))
        .await
        .unwrap();
    let service = store
        .start_service(&venue.id, &area.id, ServiceType::Dining)
        .await
        .unwrap();

    let checkin = Arc::new(CheckInService::new(store.clone()));
    let mut handles = Vec::new();
    for i in 0..10 {
        let checkin = checkin.clone();
        let venue_id = venue.id.clone();
        let area_id = area.id.clone();
        handles.push(tokio::spawn(async move {
            checkin
                .submit_dining_check_in(
                    &venue_id,
                    &area_id,
                    DiningCheckIn {
                        table_number: "5".to_string(),
                        people: vec![NewDiningPatron {
                            first_name: format!("Guest{i}"),
                            phone_number: "0400 000 000".to_string(),
                        }],
                    },
                )
                .await
        }));
    }

    let mut table_ids = Vec::new();
    for handle in handles {
        table_ids.push(handle.await.unwrap().unwrap().table_id);
    }
    table_ids.dedup();
    assert_eq!(table_ids.len(), 1);

    let loaded = store.get_service(&service.id).await.unwrap().unwrap();
    assert_eq!(loaded.sittings().len(), 1);
    assert_eq!(loaded.sittings()[0].check_ins.len(), 10);
    assert_eq!(loaded.dining_head_count(), 10);
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let (venue_id, area_id) = {
        let store = open_store(&dir).await;
        let venue = store
            .venues()
            .create(&NewVenue::new("harbour", "Harbour Hotel"))
            .await
            .unwrap();
        let area = store
            .venues()
            .create_area(&NewArea::new(&venue.id, ServiceType::Gaming, "TAB", "TAB"))
            .await
            .unwrap();
        store
            .start_service(&venue.id, &area.id, ServiceType::Gaming)
            .await
            .unwrap();
        store.database().pool().close().await;
        (venue.id, area.id)
    };

    let store = open_store(&dir).await;
    let venue = store.get_venue_by_id(&venue_id).await.unwrap().unwrap();
    let area = venue.area(&area_id, ServiceType::Gaming).unwrap();
    assert!(area.active_service_id.is_some());
}
