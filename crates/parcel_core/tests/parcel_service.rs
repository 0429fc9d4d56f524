use parcel_core::db::open_db_in_memory;
use parcel_core::{
    ParcelRepository, ParcelService, ParcelStatus, ServiceError, SqliteParcelStore, StoreError,
    STATUS_DELIVERED, STATUS_REGISTERED, STATUS_SENT,
};

#[test]
fn register_stores_registered_parcel_with_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelStore::try_new(&conn).unwrap());

    let parcel = service.register(1000, "Pushkin st. 1").unwrap();
    assert!(parcel.number > 0);
    assert_eq!(parcel.status, STATUS_REGISTERED);
    assert!(chrono::DateTime::parse_from_rfc3339(&parcel.created_at).is_ok());

    let stored = SqliteParcelStore::try_new(&conn)
        .unwrap()
        .get(parcel.number)
        .unwrap();
    assert_eq!(stored, parcel);
}

#[test]
fn next_status_walks_lifecycle_and_stops_at_delivered() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelStore::try_new(&conn).unwrap());
    let number = service.register(1, "addr").unwrap().number;

    assert_eq!(service.next_status(number).unwrap(), ParcelStatus::Sent);
    assert_eq!(service.next_status(number).unwrap(), ParcelStatus::Delivered);
    assert_eq!(service.next_status(number).unwrap(), ParcelStatus::Delivered);

    let parcels = service.client_parcels(1).unwrap();
    assert_eq!(parcels.len(), 1);
    assert_eq!(parcels[0].status, STATUS_DELIVERED);
}

#[test]
fn next_status_rejects_unknown_status_text() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteParcelStore::try_new(&conn).unwrap();
    let service = ParcelService::new(SqliteParcelStore::try_new(&conn).unwrap());
    let number = service.register(1, "addr").unwrap().number;
    store.set_status(number, "returned").unwrap();

    let err = service.next_status(number).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::UnknownStatus { number: n, ref status } if n == number && status == "returned"
    ));
}

#[test]
fn next_status_on_missing_parcel_is_lookup_error() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelStore::try_new(&conn).unwrap());

    match service.next_status(404).unwrap_err() {
        ServiceError::Store(err) => assert!(err.is_not_found()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn change_address_only_applies_before_sending() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelStore::try_new(&conn).unwrap());
    let number = service.register(9, "old").unwrap().number;

    service.change_address(number, "new").unwrap();
    assert_eq!(service.client_parcels(9).unwrap()[0].address, "new");

    service.next_status(number).unwrap();
    service.change_address(number, "newer").unwrap();
    let parcel = &service.client_parcels(9).unwrap()[0];
    assert_eq!(parcel.address, "new");
    assert_eq!(parcel.status, STATUS_SENT);
}

#[test]
fn delete_removes_registered_and_rejects_sent() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelStore::try_new(&conn).unwrap());
    let kept = service.register(3, "a").unwrap().number;
    let removed = service.register(3, "b").unwrap().number;

    service.next_status(kept).unwrap();
    service.delete(removed).unwrap();

    let err = service.delete(kept).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Store(StoreError::WrongStatusForDeletion { .. })
    ));

    let remaining: Vec<_> = service
        .client_parcels(3)
        .unwrap()
        .into_iter()
        .map(|parcel| parcel.number)
        .collect();
    assert_eq!(remaining, vec![kept]);
}
