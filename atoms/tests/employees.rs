use gth_atoms::employees::{
    create_employee, delete_employee, get_employee, list_employees, update_employee,
    DeleteOutcome, EmployeeEdit, EmployeeError, EmployeeFilter, EmployeeForm,
};
use gth_atoms::store::{collections, InMemoryDocumentStore};
use gth_atoms::{dates, AlertKind, UserFacing};
use rstest::{fixture, rstest};

#[fixture]
fn store() -> InMemoryDocumentStore {
    InMemoryDocumentStore::new()
}

fn form(name: &str, surname: &str) -> EmployeeForm {
    EmployeeForm {
        name: name.to_string(),
        surname: surname.to_string(),
        position: "Agente inmobiliario".to_string(),
        ..Default::default()
    }
}

#[rstest]
#[case("", "Gómez")]
#[case("Ana", "   ")]
#[case("123", "Gómez")]
#[tokio::test]
async fn missing_names_never_reach_the_store(
    store: InMemoryDocumentStore,
    #[case] name: &str,
    #[case] surname: &str,
) {
    let err = create_employee(&store, form(name, surname)).await.unwrap_err();

    assert!(matches!(err, EmployeeError::Invalid(_)));
    assert_eq!(err.kind(), AlertKind::Warning);
    assert_eq!(err.alert().message, "El nombre y apellido son obligatorios.");
    assert_eq!(store.calls(), 0);
}

#[rstest]
#[tokio::test]
async fn future_birth_date_is_rejected(store: InMemoryDocumentStore) {
    let mut input = form("Ana", "Gómez");
    input.birth_date = "01/01/2999".to_string();

    let err = create_employee(&store, input).await.unwrap_err();
    assert_eq!(err.alert().title, "Fecha inválida");
    assert_eq!(store.calls(), 0);
}

#[rstest]
#[tokio::test]
async fn new_employee_is_active_and_hired_today(store: InMemoryDocumentStore) {
    let mut input = form("  Ana ", "Gómez");
    input.street = "San Martín".to_string();
    input.street_number = "123".to_string();
    input.neighborhood = "Centro".to_string();
    input.dni = "12.345.678-99".to_string();

    let employee = create_employee(&store, input).await.unwrap();

    assert!(employee.record.active);
    assert_eq!(employee.record.name, "Ana");
    assert_eq!(employee.record.dni, "123456789");
    assert_eq!(employee.record.hire_date, dates::display_date(dates::today()));
    assert_eq!(employee.record.domicile, "San Martín, 123, Barrio Centro");
    assert_eq!(store.len(collections::EMPLOYEES), 1);

    let loaded = get_employee(&store, &employee.id).await.unwrap();
    assert_eq!(loaded, employee);
}

#[rstest]
#[tokio::test]
async fn update_keeps_hire_date(store: InMemoryDocumentStore) {
    let created = create_employee(&store, form("Ana", "Gómez")).await.unwrap();

    let edit = EmployeeEdit {
        surname: Some("Gómez Paz".to_string()),
        active: Some(false),
        ..Default::default()
    };
    let updated = update_employee(&store, &created.id, edit).await.unwrap();

    assert_eq!(updated.record.surname, "Gómez Paz");
    assert!(!updated.record.active);
    assert_eq!(updated.record.hire_date, created.record.hire_date);
    assert_eq!(updated.record.created_at, created.record.created_at);
    assert!(updated.record.updated_at.is_some());
}

#[rstest]
#[tokio::test]
async fn update_keeps_fields_the_edit_leaves_out(store: InMemoryDocumentStore) {
    let mut input = form("Ana", "Gómez");
    input.phone = "341 555 1234".to_string();
    input.photo = Some("file:///fotos/ana.jpg".to_string());
    let created = create_employee(&store, input).await.unwrap();

    let deactivate = EmployeeEdit {
        active: Some(false),
        ..Default::default()
    };
    update_employee(&store, &created.id, deactivate).await.unwrap();

    let new_position = EmployeeEdit {
        position: Some("Tasadora".to_string()),
        ..Default::default()
    };
    let updated = update_employee(&store, &created.id, new_position).await.unwrap();

    assert_eq!(updated.record.position, "Tasadora");
    assert!(!updated.record.active);
    assert_eq!(updated.record.photo, "file:///fotos/ana.jpg");
    assert_eq!(updated.record.phone, "341 555 1234");
    assert_eq!(updated.record.name, "Ana");
}

#[rstest]
#[tokio::test]
async fn update_cannot_blank_the_names(store: InMemoryDocumentStore) {
    let created = create_employee(&store, form("Ana", "Gómez")).await.unwrap();
    let edit = EmployeeEdit {
        name: Some("  ".to_string()),
        ..Default::default()
    };

    let err = update_employee(&store, &created.id, edit).await.unwrap_err();

    assert!(matches!(err, EmployeeError::Invalid(_)));
    let stored = get_employee(&store, &created.id).await.unwrap();
    assert_eq!(stored.record.name, "Ana");
}

#[rstest]
#[tokio::test]
async fn update_of_missing_employee_is_not_found(store: InMemoryDocumentStore) {
    let err = update_employee(&store, "nope", EmployeeEdit::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EmployeeError::NotFound(_)));
    assert_eq!(err.kind(), AlertKind::NotFound);
}

#[rstest]
#[tokio::test]
async fn listing_filters_and_sorts(store: InMemoryDocumentStore) {
    for (name, surname) in [("Luis", "Zapata"), ("Ana", "Gómez"), ("Beto", "Gómez")] {
        create_employee(&store, form(name, surname)).await.unwrap();
    }

    let all = list_employees(&store, &EmployeeFilter::default()).await.unwrap();
    let names: Vec<_> = all.iter().map(|e| e.full_name()).collect();
    assert_eq!(names, vec!["Ana Gómez", "Beto Gómez", "Luis Zapata"]);

    let filter = EmployeeFilter {
        q: Some("gómez".to_string()),
        active: None,
    };
    assert_eq!(list_employees(&store, &filter).await.unwrap().len(), 2);
}

#[rstest]
#[tokio::test]
async fn unconfirmed_delete_touches_nothing(store: InMemoryDocumentStore) {
    let created = create_employee(&store, form("Ana", "Gómez")).await.unwrap();
    let before = store.calls();

    let outcome = delete_employee(&store, &created.id, false).await.unwrap();

    match outcome {
        DeleteOutcome::ConfirmationRequired(alert) => {
            assert_eq!(alert.title, "Eliminar empleado")
        }
        other => panic!("expected confirmation prompt, got {other:?}"),
    }
    assert_eq!(store.calls(), before);
    assert_eq!(store.len(collections::EMPLOYEES), 1);
}

#[rstest]
#[tokio::test]
async fn confirmed_delete_removes_exactly_one(store: InMemoryDocumentStore) {
    let keep = create_employee(&store, form("Ana", "Gómez")).await.unwrap();
    let gone = create_employee(&store, form("Luis", "Zapata")).await.unwrap();

    let outcome = delete_employee(&store, &gone.id, true).await.unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted(vec![keep]));
    assert_eq!(store.len(collections::EMPLOYEES), 1);

    let err = delete_employee(&store, &gone.id, true).await.unwrap_err();
    assert!(matches!(err, EmployeeError::NotFound(_)));
}

#[rstest]
#[tokio::test]
async fn offline_store_is_reported_as_unavailable(store: InMemoryDocumentStore) {
    store.set_offline(true);

    let err = create_employee(&store, form("Ana", "Gómez")).await.unwrap_err();

    assert_eq!(err.kind(), AlertKind::Unavailable);
    assert_eq!(err.alert().message, "No se pudo agregar el empleado. Intenta de nuevo.");
}
