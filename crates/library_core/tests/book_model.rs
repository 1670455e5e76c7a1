use library_core::{BookField, BookRecord, BookValidationError, NewBook, ReadStatus};
use serde_json::json;

#[test]
fn validate_returns_record_with_values_untrimmed() {
    let form = NewBook::new(" Dune ", "Herbert", 1965, "Sci-Fi", ReadStatus::Read);
    let record = form.validate().unwrap();

    assert_eq!(record.title, " Dune ");
    assert_eq!(record.author, "Herbert");
    assert_eq!(record.publication_year, 1965);
    assert!(record.is_read());
}

#[test]
fn validate_reports_first_missing_field_in_column_order() {
    let form = NewBook::default();
    assert_eq!(
        form.validate().unwrap_err(),
        BookValidationError::MissingField(BookField::Title)
    );

    let form = NewBook {
        title: "Dune".to_string(),
        author: "Herbert".to_string(),
        ..NewBook::default()
    };
    let err = form.validate().unwrap_err();
    assert_eq!(err.field(), BookField::PublicationYear);
    assert_eq!(err.to_string(), "missing required field: publication year");
}

#[test]
fn read_status_parses_form_values() {
    assert_eq!("Yes".parse::<ReadStatus>().unwrap(), ReadStatus::Read);
    assert_eq!(" unread ".parse::<ReadStatus>().unwrap(), ReadStatus::Unread);
    assert_eq!("N".parse::<ReadStatus>().unwrap(), ReadStatus::Unread);

    let err = "maybe".parse::<ReadStatus>().unwrap_err();
    assert!(err.to_string().contains("maybe"));
}

#[test]
fn record_serialization_uses_store_column_names() {
    let record = NewBook::new("Dune", "Herbert", 1965, "Sci-Fi", ReadStatus::Unread)
        .validate()
        .unwrap();

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(
        value,
        json!({
            "Title": "Dune",
            "Author": "Herbert",
            "Publication Year": 1965,
            "Genre": "Sci-Fi",
            "Read Status": "No"
        })
    );
    assert_eq!(serde_json::Value::Object(record.to_row()), value);
}

#[test]
fn from_row_ignores_store_managed_columns_and_accepts_text_year() {
    let row = json!({
        "id": 7,
        "created_at": "2024-05-01T12:00:00+00:00",
        "Title": "Emma",
        "Author": "Austen",
        "Publication Year": "1815",
        "Genre": "Novel",
        "Read Status": "Yes"
    });

    let record = BookRecord::from_row(row.as_object().unwrap()).unwrap();
    assert_eq!(record.title, "Emma");
    assert_eq!(record.publication_year, 1815);
    assert_eq!(record.read_status, ReadStatus::Read);
}

#[test]
fn from_row_rejects_unknown_read_status() {
    let row = json!({
        "Title": "Emma",
        "Author": "Austen",
        "Publication Year": 1815,
        "Genre": "Novel",
        "Read Status": "Read"
    });

    assert!(BookRecord::from_row(row.as_object().unwrap()).is_err());
}
