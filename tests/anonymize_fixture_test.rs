use chrono::NaiveDate;
use persons_etl::core::anonymize::{anonymize_pii, anonymize_records, REDACTION_MARKER};
use persons_etl::core::table::{AnonymizedTable, COLUMN_SEPARATOR};
use persons_etl::core::PersonRecord;

fn load_person() -> PersonRecord {
    serde_json::from_str(include_str!("data/person.json")).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

/// 測試 person.json 的所有 PII 欄位都被去識別化
#[test]
fn test_anonymize_fixture_person() {
    let person = load_person();
    let anonymized = anonymize_pii(&person, today()).unwrap();

    assert_eq!(anonymized["id"], 121);
    assert_eq!(anonymized["firstname"], REDACTION_MARKER);
    assert_eq!(anonymized["lastname"], REDACTION_MARKER);
    assert_eq!(anonymized["email_domain"], "luettgen.com");
    assert_eq!(anonymized["phone"], REDACTION_MARKER);
    assert_eq!(anonymized["age_range"], "[121-130]");
    assert_eq!(anonymized["gender"], "male");
    assert_eq!(anonymized["website"], "http://ferry.com");

    let address = &anonymized["address"];
    assert_eq!(address["id"], 1);
    assert_eq!(address["street"], REDACTION_MARKER);
    assert_eq!(address["streetName"], REDACTION_MARKER);
    assert_eq!(address["buildingNumber"], REDACTION_MARKER);
    assert_eq!(address["zipcode"], REDACTION_MARKER);
    assert_eq!(address["city"], "Lake Jarrell");
    assert_eq!(address["country"], "Germany");
    assert_eq!(address["coordinates"]["latitude"], REDACTION_MARKER);
    assert_eq!(address["coordinates"]["longitude"], REDACTION_MARKER);

    assert!(anonymized.get("email").is_none());
    assert!(anonymized.get("birthday").is_none());
}

#[test]
fn test_anonymize_does_not_alias_input() {
    let person = load_person();
    let before = person.clone();

    let _ = anonymize_pii(&person, today()).unwrap();

    assert_eq!(person, before);
}

#[test]
fn test_fixture_flattens_to_expected_columns() {
    let anonymized =
        anonymize_records(vec![load_person()], "2026-10-16 09:30:00.000", today()).unwrap();
    let table = AnonymizedTable::from_records(&anonymized, COLUMN_SEPARATOR);

    let mut columns = table.column_names();
    columns.sort();
    assert_eq!(
        columns,
        vec![
            "address_buildingNumber",
            "address_city",
            "address_coordinates_latitude",
            "address_coordinates_longitude",
            "address_country",
            "address_country_code",
            "address_id",
            "address_street",
            "address_streetName",
            "address_zipcode",
            "age_range",
            "email_domain",
            "extracted_ts_utc",
            "firstname",
            "gender",
            "id",
            "image",
            "lastname",
            "phone",
            "website",
        ]
    );
    assert_eq!(
        table.cell(0, "extracted_ts_utc"),
        Some(&serde_json::json!("2026-10-16 09:30:00.000"))
    );
}
