use citizens::api::types::CitizenPayload;
use citizens::cli::OutputFormat;
use citizens::config::Config;
use citizens::controller::{FilterController, PageRequest};
use citizens::filter::{DateRange, FilterKey, ImmediateField, TextField};
use citizens::output::format_table_view;
use serde_json::json;
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn test_config_path() {
    let path = Config::config_path();
    assert!(path.is_ok());
    let path = path.unwrap();
    assert!(path.to_string_lossy().ends_with(".citizens"));
    assert!(Config::config_file_path()
        .unwrap()
        .to_string_lossy()
        .ends_with("config.yaml"));
}

#[test]
#[serial]
fn test_config_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    Config::initialize_at(&path).unwrap();

    let mut config = Config::load_from(&path).unwrap();
    assert_eq!(config, Config::default());

    config.set("api.base_url", "http://registry.local:8080/api").unwrap();
    config.set("table.page_size", "20").unwrap();
    config.set("table.debounce_ms", "300").unwrap();
    config.save_to(&path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("registry.local"));

    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded.client_config().base_url, "http://registry.local:8080/api");
    let options = reloaded.controller_options();
    assert_eq!(options.page_size, 20);
    assert_eq!(options.debounce.as_millis(), 300);
}

#[test]
#[serial]
fn test_invalid_config_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "table:\n  page_size: 0\n").unwrap();

    assert!(Config::load_from(&path).is_err());
}

#[test]
fn test_filter_keys_accept_both_spellings() {
    assert_eq!("motherName".parse::<FilterKey>().unwrap(), FilterKey::Text(TextField::MotherName));
    assert_eq!("mother_name".parse::<FilterKey>().unwrap(), FilterKey::Text(TextField::MotherName));
    assert_eq!(
        "birthCityName".parse::<FilterKey>().unwrap(),
        FilterKey::Immediate(ImmediateField::BirthCity)
    );
    assert!("dateRange".parse::<FilterKey>().is_err());
}

#[test]
fn test_controller_to_rendered_output() {
    let mut controller = FilterController::new(10);
    controller.set_date_range(DateRange::years(Some(1985), Some(1995)));
    let request = controller.set_page(2, 10).unwrap();
    assert_eq!(request.query.params.get("birth_date_from"), Some("1985"));

    let payload = CitizenPayload::from_value(json!({
        "citizens": [
            {"uid": "x1", "first": "Zeynep", "last": "Demir", "gender": "K", "national_identifier": 12345678901u64}
        ],
        "pagination": {"page": "2", "limit": 10, "total": 11}
    }));
    controller.complete(request.seq, Ok(payload));
    assert_eq!(controller.page(), PageRequest { page: 2, page_size: 10 });

    let view = controller.snapshot();
    let table = format_table_view(&view, OutputFormat::Table).unwrap();
    assert!(table.contains("11-11 of 11 citizens"));
    assert!(table.contains("Zeynep Demir"));
    assert!(table.contains("12345678901"));
    assert!(table.contains("Female"));

    let json = format_table_view(&view, OutputFormat::Json).unwrap();
    assert!(json.contains("\"national_identifier\": \"12345678901\""));
}
