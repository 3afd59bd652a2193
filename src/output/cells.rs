use chrono::NaiveDate;

use crate::api::types::CitizenRecord;
use crate::filter::gender_label;

pub const NOT_AVAILABLE: &str = "N/A";

/// "first last", or N/A when both are missing
pub fn full_name(record: &CitizenRecord) -> String {
    let name = format!(
        "{} {}",
        record.first.as_deref().unwrap_or(""),
        record.last.as_deref().unwrap_or("")
    );
    let name = name.trim();
    if name.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        name.to_string()
    }
}

pub fn national_id(record: &CitizenRecord) -> String {
    or_na(record.national_identifier.as_deref())
}

pub fn gender(record: &CitizenRecord) -> String {
    match record.gender.as_deref() {
        Some(code) if !code.is_empty() => gender_label(code).to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Parse `YYYY-MM-DD`, also when followed by a time part
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let date = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// "DD/MM/YYYY (age N)" relative to `today`
pub fn birth_date(record: &CitizenRecord, today: NaiveDate) -> String {
    let Some(raw) = record.date_of_birth.as_deref().filter(|s| !s.is_empty()) else {
        return NOT_AVAILABLE.to_string();
    };
    match parse_birth_date(raw) {
        Some(date) => match today.years_since(date) {
            Some(age) => format!("{} (age {})", date.format("%d/%m/%Y"), age),
            None => date.format("%d/%m/%Y").to_string(),
        },
        None => raw.to_string(),
    }
}

pub fn birth_city(record: &CitizenRecord) -> String {
    or_na(record.birth_city.as_deref())
}

/// "M: mother" / "F: father" lines
pub fn parents(record: &CitizenRecord) -> String {
    let mut lines = Vec::new();
    if let Some(mother) = non_empty(record.mother_first.as_deref()) {
        lines.push(format!("M: {}", mother));
    }
    if let Some(father) = non_empty(record.father_first.as_deref()) {
        lines.push(format!("F: {}", father));
    }
    join_or_na(lines)
}

/// City, district, neighborhood and street, one per line
pub fn address(record: &CitizenRecord) -> String {
    let lines = [
        &record.address_city,
        &record.address_district,
        &record.address_neighborhood,
        &record.street_address,
    ]
    .into_iter()
    .filter_map(|part| non_empty(part.as_deref()).map(str::to_string))
    .collect();
    join_or_na(lines)
}

pub fn registration(record: &CitizenRecord) -> String {
    let lines = [&record.id_registration_city, &record.id_registration_district]
        .into_iter()
        .filter_map(|part| non_empty(part.as_deref()).map(str::to_string))
        .collect();
    join_or_na(lines)
}

pub fn door_number(record: &CitizenRecord) -> String {
    or_na(record.door_or_entrance_number.as_deref())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn or_na(value: Option<&str>) -> String {
    non_empty(value).unwrap_or(NOT_AVAILABLE).to_string()
}

fn join_or_na(lines: Vec<String>) -> String {
    if lines.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_full_name() {
        let mut record = CitizenRecord::default();
        assert_eq!(full_name(&record), "N/A");
        record.last = Some("Yilmaz".to_string());
        assert_eq!(full_name(&record), "Yilmaz");
        record.first = Some("Ali".to_string());
        assert_eq!(full_name(&record), "Ali Yilmaz");
    }

    #[test]
    fn test_birth_date_with_age() {
        let record = CitizenRecord {
            date_of_birth: Some("1990-06-02T00:00:00.000Z".to_string()),
            ..Default::default()
        };
        assert_eq!(birth_date(&record, today()), "02/06/1990 (age 33)");

        let record = CitizenRecord {
            date_of_birth: Some("1990-06-01".to_string()),
            ..Default::default()
        };
        assert_eq!(birth_date(&record, today()), "01/06/1990 (age 34)");
    }

    #[test]
    fn test_unparseable_birth_date_is_shown_raw() {
        let record = CitizenRecord {
            date_of_birth: Some("sometime".to_string()),
            ..Default::default()
        };
        assert_eq!(birth_date(&record, today()), "sometime");
        assert_eq!(birth_date(&CitizenRecord::default(), today()), "N/A");
    }

    #[test]
    fn test_parents_and_address() {
        let record = CitizenRecord {
            mother_first: Some("Ayse".to_string()),
            address_city: Some("Izmir".to_string()),
            street_address: Some("Ataturk Cd. 5".to_string()),
            ..Default::default()
        };
        assert_eq!(parents(&record), "M: Ayse");
        assert_eq!(address(&record), "Izmir\nAtaturk Cd. 5");
        assert_eq!(registration(&record), "N/A");
    }

    #[test]
    fn test_gender_cell() {
        let record = CitizenRecord {
            gender: Some("K".to_string()),
            ..Default::default()
        };
        assert_eq!(gender(&record), "Female");
        assert_eq!(gender(&CitizenRecord::default()), "N/A");
    }
}
