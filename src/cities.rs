use log::warn;
use std::collections::BTreeSet;

use crate::api::CitizenSource;

/// Used when the backend cannot provide a city list
pub const FALLBACK_CITIES: [&str; 15] = [
    "Istanbul",
    "Ankara",
    "Izmir",
    "Bursa",
    "Antalya",
    "Adana",
    "Konya",
    "Gaziantep",
    "Mersin",
    "Diyarbakir",
    "Kayseri",
    "Eskisehir",
    "Urfa",
    "Malatya",
    "Erzurum",
];

/// City names for the birth/address city dropdowns, sorted and de-duplicated.
///
/// Never fails: any error from the source degrades to [`FALLBACK_CITIES`].
pub async fn load_cities(source: &dyn CitizenSource) -> Vec<String> {
    match source.fetch_cities().await {
        Ok(names) => {
            let cities: BTreeSet<String> = names
                .into_iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();
            if cities.is_empty() {
                warn!("Backend returned no cities, using fallback list");
                return fallback_cities();
            }
            cities.into_iter().collect()
        }
        Err(e) => {
            warn!("Error fetching cities: {}", e);
            fallback_cities()
        }
    }
}

pub fn fallback_cities() -> Vec<String> {
    FALLBACK_CITIES.iter().map(|c| c.to_string()).collect()
}

/// Case-insensitive substring match, as used by the dropdown search box
pub fn filter_cities<'a>(cities: &'a [String], input: &str) -> Vec<&'a str> {
    let needle = input.to_lowercase();
    cities
        .iter()
        .filter(|city| city.to_lowercase().contains(&needle))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{CitizenPayload, CitizenQuery};
    use crate::error::{CitizensError, Result};
    use async_trait::async_trait;

    struct FixedCities(Result<Vec<String>>);

    #[async_trait]
    impl CitizenSource for FixedCities {
        async fn fetch_citizens(&self, _query: CitizenQuery) -> Result<CitizenPayload> {
            Ok(CitizenPayload::Empty)
        }

        async fn fetch_cities(&self) -> Result<Vec<String>> {
            match &self.0 {
                Ok(names) => Ok(names.clone()),
                Err(e) => Err(CitizensError::Other(e.to_string())),
            }
        }

        fn base_url(&self) -> &str {
            "memory://"
        }
    }

    #[tokio::test]
    async fn test_cities_sorted_and_deduplicated() {
        let source = FixedCities(Ok(vec![
            "Konya".to_string(),
            "Ankara".to_string(),
            " Konya ".to_string(),
            "".to_string(),
        ]));
        assert_eq!(load_cities(&source).await, vec!["Ankara", "Konya"]);
    }

    #[tokio::test]
    async fn test_fallback_on_error() {
        let source = FixedCities(Err(CitizensError::Other("connection refused".to_string())));
        let cities = load_cities(&source).await;
        assert_eq!(cities.len(), 15);
        assert_eq!(cities[0], "Istanbul");
    }

    #[tokio::test]
    async fn test_fallback_on_empty_list() {
        let source = FixedCities(Ok(Vec::new()));
        assert_eq!(load_cities(&source).await, fallback_cities());
    }

    #[test]
    fn test_filter_cities() {
        let cities = fallback_cities();
        assert_eq!(
            filter_cities(&cities, "an"),
            vec!["Istanbul", "Ankara", "Antalya", "Adana", "Gaziantep"]
        );
        assert_eq!(filter_cities(&cities, "IZM"), vec!["Izmir"]);
    }
}
