//! Epidemic statistics records and the area reshape.
//!
//! Pure data transforms: flat store rows are reshaped into the nested
//! `{incrVo, cities}` structures the frontend consumes. The `/book/area`
//! output deliberately concatenates two differently-shaped record kinds
//! into one array; that shape is preserved for compatibility and modeled
//! as an untagged enum so each arm keeps a precise schema.

use serde::{Deserialize, Serialize};

/// Per-area row with current totals and incremental counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaRecord {
    /// Province the row belongs to.
    pub province_name: String,
    /// Currently confirmed cases.
    #[serde(default)]
    pub current_confirmed: i64,
    /// Cumulative confirmed cases.
    #[serde(default)]
    pub confirmed: i64,
    /// Cumulative cured cases.
    #[serde(default)]
    pub cured: i64,
    /// Cumulative deaths.
    #[serde(default)]
    pub dead: i64,
    /// Increment of currently confirmed cases.
    pub current_confirmed_incr: i64,
    /// Increment of cumulative confirmed cases.
    pub confirmed_incr: i64,
    /// Increment of cured cases.
    pub cured_incr: i64,
    /// Increment of deaths.
    pub dead_incr: i64,
}

/// Per-province aggregate row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceRecord {
    /// Province name, the key city rows are matched on.
    pub province_name: String,
    /// Currently confirmed cases.
    #[serde(default)]
    pub current_confirmed: i64,
    /// Cumulative confirmed cases.
    #[serde(default)]
    pub confirmed: i64,
    /// Cumulative cured cases.
    #[serde(default)]
    pub cured: i64,
    /// Cumulative deaths.
    #[serde(default)]
    pub dead: i64,
}

/// Per-city row tagged with its province.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRecord {
    /// Province the city belongs to.
    pub province_name: String,
    /// City name.
    pub city_name: String,
    /// Currently confirmed cases.
    #[serde(default)]
    pub current_confirmed: i64,
    /// Cumulative confirmed cases.
    #[serde(default)]
    pub confirmed: i64,
    /// Cumulative cured cases.
    #[serde(default)]
    pub cured: i64,
    /// Cumulative deaths.
    #[serde(default)]
    pub dead: i64,
}

/// National daily statistics row, passed through as-is by `/book/c_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecord {
    /// Report date, `YYYY-MM-DD`.
    pub date: String,
    /// Currently confirmed cases.
    #[serde(default)]
    pub current_confirmed: i64,
    /// Cumulative confirmed cases.
    #[serde(default)]
    pub confirmed: i64,
    /// Cumulative cured cases.
    #[serde(default)]
    pub cured: i64,
    /// Cumulative deaths.
    #[serde(default)]
    pub dead: i64,
}

/// The four incremental counts, nested under `incrVo` in area output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncrVo {
    /// Increment of currently confirmed cases.
    pub current_confirmed_incr: i64,
    /// Increment of cumulative confirmed cases.
    pub confirmed_incr: i64,
    /// Increment of cured cases.
    pub cured_incr: i64,
    /// Increment of deaths.
    pub dead_incr: i64,
}

/// Area row after reshaping: incr fields moved into `incrVo`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaIncrEntry {
    /// Province the row belongs to.
    pub province_name: String,
    /// Currently confirmed cases.
    pub current_confirmed: i64,
    /// Cumulative confirmed cases.
    pub confirmed: i64,
    /// Cumulative cured cases.
    pub cured: i64,
    /// Cumulative deaths.
    pub dead: i64,
    /// Nested incremental counts.
    pub incr_vo: IncrVo,
}

/// Province row after reshaping: matching cities attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvinceEntry {
    /// The province aggregate, flattened into the entry.
    #[serde(flatten)]
    pub province: ProvinceRecord,
    /// Every city row whose `provinceName` matches, input order.
    pub cities: Vec<CityRecord>,
}

/// One element of the combined `/book/area` output array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AreaEntry {
    /// Reshaped incremental-count record.
    Incr(AreaIncrEntry),
    /// Province record carrying its cities.
    Province(ProvinceEntry),
}

/// Build the combined area list: reshaped incr rows first, then provinces
/// with their cities. Input order is preserved throughout.
pub fn build_area_list(
    incr: Vec<AreaRecord>,
    provinces: Vec<ProvinceRecord>,
    cities: Vec<CityRecord>,
) -> Vec<AreaEntry> {
    let mut out = Vec::with_capacity(incr.len() + provinces.len());

    for record in incr {
        out.push(AreaEntry::Incr(AreaIncrEntry {
            province_name: record.province_name,
            current_confirmed: record.current_confirmed,
            confirmed: record.confirmed,
            cured: record.cured,
            dead: record.dead,
            incr_vo: IncrVo {
                current_confirmed_incr: record.current_confirmed_incr,
                confirmed_incr: record.confirmed_incr,
                cured_incr: record.cured_incr,
                dead_incr: record.dead_incr,
            },
        }));
    }

    for province in provinces {
        let matching = cities
            .iter()
            .filter(|c| c.province_name == province.province_name)
            .cloned()
            .collect();

        out.push(AreaEntry::Province(ProvinceEntry {
            province,
            cities: matching,
        }));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(province: &str, incrs: [i64; 4]) -> AreaRecord {
        AreaRecord {
            province_name: province.to_string(),
            current_confirmed: 0,
            confirmed: 0,
            cured: 0,
            dead: 0,
            current_confirmed_incr: incrs[0],
            confirmed_incr: incrs[1],
            cured_incr: incrs[2],
            dead_incr: incrs[3],
        }
    }

    fn province(name: &str) -> ProvinceRecord {
        ProvinceRecord {
            province_name: name.to_string(),
            current_confirmed: 100,
            confirmed: 0,
            cured: 0,
            dead: 0,
        }
    }

    fn city(province: &str, name: &str) -> CityRecord {
        CityRecord {
            province_name: province.to_string(),
            city_name: name.to_string(),
            current_confirmed: 0,
            confirmed: 0,
            cured: 0,
            dead: 0,
        }
    }

    #[test]
    fn incr_fields_move_into_incr_vo() {
        let out = build_area_list(vec![area("Hubei", [1, 2, 3, 4])], vec![], vec![]);
        assert_eq!(out.len(), 1);

        let json = serde_json::to_value(&out[0]).unwrap();
        assert_eq!(json["provinceName"], "Hubei");
        assert_eq!(json["incrVo"]["currentConfirmedIncr"], 1);
        assert_eq!(json["incrVo"]["confirmedIncr"], 2);
        assert_eq!(json["incrVo"]["curedIncr"], 3);
        assert_eq!(json["incrVo"]["deadIncr"], 4);
        // Removed from the top level
        assert!(json.get("currentConfirmedIncr").is_none());
        assert!(json.get("confirmedIncr").is_none());
        assert!(json.get("curedIncr").is_none());
        assert!(json.get("deadIncr").is_none());
    }

    #[test]
    fn provinces_collect_their_cities_in_input_order() {
        let out = build_area_list(
            vec![],
            vec![province("Hubei"), province("Henan")],
            vec![
                city("Hubei", "Wuhan"),
                city("Henan", "Zhengzhou"),
                city("Hubei", "Xiangyang"),
            ],
        );

        let AreaEntry::Province(hubei) = &out[0] else {
            panic!("expected province entry");
        };
        assert_eq!(hubei.cities.len(), 2);
        assert_eq!(hubei.cities[0].city_name, "Wuhan");
        assert_eq!(hubei.cities[1].city_name, "Xiangyang");

        let AreaEntry::Province(henan) = &out[1] else {
            panic!("expected province entry");
        };
        assert_eq!(henan.cities.len(), 1);
        assert_eq!(henan.cities[0].city_name, "Zhengzhou");
    }

    #[test]
    fn combined_output_matches_contract_example() {
        // Mirrors the documented behavior: one incr row, one province, one city.
        let out = build_area_list(
            vec![area("Hubei", [1, 2, 3, 4])],
            vec![province("Hubei")],
            vec![city("Hubei", "Wuhan")],
        );
        let json = serde_json::to_value(&out).unwrap();
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 2);

        assert_eq!(
            arr[0]["incrVo"],
            serde_json::json!({
                "currentConfirmedIncr": 1,
                "confirmedIncr": 2,
                "curedIncr": 3,
                "deadIncr": 4,
            })
        );
        assert!(arr[0].get("cities").is_none());

        assert_eq!(arr[1]["provinceName"], "Hubei");
        assert_eq!(arr[1]["cities"][0]["cityName"], "Wuhan");
        assert!(arr[1].get("incrVo").is_none());
    }

    #[test]
    fn province_without_cities_gets_empty_array() {
        let out = build_area_list(vec![], vec![province("Tibet")], vec![city("Hubei", "Wuhan")]);
        let json = serde_json::to_value(&out[0]).unwrap();
        assert_eq!(json["cities"], serde_json::json!([]));
    }
}
