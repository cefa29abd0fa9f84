//! Static category → department routing.
//!
//! Only the department a category routes to may change the status of reports
//! filed under it. Categories without an entry are valid report tags, they
//! just cannot be actioned by any department.

use serde::Serialize;
use utoipa::ToSchema;

pub const PUBLIC_WORKS: &str = "Public Works Department (PWD)";
pub const SANITATION: &str = "Sanitation Department";
pub const ELECTRICITY: &str = "Electricity Department";
pub const WATER_SUPPLY: &str = "Water Supply Department";
pub const DRAINAGE: &str = "Drainage & Sewerage Department";
pub const PARKS: &str = "Parks & Horticulture Department";
pub const TRAFFIC: &str = "Traffic Police Department";
pub const TOWN_PLANNING: &str = "Town Planning Department";
pub const ANIMAL_CONTROL: &str = "Animal Control Department";
pub const HEALTH: &str = "Health Department";
pub const POLLUTION_CONTROL: &str = "Pollution Control Board";

static ROUTES: &[(&str, &str)] = &[
    ("Road Damage / Potholes", PUBLIC_WORKS),
    ("Broken Footpaths / Sidewalks", PUBLIC_WORKS),
    ("Bridge / Flyover Damage", PUBLIC_WORKS),
    ("Damaged Public Property", PUBLIC_WORKS),
    ("Garbage Collection / Overflowing Bins", SANITATION),
    ("Illegal Dumping", SANITATION),
    ("Public Toilet Maintenance", SANITATION),
    ("Dead Animal Removal", SANITATION),
    ("Street Light Not Working", ELECTRICITY),
    ("Exposed / Hanging Wires", ELECTRICITY),
    ("Power Outage", ELECTRICITY),
    ("Water Leakage / Pipe Burst", WATER_SUPPLY),
    ("No Water Supply", WATER_SUPPLY),
    ("Contaminated Water", WATER_SUPPLY),
    ("Blocked Drains / Sewage Overflow", DRAINAGE),
    ("Waterlogging / Flooding", DRAINAGE),
    ("Open Manholes", DRAINAGE),
    ("Fallen Trees", PARKS),
    ("Park Maintenance", PARKS),
    ("Traffic Signal Malfunction", TRAFFIC),
    ("Illegal Parking", TRAFFIC),
    ("Encroachment on Public Land", TOWN_PLANNING),
    ("Illegal Construction", TOWN_PLANNING),
    ("Stray Animal Menace", ANIMAL_CONTROL),
    ("Mosquito Breeding / Stagnant Water", HEALTH),
    ("Air Pollution / Burning Waste", POLLUTION_CONTROL),
    ("Noise Pollution", POLLUTION_CONTROL),
];

/// Department responsible for `category`, matched exactly.
pub fn department_for(category: &str) -> Option<&'static str> {
    ROUTES
        .iter()
        .find(|(key, _)| *key == category)
        .map(|(_, department)| *department)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryRoute {
    pub category: String,
    pub department: String,
}

pub fn all_routes() -> Vec<CategoryRoute> {
    ROUTES
        .iter()
        .map(|(category, department)| CategoryRoute {
            category: category.to_string(),
            department: department.to_string(),
        })
        .collect()
}
