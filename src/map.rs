// map.rs
use crate::continent::Continent;
use crate::territory::Territory;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldMap {
    pub territories: HashMap<String, Territory>,
    pub continents: HashMap<String, Continent>,
}

impl WorldMap {
    pub fn new() -> Self {
        Self {
            territories: HashMap::new(),
            continents: HashMap::new(),
        }
    }

    pub fn classic() -> Self {
        CLASSIC_MAP.clone()
    }

    pub fn add_territory(&mut self, territory: Territory) {
        if let Some(continent) = self.continents.get_mut(&territory.continent) {
            continent.add_territory(&territory.name);
        }
        self.territories.insert(territory.name.clone(), territory);
    }

    pub fn add_continent(&mut self, continent: Continent) {
        self.continents.insert(continent.name.clone(), continent);
    }

    pub fn get_territory(&self, name: &str) -> Option<&Territory> {
        self.territories.get(name)
    }

    pub fn get_continent(&self, name: &str) -> Option<&Continent> {
        self.continents.get(name)
    }

    pub fn continent_of(&self, territory: &str) -> Option<&str> {
        self.territories.get(territory).map(|t| t.continent.as_str())
    }

    pub fn adjacent(&self, territory: &str) -> Option<&HashSet<String>> {
        self.territories.get(territory).map(|t| &t.adjacent_territories)
    }

    pub fn territories_of(&self, continent: &str) -> &[String] {
        self.continents
            .get(continent)
            .map(|c| c.territories.as_slice())
            .unwrap_or(&[])
    }

    pub fn num_territories(&self) -> usize {
        self.territories.len()
    }

    // Continent-then-territory order: continents alphabetically, members in
    // definition order. Used wherever iteration must be deterministic.
    pub fn ordered_territories(&self) -> Vec<&str> {
        let mut continent_names: Vec<&String> = self.continents.keys().collect();
        continent_names.sort();
        continent_names
            .into_iter()
            .flat_map(|c| self.continents[c].territories.iter().map(String::as_str))
            .collect()
    }

    // The static tables must describe an undirected graph with consistent
    // continent membership. Violations are definition bugs, not runtime
    // conditions, so they abort construction.
    pub fn validate(&self) {
        for (name, territory) in &self.territories {
            assert!(
                self.continents.contains_key(&territory.continent),
                "Territory '{}' references unknown continent '{}'",
                name,
                territory.continent
            );
            assert!(
                self.continents[&territory.continent].contains(name),
                "Territory '{}' missing from continent '{}'",
                name,
                territory.continent
            );
            for adjacent in &territory.adjacent_territories {
                assert!(
                    adjacent != name,
                    "Territory '{}' lists itself as adjacent",
                    name
                );
                let other = self
                    .territories
                    .get(adjacent)
                    .unwrap_or_else(|| panic!("Territory '{}' borders unknown '{}'", name, adjacent));
                assert!(
                    other.is_adjacent(name),
                    "Adjacency between '{}' and '{}' is not symmetric",
                    name,
                    adjacent
                );
            }
        }
        for (name, continent) in &self.continents {
            for territory in &continent.territories {
                let entry = self
                    .territories
                    .get(territory)
                    .unwrap_or_else(|| panic!("Continent '{}' lists unknown '{}'", name, territory));
                assert!(
                    entry.continent == *name,
                    "Territory '{}' assigned to both '{}' and '{}'",
                    territory,
                    entry.continent,
                    name
                );
            }
        }
    }
}

lazy_static! {
    static ref CLASSIC_MAP: WorldMap = build_classic_map();
}

fn build_classic_map() -> WorldMap {
    let mut map = WorldMap::new();
    for &(name, bonus) in CLASSIC_CONTINENTS {
        map.add_continent(Continent::new(name, bonus));
    }
    for &(name, continent, adjacents) in CLASSIC_TERRITORIES {
        let mut territory = Territory::new(name, continent);
        for adjacent in adjacents {
            territory.add_adjacent(adjacent);
        }
        map.add_territory(territory);
    }
    map.validate();
    map
}

const CLASSIC_CONTINENTS: &[(&str, u16)] = &[
    ("North America", 5),
    ("South America", 2),
    ("Europe", 5),
    ("Africa", 3),
    ("Asia", 7),
    ("Australia", 2),
];

const CLASSIC_TERRITORIES: &[(&str, &str, &[&str])] = &[
    (
        "Alaska",
        "North America",
        &["Northwest Territory", "Alberta", "Kamchatka"],
    ),
    (
        "Northwest Territory",
        "North America",
        &["Alaska", "Alberta", "Ontario", "Greenland"],
    ),
    (
        "Greenland",
        "North America",
        &["Northwest Territory", "Ontario", "Quebec", "Iceland"],
    ),
    (
        "Alberta",
        "North America",
        &["Alaska", "Northwest Territory", "Ontario", "Western United States"],
    ),
    (
        "Ontario",
        "North America",
        &[
            "Northwest Territory",
            "Alberta",
            "Greenland",
            "Quebec",
            "Western United States",
            "Eastern United States",
        ],
    ),
    (
        "Quebec",
        "North America",
        &["Ontario", "Greenland", "Eastern United States"],
    ),
    (
        "Western United States",
        "North America",
        &["Alberta", "Ontario", "Eastern United States", "Central America"],
    ),
    (
        "Eastern United States",
        "North America",
        &["Western United States", "Ontario", "Quebec", "Central America"],
    ),
    (
        "Central America",
        "North America",
        &["Western United States", "Eastern United States", "Venezuela"],
    ),
    (
        "Venezuela",
        "South America",
        &["Central America", "Peru", "Brazil"],
    ),
    ("Peru", "South America", &["Venezuela", "Brazil", "Argentina"]),
    (
        "Brazil",
        "South America",
        &["Venezuela", "Peru", "Argentina", "North Africa"],
    ),
    ("Argentina", "South America", &["Peru", "Brazil"]),
    (
        "Iceland",
        "Europe",
        &["Greenland", "Great Britain", "Scandinavia"],
    ),
    (
        "Great Britain",
        "Europe",
        &["Iceland", "Scandinavia", "Northern Europe", "Western Europe"],
    ),
    (
        "Scandinavia",
        "Europe",
        &["Iceland", "Great Britain", "Northern Europe", "Ukraine"],
    ),
    (
        "Northern Europe",
        "Europe",
        &[
            "Great Britain",
            "Scandinavia",
            "Ukraine",
            "Southern Europe",
            "Western Europe",
        ],
    ),
    (
        "Western Europe",
        "Europe",
        &["Great Britain", "Northern Europe", "Southern Europe", "North Africa"],
    ),
    (
        "Southern Europe",
        "Europe",
        &[
            "Western Europe",
            "Northern Europe",
            "Ukraine",
            "Middle East",
            "Egypt",
            "North Africa",
        ],
    ),
    (
        "Ukraine",
        "Europe",
        &[
            "Scandinavia",
            "Northern Europe",
            "Southern Europe",
            "Ural",
            "Afghanistan",
            "Middle East",
        ],
    ),
    (
        "North Africa",
        "Africa",
        &[
            "Western Europe",
            "Southern Europe",
            "Egypt",
            "East Africa",
            "Congo",
            "Brazil",
        ],
    ),
    (
        "Egypt",
        "Africa",
        &["Southern Europe", "North Africa", "East Africa", "Middle East"],
    ),
    (
        "East Africa",
        "Africa",
        &[
            "Egypt",
            "North Africa",
            "Congo",
            "South Africa",
            "Madagascar",
            "Middle East",
        ],
    ),
    ("Congo", "Africa", &["North Africa", "East Africa", "South Africa"]),
    (
        "South Africa",
        "Africa",
        &["Congo", "East Africa", "Madagascar"],
    ),
    ("Madagascar", "Africa", &["East Africa", "South Africa"]),
    ("Ural", "Asia", &["Ukraine", "Siberia", "China", "Afghanistan"]),
    (
        "Siberia",
        "Asia",
        &["Ural", "Yakutsk", "Irkutsk", "Mongolia", "China"],
    ),
    ("Yakutsk", "Asia", &["Siberia", "Kamchatka", "Irkutsk"]),
    (
        "Kamchatka",
        "Asia",
        &["Yakutsk", "Irkutsk", "Mongolia", "Japan", "Alaska"],
    ),
    (
        "Irkutsk",
        "Asia",
        &["Siberia", "Yakutsk", "Kamchatka", "Mongolia"],
    ),
    (
        "Mongolia",
        "Asia",
        &["Siberia", "Irkutsk", "Kamchatka", "Japan", "China"],
    ),
    ("Japan", "Asia", &["Kamchatka", "Mongolia"]),
    (
        "Afghanistan",
        "Asia",
        &["Ukraine", "Ural", "China", "India", "Middle East"],
    ),
    (
        "China",
        "Asia",
        &["Afghanistan", "Ural", "Siberia", "Mongolia", "India", "Siam"],
    ),
    (
        "Middle East",
        "Asia",
        &[
            "Ukraine",
            "Southern Europe",
            "Egypt",
            "East Africa",
            "Afghanistan",
            "India",
        ],
    ),
    (
        "India",
        "Asia",
        &["Middle East", "Afghanistan", "China", "Siam"],
    ),
    ("Siam", "Asia", &["India", "China", "Indonesia"]),
    (
        "Indonesia",
        "Australia",
        &["Siam", "New Guinea", "Western Australia"],
    ),
    (
        "New Guinea",
        "Australia",
        &["Indonesia", "Western Australia", "Eastern Australia"],
    ),
    (
        "Western Australia",
        "Australia",
        &["Indonesia", "New Guinea", "Eastern Australia"],
    ),
    (
        "Eastern Australia",
        "Australia",
        &["Western Australia", "New Guinea"],
    ),
];
