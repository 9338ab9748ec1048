use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

/// Helsinki open-data WMS endpoint serving the orthophoto layers.
pub const WMS_URL: &str = "https://kartta.hel.fi/ws/geoserver/avoindata/wms";

pub const WMS_ATTRIBUTION: &str = "\u{a9} Helsingin kaupunki, kaupunkimittauspalvelut";

/// Terrain tiles for the guess map. `{z}`, `{x}`, `{y}` are substituted.
pub const TERRAIN_TILE_URL: &str = "https://tiles.stadiamaps.com/tiles/stamen_terrain/{z}/{x}/{y}.png";

pub const TERRAIN_ATTRIBUTION: &str =
    "\u{a9} Stadia Maps \u{a9} Stamen Design \u{a9} OpenMapTiles \u{a9} OpenStreetMap";

/// Aerial photo layers the game can be played on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapLayer {
    #[default]
    #[serde(rename = "avoindata:Ortoilmakuva_1943")]
    Helsinki1943,
    #[serde(rename = "avoindata:Ortoilmakuva_1969")]
    Helsinki1969,
    #[serde(rename = "avoindata:Ortoilmakuva_1997")]
    Helsinki1997,
    #[serde(rename = "avoindata:Ortoilmakuva_2019_20cm")]
    Helsinki2019,
    #[serde(rename = "avoindata:Ortoilmakuva_2024_5cm")]
    Helsinki2024,
}

impl MapLayer {
    pub const ALL: [MapLayer; 5] = [
        MapLayer::Helsinki1943,
        MapLayer::Helsinki1969,
        MapLayer::Helsinki1997,
        MapLayer::Helsinki2019,
        MapLayer::Helsinki2024,
    ];

    /// Layers offered when starting a normal game, one per decade.
    pub const PLAYABLE: [MapLayer; 4] = [
        MapLayer::Helsinki1943,
        MapLayer::Helsinki1969,
        MapLayer::Helsinki1997,
        MapLayer::Helsinki2024,
    ];

    /// WMS layer name.
    pub fn name(&self) -> &'static str {
        match self {
            MapLayer::Helsinki1943 => "avoindata:Ortoilmakuva_1943",
            MapLayer::Helsinki1969 => "avoindata:Ortoilmakuva_1969",
            MapLayer::Helsinki1997 => "avoindata:Ortoilmakuva_1997",
            MapLayer::Helsinki2019 => "avoindata:Ortoilmakuva_2019_20cm",
            MapLayer::Helsinki2024 => "avoindata:Ortoilmakuva_2024_5cm",
        }
    }

    pub fn from_name(name: &str) -> Option<MapLayer> {
        MapLayer::ALL.into_iter().find(|l| l.name() == name)
    }

    pub fn year(&self) -> u16 {
        match self {
            MapLayer::Helsinki1943 => 1943,
            MapLayer::Helsinki1969 => 1969,
            MapLayer::Helsinki1997 => 1997,
            MapLayer::Helsinki2019 => 2019,
            MapLayer::Helsinki2024 => 2024,
        }
    }

    /// Decade label, e.g. "1940's".
    pub fn decade(&self) -> String {
        format!("{}'s", self.year() / 10 * 10)
    }

    pub fn city(&self) -> &'static str {
        "Helsinki"
    }

    pub fn city_center(&self) -> LatLng {
        LatLng::new(60.170678, 24.941543)
    }
}

impl std::fmt::Display for MapLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.city(), self.year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_from_name() {
        for layer in MapLayer::ALL {
            assert_eq!(MapLayer::from_name(layer.name()), Some(layer));
        }
        assert_eq!(MapLayer::from_name("avoindata:Kantakartta"), None);
    }

    #[test]
    fn test_serde_uses_wms_name() {
        let json = serde_json::to_string(&MapLayer::Helsinki2024).unwrap();
        assert_eq!(json, "\"avoindata:Ortoilmakuva_2024_5cm\"");
        let layer: MapLayer = serde_json::from_str("\"avoindata:Ortoilmakuva_1969\"").unwrap();
        assert_eq!(layer, MapLayer::Helsinki1969);
    }

    #[test]
    fn test_decade_labels() {
        assert_eq!(MapLayer::Helsinki1943.decade(), "1940's");
        assert_eq!(MapLayer::Helsinki1997.decade(), "1990's");
        assert_eq!(MapLayer::Helsinki2024.decade(), "2020's");
    }

    #[test]
    fn test_playable_layers_have_distinct_decades() {
        let mut decades: Vec<String> = MapLayer::PLAYABLE.iter().map(|l| l.decade()).collect();
        decades.dedup();
        assert_eq!(decades.len(), MapLayer::PLAYABLE.len());
    }
}
