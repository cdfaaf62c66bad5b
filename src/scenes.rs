//! Preset lighting scenes and the process-wide scene catalog.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, IntoStaticStr};

/// Preset lighting scenes known to Wiz firmware, with their display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum SceneMode {
    Ocean = 1,
    Romance = 2,
    Sunset = 3,
    Party = 4,
    Fireplace = 5,
    Cozy = 6,
    Forest = 7,
    #[strum(serialize = "Pastel Colors")]
    PastelColors = 8,
    #[strum(serialize = "Wake up")]
    WakeUp = 9,
    Bedtime = 10,
    #[strum(serialize = "Warm White")]
    WarmWhite = 11,
    Daylight = 12,
    #[strum(serialize = "Cool white")]
    CoolWhite = 13,
    #[strum(serialize = "Night light")]
    NightLight = 14,
    Focus = 15,
    Relax = 16,
    #[strum(serialize = "True colors")]
    TrueColors = 17,
    #[strum(serialize = "TV time")]
    TvTime = 18,
    Plantgrowth = 19,
    Spring = 20,
    Summer = 21,
    Fall = 22,
    Deepdive = 23,
    Jungle = 24,
    Mojito = 25,
    Club = 26,
    Christmas = 27,
    Halloween = 28,
    Candlelight = 29,
    #[strum(serialize = "Golden white")]
    GoldenWhite = 30,
    Pulse = 31,
    Steampunk = 32,
    Diwali = 33,
    White = 34,
    Alarm = 35,
    #[strum(serialize = "Snowy sky")]
    SnowySky = 36,
    Rhythm = 1000,
}

impl SceneMode {
    pub fn id(&self) -> u16 {
        *self as u16
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// A catalog entry as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scene {
    pub id: u16,
    pub name: &'static str,
}

impl From<SceneMode> for Scene {
    fn from(mode: SceneMode) -> Self {
        Scene {
            id: mode.id(),
            name: mode.name(),
        }
    }
}

struct SceneCatalog {
    scenes: Vec<Scene>,
    by_name: HashMap<&'static str, u16>,
}

impl SceneCatalog {
    fn load() -> Self {
        let scenes: Vec<Scene> = SceneMode::iter().map(Scene::from).collect();
        let by_name = scenes.iter().map(|s| (s.name, s.id)).collect();
        SceneCatalog { scenes, by_name }
    }
}

static CATALOG: LazyLock<SceneCatalog> = LazyLock::new(SceneCatalog::load);

/// All scenes, ordered by id.
pub fn list_scenes() -> &'static [Scene] {
    &CATALOG.scenes
}

/// Look up a scene by the id a bulb reports.
///
/// # Examples
///
/// ```
/// use wizlights_mcp::scenes;
///
/// assert_eq!(scenes::scene_by_id(3).unwrap().name, "Sunset");
/// assert!(scenes::scene_by_id(0).is_none());
/// ```
pub fn scene_by_id(id: i64) -> Option<Scene> {
    CATALOG.scenes.iter().find(|s| i64::from(s.id) == id).copied()
}

/// Resolve a display name to its scene id. Names match exactly.
///
/// # Examples
///
/// ```
/// use wizlights_mcp::scenes;
///
/// assert_eq!(scenes::id_by_name("Pastel Colors"), Some(8));
/// assert_eq!(scenes::id_by_name("pastel colors"), None);
/// ```
pub fn id_by_name(name: &str) -> Option<u16> {
    CATALOG.by_name.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_is_ordered_by_id() {
        let scenes = list_scenes();
        assert_eq!(scenes.len(), 37);
        assert_eq!(scenes.first().unwrap(), &Scene { id: 1, name: "Ocean" });
        assert_eq!(scenes.last().unwrap(), &Scene { id: 1000, name: "Rhythm" });
        assert!(scenes.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_name_and_id_lookups_agree() {
        for scene in list_scenes() {
            assert_eq!(id_by_name(scene.name), Some(scene.id));
            assert_eq!(scene_by_id(i64::from(scene.id)), Some(*scene));
        }
    }

    #[test]
    fn test_unknown_lookups() {
        assert_eq!(id_by_name("unknown-scene-xyz"), None);
        assert_eq!(id_by_name(""), None);
        assert!(scene_by_id(37).is_none());
        assert!(scene_by_id(-1).is_none());
        assert!(scene_by_id(i64::MAX).is_none());
    }

    #[test]
    fn test_scene_serializes_id_and_name() {
        let value = serde_json::to_value(Scene::from(SceneMode::TvTime)).unwrap();
        assert_eq!(value, serde_json::json!({"id": 18, "name": "TV time"}));
    }
}
