//! WebAssembly bindings for skyplan
//!
//! The host fetches the six reference documents itself and hands them to
//! [`Planner`]; everything after that is synchronous.

use crate::character::BuildState;
use crate::mapper::SlugKind;
use crate::planner::BuildPlanner;
use crate::reference::{MemorySource, ReferencePaths, ReferenceRepository, Table};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialize failed: {}", e)))?;
    js_sys::JSON::parse(&json)
}

/// JavaScript-friendly build planner
#[wasm_bindgen]
pub struct Planner {
    inner: BuildPlanner,
}

#[wasm_bindgen]
impl Planner {
    /// Build a planner from the six reference documents (JSON text)
    #[wasm_bindgen(constructor)]
    pub fn new(
        races: &str,
        standing_stones: &str,
        blessings: &str,
        perk_lists: &str,
        game_mechanics: &str,
        presets: &str,
    ) -> Result<Planner, JsValue> {
        let paths = ReferencePaths::default();
        let documents = [
            (Table::Races, races),
            (Table::StandingStones, standing_stones),
            (Table::Blessings, blessings),
            (Table::PerkLists, perk_lists),
            (Table::GameMechanics, game_mechanics),
            (Table::Presets, presets),
        ];
        let mut source = MemorySource::new();
        for (table, document) in documents {
            source.insert(paths.path(table), document);
        }

        let data = ReferenceRepository::with_paths(source, paths)
            .load_sequential()
            .map_err(|e| JsValue::from_str(&format!("Load failed: {}", e)))?;
        Ok(Planner {
            inner: BuildPlanner::new(data),
        })
    }

    #[wasm_bindgen(getter, js_name = baseUrl)]
    pub fn base_url(&self) -> String {
        self.inner.base_url().to_string()
    }

    #[wasm_bindgen(js_name = setBaseUrl)]
    pub fn set_base_url(&mut self, base_url: &str) {
        self.inner.set_base_url(base_url);
    }

    /// Decode a planner URL; returns `{ build, character, perkList, gameMechanics, preset, warnings }`
    #[wasm_bindgen(js_name = importUrl)]
    pub fn import_url(&self, url: &str) -> Result<JsValue, JsValue> {
        let imported = self
            .inner
            .import_url(url)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&imported)
    }

    /// Encode a build (JSON text); returns `{ url, warnings }`
    #[wasm_bindgen(js_name = exportBuild)]
    pub fn export_build(
        &self,
        build_json: &str,
        perk_list: &str,
        game_mechanics: &str,
    ) -> Result<JsValue, JsValue> {
        let build: BuildState = serde_json::from_str(build_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid build: {}", e)))?;
        let exported = self
            .inner
            .export_url(&build, perk_list, game_mechanics)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&exported)
    }

    /// Display name for a deep-link slug (`perkList`, `gameMechanics` or `preset`)
    #[wasm_bindgen(js_name = slugToName)]
    pub fn slug_to_name(&self, kind: &str, slug: &str) -> Option<String> {
        let kind = match kind {
            "perkList" => SlugKind::PerkList,
            "gameMechanics" => SlugKind::GameMechanics,
            "preset" => SlugKind::Preset,
            _ => return None,
        };
        self.inner
            .mapper()
            .display_name_for_slug(kind, slug)
            .map(str::to_string)
    }

    /// Perk list names in table order
    #[wasm_bindgen(js_name = perkLists)]
    pub fn perk_lists(&self) -> Vec<String> {
        self.inner
            .data()
            .perk_lists
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }
}
