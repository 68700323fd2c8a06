//! URL slugs for perk lists, game mechanics and presets
//!
//! Deep links use kebab-case slugs (`lorerim-v3-0-4`). These tables are for
//! the UI only and have nothing to do with the numeric build-code ids.

use phf::phf_map;

/// Which display-name family a slug belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlugKind {
    PerkList,
    GameMechanics,
    Preset,
}

static PERK_LIST_SLUGS: phf::Map<&'static str, &'static str> = phf_map! {
    "vanilla" => "Vanilla",
    "lorerim-v3-0-4" => "LoreRim v3.0.4",
    "lorerim-v3-0-3" => "LoreRim v3.0.3",
};

static GAME_MECHANICS_SLUGS: phf::Map<&'static str, &'static str> = phf_map! {
    "vanilla" => "Vanilla",
    "lorerim" => "LoreRim",
};

static PRESET_SLUGS: phf::Map<&'static str, &'static str> = phf_map! {
    "vanilla" => "Vanilla",
    "lorerim-v3-0-4" => "LoreRim v3.0.4",
};

/// Display name from the built-in slug tables
pub fn static_display_name(kind: SlugKind, slug: &str) -> Option<&'static str> {
    let table = match kind {
        SlugKind::PerkList => &PERK_LIST_SLUGS,
        SlugKind::GameMechanics => &GAME_MECHANICS_SLUGS,
        SlugKind::Preset => &PRESET_SLUGS,
    };
    table.get(slug).copied()
}

/// Kebab-case slug for a display name
///
/// `"LoreRim v3.0.4"` → `"lorerim-v3-0-4"`
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("LoreRim v3.0.4"), "lorerim-v3-0-4");
        assert_eq!(slugify("Vanilla"), "vanilla");
        assert_eq!(slugify("  Two -- Words  "), "two-words");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_static_tables_agree_with_slugify() {
        for (kind, table) in [
            (SlugKind::PerkList, &PERK_LIST_SLUGS),
            (SlugKind::GameMechanics, &GAME_MECHANICS_SLUGS),
            (SlugKind::Preset, &PRESET_SLUGS),
        ] {
            for (slug, name) in table.entries() {
                assert_eq!(slugify(name), *slug);
                assert_eq!(static_display_name(kind, slug), Some(*name));
            }
        }
    }

    #[test]
    fn test_unknown_slug() {
        assert_eq!(static_display_name(SlugKind::Preset, "requiem"), None);
    }
}
