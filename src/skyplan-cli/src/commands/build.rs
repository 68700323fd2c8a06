//! Planner URL command handlers (decode, encode, inspect)

use anyhow::{Context, Result};
use skyplan::codec::layout;
use skyplan::{BuildPlanner, BuildState, Imported, UrlParams, Warning};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Decode a planner URL and print the build
pub fn decode(planner: &BuildPlanner, url: &str, json: bool) -> Result<()> {
    let imported = planner
        .import_url(url)
        .context("Failed to decode planner URL")?;

    if json {
        let output =
            serde_json::to_string_pretty(&imported).context("Failed to serialize build")?;
        println!("{}", output);
        return Ok(());
    }

    print!("{}", format_imported(&imported));
    print_warnings(&imported.warnings);
    Ok(())
}

/// Encode a build JSON file as a planner URL
pub fn encode(
    planner: &BuildPlanner,
    build_path: &Path,
    perk_list: &str,
    mechanics: &str,
) -> Result<()> {
    let build = read_build(build_path)?;
    let exported = planner
        .export_url(&build, perk_list, mechanics)
        .context("Failed to encode build")?;

    println!("{}", exported.url);
    print_warnings(&exported.warnings);
    Ok(())
}

/// Print a hex dump and the per-field breakdown of a build code
pub fn inspect(url: &str) -> Result<()> {
    let params = UrlParams::parse(url).context("Failed to read build code")?;
    let code = &params.build_code;

    println!("Bytes:  {}", code.len());
    println!("Hex:    {}", code.hex_dump());
    if let Some(preset) = &params.preset {
        println!("Preset: {}", preset);
    }
    println!();

    for field in code.fields() {
        let bytes: Vec<String> = field.bytes.iter().map(|b| format!("{:02x}", b)).collect();
        let value = if field.bytes.is_empty() {
            "(missing)".to_string()
        } else {
            bytes.join(" ")
        };
        println!("  [{:>2}] {:<26} {}", field.offset, field.name, value);
    }

    let set: Vec<String> = set_bits(code.perk_bytes())
        .map(|index| index.to_string())
        .collect();
    if !set.is_empty() {
        println!();
        println!("Perk bits set: {}", set.join(", "));
    }

    if code.len() < layout::HEADER_LEN {
        println!();
        println!(
            "Warning: header is {} bytes, expected {}",
            code.len(),
            layout::HEADER_LEN
        );
    }
    Ok(())
}

/// Indexes of set bits, MSB of the first byte is index 0
fn set_bits(bytes: &[u8]) -> impl Iterator<Item = usize> + '_ {
    bytes.iter().enumerate().flat_map(|(i, &byte)| {
        (0..8usize)
            .filter(move |bit| byte & (0x80u8 >> bit) != 0)
            .map(move |bit| i * 8 + bit)
    })
}

fn read_build(path: &Path) -> Result<BuildState> {
    let contents = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read build from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read build from {}", path.display()))?
    };

    serde_json::from_str(&contents).context("Failed to parse build JSON")
}

fn format_imported(imported: &Imported) -> String {
    let build = &imported.build;
    let attributes = &build.attribute_assignments;
    let mut out = String::new();

    out.push_str(&format!("Perk list:      {}\n", imported.perk_list));
    out.push_str(&format!("Game mechanics: {}\n", imported.game_mechanics));
    if let Some(preset) = &imported.preset {
        out.push_str(&format!("Preset:         {}\n", preset));
    }
    out.push('\n');

    let or_unknown = |v: &Option<String>| v.clone().unwrap_or_else(|| "(unknown)".to_string());
    out.push_str(&format!("Race:           {}\n", or_unknown(&build.race)));
    out.push_str(&format!("Standing stone: {}\n", or_unknown(&build.standing_stone)));
    out.push_str(&format!("Blessing:       {}\n", or_unknown(&build.blessing)));
    out.push_str(&format!("Level:          {}\n", attributes.level));
    out.push_str(&format!(
        "Health/Magicka/Stamina: {}/{}/{}\n",
        attributes.health, attributes.magicka, attributes.stamina
    ));

    if let Some(skills) = &build.skill_levels {
        let trained: Vec<String> = skills
            .iter()
            .filter(|&(_, &level)| level > 0)
            .map(|(skill, level)| format!("{} {}", skill, level))
            .collect();
        if !trained.is_empty() {
            out.push_str(&format!("\nSkills: {}\n", trained.join(", ")));
        }
    }

    if let Some(perks) = &build.perks {
        if !perks.selected.is_empty() {
            out.push_str("\nPerks:\n");
            for (skill, names) in &perks.selected {
                out.push_str(&format!("  {}: {}\n", skill, names.join(", ")));
            }
        }
    }
    out
}

fn print_warnings(warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }
    eprintln!();
    eprintln!("Warnings ({}):", warnings.len());
    for warning in warnings {
        eprintln!("  - {}", warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::open_planner;

    fn planner() -> BuildPlanner {
        let dir = format!("{}/../../share/data", env!("CARGO_MANIFEST_DIR"));
        open_planner(&dir, skyplan::DEFAULT_BASE_URL).unwrap()
    }

    #[test]
    fn test_read_build_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("build.json");
        fs::write(
            &path,
            r#"{"race":"Nord","attributeAssignments":{"health":3,"level":4}}"#,
        )
        .unwrap();

        let build = read_build(&path).unwrap();
        assert_eq!(build.race.as_deref(), Some("Nord"));
        assert_eq!(build.attribute_assignments.health, 3);
        assert_eq!(build.attribute_assignments.level, 4);
    }

    #[test]
    fn test_read_build_rejects_bad_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("build.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(read_build(&path).is_err());
        assert!(read_build(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_format_imported() {
        let planner = planner();
        let build: BuildState = serde_json::from_str(
            r#"{
                "race": "Nord",
                "attributeAssignments": {"health": 5, "magicka": 0, "stamina": 2, "level": 8},
                "skillLevels": {"Smithing": 30},
                "perks": {"selected": {"Smithing": ["Craftsmanship"]}}
            }"#,
        )
        .unwrap();
        let url = planner
            .export_url(&build, "LoreRim v3.0.4", "LoreRim")
            .unwrap()
            .url;

        let text = format_imported(&planner.import_url(&url).unwrap());
        assert!(text.contains("Perk list:      LoreRim v3.0.4"));
        assert!(text.contains("Race:           Nord"));
        assert!(text.contains("Health/Magicka/Stamina: 5/0/2"));
        assert!(text.contains("Skills: Smithing 30"));
        assert!(text.contains("  Smithing: Craftsmanship"));
    }

    #[test]
    fn test_set_bits() {
        let bits: Vec<usize> = set_bits(&[0b1000_0001, 0, 0b0100_0000]).collect();
        assert_eq!(bits, vec![0, 7, 17]);
    }

    #[test]
    fn test_inspect_accepts_short_code() {
        assert!(inspect("?b=AgE").is_ok());
        assert!(inspect("https://planner.example/").is_err());
    }
}
