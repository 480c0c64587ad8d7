#![allow(dead_code)]

use serde_json::{Map, Value, json};

pub const MULT_KEYS: [&str; 30] = [
    "hacking_chance",
    "hacking_speed",
    "hacking_money",
    "hacking_grow",
    "hacking",
    "hacking_exp",
    "strength",
    "strength_exp",
    "defense",
    "defense_exp",
    "dexterity",
    "dexterity_exp",
    "agility",
    "agility_exp",
    "charisma",
    "charisma_exp",
    "hacknet_node_money",
    "hacknet_node_purchase_cost",
    "hacknet_node_ram_cost",
    "hacknet_node_core_cost",
    "hacknet_node_level_cost",
    "company_rep",
    "faction_rep",
    "work_money",
    "crime_success",
    "crime_money",
    "bladeburner_max_stamina",
    "bladeburner_stamina_gain",
    "bladeburner_analysis",
    "bladeburner_success_chance",
];

fn skills(values: [f64; 7]) -> Value {
    let keys = [
        "hacking",
        "strength",
        "defense",
        "dexterity",
        "agility",
        "charisma",
        "intelligence",
    ];
    Value::Object(
        keys.iter()
            .zip(values)
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect(),
    )
}

pub fn default_player_data() -> Map<String, Value> {
    let mults: Map<String, Value> = MULT_KEYS.iter().map(|k| (k.to_string(), json!(1))).collect();
    let value = json!({
        "hp": { "current": 10, "max": 10 },
        "skills": skills([10.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0]),
        "exp": skills([1000.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        "mults": mults,
        "augmentations": [],
        "queuedAugmentations": [],
        "sourceFiles": { "ctor": "JSONMap", "data": [] },
        "bitNodeN": 1,
        "karma": -3.5,
        "city": "Sector-12",
        "exploits": [],
        "jobs": { "Joe's Guns": "Employee" },
        "factions": ["CyberSec"],
        "factionInvitations": [],
        "purchasedServers": ["pserv-0"],
        "money": 1000,
        "lastUpdate": 1700000000000u64,
        "totalPlaytime": 123456
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

pub fn servers_value() -> Value {
    json!({
        "home": {
            "ctor": "Server",
            "data": {
                "hostname": "home",
                "ip": "1.1.1.1",
                "maxRam": 8,
                "ramUsed": 1.6,
                "purchasedByPlayer": true,
                "hasAdminRights": true,
                "scripts": []
            }
        },
        "n00dles": {
            "ctor": "Server",
            "data": {
                "hostname": "n00dles",
                "maxRam": 4,
                "purchasedByPlayer": false,
                "hasAdminRights": false,
                "moneyMax": 1750000
            }
        }
    })
}

pub fn companies_value() -> Value {
    json!({
        "Joe's Guns": {
            "ctor": "Company",
            "data": { "name": "Joe's Guns", "playerReputation": 1250.5, "favor": 0 }
        }
    })
}

pub fn factions_value() -> Value {
    json!({
        "CyberSec": {
            "ctor": "Faction",
            "data": {
                "name": "CyberSec",
                "playerReputation": 3000,
                "favor": 1,
                "isMember": true,
                "isBanned": false,
                "alreadyInvited": true
            }
        }
    })
}

/// Builds save envelopes shaped like real exports. Section strings are
/// kept as given so tests can check byte-for-byte reuse.
#[derive(Debug)]
pub struct SaveBuilder {
    player: Map<String, Value>,
    sections: Vec<(String, String)>,
}

impl Default for SaveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            player: default_player_data(),
            sections: Vec::new(),
        };
        // Pretty-printed so a re-stringified section is distinguishable.
        builder.sections = vec![
            ("PlayerSave".into(), String::new()),
            ("AllServersSave".into(), servers_value().to_string()),
            (
                "CompaniesSave".into(),
                serde_json::to_string_pretty(&companies_value()).unwrap(),
            ),
            ("FactionsSave".into(), factions_value().to_string()),
            ("AliasesSave".into(), String::new()),
            ("GlobalAliasesSave".into(), String::new()),
            ("StockMarketSave".into(), String::new()),
            (
                "SettingsSave".into(),
                json!({ "MaxLogCapacity": 50, "SuppressMessages": false, "theme": { "primary": "#0c0" } })
                    .to_string(),
            ),
            ("VersionSave".into(), "41".into()),
            ("AllGangsSave".into(), String::new()),
            ("LastExportBonus".into(), "1700000000000".into()),
            ("StaneksGiftSave".into(), String::new()),
            ("GoSave".into(), String::new()),
        ];
        builder
    }

    pub fn player(mut self, edit: impl FnOnce(&mut Map<String, Value>)) -> Self {
        edit(&mut self.player);
        self
    }

    pub fn section(mut self, key: &str, text: impl Into<String>) -> Self {
        let text = text.into();
        match self.sections.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = text,
            None => self.sections.push((key.to_string(), text)),
        }
        self
    }

    pub fn without(mut self, key: &str) -> Self {
        self.sections.retain(|(k, _)| k != key);
        self
    }

    pub fn player_section(&self) -> String {
        json!({ "ctor": "PlayerObject", "data": Value::Object(self.player.clone()) }).to_string()
    }

    pub fn build(&self) -> String {
        let mut data = Map::new();
        for (key, text) in &self.sections {
            let text = if key == "PlayerSave" && text.is_empty() {
                self.player_section()
            } else {
                text.clone()
            };
            data.insert(key.clone(), Value::String(text));
        }
        json!({ "ctor": "BitburnerSaveObject", "data": Value::Object(data) }).to_string()
    }
}

pub fn augmentations(list: &[(&str, u32)]) -> Value {
    Value::Array(
        list.iter()
            .map(|(name, level)| json!({ "name": name, "level": level }))
            .collect(),
    )
}

pub fn source_files(list: &[(u32, u32)]) -> Value {
    json!({
        "ctor": "JSONMap",
        "data": list.iter().map(|(id, lvl)| json!([id, lvl])).collect::<Vec<_>>()
    })
}

pub fn set_skill(player: &mut Map<String, Value>, group: &str, skill: &str, value: f64) {
    player[group][skill] = json!(value);
}

/// Raw section strings of an exported envelope.
pub fn sections_of(envelope: &str) -> Map<String, Value> {
    let value: Value = serde_json::from_str(envelope).unwrap();
    value["data"].as_object().unwrap().clone()
}
