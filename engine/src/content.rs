use std::collections::HashMap;

pub fn builtin_databases() -> HashMap<&'static str, &'static str> {
    HashMap::from([("default", include_str!("../content/databases/default.json"))])
}

pub fn builtin_scenarios() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        (
            "slime_attack",
            include_str!("../content/scenarios/slime_attack.json"),
        ),
        (
            "fire_reflect",
            include_str!("../content/scenarios/fire_reflect.json"),
        ),
        (
            "phoenix_revive",
            include_str!("../content/scenarios/phoenix_revive.json"),
        ),
        (
            "bomb_blast",
            include_str!("../content/scenarios/bomb_blast.json"),
        ),
        (
            "double_slash",
            include_str!("../content/scenarios/double_slash.json"),
        ),
    ])
}
