use crate::core::types::{EfficiencyResult, Grade, TireSpec};

// Feature weights; must sum to 1.0.
const W_WIDTH: f64 = 0.04;
const W_WEIGHT: f64 = 0.26;
const W_TREAD: f64 = 0.16;
const W_LOAD: f64 = 0.16;
const W_SPEED: f64 = 0.10;
const W_UTQG: f64 = 0.10;
const W_CATEGORY: f64 = 0.10;
const W_3PMS: f64 = 0.08;

/// Missing or unparsable fields contribute this instead of failing.
const NEUTRAL: f64 = 0.5;

/// Convert a tire's spec fields into a 0-100 score and letter grade.
/// Pure and total: any input yields a result.
pub fn calculate_efficiency(spec: &TireSpec) -> EfficiencyResult {
    let total = W_WIDTH * width_subscore(&spec.size)
        + W_WEIGHT * weight_subscore(spec.weight_lb)
        + W_TREAD * tread_subscore(&spec.tread_depth)
        + W_LOAD * load_range_subscore(&spec.load_range)
        + W_SPEED * speed_rating_subscore(&spec.speed_rating)
        + W_UTQG * utqg_subscore(&spec.utqg)
        + W_CATEGORY * category_subscore(&spec.category)
        + W_3PMS * three_pms_subscore(spec.three_pms);

    let score = (total * 100.0).round().clamp(0.0, 100.0) as u8;
    EfficiencyResult {
        score,
        grade: grade_for(score),
    }
}

pub fn grade_for(score: u8) -> Grade {
    match score {
        80.. => Grade::A,
        65.. => Grade::B,
        50.. => Grade::C,
        35.. => Grade::D,
        20.. => Grade::E,
        _ => Grade::F,
    }
}

/// Leading numeric run of a string: "275/60R20" -> 275, "620 A B" -> 620.
fn numeric_prefix(s: &str) -> f64 {
    let digits: String = s
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().unwrap_or(0.0)
}

fn width_subscore(size: &str) -> f64 {
    let width = numeric_prefix(size);
    if width <= 0.0 {
        NEUTRAL
    } else {
        (305.0 - width) / 30.0
    }
}

fn weight_subscore(weight_lb: f64) -> f64 {
    if weight_lb > 0.0 {
        (70.0 - weight_lb) / 40.0
    } else {
        NEUTRAL
    }
}

fn tread_subscore(tread: &str) -> f64 {
    let depth = numeric_prefix(tread);
    if depth <= 0.0 {
        NEUTRAL
    } else {
        (20.0 - depth) / 11.0
    }
}

fn load_range_subscore(code: &str) -> f64 {
    match code.trim().to_ascii_uppercase().as_str() {
        "SL" => 1.0,
        "HL" | "XL" => 0.9,
        "RF" => 0.7,
        "D" => 0.3,
        "E" | "F" => 0.0,
        _ => NEUTRAL,
    }
}

fn speed_rating_subscore(rating: &str) -> f64 {
    match rating.trim().chars().next() {
        Some(c) => match c.to_ascii_uppercase() {
            'P' => 1.0,
            'Q' => 0.95,
            'R' => 0.9,
            'S' => 0.85,
            'T' => 0.8,
            'H' => 0.7,
            'V' => 0.6,
            _ => NEUTRAL,
        },
        None => NEUTRAL,
    }
}

fn utqg_subscore(utqg: &str) -> f64 {
    let treadwear = numeric_prefix(utqg);
    if treadwear <= 0.0 {
        NEUTRAL
    } else {
        (treadwear - 420.0) / 400.0
    }
}

fn category_subscore(category: &str) -> f64 {
    let c = category.trim();
    if c.eq_ignore_ascii_case("All-Season")
        || c.eq_ignore_ascii_case("Performance")
        || c.eq_ignore_ascii_case("Highway")
    {
        1.0
    } else if c.eq_ignore_ascii_case("All-Terrain") {
        0.5
    } else if c.eq_ignore_ascii_case("Rugged Terrain") {
        0.25
    } else if c.eq_ignore_ascii_case("Mud-Terrain") || c.eq_ignore_ascii_case("Winter") {
        0.0
    } else {
        NEUTRAL
    }
}

// Snow certification trades efficiency for traction, so certified tires
// score 0 here. Unknown stays neutral.
fn three_pms_subscore(flag: Option<bool>) -> f64 {
    match flag {
        None => NEUTRAL,
        Some(false) => 1.0,
        Some(true) => 0.0,
    }
}
