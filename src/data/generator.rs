// src/data/generator.rs
// Synthetic cell values for bulk seeding. The column name picks a flavour of text.

use super::model::ColumnType;
use rand::seq::IndexedRandom;
use rand::Rng;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Edsger", "Barbara", "Ken", "Dennis", "Margaret", "Linus", "Radia",
    "Frances", "John", "Donald", "Leslie", "Niklaus", "Hedy",
];
const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Dijkstra", "Liskov", "Thompson", "Ritchie", "Hamilton",
    "Torvalds", "Perlman", "Allen", "Backus", "Knuth", "Lamport", "Wirth", "Lamarr",
];
const WORDS: &[&str] = &[
    "alpha", "beacon", "cobalt", "delta", "ember", "fjord", "granite", "harbor", "iris", "juniper",
    "kestrel", "lumen", "meadow", "nimbus", "orbit", "prairie", "quartz", "ridge", "summit",
    "tundra", "umber", "vertex", "willow", "zephyr",
];
const CITIES: &[&str] = &[
    "Lisbon", "Osaka", "Nairobi", "Oslo", "Quito", "Perth", "Tallinn", "Hanoi", "Austin", "Porto",
];
const STATUSES: &[&str] = &["Todo", "In progress", "Blocked", "Done"];

/// Produces a plausible value for a cell of `column_type` in a column called `column_name`.
pub fn generate(column_type: ColumnType, column_name: &str) -> String {
    let mut rng = rand::rng();
    generate_with(&mut rng, column_type, column_name)
}

pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, column_type: ColumnType, column_name: &str) -> String {
    let name = column_name.to_lowercase();
    match column_type {
        ColumnType::Number => {
            if name.contains("price") || name.contains("amount") || name.contains("cost") {
                format!("{:.2}", rng.random_range(1.0..10_000.0))
            } else if name.contains("age") {
                rng.random_range(18..90).to_string()
            } else {
                rng.random_range(0..1_000).to_string()
            }
        }
        ColumnType::Text => {
            if name.contains("email") {
                let first = pick(rng, FIRST_NAMES).to_lowercase();
                let last = pick(rng, LAST_NAMES).to_lowercase();
                format!("{}.{}@example.com", first, last)
            } else if name.contains("name") || name.contains("owner") || name.contains("assignee") {
                format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
            } else if name.contains("city") || name.contains("location") {
                pick(rng, CITIES).to_string()
            } else if name.contains("status") {
                pick(rng, STATUSES).to_string()
            } else {
                let count = rng.random_range(3..9);
                let words: Vec<&str> = (0..count).map(|_| pick(rng, WORDS)).collect();
                capitalize(&words.join(" "))
            }
        }
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or("")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn number_columns_always_get_numbers() {
        let mut rng = StdRng::seed_from_u64(7);
        for name in ["Amount", "Age", "Score"] {
            for _ in 0..50 {
                let v = generate_with(&mut rng, ColumnType::Number, name);
                assert!(ColumnType::Number.accepts(&v), "{} produced {:?}", name, v);
                assert!(!v.is_empty());
            }
        }
    }

    #[test]
    fn column_name_selects_text_flavour() {
        let mut rng = StdRng::seed_from_u64(11);
        let email = generate_with(&mut rng, ColumnType::Text, "Contact Email");
        assert!(email.ends_with("@example.com"));
        let name = generate_with(&mut rng, ColumnType::Text, "Name");
        assert_eq!(name.split(' ').count(), 2);
        let notes = generate_with(&mut rng, ColumnType::Text, "Notes");
        assert!(notes.split(' ').count() >= 3);
        assert!(notes.chars().next().map_or(false, |c| c.is_uppercase()));
    }
}
