//! Generates one validation unit per locale from the fixture descriptors

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use valgen::{generate, load_records, ValgenConfig};

const FIXTURES: &str = "fixtures/records.json";

fn main() {
    println!("cargo:rerun-if-changed={}", FIXTURES);

    let records = load_records(Path::new(FIXTURES)).expect("fixture descriptors load");
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    for locale in ["en", "fr"] {
        let mut config = ValgenConfig::default();
        config.generator.locale = locale.to_string();
        let unit = generate(&records, &config).expect("fixture descriptors generate");
        fs::write(out_dir.join(format!("records_{}.rs", locale)), unit.source).expect("write generated unit");
    }
}
