use anyhow::Result;
use serde_json::json;

use crate::languages::SUPPORTED_LANGUAGES;

pub fn run(json_output: bool) -> Result<()> {
    if json_output {
        let list: Vec<_> = SUPPORTED_LANGUAGES
            .iter()
            .map(|l| json!({ "code": l.code, "name": l.name, "nativeName": l.native }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!("=== strings-translator languages ===\n");
    for lang in SUPPORTED_LANGUAGES {
        println!("  {:<6} {:<24} {}", lang.code, lang.name, lang.native);
    }
    println!("\n{} languages. Android region codes such as pt-rBR are accepted.", SUPPORTED_LANGUAGES.len());
    Ok(())
}
