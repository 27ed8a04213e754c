/// A language the translation provider is known to handle well
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub native: &'static str,
}

pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language { code: "ar", name: "Arabic", native: "العربية" },
    Language { code: "bn", name: "Bengali", native: "বাংলা" },
    Language { code: "zh", name: "Chinese (Simplified)", native: "简体中文" },
    Language { code: "zh-TW", name: "Chinese (Traditional)", native: "繁體中文" },
    Language { code: "nl", name: "Dutch", native: "Nederlands" },
    Language { code: "en", name: "English", native: "English" },
    Language { code: "fr", name: "French", native: "Français" },
    Language { code: "de", name: "German", native: "Deutsch" },
    Language { code: "hi", name: "Hindi", native: "हिन्दी" },
    Language { code: "it", name: "Italian", native: "Italiano" },
    Language { code: "ja", name: "Japanese", native: "日本語" },
    Language { code: "ko", name: "Korean", native: "한국어" },
    Language { code: "pt", name: "Portuguese", native: "Português" },
    Language { code: "pt-BR", name: "Portuguese (Brazil)", native: "Português (Brasil)" },
    Language { code: "ru", name: "Russian", native: "Русский" },
    Language { code: "es", name: "Spanish", native: "Español" },
    Language { code: "tr", name: "Turkish", native: "Türkçe" },
    Language { code: "vi", name: "Vietnamese", native: "Tiếng Việt" },
    Language { code: "fa", name: "Persian", native: "فارسی" },
    Language { code: "km", name: "Khmer", native: "ខ្មែរ" },
    Language { code: "kn", name: "Kannada", native: "ಕನ್ನಡ" },
    Language { code: "my", name: "Myanmar", native: "မြန်မာ" },
    Language { code: "pl", name: "Polish", native: "Polski" },
    Language { code: "sw", name: "Swahili", native: "Kiswahili" },
    Language { code: "te", name: "Telugu", native: "తెలుగు" },
    Language { code: "ur", name: "Urdu", native: "اردو" },
];

/// Look up a code, accepting the Android region form (`pt-rBR` for `pt-BR`)
pub fn find(code: &str) -> Option<&'static Language> {
    let normalized = android_to_bcp47(code);
    SUPPORTED_LANGUAGES
        .iter()
        .find(|lang| lang.code.eq_ignore_ascii_case(&normalized))
}

/// English display name, falling back to the language part, then the code
/// upper-cased
pub fn display_name(code: &str) -> String {
    if let Some(lang) = find(code) {
        return lang.name.to_string();
    }
    let language = code.split('-').next().unwrap_or(code);
    match find(language) {
        Some(lang) => format!("{} ({})", lang.name, region_of(code).unwrap_or(code)),
        None => code.to_uppercase(),
    }
}

fn android_to_bcp47(code: &str) -> String {
    match code.split_once("-r") {
        Some((lang, region)) if region.len() == 2 => format!("{}-{}", lang, region),
        _ => code.to_string(),
    }
}

fn region_of(code: &str) -> Option<&str> {
    let (_, region) = code.split_once('-')?;
    Some(region.strip_prefix('r').filter(|r| r.len() == 2).unwrap_or(region))
}
