use std::collections::HashMap;

use i18n_embed::DesktopLanguageRequester;
use unic_langid::{langid, LanguageIdentifier};

const FALLBACK: LanguageIdentifier = langid!("en-US");

// Simple in-memory translations
#[derive(Default)]
pub struct Translations {
    strings: HashMap<&'static str, &'static str>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: &'static str) {
        self.strings.insert(key, value);
    }

    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        self.strings.get(key).copied()
    }
}

pub struct Localizations {
    translations: HashMap<LanguageIdentifier, Translations>,
    current_lang: LanguageIdentifier,
}

impl Default for Localizations {
    fn default() -> Self {
        Self::new()
    }
}

impl Localizations {
    /// Picks the first desktop language we have strings for.
    pub fn new() -> Self {
        let requested = DesktopLanguageRequester::requested_languages();
        log::debug!("Requested languages: {:?}", requested);
        Self::for_languages(&requested)
    }

    pub fn for_languages(requested: &[LanguageIdentifier]) -> Self {
        let mut localizer = Self {
            translations: builtin(),
            current_lang: FALLBACK,
        };
        if let Some(lang) = requested.iter().find_map(|l| localizer.supported(l)) {
            localizer.current_lang = lang;
        }
        localizer
    }

    fn supported(&self, lang: &LanguageIdentifier) -> Option<LanguageIdentifier> {
        if self.translations.contains_key(lang) {
            return Some(lang.clone());
        }
        // Same language, any region
        self.translations
            .keys()
            .find(|known| known.language == lang.language)
            .cloned()
    }

    pub fn current(&self) -> &LanguageIdentifier {
        &self.current_lang
    }

    pub fn lookup(&self, key: &str) -> Option<String> {
        self.translations
            .get(&self.current_lang)
            .and_then(|t| t.lookup(key))
            .or_else(|| self.translations.get(&FALLBACK).and_then(|t| t.lookup(key)))
            .map(str::to_string)
    }

    /// Like `lookup`, but never empty: falls back to the key itself.
    pub fn text(&self, key: &str) -> String {
        self.lookup(key).unwrap_or_else(|| key.to_string())
    }
}

fn builtin() -> HashMap<LanguageIdentifier, Translations> {
    let mut translations = HashMap::new();

    // English translations
    let mut en = Translations::new();
    en.insert("app-title", "YouTube Video Downloader (MP4)");
    en.insert("url-label", "Video URL:");
    en.insert("url-placeholder", "Enter YouTube video URL here...");
    en.insert("quality-label", "Select Video Quality:");
    en.insert("folder-button", "Select Destination Folder");
    en.insert("folder-dialog-title", "Select Folder");
    en.insert("no-folder", "No folder selected");
    en.insert("download-button", "Download");
    en.insert("download-completed-button", "Download Completed");
    en.insert("status-downloading", "Downloading...");
    en.insert("dialog-error-title", "Error");
    en.insert("dialog-success-title", "Success");
    en.insert("download-success", "Download Completed!");
    en.insert("download-failed", "Download Failed:");
    en.insert("error-no-folder", "Please select a folder!");
    en.insert("error-no-url", "Please enter a video URL!");
    en.insert("error-folder-missing", "The selected folder no longer exists:");
    en.insert("error-busy", "A download is already running.");
    translations.insert(FALLBACK, en);

    // Spanish translations
    let mut es = Translations::new();
    es.insert("app-title", "Descargador de videos de YouTube (MP4)");
    es.insert("url-label", "URL del video:");
    es.insert("url-placeholder", "Ingrese aquí la URL del video de YouTube...");
    es.insert("quality-label", "Seleccione la calidad del video:");
    es.insert("folder-button", "Seleccionar carpeta de destino");
    es.insert("folder-dialog-title", "Seleccionar carpeta");
    es.insert("no-folder", "Ninguna carpeta seleccionada");
    es.insert("download-button", "Descargar");
    es.insert("download-completed-button", "Descarga completada");
    es.insert("status-downloading", "Descargando...");
    es.insert("dialog-error-title", "Error");
    es.insert("dialog-success-title", "Éxito");
    es.insert("download-success", "¡Descarga completada!");
    es.insert("download-failed", "La descarga falló:");
    es.insert("error-no-folder", "¡Seleccione una carpeta!");
    es.insert("error-no-url", "¡Ingrese la URL de un video!");
    es.insert("error-folder-missing", "La carpeta seleccionada ya no existe:");
    es.insert("error-busy", "Ya hay una descarga en curso.");
    translations.insert(langid!("es-ES"), es);

    translations
}
