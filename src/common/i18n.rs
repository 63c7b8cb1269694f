// src/common/i18n.rs

use std::{collections::HashMap, sync::{Arc, OnceLock}};

pub const DEFAULT_LANG: &str = "en";

// Catálogos embutidos no binário: (idioma, conteúdo JSON)
const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("uz", include_str!("../../locales/uz.json")),
];

/// Mensagens traduzidas por idioma e chave.
#[derive(Clone, Debug)]
pub struct I18nStore {
    messages: Arc<HashMap<String, HashMap<String, String>>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut messages = HashMap::new();
        for (lang, raw) in CATALOGS {
            let catalog: HashMap<String, String> = serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("Catálogo '{}' inválido: {}", lang, e))?;
            messages.insert(lang.to_string(), catalog);
        }
        Ok(Self { messages: Arc::new(messages) })
    }

    /// Instância compartilhada, usada fora dos handlers (ex: middleware).
    pub fn global() -> &'static I18nStore {
        static STORE: OnceLock<I18nStore> = OnceLock::new();
        STORE.get_or_init(|| {
            I18nStore::load().unwrap_or_else(|e| {
                tracing::error!("🔥 Falha ao carregar traduções: {}", e);
                I18nStore { messages: Arc::new(HashMap::new()) }
            })
        })
    }

    // idioma pedido -> inglês -> a própria chave
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key)
            .to_string()
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.messages
            .get(lang)
            .and_then(|catalog| catalog.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogs_have_the_same_keys() {
        let store = I18nStore::load().unwrap();
        let en = &store.messages["en"];
        let uz = &store.messages["uz"];
        let mut missing: Vec<_> = en.keys().filter(|k| !uz.contains_key(*k)).collect();
        missing.sort();
        assert!(missing.is_empty(), "faltando em uz: {:?}", missing);
    }

    #[test]
    fn falls_back_to_english_then_to_key() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("uz", "worker_not_found"), "Ishchi topilmadi");
        assert_eq!(store.translate("pt", "worker_not_found"), "Worker not found");
        assert_eq!(store.translate("en", "no_such_key"), "no_such_key");
    }
}
