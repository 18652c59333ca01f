// src/common/i18n.rs

use std::{collections::HashMap, sync::Arc};

use anyhow::Context;

pub const DEFAULT_LANG: &str = "en";

// Catálogos embutidos no binário (chave -> mensagem)
const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

/// Mensagens traduzidas por idioma. Clonar é barato (Arc).
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: Arc<HashMap<String, HashMap<String, String>>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();

        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Catálogo de mensagens '{}' inválido", lang))?;
            catalogs.insert(lang.to_string(), messages);
        }

        Ok(Self { catalogs: Arc::new(catalogs) })
    }

    /// Busca a mensagem no idioma pedido, cai para o inglês e, por fim, para a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key)
            .to_string()
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.catalogs
            .get(lang)
            .and_then(|messages| messages.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_known_key_in_requested_language() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("pt", "error.review_not_found"), "Avaliação não encontrada.");
        assert_eq!(store.translate("en", "error.review_not_found"), "Review not found.");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("de", "error.self_vote"), "You cannot vote on your own review.");
    }

    #[test]
    fn unknown_key_falls_back_to_key() {
        let store = I18nStore::load().unwrap();
        assert_eq!(store.translate("en", "error.does_not_exist"), "error.does_not_exist");
    }

    #[test]
    fn every_catalog_has_the_same_keys() {
        let store = I18nStore::load().unwrap();
        let en = &store.catalogs["en"];
        let pt = &store.catalogs["pt"];
        for key in en.keys() {
            assert!(pt.contains_key(key), "chave '{}' ausente em pt", key);
        }
        assert_eq!(en.len(), pt.len());
    }
}
