//! Cache invalidation with pattern matching support.

use crate::keys::{STORE_KEY_PREFIX, path_from_store_key};
use crate::store::CacheStore;
use folio_core::StorePath;
use glob::Pattern;
use serde::Serialize;
use tracing::{debug, info};

/// Resultado de una operación de invalidación.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvalidationResult {
    /// Número de entries invalidadas.
    pub count: usize,
    /// Patrones aplicados.
    pub patterns: Vec<String>,
}

impl<V, E> CacheStore<V, E> {
    /// Invalida entradas usando un patrón glob sobre la key.
    ///
    /// - `*`: coincide con cualquier secuencia de caracteres
    /// - `?`: coincide con un carácter
    ///
    /// Un patrón inválido no invalida nada.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_cache::CacheStore;
    ///
    /// let cache: CacheStore<String, String> = CacheStore::new();
    /// cache.set("store_website/courses", "[]".to_string(), None);
    /// cache.set("store_contacts", "{}".to_string(), None);
    ///
    /// let result = cache.invalidate_by_pattern("store_website*");
    /// assert_eq!(result.count, 1);
    /// ```
    pub fn invalidate_by_pattern(&self, pattern_str: &str) -> InvalidationResult {
        let pattern = match Pattern::new(pattern_str) {
            Ok(p) => p,
            Err(e) => {
                debug!(pattern = %pattern_str, error = %e, "Invalid glob pattern");
                return InvalidationResult {
                    count: 0,
                    patterns: vec![pattern_str.to_string()],
                };
            },
        };

        let count = self.delete_where(|key| pattern.matches(key));

        info!(
            pattern = %pattern_str,
            count = count,
            "Cache entries invalidated by pattern"
        );

        InvalidationResult {
            count,
            patterns: vec![pattern_str.to_string()],
        }
    }

    /// Invalida múltiples patrones a la vez.
    pub fn invalidate_by_patterns(&self, patterns: &[&str]) -> InvalidationResult {
        let mut total_count = 0;
        let mut all_patterns = Vec::new();

        for pattern_str in patterns {
            let result = self.invalidate_by_pattern(pattern_str);
            total_count += result.count;
            all_patterns.extend(result.patterns);
        }

        InvalidationResult {
            count: total_count,
            patterns: all_patterns,
        }
    }

    /// Invalida las lecturas del store relacionadas con `path`.
    ///
    /// Una escritura en `website/courses` cambia lo que devuelve una
    /// lectura de `website` y de `website/courses/3`, así que se borran
    /// el path, sus ancestros y sus descendientes.
    pub fn invalidate_related(&self, path: &StorePath) -> InvalidationResult {
        let count = self.delete_where(|key| {
            path_from_store_key(key).is_some_and(|cached| cached.relates_to(path))
        });

        debug!(path = %path, count = count, "Related store reads invalidated");

        InvalidationResult {
            count,
            patterns: vec![format!("{STORE_KEY_PREFIX}_{path}")],
        }
    }
}
