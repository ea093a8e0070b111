//! Datos y apps de prueba.

use std::sync::Arc;

use folio_cache::{CacheStore, DataFacade, FacadeConfig};
use folio_core::AdminPolicy;
use folio_server::{AppState, ContentService, create_router};
use folio_store::{ConnectionState, MemoryStore, RemoteStore};
use serde_json::{Value, json};

use super::client::TestClient;

pub const ADMIN_EMAIL: &str = "admin@studio.dev";
pub const GUEST_EMAIL: &str = "guest@studio.dev";

/// Arbol del store con un sitio de ejemplo.
pub fn sample_site() -> Value {
    json!({
        "website": {
            "hero": {"title": "Folio", "cta": "Start Your Journey"},
            "about": {"headline": "Small studio, big launches"},
            "courses": [
                {"id": "c1", "title": "Rust Basics", "description": "Ownership",
                 "category": "Programming", "provider": "Folio Academy",
                 "duration": "4 weeks", "order": 2},
                {"id": "c2", "title": "Figma Pro", "description": "Design systems",
                 "category": "Design", "provider": "Udemy",
                 "duration": "2 weeks", "order": 1},
                {"id": "c3", "title": "Draft Course", "description": "WIP",
                 "category": "Programming", "provider": "Folio Academy",
                 "duration": "1 week", "order": 3, "status": "draft"}
            ],
            "projects": [
                {"id": "p1", "title": "Artisan Cafe", "description": "Ordering site",
                 "url": "https://cafe.example", "category": "Restaurant",
                 "technologies": ["React"], "featured": true, "order": 1},
                {"id": "p2", "title": "Lawyer Hub", "description": "Booking",
                 "url": "https://law.example", "category": "Legal",
                 "technologies": ["Rust"], "order": 2}
            ],
            "services": [
                {"id": 1, "title": "Web Design & Development", "description": "Sites",
                 "icon": "Code", "features": ["Responsive Design"], "order": 1},
                {"id": "s9", "title": "Brand Strategy", "description": "Identity",
                 "icon": "Star", "features": ["Workshops"], "order": 2}
            ],
            "team": [
                {"id": "t1", "name": "Ana", "role": "Founder", "description": "Design lead", "order": 1},
                {"id": "t2", "name": "Old Member", "role": "Dev", "description": "Gone",
                 "order": 2, "status": "inactive"}
            ],
            "process": [
                {"id": "st1", "step": 1, "title": "Discover", "description": "Workshop"}
            ],
            "packages": [
                {"id": "pk1", "name": "Starter", "price": "$999", "description": "Landing page",
                 "features": ["1 page"]}
            ]
        }
    })
}

/// App de prueba: router, store en memoria y facade compartidos.
pub struct TestApp {
    pub client: TestClient,
    pub store: MemoryStore,
    pub facade: DataFacade,
}

impl TestApp {
    pub fn admin(&self) -> TestClient {
        self.client.as_caller(ADMIN_EMAIL)
    }

    pub fn guest(&self) -> TestClient {
        self.client.as_caller(GUEST_EMAIL)
    }
}

pub fn app() -> TestApp {
    app_with(sample_site())
}

pub fn app_with(root: Value) -> TestApp {
    let store = MemoryStore::with_root("memory", root);
    let remote: Arc<dyn RemoteStore> = Arc::new(store.clone());

    let config = FacadeConfig::default();
    let cache = CacheStore::with_default_ttl(config.default_ttl);
    let facade = DataFacade::new(remote, cache, config);

    let content = ContentService::new(facade.clone(), AdminPolicy::new([ADMIN_EMAIL]));
    let state = AppState::new(content, Arc::new(ConnectionState::new()));

    TestApp {
        client: TestClient::new(create_router(state)),
        store,
        facade,
    }
}
