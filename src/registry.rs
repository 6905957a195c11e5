//! Model registry: fixed entity set, canonical names, and storage table specs.
//! Built once at startup and never mutated afterward.

use std::collections::HashMap;

/// Every entity this service manages. Closed set, fixed at compile time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Course,
    Order,
    Payment,
    Portfolio,
    Job,
    Movie,
    NewsAndBlogs,
    Comment,
    Cart,
    StoredFile,
}

impl EntityKind {
    pub const ALL: [EntityKind; 11] = [
        EntityKind::User,
        EntityKind::Course,
        EntityKind::Order,
        EntityKind::Payment,
        EntityKind::Portfolio,
        EntityKind::Job,
        EntityKind::Movie,
        EntityKind::NewsAndBlogs,
        EntityKind::Comment,
        EntityKind::Cart,
        EntityKind::StoredFile,
    ];

    /// Authoritative spelling/casing for this entity, as clients send it.
    pub fn canonical(&self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Course => "Course",
            EntityKind::Order => "Order",
            EntityKind::Payment => "Payment",
            EntityKind::Portfolio => "Portfolio",
            EntityKind::Job => "Job",
            EntityKind::Movie => "Movie",
            EntityKind::NewsAndBlogs => "NewsAndBlogs",
            EntityKind::Comment => "Comment",
            EntityKind::Cart => "Cart",
            EntityKind::StoredFile => "StoredFile",
        }
    }

    /// Backing table name in PostgreSQL.
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Course => "courses",
            EntityKind::Order => "orders",
            EntityKind::Payment => "payments",
            EntityKind::Portfolio => "portfolios",
            EntityKind::Job => "jobs",
            EntityKind::Movie => "movies",
            EntityKind::NewsAndBlogs => "news_and_blogs",
            EntityKind::Comment => "comments",
            EntityKind::Cart => "carts",
            EntityKind::StoredFile => "stored_files",
        }
    }
}

/// One registry entry: the canonical name plus the storage handle for it.
#[derive(Clone, Debug)]
pub struct TableSpec {
    pub kind: EntityKind,
    pub canonical: &'static str,
    pub table_name: &'static str,
}

/// Known historical renames and plural/singular drift. Clients in the wild
/// still send these; they resolve to the canonical entry. Deliberately
/// incomplete: unlisted misspellings pass through and fail downstream.
const ALIASES: &[(&str, EntityKind)] = &[
    ("Users", EntityKind::User),
    ("Courses", EntityKind::Course),
    ("Orders", EntityKind::Order),
    ("Payments", EntityKind::Payment),
    ("Portfolios", EntityKind::Portfolio),
    ("Jobs", EntityKind::Job),
    ("Movies", EntityKind::Movie),
    ("NewsAndBlog", EntityKind::NewsAndBlogs),
    ("Comments", EntityKind::Comment),
    ("Carts", EntityKind::Cart),
    ("File", EntityKind::StoredFile),
    ("Files", EntityKind::StoredFile),
];

/// Immutable name -> model mapping. Constructed once, shared via `Arc`.
#[derive(Debug)]
pub struct ModelRegistry {
    by_canonical: HashMap<&'static str, TableSpec>,
    by_lower: HashMap<String, EntityKind>,
    aliases_lower: HashMap<String, EntityKind>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        let mut by_canonical = HashMap::new();
        let mut by_lower = HashMap::new();
        for kind in EntityKind::ALL {
            let spec = TableSpec {
                kind,
                canonical: kind.canonical(),
                table_name: kind.table_name(),
            };
            by_lower.insert(spec.canonical.to_ascii_lowercase(), kind);
            by_canonical.insert(spec.canonical, spec);
        }
        let aliases_lower = ALIASES
            .iter()
            .map(|(a, k)| (a.to_ascii_lowercase(), *k))
            .collect();
        ModelRegistry {
            by_canonical,
            by_lower,
            aliases_lower,
        }
    }

    /// Exact-match lookup. Pure read; a miss is not an error here, the
    /// dispatcher retries with normalization before surfacing failure.
    pub fn lookup(&self, name: &str) -> Option<&TableSpec> {
        self.by_canonical.get(name)
    }

    pub fn get(&self, kind: EntityKind) -> &TableSpec {
        // Every EntityKind is inserted in new(), so this cannot miss.
        &self.by_canonical[kind.canonical()]
    }

    /// Case-insensitive match against canonical names.
    pub fn lookup_ci(&self, name: &str) -> Option<&TableSpec> {
        let kind = self.by_lower.get(&name.to_ascii_lowercase())?;
        Some(self.get(*kind))
    }

    /// Alias-table match, case-insensitive.
    pub fn lookup_alias(&self, name: &str) -> Option<&TableSpec> {
        let kind = self.aliases_lower.get(&name.to_ascii_lowercase())?;
        Some(self.get(*kind))
    }

    pub fn specs(&self) -> impl Iterator<Item = &TableSpec> {
        self.by_canonical.values()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
