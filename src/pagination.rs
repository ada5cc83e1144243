use crud_lab_api::Pagination;
use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: i64 = 5;
pub const MAX_PAGE_SIZE: i64 = 100;
/// En dessous de ce nombre de lignes, tout est renvoyé sans pagination
pub const PAGINATION_THRESHOLD: i64 = 5;

/// Paramètres `?page=&page_size=`, gardés bruts: une valeur non numérique n'est pas une erreur
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl PageQuery {
    /// Taille effective: défaut 5, bornée à [1, 100]
    pub fn page_size(&self) -> i64 {
        self.page_size
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map_or(DEFAULT_PAGE_SIZE, |size| size.clamp(1, MAX_PAGE_SIZE))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    All,
    Slice { offset: i64, limit: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    pub window: Window,
    pub pagination: Pagination,
}

/// Calcule la fenêtre à charger pour `total` lignes
pub fn plan(query: &PageQuery, total: i64) -> PagePlan {
    if total < PAGINATION_THRESHOLD {
        return PagePlan {
            window: Window::All,
            pagination: Pagination {
                enabled: false,
                page: None,
                page_size: None,
                total_items: total,
                total_pages: None,
                has_next: None,
                has_previous: None,
            },
        };
    }

    let page_size = query.page_size();
    let total_pages = (total + page_size - 1) / page_size;

    // Non entier -> 1, hors bornes -> dernière page
    let page = match query.page.as_deref().map(|raw| raw.trim().parse::<i64>()) {
        None | Some(Err(_)) => 1,
        Some(Ok(n)) if (1..=total_pages).contains(&n) => n,
        Some(Ok(_)) => total_pages,
    };

    PagePlan {
        window: Window::Slice {
            offset: (page - 1) * page_size,
            limit: page_size,
        },
        pagination: Pagination {
            enabled: true,
            page: Some(page),
            page_size: Some(page_size),
            total_items: total,
            total_pages: Some(total_pages),
            has_next: Some(page < total_pages),
            has_previous: Some(page > 1),
        },
    }
}
