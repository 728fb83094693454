use tera::{Context, Tera};

use crate::client::{StatusView, FAILURE_MESSAGE, LOADING_MESSAGE};

pub const STATUS_TEMPLATE: &str = "status.html";

pub const PAGE_TITLE: &str = "Stand Capacity Planner";
pub const PAGE_DESCRIPTION: &str = "Plan and manage stand capacity efficiently";

/// Initialize the Tera template engine.
///
/// Templates are compiled into the binary so the status page works from any
/// working directory.
pub fn init_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(STATUS_TEMPLATE, include_str!("../templates/status.html"))?;
    Ok(tera)
}

/// Render the status page for one panel state
pub fn render_status_page(tera: &Tera, view: &StatusView) -> Result<String, tera::Error> {
    let mut context = Context::new();
    context.insert("title", PAGE_TITLE);
    context.insert("description", PAGE_DESCRIPTION);
    context.insert("state", view.name());

    match view {
        StatusView::Success(health) => context.insert("health", health),
        StatusView::Error => context.insert("message", FAILURE_MESSAGE),
        StatusView::Unchecked | StatusView::Loading => context.insert("message", LOADING_MESSAGE),
    }

    tera.render(STATUS_TEMPLATE, &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HealthStatus;

    #[test]
    fn test_render_success_shows_all_fields() {
        let tera = init_templates().unwrap();
        let view = StatusView::Success(HealthStatus {
            status: "ok".to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            database: "connected".to_string(),
        });
        let html = render_status_page(&tera, &view).unwrap();
        assert!(html.contains("<strong>API Status:</strong> ok"));
        assert!(html.contains("<strong>Database:</strong> connected"));
        assert!(html.contains("<strong>Timestamp:</strong> 2024-01-01T00:00:00Z"));
        assert!(!html.contains(FAILURE_MESSAGE));
    }

    #[test]
    fn test_render_error_shows_only_fixed_message() {
        let tera = init_templates().unwrap();
        let html = render_status_page(&tera, &StatusView::Error).unwrap();
        assert!(html.contains(FAILURE_MESSAGE));
        assert!(!html.contains("API Status:"));
        assert!(!html.contains("Timestamp:"));
    }

    #[test]
    fn test_render_loading() {
        let tera = init_templates().unwrap();
        let html = render_status_page(&tera, &StatusView::Loading).unwrap();
        assert!(html.contains(LOADING_MESSAGE));
        assert!(html.contains("<title>Stand Capacity Planner</title>"));
    }

    #[test]
    fn test_database_error_text_is_escaped() {
        let tera = init_templates().unwrap();
        let view = StatusView::Success(HealthStatus {
            status: "ok".to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            database: "error: <script>".to_string(),
        });
        let html = render_status_page(&tera, &view).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
