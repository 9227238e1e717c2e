use colored::Colorize;
use spacecopy_core::ServiceCollection;
use tabled::builder::Builder;
use tabled::settings::Style;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_heading(msg: &str) {
    println!("{}", msg.cyan().bold());
}

/// One row per copied service: name, strategy, outcome and the requested
/// applications bound to it.
pub fn services_table(services: &ServiceCollection) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Service", "Strategy", "Outcome", "Applications"]);
    for planned in services.planned() {
        let outcome = services
            .outcome(planned.name())
            .map(|o| o.to_string())
            .unwrap_or_else(|| "-".to_string());
        builder.push_record([
            planned.name().to_string(),
            planned.strategy().to_string(),
            outcome,
            planned.application_names().join(", "),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// One row per requested application with the destination instance GUIDs it
/// should be bound to.
pub fn bindings_table(services: &ServiceCollection, apps: &[String]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Application", "Destination instances"]);
    for app in apps {
        let guids = match services.app_bindings(app) {
            Some(guids) => guids.join("\n"),
            None => "(none)".to_string(),
        };
        builder.push_record([app.clone(), guids]);
    }
    builder.build().with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_render_headers_for_empty_collection() {
        let services = ServiceCollection::default();

        let table = services_table(&services);
        assert!(table.contains("Strategy"));
        assert!(table.contains("Outcome"));

        let table = bindings_table(&services, &["app1".to_string()]);
        assert!(table.contains("app1"));
        assert!(table.contains("(none)"));
    }
}
