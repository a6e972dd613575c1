use crate::core::checks::{check_catalog, has_errors};
use crate::core::graph::{Edge, ModuleGraph};
use crate::core::scope::ScopeResolver;
use crate::domain::model::{Catalog, Diagnostic, ModuleDescriptor, ModuleRole, Severity};
use crate::utils::error::{Result, TourError};
use crate::utils::section::{log_section, Banner};
use serde::Serialize;
use std::io::Write;

/// A walk through a catalog, one banner per module.
#[derive(Debug, Clone)]
pub struct Tour {
    catalog: Catalog,
    diagnostics: Vec<Diagnostic>,
    module_filter: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleSummary {
    pub name: String,
    pub role: ModuleRole,
    pub declarations: usize,
    pub imports: Vec<String>,
    pub exports: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TourSummary {
    pub catalog: String,
    pub modules: Vec<ModuleSummary>,
    pub edges: Vec<Edge>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Tour {
    pub fn new(catalog: Catalog) -> Self {
        let diagnostics = check_catalog(&catalog);
        Self {
            catalog,
            diagnostics,
            module_filter: Vec::new(),
        }
    }

    /// Only show the named modules. Matching ignores case; an empty list
    /// shows everything.
    pub fn with_module_filter(mut self, modules: Vec<String>) -> Self {
        self.module_filter = modules;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Fails with `CatalogInvalid` when any check reported an error.
    /// Warnings pass.
    pub fn ensure_clean(&self) -> Result<()> {
        if has_errors(&self.diagnostics) {
            return Err(TourError::CatalogInvalid {
                diagnostics: self.diagnostics.clone(),
            });
        }
        Ok(())
    }

    fn selected(&self, module: &ModuleDescriptor) -> bool {
        self.module_filter.is_empty()
            || self
                .module_filter
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(&module.name))
    }

    /// Catalog modules, dependencies first. Falls back to catalog order
    /// when imports form a cycle.
    fn ordered_modules(&self) -> Vec<&ModuleDescriptor> {
        match ModuleGraph::from_catalog(&self.catalog).dependency_order() {
            Ok(order) => order
                .iter()
                .filter_map(|name| self.catalog.module(name))
                .collect(),
            Err(e) => {
                tracing::debug!("Using catalog order: {}", e);
                self.catalog.modules.iter().collect()
            }
        }
    }

    pub fn banners(&self) -> Vec<Banner> {
        let mut banners = vec![self.overview_banner()];

        let scopes = ScopeResolver::new(&self.catalog);
        banners.extend(
            self.ordered_modules()
                .into_iter()
                .filter(|m| self.selected(m))
                .map(|m| module_banner(m, &scopes)),
        );

        let graph = ModuleGraph::from_catalog(&self.catalog);
        let lines = graph.lines();
        let content = if lines.is_empty() {
            "no edges between catalog modules".to_string()
        } else {
            lines.join("\n")
        };
        banners.push(Banner::new("dependency graph", content));

        if !self.diagnostics.is_empty() {
            let lines: Vec<String> = self.diagnostics.iter().map(|d| d.to_string()).collect();
            banners.push(Banner::new("diagnostics", lines.join("\n")));
        }

        banners
    }

    fn overview_banner(&self) -> Banner {
        let names: Vec<&str> = self.catalog.modules.iter().map(|m| m.name.as_str()).collect();
        let errors = self
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        let warnings = self.diagnostics.len() - errors;

        let mut content = String::new();
        if !self.catalog.description.is_empty() {
            content.push_str(&self.catalog.description);
            content.push('\n');
        }
        content.push_str(&format!("{} modules: {}\n", names.len(), names.join(", ")));
        content.push_str(&format!("checks: {} error(s), {} warning(s)", errors, warnings));

        Banner::new(&self.catalog.name, content)
    }

    /// Print every banner to standard output.
    pub fn print(&self) {
        for banner in self.banners() {
            log_section(&banner.title, &banner.content);
        }
    }

    /// Same bytes as `print`, to any writer.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        for banner in self.banners() {
            out.write_all(banner.render().as_bytes())?;
        }
        Ok(())
    }

    pub fn summary(&self) -> TourSummary {
        let modules = self
            .ordered_modules()
            .into_iter()
            .filter(|m| self.selected(m))
            .map(|m| ModuleSummary {
                name: m.name.clone(),
                role: m.role,
                declarations: m.declarations.len(),
                imports: m.imports.iter().map(|i| i.to_string()).collect(),
                exports: m.exports.clone(),
            })
            .collect();

        TourSummary {
            catalog: self.catalog.name.clone(),
            modules,
            edges: ModuleGraph::from_catalog(&self.catalog).edges().to_vec(),
            diagnostics: self.diagnostics.clone(),
        }
    }
}

fn module_banner(module: &ModuleDescriptor, scopes: &ScopeResolver<'_>) -> Banner {
    let mut lines = vec![format!("role: {}", module.role)];
    if module.singleton {
        lines.push("singleton: import once, from the root module".to_string());
    }
    if module.configurable {
        lines.push("configurable: forRoot(config)".to_string());
    }

    let declarations: Vec<String> = module
        .declarations
        .iter()
        .map(|d| format!("{} ({})", d.name, d.kind))
        .collect();
    push_list(&mut lines, "declarations", &declarations);

    let mut imports: Vec<String> = module.imports.iter().map(|i| i.to_string()).collect();
    if let Some(router) = &module.routing {
        imports.push(format!("RouterModule.{}(routes)", router.mode.factory_name()));
    }
    push_list(&mut lines, "imports", &imports);

    let borrowed: Vec<String> = scopes
        .compilation_scope(&module.name)
        .into_iter()
        .filter(|name| !module.declares(name))
        .collect();
    push_list(&mut lines, "from imports", &borrowed);

    push_list(&mut lines, "exports", &module.exports);

    let providers: Vec<String> = module
        .effective_providers()
        .iter()
        .map(|p| p.to_string())
        .collect();
    push_list(&mut lines, "providers", &providers);
    push_list(&mut lines, "bootstrap", &module.bootstrap);

    if let Some(router) = &module.routing {
        lines.push(format!("routes ({}):", router.mode.factory_name()));
        lines.extend(router.routes.iter().map(|r| format!("  {}", r)));
    }

    Banner::new(&module.name, lines.join("\n"))
}

fn push_list(lines: &mut Vec<String>, label: &str, items: &[String]) {
    if !items.is_empty() {
        lines.push(format!("{}: {}", label, items.join(", ")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builtin::BuiltinCatalog;
    use crate::domain::model::ImportRef;

    #[test]
    fn test_banner_order_for_dependencies() {
        let tour = Tour::new(BuiltinCatalog::Dependencies.load().unwrap());
        let titles: Vec<String> = tour.banners().into_iter().map(|b| b.title).collect();
        assert_eq!(
            titles,
            vec![
                "Module dependencies",
                "SharedModule",
                "CoreModule",
                "FeaturesModule",
                "ProductsModule",
                "AppRoutingModule",
                "AppModule",
                "dependency graph",
            ]
        );
    }

    #[test]
    fn test_module_banner_content() {
        let tour = Tour::new(BuiltinCatalog::Dependencies.load().unwrap())
            .with_module_filter(vec!["coremodule".to_string()]);
        let banners = tour.banners();
        assert_eq!(banners.len(), 3);

        let core = &banners[1];
        assert_eq!(core.title, "CoreModule");
        assert!(core.content.starts_with("role: core\nsingleton:"));
        assert!(core
            .content
            .contains("HTTP_INTERCEPTORS (useClass LoggingInterceptor, multi)"));
    }

    #[test]
    fn test_routes_and_scope_lines() {
        let tour = Tour::new(BuiltinCatalog::Dependencies.load().unwrap())
            .with_module_filter(vec!["FeaturesModule".to_string(), "AppRoutingModule".to_string()]);
        let banners = tour.banners();

        let features = banners.iter().find(|b| b.title == "FeaturesModule").unwrap();
        assert!(features.content.contains("from imports: ButtonComponent, CardComponent"));

        let routing = banners.iter().find(|b| b.title == "AppRoutingModule").unwrap();
        assert!(routing.content.contains("imports: RouterModule.forRoot(routes)"));
        assert!(routing.content.contains("  /products -> ProductsModule (lazy)"));
    }

    #[test]
    fn test_diagnostics_banner_is_last() {
        let tour = Tour::new(BuiltinCatalog::Architecture.load().unwrap());
        let banners = tour.banners();
        let last = banners.last().unwrap();
        assert_eq!(last.title, "diagnostics");
        assert!(last.content.starts_with("warning: ProductsModule:"));
    }

    #[test]
    fn test_ensure_clean_ignores_warnings() {
        let tour = Tour::new(BuiltinCatalog::Architecture.load().unwrap());
        assert!(!tour.diagnostics().is_empty());
        assert!(tour.ensure_clean().is_ok());
    }

    #[test]
    fn test_ensure_clean_fails_on_import_cycle() {
        let mut catalog = Catalog::new("cyclic", "");
        let mut orders = ModuleDescriptor::new("OrdersModule", ModuleRole::Feature);
        orders.imports.push(ImportRef::plain("CustomersModule"));
        let mut customers = ModuleDescriptor::new("CustomersModule", ModuleRole::Feature);
        customers.imports.push(ImportRef::plain("OrdersModule"));
        catalog.modules.extend([orders, customers]);

        let tour = Tour::new(catalog);
        assert_eq!(tour.banners().len(), 5);

        let err = tour.ensure_clean().unwrap_err();
        assert_eq!(err.exit_code(), 2);
        match err {
            TourError::CatalogInvalid { diagnostics } => {
                assert!(diagnostics
                    .iter()
                    .any(|d| d.message.contains("OrdersModule -> CustomersModule")));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_write_to_matches_banners() {
        let tour = Tour::new(BuiltinCatalog::Architecture.load().unwrap());
        let mut out = Vec::new();
        tour.write_to(&mut out).unwrap();

        let expected: String = tour.banners().iter().map(|b| b.render()).collect();
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }
}
