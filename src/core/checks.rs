// Catalog checks
//
// Static rules over the declared module relationships. Nothing here
// instantiates providers or resolves routes at runtime; the checks only
// look at what each module says about itself and its neighbours.

use crate::core::graph::ModuleGraph;
use crate::core::scope::ScopeResolver;
use crate::domain::model::{Catalog, Diagnostic, ModuleDescriptor, Severity, BROWSER_MODULE};
use crate::domain::route::{RouteTarget, RouterMode};
use crate::utils::error::{Result, TourError};
use crate::utils::validation::Validate;
use std::collections::{HashMap, HashSet};

/// Runs every rule and returns the diagnostics in a stable order:
/// catalog-wide rules first, then per-module rules in catalog order.
pub fn check_catalog(catalog: &Catalog) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    check_unique_names(catalog, &mut diagnostics);
    check_single_declaration(catalog, &mut diagnostics);
    check_root_modules(catalog, &mut diagnostics);
    check_singletons(catalog, &mut diagnostics);
    check_root_routers(catalog, &mut diagnostics);
    check_cycles(catalog, &mut diagnostics);
    check_lazy_targets(catalog, &mut diagnostics);

    let scopes = ScopeResolver::new(catalog);
    for module in &catalog.modules {
        check_imports(catalog, module, &mut diagnostics);
        check_exports(catalog, &scopes, module, &mut diagnostics);
        check_bootstrap(module, &mut diagnostics);
        check_routes(catalog, module, &mut diagnostics);
        check_providers(module, &mut diagnostics);
    }

    for diagnostic in diagnostics.iter().filter(|d| d.severity == Severity::Warning) {
        tracing::warn!("{}", diagnostic);
    }
    diagnostics
}

pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}

fn check_unique_names(catalog: &Catalog, out: &mut Vec<Diagnostic>) {
    let mut seen = HashSet::new();
    for module in &catalog.modules {
        if !seen.insert(module.name.as_str()) {
            out.push(Diagnostic::error(
                &module.name,
                "module name is defined more than once",
            ));
        }
    }
}

fn check_single_declaration(catalog: &Catalog, out: &mut Vec<Diagnostic>) {
    let mut owners: HashMap<&str, &str> = HashMap::new();
    for module in &catalog.modules {
        for declarable in &module.declarations {
            match owners.get(declarable.name.as_str()) {
                Some(owner) if *owner != module.name => out.push(Diagnostic::error(
                    &module.name,
                    format!(
                        "{} {} is already declared by {}; a declarable belongs to exactly one module",
                        declarable.kind, declarable.name, owner
                    ),
                )),
                Some(_) => out.push(Diagnostic::warning(
                    &module.name,
                    format!("{} is listed twice in declarations", declarable.name),
                )),
                None => {
                    owners.insert(&declarable.name, &module.name);
                }
            }
        }
    }
}

fn check_root_modules(catalog: &Catalog, out: &mut Vec<Diagnostic>) {
    let roots: Vec<&ModuleDescriptor> = catalog.modules.iter().filter(|m| m.is_root()).collect();
    if roots.len() > 1 {
        for extra in &roots[1..] {
            out.push(Diagnostic::error(
                &extra.name,
                format!("only one root module is allowed, {} is already the root", roots[0].name),
            ));
        }
    }
    for root in roots {
        if root.bootstrap.is_empty() {
            out.push(Diagnostic::warning(&root.name, "root module bootstraps no component"));
        }
    }
}

fn check_singletons(catalog: &Catalog, out: &mut Vec<Diagnostic>) {
    for singleton in catalog.modules.iter().filter(|m| m.singleton) {
        let importers: Vec<&ModuleDescriptor> = catalog.importers_of(&singleton.name).collect();
        for importer in importers.iter().filter(|m| !m.is_root()) {
            out.push(Diagnostic::error(
                &importer.name,
                format!(
                    "{} is already loaded by the root module; import it only in the root module",
                    singleton.name
                ),
            ));
        }
        if importers.len() > 1 {
            let names: Vec<&str> = importers.iter().map(|m| m.name.as_str()).collect();
            out.push(Diagnostic::error(
                &singleton.name,
                format!("singleton module is imported {} times ({})", importers.len(), names.join(", ")),
            ));
        }
    }
}

fn check_root_routers(catalog: &Catalog, out: &mut Vec<Diagnostic>) {
    let mut root_routers = catalog
        .modules
        .iter()
        .filter(|m| matches!(&m.routing, Some(r) if r.mode == RouterMode::Root));
    if let Some(first) = root_routers.next() {
        for extra in root_routers {
            out.push(Diagnostic::error(
                &extra.name,
                format!(
                    "RouterModule.forRoot is already registered by {}; feature routes use forChild",
                    first.name
                ),
            ));
        }
    }
}

fn check_cycles(catalog: &Catalog, out: &mut Vec<Diagnostic>) {
    if let Some(path) = ModuleGraph::from_catalog(catalog).find_cycle() {
        out.push(Diagnostic::error(
            &path[0],
            format!("import cycle: {}", path.join(" -> ")),
        ));
    }
}

fn check_lazy_targets(catalog: &Catalog, out: &mut Vec<Diagnostic>) {
    for module in &catalog.modules {
        let routes = module.routing.iter().flat_map(|r| r.routes.iter());
        for route in routes {
            let RouteTarget::LazyModule(target) = &route.target else {
                continue;
            };
            if catalog.module(target).is_none() {
                out.push(Diagnostic::error(
                    &module.name,
                    format!("route /{} lazy-loads unknown module {}", route.path, target),
                ));
                continue;
            }
            for importer in catalog.importers_of(target) {
                out.push(Diagnostic::warning(
                    &importer.name,
                    format!(
                        "{} is lazy-loaded by /{} but also imported eagerly here, so it ships in the initial bundle",
                        target, route.path
                    ),
                ));
            }
        }
    }
}

fn check_imports(catalog: &Catalog, module: &ModuleDescriptor, out: &mut Vec<Diagnostic>) {
    for import in &module.imports {
        if import.module == module.name {
            out.push(Diagnostic::error(&module.name, "module imports itself"));
            continue;
        }
        if !catalog.is_known_module(&import.module) {
            out.push(Diagnostic::error(
                &module.name,
                format!("imports unknown module {}", import.module),
            ));
            continue;
        }
        if import.module == BROWSER_MODULE && !module.is_root() {
            out.push(Diagnostic::error(
                &module.name,
                "BrowserModule belongs in the root module only; feature modules import CommonModule",
            ));
        }
        if import.config.is_some() {
            match catalog.module(&import.module) {
                Some(target) if !target.configurable => out.push(Diagnostic::error(
                    &module.name,
                    format!("{} has no forRoot entry point", import.module),
                )),
                None => out.push(Diagnostic::error(
                    &module.name,
                    format!("{} has no forRoot entry point", import.module),
                )),
                Some(_) if !module.is_root() => out.push(Diagnostic::warning(
                    &module.name,
                    format!(
                        "{}.forRoot should only be imported by the root module",
                        import.module
                    ),
                )),
                Some(_) => {}
            }
        }
    }
}

fn check_exports(
    catalog: &Catalog,
    scopes: &ScopeResolver<'_>,
    module: &ModuleDescriptor,
    out: &mut Vec<Diagnostic>,
) {
    for export in &module.exports {
        let resolvable = module.declares(export)
            || catalog.is_known_module(export)
            || scopes.imported_export(module, export);
        if !resolvable {
            out.push(Diagnostic::error(
                &module.name,
                format!(
                    "exports {} which is neither declared here, a known module, nor exported by an import",
                    export
                ),
            ));
        }
    }
}

fn check_bootstrap(module: &ModuleDescriptor, out: &mut Vec<Diagnostic>) {
    if !module.bootstrap.is_empty() && !module.is_root() {
        out.push(Diagnostic::error(
            &module.name,
            "only the root module bootstraps components",
        ));
    }
    for component in &module.bootstrap {
        if !module.declares(component) {
            out.push(Diagnostic::error(
                &module.name,
                format!("bootstraps {} but does not declare it", component),
            ));
        }
    }
}

fn check_routes(catalog: &Catalog, module: &ModuleDescriptor, out: &mut Vec<Diagnostic>) {
    let Some(router) = &module.routing else {
        return;
    };

    for route in &router.routes {
        for problem in route.shape_problems() {
            out.push(Diagnostic::error(&module.name, problem));
        }
        if let RouteTarget::Component(component) = &route.target {
            let declared = catalog.modules.iter().any(|m| m.declares(component));
            if !declared {
                out.push(Diagnostic::error(
                    &module.name,
                    format!("route /{} points at {} which no module declares", route.path, component),
                ));
            }
        }
    }

    for (earlier, later) in router.shadowed_routes() {
        out.push(Diagnostic::warning(
            &module.name,
            format!(
                "route /{} is unreachable: /{} is declared first and matches the same URLs",
                router.routes[later].path, router.routes[earlier].path
            ),
        ));
    }
}

fn check_providers(module: &ModuleDescriptor, out: &mut Vec<Diagnostic>) {
    let mut by_token: HashMap<&str, (usize, usize)> = HashMap::new();
    let providers = module.effective_providers();
    let mut order: Vec<&str> = Vec::new();
    for provider in &providers {
        let entry = by_token.entry(provider.token()).or_insert_with(|| {
            order.push(provider.token());
            (0, 0)
        });
        if provider.is_multi() {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    for token in order {
        let (multi, single) = by_token[token];
        if multi > 0 && single > 0 {
            out.push(Diagnostic::error(
                &module.name,
                format!("cannot mix multi and regular providers for {}", token),
            ));
        } else if single > 1 {
            out.push(Diagnostic::warning(
                &module.name,
                format!("{} is provided {} times; the last provider wins", token, single),
            ));
        }
    }
}

impl Validate for Catalog {
    fn validate(&self) -> Result<()> {
        let diagnostics = check_catalog(self);
        if has_errors(&diagnostics) {
            return Err(TourError::CatalogInvalid { diagnostics });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builtin::BuiltinCatalog;
    use crate::domain::model::{
        Declarable, DeclarableKind, FeatureConfig, ImportRef, ModuleRole, Provider,
    };
    use crate::domain::route::{Route, RouterConfig};

    fn errors(diagnostics: &[Diagnostic]) -> Vec<&Diagnostic> {
        diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .collect()
    }

    fn app_module() -> ModuleDescriptor {
        let mut app = ModuleDescriptor::new("AppModule", ModuleRole::Root);
        app.declarations
            .push(Declarable::new("AppComponent", DeclarableKind::Component));
        app.bootstrap.push("AppComponent".to_string());
        app
    }

    fn routing_module(name: &str, mode: RouterMode, routes: Vec<Route>) -> ModuleDescriptor {
        let mut module = ModuleDescriptor::new(name, ModuleRole::Routing);
        module.routing = Some(RouterConfig { mode, routes });
        module
    }

    fn only(diagnostics: &[Diagnostic]) -> &Diagnostic {
        assert_eq!(diagnostics.len(), 1, "{:?}", diagnostics);
        &diagnostics[0]
    }

    #[test]
    fn test_dependencies_catalog_is_clean() {
        let catalog = BuiltinCatalog::Dependencies.load().unwrap();
        let diagnostics = check_catalog(&catalog);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_architecture_catalog_flags_shadowed_route() {
        let catalog = BuiltinCatalog::Architecture.load().unwrap();
        let diagnostics = check_catalog(&catalog);
        assert!(errors(&diagnostics).is_empty(), "{:?}", diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].module, "ProductsModule");
        assert!(diagnostics[0].message.contains("/products/new"));
    }

    #[test]
    fn test_browser_module_outside_root() {
        let mut catalog = Catalog::new("browser", "");
        let mut feature = ModuleDescriptor::new("FeatureModule", ModuleRole::Feature);
        feature.imports.push(ImportRef::plain("BrowserModule"));
        catalog.modules.push(feature);

        let diagnostics = check_catalog(&catalog);
        assert_eq!(errors(&diagnostics).len(), 1);
        assert!(diagnostics[0].message.contains("BrowserModule"));
    }

    #[test]
    fn test_declarable_in_two_modules() {
        let mut catalog = Catalog::new("dupes", "");
        for name in ["AModule", "BModule"] {
            let mut module = ModuleDescriptor::new(name, ModuleRole::Shared);
            module
                .declarations
                .push(Declarable::new("CardComponent", DeclarableKind::Component));
            catalog.modules.push(module);
        }

        let diagnostics = check_catalog(&catalog);
        assert_eq!(errors(&diagnostics).len(), 1);
        assert_eq!(diagnostics[0].module, "BModule");
    }

    #[test]
    fn test_mixed_multi_providers() {
        let mut catalog = Catalog::new("providers", "");
        let mut core = ModuleDescriptor::new("CoreModule", ModuleRole::Core);
        core.providers.push(Provider::UseClass {
            token: "HTTP_INTERCEPTORS".to_string(),
            use_class: "AuthInterceptor".to_string(),
            multi: true,
        });
        core.providers.push(Provider::Class {
            token: "HTTP_INTERCEPTORS".to_string(),
        });
        catalog.modules.push(core);

        let diagnostics = check_catalog(&catalog);
        assert_eq!(errors(&diagnostics).len(), 1);
        assert!(diagnostics[0].message.contains("cannot mix"));
    }

    #[test]
    fn test_unknown_export_and_import() {
        let mut catalog = Catalog::new("unknown", "");
        let mut shared = ModuleDescriptor::new("SharedModule", ModuleRole::Shared);
        shared.imports.push(ImportRef::plain("MaterialModule"));
        shared.exports.push("GhostComponent".to_string());
        catalog.modules.push(shared);

        let diagnostics = check_catalog(&catalog);
        assert_eq!(errors(&diagnostics).len(), 2);
    }

    #[test]
    fn test_catalog_validate_reports_errors() {
        let mut catalog = Catalog::new("invalid", "");
        let mut feature = ModuleDescriptor::new("FeatureModule", ModuleRole::Feature);
        feature.bootstrap.push("AppComponent".to_string());
        catalog.modules.push(feature);

        match catalog.validate() {
            Err(TourError::CatalogInvalid { diagnostics }) => assert_eq!(diagnostics.len(), 2),
            other => panic!("expected CatalogInvalid, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_module_name() {
        let mut catalog = Catalog::new("dupes", "");
        catalog.modules.push(ModuleDescriptor::new("SharedModule", ModuleRole::Shared));
        catalog.modules.push(ModuleDescriptor::new("SharedModule", ModuleRole::Shared));

        let diagnostics = check_catalog(&catalog);
        let diagnostic = only(&diagnostics);
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.module, "SharedModule");
        assert_eq!(diagnostic.message, "module name is defined more than once");
    }

    #[test]
    fn test_module_importing_itself() {
        let mut catalog = Catalog::new("self", "");
        let mut feature = ModuleDescriptor::new("FeatureModule", ModuleRole::Feature);
        feature.imports.push(ImportRef::plain("FeatureModule"));
        catalog.modules.push(feature);

        let diagnostics = check_catalog(&catalog);
        let messages: Vec<&str> = errors(&diagnostics).iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["import cycle: FeatureModule -> FeatureModule", "module imports itself"]
        );
    }

    #[test]
    fn test_bootstrap_component_not_declared() {
        let mut catalog = Catalog::new("bootstrap", "");
        let mut app = ModuleDescriptor::new("AppModule", ModuleRole::Root);
        app.bootstrap.push("AppComponent".to_string());
        catalog.modules.push(app);

        let diagnostics = check_catalog(&catalog);
        let diagnostic = only(&diagnostics);
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.message, "bootstraps AppComponent but does not declare it");
    }

    #[test]
    fn test_route_component_nobody_declares() {
        let mut catalog = Catalog::new("routes", "");
        catalog.modules.push(routing_module(
            "AppRoutingModule",
            RouterMode::Root,
            vec![Route::component("about", "AboutComponent")],
        ));

        let diagnostics = check_catalog(&catalog);
        let diagnostic = only(&diagnostics);
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(
            diagnostic.message,
            "route /about points at AboutComponent which no module declares"
        );
    }

    #[test]
    fn test_lazy_route_to_unknown_module() {
        let mut catalog = Catalog::new("lazy", "");
        catalog.modules.push(routing_module(
            "AppRoutingModule",
            RouterMode::Root,
            vec![Route::lazy("orders", "OrdersModule")],
        ));

        let diagnostics = check_catalog(&catalog);
        let diagnostic = only(&diagnostics);
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.message, "route /orders lazy-loads unknown module OrdersModule");
    }

    #[test]
    fn test_two_root_routers() {
        let mut catalog = Catalog::new("routers", "");
        catalog
            .modules
            .push(routing_module("AppRoutingModule", RouterMode::Root, Vec::new()));
        catalog
            .modules
            .push(routing_module("AdminRoutingModule", RouterMode::Root, Vec::new()));

        let diagnostics = check_catalog(&catalog);
        let diagnostic = only(&diagnostics);
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.module, "AdminRoutingModule");
        assert!(diagnostic.message.contains("already registered by AppRoutingModule"));
    }

    #[test]
    fn test_for_root_on_module_without_entry_point() {
        let mut catalog = Catalog::new("for-root", "");
        let mut app = app_module();
        app.imports
            .push(ImportRef::for_root("ProductsModule", FeatureConfig::default()));
        catalog.modules.push(app);
        catalog
            .modules
            .push(ModuleDescriptor::new("ProductsModule", ModuleRole::Feature));

        let diagnostics = check_catalog(&catalog);
        let diagnostic = only(&diagnostics);
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.module, "AppModule");
        assert_eq!(diagnostic.message, "ProductsModule has no forRoot entry point");
    }

    #[test]
    fn test_lazy_module_also_imported_eagerly() {
        let mut catalog = Catalog::new("bundle", "");
        let mut app = app_module();
        app.imports.push(ImportRef::plain("ProductsModule"));
        catalog.modules.push(app);
        catalog
            .modules
            .push(ModuleDescriptor::new("ProductsModule", ModuleRole::Feature));
        catalog.modules.push(routing_module(
            "AppRoutingModule",
            RouterMode::Root,
            vec![Route::lazy("products", "ProductsModule")],
        ));

        let diagnostics = check_catalog(&catalog);
        let diagnostic = only(&diagnostics);
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.module, "AppModule");
        assert!(diagnostic
            .message
            .starts_with("ProductsModule is lazy-loaded by /products but also imported eagerly"));
    }

    #[test]
    fn test_token_provided_twice() {
        let mut catalog = Catalog::new("providers", "");
        let mut core = ModuleDescriptor::new("CoreModule", ModuleRole::Core);
        for _ in 0..2 {
            core.providers.push(Provider::Class {
                token: "AuthService".to_string(),
            });
        }
        catalog.modules.push(core);

        let diagnostics = check_catalog(&catalog);
        let diagnostic = only(&diagnostics);
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.message, "AuthService is provided 2 times; the last provider wins");
    }

    #[test]
    fn test_for_root_outside_root_module() {
        let mut catalog = Catalog::new("for-root", "");
        let mut features = ModuleDescriptor::new("FeaturesModule", ModuleRole::Feature);
        features
            .imports
            .push(ImportRef::for_root("ProductsModule", FeatureConfig::default()));
        let mut products = ModuleDescriptor::new("ProductsModule", ModuleRole::Feature);
        products.configurable = true;
        catalog.modules.extend([features, products]);

        let diagnostics = check_catalog(&catalog);
        let diagnostic = only(&diagnostics);
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.module, "FeaturesModule");
        assert_eq!(
            diagnostic.message,
            "ProductsModule.forRoot should only be imported by the root module"
        );
    }

    #[test]
    fn test_declarable_listed_twice_in_one_module() {
        let mut catalog = Catalog::new("twice", "");
        let mut shared = ModuleDescriptor::new("SharedModule", ModuleRole::Shared);
        for _ in 0..2 {
            shared
                .declarations
                .push(Declarable::new("CardComponent", DeclarableKind::Component));
        }
        catalog.modules.push(shared);

        let diagnostics = check_catalog(&catalog);
        let diagnostic = only(&diagnostics);
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.message, "CardComponent is listed twice in declarations");
    }
}
