use crate::domain::model::{
    Catalog, Declarable, DeclarableKind, FeatureConfig, ImportRef, ModuleDescriptor, ModuleRole,
    Provider,
};
use crate::domain::ports::CatalogSource;
use crate::domain::route::{PathMatch, Route, RouteTarget, RouterConfig, RouterMode};
use crate::utils::error::{Result, TourError};
use crate::utils::validation::{
    validate_at_least, validate_class_name, validate_endpoint, validate_title, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk shape of a module catalog. Unknown keys are rejected so that a
/// misspelled field fails the load instead of vanishing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    pub catalog: CatalogInfo,
    pub modules: Option<Vec<ModuleEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogInfo {
    pub name: String,
    pub description: Option<String>,
    /// Extra framework-provided modules on top of the built-in list.
    pub framework_modules: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleEntry {
    pub name: String,
    pub role: ModuleRole,
    pub components: Option<Vec<String>>,
    pub directives: Option<Vec<String>>,
    pub pipes: Option<Vec<String>>,
    pub imports: Option<Vec<ImportEntry>>,
    pub exports: Option<Vec<String>>,
    pub providers: Option<Vec<ProviderEntry>>,
    pub bootstrap: Option<Vec<String>>,
    pub singleton: Option<bool>,
    pub configurable: Option<bool>,
    pub routing: Option<RoutingEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImportEntry {
    Name(String),
    ForRoot(ForRootEntry),
}

/// `{ module = "...", config = { ... } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForRootEntry {
    pub module: String,
    pub config: FeatureConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderEntry {
    Token(String),
    Detailed(ProviderSpec),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSpec {
    pub token: String,
    pub use_class: Option<String>,
    pub multi: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingEntry {
    pub mode: RouterMode,
    pub routes: Vec<RouteEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteEntry {
    pub path: String,
    pub component: Option<String>,
    pub load_children: Option<String>,
    pub redirect_to: Option<String>,
    pub path_match: Option<PathMatch>,
}

impl CatalogFile {
    /// Load a catalog from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TourError::IoError)?;
        tracing::debug!("Read catalog file {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TourError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` placeholders with environment values. Unset
    /// variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TourError::ConfigError {
            message: format!("placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                tracing::debug!("Environment variable {} is not set, keeping placeholder", var_name);
                format!("${{{}}}", var_name)
            })
        });

        Ok(result.to_string())
    }

    pub fn modules(&self) -> &[ModuleEntry] {
        self.modules.as_deref().unwrap_or(&[])
    }

    /// Convert into the domain model.
    pub fn into_catalog(self) -> Result<Catalog> {
        let mut catalog = Catalog::new(
            self.catalog.name,
            self.catalog.description.unwrap_or_default(),
        );
        for extra in self.catalog.framework_modules.unwrap_or_default() {
            if !catalog.is_framework_module(&extra) {
                catalog.framework_modules.push(extra);
            }
        }

        for entry in self.modules.unwrap_or_default() {
            let module = entry.into_descriptor()?;
            tracing::debug!(
                "Loaded {} ({} declarations, {} imports)",
                module.name,
                module.declarations.len(),
                module.imports.len()
            );
            catalog.modules.push(module);
        }

        Ok(catalog)
    }
}

impl ModuleEntry {
    fn into_descriptor(self) -> Result<ModuleDescriptor> {
        let mut module = ModuleDescriptor::new(self.name, self.role);

        let declared = [
            (self.components, DeclarableKind::Component),
            (self.directives, DeclarableKind::Directive),
            (self.pipes, DeclarableKind::Pipe),
        ];
        for (names, kind) in declared {
            module.declarations.extend(
                names
                    .unwrap_or_default()
                    .into_iter()
                    .map(|name| Declarable::new(name, kind)),
            );
        }

        module.imports = self
            .imports
            .unwrap_or_default()
            .into_iter()
            .map(ImportEntry::into_import_ref)
            .collect();
        module.exports = self.exports.unwrap_or_default();
        module.providers = self
            .providers
            .unwrap_or_default()
            .into_iter()
            .map(ProviderEntry::into_provider)
            .collect();
        module.bootstrap = self.bootstrap.unwrap_or_default();
        module.singleton = self.singleton.unwrap_or(false);
        module.configurable = self.configurable.unwrap_or(false);

        if let Some(routing) = self.routing {
            let routes = routing
                .routes
                .into_iter()
                .map(|route| route.into_route(&module.name))
                .collect::<Result<Vec<_>>>()?;
            module.routing = Some(RouterConfig {
                mode: routing.mode,
                routes,
            });
        }

        Ok(module)
    }
}

impl ImportEntry {
    fn into_import_ref(self) -> ImportRef {
        match self {
            ImportEntry::Name(module) => ImportRef::plain(module),
            ImportEntry::ForRoot(ForRootEntry { module, config }) => {
                ImportRef::for_root(module, config)
            }
        }
    }
}

impl ProviderEntry {
    fn into_provider(self) -> Provider {
        match self {
            ProviderEntry::Token(token) => Provider::Class { token },
            ProviderEntry::Detailed(ProviderSpec {
                token,
                use_class,
                multi,
            }) => {
                let multi = multi.unwrap_or(false);
                match use_class {
                    Some(use_class) => Provider::UseClass {
                        token,
                        use_class,
                        multi,
                    },
                    None if multi => Provider::UseClass {
                        use_class: token.clone(),
                        token,
                        multi,
                    },
                    None => Provider::Class { token },
                }
            }
        }
    }
}

impl RouteEntry {
    fn into_route(self, module: &str) -> Result<Route> {
        let field = format!("modules.{}.routing.routes", module);
        let target = match (self.component, self.load_children, self.redirect_to) {
            (Some(component), None, None) => RouteTarget::Component(component),
            (None, Some(lazy), None) => RouteTarget::LazyModule(lazy),
            (None, None, Some(to)) => RouteTarget::Redirect {
                to,
                path_match: self.path_match.unwrap_or_default(),
            },
            (None, None, None) => {
                return Err(TourError::InvalidConfigValueError {
                    field,
                    value: self.path,
                    reason: "route needs one of component, load_children or redirect_to".to_string(),
                })
            }
            _ => {
                return Err(TourError::InvalidConfigValueError {
                    field,
                    value: self.path,
                    reason: "component, load_children and redirect_to are mutually exclusive"
                        .to_string(),
                })
            }
        };

        if self.path_match.is_some() && !matches!(target, RouteTarget::Redirect { .. }) {
            return Err(TourError::InvalidConfigValueError {
                field,
                value: self.path,
                reason: "path_match only applies to redirect routes".to_string(),
            });
        }

        Ok(Route {
            path: self.path,
            target,
        })
    }
}

fn validate_feature_config(field: &str, config: &FeatureConfig) -> Result<()> {
    if let Some(endpoint) = &config.endpoint {
        validate_endpoint(&format!("{}.endpoint", field), endpoint)?;
    }
    if let Some(page_size) = config.page_size {
        validate_at_least(&format!("{}.page_size", field), page_size as usize, 1)?;
    }
    Ok(())
}

impl Validate for CatalogFile {
    fn validate(&self) -> Result<()> {
        validate_title("catalog.name", &self.catalog.name)?;

        for module in self.modules() {
            validate_class_name("modules.name", &module.name)?;
            let declared = [&module.components, &module.directives, &module.pipes];
            for name in declared.into_iter().flatten().flatten() {
                validate_class_name(&format!("modules.{}.declarations", module.name), name)?;
            }

            for import in module.imports.iter().flatten() {
                if let ImportEntry::ForRoot(entry) = import {
                    let field = format!("modules.{}.imports.{}.config", module.name, entry.module);
                    validate_feature_config(&field, &entry.config)?;
                }
            }
        }

        Ok(())
    }
}

/// A catalog stored in a TOML file.
#[derive(Debug, Clone)]
pub struct CatalogPath {
    path: PathBuf,
}

impl CatalogPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for CatalogPath {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load_catalog(&self) -> Result<Catalog> {
        let file = CatalogFile::from_file(&self.path)?;
        file.validate()?;
        file.into_catalog()
    }
}
