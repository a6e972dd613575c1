use crate::domain::route::RouterConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Modules shipped by the framework itself. They can be imported and
/// re-exported but carry no declarations the catalog knows about.
pub const FRAMEWORK_MODULES: &[&str] = &[
    "BrowserModule",
    "CommonModule",
    "FormsModule",
    "ReactiveFormsModule",
    "HttpClientModule",
    "RouterModule",
];

pub const BROWSER_MODULE: &str = "BrowserModule";

/// Token under which a `forRoot` import registers its configuration.
pub const FEATURE_CONFIG_TOKEN: &str = "config";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleRole {
    Root,
    Core,
    Shared,
    Feature,
    Routing,
}

impl fmt::Display for ModuleRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModuleRole::Root => "root",
            ModuleRole::Core => "core",
            ModuleRole::Shared => "shared",
            ModuleRole::Feature => "feature",
            ModuleRole::Routing => "routing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarableKind {
    Component,
    Directive,
    Pipe,
}

impl fmt::Display for DeclarableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclarableKind::Component => "component",
            DeclarableKind::Directive => "directive",
            DeclarableKind::Pipe => "pipe",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Declarable {
    pub name: String,
    pub kind: DeclarableKind,
}

impl Declarable {
    pub fn new(name: impl Into<String>, kind: DeclarableKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Settings accepted by a configurable module's `forRoot` entry point.
/// Unknown keys are rejected when the catalog is parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureConfig {
    pub endpoint: Option<String>,
    pub page_size: Option<u32>,
    pub cache: Option<bool>,
}

impl fmt::Display for FeatureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields = Vec::new();
        if let Some(endpoint) = &self.endpoint {
            fields.push(format!("endpoint: {}", endpoint));
        }
        if let Some(page_size) = self.page_size {
            fields.push(format!("page_size: {}", page_size));
        }
        if let Some(cache) = self.cache {
            fields.push(format!("cache: {}", cache));
        }
        write!(f, "{{ {} }}", fields.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    pub module: String,
    pub config: Option<FeatureConfig>,
}

impl ImportRef {
    pub fn plain(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            config: None,
        }
    }

    pub fn for_root(module: impl Into<String>, config: FeatureConfig) -> Self {
        Self {
            module: module.into(),
            config: Some(config),
        }
    }
}

impl fmt::Display for ImportRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.config {
            Some(config) => write!(f, "{}.forRoot({})", self.module, config),
            None => f.write_str(&self.module),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    Class {
        token: String,
    },
    UseClass {
        token: String,
        use_class: String,
        multi: bool,
    },
    Config {
        token: String,
        config: FeatureConfig,
    },
}

impl Provider {
    pub fn token(&self) -> &str {
        match self {
            Provider::Class { token }
            | Provider::UseClass { token, .. }
            | Provider::Config { token, .. } => token,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Provider::UseClass { multi: true, .. })
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Class { token } => f.write_str(token),
            Provider::UseClass {
                token,
                use_class,
                multi,
            } => {
                write!(f, "{} (useClass {}", token, use_class)?;
                if *multi {
                    f.write_str(", multi")?;
                }
                f.write_str(")")
            }
            Provider::Config { token, config } => write!(f, "{} (useValue {})", token, config),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDescriptor {
    pub name: String,
    pub role: ModuleRole,
    pub declarations: Vec<Declarable>,
    pub imports: Vec<ImportRef>,
    pub exports: Vec<String>,
    pub providers: Vec<Provider>,
    pub bootstrap: Vec<String>,
    pub routing: Option<RouterConfig>,
    pub singleton: bool,
    pub configurable: bool,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>, role: ModuleRole) -> Self {
        Self {
            name: name.into(),
            role,
            declarations: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            providers: Vec::new(),
            bootstrap: Vec::new(),
            routing: None,
            singleton: false,
            configurable: false,
        }
    }

    pub fn declares(&self, name: &str) -> bool {
        self.declarations.iter().any(|d| d.name == name)
    }

    pub fn imports_module(&self, name: &str) -> bool {
        self.imports.iter().any(|i| i.module == name)
    }

    pub fn is_root(&self) -> bool {
        self.role == ModuleRole::Root
    }

    /// Providers declared on the module plus those contributed by its
    /// `forRoot` imports.
    pub fn effective_providers(&self) -> Vec<Provider> {
        let mut providers = self.providers.clone();
        for import in &self.imports {
            if let Some(config) = &import.config {
                providers.push(Provider::Config {
                    token: FEATURE_CONFIG_TOKEN.to_string(),
                    config: config.clone(),
                });
            }
        }
        providers
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub name: String,
    pub description: String,
    pub modules: Vec<ModuleDescriptor>,
    pub framework_modules: Vec<String>,
}

impl Catalog {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            modules: Vec::new(),
            framework_modules: FRAMEWORK_MODULES.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn module(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn is_framework_module(&self, name: &str) -> bool {
        self.framework_modules.iter().any(|m| m == name)
    }

    pub fn is_known_module(&self, name: &str) -> bool {
        self.module(name).is_some() || self.is_framework_module(name)
    }

    /// Modules whose `imports` list `name`.
    pub fn importers_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ModuleDescriptor> + 'a {
        self.modules.iter().filter(move |m| m.imports_module(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub module: String,
    pub message: String,
}

impl Diagnostic {
    pub fn error(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            module: module.into(),
            message: message.into(),
        }
    }

    pub fn warning(module: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            module: module.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}: {}", level, self.module, self.message)
    }
}
